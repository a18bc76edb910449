use std::path::Path;

use reqwest::Method;
use reqwest::multipart::{Form, Part};

use saveplate_types::UserProfile;
use saveplate_types::api::{ChangePasswordRequest, MeResponse, MessageResponse, ProfileUpdate};

use crate::{ApiClient, ApiError};

fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

impl ApiClient {
    /// Update profile fields and optionally upload a new picture.
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
        picture: Option<&Path>,
    ) -> Result<UserProfile, ApiError> {
        let mut form = Form::new();
        for (name, value) in update.fields() {
            form = form.text(name, value);
        }
        if let Some(path) = picture {
            let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "profile".to_string());
            let part = Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(image_mime(path))?;
            form = form.part("profilePic", part);
        }

        let req = self.authed(Method::PUT, "profile/update")?.multipart(form);
        let resp: MeResponse = self.send(req, "Profile update failed.").await?;
        Ok(resp.into_profile())
    }

    /// A wrong old password may come back as 401; that is a rejection here,
    /// not an expired session.
    pub async fn change_password(
        &self,
        req: &ChangePasswordRequest,
    ) -> Result<Option<String>, ApiError> {
        let builder = self.authed(Method::PUT, "profile/change-password")?.json(req);
        let resp: MessageResponse = self.send_public(builder, "Password change failed.").await?;
        Ok(resp.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_image_mime_by_extension() {
        assert_eq!(image_mime(Path::new("me.PNG")), "image/png");
        assert_eq!(image_mime(Path::new("a/b/c.jpeg")), "image/jpeg");
        assert_eq!(image_mime(Path::new("noext")), "application/octet-stream");
    }
}
