use reqwest::Method;

use saveplate_types::UserProfile;
use saveplate_types::api::{OrphanageList, PartnersResponse};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// NGOs operating in the logged-in donor's city.
    pub async fn partners(&self) -> Result<PartnersResponse, ApiError> {
        let req = self.authed(Method::GET, "partners")?;
        self.send(req, "Failed to load partners").await
    }

    /// Every registered NGO. Public.
    pub async fn partner_ngos(&self) -> Result<Vec<UserProfile>, ApiError> {
        let req = self.public(Method::GET, "partners/ngos");
        self.send_public(req, "Failed to load NGOs").await
    }

    /// Every registered orphanage. Public.
    pub async fn public_orphanages(&self) -> Result<Vec<UserProfile>, ApiError> {
        let req = self.public(Method::GET, "public/orphanages");
        let list: OrphanageList = self.send_public(req, "Failed to load orphanages").await?;
        Ok(list.into_vec())
    }
}
