//! Input checks that run before anything is sent to the backend.

use saveplate_types::FoodItem;
use saveplate_types::api::{ChangePasswordRequest, CreateDonationRequest};

use crate::freshness::parse_best_before;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("add at least one food item")]
    NoItems,
    #[error("item {0} needs a name")]
    ItemName(usize),
    #[error("item {index} has an invalid serves value {value:?}")]
    Serves { index: usize, value: String },
    #[error("best-before must be a positive number of hours, got {0:?}")]
    BestBefore(String),
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Fill in all three password fields to change password.")]
    IncompletePassword,
    #[error("New password must be at least 6 characters.")]
    PasswordTooShort,
    #[error("New passwords do not match.")]
    PasswordMismatch,
}

/// Raw donation form input, as typed.
#[derive(Debug, Clone, Default)]
pub struct DonationForm {
    /// `(name, serves)` rows
    pub items: Vec<(String, String)>,
    pub best_before_hours: String,
    pub location: String,
    pub city: String,
    pub instructions: String,
}

impl DonationForm {
    pub fn into_request(self) -> Result<CreateDonationRequest, FormError> {
        if self.items.is_empty() {
            return Err(FormError::NoItems);
        }
        let mut items = Vec::with_capacity(self.items.len());
        for (i, (name, serves)) in self.items.into_iter().enumerate() {
            let index = i + 1;
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(FormError::ItemName(index));
            }
            let serves = match serves.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(FormError::Serves { index, value: serves }),
            };
            items.push(FoodItem { name, serves });
        }

        // Must round-trip through parse_best_before.
        let best_before = match self.best_before_hours.trim().parse::<f64>() {
            Ok(h) if h.is_finite() && h > 0.0 => format!("{h} hours"),
            _ => return Err(FormError::BestBefore(self.best_before_hours)),
        };
        if parse_best_before(&best_before).is_none() {
            return Err(FormError::BestBefore(self.best_before_hours));
        }
        let location = required("location", self.location)?;
        let city = required("city", self.city)?;

        Ok(CreateDonationRequest {
            items,
            best_before,
            location,
            city,
            instructions: self.instructions.trim().to_string(),
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::Required(field))
    } else {
        Ok(value.to_string())
    }
}

/// Validate a password change. All three fields empty means no change.
pub fn password_change(
    old: &str,
    new: &str,
    confirm: &str,
) -> Result<Option<ChangePasswordRequest>, FormError> {
    if old.is_empty() && new.is_empty() && confirm.is_empty() {
        return Ok(None);
    }
    if old.is_empty() || new.is_empty() || confirm.is_empty() {
        return Err(FormError::IncompletePassword);
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort);
    }
    if new != confirm {
        return Err(FormError::PasswordMismatch);
    }
    Ok(Some(ChangePasswordRequest {
        old_password: old.to_string(),
        new_password: new.to_string(),
    }))
}
