use serde::{Deserialize, Serialize};

use crate::models::{Donation, FoodItem, NgoStock, Role, StockItem, UserProfile};
use crate::notifications::Notification;

// -- JWT Claims --

/// The only claim the client reads from a token payload.
/// The payload is never verified client-side; the backend owns that.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub role: String,
}

// -- Auth --

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
}

/// Sign-up form. Which optional fields matter depends on `role`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub role: Role,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ngo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphanage_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children_count: Option<u32>,
}

/// Body shape the backend uses for confirmations and errors alike.
#[derive(Debug, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// -- Dashboard --

/// `/dashboard/me` answers either `{ "user": {...} }` or the bare profile.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MeResponse {
    Wrapped { user: UserProfile },
    Bare(UserProfile),
}

impl MeResponse {
    pub fn into_profile(self) -> UserProfile {
        match self {
            MeResponse::Wrapped { user } => user,
            MeResponse::Bare(user) => user,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDonations {
    #[serde(default)]
    pub my_donations: Vec<Donation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    #[serde(default)]
    pub total_donors: u64,
    #[serde(default)]
    pub total_meals: u64,
    #[serde(default)]
    pub total_orphanages: u64,
}

// -- Donations --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    pub items: Vec<FoodItem>,
    /// Always `"<hours> hours"`
    pub best_before: String,
    pub location: String,
    pub city: String,
    pub instructions: String,
}

// -- Stock & deliveries --

#[derive(Debug, Default, Deserialize)]
pub struct StockResponse {
    #[serde(default)]
    pub stock: Vec<StockItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NgoStockResponse {
    #[serde(default)]
    pub ngos: Vec<NgoStock>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonateItemRequest {
    pub donation_id: String,
    pub item_index: usize,
    pub orphanage_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFoodRequest {
    pub donation_id: String,
    pub item_index: usize,
    pub ngo_id: String,
}

/// NGO answers an orphanage's food request by donating to it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveFoodRequest {
    pub donation_id: String,
    pub orphanage_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDeliveryRequest {
    pub donation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryCompletedRequest {
    pub donation_id: String,
}

// -- Partners --

#[derive(Debug, Default, Deserialize)]
pub struct PartnersResponse {
    #[serde(default)]
    pub ngos: Vec<UserProfile>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OrphanageList {
    Wrapped { orphanages: Vec<UserProfile> },
    Bare(Vec<UserProfile>),
}

impl OrphanageList {
    pub fn into_vec(self) -> Vec<UserProfile> {
        match self {
            OrphanageList::Wrapped { orphanages } => orphanages,
            OrphanageList::Bare(list) => list,
        }
    }
}

// -- Notifications --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default, deserialize_with = "crate::lenient::serves")]
    pub unread_count: u32,
}

// -- Profile --

/// Editable profile fields, sent as multipart form fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub donor_type: Option<String>,
    pub ngo_name: Option<String>,
    pub orphanage_name: Option<String>,
}

impl ProfileUpdate {
    /// Form fields in wire naming, skipping the ones left unset.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("donorType", &self.donor_type),
            ("ngoName", &self.ngo_name),
            ("orphanageName", &self.orphanage_name),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.clone().map(|v| (k, v)))
        .collect()
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn me_response_accepts_both_shapes() {
        let wrapped: MeResponse =
            serde_json::from_str(r#"{"user": {"_id": "u1", "name": "Asha"}}"#).unwrap();
        assert_eq!(wrapped.into_profile().id, "u1");
        let bare: MeResponse = serde_json::from_str(r#"{"_id": "u2", "city": "Pune"}"#).unwrap();
        assert_eq!(bare.into_profile().city.as_deref(), Some("Pune"));
    }

    #[test]
    fn unread_count_tolerates_null_and_absence() {
        let inbox: NotificationsResponse =
            serde_json::from_str(r#"{"notifications": [], "unreadCount": null}"#).unwrap();
        assert_eq!(inbox.unread_count, 0);
        let inbox: NotificationsResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(inbox.unread_count, 0);
        let inbox: NotificationsResponse =
            serde_json::from_str(r#"{"unreadCount": 3}"#).unwrap();
        assert_eq!(inbox.unread_count, 3);
    }

    #[test]
    fn confirm_delivery_omits_unknown_index() {
        let body = serde_json::to_value(ConfirmDeliveryRequest {
            donation_id: "d1".into(),
            item_index: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"donationId": "d1"}));
    }

    #[test]
    fn profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            name: Some("Asha".into()),
            ngo_name: Some("Helping Hands".into()),
            ..Default::default()
        };
        assert_eq!(
            update.fields(),
            vec![("name", "Asha".to_string()), ("ngoName", "Helping Hands".to_string())]
        );
    }
}
