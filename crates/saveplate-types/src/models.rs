use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lenient;

// -- Roles --

/// The three kinds of account the platform knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Ngo,
    Orphanage,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::Donor, Role::Ngo, Role::Orphanage];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Donor => "donor",
            Role::Ngo => "ngo",
            Role::Orphanage => "orphanage",
        }
    }

    /// Root path of the role's dashboard.
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Donor => "/donor-dashboard",
            Role::Ngo => "/ngo-dashboard",
            Role::Orphanage => "/orphanage-dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "donor" => Ok(Role::Donor),
            "ngo" => Ok(Role::Ngo),
            "orphanage" => Ok(Role::Orphanage),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

// -- Users --

/// Profile of any account. Which name field is filled depends on the role.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ngo_name: Option<String>,
    #[serde(default)]
    pub orphanage_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub donor_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::serves")]
    pub children_count: u32,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }

    /// Role-specific name first, then the generic one.
    pub fn display_name(&self) -> Option<&str> {
        self.ngo_name
            .as_deref()
            .or(self.orphanage_name.as_deref())
            .or(self.name.as_deref())
            .filter(|n| !n.is_empty())
    }

    /// Absolute URL of the profile picture. Relative paths are served by the API host.
    pub fn profile_pic_url(&self, api_base: &str) -> Option<String> {
        let pic = self.profile_pic.as_deref().filter(|p| !p.is_empty())?;
        if pic.starts_with("http") {
            Some(pic.to_string())
        } else {
            Some(format!(
                "{}/{}",
                api_base.trim_end_matches('/'),
                pic.trim_start_matches('/')
            ))
        }
    }
}

/// A reference that the backend may or may not have populated.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Profile(Box<UserProfile>),
}

impl UserRef {
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            UserRef::Profile(p) => Some(p),
            UserRef::Id(_) => None,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.profile().and_then(UserProfile::display_name)
    }
}

// -- Donations --

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::serves")]
    pub serves: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DonationStatus {
    #[default]
    Pending,
    Accepted,
    Completed,
    Other(String),
}

impl From<String> for DonationStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "accepted" => Self::Accepted,
            "completed" => Self::Completed,
            _ => Self::Other(s),
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Accepted => f.write_str("accepted"),
            Self::Completed => f.write_str("completed"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// Where a donation stands from the receiving orphanage's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum OrphanageStatus {
    Upcoming,
    Received,
    Other(String),
}

impl From<String> for OrphanageStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "upcoming" => Self::Upcoming,
            "received" => Self::Received,
            _ => Self::Other(s),
        }
    }
}

/// Delivery of a redirected donation from the NGO to an orphanage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DeliveryStatus {
    Pending,
    AwaitingConfirmation,
    Delivered,
    Other(String),
}

impl From<String> for DeliveryStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "awaiting_confirmation" => Self::AwaitingConfirmation,
            "delivered" => Self::Delivered,
            _ => Self::Other(s),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::AwaitingConfirmation => f.write_str("awaiting confirmation"),
            Self::Delivered => f.write_str("delivered"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// One item of a donation that the NGO passed on to an orphanage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonatedItem {
    #[serde(default, deserialize_with = "lenient::index")]
    pub item_index: Option<usize>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub orphanage: Option<UserRef>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub delivered_at: Option<DateTime<Utc>>,
    /// `"delivered"` once the orphanage confirmed receipt
    #[serde(default)]
    pub status: Option<String>,
}

impl DonatedItem {
    pub fn is_delivered(&self) -> bool {
        self.status.as_deref() == Some("delivered")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub items: Vec<FoodItem>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub donation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub best_before: Option<String>,
    #[serde(default)]
    pub status: DonationStatus,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub donor: Option<UserRef>,
    #[serde(default)]
    pub accepted_by: Option<UserRef>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub donated_items: Vec<DonatedItem>,
    #[serde(default)]
    pub orphanage_status: Option<OrphanageStatus>,
    #[serde(default)]
    pub my_donated_items: Vec<DonatedItem>,
    #[serde(default)]
    pub delivery_status: Option<DeliveryStatus>,
    #[serde(default)]
    pub delivery_to: Option<UserRef>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub donated_at: Option<DateTime<Utc>>,
}

impl Donation {
    /// Total serves. Summed wide so many large items cannot overflow.
    pub fn serves(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.serves)).sum()
    }

    pub fn food_names(&self) -> String {
        self.items
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// -- Stock --

/// A single undonated item from a completed donation, flattened by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub donation_id: String,
    pub item_index: usize,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::serves")]
    pub serves: u32,
    #[serde(default)]
    pub best_before: Option<String>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl StockItem {
    /// Stable key of the `(donation, item)` pair.
    pub fn key(&self) -> String {
        format!("{}_{}", self.donation_id, self.item_index)
    }
}

/// An NGO together with the stock an orphanage can request from it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NgoStock {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub ngo_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stock: Vec<StockItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn donation_tolerates_partial_records() {
        let d: Donation = serde_json::from_str(
            r#"{
                "_id": "d1",
                "items": [{"name": "Rice", "serves": "10"}, {"name": "Dal"}],
                "status": "archived",
                "donor": "u1",
                "acceptedBy": {"_id": "n1", "ngoName": "Helping Hands"},
                "donationDate": "2026-05-04T08:30:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(d.serves(), 10);
        assert_eq!(d.status, DonationStatus::Other("archived".into()));
        assert!(matches!(d.donor, Some(UserRef::Id(ref id)) if id == "u1"));
        assert_eq!(
            d.accepted_by.as_ref().and_then(UserRef::display_name),
            Some("Helping Hands")
        );
        assert_eq!(d.food_names(), "Rice, Dal");
    }

    #[test]
    fn serves_total_does_not_overflow() {
        let d: Donation = serde_json::from_str(
            r#"{"items": [{"serves": "4000000000"}, {"serves": "1000000000"}]}"#,
        )
        .unwrap();
        assert_eq!(d.serves(), 5_000_000_000);
    }

    #[test]
    fn profile_pic_url_joins_relative_paths() {
        let mut p = UserProfile {
            profile_pic: Some("uploads/a.png".into()),
            ..Default::default()
        };
        assert_eq!(
            p.profile_pic_url("http://localhost:5000/").as_deref(),
            Some("http://localhost:5000/uploads/a.png")
        );
        p.profile_pic = Some("https://cdn.example.com/a.png".into());
        assert_eq!(
            p.profile_pic_url("http://localhost:5000").as_deref(),
            Some("https://cdn.example.com/a.png")
        );
    }

    #[test]
    fn stock_item_key_combines_donation_and_index() {
        let item: StockItem =
            serde_json::from_str(r#"{"donationId": "abc", "itemIndex": 2, "name": "Roti"}"#)
                .unwrap();
        assert_eq!(item.key(), "abc_2");
    }
}
