use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::lenient;

/// Notification types the backend emits. Unknown types are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum NotificationKind {
    /// Donor: an NGO accepted the donation
    Accepted,
    /// Donor: the NGO says it picked the food up and asks for confirmation
    ConfirmPickup,
    /// Any role: stock is about to spoil
    SpoilWarning,
    /// NGO: an orphanage requested one of its stock items
    FoodRequest,
    RequestApproved,
    DeliveryConfirmed,
    RequestRejected,
    /// Orphanage: an NGO accepted the food request
    FoodRequestAccepted,
    /// Orphanage: food is on its way
    FoodIncoming,
    /// Orphanage: the NGO asks to confirm that the delivery arrived
    DeliveryConfirmRequest,
    Other(String),
}

impl From<String> for NotificationKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "accepted" => Self::Accepted,
            "confirm_pickup" => Self::ConfirmPickup,
            "spoil_warning" => Self::SpoilWarning,
            "food_request" => Self::FoodRequest,
            "request_approved" => Self::RequestApproved,
            "delivery_confirmed" => Self::DeliveryConfirmed,
            "request_rejected" => Self::RequestRejected,
            "food_request_accepted" => Self::FoodRequestAccepted,
            "food_incoming" => Self::FoodIncoming,
            "delivery_confirm_request" => Self::DeliveryConfirmRequest,
            _ => Self::Other(s),
        }
    }
}

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Info,
}

/// The one-click follow-up some notifications offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    ConfirmPickup,
    ApproveFoodRequest,
    ConfirmDelivery,
}

impl NotificationKind {
    pub fn tone(&self) -> Tone {
        match self {
            Self::Accepted
            | Self::RequestApproved
            | Self::DeliveryConfirmed
            | Self::FoodRequestAccepted => Tone::Success,
            Self::ConfirmPickup | Self::FoodRequest | Self::DeliveryConfirmRequest => {
                Tone::Warning
            }
            Self::SpoilWarning | Self::RequestRejected => Tone::Danger,
            Self::FoodIncoming | Self::Other(_) => Tone::Info,
        }
    }

    pub fn action(&self) -> Option<NotificationAction> {
        match self {
            Self::ConfirmPickup => Some(NotificationAction::ConfirmPickup),
            Self::FoodRequest => Some(NotificationAction::ApproveFoodRequest),
            Self::DeliveryConfirmRequest => Some(NotificationAction::ConfirmDelivery),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub actioned: bool,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub donation_id: Option<String>,
    /// Free-form references (`donationId`, `orphanageId`, `itemIndex`, ...)
    #[serde(default)]
    pub metadata: Value,
}

impl Notification {
    /// Action still waiting on the user, if any.
    pub fn pending_action(&self) -> Option<NotificationAction> {
        if self.actioned || self.confirmed {
            return None;
        }
        self.kind.action()
    }

    /// Donation this notification is about, from the top-level field or the metadata.
    pub fn donation_id(&self) -> Option<&str> {
        self.donation_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.metadata_str("donationId"))
    }

    pub fn orphanage_id(&self) -> Option<&str> {
        self.metadata_str("orphanageId")
    }

    pub fn item_index(&self) -> Option<usize> {
        match self.metadata.get("itemIndex")? {
            Value::Number(n) => n.as_u64().map(|n| n as usize),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Notification {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn pending_action_clears_once_actioned() {
        let n = parse(r#"{"_id": "n1", "type": "food_request", "metadata": {"orphanageId": "o1"}}"#);
        assert_eq!(n.pending_action(), Some(NotificationAction::ApproveFoodRequest));
        assert_eq!(n.orphanage_id(), Some("o1"));

        let n = parse(r#"{"_id": "n2", "type": "confirm_pickup", "confirmed": true}"#);
        assert_eq!(n.pending_action(), None);
    }

    #[test]
    fn donation_id_falls_back_to_metadata() {
        let n = parse(
            r#"{"_id": "n3", "type": "delivery_confirm_request",
                "metadata": {"donationId": "d9", "itemIndex": "1"}}"#,
        );
        assert_eq!(n.donation_id(), Some("d9"));
        assert_eq!(n.item_index(), Some(1));
    }

    #[test]
    fn unknown_types_are_kept() {
        let n = parse(r#"{"type": "weekly_digest", "message": "hi"}"#);
        assert_eq!(n.kind, NotificationKind::Other("weekly_digest".into()));
        assert_eq!(n.kind.tone(), Tone::Info);
        assert_eq!(n.pending_action(), None);
    }
}
