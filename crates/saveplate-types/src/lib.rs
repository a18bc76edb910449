//! Wire types shared by the Save the Plate client crates.
//!
//! Every entity here is owned by the backend. Deserialization is lenient:
//! unknown fields are ignored and most fields are optional, since the
//! backend returns populated references in some endpoints and bare ids in
//! others.

pub mod api;
pub mod models;
pub mod notifications;
mod lenient;

pub use models::{
    DeliveryStatus, DonatedItem, Donation, DonationStatus, FoodItem, NgoStock, OrphanageStatus,
    Role, StockItem, UnknownRole, UserProfile, UserRef,
};
pub use notifications::{Notification, NotificationAction, NotificationKind, Tone};
