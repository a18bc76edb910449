//! Client-side rules of the Save the Plate platform: freshness countdown,
//! dashboard aggregation, session bootstrap and local persistence.
//!
//! Nothing in this crate performs network I/O.

pub mod forms;
pub mod freshness;
pub mod prefs;
pub mod session;
pub mod stats;
pub mod storage;

pub use freshness::{Freshness, Urgency};
pub use session::{Route, Session, SessionContext, TokenError};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoreError};
