//! Connection manager: live sessions, session uniqueness, grace periods.

mod manager;
mod types;

pub use manager::ConnectionManager;
pub use types::{DisconnectReason, EvictionOutcome, GraceRecord, PendingQueue, Session, Transport};
