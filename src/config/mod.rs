//! Configuration loading and management.
//!
//! Split into one submodule per component, the way the rest of the core is
//! organised:
//! - [`subject`]: Subject registry configuration (C1).
//! - [`connection`]: Connection manager rate limiting (C3).
//! - [`grace`]: Login grace-period duration (C3/C12).
//! - [`pending`]: Pending-message queue capacity (C3).
//! - [`combat`]: Combat engine timeouts (C8).
//! - [`command`]: Command pipeline limits (C5).
//! - [`auth`]: Authentication gate (C11).
//! - [`telemetry`]: Logging format and metrics/admin HTTP surface.

pub mod auth;
pub mod combat;
pub mod command;
pub mod connection;
mod defaults;
pub mod grace;
pub mod pending;
pub mod subject;
pub mod telemetry;
pub mod types;
pub mod validation;

pub use auth::AuthConfig;
pub use combat::CombatConfig;
pub use command::CommandConfig;
pub use connection::ConnectionConfig;
pub use grace::GraceConfig;
pub use pending::PendingConfig;
pub use subject::SubjectConfig;
pub use telemetry::TelemetryConfig;
pub use types::Config;
pub use validation::{validate, ValidationError};
