//! Session tokens and the authentication gate (C11).

mod gate;
mod token;

pub use gate::{AuthGate, AuthenticatedUser};
pub use token::{validate, SessionClaims, TokenError};
