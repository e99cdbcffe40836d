//! Message broker facade: publish/subscribe fan-out over validated subjects.

mod facade;
mod matching;
mod types;

pub use facade::{ExternalBus, MessageBroker, SubscriptionHandle};
pub use matching::subscription_matches;
pub use types::Envelope;
