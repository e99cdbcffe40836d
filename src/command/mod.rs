//! Command pipeline (C5): gate, sanitise, parse, and dispatch a raw input
//! line to a verb-indexed handler table.

mod alias;
mod context;
mod gate;
mod handlers;
mod parse;
mod registry;
mod sanitise;

pub use context::{CommandContext, CommandOutcome, Services};
pub use handlers::Handler;
pub use registry::Registry;
