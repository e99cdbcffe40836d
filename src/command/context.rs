//! Handler context: everything a command handler needs, threaded through
//! without each handler reaching into global state.

use std::sync::Arc;

use serde_json::Value;

use crate::broker::MessageBroker;
use crate::combat::CombatEngine;
use crate::connection::ConnectionManager;
use crate::follow::FollowCoordinator;
use crate::persistence::{NpcRuntime, Persistence, PrototypeRegistry};
use crate::subject::SubjectRegistry;

/// A handler's reply: text for the player plus optional structured data
/// (e.g. room drops for a UI overlay).
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub text: String,
    pub data: Option<Value>,
}

impl CommandOutcome {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: None,
        }
    }

    pub fn with_data(text: impl Into<String>, data: Value) -> Self {
        Self {
            text: text.into(),
            data: Some(data),
        }
    }
}

/// Shared service handles every handler may need.
#[derive(Clone)]
pub struct Services {
    pub persistence: Arc<dyn Persistence>,
    pub npc_runtime: Arc<dyn NpcRuntime>,
    pub prototype_registry: Arc<dyn PrototypeRegistry>,
    pub connections: Arc<ConnectionManager>,
    pub broker: Arc<MessageBroker>,
    pub subjects: Arc<SubjectRegistry>,
    pub combat: Arc<CombatEngine>,
    pub follow: Arc<FollowCoordinator>,
}

/// Per-invocation context: the authenticated player plus the shared
/// services.
pub struct CommandContext<'a> {
    pub player_id: &'a str,
    pub services: &'a Services,
    pub args: &'a [String],
}

impl<'a> CommandContext<'a> {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn joined_args(&self) -> String {
        self.args.join(" ")
    }
}
