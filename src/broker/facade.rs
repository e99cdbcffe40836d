//! Message broker facade (C2): publish envelopes on a subject and fan them
//! out to in-process subscribers, with an optional best-effort external
//! forwarding path.
//!
//! Grounded in `examples/original_source/server/real_time.py`'s
//! `ConnectionManager` (sequence counter, room/global broadcast, pending
//! delivery) and the teacher's `tokio::sync::broadcast`-based fan-out idiom,
//! reshaped here around explicit wildcard subscriptions rather than a fixed
//! set of channels.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::warn;

use crate::error::{ExternalError, SubjectError};
use crate::subject::SubjectRegistry;

use super::matching::subscription_matches;
use super::types::Envelope;

type Callback = Box<dyn Fn(&Envelope) + Send + Sync>;

/// Forwards envelopes to a collaborator outside this process. Forwarding
/// failures are logged and never block local delivery.
#[async_trait]
pub trait ExternalBus: Send + Sync {
    async fn forward(&self, envelope: &Envelope) -> Result<(), ExternalError>;
}

struct Subscriber {
    pattern: String,
    callback: Callback,
}

/// A live subscription. Unsubscribes when dropped.
pub struct SubscriptionHandle {
    id: u64,
    broker: Weak<MessageBroker>,
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(broker) = self.broker.upgrade() {
            broker.subscribers.remove(&self.id);
        }
    }
}

pub struct MessageBroker {
    registry: Arc<SubjectRegistry>,
    subscribers: DashMap<u64, Subscriber>,
    next_subscriber_id: AtomicU64,
    sequence: AtomicU64,
    external_bus: Option<Arc<dyn ExternalBus>>,
}

impl MessageBroker {
    pub fn new(registry: Arc<SubjectRegistry>, external_bus: Option<Arc<dyn ExternalBus>>) -> Arc<Self> {
        Arc::new(Self {
            registry,
            subscribers: DashMap::new(),
            next_subscriber_id: AtomicU64::new(0),
            sequence: AtomicU64::new(0),
            external_bus,
        })
    }

    /// Subscribe a callback to every subject matching `pattern`. The
    /// returned handle unsubscribes on drop.
    pub fn subscribe(
        self: &Arc<Self>,
        pattern: impl Into<String>,
        callback: impl Fn(&Envelope) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(
            id,
            Subscriber {
                pattern: pattern.into(),
                callback: Box::new(callback),
            },
        );
        SubscriptionHandle {
            id,
            broker: Arc::downgrade(self),
        }
    }

    /// Validate `subject` through the subject registry, stamp it, and
    /// deliver to every matching subscriber. Forwards best-effort to the
    /// external bus if one is configured.
    pub async fn publish(&self, subject: &str, payload: Value) -> Result<Envelope, SubjectError> {
        self.publish_excluding(subject, payload, None).await
    }

    /// Like [`publish`](Self::publish), but stamps the envelope with a
    /// player id that subscribers are expected to skip delivering to
    /// themselves — used by the connection manager's room broadcasts.
    pub async fn publish_excluding(
        &self,
        subject: &str,
        payload: Value,
        exclude_player_id: Option<String>,
    ) -> Result<Envelope, SubjectError> {
        if !self.registry.validate(subject) {
            return Err(SubjectError::InvalidValue(subject.to_string()));
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let (player_id, room_id) = self.registry.scope_ids(subject);
        let mut envelope = Envelope::new(subject, sequence, payload);
        envelope.player_id = player_id;
        envelope.room_id = room_id;
        envelope.exclude_player_id = exclude_player_id;

        for entry in self.subscribers.iter() {
            if subscription_matches(&entry.value().pattern, &envelope.subject) {
                (entry.value().callback)(&envelope);
            }
        }

        if let Some(bus) = &self.external_bus {
            if let Err(e) = bus.forward(&envelope).await {
                warn!(subject = %envelope.subject, error = %e, "external bus forward failed");
            }
        }

        Ok(envelope)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn broker() -> Arc<MessageBroker> {
        let config = crate::config::SubjectConfig::default();
        MessageBroker::new(Arc::new(SubjectRegistry::new(&config)), None)
    }

    #[tokio::test]
    async fn publish_rejects_unregistered_subject() {
        let broker = broker();
        let err = broker
            .publish("not.a.real.subject.shape.at.all", Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_value");
    }

    #[tokio::test]
    async fn publish_delivers_to_matching_wildcard_subscriber() {
        let broker = broker();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        let _handle = broker.subscribe("chat.say.room.*", move |envelope| {
            received_clone.lock().unwrap().push(envelope.subject.clone());
        });

        broker
            .publish("chat.say.room.arkham_1", serde_json::json!({"text": "hello"}))
            .await
            .unwrap();

        assert_eq!(received.lock().unwrap().as_slice(), ["chat.say.room.arkham_1"]);
    }

    #[tokio::test]
    async fn publish_stamps_increasing_sequence_numbers() {
        let broker = broker();
        let first = broker.publish("chat.global", Value::Null).await.unwrap();
        let second = broker.publish("chat.global", Value::Null).await.unwrap();
        assert!(second.sequence > first.sequence);
    }

    #[tokio::test]
    async fn dropping_the_handle_unsubscribes() {
        let broker = broker();
        let handle = broker.subscribe("chat.global", |_| {});
        assert_eq!(broker.subscriber_count(), 1);
        drop(handle);
        assert_eq!(broker.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn published_envelope_carries_event_kind_and_room_id() {
        let broker = broker();
        let envelope = broker
            .publish("chat.say.room.arkham_1", Value::Null)
            .await
            .unwrap();

        assert_eq!(envelope.event_kind, "say");
        assert_eq!(envelope.room_id.as_deref(), Some("arkham_1"));
        assert_eq!(envelope.player_id, None);
    }

    #[tokio::test]
    async fn published_envelope_carries_player_id_for_player_scoped_subjects() {
        let broker = broker();
        let envelope = broker
            .publish("combat.dp_update.alice", Value::Null)
            .await
            .unwrap();

        assert_eq!(envelope.player_id.as_deref(), Some("alice"));
        assert_eq!(envelope.room_id, None);
    }

    #[tokio::test]
    async fn tail_wildcard_subscriber_receives_every_event_subject() {
        let broker = broker();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        let _handle = broker.subscribe("events.>", move |envelope| {
            received_clone.lock().unwrap().push(envelope.subject.clone());
        });

        broker
            .publish("events.game_tick", Value::Null)
            .await
            .unwrap();
        broker
            .publish(
                "events.player_entered.arkham_1",
                Value::Null,
            )
            .await
            .unwrap();

        assert_eq!(
            received.lock().unwrap().as_slice(),
            ["events.game_tick", "events.player_entered.arkham_1"]
        );
    }
}
