//! Session lifecycle (C12): composes the authentication gate with the
//! connection manager. A transport becomes a live session only after its
//! token validates and its character resolves.

use std::sync::Arc;

use crate::auth::AuthGate;
use crate::connection::{ConnectionManager, DisconnectReason, Transport};
use crate::domain::Player;
use crate::error::{CoreError, ExternalError, PolicyError};
use crate::persistence::Persistence;

pub struct SessionLifecycle {
    connections: Arc<ConnectionManager>,
    auth: Arc<AuthGate>,
    persistence: Arc<dyn Persistence>,
}

impl SessionLifecycle {
    pub fn new(
        connections: Arc<ConnectionManager>,
        auth: Arc<AuthGate>,
        persistence: Arc<dyn Persistence>,
    ) -> Self {
        Self {
            connections,
            auth,
            persistence,
        }
    }

    /// Validate `token`, resolve the player it names, and install a live
    /// session for `transport`. Returns the session id and the resolved
    /// player so the caller can send an initial room render.
    pub async fn begin(
        &self,
        source: &str,
        token: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<(String, Player), CoreError> {
        let user = self.auth.validate_session_token(source, token).await?;

        let player = self
            .persistence
            .get_player_by_id(&user.user_id)
            .await?
            .ok_or(PolicyError::Unauthenticated)?;

        let session_id = self
            .connections
            .connect(transport, &player.id, &player.current_room_id)
            .await?;

        Ok((session_id, player))
    }

    /// Tear down a session on transport closure.
    pub async fn end(&self, session_id: &str, reason: DisconnectReason) {
        self.connections.disconnect(session_id, reason).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, ConnectionConfig, GraceConfig, PendingConfig, SubjectConfig};
    use crate::domain::{Container, Room};
    use async_trait::async_trait;
    use dashmap::DashMap;
    use std::sync::Mutex;

    struct FakePersistence {
        players: DashMap<String, Player>,
    }

    fn player(id: &str, room_id: &str) -> Player {
        Player {
            id: id.to_string(),
            name: id.to_string(),
            current_room_id: room_id.to_string(),
            hit_points: 10,
            max_hit_points: 10,
            lucidity: 10,
            max_lucidity: 10,
            dexterity: 10,
            xp: 0,
            equipment: Default::default(),
            inventory: Vec::new(),
            is_admin: false,
        }
    }

    #[async_trait]
    impl Persistence for FakePersistence {
        async fn get_player_by_id(&self, player_id: &str) -> Result<Option<Player>, ExternalError> {
            Ok(self.players.get(player_id).map(|p| p.clone()))
        }
        async fn get_player_by_name(&self, _name: &str) -> Result<Option<Player>, ExternalError> {
            Ok(None)
        }
        async fn save_player(&self, _player: &Player) -> Result<(), ExternalError> {
            Ok(())
        }
        async fn get_room_by_id(&self, _room_id: &str) -> Result<Option<Room>, ExternalError> {
            Ok(None)
        }
        async fn save_room(&self, _room: &Room) -> Result<(), ExternalError> {
            Ok(())
        }
        async fn get_players_in_room(&self, _room_id: &str) -> Result<Vec<Player>, ExternalError> {
            Ok(Vec::new())
        }
        async fn get_containers_by_room_id(
            &self,
            _room_id: &str,
        ) -> Result<Vec<Container>, ExternalError> {
            Ok(Vec::new())
        }
        async fn get_container(&self, _container_id: &str) -> Result<Option<Container>, ExternalError> {
            Ok(None)
        }
        async fn get_profession_by_id(
            &self,
            _profession_id: &str,
        ) -> Result<Option<String>, ExternalError> {
            Ok(None)
        }
    }

    struct TestTransport {
        received: Mutex<Vec<crate::broker::Envelope>>,
    }

    impl TestTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                received: Mutex::new(Vec::new()),
            })
        }
    }

    impl Transport for TestTransport {
        fn send(&self, envelope: &crate::broker::Envelope) {
            self.received.lock().unwrap().push(envelope.clone());
        }
    }

    fn lifecycle(players: Vec<Player>) -> SessionLifecycle {
        let subject_config = SubjectConfig::default();
        let registry = Arc::new(crate::subject::SubjectRegistry::new(&subject_config));
        let broker = crate::broker::MessageBroker::new(registry.clone(), None);
        let connections = Arc::new(ConnectionManager::new(
            broker,
            registry,
            &ConnectionConfig::default(),
            &GraceConfig::default(),
            &PendingConfig::default(),
        ));

        let map = DashMap::new();
        for p in players {
            map.insert(p.id.clone(), p);
        }
        let persistence: Arc<dyn Persistence> = Arc::new(FakePersistence { players: map });
        let auth = Arc::new(AuthGate::new(&AuthConfig::default(), persistence.clone()));

        SessionLifecycle::new(connections, auth, persistence)
    }

    #[tokio::test]
    async fn valid_token_installs_a_session_for_the_named_player() {
        let lc = lifecycle(vec![player("hero", "arkham_1")]);
        let token = lc.auth.issue_session_token("hero");

        let (session_id, resolved) = lc
            .begin("127.0.0.1", &token, TestTransport::new())
            .await
            .unwrap();

        assert_eq!(resolved.id, "hero");
        assert!(!session_id.is_empty());
        assert!(lc.connections.is_connected("hero"));
    }

    #[tokio::test]
    async fn unknown_player_is_rejected_even_with_a_valid_signature() {
        let lc = lifecycle(vec![]);
        let token = lc.auth.issue_session_token("ghost");

        let err = lc
            .begin("127.0.0.1", &token, TestTransport::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "unauthenticated");
    }

    #[tokio::test]
    async fn ending_a_session_releases_the_connection() {
        let lc = lifecycle(vec![player("hero", "arkham_1")]);
        let token = lc.auth.issue_session_token("hero");
        let (session_id, _) = lc
            .begin("127.0.0.1", &token, TestTransport::new())
            .await
            .unwrap();

        lc.end(&session_id, DisconnectReason::Explicit).await;
        assert!(!lc.connections.is_connected("hero"));
    }
}
