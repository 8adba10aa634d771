use crate::common::DomainResult;
use crate::domains::presence::{AgentId, ConnectionId, SessionHandle, SessionRegistry};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Bindings {
    by_agent: HashMap<AgentId, SessionHandle>,
    by_connection: HashMap<ConnectionId, AgentId>,
}

/// In-memory session registry. Forward and reverse maps live under one lock
/// so a bind and an unbind never observe each other half-done.
#[derive(Debug, Default)]
pub struct InMemorySessionRegistry {
    bindings: RwLock<Bindings>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(Bindings::default()),
        }
    }

    /// Agent id this connection currently claims, whether or not it is still
    /// the authoritative session for it.
    pub async fn agent_for(&self, connection_id: ConnectionId) -> Option<AgentId> {
        self.bindings
            .read()
            .await
            .by_connection
            .get(&connection_id)
            .cloned()
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn bind(&self, agent_id: &str, session: SessionHandle) -> DomainResult<()> {
        let mut bindings = self.bindings.write().await;
        bindings
            .by_connection
            .insert(session.connection_id(), agent_id.to_string());
        bindings.by_agent.insert(agent_id.to_string(), session);
        Ok(())
    }

    async fn session_for(&self, agent_id: &str) -> Option<SessionHandle> {
        self.bindings.read().await.by_agent.get(agent_id).cloned()
    }

    async fn unbind_by_session(&self, connection_id: ConnectionId) -> DomainResult<Option<AgentId>> {
        let mut bindings = self.bindings.write().await;
        let Some(agent_id) = bindings.by_connection.remove(&connection_id) else {
            return Ok(None);
        };

        let owns = bindings
            .by_agent
            .get(&agent_id)
            .map(|s| s.connection_id() == connection_id)
            .unwrap_or(false);
        if owns {
            bindings.by_agent.remove(&agent_id);
            Ok(Some(agent_id))
        } else {
            Ok(None)
        }
    }

    async fn len(&self) -> usize {
        self.bindings.read().await.by_agent.len()
    }
}
