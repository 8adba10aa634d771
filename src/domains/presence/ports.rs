use crate::common::DomainResult;
use async_trait::async_trait;

use super::types::{AgentId, ConnectionId, GeoHit, Position, SessionHandle};

/// Port for the live position index. Adapters: in-process H3 buckets, Redis GEO.
///
/// Inputs are assumed valid; coordinate checks happen before a call reaches
/// the index.
#[async_trait]
pub trait GeoIndex: Send + Sync {
    /// Insert or overwrite the position of `agent_id`.
    async fn upsert(&self, agent_id: &str, position: Position) -> DomainResult<()>;

    /// Delete `agent_id`. Absent ids are not an error.
    async fn remove(&self, agent_id: &str) -> DomainResult<()>;

    /// Every indexed agent within `radius_m` great-circle meters of `center`,
    /// nearest first. The agent sitting at `center` is included if indexed.
    async fn query_radius(&self, center: Position, radius_m: f64) -> DomainResult<Vec<GeoHit>>;
}

/// Port for agent id <-> connection bookkeeping.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Make `session` the authoritative session for `agent_id`, replacing any
    /// earlier one, and remember which id the session owns.
    async fn bind(&self, agent_id: &str, session: SessionHandle) -> DomainResult<()>;

    async fn session_for(&self, agent_id: &str) -> Option<SessionHandle>;

    /// Drop the bindings owned by `connection_id`. Returns the agent id only if
    /// this connection was still its authoritative session; a binding taken
    /// over by another connection is left untouched.
    async fn unbind_by_session(&self, connection_id: ConnectionId) -> DomainResult<Option<AgentId>>;

    /// Number of agent ids currently bound.
    async fn len(&self) -> usize;
}
