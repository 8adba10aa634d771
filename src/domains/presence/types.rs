use crate::common::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::ServerEvent;

/// Client-chosen driver identity. Never empty once it reaches the stores.
pub type AgentId = String;

/// WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Build a position, rejecting coordinates outside [-90, 90] x [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> DomainResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::out_of_range(format!(
                "Invalid coordinates: latitude {} outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::out_of_range(format!(
                "Invalid coordinates: longitude {} outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self { latitude, longitude })
    }
}

/// One row returned from a radius query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoHit {
    pub agent_id: AgentId,
    pub position: Position,
}

/// Server-assigned identity of a live connection, independent of the driver id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Addressable handle for one connected client.
///
/// Delivery is a non-blocking push onto the connection's outbound queue; the
/// transport drains that queue on its own task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    connection_id: ConnectionId,
    outbound: mpsc::UnboundedSender<ServerEvent>,
}

impl SessionHandle {
    pub fn new(outbound: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            connection_id: ConnectionId::new(),
            outbound,
        }
    }

    /// Create a handle together with the receiving end of its outbound queue.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Queue an event for this session. Returns false if the peer is gone.
    pub fn deliver(&self, event: ServerEvent) -> bool {
        self.outbound.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds_and_zero() {
        assert!(Position::new(90.0, 180.0).is_ok());
        assert!(Position::new(-90.0, -180.0).is_ok());
        assert!(Position::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(Position::new(91.0, 0.0).unwrap_err().code(), "out_of_range");
        assert_eq!(Position::new(0.0, 181.0).unwrap_err().code(), "out_of_range");
        assert!(Position::new(f64::NAN, 0.0).is_err());
        assert!(Position::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn deliver_reports_closed_peer() {
        let (session, rx) = SessionHandle::channel();
        drop(rx);
        assert!(session.is_closed());
        assert!(!session.deliver(ServerEvent::registered("d1")));
    }
}
