use crate::common::DomainError;
use std::sync::Arc;

use super::coordinator::PresenceCoordinator;
use super::events::{ClientEvent, FrameRejection, RequestKind, ServerEvent};
use super::types::{AgentId, SessionHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unregistered,
    Registered { agent_id: AgentId },
    Closed,
}

/// Per-connection state machine. Feed it one inbound event at a time, in
/// arrival order; replies go to this connection's own session.
pub struct Connection {
    coordinator: Arc<PresenceCoordinator>,
    session: SessionHandle,
    state: ConnectionState,
}

impl Connection {
    pub fn new(coordinator: Arc<PresenceCoordinator>, session: SessionHandle) -> Self {
        Self {
            coordinator,
            session,
            state: ConnectionState::Unregistered,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Decode one text frame and handle it. A frame that cannot be decoded is
    /// answered with an error in the category of the event it named, or a
    /// protocol error; the connection stays usable.
    pub async fn handle_frame(&mut self, frame: &str) {
        if self.state == ConnectionState::Closed {
            return;
        }
        match ClientEvent::from_frame(frame) {
            Ok(event) => self.handle(event).await,
            Err(FrameRejection::Protocol(e)) => self.report(RequestKind::Protocol, &e),
            Err(FrameRejection::Register(e)) => {
                self.session.deliver(ServerEvent::registration_failed(&e));
            }
            Err(FrameRejection::Request(kind, e)) => self.report(kind, &e),
        }
    }

    pub async fn handle(&mut self, event: ClientEvent) {
        if self.state == ConnectionState::Closed {
            return;
        }
        match event {
            ClientEvent::Register(req) => match self.coordinator.register(&self.session, &req).await {
                Ok(agent_id) => {
                    self.session.deliver(ServerEvent::registered(&agent_id));
                    self.state = ConnectionState::Registered { agent_id };
                }
                Err(e) => {
                    self.session.deliver(ServerEvent::registration_failed(&e));
                }
            },
            ClientEvent::UpdateLocation(req) => {
                if let Err(e) = self.coordinator.update_location(&req).await {
                    self.report(RequestKind::LocationUpdate, &e);
                }
            }
            ClientEvent::DrowsyAlert(req) => {
                if let Err(e) = self.coordinator.drowsy_alert(&req).await {
                    self.report(RequestKind::DrowsyAlert, &e);
                }
            }
        }
    }

    /// Move to `Closed` and release this connection's binding. Safe to call
    /// more than once.
    pub async fn disconnect(&mut self) -> Option<AgentId> {
        if self.state == ConnectionState::Closed {
            return None;
        }
        self.state = ConnectionState::Closed;
        self.coordinator.disconnect(self.session.connection_id()).await
    }

    fn report(&self, kind: RequestKind, error: &DomainError) {
        self.session.deliver(ServerEvent::error(kind, error));
    }
}
