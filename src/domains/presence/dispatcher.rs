use crate::domains::logger::DynLogger;
use std::sync::Arc;

use super::events::ServerEvent;
use super::ports::SessionRegistry;

/// Delivers events to drivers by id, at most once.
///
/// A driver without a live session is treated as offline and the event is
/// dropped. Nothing is buffered or retried.
pub struct Dispatcher {
    sessions: Arc<dyn SessionRegistry>,
    logger: DynLogger,
}

impl Dispatcher {
    pub fn new(sessions: Arc<dyn SessionRegistry>, logger: DynLogger) -> Self {
        Self { sessions, logger }
    }

    /// Returns true if the event was queued on a live session.
    pub async fn send(&self, agent_id: &str, event: ServerEvent) -> bool {
        let name = event.event_name();
        match self.sessions.session_for(agent_id).await {
            Some(session) => {
                if session.deliver(event) {
                    true
                } else {
                    self.logger.debug(&format!(
                        "Dropped {} for driver {}: connection {} already closed",
                        name,
                        agent_id,
                        session.connection_id()
                    ));
                    false
                }
            }
            None => {
                self.logger
                    .debug(&format!("Dropped {} for offline driver {}", name, agent_id));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::{init_noop_logger, InMemorySessionRegistry};
    use crate::domains::presence::SessionHandle;

    #[tokio::test]
    async fn delivers_to_bound_session_and_drops_for_unknown() {
        let registry = Arc::new(InMemorySessionRegistry::new());
        let (session, mut rx) = SessionHandle::channel();
        registry.bind("driver1", session).await.unwrap();

        let dispatcher = Dispatcher::new(registry, init_noop_logger());
        assert!(dispatcher.send("driver1", ServerEvent::registered("driver1")).await);
        assert!(!dispatcher.send("ghost", ServerEvent::registered("ghost")).await);

        assert_eq!(rx.try_recv().unwrap(), ServerEvent::registered("driver1"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_session_is_a_silent_drop() {
        let registry = Arc::new(InMemorySessionRegistry::new());
        let (session, rx) = SessionHandle::channel();
        registry.bind("driver1", session).await.unwrap();
        drop(rx);

        let dispatcher = Dispatcher::new(registry, init_noop_logger());
        assert!(!dispatcher.send("driver1", ServerEvent::registered("driver1")).await);
    }
}
