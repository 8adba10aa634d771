// Presence Service - wires stores, logger and transport around the coordinator
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use crate::adapters::inbound::create_router;
use crate::adapters::outbound::{H3GeoIndex, InMemorySessionRegistry};
use crate::common::{ApplicationError, ApplicationResult};
use crate::config::Config;
use crate::domains::logger::DynLogger;
use crate::domains::presence::{GeoIndex, PresenceCoordinator, SessionRegistry};

/// Which adapter backs the position index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeoBackend {
    #[default]
    Memory,
    Redis,
}

impl FromStr for GeoBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "h3" => Ok(GeoBackend::Memory),
            "redis" => Ok(GeoBackend::Redis),
            other => Err(format!("unknown geo backend '{}', expected 'memory' or 'redis'", other)),
        }
    }
}

impl fmt::Display for GeoBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoBackend::Memory => write!(f, "memory"),
            GeoBackend::Redis => write!(f, "redis"),
        }
    }
}

pub struct PresenceService {
    coordinator: Arc<PresenceCoordinator>,
}

impl PresenceService {
    pub fn new(coordinator: Arc<PresenceCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Build the coordinator over the configured stores.
    pub async fn from_config(config: &Config, backend: GeoBackend, logger: DynLogger) -> ApplicationResult<Self> {
        config.validate()?;
        let geo_index = build_geo_index(config, backend).await?;
        let sessions: Arc<dyn SessionRegistry> = Arc::new(InMemorySessionRegistry::new());
        let coordinator = PresenceCoordinator::new(geo_index, sessions, logger, config.presence.nearby_distance_m);
        Ok(Self::new(Arc::new(coordinator)))
    }

    pub fn coordinator(&self) -> Arc<PresenceCoordinator> {
        self.coordinator.clone()
    }

    /// Serve HTTP and WebSocket traffic on `listener` until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: tokio::net::TcpListener, shutdown: F) -> ApplicationResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_router(self.coordinator());
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ApplicationError::Transport(e.to_string()))
    }
}

async fn build_geo_index(config: &Config, backend: GeoBackend) -> ApplicationResult<Arc<dyn GeoIndex>> {
    match backend {
        GeoBackend::Memory => {
            let index = H3GeoIndex::from_level(config.presence.h3_resolution)?;
            Ok(Arc::new(index))
        }
        #[cfg(feature = "redis-backend")]
        GeoBackend::Redis => {
            let index = crate::adapters::outbound::RedisGeoIndex::connect(&config.redis).await?;
            Ok(Arc::new(index))
        }
        #[cfg(not(feature = "redis-backend"))]
        GeoBackend::Redis => Err(ApplicationError::Backend(
            "redis backend requested but this build lacks the `redis-backend` feature".to_string(),
        )),
    }
}
