use crate::common::{ApplicationError, ApplicationResult, DomainError, DomainResult};
use crate::config::RedisConfig;
use crate::domains::presence::{GeoHit, GeoIndex, Position};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

/// Position index stored in a Redis GEO sorted set.
///
/// Redis accepts latitudes only within roughly +/-85.05 degrees; writes
/// outside that band fail with an internal error.
#[derive(Clone)]
pub struct RedisGeoIndex {
    connection: MultiplexedConnection,
    key: String,
}

impl RedisGeoIndex {
    pub async fn connect(config: &RedisConfig) -> ApplicationResult<Self> {
        let client = redis::Client::open(config.url())
            .map_err(|e| ApplicationError::Backend(format!("Invalid Redis address: {}", e)))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ApplicationError::Backend(format!("Failed to connect to Redis: {}", e)))?;
        tracing::info!("Connected to Redis at {}:{}", config.host, config.port);
        Ok(Self {
            connection,
            key: config.key.clone(),
        })
    }
}

fn internal(op: &str, e: redis::RedisError) -> DomainError {
    DomainError::InternalFailure(format!("Redis {} failed: {}", op, e))
}

#[async_trait]
impl GeoIndex for RedisGeoIndex {
    async fn upsert(&self, agent_id: &str, position: Position) -> DomainResult<()> {
        let mut conn = self.connection.clone();
        let _: i64 = redis::cmd("GEOADD")
            .arg(&self.key)
            .arg(position.longitude)
            .arg(position.latitude)
            .arg(agent_id)
            .query_async(&mut conn)
            .await
            .map_err(|e| internal("GEOADD", e))?;
        Ok(())
    }

    async fn remove(&self, agent_id: &str) -> DomainResult<()> {
        let mut conn = self.connection.clone();
        let _: i64 = redis::cmd("ZREM")
            .arg(&self.key)
            .arg(agent_id)
            .query_async(&mut conn)
            .await
            .map_err(|e| internal("ZREM", e))?;
        Ok(())
    }

    async fn query_radius(&self, center: Position, radius_m: f64) -> DomainResult<Vec<GeoHit>> {
        let mut conn = self.connection.clone();
        let rows: Vec<(String, (f64, f64))> = redis::cmd("GEOSEARCH")
            .arg(&self.key)
            .arg("FROMLONLAT")
            .arg(center.longitude)
            .arg(center.latitude)
            .arg("BYRADIUS")
            .arg(radius_m.max(0.0))
            .arg("m")
            .arg("ASC")
            .arg("WITHCOORD")
            .query_async(&mut conn)
            .await
            .map_err(|e| internal("GEOSEARCH", e))?;

        Ok(rows
            .into_iter()
            .map(|(agent_id, (longitude, latitude))| GeoHit {
                agent_id,
                position: Position { latitude, longitude },
            })
            .collect())
    }
}
