use crate::common::{DomainError, DomainResult};
use crate::domains::logger::DynLogger;
use chrono::Utc;
use std::sync::Arc;

use super::dispatcher::Dispatcher;
use super::events::{AlertEvent, DrowsyAlertRequest, LocationUpdateRequest, RegisterRequest, ServerEvent};
use super::ports::{GeoIndex, SessionRegistry};
use super::types::{AgentId, ConnectionId, Position, SessionHandle};

/// Fan-out radius used when none is configured.
pub const DEFAULT_NEARBY_DISTANCE_M: f64 = 500.0;

/// Validated `update_location` request.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationUpdate {
    pub agent_id: AgentId,
    pub position: Position,
}

impl TryFrom<&LocationUpdateRequest> for LocationUpdate {
    type Error = DomainError;

    fn try_from(req: &LocationUpdateRequest) -> DomainResult<Self> {
        const CONTEXT: &str = "Invalid location update data";
        let agent_id = required_text(req.driver_id.as_deref(), CONTEXT, "driverId")?;
        let latitude = required_number(req.latitude, CONTEXT, "latitude")?;
        let longitude = required_number(req.longitude, CONTEXT, "longitude")?;
        Ok(Self {
            agent_id,
            position: Position::new(latitude, longitude)?,
        })
    }
}

/// Validated `drowsy_alert` request.
#[derive(Debug, Clone, PartialEq)]
pub struct DrowsyAlert {
    pub agent_id: AgentId,
    pub position: Position,
    pub alert_type: String,
}

impl TryFrom<&DrowsyAlertRequest> for DrowsyAlert {
    type Error = DomainError;

    fn try_from(req: &DrowsyAlertRequest) -> DomainResult<Self> {
        const CONTEXT: &str = "Invalid drowsy alert data";
        let agent_id = required_text(req.driver_id.as_deref(), CONTEXT, "driverId")?;
        let latitude = required_number(req.latitude, CONTEXT, "latitude")?;
        let longitude = required_number(req.longitude, CONTEXT, "longitude")?;
        let alert_type = required_text(req.alert_type.as_deref(), CONTEXT, "alertType")?;
        Ok(Self {
            agent_id,
            position: Position::new(latitude, longitude)?,
            alert_type,
        })
    }
}

fn required_text(value: Option<&str>, context: &str, field: &str) -> DomainResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DomainError::invalid_input(format!("{}: {} is required", context, field))),
    }
}

fn required_number(value: Option<f64>, context: &str, field: &str) -> DomainResult<f64> {
    value.ok_or_else(|| DomainError::invalid_input(format!("{}: {} is required", context, field)))
}

/// Result of a processed drowsy alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertOutcome {
    /// Drivers inside the radius, sender excluded, nearest first.
    pub recipients: Vec<AgentId>,
    /// How many of those had a live session the alert was queued on.
    pub delivered: usize,
}

/// Owns the position index and the session registry and is their only writer.
pub struct PresenceCoordinator {
    geo_index: Arc<dyn GeoIndex>,
    sessions: Arc<dyn SessionRegistry>,
    dispatcher: Dispatcher,
    logger: DynLogger,
    nearby_distance_m: f64,
}

impl PresenceCoordinator {
    pub fn new(
        geo_index: Arc<dyn GeoIndex>,
        sessions: Arc<dyn SessionRegistry>,
        logger: DynLogger,
        nearby_distance_m: f64,
    ) -> Self {
        let dispatcher = Dispatcher::new(sessions.clone(), logger.clone());
        Self {
            geo_index,
            sessions,
            dispatcher,
            logger,
            nearby_distance_m,
        }
    }

    pub fn nearby_distance_m(&self) -> f64 {
        self.nearby_distance_m
    }

    /// Bind `session` as the authoritative session for the requested driver id.
    pub async fn register(&self, session: &SessionHandle, req: &RegisterRequest) -> DomainResult<AgentId> {
        let agent_id = required_text(req.driver_id.as_deref(), "Registration failed", "Driver ID")
            .map_err(|e| self.rejected("Registration", req.driver_id.as_deref(), e))?;
        self.sessions
            .bind(&agent_id, session.clone())
            .await
            .map_err(|e| self.rejected("Registration", Some(agent_id.as_str()), e))?;
        self.logger.info(&format!(
            "Driver registered: {} (connection {})",
            agent_id,
            session.connection_id()
        ));
        Ok(agent_id)
    }

    /// Store the reported position under the supplied driver id.
    pub async fn update_location(&self, req: &LocationUpdateRequest) -> DomainResult<LocationUpdate> {
        let update = LocationUpdate::try_from(req)
            .map_err(|e| self.rejected("Location update", req.driver_id.as_deref(), e))?;
        self.geo_index
            .upsert(&update.agent_id, update.position)
            .await
            .map_err(|e| self.rejected("Location update", Some(update.agent_id.as_str()), e))?;
        self.logger.info(&format!(
            "Location updated for driver {}: {}, {}",
            update.agent_id, update.position.latitude, update.position.longitude
        ));
        Ok(update)
    }

    /// Refresh the sender's position, then alert every other driver in range.
    pub async fn drowsy_alert(&self, req: &DrowsyAlertRequest) -> DomainResult<AlertOutcome> {
        let alert = DrowsyAlert::try_from(req)
            .map_err(|e| self.rejected("Drowsy alert", req.driver_id.as_deref(), e))?;
        self.geo_index
            .upsert(&alert.agent_id, alert.position)
            .await
            .map_err(|e| self.rejected("Drowsy alert", Some(alert.agent_id.as_str()), e))?;

        let nearby = self
            .geo_index
            .query_radius(alert.position, self.nearby_distance_m)
            .await
            .map_err(|e| self.rejected("Drowsy alert", Some(alert.agent_id.as_str()), e))?;

        let event = AlertEvent::new(alert.agent_id.clone(), alert.position, alert.alert_type, Utc::now());

        let mut recipients = Vec::with_capacity(nearby.len());
        let mut delivered = 0;
        for hit in nearby.into_iter().filter(|h| h.agent_id != alert.agent_id) {
            if self
                .dispatcher
                .send(&hit.agent_id, ServerEvent::NearbyAlert(event.clone()))
                .await
            {
                delivered += 1;
                self.logger
                    .info(&format!("Alert sent to nearby driver {}", hit.agent_id));
            }
            recipients.push(hit.agent_id);
        }

        self.logger.info(&format!(
            "Drowsy alert processed from driver {}, notified {} nearby drivers",
            alert.agent_id, delivered
        ));
        Ok(AlertOutcome { recipients, delivered })
    }

    /// Release whatever this connection owns. Never fails; cleanup errors are
    /// logged and swallowed.
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Option<AgentId> {
        let agent_id = match self.sessions.unbind_by_session(connection_id).await {
            Ok(Some(agent_id)) => agent_id,
            Ok(None) => return None,
            Err(e) => {
                self.logger.error(&format!(
                    "Error unbinding connection {}: {}",
                    connection_id, e
                ));
                return None;
            }
        };

        match self.geo_index.remove(&agent_id).await {
            Ok(()) => self
                .logger
                .info(&format!("Driver disconnected and removed: {}", agent_id)),
            Err(e) => self.logger.error(&format!(
                "Error removing disconnected driver {}: {}",
                agent_id, e
            )),
        }
        Some(agent_id)
    }

    /// Log a failed request at a level matching its category and hand the
    /// error back for the caller to report.
    fn rejected(&self, what: &str, agent_id: Option<&str>, error: DomainError) -> DomainError {
        let msg = format!("{} error for driver {}: {}", what, agent_id.unwrap_or("<none>"), error);
        match &error {
            DomainError::InternalFailure(_) => self.logger.error(&msg),
            _ => self.logger.warn(&msg),
        }
        error
    }
}
