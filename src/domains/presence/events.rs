//! Wire events exchanged with driver clients.
//!
//! Every frame is a JSON envelope `{"event": <name>, "data": <payload>}`.
//! Payload field names are camelCase to stay compatible with existing clients.

use crate::common::DomainError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{AgentId, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Register(RegisterRequest),
    UpdateLocation(LocationUpdateRequest),
    DrowsyAlert(DrowsyAlertRequest),
}

/// Why an inbound frame could not be turned into a [`ClientEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum FrameRejection {
    /// Not JSON, no event name, or an event this server does not know.
    Protocol(DomainError),
    /// A `register` whose payload has fields of the wrong type.
    Register(DomainError),
    /// An `update_location` or `drowsy_alert` whose payload has fields of the
    /// wrong type.
    Request(RequestKind, DomainError),
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

impl ClientEvent {
    /// Decode one text frame. The envelope is read first so a mistyped
    /// payload is reported against the event it belongs to.
    pub fn from_frame(frame: &str) -> Result<Self, FrameRejection> {
        let envelope: Envelope = serde_json::from_str(frame).map_err(|e| {
            FrameRejection::Protocol(DomainError::invalid_input(format!("Malformed event: {}", e)))
        })?;
        let data = match envelope.data {
            Value::Null => Value::Object(Default::default()),
            data => data,
        };

        match envelope.event.as_str() {
            "register" => serde_json::from_value(data).map(ClientEvent::Register).map_err(|e| {
                FrameRejection::Register(DomainError::invalid_input(format!("Registration failed: {}", e)))
            }),
            "update_location" => serde_json::from_value(data)
                .map(ClientEvent::UpdateLocation)
                .map_err(|e| {
                    FrameRejection::Request(
                        RequestKind::LocationUpdate,
                        DomainError::invalid_input(format!("Invalid location update data: {}", e)),
                    )
                }),
            "drowsy_alert" => serde_json::from_value(data).map(ClientEvent::DrowsyAlert).map_err(|e| {
                FrameRejection::Request(
                    RequestKind::DrowsyAlert,
                    DomainError::invalid_input(format!("Invalid drowsy alert data: {}", e)),
                )
            }),
            other => Err(FrameRejection::Protocol(DomainError::invalid_input(format!(
                "Unknown event: {}",
                other
            )))),
        }
    }
}

/// Fields are optional on the wire so a missing field is reported as
/// invalid input rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub driver_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationUpdateRequest {
    pub driver_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrowsyAlertRequest {
    pub driver_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub alert_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Registered(RegisteredPayload),
    NearbyAlert(AlertEvent),
    Error(ErrorPayload),
}

impl ServerEvent {
    pub fn registered(driver_id: &str) -> Self {
        ServerEvent::Registered(RegisteredPayload {
            success: true,
            driver_id: Some(driver_id.to_string()),
            error: None,
        })
    }

    pub fn registration_failed(error: &DomainError) -> Self {
        ServerEvent::Registered(RegisteredPayload {
            success: false,
            driver_id: None,
            error: Some(error.to_string()),
        })
    }

    pub fn error(kind: RequestKind, error: &DomainError) -> Self {
        ServerEvent::Error(ErrorPayload {
            kind: kind.as_str().to_string(),
            message: error.to_string(),
            code: error.code().to_string(),
        })
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            ServerEvent::Registered(_) => "registered",
            ServerEvent::NearbyAlert(_) => "nearby_alert",
            ServerEvent::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredPayload {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub code: String,
}

/// Request category echoed back on `error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    LocationUpdate,
    DrowsyAlert,
    Protocol,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::LocationUpdate => "location_update",
            RequestKind::DrowsyAlert => "drowsy_alert",
            RequestKind::Protocol => "protocol",
        }
    }
}

/// Alert forwarded to nearby drivers. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub alerting_driver: AgentId,
    pub location: Position,
    pub alert_type: String,
    pub timestamp: String,
}

impl AlertEvent {
    pub fn new(alerting_driver: AgentId, location: Position, alert_type: String, at: DateTime<Utc>) -> Self {
        Self {
            alerting_driver,
            location,
            alert_type,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_client_envelope() {
        let frame = json!({
            "event": "drowsy_alert",
            "data": {"driverId": "driver1", "latitude": 12.9716, "longitude": 77.5946, "alertType": "drowsy"}
        });
        let event: ClientEvent = serde_json::from_value(frame).unwrap();
        match event {
            ClientEvent::DrowsyAlert(req) => {
                assert_eq!(req.driver_id.as_deref(), Some("driver1"));
                assert_eq!(req.alert_type.as_deref(), Some("drowsy"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn missing_fields_decode_as_none() {
        let event: ClientEvent =
            serde_json::from_value(json!({"event": "update_location", "data": {"driverId": "d"}})).unwrap();
        assert_eq!(
            event,
            ClientEvent::UpdateLocation(LocationUpdateRequest {
                driver_id: Some("d".into()),
                latitude: None,
                longitude: None,
            })
        );
    }

    #[test]
    fn encodes_server_events_in_client_shape() {
        let registered = serde_json::to_value(ServerEvent::registered("driver1")).unwrap();
        assert_eq!(registered, json!({"event": "registered", "data": {"success": true, "driverId": "driver1"}}));

        let err = ServerEvent::error(RequestKind::LocationUpdate, &DomainError::out_of_range("Invalid coordinates"));
        assert_eq!(
            serde_json::to_value(err).unwrap(),
            json!({"event": "error", "data": {"type": "location_update", "message": "Invalid coordinates", "code": "out_of_range"}})
        );

        let alert = AlertEvent::new(
            "driver1".into(),
            Position { latitude: 1.5, longitude: 2.5 },
            "drowsy".into(),
            Utc::now(),
        );
        let value = serde_json::to_value(ServerEvent::NearbyAlert(alert)).unwrap();
        assert_eq!(value["event"], "nearby_alert");
        assert_eq!(value["data"]["alertingDriver"], "driver1");
        assert_eq!(value["data"]["location"], json!({"latitude": 1.5, "longitude": 2.5}));
        assert!(value["data"]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn frame_rejections_keep_their_event() {
        let register = ClientEvent::from_frame(r#"{"event":"register","data":{"driverId":42}}"#);
        assert!(matches!(register, Err(FrameRejection::Register(DomainError::InvalidInput { .. }))));

        let update = ClientEvent::from_frame(r#"{"event":"update_location","data":{"latitude":"12.9"}}"#);
        assert!(matches!(update, Err(FrameRejection::Request(RequestKind::LocationUpdate, _))));

        let unknown = ClientEvent::from_frame(r#"{"event":"teleport","data":{}}"#);
        assert!(matches!(unknown, Err(FrameRejection::Protocol(_))));
        assert!(matches!(ClientEvent::from_frame("[1,2"), Err(FrameRejection::Protocol(_))));
    }

    #[test]
    fn missing_data_decodes_as_empty_request() {
        assert_eq!(
            ClientEvent::from_frame(r#"{"event":"register"}"#).unwrap(),
            ClientEvent::Register(RegisterRequest::default())
        );
    }
}
