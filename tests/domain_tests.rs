use drowsy_guard::domains::presence::*;
use drowsy_guard::DomainError;

#[test]
fn test_location_update_validation() {
    let ok = LocationUpdate::try_from(&LocationUpdateRequest {
        driver_id: Some("driver1".into()),
        latitude: Some(0.0),
        longitude: Some(0.0),
    })
    .unwrap();
    assert_eq!(ok.agent_id, "driver1");
    assert_eq!(ok.position, Position { latitude: 0.0, longitude: 0.0 });

    let missing = LocationUpdate::try_from(&LocationUpdateRequest {
        driver_id: None,
        latitude: Some(1.0),
        longitude: Some(1.0),
    })
    .unwrap_err();
    assert!(matches!(missing, DomainError::InvalidInput { .. }));
    assert!(missing.to_string().contains("driverId"));

    let range = LocationUpdate::try_from(&LocationUpdateRequest {
        driver_id: Some("driver1".into()),
        latitude: Some(-90.5),
        longitude: Some(10.0),
    })
    .unwrap_err();
    assert_eq!(range.code(), "out_of_range");
}

#[test]
fn test_presence_checked_before_range() {
    // A request that is both incomplete and out of range reports the missing field.
    let err = DrowsyAlert::try_from(&DrowsyAlertRequest {
        driver_id: Some("d".into()),
        latitude: Some(200.0),
        longitude: Some(0.0),
        alert_type: None,
    })
    .unwrap_err();
    assert_eq!(err.code(), "invalid_input");
    assert!(err.to_string().contains("alertType"));
}

#[test]
fn test_drowsy_alert_validation() {
    let alert = DrowsyAlert::try_from(&DrowsyAlertRequest {
        driver_id: Some("d".into()),
        latitude: Some(12.9716),
        longitude: Some(-180.0),
        alert_type: Some("microsleep".into()),
    })
    .unwrap();
    assert_eq!(alert.alert_type, "microsleep");

    let err = DrowsyAlert::try_from(&DrowsyAlertRequest {
        driver_id: Some("d".into()),
        latitude: Some(12.9716),
        longitude: Some(181.0),
        alert_type: Some("drowsy".into()),
    })
    .unwrap_err();
    assert!(matches!(err, DomainError::OutOfRange { .. }));
}

#[test]
fn test_error_codes() {
    assert_eq!(DomainError::invalid_input("x").code(), "invalid_input");
    assert_eq!(DomainError::out_of_range("x").code(), "out_of_range");
    assert_eq!(DomainError::InternalFailure("x".into()).code(), "internal_failure");
}

#[test]
fn test_error_event_carries_request_category() {
    let event = ServerEvent::error(RequestKind::DrowsyAlert, &DomainError::InternalFailure("index down".into()));
    match event {
        ServerEvent::Error(payload) => {
            assert_eq!(payload.kind, "drowsy_alert");
            assert_eq!(payload.code, "internal_failure");
            assert!(payload.message.contains("index down"));
        }
        other => panic!("unexpected {:?}", other),
    }
}
