//! Integration tests for the mock connection and configured hubs

use movehub_rs::protocol::constants::MOVE_HUB_HARDWARE_HANDLE;
use movehub_rs::{
    ConnectionPort, HubConfig, HubError, MockConnection, MoveHub, Port, TransportError,
};
use std::sync::Arc;

#[test]
fn test_mock_connection_records_writes() {
    let conn = MockConnection::new();

    assert!(conn.write(MOVE_HUB_HARDWARE_HANDLE, &[0x05, 0x00, 0x81, 0x32, 0x00]).is_ok());
    assert!(conn.write(0x20, &[0x01]).is_ok());

    assert_eq!(conn.write_count(), 2);
    assert_eq!(conn.writes()[1], (0x20, vec![0x01]));

    conn.clear();
    assert!(conn.last_packet().is_none());
}

#[test]
fn test_mock_connection_failure_surfaces_as_transport_error() {
    let conn = Arc::new(MockConnection::new());
    let hub = MoveHub::new(conn.clone(), &HubConfig::default()).unwrap();

    conn.set_fail_writes(true);
    let err = hub.led().set_named_color("white").unwrap_err();
    assert!(matches!(err, HubError::Transport(TransportError::Write(_))));
    assert_eq!(conn.write_count(), 0);
}

#[test]
fn test_default_config_file() {
    let config = HubConfig::load_default().unwrap();
    let hub = MoveHub::new(Arc::new(MockConnection::new()), &config).unwrap();

    assert_eq!(hub.color_distance_sensor().unwrap().port(), Port::C);
    assert_eq!(hub.motor(Port::D).unwrap().port(), Port::D);
    assert_eq!(
        hub.ports(),
        vec![
            Port::A,
            Port::B,
            Port::AB,
            Port::C,
            Port::D,
            Port::Led,
            Port::TiltSensor,
            Port::Button,
        ]
    );
}

#[test]
fn test_missing_config_file() {
    assert!(HubConfig::load("configs/does-not-exist.toml").is_err());
}
