//! movehub-rs: host-side driver for the BLE Move Hub
//!
//! This library turns high-level peripheral commands (set LED color, run a
//! motor, subscribe to the tilt sensor) into the hub's binary wire protocol
//! and decodes the hub's notifications back into typed sensor values.

pub mod config;
pub mod error;
pub mod hub;
pub mod peripherals;
pub mod protocol;
pub mod transport;

// Re-export commonly used items
pub use config::{ConfigError, HubConfig};
pub use error::{HubError, Result};
pub use hub::MoveHub;
pub use peripherals::{
    Button, ColorDistanceSensor, Device, EncodedMotor, Led, SubscriptionId, TiltSensor,
};
pub use protocol::{Color, Port, Protocol, SensorKind, SensorValue, TiltMode};
pub use transport::{BleConnection, ConnectionPort, MockConnection, TransportError};
