//! Hub peripherals
//!
//! This module provides the logical devices attached to hub ports:
//! - Shared state (port, working flag, subscribers)
//! - LED, encoded motors, tilt sensor
//! - Color/distance sensor and button

pub mod base;
pub mod device;
pub mod led;
pub mod motor;
pub mod sensors;
pub mod tilt;

// Re-export commonly used items
pub use base::{Peripheral, Subscriber, SubscriptionId};
pub use device::Device;
pub use led::Led;
pub use motor::EncodedMotor;
pub use sensors::{Button, ColorDistanceSensor};
pub use tilt::TiltSensor;
