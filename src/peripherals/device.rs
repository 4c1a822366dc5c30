//! Closed set of peripheral variants
//!
//! The hub keeps one [`Device`] per occupied port and routes notifications
//! through it; the variant is fixed when the device is created.

use crate::error::Result;
use crate::peripherals::base::Peripheral;
use crate::peripherals::led::Led;
use crate::peripherals::motor::EncodedMotor;
use crate::peripherals::sensors::{Button, ColorDistanceSensor};
use crate::peripherals::tilt::TiltSensor;
use crate::protocol::codec::hex;
use crate::protocol::types::Port;
use log::debug;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub enum Device {
    Led(Arc<Led>),
    Motor(Arc<EncodedMotor>),
    Tilt(Arc<TiltSensor>),
    ColorDistance(Arc<ColorDistanceSensor>),
    Button(Arc<Button>),
}

impl Device {
    /// Shared peripheral state of the variant.
    ///
    /// Subscriptions are not reachable from here; they go through the
    /// concrete peripheral so the tilt sensor can keep its mode in step.
    pub fn peripheral(&self) -> &Peripheral {
        match self {
            Device::Led(led) => led,
            Device::Motor(motor) => motor,
            Device::Tilt(tilt) => tilt,
            Device::ColorDistance(sensor) => sensor,
            Device::Button(button) => button,
        }
    }

    pub fn port(&self) -> Port {
        self.peripheral().port()
    }

    pub fn send_command(&self, message_type: u8, payload: &[u8]) -> Result<()> {
        self.peripheral().send_command(message_type, payload)
    }

    /// Hand a raw notification to the variant's decoder
    pub fn handle_notification(&self, data: &[u8]) {
        match self {
            Device::Tilt(tilt) => tilt.handle_notification(data),
            Device::ColorDistance(sensor) => sensor.handle_notification(data),
            Device::Led(_) | Device::Motor(_) | Device::Button(_) => {
                debug!("{} has no notification decoder, dropping [{}]", self, hex(data));
            }
        }
    }

    pub fn as_led(&self) -> Option<&Arc<Led>> {
        match self {
            Device::Led(led) => Some(led),
            _ => None,
        }
    }

    pub fn as_motor(&self) -> Option<&Arc<EncodedMotor>> {
        match self {
            Device::Motor(motor) => Some(motor),
            _ => None,
        }
    }

    pub fn as_tilt(&self) -> Option<&Arc<TiltSensor>> {
        match self {
            Device::Tilt(tilt) => Some(tilt),
            _ => None,
        }
    }

    pub fn as_color_distance(&self) -> Option<&Arc<ColorDistanceSensor>> {
        match self {
            Device::ColorDistance(sensor) => Some(sensor),
            _ => None,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Led(led) => write!(f, "{}", led),
            Device::Motor(motor) => write!(f, "{}", motor),
            Device::Tilt(tilt) => write!(f, "{}", tilt),
            Device::ColorDistance(sensor) => write!(f, "{}", sensor),
            Device::Button(button) => write!(f, "{}", button),
        }
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Device({})", self)
    }
}
