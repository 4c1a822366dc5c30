//! Identity-only peripherals: the color/distance sensor and the hub button

use crate::error::Result;
use crate::peripherals::base::{Peripheral, SubscriptionId};
use crate::protocol::codec::hex;
use crate::protocol::types::{Port, Protocol, SensorValue};
use crate::transport::ConnectionPort;
use crossbeam_channel::Receiver;
use log::debug;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Color and distance sensor on port C or D.
///
/// Notifications are not decoded yet; they are logged and dropped.
pub struct ColorDistanceSensor {
    base: Peripheral,
}

impl ColorDistanceSensor {
    pub fn new(port: Port, protocol: Protocol, connection: Arc<dyn ConnectionPort>) -> Self {
        Self {
            base: Peripheral::new(port, protocol, connection),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SensorValue) + Send + Sync + 'static,
    {
        self.base.subscribe(callback)
    }

    pub fn subscribe_channel(&self, capacity: usize) -> (SubscriptionId, Receiver<SensorValue>) {
        self.base.subscribe_channel(capacity)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        self.base.unsubscribe(id)
    }

    pub fn handle_notification(&self, data: &[u8]) {
        debug!(
            "Color/distance sensor data on port {} is not decoded: [{}]",
            self.base.port(),
            hex(data)
        );
    }
}

impl Deref for ColorDistanceSensor {
    type Target = Peripheral;

    fn deref(&self) -> &Peripheral {
        &self.base
    }
}

impl fmt::Display for ColorDistanceSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ColorDistanceSensor on port {}", self.base.port())
    }
}

/// The hub's own button, always on the fixed button port
pub struct Button {
    base: Peripheral,
}

impl Button {
    pub fn new(protocol: Protocol, connection: Arc<dyn ConnectionPort>) -> Self {
        Self {
            base: Peripheral::new(Port::Button, protocol, connection),
        }
    }
}

impl Deref for Button {
    type Target = Peripheral;

    fn deref(&self) -> &Peripheral {
        &self.base
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Button on port {}", self.base.port())
    }
}
