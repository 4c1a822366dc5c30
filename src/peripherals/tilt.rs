//! Tilt sensor
//!
//! The sensor only reports while subscribed. Its mode decides how each
//! notification is laid out, so the mode is switched on the hub whenever
//! the first subscriber arrives (or asks for another mode) and turned off
//! again when the last one leaves.

use crate::error::{HubError, Result};
use crate::peripherals::base::{channel_subscriber, Peripheral, Subscriber, SubscriptionId};
use crate::protocol::codec::{
    decode_tilt_2axis, decode_tilt_basic, decode_tilt_full, encode_mode_subscribe, hex,
};
use crate::protocol::types::{Port, Protocol, SensorValue, TiltMode};
use crate::transport::ConnectionPort;
use crossbeam_channel::Receiver;
use log::{debug, info};
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct TiltSensor {
    base: Peripheral,
    mode: Mutex<TiltMode>,
    /// Serializes subscribe/unsubscribe so the wire write and the state change stay paired
    transition: Mutex<()>,
}

impl TiltSensor {
    pub fn new(port: Port, protocol: Protocol, connection: Arc<dyn ConnectionPort>) -> Self {
        Self {
            base: Peripheral::new(port, protocol, connection),
            mode: Mutex::new(TiltMode::Off),
            transition: Mutex::new(()),
        }
    }

    pub fn mode(&self) -> TiltMode {
        *self.lock_mode()
    }

    /// Subscribe `callback` and switch the sensor to `mode`.
    ///
    /// The mode command is written first; the mode and the subscriber are
    /// only committed once the write succeeded.
    pub fn subscribe<F>(&self, callback: F, mode: TiltMode) -> Result<SubscriptionId>
    where
        F: Fn(&SensorValue) + Send + Sync + 'static,
    {
        self.subscribe_with(Arc::new(callback), mode)
    }

    /// Subscribe a bounded channel instead of a callback
    pub fn subscribe_channel(
        &self,
        mode: TiltMode,
        capacity: usize,
    ) -> Result<(SubscriptionId, Receiver<SensorValue>)> {
        let (subscriber, receiver) = channel_subscriber(capacity);
        let id = self.subscribe_with(subscriber, mode)?;
        Ok((id, receiver))
    }

    fn subscribe_with(&self, subscriber: Subscriber, mode: TiltMode) -> Result<SubscriptionId> {
        if !mode.is_subscribable() {
            return Err(HubError::invalid_argument(format!(
                "Wrong tilt sensor mode: 0x{:02x}",
                mode.code()
            )));
        }

        let _transition = self.lock_transition();
        self.switch_mode(mode)?;
        Ok(self.base.add_subscriber(subscriber))
    }

    /// Remove a subscriber; the last one turns the sensor off.
    ///
    /// If turning the sensor off fails, the subscriber stays registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        let _transition = self.lock_transition();

        if !self.base.is_subscribed(id) {
            return Err(HubError::NotSubscribed(id));
        }

        if self.base.subscriber_count() == 1 {
            self.switch_mode(TiltMode::Off)?;
        }
        self.base.unsubscribe(id)
    }

    fn switch_mode(&self, mode: TiltMode) -> Result<()> {
        let port = self.base.port().code();
        let packet = encode_mode_subscribe(self.base.protocol(), port, mode.code());
        self.base.write_packet(&packet)?;
        *self.lock_mode() = mode;
        info!("Tilt sensor on port {} switched to {:?}", self.base.port(), mode);
        Ok(())
    }

    /// Decode a notification according to the current mode
    pub fn decode(&self, data: &[u8]) -> Result<SensorValue> {
        match self.mode() {
            TiltMode::Basic => decode_tilt_basic(data),
            TiltMode::Full => decode_tilt_full(data),
            TiltMode::TwoAxis => decode_tilt_2axis(data),
            TiltMode::Off => Err(HubError::decode("tilt sensor is off")),
        }
    }

    /// Decode and fan out a notification.
    ///
    /// Packets that arrive after the sensor was turned off (or are too
    /// short for the mode) are dropped with a debug line.
    pub fn handle_notification(&self, data: &[u8]) {
        match self.decode(data) {
            Ok(value) => self.base.notify_subscribers(&value),
            Err(e) => debug!(
                "Dropping tilt sensor data [{}] in mode {:?}: {}",
                hex(data),
                self.mode(),
                e
            ),
        }
    }

    fn lock_mode(&self) -> MutexGuard<'_, TiltMode> {
        self.mode.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_transition(&self) -> MutexGuard<'_, ()> {
        self.transition.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Deref for TiltSensor {
    type Target = Peripheral;

    fn deref(&self) -> &Peripheral {
        &self.base
    }
}

impl fmt::Display for TiltSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TiltSensor on port {}", self.base.port())
    }
}
