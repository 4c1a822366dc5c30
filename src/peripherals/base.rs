//! Shared peripheral state
//!
//! Every peripheral is bound to one port for its whole life, carries an
//! advisory "working" flag and a set of subscribers that receive decoded
//! sensor values.

use crate::error::{HubError, Result};
use crate::protocol::codec::{encode_command, hex};
use crate::protocol::types::{Port, Protocol, SensorValue};
use crate::transport::ConnectionPort;
use crossbeam_channel::{bounded, Receiver, TrySendError};
use log::{debug, trace, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a registered subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription #{}", self.0)
    }
}

/// Callback invoked with every decoded value
pub type Subscriber = Arc<dyn Fn(&SensorValue) + Send + Sync>;

/// Build a subscriber that forwards values into a bounded channel.
///
/// A full channel drops the value; the delivery path never blocks.
pub(crate) fn channel_subscriber(capacity: usize) -> (Subscriber, Receiver<SensorValue>) {
    let (sender, receiver) = bounded(capacity);
    let subscriber: Subscriber = Arc::new(move |value: &SensorValue| {
        match sender.try_send(*value) {
            Ok(()) => {}
            Err(TrySendError::Full(value)) => {
                warn!("Subscriber channel full, dropping {:?}", value)
            }
            Err(TrySendError::Disconnected(_)) => trace!("Subscriber channel closed"),
        }
    });
    (subscriber, receiver)
}

/// State and behavior common to all peripherals
pub struct Peripheral {
    port: Port,
    protocol: Protocol,
    connection: Arc<dyn ConnectionPort>,
    working: AtomicBool,
    subscribers: Mutex<BTreeMap<SubscriptionId, Subscriber>>,
}

impl Peripheral {
    pub fn new(port: Port, protocol: Protocol, connection: Arc<dyn ConnectionPort>) -> Self {
        Self {
            port,
            protocol,
            connection,
            working: AtomicBool::new(false),
            subscribers: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn port(&self) -> Port {
        self.port
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    /// Mark the peripheral busy
    pub fn started(&self) {
        self.working.store(true, Ordering::SeqCst);
    }

    /// Mark the peripheral idle
    pub fn finished(&self) {
        self.working.store(false, Ordering::SeqCst);
    }

    pub fn is_working(&self) -> bool {
        self.working.load(Ordering::SeqCst)
    }

    /// Wrap `payload` in a packet for this port and write it to the hub.
    ///
    /// Transport failures are returned as-is; nothing is retried.
    pub fn send_command(&self, message_type: u8, payload: &[u8]) -> Result<()> {
        let packet = encode_command(&self.protocol, message_type, self.port.code(), payload);
        debug!("Port {} <- [{}]", self.port, hex(&packet));
        self.connection.write(self.protocol.write_handle, &packet)?;
        Ok(())
    }

    /// Write an already encoded packet
    pub(crate) fn write_packet(&self, packet: &[u8]) -> Result<()> {
        debug!("Port {} <- [{}]", self.port, hex(packet));
        self.connection.write(self.protocol.write_handle, packet)?;
        Ok(())
    }

    /// Register a callback for decoded values.
    ///
    /// Crate-internal: peripherals whose subscriptions drive hub state wrap
    /// these with their own public methods.
    pub(crate) fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SensorValue) + Send + Sync + 'static,
    {
        self.add_subscriber(Arc::new(callback))
    }

    /// Register a channel that receives decoded values
    pub(crate) fn subscribe_channel(
        &self,
        capacity: usize,
    ) -> (SubscriptionId, Receiver<SensorValue>) {
        let (subscriber, receiver) = channel_subscriber(capacity);
        (self.add_subscriber(subscriber), receiver)
    }

    pub(crate) fn add_subscriber(&self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.lock_subscribers().insert(id, subscriber);
        debug!("Port {}: added {}", self.port, id);
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        match self.lock_subscribers().remove(&id) {
            Some(_) => {
                debug!("Port {}: removed {}", self.port, id);
                Ok(())
            }
            None => Err(HubError::NotSubscribed(id)),
        }
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.lock_subscribers().contains_key(&id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    /// Deliver `value` to every subscriber.
    ///
    /// Works on a snapshot taken under the lock, so subscribers may
    /// (un)subscribe from inside their callback. A panicking subscriber is
    /// logged and does not stop delivery to the others.
    pub(crate) fn notify_subscribers(&self, value: &SensorValue) {
        let snapshot: Vec<(SubscriptionId, Subscriber)> = self
            .lock_subscribers()
            .iter()
            .map(|(id, subscriber)| (*id, Arc::clone(subscriber)))
            .collect();

        trace!("Port {}: notifying {} subscribers", self.port, snapshot.len());

        for (id, subscriber) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| subscriber(value))).is_err() {
                warn!("Port {}: {} panicked while handling {:?}", self.port, id, value);
            }
        }
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, BTreeMap<SubscriptionId, Subscriber>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for Peripheral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peripheral")
            .field("port", &self.port)
            .field("working", &self.is_working())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
