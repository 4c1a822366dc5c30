//! BLE connection to the hub
//!
//! Wraps an already connected btleplug peripheral and exposes it as a
//! [`ConnectionPort`]. Scanning and pairing happen elsewhere; this adapter
//! only finds the hub characteristic, writes packets to it and pumps its
//! notifications into a [`MoveHub`].

use crate::hub::MoveHub;
use crate::protocol::codec::hex;
use crate::protocol::constants::MOVE_HUB_HARDWARE_UUID;
use crate::transport::{ConnectionPort, TransportError};
use btleplug::api::{Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use crossbeam_channel::{bounded, Receiver, TrySendError};
use futures::stream::StreamExt;
use log::{debug, info, warn};
use std::sync::{Arc, Weak};
use std::thread;
use tokio::runtime::Runtime;

/// Packets buffered between the BLE task and the handler thread
const NOTIFICATION_QUEUE_LEN: usize = 256;

/// Hub BLE connection wrapper
pub struct BleConnection {
    peripheral: Peripheral,
    characteristic: Characteristic,
    write_handle: u16,
    runtime: Runtime,
}

impl BleConnection {
    /// Wrap a connected peripheral.
    ///
    /// Must be called from synchronous code: the connection owns its own
    /// tokio runtime and blocks on it for every write.
    pub fn new(peripheral: Peripheral, write_handle: u16) -> Result<Self, TransportError> {
        let runtime = Runtime::new()?;

        let characteristic = runtime.block_on(async {
            if !peripheral.is_connected().await? {
                return Err(TransportError::NotConnected);
            }

            info!("Discovering hub services...");
            peripheral.discover_services().await?;

            peripheral
                .characteristics()
                .into_iter()
                .find(|c| c.uuid == MOVE_HUB_HARDWARE_UUID)
                .ok_or(TransportError::CharacteristicNotFound)
        })?;

        debug!("Found hub characteristic {}", characteristic.uuid);

        Ok(Self {
            peripheral,
            characteristic,
            write_handle,
            runtime,
        })
    }

    /// Subscribe to hub notifications and feed every packet to `hub`.
    ///
    /// Only a weak reference to the hub is kept, so dropping the last
    /// handle to it stops the handler thread and, with the connection,
    /// the forwarding task.
    pub fn start_notifications(&self, hub: &Arc<MoveHub>) -> Result<(), TransportError> {
        let mut notifications = self.runtime.block_on(async {
            self.peripheral.subscribe(&self.characteristic).await?;
            self.peripheral.notifications().await
        })?;
        debug!("Subscribed to hub notifications");

        // Subscribers may write back to the hub, which blocks on this runtime,
        // so packets are handled on a plain thread rather than inside the task.
        let (sender, receiver) = bounded::<Vec<u8>>(NOTIFICATION_QUEUE_LEN);
        let hub = Arc::downgrade(hub);

        thread::Builder::new()
            .name("hub-notifications".to_string())
            .spawn(move || forward_packets(receiver, hub))?;

        self.runtime.spawn(async move {
            while let Some(notification) = notifications.next().await {
                if notification.uuid != MOVE_HUB_HARDWARE_UUID {
                    continue;
                }
                match sender.try_send(notification.value) {
                    Ok(()) => {}
                    Err(TrySendError::Full(packet)) => {
                        warn!("Notification queue full, dropping [{}]", hex(&packet));
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                }
            }
            warn!("Hub notification stream ended");
        });

        Ok(())
    }

    /// Get the peripheral
    pub fn peripheral(&self) -> &Peripheral {
        &self.peripheral
    }
}

/// Hand queued packets to the hub until the queue closes or the hub is gone
fn forward_packets(receiver: Receiver<Vec<u8>>, hub: Weak<MoveHub>) {
    while let Ok(packet) = receiver.recv() {
        match hub.upgrade() {
            Some(hub) => hub.handle_packet(&packet),
            None => break,
        }
    }
    debug!("Hub notification thread exited");
}

impl ConnectionPort for BleConnection {
    fn write(&self, handle: u16, data: &[u8]) -> Result<(), TransportError> {
        if handle != self.write_handle {
            return Err(TransportError::UnknownHandle(handle));
        }

        debug!("Writing {} bytes: [{}]", data.len(), hex(data));
        self.runtime.block_on(self.peripheral.write(
            &self.characteristic,
            data,
            WriteType::WithoutResponse,
        ))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;
    use crate::protocol::types::{SensorValue, TiltMode};
    use crate::transport::MockConnection;
    use std::time::Duration;

    fn hub() -> Arc<MoveHub> {
        let conn = Arc::new(MockConnection::new());
        Arc::new(MoveHub::new(conn, &HubConfig::default()).unwrap())
    }

    fn tilt_packet(value: u8) -> Vec<u8> {
        vec![0x05, 0x00, 0x45, 0x3A, value]
    }

    #[test]
    fn test_forwarding_stops_when_hub_is_dropped() {
        let hub = hub();
        let (_, values) = hub.tilt_sensor().subscribe_channel(TiltMode::Basic, 4).unwrap();

        let (sender, receiver) = bounded::<Vec<u8>>(4);
        let weak = Arc::downgrade(&hub);
        let worker = thread::spawn(move || forward_packets(receiver, weak));

        sender.send(tilt_packet(0x03)).unwrap();
        assert_eq!(
            values.recv_timeout(Duration::from_secs(1)).unwrap(),
            SensorValue::TiltBasic(3)
        );

        // the queue stays open; only the hub goes away
        drop(hub);
        sender.send(tilt_packet(0x04)).unwrap();
        worker.join().unwrap();
        assert!(values.try_recv().is_err());
    }

    #[test]
    fn test_forwarding_stops_when_queue_closes() {
        let hub = hub();
        let (sender, receiver) = bounded::<Vec<u8>>(4);
        let weak = Arc::downgrade(&hub);
        let worker = thread::spawn(move || forward_packets(receiver, weak));

        drop(sender);
        worker.join().unwrap();
        assert_eq!(Arc::strong_count(&hub), 1);
    }
}
