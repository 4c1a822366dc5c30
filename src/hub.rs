//! Move Hub peripheral registry
//!
//! This module owns the peripherals of one hub session and routes inbound
//! packets to them. Built-in peripherals (LED, motors A/B/AB, tilt sensor,
//! button) always exist; external ports C and D are filled from the
//! configuration and from the hub's attach/detach announcements.

use crate::config::{AttachmentKind, HubConfig};
use crate::error::{HubError, Result};
use crate::peripherals::{Button, ColorDistanceSensor, Device, EncodedMotor, Led, TiltSensor};
use crate::protocol::codec::{hex, PacketHeader};
use crate::protocol::constants::*;
use crate::protocol::types::{MessageType, Port, Protocol};
use crate::transport::ConnectionPort;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Peripherals of one connected hub
pub struct MoveHub {
    connection: Arc<dyn ConnectionPort>,
    protocol: Protocol,
    led: Arc<Led>,
    motor_a: Arc<EncodedMotor>,
    motor_b: Arc<EncodedMotor>,
    motor_ab: Arc<EncodedMotor>,
    tilt_sensor: Arc<TiltSensor>,
    button: Arc<Button>,
    /// Port code -> device, used for routing
    devices: RwLock<HashMap<u8, Device>>,
}

impl MoveHub {
    /// Create the hub's peripherals on top of `connection`
    pub fn new(connection: Arc<dyn ConnectionPort>, config: &HubConfig) -> Result<Self> {
        let protocol = config.protocol();
        let attachments = config
            .resolved_attachments()
            .map_err(|e| HubError::invalid_argument(e.to_string()))?;

        let led = Arc::new(Led::new(Port::Led, protocol, connection.clone()));
        let motor_a = Arc::new(EncodedMotor::new(Port::A, protocol, connection.clone())?);
        let motor_b = Arc::new(EncodedMotor::new(Port::B, protocol, connection.clone())?);
        let motor_ab = Arc::new(EncodedMotor::new(Port::AB, protocol, connection.clone())?);
        let tilt_sensor = Arc::new(TiltSensor::new(Port::TiltSensor, protocol, connection.clone()));
        let button = Arc::new(Button::new(protocol, connection.clone()));

        let mut devices = HashMap::new();
        for device in [
            Device::Led(led.clone()),
            Device::Motor(motor_a.clone()),
            Device::Motor(motor_b.clone()),
            Device::Motor(motor_ab.clone()),
            Device::Tilt(tilt_sensor.clone()),
            Device::Button(button.clone()),
        ] {
            devices.insert(device.port().code(), device);
        }

        let hub = Self {
            connection,
            protocol,
            led,
            motor_a,
            motor_b,
            motor_ab,
            tilt_sensor,
            button,
            devices: RwLock::new(devices),
        };

        for (port, kind) in attachments {
            hub.attach(port, kind)?;
        }

        info!("✓ Hub ready with {} peripherals", hub.lock_devices().len());
        Ok(hub)
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn led(&self) -> Arc<Led> {
        self.led.clone()
    }

    pub fn tilt_sensor(&self) -> Arc<TiltSensor> {
        self.tilt_sensor.clone()
    }

    pub fn button(&self) -> Arc<Button> {
        self.button.clone()
    }

    /// Motor on `port`, if one is there
    pub fn motor(&self, port: Port) -> Option<Arc<EncodedMotor>> {
        match port {
            Port::A => Some(self.motor_a.clone()),
            Port::B => Some(self.motor_b.clone()),
            Port::AB => Some(self.motor_ab.clone()),
            _ => self.device(port).and_then(|d| d.as_motor().cloned()),
        }
    }

    /// First color/distance sensor found on the external ports
    pub fn color_distance_sensor(&self) -> Option<Arc<ColorDistanceSensor>> {
        [Port::C, Port::D]
            .into_iter()
            .filter_map(|port| self.device(port))
            .find_map(|d| d.as_color_distance().cloned())
    }

    pub fn device(&self, port: Port) -> Option<Device> {
        self.lock_devices().get(&port.code()).cloned()
    }

    /// Occupied ports, sorted
    pub fn ports(&self) -> Vec<Port> {
        let mut ports: Vec<Port> = self
            .lock_devices()
            .keys()
            .filter_map(|code| Port::try_from(*code).ok())
            .collect();
        ports.sort();
        ports
    }

    /// Put a device on an external port.
    ///
    /// An existing device of the same kind is kept so its subscribers survive.
    pub fn attach(&self, port: Port, kind: AttachmentKind) -> Result<Device> {
        if !port.is_external() {
            return Err(HubError::invalid_argument(format!(
                "Cannot attach devices to port {}",
                port
            )));
        }

        let mut devices = self.lock_devices_mut();
        if let Some(existing) = devices.get(&port.code()) {
            let same_kind = matches!(
                (existing, kind),
                (Device::Motor(_), AttachmentKind::Motor)
                    | (Device::ColorDistance(_), AttachmentKind::ColorDistance)
            );
            if same_kind {
                return Ok(existing.clone());
            }
        }

        let device = match kind {
            AttachmentKind::Motor => Device::Motor(Arc::new(EncodedMotor::new(
                port,
                self.protocol,
                self.connection.clone(),
            )?)),
            AttachmentKind::ColorDistance => Device::ColorDistance(Arc::new(
                ColorDistanceSensor::new(port, self.protocol, self.connection.clone()),
            )),
        };

        info!("Attached {}", device);
        devices.insert(port.code(), device.clone());
        Ok(device)
    }

    /// Remove the device on an external port
    pub fn detach(&self, port: Port) -> Option<Device> {
        if !port.is_external() {
            return None;
        }
        let removed = self.lock_devices_mut().remove(&port.code());
        if let Some(device) = &removed {
            info!("Detached {}", device);
        }
        removed
    }

    /// Route a notification payload to the peripheral on `port`
    pub fn on_notification(&self, port: u8, data: &[u8]) {
        let device = self.lock_devices().get(&port).cloned();
        match device {
            Some(device) => device.handle_notification(data),
            None => debug!("No peripheral on port 0x{:02x}, dropping [{}]", port, hex(data)),
        }
    }

    /// Entry point for every packet the hub notifies
    pub fn handle_packet(&self, data: &[u8]) {
        let header = match PacketHeader::parse(data) {
            Ok(header) => header,
            Err(e) => {
                debug!("Dropping packet [{}]: {}", hex(data), e);
                return;
            }
        };

        match MessageType::try_from(header.message_type) {
            Ok(MessageType::SensorData) => self.on_notification(header.port, data),
            Ok(MessageType::PortInfo) => self.handle_port_info(header.port, data),
            Ok(MessageType::PortCmdError) => {
                warn!("Hub reported command error on port 0x{:02x}: [{}]", header.port, hex(data))
            }
            Ok(other) => debug!("Ignoring {:?} packet [{}]", other, hex(data)),
            Err(e) => debug!("Dropping packet [{}]: {}", hex(data), e),
        }
    }

    fn handle_port_info(&self, code: u8, data: &[u8]) {
        let port = match Port::try_from(code) {
            Ok(port) if port.is_external() => port,
            _ => {
                debug!("Port info for built-in port 0x{:02x}: [{}]", code, hex(data));
                return;
            }
        };

        let (event, dev_type) = match (data.get(4).copied(), data.get(5).copied()) {
            (Some(PORT_INFO_DETACHED), _) => {
                self.detach(port);
                return;
            }
            (Some(event), Some(dev_type)) => (event, dev_type),
            _ => {
                debug!("Short port info packet [{}]", hex(data));
                return;
            }
        };

        if event != PORT_INFO_ATTACHED && event != PORT_INFO_GROUPED {
            debug!("Unknown port info event 0x{:02x} on port {}", event, port);
            return;
        }

        let kind = match dev_type {
            DEV_COLOR_DISTANCE => AttachmentKind::ColorDistance,
            DEV_MOTOR | DEV_IMOTOR => AttachmentKind::Motor,
            other => {
                debug!("Unsupported device type 0x{:02x} on port {}", other, port);
                return;
            }
        };

        if let Err(e) = self.attach(port, kind) {
            warn!("Failed to attach device on port {}: {}", port, e);
        }
    }

    fn lock_devices(&self) -> RwLockReadGuard<'_, HashMap<u8, Device>> {
        self.devices.read().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_devices_mut(&self) -> RwLockWriteGuard<'_, HashMap<u8, Device>> {
        self.devices.write().unwrap_or_else(|e| e.into_inner())
    }
}
