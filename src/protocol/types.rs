//! Move Hub type definitions
//!
//! Typed views of the protocol tables: ports, message types, colors,
//! tilt modes and the decoded sensor values handed to subscribers.

use crate::error::HubError;
use crate::protocol::constants::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical port of the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Port {
    A,
    B,
    /// A and B driven as one group
    AB,
    C,
    D,
    Led,
    TiltSensor,
    Amperage,
    Voltage,
    Button,
}

impl Port {
    pub const ALL: [Port; 10] = [
        Port::A,
        Port::B,
        Port::AB,
        Port::C,
        Port::D,
        Port::Led,
        Port::TiltSensor,
        Port::Amperage,
        Port::Voltage,
        Port::Button,
    ];

    /// Wire code of this port
    pub fn code(self) -> u8 {
        match self {
            Port::A => PORT_A,
            Port::B => PORT_B,
            Port::AB => PORT_AB,
            Port::C => PORT_C,
            Port::D => PORT_D,
            Port::Led => PORT_LED,
            Port::TiltSensor => PORT_TILT_SENSOR,
            Port::Amperage => PORT_AMPERAGE,
            Port::Voltage => PORT_VOLTAGE,
            Port::Button => PORT_BUTTON,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Port::A => "A",
            Port::B => "B",
            Port::AB => "AB",
            Port::C => "C",
            Port::D => "D",
            Port::Led => "LED",
            Port::TiltSensor => "TILT_SENSOR",
            Port::Amperage => "AMPERAGE",
            Port::Voltage => "VOLTAGE",
            Port::Button => "BUTTON",
        }
    }

    /// Ports an encoded motor can be driven on
    pub fn is_motor_port(self) -> bool {
        matches!(self, Port::A | Port::B | Port::AB | Port::C | Port::D)
    }

    /// Ports where external devices are plugged in
    pub fn is_external(self) -> bool {
        matches!(self, Port::C | Port::D)
    }

    /// Whether commands on this port address two motors at once
    pub fn is_combined(self) -> bool {
        self == Port::AB
    }
}

impl TryFrom<u8> for Port {
    type Error = HubError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Port::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .ok_or_else(|| HubError::invalid_argument(format!("Unknown port code 0x{:02x}", code)))
    }
}

impl FromStr for Port {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Port::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| HubError::invalid_argument(format!("Unknown port name '{}'", s)))
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Message type byte (offset 2 of every packet)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    DeviceInfo,
    DeviceShutdown,
    PingResponse,
    PortInfo,
    PortCmdError,
    SensorSubscribe,
    SensorData,
    SensorSubscribeAck,
    SetPortVal,
    PortStatus,
}

impl MessageType {
    pub fn code(self) -> u8 {
        match self {
            MessageType::DeviceInfo => MSG_DEVICE_INFO,
            MessageType::DeviceShutdown => MSG_DEVICE_SHUTDOWN,
            MessageType::PingResponse => MSG_PING_RESPONSE,
            MessageType::PortInfo => MSG_PORT_INFO,
            MessageType::PortCmdError => MSG_PORT_CMD_ERROR,
            MessageType::SensorSubscribe => MSG_SENSOR_SUBSCRIBE,
            MessageType::SensorData => MSG_SENSOR_DATA,
            MessageType::SensorSubscribeAck => MSG_SENSOR_SUBSCRIBE_ACK,
            MessageType::SetPortVal => MSG_SET_PORT_VAL,
            MessageType::PortStatus => MSG_PORT_STATUS,
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = HubError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        let msg = match code {
            MSG_DEVICE_INFO => MessageType::DeviceInfo,
            MSG_DEVICE_SHUTDOWN => MessageType::DeviceShutdown,
            MSG_PING_RESPONSE => MessageType::PingResponse,
            MSG_PORT_INFO => MessageType::PortInfo,
            MSG_PORT_CMD_ERROR => MessageType::PortCmdError,
            MSG_SENSOR_SUBSCRIBE => MessageType::SensorSubscribe,
            MSG_SENSOR_DATA => MessageType::SensorData,
            MSG_SENSOR_SUBSCRIBE_ACK => MessageType::SensorSubscribeAck,
            MSG_SET_PORT_VAL => MessageType::SetPortVal,
            MSG_PORT_STATUS => MessageType::PortStatus,
            other => {
                return Err(HubError::decode(format!("Unknown message type 0x{:02x}", other)));
            }
        };
        Ok(msg)
    }
}

/// LED color table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Pink,
    Purple,
    Blue,
    LightBlue,
    Cyan,
    Green,
    Yellow,
    Orange,
    Red,
    White,
    None,
}

impl Color {
    pub const ALL: [Color; 12] = [
        Color::Black,
        Color::Pink,
        Color::Purple,
        Color::Blue,
        Color::LightBlue,
        Color::Cyan,
        Color::Green,
        Color::Yellow,
        Color::Orange,
        Color::Red,
        Color::White,
        Color::None,
    ];

    pub fn code(self) -> u8 {
        match self {
            Color::Black => COLOR_BLACK,
            Color::Pink => COLOR_PINK,
            Color::Purple => COLOR_PURPLE,
            Color::Blue => COLOR_BLUE,
            Color::LightBlue => COLOR_LIGHT_BLUE,
            Color::Cyan => COLOR_CYAN,
            Color::Green => COLOR_GREEN,
            Color::Yellow => COLOR_YELLOW,
            Color::Orange => COLOR_ORANGE,
            Color::Red => COLOR_RED,
            Color::White => COLOR_WHITE,
            Color::None => COLOR_NONE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "BLACK",
            Color::Pink => "PINK",
            Color::Purple => "PURPLE",
            Color::Blue => "BLUE",
            Color::LightBlue => "LIGHT_BLUE",
            Color::Cyan => "CYAN",
            Color::Green => "GREEN",
            Color::Yellow => "YELLOW",
            Color::Orange => "ORANGE",
            Color::Red => "RED",
            Color::White => "WHITE",
            Color::None => "NONE",
        }
    }
}

impl TryFrom<u8> for Color {
    type Error = HubError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Color::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| {
                HubError::invalid_argument(format!(
                    "Color 0x{:02x} is not in list of available colors",
                    code
                ))
            })
    }
}

impl FromStr for Color {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Color::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| {
                HubError::invalid_argument(format!(
                    "Color '{}' is not in list of available colors",
                    s
                ))
            })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tilt sensor reporting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiltMode {
    #[default]
    Off,
    /// Layout not characterized yet; reported as one raw byte
    TwoAxis,
    Basic,
    Full,
}

impl TiltMode {
    pub fn code(self) -> u8 {
        match self {
            TiltMode::Off => TILT_SENSOR_MODE_OFF,
            TiltMode::TwoAxis => TILT_SENSOR_MODE_2AXIS,
            TiltMode::Basic => TILT_SENSOR_MODE_BASIC,
            TiltMode::Full => TILT_SENSOR_MODE_FULL,
        }
    }

    /// Modes a subscriber may ask for
    pub fn is_subscribable(self) -> bool {
        !matches!(self, TiltMode::Off)
    }
}

impl TryFrom<u8> for TiltMode {
    type Error = HubError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            TILT_SENSOR_MODE_OFF => Ok(TiltMode::Off),
            TILT_SENSOR_MODE_2AXIS => Ok(TiltMode::TwoAxis),
            TILT_SENSOR_MODE_BASIC => Ok(TiltMode::Basic),
            TILT_SENSOR_MODE_FULL => Ok(TiltMode::Full),
            other => Err(HubError::invalid_argument(format!(
                "Wrong tilt sensor mode: 0x{:02x}",
                other
            ))),
        }
    }
}

/// Sensor types that have a pre-built listen command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    ColorSensor,
    DistanceSensor,
    Encoder,
}

impl SensorKind {
    pub fn mode(self) -> u8 {
        match self {
            SensorKind::ColorSensor => SENSOR_MODE_COLOR,
            SensorKind::DistanceSensor => SENSOR_MODE_DISTANCE,
            SensorKind::Encoder => SENSOR_MODE_ENCODER,
        }
    }
}

/// Decoded notification value delivered to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorValue {
    /// Raw orientation byte
    TiltBasic(u8),
    /// Raw byte of the not-yet-characterized two axis mode
    TiltTwoAxis(u8),
    /// Signed degrees
    TiltFull { roll: i16, pitch: i16 },
}

/// Immutable protocol settings injected into every peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protocol {
    pub packet_version: u8,
    pub write_handle: u16,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            packet_version: PACKET_VER,
            write_handle: MOVE_HUB_HARDWARE_HANDLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_codes_round_trip_through_table() {
        for port in Port::ALL {
            assert_eq!(Port::try_from(port.code()).unwrap(), port);
            assert_eq!(port.name().parse::<Port>().unwrap(), port);
        }
        assert!(Port::try_from(0x99).is_err());
        assert_eq!("ab".parse::<Port>().unwrap(), Port::AB);
    }

    #[test]
    fn test_motor_ports() {
        let motor_ports: Vec<Port> = Port::ALL.into_iter().filter(|p| p.is_motor_port()).collect();
        assert_eq!(motor_ports, vec![Port::A, Port::B, Port::AB, Port::C, Port::D]);
        assert!(Port::AB.is_combined());
        assert!(!Port::A.is_combined());
    }

    #[test]
    fn test_color_lookup() {
        assert_eq!(Color::try_from(0x09).unwrap(), Color::Red);
        assert_eq!(Color::try_from(0xFF).unwrap(), Color::None);
        assert!(Color::try_from(0x0B).is_err());
        assert_eq!("light blue".parse::<Color>().unwrap(), Color::LightBlue);
        assert!(matches!(
            "not-a-color".parse::<Color>(),
            Err(HubError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_tilt_modes() {
        assert_eq!(TiltMode::default(), TiltMode::Off);
        assert!(!TiltMode::Off.is_subscribable());
        assert!(TiltMode::Full.is_subscribable());
        assert_eq!(TiltMode::try_from(0x04).unwrap(), TiltMode::Full);
        assert!(TiltMode::try_from(0x03).is_err());
    }

    #[test]
    fn test_message_type_lookup() {
        assert_eq!(MessageType::try_from(0x45).unwrap(), MessageType::SensorData);
        assert_eq!(MessageType::SetPortVal.code(), 0x81);
        assert!(matches!(
            MessageType::try_from(0x7E),
            Err(HubError::ProtocolDecodeAmbiguity(_))
        ));
    }
}
