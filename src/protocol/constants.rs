//! Move Hub protocol constants
//!
//! This module contains the raw numeric tables used on the wire:
//! - BLE identity of the hub characteristic
//! - Packet header values and message types
//! - Port codes, color codes, tilt modes
//! - Motor command bytes

use uuid::Uuid;

// ============================================================================
// BLE Characteristic
// ============================================================================

/// Hub service/characteristic UUID (commands are written here, sensor data is notified here)
pub const MOVE_HUB_HARDWARE_UUID: Uuid = Uuid::from_u128(0x00001624_1212_efde_1623_785feabcd123);

/// Attribute handle of the command-write characteristic
pub const MOVE_HUB_HARDWARE_HANDLE: u16 = 0x0E;

// ============================================================================
// Packet Header
// ============================================================================

/// Protocol version byte written at offset 1 of every packet
pub const PACKET_VER: u8 = 0x00;

/// Size of `[length][version][message_type][port]`
pub const HEADER_LEN: usize = 4;
/// Largest payload whose packet length still fits the length byte
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize - HEADER_LEN;

// Message types
pub const MSG_DEVICE_INFO: u8 = 0x01;
pub const MSG_DEVICE_SHUTDOWN: u8 = 0x02;
pub const MSG_PING_RESPONSE: u8 = 0x03;
pub const MSG_PORT_INFO: u8 = 0x04;
pub const MSG_PORT_CMD_ERROR: u8 = 0x05;
pub const MSG_SENSOR_SUBSCRIBE: u8 = 0x41;
pub const MSG_SENSOR_DATA: u8 = 0x45;
pub const MSG_SENSOR_SUBSCRIBE_ACK: u8 = 0x47;
pub const MSG_SET_PORT_VAL: u8 = 0x81;
pub const MSG_PORT_STATUS: u8 = 0x82;

// ============================================================================
// Ports
// ============================================================================

pub const PORT_C: u8 = 0x01;
pub const PORT_D: u8 = 0x02;
pub const PORT_LED: u8 = 0x32;
pub const PORT_A: u8 = 0x37;
pub const PORT_B: u8 = 0x38;
/// Motors A and B driven together
pub const PORT_AB: u8 = 0x39;
pub const PORT_TILT_SENSOR: u8 = 0x3A;
pub const PORT_AMPERAGE: u8 = 0x3B;
pub const PORT_VOLTAGE: u8 = 0x3C;

/// The hub button is not a physical port; it is always addressed as 0
pub const PORT_BUTTON: u8 = 0x00;

// ============================================================================
// Port Info (attach/detach announcements)
// ============================================================================

pub const PORT_INFO_DETACHED: u8 = 0x00;
pub const PORT_INFO_ATTACHED: u8 = 0x01;
pub const PORT_INFO_GROUPED: u8 = 0x02;

pub const DEV_VOLTAGE: u8 = 0x14;
pub const DEV_AMPERAGE: u8 = 0x15;
pub const DEV_LED: u8 = 0x17;
pub const DEV_COLOR_DISTANCE: u8 = 0x25;
pub const DEV_IMOTOR: u8 = 0x26;
pub const DEV_MOTOR: u8 = 0x27;
pub const DEV_TILT_SENSOR: u8 = 0x28;

// ============================================================================
// Colors
// ============================================================================

pub const COLOR_BLACK: u8 = 0x00;
pub const COLOR_PINK: u8 = 0x01;
pub const COLOR_PURPLE: u8 = 0x02;
pub const COLOR_BLUE: u8 = 0x03;
pub const COLOR_LIGHT_BLUE: u8 = 0x04;
pub const COLOR_CYAN: u8 = 0x05;
pub const COLOR_GREEN: u8 = 0x06;
pub const COLOR_YELLOW: u8 = 0x07;
pub const COLOR_ORANGE: u8 = 0x08;
pub const COLOR_RED: u8 = 0x09;
pub const COLOR_WHITE: u8 = 0x0A;
pub const COLOR_NONE: u8 = 0xFF;

/// LED "set color" payload prefix; the color byte follows
pub const LED_SET_COLOR_PREFIX: [u8; 3] = [0x11, 0x51, 0x00];

// ============================================================================
// Tilt Sensor
// ============================================================================

pub const TILT_SENSOR_MODE_OFF: u8 = 0x00;
pub const TILT_SENSOR_MODE_2AXIS: u8 = 0x01;
pub const TILT_SENSOR_MODE_BASIC: u8 = 0x02;
pub const TILT_SENSOR_MODE_FULL: u8 = 0x04;

/// Bytes following the mode byte in a sensor subscribe command
/// (notification interval 1 as u32 LE, then "notify enabled")
pub const SUBSCRIBE_TAIL: [u8; 5] = [0x01, 0x00, 0x00, 0x00, 0x01];

/// Notification offsets of the primary and secondary readings
pub const READING_PRIMARY_OFFSET: usize = 4;
pub const READING_SECONDARY_OFFSET: usize = 5;

/// Raw tilt bytes above this value are negative degrees
pub const TILT_DEGREE_POSITIVE_MAX: u8 = 90;

/// Sensor modes used by the pre-built listen commands
pub const SENSOR_MODE_COLOR: u8 = 0x08;
pub const SENSOR_MODE_DISTANCE: u8 = 0x08;
pub const SENSOR_MODE_ENCODER: u8 = 0x02;

// ============================================================================
// Motors
// ============================================================================

pub const MOTOR_MOVEMENT_TYPE: u8 = 0x11;
pub const MOTOR_TIMED_SINGLE: u8 = 0x09;
pub const MOTOR_TIMED_GROUP: u8 = 0x0A;
pub const MOTOR_ANGLED_SINGLE: u8 = 0x0B;
pub const MOTOR_ANGLED_GROUP: u8 = 0x0C;

/// Fixed bytes closing every motor command (0x64 = 100, max power)
pub const MOTOR_TRAILER: [u8; 3] = [0x64, 0x7F, 0x03];

/// Largest duration a timed command can carry, in milliseconds
pub const MOTOR_MAX_DURATION_MS: u32 = u16::MAX as u32;

/// Speed used when the caller does not give one
pub const DEFAULT_SPEED: f64 = 1.0;
