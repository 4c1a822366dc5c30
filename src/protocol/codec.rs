//! Wire codec
//!
//! Pure functions that build outbound command packets and read values out
//! of inbound notification payloads. Nothing here keeps state.
//!
//! Packet layout: `[length][version][message_type][port][payload...]`,
//! where `length` counts every byte including itself.

use crate::error::{HubError, Result};
use crate::protocol::constants::*;
use crate::protocol::types::{Port, Protocol, SensorKind, SensorValue};

/// Build a complete command packet.
///
/// The length byte is computed once the payload is in place. It is a single
/// byte, so the payload is limited to [`MAX_PAYLOAD_LEN`] bytes.
pub fn encode_command(protocol: &Protocol, message_type: u8, port: u8, payload: &[u8]) -> Vec<u8> {
    let mut cmd = Vec::with_capacity(HEADER_LEN + payload.len());
    cmd.push(protocol.packet_version);
    cmd.push(message_type);
    cmd.push(port);
    cmd.extend_from_slice(payload);

    debug_assert!(
        payload.len() <= MAX_PAYLOAD_LEN,
        "payload of {} bytes overflows the length byte",
        payload.len()
    );
    let len = (cmd.len() + 1) as u8;
    cmd.insert(0, len);
    cmd
}

/// Length byte of an encoded packet
pub fn decode_length(packet: &[u8]) -> Result<usize> {
    packet
        .first()
        .map(|len| *len as usize)
        .ok_or_else(|| HubError::decode("empty packet"))
}

/// Header fields of an inbound packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub length: u8,
    pub version: u8,
    pub message_type: u8,
    pub port: u8,
}

impl PacketHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(HubError::decode(format!(
                "packet of {} bytes is shorter than the header",
                data.len()
            )));
        }
        Ok(Self {
            length: data[0],
            version: data[1],
            message_type: data[2],
            port: data[3],
        })
    }
}

/// Encode a relative speed in [-1.0, 1.0] as one wire byte.
///
/// Negative values wrap by adding 255, so -1.0 becomes 155.
pub fn encode_speed_byte(relative: f64) -> Result<u8> {
    if !(-1.0..=1.0).contains(&relative) {
        return Err(HubError::invalid_argument(format!(
            "Invalid speed value: {}",
            relative
        )));
    }

    let mut absolute = (relative * 100.0).round() as i32;
    if absolute < 0 {
        absolute += 255;
    }
    Ok(absolute as u8)
}

/// Inverse of [`encode_speed_byte`], up to percent quantization
pub fn decode_speed_byte(byte: u8) -> f64 {
    let percent = if byte > 100 { byte as i32 - 255 } else { byte as i32 };
    percent as f64 / 100.0
}

fn speed_bytes(primary: f64, secondary: Option<f64>, combined: bool) -> Result<Vec<u8>> {
    let mut out = vec![encode_speed_byte(primary)?];
    if combined {
        out.push(encode_speed_byte(secondary.unwrap_or(primary))?);
    }
    Ok(out)
}

fn wrap_motor_payload(subtype: u8, param: &[u8], speeds: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(2 + param.len() + speeds.len() + MOTOR_TRAILER.len());
    payload.push(MOTOR_MOVEMENT_TYPE);
    payload.push(subtype);
    payload.extend_from_slice(param);
    payload.extend_from_slice(speeds);
    payload.extend_from_slice(&MOTOR_TRAILER);
    payload
}

/// Duration in milliseconds for a timed command
fn duration_ms(seconds: f64) -> Result<u16> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(HubError::invalid_argument(format!(
            "Invalid value for seconds: {}",
            seconds
        )));
    }

    let msec = seconds * 1000.0;
    let rounded = msec.round();
    if msec >= 65536.0 || rounded > MOTOR_MAX_DURATION_MS as f64 {
        return Err(HubError::invalid_argument(format!(
            "Too large value for seconds: {}",
            seconds
        )));
    }
    Ok(rounded as u16)
}

/// Payload of a "run for N seconds" motor command.
///
/// `combined` selects the group subtype and adds the second speed byte.
pub fn encode_timed_motor_payload(
    seconds: f64,
    speed_primary: f64,
    speed_secondary: Option<f64>,
    combined: bool,
) -> Result<Vec<u8>> {
    let subtype = if combined { MOTOR_TIMED_GROUP } else { MOTOR_TIMED_SINGLE };
    let msec = duration_ms(seconds)?;
    let speeds = speed_bytes(speed_primary, speed_secondary, combined)?;
    Ok(wrap_motor_payload(subtype, &msec.to_le_bytes(), &speeds))
}

/// Payload of a "turn N degrees" motor command
pub fn encode_angled_motor_payload(
    angle: u32,
    speed_primary: f64,
    speed_secondary: Option<f64>,
    combined: bool,
) -> Result<Vec<u8>> {
    let subtype = if combined { MOTOR_ANGLED_GROUP } else { MOTOR_ANGLED_SINGLE };
    let speeds = speed_bytes(speed_primary, speed_secondary, combined)?;
    Ok(wrap_motor_payload(subtype, &angle.to_le_bytes(), &speeds))
}

/// Duration field of a timed motor payload (as built by [`encode_timed_motor_payload`])
pub fn decode_timed_duration_ms(payload: &[u8]) -> Result<u16> {
    match payload.get(2..4) {
        Some(bytes) => Ok(u16::from_le_bytes([bytes[0], bytes[1]])),
        None => Err(HubError::decode("timed payload too short")),
    }
}

/// Mode-switch command for a sensor port
pub fn encode_mode_subscribe(protocol: &Protocol, port: u8, mode: u8) -> Vec<u8> {
    let mut params = Vec::with_capacity(1 + SUBSCRIBE_TAIL.len());
    params.push(mode);
    params.extend_from_slice(&SUBSCRIBE_TAIL);
    encode_command(protocol, MSG_SENSOR_SUBSCRIBE, port, &params)
}

/// Standard listen command for a sensor kind on a port
pub fn listen_command(protocol: &Protocol, kind: SensorKind, port: Port) -> Vec<u8> {
    encode_mode_subscribe(protocol, port.code(), kind.mode())
}

/// Reinterpret a raw tilt byte as signed degrees (values above 90 are negative)
pub fn signed_degree(value: u8) -> i16 {
    if value > TILT_DEGREE_POSITIVE_MAX {
        value as i16 - 256
    } else {
        value as i16
    }
}

fn byte_at(data: &[u8], offset: usize) -> Result<u8> {
    data.get(offset).copied().ok_or_else(|| {
        HubError::decode(format!(
            "notification of {} bytes has no reading at offset {}",
            data.len(),
            offset
        ))
    })
}

pub fn decode_tilt_basic(data: &[u8]) -> Result<SensorValue> {
    Ok(SensorValue::TiltBasic(byte_at(data, READING_PRIMARY_OFFSET)?))
}

pub fn decode_tilt_full(data: &[u8]) -> Result<SensorValue> {
    let roll = signed_degree(byte_at(data, READING_PRIMARY_OFFSET)?);
    let pitch = signed_degree(byte_at(data, READING_SECONDARY_OFFSET)?);
    Ok(SensorValue::TiltFull { roll, pitch })
}

// TODO: work out the real two axis layout from captured hub traces;
// only the first byte is surfaced.
pub fn decode_tilt_2axis(data: &[u8]) -> Result<SensorValue> {
    Ok(SensorValue::TiltTwoAxis(byte_at(data, READING_PRIMARY_OFFSET)?))
}

/// Hex dump used in log lines
pub fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
