//! Encoded motors
//!
//! A motor lives on one of A, B, C, D or on the combined AB port, where each
//! command carries one speed byte per motor.

use crate::error::{HubError, Result};
use crate::peripherals::base::Peripheral;
use crate::protocol::codec::{encode_angled_motor_payload, encode_timed_motor_payload};
use crate::protocol::constants::MSG_SET_PORT_VAL;
use crate::protocol::types::{Port, Protocol};
use crate::transport::ConnectionPort;
use log::debug;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub struct EncodedMotor {
    base: Peripheral,
}

impl EncodedMotor {
    /// Fails with `InvalidArgument` unless `port` is A, B, AB, C or D
    pub fn new(
        port: Port,
        protocol: Protocol,
        connection: Arc<dyn ConnectionPort>,
    ) -> Result<Self> {
        if !port.is_motor_port() {
            return Err(HubError::invalid_argument(format!(
                "Invalid port for motor: {}",
                port
            )));
        }
        Ok(Self {
            base: Peripheral::new(port, protocol, connection),
        })
    }

    /// Run for `seconds` at the given relative speed(s).
    ///
    /// `speed_secondary` only matters on port AB and defaults to
    /// `speed_primary`. Unless `run_async` is set the call sleeps for
    /// `seconds` after the write; the hub reports no completion, so this is
    /// a plain wall-clock wait.
    pub fn run_timed(
        &self,
        seconds: f64,
        speed_primary: f64,
        speed_secondary: Option<f64>,
        run_async: bool,
    ) -> Result<()> {
        let payload = encode_timed_motor_payload(
            seconds,
            speed_primary,
            speed_secondary,
            self.base.port().is_combined(),
        )?;
        self.base.send_command(MSG_SET_PORT_VAL, &payload)?;

        if !run_async {
            debug!("Motor {}: waiting {}s", self.base.port(), seconds);
            thread::sleep(Duration::from_secs_f64(seconds));
        }
        Ok(())
    }

    /// Turn by `angle` degrees.
    ///
    /// Returns right after the write: the hub gives no signal when the
    /// motor reaches the angle.
    pub fn run_angled(
        &self,
        angle: u32,
        speed_primary: f64,
        speed_secondary: Option<f64>,
    ) -> Result<()> {
        let payload = encode_angled_motor_payload(
            angle,
            speed_primary,
            speed_secondary,
            self.base.port().is_combined(),
        )?;
        self.base.send_command(MSG_SET_PORT_VAL, &payload)
    }
}

impl Deref for EncodedMotor {
    type Target = Peripheral;

    fn deref(&self) -> &Peripheral {
        &self.base
    }
}

impl fmt::Display for EncodedMotor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedMotor on port {}", self.base.port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::DEFAULT_SPEED;
    use crate::transport::MockConnection;
    use std::time::Instant;

    fn motor(port: Port) -> (Arc<MockConnection>, EncodedMotor) {
        let conn = Arc::new(MockConnection::new());
        let motor = EncodedMotor::new(port, Protocol::default(), conn.clone()).unwrap();
        (conn, motor)
    }

    #[test]
    fn test_rejects_non_motor_ports() {
        let conn = Arc::new(MockConnection::new());
        for port in [Port::Led, Port::TiltSensor, Port::Button, Port::Voltage] {
            assert!(matches!(
                EncodedMotor::new(port, Protocol::default(), conn.clone()),
                Err(HubError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_timed_async_returns_immediately() {
        let (conn, motor) = motor(Port::A);
        let start = Instant::now();
        motor.run_timed(0.5, 0.5, None, true).unwrap();
        assert!(start.elapsed() < Duration::from_millis(400));
        assert_eq!(
            conn.last_packet().unwrap(),
            vec![0x0C, 0x00, 0x81, 0x37, 0x11, 0x09, 0xF4, 0x01, 0x32, 0x64, 0x7F, 0x03]
        );
    }

    #[test]
    fn test_timed_blocks_for_duration() {
        let (conn, motor) = motor(Port::B);
        let start = Instant::now();
        motor.run_timed(0.2, DEFAULT_SPEED, None, false).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(200));
        assert_eq!(conn.write_count(), 1);
    }

    #[test]
    fn test_group_port_sends_two_speeds() {
        let (conn, motor) = motor(Port::AB);
        motor.run_timed(1.0, 1.0, Some(-1.0), true).unwrap();
        assert_eq!(
            conn.last_packet().unwrap(),
            vec![0x0D, 0x00, 0x81, 0x39, 0x11, 0x0A, 0xE8, 0x03, 0x64, 0x9B, 0x64, 0x7F, 0x03]
        );

        motor.run_angled(360, 0.5, None).unwrap();
        assert_eq!(
            conn.last_packet().unwrap(),
            vec![
                0x0F, 0x00, 0x81, 0x39, 0x11, 0x0C, 0x68, 0x01, 0x00, 0x00, 0x32, 0x32, 0x64, 0x7F,
                0x03
            ]
        );
    }

    #[test]
    fn test_invalid_arguments_write_nothing() {
        let (conn, motor) = motor(Port::C);
        assert!(motor.run_timed(70.0, 1.0, None, true).is_err());
        assert!(motor.run_timed(1.0, 1.5, None, true).is_err());
        assert!(motor.run_angled(90, -2.0, None).is_err());
        assert_eq!(conn.write_count(), 0);
    }

    #[test]
    fn test_single_port_ignores_secondary_speed() {
        let (conn, motor) = motor(Port::D);
        motor.run_angled(90, 0.1, Some(0.9)).unwrap();
        let packet = conn.last_packet().unwrap();
        assert_eq!(packet[0] as usize, packet.len());
        assert_eq!(&packet[10..], &[0x0A, 0x64, 0x7F, 0x03]);
    }
}
