//! RGB LED on the hub

use crate::error::Result;
use crate::peripherals::base::Peripheral;
use crate::protocol::constants::{LED_SET_COLOR_PREFIX, MSG_SET_PORT_VAL};
use crate::protocol::types::{Color, Port, Protocol};
use crate::transport::ConnectionPort;
use log::info;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

pub struct Led {
    base: Peripheral,
}

impl Led {
    pub fn new(port: Port, protocol: Protocol, connection: Arc<dyn ConnectionPort>) -> Self {
        Self {
            base: Peripheral::new(port, protocol, connection),
        }
    }

    /// Set the LED to a color code from the color table.
    ///
    /// Codes outside the table are rejected before anything is written.
    pub fn set_color(&self, code: u8) -> Result<()> {
        let color = Color::try_from(code)?;
        self.set(color)
    }

    /// Set the LED by color name, e.g. `"red"` or `"light blue"`
    pub fn set_named_color(&self, name: &str) -> Result<()> {
        let color: Color = name.parse()?;
        self.set(color)
    }

    pub fn set(&self, color: Color) -> Result<()> {
        let mut payload = LED_SET_COLOR_PREFIX.to_vec();
        payload.push(color.code());
        self.base.send_command(MSG_SET_PORT_VAL, &payload)?;
        info!("LED set to {}", color);
        Ok(())
    }
}

impl Deref for Led {
    type Target = Peripheral;

    fn deref(&self) -> &Peripheral {
        &self.base
    }
}

impl fmt::Display for Led {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LED on port {}", self.base.port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HubError;
    use crate::transport::MockConnection;

    fn led() -> (Arc<MockConnection>, Led) {
        let conn = Arc::new(MockConnection::new());
        let led = Led::new(Port::Led, Protocol::default(), conn.clone());
        (conn, led)
    }

    #[test]
    fn test_set_color_packet() {
        let (conn, led) = led();
        led.set_color(0x09).unwrap();
        assert_eq!(
            conn.last_packet().unwrap(),
            vec![0x08, 0x00, 0x81, 0x32, 0x11, 0x51, 0x00, 0x09]
        );

        led.set_named_color("white").unwrap();
        assert_eq!(conn.last_packet().unwrap()[7], 0x0A);
    }

    #[test]
    fn test_invalid_color_writes_nothing() {
        let (conn, led) = led();
        assert!(matches!(led.set_color(0x42), Err(HubError::InvalidArgument(_))));
        assert!(matches!(
            led.set_named_color("not-a-color"),
            Err(HubError::InvalidArgument(_))
        ));
        assert_eq!(conn.write_count(), 0);
    }

    #[test]
    fn test_display() {
        let (_, led) = led();
        assert_eq!(led.to_string(), "LED on port LED");
    }
}
