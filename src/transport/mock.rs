//! Mock connection for testing.
//!
//! Records every write instead of sending it to a hub, and can be told to
//! fail so error paths can be exercised without hardware.

use crate::protocol::codec::hex;
use crate::transport::{ConnectionPort, TransportError};
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Mock connection that logs and records writes.
#[derive(Debug, Default)]
pub struct MockConnection {
    writes: Mutex<Vec<(u16, Vec<u8>)>>,
    fail_writes: AtomicBool,
}

impl MockConnection {
    /// Create a new mock connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// All recorded writes as `(handle, bytes)`.
    pub fn writes(&self) -> Vec<(u16, Vec<u8>)> {
        self.writes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Recorded packets without their handles.
    pub fn packets(&self) -> Vec<Vec<u8>> {
        self.writes().into_iter().map(|(_, data)| data).collect()
    }

    pub fn last_packet(&self) -> Option<Vec<u8>> {
        self.packets().pop()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn clear(&self) {
        self.writes.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl ConnectionPort for MockConnection {
    fn write(&self, handle: u16, data: &[u8]) -> Result<(), TransportError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            info!("[MOCK HUB] Write rejected: handle=0x{:02x} [{}]", handle, hex(data));
            return Err(TransportError::Write("mock write failure".to_string()));
        }

        info!("[MOCK HUB] Write: handle=0x{:02x} [{}]", handle, hex(data));
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((handle, data.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_connection_records_writes() {
        let conn = MockConnection::new();
        assert!(conn.write(0x0E, &[0x01, 0x02]).is_ok());
        assert!(conn.write(0x0E, &[0x03]).is_ok());

        assert_eq!(conn.write_count(), 2);
        assert_eq!(conn.last_packet(), Some(vec![0x03]));
        assert_eq!(conn.writes()[0], (0x0E, vec![0x01, 0x02]));

        conn.clear();
        assert_eq!(conn.write_count(), 0);
    }

    #[test]
    fn mock_connection_can_fail() {
        let conn = MockConnection::new();
        conn.set_fail_writes(true);
        assert!(matches!(conn.write(0x0E, &[0x01]), Err(TransportError::Write(_))));
        assert_eq!(conn.write_count(), 0);

        conn.set_fail_writes(false);
        assert!(conn.write(0x0E, &[0x01]).is_ok());
    }
}
