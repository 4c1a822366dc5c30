//! Transport abstraction for writing to the hub
//!
//! Peripherals only ever see [`ConnectionPort`]; the BLE adapter and the
//! recording mock are the two implementations shipped with the crate.

pub mod ble;
pub mod mock;

pub use ble::BleConnection;
pub use mock::MockConnection;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Not connected to the hub")]
    NotConnected,

    #[error("Hub characteristic not found")]
    CharacteristicNotFound,

    #[error("Unknown characteristic handle 0x{0:04x}")]
    UnknownHandle(u16),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("BLE error: {0}")]
    Ble(#[from] btleplug::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound side of the hub connection.
///
/// Writes are synchronous from the caller's point of view. Implementations
/// must not retry; a failed write is reported once.
pub trait ConnectionPort: Send + Sync {
    /// Write a complete packet to the characteristic identified by `handle`
    fn write(&self, handle: u16, data: &[u8]) -> Result<(), TransportError>;
}
