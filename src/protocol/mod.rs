//! Move Hub wire protocol
//!
//! This module covers everything byte-exact about talking to the hub:
//! - Constant tables (ports, message types, colors, modes)
//! - Typed views of those tables
//! - Command encoding and notification decoding

pub mod codec;
pub mod constants;
pub mod types;

// Re-export commonly used items
pub use codec::*;
pub use types::*;
