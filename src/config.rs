//! Configuration loader and validator
//!
//! Loads hub configuration from TOML files in the configs/ directory.

use crate::protocol::constants::{MOVE_HUB_HARDWARE_HANDLE, PACKET_VER};
use crate::protocol::types::{Port, Protocol};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    /// Wire protocol settings
    #[serde(default)]
    pub protocol: ProtocolSettings,

    /// Devices plugged into the external ports
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Wire protocol settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolSettings {
    /// Version byte written into every packet
    #[serde(default = "default_packet_version")]
    pub packet_version: u8,

    /// Handle of the command-write characteristic
    #[serde(default = "default_write_handle")]
    pub write_handle: u16,
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            packet_version: default_packet_version(),
            write_handle: default_write_handle(),
        }
    }
}

fn default_packet_version() -> u8 { PACKET_VER }
fn default_write_handle() -> u16 { MOVE_HUB_HARDWARE_HANDLE }

/// A device plugged into port C or D
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// Port name ("C" or "D")
    pub port: String,

    pub device: AttachmentKind,
}

/// Kinds of devices that can sit on an external port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    ColorDistance,
    Motor,
}

impl HubConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        info!("Loading configuration from: {}", path_ref.display());

        let content = std::fs::read_to_string(path_ref)?;
        Self::from_toml_str(&content)
    }

    /// Load default configuration from configs/default.toml
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load("configs/default.toml")
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: HubConfig = toml::from_str(content)?;

        debug!("  - Packet version: 0x{:02x}", config.protocol.packet_version);
        debug!("  - Write handle: 0x{:02x}", config.protocol.write_handle);
        debug!("  - Attachments: {}", config.attachments.len());

        config.validate()?;
        info!("✓ Config validation passed");

        Ok(config)
    }

    /// Protocol values injected into every peripheral
    pub fn protocol(&self) -> Protocol {
        Protocol {
            packet_version: self.protocol.packet_version,
            write_handle: self.protocol.write_handle,
        }
    }

    /// Attachments with their ports resolved
    pub fn resolved_attachments(&self) -> Result<Vec<(Port, AttachmentKind)>, ConfigError> {
        self.attachments
            .iter()
            .map(|a| {
                let port: Port = a.port.parse().map_err(|_| {
                    ConfigError::Invalid(format!("Unknown port '{}' in attachments", a.port))
                })?;
                Ok((port, a.device))
            })
            .collect()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();

        for (port, _) in self.resolved_attachments()? {
            if !port.is_external() {
                return Err(ConfigError::Invalid(format!(
                    "Attachments are only allowed on ports C and D, got {}",
                    port
                )));
            }

            if !seen.insert(port) {
                return Err(ConfigError::Invalid(format!(
                    "Port {} has more than one attachment",
                    port
                )));
            }
        }

        Ok(())
    }
}
