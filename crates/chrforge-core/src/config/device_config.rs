use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::models::{DeviceDetails, DeviceType};

/// Which device profile to present. Unset fields fall back to the preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub device_type: DeviceType,
    pub app_version: Option<String>,
    pub system_name: Option<String>,
    pub system_version: Option<String>,
    pub system_model: Option<String>,
}

impl DeviceConfig {
    /// Resolve into concrete device details.
    ///
    /// Presets are used unless system info is overridden; device types
    /// without a preset need the full custom triple.
    pub fn resolve(&self) -> Result<DeviceDetails, ConfigError> {
        let custom = self.system_name.is_some() || self.system_version.is_some();
        if !custom {
            if let Some(details) = DeviceDetails::preset(self.device_type, self.app_version.as_deref()) {
                return Ok(details);
            }
        }
        match (&self.app_version, &self.system_name, &self.system_version) {
            (Some(app), Some(name), Some(version)) => DeviceDetails::custom(
                self.device_type,
                app,
                name,
                version,
                self.system_model.as_deref(),
            ),
            _ => Err(ConfigError::IncompleteCustomDevice {
                name: self.device_type.as_str().to_string(),
            }),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: DeviceType::ChromeOs,
            app_version: None,
            system_name: None,
            system_version: None,
            system_model: None,
        }
    }
}
