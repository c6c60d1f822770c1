//! Device profiles: the identity the client presents to the backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::errors::ConfigError;

macro_rules! device_types {
    ($($variant:ident => $wire:literal),+ $(,)?) => {
        /// Application types recognised by the backend.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum DeviceType {
            $($variant),+
        }

        impl DeviceType {
            /// Every known device type, in declaration order.
            pub const ALL: &'static [DeviceType] = &[$(DeviceType::$variant),+];

            /// Name used on the wire and in config files.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl FromStr for DeviceType {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(ConfigError::UnknownDevice { name: other.to_string() }),
                }
            }
        }
    };
}

device_types! {
    DesktopWin => "DESKTOPWIN",
    DesktopMac => "DESKTOPMAC",
    ChromeOs => "CHROMEOS",
    Android => "ANDROID",
    AndroidSecondary => "ANDROIDSECONDARY",
    Ios => "IOS",
    IosIpad => "IOSIPAD",
    WatchOs => "WATCHOS",
    WearOs => "WEAROS",
    VisionOs => "VISIONOS",
    OpenchatPlus => "OPENCHAT_PLUS",
    ChannelGw => "CHANNELGW",
    ChannelCp => "CHANNELCP",
    ClovaFriends => "CLOVAFRIENDS",
    Bot => "BOT",
    Wap => "WAP",
    Web => "WEB",
    BizWeb => "BIZWEB",
    DummyPrimary => "DUMMYPRIMARY",
    Square => "SQUARE",
    FirefoxOs => "FIREFOXOS",
    Tizen => "TIZEN",
    Virtual => "VIRTUAL",
    Chrono => "CHRONO",
    WinMetro => "WINMETRO",
    S40 => "S40",
    WinPhone => "WINPHONE",
    BlackBerry => "BLACKBERRY",
    Internal => "INTERNAL",
}

impl DeviceType {
    /// Device types that can hold v3 (refreshable) tokens.
    pub fn supports_v3_token(&self) -> bool {
        matches!(self, Self::DesktopWin | Self::DesktopMac | Self::ChromeOs)
    }

    /// Device types that can use the sync endpoints.
    pub fn supports_sync(&self) -> bool {
        matches!(
            self,
            Self::Ios
                | Self::IosIpad
                | Self::Android
                | Self::ChromeOs
                | Self::DesktopWin
                | Self::DesktopMac
        )
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeviceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeviceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

const DEFAULT_SYSTEM_VERSION: &str = "12.1.4";
const DEFAULT_SYSTEM_MODEL: &str = "System Product Name";
const DEFAULT_USER_DOMAIN: &str = "KORONE-MY-WAIFU";

const CHROMEOS_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 11.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// Immutable description of the device the client impersonates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDetails {
    pub device: DeviceType,
    pub app_version: String,
    pub system_name: String,
    #[serde(default = "default_system_version")]
    pub system_version: String,
    #[serde(default = "default_system_model")]
    pub system_model: String,
    #[serde(default = "default_user_domain")]
    pub user_domain: String,
    #[serde(default)]
    pub is_secondary: bool,
}

fn default_system_version() -> String {
    DEFAULT_SYSTEM_VERSION.to_string()
}

fn default_system_model() -> String {
    DEFAULT_SYSTEM_MODEL.to_string()
}

fn default_user_domain() -> String {
    DEFAULT_USER_DOMAIN.to_string()
}

impl DeviceDetails {
    fn base(device: DeviceType, app_version: &str, system_name: &str) -> Self {
        Self {
            device,
            app_version: app_version.to_string(),
            system_name: system_name.to_string(),
            system_version: default_system_version(),
            system_model: default_system_model(),
            user_domain: default_user_domain(),
            is_secondary: false,
        }
    }

    /// Built-in profile for a device type, with an optional app version override.
    ///
    /// Returns `None` for the special device types that have no preset.
    pub fn preset(device: DeviceType, version: Option<&str>) -> Option<Self> {
        let mut details = match device {
            DeviceType::DesktopWin => Self {
                system_version: "10.0.0-NT-x64".into(),
                system_model: DEFAULT_USER_DOMAIN.into(),
                ..Self::base(device, "9.2.0.3403", "WINDOWS")
            },
            DeviceType::DesktopMac => Self {
                system_model: DEFAULT_USER_DOMAIN.into(),
                ..Self::base(device, "9.2.0.3402", "MAC")
            },
            DeviceType::ChromeOs => Self {
                system_version: "1".into(),
                system_model: "Chrome".into(),
                user_domain: "CHROMEOS".into(),
                ..Self::base(device, "3.0.3", "Chrome_OS")
            },
            DeviceType::Android => Self::base(device, "13.4.1", "Android OS"),
            DeviceType::AndroidSecondary => Self {
                is_secondary: true,
                ..Self::base(device, "13.4.1", "Android OS")
            },
            DeviceType::Ios => Self::base(device, "13.3.0", "iOS"),
            DeviceType::IosIpad => Self {
                system_model: "iPad5,1".into(),
                ..Self::base(device, "13.3.0", "iOS")
            },
            DeviceType::WatchOs => Self::base(device, "13.3.0", "Watch OS"),
            DeviceType::WearOs => Self::base(device, "13.4.1", "Wear OS"),
            DeviceType::VisionOs => Self {
                system_model: "RealityDevice14,1".into(),
                ..Self::base(device, "1.0.0", "visionOS")
            },
            _ => return None,
        };
        if let Some(v) = version {
            details.app_version = v.to_string();
        }
        Some(details)
    }

    /// A profile for a device type without a preset (or a preset with custom system info).
    pub fn custom(
        device: DeviceType,
        app_version: &str,
        system_name: &str,
        system_version: &str,
        system_model: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if app_version.is_empty() || system_name.is_empty() || system_version.is_empty() {
            return Err(ConfigError::IncompleteCustomDevice {
                name: device.as_str().to_string(),
            });
        }
        Ok(Self {
            system_version: system_version.to_string(),
            system_model: system_model.unwrap_or(DEFAULT_SYSTEM_MODEL).to_string(),
            ..Self::base(device, app_version, system_name)
        })
    }

    /// `TYPE\tVERSION\tSYSTEM\tSYSTEM_VERSION`, suffixed for secondary devices.
    pub fn app_name(&self) -> String {
        let name = format!(
            "{}\t{}\t{}\t{}",
            self.device.as_str(),
            self.app_version,
            self.system_name,
            self.system_version
        );
        if self.is_secondary {
            format!("{name};SECONDARY")
        } else {
            name
        }
    }

    pub fn user_agent(&self) -> String {
        match self.device {
            DeviceType::ChromeOs => CHROMEOS_USER_AGENT.to_string(),
            DeviceType::DesktopWin | DeviceType::DesktopMac => {
                let desktop = if self.device == DeviceType::DesktopWin {
                    "WINDOWS"
                } else {
                    "MAC"
                };
                format!("DESKTOP:{desktop}:{}({})", self.system_version, self.app_version)
            }
            _ => format!(
                "Line/{} {} {}",
                self.app_version, self.system_model, self.system_version
            ),
        }
    }

    /// Stable fingerprint binding a session to this device and client install.
    pub fn fingerprint(&self, install_id: &Uuid) -> Vec<u8> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.app_name().as_bytes());
        hasher.update(&[0]);
        hasher.update(self.user_domain.as_bytes());
        hasher.update(&[0]);
        hasher.update(install_id.as_bytes());
        hasher.finalize().as_bytes().to_vec()
    }
}

impl Default for DeviceDetails {
    fn default() -> Self {
        // ChromeOS always has a preset.
        Self::preset(DeviceType::ChromeOs, None)
            .unwrap_or_else(|| Self::base(DeviceType::ChromeOs, "3.0.3", "Chrome_OS"))
    }
}
