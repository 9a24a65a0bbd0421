//! Runtime configuration for [`WifiManager`](crate::WifiManager).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::types::constants::{defaults, timeouts};

/// Configuration for a [`WifiManager`](crate::WifiManager).
///
/// All fields have defaults suited to an embedded device with a single
/// `wlan0` radio and NetworkManager's keyfile plugin.
///
/// # Examples
///
/// ```
/// use nmwifi::WifiConfig;
/// use std::time::Duration;
///
/// let config = WifiConfig::new()
///     .with_interface("wlp2s0")
///     .with_connect_timeout(Duration::from_secs(60));
///
/// assert_eq!(config.interface, "wlp2s0");
/// assert_eq!(config.connect_timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    /// Interface name of the wireless device to manage.
    pub interface: String,
    /// Directory holding persisted connection profiles.
    pub profile_dir: PathBuf,
    /// Deadline for a single connect attempt.
    pub connect_timeout: Duration,
    /// Time to wait after requesting a scan before reading results.
    pub scan_wait: Duration,
    /// Capacity of the event channel per subscriber.
    pub event_capacity: usize,
}

impl WifiConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wireless interface name.
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    /// Sets the connection profile directory.
    pub fn with_profile_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.profile_dir = dir.into();
        self
    }

    /// Sets the connect deadline.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the post-scan wait.
    pub fn with_scan_wait(mut self, wait: Duration) -> Self {
        self.scan_wait = wait;
        self
    }

    /// Sets the event channel capacity. Zero is raised to one.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            interface: defaults::WIRELESS_INTERFACE.to_string(),
            profile_dir: PathBuf::from(defaults::PROFILE_DIR),
            connect_timeout: timeouts::connection_timeout(),
            scan_wait: timeouts::scan_wait(),
            event_capacity: defaults::EVENT_CAPACITY,
        }
    }
}
