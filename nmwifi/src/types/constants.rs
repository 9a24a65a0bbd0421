//! Constants for NetworkManager D-Bus interface values.
//!
//! These constants correspond to the numeric codes used by NetworkManager's
//! D-Bus API for device types, states, security flags, and other values.

/// NetworkManager device type constants.
pub mod device_type {
    pub const WIFI: u32 = 2;
}

/// Well-known NetworkManager object paths and interfaces.
pub mod paths {
    pub const SERVICE: &str = "org.freedesktop.NetworkManager";
    pub const SETTINGS: &str = "/org/freedesktop/NetworkManager/Settings";
    pub const SETTINGS_CONNECTION: &str = "org.freedesktop.NetworkManager.Settings.Connection";
    /// Placeholder object path meaning "none".
    pub const NONE: &str = "/";
}

/// Defaults used by [`WifiConfig`](crate::WifiConfig).
pub mod defaults {
    pub const WIRELESS_INTERFACE: &str = "wlan0";
    pub const PROFILE_DIR: &str = "/etc/NetworkManager/system-connections/";
    pub const EVENT_CAPACITY: usize = 64;
}

/// Timeout constants for signal-based waiting.
pub mod timeouts {
    use std::time::Duration;

    /// Maximum time to wait for a connection to activate (30 seconds).
    const CONNECTION_TIMEOUT_SECS: u64 = 30;

    /// Time to wait after requesting a scan before checking results (2 seconds).
    ///
    /// While we could use signals for scan completion, a short delay is
    /// sufficient for now, and simpler for most use cases.
    const SCAN_WAIT_SECS: u64 = 2;

    /// Returns the connection activation timeout.
    pub fn connection_timeout() -> Duration {
        Duration::from_secs(CONNECTION_TIMEOUT_SECS)
    }

    /// Returns the scan wait duration.
    pub fn scan_wait() -> Duration {
        Duration::from_secs(SCAN_WAIT_SECS)
    }
}
