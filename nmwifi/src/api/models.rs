use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

/// Connection state of a single catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessPointState {
    /// The device is associated with this access point.
    Connected,
    /// Any other access point in range.
    Disconnected,
}

impl Display for AccessPointState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "Connected"),
            Self::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// A secured, named access point as held by the catalog.
///
/// Records are produced from [`RawAccessPoint`]s during a scan. Unsecured
/// networks and networks without an SSID never become records.
///
/// # Examples
///
/// ```
/// use nmwifi::{AccessPointRecord, AccessPointState};
///
/// let home = AccessPointRecord {
///     name: "Home".into(),
///     frequency: 2437,
///     state: AccessPointState::Connected,
///     secured: true,
///     signal_strength: 82,
/// };
/// assert!(home.is_connected());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPointRecord {
    /// Network SSID
    pub name: String,
    /// Frequency in MHz
    pub frequency: u32,
    /// Whether this is the active access point
    pub state: AccessPointState,
    /// Always `true` for records admitted into the catalog
    pub secured: bool,
    /// Signal strength, the primary ordering key
    pub signal_strength: i32,
}

impl AccessPointRecord {
    /// Returns `true` if this record is the active access point.
    pub fn is_connected(&self) -> bool {
        self.state == AccessPointState::Connected
    }
}

/// An access point exactly as reported by the network service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAccessPoint {
    /// SSID, empty for hidden networks
    pub ssid: String,
    /// Frequency in MHz
    pub frequency: u32,
    /// Whether the access point requires authentication
    pub secured: bool,
    /// Signal strength as reported by the service
    pub signal_strength: i32,
}

/// Immutable, sorted view of the catalog as of the last replacement.
///
/// Cloning a snapshot is cheap; all clones share the same records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    records: Arc<Vec<AccessPointRecord>>,
}

impl CatalogSnapshot {
    pub(crate) fn new(records: Vec<AccessPointRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    /// Returns the connected record, if any.
    pub fn connected(&self) -> Option<&AccessPointRecord> {
        self.records.iter().find(|r| r.is_connected())
    }

    /// Copies the records out of the snapshot.
    pub fn to_vec(&self) -> Vec<AccessPointRecord> {
        self.records.as_ref().clone()
    }
}

impl Deref for CatalogSnapshot {
    type Target = [AccessPointRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

/// Outcome of a connect request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// The service reported the connection as established.
    Successful,
    /// The service rejected the attempt, or it timed out or was cancelled.
    Failed,
    /// The SSID is not in the catalog and was not declared hidden.
    WrongProtocol,
}

impl Display for ConnectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Successful => write!(f, "successful"),
            Self::Failed => write!(f, "failed"),
            Self::WrongProtocol => write!(f, "wrong protocol"),
        }
    }
}

/// Where the connection controller is in its connect state machine.
///
/// `Idle -> Connecting -> Finished(status)`. Every finished state is terminal
/// for that attempt; a new `connect` call starts over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectPhase {
    /// No connect request has been made yet.
    Idle,
    /// A connect request for this SSID is in flight.
    Connecting { ssid: String },
    /// The last connect request resolved with this status.
    Finished(ConnectionStatus),
}

/// NetworkManager global state.
///
/// Mirrors the `NMState` values reported on the main NetworkManager object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagerState {
    /// Networking state is unknown.
    Unknown,
    /// Networking is not enabled (the system is being suspended or resumed).
    Asleep,
    /// There is no active network connection.
    Disconnected,
    /// Network connections are being cleaned up.
    Disconnecting,
    /// A network connection is being started.
    Connecting,
    /// There is only local IPv4 and/or IPv6 connectivity.
    ConnectedLocal,
    /// There is only site-wide IPv4 and/or IPv6 connectivity.
    ConnectedSite,
    /// There is global IPv4 and/or IPv6 Internet connectivity.
    ConnectedGlobal,
    /// State code not mapped to a specific variant.
    Other(u32),
}

impl From<u32> for ManagerState {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Unknown,
            10 => Self::Asleep,
            20 => Self::Disconnected,
            30 => Self::Disconnecting,
            40 => Self::Connecting,
            50 => Self::ConnectedLocal,
            60 => Self::ConnectedSite,
            70 => Self::ConnectedGlobal,
            v => Self::Other(v),
        }
    }
}

impl Display for ManagerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Asleep => write!(f, "asleep"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Disconnecting => write!(f, "disconnecting"),
            Self::Connecting => write!(f, "connecting"),
            Self::ConnectedLocal => write!(f, "connected (local)"),
            Self::ConnectedSite => write!(f, "connected (site)"),
            Self::ConnectedGlobal => write!(f, "connected (global)"),
            Self::Other(v) => write!(f, "unknown state ({v})"),
        }
    }
}

/// NetworkManager device states.
///
/// Represents the current operational state of a network device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceState {
    /// Device is not managed by NetworkManager.
    Unmanaged,
    /// Device is managed but not yet available (e.g., Wi-Fi disabled).
    Unavailable,
    /// Device is available but not connected.
    Disconnected,
    /// Device is preparing to connect.
    Prepare,
    /// Device is being configured.
    Config,
    /// Device needs credentials to continue.
    NeedAuth,
    /// Device is requesting IP configuration.
    IpConfig,
    /// Device is checking IP connectivity.
    IpCheck,
    /// Device is waiting for secondary connections.
    Secondaries,
    /// Device is fully connected and operational.
    Activated,
    /// Device is disconnecting.
    Deactivating,
    /// Device connection failed.
    Failed,
    /// Unknown or unsupported state with raw code.
    Other(u32),
}

impl From<u32> for DeviceState {
    fn from(value: u32) -> Self {
        match value {
            10 => DeviceState::Unmanaged,
            20 => DeviceState::Unavailable,
            30 => DeviceState::Disconnected,
            40 => DeviceState::Prepare,
            50 => DeviceState::Config,
            60 => DeviceState::NeedAuth,
            70 => DeviceState::IpConfig,
            80 => DeviceState::IpCheck,
            90 => DeviceState::Secondaries,
            100 => DeviceState::Activated,
            110 => DeviceState::Deactivating,
            120 => DeviceState::Failed,
            v => DeviceState::Other(v),
        }
    }
}

impl Display for DeviceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceState::Unmanaged => write!(f, "Unmanaged"),
            DeviceState::Unavailable => write!(f, "Unavailable"),
            DeviceState::Disconnected => write!(f, "Disconnected"),
            DeviceState::Prepare => write!(f, "Preparing"),
            DeviceState::Config => write!(f, "Configuring"),
            DeviceState::NeedAuth => write!(f, "Needs authentication"),
            DeviceState::IpConfig => write!(f, "Requesting IP configuration"),
            DeviceState::IpCheck => write!(f, "Checking IP connectivity"),
            DeviceState::Secondaries => write!(f, "Waiting for secondaries"),
            DeviceState::Activated => write!(f, "Activated"),
            DeviceState::Deactivating => write!(f, "Deactivating"),
            DeviceState::Failed => write!(f, "Failed"),
            DeviceState::Other(v) => write!(f, "Other({v})"),
        }
    }
}

/// NetworkManager active connection state.
///
/// These values represent the lifecycle states of an active connection
/// as reported by the NM D-Bus API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveConnectionState {
    /// Connection state is unknown.
    Unknown,
    /// Connection is activating (connecting).
    Activating,
    /// Connection is fully activated (connected).
    Activated,
    /// Connection is deactivating (disconnecting).
    Deactivating,
    /// Connection is fully deactivated (disconnected).
    Deactivated,
    /// Unknown state code not mapped to a specific variant.
    Other(u32),
}

impl From<u32> for ActiveConnectionState {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::Activating,
            2 => Self::Activated,
            3 => Self::Deactivating,
            4 => Self::Deactivated,
            v => Self::Other(v),
        }
    }
}

impl Display for ActiveConnectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Activating => write!(f, "activating"),
            Self::Activated => write!(f, "activated"),
            Self::Deactivating => write!(f, "deactivating"),
            Self::Deactivated => write!(f, "deactivated"),
            Self::Other(v) => write!(f, "unknown state ({v})"),
        }
    }
}

/// NetworkManager active connection state reason codes.
///
/// These values indicate why an active connection transitioned to its
/// current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStateReason {
    /// The reason is unknown.
    Unknown,
    /// No specific reason.
    None,
    /// User disconnected.
    UserDisconnected,
    /// Device disconnected.
    DeviceDisconnected,
    /// The NetworkManager service stopped.
    ServiceStopped,
    /// IP configuration was invalid.
    IpConfigInvalid,
    /// Connection timed out while activating.
    ConnectTimeout,
    /// Service start timed out.
    ServiceStartTimeout,
    /// Service failed to start.
    ServiceStartFailed,
    /// No secrets (password) were provided.
    NoSecrets,
    /// Login/authentication failed.
    LoginFailed,
    /// The connection was removed.
    ConnectionRemoved,
    /// A dependency failed.
    DependencyFailed,
    /// Device realization failed.
    DeviceRealizeFailed,
    /// Device was removed.
    DeviceRemoved,
    /// Unknown reason code not mapped to a specific variant.
    Other(u32),
}

impl From<u32> for ConnectionStateReason {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::None,
            2 => Self::UserDisconnected,
            3 => Self::DeviceDisconnected,
            4 => Self::ServiceStopped,
            5 => Self::IpConfigInvalid,
            6 => Self::ConnectTimeout,
            7 => Self::ServiceStartTimeout,
            8 => Self::ServiceStartFailed,
            9 => Self::NoSecrets,
            10 => Self::LoginFailed,
            11 => Self::ConnectionRemoved,
            12 => Self::DependencyFailed,
            13 => Self::DeviceRealizeFailed,
            14 => Self::DeviceRemoved,
            v => Self::Other(v),
        }
    }
}

impl Display for ConnectionStateReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::None => write!(f, "none"),
            Self::UserDisconnected => write!(f, "user disconnected"),
            Self::DeviceDisconnected => write!(f, "device disconnected"),
            Self::ServiceStopped => write!(f, "service stopped"),
            Self::IpConfigInvalid => write!(f, "IP configuration invalid"),
            Self::ConnectTimeout => write!(f, "connection timed out"),
            Self::ServiceStartTimeout => write!(f, "service start timed out"),
            Self::ServiceStartFailed => write!(f, "service start failed"),
            Self::NoSecrets => write!(f, "no secrets (password) provided"),
            Self::LoginFailed => write!(f, "login/authentication failed"),
            Self::ConnectionRemoved => write!(f, "connection was removed"),
            Self::DependencyFailed => write!(f, "dependency failed"),
            Self::DeviceRealizeFailed => write!(f, "device realization failed"),
            Self::DeviceRemoved => write!(f, "device was removed"),
            Self::Other(v) => write!(f, "unknown reason ({v})"),
        }
    }
}

/// Converts a connection state reason code to a specific `WifiError`.
///
/// Maps authentication-related failures to `AuthFailed`, timeout issues to
/// `Timeout`, and everything else to `ActivationFailed`.
pub fn connection_state_reason_to_error(code: u32) -> WifiError {
    let reason = ConnectionStateReason::from(code);
    match reason {
        ConnectionStateReason::NoSecrets | ConnectionStateReason::LoginFailed => {
            WifiError::AuthFailed
        }
        ConnectionStateReason::ConnectTimeout | ConnectionStateReason::ServiceStartTimeout => {
            WifiError::Timeout
        }
        _ => WifiError::ActivationFailed(reason),
    }
}

/// The wireless interface the manager drives.
///
/// Resolved once during [`WifiManager::start`](crate::WifiManager::start).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceHandle {
    /// D-Bus object path of the device
    pub path: String,
    /// Interface name (e.g., "wlan0")
    pub interface: String,
    /// Hardware (MAC) address
    pub hw_address: String,
}

/// A persisted connection profile known to the network service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// D-Bus object path of the settings object
    pub path: String,
    /// Connection id (usually the SSID)
    pub id: String,
}

/// Raw notification delivered by the network service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The global NetworkManager state changed.
    ManagerStateChanged(ManagerState),
    /// A device changed state.
    DeviceStateChanged {
        /// Object path of the device that changed
        device: String,
        new_state: DeviceState,
        old_state: DeviceState,
        reason: u32,
    },
    /// A device appeared.
    DeviceAdded { path: String },
    /// A device disappeared.
    DeviceRemoved { path: String },
    /// Wireless radio was enabled or disabled.
    WirelessEnabledChanged(bool),
}

/// Domain events published to subscribers of a [`WifiManager`](crate::WifiManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiEvent {
    /// The catalog was replaced (after a scan or a successful connect).
    ScanCompleted(CatalogSnapshot),
    /// At least one connection profile is persisted.
    SavedAccessPointAvailable,
    /// No connection profile is persisted, or the manager lost connectivity.
    NoSavedAccessPointAvailable,
    /// The active connection was deactivated on request.
    ActiveConnectionRemoved,
    /// NetworkManager reached global connectivity.
    ConnectedGlobal,
    /// The device activated after credentials were supplied.
    PasswordAuthSucceeded,
    /// The device failed to activate.
    PasswordAuthFailed,
    /// The strength of the active access point should be re-read.
    CurrentStrengthChanged,
    /// The configured wireless interface was found at startup.
    WlanDeviceFound,
    /// A network device appeared.
    DeviceAdded { path: String },
    /// A network device disappeared.
    DeviceRemoved { path: String },
}

/// Errors that can occur while talking to the network service.
///
/// None of these cross the [`WifiManager`](crate::WifiManager) command
/// surface; the façade turns them into a [`ConnectionStatus`] or a log line.
/// They are public so alternative [`NetworkService`](crate::NetworkService)
/// implementations can report failures.
#[derive(Debug, Error)]
pub enum WifiError {
    /// A D-Bus communication error occurred.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// A standard D-Bus interface returned an error.
    #[error("D-Bus interface error: {0}")]
    Fdo(#[from] zbus::fdo::Error),

    /// Reading or clearing the profile directory failed.
    #[error("profile store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested network was not found during scan.
    #[error("network not found")]
    NotFound,

    /// Authentication with the access point failed.
    #[error("authentication failed")]
    AuthFailed,

    /// The connection timed out waiting for activation.
    #[error("connection timeout")]
    Timeout,

    /// The connect attempt was cancelled by the caller.
    #[error("connection attempt cancelled")]
    Cancelled,

    /// The connection is stuck in an unexpected state.
    #[error("connection stuck in state: {0}")]
    Stuck(String),

    /// A connection activation failure with a connection state reason.
    #[error("connection activation failed: {0}")]
    ActivationFailed(ConnectionStateReason),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_state_from_u32() {
        assert_eq!(ManagerState::from(0), ManagerState::Unknown);
        assert_eq!(ManagerState::from(20), ManagerState::Disconnected);
        assert_eq!(ManagerState::from(60), ManagerState::ConnectedSite);
        assert_eq!(ManagerState::from(70), ManagerState::ConnectedGlobal);
        assert_eq!(ManagerState::from(65), ManagerState::Other(65));
    }

    #[test]
    fn manager_state_display() {
        assert_eq!(
            ManagerState::ConnectedGlobal.to_string(),
            "connected (global)"
        );
        assert_eq!(ManagerState::Other(3).to_string(), "unknown state (3)");
    }

    #[test]
    fn device_state_from_u32() {
        assert_eq!(DeviceState::from(30), DeviceState::Disconnected);
        assert_eq!(DeviceState::from(60), DeviceState::NeedAuth);
        assert_eq!(DeviceState::from(100), DeviceState::Activated);
        assert_eq!(DeviceState::from(120), DeviceState::Failed);
        assert_eq!(DeviceState::from(7), DeviceState::Other(7));
    }

    #[test]
    fn reason_to_error_maps_auth_failures() {
        assert!(matches!(
            connection_state_reason_to_error(9),
            WifiError::AuthFailed
        ));
        assert!(matches!(
            connection_state_reason_to_error(10),
            WifiError::AuthFailed
        ));
        assert!(matches!(
            connection_state_reason_to_error(6),
            WifiError::Timeout
        ));
        assert!(matches!(
            connection_state_reason_to_error(3),
            WifiError::ActivationFailed(ConnectionStateReason::DeviceDisconnected)
        ));
    }

    #[test]
    fn snapshot_connected_lookup() {
        let snap = CatalogSnapshot::new(vec![
            AccessPointRecord {
                name: "a".into(),
                frequency: 2412,
                state: AccessPointState::Disconnected,
                secured: true,
                signal_strength: 50,
            },
            AccessPointRecord {
                name: "b".into(),
                frequency: 5180,
                state: AccessPointState::Connected,
                secured: true,
                signal_strength: 40,
            },
        ]);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.connected().map(|r| r.name.as_str()), Some("b"));
        assert!(CatalogSnapshot::default().connected().is_none());
    }
}
