//! NetworkManager Active Connection proxy.

use zbus::{Result, proxy};

/// Proxy for active connection interface.
///
/// Used to follow a connection through activation and to learn why it
/// failed.
///
/// # Signals
///
/// The `StateChanged` signal is emitted when the connection activation state
/// changes. Use `receive_activation_state_changed()` to get a stream of state changes.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Connection.Active",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait NMActiveConnection {
    /// Current state of the active connection.
    ///
    /// Values:
    /// - 0: Unknown
    /// - 1: Activating
    /// - 2: Activated
    /// - 3: Deactivating
    /// - 4: Deactivated
    #[zbus(property)]
    fn state(&self) -> Result<u32>;

    /// Signal emitted when the connection activation state changes.
    ///
    /// Arguments:
    /// - `state`: The new connection state (see `ActiveConnectionState`)
    /// - `reason`: The reason for the state change (see `ConnectionStateReason`)
    #[zbus(signal, name = "StateChanged")]
    fn activation_state_changed(&self, state: u32, reason: u32);
}
