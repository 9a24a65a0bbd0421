//! NetworkManager Device proxy.

use zbus::{Result, proxy};
use zvariant::OwnedObjectPath;

/// Proxy for NetworkManager device interface.
///
/// Provides access to device properties like interface name, type,
/// and hardware address.
///
/// # Signals
///
/// The `StateChanged` signal is emitted whenever the device state changes.
/// Use `receive_device_state_changed()` to get a stream of state change events:
///
/// ```ignore
/// let mut stream = device_proxy.receive_device_state_changed().await?;
/// while let Some(signal) = stream.next().await {
///     let args = signal.args()?;
///     println!("New state: {}, Old state: {}, Reason: {}",
///              args.new_state, args.old_state, args.reason);
/// }
/// ```
#[proxy(
    interface = "org.freedesktop.NetworkManager.Device",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait NMDevice {
    /// Disconnects the device and prevents it from auto-activating.
    fn disconnect(&self) -> Result<()>;

    /// The network interface name (e.g., "wlan0").
    #[zbus(property)]
    fn interface(&self) -> Result<String>;

    /// Device type as a numeric code (2 = Wi-Fi).
    #[zbus(property)]
    fn device_type(&self) -> Result<u32>;

    /// Hardware (MAC) address of the device.
    #[zbus(property)]
    fn hw_address(&self) -> Result<String>;

    /// Path to the active connection on this device ("/" if none).
    #[zbus(property)]
    fn active_connection(&self) -> Result<OwnedObjectPath>;

    /// Signal emitted when device state changes.
    ///
    /// Arguments:
    /// - `new_state`: The new device state code
    /// - `old_state`: The previous device state code
    /// - `reason`: The reason code for the state change
    #[zbus(signal, name = "StateChanged")]
    fn device_state_changed(&self, new_state: u32, old_state: u32, reason: u32);
}
