//! The network-management service the manager drives.
//!
//! [`NetworkService`] is the only seam between the Wi-Fi model and the
//! system: scanning, association and profile persistence all happen behind
//! it. [`NmService`] implements it over NetworkManager's D-Bus API.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::Result;
use crate::api::models::{DeviceHandle, ManagerState, Notification, Profile, RawAccessPoint};

mod nm;

pub use nm::NmService;

/// Stream of raw notifications from the service.
pub type NotificationStream = BoxStream<'static, Notification>;

/// Operations the Wi-Fi manager needs from the network-management service.
///
/// Implementations are expected to answer property reads from a local cache
/// and to return from `request_scan` without waiting for the scan.
#[async_trait]
pub trait NetworkService: Send + Sync {
    /// Lists all wireless devices known to the service.
    async fn list_wireless_devices(&self) -> Result<Vec<DeviceHandle>>;

    /// Finds a device by its interface name.
    async fn device_by_interface(&self, interface: &str) -> Result<Option<DeviceHandle>>;

    /// Asks the device to scan. Results show up in later `access_points` calls.
    async fn request_scan(&self, device: &DeviceHandle) -> Result<()>;

    /// Returns the access points currently visible to the device.
    async fn access_points(&self, device: &DeviceHandle) -> Result<Vec<RawAccessPoint>>;

    /// Returns the access point the device is associated with, if any.
    async fn active_access_point(&self, device: &DeviceHandle) -> Result<Option<RawAccessPoint>>;

    /// Connects the device to `ssid`, creating a profile for it.
    ///
    /// Resolves once the service reports the connection as active or failed.
    async fn connect(
        &self,
        device: &DeviceHandle,
        ssid: &str,
        passphrase: &str,
        hidden: bool,
    ) -> Result<()>;

    /// Disconnects the device, without deleting any profile.
    async fn disconnect(&self, device: &DeviceHandle) -> Result<()>;

    /// Deactivates the connection currently active on the device.
    async fn deactivate_active_connection(&self, device: &DeviceHandle) -> Result<()>;

    /// Lists all persisted connection profiles.
    async fn list_connection_profiles(&self) -> Result<Vec<Profile>>;

    /// Deletes a persisted connection profile.
    async fn delete_profile(&self, profile: &Profile) -> Result<()>;

    /// Activates a persisted profile on the device.
    async fn activate_profile(&self, profile: &Profile, device: &DeviceHandle) -> Result<()>;

    /// Returns the service's global state.
    async fn manager_state(&self) -> Result<ManagerState>;

    /// Subscribes to raw notifications relevant to `device`.
    ///
    /// The stream carries manager state changes, state changes of `device`,
    /// device additions and removals, and wireless-enabled toggles.
    async fn notifications(&self, device: &DeviceHandle) -> Result<NotificationStream>;
}
