use futures::StreamExt;
use futures_timer::Delay;
use log::{debug, info, warn};
use std::sync::{Arc, OnceLock};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::api::config::WifiConfig;
use crate::api::models::{
    CatalogSnapshot, ConnectPhase, ConnectionStatus, DeviceHandle, DeviceState, ManagerState,
    Notification, WifiEvent,
};
use crate::core::catalog::AccessPointCatalog;
use crate::core::controller::ConnectionController;
use crate::core::profiles::{DirProfileStore, ProfileStore};
use crate::monitoring::bridge::EventBridge;
use crate::monitoring::bus::EventBus;
use crate::service::{NetworkService, NmService};

/// Wi-Fi connectivity manager for a single wireless interface.
///
/// Keeps a ranked catalog of the secured access points in range, drives
/// connect and disconnect requests, and republishes NetworkManager's
/// notifications as [`WifiEvent`]s.
///
/// # Example
///
/// ```no_run
/// use nmwifi::{ConnectionStatus, WifiConfig, WifiManager};
///
/// # async fn example() -> nmwifi::Result<()> {
/// let wifi = WifiManager::new(WifiConfig::default()).await?;
/// let mut events = wifi.subscribe();
/// wifi.start().await;
///
/// let catalog = wifi.scan().await;
/// for ap in catalog.iter() {
///     println!("{} ({}) {}", ap.name, ap.signal_strength, ap.state);
/// }
///
/// if wifi.connect("Home", "password123", false).await == ConnectionStatus::Successful {
///     println!("connected to {}", wifi.current_connected_name());
/// }
///
/// while let Ok(event) = events.recv().await {
///     println!("{event:?}");
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// All methods take `&self`; wrap the manager in an `Arc` to share it
/// between the event loop task and command callers.
pub struct WifiManager {
    config: WifiConfig,
    service: Arc<dyn NetworkService>,
    profiles: Arc<dyn ProfileStore>,
    catalog: Arc<AccessPointCatalog>,
    bus: Arc<EventBus>,
    controller: ConnectionController,
    device: OnceLock<DeviceHandle>,
}

impl WifiManager {
    /// Creates a manager backed by NetworkManager on the system bus.
    ///
    /// Profiles are read from and cleared in `config.profile_dir`.
    pub async fn new(config: WifiConfig) -> Result<Self> {
        let service =
            NmService::new().await?.with_activation_timeout(config.connect_timeout);
        let profiles = DirProfileStore::new(config.profile_dir.clone());
        Ok(Self::with_service(config, Arc::new(service), Arc::new(profiles)))
    }

    /// Creates a manager over an arbitrary service and profile store.
    pub fn with_service(
        config: WifiConfig,
        service: Arc<dyn NetworkService>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        let catalog = Arc::new(AccessPointCatalog::new());
        let bus = Arc::new(EventBus::new(config.event_capacity));
        let controller = ConnectionController::new(
            Arc::clone(&service),
            Arc::clone(&profiles),
            Arc::clone(&catalog),
            Arc::clone(&bus),
            config.connect_timeout,
        );

        Self {
            config,
            service,
            profiles,
            catalog,
            bus,
            controller,
            device: OnceLock::new(),
        }
    }

    /// Returns the configuration the manager was built with.
    pub fn config(&self) -> &WifiConfig {
        &self.config
    }

    /// Resolves the configured wireless interface and reports saved profiles.
    ///
    /// Emits [`WifiEvent::WlanDeviceFound`] when the interface exists, then
    /// one of [`WifiEvent::SavedAccessPointAvailable`] or
    /// [`WifiEvent::NoSavedAccessPointAvailable`]. If the manager is
    /// disconnected and profiles exist, a saved profile is reactivated.
    pub async fn start(&self) {
        let devices = match self.service.list_wireless_devices().await {
            Ok(d) => d,
            Err(e) => {
                warn!("Failed to list wireless devices: {e}");
                return;
            }
        };
        if devices.is_empty() {
            warn!("No wireless devices found");
            return;
        }

        let interface = &self.config.interface;
        let device = match self.service.device_by_interface(interface).await {
            Ok(Some(d)) => d,
            Ok(None) => {
                warn!("Wireless interface {interface} not found");
                return;
            }
            Err(e) => {
                warn!("Failed to look up {interface}: {e}");
                return;
            }
        };

        info!("Using wireless device {} ({})", device.interface, device.path);
        if self.device.set(device).is_err() {
            debug!("Wireless device already resolved");
        }
        self.bus.publish(WifiEvent::WlanDeviceFound);

        let has_profiles = match self.service.list_connection_profiles().await {
            Ok(p) => !p.is_empty(),
            Err(e) => {
                warn!("Failed to list connection profiles: {e}");
                false
            }
        };
        self.bus.publish(if has_profiles {
            WifiEvent::SavedAccessPointAvailable
        } else {
            WifiEvent::NoSavedAccessPointAvailable
        });

        if let Some(device) = self.device.get() {
            if has_profiles {
                self.controller.reload(device).await;
            }
            if let Ok(state) = self.service.manager_state().await {
                self.bus.publish_state(state);
            }
        }
    }

    /// Returns the resolved wireless device, if `start` found one.
    pub fn device(&self) -> Option<&DeviceHandle> {
        self.device.get()
    }

    /// Scans for access points and replaces the catalog.
    ///
    /// Without a device, or when the scan finds nothing, the catalog is left
    /// alone and the current snapshot is returned.
    pub async fn scan(&self) -> CatalogSnapshot {
        let Some(device) = self.device.get() else {
            warn!("Cannot scan: no wireless device");
            return self.catalog.snapshot();
        };

        if let Err(e) = self.service.request_scan(device).await {
            warn!("Scan request failed: {e}");
        }
        Delay::new(self.config.scan_wait).await;

        let raw = match self.service.access_points(device).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read access points: {e}");
                return self.catalog.snapshot();
            }
        };
        if raw.is_empty() {
            info!("Scan found no access points");
            return self.catalog.snapshot();
        }

        let active_name = self.active_name(device).await;
        let snapshot = self.catalog.replace(&raw, active_name.as_deref());
        debug!("Catalog holds {} access point(s)", snapshot.len());
        self.bus.publish(WifiEvent::ScanCompleted(snapshot.clone()));
        snapshot
    }

    /// Name of the associated access point, or `None` while disconnected.
    async fn active_name(&self, device: &DeviceHandle) -> Option<String> {
        match self.service.manager_state().await {
            Ok(ManagerState::Disconnected) => return None,
            Ok(_) => {}
            Err(e) => {
                warn!("Failed to read manager state: {e}");
                return None;
            }
        }

        match self.service.active_access_point(device).await {
            Ok(ap) => ap.map(|ap| ap.ssid),
            Err(e) => {
                warn!("Failed to read active access point: {e}");
                None
            }
        }
    }

    /// Re-emits [`WifiEvent::ScanCompleted`] with the current catalog.
    pub fn publish_catalog(&self) {
        self.bus
            .publish(WifiEvent::ScanCompleted(self.catalog.snapshot()));
    }

    /// Returns the current catalog.
    pub fn access_points(&self) -> CatalogSnapshot {
        self.catalog.snapshot()
    }

    /// Name of the connected access point, or `""`.
    pub fn current_connected_name(&self) -> String {
        self.catalog.current_connected_name()
    }

    /// Live signal strength of the associated access point.
    ///
    /// Returns 0 without a device, without an active access point, or when
    /// the read fails.
    pub async fn current_signal_strength(&self) -> i32 {
        let Some(device) = self.device.get() else {
            return 0;
        };
        match self.service.active_access_point(device).await {
            Ok(ap) => ap.map(|ap| ap.signal_strength).unwrap_or(0),
            Err(e) => {
                warn!("Failed to read active access point: {e}");
                0
            }
        }
    }

    /// Returns `true` while NetworkManager reports global connectivity.
    pub fn is_connected_to_wifi(&self) -> bool {
        *self.bus.state_changes().borrow() == ManagerState::ConnectedGlobal
    }

    /// Signal strength of `name`, or 0 if it is empty or not in the catalog.
    pub fn signal_strength(&self, name: &str) -> i32 {
        self.catalog.signal_strength(name)
    }

    /// Hardware address of the wireless device, or `""` before `start`.
    pub fn mac_address(&self) -> String {
        self.device
            .get()
            .map(|d| d.hw_address.clone())
            .unwrap_or_default()
    }

    /// Human-readable manager state, e.g. `"connected (global)"`.
    pub async fn manager_state_string(&self) -> String {
        match self.service.manager_state().await {
            Ok(state) => state.to_string(),
            Err(e) => {
                warn!("Failed to read manager state: {e}");
                ManagerState::Unknown.to_string()
            }
        }
    }

    /// Emits whether the profile store holds any profile.
    pub async fn check_saved_access_point(&self) {
        let saved = match self.profiles.entries().await {
            Ok(entries) => !entries.is_empty(),
            Err(e) => {
                warn!("Failed to read profile store: {e}");
                false
            }
        };
        self.bus.publish(if saved {
            WifiEvent::SavedAccessPointAvailable
        } else {
            WifiEvent::NoSavedAccessPointAvailable
        });
    }

    /// Subscribes to domain events.
    pub fn subscribe(&self) -> broadcast::Receiver<WifiEvent> {
        self.bus.subscribe()
    }

    /// Subscribes to manager state changes.
    pub fn state_changes(&self) -> watch::Receiver<ManagerState> {
        self.bus.state_changes()
    }

    /// Connects to `ssid` with a WPA passphrase.
    ///
    /// `hidden` allows connecting to a network that is not in the catalog.
    /// The attempt is bounded by [`WifiConfig::connect_timeout`].
    pub async fn connect(&self, ssid: &str, passphrase: &str, hidden: bool) -> ConnectionStatus {
        self.controller
            .connect(self.device.get(), ssid, passphrase, hidden, None)
            .await
    }

    /// Like [`connect`](Self::connect), but gives up when `cancel` fires.
    pub async fn connect_with_cancel(
        &self,
        ssid: &str,
        passphrase: &str,
        hidden: bool,
        cancel: &CancellationToken,
    ) -> ConnectionStatus {
        self.controller
            .connect(self.device.get(), ssid, passphrase, hidden, Some(cancel))
            .await
    }

    /// Where the last connect request stands.
    pub fn connect_phase(&self) -> ConnectPhase {
        self.controller.phase()
    }

    /// Disconnects the wireless device without deleting any profile.
    pub async fn disconnect(&self) {
        match self.device.get() {
            Some(device) => self.controller.disconnect(device).await,
            None => warn!("Cannot disconnect: no wireless device"),
        }
    }

    /// Deletes every connection profile known to NetworkManager.
    pub async fn delete_connections(&self) {
        self.controller.delete_connections().await;
    }

    /// Reactivates a saved profile if the manager is disconnected.
    pub async fn reload(&self) {
        match self.device.get() {
            Some(device) => self.controller.reload(device).await,
            None => warn!("Cannot reload: no wireless device"),
        }
    }

    /// Deactivates the active connection and marks every record disconnected.
    pub async fn remove_active_connection(&self) {
        match self.device.get() {
            Some(device) => self.controller.remove_active_connection(device).await,
            None => warn!("Cannot remove active connection: no wireless device"),
        }
    }

    /// Translates one raw notification and publishes the resulting events.
    ///
    /// Device state changes on the managed device also refresh the catalog's
    /// connected marker.
    pub async fn handle_notification(&self, notification: Notification) {
        let Some(device) = self.device.get() else {
            debug!("Dropping notification before start: {notification:?}");
            return;
        };

        if let Notification::ManagerStateChanged(state) = notification {
            self.bus.publish_state(state);
        }

        let bridge = EventBridge::new(device.path.clone());
        for event in bridge.map(&notification) {
            self.bus.publish(event);
        }

        if let Notification::DeviceStateChanged {
            device: path,
            new_state,
            ..
        } = &notification
        {
            if *path == device.path {
                self.refresh_connected_marker(device, *new_state).await;
            }
        }
    }

    async fn refresh_connected_marker(&self, device: &DeviceHandle, state: DeviceState) {
        let active = match state {
            DeviceState::Activated => match self.service.active_access_point(device).await {
                Ok(ap) => ap.map(|ap| ap.ssid),
                Err(e) => {
                    warn!("Failed to read active access point: {e}");
                    return;
                }
            },
            DeviceState::Disconnected | DeviceState::Unavailable | DeviceState::Failed => None,
            _ => return,
        };
        self.catalog.mark_connected(active.as_deref());
    }

    /// Drains service notifications until the stream ends or `shutdown`
    /// fires.
    ///
    /// Call after [`start`](Self::start), typically from a spawned task.
    pub async fn run_events(&self, mut shutdown: watch::Receiver<()>) -> Result<()> {
        let Some(device) = self.device.get() else {
            warn!("Not monitoring events: no wireless device");
            return Ok(());
        };

        let mut stream = self.service.notifications(device).await?;
        debug!("Monitoring notifications for {}", device.interface);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    debug!("Event monitoring shut down");
                    return Ok(());
                }
                next = stream.next() => match next {
                    Some(notification) => self.handle_notification(notification).await,
                    None => {
                        debug!("Notification stream ended");
                        return Ok(());
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for WifiManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiManager")
            .field("config", &self.config)
            .field("device", &self.device.get())
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}
