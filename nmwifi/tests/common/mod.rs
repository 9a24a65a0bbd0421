//! In-memory network service shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

use nmwifi::{
    DeviceHandle, DirProfileStore, ManagerState, NetworkService, Notification, NotificationStream,
    Profile, RawAccessPoint, Result, WifiConfig, WifiError, WifiEvent, WifiManager,
};

pub const WLAN_PATH: &str = "/org/freedesktop/NetworkManager/Devices/3";
pub const WLAN_MAC: &str = "AA:BB:CC:DD:EE:FF";

/// How the mock answers `connect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectBehavior {
    Succeed,
    Fail,
    Hang,
}

pub struct MockService {
    pub devices: Mutex<Vec<DeviceHandle>>,
    pub access_points: Mutex<Vec<RawAccessPoint>>,
    pub active: Mutex<Option<String>>,
    /// Strength reported for the active access point.
    pub active_strength: Mutex<i32>,
    pub state: Mutex<ManagerState>,
    pub profiles: Mutex<Vec<Profile>>,
    /// Ids of profiles that activate successfully.
    pub activatable: Mutex<Vec<String>>,
    pub connect_behavior: Mutex<ConnectBehavior>,
    pub deactivate_fails: Mutex<bool>,
    /// Every call made, in order, e.g. `"connect:Home"`.
    pub calls: Mutex<Vec<String>>,
    notifications: Mutex<Option<mpsc::UnboundedReceiver<Notification>>>,
    notifier: mpsc::UnboundedSender<Notification>,
}

impl MockService {
    pub fn new() -> Self {
        let (notifier, rx) = mpsc::unbounded();
        Self {
            devices: Mutex::new(vec![wlan0()]),
            access_points: Mutex::new(Vec::new()),
            active: Mutex::new(None),
            active_strength: Mutex::new(0),
            state: Mutex::new(ManagerState::ConnectedGlobal),
            profiles: Mutex::new(Vec::new()),
            activatable: Mutex::new(Vec::new()),
            connect_behavior: Mutex::new(ConnectBehavior::Succeed),
            deactivate_fails: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
            notifications: Mutex::new(Some(rx)),
            notifier,
        }
    }

    pub fn with_access_points(self, aps: Vec<RawAccessPoint>) -> Self {
        *self.access_points.lock().unwrap() = aps;
        self
    }

    pub fn with_active(self, name: &str) -> Self {
        *self.active.lock().unwrap() = Some(name.to_string());
        self
    }

    pub fn with_active_strength(self, strength: i32) -> Self {
        *self.active_strength.lock().unwrap() = strength;
        self
    }

    pub fn with_state(self, state: ManagerState) -> Self {
        *self.state.lock().unwrap() = state;
        self
    }

    pub fn with_profiles(self, ids: &[&str]) -> Self {
        *self.profiles.lock().unwrap() = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Profile {
                path: format!("/org/freedesktop/NetworkManager/Settings/{i}"),
                id: id.to_string(),
            })
            .collect();
        self
    }

    pub fn with_connect(self, behavior: ConnectBehavior) -> Self {
        *self.connect_behavior.lock().unwrap() = behavior;
        self
    }

    pub fn without_devices(self) -> Self {
        self.devices.lock().unwrap().clear();
        self
    }

    /// Pushes a notification into the stream returned by `notifications`.
    pub fn notify(&self, notification: Notification) {
        self.notifier.unbounded_send(notification).unwrap();
    }

    /// Ends the notification stream.
    pub fn close_notifications(&self) {
        self.notifier.close_channel();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl NetworkService for MockService {
    async fn list_wireless_devices(&self) -> Result<Vec<DeviceHandle>> {
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn device_by_interface(&self, interface: &str) -> Result<Option<DeviceHandle>> {
        Ok(self
            .devices
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.interface == interface)
            .cloned())
    }

    async fn request_scan(&self, _device: &DeviceHandle) -> Result<()> {
        self.record("request_scan");
        Ok(())
    }

    async fn access_points(&self, _device: &DeviceHandle) -> Result<Vec<RawAccessPoint>> {
        Ok(self.access_points.lock().unwrap().clone())
    }

    async fn active_access_point(&self, _device: &DeviceHandle) -> Result<Option<RawAccessPoint>> {
        let active = self.active.lock().unwrap().clone();
        let strength = *self.active_strength.lock().unwrap();
        Ok(active.map(|ssid| RawAccessPoint {
            ssid,
            frequency: 2437,
            secured: true,
            signal_strength: strength,
        }))
    }

    async fn connect(
        &self,
        _device: &DeviceHandle,
        ssid: &str,
        _passphrase: &str,
        _hidden: bool,
    ) -> Result<()> {
        self.record(format!("connect:{ssid}"));
        let behavior = *self.connect_behavior.lock().unwrap();
        match behavior {
            ConnectBehavior::Succeed => {
                *self.active.lock().unwrap() = Some(ssid.to_string());
                *self.state.lock().unwrap() = ManagerState::ConnectedGlobal;
                Ok(())
            }
            ConnectBehavior::Fail => Err(WifiError::AuthFailed),
            ConnectBehavior::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }

    async fn disconnect(&self, _device: &DeviceHandle) -> Result<()> {
        self.record("disconnect");
        Ok(())
    }

    async fn deactivate_active_connection(&self, _device: &DeviceHandle) -> Result<()> {
        self.record("deactivate");
        if *self.deactivate_fails.lock().unwrap() {
            return Err(WifiError::NotFound);
        }
        *self.active.lock().unwrap() = None;
        Ok(())
    }

    async fn list_connection_profiles(&self) -> Result<Vec<Profile>> {
        Ok(self.profiles.lock().unwrap().clone())
    }

    async fn delete_profile(&self, profile: &Profile) -> Result<()> {
        self.record(format!("delete:{}", profile.id));
        self.profiles.lock().unwrap().retain(|p| p != profile);
        Ok(())
    }

    async fn activate_profile(&self, profile: &Profile, _device: &DeviceHandle) -> Result<()> {
        self.record(format!("activate:{}", profile.id));
        if self.activatable.lock().unwrap().contains(&profile.id) {
            Ok(())
        } else {
            Err(WifiError::AuthFailed)
        }
    }

    async fn manager_state(&self) -> Result<ManagerState> {
        Ok(*self.state.lock().unwrap())
    }

    async fn notifications(&self, _device: &DeviceHandle) -> Result<NotificationStream> {
        match self.notifications.lock().unwrap().take() {
            Some(rx) => Ok(rx.boxed()),
            None => Err(WifiError::Stuck("notifications already taken".into())),
        }
    }
}

pub fn wlan0() -> DeviceHandle {
    DeviceHandle {
        path: WLAN_PATH.into(),
        interface: "wlan0".into(),
        hw_address: WLAN_MAC.into(),
    }
}

pub fn ap(ssid: &str, strength: i32, secured: bool) -> RawAccessPoint {
    RawAccessPoint {
        ssid: ssid.into(),
        frequency: 2437,
        secured,
        signal_strength: strength,
    }
}

pub fn config(profile_dir: &Path) -> WifiConfig {
    WifiConfig::new()
        .with_profile_dir(profile_dir)
        .with_scan_wait(Duration::ZERO)
        .with_connect_timeout(Duration::from_millis(200))
}

pub fn manager(service: &Arc<MockService>, profile_dir: &Path) -> WifiManager {
    WifiManager::with_service(
        config(profile_dir),
        Arc::clone(service) as Arc<dyn NetworkService>,
        Arc::new(DirProfileStore::new(profile_dir)),
    )
}

/// Writes a fake keyfile into the profile directory.
pub fn save_profile(dir: &Path, name: &str) {
    std::fs::write(dir.join(format!("{name}.nmconnection")), "[connection]\n").unwrap();
}

pub fn profile_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// Collects every event already queued on `rx`.
pub fn drain(rx: &mut broadcast::Receiver<WifiEvent>) -> Vec<WifiEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
