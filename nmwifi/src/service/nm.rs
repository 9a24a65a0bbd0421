//! [`NetworkService`] over NetworkManager's D-Bus API.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::select_all;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::time::Duration;
use zbus::Connection;
use zvariant::{OwnedObjectPath, Value};

use super::{NetworkService, NotificationStream};
use crate::Result;
use crate::api::builders::build_wifi_connection;
use crate::api::models::{
    DeviceHandle, DeviceState, ManagerState, Notification, Profile, RawAccessPoint, WifiError,
};
use crate::core::state_wait::wait_for_connection_activation;
use crate::dbus::{NMAccessPointProxy, NMDeviceProxy, NMProxy, NMWirelessProxy};
use crate::try_log;
use crate::types::constants::{device_type, paths, timeouts};
use crate::types::security::is_secured;
use crate::util::utils::{
    connection_settings_proxy, decode_ssid_or_empty, is_none_path, settings_proxy,
};

/// NetworkManager backend on the system bus.
///
/// Cloning is cheap; clones share the D-Bus connection.
#[derive(Debug, Clone)]
pub struct NmService {
    conn: Connection,
    activation_timeout: Duration,
}

impl NmService {
    /// Connects to the system bus.
    ///
    /// # Errors
    ///
    /// Returns an error if the system bus is unreachable.
    pub async fn new() -> Result<Self> {
        let conn = Connection::system().await?;
        Ok(Self::with_connection(conn))
    }

    /// Wraps an existing D-Bus connection.
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            activation_timeout: timeouts::connection_timeout(),
        }
    }

    /// Sets how long `connect` and `activate_profile` wait for activation.
    #[must_use]
    pub fn with_activation_timeout(mut self, timeout: Duration) -> Self {
        self.activation_timeout = timeout;
        self
    }

    async fn device_proxy(&self, path: &str) -> Result<NMDeviceProxy<'static>> {
        Ok(NMDeviceProxy::builder(&self.conn)
            .path(object_path(path)?)?
            .build()
            .await?)
    }

    async fn wireless_proxy(&self, path: &str) -> Result<NMWirelessProxy<'static>> {
        Ok(NMWirelessProxy::builder(&self.conn)
            .path(object_path(path)?)?
            .build()
            .await?)
    }

    /// Finds the object path of the first visible access point named `ssid`.
    async fn find_ap(&self, device: &DeviceHandle, ssid: &str) -> Result<OwnedObjectPath> {
        let wifi = self.wireless_proxy(&device.path).await?;

        for ap_path in wifi.access_points().await? {
            let ap = NMAccessPointProxy::builder(&self.conn)
                .path(ap_path.clone())?
                .build()
                .await?;

            if decode_ssid_or_empty(&ap.ssid().await?) == ssid {
                return Ok(ap_path);
            }
        }

        Err(WifiError::NotFound)
    }
}

fn object_path(path: &str) -> Result<OwnedObjectPath> {
    OwnedObjectPath::try_from(path).map_err(|e| WifiError::Dbus(e.into()))
}

/// Reads one access point, or `None` if it vanished or a property failed.
///
/// Access points come and go between listing and reading, so a failed read
/// drops the entry instead of failing the scan.
async fn read_access_point(conn: &Connection, path: OwnedObjectPath) -> Option<RawAccessPoint> {
    let builder = try_log!(
        NMAccessPointProxy::builder(conn).path(path),
        "Failed to create access point proxy builder"
    );
    let ap = try_log!(builder.build().await, "Failed to build access point proxy");

    let ssid = try_log!(ap.ssid().await, "Failed to read SSID");
    let strength = try_log!(ap.strength().await, "Failed to read strength");
    let frequency = try_log!(ap.frequency().await, "Failed to read frequency");
    let flags = try_log!(ap.flags().await, "Failed to read flags");
    let wpa = try_log!(ap.wpa_flags().await, "Failed to read WPA flags");
    let rsn = try_log!(ap.rsn_flags().await, "Failed to read RSN flags");

    Some(RawAccessPoint {
        ssid: decode_ssid_or_empty(&ssid).into_owned(),
        frequency,
        secured: is_secured(flags, wpa, rsn),
        signal_strength: i32::from(strength),
    })
}

/// Reads a profile's connection id, or `None` if its settings are unreadable.
async fn profile_id(conn: &Connection, path: &OwnedObjectPath) -> Option<String> {
    let cproxy = try_log!(
        connection_settings_proxy(conn, path.clone()).await,
        "Failed to create connection settings proxy"
    );
    let msg = try_log!(
        cproxy.call_method("GetSettings", &()).await,
        "Failed to get connection settings"
    );
    let body = msg.body();
    let all: HashMap<String, HashMap<String, Value>> =
        try_log!(body.deserialize(), "Failed to decode connection settings");

    match all.get("connection").and_then(|c| c.get("id")) {
        Some(Value::Str(id)) => Some(id.to_string()),
        _ => Some(String::new()),
    }
}

#[async_trait]
impl NetworkService for NmService {
    async fn list_wireless_devices(&self) -> Result<Vec<DeviceHandle>> {
        let nm = NMProxy::new(&self.conn).await?;
        let mut devices = Vec::new();

        for dp in nm.get_devices().await? {
            let dev = NMDeviceProxy::builder(&self.conn)
                .path(dp.clone())?
                .build()
                .await?;
            if dev.device_type().await? != device_type::WIFI {
                continue;
            }

            devices.push(DeviceHandle {
                path: dp.to_string(),
                interface: dev.interface().await?,
                hw_address: dev.hw_address().await.unwrap_or_default(),
            });
        }

        debug!("Found {} wireless device(s)", devices.len());
        Ok(devices)
    }

    async fn device_by_interface(&self, interface: &str) -> Result<Option<DeviceHandle>> {
        Ok(self
            .list_wireless_devices()
            .await?
            .into_iter()
            .find(|d| d.interface == interface))
    }

    async fn request_scan(&self, device: &DeviceHandle) -> Result<()> {
        let wifi = self.wireless_proxy(&device.path).await?;
        wifi.request_scan(HashMap::new()).await?;
        debug!("Requested scan on {}", device.interface);
        Ok(())
    }

    async fn access_points(&self, device: &DeviceHandle) -> Result<Vec<RawAccessPoint>> {
        let wifi = self.wireless_proxy(&device.path).await?;
        let mut aps = Vec::new();

        for ap_path in wifi.access_points().await? {
            if let Some(ap) = read_access_point(&self.conn, ap_path).await {
                aps.push(ap);
            }
        }
        Ok(aps)
    }

    async fn active_access_point(&self, device: &DeviceHandle) -> Result<Option<RawAccessPoint>> {
        let wifi = self.wireless_proxy(&device.path).await?;
        let ap_path = wifi.active_access_point().await?;
        if is_none_path(&ap_path) {
            return Ok(None);
        }
        Ok(read_access_point(&self.conn, ap_path).await)
    }

    async fn connect(
        &self,
        device: &DeviceHandle,
        ssid: &str,
        passphrase: &str,
        hidden: bool,
    ) -> Result<()> {
        let nm = NMProxy::new(&self.conn).await?;

        let specific_object = if hidden {
            object_path(paths::NONE)?
        } else {
            self.find_ap(device, ssid).await?
        };

        let settings = build_wifi_connection(ssid, passphrase, hidden);
        let (_, active_conn) = nm
            .add_and_activate_connection(settings, object_path(&device.path)?, specific_object)
            .await?;
        debug!(
            "add_and_activate_connection() succeeded, active connection: {}",
            active_conn.as_str()
        );

        wait_for_connection_activation(&self.conn, &active_conn, self.activation_timeout).await?;
        info!("Connected to {ssid}");
        Ok(())
    }

    async fn disconnect(&self, device: &DeviceHandle) -> Result<()> {
        let dev = self.device_proxy(&device.path).await?;
        dev.disconnect().await?;
        debug!("Disconnect requested on {}", device.interface);
        Ok(())
    }

    async fn deactivate_active_connection(&self, device: &DeviceHandle) -> Result<()> {
        let dev = self.device_proxy(&device.path).await?;
        let active = dev.active_connection().await?;
        if is_none_path(&active) {
            return Err(WifiError::NotFound);
        }

        let nm = NMProxy::new(&self.conn).await?;
        nm.deactivate_connection(active.clone()).await?;
        debug!("Deactivated {}", active.as_str());
        Ok(())
    }

    async fn list_connection_profiles(&self) -> Result<Vec<Profile>> {
        let settings = settings_proxy(&self.conn).await?;
        let reply = settings.call_method("ListConnections", &()).await?;
        let conns: Vec<OwnedObjectPath> = reply.body().deserialize()?;

        let mut profiles = Vec::with_capacity(conns.len());
        for cpath in conns {
            let Some(id) = profile_id(&self.conn, &cpath).await else {
                continue;
            };
            profiles.push(Profile {
                path: cpath.to_string(),
                id,
            });
        }
        Ok(profiles)
    }

    async fn delete_profile(&self, profile: &Profile) -> Result<()> {
        let cproxy = connection_settings_proxy(&self.conn, object_path(&profile.path)?).await?;
        cproxy.call_method("Delete", &()).await?;
        debug!("Deleted connection: {}", profile.path);
        Ok(())
    }

    async fn activate_profile(&self, profile: &Profile, device: &DeviceHandle) -> Result<()> {
        let nm = NMProxy::new(&self.conn).await?;
        let active_conn = nm
            .activate_connection(
                object_path(&profile.path)?,
                object_path(&device.path)?,
                object_path(paths::NONE)?,
            )
            .await?;

        wait_for_connection_activation(&self.conn, &active_conn, self.activation_timeout).await
    }

    async fn manager_state(&self) -> Result<ManagerState> {
        let nm = NMProxy::new(&self.conn).await?;
        Ok(ManagerState::from(nm.state().await?))
    }

    async fn notifications(&self, device: &DeviceHandle) -> Result<NotificationStream> {
        let nm = NMProxy::new(&self.conn).await?;
        let dev = self.device_proxy(&device.path).await?;
        let device_path = device.path.clone();

        let mut streams: Vec<NotificationStream> = Vec::new();

        streams.push(
            nm.receive_manager_state_changed()
                .await?
                .filter_map(|signal| async move {
                    let args = try_log!(signal.args(), "Failed to parse manager StateChanged");
                    Some(Notification::ManagerStateChanged(ManagerState::from(
                        args.state,
                    )))
                })
                .boxed(),
        );

        streams.push(
            nm.receive_device_added()
                .await?
                .filter_map(|signal| async move {
                    let args = try_log!(signal.args(), "Failed to parse DeviceAdded");
                    Some(Notification::DeviceAdded {
                        path: args.device_path.to_string(),
                    })
                })
                .boxed(),
        );

        streams.push(
            nm.receive_device_removed()
                .await?
                .filter_map(|signal| async move {
                    let args = try_log!(signal.args(), "Failed to parse DeviceRemoved");
                    Some(Notification::DeviceRemoved {
                        path: args.device_path.to_string(),
                    })
                })
                .boxed(),
        );

        streams.push(
            dev.receive_device_state_changed()
                .await?
                .filter_map(move |signal| {
                    let device = device_path.clone();
                    async move {
                        let args = try_log!(signal.args(), "Failed to parse device StateChanged");
                        Some(Notification::DeviceStateChanged {
                            device,
                            new_state: DeviceState::from(args.new_state),
                            old_state: DeviceState::from(args.old_state),
                            reason: args.reason,
                        })
                    }
                })
                .boxed(),
        );

        streams.push(
            nm.receive_wireless_enabled_changed()
                .await
                .filter_map(|change| async move {
                    let enabled = try_log!(change.get().await, "Failed to read WirelessEnabled");
                    Some(Notification::WirelessEnabledChanged(enabled))
                })
                .boxed(),
        );

        debug!("Subscribed to NetworkManager signals for {}", device.interface);
        Ok(select_all(streams).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_rejects_garbage() {
        assert!(object_path("/org/freedesktop/NetworkManager/Devices/2").is_ok());
        assert!(matches!(object_path("not a path"), Err(WifiError::Dbus(_))));
    }
}
