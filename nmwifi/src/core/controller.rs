//! Connect, disconnect, reload and profile deletion.
//!
//! The controller turns service calls into [`ConnectionStatus`] outcomes and
//! log lines; nothing it does returns an error to the caller.

use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::api::models::{
    ConnectPhase, ConnectionStatus, DeviceHandle, ManagerState, WifiError, WifiEvent,
};
use crate::core::catalog::AccessPointCatalog;
use crate::core::profiles::ProfileStore;
use crate::monitoring::bus::EventBus;
use crate::service::NetworkService;

pub(crate) struct ConnectionController {
    service: Arc<dyn NetworkService>,
    profiles: Arc<dyn ProfileStore>,
    catalog: Arc<AccessPointCatalog>,
    bus: Arc<EventBus>,
    connect_timeout: Duration,
    phase: Mutex<ConnectPhase>,
}

impl ConnectionController {
    pub(crate) fn new(
        service: Arc<dyn NetworkService>,
        profiles: Arc<dyn ProfileStore>,
        catalog: Arc<AccessPointCatalog>,
        bus: Arc<EventBus>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            service,
            profiles,
            catalog,
            bus,
            connect_timeout,
            phase: Mutex::new(ConnectPhase::Idle),
        }
    }

    pub(crate) fn phase(&self) -> ConnectPhase {
        self.phase
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_phase(&self, phase: ConnectPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    /// Connects `device` to `ssid`.
    ///
    /// Persisted profiles are cleared before validation and again after a
    /// failure. An SSID that is neither in the catalog nor `hidden` resolves
    /// to [`ConnectionStatus::WrongProtocol`] without calling the service.
    /// The attempt fails when `connect_timeout` elapses or `cancel` fires.
    pub(crate) async fn connect(
        &self,
        device: Option<&DeviceHandle>,
        ssid: &str,
        passphrase: &str,
        hidden: bool,
        cancel: Option<&CancellationToken>,
    ) -> ConnectionStatus {
        self.set_phase(ConnectPhase::Connecting {
            ssid: ssid.to_string(),
        });
        self.clear_profiles().await;

        let status = self
            .attempt(device, ssid, passphrase, hidden, cancel)
            .await;
        self.set_phase(ConnectPhase::Finished(status));
        status
    }

    async fn attempt(
        &self,
        device: Option<&DeviceHandle>,
        ssid: &str,
        passphrase: &str,
        hidden: bool,
        cancel: Option<&CancellationToken>,
    ) -> ConnectionStatus {
        if !hidden && self.catalog.find(ssid).is_none() {
            warn!("Access point {ssid} is not in the catalog and not hidden");
            return ConnectionStatus::WrongProtocol;
        }

        let Some(device) = device else {
            error!("Cannot connect to {ssid}: no wireless device");
            self.clear_profiles().await;
            return ConnectionStatus::Failed;
        };

        debug!("Connecting {} to {ssid} (hidden: {hidden})", device.interface);
        let call = tokio::time::timeout(
            self.connect_timeout,
            self.service.connect(device, ssid, passphrase, hidden),
        );

        let outcome = tokio::select! {
            res = call => res.unwrap_or(Err(WifiError::Timeout)),
            () = cancelled(cancel) => Err(WifiError::Cancelled),
        };

        match outcome {
            Ok(()) => {
                info!("Connected to {ssid}");
                let snapshot = self.catalog.mark_connected(Some(ssid));
                self.bus.publish(WifiEvent::ScanCompleted(snapshot));
                match self.service.manager_state().await {
                    Ok(state) => self.bus.publish_state(state),
                    Err(e) => warn!("Failed to read manager state: {e}"),
                }
                ConnectionStatus::Successful
            }
            Err(e) => {
                error!("Connecting to {ssid} failed: {e}");
                self.clear_profiles().await;
                ConnectionStatus::Failed
            }
        }
    }

    /// Disconnects the device. The catalog follows from later state events.
    pub(crate) async fn disconnect(&self, device: &DeviceHandle) {
        match self.service.disconnect(device).await {
            Ok(()) => info!("Disconnected {}", device.interface),
            Err(e) => warn!("Failed to disconnect {}: {e}", device.interface),
        }
    }

    /// Deletes every connection profile known to the service.
    pub(crate) async fn delete_connections(&self) {
        let profiles = match self.service.list_connection_profiles().await {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to list connection profiles: {e}");
                return;
            }
        };

        if profiles.is_empty() {
            info!("No connection profiles to delete");
            return;
        }

        for profile in &profiles {
            match self.service.delete_profile(profile).await {
                Ok(()) => debug!("Deleted profile {}", profile.id),
                Err(e) => warn!("Failed to delete profile {}: {e}", profile.id),
            }
        }
    }

    /// Re-activates a saved profile when the manager is disconnected.
    ///
    /// Profiles are tried in the order the service lists them; the first
    /// one that activates wins.
    pub(crate) async fn reload(&self, device: &DeviceHandle) {
        let state = match self.service.manager_state().await {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to read manager state: {e}");
                return;
            }
        };
        if state != ManagerState::Disconnected {
            debug!("Not reloading, manager is {state}");
            return;
        }

        let profiles = match self.service.list_connection_profiles().await {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to list connection profiles: {e}");
                return;
            }
        };
        if profiles.is_empty() {
            debug!("Not reloading, no saved profiles");
            return;
        }

        for profile in &profiles {
            match self.service.activate_profile(profile, device).await {
                Ok(()) => {
                    info!("Reactivated profile {}", profile.id);
                    return;
                }
                Err(e) => warn!("Failed to activate profile {}: {e}", profile.id),
            }
        }
        warn!("No saved profile could be activated");
    }

    /// Deactivates the active connection and clears the connected marker.
    pub(crate) async fn remove_active_connection(&self, device: &DeviceHandle) {
        match self.service.deactivate_active_connection(device).await {
            Ok(()) => {
                self.catalog.mark_connected(None);
                self.bus.publish(WifiEvent::ActiveConnectionRemoved);
            }
            Err(e) => warn!("Failed to remove active connection: {e}"),
        }
    }

    async fn clear_profiles(&self) {
        if let Err(e) = self.profiles.clear().await {
            warn!("Failed to clear connection profiles: {e}");
        }
    }
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}
