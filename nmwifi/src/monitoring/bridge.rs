//! Raw notification to domain event mapping.

use log::{debug, info};

use crate::api::models::{DeviceState, ManagerState, Notification, WifiEvent};

/// Maps notifications for one wireless device into [`WifiEvent`]s.
///
/// Mapping is pure: the caller publishes the returned events in order.
#[derive(Debug, Clone)]
pub(crate) struct EventBridge {
    device_path: String,
}

impl EventBridge {
    pub(crate) fn new(device_path: impl Into<String>) -> Self {
        Self {
            device_path: device_path.into(),
        }
    }

    /// Returns the events `notification` translates to, in emission order.
    pub(crate) fn map(&self, notification: &Notification) -> Vec<WifiEvent> {
        match notification {
            Notification::ManagerStateChanged(state) => map_manager_state(*state),
            Notification::DeviceStateChanged {
                device,
                new_state,
                old_state,
                reason,
            } => {
                if *device != self.device_path {
                    debug!("Ignoring state change on other device {device}");
                    return Vec::new();
                }
                debug!("Device state {old_state} -> {new_state} (reason {reason})");
                map_device_state(*new_state)
            }
            Notification::DeviceAdded { path } => {
                vec![WifiEvent::DeviceAdded { path: path.clone() }]
            }
            Notification::DeviceRemoved { path } => {
                vec![WifiEvent::DeviceRemoved { path: path.clone() }]
            }
            Notification::WirelessEnabledChanged(enabled) => {
                info!("Wireless enabled: {enabled}");
                Vec::new()
            }
        }
    }
}

fn map_manager_state(state: ManagerState) -> Vec<WifiEvent> {
    match state {
        ManagerState::ConnectedGlobal => {
            vec![WifiEvent::ConnectedGlobal, WifiEvent::CurrentStrengthChanged]
        }
        ManagerState::Disconnected => vec![WifiEvent::NoSavedAccessPointAvailable],
        other => {
            debug!("Network manager state: {other}");
            Vec::new()
        }
    }
}

fn map_device_state(state: DeviceState) -> Vec<WifiEvent> {
    match state {
        DeviceState::Activated => vec![WifiEvent::PasswordAuthSucceeded],
        DeviceState::Failed => vec![WifiEvent::PasswordAuthFailed],
        _ => Vec::new(),
    }
}
