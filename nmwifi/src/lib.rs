//! Wi-Fi connectivity management on top of NetworkManager.
//!
//! This crate manages a single wireless interface:
//!
//! - Scanning and keeping a ranked catalog of secured access points
//! - Tracking which access point is active
//! - Connecting, disconnecting, and reactivating saved profiles
//! - Republishing NetworkManager's state notifications as typed events
//!
//! # Example
//!
//! ```no_run
//! use nmwifi::{WifiConfig, WifiManager};
//! use std::sync::Arc;
//! use tokio::sync::watch;
//!
//! # async fn example() -> nmwifi::Result<()> {
//! let wifi = Arc::new(WifiManager::new(WifiConfig::default()).await?);
//! wifi.start().await;
//!
//! // Feed NetworkManager notifications through the manager
//! let (_stop, shutdown) = watch::channel(());
//! let monitor = Arc::clone(&wifi);
//! tokio::spawn(async move { monitor.run_events(shutdown).await });
//!
//! for ap in wifi.scan().await.iter() {
//!     println!("{} {}", ap.name, ap.signal_strength);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Commands on [`WifiManager`] never fail: connect requests resolve to a
//! [`ConnectionStatus`], everything else is reported through [`WifiEvent`]s
//! and log lines. Lower-level calls return `Result<T, WifiError>`.
//!
//! # Backends
//!
//! [`WifiManager::new`] talks to NetworkManager on the system bus through
//! [`NmService`]. Any other [`NetworkService`] and [`ProfileStore`] can be
//! plugged in with [`WifiManager::with_service`].
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod core;
mod dbus;
mod monitoring;
mod service;
mod types;
mod util;

// Public API modules
pub mod api;

pub use api::builders;
pub use api::config::WifiConfig;
pub use api::models::{
    AccessPointRecord, AccessPointState, ActiveConnectionState, CatalogSnapshot, ConnectPhase,
    ConnectionStateReason, ConnectionStatus, DeviceHandle, DeviceState, ManagerState,
    Notification, Profile, RawAccessPoint, WifiError, WifiEvent,
    connection_state_reason_to_error,
};
pub use api::wifi_manager::WifiManager;
pub use crate::core::profiles::{DirProfileStore, ProfileStore};
pub use service::{NetworkService, NmService, NotificationStream};

/// A specialized `Result` type for Wi-Fi operations.
pub type Result<T> = std::result::Result<T, WifiError>;
