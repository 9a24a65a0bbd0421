//! Connection settings builders.
//!
//! Builds the nested settings dictionaries NetworkManager expects when a new
//! connection profile is created with `AddAndActivateConnection`.

pub mod wifi;

pub use wifi::build_wifi_connection;
