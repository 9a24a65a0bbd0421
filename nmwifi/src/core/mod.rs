//! Core Wi-Fi logic.
//!
//! This module holds the access point catalog, the connection controller,
//! the profile store, and the activation wait used by the D-Bus backend.

pub(crate) mod catalog;
pub(crate) mod controller;
pub mod profiles;
pub(crate) mod state_wait;
