//! Type definitions and constants.
//!
//! This module contains NetworkManager constants and the access point
//! security flags.

pub(crate) mod constants;
pub(crate) mod security;
