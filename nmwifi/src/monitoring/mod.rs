//! Event plumbing between the network service and subscribers.
//!
//! [`bridge`] turns raw service notifications into domain events and
//! [`bus`] fans them out to every subscriber.

pub(crate) mod bridge;
pub(crate) mod bus;
