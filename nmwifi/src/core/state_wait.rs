//! Connection activation monitoring using D-Bus signals.
//!
//! Instead of polling the active connection in a loop, the wait subscribes
//! to `NMActiveConnection.StateChanged` and returns as soon as the
//! connection reaches a terminal state, carrying the reason NetworkManager
//! gave for a failure.

use futures::{FutureExt, StreamExt, select};
use futures_timer::Delay;
use log::{debug, warn};
use std::pin::pin;
use std::time::Duration;
use zbus::Connection;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::api::models::{
    ActiveConnectionState, ConnectionStateReason, WifiError, connection_state_reason_to_error,
};
use crate::dbus::NMActiveConnectionProxy;

/// Waits for an active connection to reach the activated state.
///
/// Fails with the mapped reason if the connection deactivates, with
/// [`WifiError::Timeout`] after `timeout`, and with [`WifiError::Stuck`] if
/// the signal stream ends first.
pub(crate) async fn wait_for_connection_activation(
    conn: &Connection,
    active_conn_path: &OwnedObjectPath,
    timeout: Duration,
) -> Result<()> {
    let active_conn = NMActiveConnectionProxy::builder(conn)
        .path(active_conn_path.clone())?
        .build()
        .await?;

    // Subscribe before reading the state so no transition is missed
    let mut stream = active_conn.receive_activation_state_changed().await?;
    debug!("Subscribed to ActiveConnection StateChanged signal");

    let state = ActiveConnectionState::from(active_conn.state().await?);
    debug!("Current active connection state: {state}");

    match state {
        ActiveConnectionState::Activated => {
            debug!("Connection already activated");
            return Ok(());
        }
        ActiveConnectionState::Deactivated => {
            warn!("Connection already deactivated");
            return Err(WifiError::ActivationFailed(ConnectionStateReason::Unknown));
        }
        _ => {}
    }

    let mut timeout_delay = pin!(Delay::new(timeout).fuse());

    loop {
        select! {
            _ = timeout_delay => {
                warn!("Connection activation timed out after {timeout:?}");
                return Err(WifiError::Timeout);
            }
            signal_opt = stream.next() => {
                let Some(signal) = signal_opt else {
                    return Err(WifiError::Stuck("signal stream ended".into()));
                };
                let args = match signal.args() {
                    Ok(args) => args,
                    Err(e) => {
                        warn!("Failed to parse StateChanged signal args: {e}");
                        continue;
                    }
                };

                let new_state = ActiveConnectionState::from(args.state);
                let reason = ConnectionStateReason::from(args.reason);
                debug!("Active connection state changed to: {new_state} (reason: {reason})");

                match new_state {
                    ActiveConnectionState::Activated => {
                        debug!("Connection activation successful");
                        return Ok(());
                    }
                    ActiveConnectionState::Deactivated => {
                        debug!("Connection activation failed: {reason}");
                        return Err(connection_state_reason_to_error(args.reason));
                    }
                    _ => {}
                }
            }
        }
    }
}
