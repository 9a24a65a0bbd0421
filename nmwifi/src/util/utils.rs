//! Helpers shared by the D-Bus backend.
//!
//! SSID decoding, strength conversion, and proxy construction for the
//! NetworkManager objects that have no typed proxy.

use log::warn;
use std::borrow::Cow;
use std::str;
use zbus::Connection;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::types::constants::paths;

/// Decode SSID bytes for comparison purposes, defaulting to empty string if invalid.
pub(crate) fn decode_ssid_or_empty(bytes: &[u8]) -> Cow<'static, str> {
    if bytes.is_empty() {
        return Cow::Borrowed("");
    }

    match str::from_utf8(bytes) {
        Ok(s) => Cow::Owned(s.to_owned()),
        Err(e) => {
            warn!("Invalid UTF-8 in SSID during comparison: {e}");
            Cow::Borrowed("")
        }
    }
}

/// Returns `true` if a NetworkManager object path is the "none" placeholder.
pub(crate) fn is_none_path(path: &OwnedObjectPath) -> bool {
    path.as_str() == paths::NONE
}

/// Helper to create a NetworkManager D-Bus proxy for a given path and interface.
pub(crate) async fn nm_proxy<'a, P>(
    conn: &'a Connection,
    path: P,
    interface: &'a str,
) -> Result<zbus::Proxy<'a>>
where
    P: TryInto<OwnedObjectPath>,
    P::Error: Into<zbus::Error>,
{
    let owned_path = path.try_into().map_err(Into::into)?;
    Ok(zbus::proxy::Builder::new(conn)
        .destination(paths::SERVICE)?
        .path(owned_path)?
        .interface(interface)?
        .build()
        .await?)
}

/// Helper to create a Settings proxy.
///
/// Used to list saved connection profiles.
pub(crate) async fn settings_proxy(conn: &Connection) -> Result<zbus::Proxy<'_>> {
    nm_proxy(
        conn,
        paths::SETTINGS,
        "org.freedesktop.NetworkManager.Settings",
    )
    .await
}

/// Helper to create a Settings.Connection proxy for a specific connection.
///
/// Used to read a profile's settings or delete it.
pub(crate) async fn connection_settings_proxy<'a, P>(
    conn: &'a Connection,
    connection_path: P,
) -> Result<zbus::Proxy<'a>>
where
    P: TryInto<OwnedObjectPath>,
    P::Error: Into<zbus::Error>,
{
    nm_proxy(conn, connection_path, paths::SETTINGS_CONNECTION).await
}

/// Macro to convert Result to Option with error logging.
/// Usage: `try_log!(result, "context message")?`
#[macro_export]
macro_rules! try_log {
    ($result:expr, $context:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{}: {:?}", $context, e);
                return None;
            }
        }
    };
}
