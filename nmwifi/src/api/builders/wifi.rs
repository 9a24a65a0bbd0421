//! Wi-Fi connection settings.
//!
//! A connection is represented as a nested dictionary:
//! - `connection`: General settings (type, id, uuid, autoconnect)
//! - `802-11-wireless`: Wi-Fi specific settings (ssid, mode, hidden, security reference)
//! - `802-11-wireless-security`: Security settings (key-mgmt, psk, auth-alg)
//! - `ipv4` / `ipv6`: IP configuration (always "auto")

use std::collections::HashMap;
use zvariant::Value;

/// A NetworkManager settings dictionary.
pub type ConnectionSettings = HashMap<&'static str, HashMap<&'static str, Value<'static>>>;

/// Creates a D-Bus string array value.
fn string_array(xs: &[&str]) -> Value<'static> {
    let vals: Vec<String> = xs.iter().map(|s| s.to_string()).collect();
    Value::from(vals)
}

/// Builds the `connection` section with type, id, uuid, and autoconnect.
fn connection_section(ssid: &str) -> HashMap<&'static str, Value<'static>> {
    let mut s = HashMap::new();
    s.insert("type", Value::from("802-11-wireless"));
    s.insert("id", Value::from(ssid.to_string()));
    s.insert("uuid", Value::from(uuid::Uuid::new_v4().to_string()));
    s.insert("autoconnect", Value::from(true));
    s
}

/// Builds the `802-11-wireless` section with SSID, mode and hidden flag.
fn wifi_section(ssid: &str, hidden: bool) -> HashMap<&'static str, Value<'static>> {
    let mut s = HashMap::new();
    s.insert("ssid", Value::from(ssid.as_bytes().to_vec()));
    s.insert("mode", Value::from("infrastructure"));
    if hidden {
        s.insert("hidden", Value::from(true));
    }
    s
}

/// Builds the `802-11-wireless-security` section for WPA-PSK networks.
///
/// Uses WPA2 (RSN) with CCMP encryption. The `psk-flags` of 0 means the
/// password is stored in the connection.
fn psk_security(psk: &str) -> HashMap<&'static str, Value<'static>> {
    let mut sec = HashMap::new();

    sec.insert("key-mgmt", Value::from("wpa-psk"));
    sec.insert("psk", Value::from(psk.to_string()));
    sec.insert("psk-flags", Value::from(0u32));
    sec.insert("auth-alg", Value::from("open"));

    // Enforce WPA2 with AES
    sec.insert("proto", string_array(&["rsn"]));
    sec.insert("pairwise", string_array(&["ccmp"]));
    sec.insert("group", string_array(&["ccmp"]));

    sec
}

/// Builds a complete Wi-Fi connection settings dictionary.
///
/// An empty `passphrase` produces an open-network profile; anything else
/// produces a WPA2-PSK profile. `hidden` makes NetworkManager probe for the
/// SSID instead of waiting for it in beacons.
///
/// # Examples
///
/// ```
/// use nmwifi::builders::build_wifi_connection;
///
/// let settings = build_wifi_connection("Office", "correct horse", true);
/// assert!(settings.contains_key("802-11-wireless-security"));
/// ```
pub fn build_wifi_connection(ssid: &str, passphrase: &str, hidden: bool) -> ConnectionSettings {
    let mut conn: ConnectionSettings = HashMap::new();

    conn.insert("connection", connection_section(ssid));
    conn.insert("802-11-wireless", wifi_section(ssid, hidden));

    let mut ipv4 = HashMap::new();
    ipv4.insert("method", Value::from("auto"));
    conn.insert("ipv4", ipv4);

    let mut ipv6 = HashMap::new();
    ipv6.insert("method", Value::from("auto"));
    conn.insert("ipv6", ipv6);

    if !passphrase.is_empty() {
        if let Some(w) = conn.get_mut("802-11-wireless") {
            w.insert("security", Value::from("802-11-wireless-security"));
        }
        conn.insert("802-11-wireless-security", psk_security(passphrase));
    }

    conn
}
