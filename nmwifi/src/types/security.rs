//! Access point capability and security flags.
//!
//! NetworkManager reports three flag words per access point: the general
//! `Flags` (802.11 privacy bit) and the `WpaFlags`/`RsnFlags` security
//! capabilities. Only whether any protection is present matters to the
//! catalog, but the flags are kept typed so callers never compare raw masks.

use bitflags::bitflags;

bitflags! {
    /// General 802.11 capability flags (`NM80211ApFlags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ApFlags: u32 {
        /// Privacy bit; set for WEP and most WPA networks.
        const PRIVACY = 0x1;
        const WPS = 0x2;
        const WPS_PBC = 0x4;
        const WPS_PIN = 0x8;
    }
}

bitflags! {
    /// WPA/RSN security capability flags (`NM80211ApSecurityFlags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ApSecurityFlags: u32 {
        const PAIR_WEP40 = 0x1;
        const PAIR_WEP104 = 0x2;
        const PAIR_TKIP = 0x4;
        const PAIR_CCMP = 0x8;
        const GROUP_WEP40 = 0x10;
        const GROUP_WEP104 = 0x20;
        const GROUP_TKIP = 0x40;
        const GROUP_CCMP = 0x80;
        const KEY_MGMT_PSK = 0x100;
        const KEY_MGMT_802_1X = 0x200;
        const KEY_MGMT_SAE = 0x400;
        const KEY_MGMT_OWE = 0x800;
        const KEY_MGMT_OWE_TM = 0x1000;
        const KEY_MGMT_EAP_SUITE_B_192 = 0x2000;
    }
}

/// Returns `true` if an access point with these flags requires authentication.
///
/// Unknown bits are kept rather than dropped, so a flag word NetworkManager
/// adds in the future still marks the network as secured.
pub(crate) fn is_secured(flags: u32, wpa_flags: u32, rsn_flags: u32) -> bool {
    ApFlags::from_bits_retain(flags).contains(ApFlags::PRIVACY)
        || !ApSecurityFlags::from_bits_retain(wpa_flags).is_empty()
        || !ApSecurityFlags::from_bits_retain(rsn_flags).is_empty()
}
