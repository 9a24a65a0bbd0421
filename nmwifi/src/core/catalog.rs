//! Access point catalog.
//!
//! Holds the ranked, filtered list of access points from the latest scan.
//! The list is never edited in place: every change builds a new
//! [`CatalogSnapshot`] and swaps it in under the lock, so readers always see
//! one complete scan.

use log::debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::models::{AccessPointRecord, AccessPointState, CatalogSnapshot, RawAccessPoint};

/// The set of known access points and their connection state.
#[derive(Debug, Default)]
pub(crate) struct AccessPointCatalog {
    current: Mutex<CatalogSnapshot>,
}

impl AccessPointCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replaces the catalog with the secured, named entries of `raw`.
    ///
    /// The entry whose name equals `active_name` is marked connected. If a
    /// name appears more than once, the last occurrence wins. Records are
    /// sorted by descending signal strength; equal strengths keep scan order.
    pub(crate) fn replace(
        &self,
        raw: &[RawAccessPoint],
        active_name: Option<&str>,
    ) -> CatalogSnapshot {
        let mut records: Vec<AccessPointRecord> = Vec::with_capacity(raw.len());

        for ap in raw {
            if !ap.secured || ap.ssid.is_empty() {
                debug!(
                    "Skipping unsecured or unnamed access point '{}' ({} MHz)",
                    ap.ssid, ap.frequency
                );
                continue;
            }

            let record = AccessPointRecord {
                name: ap.ssid.clone(),
                frequency: ap.frequency,
                state: state_for(&ap.ssid, active_name),
                secured: ap.secured,
                signal_strength: ap.signal_strength,
            };

            match records.iter_mut().find(|r| r.name == record.name) {
                Some(existing) => *existing = record,
                None => records.push(record),
            }
        }

        // stable: ties keep scan order
        records.sort_by(|a, b| b.signal_strength.cmp(&a.signal_strength));

        let snapshot = CatalogSnapshot::new(records);
        *self.lock() = snapshot.clone();
        snapshot
    }

    /// Rebuilds the current snapshot with only the connected marker changed.
    ///
    /// `None` marks every record disconnected.
    pub(crate) fn mark_connected(&self, active_name: Option<&str>) -> CatalogSnapshot {
        let mut guard = self.lock();
        let records = guard
            .iter()
            .map(|r| AccessPointRecord {
                state: state_for(&r.name, active_name),
                ..r.clone()
            })
            .collect();

        let snapshot = CatalogSnapshot::new(records);
        *guard = snapshot.clone();
        snapshot
    }

    /// Returns the current snapshot.
    pub(crate) fn snapshot(&self) -> CatalogSnapshot {
        self.lock().clone()
    }

    /// Looks up a record by name.
    pub(crate) fn find(&self, name: &str) -> Option<AccessPointRecord> {
        self.lock().iter().find(|r| r.name == name).cloned()
    }

    /// Returns the name of the connected record, or an empty string.
    pub(crate) fn current_connected_name(&self) -> String {
        self.lock()
            .connected()
            .map(|r| r.name.clone())
            .unwrap_or_default()
    }

    /// Returns the signal strength of `name`, or 0 if unknown or empty.
    pub(crate) fn signal_strength(&self, name: &str) -> i32 {
        if name.is_empty() {
            return 0;
        }
        self.find(name).map(|r| r.signal_strength).unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, CatalogSnapshot> {
        // Writers only ever store a complete snapshot, so a poisoned lock
        // still guards a consistent value.
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn state_for(name: &str, active_name: Option<&str>) -> AccessPointState {
    match active_name {
        Some(active) if !active.is_empty() && active == name => AccessPointState::Connected,
        _ => AccessPointState::Disconnected,
    }
}
