//! Settings store with coalesced, delayed writes
//!
//! Edits only touch the in-memory mirror and arm a pending timer. The mirror
//! reaches storage once the store has been idle for the write delay, so a
//! burst of edits costs a single write cycle.

use curtain_hal::{ByteStorage, StorageError};

use super::layout::{self, FIELDS, MARKER, MAX_FIELD_WIDTH, REGION_BASE, REGION_LEN};
use super::types::{RemoteAction, Settings, MAX_AWAY};
use crate::timer::PendingTimer;

/// In-memory settings mirror backed by byte storage
pub struct SettingsStore<S> {
    storage: S,
    settings: Settings,
    defaults: Settings,
    pending: PendingTimer,
    write_delay_ms: u32,
}

impl<S: ByteStorage> SettingsStore<S> {
    /// Create a store holding `defaults` until [`load`](Self::load) runs
    pub fn new(storage: S, defaults: Settings, write_delay_ms: u32) -> Self {
        Self {
            storage,
            settings: defaults,
            defaults,
            pending: PendingTimer::new(),
            write_delay_ms,
        }
    }

    /// Current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the underlying storage
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Check if edits are waiting to be written
    pub fn has_pending_write(&self) -> bool {
        self.pending.is_armed()
    }

    /// Load settings from storage
    ///
    /// Returns `true` if a valid marker was found and every field was read.
    /// Without a marker (first boot, or after [`reset`](Self::reset)) the
    /// in-memory defaults are kept. A failed read counts as "no marker".
    pub fn load(&mut self) -> bool {
        let mut marker = [0u8; 1];
        if self.storage.read(layout::marker_address(), &mut marker).is_err() || marker[0] != MARKER
        {
            return false;
        }

        let mut loaded = self.settings;
        let mut buf = [0u8; MAX_FIELD_WIDTH];
        for slot in &FIELDS {
            let bytes = &mut buf[..slot.width];
            if self.storage.read(slot.address(), bytes).is_err() {
                return false;
            }
            layout::decode(&mut loaded, slot, bytes);
        }

        self.settings = loaded;
        true
    }

    /// Record that settings changed at `now`
    ///
    /// Restarts the write delay if a write is already pending.
    pub fn trigger_write(&mut self, now: u32) {
        self.pending.arm(now);
    }

    /// Write to storage if the store has been idle for the write delay
    ///
    /// Returns `Ok(true)` when a flush happened. The pending write is
    /// cleared whether or not the storage accepted it.
    pub fn flush_if_due(&mut self, now: u32) -> Result<bool, StorageError> {
        if !self.pending.is_due(now, self.write_delay_ms) {
            return Ok(false);
        }
        self.pending.disarm();
        self.flush()?;
        Ok(true)
    }

    /// Write every field, then the marker, immediately
    ///
    /// The old marker is cleared before any field is touched, so a write
    /// torn at any point loads as "never written".
    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.storage.write(layout::marker_address(), &[0])?;
        let mut buf = [0u8; MAX_FIELD_WIDTH];
        for slot in &FIELDS {
            let bytes = layout::encode(&self.settings, slot, &mut buf);
            self.storage.write(slot.address(), bytes)?;
        }
        self.storage.write(layout::marker_address(), &[MARKER])
    }

    /// Erase the whole reserved region and restore defaults
    ///
    /// Zeroes the region one byte at a time, so this takes as long as a full
    /// scan of the region. Not debounced.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.pending.disarm();
        self.settings = self.defaults;
        for offset in 0..REGION_LEN as u16 {
            self.storage.write(REGION_BASE + offset, &[0])?;
        }
        Ok(())
    }

    /// Set the away distance (clamped to the signed position range)
    pub fn set_away(&mut self, away: u32, now: u32) -> bool {
        let away = away.min(MAX_AWAY);
        self.update(now, |s| s.away = away)
    }

    /// Enable or disable dawn/dusk automation
    pub fn set_autodawn(&mut self, enabled: bool, now: u32) -> bool {
        self.update(now, |s| s.autodawn = enabled)
    }

    /// Enable or disable temperature automation
    pub fn set_autotemp(&mut self, enabled: bool, now: u32) -> bool {
        self.update(now, |s| s.autotemp = enabled)
    }

    /// Flip dawn/dusk automation, returning the new state
    pub fn toggle_autodawn(&mut self, now: u32) -> bool {
        let enabled = !self.settings.autodawn;
        self.set_autodawn(enabled, now);
        enabled
    }

    /// Flip temperature automation, returning the new state
    pub fn toggle_autotemp(&mut self, now: u32) -> bool {
        let enabled = !self.settings.autotemp;
        self.set_autotemp(enabled, now);
        enabled
    }

    /// Assign a learned remote code
    pub fn set_remote_code(&mut self, action: RemoteAction, code: i32, now: u32) -> bool {
        self.update(now, |s| s.set_remote_code(action, code))
    }

    /// Apply an edit, scheduling a write only if something changed
    fn update(&mut self, now: u32, edit: impl FnOnce(&mut Settings)) -> bool {
        let before = self.settings;
        edit(&mut self.settings);
        let changed = self.settings != before;
        if changed {
            self.trigger_write(now);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curtain_hal::MemoryStorage;

    const DELAY: u32 = 5000;

    fn store() -> SettingsStore<MemoryStorage<256>> {
        SettingsStore::new(MemoryStorage::new(), Settings::default(), DELAY)
    }

    fn sample_settings() -> Settings {
        Settings {
            away: 4096,
            autodawn: true,
            autotemp: false,
            remote_open: 0x20DF_10EF,
            remote_close: -42,
            remote_cancel: 7,
            remote_autodawn: i32::MIN,
            remote_autotemp: i32::MAX,
        }
    }

    #[test]
    fn test_trigger_write_does_not_touch_storage() {
        let mut store = store();
        store.trigger_write(0);
        assert!(store.has_pending_write());
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_flush_if_due_noop_without_pending() {
        let mut store = store();
        assert_eq!(store.flush_if_due(1_000_000), Ok(false));
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_burst_of_edits_coalesces_into_one_flush() {
        let mut store = store();
        let mut flushes = 0;

        store.set_away(1000, 0);
        store.set_autodawn(true, 100);
        store.set_away(2000, 200);

        for now in (0..=20_000).step_by(50) {
            if store.flush_if_due(now).unwrap() {
                assert!(now >= 5200);
                flushes += 1;
            }
        }

        assert_eq!(flushes, 1);
        assert!(!store.has_pending_write());

        // Flushed values are the ones from the last edit
        let mut reloaded = SettingsStore::new(store.storage().clone(), Settings::default(), DELAY);
        assert!(reloaded.load());
        assert_eq!(reloaded.settings().away, 2000);
        assert!(reloaded.settings().autodawn);
    }

    #[test]
    fn test_flush_exactly_at_deadline() {
        let mut store = store();
        store.trigger_write(200);
        assert_eq!(store.flush_if_due(5199), Ok(false));
        assert_eq!(store.flush_if_due(5200), Ok(true));
        assert_eq!(store.flush_if_due(5201), Ok(false));
    }

    #[test]
    fn test_unchanged_value_does_not_schedule_write() {
        let mut store = store();
        assert!(!store.set_autodawn(false, 0));
        assert!(!store.has_pending_write());

        assert!(store.set_autodawn(true, 0));
        assert!(store.has_pending_write());
    }

    #[test]
    fn test_round_trip_after_restart() {
        let mut store = store();
        let wanted = sample_settings();

        store.set_away(wanted.away, 0);
        store.set_autodawn(wanted.autodawn, 0);
        store.set_autotemp(wanted.autotemp, 0);
        for action in RemoteAction::ALL {
            store.set_remote_code(action, wanted.remote_code(action), 0);
        }
        assert_eq!(store.flush_if_due(DELAY), Ok(true));

        // Simulated restart: fresh store over the same bytes
        let mut restarted =
            SettingsStore::new(store.storage().clone(), Settings::default(), DELAY);
        assert!(restarted.load());
        assert_eq!(*restarted.settings(), wanted);
    }

    #[test]
    fn test_load_without_marker_keeps_defaults() {
        let defaults = Settings::with_away(1234);
        let mut store = SettingsStore::new(MemoryStorage::<256>::new(), defaults, DELAY);
        assert!(!store.load());
        assert_eq!(*store.settings(), defaults);
    }

    #[test]
    fn test_marker_written_last() {
        let mut storage = MemoryStorage::<256>::new();
        {
            let mut store = SettingsStore::new(&mut storage, sample_settings(), DELAY);
            store.flush().unwrap();
        }
        let marker_index = layout::marker_address() as usize;
        assert_eq!(storage.contents()[marker_index], MARKER);
        assert_eq!(storage.last_write_address(), Some(layout::marker_address()));
        assert_eq!(storage.write_count(), FIELDS.len() + 2);
    }

    #[test]
    fn test_torn_first_flush_reads_as_never_written() {
        for budget in 0..=FIELDS.len() + 1 {
            let mut store = store();
            store.set_away(1000, 0);
            store.storage_mut().fail_after(budget);
            assert_eq!(store.flush(), Err(StorageError::Device));

            let mut reloaded =
                SettingsStore::new(store.storage().clone(), Settings::default(), DELAY);
            assert!(!reloaded.load(), "torn after {} writes", budget);
        }
    }

    #[test]
    fn test_torn_rewrite_never_mixes_records() {
        for budget in 0..=FIELDS.len() + 1 {
            let mut store = store();
            store.set_away(1000, 0);
            store.flush().unwrap();

            store.set_away(2000, 0);
            store.set_autodawn(true, 0);
            store.storage_mut().fail_after(budget);
            assert_eq!(store.flush(), Err(StorageError::Device));

            let mut reloaded =
                SettingsStore::new(store.storage().clone(), Settings::default(), DELAY);
            assert!(!reloaded.load(), "torn after {} writes", budget);
            assert_eq!(*reloaded.settings(), Settings::default());
        }
    }

    #[test]
    fn test_reset_erases_region_and_restores_defaults() {
        let mut store = store();
        store.set_away(999, 0);
        store.flush().unwrap();
        store.set_autotemp(true, 10);

        store.reset().unwrap();

        assert!(!store.has_pending_write());
        assert_eq!(*store.settings(), Settings::default());

        let start = REGION_BASE as usize;
        assert!(store.storage().contents()[start..start + REGION_LEN]
            .iter()
            .all(|&b| b == 0));
        assert!(!store.load());
    }

    #[test]
    fn test_reset_leaves_bytes_outside_region() {
        let mut store = store();
        store.storage_mut().write(REGION_BASE - 1, &[0x5A]).unwrap();
        store.reset().unwrap();
        assert_eq!(store.storage().contents()[REGION_BASE as usize - 1], 0x5A);
    }

    #[test]
    fn test_failed_flush_clears_pending() {
        let mut store = store();
        store.set_away(10, 0);
        store.storage_mut().set_fail_writes(true);

        assert_eq!(store.flush_if_due(DELAY), Err(StorageError::Device));
        assert!(!store.has_pending_write());
    }

    #[test]
    fn test_region_must_fit_storage() {
        let mut store = SettingsStore::new(MemoryStorage::<64>::new(), Settings::default(), DELAY);
        assert_eq!(store.flush(), Err(StorageError::OutOfRange));
        assert!(!store.load());
    }

    #[test]
    fn test_toggles() {
        let mut store = store();
        assert!(store.toggle_autodawn(0));
        assert!(store.settings().autodawn);
        assert!(!store.toggle_autodawn(0));
        assert!(store.toggle_autotemp(0));
        assert!(store.settings().autotemp);
    }
}
