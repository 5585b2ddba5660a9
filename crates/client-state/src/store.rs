//! The single authoritative snapshot of game state.
//!
//! Every successful backend call yields a complete [`GameState`] that
//! unconditionally replaces the prior one. There is no partial-update
//! operation: the client never computes derived state itself, which
//! eliminates client/server drift at the cost of payload size.

use game_model::{validate_state, GameState, Profile, StateError};
use thiserror::Error;
use tracing::error;

/// Failures observable through the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// `current()` was called before the first successful load.
    #[error("no snapshot has been loaded yet")]
    NotLoaded,
    /// The offered snapshot violates the state invariants; the store
    /// keeps its previous contents.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[from] StateError),
}

/// Holder of the one `GameState` instance. Reads come from here; writes
/// happen only through whole-snapshot replacement.
#[derive(Debug, Default)]
pub struct StateStore {
    snapshot: Option<GameState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the held snapshot with a new one.
    ///
    /// An invalid snapshot (empty profile list or dangling index) is
    /// rejected wholesale: the store keeps its last good state and the
    /// defect is logged rather than rendered.
    pub fn replace(&mut self, snapshot: GameState) -> Result<(), StoreError> {
        if let Err(e) = validate_state(&snapshot) {
            error!(error = %e, "rejecting invalid snapshot, keeping last good state");
            return Err(e.into());
        }
        self.snapshot = Some(snapshot);
        Ok(())
    }

    /// The currently selected profile.
    ///
    /// Fails loudly before the first successful load instead of letting
    /// a consumer render stale or absent data. After a successful
    /// `replace` the selection index cannot dangle.
    pub fn current(&self) -> Result<&Profile, StoreError> {
        let state = self.snapshot.as_ref().ok_or(StoreError::NotLoaded)?;
        state.selected().ok_or(StoreError::NotLoaded)
    }

    /// Read access to the full snapshot for presentation consumers.
    pub fn state(&self) -> Option<&GameState> {
        self.snapshot.as_ref()
    }

    /// True once a first snapshot has been accepted.
    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_model::{Profile, ProfileData, ProfileStatus};
    use proptest::prelude::*;

    fn profile(name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            total_level: 1,
            status: ProfileStatus::Normal,
            data: Some(ProfileData::default()),
        }
    }

    fn state(names: &[&str], selected: usize) -> GameState {
        GameState {
            profiles: names.iter().map(|n| profile(n)).collect(),
            selected_profile_index: selected,
        }
    }

    #[test]
    fn current_fails_before_first_load() {
        let store = StateStore::new();
        assert_eq!(store.current().unwrap_err(), StoreError::NotLoaded);
        assert!(!store.is_loaded());
    }

    #[test]
    fn replace_is_total() {
        let mut store = StateStore::new();
        store.replace(state(&["A", "B"], 0)).unwrap();
        assert_eq!(store.current().unwrap().name, "A");

        store.replace(state(&["C"], 0)).unwrap();
        // Nothing of the old snapshot survives.
        let s = store.state().unwrap();
        assert_eq!(s.profiles.len(), 1);
        assert_eq!(store.current().unwrap().name, "C");
    }

    #[test]
    fn invalid_snapshot_keeps_last_good_state() {
        let mut store = StateStore::new();
        store.replace(state(&["A"], 0)).unwrap();

        let err = store.replace(state(&[], 0)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidSnapshot(_)));
        assert_eq!(store.current().unwrap().name, "A");

        let err = store.replace(state(&["B", "C"], 2)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidSnapshot(_)));
        assert_eq!(store.current().unwrap().name, "A");
    }

    proptest! {
        /// No sequence of replace attempts can leave the store observing
        /// an out-of-range selection.
        #[test]
        fn selection_never_dangles(ops in proptest::collection::vec((1usize..5, 0usize..8), 0..20)) {
            let mut store = StateStore::new();
            for (len, idx) in ops {
                let names: Vec<String> = (0..len).map(|i| format!("P{i}")).collect();
                let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
                let _ = store.replace(state(&refs, idx));
                if let Some(s) = store.state() {
                    prop_assert!(s.selected_profile_index < s.profiles.len());
                    prop_assert!(!s.profiles.is_empty());
                }
            }
        }
    }
}
