//! Corruption lockout: derives the interaction lock from the selected
//! profile and forces navigation to the maintenance view while locked.
//!
//! The guard is a pure function of `(selected profile status, advisory
//! flag)` — it holds no state beyond the one-shot advisory bookkeeping,
//! so it is trivially re-derivable after any snapshot replacement.

use game_model::GameState;
use tracing::warn;

/// Interaction lock derived from the selected profile's status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LockState {
    #[default]
    Unlocked,
    /// Only maintenance controls are usable; navigation is pinned to
    /// the settings view.
    Locked,
}

/// The navigable views of the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Home,
    Skills,
    Inventory,
    Stats,
    Settings,
}

/// State-mutating controls subject to the lockout matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Any gameplay action button (gather, mine, forage, ...).
    Action,
    NewProfile,
    RenameProfile,
    DeleteProfile,
    ResetProfile,
    /// Repairs a corrupt profile to a fresh state.
    FixProfile,
    /// Migrates an outdated profile; only surfaced while locked.
    MigrateProfile,
    HardReset,
}

/// Role of the reset control, which doubles as the fix control while
/// the selected profile is corrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetRole {
    /// Destructive reset of a healthy profile.
    ResetCurrent,
    /// Repair of a corrupt profile.
    FixCorrupt,
}

impl ResetRole {
    pub fn label(&self) -> &'static str {
        match self {
            ResetRole::ResetCurrent => "Reset Current Profile",
            ResetRole::FixCorrupt => "Fix Corrupt Profile",
        }
    }
}

/// One-time advisory emitted on entry to the locked state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Advisory {
    pub title: String,
    pub body: String,
}

impl Advisory {
    fn for_profile(name: &str) -> Self {
        Advisory {
            title: "Profile Corrupt".to_string(),
            body: format!(
                "The profile \"{name}\" is corrupt or outdated. All actions are \
                 disabled. Please go to the Settings tab to fix or delete it."
            ),
        }
    }
}

/// Result of re-deriving the lock after a snapshot replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardOutcome {
    pub lock: LockState,
    /// View the client must snap to, if any.
    pub forced_view: Option<View>,
    /// Advisory to surface; `None` when already shown for this episode.
    pub advisory: Option<Advisory>,
}

/// Tracks the one-shot advisory flag across re-evaluations.
///
/// The flag is scoped to the current corrupt episode: it clears on
/// transition back to unlocked or when a different profile becomes
/// selected, so periodic refreshes never re-trigger the advisory.
#[derive(Debug, Default)]
pub struct CorruptionGuard {
    advisory_shown: bool,
    last_selected: Option<usize>,
}

impl CorruptionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-derive the lock from a freshly validated snapshot.
    pub fn evaluate(&mut self, state: &GameState) -> GuardOutcome {
        let index = state.selected_profile_index;
        if self.last_selected != Some(index) {
            self.advisory_shown = false;
        }
        self.last_selected = Some(index);

        let Some(profile) = state.selected() else {
            // The store validates before we ever get here.
            warn!(index, "guard evaluated against a dangling selection");
            return GuardOutcome {
                lock: LockState::Unlocked,
                forced_view: None,
                advisory: None,
            };
        };

        if profile.is_corrupt() {
            let advisory = if self.advisory_shown {
                None
            } else {
                self.advisory_shown = true;
                Some(Advisory::for_profile(&profile.name))
            };
            GuardOutcome {
                lock: LockState::Locked,
                forced_view: Some(View::Settings),
                advisory,
            }
        } else {
            self.advisory_shown = false;
            GuardOutcome {
                lock: LockState::Unlocked,
                forced_view: None,
                advisory: None,
            }
        }
    }
}

/// Whether a control is usable under the given lock.
///
/// While locked, everything state-mutating is disabled except deleting
/// or fixing the corrupt profile itself; migration is part of the same
/// maintenance surface and is only offered while locked.
pub fn control_enabled(lock: LockState, control: Control) -> bool {
    match lock {
        LockState::Unlocked => !matches!(control, Control::FixProfile | Control::MigrateProfile),
        LockState::Locked => matches!(
            control,
            Control::DeleteProfile | Control::FixProfile | Control::MigrateProfile
        ),
    }
}

/// Whether switching from `active` to `target` is allowed. While locked
/// only a re-click of the already-active view passes.
pub fn view_switch_allowed(lock: LockState, active: View, target: View) -> bool {
    match lock {
        LockState::Unlocked => true,
        LockState::Locked => target == active,
    }
}

/// Current role of the reset control.
pub fn reset_control_role(lock: LockState) -> ResetRole {
    match lock {
        LockState::Unlocked => ResetRole::ResetCurrent,
        LockState::Locked => ResetRole::FixCorrupt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_model::{Profile, ProfileData, ProfileStatus};

    fn profile(name: &str, status: ProfileStatus) -> Profile {
        Profile {
            name: name.to_string(),
            total_level: 0,
            status,
            data: match status {
                ProfileStatus::Normal => Some(ProfileData::default()),
                ProfileStatus::Corrupt => None,
            },
        }
    }

    fn state(statuses: &[(&str, ProfileStatus)], selected: usize) -> GameState {
        GameState {
            profiles: statuses.iter().map(|(n, s)| profile(n, *s)).collect(),
            selected_profile_index: selected,
        }
    }

    #[test]
    fn corrupt_selection_locks_and_forces_settings() {
        let mut guard = CorruptionGuard::new();
        let out = guard.evaluate(&state(&[("Broken", ProfileStatus::Corrupt)], 0));
        assert_eq!(out.lock, LockState::Locked);
        assert_eq!(out.forced_view, Some(View::Settings));
        let advisory = out.advisory.expect("first evaluation must advise");
        assert_eq!(advisory.title, "Profile Corrupt");
        assert!(advisory.body.contains("Broken"));
    }

    #[test]
    fn advisory_fires_once_per_episode() {
        let mut guard = CorruptionGuard::new();
        let s = state(&[("Broken", ProfileStatus::Corrupt)], 0);
        assert!(guard.evaluate(&s).advisory.is_some());
        // Periodic refreshes of the same corrupt profile stay quiet.
        assert!(guard.evaluate(&s).advisory.is_none());
        assert!(guard.evaluate(&s).advisory.is_none());
    }

    #[test]
    fn advisory_flag_clears_on_unlock() {
        let mut guard = CorruptionGuard::new();
        let corrupt = state(&[("Broken", ProfileStatus::Corrupt)], 0);
        assert!(guard.evaluate(&corrupt).advisory.is_some());

        let fixed = state(&[("Broken", ProfileStatus::Normal)], 0);
        let out = guard.evaluate(&fixed);
        assert_eq!(out.lock, LockState::Unlocked);
        assert_eq!(out.forced_view, None);

        // Corrupt again: a new episode, a new advisory.
        assert!(guard.evaluate(&corrupt).advisory.is_some());
    }

    #[test]
    fn advisory_flag_clears_on_selection_change() {
        let mut guard = CorruptionGuard::new();
        let both = &[
            ("Broken", ProfileStatus::Corrupt),
            ("AlsoBroken", ProfileStatus::Corrupt),
        ];
        assert!(guard.evaluate(&state(both, 0)).advisory.is_some());
        let out = guard.evaluate(&state(both, 1));
        let advisory = out.advisory.expect("new selection is a new episode");
        assert!(advisory.body.contains("AlsoBroken"));
    }

    #[test]
    fn healthy_selection_is_fully_unlocked() {
        let mut guard = CorruptionGuard::new();
        let out = guard.evaluate(&state(&[("Fine", ProfileStatus::Normal)], 0));
        assert_eq!(out.lock, LockState::Unlocked);
        assert_eq!(out.forced_view, None);
        assert_eq!(out.advisory, None);
        for control in [
            Control::Action,
            Control::NewProfile,
            Control::RenameProfile,
            Control::DeleteProfile,
            Control::ResetProfile,
            Control::HardReset,
        ] {
            assert!(control_enabled(LockState::Unlocked, control), "{control:?}");
        }
    }

    #[test]
    fn locked_control_matrix_is_maintenance_only() {
        for control in [
            Control::Action,
            Control::NewProfile,
            Control::RenameProfile,
            Control::ResetProfile,
            Control::HardReset,
        ] {
            assert!(!control_enabled(LockState::Locked, control), "{control:?}");
        }
        assert!(control_enabled(LockState::Locked, Control::DeleteProfile));
        assert!(control_enabled(LockState::Locked, Control::FixProfile));
        assert!(control_enabled(LockState::Locked, Control::MigrateProfile));
    }

    #[test]
    fn locked_navigation_allows_only_reclick() {
        assert!(view_switch_allowed(
            LockState::Locked,
            View::Settings,
            View::Settings
        ));
        assert!(!view_switch_allowed(
            LockState::Locked,
            View::Settings,
            View::Home
        ));
        assert!(view_switch_allowed(
            LockState::Unlocked,
            View::Settings,
            View::Home
        ));
    }

    #[test]
    fn reset_control_doubles_as_fix_while_locked() {
        assert_eq!(
            reset_control_role(LockState::Unlocked).label(),
            "Reset Current Profile"
        );
        assert_eq!(
            reset_control_role(LockState::Locked).label(),
            "Fix Corrupt Profile"
        );
    }
}
