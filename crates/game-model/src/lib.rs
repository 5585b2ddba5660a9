#![deny(warnings)]

//! Domain model and wire format for the idle-gather client.
//!
//! This crate defines the serializable snapshot types exchanged with the
//! backend, with validation helpers to guarantee the snapshot invariants:
//! at least one profile exists and the selected index is always in range.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Skill names the backend tracks for every profile.
pub const ALL_SKILLS: [&str; 3] = ["Woodcutting", "Mining", "Foraging"];

/// Item names the backend tracks for every profile.
pub const ALL_ITEMS: [&str; 3] = ["Wood", "Stone", "Herbs"];

/// Name of the profile the backend seeds a fresh save with.
pub const DEFAULT_PROFILE_NAME: &str = "Adventurer";

/// Health of a profile's backing data.
///
/// A closed variant rather than a string tag so new statuses cannot
/// silently fall through to "normal" handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    /// Backing data is usable.
    #[default]
    Normal,
    /// Backing data is unusable; the client must not dereference it.
    Corrupt,
}

/// Progress within a single skill, as derived by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillProgress {
    /// Current skill level (>= 1 once any xp exists).
    pub level: u32,
    /// Experience accumulated within the current level.
    pub current_xp: f64,
    /// Experience required to reach the next level.
    pub xp_to_next_level: f64,
}

impl SkillProgress {
    /// Fraction of the current level completed, in `[0, 1]`.
    ///
    /// Defined as `0.0` when `xp_to_next_level` is zero (or when the
    /// inputs are not finite), so a progress bar never divides by zero.
    pub fn fraction(&self) -> f64 {
        if self.xp_to_next_level <= 0.0 {
            return 0.0;
        }
        let f = self.current_xp / self.xp_to_next_level;
        if f.is_finite() {
            f.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Per-profile game data. All maps default to empty so a partially
/// populated payload still parses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    /// Skill name -> progress.
    #[serde(default)]
    pub skills: BTreeMap<String, SkillProgress>,
    /// Item name -> quantity held.
    #[serde(default)]
    pub inventory: BTreeMap<String, u64>,
    /// Stat name -> value.
    #[serde(default)]
    pub stats: BTreeMap<String, i64>,
}

/// A single save profile as reported by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name. Uniqueness is owned by the backend, not checked here.
    pub name: String,
    /// Sum of all skill levels, derived by the backend.
    #[serde(default)]
    pub total_level: u32,
    /// Data health; absent on the wire means `Normal`.
    #[serde(default)]
    pub status: ProfileStatus,
    /// Game data. A corrupt profile may ship absent or malformed data;
    /// the lenient deserializer turns anything unusable into `None`
    /// rather than failing the whole snapshot.
    #[serde(default, deserialize_with = "lenient_profile_data")]
    pub data: Option<ProfileData>,
}

impl Profile {
    /// True when the profile is flagged corrupt.
    pub fn is_corrupt(&self) -> bool {
        self.status == ProfileStatus::Corrupt
    }
}

fn lenient_profile_data<'de, D>(deserializer: D) -> Result<Option<ProfileData>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    // Malformed data under a corrupt profile must not sink the snapshot.
    Ok(serde_json::from_value(value).ok())
}

/// The authoritative snapshot: the full profile list plus the selection.
///
/// Owned exclusively by the client's state store and replaced atomically;
/// there is no partial-update representation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// All save profiles, in backend order.
    pub profiles: Vec<Profile>,
    /// Index of the active profile within `profiles`.
    pub selected_profile_index: usize,
}

impl GameState {
    /// The currently selected profile, or `None` if the index dangles.
    pub fn selected(&self) -> Option<&Profile> {
        self.profiles.get(self.selected_profile_index)
    }

    /// A fresh single-profile state in the shape the backend seeds.
    pub fn seed() -> Self {
        GameState {
            profiles: vec![Profile {
                name: DEFAULT_PROFILE_NAME.to_string(),
                total_level: 0,
                status: ProfileStatus::Normal,
                data: Some(ProfileData {
                    skills: ALL_SKILLS
                        .iter()
                        .map(|s| {
                            (
                                s.to_string(),
                                SkillProgress {
                                    level: 1,
                                    current_xp: 0.0,
                                    xp_to_next_level: 100.0,
                                },
                            )
                        })
                        .collect(),
                    inventory: ALL_ITEMS.iter().map(|i| (i.to_string(), 0)).collect(),
                    stats: BTreeMap::new(),
                }),
            }],
            selected_profile_index: 0,
        }
    }
}

/// A transient reward attached to an action response. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GainEvent {
    /// Skill credited with experience, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    /// Experience amount for `skill`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp: Option<i64>,
    /// Item obtained, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    /// Quantity obtained for `item`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

impl GainEvent {
    /// The xp contribution, present only when strictly positive.
    pub fn positive_xp(&self) -> Option<(&str, u64)> {
        match (&self.skill, self.xp) {
            (Some(skill), Some(xp)) if xp > 0 => Some((skill.as_str(), xp as u64)),
            _ => None,
        }
    }

    /// The item contribution, present only when strictly positive.
    pub fn positive_item(&self) -> Option<(&str, u64)> {
        match (&self.item, self.quantity) {
            (Some(item), Some(qty)) if qty > 0 => Some((item.as_str(), qty as u64)),
            _ => None,
        }
    }

    /// True when the event carries at least one positive amount.
    pub fn has_positive_content(&self) -> bool {
        self.positive_xp().is_some() || self.positive_item().is_some()
    }
}

/// Violations of the snapshot invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// The profile list is empty; the last profile can never be removed.
    #[error("game state has no profiles")]
    NoProfiles,
    /// The selection points outside the profile list.
    #[error("selected profile index {index} out of range for {len} profiles")]
    DanglingIndex { index: usize, len: usize },
}

/// Validate the snapshot invariants: a non-empty profile list and an
/// in-range selected index.
pub fn validate_state(state: &GameState) -> Result<(), StateError> {
    if state.profiles.is_empty() {
        return Err(StateError::NoProfiles);
    }
    if state.selected_profile_index >= state.profiles.len() {
        return Err(StateError::DanglingIndex {
            index: state.selected_profile_index,
            len: state.profiles.len(),
        });
    }
    Ok(())
}
