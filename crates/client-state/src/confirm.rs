//! Confirmation gating for irreversible operations.
//!
//! A [`Challenge`] is a pure pre-condition: resolving it produces a
//! [`Decision`] and nothing else, so a declined or mismatched reply can
//! never have partially invoked the guarded operation.

/// What the user must do to authorize the operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Challenge {
    /// High-risk: the user must reproduce `phrase` exactly,
    /// case-sensitive, with no trimming.
    Typed {
        title: String,
        prompt: String,
        phrase: String,
    },
    /// Lower-risk but still irreversible: plain accept/decline.
    Simple { title: String, prompt: String },
}

/// The user's reply to a challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Accept,
    Decline,
}

/// Outcome of resolving a challenge against a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Cancelled,
}

impl Challenge {
    /// Gate for deleting the named profile. Phrase: `delete <name>`.
    pub fn delete_profile(name: &str) -> Self {
        let phrase = format!("delete {name}");
        Challenge::Typed {
            title: "Delete Profile".to_string(),
            prompt: format!(
                "This action cannot be undone. To confirm, please type \"{phrase}\" in the box below."
            ),
            phrase,
        }
    }

    /// Gate for resetting the named healthy profile. Phrase: `reset <name>`.
    pub fn reset_profile(name: &str) -> Self {
        let phrase = format!("reset {name}");
        Challenge::Typed {
            title: "Reset Profile".to_string(),
            prompt: format!(
                "This action cannot be undone. To confirm, please type \"{phrase}\" in the box below."
            ),
            phrase,
        }
    }

    /// Gate for wiping every profile. Phrase: `reset all game data`.
    pub fn hard_reset() -> Self {
        let phrase = "reset all game data".to_string();
        Challenge::Typed {
            title: "Reset All Game Data".to_string(),
            prompt: format!(
                "This is the most destructive action. It will delete all profiles and \
                 progress and cannot be undone. To confirm, please type \"{phrase}\" in \
                 the box below."
            ),
            phrase,
        }
    }

    /// Gate for repairing a corrupt profile: accept/decline only.
    pub fn fix_profile(name: &str) -> Self {
        Challenge::Simple {
            title: "Confirm Profile Fix".to_string(),
            prompt: format!(
                "This will reset the corrupt profile \"{name}\" to a new, empty state. \
                 Your other profiles will not be affected. Are you sure?"
            ),
        }
    }

    /// Resolve a reply. Typed challenges confirm only on exact phrase
    /// equality; simple challenges confirm only on an explicit accept.
    /// Everything else cancels.
    pub fn resolve(&self, reply: &Reply) -> Decision {
        match (self, reply) {
            (Challenge::Typed { phrase, .. }, Reply::Text(input)) if input == phrase => {
                Decision::Confirmed
            }
            (Challenge::Simple { .. }, Reply::Accept) => Decision::Confirmed,
            _ => Decision::Cancelled,
        }
    }

    /// True when the reply was a typed attempt that failed the phrase
    /// check, which warrants a cancellation notice (a plain decline is
    /// silent).
    pub fn is_mismatch(&self, reply: &Reply) -> bool {
        matches!(
            (self, reply),
            (Challenge::Typed { phrase, .. }, Reply::Text(input)) if input != phrase
        )
    }
}

/// Invoke `on_confirmed` iff the reply confirms the challenge.
///
/// The closure runs exactly once on confirmation and never otherwise;
/// the return value is `None` on cancellation.
pub fn guard<T, F>(challenge: &Challenge, reply: &Reply, on_confirmed: F) -> Option<T>
where
    F: FnOnce() -> T,
{
    match challenge.resolve(reply) {
        Decision::Confirmed => Some(on_confirmed()),
        Decision::Cancelled => None,
    }
}
