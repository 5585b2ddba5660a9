//! The session controller: one explicitly constructed context object
//! owning the store, guard, gains tracker, active view, and in-flight
//! request bookkeeping.
//!
//! The session is sans-io. `begin` registers an outgoing request and
//! hands back a ticket; the caller performs the transport and feeds the
//! outcome to `complete`, which applies the snapshot, re-derives the
//! lock, ingests gains, and reports the notices to present. Responses
//! apply in completion order; the ticket carries no ordering authority.
//!
//! Mutating requests are serialized: at most one may be in flight, and
//! a second is rejected instead of racing the first for the final
//! snapshot. This is a deliberate strengthening over the original
//! fire-and-forget behavior.

use crate::api::{ApiError, ApiRequest, StateResponse};
use crate::confirm::{Challenge, Decision, Reply};
use crate::gains::GainsTracker;
use crate::guard::{view_switch_allowed, CorruptionGuard, LockState, View};
use crate::store::{StateStore, StoreError};
use game_model::Profile;
use thiserror::Error;
use tracing::{info, warn};

/// Severity of a user-facing notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Info,
    Success,
}

/// A titled advisory for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

impl Notice {
    fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            title: title.into(),
            body: body.into(),
        }
    }

    fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Info,
            title: title.into(),
            body: body.into(),
        }
    }

    fn success(body: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Success,
            title: "Success".to_string(),
            body: body.into(),
        }
    }
}

/// Failures of the session protocol itself (never routed to the error
/// notice path; these are caller mistakes or expected refusals).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A second state-mutating request was started while one is in
    /// flight.
    #[error("a state-mutating request is already in flight")]
    MutationInFlight,
    /// The last remaining profile can never be deleted; rejected before
    /// the confirmation gate is even engaged.
    #[error("You cannot delete the last profile.")]
    LastProfile,
    /// The operation needs a loaded snapshot.
    #[error("no snapshot has been loaded yet")]
    NotLoaded,
    /// The ticket does not match any in-flight request.
    #[error("unknown request ticket")]
    UnknownTicket,
    /// Settings requests echo settings, not snapshots; they bypass the
    /// session.
    #[error("settings requests do not yield a game snapshot")]
    SettingsOutOfBand,
}

/// Handle for one in-flight request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket {
    id: u64,
}

#[derive(Debug)]
struct PendingRequest {
    id: u64,
    request: ApiRequest,
    /// Profile name captured at issue time for the success notice.
    subject: Option<String>,
}

/// A destructive operation wrapped in its confirmation challenge. The
/// request inside is dispatched only through [`GameSession::resolve_gate`]
/// and only on a confirmed reply.
#[derive(Debug)]
pub struct GatedRequest {
    pub challenge: Challenge,
    request: ApiRequest,
}

/// Outcome of resolving a gated request.
#[derive(Debug)]
pub enum GateOutcome {
    /// Confirmed; the request is now in flight.
    Dispatched(RequestTicket),
    /// Cancelled. Carries the cancellation notice for a typed mismatch;
    /// a plain decline stays silent.
    Cancelled(Option<Notice>),
}

/// What `complete` produced for the presentation layer.
#[derive(Debug)]
pub struct SessionUpdate {
    pub notices: Vec<Notice>,
    pub lock: LockState,
    pub active_view: View,
}

/// The client-side controller tying store, guard, gains, and gate
/// together.
#[derive(Debug, Default)]
pub struct GameSession {
    store: StateStore,
    guard: CorruptionGuard,
    gains: GainsTracker,
    lock: LockState,
    active_view: View,
    in_flight: Vec<PendingRequest>,
    next_ticket: u64,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an outgoing request and obtain its ticket.
    ///
    /// Mutating requests are serialized; reads (`FetchState`) pass
    /// freely. Settings traffic is out of band and refused here.
    pub fn begin(&mut self, request: ApiRequest) -> Result<RequestTicket, SessionError> {
        if !request.yields_state() {
            return Err(SessionError::SettingsOutOfBand);
        }
        if request.is_mutating() && self.in_flight.iter().any(|p| p.request.is_mutating()) {
            return Err(SessionError::MutationInFlight);
        }
        let subject = match &request {
            ApiRequest::DeleteProfile | ApiRequest::ResetProfile | ApiRequest::FixProfile { .. } => {
                self.store.current().ok().map(|p| p.name.clone())
            }
            _ => None,
        };
        let id = self.next_ticket;
        self.next_ticket += 1;
        info!(
            id,
            method = request.method().as_str(),
            path = request.path(),
            "request issued"
        );
        self.in_flight.push(PendingRequest {
            id,
            request,
            subject,
        });
        Ok(RequestTicket { id })
    }

    /// Gate for deleting the selected profile.
    ///
    /// Refuses outright for the last remaining profile: neither the
    /// gate nor the backend is engaged in that case.
    pub fn gate_delete_profile(&self) -> Result<GatedRequest, SessionError> {
        let state = self.store.state().ok_or(SessionError::NotLoaded)?;
        if state.profiles.len() <= 1 {
            return Err(SessionError::LastProfile);
        }
        let profile = state.selected().ok_or(SessionError::NotLoaded)?;
        Ok(GatedRequest {
            challenge: Challenge::delete_profile(&profile.name),
            request: ApiRequest::DeleteProfile,
        })
    }

    /// Gate for resetting the selected profile. For a corrupt profile
    /// this becomes the lower-risk accept/decline fix gate.
    pub fn gate_reset_profile(&self) -> Result<GatedRequest, SessionError> {
        let state = self.store.state().ok_or(SessionError::NotLoaded)?;
        let profile = state.selected().ok_or(SessionError::NotLoaded)?;
        if profile.is_corrupt() {
            Ok(GatedRequest {
                challenge: Challenge::fix_profile(&profile.name),
                request: ApiRequest::FixProfile {
                    index: state.selected_profile_index,
                },
            })
        } else {
            Ok(GatedRequest {
                challenge: Challenge::reset_profile(&profile.name),
                request: ApiRequest::ResetProfile,
            })
        }
    }

    /// Gate for wiping all game data.
    pub fn gate_hard_reset(&self) -> GatedRequest {
        GatedRequest {
            challenge: Challenge::hard_reset(),
            request: ApiRequest::HardReset,
        }
    }

    /// Resolve a gated request against the user's reply.
    ///
    /// Guarantees no side effects on decline or mismatch: the wrapped
    /// request is dispatched only on confirmation, and a mismatch only
    /// yields an informational cancellation notice.
    pub fn resolve_gate(
        &mut self,
        gated: GatedRequest,
        reply: &Reply,
    ) -> Result<GateOutcome, SessionError> {
        match gated.challenge.resolve(reply) {
            Decision::Confirmed => Ok(GateOutcome::Dispatched(self.begin(gated.request)?)),
            Decision::Cancelled => {
                let notice = gated.challenge.is_mismatch(reply).then(|| {
                    Notice::info("Action Cancelled", "The text you entered did not match.")
                });
                Ok(GateOutcome::Cancelled(notice))
            }
        }
    }

    /// Apply the outcome of a completed request.
    ///
    /// On success the snapshot replaces the store wholesale (an invalid
    /// snapshot is logged and the last good state kept), the guard is
    /// re-derived, and any reward event is ingested at `now_ms`. On
    /// error a titled notice is produced and the store is untouched.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: Result<StateResponse, ApiError>,
        now_ms: u64,
    ) -> Result<SessionUpdate, SessionError> {
        let pos = self
            .in_flight
            .iter()
            .position(|p| p.id == ticket.id)
            .ok_or(SessionError::UnknownTicket)?;
        let pending = self.in_flight.remove(pos);

        let mut notices = Vec::new();
        match result {
            Err(err) => {
                warn!(id = pending.id, error = %err, "request failed");
                notices.push(Notice::error(err.title(), err.to_string()));
            }
            Ok(response) => {
                let prev_selected = self.store.state().and_then(|s| {
                    s.selected().map(|p| (s.selected_profile_index, p.name.clone()))
                });
                match self.store.replace(response.state) {
                    Err(_) => {
                        // Defensive assertion failure: already logged by
                        // the store, last good snapshot kept, nothing to
                        // present.
                    }
                    Ok(()) => {
                        if matches!(
                            pending.request,
                            ApiRequest::SelectProfile { .. } | ApiRequest::NewProfile { .. }
                        ) {
                            self.active_view = View::Home;
                        }

                        if let Some(state) = self.store.state() {
                            let selected = state
                                .selected()
                                .map(|p| (state.selected_profile_index, p.name.clone()));
                            if prev_selected.is_some() && prev_selected != selected {
                                self.gains.clear();
                            }

                            let outcome = self.guard.evaluate(state);
                            self.lock = outcome.lock;
                            if let Some(view) = outcome.forced_view {
                                self.active_view = view;
                            }
                            if let Some(advisory) = outcome.advisory {
                                notices.push(Notice::info(advisory.title, advisory.body));
                            }
                        }

                        if let Some(gain) = &response.recent_gain {
                            self.gains.record(gain, now_ms);
                        }

                        if let Some(notice) = success_notice(&pending) {
                            notices.push(notice);
                        }
                    }
                }
            }
        }

        Ok(SessionUpdate {
            notices,
            lock: self.lock,
            active_view: self.active_view,
        })
    }

    /// Drive the gains expiry window. Returns `true` when the buffer
    /// just cleared.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.gains.poll(now_ms)
    }

    /// Attempt to switch the active view, honoring the lock. Returns
    /// whether the switch happened.
    pub fn switch_view(&mut self, target: View) -> bool {
        if view_switch_allowed(self.lock, self.active_view, target) {
            self.active_view = target;
            true
        } else {
            false
        }
    }

    pub fn lock(&self) -> LockState {
        self.lock
    }

    pub fn active_view(&self) -> View {
        self.active_view
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn gains(&self) -> &GainsTracker {
        &self.gains
    }

    /// The selected profile, failing loudly before the first load.
    pub fn current_profile(&self) -> Result<&Profile, StoreError> {
        self.store.current()
    }

    /// True while a state-mutating request awaits completion.
    pub fn has_mutation_in_flight(&self) -> bool {
        self.in_flight.iter().any(|p| p.request.is_mutating())
    }
}

fn success_notice(pending: &PendingRequest) -> Option<Notice> {
    let subject = pending.subject.as_deref().unwrap_or("profile");
    match pending.request {
        ApiRequest::DeleteProfile => Some(Notice::success(format!(
            "Profile \"{subject}\" has been deleted."
        ))),
        ApiRequest::ResetProfile => Some(Notice::success(format!(
            "Profile \"{subject}\" has been reset."
        ))),
        ApiRequest::FixProfile { .. } => Some(Notice::success(format!(
            "Profile \"{subject}\" has been fixed and reset."
        ))),
        ApiRequest::HardReset => Some(Notice::success("All game data has been reset.")),
        _ => None,
    }
}
