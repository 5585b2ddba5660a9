#![deny(warnings)]

//! Client-side state controller for the idle-gather game.
//!
//! The backend owns all game logic and persistence; this crate owns the
//! client's view of it. Four pieces cooperate:
//! - [`store::StateStore`] — the single authoritative snapshot, replaced
//!   wholesale on every successful backend response.
//! - [`guard::CorruptionGuard`] — derives the interaction lock from the
//!   selected profile and drives forced navigation.
//! - [`gains::GainsTracker`] — coalesces reward events into one decaying
//!   on-screen summary.
//! - [`confirm`] — exact-phrase confirmation gating for irreversible
//!   operations.
//!
//! [`session::GameSession`] ties them together behind the wire contract
//! in [`api`]. The session is sans-io: callers perform the transport and
//! feed completions back in, so everything here is testable with plain
//! values and a simulated clock.

pub mod api;
pub mod confirm;
pub mod gains;
pub mod guard;
pub mod session;
pub mod store;

pub use api::{ApiError, ApiRequest, ErrorCategory, Method, SettingsPatch, StateResponse};
pub use confirm::{Challenge, Decision, Reply};
pub use gains::{GainsSummary, GainsTracker, COALESCE_WINDOW_MS};
pub use guard::{Control, CorruptionGuard, GuardOutcome, LockState, View};
pub use session::{GameSession, GateOutcome, Notice, NoticeKind, SessionError, SessionUpdate};
pub use store::{StateStore, StoreError};
