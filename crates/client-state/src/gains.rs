//! Transient reward aggregation: a burst of gain events becomes one
//! coalesced summary that fades after genuine inactivity.
//!
//! Each positive event re-arms the expiry window from *now* rather than
//! from the first event, so a sustained burst of actions keeps the
//! summary visible continuously. Time is caller-supplied monotonic
//! milliseconds, which makes every arm/cancel/expiry path testable with
//! a simulated clock.

use game_model::GainEvent;
use std::collections::BTreeMap;
use tracing::debug;

/// Inactivity window after which the buffer auto-clears.
pub const COALESCE_WINDOW_MS: u64 = 3000;

/// A cancellable one-shot deadline. Arming replaces any previous
/// deadline, so two timers can never race to clear the same buffer.
#[derive(Debug, Default)]
pub struct CoalesceTimer {
    deadline_ms: Option<u64>,
}

impl CoalesceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the deadline `duration_ms` from `now_ms`.
    pub fn arm(&mut self, now_ms: u64, duration_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(duration_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// True once the armed deadline has passed. Never true while unarmed.
    pub fn expired(&self, now_ms: u64) -> bool {
        matches!(self.deadline_ms, Some(deadline) if now_ms >= deadline)
    }
}

/// Ordered positive totals for display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GainsSummary {
    /// Skill name -> accumulated xp.
    pub xp: Vec<(String, u64)>,
    /// Item name -> accumulated quantity.
    pub items: Vec<(String, u64)>,
}

/// Buffers reward events and exposes the decaying summary.
#[derive(Debug, Default)]
pub struct GainsTracker {
    xp: BTreeMap<String, u64>,
    items: BTreeMap<String, u64>,
    timer: CoalesceTimer,
}

impl GainsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one gain event at time `now_ms`.
    ///
    /// Only strictly positive amounts contribute; an event with nothing
    /// positive is dropped entirely and does not re-arm the expiry
    /// timer. Returns whether the event contributed.
    pub fn record(&mut self, event: &GainEvent, now_ms: u64) -> bool {
        let mut contributed = false;
        if let Some((skill, xp)) = event.positive_xp() {
            *self.xp.entry(skill.to_string()).or_insert(0) += xp;
            contributed = true;
        }
        if let Some((item, quantity)) = event.positive_item() {
            *self.items.entry(item.to_string()).or_insert(0) += quantity;
            contributed = true;
        }
        if contributed {
            self.timer.arm(now_ms, COALESCE_WINDOW_MS);
            debug!(now_ms, "gain recorded, window re-armed");
        }
        contributed
    }

    /// Drive expiry. Clears the buffer and returns `true` when the
    /// window elapsed with no intervening event.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if !self.timer.expired(now_ms) {
            return false;
        }
        self.timer.cancel();
        self.xp.clear();
        self.items.clear();
        debug!(now_ms, "gains window expired, buffer cleared");
        true
    }

    /// Immediate reset, used on profile switch.
    pub fn clear(&mut self) {
        self.timer.cancel();
        self.xp.clear();
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.xp.is_empty() && self.items.is_empty()
    }

    /// The coalesced totals, or `None` when there is nothing to show.
    pub fn summary(&self) -> Option<GainsSummary> {
        if self.is_empty() {
            return None;
        }
        Some(GainsSummary {
            xp: self.xp.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            items: self.items.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        })
    }
}
