//! Pure time-window calculator for schedule slots.
//!
//! Given a slot's HH:MM range combined with a calendar date, derives the
//! instants the evaluator cares about. The decision point sits at 25%
//! into the slot rather than the end: a single mid-slot location sample
//! approximates sustained presence without waiting for the slot to
//! finish, and the warning window (10 minutes in, up to the 25% mark)
//! leaves the user time to arrive before being marked absent.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::schedule::ScheduleSlot;

/// Minutes into the slot after which the early warning may fire.
pub const EARLY_WARNING_MINUTES: i64 = 10;

/// Default evaluator tick cadence in seconds. The decision window is
/// exactly one tick wide so the decision lands on a single tick.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;

/// Presence radius around the slot location, in meters.
pub const PRESENCE_RADIUS_METERS: f64 = 100.0;

/// The instants derived for one slot on one date.
///
/// All values are naive local civil time; the runner supplies
/// `Local::now().naive_local()` so the math stays deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindows {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Earliest instant the away-from-class warning may fire.
    pub early_warning_at: NaiveDateTime,
    /// The quarter-duration mark where the presence decision is made.
    pub decision_start: NaiveDateTime,
    /// One tick past `decision_start`; bounds the decision window given
    /// tick granularity.
    pub decision_end: NaiveDateTime,
}

impl SlotWindows {
    pub fn for_slot(slot: &ScheduleSlot, date: NaiveDate, tick: Duration) -> Self {
        Self::with_early_warning(slot, date, tick, EARLY_WARNING_MINUTES)
    }

    pub fn with_early_warning(
        slot: &ScheduleSlot,
        date: NaiveDate,
        tick: Duration,
        early_warning_minutes: i64,
    ) -> Self {
        let start = date.and_time(slot.from_time);
        let end = date.and_time(slot.to_time);
        let decision_start = start + (end - start) / 4;
        Self {
            start,
            end,
            early_warning_at: start + Duration::minutes(early_warning_minutes),
            decision_start,
            decision_end: decision_start + tick,
        }
    }

    /// Whether `now` falls inside the slot, inclusive on both ends.
    pub fn slot_active(&self, now: NaiveDateTime) -> bool {
        self.start <= now && now <= self.end
    }

    /// Early-warning eligibility: `[early_warning_at, decision_start)`.
    pub fn early_warning_due(&self, now: NaiveDateTime) -> bool {
        self.early_warning_at <= now && now < self.decision_start
    }

    /// Decision eligibility: `[decision_start, decision_end)`.
    pub fn decision_due(&self, now: NaiveDateTime) -> bool {
        self.decision_start <= now && now < self.decision_end
    }
}
