//! The attendance inference state machine.
//!
//! Runs once per scheduler tick. For every slot scheduled on today's
//! weekday it walks `Idle -> EarlyWarningPending -> EarlyWarningSent ->
//! DecisionPending -> Decided`, where the state is carried entirely by
//! the persisted record flags (`early_notification_sent`,
//! `midpoint_checked`), re-read fresh each tick. That makes every
//! transition idempotent across ticks without in-memory locks:
//!
//! - Early warning: fires once per slot per day, only while the user is
//!   away, only in the warning window. A failed location fetch is
//!   retried on the next tick with nothing written.
//! - Decision: committed exactly once per slot per day, at the
//!   quarter-duration mark. A failed location fetch still commits, with
//!   the fail-safe absence default, so the slot is never retried.
//!
//! A failure evaluating one slot never aborts evaluation of the others.

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};

use crate::aggregator;
use crate::clock::{self, SlotWindows};
use crate::error::{CoreError, GeoError};
use crate::events::Event;
use crate::geo::{distance_meters, GeoProvider};
use crate::notify::Notifier;
use crate::record::{AttendanceRecord, AttendanceStatus, DayRecord};
use crate::schedule::{ScheduleSlot, Weekday};
use crate::storage::{Database, TrackerConfig};

/// Everything a single tick produced, for logging and the CLI.
#[derive(Debug, Default)]
pub struct TickReport {
    pub slots_considered: usize,
    pub events: Vec<Event>,
    /// (slot id, error) pairs for slots whose evaluation failed.
    pub slot_errors: Vec<(String, String)>,
}

/// Per-tick attendance evaluator.
///
/// Stateless between ticks: the caller owns the cadence and supplies
/// `now` (local civil time), which keeps every window decision
/// deterministic under test.
pub struct AttendanceEvaluator {
    tick: Duration,
    radius_meters: f64,
    early_warning_minutes: i64,
}

impl AttendanceEvaluator {
    pub fn new() -> Self {
        Self {
            tick: Duration::seconds(clock::DEFAULT_CHECK_INTERVAL_SECS as i64),
            radius_meters: clock::PRESENCE_RADIUS_METERS,
            early_warning_minutes: clock::EARLY_WARNING_MINUTES,
        }
    }

    pub fn from_config(cfg: &TrackerConfig) -> Self {
        Self {
            tick: Duration::seconds(cfg.check_interval_secs.max(1) as i64),
            radius_meters: cfg.presence_radius_meters,
            early_warning_minutes: cfg.early_warning_minutes,
        }
    }

    /// Evaluate every slot scheduled for `now`'s weekday.
    ///
    /// # Errors
    /// Returns an error only when the schedule itself cannot be read;
    /// per-slot failures are collected in the report instead.
    pub fn evaluate_tick(
        &self,
        now: NaiveDateTime,
        db: &Database,
        geo: &dyn GeoProvider,
        notifier: &dyn Notifier,
    ) -> Result<TickReport, CoreError> {
        let mut report = TickReport::default();

        let Some(day) = Weekday::from_date(now.date()) else {
            return Ok(report); // Weekend: nothing scheduled.
        };

        for slot in db.slots_for_day(day)? {
            report.slots_considered += 1;
            if let Err(e) = self.evaluate_slot(now, &slot, db, geo, notifier, &mut report.events)
            {
                log::warn!("slot {} ({}) evaluation failed: {e}", slot.id, slot.subject);
                report.slot_errors.push((slot.id.clone(), e.to_string()));
            }
        }

        Ok(report)
    }

    fn evaluate_slot(
        &self,
        now: NaiveDateTime,
        slot: &ScheduleSlot,
        db: &Database,
        geo: &dyn GeoProvider,
        notifier: &dyn Notifier,
        events: &mut Vec<Event>,
    ) -> Result<(), CoreError> {
        let date = now.date();
        let windows =
            SlotWindows::with_early_warning(slot, date, self.tick, self.early_warning_minutes);

        if !windows.slot_active(now) {
            return Ok(());
        }

        // Fresh read: the persisted flags are the idempotency guard.
        let bucket = db.day_bucket_or_empty(date)?;
        if bucket.decision_made(&slot.id) {
            return Ok(()); // Decided is terminal for the day.
        }

        if windows.early_warning_due(now) && !bucket.warning_sent(&slot.id) {
            self.try_early_warning(now, slot, db, geo, notifier, events)?;
        }

        if windows.decision_due(now) {
            self.commit_decision(now, date, slot, db, geo, notifier, events)?;
        }

        Ok(())
    }

    /// Warn the user if they are away from the slot location. A failed
    /// fix writes nothing so the next tick retries.
    fn try_early_warning(
        &self,
        now: NaiveDateTime,
        slot: &ScheduleSlot,
        db: &Database,
        geo: &dyn GeoProvider,
        notifier: &dyn Notifier,
        events: &mut Vec<Event>,
    ) -> Result<(), CoreError> {
        let fix = match geo.current_fix() {
            Ok(fix) => fix,
            Err(e) => {
                log::warn!(
                    "could not get location for early warning ({}): {e}",
                    slot.subject
                );
                return Ok(());
            }
        };

        let distance = distance_meters(fix, slot.location.coordinates());
        if !(distance > self.radius_meters) {
            // Present (or NaN): nothing to warn about this tick.
            return Ok(());
        }

        notifier.notify(
            "Attendance Reminder!",
            &format!(
                "You are not at {} for {} class ({}-{}).",
                slot.location.name,
                slot.subject,
                slot.from_time.format("%H:%M"),
                slot.to_time.format("%H:%M"),
            ),
        );

        let mut bucket = db.day_bucket_or_empty(now.date())?;
        bucket.records.push(DayRecord::WarningMarker {
            slot_id: slot.id.clone(),
            early_notification_sent: true,
            sent_at: now,
        });
        db.put_day_bucket(&bucket)?;

        events.push(Event::EarlyWarningSent {
            slot_id: slot.id.clone(),
            subject: slot.subject.clone(),
            distance_meters: distance,
            at: now,
        });
        Ok(())
    }

    /// Commit the once-per-day presence decision, falling back to the
    /// absence default when no fix is available.
    #[allow(clippy::too_many_arguments)]
    fn commit_decision(
        &self,
        now: NaiveDateTime,
        date: NaiveDate,
        slot: &ScheduleSlot,
        db: &Database,
        geo: &dyn GeoProvider,
        notifier: &dyn Notifier,
        events: &mut Vec<Event>,
    ) -> Result<(), CoreError> {
        let (status, distance, failure) = match geo.current_fix() {
            Ok(fix) => {
                let d = distance_meters(fix, slot.location.coordinates());
                let status = if d <= self.radius_meters {
                    AttendanceStatus::Yes
                } else {
                    AttendanceStatus::No
                };
                (status, Some(d), None::<GeoError>)
            }
            // Fail-safe default: unknown location counts as absence,
            // and the slot is still marked checked so it is not retried.
            Err(e) => (AttendanceStatus::No, None, Some(e)),
        };

        let record = AttendanceRecord {
            slot_id: slot.id.clone(),
            subject: slot.subject.clone(),
            from_time: slot.from_time,
            to_time: slot.to_time,
            location_name: slot.location.name.clone(),
            recorded_at: Utc::now(),
            original_status: status,
            status,
            is_modified: false,
            do_not_consider: false,
            midpoint_checked: true,
            // Forced true whether or not the warning actually fired:
            // the committed decision supersedes the warning need.
            early_notification_sent: true,
        };

        let mut bucket = db.day_bucket_or_empty(date)?;
        bucket.records.push(DayRecord::Decision(record));
        db.put_day_bucket(&bucket)?;

        match failure {
            None => {
                log::info!(
                    "attendance for {} marked {} ({:.0}m from {})",
                    slot.subject,
                    status,
                    distance.unwrap_or(f64::NAN),
                    slot.location.name
                );
                events.push(Event::AttendanceDecided {
                    slot_id: slot.id.clone(),
                    subject: slot.subject.clone(),
                    status,
                    distance_meters: distance,
                    at: now,
                });
            }
            Some(e) => {
                log::warn!(
                    "location unavailable during decision window for {}: {e}",
                    slot.subject
                );
                notifier.notify(
                    "Attendance Check Failed",
                    &format!(
                        "Could not get your location for {}. Attendance marked 'No'. \
                         Please ensure location permissions are enabled.",
                        slot.subject
                    ),
                );
                events.push(Event::DecisionFellBack {
                    slot_id: slot.id.clone(),
                    subject: slot.subject.clone(),
                    reason: e.to_string(),
                    at: now,
                });
            }
        }

        // The decision changed this month's ratios; recompute and let
        // the aggregator raise threshold warnings.
        let (_, threshold_events) = aggregator::refresh(db, notifier, date)?;
        events.extend(threshold_events);
        Ok(())
    }
}

impl Default for AttendanceEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
