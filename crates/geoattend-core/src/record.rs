//! Attendance records and day buckets.
//!
//! A day bucket is the ordered list of records written for one calendar
//! date. Two kinds of record exist: a transient warning marker written
//! when the early-warning notification fires, and the full decision
//! record written exactly once per slot per day. Decision records are
//! never deleted; after the write only the user-facing `status` and
//! `do_not_consider` fields may change.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Present/absent decision value, stored as `"Yes"`/`"No"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Yes,
    No,
}

impl AttendanceStatus {
    pub fn toggled(self) -> Self {
        match self {
            AttendanceStatus::Yes => AttendanceStatus::No,
            AttendanceStatus::No => AttendanceStatus::Yes,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Yes => "Yes",
            AttendanceStatus::No => "No",
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The once-per-slot-per-day presence decision.
///
/// `original_status` and the denormalized slot fields are write-once.
/// `status` starts equal to `original_status` and may be toggled by the
/// user; `is_modified` latches true on the first divergence and never
/// clears, even if the user toggles back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub slot_id: String,
    pub subject: String,
    pub from_time: NaiveTime,
    pub to_time: NaiveTime,
    pub location_name: String,
    /// Write time, assigned by the store side of the evaluator.
    pub recorded_at: DateTime<Utc>,
    pub original_status: AttendanceStatus,
    pub status: AttendanceStatus,
    pub is_modified: bool,
    pub do_not_consider: bool,
    /// True once the decision has been made for this slot on this day.
    pub midpoint_checked: bool,
    /// Forced true on every decision record, whether or not the early
    /// warning actually fired (the decision supersedes the warning).
    pub early_notification_sent: bool,
}

/// One entry in a day bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayRecord {
    /// Transient marker written when the early-warning notification
    /// fires, so it fires at most once per slot per day.
    WarningMarker {
        slot_id: String,
        early_notification_sent: bool,
        sent_at: NaiveDateTime,
    },
    /// The full attendance decision.
    Decision(AttendanceRecord),
}

impl DayRecord {
    pub fn slot_id(&self) -> &str {
        match self {
            DayRecord::WarningMarker { slot_id, .. } => slot_id,
            DayRecord::Decision(rec) => &rec.slot_id,
        }
    }

    pub fn as_decision(&self) -> Option<&AttendanceRecord> {
        match self {
            DayRecord::Decision(rec) => Some(rec),
            DayRecord::WarningMarker { .. } => None,
        }
    }
}

/// The records written for one calendar date. Created lazily on first
/// write for that day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub records: Vec<DayRecord>,
}

impl DayBucket {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            records: Vec::new(),
        }
    }

    /// Whether the decision has already been committed for this slot.
    pub fn decision_made(&self, slot_id: &str) -> bool {
        self.records.iter().any(|r| match r {
            DayRecord::Decision(rec) => rec.slot_id == slot_id && rec.midpoint_checked,
            _ => false,
        })
    }

    /// Whether the early warning has already fired for this slot
    /// (either as a marker or folded into a decision record).
    pub fn warning_sent(&self, slot_id: &str) -> bool {
        self.records.iter().any(|r| match r {
            DayRecord::WarningMarker {
                slot_id: id,
                early_notification_sent,
                ..
            } => id == slot_id && *early_notification_sent,
            DayRecord::Decision(rec) => rec.slot_id == slot_id && rec.early_notification_sent,
        })
    }

    /// Decision records, in write order.
    pub fn decisions(&self) -> impl Iterator<Item = &AttendanceRecord> {
        self.records.iter().filter_map(DayRecord::as_decision)
    }

    fn decision_mut(&mut self, slot_id: &str) -> Option<&mut AttendanceRecord> {
        self.records.iter_mut().find_map(|r| match r {
            DayRecord::Decision(rec) if rec.slot_id == slot_id => Some(rec),
            _ => None,
        })
    }

    /// Flip the user-facing status of the matching decision record.
    ///
    /// Sets `is_modified` permanently. Returns false (no-op) when no
    /// decision record exists for the slot.
    pub fn toggle_status(&mut self, slot_id: &str) -> bool {
        match self.decision_mut(slot_id) {
            Some(rec) => {
                rec.status = rec.status.toggled();
                rec.is_modified = true;
                true
            }
            None => false,
        }
    }

    /// Flip the exclusion flag of the matching decision record.
    ///
    /// Does not touch `is_modified`. Returns false (no-op) when no
    /// decision record exists for the slot.
    pub fn toggle_do_not_consider(&mut self, slot_id: &str) -> bool {
        match self.decision_mut(slot_id) {
            Some(rec) => {
                rec.do_not_consider = !rec.do_not_consider;
                true
            }
            None => false,
        }
    }
}
