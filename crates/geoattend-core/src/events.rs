use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::record::AttendanceStatus;

/// Which of the two tracked ratios a threshold breach refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceMetric {
    /// Ratio over the user-editable `status` values.
    Modified,
    /// Ratio over the system-computed `original_status` values.
    Original,
}

impl AttendanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceMetric::Modified => "Modified",
            AttendanceMetric::Original => "Original",
        }
    }
}

/// Every externally visible outcome of a tick or aggregation produces
/// an Event. The CLI prints them; tests assert on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The away-from-class early warning fired for a slot.
    EarlyWarningSent {
        slot_id: String,
        subject: String,
        distance_meters: f64,
        at: NaiveDateTime,
    },
    /// The presence decision was committed for a slot.
    AttendanceDecided {
        slot_id: String,
        subject: String,
        status: AttendanceStatus,
        /// Distance to the slot location; absent when the decision fell
        /// back to the fail-safe default.
        distance_meters: Option<f64>,
        at: NaiveDateTime,
    },
    /// The decision fell back to 'No' because no location fix was
    /// available inside the decision window.
    DecisionFellBack {
        slot_id: String,
        subject: String,
        reason: String,
        at: NaiveDateTime,
    },
    /// A monthly ratio dropped below the configured minimum.
    ThresholdBreached {
        metric: AttendanceMetric,
        percent: f64,
        minimum: u8,
    },
}
