//! Monthly attendance aggregation and threshold notifications.
//!
//! Two independent ratios are tracked over every considered decision
//! record in a month: the user-editable `status` ("modified") and the
//! system-computed `original_status` ("original"). Warning markers carry
//! no status and never enter either ratio. Threshold warnings fire on
//! every refresh that finds a ratio below the minimum -- repetition is
//! accepted, there is no debounce.

use chrono::{Datelike, NaiveDate};

use crate::error::DatabaseError;
use crate::events::{AttendanceMetric, Event};
use crate::notify::Notifier;
use crate::record::AttendanceStatus;
use crate::storage::Database;

/// The two attendance ratios for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    /// Decision records with `do_not_consider = false`.
    pub considered: usize,
    pub attended_modified: usize,
    pub attended_original: usize,
    /// 100 * attended_modified / considered, rounded to 2 decimals;
    /// 0 when nothing was considered.
    pub modified_percent: f64,
    pub original_percent: f64,
}

impl MonthlySummary {
    fn percent(&self, metric: AttendanceMetric) -> f64 {
        match metric {
            AttendanceMetric::Modified => self.modified_percent,
            AttendanceMetric::Original => self.original_percent,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Compute both attendance ratios for the given month.
pub fn monthly_summary(
    db: &Database,
    year: i32,
    month: u32,
) -> Result<MonthlySummary, DatabaseError> {
    let prefix = format!("{year:04}-{month:02}");
    let mut considered = 0usize;
    let mut attended_modified = 0usize;
    let mut attended_original = 0usize;

    for bucket in db.buckets_with_prefix(&prefix)? {
        for rec in bucket.decisions() {
            if rec.do_not_consider {
                continue;
            }
            considered += 1;
            if rec.status == AttendanceStatus::Yes {
                attended_modified += 1;
            }
            if rec.original_status == AttendanceStatus::Yes {
                attended_original += 1;
            }
        }
    }

    let ratio = |attended: usize| {
        if considered == 0 {
            0.0
        } else {
            round2(100.0 * attended as f64 / considered as f64)
        }
    };

    Ok(MonthlySummary {
        year,
        month,
        considered,
        attended_modified,
        attended_original,
        modified_percent: ratio(attended_modified),
        original_percent: ratio(attended_original),
    })
}

/// Recompute the current month and fire one warning per metric that sits
/// below the configured minimum. Called after every decision write and
/// every manual toggle.
pub fn refresh(
    db: &Database,
    notifier: &dyn Notifier,
    today: NaiveDate,
) -> Result<(MonthlySummary, Vec<Event>), DatabaseError> {
    let summary = monthly_summary(db, today.year(), today.month())?;
    let minimum = db.min_attendance_percent()?;

    let mut events = Vec::new();
    if minimum > 0 {
        for metric in [AttendanceMetric::Modified, AttendanceMetric::Original] {
            let percent = summary.percent(metric);
            if percent < f64::from(minimum) {
                notifier.notify(
                    &format!("Attendance Warning ({})!", metric.as_str()),
                    &format!(
                        "Your {} attendance is {percent:.2}%, which is below your minimum required {minimum}%.",
                        metric.as_str().to_lowercase()
                    ),
                );
                events.push(Event::ThresholdBreached {
                    metric,
                    percent,
                    minimum,
                });
            }
        }
    }

    Ok((summary, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;
    use crate::record::{AttendanceRecord, DayBucket, DayRecord};
    use chrono::{NaiveTime, Utc};

    fn decision(
        slot_id: &str,
        status: AttendanceStatus,
        original: AttendanceStatus,
        do_not_consider: bool,
    ) -> DayRecord {
        DayRecord::Decision(AttendanceRecord {
            slot_id: slot_id.to_string(),
            subject: "Physics".into(),
            from_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            to_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            location_name: "Lab 3".into(),
            recorded_at: Utc::now(),
            original_status: original,
            status,
            is_modified: status != original,
            do_not_consider,
            midpoint_checked: true,
            early_notification_sent: true,
        })
    }

    fn marker(slot_id: &str) -> DayRecord {
        DayRecord::WarningMarker {
            slot_id: slot_id.to_string(),
            early_notification_sent: true,
            sent_at: NaiveDate::from_ymd_opt(2026, 8, 24)
                .unwrap()
                .and_hms_opt(9, 12, 0)
                .unwrap(),
        }
    }

    fn db_with(date: NaiveDate, records: Vec<DayRecord>) -> Database {
        let db = Database::open_memory().unwrap();
        db.put_day_bucket(&DayBucket { date, records }).unwrap();
        db
    }

    fn aug(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
    }

    #[test]
    fn excluded_records_leave_both_ratios() {
        let db = db_with(
            aug(24),
            vec![
                decision("s1", AttendanceStatus::Yes, AttendanceStatus::Yes, false),
                decision("s2", AttendanceStatus::No, AttendanceStatus::No, false),
                decision("s3", AttendanceStatus::Yes, AttendanceStatus::Yes, true),
            ],
        );
        let summary = monthly_summary(&db, 2026, 8).unwrap();
        assert_eq!(summary.considered, 2);
        assert_eq!(summary.modified_percent, 50.00);
        assert_eq!(summary.original_percent, 50.00);
    }

    #[test]
    fn modified_and_original_diverge_after_a_toggle() {
        // System said No, user flipped to Yes.
        let db = db_with(
            aug(24),
            vec![
                decision("s1", AttendanceStatus::Yes, AttendanceStatus::No, false),
                decision("s2", AttendanceStatus::Yes, AttendanceStatus::Yes, false),
            ],
        );
        let summary = monthly_summary(&db, 2026, 8).unwrap();
        assert_eq!(summary.modified_percent, 100.00);
        assert_eq!(summary.original_percent, 50.00);
    }

    #[test]
    fn empty_month_reports_zero() {
        let db = Database::open_memory().unwrap();
        let summary = monthly_summary(&db, 2026, 8).unwrap();
        assert_eq!(summary.considered, 0);
        assert_eq!(summary.modified_percent, 0.0);
        assert_eq!(summary.original_percent, 0.0);
    }

    #[test]
    fn warning_markers_do_not_enter_the_denominator() {
        let db = db_with(
            aug(24),
            vec![
                marker("s1"),
                decision("s1", AttendanceStatus::Yes, AttendanceStatus::Yes, false),
            ],
        );
        let summary = monthly_summary(&db, 2026, 8).unwrap();
        assert_eq!(summary.considered, 1);
        assert_eq!(summary.modified_percent, 100.00);
    }

    #[test]
    fn ratios_round_to_two_decimals() {
        // 1 of 3 considered => 33.333...% -> 33.33.
        let db = db_with(
            aug(24),
            vec![
                decision("s1", AttendanceStatus::Yes, AttendanceStatus::Yes, false),
                decision("s2", AttendanceStatus::No, AttendanceStatus::No, false),
                decision("s3", AttendanceStatus::No, AttendanceStatus::No, false),
            ],
        );
        let summary = monthly_summary(&db, 2026, 8).unwrap();
        assert_eq!(summary.modified_percent, 33.33);
    }

    #[test]
    fn other_months_are_not_scanned() {
        let db = db_with(
            NaiveDate::from_ymd_opt(2026, 7, 30).unwrap(),
            vec![decision("s1", AttendanceStatus::No, AttendanceStatus::No, false)],
        );
        let summary = monthly_summary(&db, 2026, 8).unwrap();
        assert_eq!(summary.considered, 0);
    }

    #[test]
    fn refresh_fires_one_warning_per_breached_metric_per_call() {
        // 60% < default 75%: both metrics breach.
        let mut records = Vec::new();
        for i in 0..5 {
            let status = if i < 3 {
                AttendanceStatus::Yes
            } else {
                AttendanceStatus::No
            };
            records.push(decision(&format!("s{i}"), status, status, false));
        }
        let db = db_with(aug(24), records);
        let notifier = MemoryNotifier::new();

        let (summary, events) = refresh(&db, &notifier, aug(24)).unwrap();
        assert_eq!(summary.modified_percent, 60.00);
        assert_eq!(events.len(), 2);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "Attendance Warning (Modified)!");
        assert_eq!(sent[1].0, "Attendance Warning (Original)!");
        assert!(sent[0].1.contains("60.00%"));

        // No dedup across calls: a second refresh fires again.
        refresh(&db, &notifier, aug(24)).unwrap();
        assert_eq!(notifier.count(), 4);
    }

    #[test]
    fn refresh_breaches_only_the_metric_below_minimum() {
        // Original 50%, user toggled one absence away: modified 100%.
        let db = db_with(
            aug(24),
            vec![
                decision("s1", AttendanceStatus::Yes, AttendanceStatus::No, false),
                decision("s2", AttendanceStatus::Yes, AttendanceStatus::Yes, false),
            ],
        );
        let notifier = MemoryNotifier::new();
        let (_, events) = refresh(&db, &notifier, aug(24)).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::ThresholdBreached {
                metric: AttendanceMetric::Original,
                ..
            }
        ));
    }

    #[test]
    fn zero_minimum_disables_warnings() {
        let db = db_with(
            aug(24),
            vec![decision("s1", AttendanceStatus::No, AttendanceStatus::No, false)],
        );
        db.set_min_attendance_percent(0).unwrap();
        let notifier = MemoryNotifier::new();
        let (_, events) = refresh(&db, &notifier, aug(24)).unwrap();
        assert!(events.is_empty());
        assert_eq!(notifier.count(), 0);
    }
}
