use chrono::{Datelike, Local, NaiveDate};
use clap::Subcommand;
use geoattend_core::{aggregator, Config, Database, DayRecord, LogNotifier};

#[derive(Subcommand)]
pub enum AttendanceAction {
    /// Show the attendance records for a day
    Show {
        /// Date (YYYY-MM-DD), defaults to today
        date: Option<String>,
    },
    /// Flip a decision between Present and Absent
    ToggleStatus {
        /// Date (YYYY-MM-DD)
        date: String,
        /// Slot id
        slot_id: String,
    },
    /// Include or exclude a decision from the monthly percentages
    ToggleConsider {
        /// Date (YYYY-MM-DD)
        date: String,
        /// Slot id
        slot_id: String,
    },
    /// List every record in a month, day by day
    Month {
        /// Year, defaults to the current year
        #[arg(long)]
        year: Option<i32>,
        /// Month (1-12), defaults to the current month
        #[arg(long)]
        month: Option<u32>,
    },
    /// Monthly attendance summary
    Summary {
        /// Year, defaults to the current year
        #[arg(long)]
        year: Option<i32>,
        /// Month (1-12), defaults to the current month
        #[arg(long)]
        month: Option<u32>,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date: {s} (expected YYYY-MM-DD)"))
}

/// "  [modified, not considered]" suffix, empty when neither flag is set.
fn flag_suffix(r: &geoattend_core::AttendanceRecord) -> String {
    let flags = [
        r.is_modified.then_some("modified"),
        r.do_not_consider.then_some("not considered"),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");
    if flags.is_empty() {
        String::new()
    } else {
        format!("  [{flags}]")
    }
}

pub fn run(action: AttendanceAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        AttendanceAction::Show { date } => {
            let date = match date {
                Some(s) => parse_date(&s)?,
                None => Local::now().date_naive(),
            };
            let bucket = db.day_bucket_or_empty(date)?;
            if bucket.records.is_empty() {
                println!("no records for {date}");
                return Ok(());
            }
            for record in &bucket.records {
                match record {
                    DayRecord::Decision(r) => {
                        println!(
                            "{}  {}-{}  {}  {}{}",
                            r.slot_id,
                            r.from_time.format("%H:%M"),
                            r.to_time.format("%H:%M"),
                            r.subject,
                            r.status,
                            flag_suffix(r),
                        );
                    }
                    DayRecord::WarningMarker { slot_id, sent_at, .. } => {
                        println!("{slot_id}  early warning sent at {}", sent_at.time());
                    }
                }
            }
        }
        AttendanceAction::ToggleStatus { date, slot_id } => {
            let date = parse_date(&date)?;
            if !db.toggle_status(date, &slot_id)? {
                eprintln!("no decision for slot {slot_id} on {date}");
                std::process::exit(1);
            }
            println!("status toggled");
            refresh(&db)?;
        }
        AttendanceAction::ToggleConsider { date, slot_id } => {
            let date = parse_date(&date)?;
            if !db.toggle_do_not_consider(date, &slot_id)? {
                eprintln!("no decision for slot {slot_id} on {date}");
                std::process::exit(1);
            }
            println!("consideration toggled");
            refresh(&db)?;
        }
        AttendanceAction::Month { year, month } => {
            let today = Local::now().date_naive();
            let prefix = format!(
                "{:04}-{:02}",
                year.unwrap_or_else(|| today.year()),
                month.unwrap_or_else(|| today.month())
            );
            let buckets = db.buckets_with_prefix(&prefix)?;
            if buckets.is_empty() {
                println!("no records for {prefix}");
                return Ok(());
            }
            for bucket in buckets {
                for r in bucket.decisions() {
                    println!(
                        "{}  {}  {}-{}  {}  {}{}",
                        bucket.date,
                        r.slot_id,
                        r.from_time.format("%H:%M"),
                        r.to_time.format("%H:%M"),
                        r.subject,
                        r.status,
                        flag_suffix(r),
                    );
                }
            }
        }
        AttendanceAction::Summary { year, month } => {
            let today = Local::now().date_naive();
            let summary = aggregator::monthly_summary(
                &db,
                year.unwrap_or_else(|| today.year()),
                month.unwrap_or_else(|| today.month()),
            )?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

/// Recompute the current month and surface any threshold warnings.
fn refresh(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let notifier = LogNotifier::new(config.notifications.enabled);
    let (summary, _) = aggregator::refresh(db, &notifier, Local::now().date_naive())?;
    println!(
        "this month: modified {:.2}%, original {:.2}%",
        summary.modified_percent, summary.original_percent
    );
    Ok(())
}
