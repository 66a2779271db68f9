use chrono::NaiveTime;
use clap::Subcommand;
use geoattend_core::{Database, ScheduleSlot, SlotLocation, Weekday};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Add a class slot to the weekly schedule
    Add {
        /// Day of the week (Monday..Friday)
        day: String,
        /// Subject name
        subject: String,
        /// Start time (HH:MM)
        from: String,
        /// End time (HH:MM)
        to: String,
        /// Location name
        #[arg(long)]
        location: String,
        /// Location latitude in decimal degrees
        #[arg(long)]
        lat: f64,
        /// Location longitude in decimal degrees
        #[arg(long)]
        lng: f64,
        /// Google Maps place id
        #[arg(long, default_value = "")]
        place_id: String,
    },
    /// Remove a slot by id
    Remove {
        /// Slot id (from `schedule list`)
        id: String,
    },
    /// List all slots, optionally for a single day
    List {
        /// Day of the week (Monday..Friday)
        #[arg(long)]
        day: Option<String>,
    },
}

fn parse_day(s: &str) -> Result<Weekday, String> {
    Weekday::parse(s).ok_or_else(|| format!("invalid day: {s} (expected Monday..Friday)"))
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| format!("invalid time: {s} (expected HH:MM)"))
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        ScheduleAction::Add {
            day,
            subject,
            from,
            to,
            location,
            lat,
            lng,
            place_id,
        } => {
            let slot = ScheduleSlot::new(
                parse_day(&day)?,
                &subject,
                parse_time(&from)?,
                parse_time(&to)?,
                SlotLocation {
                    name: location,
                    lat,
                    lng,
                    place_id,
                },
            )?;
            db.add_slot(&slot)?;
            println!("added slot {}", slot.id);
        }
        ScheduleAction::Remove { id } => {
            if db.remove_slot(&id)? {
                println!("removed {id}");
            } else {
                eprintln!("no such slot: {id}");
                std::process::exit(1);
            }
        }
        ScheduleAction::List { day } => {
            let slots = match day {
                Some(day) => db.slots_for_day(parse_day(&day)?)?,
                None => db.slots()?,
            };
            for slot in slots {
                println!(
                    "{}  {:<9} {}-{}  {}  @ {}",
                    slot.id,
                    slot.day.as_str(),
                    slot.from_time.format("%H:%M"),
                    slot.to_time.format("%H:%M"),
                    slot.subject,
                    slot.location.name,
                );
                println!("    {}", slot.location.maps_url());
            }
        }
    }
    Ok(())
}
