use clap::Subcommand;
use geoattend_core::Database;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the minimum attendance percentage
    Show,
    /// Set the minimum attendance percentage (0 disables warnings)
    SetMinimum {
        /// Percentage between 0 and 100
        percent: u8,
    },
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        ProfileAction::Show => {
            println!("minimum attendance: {}%", db.min_attendance_percent()?);
        }
        ProfileAction::SetMinimum { percent } => {
            db.set_min_attendance_percent(percent)?;
            println!("minimum attendance set to {percent}%");
        }
    }
    Ok(())
}
