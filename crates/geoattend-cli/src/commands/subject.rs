use clap::Subcommand;
use geoattend_core::Database;

#[derive(Subcommand)]
pub enum SubjectAction {
    /// Add a subject
    Add {
        /// Subject name
        name: String,
    },
    /// Remove a subject
    Remove {
        /// Subject name
        name: String,
    },
    /// List all subjects
    List,
}

pub fn run(action: SubjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        SubjectAction::Add { name } => {
            if db.add_subject(&name)? {
                println!("added {name}");
            } else {
                println!("{name} already exists");
            }
        }
        SubjectAction::Remove { name } => {
            if db.remove_subject(&name)? {
                println!("removed {name}");
            } else {
                eprintln!("no such subject: {name}");
                std::process::exit(1);
            }
        }
        SubjectAction::List => {
            for subject in db.subjects()? {
                println!("{subject}");
            }
        }
    }
    Ok(())
}
