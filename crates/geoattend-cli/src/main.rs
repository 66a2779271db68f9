use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "geoattend-cli", version, about = "Geoattend CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Attendance profile (minimum percentage)
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Subject management
    Subject {
        #[command(subcommand)]
        action: commands::subject::SubjectAction,
    },
    /// Weekly schedule management
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Attendance records and monthly summaries
    Attendance {
        #[command(subcommand)]
        action: commands::attendance::AttendanceAction,
    },
    /// Run the attendance tracking session in the foreground
    Watch(commands::watch::WatchArgs),
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Subject { action } => commands::subject::run(action),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Attendance { action } => commands::attendance::run(action),
        Commands::Watch(args) => commands::watch::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
