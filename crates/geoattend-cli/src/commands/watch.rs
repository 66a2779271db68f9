use clap::Args;
use geoattend_core::{
    AttendanceEvaluator, AttendanceScheduler, Config, Coordinates, Database, FixedGeoProvider,
    GeoProvider, HttpGeoProvider, LogNotifier, SessionContext,
};

#[derive(Args)]
pub struct WatchArgs {
    /// Report a fixed latitude instead of polling the location bridge
    #[arg(long, requires = "lng")]
    pub lat: Option<f64>,
    /// Report a fixed longitude instead of polling the location bridge
    #[arg(long, requires = "lat")]
    pub lng: Option<f64>,
    /// Override the configured tick interval
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    if let Some(secs) = args.interval_secs {
        config.tracker.check_interval_secs = secs;
    }

    let geo: Box<dyn GeoProvider> = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Box::new(FixedGeoProvider::new(Coordinates::new(lat, lng))),
        _ => {
            if config.location.bridge_url.is_empty() {
                return Err(
                    "no location bridge configured; set location.bridge_url or pass --lat/--lng"
                        .into(),
                );
            }
            Box::new(HttpGeoProvider::new(
                &config.location.bridge_url,
                config.location.timeout_secs,
                config.location.max_fix_age_secs,
            )?)
        }
    };

    let ctx = SessionContext {
        db: Database::open()?,
        geo,
        notifier: Box::new(LogNotifier::new(config.notifications.enabled)),
        evaluator: AttendanceEvaluator::from_config(&config.tracker),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let handle = AttendanceScheduler::from_config(&config.tracker).spawn(ctx);
        println!(
            "tracking attendance every {}s, press Ctrl-C to stop",
            config.tracker.check_interval_secs.max(1)
        );

        tokio::signal::ctrl_c().await?;
        println!("stopping after {} tick(s)", handle.ticks());
        handle.stop().await;
        Ok::<(), std::io::Error>(())
    })?;

    Ok(())
}
