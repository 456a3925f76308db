use std::process::ExitCode;

use clap::Parser;

use rsvp_seed::config::{get_app_config_path, Args, Config};
use rsvp_seed::dataset::Dataset;
use rsvp_seed::error::SeedError;
use rsvp_seed::logger::{error, init};
use rsvp_seed::seed::{SeedSummary, Seeder};
use rsvp_seed::timestamp::TimestampGenerator;
use rsvp_seed::db;

fn main() -> ExitCode {
    // Initialize file logging under the app config directory
    if let Ok(dir) = get_app_config_path() {
        let _ = init(dir.join("rsvp-seed.log"));
    }

    match run(Args::parse()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            println!("Error: {}", err);
            error!("fatal error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(args: Args) -> Result<SeedSummary, SeedError> {
    let config = Config::from_args(args)?;
    let dataset = match &config.dataset {
        Some(path) => Dataset::load(path)?,
        None => Dataset::builtin()?,
    };
    let host_email = config.host_email.as_deref().unwrap_or(&dataset.host_email);

    let mut store = db::open(&config.store).map_err(SeedError::Lookup)?;
    let timestamps = TimestampGenerator::new(chrono::Utc::now(), config.seed);
    let stdout = std::io::stdout();
    Seeder::new(&mut store, timestamps, stdout.lock()).run(&dataset, host_email)
}
