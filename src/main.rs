use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;

use sat_overhead::config::{Config, RunInputs};
use sat_overhead::overhead::OverheadEngine;
use sat_overhead::predict::{GeometryCache, Sgp4Retriever};

#[derive(Parser)]
#[command(name = "sat-overhead")]
#[command(about = "Satellite interference windows for radio telescope observations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a run file without computing anything
    Validate { config: String },
    /// Windows where satellites are above the horizon
    Horizon { config: String },
    /// Windows where satellites cross the antenna main beam
    MainBeam { config: String },
    /// Received power from satellites above the horizon
    Power {
        config: String,
        /// Also print power summed per second of the reservation
        #[arg(long)]
        per_second: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Horizon { config } => {
            build_engine(&config).and_then(|e| print_json(&e.get_satellites_above_horizon()?))
        }
        Commands::MainBeam { config } => build_engine(&config)
            .and_then(|e| print_json(&e.get_satellites_crossing_main_beam()?)),
        Commands::Power { config, per_second } => build_engine(&config).and_then(|e| {
            if per_second {
                let series = e.get_satellite_power_series()?;
                print_json(&PowerOutput {
                    windows: &series.windows,
                    per_second: Some(&series.per_second),
                })
            } else {
                let windows = e.get_satellite_power()?;
                print_json(&PowerOutput {
                    windows: &windows,
                    per_second: None,
                })
            }
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Serialize)]
struct PowerOutput<'a, W: Serialize> {
    windows: &'a [W],
    #[serde(skip_serializing_if = "Option::is_none")]
    per_second: Option<&'a [f64]>,
}

fn build_engine(path: &str) -> CliResult<OverheadEngine<Sgp4Retriever>> {
    let RunInputs {
        reservation,
        satellites,
        antenna_path,
        settings,
        gain,
    } = Config::from_file(path)?.into_inputs()?;

    let retriever = Sgp4Retriever::new(GeometryCache::new());
    let engine = OverheadEngine::new(reservation, satellites, antenna_path, settings, retriever)?;
    Ok(engine.with_gain_pattern(gain))
}

fn validate(path: &str) -> CliResult<()> {
    let engine = build_engine(path)?;
    let reservation = engine.reservation();
    println!(
        "Run is valid: {} satellites, {} from {} to {}",
        engine.satellites().len(),
        reservation.facility.name,
        reservation.time.begin(),
        reservation.time.end()
    );
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
