/* 3rd party libraries */
use clap::Parser;
use crossbeam_channel as cbc;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::thread::Builder;
use std::time::Duration;

/* Custom libraries */
use elevator_dispatch::config::{self, Config};
use elevator_dispatch::generator::{RandomRequestSource, RequestGenerator};
use elevator_dispatch::observer::{JsonObserver, LogObserver, Observer};
use elevator_dispatch::unwrap_or_exit;
use elevator_dispatch::Dispatcher;

const DEFAULT_CONFIG: &str = "config.toml";

/// Simulated elevator fleet fed by random floor requests.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Override the number of cars
    #[clap(short, long)]
    elevators: Option<u8>,

    /// Stop after this many seconds instead of running forever
    #[clap(long)]
    run_for: Option<u64>,

    /// Seed for the request generator
    #[clap(long)]
    seed: Option<u64>,

    /// Log events as JSON objects
    #[clap(long)]
    json: bool,
}

fn load(args: &Args) -> Config {
    // Only the implicit default file may be absent
    let mut config = if args.config == DEFAULT_CONFIG && !Path::new(DEFAULT_CONFIG).exists() {
        warn!("No {} found, using default settings", DEFAULT_CONFIG);
        Config::default()
    } else {
        unwrap_or_exit!(config::load_config(&args.config), "Loading configuration")
    };

    if let Some(n_elevators) = args.elevators {
        config.elevator.n_elevators = n_elevators;
    }
    if args.seed.is_some() {
        config.generator.seed = args.seed;
    }
    unwrap_or_exit!(config.validate(), "Loading configuration");
    config
}

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load(&args);

    let observer: Arc<dyn Observer> = if args.json {
        Arc::new(JsonObserver)
    } else {
        Arc::new(LogObserver)
    };

    // Start the fleet
    let mut dispatcher = unwrap_or_exit!(Dispatcher::start(&config, observer), "Starting fleet");

    // Start the request generator
    let (generator_terminate_tx, generator_terminate_rx) = cbc::bounded::<()>(1);
    let generator = RequestGenerator::new(
        &config.generator,
        RandomRequestSource::new(&config.building, config.generator.seed),
        dispatcher.submitter(),
        generator_terminate_rx,
    );
    let generator_thread = unwrap_or_exit!(
        Builder::new()
            .name("request_generator".into())
            .spawn(move || generator.run()),
        "Starting request generator"
    );

    match args.run_for {
        Some(seconds) => std::thread::sleep(Duration::from_secs(seconds)),
        None => loop {
            std::thread::sleep(Duration::from_secs(1));
        },
    }

    let _ = generator_terminate_tx.send(());
    let generated = generator_thread.join().unwrap_or(0);
    dispatcher.shutdown();

    let served: u64 = dispatcher
        .fleet_status()
        .iter()
        .map(|car| car.completed)
        .sum();
    info!(
        "Generated {} requests, served {}, {} still queued",
        generated,
        served,
        dispatcher.pending()
    );
}
