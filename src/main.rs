// Training entry point
//
// Usage:
//   cargo run --release -- [config_path]
//
// Loads Evolution.toml (or the given path), evolves the population and
// writes one JSON line per generation to the configured training log.

use log::{error, info};
use std::env;
use std::process;

use snake_evolution::config::Config;
use snake_evolution::trainer::Trainer;

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting Snake evolution...");

    let config = match env::args().nth(1) {
        Some(path) => match Config::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("Could not load {}: {}", path, e);
                process::exit(1);
            }
        },
        None => Config::load_or_default(),
    };

    let trainer = Trainer::new(config);
    if let Err(e) = trainer.run() {
        error!("Training failed: {}", e);
        process::exit(1);
    }
}
