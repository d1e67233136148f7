// Library exports for the Snake neuroevolution core
// The trainer and replay binaries, as well as the integration tests, build on these modules

pub mod board;
pub mod brain;
pub mod config;
pub mod error;
pub mod genome;
pub mod population;
pub mod replay;
pub mod snake;
pub mod trainer;
pub mod training_log;
pub mod types;
pub mod vision;

pub use error::{EvolutionError, Result};
pub use population::{run_generations, Population};
pub use snake::Agent;
