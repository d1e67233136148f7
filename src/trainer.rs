// Training driver: wires a configuration, a population and the training log
// together for one evolution session

use log::info;

use crate::config::Config;
use crate::error::Result;
use crate::population::Population;
use crate::training_log::TrainingLog;
use crate::types::GenerationSummary;

/// Runs one training session described by a static configuration
pub struct Trainer {
    config: Config,
    log: TrainingLog,
}

impl Trainer {
    /// Creates a trainer, opening the training log if the config enables it
    pub fn new(config: Config) -> Self {
        let log = TrainingLog::new(config.log.enabled, &config.log.log_file_path);
        Trainer { config, log }
    }

    /// Creates a trainer that writes to the given log
    pub fn with_log(config: Config, log: TrainingLog) -> Self {
        Trainer { config, log }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Evolves `evolution.n_generations` generations and returns their summaries
    pub fn run(&self) -> Result<Vec<GenerationSummary>> {
        let evolution = &self.config.evolution;
        info!(
            "Training {} generations: population {}, survival {:.2}, parents {:.2}, mutation {:.3}, pairing {:?}",
            evolution.n_generations,
            evolution.population_size,
            evolution.survival_fraction,
            evolution.parent_fraction,
            evolution.mutation_rate,
            evolution.parent_pairing
        );

        let mut population = Population::new(&self.config)?;
        let summaries = population.run(evolution.n_generations, |summary| {
            self.log.log_generation(summary);
        })?;

        if let Some(best) = summaries
            .iter()
            .max_by(|a, b| a.best_fitness.total_cmp(&b.best_fitness))
        {
            info!(
                "Training complete. Best agent: generation {}, score {}, fitness {:.2}",
                best.generation, best.best_score, best.best_fitness
            );
        }

        Ok(summaries)
    }
}
