// Configuration module for reading Evolution.toml
// This module provides the run parameters for the genetic algorithm, the board and the trainer

use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{EvolutionError, Result};

/// Smallest board that fits the fixed start layout (head plus two body cells to its left)
pub const MIN_GRID_SIZE: i32 = 4;

/// Number of cells on a `grid_size` board, `None` when the count does not fit an `i32`
pub fn cell_count(grid_size: i32) -> Option<i32> {
    grid_size.checked_mul(grid_size)
}

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub evolution: EvolutionConfig,
    pub board: BoardConfig,
    pub mutation: MutationConfig,
    pub runtime: RuntimeConfig,
    pub log: LogConfig,
}

/// Generational genetic algorithm parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub survival_fraction: f64,
    pub parent_fraction: f64,
    pub mutation_rate: f64,
    pub n_generations: usize,
    #[serde(default)]
    pub parent_pairing: ParentPairing,
}

impl EvolutionConfig {
    /// Number of agents carried over unchanged into the next generation
    pub fn survivor_count(&self) -> usize {
        (self.population_size as f64 * self.survival_fraction) as usize
    }

    /// Number of top agents eligible as parents
    pub fn parent_count(&self) -> usize {
        (self.population_size as f64 * self.parent_fraction) as usize
    }

    /// Number of children bred per generation
    pub fn children_count(&self) -> usize {
        self.population_size - self.survivor_count().min(self.population_size)
    }
}

/// How the two crossover parents of a child are drawn from the breeding pool
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParentPairing {
    /// Two uniform picks with replacement
    #[default]
    Independent,
    /// One uniform pick used for both slots; crossover then copies that parent
    SameParent,
}

/// Board geometry and the apple stream seed
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BoardConfig {
    pub grid_size: i32,
    pub apple_seed: u64,
}

/// Genome initialisation and mutation constants
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MutationConfig {
    pub std_dev: f32,
    pub init_range: f32,
}

/// Execution settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub parallel: bool,
    /// Fixed seed for the GA stream; unset draws from the OS
    #[serde(default)]
    pub ga_seed: Option<u64>,
}

/// Training log output
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Evolution.toml configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            EvolutionError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            EvolutionError::Configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Evolution.toml in the project root
    pub fn load_default() -> Result<Self> {
        Self::from_file("Evolution.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Evolution.toml
    pub fn default_hardcoded() -> Self {
        Config {
            evolution: EvolutionConfig {
                population_size: 1000,
                survival_fraction: 0.1,
                parent_fraction: 0.2,
                mutation_rate: 0.05,
                n_generations: 100,
                parent_pairing: ParentPairing::Independent,
            },
            board: BoardConfig {
                grid_size: 10,
                apple_seed: 2,
            },
            mutation: MutationConfig {
                std_dev: 0.5,
                init_range: 1.0,
            },
            runtime: RuntimeConfig {
                parallel: true,
                ga_seed: None,
            },
            log: LogConfig {
                enabled: true,
                log_file_path: "evolution_log.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            warn!("Could not load Evolution.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Rejects parameter combinations the genetic algorithm cannot run with
    pub fn validate(&self) -> Result<()> {
        validate_evolution(&self.evolution)?;
        validate_board(&self.board)?;

        if !self.mutation.std_dev.is_finite() || self.mutation.std_dev < 0.0 {
            return Err(EvolutionError::Configuration(format!(
                "mutation std_dev must be a non-negative number, got {}",
                self.mutation.std_dev
            )));
        }
        if !self.mutation.init_range.is_finite() || self.mutation.init_range <= 0.0 {
            return Err(EvolutionError::Configuration(format!(
                "mutation init_range must be positive, got {}",
                self.mutation.init_range
            )));
        }
        Ok(())
    }
}

/// Checks the GA parameters on their own
pub fn validate_evolution(evolution: &EvolutionConfig) -> Result<()> {
    if evolution.population_size == 0 {
        return Err(EvolutionError::Configuration(
            "population_size must be positive".to_string(),
        ));
    }

    for (name, value) in [
        ("survival_fraction", evolution.survival_fraction),
        ("parent_fraction", evolution.parent_fraction),
        ("mutation_rate", evolution.mutation_rate),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(EvolutionError::Configuration(format!(
                "{} must lie in [0, 1], got {}",
                name, value
            )));
        }
    }

    if evolution.children_count() > 0 && evolution.parent_count() == 0 {
        return Err(EvolutionError::Configuration(format!(
            "parent_fraction {} of population {} leaves no parents to breed {} children",
            evolution.parent_fraction,
            evolution.population_size,
            evolution.children_count()
        )));
    }
    Ok(())
}

/// Checks the board geometry on its own
pub fn validate_board(board: &BoardConfig) -> Result<()> {
    if board.grid_size < MIN_GRID_SIZE {
        return Err(EvolutionError::Configuration(format!(
            "grid_size must be at least {}, got {}",
            MIN_GRID_SIZE, board.grid_size
        )));
    }
    if cell_count(board.grid_size).is_none() {
        return Err(EvolutionError::Configuration(format!(
            "grid_size {} has more cells than an i32 can count",
            board.grid_size
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardcoded_defaults_are_valid() {
        let config = Config::default_hardcoded();
        assert!(config.validate().is_ok());
        assert_eq!(config.board.grid_size, 10);
        assert_eq!(config.mutation.std_dev, 0.5);
    }

    #[test]
    fn test_counts_truncate_toward_zero() {
        let mut evolution = Config::default_hardcoded().evolution;
        evolution.population_size = 15;
        evolution.survival_fraction = 0.1;
        evolution.parent_fraction = 0.25;
        assert_eq!(evolution.survivor_count(), 1);
        assert_eq!(evolution.parent_count(), 3);
        assert_eq!(evolution.children_count(), 14);
    }

    #[test]
    fn test_evolution_toml_can_be_parsed() {
        let result = Config::from_file("Evolution.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Evolution.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config =
            Config::from_file("Evolution.toml").expect("Evolution.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(file_config.evolution, hardcoded_config.evolution);
        assert_eq!(file_config.board, hardcoded_config.board);
        assert_eq!(file_config.mutation, hardcoded_config.mutation);
        assert_eq!(file_config.runtime, hardcoded_config.runtime);
        assert_eq!(file_config.log, hardcoded_config.log);
    }

    #[test]
    fn test_fraction_out_of_range_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.evolution.survival_fraction = 1.5;
        assert!(matches!(
            config.validate(),
            Err(EvolutionError::Configuration(_))
        ));

        let mut config = Config::default_hardcoded();
        config.evolution.mutation_rate = -0.1;
        assert!(matches!(
            config.validate(),
            Err(EvolutionError::Configuration(_))
        ));
    }

    #[test]
    fn test_zero_population_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.evolution.population_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_small_grid_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.board.grid_size = 3;
        assert!(config.validate().is_err());
        config.board.grid_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_grid_whose_cell_count_overflows_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.board.grid_size = 50_000;
        assert!(matches!(
            config.validate(),
            Err(EvolutionError::Configuration(_))
        ));

        // 46_340² is the largest square below i32::MAX
        config.board.grid_size = 46_340;
        assert!(config.validate().is_ok());
        config.board.grid_size = 46_341;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_breeding_pool_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.evolution.population_size = 10;
        config.evolution.parent_fraction = 0.05;
        assert!(config.validate().is_err());

        // Nothing to breed when every agent survives
        config.evolution.survival_fraction = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parent_pairing_parses_snake_case() {
        let parsed: EvolutionConfig = toml::from_str(
            "population_size = 4\nsurvival_fraction = 0.5\nparent_fraction = 0.5\n\
             mutation_rate = 0.1\nn_generations = 1\nparent_pairing = \"same_parent\"\n",
        )
        .unwrap();
        assert_eq!(parsed.parent_pairing, ParentPairing::SameParent);
    }

    #[test]
    fn test_missing_file_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
