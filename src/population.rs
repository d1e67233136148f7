// Generational genetic algorithm
//
// Each generation is evaluate -> select -> breed -> replace. Evaluation runs
// every agent's episode independently (rayon or a plain loop, same result);
// selection, breeding and mutation draw from the GA random stream only.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::Arc;

use crate::board::AppleSequence;
use crate::config::{Config, EvolutionConfig, MutationConfig, ParentPairing};
use crate::error::{EvolutionError, Result};
use crate::genome::Genome;
use crate::snake::Agent;
use crate::types::GenerationSummary;

/// Population of agents plus the GA state that evolves it
pub struct Population {
    settings: EvolutionConfig,
    mutation: MutationConfig,
    grid_size: i32,
    parallel: bool,
    apples: Arc<AppleSequence>,
    agents: Vec<Agent>,
    generation: usize,
    rng: StdRng,
}

impl Population {
    /// Creates generation 0. The GA stream is seeded from `runtime.ga_seed`
    /// when set, otherwise from the OS.
    pub fn new(config: &Config) -> Result<Self> {
        let rng = match config.runtime.ga_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }

    /// Creates generation 0 drawing genomes from the given GA stream
    pub fn with_rng(config: &Config, mut rng: StdRng) -> Result<Self> {
        config.validate()?;

        let apples = Arc::new(AppleSequence::generate(
            config.board.grid_size,
            config.board.apple_seed,
        ));
        let agents = (0..config.evolution.population_size)
            .map(|_| {
                let genome = Genome::random(&mut rng, config.mutation.init_range);
                Agent::new(genome, config.board.grid_size, apples.clone())
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Created population of {} agents on a {}x{} board",
            agents.len(),
            config.board.grid_size,
            config.board.grid_size
        );

        Ok(Population {
            settings: config.evolution.clone(),
            mutation: config.mutation.clone(),
            grid_size: config.board.grid_size,
            parallel: config.runtime.parallel,
            apples,
            agents,
            generation: 0,
            rng,
        })
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn apple_sequence(&self) -> &Arc<AppleSequence> {
        &self.apples
    }

    /// Plays every agent's episode to the end. Agents share no mutable state,
    /// so the parallel and sequential paths give identical populations.
    pub fn evaluate(&mut self) -> Result<()> {
        if self.parallel {
            self.agents.par_iter_mut().try_for_each(|agent| agent.play())
        } else {
            self.agents.iter_mut().try_for_each(|agent| agent.play())
        }
    }

    /// Agent indices by descending fitness; equal fitness keeps population order
    fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        order.sort_by(|&a, &b| {
            self.agents[b]
                .fitness()
                .total_cmp(&self.agents[a].fitness())
        });
        order
    }

    /// Top agents, reset to their initial state with genomes unchanged
    pub fn survivors(&self) -> Result<Vec<Agent>> {
        self.ranking()
            .into_iter()
            .take(self.settings.survivor_count())
            .map(|idx| {
                let mut survivor = self.agents[idx].clone();
                survivor.reset()?;
                Ok(survivor)
            })
            .collect()
    }

    /// Genomes of the breeding pool, computed independently of the survivors
    pub fn parents(&self) -> Vec<Genome> {
        self.ranking()
            .into_iter()
            .take(self.settings.parent_count())
            .map(|idx| self.agents[idx].genome().clone())
            .collect()
    }

    /// Breeds `count` children: pick parents, single-point crossover, mutate
    pub fn breed(&mut self, parents: &[Genome], count: usize) -> Result<Vec<Agent>> {
        if parents.is_empty() && count > 0 {
            return Err(EvolutionError::Configuration(format!(
                "cannot breed {} children from an empty parent pool",
                count
            )));
        }
        let mut children = Vec::with_capacity(count);
        for _ in 0..count {
            let first = self.rng.random_range(0..parents.len());
            let second = match self.settings.parent_pairing {
                ParentPairing::Independent => self.rng.random_range(0..parents.len()),
                ParentPairing::SameParent => first,
            };

            let mut genome = Genome::crossover(&parents[first], &parents[second], &mut self.rng);
            genome.mutate(
                &mut self.rng,
                self.settings.mutation_rate,
                self.mutation.std_dev,
            );
            children.push(Agent::new(genome, self.grid_size, self.apples.clone())?);
        }
        Ok(children)
    }

    /// Replaces the population with reset survivors followed by new children
    pub fn next_generation(&mut self) -> Result<()> {
        let survivors = self.survivors()?;
        let parents = self.parents();
        let n_children = self.settings.population_size - survivors.len();

        debug!(
            "Generation {}: {} survivors, {} parents, breeding {} children",
            self.generation,
            survivors.len(),
            parents.len(),
            n_children
        );

        let children = if n_children > 0 {
            self.breed(&parents, n_children)?
        } else {
            Vec::new()
        };

        let mut next = survivors;
        next.extend(children);
        self.agents = next;
        self.generation += 1;
        Ok(())
    }

    pub fn mean_fitness(&self) -> f64 {
        self.agents.iter().map(Agent::fitness).sum::<f64>() / self.agents.len() as f64
    }

    pub fn mean_score(&self) -> f64 {
        self.agents.iter().map(|a| a.score() as f64).sum::<f64>() / self.agents.len() as f64
    }

    pub fn best_fitness(&self) -> f64 {
        self.agents
            .iter()
            .map(Agent::fitness)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn best_score(&self) -> u32 {
        self.agents.iter().map(Agent::score).max().unwrap_or(0)
    }

    /// Highest-fitness agent; the first one in population order wins ties
    pub fn best_agent(&self) -> Option<&Agent> {
        let mut best: Option<&Agent> = None;
        for agent in &self.agents {
            match best {
                Some(current) if agent.fitness() <= current.fitness() => {}
                _ => best = Some(agent),
            }
        }
        best
    }

    /// Aggregates the current (evaluated) generation
    pub fn summary(&self) -> Option<GenerationSummary> {
        let best = self.best_agent()?;
        Some(GenerationSummary {
            generation: self.generation,
            population_size: self.agents.len(),
            mean_fitness: self.mean_fitness(),
            mean_score: self.mean_score(),
            best_fitness: self.best_fitness(),
            best_score: self.best_score(),
            best_agent: best.snapshot(),
        })
    }

    /// Runs `n_generations` generations, calling `on_generation` after each
    /// evaluation. The population is left holding the last evaluated generation.
    pub fn run<F>(
        &mut self,
        n_generations: usize,
        mut on_generation: F,
    ) -> Result<Vec<GenerationSummary>>
    where
        F: FnMut(&GenerationSummary),
    {
        let mut summaries = Vec::with_capacity(n_generations);
        for idx in 0..n_generations {
            self.evaluate()?;

            if let Some(summary) = self.summary() {
                info!(
                    "Generation {}: mean fitness {:.2}, mean score {:.2}, best fitness {:.2}, best score {}",
                    summary.generation,
                    summary.mean_fitness,
                    summary.mean_score,
                    summary.best_fitness,
                    summary.best_score
                );
                on_generation(&summary);
                summaries.push(summary);
            }

            if idx + 1 < n_generations {
                self.next_generation()?;
            }
        }
        Ok(summaries)
    }
}

/// Evolves a fresh population with default board, mutation and runtime
/// settings and returns one summary per generation
pub fn run_generations(
    population_size: usize,
    survival_fraction: f64,
    parent_fraction: f64,
    mutation_rate: f64,
    n_generations: usize,
) -> Result<Vec<GenerationSummary>> {
    let mut config = Config::default_hardcoded();
    config.evolution = EvolutionConfig {
        population_size,
        survival_fraction,
        parent_fraction,
        mutation_rate,
        n_generations,
        parent_pairing: ParentPairing::default(),
    };
    let mut population = Population::new(&config)?;
    population.run(n_generations, |_| {})
}
