//! Genetic Algorithm Tests
//!
//! Runs small populations end to end and checks the generation-level
//! contracts: sizes, survivor carry-over, crossover and parent pairing.

use rand::rngs::StdRng;
use rand::SeedableRng;

use snake_evolution::config::{Config, ParentPairing};
use snake_evolution::genome::{Genome, GENOME_LEN};
use snake_evolution::{run_generations, EvolutionError, Population};

fn small_config(population_size: usize, seed: u64) -> Config {
    let mut config = Config::default_hardcoded();
    config.evolution.population_size = population_size;
    config.evolution.survival_fraction = 0.2;
    config.evolution.parent_fraction = 0.4;
    config.evolution.mutation_rate = 0.05;
    config.runtime.ga_seed = Some(seed);
    config
}

#[test]
fn test_run_generations_keeps_population_size() {
    let summaries = run_generations(20, 0.1, 0.2, 0.05, 4).unwrap();
    assert_eq!(summaries.len(), 4);
    for (idx, summary) in summaries.iter().enumerate() {
        assert_eq!(summary.generation, idx);
        assert_eq!(summary.population_size, 20);
        assert!(summary.best_fitness >= summary.mean_fitness);
        assert!(summary.best_score as f64 >= summary.mean_score);
        assert!(!summary.best_agent.alive);
    }
}

#[test]
fn test_run_generations_rejects_empty_breeding_pool() {
    // 10 * 0.05 truncates to zero parents while nine children are needed
    let result = run_generations(10, 0.1, 0.05, 0.05, 1);
    assert!(matches!(result, Err(EvolutionError::Configuration(_))));
}

#[test]
fn test_zero_generations_produce_no_summaries() {
    let summaries = run_generations(10, 0.1, 0.2, 0.05, 0).unwrap();
    assert!(summaries.is_empty());
}

#[test]
fn test_survivors_carry_their_genomes_forward() {
    let config = small_config(10, 4);
    let mut population = Population::new(&config).unwrap();
    population.evaluate().unwrap();

    let survivors: Vec<Genome> = population
        .survivors()
        .unwrap()
        .iter()
        .map(|a| a.genome().clone())
        .collect();
    assert_eq!(survivors.len(), 2);

    population.next_generation().unwrap();
    assert_eq!(population.generation(), 1);
    assert_eq!(population.len(), 10);
    for (agent, genome) in population.agents().iter().zip(&survivors) {
        assert_eq!(agent.genome(), genome);
        assert!(agent.is_alive());
        assert_eq!(agent.episode().moves_played, 0);
    }
}

#[test]
fn test_seeded_runs_are_reproducible_sequential_or_parallel() {
    let mut sequential = small_config(12, 99);
    sequential.runtime.parallel = false;
    let mut parallel = sequential.clone();
    parallel.runtime.parallel = true;

    let a = Population::new(&sequential).unwrap().run(3, |_| {}).unwrap();
    let b = Population::new(&parallel).unwrap().run(3, |_| {}).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_crossover_of_identical_genomes_is_identity() {
    let mut rng = StdRng::seed_from_u64(5);
    let genome = Genome::random(&mut rng, 1.0);
    for _ in 0..20 {
        assert_eq!(Genome::crossover(&genome, &genome, &mut rng), genome);
    }
}

#[test]
fn test_same_parent_pairing_without_mutation_clones_parents() {
    let mut config = small_config(10, 17);
    config.evolution.mutation_rate = 0.0;
    config.evolution.parent_pairing = ParentPairing::SameParent;

    let mut population = Population::new(&config).unwrap();
    population.evaluate().unwrap();
    let parents = population.parents();
    assert_eq!(parents.len(), 4);

    let children = population.breed(&parents, 8).unwrap();
    assert_eq!(children.len(), 8);
    for child in &children {
        assert_eq!(child.genome().len(), GENOME_LEN);
        assert!(parents.contains(child.genome()));
    }
}

#[test]
fn test_callback_sees_every_generation() {
    let config = small_config(10, 3);
    let mut population = Population::new(&config).unwrap();

    let mut seen = Vec::new();
    let summaries = population
        .run(3, |summary| seen.push(summary.generation))
        .unwrap();
    assert_eq!(seen, vec![0, 1, 2]);
    assert_eq!(summaries.len(), 3);
    // The last evaluated generation is not advanced past
    assert_eq!(population.generation(), 2);
}
