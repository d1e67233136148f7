// Flat genome encoding the network parameters, plus the genetic operators
// that act on it

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EvolutionError, Result};

pub const INPUT_SIZE: usize = 24;
pub const HIDDEN_1_SIZE: usize = 16;
pub const HIDDEN_2_SIZE: usize = 16;
pub const OUTPUT_SIZE: usize = 4;

const W1_LEN: usize = INPUT_SIZE * HIDDEN_1_SIZE;
const B1_LEN: usize = HIDDEN_1_SIZE;
const W2_LEN: usize = HIDDEN_1_SIZE * HIDDEN_2_SIZE;
const B2_LEN: usize = HIDDEN_2_SIZE;
const W3_LEN: usize = HIDDEN_2_SIZE * OUTPUT_SIZE;
const B3_LEN: usize = OUTPUT_SIZE;

/// Total number of genes: every weight and bias of the network
pub const GENOME_LEN: usize = W1_LEN + B1_LEN + W2_LEN + B2_LEN + W3_LEN + B3_LEN;

/// Borrowed views of the six parameter blocks, in genome order.
///
/// Weight blocks are row-major with one row per neuron of the receiving
/// layer, i.e. `w1[j * INPUT_SIZE + i]` connects input `i` to hidden neuron `j`.
#[derive(Debug, Clone, Copy)]
pub struct ParameterBlocks<'a> {
    pub w1: &'a [f32],
    pub b1: &'a [f32],
    pub w2: &'a [f32],
    pub b2: &'a [f32],
    pub w3: &'a [f32],
    pub b3: &'a [f32],
}

impl ParameterBlocks<'_> {
    /// Blocks in genome order
    pub fn as_array(&self) -> [&[f32]; 6] {
        [self.w1, self.b1, self.w2, self.b2, self.w3, self.b3]
    }

    /// Concatenates the blocks back into a flat gene vector
    pub fn concat(&self) -> Vec<f32> {
        self.as_array().concat()
    }
}

/// Ordered, fixed-length gene vector. Never modified by the network or the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Genome {
    genes: Vec<f32>,
}

impl Genome {
    /// Uniform genes in [-range, range]
    pub fn random<R: Rng + ?Sized>(rng: &mut R, range: f32) -> Self {
        let genes = (0..GENOME_LEN)
            .map(|_| rng.random_range(-range..=range))
            .collect();
        Genome { genes }
    }

    /// Wraps raw genes, checking the length against the layout
    pub fn from_genes(genes: Vec<f32>) -> Result<Self> {
        if genes.len() != GENOME_LEN {
            return Err(EvolutionError::GenomeLength {
                expected: GENOME_LEN,
                actual: genes.len(),
            });
        }
        Ok(Genome { genes })
    }

    pub fn genes(&self) -> &[f32] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Slices the genome into its six parameter blocks
    pub fn blocks(&self) -> ParameterBlocks<'_> {
        let (w1, rest) = self.genes.split_at(W1_LEN);
        let (b1, rest) = rest.split_at(B1_LEN);
        let (w2, rest) = rest.split_at(W2_LEN);
        let (b2, rest) = rest.split_at(B2_LEN);
        let (w3, b3) = rest.split_at(W3_LEN);
        ParameterBlocks { w1, b1, w2, b2, w3, b3 }
    }

    /// Single-point crossover: genes of `a` before `cut`, genes of `b` from `cut` on
    pub fn crossover_at(a: &Genome, b: &Genome, cut: usize) -> Genome {
        let cut = cut.min(a.genes.len());
        let mut genes = Vec::with_capacity(a.genes.len());
        genes.extend_from_slice(&a.genes[..cut]);
        genes.extend_from_slice(&b.genes[cut..]);
        Genome { genes }
    }

    /// Single-point crossover at a uniformly random cut
    pub fn crossover<R: Rng + ?Sized>(a: &Genome, b: &Genome, rng: &mut R) -> Genome {
        let cut = rng.random_range(0..a.genes.len());
        Self::crossover_at(a, b, cut)
    }

    /// Each gene independently, with probability `rate`, receives a
    /// zero-mean Gaussian perturbation of standard deviation `std_dev`.
    /// Returns the number of mutated genes.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R, rate: f64, std_dev: f32) -> usize {
        let mut mutated = 0;
        for gene in &mut self.genes {
            if rng.random::<f64>() < rate {
                *gene += gaussian(rng) * std_dev;
                mutated += 1;
            }
        }
        mutated
    }
}

impl TryFrom<Vec<f32>> for Genome {
    type Error = EvolutionError;

    fn try_from(genes: Vec<f32>) -> Result<Self> {
        Genome::from_genes(genes)
    }
}

impl From<Genome> for Vec<f32> {
    fn from(genome: Genome) -> Self {
        genome.genes
    }
}

/// Standard normal draw via Box-Muller
fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    const TWO_PI: f32 = std::f32::consts::TAU;
    let u1 = rng.random::<f32>().clamp(f32::MIN_POSITIVE, 1.0);
    let u2 = rng.random::<f32>();
    (-2.0 * u1.ln()).sqrt() * (TWO_PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_genome_length_matches_topology() {
        assert_eq!(GENOME_LEN, 24 * 16 + 16 + 16 * 16 + 16 + 16 * 4 + 4);
        let mut rng = StdRng::seed_from_u64(1);
        let genome = Genome::random(&mut rng, 1.0);
        assert_eq!(genome.len(), GENOME_LEN);
        assert!(genome.genes().iter().all(|g| (-1.0..=1.0).contains(g)));
    }

    #[test]
    fn test_blocks_partition_the_genome() {
        let genes: Vec<f32> = (0..GENOME_LEN).map(|i| i as f32).collect();
        let genome = Genome::from_genes(genes.clone()).unwrap();
        let blocks = genome.blocks();

        let lens: Vec<usize> = blocks.as_array().iter().map(|b| b.len()).collect();
        assert_eq!(lens, vec![384, 16, 256, 16, 64, 4]);
        assert_eq!(blocks.w1[0], 0.0);
        assert_eq!(blocks.b1[0], 384.0);
        assert_eq!(blocks.w2[0], 400.0);
        assert_eq!(blocks.b2[0], 656.0);
        assert_eq!(blocks.w3[0], 672.0);
        assert_eq!(blocks.b3[3], (GENOME_LEN - 1) as f32);
        assert_eq!(blocks.concat(), genes);
    }

    #[test]
    fn test_blocks_round_trip_bit_for_bit() {
        let mut rng = StdRng::seed_from_u64(77);
        for _ in 0..5 {
            let genome = Genome::random(&mut rng, 1.0);
            let rebuilt = genome.blocks().concat();
            assert!(genome
                .genes()
                .iter()
                .zip(&rebuilt)
                .all(|(a, b)| a.to_bits() == b.to_bits()));
        }
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        assert_eq!(
            Genome::from_genes(vec![0.0; 10]),
            Err(EvolutionError::GenomeLength {
                expected: GENOME_LEN,
                actual: 10
            })
        );
    }

    #[test]
    fn test_crossover_of_identical_parents_is_identity() {
        let mut rng = StdRng::seed_from_u64(3);
        let parent = Genome::random(&mut rng, 1.0);
        for cut in [0, 1, 100, GENOME_LEN - 1, GENOME_LEN] {
            assert_eq!(Genome::crossover_at(&parent, &parent, cut), parent);
        }
        assert_eq!(Genome::crossover(&parent, &parent, &mut rng), parent);
    }

    #[test]
    fn test_crossover_splits_at_cut() {
        let a = Genome::from_genes(vec![1.0; GENOME_LEN]).unwrap();
        let b = Genome::from_genes(vec![2.0; GENOME_LEN]).unwrap();
        let child = Genome::crossover_at(&a, &b, 10);
        assert!(child.genes()[..10].iter().all(|g| *g == 1.0));
        assert!(child.genes()[10..].iter().all(|g| *g == 2.0));
        assert_eq!(child.len(), GENOME_LEN);
    }

    #[test]
    fn test_mutation_rate_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        let original = Genome::random(&mut rng, 1.0);

        let mut untouched = original.clone();
        assert_eq!(untouched.mutate(&mut rng, 0.0, 0.5), 0);
        assert_eq!(untouched, original);

        let mut all = original.clone();
        assert_eq!(all.mutate(&mut rng, 1.0, 0.5), GENOME_LEN);
        assert_ne!(all, original);
    }

    #[test]
    fn test_gaussian_has_roughly_zero_mean_and_unit_spread() {
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 20_000;
        let samples: Vec<f32> = (0..n).map(|_| gaussian(&mut rng)).collect();
        let mean = samples.iter().sum::<f32>() / n as f32;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / n as f32;
        assert!(mean.abs() < 0.05, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.1, "variance {}", var);
    }

    #[test]
    fn test_serde_rejects_short_genome() {
        let err = serde_json::from_str::<Genome>("[0.5, 0.25]");
        assert!(err.is_err());
    }
}
