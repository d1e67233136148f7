// Neural controller: stateless forward pass of the fixed 24-16-16-4
// perceptron whose parameters are views into a genome

use crate::error::Result;
use crate::genome::{Genome, HIDDEN_1_SIZE, HIDDEN_2_SIZE, INPUT_SIZE, OUTPUT_SIZE};
use crate::types::Direction;
use crate::vision::Observation;

/// Computes the four output activations for an observation.
/// Both hidden layers use ReLU; the output layer is linear.
pub fn forward(genome: &Genome, input: &Observation) -> [f32; OUTPUT_SIZE] {
    let blocks = genome.blocks();

    let mut hidden_1 = [0.0_f32; HIDDEN_1_SIZE];
    dense(blocks.w1, blocks.b1, input, &mut hidden_1);
    relu(&mut hidden_1);

    let mut hidden_2 = [0.0_f32; HIDDEN_2_SIZE];
    dense(blocks.w2, blocks.b2, &hidden_1, &mut hidden_2);
    relu(&mut hidden_2);

    let mut output = [0.0_f32; OUTPUT_SIZE];
    dense(blocks.w3, blocks.b3, &hidden_2, &mut output);
    output
}

/// Picks the direction of the largest output; the first maximum wins ties
pub fn decide(genome: &Genome, input: &Observation) -> Result<Direction> {
    let output = forward(genome, input);
    Direction::from_index(argmax(&output))
}

/// Index of the first maximum value
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (idx, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = idx;
        }
    }
    best
}

/// out[j] = sum_i weights[j * input.len() + i] * input[i] + bias[j]
fn dense(weights: &[f32], bias: &[f32], input: &[f32], out: &mut [f32]) {
    debug_assert_eq!(weights.len(), input.len() * out.len());
    for ((value, row), b) in out
        .iter_mut()
        .zip(weights.chunks_exact(input.len()))
        .zip(bias)
    {
        *value = row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + b;
    }
}

fn relu(values: &mut [f32]) {
    for v in values {
        *v = v.max(0.0);
    }
}
