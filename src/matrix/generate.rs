//! Deterministic operand generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Matrix;

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 42;

/// Fills a `rows × cols` matrix with values in `0..=9` drawn from `rng`.
pub fn generate_matrix<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
    let data = (0..rows * cols).map(|_| rng.gen_range(0..=9)).collect();
    Matrix { rows, cols, data }
}

/// Generates A (`rows_a × cols_a`) then B (`cols_a × cols_b`) from one seeded
/// stream. Same seed and dimensions give identical operands.
pub fn generate_operands(rows_a: usize, cols_a: usize, cols_b: usize, seed: u64) -> (Matrix, Matrix) {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = generate_matrix(rows_a, cols_a, &mut rng);
    let b = generate_matrix(cols_a, cols_b, &mut rng);
    (a, b)
}
