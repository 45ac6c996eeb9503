//! Error type shared by the whole crate.

use std::io;

/// Everything that can stop a multiplication before or while it starts.
///
/// Affinity failures are not here: a worker that cannot be pinned just runs
/// unpinned. Integer overflow is not detected either.
#[derive(Debug, thiserror::Error)]
pub enum MatmulError {
    #[error("invalid dimensions: A({rows_a}x{cols_a}) x B({cols_a}x{cols_b}), all must be >= 1")]
    InvalidDimensions {
        rows_a: usize,
        cols_a: usize,
        cols_b: usize,
    },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("A has no rows to distribute")]
    EmptyRows,

    #[error("thread count must be >= 1")]
    InvalidThreadCount,

    #[error("monitor interval must be at least 1 ms")]
    InvalidInterval,

    #[error("failed to spawn thread `{name}`")]
    ThreadSpawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, MatmulError>;

/// Rejects any zero dimension before anything gets allocated.
pub fn check_dimensions(rows_a: usize, cols_a: usize, cols_b: usize) -> Result<()> {
    if rows_a == 0 || cols_a == 0 || cols_b == 0 {
        return Err(MatmulError::InvalidDimensions {
            rows_a,
            cols_a,
            cols_b,
        });
    }
    Ok(())
}
