//! Data-parallel execution settings.
//!
//! Every particle loop in the solver consults this to decide whether
//! to fan out across the rayon pool or stay on the calling thread.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PARALLEL_MIN_BATCH;

/// Parallel-for configuration shared by the collider and solver crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Whether particle loops may run on the rayon thread pool.
    pub enabled: bool,
    /// Minimum number of particles handed to one worker. Loops shorter
    /// than this run sequentially.
    pub min_batch_size: usize,
}

impl ParallelConfig {
    /// A configuration that always runs sequentially.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            min_batch_size: DEFAULT_PARALLEL_MIN_BATCH,
        }
    }

    /// Returns true if a loop over `len` items should run in parallel.
    #[inline]
    pub fn should_parallelize(&self, len: usize) -> bool {
        self.enabled && len >= self.min_batch_size.max(1)
    }

    /// Minimum work-item length passed to `with_min_len`.
    #[inline]
    pub fn min_len(&self) -> usize {
        self.min_batch_size.max(1)
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_batch_size: DEFAULT_PARALLEL_MIN_BATCH,
        }
    }
}
