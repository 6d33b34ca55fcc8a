//! This module contains configuration options. The configuration options impact
//! performance only; the output of the permutation never depends on them. The
//! default configuration is sane and should provide good performance for most
//! users.

use std::cell::RefCell;

thread_local! {
    static CONFIG: RefCell<Config> = RefCell::new(Config::new());
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct Config {
    pub batch_parallelization_cutoff: BatchParallelizationCutoff,
}

impl Config {
    fn new() -> Self {
        let batch_parallelization_cutoff = BatchParallelizationCutoff::new(None);

        Self {
            batch_parallelization_cutoff,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct BatchParallelizationCutoff(usize);

impl BatchParallelizationCutoff {
    const DEFAULT: usize = 64;
    const MINIMUM: usize = 2;

    /// Creates a new `BatchParallelizationCutoff` with the given value. Uses the
    /// default if no value is provided.
    fn new(config_value: Option<usize>) -> Self {
        let cutoff = config_value.unwrap_or(Self::DEFAULT).max(Self::MINIMUM);

        Self(cutoff)
    }
}

/// Sets the cutoff for parallelizing batch permutations on the current thread.
///
/// For example, if the cutoff is set to 64, then a batch of fewer than 64
/// states is permuted sequentially. Batches of 64 or more states are spread
/// across rayon's thread pool.
///
/// The default is 64. The minimum is always 2.
pub fn set_batch_parallelization_cutoff(cutoff: usize) {
    let cutoff = BatchParallelizationCutoff::new(Some(cutoff));
    CONFIG.with(|c| c.borrow_mut().batch_parallelization_cutoff = cutoff);
}

pub(crate) fn batch_parallelization_cutoff() -> usize {
    CONFIG.with(|c| c.borrow().batch_parallelization_cutoff).0
}
