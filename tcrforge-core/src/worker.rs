//! Bounded worker pool for per-candidate work.
//!
//! Filtering and scoring treat each candidate independently, so both fan out
//! over a rayon pool. Results are keyed by the candidate's input index and
//! put back in that order before anyone sees them, which keeps output
//! identical to a sequential run.

use rayon::prelude::*;

use crate::types::TcrForgeError;

/// A rayon pool of fixed size, or the global pool when no size is given.
#[derive(Debug)]
pub struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Builds a pool with `num_threads` workers, or defers to rayon's global
    /// pool for `None`.
    ///
    /// # Errors
    ///
    /// [`TcrForgeError::ThreadPool`] if rayon cannot spawn the workers.
    pub fn new(num_threads: Option<usize>) -> Result<Self, TcrForgeError> {
        let pool = match num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("tcrforge-worker-{i}"))
                    .build()
                    .map_err(|e| {
                        TcrForgeError::ThreadPool(format!("Failed to configure thread pool: {e}"))
                    })?,
            ),
            None => None,
        };
        Ok(Self { pool })
    }

    /// A pool backed by rayon's global thread pool.
    #[must_use]
    pub const fn global() -> Self {
        Self { pool: None }
    }

    /// Number of workers that will run tasks.
    #[must_use]
    pub fn num_threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, rayon::ThreadPool::current_num_threads)
    }

    /// Applies `f` to every item in parallel and returns results in input
    /// order.
    pub fn map_indexed<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync + Send,
    {
        let run = || {
            let mut keyed: Vec<(usize, R)> = items
                .par_iter()
                .enumerate()
                .map(|(index, item)| (index, f(index, item)))
                .collect();
            keyed.sort_unstable_by_key(|(index, _)| *index);
            keyed.into_iter().map(|(_, result)| result).collect()
        };

        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::global()
    }
}
