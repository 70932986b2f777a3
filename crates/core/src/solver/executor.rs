//! Fixed-size worker pool for column tasks

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder, ThreadPoolBuildError};
use tracing::info;

/// Runs a batch of independent tasks on a bounded set of workers
///
/// With one worker (or zero) the tasks run on the calling thread in order.
/// Otherwise a dedicated rayon pool is built once and reused for every batch.
pub struct ParallelExecutor {
    pool: Option<ThreadPool>,
    worker_count: usize,
}

impl ParallelExecutor {
    /// # Errors
    ///
    /// Returns the rayon error if the worker threads cannot be spawned.
    pub fn new(worker_count: usize) -> Result<Self, ThreadPoolBuildError> {
        let worker_count = worker_count.max(1);
        if worker_count == 1 {
            return Ok(Self {
                pool: None,
                worker_count,
            });
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|i| format!("snowgrid-worker-{i}"))
            .build()?;
        info!("Built column worker pool with {} threads", worker_count);

        Ok(Self {
            pool: Some(pool),
            worker_count,
        })
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Apply `f` to every task and return the results in task order.
    pub fn run<T, R, F>(&self, tasks: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        match &self.pool {
            None => tasks.into_iter().map(f).collect(),
            Some(pool) => pool.install(|| tasks.into_par_iter().map(f).collect()),
        }
    }
}
