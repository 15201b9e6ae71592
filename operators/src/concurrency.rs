//! The bounded worker pool the ambient stack runs CPU-bound raster math on:
//! a `rayon`-backed thread pool sized from configuration, reached
//! via `tokio::task::spawn_blocking` from the async HTTP handlers so neither
//! blocks the other. The pipeline itself (catalog window assembly, the
//! zonal histogram fan-out) is written against plain `rayon` parallel
//! iterators; wrapping a call in [`WorkerPool::install`] is what confines
//! those iterators to this pool instead of rayon's process-wide default one.

use crate::error::{self, Result};

pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Builds a pool with `num_threads` workers. `num_threads == 0` defers to
    /// rayon's own default sizing (the number of logical CPUs).
    pub fn new(num_threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("gt-raster-worker-{i}"))
            .build()
            .map_err(|source| error::Internal {
                reason: source.to_string(),
            }
            .build())?;
        Ok(Self { pool })
    }

    /// Runs `op` (and anything it fans out via `rayon` parallel iterators)
    /// confined to this pool's worker threads.
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_runs_on_the_pool() {
        let pool = WorkerPool::new(2).unwrap();
        let result = pool.install(|| 2 + 2);
        assert_eq!(result, 4);
    }
}
