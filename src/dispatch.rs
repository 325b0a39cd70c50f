use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Runs a per-record function over a page, sequentially or on a fixed rayon pool.
///
/// Results always come back one per input, in input order.
pub enum Dispatcher {
    Sequential,
    Pool { pool: ThreadPool, chunk_size: usize },
}

impl Dispatcher {
    /// `workers <= 1` stays on the calling thread.
    pub fn new(workers: usize, chunk_size: usize) -> Result<Self, ThreadPoolBuildError> {
        if workers <= 1 {
            return Ok(Dispatcher::Sequential);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("parse-worker-{}", i))
            .build()?;
        Ok(Dispatcher::Pool {
            pool,
            chunk_size: chunk_size.max(1),
        })
    }

    pub fn workers(&self) -> usize {
        match self {
            Dispatcher::Sequential => 1,
            Dispatcher::Pool { pool, .. } => pool.current_num_threads(),
        }
    }

    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match self {
            Dispatcher::Sequential => items.iter().map(f).collect(),
            Dispatcher::Pool { pool, chunk_size } => pool.install(|| {
                items
                    .par_chunks(*chunk_size)
                    .flat_map_iter(|chunk| chunk.iter().map(&f))
                    .collect()
            }),
        }
    }
}

// ── Tests ──
