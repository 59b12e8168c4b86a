//! Row-level work distribution for filter stages.
//!
//! Every filter writes its output one row at a time. A row is an independent
//! work item: it is written by exactly one closure invocation and the input
//! is a read-only view that never aliases the output. Both modes therefore
//! produce byte-identical results; [`Executor::Sequential`] exists as the
//! correctness and timing baseline.

use ndarray::{Array3, ArrayView2, ArrayView3, ArrayViewMut2, Axis};
use rayon::prelude::*;

use crate::error::{EnhanceError, EnhanceResult};

/// How the per-row work of a stage is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Rows of each stage are spread across worker threads.
    #[default]
    Parallel,
    /// No parallelism anywhere.
    Sequential,
}

/// Scheduler applied inside each filter stage.
///
/// Returning from [`Executor::for_each_row`] is the barrier between stages:
/// all rows are written before the next stage reads them.
#[derive(Debug)]
pub enum Executor {
    Sequential,
    /// Rows fan out over `pool`, or over rayon's global pool when `None`.
    Parallel { pool: Option<rayon::ThreadPool> },
}

impl Default for Executor {
    fn default() -> Self {
        Self::Parallel { pool: None }
    }
}

impl Executor {
    pub fn sequential() -> Self {
        Self::Sequential
    }

    /// Parallel executor, optionally pinned to a dedicated pool of `threads` workers.
    pub fn parallel(threads: Option<usize>) -> EnhanceResult<Self> {
        let pool = match threads {
            None => None,
            Some(n) => Some(build_thread_pool(n)?),
        };
        Ok(Self::Parallel { pool })
    }

    pub fn for_mode(mode: ExecutionMode, threads: Option<usize>) -> EnhanceResult<Self> {
        match mode {
            ExecutionMode::Sequential => Ok(Self::sequential()),
            ExecutionMode::Parallel => Self::parallel(threads),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        match self {
            Self::Sequential => ExecutionMode::Sequential,
            Self::Parallel { .. } => ExecutionMode::Parallel,
        }
    }

    /// Run `op(y, row)` for every row of `output`.
    ///
    /// # Arguments
    /// * `output` - Destination image (height, width, channels)
    /// * `op` - Writes row `y`; must depend only on read-only captured state
    pub fn for_each_row<F>(&self, output: &mut Array3<u8>, op: F)
    where
        F: Fn(usize, ArrayViewMut2<'_, u8>) + Sync + Send,
    {
        match self {
            Self::Sequential => {
                for (y, row) in output.axis_iter_mut(Axis(0)).enumerate() {
                    op(y, row);
                }
            }
            Self::Parallel { pool } => {
                let mut run = || {
                    output
                        .axis_iter_mut(Axis(0))
                        .into_par_iter()
                        .enumerate()
                        .for_each(|(y, row)| op(y, row));
                };
                match pool {
                    Some(pool) => pool.install(run),
                    None => run(),
                }
            }
        }
    }

    /// Fold every row of `input` into a per-worker accumulator, then merge.
    ///
    /// `merge` must be associative and commutative for the parallel result to
    /// match the sequential one (histogram counts are).
    pub fn fold_rows<T, I, F, M>(&self, input: ArrayView3<'_, u8>, identity: I, fold: F, merge: M) -> T
    where
        T: Send,
        I: Fn() -> T + Sync + Send,
        F: Fn(T, ArrayView2<'_, u8>) -> T + Sync + Send,
        M: Fn(T, T) -> T + Sync + Send,
    {
        match self {
            Self::Sequential => input.axis_iter(Axis(0)).fold(identity(), fold),
            Self::Parallel { pool } => {
                let run = || {
                    input
                        .axis_iter(Axis(0))
                        .into_par_iter()
                        .fold(&identity, &fold)
                        .reduce(&identity, &merge)
                };
                match pool {
                    Some(pool) => pool.install(run),
                    None => run(),
                }
            }
        }
    }
}

fn build_thread_pool(threads: usize) -> EnhanceResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(EnhanceError::invalid_parameter(
            "executor 'threads' must be >= 1 when set",
        ));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| EnhanceError::ThreadPool(format!("failed to build rayon thread pool: {e}")))
}
