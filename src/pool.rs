use std::{
    num::NonZeroUsize,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};

use crate::{ConversionSummary, error::ConvertError, job::ConversionJob};

/// Requested degree of parallelism.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ThreadCount {
    /// One worker per logical CPU.
    #[default]
    All,
    /// At most this many workers, never more than there are logical CPUs.
    AtMost(NonZeroUsize),
}

impl ThreadCount {
    /// Interprets a `--threads` value: `-1` means all CPUs, positive values are
    /// an upper bound, anything else is rejected.
    pub fn from_requested(requested: i64) -> Result<Self, ConvertError> {
        match requested {
            -1 => Ok(ThreadCount::All),
            n if n > 0 => {
                let n = usize::try_from(n).unwrap_or(usize::MAX);
                NonZeroUsize::new(n)
                    .map(ThreadCount::AtMost)
                    .ok_or(ConvertError::InvalidThreadCount { requested })
            }
            _ => Err(ConvertError::InvalidThreadCount { requested }),
        }
    }

    /// Number of workers given `available` logical CPUs.
    pub fn resolve(self, available: usize) -> usize {
        let available = available.max(1);
        match self {
            ThreadCount::All => available,
            ThreadCount::AtMost(n) => n.get().min(available),
        }
    }
}

/// Final state of one job in a batch.
#[derive(Debug)]
pub struct JobOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<ConversionSummary, ConvertError>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fixed-size set of worker threads that execute conversion jobs.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Starts the workers. No job is accepted before they are all running.
    pub fn new(threads: ThreadCount) -> Result<Self, ConvertError> {
        let workers = threads.resolve(num_cpus::get());
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("vcfconv-worker-{i}"))
            .build()?;
        tracing::debug!(workers, "started worker pool");
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Executes every job exactly once and blocks until all have finished.
    ///
    /// A failing job does not stop the others; outcomes are returned in the
    /// order the jobs were given.
    pub fn run(&self, jobs: Vec<ConversionJob>) -> Vec<JobOutcome> {
        let total = jobs.len();
        // progress only; `collect` is what waits for every job
        let remaining = AtomicUsize::new(total);

        self.pool.install(|| {
            jobs.into_par_iter()
                .with_max_len(1)
                .map(|job| {
                    let input = job.input().to_path_buf();
                    let output = job.output().to_path_buf();
                    let result = job.execute();
                    if let Err(err) = &result {
                        tracing::error!(input = %input.display(), error = %err, "conversion failed");
                    }

                    let left = remaining.fetch_sub(1, Ordering::AcqRel) - 1;
                    tracing::debug!(done = total - left, total, "job finished");

                    JobOutcome {
                        input,
                        output,
                        result,
                    }
                })
                .collect()
        })
    }
}
