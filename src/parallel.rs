//! Thread pool configuration
//!
//! Reductions and smoothing run on Rayon's global pool; file reads stay on
//! the calling thread.

use crate::errors::{PoppyError, Result};
use rayon::ThreadPoolBuilder;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelConfig {
    /// `None` keeps Rayon's default of one thread per core
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Use every available CPU core
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Set up the global Rayon thread pool.
    ///
    /// The global pool can be built only once per process; a second call
    /// with an explicit thread count fails with `ThreadPoolError`.
    pub fn setup_global_pool(&self) -> Result<()> {
        match self.num_threads {
            Some(0) => Err(PoppyError::ThreadPoolError(
                "Thread count must be at least 1".to_string(),
            )),
            Some(num_threads) => {
                ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build_global()
                    .map_err(|e| {
                        PoppyError::ThreadPoolError(format!(
                            "Failed to initialize thread pool with {} threads: {}",
                            num_threads, e
                        ))
                    })?;
                log::info!("Configured parallel processing with {} threads", num_threads);
                Ok(())
            }
            None => {
                log::debug!("Using default thread pool configuration");
                Ok(())
            }
        }
    }

    /// Threads in the pool currently in use
    pub fn current_threads(&self) -> usize {
        rayon::current_num_threads()
    }
}

/// Snapshot of the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub available_parallelism: usize,
}

impl ParallelInfo {
    pub fn log(&self) {
        log::info!(
            "Threads: {} in use, {} cores, parallelism {}",
            self.current_threads,
            self.available_cores,
            self.available_parallelism
        );
    }
}

pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        available_parallelism: std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors() {
        assert_eq!(ParallelConfig::default().num_threads, None);
        assert_eq!(ParallelConfig::with_threads(4).num_threads, Some(4));
        assert_eq!(ParallelConfig::all_cores().num_threads, Some(num_cpus::get()));
    }

    #[test]
    fn zero_threads_is_rejected() {
        let err = ParallelConfig::with_threads(0).setup_global_pool().unwrap_err();
        assert!(matches!(err, PoppyError::ThreadPoolError(_)));
    }

    #[test]
    fn info_reports_at_least_one_thread() {
        let info = get_parallel_info();
        assert!(info.current_threads >= 1);
        assert!(info.available_parallelism >= 1);
    }
}
