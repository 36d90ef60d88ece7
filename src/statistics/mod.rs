//! Reductions and smoothing used by the time series extractors
//!
//! - [`operations`]: NaN-aware reduction operators
//! - [`parallel`]: per-time-step reductions on the rayon pool
//! - [`smoothing`]: centred moving average with undefined edges

pub mod operations;
pub mod parallel;
pub mod smoothing;

pub use operations::Reduction;
pub use parallel::{max_per_step, reduce_per_step};
pub use smoothing::{moving_average, smooth_along_time};
