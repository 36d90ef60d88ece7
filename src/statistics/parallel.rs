//! Parallel per-time-step reductions
//!
//! The leading axis of every array here is time. Each step is reduced
//! independently on the rayon pool; output order follows the time axis.

use super::operations::Reduction;
use ndarray::{ArrayD, Axis};
use rayon::prelude::*;

/// Reduces all non-time axes of `data` with `reduction`, one value per step.
pub fn reduce_per_step(data: &ArrayD<f64>, reduction: Reduction) -> Vec<f64> {
    if data.ndim() == 0 {
        return vec![reduction.apply(data.iter())];
    }
    log::debug!(
        "Reducing {} steps with {} across {} threads",
        data.len_of(Axis(0)),
        reduction,
        rayon::current_num_threads()
    );
    data.axis_iter(Axis(0))
        .into_par_iter()
        .map(|step| reduction.apply(step.iter()))
        .collect()
}

/// Spatial maximum of each time step, ignoring missing cells
pub fn max_per_step(data: &ArrayD<f64>) -> Vec<f64> {
    reduce_per_step(data, Reduction::NanMax)
}
