//! Centred moving-average smoothing along the time axis
//!
//! For a window of `W` samples the value at `i` is the mean of
//! `x[i - W/2 ..= i - W/2 + W - 1]`. The first `W + 1` and the last `W`
//! outputs are set to NaN, so only fully covered positions survive.

use ndarray::{ArrayD, Axis, Zip};

/// Smooths a series; windows of 0 or 1 return the series unchanged.
pub fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return series.to_vec();
    }
    let n = series.len();
    let half = window / 2;
    (0..n)
        .map(|i| {
            if i < window + 1 || i + window >= n {
                f64::NAN
            } else {
                let start = i - half;
                series[start..start + window].iter().sum::<f64>() / window as f64
            }
        })
        .collect()
}

/// Smooths every grid cell of `data` along its leading (time) axis.
pub fn smooth_along_time(data: &ArrayD<f64>, window: usize) -> ArrayD<f64> {
    if window <= 1 || data.ndim() == 0 {
        return data.clone();
    }
    let mut out = ArrayD::<f64>::zeros(data.raw_dim());
    Zip::from(out.lanes_mut(Axis(0)))
        .and(data.lanes(Axis(0)))
        .par_for_each(|mut smoothed, raw| {
            let raw: Vec<f64> = raw.iter().copied().collect();
            for (o, v) in smoothed.iter_mut().zip(moving_average(&raw, window)) {
                *o = v;
            }
        });
    out
}
