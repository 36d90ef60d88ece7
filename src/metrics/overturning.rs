//! Atlantic meridional overturning circulation index

use super::{check_inputs, index_window, read_records, LATITUDE_AXIS, MOC_DEPTH_AXIS};
use crate::config::{ExtractionOptions, DEFAULT_WINDOW_SIZE};
use crate::dataset::{Dataset, Slab};
use crate::errors::Result;
use crate::grid::CM_TO_M;
use crate::series::{Selection, TimeSeries};
use crate::statistics::{max_per_step, smooth_along_time};
use std::path::Path;

/// `transport_reg` index of the Atlantic basin in `MOC`
pub const ATLANTIC_TRANSPORT_REGION: usize = 1;
/// `moc_comp` index of the Eulerian-mean streamfunction in `MOC`
pub const EULERIAN_MEAN_MOC_COMPONENT: usize = 0;

/// Search window and smoothing of the AMOC maximum
#[derive(Debug, Clone, PartialEq)]
pub struct AmocParams {
    /// Latitude limits in degrees north
    pub lat_limits: (f64, f64),
    /// Depth limits in metres
    pub depth_limits: (f64, f64),
    pub window_size: usize,
}

impl Default for AmocParams {
    /// Maximum between 30N and 60N below 500 m (Shields et al. 2012)
    fn default() -> Self {
        Self {
            lat_limits: (30.0, 60.0),
            depth_limits: (500.0, 9999.0),
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// AMOC maximum time series from files carrying the `MOC` diagnostic.
///
/// The streamfunction is smoothed in time cell by cell, then the maximum over
/// the depth and latitude window is taken for each time step.
pub fn get_amoc<P: AsRef<Path>>(
    files: &[P],
    params: &AmocParams,
    options: &ExtractionOptions,
) -> Result<TimeSeries> {
    check_inputs(files)?;

    let (depths, lats) = {
        let ds = Dataset::open(&files[0])?;
        let zax: Vec<f64> = ds.read_1d(MOC_DEPTH_AXIS)?.iter().map(|z| z * CM_TO_M).collect();
        let latax: Vec<f64> = ds.read_1d(LATITUDE_AXIS)?.to_vec();
        (
            index_window(&zax, params.depth_limits)?,
            index_window(&latax, params.lat_limits)?,
        )
    };
    log::debug!("AMOC window: depth {:?}, latitude {:?}", depths, lats);

    let slabs = [
        Slab::Index(ATLANTIC_TRANSPORT_REGION),
        Slab::Index(EULERIAN_MEAN_MOC_COMPONENT),
        Slab::Range(*depths.start()..*depths.end() + 1),
        Slab::Range(*lats.start()..*lats.end() + 1),
    ];
    let (time, amoc) = read_records(files, options, "MOC", &slabs)?;

    let smoothed = smooth_along_time(&amoc, params.window_size);
    let values = max_per_step(&smoothed);

    let selection = Selection {
        lat_limits: Some(params.lat_limits),
        depth_limits: Some(params.depth_limits),
        window_size: Some(params.window_size),
        ..Selection::for_variable("MOC")
    };
    Ok(TimeSeries::new("AMOC", time, values, selection))
}
