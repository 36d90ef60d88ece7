//! Meridional heat and salt transport

use super::{check_inputs, index_window, nearest_index, read_records, LATITUDE_AXIS};
use crate::config::{ExtractionOptions, DEFAULT_WINDOW_SIZE};
use crate::dataset::{Dataset, Slab};
use crate::errors::Result;
use crate::series::{Selection, TimeSeries};
use crate::statistics::{max_per_step, moving_average, smooth_along_time};
use std::fmt;
use std::path::Path;

/// `transport_reg` index of the global ocean in `N_HEAT`/`N_SALT`
pub const GLOBAL_TRANSPORT_REGION: usize = 0;

/// Transport mechanism, indexed as in the `transport_comp` dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Component {
    #[default]
    Total = 0,
    EulerianMean = 1,
    EddyInducedAndDiffusion = 2,
    EddyInduced = 3,
    Submeso = 4,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Self::Total,
        Self::EulerianMean,
        Self::EddyInducedAndDiffusion,
        Self::EddyInduced,
        Self::Submeso,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Total => "Total",
            Self::EulerianMean => "Eulerian-Mean Advection",
            Self::EddyInducedAndDiffusion => "Eddy-Induced Advection (bolus) + Diffusion",
            Self::EddyInduced => "Eddy-Induced (bolus) Advection",
            Self::Submeso => "Submeso Advection",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MhtParams {
    /// Latitude limits of the maximum
    pub lat_limits: (f64, f64),
    pub component: Component,
    pub window_size: usize,
}

impl Default for MhtParams {
    fn default() -> Self {
        Self {
            lat_limits: (30.0, 60.0),
            component: Component::Total,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MstParams {
    /// Latitude the transport is taken at
    pub lat0: f64,
    pub component: Component,
    pub window_size: usize,
}

impl Default for MstParams {
    fn default() -> Self {
        Self {
            lat0: 55.0,
            component: Component::Total,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

fn latitude_axis<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let ds = Dataset::open(path)?;
    Ok(ds.read_1d(LATITUDE_AXIS)?.to_vec())
}

/// Maximum of the smoothed `N_HEAT` transport within a latitude band.
pub fn get_mht<P: AsRef<Path>>(
    files: &[P],
    params: &MhtParams,
    options: &ExtractionOptions,
) -> Result<TimeSeries> {
    check_inputs(files)?;
    let lats = index_window(&latitude_axis(&files[0])?, params.lat_limits)?;

    let slabs = [
        Slab::Index(GLOBAL_TRANSPORT_REGION),
        Slab::Index(params.component.index()),
        Slab::Range(*lats.start()..*lats.end() + 1),
    ];
    let (time, nheat) = read_records(files, options, "N_HEAT", &slabs)?;
    let values = max_per_step(&smooth_along_time(&nheat, params.window_size));

    let selection = Selection {
        lat_limits: Some(params.lat_limits),
        component: Some(params.component.index()),
        window_size: Some(params.window_size),
        ..Selection::for_variable("N_HEAT")
    };
    Ok(TimeSeries::new("MHT", time, values, selection))
}

/// Smoothed `N_SALT` transport at the latitude nearest to `lat0`.
pub fn get_mst<P: AsRef<Path>>(
    files: &[P],
    params: &MstParams,
    options: &ExtractionOptions,
) -> Result<TimeSeries> {
    check_inputs(files)?;
    let j0 = nearest_index(&latitude_axis(&files[0])?, params.lat0)?;

    let slabs = [
        Slab::Index(GLOBAL_TRANSPORT_REGION),
        Slab::Index(params.component.index()),
        Slab::Index(j0),
    ];
    let (time, nsalt) = read_records(files, options, "N_SALT", &slabs)?;
    let raw: Vec<f64> = nsalt.iter().copied().collect();
    let values = moving_average(&raw, params.window_size);

    let selection = Selection {
        lat0: Some(params.lat0),
        component: Some(params.component.index()),
        window_size: Some(params.window_size),
        ..Selection::for_variable("N_SALT")
    };
    Ok(TimeSeries::new("MST", time, values, selection))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_indices_follow_file_convention() {
        for (i, c) in Component::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
            assert_eq!(Component::from_index(i), Some(*c));
        }
        assert_eq!(Component::from_index(5), None);
        assert_eq!(Component::EulerianMean.to_string(), "Eulerian-Mean Advection");
    }
}
