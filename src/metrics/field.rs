//! Generic field time series reduced over a horizontal region

use super::{check_inputs, read_records};
use crate::config::ExtractionOptions;
use crate::dataset::{Dataset, Slab, RECORD_DIMENSION};
use crate::errors::{PoppyError, Result};
use crate::grid::{build_mask, intersect, Staggering};
use crate::series::{Selection, TimeSeries};
use crate::statistics::{reduce_per_step, Reduction};
use ndarray::{Array2, ArrayD, Axis, Ix2, Zip};
use std::path::Path;

/// Vertical dimension of tracer-level fields
pub const LEVEL_DIMENSION: &str = "z_t";

/// What to extract and how to reduce it
#[derive(Debug, Clone, PartialEq)]
pub struct FieldParams {
    pub variable: String,
    pub grid: Staggering,
    /// Must skip missing values; masked-out cells arrive as NaN
    pub reduction: Reduction,
    pub lat_limits: Option<(f64, f64)>,
    pub lon_limits: Option<(f64, f64)>,
    /// Level index, used only when the variable has a `z_t` dimension
    pub level: usize,
}

impl FieldParams {
    pub fn new(variable: &str, grid: Staggering) -> Self {
        Self {
            variable: variable.to_string(),
            grid,
            reduction: Reduction::default(),
            lat_limits: None,
            lon_limits: None,
            level: 0,
        }
    }
}

/// Region mask on the variable's grid, limited to columns with ocean levels
fn region_mask(ds: &Dataset, params: &FieldParams) -> Result<Option<Array2<bool>>> {
    let lon = ds.read_2d(params.grid.longitude())?;
    let lat = ds.read_2d(params.grid.latitude())?;
    let Some(mask) = build_mask(&lon, &lat, params.lon_limits, params.lat_limits)? else {
        return Ok(None);
    };
    let ocean = ds
        .read_2d(params.grid.level_count())?
        .mapv(|k| k.is_finite() && k > 0.0);
    Ok(Some(intersect(&mask, &ocean)?))
}

/// Selections for every non-time dimension of the variable
fn level_slabs(ds: &Dataset, params: &FieldParams) -> Result<Vec<Slab>> {
    let dims = ds.dimension_names(&params.variable)?;
    if dims.first().map(String::as_str) != Some(RECORD_DIMENSION) {
        return Err(PoppyError::DimensionNotFound {
            var: params.variable.clone(),
            dim: RECORD_DIMENSION.to_string(),
        });
    }
    Ok(dims[1..]
        .iter()
        .map(|d| {
            if d == LEVEL_DIMENSION {
                Slab::Index(params.level)
            } else {
                Slab::All
            }
        })
        .collect())
}

/// Sets cells outside the mask to NaN in every time step
fn apply_mask(data: &mut ArrayD<f64>, mask: &Array2<bool>, var: &str) -> Result<()> {
    for step in data.axis_iter_mut(Axis(0)) {
        let found = step.shape().to_vec();
        let mut step =
            step.into_dimensionality::<Ix2>()
                .map_err(|_| PoppyError::ShapeMismatch {
                    context: format!("region mask against '{}'", var),
                    expected: mask.shape().to_vec(),
                    found,
                })?;
        crate::grid::check_mask(mask, step.shape(), var)?;
        Zip::from(&mut step).and(mask).for_each(|v, &inside| {
            if !inside {
                *v = f64::NAN;
            }
        });
    }
    Ok(())
}

/// Time series of any field reduced over its horizontal dimensions.
pub fn get_timeseries<P: AsRef<Path>>(
    files: &[P],
    params: &FieldParams,
    options: &ExtractionOptions,
) -> Result<TimeSeries> {
    check_inputs(files)?;

    let (mask, slabs) = {
        let ds = Dataset::open(&files[0])?;
        (region_mask(&ds, params)?, level_slabs(&ds, params)?)
    };

    let (time, mut data) = read_records(files, options, &params.variable, &slabs)?;
    if let Some(mask) = &mask {
        apply_mask(&mut data, mask, &params.variable)?;
    }
    let values = reduce_per_step(&data, params.reduction);

    let level = slabs
        .iter()
        .any(|s| matches!(s, Slab::Index(_)))
        .then_some(params.level);
    let selection = Selection {
        lat_limits: params.lat_limits,
        lon_limits: params.lon_limits,
        level,
        grid: Some(params.grid),
        reduction: Some(params.reduction),
        ..Selection::for_variable(&params.variable)
    };
    Ok(TimeSeries::new(&params.variable, time, values, selection))
}
