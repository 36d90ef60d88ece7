//! Time series extractors for POP history files
//!
//! Every extractor follows the same steps: reject an empty file list, read
//! the static axes from the first file, read the selected hyperslab of every
//! time step (all files jointly, or one file at a time above the file
//! budget), smooth and reduce, and return a [`TimeSeries`].
//!
//! - [`overturning`]: AMOC maximum
//! - [`transport`]: meridional heat and salt transport
//! - [`field`]: any field reduced over a region
//!
//! [`TimeSeries`]: crate::series::TimeSeries

pub mod field;
pub mod overturning;
pub mod transport;

pub use field::{get_timeseries, FieldParams};
pub use overturning::{get_amoc, AmocParams};
pub use transport::{get_mht, get_mst, Component, MhtParams, MstParams};

use crate::config::{ExtractionOptions, ReadStrategy};
use crate::dataset::{Dataset, Slab};
use crate::errors::{ensure_same_shape, PoppyError, Result};
use crate::time::decimal_year_from_dataset;
use ndarray::{ArrayD, Axis, IxDyn};
use std::ops::RangeInclusive;
use std::path::Path;

/// Latitude axis of the MOC and transport diagnostics
pub const LATITUDE_AXIS: &str = "lat_aux_grid";
/// Depth axis of the MOC diagnostic, in cm
pub const MOC_DEPTH_AXIS: &str = "moc_z";
pub const TIME_VARIABLE: &str = "time";

/// Rejects an empty input list and reports how many files will be read.
pub(crate) fn check_inputs<P: AsRef<Path>>(files: &[P]) -> Result<()> {
    if files.is_empty() {
        return Err(PoppyError::NoInputFiles);
    }
    log::info!("Processing {} files ...", files.len());
    Ok(())
}

/// Index of the axis value closest to `value`; ties go to the lowest index.
pub fn nearest_index(axis: &[f64], value: f64) -> Result<usize> {
    axis.iter()
        .enumerate()
        .filter(|(_, x)| x.is_finite())
        .fold(None, |best: Option<(usize, f64)>, (i, x)| {
            let distance = (x - value).abs();
            match best {
                Some((_, d)) if d <= distance => best,
                _ => Some((i, distance)),
            }
        })
        .map(|(i, _)| i)
        .ok_or_else(|| PoppyError::InvalidSelection {
            message: format!("no valid axis value near {}", value),
        })
}

/// Inclusive index window spanned by two axis limits, in ascending order
pub fn index_window(axis: &[f64], limits: (f64, f64)) -> Result<RangeInclusive<usize>> {
    let a = nearest_index(axis, limits.0)?;
    let b = nearest_index(axis, limits.1)?;
    Ok(a.min(b)..=a.max(b))
}

/// Time axis and data of `name`, sliced by `slabs` on every non-time dimension.
///
/// Returns the decimal years and an array whose leading axis is time.
pub(crate) fn read_records<P: AsRef<Path>>(
    files: &[P],
    options: &ExtractionOptions,
    name: &str,
    slabs: &[Slab],
) -> Result<(Vec<f64>, ArrayD<f64>)> {
    let strategy = options.strategy_for(files.len());
    log::debug!(
        "Reading '{}' from {} files ({} strategy, budget {})",
        name,
        files.len(),
        strategy.as_str(),
        options.file_budget
    );

    let mut full = Vec::with_capacity(slabs.len() + 1);
    full.push(Slab::All);
    full.extend_from_slice(slabs);

    match strategy {
        ReadStrategy::Joint => {
            let ds = Dataset::open_joint(files)?;
            let time = decimal_year_from_dataset(&ds, TIME_VARIABLE)?;
            let data = ds.read(name, &full)?;
            if data.ndim() == 0 || data.len_of(Axis(0)) != time.len() {
                return Err(PoppyError::ShapeMismatch {
                    context: format!("time axis of '{}'", name),
                    expected: vec![time.len()],
                    found: data.shape().to_vec(),
                });
            }
            Ok((time, data))
        }
        ReadStrategy::PerFile => {
            full[0] = Slab::Index(0);
            let n = files.len();
            let mut time = vec![f64::NAN; n];
            let mut data: Option<ArrayD<f64>> = None;
            for (i, path) in files.iter().enumerate() {
                let ds = Dataset::open(path)?;
                let years = decimal_year_from_dataset(&ds, TIME_VARIABLE)?;
                if years.len() != 1 {
                    log::warn!(
                        "'{}' holds {} time steps, using the first",
                        path.as_ref().display(),
                        years.len()
                    );
                }
                time[i] = years.first().copied().unwrap_or(f64::NAN);

                let step = ds.read(name, &full)?;
                let out = data.get_or_insert_with(|| {
                    let mut shape = vec![n];
                    shape.extend_from_slice(step.shape());
                    ArrayD::from_elem(IxDyn(&shape), f64::NAN)
                });
                let mut slot = out.index_axis_mut(Axis(0), i);
                ensure_same_shape(name, slot.shape(), step.shape())?;
                slot.assign(&step);
            }
            let data = data.ok_or(PoppyError::NoInputFiles)?;
            Ok((time, data))
        }
    }
}
