//! poppy: diagnostic time series from POP ocean model output
//!
//! Reads CESM/POP history files (NetCDF) and produces dated diagnostic time
//! series: the Atlantic meridional overturning maximum, meridional heat and
//! salt transport, and any field reduced over a horizontal region. It also
//! integrates net advective, eddy-induced and diffusive tracer transport into
//! a region bounded by longitude and latitude limits.
//!
//! ## Module Organization
//!
//! - [`dataset`]: opening one or many history files and reading hyperslabs
//! - [`grid`]: POP grid geometry and region masks
//! - [`time`]: CF time decoding to decimal model years
//! - [`statistics`]: NaN-aware reductions and running means
//! - [`metrics`]: the time series extractors
//! - [`flux`]: regional flux budgets
//! - [`series`]: the extracted series and its selection metadata
//! - [`netcdf_io`]: writing series to NetCDF
//! - [`metadata`]: variable catalogue and inspection
//! - [`parallel`]: thread pool configuration
//! - [`config`]: constants and extraction options
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use poppy::prelude::*;
//!
//! let files = ["hist.0001.nc", "hist.0002.nc"];
//! let amoc = poppy::metrics::get_amoc(&files, &AmocParams::default(), &ExtractionOptions::default())?;
//! for (year, value) in amoc.iter() {
//!     println!("{:.2} {:.2}", year, value);
//! }
//! # Ok::<(), PoppyError>(())
//! ```

pub mod cli;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod flux;
pub mod grid;
pub mod metadata;
pub mod metrics;
pub mod netcdf_io;
pub mod parallel;
pub mod series;
pub mod statistics;
pub mod time;

pub use errors::{PoppyError, Result};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::{ExtractionOptions, ReadStrategy, REFERENCE_SALINITY};
    pub use crate::dataset::{Dataset, Slab};
    pub use crate::errors::{PoppyError, Result};
    pub use crate::flux::{FluxBudgetParams, GridKind, Tracer};
    pub use crate::grid::{build_mask, Grid, Staggering};
    pub use crate::metrics::{AmocParams, Component, FieldParams, MhtParams, MstParams};
    pub use crate::netcdf_io::{write_series_to_netcdf, SeriesWriter};
    pub use crate::parallel::{get_parallel_info, ParallelConfig};
    pub use crate::series::{Selection, TimeSeries, TIME_INDEX_NAME};
    pub use crate::statistics::Reduction;
}
