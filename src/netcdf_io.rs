//! Writing extracted time series to NetCDF
//!
//! The output holds one `ModelYear` dimension and coordinate variable, the
//! series itself, its selection as attributes, and a `history` stamp.

use crate::errors::Result;
use crate::series::{TimeSeries, TIME_INDEX_NAME};
use chrono::Utc;
use netcdf::create;
use std::{fs, path::Path};

/// Writer for a single time series
pub struct SeriesWriter<'a> {
    output_path: &'a Path,
}

impl<'a> SeriesWriter<'a> {
    pub fn new(output_path: &'a Path) -> Self {
        Self { output_path }
    }

    /// Write the series, replacing any existing file
    pub fn write(&self, series: &TimeSeries) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = create(self.output_path)?;
        file.add_dimension(TIME_INDEX_NAME, series.len())?;

        {
            let mut time_var = file.add_variable::<f64>(TIME_INDEX_NAME, &[TIME_INDEX_NAME])?;
            time_var.put_attribute("long_name", "model year")?;
            time_var.put_attribute("units", "years")?;
            time_var.put_values(series.time(), ..)?;
        }

        {
            let mut var = file.add_variable::<f64>(series.name(), &[TIME_INDEX_NAME])?;
            var.put_attribute("_FillValue", f64::NAN)?;
            for (name, value) in series.selection().attributes() {
                var.put_attribute(name, value)?;
            }
            var.put_values(series.values(), ..)?;
        }

        file.add_attribute(
            "history",
            format!("Created by poppy on {}", Utc::now().to_rfc3339()),
        )?;
        log::info!(
            "Wrote {} ({} steps) to {}",
            series.name(),
            series.len(),
            self.output_path.display()
        );

        Ok(())
    }
}

/// Writes a series to `output_path`
pub fn write_series_to_netcdf(series: &TimeSeries, output_path: &Path) -> Result<()> {
    SeriesWriter::new(output_path).write(series)
}
