//! Dataset handle over one NetCDF file or a jointly opened file set
//!
//! A [`Dataset`] owns its open files; dropping it closes them, so every
//! extraction releases its handles on success and on error alike. Variables
//! whose first dimension is the record (time) dimension are concatenated
//! across files in the order they were given, everything else is read from
//! the first file.

use crate::errors::{PoppyError, Result};
use ndarray::{concatenate, Array1, Array2, ArrayD, Axis, Ix1, Ix2};
use netcdf::{AttributeValue, File, Variable};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Name of the record dimension in POP history files.
pub const RECORD_DIMENSION: &str = "time";

/// Magnitudes above this are NetCDF default fill values.
const FILL_THRESHOLD: f64 = 1.0e30;

/// Per-dimension hyperslab selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slab {
    /// The whole dimension
    All,
    /// A single index; the dimension is dropped from the result
    Index(usize),
    /// A half-open index range; the dimension is kept
    Range(Range<usize>),
}

impl Slab {
    fn bounds(&self, len: usize) -> (usize, usize) {
        match self {
            Slab::All => (0, len),
            Slab::Index(i) => (*i, *i + 1),
            Slab::Range(r) => (r.start, r.end),
        }
    }

    fn keeps_dimension(&self) -> bool {
        !matches!(self, Slab::Index(_))
    }
}

/// Open handle on one or more NetCDF files
pub struct Dataset {
    files: Vec<(PathBuf, File)>,
}

impl Dataset {
    /// Opens a single file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_file(&path)?;
        Ok(Self {
            files: vec![(path, file)],
        })
    }

    /// Opens all files at once; record variables are joined along time.
    pub fn open_joint<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(PoppyError::NoInputFiles);
        }
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref().to_path_buf();
            let file = open_file(&path)?;
            files.push((path, file));
        }
        log::debug!("Opened {} files jointly", files.len());
        Ok(Self { files })
    }

    /// Path of the first file, used for static variables
    pub fn path(&self) -> &Path {
        &self.files[0].0
    }

    /// First file of the set
    pub fn first_file(&self) -> &File {
        &self.files[0].1
    }

    /// Looks up a variable in the first file
    pub fn variable(&self, name: &str) -> Result<Variable<'_>> {
        self.first_file()
            .variable(name)
            .ok_or_else(|| PoppyError::VariableNotFound {
                var: name.to_string(),
                file: self.path().to_path_buf(),
            })
    }

    /// Dimension names of a variable
    pub fn dimension_names(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .variable(name)?
            .dimensions()
            .iter()
            .map(|d| d.name().to_string())
            .collect())
    }

    /// String attribute of a variable, `None` if absent or not a string
    pub fn attribute_string(&self, var_name: &str, attr: &str) -> Result<Option<String>> {
        let var = self.variable(var_name)?;
        let Some(attribute) = var.attribute(attr) else {
            return Ok(None);
        };
        match attribute.value()? {
            AttributeValue::Str(s) => Ok(Some(s)),
            AttributeValue::Strs(mut ss) if !ss.is_empty() => Ok(Some(ss.remove(0))),
            _ => Ok(None),
        }
    }

    /// Reads a hyperslab as `f64`, with missing values returned as NaN.
    pub fn read(&self, name: &str, slabs: &[Slab]) -> Result<ArrayD<f64>> {
        let var = self.variable(name)?;
        if !is_record_variable(&var) || self.files.len() == 1 {
            return read_hyperslab(&var, slabs, self.path());
        }

        let counts = self.record_counts(name)?;
        let total: usize = counts.iter().sum();
        let first = slabs.first().cloned().unwrap_or(Slab::All);
        let (start, end) = first.bounds(total);
        if start >= end || end > total {
            return Err(PoppyError::InvalidSelection {
                message: format!(
                    "record range {}..{} out of bounds for '{}' ({} records)",
                    start, end, name, total
                ),
            });
        }

        let mut parts = Vec::new();
        let mut offset = 0;
        for ((path, file), count) in self.files.iter().zip(&counts) {
            let lo = start.max(offset);
            let hi = end.min(offset + count);
            if lo < hi {
                let file_var = file
                    .variable(name)
                    .ok_or_else(|| PoppyError::VariableNotFound {
                        var: name.to_string(),
                        file: path.clone(),
                    })?;
                let mut local = slabs.to_vec();
                local[0] = Slab::Range(lo - offset..hi - offset);
                parts.push(read_hyperslab(&file_var, &local, path)?);
            }
            offset += count;
        }

        let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
        let joined = concatenate(Axis(0), &views)?;
        if first.keeps_dimension() {
            Ok(joined)
        } else {
            Ok(joined.index_axis_move(Axis(0), 0))
        }
    }

    /// Reads a whole one-dimensional variable
    pub fn read_1d(&self, name: &str) -> Result<Array1<f64>> {
        let data = self.read(name, &[Slab::All])?;
        Ok(data.into_dimensionality::<Ix1>()?)
    }

    /// Reads a whole two-dimensional static variable
    pub fn read_2d(&self, name: &str) -> Result<Array2<f64>> {
        let data = self.read(name, &[Slab::All, Slab::All])?;
        Ok(data.into_dimensionality::<Ix2>()?)
    }

    /// Reads the horizontal slice `name[t, k, :, :]`
    pub fn read_layer(&self, name: &str, t: usize, k: usize) -> Result<Array2<f64>> {
        let data = self.read(
            name,
            &[Slab::Index(t), Slab::Index(k), Slab::All, Slab::All],
        )?;
        Ok(data.into_dimensionality::<Ix2>()?)
    }

    /// Reads the horizontal slice `name[t, :, :]` of a surface field
    pub fn read_surface(&self, name: &str, t: usize) -> Result<Array2<f64>> {
        let data = self.read(name, &[Slab::Index(t), Slab::All, Slab::All])?;
        Ok(data.into_dimensionality::<Ix2>()?)
    }

    fn record_counts(&self, name: &str) -> Result<Vec<usize>> {
        self.files
            .iter()
            .map(|(path, file)| {
                let var = file
                    .variable(name)
                    .ok_or_else(|| PoppyError::VariableNotFound {
                        var: name.to_string(),
                        file: path.clone(),
                    })?;
                var.dimensions()
                    .first()
                    .map(|d| d.len())
                    .ok_or_else(|| PoppyError::DimensionNotFound {
                        var: name.to_string(),
                        dim: RECORD_DIMENSION.to_string(),
                    })
            })
            .collect()
    }
}

fn open_file(path: &Path) -> Result<File> {
    netcdf::open(path).map_err(|source| PoppyError::FileOpen {
        path: path.to_path_buf(),
        source,
    })
}

fn is_record_variable(var: &Variable) -> bool {
    var.dimensions()
        .first()
        .map(|d| d.is_unlimited() || d.name() == RECORD_DIMENSION)
        .unwrap_or(false)
}

fn read_hyperslab(var: &Variable, slabs: &[Slab], path: &Path) -> Result<ArrayD<f64>> {
    let dims = var.dimensions();
    if slabs.len() != dims.len() {
        return Err(PoppyError::InvalidSelection {
            message: format!(
                "'{}' in '{}' has {} dimensions, {} selections given",
                var.name(),
                path.display(),
                dims.len(),
                slabs.len()
            ),
        });
    }

    let mut start = Vec::with_capacity(dims.len());
    let mut count = Vec::with_capacity(dims.len());
    let mut shape = Vec::with_capacity(dims.len());
    for (dim, slab) in dims.iter().zip(slabs) {
        let (lo, hi) = slab.bounds(dim.len());
        if lo >= hi || hi > dim.len() {
            return Err(PoppyError::InvalidSelection {
                message: format!(
                    "{}..{} out of bounds for dimension '{}' of '{}' (length {})",
                    lo,
                    hi,
                    dim.name(),
                    var.name(),
                    dim.len()
                ),
            });
        }
        start.push(lo);
        count.push(hi - lo);
        if slab.keeps_dimension() {
            shape.push(hi - lo);
        }
    }

    let values: Vec<f64> = if dims.is_empty() {
        var.get_values::<f64, _>(..)?
    } else {
        var.get_values::<f64, _>((start.as_slice(), count.as_slice()))?
    };

    let fill = missing_values(var);
    let values = values
        .into_iter()
        .map(|v| {
            if !v.is_finite() || v.abs() > FILL_THRESHOLD || fill.contains(&v) {
                f64::NAN
            } else {
                v
            }
        })
        .collect();

    Ok(ArrayD::from_shape_vec(shape, values)?)
}

fn missing_values(var: &Variable) -> Vec<f64> {
    ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| var.attribute(name))
        .filter_map(|attr| match attr.value().ok()? {
            AttributeValue::Float(v) => Some(f64::from(v)),
            AttributeValue::Double(v) => Some(v),
            AttributeValue::Short(v) => Some(f64::from(v)),
            AttributeValue::Int(v) => Some(f64::from(v)),
            _ => None,
        })
        .collect()
}
