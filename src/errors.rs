//! Centralized error handling for poppy
//!
//! Every extraction and flux-budget call returns [`Result`], carrying enough
//! context (file name, variable name) to diagnose the failing input.

use std::fmt;
use std::path::PathBuf;

/// Main error type for poppy operations
#[derive(Debug)]
pub enum PoppyError {
    /// The list of input files was empty
    NoInputFiles,

    /// The time coordinate lacks usable `units`/`calendar` attributes
    TimeMetadata { var: String, message: String },

    /// A flux budget was requested for an unsupported tracer tag
    InvalidVariable { name: String },

    /// A file could not be opened
    FileOpen {
        path: PathBuf,
        source: netcdf::Error,
    },

    /// NetCDF read errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Variable not found in the dataset
    VariableNotFound { var: String, file: PathBuf },

    /// Dimension not found in variable
    DimensionNotFound { var: String, dim: String },

    /// Two arrays that must line up cell by cell do not
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Out-of-range index, empty layer range or malformed selection
    InvalidSelection { message: String },

    /// Thread pool configuration error
    ThreadPoolError(String),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),
}

impl fmt::Display for PoppyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoppyError::NoInputFiles => {
                write!(f, "No files found. Check your glob pattern.")
            }
            PoppyError::TimeMetadata { var, message } => {
                write!(f, "Invalid time metadata on '{}': {}", var, message)
            }
            PoppyError::InvalidVariable { name } => write!(
                f,
                "Unsupported flux variable '{}' (expected heat, salt or freshwater)",
                name
            ),
            PoppyError::FileOpen { path, source } => {
                write!(f, "Could not open '{}': {}", path.display(), source)
            }
            PoppyError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            PoppyError::IoError(e) => write!(f, "I/O error: {}", e),
            PoppyError::VariableNotFound { var, file } => {
                write!(f, "Variable '{}' not found in '{}'", var, file.display())
            }
            PoppyError::DimensionNotFound { var, dim } => {
                write!(f, "Dimension '{}' not found in variable '{}'", dim, var)
            }
            PoppyError::ShapeMismatch {
                context,
                expected,
                found,
            } => write!(
                f,
                "Shape mismatch in {}: expected {:?}, found {:?}",
                context, expected, found
            ),
            PoppyError::InvalidSelection { message } => {
                write!(f, "Invalid selection: {}", message)
            }
            PoppyError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            PoppyError::ArrayError(e) => write!(f, "Array error: {}", e),
        }
    }
}

impl std::error::Error for PoppyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PoppyError::FileOpen { source, .. } => Some(source),
            PoppyError::NetCDFError(e) => Some(e),
            PoppyError::IoError(e) => Some(e),
            PoppyError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for PoppyError {
    fn from(error: netcdf::Error) -> Self {
        PoppyError::NetCDFError(error)
    }
}

impl From<std::io::Error> for PoppyError {
    fn from(error: std::io::Error) -> Self {
        PoppyError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for PoppyError {
    fn from(error: ndarray::ShapeError) -> Self {
        PoppyError::ArrayError(error)
    }
}

/// Result type alias for poppy operations
pub type Result<T> = std::result::Result<T, PoppyError>;

/// Fails with [`PoppyError::ShapeMismatch`] unless both shapes are equal.
pub(crate) fn ensure_same_shape(context: &str, expected: &[usize], found: &[usize]) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(PoppyError::ShapeMismatch {
            context: context.to_string(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        })
    }
}
