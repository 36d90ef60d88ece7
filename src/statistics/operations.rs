//! NaN-aware reductions
//!
//! Missing cells arrive as NaN (land, masked-out region), so every reduction
//! skips non-finite values and yields NaN when nothing valid is left.

use std::fmt;
use std::str::FromStr;

/// Supported spatial reductions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    /// Arithmetic mean of the valid cells
    #[default]
    NanMean,
    /// Sum of the valid cells
    NanSum,
    /// Minimum valid value
    NanMin,
    /// Maximum valid value
    NanMax,
}

impl Reduction {
    /// Get the string representation of the reduction
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NanMean => "nanmean",
            Self::NanSum => "nansum",
            Self::NanMin => "nanmin",
            Self::NanMax => "nanmax",
        }
    }

    /// Applies the reduction to a sequence of values
    pub fn apply<'a, I>(self, values: I) -> f64
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let valid = values.into_iter().copied().filter(|x| x.is_finite());
        match self {
            Self::NanMean => {
                let (sum, count) = valid.fold((0.0, 0_usize), |(s, n), x| (s + x, n + 1));
                if count > 0 {
                    sum / count as f64
                } else {
                    f64::NAN
                }
            }
            Self::NanSum => valid.sum(),
            Self::NanMin => valid.fold(f64::NAN, f64::min),
            Self::NanMax => valid.fold(f64::NAN, f64::max),
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reduction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" | "nanmean" => Ok(Self::NanMean),
            "sum" | "nansum" => Ok(Self::NanSum),
            "min" | "nanmin" => Ok(Self::NanMin),
            "max" | "nanmax" => Ok(Self::NanMax),
            other => Err(format!(
                "Unknown reduction '{}': expected mean, sum, min or max",
                other
            )),
        }
    }
}
