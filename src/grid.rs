//! Staggered POP grid geometry and region masks
//!
//! POP uses an Arakawa B grid: tracers live at `T` points, velocities at `U`
//! points on the north-east corner of each `T` cell. Geometry is stored in
//! centimetres in the history files and converted to metres here.

use crate::dataset::Dataset;
use crate::errors::{ensure_same_shape, PoppyError, Result};
use ndarray::{Array1, Array2, Zip};
use std::fmt;
use std::str::FromStr;

/// cm -> m
pub const CM_TO_M: f64 = 1e-2;
/// cm² -> m²
pub const CM2_TO_M2: f64 = 1e-4;

/// Which of the two staggered grids a variable lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staggering {
    /// Tracer points
    T,
    /// Velocity points
    U,
}

impl Staggering {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::T => "T",
            Self::U => "U",
        }
    }

    #[must_use]
    pub const fn longitude(self) -> &'static str {
        match self {
            Self::T => "TLONG",
            Self::U => "ULONG",
        }
    }

    #[must_use]
    pub const fn latitude(self) -> &'static str {
        match self {
            Self::T => "TLAT",
            Self::U => "ULAT",
        }
    }

    /// Number of active vertical levels per column
    #[must_use]
    pub const fn level_count(self) -> &'static str {
        match self {
            Self::T => "KMT",
            Self::U => "KMU",
        }
    }

    #[must_use]
    pub const fn dx(self) -> &'static str {
        match self {
            Self::T => "DXT",
            Self::U => "DXU",
        }
    }

    #[must_use]
    pub const fn dy(self) -> &'static str {
        match self {
            Self::T => "DYT",
            Self::U => "DYU",
        }
    }

    #[must_use]
    pub const fn area(self) -> &'static str {
        match self {
            Self::T => "TAREA",
            Self::U => "UAREA",
        }
    }
}

impl fmt::Display for Staggering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Staggering {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "T" | "t" => Ok(Self::T),
            "U" | "u" => Ok(Self::U),
            other => Err(format!("Unknown grid '{}': expected 'T' or 'U'", other)),
        }
    }
}

/// Horizontal and vertical geometry of one staggering, in metres
#[derive(Debug, Clone)]
pub struct Grid {
    pub staggering: Staggering,
    pub lon: Array2<f64>,
    pub lat: Array2<f64>,
    pub dx: Array2<f64>,
    pub dy: Array2<f64>,
    pub area: Array2<f64>,
    pub dz: Array1<f64>,
    pub levels: Array2<f64>,
}

impl Grid {
    /// Loads the grid variables of one staggering from the first file of `ds`
    pub fn from_dataset(ds: &Dataset, staggering: Staggering) -> Result<Self> {
        let lon = ds.read_2d(staggering.longitude())?;
        let lat = ds.read_2d(staggering.latitude())?;
        let dx = ds.read_2d(staggering.dx())? * CM_TO_M;
        let dy = ds.read_2d(staggering.dy())? * CM_TO_M;
        let area = ds.read_2d(staggering.area())? * CM2_TO_M2;
        let dz = ds.read_1d("dz")? * CM_TO_M;
        let levels = ds.read_2d(staggering.level_count())?;

        let shape = lon.shape().to_vec();
        for (name, field) in [
            (staggering.latitude(), &lat),
            (staggering.dx(), &dx),
            (staggering.dy(), &dy),
            (staggering.area(), &area),
            (staggering.level_count(), &levels),
        ] {
            ensure_same_shape(name, &shape, field.shape())?;
        }

        Ok(Self {
            staggering,
            lon,
            lat,
            dx,
            dy,
            area,
            dz,
            levels,
        })
    }

    /// Horizontal shape `(nlat, nlon)`
    pub fn shape(&self) -> (usize, usize) {
        self.lon.dim()
    }

    /// Columns with at least one active level
    pub fn ocean_mask(&self) -> Array2<bool> {
        self.levels.mapv(|k| k.is_finite() && k > 0.0)
    }

    /// Region mask from coordinate limits, restricted to ocean columns.
    /// `None` when no limits are given.
    pub fn region_mask(
        &self,
        lon_limits: Option<(f64, f64)>,
        lat_limits: Option<(f64, f64)>,
    ) -> Result<Option<Array2<bool>>> {
        match build_mask(&self.lon, &self.lat, lon_limits, lat_limits)? {
            Some(mask) => Ok(Some(intersect(&mask, &self.ocean_mask())?)),
            None => Ok(None),
        }
    }
}

/// Boolean mask of cells within inclusive longitude and latitude limits.
///
/// Returns `None` when both limits are absent. An absent limit leaves that
/// coordinate unconstrained. Longitudes are compared as stored; a region
/// crossing the 0/360 seam has to be expressed in a matching convention.
pub fn build_mask(
    lon: &Array2<f64>,
    lat: &Array2<f64>,
    lon_limits: Option<(f64, f64)>,
    lat_limits: Option<(f64, f64)>,
) -> Result<Option<Array2<bool>>> {
    if lon_limits.is_none() && lat_limits.is_none() {
        return Ok(None);
    }
    ensure_same_shape("region mask coordinates", lon.shape(), lat.shape())?;

    let within = |value: f64, limits: Option<(f64, f64)>| match limits {
        Some((lo, hi)) => value >= lo && value <= hi,
        None => !value.is_nan(),
    };

    let mask = Zip::from(lon)
        .and(lat)
        .map_collect(|&x, &y| within(x, lon_limits) && within(y, lat_limits));
    Ok(Some(mask))
}

/// Cell-wise AND of two masks of identical shape
pub fn intersect(a: &Array2<bool>, b: &Array2<bool>) -> Result<Array2<bool>> {
    ensure_same_shape("mask intersection", a.shape(), b.shape())?;
    Ok(Zip::from(a).and(b).map_collect(|&x, &y| x && y))
}

/// Checks that a mask covers a field cell by cell
pub(crate) fn check_mask(mask: &Array2<bool>, field_shape: &[usize], field: &str) -> Result<()> {
    if mask.shape() != field_shape {
        return Err(PoppyError::ShapeMismatch {
            context: format!("region mask against '{}'", field),
            expected: field_shape.to_vec(),
            found: mask.shape().to_vec(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn coords() -> (Array2<f64>, Array2<f64>) {
        let lon = array![[0.0, 10.0, 20.0], [0.0, 10.0, 20.0]];
        let lat = array![[-5.0, -5.0, -5.0], [5.0, 5.0, 5.0]];
        (lon, lat)
    }

    #[test]
    fn no_limits_means_no_mask() {
        let (lon, lat) = coords();
        assert!(build_mask(&lon, &lat, None, None).unwrap().is_none());
    }

    #[test]
    fn limits_are_inclusive() {
        let (lon, lat) = coords();
        let mask = build_mask(&lon, &lat, Some((10.0, 20.0)), Some((-5.0, 0.0)))
            .unwrap()
            .unwrap();
        assert_eq!(mask, array![[false, true, true], [false, false, false]]);
    }

    #[test]
    fn selected_cells_satisfy_both_bounds() {
        let lon = Array2::from_shape_fn((6, 8), |(_, i)| i as f64 * 45.0);
        let lat = Array2::from_shape_fn((6, 8), |(j, _)| -75.0 + j as f64 * 30.0);
        let (lonlim, latlim) = ((40.0, 200.0), (-50.0, 50.0));
        let mask = build_mask(&lon, &lat, Some(lonlim), Some(latlim))
            .unwrap()
            .unwrap();
        for ((idx, &selected), (&x, &y)) in mask.indexed_iter().zip(lon.iter().zip(lat.iter())) {
            let inside = x >= lonlim.0 && x <= lonlim.1 && y >= latlim.0 && y <= latlim.1;
            assert_eq!(selected, inside, "cell {:?}", idx);
        }
    }

    #[test]
    fn single_limit_leaves_other_axis_open() {
        let (lon, lat) = coords();
        let mask = build_mask(&lon, &lat, None, Some((0.0, 10.0)))
            .unwrap()
            .unwrap();
        assert_eq!(mask, array![[false, false, false], [true, true, true]]);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let lon = Array2::<f64>::zeros((2, 3));
        let lat = Array2::<f64>::zeros((3, 2));
        let err = build_mask(&lon, &lat, Some((0.0, 1.0)), None).unwrap_err();
        assert!(matches!(err, PoppyError::ShapeMismatch { .. }));

        let a = Array2::from_elem((2, 2), true);
        let b = Array2::from_elem((2, 3), true);
        assert!(intersect(&a, &b).is_err());
    }

    #[test]
    fn staggering_parses_and_names_variables() {
        assert_eq!("T".parse::<Staggering>().unwrap(), Staggering::T);
        assert_eq!("u".parse::<Staggering>().unwrap(), Staggering::U);
        assert!("X".parse::<Staggering>().is_err());
        assert_eq!(Staggering::U.dx(), "DXU");
        assert_eq!(Staggering::T.level_count(), "KMT");
    }
}
