//! Time series results and the selection that produced them

use crate::grid::Staggering;
use crate::statistics::Reduction;

/// Name of the time index of every series
pub const TIME_INDEX_NAME: &str = "ModelYear";

/// Selection parameters recorded with a series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub variable: String,
    pub lat_limits: Option<(f64, f64)>,
    pub lon_limits: Option<(f64, f64)>,
    /// Depth limits in metres
    pub depth_limits: Option<(f64, f64)>,
    pub lat0: Option<f64>,
    /// Transport component index
    pub component: Option<usize>,
    /// Vertical level index
    pub level: Option<usize>,
    pub grid: Option<Staggering>,
    pub reduction: Option<Reduction>,
    pub window_size: Option<usize>,
}

impl Selection {
    pub fn for_variable(variable: &str) -> Self {
        Self {
            variable: variable.to_string(),
            ..Self::default()
        }
    }

    /// Selection entries as `(name, value)` text pairs, skipping unset ones
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let pair = |(a, b): (f64, f64)| format!("{}, {}", a, b);
        let mut attrs = vec![("varn", self.variable.clone())];
        if let Some(l) = self.lat_limits {
            attrs.push(("latlim", pair(l)));
        }
        if let Some(l) = self.lon_limits {
            attrs.push(("lonlim", pair(l)));
        }
        if let Some(l) = self.depth_limits {
            attrs.push(("zlim", pair(l)));
        }
        if let Some(lat0) = self.lat0 {
            attrs.push(("lat0", lat0.to_string()));
        }
        if let Some(c) = self.component {
            attrs.push(("component", c.to_string()));
        }
        if let Some(k) = self.level {
            attrs.push(("k", k.to_string()));
        }
        if let Some(g) = self.grid {
            attrs.push(("grid", g.to_string()));
        }
        if let Some(r) = self.reduction {
            attrs.push(("reducefunc", r.to_string()));
        }
        if let Some(w) = self.window_size {
            attrs.push(("window_size", w.to_string()));
        }
        attrs
    }
}

/// A dated series of one diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    name: String,
    time: Vec<f64>,
    values: Vec<f64>,
    selection: Selection,
}

impl TimeSeries {
    /// Builds a series; `time` and `values` must have equal length.
    pub(crate) fn new(name: &str, time: Vec<f64>, values: Vec<f64>, selection: Selection) -> Self {
        debug_assert_eq!(time.len(), values.len());
        Self {
            name: name.to_string(),
            time,
            values,
            selection,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decimal model years
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(time, value)` pairs in time order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time.iter().copied().zip(self.values.iter().copied())
    }

    /// Splits the series into `(values, time, selection)`
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>, Selection) {
        (self.values, self.time, self.selection)
    }
}
