//! Spatial extent types for exported geometry.

use serde::{Deserialize, Serialize};

/// Minimum and maximum of one coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Create a new range, ordering the bounds if they are given reversed.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Compute the range covered by a set of coordinate values.
    ///
    /// NaN values are skipped. Returns `None` when no finite value is left,
    /// which is recorded as "N/A" in the sidecar.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<AxisRange>, v| match acc {
                None => Some(AxisRange { min: v, max: v }),
                Some(r) => Some(AxisRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    /// Length of the range in coordinate units.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Check if a value lies within the range (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Smallest range covering both ranges.
    pub fn union(&self, other: &AxisRange) -> AxisRange {
        AxisRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Units of the three coordinate axes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisUnits {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl AxisUnits {
    pub fn new(x: impl Into<String>, y: impl Into<String>, z: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }

    /// Same units on every axis.
    pub fn uniform(units: impl Into<String>) -> Self {
        let units = units.into();
        Self {
            x: units.clone(),
            y: units.clone(),
            z: units,
        }
    }

    /// Degrees horizontally, meters vertically (lat/lon grids).
    pub fn geographic() -> Self {
        Self::new("degrees_east", "degrees_north", "meter")
    }

    pub fn swap_yz(&self) -> Self {
        Self {
            x: self.x.clone(),
            y: self.z.clone(),
            z: self.y.clone(),
        }
    }
}

impl Default for AxisUnits {
    fn default() -> Self {
        Self::uniform("meter")
    }
}

/// Extent of exported geometry in three dimensions.
///
/// Each axis is independent; an axis without data is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent3 {
    pub x: Option<AxisRange>,
    pub y: Option<AxisRange>,
    pub z: Option<AxisRange>,
}

impl Extent3 {
    pub fn new(x: Option<AxisRange>, y: Option<AxisRange>, z: Option<AxisRange>) -> Self {
        Self { x, y, z }
    }

    /// Compute the extent from coordinate values of each axis.
    ///
    /// The slices may be 1D axes or flattened meshgrids; only the values
    /// matter.
    pub fn from_coords(x: &[f64], y: &[f64], z: &[f64]) -> Self {
        Self {
            x: AxisRange::from_values(x),
            y: AxisRange::from_values(y),
            z: AxisRange::from_values(z),
        }
    }

    /// Reorder into Unity's y-up convention by exchanging y and z.
    pub fn swap_yz(&self) -> Self {
        Self {
            x: self.x,
            y: self.z,
            z: self.y,
        }
    }

    /// True when no axis carries data.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }

    /// Smallest extent covering both extents, axis by axis.
    pub fn union(&self, other: &Extent3) -> Extent3 {
        fn merge(a: Option<AxisRange>, b: Option<AxisRange>) -> Option<AxisRange> {
            match (a, b) {
                (Some(a), Some(b)) => Some(a.union(&b)),
                (Some(a), None) => Some(a),
                (None, b) => b,
            }
        }

        Extent3 {
            x: merge(self.x, other.x),
            y: merge(self.y, other.y),
            z: merge(self.z, other.z),
        }
    }
}
