//! Grid specifications for radar-centred exports.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{format_number, AxisRange, Extent3, SidecarError, SidecarResult};

/// Maximum useful range of a NEXRAD radar in meters.
pub const NEXRAD_MAX_RANGE_M: f64 = 230_000.0;

/// Native gate spacing of NEXRAD in meters.
pub const NEXRAD_GATE_SPACING_M: f64 = 250.0;

/// Horizontal resolution (m) above which features may be lost.
pub const COARSE_HORIZONTAL_RESOLUTION_M: f64 = 10_000.0;

/// Vertical resolution (m) above which features may be lost.
pub const COARSE_VERTICAL_RESOLUTION_M: f64 = 2_000.0;

/// Largest number of grid points a grid may have.
pub const MAX_GRID_POINTS: usize = 500_000_000;

/// Coordinate system the exported geometry was generated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    #[default]
    Cartesian,
    LatLon,
}

impl GridType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GridType::Cartesian => "cartesian",
            GridType::LatLon => "latlon",
        }
    }

    pub fn parse(s: &str) -> SidecarResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "cartesian" => Ok(GridType::Cartesian),
            "latlon" | "lat_lon" | "geographic" => Ok(GridType::LatLon),
            other => Err(SidecarError::invalid_parameter(
                "grid",
                format!("'{}' is not a grid type (expected cartesian or latlon)", other),
            )),
        }
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal problems found while checking a grid.
#[derive(Debug, Clone, PartialEq)]
pub enum GridWarning {
    /// An horizontal bound lies beyond the radar's range.
    BeyondRadarRange { bound: &'static str, meters: f64 },
    /// Horizontal resolution finer than the radar can resolve.
    BelowGateSpacing { meters: f64 },
    /// Horizontal resolution so coarse that features may be missing.
    CoarseHorizontal { meters: f64 },
    /// Vertical resolution so coarse that features may be missing.
    CoarseVertical { meters: f64 },
}

impl fmt::Display for GridWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridWarning::BeyondRadarRange { bound, meters } => write!(
                f,
                "{} ({} km) is beyond the maximum range of NEXRAD ({} km)",
                bound,
                format_number(meters / 1000.0),
                format_number(NEXRAD_MAX_RANGE_M / 1000.0)
            ),
            GridWarning::BelowGateSpacing { meters } => write!(
                f,
                "Horizontal resolution of {} meters is finer than the spatial resolution of NEXRAD ({} meters)",
                format_number(*meters),
                format_number(NEXRAD_GATE_SPACING_M)
            ),
            GridWarning::CoarseHorizontal { meters } => write!(
                f,
                "Horizontal resolution of {} meters is very coarse and features may be missing",
                format_number(*meters)
            ),
            GridWarning::CoarseVertical { meters } => write!(
                f,
                "Vertical resolution of {} meters is very coarse and features may be missing",
                format_number(*meters)
            ),
        }
    }
}

/// A regular Cartesian grid centred on a radar site.
///
/// Bounds are stored in meters relative to the radar; constructors that
/// take kilometers convert on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarGrid {
    /// Horizontal grid spacing in meters
    pub horizontal_resolution: f64,
    /// Vertical grid spacing in meters
    pub vertical_resolution: f64,
    pub x_start: f64,
    pub x_end: f64,
    pub y_start: f64,
    pub y_end: f64,
    pub z_start: f64,
    pub z_end: f64,
}

impl Default for RadarGrid {
    /// 200 km x 200 km box, 20 km deep, at 1 km / 500 m spacing.
    fn default() -> Self {
        Self::from_km(1000.0, 500.0, (-100.0, 100.0), (-100.0, 100.0), (0.0, 20.0))
    }
}

impl RadarGrid {
    /// Create a grid from resolutions in meters and axis bounds in kilometers.
    pub fn from_km(
        horizontal_resolution: f64,
        vertical_resolution: f64,
        x_km: (f64, f64),
        y_km: (f64, f64),
        z_km: (f64, f64),
    ) -> Self {
        Self {
            horizontal_resolution,
            vertical_resolution,
            x_start: x_km.0 * 1000.0,
            x_end: x_km.1 * 1000.0,
            y_start: y_km.0 * 1000.0,
            y_end: y_km.1 * 1000.0,
            z_start: z_km.0 * 1000.0,
            z_end: z_km.1 * 1000.0,
        }
    }

    /// Check the grid for impossible values and report questionable ones.
    ///
    /// Returns an error for inverted axes, a grid starting below ground, or
    /// non-positive resolutions. Everything else that looks suspicious is
    /// logged and returned as a warning.
    pub fn validate(&self) -> SidecarResult<Vec<GridWarning>> {
        let axes = [
            ("x", self.x_start, self.x_end),
            ("y", self.y_start, self.y_end),
            ("z", self.z_start, self.z_end),
        ];
        for (axis, start, end) in axes {
            if !start.is_finite() || !end.is_finite() {
                return Err(SidecarError::InvalidGrid(format!(
                    "the {} bounds must be finite numbers",
                    axis
                )));
            }
            if start > end {
                return Err(SidecarError::InvalidGrid(format!(
                    "the starting {} ({} km) cannot be greater than the ending {} ({} km)",
                    axis,
                    format_number(start / 1000.0),
                    axis,
                    format_number(end / 1000.0)
                )));
            }
        }

        if self.z_start < 0.0 {
            return Err(SidecarError::InvalidGrid(format!(
                "the starting z must not be negative; {} km is below ground",
                format_number(self.z_start / 1000.0)
            )));
        }

        if !(self.horizontal_resolution > 0.0) {
            return Err(SidecarError::InvalidGrid(format!(
                "a horizontal resolution of {} meters is not possible and must be greater than 0",
                format_number(self.horizontal_resolution)
            )));
        }
        if !(self.vertical_resolution > 0.0) {
            return Err(SidecarError::InvalidGrid(format!(
                "a vertical resolution of {} meters is not possible and must be greater than 0",
                format_number(self.vertical_resolution)
            )));
        }

        match self.point_count() {
            Some(n) if n <= MAX_GRID_POINTS => {}
            _ => {
                return Err(SidecarError::InvalidGrid(format!(
                    "{} m horizontal and {} m vertical resolution give more than {} grid points",
                    format_number(self.horizontal_resolution),
                    format_number(self.vertical_resolution),
                    MAX_GRID_POINTS
                )))
            }
        }

        let mut warnings = Vec::new();

        let bounds = [
            ("X start", self.x_start),
            ("X end", self.x_end),
            ("Y start", self.y_start),
            ("Y end", self.y_end),
        ];
        for (bound, meters) in bounds {
            if meters.abs() > NEXRAD_MAX_RANGE_M {
                warnings.push(GridWarning::BeyondRadarRange { bound, meters });
            }
        }

        if self.horizontal_resolution < NEXRAD_GATE_SPACING_M {
            warnings.push(GridWarning::BelowGateSpacing {
                meters: self.horizontal_resolution,
            });
        }
        if self.horizontal_resolution > COARSE_HORIZONTAL_RESOLUTION_M {
            warnings.push(GridWarning::CoarseHorizontal {
                meters: self.horizontal_resolution,
            });
        }
        if self.vertical_resolution > COARSE_VERTICAL_RESOLUTION_M {
            warnings.push(GridWarning::CoarseVertical {
                meters: self.vertical_resolution,
            });
        }

        for warning in &warnings {
            warn!(warning = %warning, "Questionable grid setting");
        }

        Ok(warnings)
    }

    /// Grid point coordinates along x, including the end bound.
    ///
    /// Empty when the axis has too many points to count.
    pub fn x_coords(&self) -> Vec<f64> {
        axis_coords(self.x_start, self.x_end, self.horizontal_resolution)
    }

    /// Grid point coordinates along y, including the end bound.
    pub fn y_coords(&self) -> Vec<f64> {
        axis_coords(self.y_start, self.y_end, self.horizontal_resolution)
    }

    /// Grid point coordinates along z, including the end bound.
    pub fn z_coords(&self) -> Vec<f64> {
        axis_coords(self.z_start, self.z_end, self.vertical_resolution)
    }

    /// Number of grid points as (z, y, x).
    ///
    /// An axis too long to count saturates at `usize::MAX`; such grids
    /// fail [`RadarGrid::validate`].
    pub fn shape(&self) -> (usize, usize, usize) {
        (
            axis_len(self.z_start, self.z_end, self.vertical_resolution).unwrap_or(usize::MAX),
            axis_len(self.y_start, self.y_end, self.horizontal_resolution).unwrap_or(usize::MAX),
            axis_len(self.x_start, self.x_end, self.horizontal_resolution).unwrap_or(usize::MAX),
        )
    }

    /// Total number of grid points, or `None` if it does not fit in `usize`.
    pub fn point_count(&self) -> Option<usize> {
        let nz = axis_len(self.z_start, self.z_end, self.vertical_resolution)?;
        let ny = axis_len(self.y_start, self.y_end, self.horizontal_resolution)?;
        let nx = axis_len(self.x_start, self.x_end, self.horizontal_resolution)?;
        nz.checked_mul(ny)?.checked_mul(nx)
    }

    /// Total number of grid points, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        self.point_count().unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spatial extent covered by the grid points, in meters.
    ///
    /// Computed from the bounds and spacing; no coordinates are generated.
    pub fn extent(&self) -> Extent3 {
        Extent3::new(
            axis_range(self.x_start, self.x_end, self.horizontal_resolution),
            axis_range(self.y_start, self.y_end, self.horizontal_resolution),
            axis_range(self.z_start, self.z_end, self.vertical_resolution),
        )
    }
}

impl fmt::Display for RadarGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Horizontal Resolution:  {} m", format_number(self.horizontal_resolution))?;
        writeln!(f, "Vertical Resolution:    {} m", format_number(self.vertical_resolution))?;
        writeln!(f)?;
        writeln!(f, "Left X or Starting X:   {} km", format_number(self.x_start / 1000.0))?;
        writeln!(f, "Right X or Ending X:    {} km", format_number(self.x_end / 1000.0))?;
        writeln!(f)?;
        writeln!(f, "Bottom Y or Starting Y: {} km", format_number(self.y_start / 1000.0))?;
        writeln!(f, "Top Y or Ending Y:      {} km", format_number(self.y_end / 1000.0))?;
        writeln!(f)?;
        writeln!(f, "Bottom Z or Starting Z: {} km", format_number(self.z_start / 1000.0))?;
        write!(f, "Top Z or Ending Z:      {} km", format_number(self.z_end / 1000.0))
    }
}

/// Index of the last grid point, as a float so huge axes cannot overflow.
fn last_index(start: f64, end: f64, step: f64) -> Option<f64> {
    if !(step > 0.0) || !(end >= start) {
        return None;
    }
    // Tolerate floating point noise so that the end bound is included
    Some(((end - start) / step + 1e-9).floor())
}

fn axis_len(start: f64, end: f64, step: f64) -> Option<usize> {
    match last_index(start, end, step) {
        None => Some(0),
        // usize::MAX as f64 rounds up, so stay strictly below it
        Some(last) if last.is_finite() && last < usize::MAX as f64 => (last as usize).checked_add(1),
        Some(_) => None,
    }
}

fn axis_range(start: f64, end: f64, step: f64) -> Option<AxisRange> {
    let last = last_index(start, end, step)?;
    let stop = if last.is_finite() { start + last * step } else { end };
    Some(AxisRange::new(start, stop))
}

fn axis_coords(start: f64, end: f64, step: f64) -> Vec<f64> {
    match axis_len(start, end, step) {
        Some(n) if n <= MAX_GRID_POINTS => (0..n).map(|i| start + i as f64 * step).collect(),
        _ => Vec::new(),
    }
}
