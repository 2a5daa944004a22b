//! Common types and utilities shared across the Unity export sidecar crates.

pub mod error;
pub mod extent;
pub mod grid;
pub mod radar;
pub mod time;

pub use error::{SidecarError, SidecarResult};
pub use extent::{AxisRange, AxisUnits, Extent3};
pub use grid::{GridType, GridWarning, RadarGrid};
pub use radar::RadarId;
pub use time::{format_timestamp, parse_timestamp, Provenance};

/// Render a number the way it appears in sidecar strings and file names.
///
/// Uses the shortest representation that round-trips, so `20.0` becomes
/// `"20"` and `27.5` stays `"27.5"`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    format!("{}", value)
}
