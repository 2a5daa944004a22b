//! Timestamp handling for sidecar documents.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{SidecarError, SidecarResult};

/// Format used for every timestamp written to a sidecar.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Naive layouts accepted when reading, tried in order after RFC 3339.
const NAIVE_FORMATS: &[&str] = &[
    TIMESTAMP_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    // NEXRAD archive file stamp, e.g. KMPX20100303_003000
    "%Y%m%d_%H%M%S",
];

/// Format a UTC time the way sidecars store it.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp written by this tool or by common producers.
///
/// Values without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> SidecarResult<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(SidecarError::InvalidTime(format!(
        "'{}' is not a recognised timestamp",
        s
    )))
}

/// Where the exported data came from.
///
/// Real radar data is tied to a calendar time; idealized simulation runs
/// only know how long the model had been running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Real observations valid at this time
    Observed(DateTime<Utc>),
    /// Idealized case, seconds since the start of the run
    Idealized { run_time_seconds: f64 },
}

impl Provenance {
    pub fn observed(time: DateTime<Utc>) -> Self {
        Provenance::Observed(time)
    }

    pub fn idealized(run_time_seconds: f64) -> SidecarResult<Self> {
        if !run_time_seconds.is_finite() || run_time_seconds < 0.0 {
            return Err(SidecarError::InvalidTime(format!(
                "run time must be a non-negative number of seconds, got {}",
                run_time_seconds
            )));
        }
        Ok(Provenance::Idealized { run_time_seconds })
    }

    /// `Date` value for real-data exports.
    pub fn date_string(&self) -> Option<String> {
        match self {
            Provenance::Observed(dt) => Some(format_timestamp(dt)),
            Provenance::Idealized { .. } => None,
        }
    }

    /// `Run_Time` value for idealized exports.
    pub fn run_time(&self) -> Option<f64> {
        match self {
            Provenance::Observed(_) => None,
            Provenance::Idealized { run_time_seconds } => Some(*run_time_seconds),
        }
    }

    pub fn is_real_data(&self) -> bool {
        matches!(self, Provenance::Observed(_))
    }
}
