//! The sidecar document model.
//!
//! Field names follow the JSON layout consumed by the Unity importer,
//! including its mixed-case keys (`FILE_GENERATED`, `Date`, `Run_Time`).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use sidecar_common::{
    format_number, format_timestamp, parse_timestamp, AxisRange, AxisUnits, Extent3, GridType,
    Provenance, RadarId, SidecarError, SidecarResult,
};

/// Sentinel written for an axis without data.
pub const NOT_AVAILABLE: &str = "N/A";

/// Keys of a geometry section that are not file names.
pub const RESERVED_SECTION_KEYS: [&str; 5] = ["grid", "unity_dims", "smooth", "Date", "Run_Time"];

/// A single extent field: a value rendered as a string, or "N/A".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExtentValue {
    Value(String),
    NotAvailable,
}

impl ExtentValue {
    /// Wrap a string value, mapping the sentinel to `NotAvailable`.
    pub fn value(s: impl Into<String>) -> Self {
        let s = s.into();
        if s == NOT_AVAILABLE {
            ExtentValue::NotAvailable
        } else {
            ExtentValue::Value(s)
        }
    }

    /// Non-finite numbers have no meaningful extent and become "N/A".
    pub fn from_number(value: f64) -> Self {
        if value.is_finite() {
            ExtentValue::Value(format_number(value))
        } else {
            ExtentValue::NotAvailable
        }
    }

    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(ExtentValue::NotAvailable, ExtentValue::from_number)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExtentValue::Value(s) => s,
            ExtentValue::NotAvailable => NOT_AVAILABLE,
        }
    }

    /// Numeric value, if the field holds one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ExtentValue::Value(s) => s.trim().parse::<f64>().ok(),
            ExtentValue::NotAvailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ExtentValue::Value(_))
    }
}

impl fmt::Display for ExtentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<f64> for ExtentValue {
    fn from(value: f64) -> Self {
        ExtentValue::from_number(value)
    }
}

impl From<&str> for ExtentValue {
    fn from(value: &str) -> Self {
        ExtentValue::value(value)
    }
}

impl Serialize for ExtentValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ExtentValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExtentValueVisitor;

        impl<'de> Visitor<'de> for ExtentValueVisitor {
            type Value = ExtentValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, a number or \"N/A\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ExtentValue, E> {
                Ok(ExtentValue::value(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ExtentValue, E> {
                Ok(ExtentValue::value(v))
            }

            // Some producers write raw numbers; keep them as text.
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ExtentValue, E> {
                Ok(ExtentValue::from_number(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ExtentValue, E> {
                Ok(ExtentValue::Value(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ExtentValue, E> {
                Ok(ExtentValue::Value(v.to_string()))
            }
        }

        deserializer.deserialize_any(ExtentValueVisitor)
    }
}

/// Radar site the exported data was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarInfo {
    /// Four-character site identifier
    pub id: String,
    /// Degrees north
    pub latitude: f64,
    /// Degrees east
    pub longitude: f64,
    pub elevation: i64,
    pub elevation_units: String,
}

impl RadarInfo {
    /// Radar site with its elevation in meters.
    pub fn new(id: &RadarId, latitude: f64, longitude: f64, elevation: i64) -> Self {
        Self {
            id: id.to_string(),
            latitude,
            longitude,
            elevation,
            elevation_units: "m".to_string(),
        }
    }

    pub fn with_elevation_units(mut self, units: impl Into<String>) -> Self {
        self.elevation_units = units.into();
        self
    }
}

/// Extent record for one exported file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileExtent {
    pub x_min: ExtentValue,
    pub x_max: ExtentValue,
    pub x_coordinate_units: ExtentValue,
    pub y_min: ExtentValue,
    pub y_max: ExtentValue,
    pub y_coordinate_units: ExtentValue,
    pub z_min: ExtentValue,
    pub z_max: ExtentValue,
    pub z_coordinate_units: ExtentValue,

    // Isosurface entries only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isosurface_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isosurface_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
}

impl FileExtent {
    /// Build the record from a computed extent.
    ///
    /// Axes without data get "N/A" for the bounds and the units.
    pub fn from_extent(extent: &Extent3, units: &AxisUnits) -> Self {
        fn axis(range: Option<AxisRange>, units: &str) -> (ExtentValue, ExtentValue, ExtentValue) {
            match range {
                Some(r) => (
                    ExtentValue::from_number(r.min),
                    ExtentValue::from_number(r.max),
                    ExtentValue::value(units),
                ),
                None => (
                    ExtentValue::NotAvailable,
                    ExtentValue::NotAvailable,
                    ExtentValue::NotAvailable,
                ),
            }
        }

        let (x_min, x_max, x_coordinate_units) = axis(extent.x, &units.x);
        let (y_min, y_max, y_coordinate_units) = axis(extent.y, &units.y);
        let (z_min, z_max, z_coordinate_units) = axis(extent.z, &units.z);

        Self {
            x_min,
            x_max,
            x_coordinate_units,
            y_min,
            y_max,
            y_coordinate_units,
            z_min,
            z_max,
            z_coordinate_units,
            isosurface_units: None,
            isosurface_level: None,
            variable: None,
        }
    }

    /// Record with every axis marked "N/A".
    pub fn not_available() -> Self {
        Self::from_extent(&Extent3::default(), &AxisUnits::default())
    }

    /// Attach the isosurface description.
    pub fn with_isosurface(
        mut self,
        units: impl Into<String>,
        level: f64,
        variable: impl Into<String>,
    ) -> Self {
        self.isosurface_units = Some(units.into());
        self.isosurface_level = Some(format_number(level));
        self.variable = Some(variable.into());
        self
    }

    /// True when any isosurface-only field is present.
    pub fn has_isosurface_fields(&self) -> bool {
        self.isosurface_units.is_some() || self.isosurface_level.is_some() || self.variable.is_some()
    }

    /// (min, max, units) of each axis, in x, y, z order.
    pub fn axes(&self) -> [(&'static str, &ExtentValue, &ExtentValue, &ExtentValue); 3] {
        [
            ("x", &self.x_min, &self.x_max, &self.x_coordinate_units),
            ("y", &self.y_min, &self.y_max, &self.y_coordinate_units),
            ("z", &self.z_min, &self.z_max, &self.z_coordinate_units),
        ]
    }
}

/// Which geometry section a block of files belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Isosurface,
    VectorField,
}

impl SectionKind {
    /// JSON key of the section.
    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::Isosurface => "isosurface",
            SectionKind::VectorField => "vector_field",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Shared shape of the `isosurface` and `vector_field` sections.
///
/// File-name entries sit directly in the section object next to the fixed
/// keys, so a file can never be named like one of [`RESERVED_SECTION_KEYS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometrySection {
    pub grid: GridType,
    pub unity_dims: bool,
    /// Isosurface sections only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smooth: Option<bool>,
    /// Valid time for real-data exports
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Seconds into the run for idealized exports
    #[serde(rename = "Run_Time", default, skip_serializing_if = "Option::is_none")]
    pub run_time: Option<f64>,
    #[serde(flatten)]
    pub files: BTreeMap<String, FileExtent>,
}

impl GeometrySection {
    pub fn new(grid: GridType, unity_dims: bool, provenance: &Provenance) -> Self {
        Self {
            grid,
            unity_dims,
            smooth: None,
            date: provenance.date_string(),
            run_time: provenance.run_time(),
            files: BTreeMap::new(),
        }
    }

    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = Some(smooth);
        self
    }

    /// Add a file entry, refusing reserved or duplicate names.
    pub fn insert_file(&mut self, name: impl Into<String>, extent: FileExtent) -> SidecarResult<()> {
        let name = name.into();
        if name.is_empty() || RESERVED_SECTION_KEYS.contains(&name.as_str()) {
            return Err(SidecarError::invalid_parameter(
                "file name",
                format!("'{}' cannot be used as a file name in a sidecar section", name),
            ));
        }
        if self.files.contains_key(&name) {
            return Err(SidecarError::invalid_parameter(
                "file name",
                format!("'{}' is listed twice", name),
            ));
        }
        self.files.insert(name, extent);
        Ok(())
    }

    /// Recover the provenance recorded in the section.
    pub fn provenance(&self) -> SidecarResult<Provenance> {
        match (&self.date, self.run_time) {
            (Some(date), None) => Ok(Provenance::observed(parse_timestamp(date)?)),
            (None, Some(run_time)) => Provenance::idealized(run_time),
            (Some(_), Some(_)) => Err(SidecarError::InvalidTime(
                "both Date and Run_Time are present".to_string(),
            )),
            (None, None) => Err(SidecarError::MissingField("Date or Run_Time".to_string())),
        }
    }
}

/// The complete sidecar document.
///
/// Sections may be left out but not set to `null`, and unknown top-level
/// keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataDocument {
    #[serde(rename = "FILE_GENERATED")]
    pub file_generated: String,
    #[serde(
        default,
        deserialize_with = "present_section",
        skip_serializing_if = "Option::is_none"
    )]
    pub radar: Option<RadarInfo>,
    #[serde(
        default,
        deserialize_with = "present_section",
        skip_serializing_if = "Option::is_none"
    )]
    pub isosurface: Option<GeometrySection>,
    #[serde(
        default,
        deserialize_with = "present_section",
        skip_serializing_if = "Option::is_none"
    )]
    pub vector_field: Option<GeometrySection>,
}

/// Only called for keys that are present, so `null` is the one way to get `None`.
fn present_section<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<T>::deserialize(deserializer)? {
        Some(section) => Ok(Some(section)),
        None => Err(de::Error::custom(
            "section must be an object; leave the key out when there is no section",
        )),
    }
}

impl MetadataDocument {
    /// Empty document stamped with the given generation time.
    pub fn new(generated_at: &DateTime<Utc>) -> Self {
        Self {
            file_generated: format_timestamp(generated_at),
            radar: None,
            isosurface: None,
            vector_field: None,
        }
    }

    pub fn with_radar(mut self, radar: RadarInfo) -> Self {
        self.radar = Some(radar);
        self
    }

    pub fn with_isosurface(mut self, section: GeometrySection) -> Self {
        self.isosurface = Some(section);
        self
    }

    pub fn with_vector_field(mut self, section: GeometrySection) -> Self {
        self.vector_field = Some(section);
        self
    }

    pub fn generated_at(&self) -> SidecarResult<DateTime<Utc>> {
        parse_timestamp(&self.file_generated)
    }

    pub fn section(&self, kind: SectionKind) -> Option<&GeometrySection> {
        match kind {
            SectionKind::Isosurface => self.isosurface.as_ref(),
            SectionKind::VectorField => self.vector_field.as_ref(),
        }
    }

    pub fn section_mut(&mut self, kind: SectionKind) -> &mut Option<GeometrySection> {
        match kind {
            SectionKind::Isosurface => &mut self.isosurface,
            SectionKind::VectorField => &mut self.vector_field,
        }
    }

    /// Present geometry sections, isosurface first.
    pub fn sections(&self) -> impl Iterator<Item = (SectionKind, &GeometrySection)> {
        [SectionKind::Isosurface, SectionKind::VectorField]
            .into_iter()
            .filter_map(move |kind| self.section(kind).map(|s| (kind, s)))
    }

    /// Number of files described across all sections.
    pub fn file_count(&self) -> usize {
        self.sections().map(|(_, s)| s.files.len()).sum()
    }

    pub fn from_json(json: &str) -> SidecarResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> SidecarResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for MetadataDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generated: {} UTC", self.file_generated)?;
        match &self.radar {
            Some(radar) => writeln!(
                f,
                "Radar:     {} ({}, {}) elevation {} {}",
                radar.id, radar.latitude, radar.longitude, radar.elevation, radar.elevation_units
            )?,
            None => writeln!(f, "Radar:     none")?,
        }

        for (kind, section) in self.sections() {
            writeln!(f)?;
            write!(f, "[{}] grid={} unity_dims={}", kind, section.grid, section.unity_dims)?;
            if let Some(smooth) = section.smooth {
                write!(f, " smooth={}", smooth)?;
            }
            if let Some(date) = &section.date {
                write!(f, " Date={}", date)?;
            }
            if let Some(run_time) = section.run_time {
                write!(f, " Run_Time={}s", format_number(run_time))?;
            }
            writeln!(f)?;

            for (name, extent) in &section.files {
                write!(f, "  {}", name)?;
                for (axis, min, max, units) in extent.axes() {
                    write!(f, "  {}=[{}, {}] {}", axis, min, max, units)?;
                }
                if let (Some(level), Some(variable)) = (&extent.isosurface_level, &extent.variable) {
                    write!(
                        f,
                        "  {} {} {}",
                        variable,
                        level,
                        extent.isosurface_units.as_deref().unwrap_or(NOT_AVAILABLE)
                    )?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
