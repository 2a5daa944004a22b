//! Document validation.
//!
//! Validation never stops at the first problem: every issue is collected in
//! a [`ValidationReport`] with the location it was found at, so a user can
//! fix a hand-edited sidecar in one pass.

use std::fmt;

use serde::Serialize;
use sidecar_common::{parse_timestamp, RadarId, SidecarError, SidecarResult};
use tracing::{debug, warn};

use crate::document::{
    FileExtent, GeometrySection, MetadataDocument, RadarInfo, SectionKind, RESERVED_SECTION_KEYS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A single problem found in a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Dotted path to the offending key, e.g. `isosurface.20_reflectivity.dae.x_min`
    pub location: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.severity, self.location, self.message)
    }
}

/// Every issue found in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    fn error(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity: Severity::Error,
            location: location.into(),
            message: message.into(),
        });
    }

    fn warning(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity: Severity::Warning,
            location: location.into(),
            message: message.into(),
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{}", issue)?;
        }
        Ok(())
    }
}

/// Check a document against every rule and collect the issues.
pub fn validate_document(doc: &MetadataDocument) -> ValidationReport {
    let mut report = ValidationReport::default();

    let generated = match parse_timestamp(&doc.file_generated) {
        Ok(t) => Some(t),
        Err(e) => {
            report.error("FILE_GENERATED", e.to_string());
            None
        }
    };

    if let Some(radar) = &doc.radar {
        check_radar(radar, &mut report);
    }

    for (kind, section) in doc.sections() {
        check_section(kind, section, generated, &mut report);
    }

    debug!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "Validated sidecar document"
    );
    report
}

/// Validate and fail on the first error.
///
/// Warnings are logged and returned in the report.
pub fn ensure_valid(doc: &MetadataDocument) -> SidecarResult<ValidationReport> {
    let report = validate_document(doc);
    if let Some(issue) = report.errors().next() {
        return Err(SidecarError::invalid_document(
            issue.location.clone(),
            issue.message.clone(),
        ));
    }
    for issue in report.warnings() {
        warn!(location = %issue.location, "{}", issue.message);
    }
    Ok(report)
}

fn check_radar(radar: &RadarInfo, report: &mut ValidationReport) {
    let id_ok = radar.id.len() == 4 && radar.id.chars().all(|c| c.is_ascii_alphanumeric());
    if !id_ok {
        report.error(
            "radar.id",
            format!("'{}' is not a 4-character radar identifier", radar.id),
        );
    } else if RadarId::new(&radar.id).map(|id| id.as_str() != radar.id).unwrap_or(true) {
        report.warning("radar.id", format!("'{}' is not upper case", radar.id));
    }

    if !(-90.0..=90.0).contains(&radar.latitude) {
        report.error(
            "radar.latitude",
            format!("{} is outside [-90, 90]", radar.latitude),
        );
    }
    if !(-180.0..=180.0).contains(&radar.longitude) {
        report.error(
            "radar.longitude",
            format!("{} is outside [-180, 180]", radar.longitude),
        );
    }
    if radar.elevation_units.trim().is_empty() {
        report.error("radar.elevation_units", "must not be empty");
    }
}

fn check_section(
    kind: SectionKind,
    section: &GeometrySection,
    generated: Option<chrono::DateTime<chrono::Utc>>,
    report: &mut ValidationReport,
) {
    let base = kind.key();

    match (&section.date, section.run_time) {
        (Some(_), Some(_)) => report.error(base, "both Date and Run_Time are present"),
        (None, None) => report.error(base, "one of Date or Run_Time is required"),
        (Some(date), None) => match parse_timestamp(date) {
            Ok(date) => {
                if let Some(generated) = generated {
                    if date > generated {
                        report.warning(
                            format!("{}.Date", base),
                            "data time is after FILE_GENERATED",
                        );
                    }
                }
            }
            Err(e) => report.error(format!("{}.Date", base), e.to_string()),
        },
        (None, Some(run_time)) => {
            if !run_time.is_finite() || run_time < 0.0 {
                report.error(
                    format!("{}.Run_Time", base),
                    format!("{} is not a valid run time in seconds", run_time),
                );
            }
        }
    }

    match (kind, section.smooth) {
        (SectionKind::VectorField, Some(_)) => report.error(
            format!("{}.smooth", base),
            "smooth only applies to isosurfaces",
        ),
        (SectionKind::Isosurface, None) => report.error(format!("{}.smooth", base), "is required"),
        _ => {}
    }

    if section.files.is_empty() {
        report.warning(base, "section lists no files");
    }

    for (name, extent) in &section.files {
        let location = format!("{}.{}", base, name);
        if name.trim().is_empty() {
            report.error(&location, "file name is empty");
        } else if RESERVED_SECTION_KEYS.contains(&name.as_str()) {
            report.error(&location, format!("'{}' is a reserved key", name));
        }
        check_file_extent(kind, &location, extent, report);
    }
}

fn check_file_extent(
    kind: SectionKind,
    location: &str,
    extent: &FileExtent,
    report: &mut ValidationReport,
) {
    let iso_fields = [
        ("isosurface_units", &extent.isosurface_units),
        ("isosurface_level", &extent.isosurface_level),
        ("variable", &extent.variable),
    ];
    match kind {
        SectionKind::Isosurface => {
            for (field, value) in iso_fields {
                if value.is_none() {
                    report.error(format!("{}.{}", location, field), "is required");
                }
            }
        }
        SectionKind::VectorField => {
            for (field, value) in iso_fields {
                if value.is_some() {
                    report.error(
                        format!("{}.{}", location, field),
                        "only applies to isosurfaces",
                    );
                }
            }
        }
    }

    for (axis, min, max, units) in extent.axes() {
        if let (Some(lo), Some(hi)) = (min.as_f64(), max.as_f64()) {
            if lo > hi {
                report.error(
                    format!("{}.{}_min", location, axis),
                    format!("{}_min {} is greater than {}_max {}", axis, lo, axis, hi),
                );
            }
            if !units.is_available() {
                report.warning(
                    format!("{}.{}_coordinate_units", location, axis),
                    "axis has bounds but no units",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ExtentValue, FileExtent};
    use sidecar_common::{AxisRange, AxisUnits, Extent3, GridType, Provenance};

    fn extent() -> FileExtent {
        let e = Extent3::new(
            Some(AxisRange::new(-1.0, 1.0)),
            Some(AxisRange::new(0.0, 2.0)),
            Some(AxisRange::new(-1.0, 1.0)),
        );
        FileExtent::from_extent(&e, &AxisUnits::default())
    }

    fn valid_doc() -> MetadataDocument {
        let generated = parse_timestamp("2024-01-01 12:00:00").unwrap();
        let valid = parse_timestamp("2024-01-01 11:00:00").unwrap();
        let mut iso = GeometrySection::new(GridType::Cartesian, true, &Provenance::observed(valid))
            .with_smooth(false);
        iso.insert_file(
            "20_reflectivity.dae",
            extent().with_isosurface("dBZ", 20.0, "reflectivity"),
        )
        .unwrap();
        MetadataDocument::new(&generated).with_isosurface(iso)
    }

    fn has_error_at(report: &ValidationReport, location: &str) -> bool {
        report.errors().any(|i| i.location == location)
    }

    #[test]
    fn test_valid_document() {
        let report = validate_document(&valid_doc());
        assert!(report.is_valid(), "{}", report);
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn test_bad_file_generated() {
        let mut doc = valid_doc();
        doc.file_generated = "yesterday".into();
        let report = validate_document(&doc);
        assert!(has_error_at(&report, "FILE_GENERATED"));
    }

    #[test]
    fn test_radar_checks() {
        let mut doc = valid_doc();
        doc.radar = Some(RadarInfo {
            id: "KMPXX".into(),
            latitude: 91.0,
            longitude: -181.0,
            elevation: 288,
            elevation_units: " ".into(),
        });
        let report = validate_document(&doc);
        assert_eq!(report.error_count(), 4);
        assert!(has_error_at(&report, "radar.id"));
        assert!(has_error_at(&report, "radar.latitude"));
        assert!(has_error_at(&report, "radar.longitude"));
        assert!(has_error_at(&report, "radar.elevation_units"));
    }

    #[test]
    fn test_both_provenance_fields() {
        let mut doc = valid_doc();
        doc.isosurface.as_mut().unwrap().run_time = Some(10.0);
        assert!(has_error_at(&validate_document(&doc), "isosurface"));

        let section = doc.isosurface.as_mut().unwrap();
        section.run_time = None;
        section.date = None;
        assert!(has_error_at(&validate_document(&doc), "isosurface"));
    }

    #[test]
    fn test_negative_run_time() {
        let mut doc = valid_doc();
        let section = doc.isosurface.as_mut().unwrap();
        section.date = None;
        section.run_time = Some(-1.0);
        assert!(has_error_at(&validate_document(&doc), "isosurface.Run_Time"));
    }

    #[test]
    fn test_future_date_is_warning() {
        let mut doc = valid_doc();
        doc.isosurface.as_mut().unwrap().date = Some("2030-01-01 00:00:00".into());
        let report = validate_document(&doc);
        assert!(report.is_valid());
        assert!(report.warnings().any(|i| i.location == "isosurface.Date"));
    }

    #[test]
    fn test_smooth_rules() {
        let mut doc = valid_doc();
        doc.isosurface.as_mut().unwrap().smooth = None;
        assert!(has_error_at(&validate_document(&doc), "isosurface.smooth"));

        let mut doc = valid_doc();
        let mut vf = doc.isosurface.clone().unwrap();
        vf.files.clear();
        vf.insert_file("x_wind.vf", extent()).unwrap();
        doc.vector_field = Some(vf);
        assert!(has_error_at(&validate_document(&doc), "vector_field.smooth"));
    }

    #[test]
    fn test_iso_fields_per_section() {
        let mut doc = valid_doc();
        let section = doc.isosurface.as_mut().unwrap();
        section.files.insert("bare.dae".into(), extent());
        let report = validate_document(&doc);
        assert!(has_error_at(&report, "isosurface.bare.dae.variable"));

        let mut doc = valid_doc();
        let mut vf = doc.isosurface.clone().unwrap();
        vf.smooth = None;
        doc.vector_field = Some(vf);
        let report = validate_document(&doc);
        assert!(has_error_at(
            &report,
            "vector_field.20_reflectivity.dae.isosurface_level"
        ));
    }

    #[test]
    fn test_unparseable_section_date() {
        let mut doc = valid_doc();
        doc.isosurface.as_mut().unwrap().date = Some("last tuesday".into());
        let report = validate_document(&doc);
        assert!(!report.is_valid());
        assert!(has_error_at(&report, "isosurface.Date"));
    }

    #[test]
    fn test_empty_file_name() {
        let mut doc = valid_doc();
        doc.isosurface
            .as_mut()
            .unwrap()
            .files
            .insert(String::new(), extent().with_isosurface("dBZ", 30.0, "reflectivity"));
        let report = validate_document(&doc);
        assert_eq!(report.error_count(), 1);
        assert!(report
            .errors()
            .any(|i| i.location == "isosurface." && i.message == "file name is empty"));
    }

    #[test]
    fn test_reserved_file_name() {
        let mut doc = valid_doc();
        doc.isosurface
            .as_mut()
            .unwrap()
            .files
            .insert("grid".into(), extent().with_isosurface("K", 1.0, "t"));
        assert!(has_error_at(&validate_document(&doc), "isosurface.grid"));
    }

    #[test]
    fn test_inverted_bounds() {
        let mut doc = valid_doc();
        let file = doc
            .isosurface
            .as_mut()
            .unwrap()
            .files
            .get_mut("20_reflectivity.dae")
            .unwrap();
        file.y_min = ExtentValue::value("5");
        file.y_max = ExtentValue::value("1");
        assert!(has_error_at(
            &validate_document(&doc),
            "isosurface.20_reflectivity.dae.y_min"
        ));
    }

    #[test]
    fn test_missing_units_warning() {
        let mut doc = valid_doc();
        let file = doc
            .isosurface
            .as_mut()
            .unwrap()
            .files
            .get_mut("20_reflectivity.dae")
            .unwrap();
        file.z_coordinate_units = ExtentValue::NotAvailable;
        let report = validate_document(&doc);
        assert!(report.is_valid());
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_empty_section_warning() {
        let mut doc = valid_doc();
        doc.isosurface.as_mut().unwrap().files.clear();
        let report = validate_document(&doc);
        assert!(report.is_valid());
        assert!(report.warnings().any(|i| i.location == "isosurface"));
    }

    #[test]
    fn test_ensure_valid_returns_first_error() {
        let mut doc = valid_doc();
        doc.file_generated = "bad".into();
        let err = ensure_valid(&doc).unwrap_err();
        match err {
            SidecarError::InvalidDocument { location, .. } => assert_eq!(location, "FILE_GENERATED"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
