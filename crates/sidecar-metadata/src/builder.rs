//! Assemble sidecar documents from export descriptions.
//!
//! Each export call of the geometry pipeline (one variable's isosurfaces,
//! one vector field) is described by an [`IsosurfaceExport`] or a
//! [`VectorFieldExport`]. [`SidecarBuilder`] collects them, derives the
//! file names and extents, and produces a validated [`MetadataDocument`].

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use sidecar_common::{
    format_number, AxisUnits, Extent3, GridType, Provenance, SidecarError, SidecarResult,
};
use tracing::{debug, info};

use crate::document::{FileExtent, GeometrySection, MetadataDocument, RadarInfo, SectionKind};
use crate::naming::{isosurface_file_name, vector_field_file_names, MeshFormat};
use crate::validation::ensure_valid;

/// One variable exported as isosurface meshes at several levels.
#[derive(Debug, Clone, PartialEq)]
pub struct IsosurfaceExport {
    pub variable: String,
    /// Units of the isosurface levels, e.g. `dBZ`
    pub units: String,
    pub levels: Vec<f64>,
    pub provenance: Provenance,
    pub grid: GridType,
    pub unity_dims: bool,
    pub smooth: bool,
    pub format: MeshFormat,
    /// Extent in data axis order (x east, y north, z up)
    pub extent: Extent3,
    pub coordinate_units: AxisUnits,
    /// Per-level extents overriding `extent`, keyed by rendered level
    level_extents: BTreeMap<String, Extent3>,
}

impl IsosurfaceExport {
    pub fn new(
        variable: impl Into<String>,
        units: impl Into<String>,
        levels: Vec<f64>,
        provenance: Provenance,
    ) -> Self {
        Self {
            variable: variable.into(),
            units: units.into(),
            levels,
            provenance,
            grid: GridType::Cartesian,
            unity_dims: false,
            smooth: false,
            format: MeshFormat::Dae,
            extent: Extent3::default(),
            coordinate_units: AxisUnits::default(),
            level_extents: BTreeMap::new(),
        }
    }

    pub fn with_grid(mut self, grid: GridType) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_unity_dims(mut self, unity_dims: bool) -> Self {
        self.unity_dims = unity_dims;
        self
    }

    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    pub fn with_format(mut self, format: MeshFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_extent(mut self, extent: Extent3) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_coordinate_units(mut self, units: AxisUnits) -> Self {
        self.coordinate_units = units;
        self
    }

    /// Record the extent of the mesh generated for one level.
    pub fn with_level_extent(mut self, level: f64, extent: Extent3) -> Self {
        self.level_extents.insert(format_number(level), extent);
        self
    }

    fn extent_for(&self, level: f64) -> &Extent3 {
        self.level_extents
            .get(&format_number(level))
            .unwrap_or(&self.extent)
    }

    fn check(&self) -> SidecarResult<()> {
        if self.variable.trim().is_empty() {
            return Err(SidecarError::MissingField("variable".to_string()));
        }
        if self.levels.is_empty() {
            return Err(SidecarError::invalid_parameter(
                "levels",
                format!("no isosurface levels given for '{}'", self.variable),
            ));
        }
        if let Some(bad) = self.levels.iter().find(|l| !l.is_finite()) {
            return Err(SidecarError::invalid_parameter(
                "levels",
                format!("{} is not a valid isosurface level", bad),
            ));
        }
        Ok(())
    }
}

/// One vector field exported as per-component `.vf` files.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFieldExport {
    /// Base file name, e.g. `wind` for `x_wind.vf`, `y_wind.vf`, `z_wind.vf`
    pub name: String,
    pub provenance: Provenance,
    pub grid: GridType,
    pub unity_dims: bool,
    pub extent: Extent3,
    pub coordinate_units: AxisUnits,
}

impl VectorFieldExport {
    pub fn new(name: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            name: name.into(),
            provenance,
            grid: GridType::Cartesian,
            unity_dims: false,
            extent: Extent3::default(),
            coordinate_units: AxisUnits::default(),
        }
    }

    pub fn with_grid(mut self, grid: GridType) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_unity_dims(mut self, unity_dims: bool) -> Self {
        self.unity_dims = unity_dims;
        self
    }

    pub fn with_extent(mut self, extent: Extent3) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_coordinate_units(mut self, units: AxisUnits) -> Self {
        self.coordinate_units = units;
        self
    }
}

/// Builds a [`MetadataDocument`] from export descriptions.
#[derive(Debug, Clone, Default)]
pub struct SidecarBuilder {
    generated_at: Option<DateTime<Utc>>,
    radar: Option<RadarInfo>,
    isosurfaces: Vec<IsosurfaceExport>,
    vector_fields: Vec<VectorFieldExport>,
}

impl SidecarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the generation time (defaults to now).
    pub fn generated_at(mut self, time: DateTime<Utc>) -> Self {
        self.generated_at = Some(time);
        self
    }

    pub fn radar(mut self, radar: RadarInfo) -> Self {
        self.radar = Some(radar);
        self
    }

    pub fn isosurface(mut self, export: IsosurfaceExport) -> Self {
        self.isosurfaces.push(export);
        self
    }

    pub fn vector_field(mut self, export: VectorFieldExport) -> Self {
        self.vector_fields.push(export);
        self
    }

    /// Assemble and validate the document.
    ///
    /// All isosurface exports share one section, so they must agree on the
    /// section-level settings. The same holds for vector fields.
    pub fn build(self) -> SidecarResult<MetadataDocument> {
        let generated_at = self.generated_at.unwrap_or_else(Utc::now);
        let mut doc = MetadataDocument::new(&generated_at);
        doc.radar = self.radar;

        for export in &self.isosurfaces {
            export.check()?;
            let header = GeometrySection::new(export.grid, export.unity_dims, &export.provenance)
                .with_smooth(export.smooth);
            let section = merge_section(&mut doc, SectionKind::Isosurface, header)?;

            let mut seen = HashSet::new();
            for &level in &export.levels {
                let name = isosurface_file_name(level, &export.variable, export.format);
                if !seen.insert(name.clone()) {
                    debug!(file = %name, "Skipping repeated isosurface level");
                    continue;
                }
                let extent = placed_extent(
                    export.extent_for(level),
                    &export.coordinate_units,
                    export.unity_dims,
                )
                .with_isosurface(&export.units, level, &export.variable);
                section.insert_file(name, extent)?;
            }
            debug!(
                variable = %export.variable,
                levels = seen.len(),
                format = %export.format,
                "Added isosurface export"
            );
        }

        for export in &self.vector_fields {
            if export.name.trim().is_empty() {
                return Err(SidecarError::MissingField("vector field name".to_string()));
            }
            let header = GeometrySection::new(export.grid, export.unity_dims, &export.provenance);
            let section = merge_section(&mut doc, SectionKind::VectorField, header)?;

            let extent = placed_extent(&export.extent, &export.coordinate_units, export.unity_dims);
            for name in vector_field_file_names(&export.name) {
                section.insert_file(name, extent.clone())?;
            }
            debug!(name = %export.name, "Added vector field export");
        }

        ensure_valid(&doc)?;

        info!(
            generated = %doc.file_generated,
            files = doc.file_count(),
            radar = doc.radar.as_ref().map(|r| r.id.as_str()).unwrap_or("none"),
            "Built sidecar document"
        );
        Ok(doc)
    }
}

/// Extent record in the axis order the files were written in.
fn placed_extent(extent: &Extent3, units: &AxisUnits, unity_dims: bool) -> FileExtent {
    if unity_dims {
        FileExtent::from_extent(&extent.swap_yz(), &units.swap_yz())
    } else {
        FileExtent::from_extent(extent, units)
    }
}

/// Get the section of `kind`, creating it from `header` or checking that
/// the existing one has the same settings.
fn merge_section<'a>(
    doc: &'a mut MetadataDocument,
    kind: SectionKind,
    header: GeometrySection,
) -> SidecarResult<&'a mut GeometrySection> {
    let slot = doc.section_mut(kind);
    if let Some(existing) = slot.as_ref() {
        let same = existing.grid == header.grid
            && existing.unity_dims == header.unity_dims
            && existing.smooth == header.smooth
            && existing.date == header.date
            && existing.run_time == header.run_time;
        if !same {
            return Err(SidecarError::invalid_parameter(
                kind.key(),
                "exports written to the same section must share grid, unity_dims, smooth and time",
            ));
        }
    }
    Ok(slot.get_or_insert(header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sidecar_common::{AxisRange, RadarGrid, RadarId};

    fn valid_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2010, 3, 3, 0, 30, 0).unwrap()
    }

    fn generated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 10, 18, 0, 0).unwrap()
    }

    fn reflectivity() -> IsosurfaceExport {
        IsosurfaceExport::new(
            "reflectivity",
            "dBZ",
            vec![20.0, 40.0],
            Provenance::observed(valid_time()),
        )
        .with_extent(RadarGrid::default().extent())
    }

    #[test]
    fn test_isosurface_files() {
        let doc = SidecarBuilder::new()
            .generated_at(generated())
            .isosurface(reflectivity())
            .build()
            .unwrap();

        assert_eq!(doc.file_generated, "2024-02-10 18:00:00");
        let section = doc.isosurface.as_ref().unwrap();
        assert_eq!(section.smooth, Some(false));
        assert_eq!(section.date.as_deref(), Some("2010-03-03 00:30:00"));
        assert!(section.run_time.is_none());

        let file = &section.files["40_reflectivity.dae"];
        assert_eq!(file.isosurface_level.as_deref(), Some("40"));
        assert_eq!(file.variable.as_deref(), Some("reflectivity"));
        assert_eq!(file.x_min.as_str(), "-100000");
        assert_eq!(file.z_max.as_str(), "20000");
        assert!(doc.vector_field.is_none());
        assert!(doc.radar.is_none());
    }

    #[test]
    fn test_unity_dims_swaps_y_and_z() {
        let doc = SidecarBuilder::new()
            .isosurface(
                reflectivity()
                    .with_unity_dims(true)
                    .with_coordinate_units(AxisUnits::new("m", "m", "km")),
            )
            .build()
            .unwrap();
        let file = &doc.isosurface.unwrap().files["20_reflectivity.dae"];
        assert_eq!(file.y_min.as_str(), "0");
        assert_eq!(file.y_max.as_str(), "20000");
        assert_eq!(file.y_coordinate_units.as_str(), "km");
        assert_eq!(file.z_min.as_str(), "-100000");
    }

    #[test]
    fn test_vector_field_files() {
        let run = Provenance::idealized(5400.0).unwrap();
        let doc = SidecarBuilder::new()
            .vector_field(VectorFieldExport::new("wind", run).with_extent(Extent3::new(
                Some(AxisRange::new(0.0, 10.0)),
                None,
                None,
            )))
            .build()
            .unwrap();

        let section = doc.vector_field.unwrap();
        assert_eq!(section.run_time, Some(5400.0));
        assert!(section.smooth.is_none());
        let names: Vec<_> = section.files.keys().cloned().collect();
        assert_eq!(names, vec!["x_wind.vf", "y_wind.vf", "z_wind.vf"]);
        assert_eq!(section.files["y_wind.vf"].y_min.as_str(), "N/A");
        assert!(!section.files["x_wind.vf"].has_isosurface_fields());
    }

    #[test]
    fn test_exports_share_section() {
        let velocity = IsosurfaceExport::new(
            "velocity",
            "m/s",
            vec![-10.0, 10.0],
            Provenance::observed(valid_time()),
        );
        let doc = SidecarBuilder::new()
            .isosurface(reflectivity())
            .isosurface(velocity)
            .build()
            .unwrap();
        assert_eq!(doc.isosurface.unwrap().files.len(), 4);
    }

    #[test]
    fn test_conflicting_sections() {
        let result = SidecarBuilder::new()
            .isosurface(reflectivity())
            .isosurface(reflectivity().with_smooth(true))
            .build();
        assert!(matches!(
            result,
            Err(SidecarError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_repeated_levels_collapse() {
        let mut export = reflectivity();
        export.levels = vec![20.0, 20.0, 40.0];
        let doc = SidecarBuilder::new().isosurface(export).build().unwrap();
        assert_eq!(doc.isosurface.unwrap().files.len(), 2);
    }

    #[test]
    fn test_level_extent_override() {
        let export = reflectivity().with_level_extent(
            40.0,
            Extent3::new(
                Some(AxisRange::new(-5.0, 5.0)),
                Some(AxisRange::new(-5.0, 5.0)),
                Some(AxisRange::new(1000.0, 9000.0)),
            ),
        );
        let doc = SidecarBuilder::new().isosurface(export).build().unwrap();
        let files = doc.isosurface.unwrap().files;
        assert_eq!(files["40_reflectivity.dae"].z_max.as_str(), "9000");
        assert_eq!(files["20_reflectivity.dae"].z_max.as_str(), "20000");
    }

    #[test]
    fn test_build_errors() {
        let mut no_levels = reflectivity();
        no_levels.levels.clear();
        assert!(SidecarBuilder::new().isosurface(no_levels).build().is_err());

        let mut no_variable = reflectivity();
        no_variable.variable = " ".into();
        assert!(matches!(
            SidecarBuilder::new().isosurface(no_variable).build(),
            Err(SidecarError::MissingField(_))
        ));
    }

    #[test]
    fn test_invalid_radar_fails_validation() {
        let id = RadarId::new("kmpx").unwrap();
        let radar = RadarInfo::new(&id, 95.0, -93.5, 288);
        let result = SidecarBuilder::new()
            .radar(radar)
            .isosurface(reflectivity())
            .build();
        assert!(matches!(result, Err(SidecarError::InvalidDocument { .. })));
    }

    #[test]
    fn test_radar_recorded() {
        let id = RadarId::new("kmpx").unwrap();
        let doc = SidecarBuilder::new()
            .radar(RadarInfo::new(&id, 44.84889, -93.56551, 288))
            .isosurface(reflectivity())
            .build()
            .unwrap();
        let radar = doc.radar.unwrap();
        assert_eq!(radar.id, "KMPX");
        assert_eq!(radar.elevation_units, "m");
    }
}
