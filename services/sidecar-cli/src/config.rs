//! Export description loader.
//!
//! An export description is a YAML file listing what a geometry export run
//! produced: the radar site, the data time, the grid and the isosurface and
//! vector field files. It is turned into a [`SidecarBuilder`].
//!
//! Supports environment variable substitution using ${VAR} syntax.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use sidecar_common::{
    parse_timestamp, AxisRange, AxisUnits, Extent3, GridType, Provenance, RadarGrid, RadarId,
};
use sidecar_metadata::levels::inclusive_range;
use sidecar_metadata::{
    IsosurfaceExport, MeshFormat, RadarInfo, SidecarBuilder, VectorFieldExport, SIDECAR_FILE_NAME,
};

// ============================================================================
// Export Description (export.yaml)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the geometry files were written to
    pub output_dir: Option<String>,
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Fixed generation time, mostly for reproducible output
    pub generated_at: Option<String>,
    pub radar: Option<RadarConfig>,
    pub time: TimeConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub isosurfaces: Vec<IsosurfaceConfig>,
    #[serde(default)]
    pub vector_fields: Vec<VectorFieldConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarConfig {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: i64,
    #[serde(default = "default_elevation_units")]
    pub elevation_units: String,
}

/// Either the valid time of real data or the run time of an idealized case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeConfig {
    pub date: Option<String>,
    pub run_time: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(rename = "type", default = "default_grid_type")]
    pub grid_type: String,
    #[serde(default)]
    pub unity_dims: bool,
    /// Meters
    #[serde(default = "default_horizontal_resolution")]
    pub horizontal_resolution: f64,
    /// Meters
    #[serde(default = "default_vertical_resolution")]
    pub vertical_resolution: f64,
    /// Kilometers from the radar
    #[serde(default = "default_horizontal_bounds")]
    pub x: [f64; 2],
    #[serde(default = "default_horizontal_bounds")]
    pub y: [f64; 2],
    #[serde(default = "default_vertical_bounds")]
    pub z: [f64; 2],
    /// Explicit extent, used instead of the radar grid when present
    pub extent: Option<ExtentConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtentConfig {
    pub x: Option<[f64; 2]>,
    pub y: Option<[f64; 2]>,
    pub z: Option<[f64; 2]>,
    pub units: Option<UnitsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitsConfig {
    pub x: String,
    pub y: String,
    pub z: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsosurfaceConfig {
    pub variable: String,
    pub units: String,
    #[serde(default)]
    pub levels: Vec<f64>,
    pub level_range: Option<LevelRangeConfig>,
    #[serde(default = "default_file_type")]
    pub file_type: String,
    #[serde(default)]
    pub smooth: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelRangeConfig {
    pub lowest: f64,
    pub highest: f64,
    pub step: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorFieldConfig {
    pub name: String,
}

fn default_file_name() -> String {
    SIDECAR_FILE_NAME.to_string()
}

fn default_elevation_units() -> String {
    "m".to_string()
}

fn default_grid_type() -> String {
    "cartesian".to_string()
}

fn default_horizontal_resolution() -> f64 {
    1000.0
}

fn default_vertical_resolution() -> f64 {
    500.0
}

fn default_horizontal_bounds() -> [f64; 2] {
    [-100.0, 100.0]
}

fn default_vertical_bounds() -> [f64; 2] {
    [0.0, 20.0]
}

fn default_file_type() -> String {
    "dae".to_string()
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_type: default_grid_type(),
            unity_dims: false,
            horizontal_resolution: default_horizontal_resolution(),
            vertical_resolution: default_vertical_resolution(),
            x: default_horizontal_bounds(),
            y: default_horizontal_bounds(),
            z: default_vertical_bounds(),
            extent: None,
        }
    }
}

// ============================================================================
// Loading Functions
// ============================================================================

/// Load and parse an export description with environment variable substitution
pub fn load_export_config<P: AsRef<Path>>(path: P) -> Result<ExportConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read export config from {:?}", path.as_ref()))?;

    parse_export_config(&content)
        .with_context(|| format!("Invalid export config {:?}", path.as_ref()))
}

/// Parse and validate export description YAML
pub fn parse_export_config(content: &str) -> Result<ExportConfig> {
    let expanded = expand_env_vars(content)?;

    let config: ExportConfig =
        serde_yaml::from_str(&expanded).with_context(|| "Failed to parse export config YAML")?;

    validate_export_config(&config)?;

    Ok(config)
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` references in YAML content.
///
/// An empty variable counts as unset, so its default applies. A reference
/// with neither a value nor a default is an error.
fn expand_env_vars(content: &str) -> Result<String> {
    let expanded = shellexpand::env_with_context(content, |name: &str| {
        match std::env::var(name) {
            Ok(value) if !value.is_empty() => Ok(Some(value)),
            Ok(_) | Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .context("Failed to expand environment variables")?;

    // Unresolved references are left in place
    if let Some(start) = expanded.find("${") {
        let reference = &expanded[start + 2..];
        match reference.find('}') {
            Some(end) => anyhow::bail!("Environment variable {} not set", &reference[..end]),
            None => anyhow::bail!("Unclosed variable substitution: {}", &expanded[start..]),
        }
    }

    Ok(expanded.into_owned())
}

// ============================================================================
// Validation
// ============================================================================

fn validate_export_config(config: &ExportConfig) -> Result<()> {
    anyhow::ensure!(
        !config.isosurfaces.is_empty() || !config.vector_fields.is_empty(),
        "Export must list at least one isosurface or vector field"
    );

    anyhow::ensure!(
        config.time.date.is_some() != config.time.run_time.is_some(),
        "time must set exactly one of date or run_time"
    );
    if let Some(date) = &config.time.date {
        parse_timestamp(date)?;
    }
    if let Some(generated_at) = &config.generated_at {
        parse_timestamp(generated_at)?;
    }

    if let Some(radar) = &config.radar {
        RadarId::new(&radar.id)?;
    }

    GridType::parse(&config.grid.grid_type)?;

    for iso in &config.isosurfaces {
        anyhow::ensure!(
            !iso.variable.trim().is_empty(),
            "Isosurface variable cannot be empty"
        );
        anyhow::ensure!(
            !iso.levels.is_empty() || iso.level_range.is_some(),
            "Isosurfaces of {} need levels or a level_range",
            iso.variable
        );
        MeshFormat::parse(&iso.file_type)?;
    }

    for vf in &config.vector_fields {
        anyhow::ensure!(!vf.name.trim().is_empty(), "Vector field name cannot be empty");
    }

    anyhow::ensure!(
        !config.file_name.trim().is_empty() && !config.file_name.contains(['/', '\\']),
        "file_name must be a plain file name, got {:?}",
        config.file_name
    );

    Ok(())
}

// ============================================================================
// Conversion to Export Descriptions
// ============================================================================

impl ExportConfig {
    pub fn provenance(&self) -> Result<Provenance> {
        match (&self.time.date, self.time.run_time) {
            (Some(date), None) => Ok(Provenance::observed(parse_timestamp(date)?)),
            (None, Some(run_time)) => Ok(Provenance::idealized(run_time)?),
            _ => anyhow::bail!("time must set exactly one of date or run_time"),
        }
    }

    pub fn grid_type(&self) -> Result<GridType> {
        Ok(GridType::parse(&self.grid.grid_type)?)
    }

    /// The radar-centred grid described by the `grid` block.
    pub fn radar_grid(&self) -> RadarGrid {
        let g = &self.grid;
        RadarGrid::from_km(
            g.horizontal_resolution,
            g.vertical_resolution,
            (g.x[0], g.x[1]),
            (g.y[0], g.y[1]),
            (g.z[0], g.z[1]),
        )
    }

    /// Extent and coordinate units of the exported files.
    ///
    /// An explicit `extent` wins; otherwise the radar grid is checked and
    /// its point coordinates give the extent in meters.
    pub fn extent(&self) -> Result<(Extent3, AxisUnits)> {
        let grid_type = self.grid_type()?;
        if let Some(extent) = &self.grid.extent {
            let range = |bounds: Option<[f64; 2]>| bounds.map(|[a, b]| AxisRange::new(a, b));
            let units = match &extent.units {
                Some(u) => AxisUnits::new(&u.x, &u.y, &u.z),
                None if grid_type == GridType::LatLon => AxisUnits::geographic(),
                None => AxisUnits::default(),
            };
            return Ok((
                Extent3::new(range(extent.x), range(extent.y), range(extent.z)),
                units,
            ));
        }

        let grid = self.radar_grid();
        grid.validate()?;
        Ok((grid.extent(), AxisUnits::default()))
    }

    /// Build the sidecar builder for every export listed.
    pub fn to_builder(&self) -> Result<SidecarBuilder> {
        let provenance = self.provenance()?;
        let grid_type = self.grid_type()?;
        let (extent, units) = self.extent()?;

        let mut builder = SidecarBuilder::new();
        if let Some(generated_at) = &self.generated_at {
            builder = builder.generated_at(parse_timestamp(generated_at)?);
        }
        if let Some(radar) = &self.radar {
            let id = RadarId::new(&radar.id)?;
            builder = builder.radar(
                RadarInfo::new(&id, radar.latitude, radar.longitude, radar.elevation)
                    .with_elevation_units(&radar.elevation_units),
            );
        }

        for iso in &self.isosurfaces {
            let mut levels = iso.levels.clone();
            if let Some(range) = &iso.level_range {
                levels.extend(inclusive_range(range.lowest, range.highest, range.step)?);
            }
            builder = builder.isosurface(
                IsosurfaceExport::new(&iso.variable, &iso.units, levels, provenance)
                    .with_grid(grid_type)
                    .with_unity_dims(self.grid.unity_dims)
                    .with_smooth(iso.smooth)
                    .with_format(MeshFormat::parse(&iso.file_type)?)
                    .with_extent(extent)
                    .with_coordinate_units(units.clone()),
            );
        }

        for vf in &self.vector_fields {
            builder = builder.vector_field(
                VectorFieldExport::new(&vf.name, provenance)
                    .with_grid(grid_type)
                    .with_unity_dims(self.grid.unity_dims)
                    .with_extent(extent)
                    .with_coordinate_units(units.clone()),
            );
        }

        Ok(builder)
    }

    /// Directory the sidecar is written to: the override, the configured
    /// `output_dir` (with `~` expanded), or the current directory.
    pub fn output_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        match &self.output_dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).into_owned()),
            None => PathBuf::from("."),
        }
    }
}
