//! File names of exported geometry.

use std::fmt;

use serde::{Deserialize, Serialize};
use sidecar_common::{format_number, SidecarError, SidecarResult};

/// Extension appended to vector field component files.
pub const VECTOR_FIELD_EXTENSION: &str = "vf";

/// Mesh formats the isosurface exporter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshFormat {
    #[default]
    Dae,
    Obj,
}

impl MeshFormat {
    /// Parse a file type such as `"dae"`, `".OBJ"` or `"Obj"`.
    pub fn parse(s: &str) -> SidecarResult<Self> {
        let normalized = s.trim().to_lowercase().replace('.', "");
        match normalized.as_str() {
            "dae" => Ok(MeshFormat::Dae),
            "obj" => Ok(MeshFormat::Obj),
            _ => Err(SidecarError::UnsupportedFileType(s.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MeshFormat::Dae => "dae",
            MeshFormat::Obj => "obj",
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Name of the mesh file for one isosurface level, e.g. `20_reflectivity.dae`.
pub fn isosurface_file_name(level: f64, variable: &str, format: MeshFormat) -> String {
    format!("{}_{}.{}", format_number(level), variable, format.extension())
}

/// One component of a vector field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorComponent {
    X,
    Y,
    Z,
}

impl VectorComponent {
    /// Order in which component files are written.
    pub const WRITE_ORDER: [VectorComponent; 3] =
        [VectorComponent::Y, VectorComponent::Z, VectorComponent::X];

    pub fn axis(&self) -> &'static str {
        match self {
            VectorComponent::X => "x",
            VectorComponent::Y => "y",
            VectorComponent::Z => "z",
        }
    }

    /// File name of this component, e.g. `x_wind.vf`.
    pub fn file_name(&self, base: &str) -> String {
        format!("{}_{}", self.axis(), with_vf_extension(base))
    }
}

impl fmt::Display for VectorComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.axis())
    }
}

/// Component file names for a vector field, in write order.
pub fn vector_field_file_names(base: &str) -> Vec<String> {
    VectorComponent::WRITE_ORDER
        .iter()
        .map(|c| c.file_name(base))
        .collect()
}

fn with_vf_extension(base: &str) -> String {
    let suffix = format!(".{}", VECTOR_FIELD_EXTENSION);
    if base.to_lowercase().ends_with(&suffix) {
        base.to_string()
    } else {
        format!("{}{}", base, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_format_parse() {
        assert_eq!(MeshFormat::parse("dae").unwrap(), MeshFormat::Dae);
        assert_eq!(MeshFormat::parse(".OBJ").unwrap(), MeshFormat::Obj);
        assert_eq!(MeshFormat::parse(" Obj ").unwrap(), MeshFormat::Obj);
    }

    #[test]
    fn test_mesh_format_rejects_others() {
        let err = MeshFormat::parse("stl").unwrap_err();
        assert!(matches!(err, SidecarError::UnsupportedFileType(_)));
        assert!(err.to_string().contains("Only dae and obj"));
    }

    #[test]
    fn test_isosurface_file_name() {
        assert_eq!(
            isosurface_file_name(20.0, "reflectivity", MeshFormat::Dae),
            "20_reflectivity.dae"
        );
        assert_eq!(
            isosurface_file_name(27.5, "reflectivity", MeshFormat::Obj),
            "27.5_reflectivity.obj"
        );
        assert_eq!(isosurface_file_name(-10.0, "w", MeshFormat::Obj), "-10_w.obj");
    }

    #[test]
    fn test_vector_field_file_names() {
        assert_eq!(
            vector_field_file_names("wind"),
            vec!["y_wind.vf", "z_wind.vf", "x_wind.vf"]
        );
        assert_eq!(VectorComponent::X.file_name("wind.vf"), "x_wind.vf");
    }
}
