//! Metadata sidecars for Unity geometry exports.
//!
//! A sidecar is a small JSON document written next to exported isosurface
//! meshes (`.dae`/`.obj`) and vector field files (`.vf`). It records when
//! the files were generated, which radar (if any) the data came from, and
//! the spatial extent of every exported file so a Unity scene can place
//! them.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use sidecar_common::{Provenance, RadarGrid};
//! use sidecar_metadata::{IsosurfaceExport, SidecarBuilder};
//!
//! let valid = Utc.with_ymd_and_hms(2010, 3, 3, 0, 30, 0).unwrap();
//! let export = IsosurfaceExport::new("reflectivity", "dBZ", vec![20.0, 40.0], Provenance::observed(valid))
//!     .with_extent(RadarGrid::default().extent());
//!
//! let doc = SidecarBuilder::new().isosurface(export).build().unwrap();
//! assert_eq!(doc.isosurface.unwrap().files.len(), 2);
//! ```

pub mod builder;
pub mod document;
pub mod io;
pub mod levels;
pub mod naming;
pub mod validation;

pub use builder::{IsosurfaceExport, SidecarBuilder, VectorFieldExport};
pub use document::{
    ExtentValue, FileExtent, GeometrySection, MetadataDocument, RadarInfo, SectionKind,
    NOT_AVAILABLE,
};
pub use io::{find_sidecars, read_sidecar, write_sidecar, write_sidecar_as, SIDECAR_FILE_NAME};
pub use naming::{MeshFormat, VectorComponent};
pub use validation::{ensure_valid, validate_document, Severity, ValidationIssue, ValidationReport};
