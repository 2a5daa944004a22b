//! Tests for the sidecar JSON layout against sample documents.

use serde_json::Value;
use sidecar_common::{parse_timestamp, AxisUnits, Extent3, GridType, Provenance, RadarGrid, RadarId};
use sidecar_metadata::levels::inclusive_range;
use sidecar_metadata::{
    validate_document, ExtentValue, IsosurfaceExport, MeshFormat, MetadataDocument, RadarInfo,
    SidecarBuilder, VectorFieldExport,
};
use test_utils::fixtures::{documents, isosurfaces, radars, time};
use test_utils::{assert_approx_eq, assert_json_keys, axis_values, meshgrid, with_nan_every};

// ============================================================================
// Parsing sample documents
// ============================================================================

#[test]
fn test_parse_radar_export() {
    let doc = MetadataDocument::from_json(documents::RADAR_EXPORT).unwrap();

    let radar = doc.radar.as_ref().unwrap();
    assert_eq!(radar.id, "KMPX");
    assert_approx_eq!(radar.latitude, 44.84889, 1e-9);
    assert_eq!(radar.elevation, 288);

    let iso = doc.isosurface.as_ref().unwrap();
    assert_eq!(iso.grid, GridType::Cartesian);
    assert!(iso.unity_dims);
    assert_eq!(iso.files.len(), 2);
    assert_eq!(iso.files["20_reflectivity.dae"].y_max.as_f64(), Some(20000.0));

    let vf = doc.vector_field.as_ref().unwrap();
    assert!(vf.smooth.is_none());
    assert!(vf.files.contains_key("x_velocity.vf"));
    assert_eq!(doc.file_count(), 3);

    assert!(validate_document(&doc).is_valid());
}

#[test]
fn test_parse_idealized_export() {
    let doc = MetadataDocument::from_json(documents::IDEALIZED_EXPORT).unwrap();
    assert!(doc.radar.is_none());
    assert!(doc.vector_field.is_none());

    let iso = doc.isosurface.as_ref().unwrap();
    assert_eq!(iso.grid, GridType::LatLon);
    assert_eq!(iso.run_time, Some(time::IDEALIZED_RUN_TIME));
    assert!(!iso.provenance().unwrap().is_real_data());

    let file = &iso.files["300_theta.obj"];
    assert_eq!(file.z_min, ExtentValue::NotAvailable);
    assert_eq!(file.x_min.as_f64(), Some(-100.5));

    let report = validate_document(&doc);
    assert!(report.is_valid(), "{}", report);
}

#[test]
fn test_minimal_document() {
    let doc = MetadataDocument::from_json(documents::MINIMAL).unwrap();
    assert_eq!(doc.sections().count(), 0);
    let report = validate_document(&doc);
    assert!(report.is_valid());
    assert!(report.issues.is_empty());
}

#[test]
fn test_conflicting_provenance_is_reported() {
    let doc = MetadataDocument::from_json(documents::CONFLICTING_PROVENANCE).unwrap();
    let report = validate_document(&doc);
    assert!(!report.is_valid());
    assert!(report.errors().any(|i| i.location == "vector_field"));
}

#[test]
fn test_numeric_extent_values_are_accepted() {
    let json = r#"{
        "FILE_GENERATED": "2024-01-15 12:00:00",
        "vector_field": {
            "grid": "cartesian",
            "unity_dims": false,
            "Run_Time": 0,
            "x_wind.vf": {
                "x_min": -5, "x_max": 5.5, "x_coordinate_units": "meter",
                "y_min": "N/A", "y_max": "N/A", "y_coordinate_units": "N/A",
                "z_min": 0, "z_max": 1000, "z_coordinate_units": "meter"
            }
        }
    }"#;
    let doc = MetadataDocument::from_json(json).unwrap();
    let file = &doc.vector_field.as_ref().unwrap().files["x_wind.vf"];
    assert_eq!(file.x_min.as_str(), "-5");
    assert_eq!(file.x_max.as_str(), "5.5");
    assert!(!file.y_min.is_available());

    // Written back as strings
    let value: Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();
    assert_eq!(value["vector_field"]["x_wind.vf"]["z_max"], "1000");
}

// ============================================================================
// Building documents
// ============================================================================

#[test]
fn test_radar_export_layout() {
    let (id, lat, lon, elevation) = radars::KMPX;
    let radar = RadarInfo::new(&RadarId::new(id).unwrap(), lat, lon, elevation);
    let valid = parse_timestamp(time::RADAR_VALID).unwrap();
    let grid = RadarGrid::default();

    let doc = SidecarBuilder::new()
        .generated_at(parse_timestamp(time::GENERATED).unwrap())
        .radar(radar)
        .isosurface(
            IsosurfaceExport::new(
                "reflectivity",
                "dBZ",
                isosurfaces::REFLECTIVITY_LEVELS.to_vec(),
                Provenance::observed(valid),
            )
            .with_unity_dims(true)
            .with_extent(grid.extent()),
        )
        .vector_field(
            VectorFieldExport::new("velocity", Provenance::observed(valid))
                .with_unity_dims(true)
                .with_extent(grid.extent()),
        )
        .build()
        .unwrap();

    let value = serde_json::to_value(&doc).unwrap();
    assert_json_keys!(value, ["FILE_GENERATED", "radar", "isosurface", "vector_field"]);
    assert_json_keys!(
        value["radar"],
        ["id", "latitude", "longitude", "elevation", "elevation_units"]
    );
    assert_json_keys!(
        value["isosurface"],
        [
            "grid",
            "unity_dims",
            "smooth",
            "Date",
            "20_reflectivity.dae",
            "40_reflectivity.dae",
            "55.5_reflectivity.dae"
        ]
    );
    assert_json_keys!(
        value["vector_field"],
        ["grid", "unity_dims", "Date", "x_velocity.vf", "y_velocity.vf", "z_velocity.vf"]
    );
    assert_json_keys!(
        value["vector_field"]["x_velocity.vf"],
        [
            "x_min",
            "x_max",
            "x_coordinate_units",
            "y_min",
            "y_max",
            "y_coordinate_units",
            "z_min",
            "z_max",
            "z_coordinate_units"
        ]
    );

    let file = &value["isosurface"]["55.5_reflectivity.dae"];
    assert_eq!(file["isosurface_level"], "55.5");
    assert_eq!(file["y_min"], "0");
    assert_eq!(file["y_max"], "20000");
    assert_eq!(value["isosurface"]["Date"], time::RADAR_VALID);
    assert_eq!(value["FILE_GENERATED"], time::GENERATED);
}

#[test]
fn test_radar_sites_round_trip() {
    let valid = parse_timestamp(time::RADAR_VALID).unwrap();
    for (id, lat, lon, elevation) in [radars::KMPX, radars::KTLX, radars::TJUA] {
        let radar = RadarInfo::new(&RadarId::new(id).unwrap(), lat, lon, elevation);
        let doc = SidecarBuilder::new()
            .generated_at(parse_timestamp(time::GENERATED).unwrap())
            .radar(radar.clone())
            .vector_field(
                VectorFieldExport::new("velocity", Provenance::observed(valid))
                    .with_extent(RadarGrid::default().extent()),
            )
            .build()
            .unwrap();

        let parsed = MetadataDocument::from_json(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed.radar.as_ref(), Some(&radar), "{}", id);
        assert!(validate_document(&parsed).is_valid(), "{}", id);
    }
}

#[test]
fn test_idealized_theta_export() {
    let (lowest, highest, step) = isosurfaces::THETA_RANGE;
    let levels = inclusive_range(lowest, highest, step).unwrap();
    let run = Provenance::idealized(time::IDEALIZED_RUN_TIME).unwrap();

    let doc = SidecarBuilder::new()
        .isosurface(
            IsosurfaceExport::new("theta", "K", levels.clone(), run)
                .with_format(MeshFormat::parse("OBJ").unwrap())
                .with_smooth(true),
        )
        .build()
        .unwrap();

    let value = serde_json::to_value(&doc).unwrap();
    assert!(value.get("radar").is_none());
    let iso = &value["isosurface"];
    assert!(iso.get("Date").is_none());
    assert_eq!(iso["Run_Time"], 5400.0);
    assert_eq!(iso["smooth"], true);
    assert!(iso["340_theta.obj"].is_object());
    assert_eq!(iso["280_theta.obj"]["x_min"], "N/A");
    assert_eq!(doc.file_count(), levels.len());
}

#[test]
fn test_extent_from_masked_coordinates() {
    let xs = axis_values(-2000.0, 2000.0, 1000.0);
    let ys = axis_values(-1000.0, 1000.0, 500.0);
    let zs = axis_values(0.0, 1500.0, 500.0);
    let (y, z, x) = meshgrid(&ys, &zs, &xs);
    // The first point is the minimum of every axis; masking it must not matter
    let x = with_nan_every(&x, x.len());

    let extent = Extent3::from_coords(&x, &y, &z);
    let doc = SidecarBuilder::new()
        .vector_field(
            VectorFieldExport::new("wind", Provenance::idealized(0.0).unwrap())
                .with_extent(extent)
                .with_coordinate_units(AxisUnits::uniform("m")),
        )
        .build()
        .unwrap();

    let file = &doc.vector_field.unwrap().files["y_wind.vf"];
    assert_eq!(file.x_min.as_str(), "-2000");
    assert_eq!(file.x_max.as_str(), "2000");
    assert_eq!(file.z_max.as_str(), "1500");
    assert_eq!(file.x_coordinate_units.as_str(), "m");
}
