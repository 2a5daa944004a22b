//! Common test fixtures for sidecar tests.
//!
//! This module provides pre-defined sidecar documents and export settings
//! that represent the common export scenarios.

/// Sample sidecar documents as JSON text.
pub mod documents {
    /// Real radar export with reflectivity isosurfaces and a velocity field.
    pub const RADAR_EXPORT: &str = r#"{
    "FILE_GENERATED": "2024-02-10 18:00:00",
    "radar": {
        "id": "KMPX",
        "latitude": 44.84889,
        "longitude": -93.56551,
        "elevation": 288,
        "elevation_units": "m"
    },
    "isosurface": {
        "grid": "cartesian",
        "unity_dims": true,
        "smooth": false,
        "Date": "2010-03-03 00:30:00",
        "20_reflectivity.dae": {
            "x_min": "-100000",
            "x_max": "100000",
            "x_coordinate_units": "meter",
            "y_min": "0",
            "y_max": "20000",
            "y_coordinate_units": "meter",
            "z_min": "-100000",
            "z_max": "100000",
            "z_coordinate_units": "meter",
            "isosurface_units": "dBZ",
            "isosurface_level": "20",
            "variable": "reflectivity"
        },
        "40_reflectivity.dae": {
            "x_min": "-100000",
            "x_max": "100000",
            "x_coordinate_units": "meter",
            "y_min": "0",
            "y_max": "20000",
            "y_coordinate_units": "meter",
            "z_min": "-100000",
            "z_max": "100000",
            "z_coordinate_units": "meter",
            "isosurface_units": "dBZ",
            "isosurface_level": "40",
            "variable": "reflectivity"
        }
    },
    "vector_field": {
        "grid": "cartesian",
        "unity_dims": true,
        "Date": "2010-03-03 00:30:00",
        "x_velocity.vf": {
            "x_min": "-100000",
            "x_max": "100000",
            "x_coordinate_units": "meter",
            "y_min": "0",
            "y_max": "20000",
            "y_coordinate_units": "meter",
            "z_min": "-100000",
            "z_max": "100000",
            "z_coordinate_units": "meter"
        }
    }
}"#;

    /// Idealized simulation export: no radar, run time instead of a date.
    pub const IDEALIZED_EXPORT: &str = r#"{
    "FILE_GENERATED": "2024-02-03 09:15:00",
    "isosurface": {
        "grid": "latlon",
        "unity_dims": false,
        "smooth": true,
        "Run_Time": 5400.0,
        "300_theta.obj": {
            "x_min": "-100.5",
            "x_max": "-90.25",
            "x_coordinate_units": "degrees_east",
            "y_min": "30",
            "y_max": "45",
            "y_coordinate_units": "degrees_north",
            "z_min": "N/A",
            "z_max": "N/A",
            "z_coordinate_units": "N/A",
            "isosurface_units": "K",
            "isosurface_level": "300",
            "variable": "theta"
        }
    }
}"#;

    /// Smallest valid document.
    pub const MINIMAL: &str = r#"{"FILE_GENERATED": "2024-01-15 12:00:00"}"#;

    /// A section carrying both a date and a run time.
    pub const CONFLICTING_PROVENANCE: &str = r#"{
    "FILE_GENERATED": "2024-01-15 12:00:00",
    "vector_field": {
        "grid": "cartesian",
        "unity_dims": false,
        "Date": "2024-01-15 11:00:00",
        "Run_Time": 60,
        "x_wind.vf": {
            "x_min": "0", "x_max": "10", "x_coordinate_units": "meter",
            "y_min": "0", "y_max": "10", "y_coordinate_units": "meter",
            "z_min": "0", "z_max": "10", "z_coordinate_units": "meter"
        }
    }
}"#;
}

/// Common radar sites for testing.
pub mod radars {
    /// Radar site as (id, latitude, longitude, elevation in meters).
    pub type Site = (&'static str, f64, f64, i64);

    /// Minneapolis / Chanhassen, MN
    pub const KMPX: Site = ("KMPX", 44.84889, -93.56551, 288);

    /// Oklahoma City / Twin Lakes, OK
    pub const KTLX: Site = ("KTLX", 35.33306, -97.27778, 370);

    /// San Juan, PR
    pub const TJUA: Site = ("TJUA", 18.1175, -66.07861, 852);
}

/// Common time values for testing.
pub mod time {
    /// When the sample exports were generated
    pub const GENERATED: &str = "2024-02-10 18:00:00";

    /// Valid time of the sample radar volume
    pub const RADAR_VALID: &str = "2010-03-03 00:30:00";

    /// Elapsed run time of the sample idealized case, in seconds
    pub const IDEALIZED_RUN_TIME: f64 = 5400.0;
}

/// Common isosurface settings for testing.
pub mod isosurfaces {
    /// Reflectivity levels in dBZ
    pub const REFLECTIVITY_LEVELS: [f64; 3] = [20.0, 40.0, 55.5];

    /// Potential temperature range (lowest, highest, step) in K
    pub const THETA_RANGE: (f64, f64, f64) = (280.0, 340.0, 5.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_are_not_empty() {
        assert!(documents::RADAR_EXPORT.contains("FILE_GENERATED"));
        assert!(documents::IDEALIZED_EXPORT.contains("Run_Time"));
    }

    #[test]
    fn test_radar_ids_are_four_chars() {
        for (id, ..) in [radars::KMPX, radars::KTLX, radars::TJUA] {
            assert_eq!(id.len(), 4);
        }
    }
}
