//! Integration tests: mesh emission and request configuration handling.

mod common;

use common::*;
use qjulia::prelude::*;
use std::path::PathBuf;

#[test]
fn emitted_stl_matches_extracted_triangles() {
    let path = std::env::temp_dir().join("qjulia_pipeline_emit.stl");
    let request = SurfaceRequest {
        write_triangles: Some(path.clone()),
        ..classic_request()
    };

    let report = SurfaceEngine::new(&request).unwrap().run();
    assert!(report.surface_found());
    assert!(report.emit_error.is_none());

    let data = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let count = u32::from_le_bytes(data[80..84].try_into().unwrap()) as usize;
    assert_eq!(count, report.mesh.triangle_count());
    assert_eq!(data.len(), 84 + 50 * count);
}

#[test]
fn empty_mesh_is_not_emitted() {
    let path = std::env::temp_dir().join("qjulia_pipeline_empty.stl");
    std::fs::remove_file(&path).ok();

    let request = SurfaceRequest {
        constant: Quaternion::new(100.0, 0.0, 0.0, 0.0),
        write_triangles: Some(path.clone()),
        ..classic_request()
    };

    let report = SurfaceEngine::new(&request).unwrap().run();
    assert!(!report.surface_found());
    assert!(report.emit_error.is_none());
    assert!(!path.exists(), "no file should be written for an empty mesh");
}

#[test]
fn emit_failure_keeps_the_normal_result() {
    let request = SurfaceRequest {
        write_triangles: Some(PathBuf::from("/nonexistent_dir_qjulia/out.stl")),
        ..classic_request()
    };

    let report = SurfaceEngine::new(&request).unwrap().run();
    assert!(report.emit_error.is_some());
    assert!(report.surface_found());
    assert_unit(report.normal);
}

#[test]
fn request_json_round_trip_drives_the_engine() {
    let path = std::env::temp_dir().join("qjulia_pipeline_request.json");
    let request = SurfaceRequest {
        constant: Quaternion::new(0.2, 0.1, -0.3, 0.0),
        make_border: true,
        ..classic_request()
    };

    save_request(&request, &path).unwrap();
    let loaded = load_request(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, request);

    let from_file = SurfaceEngine::new(&loaded).unwrap().run();
    let direct = SurfaceEngine::new(&request).unwrap().run();
    assert_eq!(from_file.normal.to_array(), direct.normal.to_array());
    assert_eq!(
        from_file.mesh.triangle_count(),
        direct.mesh.triangle_count()
    );
}

#[test]
fn configuration_errors_are_rejected_up_front() {
    let inverted_bounds = SurfaceRequest {
        bounds: GridBounds::new(Vec3::ONE, -Vec3::ONE),
        ..classic_request()
    };
    assert!(matches!(
        compute_surface_normal(&inverted_bounds).unwrap_err(),
        EngineError::Config(ConfigError::InvalidBounds { .. })
    ));

    let flat_grid = SurfaceRequest {
        resolution: UVec3::new(1, 16, 16),
        ..classic_request()
    };
    assert!(matches!(
        compute_surface_normal(&flat_grid).unwrap_err(),
        EngineError::Config(ConfigError::ResolutionTooSmall { .. })
    ));

    let no_budget = SurfaceRequest {
        max_iterations: 0,
        ..classic_request()
    };
    assert!(matches!(
        compute_surface_normal(&no_budget).unwrap_err(),
        EngineError::Config(ConfigError::NoIterations)
    ));
}

#[test]
fn parse_errors_surface_before_any_sampling() {
    let bad = SurfaceRequest {
        equation: "Z ++ C".to_string(),
        ..classic_request()
    };
    assert!(matches!(
        compute_surface_normal(&bad).unwrap_err(),
        EngineError::Parse(ParseError::UnexpectedToken { .. })
    ));

    let unsupported = SurfaceRequest {
        equation: "sqrt(Z) + C".to_string(),
        ..classic_request()
    };
    assert!(matches!(
        compute_surface_normal(&unsupported).unwrap_err(),
        EngineError::Parse(ParseError::UnsupportedOperation { .. })
    ));
}
