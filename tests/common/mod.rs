//! Shared helpers for integration tests.

#![allow(dead_code)]

use qjulia::prelude::*;

/// The `Z*Z + C`, `C = 0` scenario over `[-1, 1]^3` at 16^3
pub fn classic_request() -> SurfaceRequest {
    SurfaceRequest::classic_julia()
}

/// A truncated interior: bounds tight enough that the whole box is
/// inside the set, so no iso crossing exists without a border
pub fn truncated_request() -> SurfaceRequest {
    SurfaceRequest {
        bounds: GridBounds::symmetric(0.5),
        ..SurfaceRequest::classic_julia()
    }
}

/// Assert a normal is unit length within the documented tolerance
pub fn assert_unit(normal: Vec3) {
    assert!(
        (normal.length() - 1.0).abs() < 1e-4,
        "normal {normal} is not unit length"
    );
}
