//! # qjulia
//!
//! Quaternion Julia set iso-surface engine.
//!
//! Samples the escape-time field of a user-supplied quaternion
//! recurrence over a rectangular 3D region, extracts the iso-surface at
//! the escape threshold with marching cubes, and reduces the triangle
//! set to a single representative surface normal, optionally emitting
//! the full mesh as binary STL.
//!
//! ## Features
//!
//! - **Expression compiler**: `Z' = Z*Z + C` style recurrences over
//!   quaternions (`+`, `-`, `*`, small integer `^`, parentheses)
//! - **Escape-time field**: bounded iteration with early escape, density
//!   = iteration count, rayon-parallel grid sampling
//! - **Marching cubes**: standard 256-case tables, z-slab parallelism,
//!   optional closing border at the domain faces
//! - **Outputs**: aggregate unit normal (zero vector = no surface) and
//!   binary STL triangle records
//!
//! ## Example
//!
//! ```rust
//! use qjulia::prelude::*;
//!
//! let request = SurfaceRequest {
//!     equation: "Z' = Z*Z + C".to_string(),
//!     constant: Quaternion::new(0.3, 0.5, 0.4, 0.2),
//!     ..SurfaceRequest::classic_julia()
//! };
//!
//! let normal = compute_surface_normal(&request).unwrap();
//! assert!(normal.length() < 1.0 + 1e-4);
//! ```

#![warn(missing_docs)]

pub mod engine;
pub mod field;
pub mod io;
pub mod mesh;
pub mod parse;
pub mod types;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::engine::{
        compute_surface_normal, EngineError, SurfaceEngine, SurfaceReport, SurfaceRequest,
    };
    pub use crate::field::{escape_time, sample_field, ConfigError, FieldParams, SamplingGrid};
    pub use crate::io::{export_stl, load_request, save_request, IoError};
    pub use crate::mesh::{aggregate_normal, marching_cubes, Mesh, Vertex};
    pub use crate::parse::{compile, CompiledRecurrence, ParseError};
    pub use crate::types::{GridBounds, Quaternion};
    pub use glam::{UVec3, Vec3};
}

// Re-exports for convenience
pub use engine::{compute_surface_normal, SurfaceEngine, SurfaceRequest};
pub use parse::compile;
pub use types::Quaternion;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_basic_workflow() {
        // Compile once, sample, extract, aggregate
        let recurrence = compile("Z' = Z*Z + C").unwrap();
        let grid = SamplingGrid::new(GridBounds::symmetric(1.0), UVec3::splat(12)).unwrap();
        let params = FieldParams {
            constant: Quaternion::ZERO,
            z_w: 0.0,
            max_iterations: 20,
            threshold: 2.0,
        };

        let values = sample_field(&recurrence, &grid, &params, false);
        assert_eq!(values.len(), grid.point_count());

        let mesh = marching_cubes(&values, &grid, params.threshold);
        assert!(mesh.triangle_count() > 0);

        let normal = aggregate_normal(&mesh);
        assert!((normal.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_single_call_entry_point() {
        let normal = compute_surface_normal(&SurfaceRequest::classic_julia()).unwrap();
        assert!((normal.length() - 1.0).abs() < 1e-4);
    }
}
