//! The per-invocation surface engine.
//!
//! Wires the pipeline together: validate the request, compile the
//! recurrence once, sample the escape-time field over the grid, march
//! the cells, optionally emit the triangles, and aggregate the
//! representative normal. An engine is an explicit object built from one
//! request, with no process-wide state, so concurrent engines with
//! different parameters are fully independent.

use crate::field::{sample_field, ConfigError, FieldParams, SamplingGrid};
use crate::io::{export_stl, IoError};
use crate::mesh::{aggregate_normal, marching_cubes, Mesh};
use crate::parse::{compile, CompiledRecurrence, ParseError};
use crate::types::{GridBounds, Quaternion};
use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Fatal engine errors, raised before any field evaluation begins.
///
/// Mesh emission failures are deliberately absent: they are non-fatal
/// and reported through [`SurfaceReport::emit_error`] instead.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid bounds, resolution or iteration budget
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The recurrence formula failed to compile
    #[error("equation error: {0}")]
    Parse(#[from] ParseError),
}

/// Everything one invocation needs, in caller terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRequest {
    /// Recurrence formula text, e.g. `Z' = Z*Z + C`
    pub equation: String,
    /// Fourth component of every starting quaternion
    pub z_w: f32,
    /// Constant parameter `C`
    pub constant: Quaternion,
    /// Iteration budget per grid point (must be positive)
    pub max_iterations: u16,
    /// Escape radius and marching-cubes iso level
    pub threshold: f32,
    /// Sampled bounding box
    pub bounds: GridBounds,
    /// Lattice points per axis (each at least 2)
    pub resolution: UVec3,
    /// Force boundary lattice points fully outside so the surface closes
    /// at the domain edges
    pub make_border: bool,
    /// When set, emit the extracted triangles to this binary STL path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_triangles: Option<PathBuf>,
}

impl SurfaceRequest {
    /// The classic quaternion Julia scenario: `Z*Z + C` with `C = 0`,
    /// threshold 2, 16 lattice points per axis over `[-1, 1]^3`.
    pub fn classic_julia() -> Self {
        SurfaceRequest {
            equation: "Z' = Z*Z + C".to_string(),
            z_w: 0.0,
            constant: Quaternion::ZERO,
            max_iterations: 20,
            threshold: 2.0,
            bounds: GridBounds::symmetric(1.0),
            resolution: UVec3::splat(16),
            make_border: false,
            write_triangles: None,
        }
    }
}

/// Result of one engine run
#[derive(Debug)]
pub struct SurfaceReport {
    /// Representative surface normal: unit length when a surface was
    /// found, zero vector otherwise
    pub normal: Vec3,
    /// The extracted triangle mesh (may be empty)
    pub mesh: Mesh,
    /// Set when `write_triangles` was requested but emission failed;
    /// never affects `normal` or `mesh`
    pub emit_error: Option<IoError>,
}

impl SurfaceReport {
    /// True when at least one triangle crossed the iso level
    pub fn surface_found(&self) -> bool {
        self.mesh.triangle_count() > 0
    }
}

/// A validated, compiled invocation
///
/// Construction does all the fallible work; [`run`](SurfaceEngine::run)
/// is infallible and can be called repeatedly (or from several threads)
/// with identical results.
#[derive(Debug, Clone)]
pub struct SurfaceEngine {
    recurrence: CompiledRecurrence,
    grid: SamplingGrid,
    params: FieldParams,
    make_border: bool,
    sink: Option<PathBuf>,
}

impl SurfaceEngine {
    /// Validate a request and compile its recurrence.
    ///
    /// Configuration is checked before the formula so a request that is
    /// wrong on both counts reports the cheaper error first.
    pub fn new(request: &SurfaceRequest) -> Result<Self, EngineError> {
        if request.max_iterations == 0 {
            return Err(ConfigError::NoIterations.into());
        }
        let grid = SamplingGrid::new(request.bounds, request.resolution)?;
        let recurrence = compile(&request.equation)?;

        Ok(SurfaceEngine {
            recurrence,
            grid,
            params: FieldParams {
                constant: request.constant,
                z_w: request.z_w,
                max_iterations: request.max_iterations,
                threshold: request.threshold,
            },
            make_border: request.make_border,
            sink: request.write_triangles.clone(),
        })
    }

    /// Sample, extract, optionally emit, and aggregate.
    pub fn run(&self) -> SurfaceReport {
        let values = sample_field(&self.recurrence, &self.grid, &self.params, self.make_border);
        let mesh = marching_cubes(&values, &self.grid, self.params.threshold);
        debug!(
            triangles = mesh.triangle_count(),
            points = self.grid.point_count(),
            "surface extraction complete"
        );

        let emit_error = match &self.sink {
            Some(path) if mesh.triangle_count() > 0 => match export_stl(&mesh, path) {
                Ok(()) => {
                    debug!(path = %path.display(), triangles = mesh.triangle_count(), "mesh written");
                    None
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "mesh emission failed; normal result unaffected");
                    Some(err)
                }
            },
            Some(_) => {
                debug!("no triangles extracted; skipping mesh emission");
                None
            }
            None => None,
        };

        let normal = aggregate_normal(&mesh);

        SurfaceReport {
            normal,
            mesh,
            emit_error,
        }
    }
}

/// One-call entry point: build an engine for the request, run it, and
/// return the representative normal.
///
/// The zero vector means no surface crossed the threshold in the sampled
/// volume; that is a degenerate result, not an error.
pub fn compute_surface_normal(request: &SurfaceRequest) -> Result<Vec3, EngineError> {
    Ok(SurfaceEngine::new(request)?.run().normal)
}
