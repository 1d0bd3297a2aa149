//! Lattice enumeration and eager parallel field sampling.
//!
//! The sampling grid covers the bounding box with `resolution` lattice
//! points per axis (both endpoints included), stored x-major. Sampling is
//! embarrassingly parallel: each z-slice is filled independently by a
//! rayon worker, with the step vector computed once up front.

use crate::field::{escape_time, FieldParams, OUTSIDE_DENSITY};
use crate::parse::CompiledRecurrence;
use crate::types::{GridBounds, Quaternion};
use glam::{UVec3, Vec3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors, rejected before any field evaluation begins
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Bounding box with `min >= max` or non-finite values on some axis
    #[error("invalid bounds: min {min:?} must be strictly below max {max:?} on every axis")]
    InvalidBounds {
        /// Minimum corner as supplied
        min: [f32; 3],
        /// Maximum corner as supplied
        max: [f32; 3],
    },

    /// Fewer than two lattice points on an axis
    #[error("resolution {value} on the {axis} axis is below the minimum of 2")]
    ResolutionTooSmall {
        /// Axis name (`x`, `y` or `z`)
        axis: char,
        /// Offending resolution
        value: u32,
    },

    /// Iteration budget of zero
    #[error("max_iterations must be positive")]
    NoIterations,
}

/// Validated sampling lattice over a bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingGrid {
    bounds: GridBounds,
    resolution: UVec3,
}

impl SamplingGrid {
    /// Create a grid, validating bounds and per-axis resolution.
    ///
    /// Each axis needs at least 2 lattice points; a resolution of 1 would
    /// degenerate to a single slice with no cells to march.
    pub fn new(bounds: GridBounds, resolution: UVec3) -> Result<Self, ConfigError> {
        if !bounds.is_valid() {
            return Err(ConfigError::InvalidBounds {
                min: bounds.min.to_array(),
                max: bounds.max.to_array(),
            });
        }
        for (axis, value) in [('x', resolution.x), ('y', resolution.y), ('z', resolution.z)] {
            if value < 2 {
                return Err(ConfigError::ResolutionTooSmall { axis, value });
            }
        }
        Ok(SamplingGrid { bounds, resolution })
    }

    /// The bounding box
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Lattice points per axis
    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    /// Lattice points per axis as usize
    pub fn dims(&self) -> (usize, usize, usize) {
        (
            self.resolution.x as usize,
            self.resolution.y as usize,
            self.resolution.z as usize,
        )
    }

    /// Total number of lattice points
    pub fn point_count(&self) -> usize {
        let (nx, ny, nz) = self.dims();
        nx * ny * nz
    }

    /// Spacing between adjacent lattice points, per axis.
    ///
    /// Both endpoints are sampled, so the step is `size / (res - 1)`.
    pub fn step(&self) -> Vec3 {
        self.bounds.size() / (self.resolution - UVec3::ONE).as_vec3()
    }

    /// World position of lattice point `(x, y, z)`
    #[inline]
    pub fn position(&self, x: usize, y: usize, z: usize) -> Vec3 {
        self.bounds.min + self.step() * Vec3::new(x as f32, y as f32, z as f32)
    }

    /// Flat index of lattice point `(x, y, z)` (x-major)
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        let (nx, ny, _) = self.dims();
        x + y * nx + z * nx * ny
    }

    /// True when the lattice point lies on any face of the grid
    #[inline]
    pub fn on_boundary(&self, x: usize, y: usize, z: usize) -> bool {
        let (nx, ny, nz) = self.dims();
        x == 0 || y == 0 || z == 0 || x == nx - 1 || y == ny - 1 || z == nz - 1
    }
}

/// Sample the escape-time density field over the whole grid.
///
/// Eager evaluation, parallelized by z-slices. When `make_border` is set,
/// lattice points on the grid faces are forced to [`OUTSIDE_DENSITY`]
/// instead of being evaluated, so the iso-surface always closes at the
/// domain boundary.
///
/// The output is x-major: `values[grid.index(x, y, z)]`.
pub fn sample_field(
    recurrence: &CompiledRecurrence,
    grid: &SamplingGrid,
    params: &FieldParams,
    make_border: bool,
) -> Vec<f32> {
    let (nx, ny, nz) = grid.dims();
    let step = grid.step();
    let min = grid.bounds().min;
    let slice_size = nx * ny;

    let mut values = vec![0.0f32; grid.point_count()];

    values
        .par_chunks_mut(slice_size)
        .enumerate()
        .for_each(|(z, slice)| {
            let z_pos = min.z + z as f32 * step.z;
            let z_edge = z == 0 || z == nz - 1;

            for y in 0..ny {
                let y_pos = min.y + y as f32 * step.y;
                let y_edge = y == 0 || y == ny - 1;
                let row_offset = y * nx;

                for x in 0..nx {
                    if make_border && (z_edge || y_edge || x == 0 || x == nx - 1) {
                        slice[row_offset + x] = OUTSIDE_DENSITY;
                        continue;
                    }

                    let x_pos = min.x + x as f32 * step.x;
                    let start = Quaternion::new(params.z_w, x_pos, y_pos, z_pos);
                    slice[row_offset + x] = escape_time(recurrence, start, params);
                }
            }
        });

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::compile;

    fn unit_grid(res: u32) -> SamplingGrid {
        SamplingGrid::new(GridBounds::symmetric(1.0), UVec3::splat(res)).unwrap()
    }

    fn julia_params() -> FieldParams {
        FieldParams {
            constant: Quaternion::ZERO,
            z_w: 0.0,
            max_iterations: 20,
            threshold: 2.0,
        }
    }

    #[test]
    fn test_rejects_degenerate_resolution() {
        let bounds = GridBounds::symmetric(1.0);
        assert!(matches!(
            SamplingGrid::new(bounds, UVec3::new(16, 1, 16)).unwrap_err(),
            ConfigError::ResolutionTooSmall { axis: 'y', value: 1 }
        ));
        assert!(matches!(
            SamplingGrid::new(bounds, UVec3::new(0, 16, 16)).unwrap_err(),
            ConfigError::ResolutionTooSmall { axis: 'x', value: 0 }
        ));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let bounds = GridBounds::new(Vec3::ONE, -Vec3::ONE);
        assert!(matches!(
            SamplingGrid::new(bounds, UVec3::splat(8)).unwrap_err(),
            ConfigError::InvalidBounds { .. }
        ));
    }

    #[test]
    fn test_lattice_covers_both_endpoints() {
        let grid = unit_grid(5);
        assert_eq!(grid.position(0, 0, 0), Vec3::splat(-1.0));
        let p = grid.position(4, 4, 4);
        assert!((p - Vec3::splat(1.0)).length() < 1e-6);
        assert_eq!(grid.step(), Vec3::splat(0.5));
    }

    #[test]
    fn test_anisotropic_indexing() {
        let grid = SamplingGrid::new(
            GridBounds::symmetric(1.0),
            UVec3::new(3, 4, 5),
        )
        .unwrap();
        assert_eq!(grid.point_count(), 60);

        // Every (x, y, z) maps to a distinct flat index
        let mut seen = vec![false; grid.point_count()];
        let (nx, ny, nz) = grid.dims();
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let i = grid.index(x, y, z);
                    assert!(!seen[i]);
                    seen[i] = true;
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_sample_field_center_is_inside() {
        let rec = compile("Z*Z + C").unwrap();
        let grid = unit_grid(9);
        let params = julia_params();
        let values = sample_field(&rec, &grid, &params, false);

        // Grid center is the origin: bounded orbit, saturated density
        let center = grid.index(4, 4, 4);
        assert_eq!(values[center], 20.0);
    }

    #[test]
    fn test_border_overrides_every_face() {
        let rec = compile("Z*Z + C").unwrap();
        // Tight bounds: without the border everything is inside
        let grid = SamplingGrid::new(GridBounds::symmetric(0.5), UVec3::splat(6)).unwrap();
        let params = julia_params();
        let values = sample_field(&rec, &grid, &params, true);

        let (nx, ny, nz) = grid.dims();
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let v = values[grid.index(x, y, z)];
                    if grid.on_boundary(x, y, z) {
                        assert_eq!(v, OUTSIDE_DENSITY);
                    } else {
                        assert_eq!(v, 20.0, "interior point ({x},{y},{z}) should be bounded");
                    }
                }
            }
        }
    }

    #[test]
    fn test_border_only_touches_boundary() {
        let rec = compile("Z*Z + C").unwrap();
        let grid = unit_grid(8);
        let params = julia_params();
        let plain = sample_field(&rec, &grid, &params, false);
        let bordered = sample_field(&rec, &grid, &params, true);

        let (nx, ny, nz) = grid.dims();
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let i = grid.index(x, y, z);
                    if !grid.on_boundary(x, y, z) {
                        assert_eq!(plain[i], bordered[i]);
                    }
                }
            }
        }
    }
}
