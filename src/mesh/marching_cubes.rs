//! Marching-cubes surface extraction over the density field.
//!
//! Every cell of 8 adjacent lattice corners is classified against the iso
//! level, looked up in the standard 256-entry tables, and triangulated
//! with edge vertices linearly interpolated between corner densities.
//! Z-slabs of cells are processed in parallel and their sub-meshes merged
//! afterwards, so no worker ever contends on a shared mesh.
//!
//! Ambiguous table cases are accepted without topological
//! disambiguation; features thinner than a cell are silently skipped.

use crate::field::SamplingGrid;
use crate::mesh::tables::{CORNER_OFFSETS, EDGE_CONNECTIONS, EDGE_TABLE, TRI_TABLE};
use crate::mesh::{Mesh, Vertex};
use glam::Vec3;
use rayon::prelude::*;

/// Extract the iso-surface of a sampled density field.
///
/// `values` must be the x-major field produced by
/// [`sample_field`](crate::field::sample_field) for the same grid.
/// Corners with density at or above `iso_level` count as interior;
/// triangle winding faces away from the interior region.
pub fn marching_cubes(values: &[f32], grid: &SamplingGrid, iso_level: f32) -> Mesh {
    let (nx, ny, nz) = grid.dims();
    debug_assert_eq!(values.len(), grid.point_count());

    let sub_meshes: Vec<Mesh> = (0..nz - 1)
        .into_par_iter()
        .map(|z| {
            let mut slab = Mesh::new();
            for y in 0..ny - 1 {
                for x in 0..nx - 1 {
                    process_cell(values, grid, x, y, z, iso_level, &mut slab);
                }
            }
            slab
        })
        .collect();

    merge_meshes(sub_meshes)
}

/// Concatenate per-slab sub-meshes, rebasing indices
fn merge_meshes(sub_meshes: Vec<Mesh>) -> Mesh {
    let total_vertices: usize = sub_meshes.iter().map(|m| m.vertices.len()).sum();
    let total_indices: usize = sub_meshes.iter().map(|m| m.indices.len()).sum();

    let mut merged = Mesh {
        vertices: Vec::with_capacity(total_vertices),
        indices: Vec::with_capacity(total_indices),
    };

    for sub in sub_meshes {
        let base = merged.vertices.len() as u32;
        merged.vertices.extend(sub.vertices);
        merged.indices.extend(sub.indices.iter().map(|i| i + base));
    }

    merged
}

/// Triangulate a single cell
#[inline]
fn process_cell(
    values: &[f32],
    grid: &SamplingGrid,
    x: usize,
    y: usize,
    z: usize,
    iso_level: f32,
    mesh: &mut Mesh,
) {
    let mut corner_values = [0.0f32; 8];
    let mut corner_positions = [Vec3::ZERO; 8];

    let mut cube_index = 0usize;
    for i in 0..8 {
        let gx = x + CORNER_OFFSETS[i][0];
        let gy = y + CORNER_OFFSETS[i][1];
        let gz = z + CORNER_OFFSETS[i][2];

        corner_values[i] = values[grid.index(gx, gy, gz)];
        corner_positions[i] = grid.position(gx, gy, gz);

        // Low-density (exterior) corners set bits; the tables then wind
        // triangles so facet normals point toward the exterior side.
        if corner_values[i] < iso_level {
            cube_index |= 1 << i;
        }
    }

    // Uniformly inside or outside
    if EDGE_TABLE[cube_index] == 0 {
        return;
    }

    let mut edge_vertices = [Vec3::ZERO; 12];
    for (i, vertex) in edge_vertices.iter_mut().enumerate() {
        if EDGE_TABLE[cube_index] & (1 << i) != 0 {
            let e0 = EDGE_CONNECTIONS[i][0];
            let e1 = EDGE_CONNECTIONS[i][1];

            *vertex = interpolate_vertex(
                corner_positions[e0],
                corner_positions[e1],
                corner_values[e0],
                corner_values[e1],
                iso_level,
            );
        }
    }

    let mut i = 0;
    while TRI_TABLE[cube_index][i] != -1 {
        let v0 = edge_vertices[TRI_TABLE[cube_index][i] as usize];
        let v1 = edge_vertices[TRI_TABLE[cube_index][i + 1] as usize];
        let v2 = edge_vertices[TRI_TABLE[cube_index][i + 2] as usize];

        let facet_normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();

        let base = mesh.vertices.len() as u32;
        mesh.vertices.push(Vertex::new(v0, facet_normal));
        mesh.vertices.push(Vertex::new(v1, facet_normal));
        mesh.vertices.push(Vertex::new(v2, facet_normal));
        mesh.indices.extend([base, base + 1, base + 2]);

        i += 3;
    }
}

/// Place a vertex on an edge straddling the iso level.
///
/// Callers only reach this for edges whose corner classifications differ,
/// so `v1 - v0` is strictly nonzero; the clamp guards the interpolation
/// factor against rounding at the corners.
#[inline]
fn interpolate_vertex(p0: Vec3, p1: Vec3, v0: f32, v1: f32, iso_level: f32) -> Vec3 {
    let t = ((iso_level - v0) / (v1 - v0)).clamp(0.0, 1.0);
    p0 + (p1 - p0) * t
}
