//! Reduction of the extracted triangle set to one representative normal.

use crate::mesh::Mesh;
use glam::Vec3;

/// Aggregate the mesh into a single representative surface normal.
///
/// Sums the unit facet normals of every triangle and normalizes the
/// result. Returns `Vec3::ZERO` when the mesh is empty (no surface
/// crossed the iso level in the sampled domain); callers must treat the
/// zero vector as "no surface found", not as a valid orientation.
pub fn aggregate_normal(mesh: &Mesh) -> Vec3 {
    if mesh.triangle_count() == 0 {
        return Vec3::ZERO;
    }

    let mut sum = Vec3::ZERO;
    for i in 0..mesh.triangle_count() {
        sum += mesh.facet_normal(i);
    }

    sum.normalize_or_zero()
}
