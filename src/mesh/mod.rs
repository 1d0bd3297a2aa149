//! Triangle mesh extraction from the sampled density field.
//!
//! - **Marching cubes** (`marching_cubes`): classic 256-case table walk
//!   over grid cells, z-slab parallelized.
//! - **Normal aggregation** (`normal`): reduces the triangle set to the
//!   single representative normal the engine reports.

mod marching_cubes;
mod normal;
mod tables;

pub use marching_cubes::marching_cubes;
pub use normal::aggregate_normal;

use glam::Vec3;

/// Vertex with position and facet normal
///
/// Marching cubes emits three vertices per triangle, all carrying the
/// triangle's facet normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in world coordinates
    pub position: Vec3,
    /// Facet normal of the owning triangle
    pub normal: Vec3,
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Vertex { position, normal }
    }
}

/// Extracted iso-surface mesh
///
/// Produced fresh per invocation and never persisted by the engine.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Mesh vertices, three per triangle
    pub vertices: Vec<Vertex>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Mesh::default()
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Positions of the three corners of triangle `i`
    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        let i0 = self.indices[i * 3] as usize;
        let i1 = self.indices[i * 3 + 1] as usize;
        let i2 = self.indices[i * 3 + 2] as usize;
        [
            self.vertices[i0].position,
            self.vertices[i1].position,
            self.vertices[i2].position,
        ]
    }

    /// Unit facet normal of triangle `i`, from the cross product of its
    /// edges. Zero for degenerate triangles.
    pub fn facet_normal(&self, i: usize) -> Vec3 {
        let [a, b, c] = self.triangle(i);
        (b - a).cross(c - a).normalize_or_zero()
    }
}
