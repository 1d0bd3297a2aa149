//! Binary STL export for extracted iso-surface meshes.
//!
//! One triangle record = facet normal + three vertex positions + a zero
//! attribute word, 50 bytes little-endian, written in extraction order.
//! Readable by every slicer and DCC tool.

use crate::io::IoError;
use crate::mesh::Mesh;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export a mesh to binary STL.
///
/// Writes the 80-byte zero header, the `u32` triangle count, then one
/// record per triangle. The facet normal is recomputed from the cross
/// product of the triangle edges so the file is self-consistent even if
/// vertex normals were never filled in.
pub fn export_stl(mesh: &Mesh, path: impl AsRef<Path>) -> Result<(), IoError> {
    let file = std::fs::File::create(path)?;
    let mut w = BufWriter::new(file);

    let header = [0u8; 80];
    w.write_all(&header)?;

    let tri_count = mesh.triangle_count() as u32;
    w.write_all(&tri_count.to_le_bytes())?;

    for i in 0..mesh.triangle_count() {
        let n = mesh.facet_normal(i);
        for f in [n.x, n.y, n.z] {
            w.write_all(&f.to_le_bytes())?;
        }
        for v in mesh.triangle(i) {
            for f in [v.x, v.y, v.z] {
                w.write_all(&f.to_le_bytes())?;
            }
        }
        w.write_all(&0u16.to_le_bytes())?;
    }

    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Vertex;
    use glam::Vec3;

    fn one_triangle_mesh() -> Mesh {
        let a = Vec3::ZERO;
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 1.0, 0.0);
        let n = Vec3::Z;
        Mesh {
            vertices: vec![Vertex::new(a, n), Vertex::new(b, n), Vertex::new(c, n)],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_stl_byte_layout() {
        let mesh = one_triangle_mesh();
        let path = std::env::temp_dir().join("qjulia_test_layout.stl");
        export_stl(&mesh, &path).unwrap();

        let data = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        // header + count + one 50-byte record
        assert_eq!(data.len(), 80 + 4 + 50);
        assert!(data[..80].iter().all(|&b| b == 0));

        let count = u32::from_le_bytes(data[80..84].try_into().unwrap());
        assert_eq!(count, 1);

        let read_f32 = |offset: usize| -> f32 {
            f32::from_le_bytes(data[offset..offset + 4].try_into().unwrap())
        };

        // Facet normal of the XY triangle is +Z
        assert_eq!(read_f32(84), 0.0);
        assert_eq!(read_f32(88), 0.0);
        assert_eq!(read_f32(92), 1.0);

        // First vertex position follows the normal
        assert_eq!(read_f32(96), 0.0);
        // Second vertex x
        assert_eq!(read_f32(108), 1.0);

        // Attribute word is zero
        assert_eq!(data[132], 0);
        assert_eq!(data[133], 0);
    }

    #[test]
    fn test_stl_record_count_matches_mesh() {
        let mut mesh = one_triangle_mesh();
        // Second triangle sharing vertex 0
        mesh.vertices.push(Vertex::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X));
        mesh.indices.extend([0, 2, 3]);

        let path = std::env::temp_dir().join("qjulia_test_count.stl");
        export_stl(&mesh, &path).unwrap();
        let data = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let count = u32::from_le_bytes(data[80..84].try_into().unwrap());
        assert_eq!(count as usize, mesh.triangle_count());
        assert_eq!(data.len(), 84 + 50 * mesh.triangle_count());
    }

    #[test]
    fn test_export_to_unwritable_path_fails() {
        let mesh = one_triangle_mesh();
        let result = export_stl(&mesh, "/nonexistent_dir_qjulia/out.stl");
        assert!(matches!(result, Err(IoError::Io(_))));
    }
}
