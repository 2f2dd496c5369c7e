use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::Vec3;
use image::RgbaImage;
use mesh_tools::GltfBuilder;
use mesh_tools::Triangle;

use crate::mesh::MeshData;
use crate::render::MapDisplay;

/// File-backed display collaborator
///
/// Textures land as PNG, meshes as GLB next to their texture. This is where
/// the normal-recomputation post-step happens; the core mesh buffers never
/// carry normals.
pub struct FileDisplay {
    texture_path: PathBuf,
    mesh_path: PathBuf,
    written: Vec<PathBuf>,
}

impl FileDisplay {
    pub fn new(out_dir: &Path) -> Self {
        FileDisplay {
            texture_path: out_dir.join("map.png"),
            mesh_path: out_dir.join("terrain.glb"),
            written: Vec::new(),
        }
    }

    /// Files produced so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl MapDisplay for FileDisplay {
    fn show_texture(&mut self, texture: &RgbaImage) -> Result<()> {
        texture
            .save(&self.texture_path)
            .with_context(|| format!("writing texture {}", self.texture_path.display()))?;
        self.written.push(self.texture_path.clone());
        Ok(())
    }

    fn show_mesh(&mut self, mesh: &MeshData, texture: &RgbaImage) -> Result<()> {
        self.show_texture(texture)?;
        export_mesh_to_glb(mesh, &self.mesh_path)?;
        self.written.push(self.mesh_path.clone());
        Ok(())
    }
}

/// Per-vertex normals accumulated from triangle face normals
///
/// Unreferenced vertices keep a straight-up normal.
pub fn compute_vertex_normals(mesh: &MeshData) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; mesh.vertices.len()];

    for triangle in mesh.triangles.chunks_exact(3) {
        let (a, b, c) = (triangle[0] as usize, triangle[1] as usize, triangle[2] as usize);
        let face = (mesh.vertices[b] - mesh.vertices[a])
            .cross(mesh.vertices[c] - mesh.vertices[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| if n.length_squared() > 0.0 { n.normalize() } else { Vec3::Y })
        .collect()
}

/// Export mesh buffers as a GLB file
pub fn export_mesh_to_glb(mesh: &MeshData, output_path: &Path) -> Result<()> {
    let mut builder = GltfBuilder::new();

    let positions: Vec<_> = mesh
        .vertices
        .iter()
        .map(|v| mesh_tools::compat::point3::new(v.x, v.y, v.z))
        .collect();
    let normals: Vec<_> = compute_vertex_normals(mesh)
        .iter()
        .map(|n| mesh_tools::compat::vector3::new(n.x, n.y, n.z))
        .collect();
    let texcoords: Vec<_> = mesh
        .uvs
        .iter()
        .map(|uv| mesh_tools::compat::vector2::new(uv.x, uv.y))
        .collect();
    let indices: Vec<Triangle> = mesh
        .triangles
        .chunks_exact(3)
        .map(|t| Triangle::new(t[0], t[1], t[2]))
        .collect();

    let mesh_index = builder.create_simple_mesh(
        Some("TerrainMesh".to_string()),
        &positions,
        &indices,
        Some(normals),
        Some(texcoords),
        None, // No material; the texture ships alongside as PNG
    );

    let node = builder.add_node(
        Some("Terrain".to_string()),
        Some(mesh_index),
        None, // Default position
        None, // Default rotation
        None, // Default scale
    );

    builder.add_scene(Some("Main Scene".to_string()), Some(vec![node]));

    let path = output_path.to_string_lossy();
    builder
        .export_glb(&path)
        .with_context(|| format!("writing mesh {}", output_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::HeightField;
    use crate::mesh::build_terrain_mesh;
    use glam::Vec2;

    fn small_mesh() -> MeshData {
        let field =
            HeightField::from_samples(3, 3, vec![0.0, 0.2, 0.4, 0.1, 0.5, 0.3, 0.0, 0.2, 0.6]);
        build_terrain_mesh(&field, 4.0, |h| h)
    }

    #[test]
    fn test_normals_are_unit_length() {
        let normals = compute_vertex_normals(&small_mesh());
        assert_eq!(normals.len(), 9);
        for n in normals {
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_flat_mesh_normals_point_up() {
        let field = HeightField::from_samples(2, 2, vec![0.5; 4]);
        let mesh = build_terrain_mesh(&field, 10.0, |h| h);
        for n in compute_vertex_normals(&mesh) {
            assert!((n - Vec3::Y).length() < 1e-5, "normal {:?} not up", n);
        }
    }

    #[test]
    fn test_unreferenced_vertex_defaults_up() {
        let mesh = MeshData {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Z],
            uvs: vec![Vec2::ZERO; 3],
            triangles: Vec::new(),
        };
        assert_eq!(compute_vertex_normals(&mesh), vec![Vec3::Y; 3]);
    }

    #[test]
    fn test_glb_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terrain.glb");
        export_mesh_to_glb(&small_mesh(), &path).unwrap();
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_file_display_writes_texture_and_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let mut display = FileDisplay::new(dir.path());
        let texture = RgbaImage::new(4, 4);

        display.show_mesh(&small_mesh(), &texture).unwrap();

        assert_eq!(display.written().len(), 2);
        for path in display.written() {
            assert!(path.exists(), "{} missing", path.display());
        }
    }
}
