use glam::{Vec2, Vec3};

use crate::heightfield::HeightField;

/// Vertex, UV and triangle-index buffers for a regular grid mesh
///
/// Triangle indices come in runs of three. The buffers are handed off as-is
/// to the display collaborator, which owns normal computation and upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub triangles: Vec<u32>,
}

impl MeshData {
    fn for_grid(width: usize, height: usize) -> Self {
        MeshData {
            vertices: Vec::with_capacity(width * height),
            uvs: Vec::with_capacity(width * height),
            triangles: Vec::with_capacity(width.saturating_sub(1) * height.saturating_sub(1) * 6),
        }
    }

    fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.triangles.push(a);
        self.triangles.push(b);
        self.triangles.push(c);
    }
}

/// Build a triangulated mesh from a height field
///
/// The mesh is centered on X with row 0 at the back (Z decreases as rows
/// advance). Each cell's vertex is lifted to
/// `height_curve(sample) * height_multiplier`; the curve is opaque to the
/// builder. Interior cells emit two triangles, `(v, v+w+1, v+w)` then
/// `(v+w+1, v, v+1)` — the winding determines the visible face once the
/// display collaborator recomputes normals, so it must not be reordered.
pub fn build_terrain_mesh(
    height: &HeightField,
    height_multiplier: f32,
    height_curve: impl Fn(f32) -> f32,
) -> MeshData {
    let width = height.width();
    let rows = height.height();
    let top_left_x = (width as f32 - 1.0) / -2.0;
    let top_left_z = (rows as f32 - 1.0) / 2.0;

    let mut mesh = MeshData::for_grid(width, rows);
    let mut vertex_index: u32 = 0;

    for row in 0..rows {
        for col in 0..width {
            let y = height_curve(height.get(col, row)) * height_multiplier;
            mesh.vertices.push(Vec3::new(
                top_left_x + col as f32,
                y,
                top_left_z - row as f32,
            ));
            mesh.uvs.push(Vec2::new(
                col as f32 / width as f32,
                row as f32 / rows as f32,
            ));

            if col < width - 1 && row < rows - 1 {
                let w = width as u32;
                mesh.add_triangle(vertex_index, vertex_index + w + 1, vertex_index + w);
                mesh.add_triangle(vertex_index + w + 1, vertex_index, vertex_index + 1);
            }

            vertex_index += 1;
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_field(width: usize, height: usize) -> HeightField {
        HeightField::from_samples(width, height, vec![0.0; width * height])
    }

    #[test]
    fn test_buffer_lengths() {
        let mesh = build_terrain_mesh(&flat_field(5, 4), 1.0, |h| h);
        assert_eq!(mesh.vertices.len(), 20);
        assert_eq!(mesh.uvs.len(), 20);
        assert_eq!(mesh.triangles.len(), 4 * 3 * 6);
    }

    #[test]
    fn test_two_by_two_quad() {
        let mesh = build_terrain_mesh(&flat_field(2, 2), 1.0, |h| h);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangles, vec![0, 3, 2, 3, 0, 1]);
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = build_terrain_mesh(&flat_field(7, 3), 1.0, |h| h);
        let vertex_count = mesh.vertices.len() as u32;
        assert!(mesh.triangles.iter().all(|&i| i < vertex_count));
    }

    #[test]
    fn test_vertex_height_applies_curve_and_multiplier() {
        let field = HeightField::from_samples(2, 1, vec![0.5, 1.0]);
        let mesh = build_terrain_mesh(&field, 8.0, |h| h * h);
        assert_eq!(mesh.vertices[0].y, 0.25 * 8.0);
        assert_eq!(mesh.vertices[1].y, 1.0 * 8.0);
    }

    #[test]
    fn test_grid_is_centered_with_row_zero_at_back() {
        let mesh = build_terrain_mesh(&flat_field(3, 3), 1.0, |h| h);
        // Corners of a 3x3 grid: X spans -1..1, Z spans 1..-1
        assert_eq!(mesh.vertices[0].x, -1.0);
        assert_eq!(mesh.vertices[0].z, 1.0);
        assert_eq!(mesh.vertices[8].x, 1.0);
        assert_eq!(mesh.vertices[8].z, -1.0);
    }

    #[test]
    fn test_uvs_divide_by_full_dimensions() {
        let mesh = build_terrain_mesh(&flat_field(4, 2), 1.0, |h| h);
        // vertex (col 3, row 1): uv is col/width, row/height
        assert_eq!(mesh.uvs[1 * 4 + 3], Vec2::new(0.75, 0.5));
    }

    #[test]
    fn test_single_cell_grid_has_no_triangles() {
        let mesh = build_terrain_mesh(&flat_field(1, 1), 1.0, |h| h);
        assert_eq!(mesh.vertices.len(), 1);
        assert!(mesh.triangles.is_empty());
    }

    #[test]
    fn test_rebuild_is_identical() {
        let samples: Vec<f32> = (0..35).map(|i| (i as f32 * 0.291).fract()).collect();
        let field = HeightField::from_samples(7, 5, samples);
        let a = build_terrain_mesh(&field, 12.0, |h| h.powf(1.5));
        let b = build_terrain_mesh(&field, 12.0, |h| h.powf(1.5));
        assert_eq!(a, b);
    }
}
