//! # Primitive Shape Generation
//!
//! This module contains functions to generate common 3D primitive shapes.
//! All shapes are generated with proper normals.

use super::GeometryData;

/// Generate an axis-aligned box centered at the origin
///
/// Returns a cuboid spanning half of each extent on either side of the
/// origin. Each face has normals pointing outward.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();

    let (hw, hh, hd) = (width / 2.0, height / 2.0, depth / 2.0);

    let positions = [
        // Front face (+Z)
        [-hw, -hh, hd], [hw, -hh, hd], [hw, hh, hd], [-hw, hh, hd],
        // Back face (-Z)
        [hw, -hh, -hd], [-hw, -hh, -hd], [-hw, hh, -hd], [hw, hh, -hd],
        // Left face (-X)
        [-hw, -hh, -hd], [-hw, -hh, hd], [-hw, hh, hd], [-hw, hh, -hd],
        // Right face (+X)
        [hw, -hh, hd], [hw, -hh, -hd], [hw, hh, -hd], [hw, hh, hd],
        // Top face (+Y)
        [-hw, hh, hd], [hw, hh, hd], [hw, hh, -hd], [-hw, hh, -hd],
        // Bottom face (-Y)
        [-hw, -hh, -hd], [hw, -hh, -hd], [hw, -hh, hd], [-hw, -hh, hd],
    ];

    let normals = [
        [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0], [0.0, -1.0, 0.0], [0.0, -1.0, 0.0], [0.0, -1.0, 0.0],
    ];

    // Two CCW triangles per face
    for face in 0..6u32 {
        let base = face * 4;
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    data.vertices = positions.to_vec();
    data.normals = normals.to_vec();
    data
}

/// Generate a horizontal plane at y = 0, centered at the origin
///
/// The plane faces up (+Y) and spans `width` along X and `depth` along Z.
pub fn generate_plane(width: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();

    let (hw, hd) = (width / 2.0, depth / 2.0);

    data.vertices = vec![
        [-hw, 0.0, hd],
        [hw, 0.0, hd],
        [hw, 0.0, -hd],
        [-hw, 0.0, -hd],
    ];
    data.normals = vec![[0.0, 1.0, 0.0]; 4];
    data.indices = vec![0, 1, 2, 0, 2, 3];

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_six_faces() {
        let data = generate_box(1.0, 2.0, 3.0);
        assert_eq!(data.vertex_count(), 24);
        assert_eq!(data.triangle_count(), 12);

        let max_y = data.vertices.iter().map(|v| v[1]).fold(f32::MIN, f32::max);
        assert_eq!(max_y, 1.0);
    }

    #[test]
    fn plane_lies_flat_at_origin() {
        let data = generate_plane(20.0, 20.0);
        assert_eq!(data.triangle_count(), 2);
        assert!(data.vertices.iter().all(|v| v[1] == 0.0));
        assert!(data.normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));
    }
}
