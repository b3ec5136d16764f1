//! Closed-form generators for the primitive shapes
//!
//! Every generator is a pure function of its parameters. Positions are packed
//! `[x, y, z, x, y, z, ...]` and indices are counter-clockwise when viewed from
//! outside the shape.

use super::GeometryParams;
use crate::foundation::math::constants::{PI, TAU};
use crate::foundation::math::{Vec3, Vec3Ext};

/// Packed positions and triangle indices
pub type Buffers = (Vec<f32>, Vec<u32>);

/// Axis-aligned cube with edge length `params.size`
pub fn cube(params: &GeometryParams) -> Buffers {
    let h = params.size * 0.5;
    let vertices = vec![
        -h, -h, h, //
        h, -h, h, //
        h, h, h, //
        -h, h, h, //
        -h, -h, -h, //
        -h, h, -h, //
        h, h, -h, //
        h, -h, -h, //
    ];
    let indices = vec![
        0, 1, 2, 0, 2, 3, // front
        4, 5, 6, 4, 6, 7, // back
        4, 0, 3, 4, 3, 5, // left
        1, 7, 6, 1, 6, 2, // right
        3, 2, 6, 3, 6, 5, // top
        0, 4, 7, 0, 7, 1, // bottom
    ];
    (vertices, indices)
}

/// UV sphere with `rings + 1` latitude rows of `segments + 1` vertices
pub fn sphere(params: &GeometryParams) -> Buffers {
    let rings = params.ring_count();
    let segments = params.segment_count();
    let radius = params.radius;

    let mut vertices = Vec::with_capacity(grid_len(rings, segments) * 3);
    for ring in 0..=rings {
        let phi = ring as f32 / rings as f32 * PI;
        for segment in 0..=segments {
            let theta = segment as f32 / segments as f32 * TAU;
            vertices.push(radius * phi.sin() * theta.cos());
            vertices.push(radius * phi.cos());
            vertices.push(radius * phi.sin() * theta.sin());
        }
    }

    (vertices, grid_indices(rings, segments))
}

/// Open cylinder around the Y axis, top and bottom vertex interleaved per column
pub fn cylinder(params: &GeometryParams) -> Buffers {
    let segments = params.segment_count();
    let half_height = params.height * 0.5;

    let mut vertices = Vec::with_capacity((segments as usize + 1) * 6);
    for segment in 0..=segments {
        let angle = segment as f32 / segments as f32 * TAU;
        let x = params.radius * angle.cos();
        let z = params.radius * angle.sin();
        vertices.extend_from_slice(&[x, half_height, z, x, -half_height, z]);
    }

    let mut indices = Vec::with_capacity(segments as usize * 6);
    for segment in 0..segments {
        let a = segment * 2;
        let b = (segment + 1) * 2;
        indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
    }

    (vertices, indices)
}

/// Flat quad in the XZ plane facing +Y
pub fn plane(params: &GeometryParams) -> Buffers {
    let w = params.width * 0.5;
    let d = params.depth * 0.5;
    let vertices = vec![
        -w, 0.0, d, //
        w, 0.0, d, //
        w, 0.0, -d, //
        -w, 0.0, -d, //
    ];
    (vertices, vec![0, 1, 2, 0, 2, 3])
}

/// Square pyramid: apex first, then the four base corners
pub fn pyramid(params: &GeometryParams) -> Buffers {
    let b = params.size * 0.5;
    let h = params.height * 0.5;
    let vertices = vec![
        0.0, h, 0.0, //
        -b, -h, b, //
        b, -h, b, //
        b, -h, -b, //
        -b, -h, -b, //
    ];
    let indices = vec![
        0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 1, // sides
        1, 4, 3, 1, 3, 2, // base
    ];
    (vertices, indices)
}

/// Ring torus around the Y axis
pub fn torus(params: &GeometryParams) -> Buffers {
    let radial = params.ring_count();
    let tubular = params.segment_count();

    let mut vertices = Vec::with_capacity(grid_len(radial, tubular) * 3);
    for i in 0..=radial {
        let theta = i as f32 / radial as f32 * TAU;
        for j in 0..=tubular {
            let phi = j as f32 / tubular as f32 * TAU;
            let ring = params.tube_radius.mul_add(phi.cos(), params.radius);
            vertices.push(ring * theta.cos());
            vertices.push(params.tube_radius * phi.sin());
            vertices.push(ring * theta.sin());
        }
    }

    (vertices, grid_indices(radial, tubular))
}

/// Vertices in a `(rows + 1) x (columns + 1)` grid
fn grid_len(rows: u32, columns: u32) -> usize {
    (rows as usize + 1) * (columns as usize + 1)
}

/// Two triangles per quad of a `(rows + 1) x (columns + 1)` vertex grid
fn grid_indices(rows: u32, columns: u32) -> Vec<u32> {
    let mut indices = Vec::with_capacity(rows as usize * columns as usize * 6);
    for row in 0..rows {
        for column in 0..columns {
            let a = row * (columns + 1) + column;
            let b = a + columns + 1;
            indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }
    indices
}

/// Per-vertex normals from accumulated unit face normals.
///
/// Zero-area faces contribute their raw (zero) cross product instead of
/// dividing by a zero length; vertices touched only by such faces get a zero
/// normal.
pub fn vertex_normals(vertices: &[f32], indices: &[u32]) -> Vec<f32> {
    let position = |i: usize| Vec3::new(vertices[i * 3], vertices[i * 3 + 1], vertices[i * 3 + 2]);
    let mut accumulated = vec![Vec3::zeros(); vertices.len() / 3];

    for face in indices.chunks_exact(3) {
        let (a, b, c) = (face[0] as usize, face[1] as usize, face[2] as usize);
        let normal = (position(b) - position(a)).cross(&(position(c) - position(a)));
        let length = normal.norm();
        let unit = if length > 0.0 { normal / length } else { normal };
        accumulated[a] += unit;
        accumulated[b] += unit;
        accumulated[c] += unit;
    }

    accumulated.iter().flat_map(|n| n.normalize_or_zero().to_array()).collect()
}
