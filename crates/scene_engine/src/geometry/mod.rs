//! Procedural geometry
//!
//! A [`Geometry`] is generated once from a shape tag and its parameters and is
//! never mutated afterwards. Meshes hold it behind an `Arc` so any number of
//! them can share one buffer; [`GeometryCache`] hands out those shared handles.

pub mod cache;
pub mod primitives;

pub use cache::GeometryCache;

use serde::{Deserialize, Serialize};

/// Primitive shape tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum GeometryType {
    /// Cube
    Box,
    /// Latitude/longitude sphere
    Sphere,
    /// Open cylinder
    Cylinder,
    /// Single quad
    Plane,
    /// Square pyramid
    Pyramid,
    /// Ring torus
    Torus,
    /// Anything unrecognised; generates empty buffers
    Unknown,
}

impl From<String> for GeometryType {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl GeometryType {
    /// Parse a shape name, mapping unrecognised names to [`GeometryType::Unknown`]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "box" | "cube" => Self::Box,
            "sphere" => Self::Sphere,
            "cylinder" => Self::Cylinder,
            "plane" => Self::Plane,
            "pyramid" => Self::Pyramid,
            "torus" => Self::Torus,
            _ => Self::Unknown,
        }
    }

    /// Lowercase shape name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
            Self::Plane => "plane",
            Self::Pyramid => "pyramid",
            Self::Torus => "torus",
            Self::Unknown => "unknown",
        }
    }
}

/// Shape parameters; each generator reads only the fields it needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryParams {
    /// Edge length for box, base width for pyramid
    pub size: f32,
    /// Sphere/cylinder radius, torus ring radius
    pub radius: f32,
    /// Cylinder and pyramid height
    pub height: f32,
    /// Plane extent along X
    pub width: f32,
    /// Plane extent along Z
    pub depth: f32,
    /// Torus tube radius
    pub tube_radius: f32,
    /// Longitude segments (sphere, cylinder), tubular segments (torus)
    pub segments: u32,
    /// Latitude rings (sphere), radial segments (torus)
    pub rings: u32,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            size: 2.0,
            radius: 1.0,
            height: 2.0,
            width: 2.0,
            depth: 2.0,
            tube_radius: 0.3,
            segments: 16,
            rings: 16,
        }
    }
}

impl GeometryParams {
    /// Upper bound on `segments` and `rings`; larger values are clamped
    pub const MAX_SEGMENTS: u32 = 512;

    /// `segments` limited to `1..=MAX_SEGMENTS`
    pub fn segment_count(&self) -> u32 {
        self.segments.clamp(1, Self::MAX_SEGMENTS)
    }

    /// `rings` limited to `1..=MAX_SEGMENTS`
    pub fn ring_count(&self) -> u32 {
        self.rings.clamp(1, Self::MAX_SEGMENTS)
    }

    /// Bit-exact key used to share generated buffers
    pub(crate) fn key(&self) -> [u32; 8] {
        [
            self.size.to_bits(),
            self.radius.to_bits(),
            self.height.to_bits(),
            self.width.to_bits(),
            self.depth.to_bits(),
            self.tube_radius.to_bits(),
            self.segment_count(),
            self.ring_count(),
        ]
    }
}

/// Immutable vertex, index and normal buffers for one shape
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    geometry_type: GeometryType,
    params: GeometryParams,
    vertices: Vec<f32>,
    indices: Vec<u32>,
    normals: Vec<f32>,
}

impl Geometry {
    /// Generate buffers and normals for a shape
    pub fn generate(geometry_type: GeometryType, params: GeometryParams) -> Self {
        if params.segments > GeometryParams::MAX_SEGMENTS || params.rings > GeometryParams::MAX_SEGMENTS {
            log::warn!(
                "Clamping {} tessellation {}x{} to at most {}",
                geometry_type.name(),
                params.segments,
                params.rings,
                GeometryParams::MAX_SEGMENTS
            );
        }
        let (vertices, indices) = match geometry_type {
            GeometryType::Box => primitives::cube(&params),
            GeometryType::Sphere => primitives::sphere(&params),
            GeometryType::Cylinder => primitives::cylinder(&params),
            GeometryType::Plane => primitives::plane(&params),
            GeometryType::Pyramid => primitives::pyramid(&params),
            GeometryType::Torus => primitives::torus(&params),
            GeometryType::Unknown => (Vec::new(), Vec::new()),
        };
        let normals = primitives::vertex_normals(&vertices, &indices);

        Self {
            geometry_type,
            params,
            vertices,
            indices,
            normals,
        }
    }

    /// Generate a shape with default parameters
    pub fn with_defaults(geometry_type: GeometryType) -> Self {
        Self::generate(geometry_type, GeometryParams::default())
    }

    /// Shape tag
    pub const fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    /// Parameters the buffers were generated from
    pub const fn params(&self) -> &GeometryParams {
        &self.params
    }

    /// Packed vertex positions
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Triangle indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Packed per-vertex normals
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex positions as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Indices as raw bytes for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
