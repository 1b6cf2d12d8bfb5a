// Copyright @yucwang 2026

use std::collections::HashMap;

use super::error::LoadError;
use super::vertex::{ Vertex, VERTEX_STRIDE };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };

/// Where the normal of each emitted vertex comes from.
#[derive(Debug, Copy, Clone)]
pub enum NormalSource<'a> {
    /// One normal per triangle, looked up by corner / 3.
    PerFace(&'a [Vector3f]),
    /// One normal per raw position id.
    PerVertex(&'a [Vector3f]),
}

/// Deduplicated vertex buffer plus triangle list indices into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertices flattened as `[px, py, pz, nx, ny, nz, u, v]` records.
    pub fn interleaved(&self) -> Vec<Float> {
        let mut out = Vec::with_capacity(self.vertices.len() * VERTEX_STRIDE);
        for v in &self.vertices {
            out.extend_from_slice(&v.to_array());
        }
        out
    }
}

/// Collapses the per-corner stream into unique vertices. Vertex `k` of the
/// result is the `k`-th distinct value met in corner order.
pub fn build_indexed_buffers(positions: &[Vector3f],
                             raw_indices: &[u32],
                             normals: NormalSource,
                             corner_texcoords: &[Vector2f]) -> MeshBuffers {
    debug_assert_eq!(raw_indices.len() % 3, 0);
    debug_assert_eq!(raw_indices.len(), corner_texcoords.len());
    // Unique vertices never outnumber corners, which the parser caps at u32.
    debug_assert!(raw_indices.len() <= u32::MAX as usize);

    let mut vertices = Vec::with_capacity(raw_indices.len());
    let mut indices = Vec::with_capacity(raw_indices.len());
    let mut unique: HashMap<Vertex, u32> = HashMap::with_capacity(raw_indices.len());

    for (corner, &vid) in raw_indices.iter().enumerate() {
        let vid = vid as usize;
        let normal = match normals {
            NormalSource::PerFace(face_normals) => face_normals[corner / 3],
            NormalSource::PerVertex(vertex_normals) => vertex_normals[vid],
        };
        let candidate = Vertex::new(positions[vid], normal, corner_texcoords[corner]);

        let next_id = vertices.len() as u32;
        let id = *unique.entry(candidate).or_insert_with(|| {
            vertices.push(candidate);
            next_id
        });
        indices.push(id);
    }

    MeshBuffers { vertices, indices }
}

/// Summary of the axis-aligned box around the published vertices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingStats {
    pub center: Vector3f,
    pub max_extent: Float,
}

impl Default for BoundingStats {
    fn default() -> Self {
        Self { center: Vector3f::zeros(), max_extent: 1.0 }
    }
}

impl BoundingStats {
    pub fn from_vertices(vertices: &[Vertex]) -> Result<Self, LoadError> {
        let bound = AABB::from_points(vertices.iter().map(|v| &v.position))
            .ok_or(LoadError::EmptyMesh)?;
        Ok(Self { center: bound.center(), max_extent: bound.max_extent() })
    }
}
