// Copyright @yucwang 2026

use std::hash::{Hash, Hasher};

use crate::math::constants::{ Float, Vector2f, Vector3f };

/// Floats per vertex in the interleaved layout: position, normal, texcoord.
pub const VERTEX_STRIDE: usize = 8;

/// GPU-facing vertex. Equality and hashing compare raw bit patterns, so
/// `0.0` and `-0.0` differ and a NaN equals an identical NaN.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct Vertex {
    pub position: Vector3f,
    pub normal: Vector3f,
    pub texcoord: Vector2f,
}

impl Vertex {
    pub fn new(position: Vector3f, normal: Vector3f, texcoord: Vector2f) -> Self {
        Self { position, normal, texcoord }
    }

    pub fn to_array(&self) -> [Float; VERTEX_STRIDE] {
        [self.position.x, self.position.y, self.position.z,
         self.normal.x, self.normal.y, self.normal.z,
         self.texcoord.x, self.texcoord.y]
    }

    fn bits(&self) -> [u32; VERTEX_STRIDE] {
        let values = self.to_array();
        let mut bits = [0u32; VERTEX_STRIDE];
        for (bit, value) in bits.iter_mut().zip(values.iter()) {
            *bit = value.to_bits();
        }
        bits
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}
