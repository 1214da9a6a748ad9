//! Face-corner attribute records.
//!
//! A [`CornerRecord`] holds everything a vertex buffer slot needs. Two corners are
//! the same vertex exactly when their [`VertexKey`]s are equal.

/// One face-corner's attributes.
#[derive(Debug, Clone, Copy)]
pub struct CornerRecord {
    /// Index into the source vertex pool. Informational only; not part of identity.
    pub source_index: usize,

    /// Position.
    pub position: [f32; 3],

    /// Normal.
    pub normal: [f32; 3],

    /// Texture coordinate.
    pub uv: [f32; 2],

    /// Skinning weights for up to four bones.
    pub blend_weights: [f32; 4],

    /// Bone indices matching `blend_weights`.
    pub blend_indices: [u32; 4],
}

impl CornerRecord {
    /// Skinning weights used when no skin binding is available: one full-weight bone.
    pub const DEFAULT_BLEND_WEIGHTS: [f32; 4] = [1.0, 0.0, 0.0, 0.0];

    /// Bone indices used when no skin binding is available.
    pub const DEFAULT_BLEND_INDICES: [u32; 4] = [0, 0, 0, 0];

    /// Create a corner with default skinning data.
    pub fn new(source_index: usize, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            source_index,
            position,
            normal,
            uv,
            blend_weights: Self::DEFAULT_BLEND_WEIGHTS,
            blend_indices: Self::DEFAULT_BLEND_INDICES,
        }
    }

    /// Replace the skinning data.
    pub fn with_skinning(mut self, weights: [f32; 4], indices: [u32; 4]) -> Self {
        self.blend_weights = weights;
        self.blend_indices = indices;
        self
    }

    /// The identity key of this corner.
    #[inline]
    pub fn key(&self) -> VertexKey {
        VertexKey {
            position: self.position.map(float_key),
            normal: self.normal.map(float_key),
            uv: self.uv.map(float_key),
            blend_weights: self.blend_weights.map(float_key),
            blend_indices: self.blend_indices,
        }
    }

    /// Whether two corners would weld into the same vertex.
    #[inline]
    pub fn same_vertex(&self, other: &CornerRecord) -> bool {
        self.key() == other.key()
    }
}

/// Exact-value identity of a corner's attributes.
///
/// Floats are compared by their IEEE-754 bit patterns, except that `-0.0` is folded
/// into `0.0` since the two compare equal. Any other difference, down to the last
/// mantissa bit, is a different vertex, and a NaN equals only a NaN with the same
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexKey {
    position: [u32; 3],
    normal: [u32; 3],
    uv: [u32; 2],
    blend_weights: [u32; 4],
    blend_indices: [u32; 4],
}

#[inline]
fn float_key(x: f32) -> u32 {
    if x == 0.0 {
        0
    } else {
        x.to_bits()
    }
}

/// Exactly three corners in emission order. The order defines the winding.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// The corners, in winding order.
    pub corners: [CornerRecord; 3],
}

impl Triangle {
    /// Create a triangle from three corners.
    pub fn new(c0: CornerRecord, c1: CornerRecord, c2: CornerRecord) -> Self {
        Self {
            corners: [c0, c1, c2],
        }
    }

    /// Iterate over the corners in winding order.
    pub fn iter(&self) -> impl Iterator<Item = &CornerRecord> {
        self.corners.iter()
    }
}
