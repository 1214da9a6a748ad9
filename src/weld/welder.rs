//! Vertex welding.
//!
//! Corners whose attributes are bit-for-bit identical share one vertex slot. Slots
//! are handed out in order of first occurrence, so the vertex buffer is
//! deterministic for a given triangle stream.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::mesh::{CornerRecord, Triangle, VertexKey, WeldedMesh};

/// Incremental vertex welder.
///
/// # Example
///
/// ```
/// use gtmesh::mesh::CornerRecord;
/// use gtmesh::weld::VertexWelder;
///
/// let a = CornerRecord::new(0, [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]);
/// let b = CornerRecord::new(1, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]);
///
/// let mut welder = VertexWelder::new();
/// assert_eq!(welder.insert(a), 0);
/// assert_eq!(welder.insert(b), 1);
/// assert_eq!(welder.insert(a), 0);
/// assert_eq!(welder.vertex_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct VertexWelder {
    slots: HashMap<VertexKey, u32>,
    vertices: Vec<CornerRecord>,
    indices: Vec<u32>,
}

impl VertexWelder {
    /// Create an empty welder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a welder sized for `triangles` triangles.
    pub fn with_capacity(triangles: usize) -> Self {
        let corners = triangles * 3;
        Self {
            slots: HashMap::with_capacity(corners),
            vertices: Vec::with_capacity(corners),
            indices: Vec::with_capacity(corners),
        }
    }

    /// Resolve a corner to its vertex slot and append that slot to the index buffer.
    ///
    /// The first corner seen with a given key becomes the stored vertex; later
    /// duplicates only add an index.
    pub fn insert(&mut self, corner: CornerRecord) -> u32 {
        let slot = match self.slots.entry(corner.key()) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let slot = self.vertices.len() as u32;
                self.vertices.push(corner);
                *e.insert(slot)
            }
        };
        self.indices.push(slot);
        slot
    }

    /// Weld the three corners of a triangle in winding order.
    pub fn push_triangle(&mut self, triangle: &Triangle) -> [u32; 3] {
        triangle.corners.map(|c| self.insert(c))
    }

    /// Number of unique vertices so far.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices so far.
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Finish welding and return the buffers.
    pub fn finish(self) -> WeldedMesh {
        WeldedMesh {
            corner_count: self.indices.len(),
            vertices: self.vertices,
            indices: self.indices,
        }
    }
}

/// Weld a triangle stream into a vertex buffer and an index buffer.
pub fn weld(triangles: &[Triangle]) -> WeldedMesh {
    let mut welder = VertexWelder::with_capacity(triangles.len());
    for triangle in triangles {
        welder.push_triangle(triangle);
    }
    welder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NZ: [f32; 3] = [0.0, 0.0, 1.0];

    fn corner(source: usize, position: [f32; 3], uv: [f32; 2]) -> CornerRecord {
        CornerRecord::new(source, position, NZ, uv)
    }

    /// Unit quad split along the 0-2 diagonal, with UVs equal to XY.
    fn quad_triangles() -> Vec<Triangle> {
        let c = |i: usize, x: f32, y: f32| corner(i, [x, y, 0.0], [x, y]);
        vec![
            Triangle::new(c(0, 0.0, 0.0), c(1, 1.0, 0.0), c(2, 1.0, 1.0)),
            Triangle::new(c(0, 0.0, 0.0), c(2, 1.0, 1.0), c(3, 0.0, 1.0)),
        ]
    }

    fn assert_invariants(mesh: &WeldedMesh) {
        assert_eq!(mesh.index_count() % 3, 0);
        assert!(mesh.indices().iter().all(|&i| (i as usize) < mesh.vertex_count()));
        assert!(mesh.has_unique_vertices());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_single_triangle() {
        let triangles = vec![Triangle::new(
            corner(0, [0.0, 0.0, 0.0], [0.0, 0.0]),
            corner(1, [1.0, 0.0, 0.0], [1.0, 0.0]),
            corner(2, [0.0, 1.0, 0.0], [0.0, 1.0]),
        )];
        let mesh = weld(&triangles);

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.indices(), &[0, 1, 2]);
        assert_invariants(&mesh);
    }

    #[test]
    fn test_shared_edge_welds() {
        let mesh = weld(&quad_triangles());

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
        assert_invariants(&mesh);
    }

    #[test]
    fn test_uv_seam_splits_vertex() {
        let mut triangles = quad_triangles();
        // Same position and normal as corner 0 of the first triangle, different UV.
        triangles[1].corners[0].uv = [0.25, 0.0];

        let mesh = weld(&triangles);

        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.indices(), &[0, 1, 2, 3, 2, 4]);
        assert_eq!(mesh.vertices()[0].position, mesh.vertices()[3].position);
        assert_invariants(&mesh);
    }

    #[test]
    fn test_last_bit_difference_splits_vertex() {
        let mut triangles = quad_triangles();
        let n = &mut triangles[1].corners[1].normal;
        n[2] = f32::from_bits(n[2].to_bits() - 1);

        let mesh = weld(&triangles);
        assert_eq!(mesh.vertex_count(), 5);
        assert_invariants(&mesh);
    }

    #[test]
    fn test_negative_zero_normal_welds() {
        let mut triangles = quad_triangles();
        triangles[1].corners[0].normal = [-0.0, 0.0, 1.0];

        let mesh = weld(&triangles);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
        // The first occurrence keeps its own bits.
        assert_eq!(mesh.vertices()[0].normal[0].to_bits(), 0);
        assert_invariants(&mesh);
    }

    #[test]
    fn test_skinning_participates_in_identity() {
        let mut triangles = quad_triangles();
        triangles[1].corners[0].blend_indices = [3, 0, 0, 0];

        let mesh = weld(&triangles);
        assert_eq!(mesh.vertex_count(), 5);
    }

    #[test]
    fn test_first_occurrence_is_canonical() {
        let mut triangles = quad_triangles();
        // Duplicate of vertex 0 with a different source index.
        triangles[1].corners[0].source_index = 99;

        let mesh = weld(&triangles);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.vertices()[0].source_index, 0);
    }

    #[test]
    fn test_order_is_first_occurrence() {
        let c = |i: usize| corner(i, [i as f32, 0.0, 0.0], [0.0, 0.0]);
        let triangles = vec![
            Triangle::new(c(5), c(3), c(5)),
            Triangle::new(c(1), c(3), c(7)),
        ];
        let mesh = weld(&triangles);

        let order: Vec<usize> = mesh.vertices().iter().map(|v| v.source_index).collect();
        assert_eq!(order, vec![5, 3, 1, 7]);
        assert_eq!(mesh.indices(), &[0, 1, 0, 2, 1, 3]);
    }

    #[test]
    fn test_empty() {
        let mesh = weld(&[]);
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.index_count(), 0);
        assert!(mesh.is_empty());
        assert_invariants(&mesh);
    }

    #[test]
    fn test_stats() {
        let stats = weld(&quad_triangles()).stats();
        assert_eq!(stats.corners, 6);
        assert_eq!(stats.vertices, 4);
        assert_eq!(stats.triangles, 2);
    }

    #[test]
    fn test_incremental_matches_batch() {
        let triangles = quad_triangles();
        let mut welder = VertexWelder::new();
        assert_eq!(welder.push_triangle(&triangles[0]), [0, 1, 2]);
        assert_eq!(welder.push_triangle(&triangles[1]), [0, 2, 3]);
        assert_eq!(welder.index_count(), 6);

        let incremental = welder.finish();
        let batch = weld(&triangles);
        assert_eq!(incremental.indices(), batch.indices());
        assert_eq!(incremental.vertex_count(), batch.vertex_count());
    }

    #[test]
    fn test_grid_dedup() {
        // n x n grid of quads, two triangles each, all corners sharing attributes by position.
        let n = 8;
        let c = |i: usize, j: usize| {
            let (x, y) = (i as f32, j as f32);
            corner(j * (n + 1) + i, [x, y, 0.0], [x / n as f32, y / n as f32])
        };
        let mut triangles = Vec::new();
        for j in 0..n {
            for i in 0..n {
                triangles.push(Triangle::new(c(i, j), c(i + 1, j), c(i + 1, j + 1)));
                triangles.push(Triangle::new(c(i, j), c(i + 1, j + 1), c(i, j + 1)));
            }
        }

        let mesh = weld(&triangles);
        assert_eq!(mesh.vertex_count(), (n + 1) * (n + 1));
        assert_eq!(mesh.triangle_count(), 2 * n * n);
        assert_invariants(&mesh);
    }
}
