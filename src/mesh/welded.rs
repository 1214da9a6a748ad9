//! Welded vertex and index buffers.

use bytemuck::{Pod, Zeroable};

use super::corner::CornerRecord;
use crate::error::{ExportError, Result};

/// A deduplicated vertex buffer with a triangle-list index buffer.
///
/// Invariants:
/// - `indices.len()` is a multiple of 3
/// - every index is `< vertices.len()`
/// - no two vertices share an identity key
/// - vertices are ordered by first occurrence in the triangle stream
///
/// The last two hold for every mesh the welder produces. [`MeshFile::merged`] only
/// keeps the first two, since it does not weld across sub-meshes.
#[derive(Debug, Clone, Default)]
pub struct WeldedMesh {
    pub(crate) vertices: Vec<CornerRecord>,
    pub(crate) indices: Vec<u32>,
    pub(crate) corner_count: usize,
}

impl WeldedMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from existing buffers, checking the invariants.
    pub fn from_parts(vertices: Vec<CornerRecord>, indices: Vec<u32>) -> Result<Self> {
        let mesh = Self {
            corner_count: indices.len(),
            vertices,
            indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// The unique vertices, in slot order.
    #[inline]
    pub fn vertices(&self) -> &[CornerRecord] {
        &self.vertices
    }

    /// The index buffer.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of unique vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices.
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Welding statistics.
    pub fn stats(&self) -> WeldStats {
        WeldStats {
            corners: self.corner_count,
            vertices: self.vertices.len(),
            triangles: self.triangle_count(),
        }
    }

    /// Check the buffer invariants.
    ///
    /// Only structural invariants are checked here; key uniqueness is guaranteed by
    /// construction in the welder and by [`WeldedMesh::has_unique_vertices`].
    pub fn validate(&self) -> Result<()> {
        if self.indices.len() % 3 != 0 {
            return Err(ExportError::invariant(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }

        if u32::try_from(self.vertices.len()).is_err() {
            return Err(ExportError::invariant(format!(
                "vertex count {} does not fit in u32",
                self.vertices.len()
            )));
        }

        let count = self.vertices.len() as u64;
        if let Some((pos, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| u64::from(i) >= count)
        {
            return Err(ExportError::invariant(format!(
                "index {} at position {} out of range for {} vertices",
                index, pos, count
            )));
        }

        Ok(())
    }

    /// Whether no two vertices share an identity key.
    pub fn has_unique_vertices(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.vertices.len());
        self.vertices.iter().all(|v| seen.insert(v.key()))
    }

    /// Interleaved vertex data for direct GPU upload.
    pub fn gpu_vertices(&self) -> Vec<GpuVertex> {
        self.vertices.iter().map(GpuVertex::from).collect()
    }

    /// Vertex data as raw bytes in native byte order.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.gpu_vertices()).to_vec()
    }

    /// Index data as raw bytes in native byte order.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Counters describing one weld.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeldStats {
    /// Corners fed to the welder.
    pub corners: usize,
    /// Unique vertices produced.
    pub vertices: usize,
    /// Triangles produced.
    pub triangles: usize,
}

impl WeldStats {
    /// Fraction of corners that were merged into an earlier vertex.
    pub fn reuse_ratio(&self) -> f64 {
        if self.corners == 0 {
            0.0
        } else {
            1.0 - self.vertices as f64 / self.corners as f64
        }
    }
}

/// Interleaved vertex layout: position, normal, uv, blend weights, blend indices.
///
/// 64 bytes, no padding. Field order matches the `.gtmesh` vertex record.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    /// Position.
    pub position: [f32; 3],
    /// Normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
    /// Skinning weights.
    pub blend_weights: [f32; 4],
    /// Bone indices.
    pub blend_indices: [u32; 4],
}

impl GpuVertex {
    /// Size of one vertex in bytes.
    pub const SIZE: usize = std::mem::size_of::<GpuVertex>();
}

impl From<&CornerRecord> for GpuVertex {
    fn from(c: &CornerRecord) -> Self {
        Self {
            position: c.position,
            normal: c.normal,
            uv: c.uv,
            blend_weights: c.blend_weights,
            blend_indices: c.blend_indices,
        }
    }
}

/// One sub-mesh of a `.gtmesh` file.
#[derive(Debug, Clone)]
pub struct SubMesh {
    /// Zero-based id, sequential within the file.
    pub id: u32,
    /// The welded buffers.
    pub mesh: WeldedMesh,
}

/// All sub-meshes of a `.gtmesh` file, in id order.
#[derive(Debug, Clone, Default)]
pub struct MeshFile {
    /// The sub-meshes.
    pub sub_meshes: Vec<SubMesh>,
}

impl MeshFile {
    /// Build a file from welded meshes, assigning ids `0..n`.
    ///
    /// Fails with [`ExportError::InvariantViolation`] if there are more sub-meshes
    /// than a `u32` id can number.
    pub fn from_meshes(meshes: Vec<WeldedMesh>) -> Result<Self> {
        let sub_meshes = meshes
            .into_iter()
            .enumerate()
            .map(|(i, mesh)| Ok(SubMesh { id: sub_mesh_id(i)?, mesh }))
            .collect::<Result<_>>()?;
        Ok(Self { sub_meshes })
    }

    /// Concatenate all sub-meshes into one vertex buffer and one index buffer.
    ///
    /// Sub-meshes are appended in id order. Each sub-mesh's indices are shifted by
    /// the number of vertices that precede it, so every triangle keeps pointing at
    /// its own vertices. Vertices are not welded across sub-meshes: two sub-meshes
    /// with an identical vertex keep one copy each.
    ///
    /// Fails with [`ExportError::InvariantViolation`] if the combined vertex count
    /// does not fit a `u32` index.
    ///
    /// # Example
    ///
    /// ```
    /// use gtmesh::io::gtmesh::from_bytes;
    /// use gtmesh::mesh::{CornerRecord, WeldedMesh};
    ///
    /// let c = |x: f32| CornerRecord::new(0, [x, 0.0, 0.0], [0.0, 0.0, 1.0], [x, 0.0]);
    /// let a = WeldedMesh::from_parts(vec![c(0.0), c(1.0), c(2.0)], vec![0, 1, 2]).unwrap();
    /// let b = WeldedMesh::from_parts(vec![c(3.0), c(4.0), c(5.0)], vec![2, 1, 0]).unwrap();
    ///
    /// let bytes = gtmesh::io::gtmesh::to_bytes(&[a, b]).unwrap();
    /// let merged = from_bytes(&bytes).unwrap().merged().unwrap();
    /// assert_eq!(merged.indices(), &[0, 1, 2, 5, 4, 3]);
    /// ```
    pub fn merged(&self) -> Result<WeldedMesh> {
        let mut vertices = Vec::with_capacity(self.meshes().map(WeldedMesh::vertex_count).sum());
        let mut indices = Vec::with_capacity(self.meshes().map(WeldedMesh::index_count).sum());
        let mut corner_count = 0;

        for sub in &self.sub_meshes {
            let offset = u32::try_from(vertices.len()).map_err(|_| {
                ExportError::invariant(format!(
                    "merged vertex count {} before sub-mesh {} exceeds u32",
                    vertices.len(),
                    sub.id
                ))
            })?;

            for &index in sub.mesh.indices() {
                let shifted = index.checked_add(offset).ok_or_else(|| {
                    ExportError::invariant(format!(
                        "index {} of sub-mesh {} overflows u32 after offset {}",
                        index, sub.id, offset
                    ))
                })?;
                indices.push(shifted);
            }

            vertices.extend_from_slice(sub.mesh.vertices());
            corner_count += sub.mesh.corner_count;
        }

        let merged = WeldedMesh {
            vertices,
            indices,
            corner_count,
        };
        merged.validate()?;
        Ok(merged)
    }

    /// Number of sub-meshes.
    pub fn len(&self) -> usize {
        self.sub_meshes.len()
    }

    /// Whether the file has no sub-meshes.
    pub fn is_empty(&self) -> bool {
        self.sub_meshes.is_empty()
    }

    /// The welded meshes, in id order.
    pub fn meshes(&self) -> impl Iterator<Item = &WeldedMesh> + '_ {
        self.sub_meshes.iter().map(|s| &s.mesh)
    }
}

fn sub_mesh_id(position: usize) -> Result<u32> {
    u32::try_from(position)
        .map_err(|_| ExportError::invariant(format!("sub-mesh {} has no u32 id", position)))
}
