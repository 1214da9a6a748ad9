//! Source meshes handed to the exporter.
//!
//! Scene traversal, transforms and triangulation happen outside this crate. What
//! arrives here is described by the [`SourceMesh`] trait: a face list, per-vertex
//! positions and normals, and a per-face-corner UV lookup.
//!
//! [`PolyMesh`] is an owned implementation used by the file loaders and tests.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{ExportError, Result};

/// Read-only view of one sub-mesh's geometry.
pub trait SourceMesh {
    /// Optional display name, used in error messages and logs.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Number of faces.
    fn num_faces(&self) -> usize;

    /// Vertex indices of a face, in winding order.
    fn face_corners(&self, face: usize) -> &[usize];

    /// Position of a vertex.
    fn position(&self, vertex: usize) -> [f32; 3];

    /// Normal of a vertex.
    fn normal(&self, vertex: usize) -> [f32; 3];

    /// Whether a UV layer is present.
    fn has_uvs(&self) -> bool;

    /// UV of the `corner`-th corner of `face`.
    ///
    /// Only called when [`has_uvs`](SourceMesh::has_uvs) returns `true`.
    fn uv(&self, face: usize, corner: usize) -> [f32; 2];
}

impl<T: SourceMesh + ?Sized> SourceMesh for &T {
    fn name(&self) -> Option<&str> {
        (**self).name()
    }

    fn num_faces(&self) -> usize {
        (**self).num_faces()
    }

    fn face_corners(&self, face: usize) -> &[usize] {
        (**self).face_corners(face)
    }

    fn position(&self, vertex: usize) -> [f32; 3] {
        (**self).position(vertex)
    }

    fn normal(&self, vertex: usize) -> [f32; 3] {
        (**self).normal(vertex)
    }

    fn has_uvs(&self) -> bool {
        (**self).has_uvs()
    }

    fn uv(&self, face: usize, corner: usize) -> [f32; 2] {
        (**self).uv(face, corner)
    }
}

/// A polygon mesh with arbitrary-sided faces and per-corner UVs.
///
/// Face corners are stored flat; `face_offsets[f]..face_offsets[f + 1]` is the
/// range of face `f`. The UV layer, when present, is parallel to `corners`.
#[derive(Debug, Clone, Default)]
pub struct PolyMesh {
    name: Option<String>,
    positions: Vec<Point3<f32>>,
    normals: Vec<Vector3<f32>>,
    corners: Vec<usize>,
    face_offsets: Vec<usize>,
    uvs: Option<Vec<Point2<f32>>>,
}

impl PolyMesh {
    /// Build a mesh from positions, per-vertex normals and polygon faces.
    ///
    /// # Example
    /// ```
    /// use gtmesh::mesh::PolyMesh;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let positions = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ];
    /// let normals = vec![Vector3::z(); 4];
    /// let mesh = PolyMesh::new(positions, normals, vec![vec![0, 1, 2, 3]]).unwrap();
    /// assert_eq!(mesh.num_faces(), 1);
    /// assert!(!mesh.is_triangulated());
    /// ```
    pub fn new(
        positions: Vec<Point3<f32>>,
        normals: Vec<Vector3<f32>>,
        faces: Vec<Vec<usize>>,
    ) -> Result<Self> {
        if normals.len() != positions.len() {
            return Err(ExportError::AttributeCountMismatch {
                attribute: "normals",
                expected: positions.len(),
                found: normals.len(),
            });
        }

        let mut corners = Vec::with_capacity(faces.iter().map(Vec::len).sum());
        let mut face_offsets = Vec::with_capacity(faces.len() + 1);
        face_offsets.push(0);

        for (fi, face) in faces.iter().enumerate() {
            for &vi in face {
                if vi >= positions.len() {
                    return Err(ExportError::InvalidVertexIndex { face: fi, vertex: vi });
                }
            }
            corners.extend_from_slice(face);
            face_offsets.push(corners.len());
        }

        Ok(Self {
            name: None,
            positions,
            normals,
            corners,
            face_offsets,
            uvs: None,
        })
    }

    /// Build a mesh from triangle faces.
    pub fn from_triangles(
        positions: Vec<Point3<f32>>,
        normals: Vec<Vector3<f32>>,
        faces: &[[usize; 3]],
    ) -> Result<Self> {
        Self::new(positions, normals, faces.iter().map(|f| f.to_vec()).collect())
    }

    /// Attach a UV layer given as one list of UVs per face.
    pub fn with_uvs(mut self, uvs: Vec<Vec<Point2<f32>>>) -> Result<Self> {
        if uvs.len() != self.num_faces() {
            return Err(ExportError::AttributeCountMismatch {
                attribute: "uv faces",
                expected: self.num_faces(),
                found: uvs.len(),
            });
        }

        let mut flat = Vec::with_capacity(self.corners.len());
        for (fi, face_uvs) in uvs.into_iter().enumerate() {
            let expected = self.face_len(fi);
            if face_uvs.len() != expected {
                return Err(ExportError::InvalidUvLayer {
                    face: fi,
                    expected,
                    found: face_uvs.len(),
                });
            }
            flat.extend(face_uvs);
        }

        self.uvs = Some(flat);
        Ok(self)
    }

    /// Attach a UV layer stored per vertex, expanding it to every corner.
    pub fn with_vertex_uvs(mut self, uvs: &[Point2<f32>]) -> Result<Self> {
        if uvs.len() != self.positions.len() {
            return Err(ExportError::AttributeCountMismatch {
                attribute: "uvs",
                expected: self.positions.len(),
                found: uvs.len(),
            });
        }
        self.uvs = Some(self.corners.iter().map(|&v| uvs[v]).collect());
        Ok(self)
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Number of source vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.face_offsets.len().saturating_sub(1)
    }

    /// Total number of face corners.
    #[inline]
    pub fn num_corners(&self) -> usize {
        self.corners.len()
    }

    /// Number of corners of a face.
    #[inline]
    pub fn face_len(&self, face: usize) -> usize {
        self.face_offsets[face + 1] - self.face_offsets[face]
    }

    /// Whether every face is a triangle.
    pub fn is_triangulated(&self) -> bool {
        (0..self.num_faces()).all(|f| self.face_len(f) == 3)
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    /// Per-vertex normals.
    pub fn normals(&self) -> &[Vector3<f32>] {
        &self.normals
    }

    /// Fan-triangulate every face.
    ///
    /// A face `(v0, v1, .., vn-1)` becomes `(v0, vi, vi+1)` for `i` in `1..n-1`,
    /// keeping winding order and carrying each corner's UV along. Faces with fewer
    /// than three corners are dropped.
    pub fn triangulate_fan(&self) -> PolyMesh {
        let mut corners = Vec::with_capacity(self.corners.len());
        let mut face_offsets = vec![0];
        let mut uvs = self.uvs.as_ref().map(|_| Vec::with_capacity(self.corners.len()));

        for f in 0..self.num_faces() {
            let start = self.face_offsets[f];
            let n = self.face_len(f);
            if n < 3 {
                continue;
            }

            for i in 1..n - 1 {
                for c in [start, start + i, start + i + 1] {
                    corners.push(self.corners[c]);
                    if let (Some(out), Some(src)) = (uvs.as_mut(), self.uvs.as_ref()) {
                        out.push(src[c]);
                    }
                }
                face_offsets.push(corners.len());
            }
        }

        PolyMesh {
            name: self.name.clone(),
            positions: self.positions.clone(),
            normals: self.normals.clone(),
            corners,
            face_offsets,
            uvs,
        }
    }
}

impl SourceMesh for PolyMesh {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn num_faces(&self) -> usize {
        PolyMesh::num_faces(self)
    }

    fn face_corners(&self, face: usize) -> &[usize] {
        &self.corners[self.face_offsets[face]..self.face_offsets[face + 1]]
    }

    fn position(&self, vertex: usize) -> [f32; 3] {
        self.positions[vertex].coords.into()
    }

    fn normal(&self, vertex: usize) -> [f32; 3] {
        self.normals[vertex].into()
    }

    fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    fn uv(&self, face: usize, corner: usize) -> [f32; 2] {
        match &self.uvs {
            Some(uvs) => uvs[self.face_offsets[face] + corner].coords.into(),
            None => [0.0, 0.0],
        }
    }
}
