//! Core mesh data structures.
//!
//! # Overview
//!
//! Geometry flows through three representations:
//!
//! - [`SourceMesh`] / [`PolyMesh`]: faces with per-vertex positions and normals and
//!   per-face-corner UVs, as supplied by the caller.
//! - [`Triangle`] of [`CornerRecord`]s: one record per triangle corner, carrying the
//!   full attribute set.
//! - [`WeldedMesh`]: unique vertices plus an index buffer, ready for encoding or
//!   GPU upload.
//!
//! # Construction
//!
//! ```
//! use gtmesh::mesh::PolyMesh;
//! use nalgebra::{Point2, Point3, Vector3};
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let uvs = vec![vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(0.5, 1.0),
//! ]];
//!
//! let mesh = PolyMesh::from_triangles(positions, vec![Vector3::z(); 3], &[[0, 1, 2]])
//!     .unwrap()
//!     .with_uvs(uvs)
//!     .unwrap();
//! assert!(mesh.is_triangulated());
//! ```

mod corner;
mod source;
mod welded;

pub use corner::{CornerRecord, Triangle, VertexKey};
pub use source::{PolyMesh, SourceMesh};
pub use welded::{GpuVertex, MeshFile, SubMesh, WeldStats, WeldedMesh};
