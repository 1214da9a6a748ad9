//! Corner collection and vertex welding.
//!
//! The two halves of turning a [`SourceMesh`](crate::mesh::SourceMesh) into GPU
//! buffers:
//!
//! - [`collect_triangles`] reads one attribute record per triangle corner
//! - [`weld`] / [`VertexWelder`] merge identical corners into shared vertices
//!
//! # Example
//!
//! ```
//! use gtmesh::mesh::PolyMesh;
//! use gtmesh::weld::{collect_triangles, weld};
//! use nalgebra::{Point2, Point3, Vector3};
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let uvs: Vec<Point2<f32>> = positions.iter().map(|p| Point2::new(p.x, p.y)).collect();
//!
//! let quad = PolyMesh::new(positions, vec![Vector3::z(); 4], vec![vec![0, 1, 2, 3]])
//!     .unwrap()
//!     .with_vertex_uvs(&uvs)
//!     .unwrap()
//!     .triangulate_fan();
//!
//! let welded = weld(&collect_triangles(&quad).unwrap());
//! assert_eq!(welded.vertex_count(), 4);
//! assert_eq!(welded.indices(), &[0, 1, 2, 0, 2, 3]);
//! ```

mod collect;
mod progress;
mod welder;

pub use collect::collect_triangles;
pub use progress::Progress;
pub use welder::{weld, VertexWelder};
