//! # gtmesh
//!
//! Vertex welding and binary export of triangulated meshes.
//!
//! gtmesh turns polygon meshes with per-corner attributes into compact,
//! GPU-ready `.gtmesh` files: a deduplicated vertex buffer and a triangle-list
//! index buffer per sub-mesh.
//!
//! ## Pipeline
//!
//! - **Collect**: one [`CornerRecord`](mesh::CornerRecord) per triangle corner
//!   (position, normal, UV, blend weights, blend indices)
//! - **Weld**: corners with bit-identical attributes share a vertex slot; slots
//!   are assigned in order of first occurrence
//! - **Encode**: little-endian `.gtmesh` stream, one block per sub-mesh
//!
//! ## Quick Start
//!
//! ```no_run
//! use gtmesh::prelude::*;
//!
//! let sources = gtmesh::io::load_sources("model.glb").unwrap();
//! let summary = export_to_path("model.gtmesh", &sources, &ExportOptions::default(), &Progress::none())
//!     .unwrap();
//! println!("{} vertices", summary.total_vertices());
//! ```
//!
//! ## Welding by Hand
//!
//! ```
//! use gtmesh::prelude::*;
//!
//! let corner = |x: f32, y: f32| CornerRecord::new(0, [x, y, 0.0], [0.0, 0.0, 1.0], [x, y]);
//! let triangles = vec![
//!     Triangle::new(corner(0.0, 0.0), corner(1.0, 0.0), corner(1.0, 1.0)),
//!     Triangle::new(corner(0.0, 0.0), corner(1.0, 1.0), corner(0.0, 1.0)),
//! ];
//!
//! let mesh = weld(&triangles);
//! assert_eq!(mesh.vertex_count(), 4);
//! assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
//!
//! let bytes = gtmesh::io::gtmesh::to_bytes(&[mesh]).unwrap();
//! let file = gtmesh::io::gtmesh::from_bytes(&bytes).unwrap();
//! assert_eq!(file.sub_meshes[0].mesh.vertex_count(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod export;
pub mod io;
pub mod mesh;
pub mod weld;

/// Prelude module for convenient imports.
///
/// ```
/// use gtmesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ExportError, Result};
    pub use crate::export::{export, export_to_path, weld_source, ExportOptions, ExportSummary};
    pub use crate::mesh::{
        CornerRecord, GpuVertex, MeshFile, PolyMesh, SourceMesh, SubMesh, Triangle, WeldStats,
        WeldedMesh,
    };
    pub use crate::weld::{collect_triangles, weld, Progress, VertexWelder};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
