//! The export pipeline: collect, weld, encode.
//!
//! Sub-meshes are processed in input order and receive ids `0, 1, 2, ..`. In the
//! default sequential mode each source is collected, welded and written before the
//! next one is touched. With [`ExportOptions::with_parallel`] all sources are
//! welded concurrently first and then written in id order, producing the same
//! bytes.
//!
//! A failing source aborts the export. Sub-meshes before it have already been
//! written; nothing of the failing one is.
//!
//! # Example
//!
//! ```
//! use gtmesh::export::{export, ExportOptions};
//! use gtmesh::mesh::PolyMesh;
//! use gtmesh::weld::Progress;
//! use nalgebra::{Point2, Point3, Vector3};
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let uvs = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
//! let triangle = PolyMesh::from_triangles(positions, vec![Vector3::z(); 3], &[[0, 1, 2]])
//!     .unwrap()
//!     .with_vertex_uvs(&uvs)
//!     .unwrap();
//!
//! let mut bytes = Vec::new();
//! let summary = export(&mut bytes, &[triangle], &ExportOptions::default(), &Progress::none()).unwrap();
//! assert_eq!(summary.total_vertices(), 3);
//! assert_eq!(&bytes[..4], &1u32.to_le_bytes());
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;

use crate::error::Result;
use crate::io::gtmesh::MeshFileWriter;
use crate::mesh::{SourceMesh, WeldStats, WeldedMesh};
use crate::weld::{collect_triangles, weld, Progress};

/// Options for an export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Weld sub-meshes on the rayon thread pool (default: false).
    ///
    /// Output bytes are the same either way.
    pub parallel: bool,
}

impl ExportOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to weld sub-meshes in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// What an export wrote.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    /// Weld statistics per sub-mesh, in id order.
    pub sub_meshes: Vec<WeldStats>,
}

impl ExportSummary {
    /// Total unique vertices written.
    pub fn total_vertices(&self) -> usize {
        self.sub_meshes.iter().map(|s| s.vertices).sum()
    }

    /// Total triangles written.
    pub fn total_triangles(&self) -> usize {
        self.sub_meshes.iter().map(|s| s.triangles).sum()
    }
}

/// Collect and weld one source.
pub fn weld_source<S: SourceMesh + ?Sized>(source: &S) -> Result<WeldedMesh> {
    let triangles = collect_triangles(source)?;
    Ok(weld(&triangles))
}

/// Export sources to a writer as a `.gtmesh` stream.
pub fn export<W, S>(
    writer: W,
    sources: &[S],
    options: &ExportOptions,
    progress: &Progress,
) -> Result<ExportSummary>
where
    W: Write,
    S: SourceMesh + Sync,
{
    let total = sources.len();
    let mut file = MeshFileWriter::new(writer, total)?;
    let mut summary = ExportSummary {
        sub_meshes: Vec::with_capacity(total),
    };

    if options.parallel {
        let welded: Vec<Result<WeldedMesh>> = sources.par_iter().map(weld_source).collect();
        for (source, mesh) in sources.iter().zip(welded) {
            write_one(&mut file, source, &mesh?, total, progress, &mut summary)?;
        }
    } else {
        for source in sources {
            let mesh = weld_source(source)?;
            write_one(&mut file, source, &mesh, total, progress, &mut summary)?;
        }
    }

    file.finish()?;

    log::info!(
        "exported {} sub-meshes ({} vertices, {} triangles)",
        total,
        summary.total_vertices(),
        summary.total_triangles()
    );

    Ok(summary)
}

/// Export sources to a `.gtmesh` file.
///
/// The file is created or truncated. On error a partial file may remain.
pub fn export_to_path<P, S>(
    path: P,
    sources: &[S],
    options: &ExportOptions,
    progress: &Progress,
) -> Result<ExportSummary>
where
    P: AsRef<Path>,
    S: SourceMesh + Sync,
{
    let file = File::create(path.as_ref())?;
    export(BufWriter::new(file), sources, options, progress)
}

fn write_one<W: Write, S: SourceMesh + ?Sized>(
    file: &mut MeshFileWriter<W>,
    source: &S,
    mesh: &WeldedMesh,
    total: usize,
    progress: &Progress,
    summary: &mut ExportSummary,
) -> Result<()> {
    let id = file.write_sub_mesh(mesh)?;
    let stats = mesh.stats();

    log::debug!(
        "sub-mesh {} ({}): {} corners welded to {} vertices ({:.1}% reuse), {} indices",
        id,
        source.name().unwrap_or("unnamed"),
        stats.corners,
        stats.vertices,
        stats.reuse_ratio() * 100.0,
        mesh.index_count()
    );

    summary.sub_meshes.push(stats);
    progress.report_sub_mesh(id, total, &stats);
    Ok(())
}
