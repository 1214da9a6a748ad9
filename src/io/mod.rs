//! Mesh file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | GT mesh | `.gtmesh` | ✓ | ✓ | Welded output format |
//! | glTF | `.gltf`, `.glb` | ✓ | ✗ | One source per triangle primitive |
//! | PLY | `.ply` | ✓ | ✗ | Stanford polygon format |
//!
//! glTF and PLY are source formats: they load as [`PolyMesh`]es to be exported.
//! `.gtmesh` files can also be loaded as sources, which re-exports them.
//!
//! # Usage
//!
//! ```no_run
//! use gtmesh::io;
//!
//! let sources = io::load_sources("model.gltf").unwrap();
//! println!("{} sub-meshes", sources.len());
//! ```

pub mod gltf;
pub mod gtmesh;
pub mod ply;

use std::path::Path;

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{ExportError, Result};
use crate::mesh::{PolyMesh, WeldedMesh};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.gtmesh` binary format.
    GtMesh,
    /// glTF format.
    Gltf,
    /// glTF binary format.
    Glb,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "gtmesh" => Some(Format::GtMesh),
            "gltf" => Some(Format::Gltf),
            "glb" => Some(Format::Glb),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| ExportError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load the source meshes of a file with automatic format detection.
///
/// Each returned mesh becomes one sub-mesh when exported.
pub fn load_sources<P: AsRef<Path>>(path: P) -> Result<Vec<PolyMesh>> {
    let path = path.as_ref();

    match detect(path)? {
        Format::Gltf | Format::Glb => gltf::load(path),
        Format::Ply => Ok(vec![ply::load(path)?]),
        Format::GtMesh => gtmesh::load(path)?
            .sub_meshes
            .iter()
            .map(|sub| {
                welded_to_source(&sub.mesh)
                    .map(|mesh| mesh.with_name(format!("sub-mesh {}", sub.id)))
            })
            .collect(),
    }
}

/// Save welded meshes. Only `.gtmesh` is supported as an output format.
pub fn save<P: AsRef<Path>>(path: P, meshes: &[WeldedMesh]) -> Result<()> {
    let path = path.as_ref();

    match detect(path)? {
        Format::GtMesh => gtmesh::save(path, meshes),
        other => Err(ExportError::UnsupportedFormat {
            extension: format!("{:?} (output must be .gtmesh)", other).to_lowercase(),
        }),
    }
}

/// Turn a welded mesh back into a triangulated source with per-vertex UVs.
///
/// Skinning data is dropped; it is defaulted again on export.
fn welded_to_source(mesh: &WeldedMesh) -> Result<PolyMesh> {
    let positions: Vec<Point3<f32>> = mesh.vertices().iter().map(|v| v.position.into()).collect();
    let normals: Vec<Vector3<f32>> = mesh.vertices().iter().map(|v| v.normal.into()).collect();
    let uvs: Vec<Point2<f32>> = mesh.vertices().iter().map(|v| v.uv.into()).collect();
    let faces: Vec<[usize; 3]> = mesh
        .triangles()
        .map(|t| t.map(|i| i as usize))
        .collect();

    PolyMesh::from_triangles(positions, normals, &faces)?.with_vertex_uvs(&uvs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weld::{collect_triangles, weld};

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b.GTMESH"), Some(Format::GtMesh));
        assert_eq!(Format::from_path("scene.glb"), Some(Format::Glb));
        assert_eq!(Format::from_path("bunny.ply"), Some(Format::Ply));
        assert_eq!(Format::from_path("bunny.obj"), None);
        assert_eq!(Format::from_path("noext"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        match load_sources("model.fbx") {
            Err(ExportError::UnsupportedFormat { extension }) => assert_eq!(extension, "fbx"),
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
        assert!(matches!(
            save("out.ply", &[]),
            Err(ExportError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_gtmesh_reload_reproduces_weld() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let uvs: Vec<Point2<f32>> = positions.iter().map(|p| Point2::new(p.x, p.y)).collect();
        let source = PolyMesh::from_triangles(positions, vec![Vector3::z(); 4], &[[0, 1, 2], [0, 2, 3]])
            .unwrap()
            .with_vertex_uvs(&uvs)
            .unwrap();
        let welded = weld(&collect_triangles(&source).unwrap());

        let path = std::env::temp_dir().join(format!("gtmesh-reload-{}.gtmesh", std::process::id()));
        save(&path, &[welded.clone()]).unwrap();
        let sources = load_sources(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(sources.len(), 1);
        let rewelded = weld(&collect_triangles(&sources[0]).unwrap());
        assert_eq!(
            gtmesh::to_bytes(&[rewelded]).unwrap(),
            gtmesh::to_bytes(&[welded]).unwrap()
        );
    }
}
