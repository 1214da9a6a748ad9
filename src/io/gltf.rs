//! glTF source loading.
//!
//! Every triangle primitive of every mesh in the document becomes one
//! [`PolyMesh`], in document order. Point and line primitives are skipped.
//! Node transforms are not applied.

use std::path::Path;

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{ExportError, Result};
use crate::mesh::PolyMesh;

/// Load the triangle primitives of a glTF or GLB file.
///
/// # Example
///
/// ```no_run
/// use gtmesh::io::gltf;
///
/// let sources = gltf::load("model.glb").unwrap();
/// println!("{} sub-meshes", sources.len());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<PolyMesh>> {
    let path = path.as_ref();

    let (document, buffers, _images) = ::gltf::import(path).map_err(|e| ExportError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut sources = Vec::new();

    for mesh in document.meshes() {
        let mesh_name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh{}", mesh.index()));

        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let name = format!("{}/{}", mesh_name, primitive.index());

            let positions: Vec<Point3<f32>> = match reader.read_positions() {
                Some(iter) => iter.map(Point3::from).collect(),
                None => {
                    log::warn!("{}: primitive has no positions, skipping", name);
                    continue;
                }
            };

            let normals: Vec<Vector3<f32>> = match reader.read_normals() {
                Some(iter) => iter.map(Vector3::from).collect(),
                None => {
                    log::warn!("{}: no normals, using zero normals", name);
                    vec![Vector3::zeros(); positions.len()]
                }
            };

            let uvs: Option<Vec<Point2<f32>>> = reader
                .read_tex_coords(0)
                .map(|tc| tc.into_f32().map(Point2::from).collect());

            let indices: Vec<usize> = match reader.read_indices() {
                Some(indices) => indices.into_u32().map(|i| i as usize).collect(),
                None => (0..positions.len()).collect(),
            };

            let faces = match triangles_for_mode(primitive.mode(), &indices) {
                Some(faces) => faces,
                None => {
                    log::debug!("{}: skipping {:?} primitive", name, primitive.mode());
                    continue;
                }
            };

            let mut source = PolyMesh::from_triangles(positions, normals, &faces)
                .map_err(|e| ExportError::LoadError {
                    path: path.to_path_buf(),
                    message: format!("{}: {}", name, e),
                })?
                .with_name(name);

            if let Some(uvs) = uvs {
                source = source.with_vertex_uvs(&uvs)?;
            }

            sources.push(source);
        }
    }

    if sources.is_empty() {
        return Err(ExportError::LoadError {
            path: path.to_path_buf(),
            message: "glTF file contains no triangle meshes".to_string(),
        });
    }

    Ok(sources)
}

/// Convert an index list to triangles according to the primitive mode.
///
/// Returns `None` for non-triangle modes.
fn triangles_for_mode(mode: ::gltf::mesh::Mode, indices: &[usize]) -> Option<Vec<[usize; 3]>> {
    use ::gltf::mesh::Mode;

    let faces = match mode {
        Mode::Triangles => indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect(),
        Mode::TriangleStrip => (0..indices.len().saturating_sub(2))
            .map(|i| {
                if i % 2 == 0 {
                    [indices[i], indices[i + 1], indices[i + 2]]
                } else {
                    // Odd strip triangles are reversed to keep consistent winding
                    [indices[i], indices[i + 2], indices[i + 1]]
                }
            })
            .collect(),
        Mode::TriangleFan => (1..indices.len().saturating_sub(1))
            .map(|i| [indices[0], indices[i], indices[i + 1]])
            .collect(),
        _ => return None,
    };

    Some(faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::gltf::mesh::Mode;

    #[test]
    fn test_triangle_list() {
        let faces = triangles_for_mode(Mode::Triangles, &[0, 1, 2, 2, 1, 3, 9]).unwrap();
        assert_eq!(faces, vec![[0, 1, 2], [2, 1, 3]]);
    }

    #[test]
    fn test_strip_winding() {
        let faces = triangles_for_mode(Mode::TriangleStrip, &[0, 1, 2, 3]).unwrap();
        assert_eq!(faces, vec![[0, 1, 2], [1, 3, 2]]);
    }

    #[test]
    fn test_fan() {
        let faces = triangles_for_mode(Mode::TriangleFan, &[0, 1, 2, 3]).unwrap();
        assert_eq!(faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_lines_skipped() {
        assert!(triangles_for_mode(Mode::Lines, &[0, 1]).is_none());
    }

    #[test]
    fn test_missing_file() {
        let result = load("/nonexistent/model.gltf");
        assert!(matches!(result, Err(ExportError::LoadError { .. })));
    }
}
