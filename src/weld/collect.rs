//! Corner collection.
//!
//! Turns an already-triangulated [`SourceMesh`] into a list of [`Triangle`]s, one
//! attribute record per corner. Positions and normals are looked up through the
//! corner's vertex; UVs through the face corner, since one vertex may carry a
//! different UV on each face it touches.

use crate::error::{ExportError, Result};
use crate::mesh::{CornerRecord, SourceMesh, Triangle};

/// Collect one [`Triangle`] per face, in face order, keeping each face's winding.
///
/// Fails with [`ExportError::NotTriangulated`] on the first face that does not have
/// exactly three corners, and with [`ExportError::MissingUvLayer`] if a source with
/// faces has no UV layer. A source without faces needs no UV layer and yields no
/// triangles. No triangles are returned on failure.
///
/// Skinning data is not sourced here: every corner gets
/// [`CornerRecord::DEFAULT_BLEND_WEIGHTS`] and [`CornerRecord::DEFAULT_BLEND_INDICES`].
///
/// # Example
///
/// ```
/// use gtmesh::mesh::PolyMesh;
/// use gtmesh::weld::collect_triangles;
/// use nalgebra::{Point2, Point3, Vector3};
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh = PolyMesh::from_triangles(positions, vec![Vector3::z(); 3], &[[0, 1, 2]])
///     .unwrap()
///     .with_vertex_uvs(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)])
///     .unwrap();
///
/// let triangles = collect_triangles(&mesh).unwrap();
/// assert_eq!(triangles.len(), 1);
/// assert_eq!(triangles[0].corners[1].position, [1.0, 0.0, 0.0]);
/// ```
pub fn collect_triangles<S: SourceMesh + ?Sized>(source: &S) -> Result<Vec<Triangle>> {
    let num_faces = source.num_faces();
    if num_faces > 0 && !source.has_uvs() {
        return Err(ExportError::MissingUvLayer {
            mesh: source.name().unwrap_or("(unnamed)").to_string(),
        });
    }

    let mut triangles = Vec::with_capacity(num_faces);

    for face in 0..num_faces {
        let corners = source.face_corners(face);
        let &[v0, v1, v2] = corners else {
            return Err(ExportError::NotTriangulated {
                face,
                corners: corners.len(),
            });
        };

        triangles.push(Triangle::new(
            collect_corner(source, face, 0, v0),
            collect_corner(source, face, 1, v1),
            collect_corner(source, face, 2, v2),
        ));
    }

    Ok(triangles)
}

#[inline]
fn collect_corner<S: SourceMesh + ?Sized>(
    source: &S,
    face: usize,
    corner: usize,
    vertex: usize,
) -> CornerRecord {
    CornerRecord::new(
        vertex,
        source.position(vertex),
        source.normal(vertex),
        source.uv(face, corner),
    )
}
