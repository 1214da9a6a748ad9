//! PLY source loading.
//!
//! Reads one [`PolyMesh`] from a PLY file. Recognized vertex properties are
//! `x y z`, `nx ny nz`, and texture coordinates as `s t`, `u v` or
//! `texture_u texture_v`. Polygon faces are fan-triangulated.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use nalgebra::{Point2, Point3, Vector3};
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{ExportError, Result};
use crate::mesh::PolyMesh;

const UV_PROPERTY_NAMES: [(&str, &str); 3] = [("s", "t"), ("u", "v"), ("texture_u", "texture_v")];

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use gtmesh::io::ply;
///
/// let source = ply::load("model.ply").unwrap();
/// assert!(source.is_triangulated());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let load_error = |message: &str| ExportError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader).map_err(|e| load_error(&e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element"))?;

    let mut positions: Vec<Point3<f32>> = Vec::with_capacity(vertex_element.len());
    let mut normals: Vec<Vector3<f32>> = Vec::with_capacity(vertex_element.len());
    let mut uvs: Vec<Point2<f32>> = Vec::with_capacity(vertex_element.len());
    let mut has_normals = true;
    let mut has_uvs = true;

    for vertex in vertex_element {
        let coord = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| load_error(&format!("vertex missing {} coordinate", name)))
        };
        positions.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));

        match (
            get_float_property(vertex, "nx"),
            get_float_property(vertex, "ny"),
            get_float_property(vertex, "nz"),
        ) {
            (Some(x), Some(y), Some(z)) => normals.push(Vector3::new(x, y, z)),
            _ => has_normals = false,
        }

        match get_uv(vertex) {
            Some(uv) => uvs.push(uv),
            None => has_uvs = false,
        }
    }

    if !has_normals {
        log::warn!("{}: no vertex normals, using zero normals", path.display());
        normals = vec![Vector3::zeros(); positions.len()];
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error("PLY file has no face element"))?;

    let mut faces: Vec<Vec<usize>> = Vec::with_capacity(face_element.len());
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| load_error("face missing vertex_indices property"))?;
        faces.push(indices);
    }

    if faces.is_empty() {
        return Err(load_error("PLY file contains no faces"));
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("ply")
        .to_string();

    let mut mesh = PolyMesh::new(positions, normals, faces)?.with_name(name);
    if has_uvs {
        mesh = mesh.with_vertex_uvs(&uvs)?;
    }

    Ok(mesh.triangulate_fan())
}

fn get_uv(element: &DefaultElement) -> Option<Point2<f32>> {
    UV_PROPERTY_NAMES.iter().find_map(|(u, v)| {
        Some(Point2::new(
            get_float_property(element, u)?,
            get_float_property(element, v)?,
        ))
    })
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f32> {
    match element.get(name)? {
        Property::Float(v) => Some(*v),
        Property::Double(v) => Some(*v as f32),
        Property::Int(v) => Some(*v as f32),
        Property::UInt(v) => Some(*v as f32),
        Property::Short(v) => Some(*v as f32),
        Property::UShort(v) => Some(*v as f32),
        Property::Char(v) => Some(*v as f32),
        Property::UChar(v) => Some(*v as f32),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}
