//! `.gtmesh` binary format.
//!
//! Little-endian, no header, no padding:
//!
//! ```text
//! u32 meshCount
//! meshCount times:
//!   u32 subMeshId            0-based, sequential
//!   u32 vertexCount
//!   vertexCount times:
//!     f32 x3 position
//!     f32 x3 normal
//!     f32 x2 uv
//!     f32 x4 blendWeights
//!     u32 x4 blendIndices
//!   u32 indexCount           multiple of 3
//!   indexCount times:
//!     u32 index              < vertexCount
//! ```
//!
//! Writing is strictly forward: every count is known before it is written, so any
//! [`Write`] sink works. Nothing is rolled back on failure; a partially written
//! file is the caller's to discard.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{ExportError, Result};
use crate::mesh::{CornerRecord, MeshFile, SubMesh, WeldedMesh};

/// Size in bytes of one encoded vertex record.
pub const VERTEX_RECORD_SIZE: usize = 64;

/// Streaming `.gtmesh` writer.
///
/// The sub-mesh count is written up front; sub-meshes then follow one at a time
/// and receive ids `0, 1, 2, ..` in the order they are written.
///
/// # Example
///
/// ```
/// use gtmesh::io::gtmesh::MeshFileWriter;
/// use gtmesh::mesh::WeldedMesh;
///
/// let mut out = Vec::new();
/// let mut writer = MeshFileWriter::new(&mut out, 1).unwrap();
/// writer.write_sub_mesh(&WeldedMesh::new()).unwrap();
/// writer.finish().unwrap();
///
/// // meshCount, subMeshId, vertexCount, indexCount
/// assert_eq!(out.len(), 16);
/// ```
#[derive(Debug)]
pub struct MeshFileWriter<W: Write> {
    writer: W,
    announced: u32,
    written: u32,
}

impl<W: Write> MeshFileWriter<W> {
    /// Start a file that will hold `count` sub-meshes.
    pub fn new(mut writer: W, count: usize) -> Result<Self> {
        let announced = to_u32(count, "mesh count")?;
        write_u32(&mut writer, announced)?;
        Ok(Self {
            writer,
            announced,
            written: 0,
        })
    }

    /// Number of sub-meshes written so far.
    pub fn written(&self) -> u32 {
        self.written
    }

    /// Append one sub-mesh and return the id it was written under.
    pub fn write_sub_mesh(&mut self, mesh: &WeldedMesh) -> Result<u32> {
        if self.written >= self.announced {
            return Err(ExportError::invariant(format!(
                "sub-mesh {} exceeds announced count {}",
                self.written, self.announced
            )));
        }
        mesh.validate()?;

        let id = self.written;
        let w = &mut self.writer;

        write_u32(w, id)?;
        write_u32(w, to_u32(mesh.vertex_count(), "vertex count")?)?;
        for vertex in mesh.vertices() {
            w.write_all(&encode_vertex(vertex))?;
        }

        write_u32(w, to_u32(mesh.index_count(), "index count")?)?;
        for &index in mesh.indices() {
            write_u32(w, index)?;
        }

        self.written += 1;
        Ok(id)
    }

    /// Check that every announced sub-mesh was written, flush, and return the sink.
    pub fn finish(mut self) -> Result<W> {
        if self.written != self.announced {
            return Err(ExportError::invariant(format!(
                "wrote {} sub-meshes, announced {}",
                self.written, self.announced
            )));
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Encode welded meshes to a writer, assigning sub-mesh ids in slice order.
pub fn write_mesh_file<W: Write>(writer: W, meshes: &[WeldedMesh]) -> Result<W> {
    let mut file = MeshFileWriter::new(writer, meshes.len())?;
    for mesh in meshes {
        file.write_sub_mesh(mesh)?;
    }
    file.finish()
}

/// Encode welded meshes into a byte vector.
pub fn to_bytes(meshes: &[WeldedMesh]) -> Result<Vec<u8>> {
    write_mesh_file(Vec::new(), meshes)
}

/// Decode a `.gtmesh` stream.
///
/// The stream must end right after the last sub-mesh. Decoded vertices get their
/// slot index as `source_index`.
pub fn read_mesh_file<R: Read>(mut reader: R) -> Result<MeshFile> {
    let count = read_u32(&mut reader)?;
    let mut sub_meshes = Vec::with_capacity(count.min(1024) as usize);

    for expected_id in 0..count {
        let id = read_u32(&mut reader)?;
        if id != expected_id {
            return Err(ExportError::malformed(format!(
                "sub-mesh id {} found where {} was expected",
                id, expected_id
            )));
        }

        let vertex_count = read_u32(&mut reader)?;
        let mut vertices = Vec::with_capacity(vertex_count.min(1 << 16) as usize);
        for slot in 0..vertex_count as usize {
            let mut record = [0u8; VERTEX_RECORD_SIZE];
            reader.read_exact(&mut record)?;
            vertices.push(decode_vertex(slot, &record));
        }

        let index_count = read_u32(&mut reader)?;
        if index_count % 3 != 0 {
            return Err(ExportError::malformed(format!(
                "sub-mesh {} has {} indices, not a multiple of 3",
                id, index_count
            )));
        }
        let mut indices = Vec::with_capacity(index_count.min(1 << 18) as usize);
        for _ in 0..index_count {
            let index = read_u32(&mut reader)?;
            if index >= vertex_count {
                return Err(ExportError::malformed(format!(
                    "sub-mesh {} index {} out of range for {} vertices",
                    id, index, vertex_count
                )));
            }
            indices.push(index);
        }

        sub_meshes.push(SubMesh {
            id,
            mesh: WeldedMesh::from_parts(vertices, indices)?,
        });
    }

    let mut trailing = [0u8; 1];
    if reader.read(&mut trailing)? != 0 {
        return Err(ExportError::malformed("trailing bytes after last sub-mesh"));
    }

    Ok(MeshFile { sub_meshes })
}

/// Decode a `.gtmesh` byte slice.
pub fn from_bytes(bytes: &[u8]) -> Result<MeshFile> {
    read_mesh_file(bytes)
}

/// Save welded meshes to a `.gtmesh` file.
///
/// # Example
///
/// ```no_run
/// use gtmesh::io::gtmesh::save;
/// use gtmesh::mesh::WeldedMesh;
///
/// save("output.gtmesh", &[WeldedMesh::new()]).unwrap();
/// ```
pub fn save<P: AsRef<Path>>(path: P, meshes: &[WeldedMesh]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_mesh_file(BufWriter::new(file), meshes)?;
    Ok(())
}

/// Load a `.gtmesh` file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshFile> {
    let file = File::open(path.as_ref())?;
    read_mesh_file(BufReader::new(file))
}

fn encode_vertex(v: &CornerRecord) -> [u8; VERTEX_RECORD_SIZE] {
    let mut out = [0u8; VERTEX_RECORD_SIZE];
    let floats = v
        .position
        .iter()
        .chain(&v.normal)
        .chain(&v.uv)
        .chain(&v.blend_weights)
        .map(|f| f.to_le_bytes());
    let ints = v.blend_indices.iter().map(|i| i.to_le_bytes());

    for (chunk, bytes) in out.chunks_exact_mut(4).zip(floats.chain(ints)) {
        chunk.copy_from_slice(&bytes);
    }
    out
}

fn decode_vertex(slot: usize, record: &[u8; VERTEX_RECORD_SIZE]) -> CornerRecord {
    let mut words = [0u32; VERTEX_RECORD_SIZE / 4];
    for (word, chunk) in words.iter_mut().zip(record.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    let f = |i: usize| f32::from_bits(words[i]);

    CornerRecord {
        source_index: slot,
        position: [f(0), f(1), f(2)],
        normal: [f(3), f(4), f(5)],
        uv: [f(6), f(7)],
        blend_weights: [f(8), f(9), f(10), f(11)],
        blend_indices: [words[12], words[13], words[14], words[15]],
    }
}

#[inline]
fn write_u32<W: Write + ?Sized>(w: &mut W, v: u32) -> Result<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

#[inline]
fn read_u32<R: Read + ?Sized>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn to_u32(v: usize, what: &str) -> Result<u32> {
    u32::try_from(v).map_err(|_| ExportError::invariant(format!("{} {} does not fit in u32", what, v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Triangle;
    use crate::weld::weld;

    fn triangle_mesh() -> WeldedMesh {
        let c = |i: usize, x: f32, y: f32| {
            CornerRecord::new(i, [x, y, 0.0], [0.0, 0.0, 1.0], [x, y])
        };
        weld(&[Triangle::new(c(0, 0.0, 0.0), c(1, 1.0, 0.0), c(2, 0.0, 1.0))])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn f32_at(bytes: &[u8], offset: usize) -> f32 {
        f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_single_triangle_layout() {
        let bytes = to_bytes(&[triangle_mesh()]).unwrap();

        // 4 (count) + 4 (id) + 4 (vertex count) + 3 * 64 + 4 (index count) + 3 * 4
        assert_eq!(bytes.len(), 4 + 4 + 4 + 3 * 64 + 4 + 12);
        assert_eq!(u32_at(&bytes, 0), 1);
        assert_eq!(u32_at(&bytes, 4), 0);
        assert_eq!(u32_at(&bytes, 8), 3);

        // Second vertex: position (1, 0, 0), normal (0, 0, 1), uv (1, 0), weights, indices.
        let v1 = 12 + 64;
        assert_eq!(f32_at(&bytes, v1), 1.0);
        assert_eq!(f32_at(&bytes, v1 + 20), 1.0);
        assert_eq!(f32_at(&bytes, v1 + 24), 1.0);
        assert_eq!(f32_at(&bytes, v1 + 32), 1.0);
        assert_eq!(f32_at(&bytes, v1 + 36), 0.0);
        assert_eq!(u32_at(&bytes, v1 + 48), 0);

        let idx = 12 + 3 * 64;
        assert_eq!(u32_at(&bytes, idx), 3);
        assert_eq!(
            [u32_at(&bytes, idx + 4), u32_at(&bytes, idx + 8), u32_at(&bytes, idx + 12)],
            [0, 1, 2]
        );
    }

    #[test]
    fn test_empty_sub_mesh_block() {
        let bytes = to_bytes(&[WeldedMesh::new()]).unwrap();
        assert_eq!(bytes, vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_no_meshes() {
        let bytes = to_bytes(&[]).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
        assert!(from_bytes(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_sub_mesh_ids_sequential() {
        let bytes = to_bytes(&[triangle_mesh(), WeldedMesh::new()]).unwrap();
        assert_eq!(u32_at(&bytes, 0), 2);
        assert_eq!(u32_at(&bytes, 4), 0);
        let second = 4 + (4 + 4 + 3 * 64 + 4 + 12);
        assert_eq!(u32_at(&bytes, second), 1);
    }

    #[test]
    fn test_roundtrip_is_bit_exact() {
        let mut mesh = triangle_mesh();
        mesh.vertices[1].normal = [f32::from_bits(0x3f80_0001), -0.0, 1e-38];
        mesh.vertices[2].blend_indices = [7, 6, 5, 4];

        let bytes = to_bytes(&[mesh.clone()]).unwrap();
        let file = from_bytes(&bytes).unwrap();

        assert_eq!(file.len(), 1);
        let decoded = &file.sub_meshes[0].mesh;
        assert_eq!(decoded.indices(), mesh.indices());
        for (a, b) in decoded.vertices().iter().zip(mesh.vertices()) {
            assert_eq!(a.key(), b.key());
        }
        assert_eq!(decoded.vertices()[1].normal[1].to_bits(), (-0.0f32).to_bits());

        assert_eq!(to_bytes(&[decoded.clone()]).unwrap(), bytes);
    }

    #[test]
    fn test_truncated_stream() {
        let bytes = to_bytes(&[triangle_mesh()]).unwrap();
        let result = from_bytes(&bytes[..bytes.len() - 2]);
        match result {
            Err(ExportError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("expected EOF, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = to_bytes(&[triangle_mesh()]).unwrap();
        bytes.push(0);
        assert!(matches!(from_bytes(&bytes), Err(ExportError::Malformed(_))));
    }

    #[test]
    fn test_out_of_sequence_id() {
        let mut bytes = to_bytes(&[WeldedMesh::new()]).unwrap();
        bytes[4] = 3;
        assert!(matches!(from_bytes(&bytes), Err(ExportError::Malformed(_))));
    }

    #[test]
    fn test_index_out_of_range_rejected() {
        let mut bytes = to_bytes(&[triangle_mesh()]).unwrap();
        let last = bytes.len() - 4;
        bytes[last..].copy_from_slice(&3u32.to_le_bytes());
        assert!(matches!(from_bytes(&bytes), Err(ExportError::Malformed(_))));
    }

    #[test]
    fn test_writer_count_mismatch() {
        let writer = MeshFileWriter::new(Vec::new(), 2).unwrap();
        assert!(matches!(writer.finish(), Err(ExportError::InvariantViolation(_))));

        let mut writer = MeshFileWriter::new(Vec::new(), 0).unwrap();
        assert!(matches!(
            writer.write_sub_mesh(&WeldedMesh::new()),
            Err(ExportError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_write_failure_propagates() {
        struct Full;
        impl Write for Full {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        assert!(matches!(write_mesh_file(Full, &[]), Err(ExportError::Io(_))));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("gtmesh-io-{}.gtmesh", std::process::id()));
        save(&path, &[triangle_mesh(), WeldedMesh::new()]).unwrap();

        let file = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(file.len(), 2);
        assert_eq!(file.sub_meshes[0].mesh.vertex_count(), 3);
        assert_eq!(file.sub_meshes[1].id, 1);
        assert!(file.sub_meshes[1].mesh.is_empty());
    }
}
