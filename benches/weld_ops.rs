//! Benchmarks for welding and encoding.

use criterion::{criterion_group, criterion_main, Criterion};
use gtmesh::io::gtmesh::to_bytes;
use gtmesh::prelude::*;
use nalgebra::{Point2, Point3, Vector3};

/// n x n grid of quads, fan-triangulated, UVs equal to normalized XY.
fn create_grid_source(n: usize) -> PolyMesh {
    let mut positions = Vec::with_capacity((n + 1) * (n + 1));
    let mut uvs = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n);

    for j in 0..=n {
        for i in 0..=n {
            positions.push(Point3::new(i as f32, j as f32, 0.0));
            uvs.push(Point2::new(i as f32 / n as f32, j as f32 / n as f32));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;
            faces.push(vec![v00, v10, v11, v01]);
        }
    }

    let normals = vec![Vector3::z(); positions.len()];
    PolyMesh::new(positions, normals, faces)
        .unwrap()
        .with_vertex_uvs(&uvs)
        .unwrap()
        .triangulate_fan()
}

fn bench_collect_and_weld(c: &mut Criterion) {
    let source = create_grid_source(100);
    let triangles = collect_triangles(&source).unwrap();

    c.bench_function("collect_grid_100x100", |b| {
        b.iter(|| collect_triangles(&source).unwrap());
    });

    c.bench_function("weld_grid_100x100", |b| {
        b.iter(|| weld(&triangles));
    });
}

fn bench_encode(c: &mut Criterion) {
    let mesh = weld_source(&create_grid_source(100)).unwrap();
    let meshes = vec![mesh];

    c.bench_function("encode_grid_100x100", |b| {
        b.iter(|| to_bytes(&meshes).unwrap());
    });
}

fn bench_export(c: &mut Criterion) {
    let sources: Vec<PolyMesh> = (0..16).map(|_| create_grid_source(32)).collect();

    c.bench_function("export_16_sequential", |b| {
        let options = ExportOptions::default();
        b.iter(|| {
            let mut out = Vec::new();
            export(&mut out, &sources, &options, &Progress::none()).unwrap();
            out
        });
    });

    c.bench_function("export_16_parallel", |b| {
        let options = ExportOptions::new().with_parallel(true);
        b.iter(|| {
            let mut out = Vec::new();
            export(&mut out, &sources, &options, &Progress::none()).unwrap();
            out
        });
    });
}

criterion_group!(benches, bench_collect_and_weld, bench_encode, bench_export);
criterion_main!(benches);
