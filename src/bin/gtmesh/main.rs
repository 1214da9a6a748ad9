//! gtmesh CLI - weld and export meshes to `.gtmesh`.
//!
//! Usage: gtmesh <COMMAND> [OPTIONS]
//!
//! Run `gtmesh --help` for available commands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use clap::{Parser, Subcommand};
use nalgebra::Point3;

use gtmesh::export::{export_to_path, ExportOptions};
use gtmesh::io::{self, gtmesh as gtmesh_format};
use gtmesh::mesh::{PolyMesh, WeldedMesh};
use gtmesh::weld::Progress;

#[derive(Parser)]
#[command(name = "gtmesh")]
#[command(author, version, about = "Weld meshes and export them to .gtmesh", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export source meshes to a .gtmesh file
    Export {
        /// Input mesh files (.gltf, .glb, .ply, .gtmesh); each contributes its sub-meshes in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output .gtmesh file
        #[arg(short, long)]
        output: PathBuf,

        /// Weld sub-meshes in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Display .gtmesh file information
    Info {
        /// Input .gtmesh file
        input: PathBuf,
    },

    /// Print vertex and index records of a .gtmesh file
    Dump {
        /// Input .gtmesh file
        input: PathBuf,

        /// Only dump this sub-mesh
        #[arg(short, long)]
        sub_mesh: Option<u32>,

        /// Maximum number of vertices and triangles to print per sub-mesh
        #[arg(short, long, default_value = "16")]
        limit: usize,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Export {
            inputs,
            output,
            parallel,
        } => {
            cmd_export(&inputs, &output, parallel)?;
        }

        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Dump {
            input,
            sub_mesh,
            limit,
        } => {
            cmd_dump(&input, sub_mesh, limit)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = AtomicUsize::new(0);

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let percent = ((current * 100) + (total / 2)) / total;
        let percent = percent.min(100);

        // Sub-meshes finish in order, but never let the bar move backwards
        if max_percent.fetch_max(percent, Ordering::Relaxed) > percent {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        // Carriage return overwrites the line; pad to clear a longer previous message
        eprint!("\r[{}{}] {:3}% {:<40}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn cmd_export(
    inputs: &[PathBuf],
    output: &Path,
    parallel: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sources: Vec<PolyMesh> = Vec::new();
    for input in inputs {
        let loaded = io::load_sources(input)?;
        println!("Loaded: {} ({} sub-meshes)", input.display(), loaded.len());
        sources.extend(loaded);
    }

    let options = ExportOptions::new().with_parallel(parallel);
    let mode = if parallel { "parallel" } else { "sequential" };
    println!("Exporting {} sub-meshes ({})...", sources.len(), mode);

    let progress = create_progress();
    let start = Instant::now();
    let summary = export_to_path(output, &sources, &options, &progress)?;
    let elapsed = start.elapsed();

    println!(
        "Result: {} vertices, {} triangles",
        summary.total_vertices(),
        summary.total_triangles()
    );
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = gtmesh_format::load(input)?;

    println!("File: {}", input.display());
    println!("Sub-meshes: {}", file.len());

    for sub in &file.sub_meshes {
        let mesh = &sub.mesh;
        let stats = mesh.stats();
        println!("\nSub-mesh {}:", sub.id);
        println!("  Vertices: {}", stats.vertices);
        println!("  Indices: {} ({} triangles)", mesh.index_count(), stats.triangles);

        if let Some((min, max)) = bounding_box(mesh) {
            println!(
                "  Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
                min.x, min.y, min.z, max.x, max.y, max.z
            );
        }

        if !mesh.has_unique_vertices() {
            println!("  Warning: contains duplicate vertices");
        }
    }

    // The combined buffers a renderer uploads when it loads every sub-mesh at once.
    let merged = file.merged()?;
    println!(
        "\nTotal: {} vertices, {} triangles",
        merged.vertex_count(),
        merged.triangle_count()
    );
    if let Some((min, max)) = bounding_box(&merged) {
        println!(
            "  Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    Ok(())
}

fn cmd_dump(
    input: &Path,
    only: Option<u32>,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = gtmesh_format::load(input)?;

    for sub in file.sub_meshes.iter().filter(|s| only.map_or(true, |id| s.id == id)) {
        let mesh = &sub.mesh;
        println!(
            "sub-mesh {}: {} vertices, {} indices",
            sub.id,
            mesh.vertex_count(),
            mesh.index_count()
        );

        for (i, v) in mesh.vertices().iter().take(limit).enumerate() {
            println!(
                "  v{:<5} p={:?} n={:?} uv={:?} w={:?} j={:?}",
                i, v.position, v.normal, v.uv, v.blend_weights, v.blend_indices
            );
        }
        if mesh.vertex_count() > limit {
            println!("  ... {} more vertices", mesh.vertex_count() - limit);
        }

        for (i, tri) in mesh.triangles().take(limit).enumerate() {
            println!("  t{:<5} {:?}", i, tri);
        }
        if mesh.triangle_count() > limit {
            println!("  ... {} more triangles", mesh.triangle_count() - limit);
        }
    }

    Ok(())
}

fn bounding_box(mesh: &WeldedMesh) -> Option<(Point3<f32>, Point3<f32>)> {
    let mut points = mesh.vertices().iter().map(|v| Point3::from(v.position));
    let first = points.next()?;

    Some(points.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p))))
}
