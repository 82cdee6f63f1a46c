use std::{error::Error, path::PathBuf, process::ExitCode};

use lumen_assets::{FileImageLoader, ImportSettings, PbrVertex, Vertex, VertexLayout};
use lumen_renderer::{GpuVertex, RecordingDevice, UploadOptions, collect_draws, upload_scene};
use lumen_scene::{NodeKind, SceneGraph, SceneImporter};

const USAGE: &str = "usage: lumen <scene-file> [--config <settings.json>] [--upload]";

struct Args {
    scene: PathBuf,
    config: Option<PathBuf>,
    upload: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut scene = None;
        let mut config = None;
        let mut upload = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args.next().ok_or("--config needs a path")?;
                    config = Some(PathBuf::from(path));
                }
                "--upload" => upload = true,
                "-h" | "--help" => return Err(USAGE.to_string()),
                flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
                _ if scene.is_none() => scene = Some(PathBuf::from(&arg)),
                _ => return Err(format!("unexpected argument {arg}")),
            }
        }

        Ok(Self {
            scene: scene.ok_or("missing scene file")?,
            config,
            upload,
        })
    }
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            let mut source = e.source();
            while let Some(cause) = source {
                log::error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let settings = match &args.config {
        Some(path) => ImportSettings::load(path)?,
        None => ImportSettings::default(),
    };

    match settings.vertex_layout {
        VertexLayout::Basic => import_and_report::<Vertex>(args, settings),
        VertexLayout::Pbr => import_and_report::<PbrVertex>(args, settings),
    }
}

fn import_and_report<V: GpuVertex>(args: &Args, settings: ImportSettings) -> Result<(), Box<dyn Error>> {
    let images = FileImageLoader::new(settings.flip_textures_vertically);
    let options = UploadOptions {
        expand_rgb_to_rgba: settings.expand_rgb_to_rgba,
    };

    let importer = SceneImporter::new(settings);
    let mut graph: SceneGraph<V> = importer.import(&args.scene)?;

    print_tree(&graph);

    let stats = graph.stats();
    println!();
    println!(
        "nodes: {} ({} mesh, {} light, {} camera, {} empty)",
        stats.nodes, stats.meshes, stats.lights, stats.cameras, stats.empties
    );
    println!(
        "parts: {} ({} empty), vertices: {}, indices: {}, textures: {}",
        stats.parts, stats.empty_parts, stats.vertices, stats.indices, stats.textures
    );
    println!("vertex stride: {} bytes", V::desc().array_stride);

    if args.upload {
        let mut device = RecordingDevice::new();
        let uploaded = upload_scene(&mut graph, &mut device, &images, options)?;
        let draws = collect_draws(&graph);
        println!(
            "uploaded: {} parts, {} textures, {} bytes; {} draws",
            uploaded.parts,
            uploaded.textures,
            uploaded.bytes,
            draws.len()
        );
    }
    Ok(())
}

fn print_tree<V: GpuVertex>(graph: &SceneGraph<V>) {
    // Depth of each node, filled in as the pre-order walk reaches it
    let mut depth = vec![0usize; graph.len()];

    for id in graph.depth_first() {
        let node = &graph[id];
        if let Some(parent) = node.parent() {
            depth[id.0] = depth[parent.0] + 1;
        }

        let detail = match &node.kind {
            NodeKind::Mesh { parts } => {
                let triangles: usize = parts.iter().map(|p| p.triangle_count()).sum();
                format!(" ({} parts, {triangles} triangles)", parts.len())
            }
            _ => String::new(),
        };
        println!("{}{} [{}]{detail}", "  ".repeat(depth[id.0]), node.name, node.kind.label());
    }
}
