// Copyright 2020 TwoCookingMice

use objmesh::{ LoadOptions, MeshLoader, NormalMode };

use std::env;

fn parse_normal_mode(value: &str) -> Option<NormalMode> {
    match value {
        "vertex" | "smooth" => Some(NormalMode::Vertex),
        "face" | "flat" => Some(NormalMode::Face),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <model.obj> [--no-triangulate] [--normal-mode vertex|face]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let mut options = LoadOptions::default();
    let mut mode = NormalMode::default();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--no-triangulate" => {
                options.triangulate = false;
            }
            "--normal-mode" => {
                i += 1;
                match args.get(i).and_then(|v| parse_normal_mode(v)) {
                    Some(m) => mode = m,
                    None => {
                        eprintln!("--normal-mode expects 'vertex' or 'face'");
                        std::process::exit(1);
                    }
                }
            }
            other => log::warn!("Ignoring unknown argument: {}.", other),
        }
        i += 1;
    }

    let mut loader = MeshLoader::new();
    loader.set_normal_mode(mode);
    if let Err(e) = loader.load_with_options(input_path, &options) {
        eprintln!("{}: {}", input_path, e);
        std::process::exit(1);
    }

    let center = loader.center();
    println!("Normal mode: {:?}", loader.normal_mode());
    println!("Triangles: {}", loader.triangle_count());
    println!("Raw positions: {}", loader.raw_positions().len());
    println!("Unique vertices: {}", loader.vertices().len());
    println!("Indices: {}", loader.indices().len());
    println!("Materials: {}", loader.materials().len());
    println!("Center: {:.6}, {:.6}, {:.6}", center.x, center.y, center.z);
    println!("Max extent: {:.6}", loader.max_extent());
    for warning in loader.warnings() {
        println!("Warning: {}", warning);
    }
}
