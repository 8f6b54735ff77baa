//! Terrain baker: noise-fills a voxel field, meshes it and writes an OBJ.
//!
//! Usage: cargo run --release --bin bake_terrain -- [OPTIONS]
//!
//! Options:
//!   --input <PATH>    Load a field archive (.tgvf) instead of generating one
//!   --size <N>        Edge length of a generated field (default: 32)
//!   --seed <SEED>     Noise seed of a generated field (default: 8)
//!   --config <PATH>   Terrain settings as JSON (default: built-in)
//!   --output <PATH>   OBJ output path (default: "terrain.obj")
//!   --save <PATH>     Also write the field archive
//!   --debug           Emit per-voxel debug cubes instead of the surface

use std::path::PathBuf;
use std::time::Instant;

use tg_procgen::core::Result;
use tg_procgen::mesh::{self, MarchingCubesMesher, TrimeshShape};
use tg_procgen::terrain::{FieldNoise, TerrainConfig, VoxelField, persist};

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();
    let input = parse_str_arg(&args, "--input").map(PathBuf::from);
    let size = parse_u32_arg(&args, "--size").unwrap_or(32);
    let seed = parse_u32_arg(&args, "--seed");
    let config_path = parse_str_arg(&args, "--config").map(PathBuf::from);
    let output = parse_str_arg(&args, "--output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("terrain.obj"));
    let save = parse_str_arg(&args, "--save").map(PathBuf::from);
    let debug = args.iter().any(|a| a == "--debug");

    let mut config = match &config_path {
        Some(path) => TerrainConfig::load_json(path)?,
        None => TerrainConfig::default(),
    };
    config.debug_mode |= debug;

    let field = match &input {
        Some(path) => persist::load_field(path)?,
        None => {
            let mut field = VoxelField::new(size, size, size);
            if let Some(seed) = seed {
                field.random_seed = seed;
            }
            FieldNoise::new(field.random_seed, config.noise.clone()).fill(&mut field);
            log::info!(
                "Generated {}x{}x{} field, seed {}",
                field.width(),
                field.height(),
                field.depth(),
                field.random_seed
            );
            field
        }
    };

    if let Some(path) = &save {
        persist::save_field(path, &field)?;
    }

    let start = Instant::now();
    let terrain = if config.debug_mode {
        mesh::generate_debug_mesh(&field, config.mesh_scale)
    } else {
        MarchingCubesMesher::new(config.mesh_scale)
            .with_tops_threshold(config.tops_threshold)
            .generate(&field)
    };
    let elapsed = start.elapsed();

    log::info!(
        "Meshed {} triangles ({} vertices) in {:.1}ms",
        terrain.triangle_count(),
        terrain.vertex_count(),
        elapsed.as_secs_f64() * 1000.0
    );
    for surface in &terrain.surfaces {
        log::info!("  {:?}: {} triangles", surface.role, surface.triangle_count());
    }
    if let Some(bounds) = terrain.bounds() {
        log::info!("  bounds {:?} .. {:?}, centre {:?}", bounds.min, bounds.max, bounds.center());
    }
    if config.generate_collision && !config.debug_mode {
        if let Some(shape) = TrimeshShape::from_mesh(&terrain) {
            log::info!("  collision: {} triangles", shape.triangle_count());
        }
    }

    mesh::save_obj(&output, &terrain)?;
    Ok(())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
