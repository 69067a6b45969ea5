//! Headless terrain streaming driver.
//!
//! Walks an observer across the terrain and streams chunks around it into an
//! in-memory mesh registry, logging progress along the way.
//!
//! Usage: cargo run --release --bin stream_terrain -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>        Load generation settings from JSON
//!   --write-config <PATH>  Write the active settings to JSON and exit
//!   --ticks <N>            Frames to simulate (default: 600)
//!   --speed <UNITS>        Observer speed along +X per second (default: 20.0)
//!   --seed <SEED>          Override the noise seed

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use glam::DVec3;

use lodterrain::core::logging;
use lodterrain::streaming::{MeshRegistry, TerrainStreamer};
use lodterrain::terrain::GenerationSettings;

const FRAME_DT: f64 = 1.0 / 60.0;

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let config = parse_str_arg(&args, "--config").map(PathBuf::from);
    let write_config = parse_str_arg(&args, "--write-config").map(PathBuf::from);
    let ticks = parse_u32_arg(&args, "--ticks").unwrap_or(600);
    let speed = parse_f64_arg(&args, "--speed").unwrap_or(20.0);
    let seed = parse_i32_arg(&args, "--seed");

    let mut settings = match &config {
        Some(path) => match GenerationSettings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load settings from {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => GenerationSettings::default(),
    };
    if let Some(seed) = seed {
        settings.noise.seed = seed;
    }

    if let Some(path) = write_config {
        if let Err(e) = settings.save(&path) {
            log::error!("Failed to write settings to {}: {}", path.display(), e);
            process::exit(1);
        }
        println!("Settings written to {}", path.display());
        return;
    }

    println!("=== Terrain Streamer ===");
    println!("Seed:        {}", settings.noise.seed);
    println!("Chunk size:  {} cells x {} units", settings.chunk_size, settings.tile_width);
    println!("View radius: {} chunks (unload at {})", settings.view_radius, settings.unload_radius);
    println!("Budget:      {} chunks/frame", settings.chunks_per_frame);
    println!("Walk:        {} frames at {} units/s", ticks, speed);
    println!();

    let mut streamer = TerrainStreamer::new(settings, MeshRegistry::new());
    let start = Instant::now();
    let mut observer = DVec3::ZERO;
    let (mut built, mut evicted, mut stale, mut failed) = (0, 0, 0, 0);

    for frame in 0..ticks {
        let report = streamer.tick(Some(observer), FRAME_DT);
        built += report.built;
        evicted += report.evicted;
        stale += report.skipped_stale;
        failed += report.failed;

        if frame % 60 == 0 {
            log::info!(
                "Frame {}: observer x = {:.1}, resident {}, queued {}, vertices {}",
                frame,
                observer.x,
                streamer.store().len(),
                report.queue_len,
                streamer.sink().total_vertices()
            );
        }

        observer.x += speed * FRAME_DT;
    }

    let elapsed = start.elapsed();
    println!();
    println!("=== Streaming Complete ===");
    println!("Frames:   {} in {:.2}s", ticks, elapsed.as_secs_f64());
    println!("Built:    {} chunks ({} stale skipped, {} failed)", built, stale, failed);
    println!("Evicted:  {} chunks", evicted);
    println!("Resident: {} chunks, {} vertices", streamer.store().len(), streamer.sink().total_vertices());
    println!("Queued:   {}", streamer.controller().queue_len());
}

fn parse_f64_arg(args: &[String], flag: &str) -> Option<f64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_i32_arg(args: &[String], flag: &str) -> Option<i32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
