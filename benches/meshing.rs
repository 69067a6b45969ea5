use criterion::{criterion_group, criterion_main, Criterion, black_box};

use lodterrain::streaming::{LodLevel, MeshRegistry, TerrainStreamer};
use lodterrain::terrain::{
    ChunkCoord, FractalType, GenerationSettings, MeshBuilder, NoiseHeightField, NoiseSettings,
    smooth_normals,
};

use glam::DVec3;

fn bench_mesh_build_lod0(c: &mut Criterion) {
    let settings = GenerationSettings::default();
    let field = NoiseHeightField::new(&settings.noise);
    let builder = MeshBuilder::new(&field, &settings);

    c.bench_function("mesh_build_32_lod0", |b| {
        b.iter(|| builder.build(black_box(ChunkCoord::new(3, -2)), black_box(LodLevel::Level0)));
    });
}

fn bench_mesh_build_lod2(c: &mut Criterion) {
    let settings = GenerationSettings::default();
    let field = NoiseHeightField::new(&settings.noise);
    let builder = MeshBuilder::new(&field, &settings);

    c.bench_function("mesh_build_32_lod2", |b| {
        b.iter(|| builder.build(black_box(ChunkCoord::new(3, -2)), black_box(LodLevel::Level2)));
    });
}

fn bench_mesh_build_128_ridged_warp(c: &mut Criterion) {
    let settings = GenerationSettings {
        chunk_size: 128,
        noise: NoiseSettings {
            fractal_type: FractalType::Ridged,
            domain_warp_enabled: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let field = NoiseHeightField::new(&settings.noise);
    let builder = MeshBuilder::new(&field, &settings);

    c.bench_function("mesh_build_128_ridged_warp", |b| {
        b.iter(|| builder.build(black_box(ChunkCoord::new(0, 0)), black_box(LodLevel::Level0)));
    });
}

fn bench_smooth_normals(c: &mut Criterion) {
    let settings = GenerationSettings { chunk_size: 64, ..Default::default() };
    let field = NoiseHeightField::new(&settings.noise);
    let mesh = MeshBuilder::new(&field, &settings)
        .build(ChunkCoord::new(0, 0), LodLevel::Level0)
        .unwrap();

    c.bench_function("smooth_normals_64", |b| {
        b.iter(|| smooth_normals(black_box(&mesh.vertices), black_box(&mesh.indices)));
    });
}

fn bench_streaming_convergence(c: &mut Criterion) {
    let settings = GenerationSettings {
        chunk_size: 16,
        view_radius: 4,
        unload_radius: 6,
        chunks_per_frame: 8,
        ..Default::default()
    };

    c.bench_function("streaming_converge_r4", |b| {
        b.iter(|| {
            let mut streamer = TerrainStreamer::new(settings.clone(), MeshRegistry::new());
            for _ in 0..12 {
                streamer.tick(black_box(Some(DVec3::new(8.0, 0.0, 8.0))), 1.0 / 60.0);
            }
            black_box(streamer.store().len());
        });
    });
}

fn bench_streaming_walk(c: &mut Criterion) {
    let settings = GenerationSettings {
        chunk_size: 16,
        view_radius: 4,
        unload_radius: 6,
        chunks_per_frame: 4,
        ..Default::default()
    };
    let mut streamer = TerrainStreamer::new(settings, MeshRegistry::new());

    c.bench_function("streaming_tick_walking", |b| {
        let mut frame = 0u32;
        b.iter(|| {
            frame += 1;
            let pos = DVec3::new(frame as f64 * 0.5, 0.0, (frame as f64 * 0.01).sin() * 40.0);
            streamer.tick(black_box(Some(pos)), black_box(1.0 / 60.0))
        });
    });
}

criterion_group!(
    benches,
    bench_mesh_build_lod0,
    bench_mesh_build_lod2,
    bench_mesh_build_128_ridged_warp,
    bench_smooth_normals,
    bench_streaming_convergence,
    bench_streaming_walk,
);
criterion_main!(benches);
