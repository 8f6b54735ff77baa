use criterion::{criterion_group, criterion_main, Criterion, black_box};

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tg_procgen::cable::{CableConfig, CableSim, DEFAULT_GRAVITY};
use tg_procgen::landscape::PerlinLandscape;
use tg_procgen::mesh::{MarchingCubesMesher, generate_debug_mesh};
use tg_procgen::terrain::{EditCommand, GridMapping, ToolKind, VoxelField, fill_with_noise};

fn noise_field(size: u32) -> VoxelField {
    let mut field = VoxelField::new(size, size, size);
    fill_with_noise(&mut field);
    field
}

fn bench_marching_cubes_32(c: &mut Criterion) {
    let field = noise_field(32);
    let mesher = MarchingCubesMesher::default();

    c.bench_function("marching_cubes_32", |b| {
        b.iter(|| mesher.generate(black_box(&field)));
    });
}

fn bench_marching_cubes_64(c: &mut Criterion) {
    let field = noise_field(64);
    let mesher = MarchingCubesMesher::default();

    c.bench_function("marching_cubes_64", |b| {
        b.iter(|| mesher.generate(black_box(&field)));
    });
}

fn bench_debug_cubes_32(c: &mut Criterion) {
    let field = noise_field(32);

    c.bench_function("debug_cubes_32", |b| {
        b.iter(|| generate_debug_mesh(black_box(&field), 1.0));
    });
}

fn bench_sphere_edit(c: &mut Criterion) {
    let mut field = noise_field(32);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mapping = GridMapping::new(Vec3::ZERO, 1.0);
    let command = EditCommand::new(ToolKind::Sphere, Vec3::splat(16.0), 6.0, 0.05);

    c.bench_function("sphere_edit_r6", |b| {
        b.iter(|| command.apply(black_box(&mut field), &mapping, &mut rng));
    });
}

fn bench_cable_step(c: &mut Criterion) {
    let mut sim = CableSim::new(CableConfig {
        end_attached: true,
        end_location: Vec3::new(4.0, 0.0, 0.0),
        length: 5.0,
        segments: 32,
        stiffness_coefficient: 2.0,
        ..Default::default()
    });
    sim.reset();

    c.bench_function("cable_step_32_segments", |b| {
        b.iter(|| sim.step(black_box(1.0 / 60.0), DEFAULT_GRAVITY));
    });
}

fn bench_landscape(c: &mut Criterion) {
    let landscape = PerlinLandscape::default();

    c.bench_function("perlin_landscape_default", |b| {
        b.iter(|| landscape.build_mesh());
    });
}

criterion_group!(
    benches,
    bench_marching_cubes_32,
    bench_marching_cubes_64,
    bench_debug_cubes_32,
    bench_sphere_edit,
    bench_cable_step,
    bench_landscape,
);
criterion_main!(benches);
