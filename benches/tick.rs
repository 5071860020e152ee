//! Tick throughput benchmarks: how fast `Scheduler::advance` runs as grid
//! size and occupancy scale.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use cellgrid_physics::{Grid, Material, Scheduler, Tunables};

/// Builds a walled grid with every interior cell filled by a deterministic,
/// varied mix of materials so a tick actually has forces, transfers, and
/// collisions to resolve rather than an all-Air no-op.
fn build_grid(size: u32) -> Grid {
    let mut grid = Grid::with_wall_perimeter(size, size);
    let palette = [
        Material::Dirt,
        Material::Water,
        Material::Sand,
        Material::Wood,
        Material::Metal,
        Material::Leaf,
    ];
    for y in 1..(size - 1) {
        for x in 1..(size - 1) {
            let material = palette[((x + y) as usize) % palette.len()];
            let fill = 0.3 + 0.5 * (((x * 7 + y * 13) % 5) as f64 / 4.0);
            grid.at_mut(x, y).set(material, fill.min(1.0));
        }
    }
    grid
}

fn bench_single_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick/single_tick");
    for size in [16u32, 32, 64] {
        let cell_count = (size * size) as u64;
        group.throughput(Throughput::Elements(cell_count));
        group.bench_with_input(BenchmarkId::new("advance", size), &size, |bencher, &size| {
            bencher.iter_batched(
                || Scheduler::with_seed(build_grid(size), Tunables::default(), 7),
                |mut scheduler| {
                    scheduler.advance(0.016);
                    scheduler
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_sustained_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick/sustained");
    group.sample_size(20);
    group.bench_function("advance_x100_32x32", |bencher| {
        bencher.iter_batched(
            || Scheduler::with_seed(build_grid(32), Tunables::default(), 7),
            |mut scheduler| {
                for _ in 0..100 {
                    scheduler.advance(0.016);
                }
                scheduler
            },
            criterion::BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_pressure_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick/pressure_variants");
    group.bench_function("hydrostatic_and_dynamic_enabled", |bencher| {
        bencher.iter_batched(
            || Scheduler::with_seed(build_grid(32), Tunables::default(), 7),
            |mut scheduler| {
                scheduler.advance(0.016);
                scheduler
            },
            criterion::BatchSize::SmallInput,
        );
    });
    group.bench_function("pressure_disabled", |bencher| {
        bencher.iter_batched(
            || {
                let mut tunables = Tunables::default();
                tunables.hydrostatic_enabled = false;
                tunables.dynamic_enabled = false;
                Scheduler::with_seed(build_grid(32), tunables, 7)
            },
            |mut scheduler| {
                scheduler.advance(0.016);
                scheduler
            },
            criterion::BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_single_tick, bench_sustained_ticks, bench_pressure_phases);
criterion_main!(benches);
