//! Collision query benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use brushfire::core::collision::{
    raycast_aabb, resolve_aabb_collision, segment_hit_fraction, sweep_aabb,
};
use brushfire::game::map::Brush;
use brushfire::game::player::Player;
use brushfire::game::config::PlayerConfig;
use brushfire::{Aabb, InputFrame, Map, Ray, NOMINAL_DT};

fn random_vec(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

fn random_boxes(count: usize) -> Vec<Aabb> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let center = random_vec(&mut rng, 50.0);
            let half = Vec3::new(
                rng.gen_range(0.1..4.0),
                rng.gen_range(0.1..4.0),
                rng.gen_range(0.1..4.0),
            );
            Aabb::from_center_half_size(center, half)
        })
        .collect()
}

fn bench_queries(c: &mut Criterion) {
    let boxes = random_boxes(256);
    let mut rng = StdRng::seed_from_u64(7);
    let ray = Ray::new(Vec3::ZERO, random_vec(&mut rng, 1.0));
    let mover = Aabb::from_center_half_size(Vec3::new(0.0, 0.9, 0.0), Vec3::new(0.3, 0.9, 0.3));

    c.bench_function("raycast_256_boxes", |b| {
        b.iter(|| {
            boxes
                .iter()
                .filter(|aabb| raycast_aabb(black_box(&ray), aabb, 1000.0).collided)
                .count()
        })
    });

    c.bench_function("sweep_256_boxes", |b| {
        b.iter(|| {
            boxes
                .iter()
                .map(|aabb| {
                    sweep_aabb(black_box(&mover), Vec3::new(10.0, -5.0, 3.0), aabb, NOMINAL_DT)
                        .distance
                })
                .fold(0.0f32, f32::max)
        })
    });

    c.bench_function("resolve_256_boxes", |b| {
        b.iter(|| {
            boxes
                .iter()
                .map(|aabb| resolve_aabb_collision(black_box(&mover), aabb))
                .sum::<Vec3>()
        })
    });

    c.bench_function("segment_256_boxes", |b| {
        let start = Vec3::new(-60.0, 0.0, 0.0);
        let end = Vec3::new(60.0, 1.0, 0.5);
        b.iter(|| {
            boxes
                .iter()
                .filter_map(|aabb| segment_hit_fraction(black_box(start), end, aabb))
                .reduce(f32::min)
        })
    });
}

fn bench_player_tick(c: &mut Criterion) {
    let mut map = Map::default();
    map.add_brush(Brush::cuboid(
        0,
        Vec3::new(-100.0, -1.0, -100.0),
        Vec3::new(100.0, 0.0, 100.0),
        "floor",
    ));
    for (i, aabb) in random_boxes(128).into_iter().enumerate() {
        map.add_brush(Brush::cuboid(i as u32 + 1, aabb.min, aabb.max, "crate"));
    }

    let config = PlayerConfig::default();
    let input = InputFrame::with_buttons(InputFrame::FORWARD | InputFrame::RIGHT);

    c.bench_function("player_update_128_brushes", |b| {
        let mut player = Player::new(Vec3::new(0.0, 0.01, 0.0), &config, 1);
        b.iter(|| {
            player.update(black_box(&input), NOMINAL_DT, Some(&map));
        })
    });
}

criterion_group!(benches, bench_queries, bench_player_tick);
criterion_main!(benches);
