// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Frame throughput benchmarks
//!
//! These benchmarks measure:
//! - Collision resolution against growing numbers of ground shapes
//! - A full main game frame (update and render) after warm-up

use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use runner_engine::config::GameConfig;
use runner_engine::ecs::components::Tag;
use runner_engine::ecs::World;
use runner_engine::game::{entities, main_game_scheduler, GameContext};
use runner_engine::math::Rect;
use runner_engine::physics::Space;
use runner_engine::render::{RecordingSurface, RenderQueue};

/// Benchmark: resolve one move against N ground shapes
fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for shape_count in [10, 100, 1000].iter() {
        let mut space = Space::new();
        for i in 0..*shape_count {
            let x = i as f64 * 300.0;
            space.add(Rect::new(x, 500.0, 200.0, 100.0), BTreeSet::from([Tag::Ground]), None);
        }
        group.throughput(Throughput::Elements(*shape_count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(shape_count), &space, |b, space| {
            b.iter(|| {
                let resolution = space.filter_by_tag(Tag::Ground).resolve(
                    black_box(Rect::new(50.0, 300.0, 64.0, 48.0)),
                    black_box(120.0),
                    black_box(400.0),
                    None,
                );
                black_box(resolution);
            });
        });
    }
    group.finish();
}

/// Benchmark: one main game frame with a generated level
fn bench_main_game_frame(c: &mut Criterion) {
    let mut ctx = GameContext::new(GameConfig::default(), 42);
    let mut scheduler = main_game_scheduler(&ctx).unwrap();
    let mut world = World::new();
    entities::player(&ctx.config).build(&mut world).unwrap();
    for _ in 0..120 {
        scheduler.update(&mut world, &mut ctx, 1.0 / 60.0).unwrap();
    }

    let mut queue = RenderQueue::new();
    c.bench_function("main_game_frame", |b| {
        b.iter(|| {
            scheduler.update(&mut world, &mut ctx, 1.0 / 60.0).unwrap();
            scheduler.render(&world, &ctx, &mut queue).unwrap();
            let mut surface = RecordingSurface::new();
            black_box(queue.flush(&mut surface).unwrap());
        });
    });
}

criterion_group!(benches, bench_resolve, bench_main_game_frame);
criterion_main!(benches);
