// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect, Size};
use understory_draggable::memory::{MemoryHost, MemoryNode};
use understory_draggable::plugins::{Axis, Bounds, BoundsFrom, Events, Grid};
use understory_draggable::{DraggableOptions, Engine, PluginRef, PointerEvent};

fn plugins(extra: bool) -> Vec<PluginRef<MemoryHost>> {
    if !extra {
        return Vec::new();
    }
    vec![
        PluginRef::new(Axis::X),
        PluginRef::new(Grid::new(4.0, 4.0)),
        PluginRef::new(Bounds::new(BoundsFrom::Viewport)),
        PluginRef::new(Events::<MemoryHost>::new().on_drag(|data| {
            black_box(data.offset);
        })),
    ]
}

/// An engine with one draggable under a chain of `depth` wrappers.
fn setup(depth: usize, extra: bool) -> (Engine<MemoryHost>, MemoryNode, MemoryNode) {
    let host = Rc::new(MemoryHost::new(Size::new(4_000.0, 4_000.0)));
    let node = host.create(host.body(), Rect::new(0.0, 0.0, 100.0, 100.0));
    let mut target = node;
    for _ in 0..depth {
        target = host.create(target, Rect::new(0.0, 0.0, 100.0, 100.0));
    }
    let engine = Engine::new(host, DraggableOptions::default());
    engine.mount(node, plugins(extra)).expect("mount");
    (engine, node, target)
}

fn bench_pointer_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_draggable");

    for &extra in &[false, true] {
        let label = if extra { "defaults+4" } else { "defaults" };
        group.bench_function(format!("drag_pass({label})"), |b| {
            let (engine, node, _) = setup(0, extra);
            engine
                .pointer_down(&PointerEvent::new(1, node, Point::new(10.0, 10.0), 0.0))
                .expect("down");
            let mut x = 10.0;
            let mut t = 0.0;
            b.iter(|| {
                x += 1.0;
                t += 1.0;
                let event = PointerEvent::new(1, node, Point::new(x, 10.0), t);
                engine.pointer_move(black_box(&event)).expect("move");
            });
        });
    }

    for &depth in &[1_usize, 16, 64] {
        group.bench_function(format!("gesture(depth={depth})"), |b| {
            b.iter_batched(
                || setup(depth, false),
                |(engine, node, target)| {
                    engine
                        .pointer_down(&PointerEvent::new(1, target, Point::new(10.0, 10.0), 0.0))
                        .expect("down");
                    for i in 1..=8 {
                        let p = Point::new(10.0 + f64::from(i) * 5.0, 10.0);
                        engine
                            .pointer_move(&PointerEvent::new(1, node, p, f64::from(i)))
                            .expect("move");
                    }
                    engine
                        .pointer_up(&PointerEvent::new(1, node, Point::new(50.0, 10.0), 9.0))
                        .expect("up");
                    black_box(engine);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pointer_move);
criterion_main!(benches);
