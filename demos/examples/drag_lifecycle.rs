// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draggable lifecycle, headless.
//!
//! Mounts a card inside a board, drags it against the board's bounds, swaps
//! an axis lock through a compartment, updates the plugin list, and destroys
//! the instance.
//!
//! Run:
//! - `cargo run -p understory_demos --example drag_lifecycle`
//! - `RUST_LOG=understory_draggable=debug cargo run -p understory_demos --example drag_lifecycle`

use std::rc::Rc;

use kurbo::{Insets, Point, Rect, Size, Vec2};
use understory_demos::{init_logging, print_node};
use understory_draggable::memory::{MemoryHost, MemoryNode};
use understory_draggable::plugins::{Axis, Bounds, BoundsFrom, Events, Grid, Position};
use understory_draggable::{
    Compartment, DragError, DraggableOptions, Engine, PluginRef, PointerEvent,
};

struct Pointer {
    time: f64,
}

impl Pointer {
    fn event(&mut self, target: MemoryNode, x: f64, y: f64) -> PointerEvent<MemoryNode> {
        self.time += 16.0;
        PointerEvent::new(1, target, Point::new(x, y), self.time)
    }

    fn drag(
        &mut self,
        engine: &Engine<MemoryHost>,
        target: MemoryNode,
        from: (f64, f64),
        to: (f64, f64),
    ) -> Result<(), DragError> {
        engine.pointer_down(&self.event(target, from.0, from.1))?;
        // A few intermediate samples, like a real pointer.
        for step in 1..=4 {
            let t = f64::from(step) / 4.0;
            let x = from.0 + (to.0 - from.0) * t;
            let y = from.1 + (to.1 - from.1) * t;
            engine.pointer_move(&self.event(target, x, y))?;
        }
        engine.pointer_up(&self.event(target, to.0, to.1))
    }
}

fn main() -> Result<(), DragError> {
    init_logging();

    let host = Rc::new(MemoryHost::new(Size::new(800.0, 600.0)));
    let board = host.create(host.body(), Rect::new(0.0, 0.0, 400.0, 300.0));
    let card = host.create(board, Rect::new(20.0, 20.0, 120.0, 80.0));
    host.set_classes(board, &["board"]);

    let engine = Engine::new(host.clone(), DraggableOptions::default());
    let lock = Compartment::new(Axis::X);
    let events = Events::<MemoryHost>::new()
        .on_drag_start(|data| tracing::info!(offset = ?data.offset, "drag start"))
        .on_drag_end(|data| tracing::info!(offset = ?data.offset, "drag end"));

    let draggable = engine.mount(
        card,
        [
            PluginRef::new(Position::new(Vec2::new(10.0, 0.0))),
            PluginRef::new(
                Bounds::new(BoundsFrom::Selector(".board".into()))
                    .with_padding(Insets::uniform(8.0)),
            ),
            PluginRef::from(lock.clone()),
            PluginRef::new(events),
        ],
    )?;
    print_node(&host, "mounted", card);

    let mut pointer = Pointer { time: 0.0 };

    // Locked to x, and the board stops the card at its right edge.
    pointer.drag(&engine, card, (50.0, 50.0), (600.0, 200.0))?;
    print_node(&host, "x, clamped", card);

    // Unlock vertical movement without remounting.
    lock.set(Axis::Y)?;
    pointer.drag(&engine, card, (300.0, 50.0), (300.0, 120.0))?;
    print_node(&host, "y", card);

    // Snap to a grid from now on; the drag count survives the update.
    draggable.update([
        PluginRef::new(Grid::new(25.0, 25.0)),
        PluginRef::from(lock.clone()),
    ])?;
    lock.clear()?;
    pointer.drag(&engine, card, (300.0, 120.0), (262.0, 141.0))?;
    print_node(&host, "grid", card);
    println!("offset after three drags: {:?}", draggable.offset()?);

    draggable.destroy()?;
    print_node(&host, "destroyed", card);
    Ok(())
}
