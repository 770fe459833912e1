// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for the engine integration tests.

#![allow(
    missing_docs,
    dead_code,
    reason = "Integration-test helper module; each test binary uses a different subset."
)]

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect, Size, Vec2};
use understory_draggable::memory::{MemoryHost, MemoryNode};
use understory_draggable::{
    DragContext, DragError, Draggable, DraggableOptions, Engine, Plugin, PluginRef,
    PointerEvent, PointerId,
};

/// Opt-in logs: `RUST_LOG=understory_draggable=trace cargo test`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A document with one 100x100 draggable-sized node at the origin.
pub(crate) struct Fixture {
    pub host: Rc<MemoryHost>,
    pub engine: Engine<MemoryHost>,
    pub node: MemoryNode,
    time: f64,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_options(DraggableOptions::default())
    }

    /// No default plugins; only what the test mounts runs.
    pub(crate) fn bare() -> Self {
        Self::with_options(DraggableOptions::empty())
    }

    pub(crate) fn with_options(options: DraggableOptions<MemoryHost>) -> Self {
        init_tracing();
        let host = Rc::new(MemoryHost::new(Size::new(800.0, 600.0)));
        let node = host.create(host.body(), Rect::new(0.0, 0.0, 100.0, 100.0));
        let engine = Engine::new(host.clone(), options);
        Self {
            host,
            engine,
            node,
            time: 0.0,
        }
    }

    pub(crate) fn mount(
        &self,
        plugins: impl IntoIterator<Item = PluginRef<MemoryHost>>,
    ) -> Draggable<MemoryHost> {
        self.engine.mount(self.node, plugins).unwrap()
    }

    pub(crate) fn event(
        &mut self,
        pointer: PointerId,
        target: MemoryNode,
        x: f64,
        y: f64,
    ) -> PointerEvent<MemoryNode> {
        self.time += 16.0;
        PointerEvent::new(pointer, target, Point::new(x, y), self.time)
    }

    pub(crate) fn down(&mut self, x: f64, y: f64) -> Result<(), DragError> {
        let event = self.event(1, self.node, x, y);
        self.engine.pointer_down(&event)
    }

    pub(crate) fn down_on(&mut self, target: MemoryNode, x: f64, y: f64) -> Result<(), DragError> {
        let event = self.event(1, target, x, y);
        self.engine.pointer_down(&event)
    }

    pub(crate) fn move_to(&mut self, x: f64, y: f64) -> Result<(), DragError> {
        let event = self.event(1, self.node, x, y);
        self.engine.pointer_move(&event)
    }

    pub(crate) fn up(&mut self, x: f64, y: f64) -> Result<(), DragError> {
        let event = self.event(1, self.node, x, y);
        self.engine.pointer_up(&event)
    }

    /// A full press-move-release gesture that must succeed.
    pub(crate) fn drag(&mut self, from: (f64, f64), to: (f64, f64)) {
        self.down(from.0, from.1).unwrap();
        self.move_to(to.0, to.1).unwrap();
        self.up(to.0, to.1).unwrap();
    }

    pub(crate) fn translate(&self) -> Option<String> {
        use understory_draggable::Host as _;
        self.host.style(&self.node, "translate")
    }

    pub(crate) fn data(&self, key: &str) -> Option<String> {
        use understory_draggable::Host as _;
        self.host.data(&self.node, key)
    }
}

pub(crate) fn offset(draggable: &Draggable<MemoryHost>) -> Vec2 {
    draggable.offset().unwrap()
}

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

pub(crate) fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// What a [`Recorder`] does besides logging.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Behavior {
    /// Return `false` from `should_drag`.
    pub veto: bool,
    /// Call `cancel()` in every `drag` pass.
    pub cancel_drag: bool,
    /// Return an error from `drag` once dragging.
    pub fail_drag: bool,
    /// Return an error from `drag_end`.
    pub fail_drag_end: bool,
    /// Return an error from `setup`.
    pub fail_setup: bool,
    /// Register an effect in every pointer hook.
    pub effects: bool,
}

/// Logs `name:hook` for every call it receives.
pub(crate) struct Recorder {
    pub name: &'static str,
    pub priority: i32,
    pub cancelable: bool,
    pub behavior: Behavior,
    pub log: Log,
}

impl Recorder {
    pub(crate) fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            priority: 0,
            cancelable: true,
            behavior: Behavior::default(),
            log: log.clone(),
        }
    }

    pub(crate) fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub(crate) fn non_cancelable(mut self) -> Self {
        self.cancelable = false;
        self
    }

    pub(crate) fn behave(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub(crate) fn into_ref(self) -> PluginRef<MemoryHost> {
        PluginRef::new(self)
    }

    fn record(&self, ctx: &mut DragContext<MemoryHost>, hook: &str) {
        self.log.borrow_mut().push(format!("{}:{hook}", self.name));
        if self.behavior.effects {
            let log = self.log.clone();
            let entry = format!("{}:effect:{hook}", self.name);
            ctx.effect(move |_host: &MemoryHost| log.borrow_mut().push(entry));
        }
    }

    fn failure(&self, hook: &str) -> DragError {
        DragError::Plugin {
            plugin: self.name.to_string(),
            message: format!("{hook} failed"),
        }
    }
}

impl Plugin<MemoryHost> for Recorder {
    /// Number of pointer hooks seen by this instance.
    type State = u32;

    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn cancelable(&self) -> bool {
        self.cancelable
    }

    fn setup(&self, ctx: &mut DragContext<MemoryHost>) -> Result<u32, DragError> {
        self.record(ctx, "setup");
        if self.behavior.fail_setup {
            return Err(self.failure("setup"));
        }
        Ok(0)
    }

    fn should_drag(
        &self,
        ctx: &mut DragContext<MemoryHost>,
        seen: &mut u32,
        _event: &PointerEvent<MemoryNode>,
    ) -> Result<bool, DragError> {
        *seen += 1;
        self.record(ctx, "should_drag");
        Ok(!self.behavior.veto)
    }

    fn drag_start(
        &self,
        ctx: &mut DragContext<MemoryHost>,
        seen: &mut u32,
        _event: &PointerEvent<MemoryNode>,
    ) -> Result<(), DragError> {
        *seen += 1;
        self.record(ctx, "drag_start");
        Ok(())
    }

    fn drag(
        &self,
        ctx: &mut DragContext<MemoryHost>,
        seen: &mut u32,
        _event: &PointerEvent<MemoryNode>,
    ) -> Result<(), DragError> {
        *seen += 1;
        let hook = if ctx.is_dragging() { "drag" } else { "pending" };
        self.record(ctx, hook);
        if self.behavior.cancel_drag {
            ctx.cancel();
        }
        if self.behavior.fail_drag && ctx.is_dragging() {
            return Err(self.failure("drag"));
        }
        Ok(())
    }

    fn drag_end(
        &self,
        ctx: &mut DragContext<MemoryHost>,
        seen: &mut u32,
        _event: &PointerEvent<MemoryNode>,
    ) -> Result<(), DragError> {
        *seen += 1;
        self.record(ctx, "drag_end");
        if self.behavior.fail_drag_end {
            return Err(self.failure("drag_end"));
        }
        Ok(())
    }

    fn cleanup(&self, _ctx: &mut DragContext<MemoryHost>, seen: &mut u32) {
        self.log
            .borrow_mut()
            .push(format!("{}:cleanup after {seen} hooks", self.name));
    }
}

/// Entries of `log` that start with `prefix`.
pub(crate) fn entries(log: &Log, prefix: &str) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|e| e.starts_with(prefix))
        .cloned()
        .collect()
}
