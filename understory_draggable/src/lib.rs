// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Draggable: a pointer-driven drag engine with a plugin pipeline.
//!
//! This crate turns pointer-down/move/up sequences on a UI node into positional
//! deltas. Every decision along the way is delegated to an ordered chain of
//! small behavior modules ([`Plugin`]s) that can veto, reshape, or observe the
//! drag, and every visible change they want to make is deferred into an
//! [effect batch](effect) that is only applied when the whole pass succeeds.
//!
//! - [`Engine`]: one per delegation root. Owns the instance registry, the
//!   pointer state machine (idle → interacting → dragging → idle), and runs the
//!   plugin pipeline for each pointer event.
//! - [`DragContext`]: the per-instance shared state every hook reads and writes.
//! - [`Plugin`]: the hook contract (`setup`, `should_drag`, `drag_start`,
//!   `drag`, `drag_end`, `cleanup`), with priority and cancelability.
//! - [`Compartment`]: a swappable single-slot plugin holder for live
//!   reconfiguration without remounting.
//! - [`plugins`]: the built-in behaviors (axis locks, bounds, grid, threshold,
//!   transform writer, dataset markers, controls, callbacks).
//!
//! The crate does not talk to a DOM directly. Embeddings implement [`Host`]
//! for their node type and forward pointer events to the engine; [`memory`]
//! provides an in-memory host used by tests and headless tools.
//!
//! ## Minimal example
//!
//! ```rust
//! use std::rc::Rc;
//! use kurbo::{Point, Rect, Size};
//! use understory_draggable::memory::MemoryHost;
//! use understory_draggable::plugins::Axis;
//! use understory_draggable::{DraggableOptions, Engine, Host, PluginRef, PointerEvent};
//!
//! let host = Rc::new(MemoryHost::new(Size::new(800.0, 600.0)));
//! let node = host.create(host.body(), Rect::new(0.0, 0.0, 100.0, 100.0));
//!
//! let engine = Engine::new(host.clone(), DraggableOptions::default());
//! let draggable = engine.mount(node, [PluginRef::new(Axis::X)]).unwrap();
//!
//! engine.pointer_down(&PointerEvent::new(1, node, Point::new(10.0, 10.0), 0.0)).unwrap();
//! engine.pointer_move(&PointerEvent::new(1, node, Point::new(60.0, 40.0), 16.0)).unwrap();
//! engine.pointer_up(&PointerEvent::new(1, node, Point::new(60.0, 40.0), 32.0)).unwrap();
//!
//! assert_eq!(draggable.offset().unwrap(), kurbo::Vec2::new(50.0, 0.0));
//! assert_eq!(host.style(&node, "translate").as_deref(), Some("50px 0px"));
//! ```
//!
//! ## Pass semantics
//!
//! A *pass* runs one hook across every plugin in descending priority order.
//! A hook may cancel the pass (return `false` from `should_drag`, or call
//! [`DragContext::cancel`]); remaining cancelable plugins are skipped, while
//! plugins declaring `cancelable() == false` still observe the event. When a
//! pass succeeds its effects are flushed and the offset is committed; when it
//! is cancelled or a hook returns an error, both are dropped together.
//!
//! ## Features
//!
//! - `std` (default): forward `std` to `kurbo`, `thiserror` and `tracing`.
//! - `libm`: floating point support for `no_std` builds through `kurbo`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod compartment;
pub mod context;
pub mod effect;
mod engine;
mod error;
mod event;
pub mod host;
mod instance;
pub mod memory;
pub mod plugin;
pub mod plugins;
pub mod style;

pub use compartment::Compartment;
pub use context::{DragContext, Proposal};
pub use engine::{Draggable, DraggableOptions, Engine, InstanceId};
pub use error::DragError;
pub use event::{PointerEvent, PointerId, SECONDARY_BUTTON};
pub use host::{DragEventData, DragEventKind, Host};
pub use plugin::{Hooks, Plugin, PluginRef};
