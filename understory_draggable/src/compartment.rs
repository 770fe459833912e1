// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Swappable single-slot plugin holders.
//!
//! A [`Compartment`] sits in an instance's plugin list like any other plugin
//! and forwards every hook to whatever plugin it currently holds (or does
//! nothing when empty). Replacing the occupant rebinds behavior without
//! remounting the instance, so every other plugin keeps its private state.
//!
//! On [`set`](Compartment::set) the outgoing plugin's `cleanup` and the
//! incoming plugin's `setup` run right away for every instance using the
//! compartment, and one-time setup effects are flushed synchronously. If the
//! swap happens while the engine is busy (from inside a hook or an effect),
//! it is applied at the start of that instance's next pass instead.
//!
//! ```
//! use std::rc::Rc;
//! use kurbo::{Rect, Size};
//! use understory_draggable::memory::MemoryHost;
//! use understory_draggable::plugins::{Axis, Disabled};
//! use understory_draggable::{Compartment, DraggableOptions, Engine, PluginRef};
//!
//! let host = Rc::new(MemoryHost::new(Size::new(800.0, 600.0)));
//! let node = host.create(host.body(), Rect::new(0.0, 0.0, 50.0, 50.0));
//! let engine = Engine::new(host.clone(), DraggableOptions::default());
//!
//! let lock = Compartment::new(Axis::X);
//! let _draggable = engine.mount(node, [PluginRef::from(lock.clone())]).unwrap();
//!
//! // Later, in reaction to application state:
//! lock.set(Disabled).unwrap();
//! assert_eq!(lock.current_name().as_deref(), Some("neodrag:disabled"));
//! ```

use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::{EngineShared, InstanceId};
use crate::error::DragError;
use crate::host::Host;
use crate::plugin::{DynPlugin, Plugin};

static NEXT_COMPARTMENT: AtomicUsize = AtomicUsize::new(1);

struct Subscriber<H: Host> {
    engine: Weak<EngineShared<H>>,
    instance: InstanceId,
}

impl<H: Host> Clone for Subscriber<H> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            instance: self.instance,
        }
    }
}

struct Slot<H: Host> {
    current: Option<DynPlugin<H>>,
    revision: u64,
    subscribers: Vec<Subscriber<H>>,
}

/// A shared slot holding zero or one plugin.
///
/// Clones refer to the same slot.
pub struct Compartment<H: Host> {
    key: Rc<str>,
    slot: Rc<RefCell<Slot<H>>>,
}

impl<H: Host> Compartment<H> {
    /// Creates a compartment holding `plugin`.
    pub fn new<P: Plugin<H>>(plugin: P) -> Self {
        Self::with_occupant(Some(Rc::new(plugin)))
    }

    /// Creates an empty compartment.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_occupant(None)
    }

    fn with_occupant(current: Option<DynPlugin<H>>) -> Self {
        let id = NEXT_COMPARTMENT.fetch_add(1, Ordering::Relaxed);
        Self {
            key: Rc::from(format!("compartment#{id}")),
            slot: Rc::new(RefCell::new(Slot {
                current,
                revision: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Stable name of this compartment in plugin lists.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name of the current occupant, if any.
    #[must_use]
    pub fn current_name(&self) -> Option<String> {
        self.slot
            .borrow()
            .current
            .as_ref()
            .map(|p| p.name().to_string())
    }

    /// Returns `true` when the compartment holds no plugin.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot.borrow().current.is_none()
    }

    /// Replaces the occupant with `plugin`.
    ///
    /// Returns the first error reported by the incoming plugin's `setup` on
    /// any instance; that instance is left with an empty slot.
    pub fn set<P: Plugin<H>>(&self, plugin: P) -> Result<(), DragError> {
        self.replace(Some(Rc::new(plugin)))
    }

    /// Empties the compartment.
    pub fn clear(&self) -> Result<(), DragError> {
        self.replace(None)
    }

    fn replace(&self, next: Option<DynPlugin<H>>) -> Result<(), DragError> {
        let subscribers = {
            let mut slot = self.slot.borrow_mut();
            slot.current = next;
            slot.revision += 1;
            slot.subscribers.retain(|s| s.engine.strong_count() > 0);
            slot.subscribers.clone()
        };
        let mut result = Ok(());
        for subscriber in subscribers {
            let Some(engine) = subscriber.engine.upgrade() else {
                continue;
            };
            if let Err(err) = engine.sync_compartments(subscriber.instance) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    pub(crate) fn occupant(&self) -> Option<DynPlugin<H>> {
        self.slot.borrow().current.clone()
    }

    pub(crate) fn revision(&self) -> u64 {
        self.slot.borrow().revision
    }

    pub(crate) fn subscribe(&self, engine: &Rc<EngineShared<H>>, instance: InstanceId) {
        let engine = Rc::downgrade(engine);
        let mut slot = self.slot.borrow_mut();
        let known = slot
            .subscribers
            .iter()
            .any(|s| s.instance == instance && Weak::ptr_eq(&s.engine, &engine));
        if !known {
            slot.subscribers.push(Subscriber { engine, instance });
        }
    }

    pub(crate) fn unsubscribe(&self, engine: &Rc<EngineShared<H>>, instance: InstanceId) {
        let engine = Rc::downgrade(engine);
        self.slot
            .borrow_mut()
            .subscribers
            .retain(|s| !(s.instance == instance && Weak::ptr_eq(&s.engine, &engine)));
    }
}

impl<H: Host> Clone for Compartment<H> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            slot: self.slot.clone(),
        }
    }
}

impl<H: Host> core::fmt::Debug for Compartment<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("Compartment")
            .field("key", &self.key)
            .field("current", &slot.current.as_ref().map(|p| p.name()))
            .field("revision", &slot.revision)
            .field("subscribers", &slot.subscribers.len())
            .finish()
    }
}
