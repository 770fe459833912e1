// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred side effects collected during a pass.
//!
//! Hooks never mutate the document directly. They register effects through
//! [`DragContext::effect`](crate::DragContext::effect), and the engine either
//! flushes the whole batch in registration order once the pass succeeds, or
//! discards it untouched when the pass is cancelled or fails.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use kurbo::Size;
//! use understory_draggable::effect::EffectQueue;
//! use understory_draggable::memory::MemoryHost;
//!
//! let host = MemoryHost::new(Size::new(100.0, 100.0));
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let mut queue = EffectQueue::<MemoryHost>::new();
//! for i in 0..3 {
//!     let log = log.clone();
//!     queue.push(move |_host: &MemoryHost| log.borrow_mut().push(i));
//! }
//! queue.flush(&host);
//! assert_eq!(*log.borrow(), [0, 1, 2]);
//! assert!(queue.is_empty());
//! ```

use alloc::boxed::Box;

use smallvec::SmallVec;

use crate::host::Host;

/// A deferred side effect.
pub type Effect<H> = Box<dyn FnOnce(&H)>;

/// Ordered queue of effects for one pass.
pub struct EffectQueue<H: Host> {
    effects: SmallVec<[Effect<H>; 4]>,
}

impl<H: Host> EffectQueue<H> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            effects: SmallVec::new(),
        }
    }

    /// Appends an effect.
    pub fn push(&mut self, effect: impl FnOnce(&H) + 'static) {
        self.effects.push(Box::new(effect));
    }

    /// Number of pending effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Runs every pending effect in registration order and empties the queue.
    pub fn flush(&mut self, host: &H) {
        for effect in self.effects.drain(..) {
            effect(host);
        }
    }

    /// Drops every pending effect without running it.
    pub fn discard(&mut self) {
        self.effects.clear();
    }

    /// Moves all pending effects out, leaving the queue empty.
    pub(crate) fn take(&mut self) -> Self {
        Self {
            effects: core::mem::take(&mut self.effects),
        }
    }

    /// Appends all effects of `other`, preserving order.
    pub(crate) fn append(&mut self, other: Self) {
        self.effects.extend(other.effects);
    }
}

impl<H: Host> Default for EffectQueue<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> core::fmt::Debug for EffectQueue<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EffectQueue")
            .field("len", &self.effects.len())
            .finish_non_exhaustive()
    }
}
