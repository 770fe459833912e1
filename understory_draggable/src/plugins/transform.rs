// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;

use kurbo::Vec2;

use crate::context::DragContext;
use crate::error::DragError;
use crate::event::PointerEvent;
use crate::host::Host;
use crate::plugin::{Hooks, Plugin};
use crate::style;

/// Custom writer for the element position: `(host, node, offset)`.
pub type TransformFn<H> = Rc<dyn Fn(&H, &<H as Host>::Node, Vec2)>;

/// Writes the would-be offset to the dragged node on every drag pass.
///
/// By default the offset is written as the inline `translate` property; a
/// custom [`TransformFn`] replaces that writer entirely. Runs at priority
/// `-1000` so it sees the final proposal of the pass. Offsets set outside a
/// drag (by [`Position`](super::Position) on mount or update) are written
/// through the same writer.
pub struct Transform<H: Host> {
    custom: Option<TransformFn<H>>,
}

impl<H: Host> Transform<H> {
    /// Uses `f` instead of the inline `translate` writer.
    pub fn custom(f: impl Fn(&H, &H::Node, Vec2) + 'static) -> Self {
        Self {
            custom: Some(Rc::new(f)),
        }
    }

    fn write(&self, ctx: &mut DragContext<H>, offset: Vec2) {
        let node = ctx.currently_dragged_node().clone();
        let custom = self.custom.clone();
        ctx.effect(move |host: &H| match custom {
            Some(f) => f(host, &node, offset),
            None => style::set_translate(host, &node, offset),
        });
    }
}

impl<H: Host> Default for Transform<H> {
    fn default() -> Self {
        Self { custom: None }
    }
}

impl<H: Host> core::fmt::Debug for Transform<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transform")
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

impl<H: Host> Plugin<H> for Transform<H> {
    type State = ();

    fn name(&self) -> &str {
        "neodrag:transform"
    }

    fn priority(&self) -> i32 {
        -1000
    }

    fn hooks(&self) -> Hooks {
        Hooks::DRAG
    }

    fn reposition(&self, ctx: &mut DragContext<H>, _state: &mut ()) {
        let offset = ctx.offset();
        self.write(ctx, offset);
    }

    fn drag(
        &self,
        ctx: &mut DragContext<H>,
        _state: &mut (),
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        if ctx.is_dragging() {
            let target = ctx.proposed().apply_to(ctx.offset());
            self.write(ctx, target);
        }
        Ok(())
    }
}
