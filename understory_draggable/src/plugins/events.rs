// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;

use crate::context::DragContext;
use crate::error::DragError;
use crate::event::PointerEvent;
use crate::host::{DragEventData, DragEventKind, Host};
use crate::plugin::{Hooks, Plugin};

/// Callback invoked with a drag lifecycle payload.
pub type DragCallback<N> = Rc<dyn Fn(&DragEventData<N>)>;

/// Reports drag start, movement, and end.
///
/// Each report is an effect, so it only fires for passes that commit. The
/// `offset` of a drag report is the offset about to be committed by that pass.
/// Callbacks run first, then the host event (when `dispatch` is set).
///
/// Runs at priority `-1001`, after [`Transform`](super::Transform), so it
/// reports the final proposal of the pass.
pub struct Events<H: Host> {
    /// Called when the drag starts.
    pub on_drag_start: Option<DragCallback<H::Node>>,
    /// Called for every committed drag pass.
    pub on_drag: Option<DragCallback<H::Node>>,
    /// Called when a drag ends.
    pub on_drag_end: Option<DragCallback<H::Node>>,
    /// Also dispatch `neodrag:start`/`neodrag`/`neodrag:end` through the host.
    pub dispatch: bool,
}

impl<H: Host> Default for Events<H> {
    fn default() -> Self {
        Self {
            on_drag_start: None,
            on_drag: None,
            on_drag_end: None,
            dispatch: true,
        }
    }
}

impl<H: Host> Events<H> {
    /// Dispatches host events only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the drag start callback.
    #[must_use]
    pub fn on_drag_start(mut self, f: impl Fn(&DragEventData<H::Node>) + 'static) -> Self {
        self.on_drag_start = Some(Rc::new(f));
        self
    }

    /// Sets the drag callback.
    #[must_use]
    pub fn on_drag(mut self, f: impl Fn(&DragEventData<H::Node>) + 'static) -> Self {
        self.on_drag = Some(Rc::new(f));
        self
    }

    /// Sets the drag end callback.
    #[must_use]
    pub fn on_drag_end(mut self, f: impl Fn(&DragEventData<H::Node>) + 'static) -> Self {
        self.on_drag_end = Some(Rc::new(f));
        self
    }

    /// Enables or disables host event dispatch.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: bool) -> Self {
        self.dispatch = dispatch;
        self
    }

    fn report(&self, ctx: &mut DragContext<H>, kind: DragEventKind) {
        let callback = match kind {
            DragEventKind::Start => self.on_drag_start.clone(),
            DragEventKind::Drag => self.on_drag.clone(),
            DragEventKind::End => self.on_drag_end.clone(),
        };
        if callback.is_none() && !self.dispatch {
            return;
        }
        let offset = match kind {
            DragEventKind::Drag => ctx.proposed().apply_to(ctx.offset()),
            DragEventKind::Start | DragEventKind::End => ctx.offset(),
        };
        let detail = DragEventData {
            offset,
            root_node: ctx.root_node().clone(),
            current_node: ctx.currently_dragged_node().clone(),
        };
        let dispatch = self.dispatch;
        ctx.effect(move |host: &H| {
            if let Some(callback) = callback {
                callback(&detail);
            }
            if dispatch {
                host.dispatch_drag_event(&detail.root_node, kind, &detail);
            }
        });
    }
}

impl<H: Host> core::fmt::Debug for Events<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Events")
            .field("on_drag_start", &self.on_drag_start.is_some())
            .field("on_drag", &self.on_drag.is_some())
            .field("on_drag_end", &self.on_drag_end.is_some())
            .field("dispatch", &self.dispatch)
            .finish()
    }
}

impl<H: Host> Plugin<H> for Events<H> {
    type State = ();

    fn name(&self) -> &str {
        "neodrag:events"
    }

    fn priority(&self) -> i32 {
        -1001
    }

    fn hooks(&self) -> Hooks {
        Hooks::DRAG_START | Hooks::DRAG | Hooks::DRAG_END
    }

    fn drag_start(
        &self,
        ctx: &mut DragContext<H>,
        _state: &mut (),
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        self.report(ctx, DragEventKind::Start);
        Ok(())
    }

    fn drag(
        &self,
        ctx: &mut DragContext<H>,
        _state: &mut (),
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        if ctx.is_dragging() {
            self.report(ctx, DragEventKind::Drag);
        }
        Ok(())
    }

    fn drag_end(
        &self,
        ctx: &mut DragContext<H>,
        _state: &mut (),
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        if ctx.is_dragging() {
            self.report(ctx, DragEventKind::End);
        }
        Ok(())
    }
}
