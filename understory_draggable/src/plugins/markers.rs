// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small bookkeeping plugins: dataset markers, inline style toggles, and
//! interaction gates.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use core::cell::Cell;

use crate::context::DragContext;
use crate::error::DragError;
use crate::event::PointerEvent;
use crate::host::Host;
use crate::plugin::{Hooks, Plugin};
use crate::style::{self, DATA_COUNT, DATA_ROOT, DATA_STATE};

/// Ignores non-primary pointers.
///
/// Not cancelable: it observes every pass even after another plugin cancelled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IgnoreMultitouch {
    /// When `false` the plugin lets every pointer through.
    pub enabled: bool,
}

impl Default for IgnoreMultitouch {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl<H: Host> Plugin<H> for IgnoreMultitouch {
    type State = ();

    fn name(&self) -> &str {
        "neodrag:ignoreMultitouch"
    }

    fn cancelable(&self) -> bool {
        false
    }

    fn hooks(&self) -> Hooks {
        Hooks::SHOULD_DRAG | Hooks::DRAG
    }

    fn should_drag(
        &self,
        _ctx: &mut DragContext<H>,
        _state: &mut (),
        event: &PointerEvent<H::Node>,
    ) -> Result<bool, DragError> {
        Ok(!self.enabled || event.is_primary)
    }

    fn drag(
        &self,
        ctx: &mut DragContext<H>,
        _state: &mut (),
        event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        if self.enabled && !event.is_primary {
            ctx.cancel();
        }
        Ok(())
    }
}

/// Mirrors the drag phase into `data-neodrag-state` and counts completed
/// drags in `data-neodrag-count`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StateMarker;

impl<H: Host> Plugin<H> for StateMarker {
    /// Completed drags; shared with the effects that publish it.
    type State = Rc<Cell<u64>>;

    fn name(&self) -> &str {
        "neodrag:stateMarker"
    }

    fn hooks(&self) -> Hooks {
        Hooks::DRAG_START | Hooks::DRAG_END
    }

    fn setup(&self, ctx: &mut DragContext<H>) -> Result<Rc<Cell<u64>>, DragError> {
        let node = ctx.root_node().clone();
        ctx.effect(move |host: &H| {
            host.set_data(&node, DATA_ROOT, "");
            host.set_data(&node, DATA_STATE, "idle");
            host.set_data(&node, DATA_COUNT, "0");
        });
        Ok(Rc::default())
    }

    fn drag_start(
        &self,
        ctx: &mut DragContext<H>,
        _state: &mut Rc<Cell<u64>>,
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        let node = ctx.root_node().clone();
        ctx.effect(move |host: &H| host.set_data(&node, DATA_STATE, "dragging"));
        Ok(())
    }

    fn drag_end(
        &self,
        ctx: &mut DragContext<H>,
        state: &mut Rc<Cell<u64>>,
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        if !ctx.is_dragging() {
            return Ok(());
        }
        let node = ctx.root_node().clone();
        let count = state.clone();
        ctx.effect(move |host: &H| {
            count.set(count.get() + 1);
            host.set_data(&node, DATA_STATE, "idle");
            host.set_data(&node, DATA_COUNT, &count.get().to_string());
        });
        Ok(())
    }

    fn cleanup(&self, ctx: &mut DragContext<H>, _state: &mut Rc<Cell<u64>>) {
        let node = ctx.root_node().clone();
        ctx.effect(move |host: &H| {
            host.remove_data(&node, DATA_ROOT);
            host.remove_data(&node, DATA_STATE);
            host.remove_data(&node, DATA_COUNT);
        });
    }
}

/// Turns off text selection on the delegation root while dragging.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UserSelect;

const USER_SELECT: &str = "user-select";

impl<H: Host> Plugin<H> for UserSelect {
    /// Inline value seen at drag start, present while it is overridden.
    type State = Option<Option<String>>;

    fn name(&self) -> &str {
        "neodrag:userSelect"
    }

    fn hooks(&self) -> Hooks {
        Hooks::DRAG_START | Hooks::DRAG_END
    }

    fn drag_start(
        &self,
        ctx: &mut DragContext<H>,
        state: &mut Option<Option<String>>,
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        let target = ctx.delegate_target().clone();
        *state = Some(ctx.host().style(&target, USER_SELECT));
        ctx.effect(move |host: &H| host.set_style(&target, USER_SELECT, "none"));
        Ok(())
    }

    fn drag_end(
        &self,
        ctx: &mut DragContext<H>,
        state: &mut Option<Option<String>>,
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        if let Some(previous) = state.take() {
            let target = ctx.delegate_target().clone();
            ctx.effect(move |host: &H| {
                style::restore_style(host, &target, USER_SELECT, previous.as_deref());
            });
        }
        Ok(())
    }
}

/// Sets an inline `touch-action` on the mounted node so touch drags are not
/// taken over by scrolling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TouchAction {
    /// Value written at setup.
    pub value: String,
}

const TOUCH_ACTION: &str = "touch-action";

impl Default for TouchAction {
    fn default() -> Self {
        Self {
            value: "none".to_string(),
        }
    }
}

impl TouchAction {
    /// Writes `value` instead of `none`.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl<H: Host> Plugin<H> for TouchAction {
    /// Inline value before setup.
    type State = Option<String>;

    fn name(&self) -> &str {
        "neodrag:touchAction"
    }

    fn hooks(&self) -> Hooks {
        Hooks::empty()
    }

    fn setup(&self, ctx: &mut DragContext<H>) -> Result<Option<String>, DragError> {
        let node = ctx.root_node().clone();
        let previous = ctx.host().style(&node, TOUCH_ACTION);
        let value = self.value.clone();
        ctx.effect(move |host: &H| host.set_style(&node, TOUCH_ACTION, &value));
        Ok(previous)
    }

    fn cleanup(&self, ctx: &mut DragContext<H>, state: &mut Option<String>) {
        let node = ctx.root_node().clone();
        let previous = state.take();
        ctx.effect(move |host: &H| {
            style::restore_style(host, &node, TOUCH_ACTION, previous.as_deref());
        });
    }
}

/// Vetoes every interaction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Disabled;

impl<H: Host> Plugin<H> for Disabled {
    type State = ();

    fn name(&self) -> &str {
        "neodrag:disabled"
    }

    fn hooks(&self) -> Hooks {
        Hooks::SHOULD_DRAG
    }

    fn should_drag(
        &self,
        _ctx: &mut DragContext<H>,
        _state: &mut (),
        _event: &PointerEvent<H::Node>,
    ) -> Result<bool, DragError> {
        Ok(false)
    }
}
