// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The plugin contract.
//!
//! A plugin is a named bundle of optional hooks run by the engine at each
//! phase of a gesture:
//!
//! | Hook | When | Can |
//! |---|---|---|
//! | [`setup`](Plugin::setup) | mount, update, compartment swap | create private state, register one-time effects |
//! | [`reconfigure`](Plugin::reconfigure) | update that keeps the plugin | pick up the new plugin value |
//! | [`reposition`](Plugin::reposition) | offset moved outside a drag | write the new position |
//! | [`should_drag`](Plugin::should_drag) | pointer-down | veto the interaction by returning `false` |
//! | [`drag_start`](Plugin::drag_start) | promotion to dragging | cancel the promotion |
//! | [`drag`](Plugin::drag) | every pointer-move | propose movement, cancel the pass, prevent start |
//! | [`drag_end`](Plugin::drag_end) | pointer-up | restore, report |
//! | [`cleanup`](Plugin::cleanup) | destroy, removal, swap-out | undo setup |
//!
//! Plugins run in descending [`priority`](Plugin::priority); ties keep their
//! registration order. Once a pass is cancelled, remaining plugins are skipped
//! unless they opt out with [`cancelable`](Plugin::cancelable).
//!
//! Each plugin's private state lives in the instance, is created by `setup`,
//! and is handed back to every later hook of that instance. It is never shared
//! between instances.
//!
//! ## Writing a plugin
//!
//! ```
//! use understory_draggable::{DragContext, DragError, Host, Hooks, Plugin, PointerEvent};
//!
//! /// Refuses to move more than `max` pixels per event on either axis.
//! struct MaxStep {
//!     max: f64,
//! }
//!
//! impl<H: Host> Plugin<H> for MaxStep {
//!     type State = ();
//!
//!     fn name(&self) -> &str {
//!         "max-step"
//!     }
//!
//!     fn hooks(&self) -> Hooks {
//!         Hooks::DRAG
//!     }
//!
//!     fn drag(
//!         &self,
//!         ctx: &mut DragContext<H>,
//!         _state: &mut (),
//!         _event: &PointerEvent<H::Node>,
//!     ) -> Result<(), DragError> {
//!         let p = ctx.proposed();
//!         if p.x.is_some_and(|x| x.abs() > self.max) || p.y.is_some_and(|y| y.abs() > self.max) {
//!             ctx.cancel();
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::compartment::Compartment;
use crate::context::DragContext;
use crate::error::DragError;
use crate::event::PointerEvent;
use crate::host::Host;

bitflags::bitflags! {
    /// The pointer hooks a plugin implements.
    ///
    /// The engine only invokes hooks a plugin declares. `setup`, `reconfigure`,
    /// `reposition` and `cleanup` are always invoked.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Hooks: u8 {
        /// [`Plugin::should_drag`].
        const SHOULD_DRAG = 0b0001;
        /// [`Plugin::drag_start`].
        const DRAG_START  = 0b0010;
        /// [`Plugin::drag`].
        const DRAG        = 0b0100;
        /// [`Plugin::drag_end`].
        const DRAG_END    = 0b1000;
    }
}

/// A behavior module run by the drag pipeline.
///
/// All hooks have no-op defaults. See the [module docs](self) for when each
/// hook runs.
pub trait Plugin<H: Host>: 'static {
    /// Private per-instance state created by [`setup`](Self::setup).
    type State: Default + 'static;

    /// Unique name. Registering a second plugin with the same name replaces
    /// the first (see [`PluginRef`]).
    fn name(&self) -> &str;

    /// Higher runs earlier within a hook. Defaults to `0`.
    fn priority(&self) -> i32 {
        0
    }

    /// When `false`, the plugin still runs after an earlier plugin cancelled
    /// the pass. Defaults to `true`.
    fn cancelable(&self) -> bool {
        true
    }

    /// Pointer hooks this plugin implements. Defaults to all of them.
    fn hooks(&self) -> Hooks {
        Hooks::all()
    }

    /// Creates the private state. Effects registered here are flushed right
    /// away, outside of any drag pass.
    fn setup(&self, _ctx: &mut DragContext<H>) -> Result<Self::State, DragError> {
        Ok(Self::State::default())
    }

    /// Runs when [`Draggable::update`](crate::Draggable::update) keeps this
    /// plugin's state and hands it `self` as the new plugin value.
    ///
    /// Like `setup`, this may call [`DragContext::set_offset`]; its effects are
    /// flushed with the rest of the update.
    fn reconfigure(&self, _ctx: &mut DragContext<H>, _state: &mut Self::State) {}

    /// Runs after mount, update, or a compartment swap left the offset
    /// somewhere other than where it was. [`DragContext::offset`] is the new
    /// offset.
    fn reposition(&self, _ctx: &mut DragContext<H>, _state: &mut Self::State) {}

    /// Gatekeeper for pointer-down; returning `false` vetoes the interaction.
    fn should_drag(
        &self,
        _ctx: &mut DragContext<H>,
        _state: &mut Self::State,
        _event: &PointerEvent<H::Node>,
    ) -> Result<bool, DragError> {
        Ok(true)
    }

    /// Runs once when the gesture is promoted to a drag.
    fn drag_start(
        &self,
        _ctx: &mut DragContext<H>,
        _state: &mut Self::State,
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        Ok(())
    }

    /// Runs on every pointer-move.
    ///
    /// Before the drag has started this runs as a pre-start pass with
    /// [`DragContext::is_dragging`] returning `false`; effects of a pre-start pass
    /// are always discarded, and [`DragContext::prevent_start`] keeps the
    /// gesture from being promoted on this event.
    fn drag(
        &self,
        _ctx: &mut DragContext<H>,
        _state: &mut Self::State,
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        Ok(())
    }

    /// Runs on every pointer-up of an accepted interaction, even if the last
    /// drag pass was cancelled. [`DragContext::is_dragging`] tells whether a
    /// drag actually happened.
    fn drag_end(
        &self,
        _ctx: &mut DragContext<H>,
        _state: &mut Self::State,
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        Ok(())
    }

    /// Runs when the plugin leaves the instance.
    fn cleanup(&self, _ctx: &mut DragContext<H>, _state: &mut Self::State) {}
}

/// Pointer hook selector used by the pipeline.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Hook {
    ShouldDrag,
    DragStart,
    Drag,
    DragEnd,
}

impl Hook {
    pub(crate) const fn flag(self) -> Hooks {
        match self {
            Self::ShouldDrag => Hooks::SHOULD_DRAG,
            Self::DragStart => Hooks::DRAG_START,
            Self::Drag => Hooks::DRAG,
            Self::DragEnd => Hooks::DRAG_END,
        }
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::ShouldDrag => "should_drag",
            Self::DragStart => "drag_start",
            Self::Drag => "drag",
            Self::DragEnd => "drag_end",
        }
    }
}

/// Object-safe form of [`Plugin`] with type-erased state.
pub(crate) trait ErasedPlugin<H: Host> {
    fn name(&self) -> &str;
    fn priority(&self) -> i32;
    fn cancelable(&self) -> bool;
    fn hooks(&self) -> Hooks;
    fn state_type(&self) -> TypeId;
    fn setup(&self, ctx: &mut DragContext<H>) -> Result<Box<dyn Any>, DragError>;
    fn reconfigure(&self, ctx: &mut DragContext<H>, state: &mut dyn Any);
    fn reposition(&self, ctx: &mut DragContext<H>, state: &mut dyn Any);
    /// Runs a pointer hook; `Ok(false)` means the hook vetoed the pass.
    fn run(
        &self,
        hook: Hook,
        ctx: &mut DragContext<H>,
        state: &mut dyn Any,
        event: &PointerEvent<H::Node>,
    ) -> Result<bool, DragError>;
    fn cleanup(&self, ctx: &mut DragContext<H>, state: &mut dyn Any);
}

impl<H: Host, P: Plugin<H>> ErasedPlugin<H> for P {
    fn name(&self) -> &str {
        <P as Plugin<H>>::name(self)
    }

    fn priority(&self) -> i32 {
        <P as Plugin<H>>::priority(self)
    }

    fn cancelable(&self) -> bool {
        <P as Plugin<H>>::cancelable(self)
    }

    fn hooks(&self) -> Hooks {
        <P as Plugin<H>>::hooks(self)
    }

    fn state_type(&self) -> TypeId {
        TypeId::of::<<P as Plugin<H>>::State>()
    }

    fn setup(&self, ctx: &mut DragContext<H>) -> Result<Box<dyn Any>, DragError> {
        let state = <P as Plugin<H>>::setup(self, ctx)?;
        Ok(Box::new(state))
    }

    fn reconfigure(&self, ctx: &mut DragContext<H>, state: &mut dyn Any) {
        if let Some(state) = state.downcast_mut::<<P as Plugin<H>>::State>() {
            <P as Plugin<H>>::reconfigure(self, ctx, state);
        }
    }

    fn reposition(&self, ctx: &mut DragContext<H>, state: &mut dyn Any) {
        if let Some(state) = state.downcast_mut::<<P as Plugin<H>>::State>() {
            <P as Plugin<H>>::reposition(self, ctx, state);
        }
    }

    fn run(
        &self,
        hook: Hook,
        ctx: &mut DragContext<H>,
        state: &mut dyn Any,
        event: &PointerEvent<H::Node>,
    ) -> Result<bool, DragError> {
        let Some(state) = state.downcast_mut::<<P as Plugin<H>>::State>() else {
            return Err(DragError::StateMismatch {
                plugin: <P as Plugin<H>>::name(self).to_string(),
            });
        };
        match hook {
            Hook::ShouldDrag => <P as Plugin<H>>::should_drag(self, ctx, state, event),
            Hook::DragStart => <P as Plugin<H>>::drag_start(self, ctx, state, event).map(|()| true),
            Hook::Drag => <P as Plugin<H>>::drag(self, ctx, state, event).map(|()| true),
            Hook::DragEnd => <P as Plugin<H>>::drag_end(self, ctx, state, event).map(|()| true),
        }
    }

    fn cleanup(&self, ctx: &mut DragContext<H>, state: &mut dyn Any) {
        if let Some(state) = state.downcast_mut::<<P as Plugin<H>>::State>() {
            <P as Plugin<H>>::cleanup(self, ctx, state);
        }
    }
}

/// A shared, dynamically dispatched plugin.
pub(crate) type DynPlugin<H> = Rc<dyn ErasedPlugin<H>>;

pub(crate) enum PluginKind<H: Host> {
    Plugin(DynPlugin<H>),
    Compartment(Compartment<H>),
}

impl<H: Host> Clone for PluginKind<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Plugin(p) => Self::Plugin(p.clone()),
            Self::Compartment(c) => Self::Compartment(c.clone()),
        }
    }
}

/// An entry in a plugin list: either a plugin or a [`Compartment`].
///
/// When a list contains several entries with the same name, a later entry
/// replaces an earlier one if its priority is greater than or equal to the
/// earlier one's; the surviving entry keeps the earlier entry's position.
/// The list is then ordered by descending priority, stable on ties.
pub struct PluginRef<H: Host> {
    pub(crate) kind: PluginKind<H>,
}

impl<H: Host> PluginRef<H> {
    /// Wraps a plugin.
    pub fn new<P: Plugin<H>>(plugin: P) -> Self {
        Self {
            kind: PluginKind::Plugin(Rc::new(plugin)),
        }
    }

    /// Name used for de-duplication and for diffing on update.
    ///
    /// For a compartment this is a stable per-compartment key, independent of
    /// its current occupant.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.kind {
            PluginKind::Plugin(p) => p.name(),
            PluginKind::Compartment(c) => c.key(),
        }
    }

    /// Current priority. For a compartment, that of its occupant (or `0`).
    #[must_use]
    pub fn priority(&self) -> i32 {
        match &self.kind {
            PluginKind::Plugin(p) => p.priority(),
            PluginKind::Compartment(c) => c.occupant().map_or(0, |p| p.priority()),
        }
    }

    pub(crate) fn compartment(&self) -> Option<&Compartment<H>> {
        match &self.kind {
            PluginKind::Plugin(_) => None,
            PluginKind::Compartment(c) => Some(c),
        }
    }
}

impl<H: Host> Clone for PluginRef<H> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
        }
    }
}

impl<H: Host> From<Compartment<H>> for PluginRef<H> {
    fn from(compartment: Compartment<H>) -> Self {
        Self {
            kind: PluginKind::Compartment(compartment),
        }
    }
}

impl<H: Host> core::fmt::Debug for PluginRef<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let kind = match self.kind {
            PluginKind::Plugin(_) => "plugin",
            PluginKind::Compartment(_) => "compartment",
        };
        f.debug_struct("PluginRef")
            .field("name", &self.name())
            .field("kind", &kind)
            .field("priority", &self.priority())
            .finish()
    }
}

/// De-duplicates by name and orders by descending priority.
pub(crate) fn resolve<H: Host>(plugins: impl IntoIterator<Item = PluginRef<H>>) -> Vec<PluginRef<H>> {
    let mut resolved: Vec<PluginRef<H>> = Vec::new();
    for plugin in plugins {
        match resolved.iter_mut().find(|p| p.name() == plugin.name()) {
            Some(existing) => {
                if existing.priority() <= plugin.priority() {
                    *existing = plugin;
                }
            }
            None => resolved.push(plugin),
        }
    }
    // `sort_by_key` is stable, so ties keep registration order.
    resolved.sort_by_key(|p| core::cmp::Reverse(p.priority()));
    resolved
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::memory::MemoryHost;

    struct Named {
        name: &'static str,
        priority: i32,
    }

    impl Plugin<MemoryHost> for Named {
        type State = ();

        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }
    }

    fn named(name: &'static str, priority: i32) -> PluginRef<MemoryHost> {
        PluginRef::new(Named { name, priority })
    }

    fn names(list: &[PluginRef<MemoryHost>]) -> Vec<&str> {
        list.iter().map(PluginRef::name).collect()
    }

    #[test]
    fn resolve_sorts_by_descending_priority_stable_on_ties() {
        let list = resolve(vec![
            named("a", 0),
            named("b", 5),
            named("c", 0),
            named("d", 5),
            named("e", -3),
        ]);
        assert_eq!(names(&list), ["b", "d", "a", "c", "e"]);
    }

    #[test]
    fn later_duplicate_wins_at_equal_or_higher_priority() {
        let list = resolve(vec![named("a", 0), named("b", 0), named("a", 0)]);
        assert_eq!(names(&list), ["a", "b"]);
        // The replacement is the later entry, kept in the first entry's slot.
        let list = resolve(vec![named("a", 0), named("b", 0), named("a", 1)]);
        assert_eq!(names(&list), ["a", "b"]);
        assert_eq!(list[0].priority(), 1);
    }

    #[test]
    fn later_duplicate_with_lower_priority_is_dropped() {
        let list = resolve(vec![named("a", 3), named("a", 1)]);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].priority(), 3);
    }

    #[test]
    fn hook_flags_match_hooks() {
        assert_eq!(Hook::Drag.flag(), Hooks::DRAG);
        assert!(Hooks::all().contains(Hook::DragEnd.flag()));
    }
}
