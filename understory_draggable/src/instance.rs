// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One mounted draggable: its context, resolved plugins, and the pass runner.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;

use kurbo::Vec2;
use smallvec::SmallVec;

use crate::compartment::Compartment;
use crate::context::DragContext;
use crate::error::DragError;
use crate::event::{PointerEvent, PointerId};
use crate::host::Host;
use crate::plugin::{DynPlugin, Hook, PluginKind, PluginRef};

/// A resolved plugin list entry and its private state.
struct Entry<H: Host> {
    source: PluginRef<H>,
    /// The plugin hooks are dispatched to; a compartment's occupant as of the
    /// last sync, `None` for an empty compartment.
    active: Option<DynPlugin<H>>,
    state: Box<dyn Any>,
    /// Compartment revision this entry was synced to.
    revision: u64,
}

impl<H: Host> Entry<H> {
    fn priority(&self) -> i32 {
        self.active.as_ref().map_or(0, |p| p.priority())
    }

    /// Whether `source` can take over this entry's private state on update.
    fn accepts(&self, source: &PluginRef<H>) -> bool {
        if self.source.name() != source.name() {
            return false;
        }
        match (&self.source.kind, &source.kind) {
            (PluginKind::Plugin(_), PluginKind::Plugin(next)) => self
                .active
                .as_ref()
                .is_some_and(|p| p.state_type() == next.state_type()),
            (PluginKind::Compartment(_), PluginKind::Compartment(_)) => true,
            _ => false,
        }
    }
}

pub(crate) struct Instance<H: Host> {
    pub(crate) ctx: DragContext<H>,
    entries: SmallVec<[Entry<H>; 8]>,
    pointer_capture_id: Option<PointerId>,
}

impl<H: Host> Instance<H> {
    /// Runs `setup` for every plugin. Setup effects are flushed only if every
    /// setup succeeds; otherwise the plugins already set up are cleaned up and
    /// nothing reaches the host.
    pub(crate) fn mount(ctx: DragContext<H>, plugins: Vec<PluginRef<H>>) -> Result<Self, DragError> {
        let mut instance = Self {
            ctx,
            entries: SmallVec::new(),
            pointer_capture_id: None,
        };
        for source in plugins {
            match instance.setup_entry(source) {
                Ok(entry) => instance.entries.push(entry),
                Err(err) => {
                    let mut entries = core::mem::take(&mut instance.entries);
                    instance.cleanup_entries(&mut entries);
                    instance.ctx.discard_effects();
                    return Err(err);
                }
            }
        }
        instance.reposition_if_moved(Vec2::ZERO);
        instance.flush();
        Ok(instance)
    }

    fn setup_entry(&mut self, source: PluginRef<H>) -> Result<Entry<H>, DragError> {
        let (active, revision) = match &source.kind {
            PluginKind::Plugin(p) => (Some(p.clone()), 0),
            PluginKind::Compartment(c) => (c.occupant(), c.revision()),
        };
        let state = match &active {
            Some(plugin) => self.run_setup(plugin)?,
            None => Box::new(()),
        };
        Ok(Entry {
            source,
            active,
            state,
            revision,
        })
    }

    fn run_setup(&mut self, plugin: &DynPlugin<H>) -> Result<Box<dyn Any>, DragError> {
        self.ctx.set_in_setup(true);
        let state = plugin.setup(&mut self.ctx);
        self.ctx.set_in_setup(false);
        if let Err(err) = &state {
            tracing::warn!(plugin = plugin.name(), error = %err, "plugin setup failed");
        }
        state
    }

    /// Lets every plugin write the offset if it no longer equals `from`.
    fn reposition_if_moved(&mut self, from: Vec2) {
        if self.ctx.offset() == from {
            return;
        }
        tracing::debug!(offset = ?self.ctx.offset(), "offset moved outside a drag");
        for entry in &mut self.entries {
            if let Some(plugin) = entry.active.as_ref() {
                plugin.reposition(&mut self.ctx, &mut *entry.state);
            }
        }
    }

    fn cleanup_entries(&mut self, entries: &mut [Entry<H>]) {
        for entry in entries {
            if let Some(plugin) = entry.active.take() {
                plugin.cleanup(&mut self.ctx, &mut *entry.state);
            }
        }
    }

    /// Re-resolves the plugin list in place.
    ///
    /// Entries whose name (and state type) match keep their private state and
    /// are reconfigured with the new plugin value; new names are set up;
    /// missing names are cleaned up. If any setup fails, the instance is left
    /// exactly as it was.
    pub(crate) fn update(&mut self, plugins: Vec<PluginRef<H>>) -> Result<(), DragError> {
        let offset = self.ctx.offset();
        let mut matched: Vec<Option<usize>> = Vec::with_capacity(plugins.len());
        let mut claimed: SmallVec<[bool; 8]> = SmallVec::from_elem(false, self.entries.len());
        for source in &plugins {
            let hit = self
                .entries
                .iter()
                .enumerate()
                .position(|(i, e)| !claimed[i] && e.accepts(source));
            if let Some(i) = hit {
                claimed[i] = true;
            }
            matched.push(hit);
        }

        // Set up newcomers first so a failure leaves the old list untouched.
        let mut fresh: Vec<Option<Entry<H>>> = Vec::with_capacity(plugins.len());
        for (source, hit) in plugins.iter().zip(&matched) {
            if hit.is_some() {
                fresh.push(None);
                continue;
            }
            match self.setup_entry(source.clone()) {
                Ok(entry) => fresh.push(Some(entry)),
                Err(err) => {
                    let mut undo: Vec<Entry<H>> = fresh.into_iter().flatten().collect();
                    self.cleanup_entries(&mut undo);
                    self.ctx.discard_effects();
                    self.ctx.force_offset(offset);
                    return Err(err);
                }
            }
        }
        let setup_effects = self.ctx.take_effects();

        let mut previous: Vec<Option<Entry<H>>> = self.entries.drain(..).map(Some).collect();
        let mut next: SmallVec<[Entry<H>; 8]> = SmallVec::with_capacity(plugins.len());
        let mut reconfigured: SmallVec<[usize; 8]> = SmallVec::new();
        for ((source, hit), new_entry) in plugins.into_iter().zip(matched).zip(fresh) {
            let reused = hit.and_then(|i| previous[i].take());
            match (reused, new_entry) {
                (Some(mut entry), _) => {
                    if let PluginKind::Plugin(p) = &source.kind {
                        entry.active = Some(p.clone());
                        reconfigured.push(next.len());
                    }
                    entry.source = source;
                    next.push(entry);
                }
                (None, Some(entry)) => next.push(entry),
                (None, None) => {}
            }
        }

        let mut removed: Vec<Entry<H>> = previous.into_iter().flatten().collect();
        self.cleanup_entries(&mut removed);
        self.entries = next;
        // Cleanup of removed plugins lands before setup of new ones.
        let mut effects = self.ctx.take_effects();
        effects.append(setup_effects);

        self.ctx.set_in_setup(true);
        for i in reconfigured {
            let entry = &mut self.entries[i];
            if let Some(plugin) = entry.active.as_ref() {
                plugin.reconfigure(&mut self.ctx, &mut *entry.state);
            }
        }
        self.ctx.set_in_setup(false);
        self.reposition_if_moved(offset);
        effects.append(self.ctx.take_effects());
        effects.flush(self.ctx.host());
        tracing::debug!(plugins = self.entries.len(), removed = removed.len(), "plugins updated");
        Ok(())
    }

    /// Compartments referenced by this instance.
    pub(crate) fn compartments(&self) -> impl Iterator<Item = &Compartment<H>> + '_ {
        self.entries.iter().filter_map(|e| e.source.compartment())
    }

    /// Applies compartment swaps that happened since the last sync.
    pub(crate) fn sync_compartments(&mut self) -> Result<(), DragError> {
        let offset = self.ctx.offset();
        let mut first_error = None;
        let mut changed = false;
        for i in 0..self.entries.len() {
            let Some(compartment) = self.entries[i].source.compartment().cloned() else {
                continue;
            };
            let revision = compartment.revision();
            if revision == self.entries[i].revision {
                continue;
            }
            changed = true;

            let entry = &mut self.entries[i];
            entry.revision = revision;
            if let Some(outgoing) = entry.active.take() {
                outgoing.cleanup(&mut self.ctx, &mut *entry.state);
                tracing::debug!(plugin = outgoing.name(), "compartment occupant removed");
            }
            entry.state = Box::new(());
            self.flush();

            let Some(incoming) = compartment.occupant() else {
                continue;
            };
            let before = self.ctx.offset();
            match self.run_setup(&incoming) {
                Ok(state) => {
                    tracing::debug!(plugin = incoming.name(), "compartment occupant installed");
                    let entry = &mut self.entries[i];
                    entry.state = state;
                    entry.active = Some(incoming);
                    self.flush();
                }
                Err(err) => {
                    self.ctx.discard_effects();
                    self.ctx.force_offset(before);
                    first_error.get_or_insert(err);
                }
            }
        }
        if changed {
            self.entries.sort_by_key(|e| core::cmp::Reverse(e.priority()));
            self.reposition_if_moved(offset);
            self.flush();
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Runs `hook` across all plugins.
    ///
    /// Returns `Ok(true)` when no plugin vetoed or cancelled. Effects stay
    /// queued in the context for the caller to commit or discard; on error
    /// they have already been discarded.
    fn run_pass(&mut self, hook: Hook, event: &PointerEvent<H::Node>) -> Result<bool, DragError> {
        self.ctx.begin_pass();
        let mut should_run = true;
        for entry in &mut self.entries {
            let Some(plugin) = entry.active.as_ref() else {
                continue;
            };
            if !plugin.hooks().contains(hook.flag()) {
                continue;
            }
            if !should_run && plugin.cancelable() {
                continue;
            }
            match plugin.run(hook, &mut self.ctx, &mut *entry.state, event) {
                Ok(true) => {}
                Ok(false) => should_run = false,
                Err(err) => {
                    tracing::warn!(
                        plugin = plugin.name(),
                        hook = hook.name(),
                        error = %err,
                        "hook failed; pass discarded"
                    );
                    self.ctx.discard_effects();
                    return Err(err);
                }
            }
            if self.ctx.is_cancelled() {
                should_run = false;
            }
        }
        tracing::trace!(hook = hook.name(), should_run, "pass finished");
        Ok(should_run)
    }

    /// Applies a successful pass: moves pointer capture if a node was
    /// substituted, then flushes effects.
    fn commit(&mut self) {
        if let Some(previous) = self.ctx.apply_pending_node() {
            if let Some(id) = self.pointer_capture_id {
                let host = self.ctx.host();
                host.release_pointer_capture(&previous, id);
                host.set_pointer_capture(self.ctx.currently_dragged_node(), id);
            }
        }
        self.flush();
    }

    fn flush(&mut self) {
        let mut effects = self.ctx.take_effects();
        effects.flush(self.ctx.host());
    }

    pub(crate) fn is_captured(&self) -> bool {
        self.pointer_capture_id.is_some()
    }

    /// Handles a pointer-down on this instance. Returns `true` when the
    /// interaction was accepted.
    pub(crate) fn pointer_down(&mut self, event: &PointerEvent<H::Node>) -> Result<bool, DragError> {
        // Capture is exclusive per pointer; a second pointer never starts a
        // concurrent gesture on the same instance.
        if self.pointer_capture_id.is_some() {
            return Ok(false);
        }
        self.sync_compartments()?;
        if !self.run_pass(Hook::ShouldDrag, event)? {
            self.ctx.discard_effects();
            tracing::debug!(node = ?self.ctx.root_node(), "pointer-down vetoed");
            return Ok(false);
        }
        self.commit();
        self.ctx.begin_interaction(event.position);
        self.pointer_capture_id = Some(event.pointer_id);
        self.ctx
            .host()
            .set_pointer_capture(self.ctx.currently_dragged_node(), event.pointer_id);
        tracing::debug!(node = ?self.ctx.root_node(), pointer = event.pointer_id, "interacting");
        Ok(true)
    }

    pub(crate) fn pointer_move(&mut self, event: &PointerEvent<H::Node>) -> Result<(), DragError> {
        if self.pointer_capture_id != Some(event.pointer_id) || !self.ctx.is_interacting() {
            return Ok(());
        }
        self.sync_compartments()?;
        self.ctx.track(event.position);

        if !self.ctx.is_dragging() {
            // Only `prevent_start` and errors hold the gesture back; a cancelled
            // pre-start pass still lets the drag start.
            self.run_pass(Hook::Drag, event)?;
            let prevented = self.ctx.start_prevented();
            self.ctx.discard_effects();
            if prevented {
                return Ok(());
            }

            self.ctx.reseed_proposal();
            let started = self.run_pass(Hook::DragStart, event)?;
            if !started || self.ctx.start_prevented() {
                self.ctx.discard_effects();
                return Ok(());
            }
            self.ctx.set_dragging(true);
            self.commit();
            self.ctx.reseed_proposal();
            tracing::debug!(node = ?self.ctx.root_node(), "drag started");
        }

        event.prevent_default();
        if !self.run_pass(Hook::Drag, event)? {
            self.ctx.discard_effects();
            return Ok(());
        }
        self.ctx.commit_offset();
        self.commit();
        Ok(())
    }

    /// Ends the gesture. `drag_end` always runs; the instance returns to idle
    /// even if it fails.
    pub(crate) fn pointer_up(&mut self, event: &PointerEvent<H::Node>) -> Result<bool, DragError> {
        if self.pointer_capture_id != Some(event.pointer_id) {
            return Ok(false);
        }
        let synced = self.sync_compartments();
        let ended = self.run_pass(Hook::DragEnd, event);
        match ended {
            Ok(true) => self.commit(),
            _ => self.ctx.discard_effects(),
        }

        let was_dragging = self.ctx.is_dragging();
        self.release();
        let node = self.ctx.end_interaction();
        if was_dragging {
            self.ctx.host().suppress_next_click(&node);
        }
        tracing::debug!(node = ?self.ctx.root_node(), was_dragging, "idle");
        synced.and(ended).map(|_| true)
    }

    fn release(&mut self) {
        if let Some(id) = self.pointer_capture_id.take() {
            self.ctx
                .host()
                .release_pointer_capture(self.ctx.currently_dragged_node(), id);
        }
    }

    pub(crate) fn destroy(&mut self) {
        self.release();
        self.ctx.end_interaction();
        let mut entries = core::mem::take(&mut self.entries);
        self.cleanup_entries(&mut entries);
        self.flush();
    }
}

impl<H: Host> core::fmt::Debug for Instance<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.entries.iter().map(|e| e.source.name()).collect();
        f.debug_struct("Instance")
            .field("ctx", &self.ctx)
            .field("plugins", &names)
            .field("pointer_capture_id", &self.pointer_capture_id)
            .finish()
    }
}
