// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{RefCell, RefMut};

use hashbrown::HashMap;
use kurbo::Vec2;

use crate::compartment::Compartment;
use crate::context::DragContext;
use crate::error::DragError;
use crate::event::{PointerEvent, SECONDARY_BUTTON};
use crate::host::Host;
use crate::instance::Instance;
use crate::plugin::{PluginRef, resolve};
use crate::plugins::default_plugins;

/// Handle to a mounted instance.
///
/// Ids are generational: once an instance is destroyed its slot may be reused,
/// but the old id keeps failing with [`DragError::UnknownInstance`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstanceId(u32, u32);

impl InstanceId {
    /// Slot index in the engine's instance table.
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.0
    }

    /// Generation of the slot when this id was handed out.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.1
    }
}

/// Options for an [`Engine`].
pub struct DraggableOptions<H: Host> {
    /// Plugins applied to every instance. Per-instance plugins given to
    /// [`Engine::mount`] win on name collision.
    pub plugins: Vec<PluginRef<H>>,
    /// Node the shared pointer listeners are installed on. `None` means the
    /// host's [`document_body`](Host::document_body).
    pub delegate_target: Option<H::Node>,
}

impl<H: Host> DraggableOptions<H> {
    /// Options without any default plugins.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            plugins: Vec::new(),
            delegate_target: None,
        }
    }

    /// Replaces the default plugins.
    #[must_use]
    pub fn with_plugins(mut self, plugins: impl IntoIterator<Item = PluginRef<H>>) -> Self {
        self.plugins = plugins.into_iter().collect();
        self
    }

    /// Appends one default plugin.
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl Into<PluginRef<H>>) -> Self {
        self.plugins.push(plugin.into());
        self
    }

    /// Sets the delegation root.
    #[must_use]
    pub fn with_delegate_target(mut self, node: H::Node) -> Self {
        self.delegate_target = Some(node);
        self
    }
}

impl<H: Host> Default for DraggableOptions<H> {
    /// The built-in defaults from [`default_plugins`], delegated to the body.
    fn default() -> Self {
        Self {
            plugins: default_plugins(),
            delegate_target: None,
        }
    }
}

impl<H: Host> core::fmt::Debug for DraggableOptions<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DraggableOptions")
            .field("plugins", &self.plugins)
            .field("delegate_target", &self.delegate_target)
            .finish()
    }
}

struct Slot<H: Host> {
    generation: u32,
    instance: Option<Instance<H>>,
}

struct Registry<H: Host> {
    slots: Vec<Slot<H>>,
    free: Vec<u32>,
    by_node: HashMap<H::Node, InstanceId>,
    /// Instance currently receiving move/up events.
    active: Option<InstanceId>,
    listening: bool,
}

impl<H: Host> Registry<H> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_node: HashMap::new(),
            active: None,
            listening: false,
        }
    }

    fn insert(&mut self, instance: Instance<H>) -> InstanceId {
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.instance = Some(instance);
            return InstanceId(slot, entry.generation);
        }
        #[expect(clippy::cast_possible_truncation, reason = "instance counts stay far below u32::MAX")]
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            instance: Some(instance),
        });
        InstanceId(slot, 0)
    }

    fn get(&self, id: InstanceId) -> Option<&Instance<H>> {
        let slot = self.slots.get(id.0 as usize)?;
        if slot.generation != id.1 {
            return None;
        }
        slot.instance.as_ref()
    }

    fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance<H>> {
        let slot = self.slots.get_mut(id.0 as usize)?;
        if slot.generation != id.1 {
            return None;
        }
        slot.instance.as_mut()
    }

    fn remove(&mut self, id: InstanceId) -> Option<Instance<H>> {
        let slot = self.slots.get_mut(id.0 as usize)?;
        if slot.generation != id.1 {
            return None;
        }
        let instance = slot.instance.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.0);
        self.by_node.retain(|_, v| *v != id);
        if self.active == Some(id) {
            self.active = None;
        }
        Some(instance)
    }

    /// Nearest registered ancestor-or-self of `target`, searched no higher than `root`.
    fn find(&self, host: &H, target: &H::Node, root: &H::Node) -> Option<InstanceId> {
        if !host.contains(root, target) {
            return None;
        }
        let mut current = Some(target.clone());
        while let Some(node) = current {
            if let Some(id) = self.by_node.get(&node) {
                return Some(*id);
            }
            if &node == root {
                break;
            }
            current = host.parent(&node);
        }
        None
    }
}

pub(crate) struct EngineShared<H: Host> {
    host: Rc<H>,
    delegate_target: H::Node,
    defaults: Vec<PluginRef<H>>,
    registry: RefCell<Registry<H>>,
}

impl<H: Host> EngineShared<H> {
    fn registry(&self) -> Result<RefMut<'_, Registry<H>>, DragError> {
        self.registry.try_borrow_mut().map_err(|_| DragError::Busy)
    }

    fn with_instance<R>(
        &self,
        id: InstanceId,
        f: impl FnOnce(&mut Instance<H>) -> R,
    ) -> Result<R, DragError> {
        let mut registry = self.registry()?;
        let instance = registry.get_mut(id).ok_or(DragError::UnknownInstance)?;
        Ok(f(instance))
    }

    /// Applies pending compartment swaps to `id` now, unless the engine is
    /// in the middle of an event, in which case the instance picks them up at
    /// the start of its next pass.
    pub(crate) fn sync_compartments(&self, id: InstanceId) -> Result<(), DragError> {
        let Ok(mut registry) = self.registry.try_borrow_mut() else {
            tracing::warn!(?id, "compartment swap deferred until the next pass");
            return Ok(());
        };
        match registry.get_mut(id) {
            Some(instance) => instance.sync_compartments(),
            None => Ok(()),
        }
    }

    fn resolve(&self, plugins: impl IntoIterator<Item = PluginRef<H>>) -> Vec<PluginRef<H>> {
        resolve(self.defaults.iter().cloned().chain(plugins))
    }
}

/// The drag engine for one delegation root.
///
/// Owns every instance mounted through it and runs the pointer state machine.
/// The embedding forwards `pointerdown`/`pointermove`/`pointerup`/
/// `pointercancel` from the delegation root to the matching entry points.
///
/// All entry points fail with [`DragError::Busy`] when called from inside a
/// hook or an effect of this engine.
pub struct Engine<H: Host> {
    shared: Rc<EngineShared<H>>,
}

impl<H: Host> Engine<H> {
    /// Creates an engine. Listeners are installed on the delegation root the
    /// first time a node is mounted.
    pub fn new(host: Rc<H>, options: DraggableOptions<H>) -> Self {
        let delegate_target = options
            .delegate_target
            .unwrap_or_else(|| host.document_body());
        Self {
            shared: Rc::new(EngineShared {
                host,
                delegate_target,
                defaults: options.plugins,
                registry: RefCell::new(Registry::new()),
            }),
        }
    }

    /// The host this engine drives.
    #[must_use]
    pub fn host(&self) -> &Rc<H> {
        &self.shared.host
    }

    /// The delegation root.
    #[must_use]
    pub fn delegate_target(&self) -> &H::Node {
        &self.shared.delegate_target
    }

    /// Number of mounted instances.
    ///
    /// Returns `0` while the engine is busy.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared
            .registry
            .try_borrow()
            .map_or(0, |r| r.by_node.len())
    }

    /// Returns `true` when nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes `node` draggable with `plugins` merged over the engine defaults.
    ///
    /// Every plugin's `setup` runs here; if one fails, the plugins already set
    /// up are cleaned up, nothing is written to the document, and the node is
    /// not registered.
    pub fn mount(
        &self,
        node: H::Node,
        plugins: impl IntoIterator<Item = PluginRef<H>>,
    ) -> Result<Draggable<H>, DragError> {
        let shared = &self.shared;
        let mut registry = shared.registry()?;
        if registry.by_node.contains_key(&node) {
            return Err(DragError::AlreadyMounted);
        }
        let ctx = DragContext::new(
            shared.host.clone(),
            node.clone(),
            shared.delegate_target.clone(),
        );
        let instance = Instance::mount(ctx, shared.resolve(plugins))?;
        let compartments: Vec<Compartment<H>> = instance.compartments().cloned().collect();

        if !registry.listening {
            shared.host.install_listeners(&shared.delegate_target);
            registry.listening = true;
        }
        let id = registry.insert(instance);
        registry.by_node.insert(node.clone(), id);
        drop(registry);

        for compartment in &compartments {
            compartment.subscribe(shared, id);
        }
        tracing::debug!(?node, ?id, "mounted");
        Ok(Draggable {
            shared: shared.clone(),
            id,
            node,
        })
    }

    /// Handles `pointerdown` on the delegation root.
    ///
    /// Secondary-button presses are ignored, as is any press while another
    /// instance of this engine is mid-gesture.
    pub fn pointer_down(&self, event: &PointerEvent<H::Node>) -> Result<(), DragError> {
        if event.button == SECONDARY_BUTTON {
            return Ok(());
        }
        let shared = &self.shared;
        let mut registry = shared.registry()?;
        if registry.active.is_some() {
            return Ok(());
        }
        let Some(id) = registry.find(&shared.host, &event.target, &shared.delegate_target) else {
            return Ok(());
        };
        let Some(instance) = registry.get_mut(id) else {
            return Ok(());
        };
        if instance.pointer_down(event)? {
            registry.active = Some(id);
        }
        Ok(())
    }

    /// Handles `pointermove` on the delegation root.
    pub fn pointer_move(&self, event: &PointerEvent<H::Node>) -> Result<(), DragError> {
        let mut registry = self.shared.registry()?;
        let Some(id) = registry.active else {
            return Ok(());
        };
        match registry.get_mut(id) {
            Some(instance) => instance.pointer_move(event),
            None => Ok(()),
        }
    }

    /// Handles `pointerup` on the delegation root.
    pub fn pointer_up(&self, event: &PointerEvent<H::Node>) -> Result<(), DragError> {
        let mut registry = self.shared.registry()?;
        let Some(id) = registry.active else {
            return Ok(());
        };
        let Some(instance) = registry.get_mut(id) else {
            registry.active = None;
            return Ok(());
        };
        let ended = instance.pointer_up(event);
        if !instance.ctx.is_interacting() {
            registry.active = None;
        }
        ended.map(|_| ())
    }

    /// Handles `pointercancel`; identical to [`pointer_up`](Self::pointer_up).
    pub fn pointer_cancel(&self, event: &PointerEvent<H::Node>) -> Result<(), DragError> {
        self.pointer_up(event)
    }
}

impl<H: Host> core::fmt::Debug for Engine<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut s = f.debug_struct("Engine");
        s.field("delegate_target", &self.shared.delegate_target)
            .field("defaults", &self.shared.defaults);
        match self.shared.registry.try_borrow() {
            Ok(registry) => s
                .field("instances", &registry.by_node.len())
                .field("active", &registry.active),
            Err(_) => s.field("instances", &"<busy>"),
        };
        s.finish()
    }
}

/// A mounted draggable.
///
/// Dropping the handle does not unmount the node; call
/// [`destroy`](Self::destroy).
pub struct Draggable<H: Host> {
    shared: Rc<EngineShared<H>>,
    id: InstanceId,
    node: H::Node,
}

impl<H: Host> Draggable<H> {
    /// The instance id.
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// The mounted node.
    #[must_use]
    pub fn node(&self) -> &H::Node {
        &self.node
    }

    /// Re-resolves the plugin list (merged over the engine defaults) in place.
    ///
    /// Plugins present before and after keep their private state and are not
    /// set up again; new ones are set up; missing ones are cleaned up. On
    /// error the previous plugin list stays in effect.
    pub fn update(&self, plugins: impl IntoIterator<Item = PluginRef<H>>) -> Result<(), DragError> {
        let resolved = self.shared.resolve(plugins);
        let (before, after) = self.shared.with_instance(self.id, |instance| {
            let before: Vec<Compartment<H>> = instance.compartments().cloned().collect();
            instance.update(resolved)?;
            let after: Vec<Compartment<H>> = instance.compartments().cloned().collect();
            Ok::<_, DragError>((before, after))
        })??;
        for compartment in &before {
            compartment.unsubscribe(&self.shared, self.id);
        }
        for compartment in &after {
            compartment.subscribe(&self.shared, self.id);
        }
        Ok(())
    }

    /// Unmounts the node: releases any pointer capture, runs every plugin's
    /// `cleanup`, and forgets the instance.
    pub fn destroy(&self) -> Result<(), DragError> {
        let mut registry = self.shared.registry()?;
        let mut instance = registry.remove(self.id).ok_or(DragError::UnknownInstance)?;
        let compartments: Vec<Compartment<H>> = instance.compartments().cloned().collect();
        instance.destroy();
        drop(registry);
        for compartment in &compartments {
            compartment.unsubscribe(&self.shared, self.id);
        }
        tracing::debug!(node = ?self.node, id = ?self.id, "destroyed");
        Ok(())
    }

    /// Committed offset since mount.
    pub fn offset(&self) -> Result<Vec2, DragError> {
        self.read(|instance| instance.ctx.offset())
    }

    /// `true` while a drag is in progress.
    pub fn is_dragging(&self) -> Result<bool, DragError> {
        self.read(|instance| instance.ctx.is_dragging())
    }

    /// `true` between an accepted pointer-down and the matching pointer-up.
    pub fn is_interacting(&self) -> Result<bool, DragError> {
        self.read(|instance| instance.ctx.is_interacting())
    }

    fn read<R>(&self, f: impl FnOnce(&Instance<H>) -> R) -> Result<R, DragError> {
        let registry = self.shared.registry.try_borrow().map_err(|_| DragError::Busy)?;
        registry.get(self.id).map(f).ok_or(DragError::UnknownInstance)
    }
}

impl<H: Host> core::fmt::Debug for Draggable<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Draggable")
            .field("id", &self.id)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}
