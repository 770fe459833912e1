// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-instance drag state shared by every hook.
//!
//! A [`DragContext`] is owned by exactly one mounted instance and handed to
//! each hook by `&mut`. Within a pass, plugins negotiate movement through the
//! [`Proposal`], register deferred [effects](crate::effect), and may
//! [`cancel`](DragContext::cancel) the pass or
//! [`prevent_start`](DragContext::prevent_start) the promotion to dragging.
//! The per-pass flags are reset by the engine before every pass.

use alloc::rc::Rc;

use kurbo::{Point, Rect, Vec2};

use crate::effect::EffectQueue;
use crate::host::Host;
use crate::style;

/// Per-axis movement a pass agrees on before it is committed.
///
/// A `None` axis means "do not move this axis this pass", which is distinct
/// from `Some(0.0)` ("move by zero").
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Proposal {
    /// Horizontal movement.
    pub x: Option<f64>,
    /// Vertical movement.
    pub y: Option<f64>,
}

impl Proposal {
    /// Move by zero on both axes.
    pub const ZERO: Self = Self {
        x: Some(0.0),
        y: Some(0.0),
    };

    /// No movement opinion on either axis.
    pub const NONE: Self = Self { x: None, y: None };

    /// Creates a proposal from optional per-axis values.
    #[must_use]
    pub const fn new(x: Option<f64>, y: Option<f64>) -> Self {
        Self { x, y }
    }

    /// Proposes exactly `delta`.
    #[must_use]
    pub const fn from_vec2(delta: Vec2) -> Self {
        Self {
            x: Some(delta.x),
            y: Some(delta.y),
        }
    }

    /// Offset that results from committing this proposal on top of `offset`.
    ///
    /// A `None` axis leaves that component of `offset` untouched.
    #[must_use]
    pub fn apply_to(self, offset: Vec2) -> Vec2 {
        Vec2::new(
            self.x.map_or(offset.x, |x| offset.x + x),
            self.y.map_or(offset.y, |y| offset.y + y),
        )
    }
}

/// Mutable state shared by all plugins of one instance.
pub struct DragContext<H: Host> {
    host: Rc<H>,
    root_node: H::Node,
    delegate_target: H::Node,
    currently_dragged_node: H::Node,
    pending_dragged_node: Option<H::Node>,

    offset: Vec2,
    initial: Point,
    delta: Vec2,
    proposed: Proposal,
    inverse_scale: Vec2,
    cached_root_node_rect: Rect,

    is_dragging: bool,
    is_interacting: bool,

    effects: EffectQueue<H>,
    cancelled: bool,
    start_prevented: bool,
    in_setup: bool,
}

impl<H: Host> DragContext<H> {
    pub(crate) fn new(host: Rc<H>, root_node: H::Node, delegate_target: H::Node) -> Self {
        Self {
            host,
            currently_dragged_node: root_node.clone(),
            root_node,
            delegate_target,
            pending_dragged_node: None,
            offset: Vec2::ZERO,
            initial: Point::ZERO,
            delta: Vec2::ZERO,
            proposed: Proposal::ZERO,
            inverse_scale: Vec2::new(1.0, 1.0),
            cached_root_node_rect: Rect::ZERO,
            is_dragging: false,
            is_interacting: false,
            effects: EffectQueue::new(),
            cancelled: false,
            start_prevented: false,
            in_setup: false,
        }
    }

    /// The host driving this instance.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The mounted node.
    #[must_use]
    pub fn root_node(&self) -> &H::Node {
        &self.root_node
    }

    /// The node the engine's listeners are installed on.
    #[must_use]
    pub fn delegate_target(&self) -> &H::Node {
        &self.delegate_target
    }

    /// The node receiving pointer capture and transforms.
    #[must_use]
    pub fn currently_dragged_node(&self) -> &H::Node {
        &self.currently_dragged_node
    }

    /// Cumulative committed offset since mount.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Pointer-down anchor, in client coordinates, adjusted for the offset.
    #[must_use]
    pub fn initial(&self) -> Point {
        self.initial
    }

    /// Raw delta of the current event relative to the committed offset.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// The movement currently proposed for this pass.
    #[must_use]
    pub fn proposed(&self) -> Proposal {
        self.proposed
    }

    /// Layout-to-rendered scale factors measured at pointer-down.
    #[must_use]
    pub fn inverse_scale(&self) -> Vec2 {
        self.inverse_scale
    }

    /// Bounding rect of the root node captured at pointer-down.
    #[must_use]
    pub fn cached_root_node_rect(&self) -> Rect {
        self.cached_root_node_rect
    }

    /// `true` once the drag has been promoted past the start threshold.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    /// `true` between an accepted pointer-down and the matching pointer-up.
    #[must_use]
    pub fn is_interacting(&self) -> bool {
        self.is_interacting
    }

    /// Replaces the proposal for this pass.
    pub fn propose(&mut self, proposal: Proposal) {
        self.proposed = proposal;
    }

    /// Replaces the horizontal component of the proposal.
    pub fn propose_x(&mut self, x: Option<f64>) {
        self.proposed.x = x;
    }

    /// Replaces the vertical component of the proposal.
    pub fn propose_y(&mut self, y: Option<f64>) {
        self.proposed.y = y;
    }

    /// Aborts the current pass: its effects are dropped and nothing is committed.
    ///
    /// The gesture itself continues; the next event starts a fresh pass.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Returns `true` if the current pass has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Keeps the instance interacting instead of promoting it to dragging on
    /// this event. Only meaningful before the drag has started.
    pub fn prevent_start(&mut self) {
        self.start_prevented = true;
    }

    /// Registers a deferred side effect for this pass.
    pub fn effect(&mut self, effect: impl FnOnce(&H) + 'static) {
        self.effects.push(effect);
    }

    /// Re-reads the bounding rect of the root node and updates the cached copy.
    ///
    /// The engine only measures at pointer-down; call this when a plugin
    /// knows the layout changed mid-gesture.
    pub fn refresh_root_rect(&mut self) -> Rect {
        self.cached_root_node_rect = self.host.bounding_rect(&self.root_node);
        self.cached_root_node_rect
    }

    /// Requests that `node` receive capture and transforms from now on.
    ///
    /// The substitution is applied after the current pass succeeds; every
    /// plugin of this pass keeps seeing the previous node.
    pub fn set_dragged_node(&mut self, node: H::Node) {
        self.pending_dragged_node = Some(node);
    }

    /// Sets the starting offset. Only honored from `setup` and `reconfigure`;
    /// returns whether the offset was applied.
    pub fn set_offset(&mut self, offset: Vec2) -> bool {
        if self.in_setup {
            self.offset = offset;
        }
        self.in_setup
    }

    /// Overwrites the offset outside of setup, used to roll back a failed update.
    pub(crate) fn force_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub(crate) fn begin_pass(&mut self) {
        self.cancelled = false;
        self.start_prevented = false;
        self.effects.discard();
    }

    pub(crate) fn start_prevented(&self) -> bool {
        self.start_prevented
    }

    pub(crate) fn set_in_setup(&mut self, in_setup: bool) {
        self.in_setup = in_setup;
    }

    pub(crate) fn take_effects(&mut self) -> EffectQueue<H> {
        self.effects.take()
    }

    pub(crate) fn discard_effects(&mut self) {
        self.effects.discard();
        self.pending_dragged_node = None;
    }

    /// Snapshots geometry and anchors the gesture at `position`.
    pub(crate) fn begin_interaction(&mut self, position: Point) {
        self.cached_root_node_rect = self.host.bounding_rect(&self.root_node);
        let layout = self.host.offset_size(&self.root_node);
        self.inverse_scale = style::inverse_scale(layout, self.cached_root_node_rect);
        self.initial = Point::new(
            position.x - self.offset.x / self.inverse_scale.x,
            position.y - self.offset.y / self.inverse_scale.y,
        );
        self.is_interacting = true;
    }

    /// Computes the raw delta for `position` and seeds the proposal with it.
    pub(crate) fn track(&mut self, position: Point) {
        let target = Vec2::new(
            (position.x - self.initial.x) * self.inverse_scale.x,
            (position.y - self.initial.y) * self.inverse_scale.y,
        );
        self.delta = target - self.offset;
        self.proposed = Proposal::from_vec2(self.delta);
    }

    pub(crate) fn reseed_proposal(&mut self) {
        self.proposed = Proposal::from_vec2(self.delta);
    }

    pub(crate) fn set_dragging(&mut self, dragging: bool) {
        self.is_dragging = dragging;
    }

    /// Commits the proposal into the offset.
    pub(crate) fn commit_offset(&mut self) {
        self.offset = self.proposed.apply_to(self.offset);
    }

    /// Applies a pending node substitution, returning the previous node.
    pub(crate) fn apply_pending_node(&mut self) -> Option<H::Node> {
        let next = self.pending_dragged_node.take()?;
        Some(core::mem::replace(&mut self.currently_dragged_node, next))
    }

    /// Returns to idle, handing back the node that was being dragged.
    pub(crate) fn end_interaction(&mut self) -> H::Node {
        self.is_dragging = false;
        self.is_interacting = false;
        self.proposed = Proposal::ZERO;
        self.delta = Vec2::ZERO;
        self.pending_dragged_node = None;
        core::mem::replace(&mut self.currently_dragged_node, self.root_node.clone())
    }
}

impl<H: Host> core::fmt::Debug for DragContext<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DragContext")
            .field("root_node", &self.root_node)
            .field("currently_dragged_node", &self.currently_dragged_node)
            .field("offset", &self.offset)
            .field("proposed", &self.proposed)
            .field("is_dragging", &self.is_dragging)
            .field("is_interacting", &self.is_interacting)
            .field("pending_effects", &self.effects.len())
            .finish_non_exhaustive()
    }
}
