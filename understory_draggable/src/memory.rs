// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Host`] for tests, benches, and headless tools.
//!
//! [`MemoryHost`] keeps a small retained tree of nodes with screen rects,
//! class lists, inline styles, and data attributes. Its geometry follows the
//! inline `translate` style the way a browser's `getBoundingClientRect` does,
//! so a drag driven through the engine moves the node's reported rect.
//!
//! Selector support is deliberately tiny: `.class` and `#id`.
//!
//! ```
//! use kurbo::{Rect, Size};
//! use understory_draggable::Host;
//! use understory_draggable::memory::MemoryHost;
//!
//! let host = MemoryHost::new(Size::new(400.0, 300.0));
//! let card = host.create(host.body(), Rect::new(10.0, 10.0, 60.0, 40.0));
//! host.set_style(&card, "translate", "5px 0px");
//! assert_eq!(host.bounding_rect(&card), Rect::new(15.0, 10.0, 65.0, 40.0));
//! ```

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::{Point, Rect, Size, Vec2};

use crate::event::PointerId;
use crate::host::{DragEventData, DragEventKind, Host};
use crate::style::TRANSLATE;

/// Handle to a node of a [`MemoryHost`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryNode(u32);

/// A drag lifecycle event recorded by [`MemoryHost`].
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchedEvent {
    /// Node the event was dispatched on.
    pub node: MemoryNode,
    /// Event kind.
    pub kind: DragEventKind,
    /// Event payload.
    pub detail: DragEventData<MemoryNode>,
}

#[derive(Default)]
struct NodeData {
    parent: Option<MemoryNode>,
    children: Vec<MemoryNode>,
    /// Layout rect in screen space, before any translate.
    rect: Rect,
    scale: f64,
    offset_size: Option<Size>,
    classes: Vec<String>,
    id_attr: Option<String>,
    styles: BTreeMap<String, String>,
    data: BTreeMap<String, String>,
    captured: Option<PointerId>,
    /// A click suppressor is installed; at most one is ever pending.
    click_suppressed: bool,
}

/// In-memory document.
pub struct MemoryHost {
    viewport: Size,
    nodes: RefCell<Vec<NodeData>>,
    events: RefCell<Vec<DispatchedEvent>>,
    listeners: RefCell<Vec<MemoryNode>>,
}

impl MemoryHost {
    /// Creates a document whose body covers a viewport of `viewport` size.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        let body = NodeData {
            rect: Rect::from_origin_size(Point::ZERO, viewport),
            scale: 1.0,
            ..NodeData::default()
        };
        Self {
            viewport,
            nodes: RefCell::new(alloc::vec![body]),
            events: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// The body node.
    #[must_use]
    pub fn body(&self) -> MemoryNode {
        MemoryNode(0)
    }

    /// Appends a new child of `parent` laid out at `rect` (screen space).
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not created by this host.
    pub fn create(&self, parent: MemoryNode, rect: Rect) -> MemoryNode {
        let mut nodes = self.nodes.borrow_mut();
        #[expect(clippy::cast_possible_truncation, reason = "test documents stay small")]
        let node = MemoryNode(nodes.len() as u32);
        nodes.push(NodeData {
            parent: Some(parent),
            rect,
            scale: 1.0,
            ..NodeData::default()
        });
        nodes[parent.0 as usize].children.push(node);
        node
    }

    /// Replaces the class list of `node`.
    pub fn set_classes(&self, node: MemoryNode, classes: &[&str]) {
        self.with_node(node, |n| {
            n.classes = classes.iter().map(ToString::to_string).collect();
        });
    }

    /// Sets the `id` attribute of `node`.
    pub fn set_id_attr(&self, node: MemoryNode, id: &str) {
        self.with_node(node, |n| n.id_attr = Some(id.to_string()));
    }

    /// Renders `node` at `scale` times its layout size, like a CSS `scale`.
    pub fn set_scale(&self, node: MemoryNode, scale: f64) {
        self.with_node(node, |n| n.scale = scale);
    }

    /// Overrides the layout size reported by [`Host::offset_size`].
    pub fn set_offset_size(&self, node: MemoryNode, size: Size) {
        self.with_node(node, |n| n.offset_size = Some(size));
    }

    /// Pointer currently captured by `node`.
    #[must_use]
    pub fn captured_pointer(&self, node: MemoryNode) -> Option<PointerId> {
        self.read_node(node, |n| n.captured).flatten()
    }

    /// Every drag event dispatched so far, oldest first.
    #[must_use]
    pub fn drag_events(&self) -> Vec<DispatchedEvent> {
        self.events.borrow().clone()
    }

    /// Nodes listeners were installed on, in installation order.
    #[must_use]
    pub fn listener_targets(&self) -> Vec<MemoryNode> {
        self.listeners.borrow().clone()
    }

    /// Simulates a click on `node`. Returns `false` when a pending click
    /// suppressor swallowed it.
    pub fn click(&self, node: MemoryNode) -> bool {
        self.with_node(node, |n| {
            !core::mem::take(&mut n.click_suppressed)
        })
        .unwrap_or(true)
    }

    fn with_node<R>(&self, node: MemoryNode, f: impl FnOnce(&mut NodeData) -> R) -> Option<R> {
        self.nodes.borrow_mut().get_mut(node.0 as usize).map(f)
    }

    fn read_node<R>(&self, node: MemoryNode, f: impl FnOnce(&NodeData) -> R) -> Option<R> {
        self.nodes.borrow().get(node.0 as usize).map(f)
    }

    fn collect_matches(
        nodes: &[NodeData],
        node: MemoryNode,
        selector: &str,
        out: &mut Vec<MemoryNode>,
    ) {
        for &child in &nodes[node.0 as usize].children {
            if matches(&nodes[child.0 as usize], selector) {
                out.push(child);
            }
            Self::collect_matches(nodes, child, selector, out);
        }
    }
}

fn matches(node: &NodeData, selector: &str) -> bool {
    if let Some(class) = selector.strip_prefix('.') {
        node.classes.iter().any(|c| c == class)
    } else if let Some(id) = selector.strip_prefix('#') {
        node.id_attr.as_deref() == Some(id)
    } else {
        false
    }
}

/// Parses `"<x>px <y>px"`; anything else reads as no translation.
fn parse_translate(value: &str) -> Vec2 {
    let mut parts = value
        .split_whitespace()
        .map(|p| p.trim_end_matches("px").parse::<f64>().ok());
    match (parts.next().flatten(), parts.next().flatten()) {
        (Some(x), Some(y)) => Vec2::new(x, y),
        (Some(x), None) => Vec2::new(x, 0.0),
        _ => Vec2::ZERO,
    }
}

impl Host for MemoryHost {
    type Node = MemoryNode;

    fn document_body(&self) -> MemoryNode {
        self.body()
    }

    fn parent(&self, node: &MemoryNode) -> Option<MemoryNode> {
        self.read_node(*node, |n| n.parent).flatten()
    }

    fn bounding_rect(&self, node: &MemoryNode) -> Rect {
        let nodes = self.nodes.borrow();
        let Some(data) = nodes.get(node.0 as usize) else {
            return Rect::ZERO;
        };
        let mut shift = Vec2::ZERO;
        let mut current = Some(*node);
        while let Some(n) = current {
            let d = &nodes[n.0 as usize];
            if let Some(value) = d.styles.get(TRANSLATE) {
                shift += parse_translate(value) * d.scale;
            }
            current = d.parent;
        }
        let size = data.rect.size() * data.scale;
        Rect::from_origin_size(data.rect.origin() + shift, size)
    }

    fn offset_size(&self, node: &MemoryNode) -> Size {
        self.read_node(*node, |n| n.offset_size.unwrap_or_else(|| n.rect.size()))
            .unwrap_or(Size::ZERO)
    }

    fn viewport_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.viewport)
    }

    fn query_selector_all(&self, scope: &MemoryNode, selector: &str) -> Vec<MemoryNode> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        if (scope.0 as usize) < nodes.len() {
            Self::collect_matches(&nodes, *scope, selector, &mut out);
        }
        out
    }

    fn style(&self, node: &MemoryNode, property: &str) -> Option<String> {
        self.read_node(*node, |n| n.styles.get(property).cloned())
            .flatten()
    }

    fn set_style(&self, node: &MemoryNode, property: &str, value: &str) {
        self.with_node(*node, |n| {
            n.styles.insert(property.to_string(), value.to_string());
        });
    }

    fn remove_style(&self, node: &MemoryNode, property: &str) {
        self.with_node(*node, |n| {
            n.styles.remove(property);
        });
    }

    fn data(&self, node: &MemoryNode, key: &str) -> Option<String> {
        self.read_node(*node, |n| n.data.get(key).cloned()).flatten()
    }

    fn set_data(&self, node: &MemoryNode, key: &str, value: &str) {
        self.with_node(*node, |n| {
            n.data.insert(key.to_string(), value.to_string());
        });
    }

    fn remove_data(&self, node: &MemoryNode, key: &str) {
        self.with_node(*node, |n| {
            n.data.remove(key);
        });
    }

    fn set_pointer_capture(&self, node: &MemoryNode, pointer_id: PointerId) {
        self.with_node(*node, |n| n.captured = Some(pointer_id));
    }

    fn release_pointer_capture(&self, node: &MemoryNode, pointer_id: PointerId) {
        self.with_node(*node, |n| {
            if n.captured == Some(pointer_id) {
                n.captured = None;
            }
        });
    }

    fn suppress_next_click(&self, node: &MemoryNode) {
        self.with_node(*node, |n| n.click_suppressed = true);
    }

    fn install_listeners(&self, target: &MemoryNode) {
        self.listeners.borrow_mut().push(*target);
    }

    fn dispatch_drag_event(
        &self,
        node: &MemoryNode,
        kind: DragEventKind,
        detail: &DragEventData<MemoryNode>,
    ) {
        self.events.borrow_mut().push(DispatchedEvent {
            node: *node,
            kind,
            detail: detail.clone(),
        });
    }
}

impl core::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryHost")
            .field("viewport", &self.viewport)
            .field("nodes", &self.nodes.borrow().len())
            .field("events", &self.events.borrow().len())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
