// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary between the engine and the document it drives.
//!
//! The engine never mutates a document directly. Everything it needs, from
//! reading geometry to writing inline styles, capturing pointers, or
//! dispatching custom events, goes through [`Host`]. A browser embedding
//! implements it over `web-sys` nodes; [`MemoryHost`](crate::memory::MemoryHost)
//! implements it over an in-memory tree.
//!
//! All methods take `&self`. Document nodes are shared handles with interior
//! mutability, and deferred effects only ever receive a `&H`.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Rect, Size, Vec2};

use crate::event::PointerId;

/// Kind of drag lifecycle event dispatched to the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DragEventKind {
    /// The drag was promoted from interacting to dragging.
    Start,
    /// A drag pass committed movement.
    Drag,
    /// The drag finished.
    End,
}

impl DragEventKind {
    /// The custom event type name used when dispatching to a document.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Start => "neodrag:start",
            Self::Drag => "neodrag",
            Self::End => "neodrag:end",
        }
    }
}

/// Payload of drag lifecycle events and callbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct DragEventData<N> {
    /// Offset of the element (committed, or about to be committed for [`DragEventKind::Drag`]).
    pub offset: Vec2,
    /// The mounted node.
    pub root_node: N,
    /// The node currently receiving pointer capture and transforms.
    pub current_node: N,
}

/// Document operations required by the engine.
pub trait Host: 'static {
    /// Node handle. Cheap to clone; equality is node identity.
    type Node: Clone + Eq + Hash + Debug + 'static;

    /// The node used as delegation root when none is configured.
    fn document_body(&self) -> Self::Node;

    /// Parent of `node`, or `None` at the top of the tree.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Returns `true` if `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if &n == ancestor {
                return true;
            }
            current = self.parent(&n);
        }
        false
    }

    /// Screen-space bounding rectangle, including transforms.
    fn bounding_rect(&self, node: &Self::Node) -> Rect;

    /// Layout size (`offsetWidth`/`offsetHeight`), unaffected by transforms.
    fn offset_size(&self, node: &Self::Node) -> Size;

    /// Screen-space rectangle of the viewport.
    fn viewport_rect(&self) -> Rect;

    /// All descendants of `scope` matching `selector`, in document order.
    fn query_selector_all(&self, scope: &Self::Node, selector: &str) -> Vec<Self::Node>;

    /// Inline style property value.
    fn style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Sets an inline style property.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    /// Removes an inline style property.
    fn remove_style(&self, node: &Self::Node, property: &str);

    /// Data attribute value; `key` is the full attribute name (`data-neodrag-state`).
    fn data(&self, node: &Self::Node, key: &str) -> Option<String>;

    /// Sets a data attribute.
    fn set_data(&self, node: &Self::Node, key: &str, value: &str);

    /// Removes a data attribute.
    fn remove_data(&self, node: &Self::Node, key: &str);

    /// Routes all further events of `pointer_id` to `node`.
    fn set_pointer_capture(&self, node: &Self::Node, pointer_id: PointerId);

    /// Releases a capture taken with [`set_pointer_capture`](Self::set_pointer_capture).
    fn release_pointer_capture(&self, node: &Self::Node, pointer_id: PointerId);

    /// Installs a one-shot capturing click listener on `node` that swallows the
    /// next click and then removes itself.
    fn suppress_next_click(&self, node: &Self::Node);

    /// Installs the shared `pointerdown`/`pointermove`/`pointerup` listeners on
    /// the delegation root. Called once per engine.
    fn install_listeners(&self, target: &Self::Node);

    /// Dispatches a drag lifecycle event on `node`.
    fn dispatch_drag_event(
        &self,
        node: &Self::Node,
        kind: DragEventKind,
        detail: &DragEventData<Self::Node>,
    ) {
        let _ = (node, kind, detail);
    }
}
