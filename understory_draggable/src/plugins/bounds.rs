// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::{String, ToString};

use kurbo::{Insets, Rect, Vec2};

use crate::context::DragContext;
use crate::error::DragError;
use crate::event::PointerEvent;
use crate::host::Host;
use crate::plugin::{Hooks, Plugin};

/// Where a [`Bounds`] plugin reads its rectangle from.
pub enum BoundsFrom<H: Host> {
    /// The viewport.
    Viewport,
    /// The mounted node's parent.
    Parent,
    /// A specific node.
    Element(H::Node),
    /// The first match of a selector in the document.
    Selector(String),
    /// A fixed screen-space rectangle.
    Rect(Rect),
}

impl<H: Host> Clone for BoundsFrom<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Viewport => Self::Viewport,
            Self::Parent => Self::Parent,
            Self::Element(node) => Self::Element(node.clone()),
            Self::Selector(selector) => Self::Selector(selector.clone()),
            Self::Rect(rect) => Self::Rect(*rect),
        }
    }
}

impl<H: Host> core::fmt::Debug for BoundsFrom<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Viewport => f.write_str("Viewport"),
            Self::Parent => f.write_str("Parent"),
            Self::Element(node) => f.debug_tuple("Element").field(node).finish(),
            Self::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
            Self::Rect(rect) => f.debug_tuple("Rect").field(rect).finish(),
        }
    }
}

impl<H: Host> BoundsFrom<H> {
    fn resolve(&self, ctx: &DragContext<H>) -> Result<Rect, DragError> {
        let host = ctx.host();
        match self {
            Self::Viewport => Ok(host.viewport_rect()),
            Self::Parent => host
                .parent(ctx.root_node())
                .map(|parent| host.bounding_rect(&parent))
                .ok_or_else(|| DragError::BoundsTargetNotFound {
                    selector: "parent".to_string(),
                }),
            Self::Element(node) => Ok(host.bounding_rect(node)),
            Self::Selector(selector) => host
                .query_selector_all(&host.document_body(), selector)
                .first()
                .map(|node| host.bounding_rect(node))
                .ok_or_else(|| DragError::BoundsTargetNotFound {
                    selector: selector.clone(),
                }),
            Self::Rect(rect) => Ok(*rect),
        }
    }
}

/// Keeps the dragged element inside a rectangle.
///
/// The bounds are measured once, when the drag starts, against the element
/// rect cached at pointer-down. Every drag pass then clamps the would-be
/// offset so the element stays inside the bounds shrunk by `padding`.
///
/// Bounds that cannot be measured (missing target, zero area, smaller than
/// the element) fail the drag start once. Until a later measurement
/// succeeds, the plugin then leaves movement unconstrained instead of
/// failing again.
pub struct Bounds<H: Host> {
    /// Source of the bounding rectangle.
    pub from: BoundsFrom<H>,
    /// Distance kept between the bounds and the element, per edge.
    pub padding: Insets,
}

impl<H: Host> Bounds<H> {
    /// Bounds read from `from`, without padding.
    pub fn new(from: BoundsFrom<H>) -> Self {
        Self {
            from,
            padding: Insets::ZERO,
        }
    }

    /// Sets the padding.
    #[must_use]
    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    /// Offset range keeping `element` inside `bounds`, given the offset that
    /// was committed when `element` was measured.
    fn limits(
        &self,
        bounds: Rect,
        element: Rect,
        offset: Vec2,
        inverse_scale: Vec2,
    ) -> Result<OffsetRange, DragError> {
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return Err(DragError::ZeroAreaBounds);
        }
        let inner = bounds - self.padding;
        if inner.width() < element.width() || inner.height() < element.height() {
            return Err(DragError::BoundsTooSmall {
                bounds_width: inner.width(),
                bounds_height: inner.height(),
                element_width: element.width(),
                element_height: element.height(),
            });
        }
        Ok(OffsetRange {
            min: Vec2::new(
                offset.x + (inner.x0 - element.x0) * inverse_scale.x,
                offset.y + (inner.y0 - element.y0) * inverse_scale.y,
            ),
            max: Vec2::new(
                offset.x + (inner.x1 - element.x1) * inverse_scale.x,
                offset.y + (inner.y1 - element.y1) * inverse_scale.y,
            ),
        })
    }
}

impl<H: Host> core::fmt::Debug for Bounds<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bounds")
            .field("from", &self.from)
            .field("padding", &self.padding)
            .finish()
    }
}

/// Allowed offsets for the current drag.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct OffsetRange {
    min: Vec2,
    max: Vec2,
}

/// Per-instance state of [`Bounds`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BoundsState {
    /// Limits computed at drag start; `None` outside a drag.
    range: Option<OffsetRange>,
    /// The last measurement failed and was already reported.
    reported: bool,
}

fn clamp_axis(offset: f64, proposed: Option<f64>, min: f64, max: f64) -> Option<f64> {
    proposed.map(|p| (offset + p).clamp(min, max) - offset)
}

impl<H: Host> Plugin<H> for Bounds<H> {
    type State = BoundsState;

    fn name(&self) -> &str {
        "neodrag:bounds"
    }

    fn priority(&self) -> i32 {
        -2
    }

    fn hooks(&self) -> Hooks {
        Hooks::DRAG_START | Hooks::DRAG | Hooks::DRAG_END
    }

    fn drag_start(
        &self,
        ctx: &mut DragContext<H>,
        state: &mut BoundsState,
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        let measured = self.from.resolve(ctx).and_then(|bounds| {
            self.limits(
                bounds,
                ctx.cached_root_node_rect(),
                ctx.offset(),
                ctx.inverse_scale(),
            )
        });
        match measured {
            Ok(range) => {
                state.range = Some(range);
                state.reported = false;
                Ok(())
            }
            Err(err) if state.reported => {
                tracing::trace!(error = %err, "bounds still unusable; not constraining");
                state.range = None;
                Ok(())
            }
            Err(err) => {
                state.reported = true;
                Err(err)
            }
        }
    }

    fn drag(
        &self,
        ctx: &mut DragContext<H>,
        state: &mut BoundsState,
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        let Some(range) = state.range else {
            return Ok(());
        };
        let offset = ctx.offset();
        let proposed = ctx.proposed();
        ctx.propose_x(clamp_axis(offset.x, proposed.x, range.min.x, range.max.x));
        ctx.propose_y(clamp_axis(offset.y, proposed.y, range.min.y, range.max.y));
        Ok(())
    }

    fn drag_end(
        &self,
        _ctx: &mut DragContext<H>,
        state: &mut BoundsState,
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        state.range = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;

    fn bounds(padding: Insets) -> Bounds<MemoryHost> {
        Bounds::new(BoundsFrom::Viewport).with_padding(padding)
    }

    #[test]
    fn limits_keep_element_inside() {
        let range = bounds(Insets::ZERO)
            .limits(
                Rect::new(0.0, 0.0, 200.0, 200.0),
                Rect::new(0.0, 0.0, 100.0, 100.0),
                Vec2::ZERO,
                Vec2::new(1.0, 1.0),
            )
            .unwrap();
        assert_eq!(range.min, Vec2::ZERO);
        assert_eq!(range.max, Vec2::new(100.0, 100.0));
        assert_eq!(clamp_axis(0.0, Some(300.0), range.min.x, range.max.x), Some(100.0));
    }

    #[test]
    fn limits_account_for_padding_and_committed_offset() {
        // Element already moved 20px right (its rect reflects that).
        let range = bounds(Insets::uniform(10.0))
            .limits(
                Rect::new(0.0, 0.0, 200.0, 200.0),
                Rect::new(20.0, 0.0, 120.0, 100.0),
                Vec2::new(20.0, 0.0),
                Vec2::new(1.0, 1.0),
            )
            .unwrap();
        assert_eq!(range.min, Vec2::new(10.0, 10.0));
        assert_eq!(range.max, Vec2::new(90.0, 90.0));
    }

    #[test]
    fn degenerate_bounds_are_reported() {
        let b = bounds(Insets::ZERO);
        let element = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            b.limits(Rect::new(0.0, 0.0, 0.0, 50.0), element, Vec2::ZERO, Vec2::new(1.0, 1.0)),
            Err(DragError::ZeroAreaBounds)
        );
        assert!(matches!(
            b.limits(Rect::new(0.0, 0.0, 50.0, 500.0), element, Vec2::ZERO, Vec2::new(1.0, 1.0)),
            Err(DragError::BoundsTooSmall { .. })
        ));
    }

    #[test]
    fn null_axis_is_not_clamped_into_existence() {
        assert_eq!(clamp_axis(0.0, None, -5.0, 5.0), None);
    }
}
