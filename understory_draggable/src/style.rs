// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small helpers for the inline style and dataset contract.
//!
//! These are stateless and side-effecting; plugins call them from inside
//! effects so that a cancelled pass never leaves a trace in the document.

use alloc::format;
use alloc::string::String;

use kurbo::{Rect, Size, Vec2};

use crate::host::Host;

/// Marker attribute present on every mounted node.
pub const DATA_ROOT: &str = "data-neodrag";
/// Phase attribute: `idle` or `dragging`.
pub const DATA_STATE: &str = "data-neodrag-state";
/// Number of completed drags.
pub const DATA_COUNT: &str = "data-neodrag-count";

/// Inline style property used for positioning.
pub const TRANSLATE: &str = "translate";

/// Formats an offset as a CSS `translate` value.
///
/// ```
/// use kurbo::Vec2;
/// use understory_draggable::style::translate_value;
///
/// assert_eq!(translate_value(Vec2::new(12.5, -3.0)), "12.5px -3px");
/// assert_eq!(translate_value(Vec2::new(-0.0, 0.0)), "0px 0px");
/// ```
#[must_use]
pub fn translate_value(offset: Vec2) -> String {
    // `+ 0.0` folds negative zero so it never prints as `-0`.
    format!("{}px {}px", offset.x + 0.0, offset.y + 0.0)
}

/// Writes `offset` as the inline `translate` of `node`.
pub fn set_translate<H: Host>(host: &H, node: &H::Node, offset: Vec2) {
    host.set_style(node, TRANSLATE, &translate_value(offset));
}

/// Restores a previously read inline style value, removing the property when
/// there was none.
pub fn restore_style<H: Host>(host: &H, node: &H::Node, property: &str, previous: Option<&str>) {
    match previous {
        Some(value) => host.set_style(node, property, value),
        None => host.remove_style(node, property),
    }
}

/// Ratio between layout size and rendered size, per axis.
///
/// Multiplying a screen-space distance by this factor gives the distance in
/// the element's own (unscaled) coordinate space. Degenerate geometry such as a
/// zero-width rect yields `1.0` for that axis.
#[must_use]
pub fn inverse_scale(offset_size: Size, rect: Rect) -> Vec2 {
    fn factor(layout: f64, rendered: f64) -> f64 {
        let ratio = layout / rendered;
        if ratio.is_finite() && ratio != 0.0 {
            ratio
        } else {
            1.0
        }
    }
    Vec2::new(
        factor(offset_size.width, rect.width()),
        factor(offset_size.height, rect.height()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_scale_of_unscaled_element_is_one() {
        let s = inverse_scale(Size::new(100.0, 50.0), Rect::new(10.0, 10.0, 110.0, 60.0));
        assert_eq!(s, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn inverse_scale_tracks_css_scale() {
        // Rendered at 2x.
        let s = inverse_scale(Size::new(100.0, 50.0), Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(s, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn inverse_scale_guards_degenerate_geometry() {
        let s = inverse_scale(Size::new(100.0, 0.0), Rect::new(0.0, 0.0, 0.0, 20.0));
        assert_eq!(s, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn translate_value_formats_integers_without_fraction() {
        assert_eq!(translate_value(Vec2::new(100.0, 0.0)), "100px 0px");
    }
}
