// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::cell::Cell;

use kurbo::Point;

/// Identifier of a pointer, as reported by the host (`PointerEvent.pointerId`).
pub type PointerId = i32;

/// Button value of a secondary (usually right) click; such presses never start a drag.
pub const SECONDARY_BUTTON: i16 = 2;

/// A pointer event forwarded by the host to the [`Engine`](crate::Engine).
///
/// `position` is in client (screen) coordinates and `time_stamp` is in
/// milliseconds on whatever monotonic clock the host uses; only differences
/// between time stamps are ever consulted.
#[derive(Clone, Debug)]
pub struct PointerEvent<N> {
    /// Pointer that produced the event.
    pub pointer_id: PointerId,
    /// Button that changed state (`0` primary, `2` secondary).
    pub button: i16,
    /// Whether this is the primary pointer of its type.
    pub is_primary: bool,
    /// Client position of the pointer.
    pub position: Point,
    /// Event time in milliseconds.
    pub time_stamp: f64,
    /// Innermost node under the pointer.
    pub target: N,
    default_prevented: Cell<bool>,
}

impl<N> PointerEvent<N> {
    /// Creates a primary-button, primary-pointer event.
    pub fn new(pointer_id: PointerId, target: N, position: Point, time_stamp: f64) -> Self {
        Self {
            pointer_id,
            button: 0,
            is_primary: true,
            position,
            time_stamp,
            target,
            default_prevented: Cell::new(false),
        }
    }

    /// Sets the button.
    #[must_use]
    pub fn with_button(mut self, button: i16) -> Self {
        self.button = button;
        self
    }

    /// Sets whether this is the primary pointer.
    #[must_use]
    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }

    /// Suppresses the host's default action (scrolling, text selection).
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// Returns `true` once [`prevent_default`](Self::prevent_default) has been called.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}
