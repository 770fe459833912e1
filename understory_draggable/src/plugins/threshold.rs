// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

use crate::context::DragContext;
use crate::error::DragError;
use crate::event::PointerEvent;
use crate::host::Host;
use crate::plugin::{Hooks, Plugin};

/// How far and how long a pointer must travel before a press becomes a drag.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThresholdOptions {
    /// Minimum time since pointer-down, in milliseconds. `0` disables the check.
    pub delay_ms: f64,
    /// Minimum distance from the pointer-down position, in client pixels.
    /// `0` disables the check.
    pub distance: f64,
}

impl Default for ThresholdOptions {
    fn default() -> Self {
        Self {
            delay_ms: 0.0,
            distance: 3.0,
        }
    }
}

impl ThresholdOptions {
    /// Sets the delay.
    #[must_use]
    pub const fn with_delay_ms(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Sets the distance.
    #[must_use]
    pub const fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    fn validate(&self) -> Result<(), DragError> {
        if !self.delay_ms.is_finite() || self.delay_ms < 0.0 {
            return Err(DragError::InvalidThreshold {
                reason: "delay must be a finite, non-negative number of milliseconds",
            });
        }
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(DragError::InvalidThreshold {
                reason: "distance must be a finite, non-negative number of pixels",
            });
        }
        Ok(())
    }
}

/// Keeps a press from becoming a drag until both thresholds are met.
///
/// Both checks are inclusive: with the default distance of `3`, a move of
/// exactly 3px starts the drag on that move.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Threshold {
    /// Configured thresholds.
    pub options: ThresholdOptions,
}

impl Threshold {
    /// Creates the plugin; invalid options are reported from `setup`.
    #[must_use]
    pub const fn new(options: ThresholdOptions) -> Self {
        Self { options }
    }
}

/// Where and when the current press started.
#[derive(Copy, Clone, Debug, Default)]
pub struct PressStart {
    time_stamp: f64,
    position: Point,
}

impl<H: Host> Plugin<H> for Threshold {
    type State = PressStart;

    fn name(&self) -> &str {
        "neodrag:threshold"
    }

    fn hooks(&self) -> Hooks {
        Hooks::SHOULD_DRAG | Hooks::DRAG | Hooks::DRAG_END
    }

    fn setup(&self, _ctx: &mut DragContext<H>) -> Result<PressStart, DragError> {
        self.options.validate()?;
        Ok(PressStart::default())
    }

    fn should_drag(
        &self,
        _ctx: &mut DragContext<H>,
        state: &mut PressStart,
        event: &PointerEvent<H::Node>,
    ) -> Result<bool, DragError> {
        *state = PressStart {
            time_stamp: event.time_stamp,
            position: event.position,
        };
        Ok(true)
    }

    fn drag(
        &self,
        ctx: &mut DragContext<H>,
        state: &mut PressStart,
        event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        if ctx.is_dragging() {
            return Ok(());
        }
        let elapsed = event.time_stamp - state.time_stamp;
        let travelled = (event.position - state.position).hypot2();
        let distance = self.options.distance;
        if elapsed < self.options.delay_ms || travelled < distance * distance {
            ctx.prevent_start();
        }
        Ok(())
    }

    fn drag_end(
        &self,
        _ctx: &mut DragContext<H>,
        state: &mut PressStart,
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        *state = PressStart::default();
        Ok(())
    }
}
