// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::context::DragContext;
use crate::error::DragError;
use crate::event::PointerEvent;
use crate::host::Host;
use crate::plugin::{Hooks, Plugin};

/// Snaps the would-be offset up to the next multiple of the step, per axis.
///
/// Snapping uses the ceiling, so an offset of `94` on a `10` grid lands on
/// `100`. A zero (or non-finite) step leaves that axis alone, and an axis
/// nulled by an earlier plugin stays null.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Grid {
    /// Horizontal step.
    pub x: f64,
    /// Vertical step.
    pub y: f64,
}

impl Grid {
    /// Creates a grid with the given steps.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

fn snap(offset: f64, proposed: Option<f64>, step: f64) -> Option<f64> {
    let proposed = proposed?;
    if step == 0.0 || !step.is_finite() {
        return Some(proposed);
    }
    let target = offset + proposed;
    Some((target / step).ceil() * step - offset)
}

impl<H: Host> Plugin<H> for Grid {
    type State = ();

    fn name(&self) -> &str {
        "neodrag:grid"
    }

    fn priority(&self) -> i32 {
        -1
    }

    fn hooks(&self) -> Hooks {
        Hooks::DRAG
    }

    fn drag(
        &self,
        ctx: &mut DragContext<H>,
        _state: &mut (),
        _event: &PointerEvent<H::Node>,
    ) -> Result<(), DragError> {
        let offset = ctx.offset();
        let proposed = ctx.proposed();
        ctx.propose_x(snap(offset.x, proposed.x, self.x));
        ctx.propose_y(snap(offset.y, proposed.y, self.y));
        Ok(())
    }
}
