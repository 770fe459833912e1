// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Vec2;

use crate::context::DragContext;
use crate::error::DragError;
use crate::host::Host;
use crate::plugin::{Hooks, Plugin};

/// Starts the instance at a given offset.
///
/// An update that passes a `Position` with a different `default` moves the
/// instance there; passing the same value again leaves the offset alone.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Position {
    /// Offset applied at setup.
    pub default: Vec2,
}

impl Position {
    /// Starts at `default`.
    #[must_use]
    pub const fn new(default: Vec2) -> Self {
        Self { default }
    }
}

impl<H: Host> Plugin<H> for Position {
    /// The `default` last applied.
    type State = Vec2;

    fn name(&self) -> &str {
        "neodrag:position"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn hooks(&self) -> Hooks {
        Hooks::empty()
    }

    fn setup(&self, ctx: &mut DragContext<H>) -> Result<Vec2, DragError> {
        ctx.set_offset(self.default);
        Ok(self.default)
    }

    fn reconfigure(&self, ctx: &mut DragContext<H>, applied: &mut Vec2) {
        if *applied != self.default {
            ctx.set_offset(self.default);
            *applied = self.default;
        }
    }
}
