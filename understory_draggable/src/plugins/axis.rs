// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::context::DragContext;
use crate::error::DragError;
use crate::event::PointerEvent;
use crate::host::Host;
use crate::plugin::{Hooks, Plugin};

/// Restricts movement to one axis by nulling the other axis of every proposal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal movement only.
    X,
    /// Vertical movement only.
    Y,
}

impl<H: Host> Plugin<H> for Axis {
    type State = ();

    fn name(&self) -> &str {
        "neodrag:axis"
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
        match self {
            Self::X => ctx.propose_y(None),
            Self::Y => ctx.propose_x(None),
        }
        Ok(())
    }
}
