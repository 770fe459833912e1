// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;

use crate::context::DragContext;
use crate::error::DragError;
use crate::event::PointerEvent;
use crate::host::Host;
use crate::plugin::{Hooks, Plugin};

/// A set of control regions inside the mounted node.
pub enum ControlZone<H: Host> {
    /// Explicit nodes.
    Nodes(Vec<H::Node>),
    /// Every descendant of the mounted node matching a selector.
    Selector(String),
}

impl<H: Host> ControlZone<H> {
    fn nodes(&self, ctx: &DragContext<H>) -> Vec<H::Node> {
        match self {
            Self::Nodes(nodes) => nodes.clone(),
            Self::Selector(selector) => ctx.host().query_selector_all(ctx.root_node(), selector),
        }
    }
}

impl<H: Host> Clone for ControlZone<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Nodes(nodes) => Self::Nodes(nodes.clone()),
            Self::Selector(selector) => Self::Selector(selector.clone()),
        }
    }
}

impl<H: Host> core::fmt::Debug for ControlZone<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Nodes(nodes) => f.debug_tuple("Nodes").field(nodes).finish(),
            Self::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
        }
    }
}

/// Restricts where inside the mounted node a drag may begin.
///
/// When `allow` is set, the pointer-down target must be inside one of its
/// nodes. A target inside a `block` node never starts a drag. When a target is
/// nested in both, the control closest to the target decides.
pub struct Controls<H: Host> {
    /// Handles a drag may start from.
    pub allow: Option<ControlZone<H>>,
    /// Regions a drag may never start from.
    pub block: Option<ControlZone<H>>,
    /// Defaults to `10` so controls veto before ordinary plugins run.
    pub priority: i32,
}

impl<H: Host> Controls<H> {
    /// Only start drags from inside `zone`.
    pub fn allow(zone: ControlZone<H>) -> Self {
        Self {
            allow: Some(zone),
            block: None,
            priority: 10,
        }
    }

    /// Never start drags from inside `zone`.
    pub fn block(zone: ControlZone<H>) -> Self {
        Self {
            allow: None,
            block: Some(zone),
            priority: 10,
        }
    }

    /// Adds a blocked zone.
    #[must_use]
    pub fn with_block(mut self, zone: ControlZone<H>) -> Self {
        self.block = Some(zone);
        self
    }

    /// Adds an allowed zone.
    #[must_use]
    pub fn with_allow(mut self, zone: ControlZone<H>) -> Self {
        self.allow = Some(zone);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl<H: Host> core::fmt::Debug for Controls<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controls")
            .field("allow", &self.allow)
            .field("block", &self.block)
            .field("priority", &self.priority)
            .finish()
    }
}

impl<H: Host> Plugin<H> for Controls<H> {
    type State = ();

    fn name(&self) -> &str {
        "neodrag:controls"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn hooks(&self) -> Hooks {
        Hooks::SHOULD_DRAG
    }

    fn should_drag(
        &self,
        ctx: &mut DragContext<H>,
        _state: &mut (),
        event: &PointerEvent<H::Node>,
    ) -> Result<bool, DragError> {
        let allowed = self.allow.as_ref().map(|zone| zone.nodes(ctx));
        let blocked = self
            .block
            .as_ref()
            .map(|zone| zone.nodes(ctx))
            .unwrap_or_default();

        let host = ctx.host();
        let root = ctx.root_node();
        let mut current = Some(event.target.clone());
        while let Some(node) = current {
            if blocked.contains(&node) {
                return Ok(false);
            }
            if allowed.as_ref().is_some_and(|a| a.contains(&node)) {
                return Ok(true);
            }
            if &node == root {
                break;
            }
            current = host.parent(&node);
        }
        Ok(allowed.is_none())
    }
}
