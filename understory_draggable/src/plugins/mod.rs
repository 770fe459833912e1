// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in plugins.
//!
//! [`default_plugins`] returns the set every engine installs unless told
//! otherwise: [`IgnoreMultitouch`], [`StateMarker`], [`UserSelect`],
//! [`Transform`], [`Threshold`], and [`TouchAction`].
//!
//! The rest are opt-in per instance:
//!
//! - [`Axis`]: lock movement to one axis.
//! - [`Bounds`]: keep the element inside a rectangle.
//! - [`Grid`]: snap to a grid.
//! - [`Position`]: start from a given offset.
//! - [`Disabled`]: veto every interaction.
//! - [`Controls`]: only start from (or never start from) certain handles.
//! - [`Events`]: callbacks and host events for start/drag/end.
//!
//! Plugins that constrain movement run at negative priority so they see the
//! proposals made by ordinary plugins, and [`Transform`] runs last of all so
//! the translate it writes is the final proposal of the pass.

use alloc::vec;
use alloc::vec::Vec;

use crate::host::Host;
use crate::plugin::PluginRef;

mod axis;
mod bounds;
mod controls;
mod events;
mod grid;
mod markers;
mod position;
mod threshold;
mod transform;

pub use axis::Axis;
pub use bounds::{Bounds, BoundsFrom, BoundsState, OffsetRange};
pub use controls::{ControlZone, Controls};
pub use events::{DragCallback, Events};
pub use grid::Grid;
pub use markers::{Disabled, IgnoreMultitouch, StateMarker, TouchAction, UserSelect};
pub use position::Position;
pub use threshold::{PressStart, Threshold, ThresholdOptions};
pub use transform::{Transform, TransformFn};

/// The plugins installed by [`DraggableOptions::default`](crate::DraggableOptions::default).
#[must_use]
pub fn default_plugins<H: Host>() -> Vec<PluginRef<H>> {
    vec![
        PluginRef::new(IgnoreMultitouch::default()),
        PluginRef::new(StateMarker),
        PluginRef::new(UserSelect),
        PluginRef::new(Transform::<H>::default()),
        PluginRef::new(Threshold::default()),
        PluginRef::new(TouchAction::default()),
    ]
}
