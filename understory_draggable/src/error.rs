// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

/// Errors surfaced by the engine and the built-in plugins.
///
/// Vetoes and cancellations are not errors; they are ordinary control flow
/// and never show up here. An error returned from a hook aborts the current
/// pass (its effects are dropped and nothing is committed) and is handed back
/// to whoever called the pointer entry point. The instance stays mounted.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DragError {
    /// A threshold plugin was configured with a negative or non-finite value.
    #[error("invalid threshold: {reason}")]
    InvalidThreshold {
        /// Which value was rejected.
        reason: &'static str,
    },

    /// The resolved bounds rectangle has no area.
    #[error("bounds have zero area")]
    ZeroAreaBounds,

    /// The resolved bounds are smaller than the element being dragged.
    #[error(
        "bounds ({bounds_width}x{bounds_height}) are smaller than the dragged element ({element_width}x{element_height})"
    )]
    BoundsTooSmall {
        /// Width of the bounds after padding.
        bounds_width: f64,
        /// Height of the bounds after padding.
        bounds_height: f64,
        /// Width of the dragged element.
        element_width: f64,
        /// Height of the dragged element.
        element_height: f64,
    },

    /// A selector used as a bounds source matched nothing.
    #[error("no bounds target matches selector `{selector}`")]
    BoundsTargetNotFound {
        /// The selector that was queried.
        selector: String,
    },

    /// The node passed to [`Engine::mount`](crate::Engine::mount) is already a draggable.
    #[error("node is already mounted as a draggable")]
    AlreadyMounted,

    /// The instance handle refers to an instance that has been destroyed.
    #[error("draggable instance is no longer mounted")]
    UnknownInstance,

    /// The engine was called re-entrantly from inside a hook or an effect.
    #[error("the engine is already handling an event")]
    Busy,

    /// A plugin's private state did not have the type the plugin expects.
    #[error("private state of plugin `{plugin}` has an unexpected type")]
    StateMismatch {
        /// Name of the plugin whose state was rejected.
        plugin: String,
    },

    /// A user plugin reported a failure.
    #[error("plugin `{plugin}` failed: {message}")]
    Plugin {
        /// Name of the failing plugin.
        plugin: String,
        /// Human-readable description.
        message: String,
    },
}
