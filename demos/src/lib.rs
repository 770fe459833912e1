// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless demos for `understory_draggable`.
//!
//! See the `examples/` directory of this crate; each runs against the
//! in-memory host and prints what the engine writes to the document.

use understory_draggable::Host;
use understory_draggable::memory::{MemoryHost, MemoryNode};
use understory_draggable::style::{DATA_COUNT, DATA_STATE, TRANSLATE};

/// Prints the inline position and dataset markers of `node`.
pub fn print_node(host: &MemoryHost, label: &str, node: MemoryNode) {
    let translate = host.style(&node, TRANSLATE);
    let state = host.data(&node, DATA_STATE);
    let count = host.data(&node, DATA_COUNT);
    println!(
        "{label:>12}: translate={} state={} count={}",
        translate.as_deref().unwrap_or("-"),
        state.as_deref().unwrap_or("-"),
        count.as_deref().unwrap_or("-"),
    );
}

/// Installs a `fmt` subscriber honoring `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
