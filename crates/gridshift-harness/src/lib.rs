#![forbid(unsafe_code)]

//! Test harness for gridshift.
//!
//! # Role in gridshift
//! Provides a deterministic host and scripted input so integration tests and
//! benches can drive a [`gridshift::ReorderCoordinator`] end to end without a
//! rendering framework.
//!
//! - [`SimGrid`]: a fixed-cell, vertically scrolling grid implementing
//!   [`gridshift::ReorderHost`] that records every host interaction.
//! - [`PointerScript`]: seeded pointer paths.

pub mod pointer_script;
pub mod sim_grid;

pub use pointer_script::PointerScript;
pub use sim_grid::{HostEvent, SimGrid};
