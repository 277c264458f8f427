#![forbid(unsafe_code)]

//! Core: geometry and animation primitives for gridshift.
//!
//! # Role in gridshift
//! `gridshift-core` holds the framework-agnostic building blocks the reorder
//! engine is written against: screen-space [`geometry`] types and
//! tick-driven [`animation`] primitives. It knows nothing about grids,
//! sessions, or hosts.
//!
//! # How it fits in the system
//! `gridshift` consumes these types at every seam with the host: item
//! rectangles, pointer positions, gap offsets, the proxy lift/settle
//! progress, and autoscroll steps are all expressed with them.

pub mod animation;
pub mod geometry;

pub use geometry::{Axis, Offset, Point, Rect, Size};
