#![forbid(unsafe_code)]

//! Drag-to-reorder coordination for grouped grids in a scrollable view.
//!
//! # Role in gridshift
//! This crate is the reorder engine. A host view registers its mounted cells,
//! forwards pointer samples and frame ticks, and receives back per-cell gap
//! offsets, a floating proxy to paint, autoscroll requests, and a single
//! `(from, to)` callback when a drop commits.
//!
//! # How it fits in the system
//! Geometry and animation primitives come from `gridshift-core`. Rendering,
//! layout, and gesture plumbing stay in the host, reached through the
//! [`ReorderHost`], [`GridGeometry`], and [`Scrollable`] traits.
//!
//! # Example
//!
//! ```ignore
//! let mut coordinator = ReorderCoordinator::new(ReorderConfig::default(), [4, 3])?
//!     .with_on_reorder(|from, to| println!("moved {from} to {to}"));
//! for index in coordinator.shape().clone().indices() {
//!     coordinator.register_item(index, &mut host);
//! }
//! let token = coordinator.start_item_drag_reorder(
//!     GridIndex::new(0, 0),
//!     pointer_down,
//!     Box::new(ThresholdRecognizer::new(4.0)),
//!     &mut host,
//! )?;
//! coordinator.pointer_move(token, pointer_move, &mut host);
//! coordinator.pointer_up(token, &mut host);
//! while coordinator.tick(frame_dt, &mut host).needs_frame {}
//! ```

pub mod autoscroll;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod gap;
pub mod host;
pub mod index;
pub mod proxy;
pub mod recognizer;
pub mod registry;
pub mod session;
pub mod shape;

pub use autoscroll::{AutoscrollController, AutoscrollTick, ScrollDirection, ScrollStep};
pub use config::{AutoscrollConfig, GapConfig, ProxyConfig, ReorderConfig};
pub use coordinator::{
    CancelReason, ItemVisual, NoopReason, ReorderCallback, ReorderCoordinator, ReorderEffect,
    TickOutcome,
};
pub use error::ReorderError;
pub use gap::{GapOutcome, GapQuery, GapResolver};
pub use host::{GridGeometry, ReorderHost, Repaint, ScrollMetrics, Scrollable};
pub use index::{GridIndex, Reorder};
pub use proxy::{Decorated, ElevationDecorator, ProxyDecoration, ProxyDecorator, ProxySnapshot};
pub use recognizer::{
    DragRecognizer, ImmediateRecognizer, PointerEvent, Recognition, ThresholdRecognizer,
};
pub use registry::{CellKey, GapState, HandleId, ItemHandle, ItemRegistry};
pub use session::{DragSession, DragToken, SessionId, SessionPhase};
pub use shape::GridShape;

pub use gridshift_core::{Axis, Offset, Point, Rect, Size};
