#![forbid(unsafe_code)]

//! Session coordinator: the public face of the reorder engine.
//!
//! [`ReorderCoordinator`] owns the item registry, the single drag session,
//! the gap resolver and the autoscroll controller. The host drives it with
//! pointer samples and frame ticks, passing itself in as a
//! [`ReorderHost`] on every call.
//!
//! ```text
//! Idle ──start──▶ Starting ──accept──▶ Dragging ──pointer_up──▶ Ending
//!   ▲                │                    │                       │
//!   │                └──────cancel────────┴───────────────────────┤
//!   └────────────────────────── teardown ◀────── settle (tick) ───┘
//! ```
//!
//! Every operation returns a [`ReorderEffect`] describing the transition it
//! caused, or `Noop` with the reason it did nothing.
//!
//! # Invariants
//!
//! 1. At most one session exists; starting another cancels the first.
//! 2. The reorder callback fires at most once per session, only from a
//!    settled drop whose insert index differs from the origin.
//! 3. After teardown every registered cell has a zero offset and is not
//!    flagged dragging.
//! 4. A shape change cancels the active session before it can commit.
//!
//! # Failure Modes
//!
//! Starting on an unregistered index returns
//! [`ReorderError::InvalidDragTarget`] and leaves all state untouched.
//! A dragged cell whose geometry disappears before acceptance cancels the
//! session with [`CancelReason::TargetLost`].

use std::fmt;
use std::time::Duration;

use gridshift_core::animation::{Animation, ProgressPhase};
use gridshift_core::{Axis, Offset, Point};

use crate::autoscroll::{AutoscrollController, AutoscrollTick};
use crate::config::ReorderConfig;
use crate::error::ReorderError;
use crate::gap::{GapOutcome, GapQuery, GapResolver};
use crate::host::{ReorderHost, Repaint};
use crate::index::{GridIndex, Reorder};
use crate::proxy::{Decorated, ElevationDecorator, ProxyDecoration, ProxyDecorator, ProxySnapshot};
use crate::recognizer::{DragRecognizer, PointerEvent, Recognition};
use crate::registry::{CellKey, HandleId, ItemRegistry};
use crate::session::{DragSession, DragToken, SessionId, SessionPhase};
use crate::shape::GridShape;

/// Callback receiving `(from, to)` for every committed drop.
pub type ReorderCallback = Box<dyn FnMut(GridIndex, GridIndex)>;

/// Why a session ended without committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// `cancel_reorder` was called.
    Explicit,
    ShapeChanged,
    /// The recognizer rejected the gesture.
    Recognizer,
    ReleasedBeforeAccept,
    /// A new drag started.
    Restarted,
    PointerCancel,
    /// The dragged cell had no geometry at acceptance.
    TargetLost,
}

/// Why an operation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoopReason {
    Idle,
    StaleToken,
    PointerMismatch,
    PendingRecognition,
    AlreadyAccepted,
    AlreadyEnding,
    SameShape,
}

/// Observable outcome of a coordinator operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReorderEffect {
    Accepted {
        session: SessionId,
        dragged: GridIndex,
    },
    /// The pointer moved without changing the insert index.
    Moved {
        session: SessionId,
        insert: GridIndex,
    },
    InsertChanged {
        session: SessionId,
        previous: GridIndex,
        insert: GridIndex,
    },
    /// Released; the proxy is settling toward `drop_position`.
    Dropping {
        session: SessionId,
        insert: GridIndex,
        drop_position: Point,
    },
    /// The settle finished and the callback fired.
    Committed {
        session: SessionId,
        reorder: Reorder,
    },
    /// The settle finished back at the origin; no callback.
    Settled {
        session: SessionId,
        index: GridIndex,
    },
    Canceled {
        session: SessionId,
        reason: CancelReason,
    },
    Noop {
        reason: NoopReason,
    },
}

/// Result of one frame tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Transition caused by this tick, if any.
    pub effect: Option<ReorderEffect>,
    /// Whether another tick is needed to finish running animations.
    pub needs_frame: bool,
}

/// Per-cell render state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ItemVisual {
    /// Displayed gap offset from the rest slot.
    pub offset: Offset,
    /// The cell is being dragged and should not paint in place.
    pub dragging: bool,
}

/// Drag-to-reorder coordinator for one grouped grid.
pub struct ReorderCoordinator {
    config: ReorderConfig,
    shape: GridShape,
    registry: ItemRegistry,
    gap: GapResolver,
    autoscroll: AutoscrollController,
    session: Option<DragSession>,
    next_session: u64,
    on_reorder: Option<ReorderCallback>,
    decorator: Box<dyn ProxyDecorator>,
}

impl fmt::Debug for ReorderCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReorderCoordinator")
            .field("config", &self.config)
            .field("shape", &self.shape)
            .field("registry", &self.registry)
            .field("session", &self.session)
            .field("next_session", &self.next_session)
            .field("has_on_reorder", &self.on_reorder.is_some())
            .finish_non_exhaustive()
    }
}

impl ReorderCoordinator {
    /// Create an idle coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`ReorderError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: ReorderConfig, shape: impl Into<GridShape>) -> Result<Self, ReorderError> {
        config.validate()?;
        Ok(Self {
            gap: GapResolver::new(config.gap, config.allow_new_group),
            autoscroll: AutoscrollController::new(config.autoscroll),
            decorator: Box::new(ElevationDecorator::new(config.proxy.elevation)),
            config,
            shape: shape.into(),
            registry: ItemRegistry::new(),
            session: None,
            next_session: 0,
            on_reorder: None,
        })
    }

    #[must_use]
    pub fn with_on_reorder(mut self, callback: impl FnMut(GridIndex, GridIndex) + 'static) -> Self {
        self.on_reorder = Some(Box::new(callback));
        self
    }

    pub fn set_on_reorder(&mut self, callback: impl FnMut(GridIndex, GridIndex) + 'static) {
        self.on_reorder = Some(Box::new(callback));
    }

    /// Replace the proxy decoration hook.
    #[must_use]
    pub fn with_decorator(mut self, decorator: impl ProxyDecorator + 'static) -> Self {
        self.decorator = Box::new(decorator);
        self
    }

    // -----------------------------------------------------------------------
    // Readouts
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn config(&self) -> &ReorderConfig {
        &self.config
    }

    #[must_use]
    pub const fn shape(&self) -> &GridShape {
        &self.shape
    }

    #[must_use]
    pub const fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Whether `token` still addresses the active session.
    #[must_use]
    pub fn is_live(&self, token: DragToken) -> bool {
        self.check_token(token).is_ok()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.session
            .as_ref()
            .map_or(SessionPhase::Idle, DragSession::phase)
    }

    #[must_use]
    pub fn dragged_index(&self) -> Option<GridIndex> {
        self.session.as_ref().map(DragSession::dragged)
    }

    #[must_use]
    pub fn insert_index(&self) -> Option<GridIndex> {
        self.session.as_ref().map(DragSession::insert)
    }

    /// Displayed gap offset for the cell at `index`; zero if unknown.
    #[must_use]
    pub fn item_offset(&self, index: GridIndex) -> Offset {
        self.registry
            .lookup(index)
            .map_or(Offset::ZERO, |handle| handle.gap().displayed())
    }

    #[must_use]
    pub fn is_item_dragging(&self, index: GridIndex) -> bool {
        self.registry
            .lookup(index)
            .is_some_and(|handle| handle.is_dragging())
    }

    #[must_use]
    pub fn item_visual(&self, index: GridIndex) -> ItemVisual {
        ItemVisual {
            offset: self.item_offset(index),
            dragging: self.is_item_dragging(index),
        }
    }

    /// Overlay state for the floating proxy, while one is shown.
    #[must_use]
    pub fn proxy(&self) -> Option<ProxySnapshot> {
        self.session
            .as_ref()
            .filter(|session| session.proxy_open)
            .map(|session| snapshot(session, self.decorator.as_ref()))
    }

    #[must_use]
    pub fn proxy_decoration(&self) -> Option<ProxyDecoration> {
        self.proxy().map(|proxy| proxy.decoration)
    }

    /// Wrap the dragged cell's content with the current decoration.
    #[must_use]
    pub fn decorate_proxy<C>(&self, content: C) -> Option<Decorated<C>> {
        self.proxy_decoration()
            .map(|decoration| decoration.wrap(content))
    }

    /// Render key for a cell showing `content` at `index`.
    #[must_use]
    pub fn cell_key<K>(&self, content: K, index: GridIndex) -> CellKey<K> {
        CellKey::new(content, index, self.session.as_ref().map(DragSession::id))
    }

    /// Whether any animation still needs frames.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        self.registry.is_animating()
            || self.autoscroll.is_running()
            || self.session.as_ref().is_some_and(|session| {
                session.phase == SessionPhase::Ending || session.proxy.phase().is_animating()
            })
    }

    // -----------------------------------------------------------------------
    // Cell lifecycle
    // -----------------------------------------------------------------------

    /// Register a freshly mounted cell.
    ///
    /// A cell mounting mid-drag (scrolled into view) is placed at its gap
    /// offset immediately and, if it is the dragged cell, hidden.
    pub fn register_item(&mut self, index: GridIndex, host: &mut dyn ReorderHost) -> HandleId {
        let id = self.registry.register(index);
        let Some(session) = self.session.as_ref() else {
            return id;
        };
        if !matches!(session.phase, SessionPhase::Dragging | SessionPhase::Ending) {
            return id;
        }
        if index == session.dragged {
            self.registry.set_dragging(index, true);
            host.request_repaint(Repaint::Item(index));
        } else {
            let query = gap_query(session);
            let target = GapResolver::target_offset(index, &query, &*host);
            self.registry
                .set_target(index, target, &self.config.gap, false);
        }
        id
    }

    /// Unregister an unmounted cell. Returns `false` for stale handles.
    pub fn unregister_item(&mut self, index: GridIndex, id: HandleId) -> bool {
        self.registry.unregister(index, id)
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Begin tracking a press on the cell at `index`.
    ///
    /// Any active session is cancelled first. If the recognizer accepts on
    /// the press itself the session goes straight to `Dragging`.
    ///
    /// The returned token can already be dead: a recognizer that rejects the
    /// press, or a target with no geometry at accept time, cancels the
    /// session before this returns. Check [`Self::is_live`] when it matters.
    ///
    /// # Errors
    ///
    /// Returns [`ReorderError::InvalidDragTarget`] when no cell is
    /// registered at `index`; nothing else changes.
    pub fn start_item_drag_reorder(
        &mut self,
        index: GridIndex,
        event: PointerEvent,
        recognizer: Box<dyn DragRecognizer>,
        host: &mut dyn ReorderHost,
    ) -> Result<DragToken, ReorderError> {
        let _span = tracing::debug_span!("reorder.start", %index, pointer_id = event.pointer_id)
            .entered();
        if !self.registry.contains(index) {
            tracing::warn!(target: "gridshift.reorder", %index, "drag target is not mounted");
            return Err(ReorderError::InvalidDragTarget { index });
        }
        if self.session.is_some() {
            self.cancel_with(CancelReason::Restarted, host);
        }

        self.next_session += 1;
        let id = SessionId::new(self.next_session);
        let mut session = DragSession::new(id, index, &event, recognizer, &self.config.proxy);
        let verdict = session
            .recognizer
            .as_mut()
            .map_or(Recognition::Pending, |recognizer| recognizer.add_pointer(&event));
        let token = session.token();
        self.session = Some(session);
        tracing::debug!(target: "gridshift.reorder", session = %id, %index, "session started");

        match verdict {
            Recognition::Accepted => {
                self.accept(host);
            }
            Recognition::Rejected => {
                self.cancel_with(CancelReason::Recognizer, host);
            }
            Recognition::Pending => {}
        }
        Ok(token)
    }

    /// Accept a pending session without waiting for its recognizer.
    pub fn accept_drag(&mut self, token: DragToken, host: &mut dyn ReorderHost) -> ReorderEffect {
        let _span = tracing::debug_span!("reorder.accept", session = %token.session).entered();
        if let Err(reason) = self.check_token(token) {
            return ReorderEffect::Noop { reason };
        }
        self.accept(host)
    }

    /// Feed a pointer move.
    pub fn pointer_move(
        &mut self,
        token: DragToken,
        event: PointerEvent,
        host: &mut dyn ReorderHost,
    ) -> ReorderEffect {
        let _span = tracing::debug_span!("reorder.pointer_move", session = %token.session).entered();
        if let Err(reason) = self.check_token(token) {
            return ReorderEffect::Noop { reason };
        }
        if event.pointer_id != token.pointer_id {
            return ReorderEffect::Noop {
                reason: NoopReason::PointerMismatch,
            };
        }
        match self.phase() {
            SessionPhase::Starting => {
                let verdict = self
                    .session
                    .as_mut()
                    .and_then(|session| session.recognizer.as_mut())
                    .map_or(Recognition::Pending, |recognizer| recognizer.pointer_moved(&event));
                match verdict {
                    Recognition::Pending => ReorderEffect::Noop {
                        reason: NoopReason::PendingRecognition,
                    },
                    Recognition::Rejected => self.cancel_with(CancelReason::Recognizer, host),
                    Recognition::Accepted => {
                        let effect = self.accept(host);
                        if matches!(effect, ReorderEffect::Accepted { .. }) {
                            self.drag_to(event.position, host);
                        }
                        effect
                    }
                }
            }
            SessionPhase::Dragging => self.drag_to(event.position, host),
            SessionPhase::Ending => ReorderEffect::Noop {
                reason: NoopReason::AlreadyEnding,
            },
            SessionPhase::Idle | SessionPhase::Cancelled => ReorderEffect::Noop {
                reason: NoopReason::Idle,
            },
        }
    }

    /// Release the pointer.
    ///
    /// Before acceptance this cancels. While dragging it computes the drop
    /// position and starts the settle; the commit happens on the tick that
    /// finishes it.
    pub fn pointer_up(&mut self, token: DragToken, host: &mut dyn ReorderHost) -> ReorderEffect {
        let _span = tracing::debug_span!("reorder.pointer_up", session = %token.session).entered();
        if let Err(reason) = self.check_token(token) {
            return ReorderEffect::Noop { reason };
        }
        match self.phase() {
            SessionPhase::Starting => self.cancel_with(CancelReason::ReleasedBeforeAccept, host),
            SessionPhase::Dragging => self.begin_drop(host),
            SessionPhase::Ending => ReorderEffect::Noop {
                reason: NoopReason::AlreadyEnding,
            },
            SessionPhase::Idle | SessionPhase::Cancelled => ReorderEffect::Noop {
                reason: NoopReason::Idle,
            },
        }
    }

    /// The platform cancelled the pointer.
    pub fn pointer_cancel(&mut self, token: DragToken, host: &mut dyn ReorderHost) -> ReorderEffect {
        let _span =
            tracing::debug_span!("reorder.pointer_cancel", session = %token.session).entered();
        if let Err(reason) = self.check_token(token) {
            return ReorderEffect::Noop { reason };
        }
        self.cancel_with(CancelReason::PointerCancel, host)
    }

    /// Cancel any active session. Safe to call when idle.
    pub fn cancel_reorder(&mut self, host: &mut dyn ReorderHost) -> ReorderEffect {
        let _span = tracing::debug_span!("reorder.cancel").entered();
        if self.session.is_none() {
            return ReorderEffect::Noop {
                reason: NoopReason::Idle,
            };
        }
        self.cancel_with(CancelReason::Explicit, host)
    }

    /// Adopt a new grid shape, cancelling any active session.
    pub fn update_shape(
        &mut self,
        shape: impl Into<GridShape>,
        host: &mut dyn ReorderHost,
    ) -> ReorderEffect {
        let shape = shape.into();
        if shape == self.shape {
            return ReorderEffect::Noop {
                reason: NoopReason::SameShape,
            };
        }
        let _span = tracing::debug_span!("reorder.update_shape").entered();
        let effect = if self.session.is_some() {
            self.cancel_with(CancelReason::ShapeChanged, host)
        } else {
            ReorderEffect::Noop {
                reason: NoopReason::Idle,
            }
        };
        tracing::debug!(
            target: "gridshift.reorder",
            groups = shape.group_count(),
            items = shape.total_items(),
            "shape updated"
        );
        self.shape = shape;
        effect
    }

    /// Advance every animation by `dt`.
    ///
    /// Gap tweens, the autoscroll step, and the proxy lift/settle all move
    /// here. A finished scroll step re-resolves the gap and may start the
    /// next step; a finished settle commits or settles the session.
    pub fn tick(&mut self, dt: Duration, host: &mut dyn ReorderHost) -> TickOutcome {
        let mut effect = None;

        if self.registry.is_animating() {
            self.registry.tick(dt);
            host.request_repaint(Repaint::Grid);
        }

        if self.autoscroll.is_running() {
            let finished = match host.scrollable() {
                Some(scrollable) => self.autoscroll.tick(dt, scrollable) == AutoscrollTick::Finished,
                None => {
                    self.autoscroll.stop();
                    false
                }
            };
            if finished {
                effect = self.after_scroll_step(host);
            }
        }

        let mut settled = false;
        if let Some(session) = self.session.as_mut() {
            if session.proxy.phase().is_animating() {
                session.proxy.tick(dt);
                host.request_repaint(Repaint::Proxy);
            }
            settled = session.phase == SessionPhase::Ending
                && session.proxy.phase() == ProgressPhase::Dismissed;
        }
        if settled {
            effect = Some(self.finalize(host));
        }

        TickOutcome {
            effect,
            needs_frame: self.needs_frame(),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn check_token(&self, token: DragToken) -> Result<(), NoopReason> {
        match self.session.as_ref() {
            None => Err(NoopReason::Idle),
            Some(session) if session.id != token.session => Err(NoopReason::StaleToken),
            Some(session) if session.pointer_id != token.pointer_id => {
                Err(NoopReason::PointerMismatch)
            }
            Some(_) => Ok(()),
        }
    }

    fn accept(&mut self, host: &mut dyn ReorderHost) -> ReorderEffect {
        let Some(session) = self.session.as_mut() else {
            return ReorderEffect::Noop {
                reason: NoopReason::Idle,
            };
        };
        if session.phase != SessionPhase::Starting {
            return ReorderEffect::Noop {
                reason: NoopReason::AlreadyAccepted,
            };
        }
        let (id, dragged) = (session.id, session.dragged);
        let Some(rect) = self
            .registry
            .lookup(dragged)
            .and_then(|handle| handle.rect(&*host))
        else {
            tracing::warn!(target: "gridshift.reorder", session = %id, %dragged, "dragged cell has no geometry");
            return self.cancel_with(CancelReason::TargetLost, host);
        };
        let axis = host
            .scrollable()
            .map_or(Axis::Vertical, |scrollable| scrollable.metrics().axis);

        session.accept(rect, axis);
        session.proxy_open = true;
        self.registry.set_dragging(dragged, true);
        host.request_repaint(Repaint::Item(dragged));

        let query = gap_query(session);
        self.gap.seed(&query, &mut self.registry, &*host);
        host.open_proxy(&snapshot(session, self.decorator.as_ref()));

        tracing::debug!(target: "gridshift.reorder", session = %id, %dragged, "drag accepted");
        ReorderEffect::Accepted {
            session: id,
            dragged,
        }
    }

    fn drag_to(&mut self, position: Point, host: &mut dyn ReorderHost) -> ReorderEffect {
        let Some(session) = self.session.as_mut() else {
            return ReorderEffect::Noop {
                reason: NoopReason::Idle,
            };
        };
        session.update_pointer(position);
        host.request_repaint(Repaint::Proxy);

        let outcome = self.gap.resolve(
            &gap_query(session),
            &mut session.insert,
            &mut self.registry,
            &*host,
            &self.shape,
            true,
        );
        let (id, insert, proxy_rect) = (session.id, session.insert, session.proxy_rect());
        if let Some(scrollable) = host.scrollable() {
            self.autoscroll.maybe_start(proxy_rect, &*scrollable);
        }

        match outcome {
            GapOutcome::Changed {
                previous, insert, ..
            } => {
                host.request_repaint(Repaint::Grid);
                ReorderEffect::InsertChanged {
                    session: id,
                    previous,
                    insert,
                }
            }
            GapOutcome::Unchanged => ReorderEffect::Moved {
                session: id,
                insert,
            },
        }
    }

    fn after_scroll_step(&mut self, host: &mut dyn ReorderHost) -> Option<ReorderEffect> {
        let session = self.session.as_mut()?;
        if session.phase != SessionPhase::Dragging {
            return None;
        }
        let outcome = self.gap.resolve(
            &gap_query(session),
            &mut session.insert,
            &mut self.registry,
            &*host,
            &self.shape,
            true,
        );
        let (id, proxy_rect) = (session.id, session.proxy_rect());
        if let Some(scrollable) = host.scrollable() {
            self.autoscroll.maybe_start(proxy_rect, &*scrollable);
        }
        match outcome {
            GapOutcome::Changed {
                previous, insert, ..
            } => {
                host.request_repaint(Repaint::Grid);
                Some(ReorderEffect::InsertChanged {
                    session: id,
                    previous,
                    insert,
                })
            }
            GapOutcome::Unchanged => None,
        }
    }

    fn begin_drop(&mut self, host: &mut dyn ReorderHost) -> ReorderEffect {
        self.autoscroll.stop();
        let Some(session) = self.session.as_mut() else {
            return ReorderEffect::Noop {
                reason: NoopReason::Idle,
            };
        };
        let query = gap_query(session);
        let drop = self
            .gap
            .drop_position(&query, &*host, &self.shape)
            .unwrap_or_else(|| session.proxy_origin());
        session.begin_drop(drop);
        host.request_repaint(Repaint::Proxy);
        tracing::debug!(
            target: "gridshift.reorder",
            session = %session.id,
            insert = %session.insert,
            x = drop.x,
            y = drop.y,
            "drop started"
        );
        ReorderEffect::Dropping {
            session: session.id,
            insert: session.insert,
            drop_position: drop,
        }
    }

    fn finalize(&mut self, host: &mut dyn ReorderHost) -> ReorderEffect {
        let Some(session) = self.session.as_ref() else {
            return ReorderEffect::Noop {
                reason: NoopReason::Idle,
            };
        };
        let (id, from, to) = (session.id, session.dragged, session.insert);
        let effect = if from == to {
            tracing::debug!(target: "gridshift.reorder", session = %id, index = %from, "drop settled in place");
            ReorderEffect::Settled {
                session: id,
                index: from,
            }
        } else {
            if let Some(callback) = self.on_reorder.as_mut() {
                callback(from, to);
            }
            tracing::debug!(target: "gridshift.reorder", session = %id, %from, %to, "reorder committed");
            ReorderEffect::Committed {
                session: id,
                reorder: Reorder::new(from, to),
            }
        };
        self.teardown(host);
        effect
    }

    fn cancel_with(&mut self, reason: CancelReason, host: &mut dyn ReorderHost) -> ReorderEffect {
        let Some(session) = self.session.as_mut() else {
            return ReorderEffect::Noop {
                reason: NoopReason::Idle,
            };
        };
        let id = session.id;
        let from = session.phase;
        session.phase = SessionPhase::Cancelled;
        tracing::debug!(target: "gridshift.reorder", session = %id, %from, ?reason, "session cancelled");
        self.teardown(host);
        ReorderEffect::Canceled {
            session: id,
            reason,
        }
    }

    /// Release everything the session holds. No-op without a session.
    fn teardown(&mut self, host: &mut dyn ReorderHost) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let dragged = session.dragged;
        if self.registry.contains(dragged) {
            self.registry.set_dragging(dragged, false);
            host.request_repaint(Repaint::Item(dragged));
        }

        session.proxy.stop();
        self.autoscroll.stop();

        self.registry.reset_offsets();
        host.request_repaint(Repaint::Grid);

        if let Some(mut recognizer) = session.recognizer.take() {
            recognizer.dispose();
        }

        if session.proxy_open {
            session.proxy_open = false;
            host.close_proxy();
        }

        session.drop_position = None;
        let id = session.id;
        self.session = None;
        tracing::trace!(target: "gridshift.reorder", session = %id, "teardown complete");
    }
}

fn gap_query(session: &DragSession) -> GapQuery {
    GapQuery {
        dragged: session.dragged,
        insert: session.insert,
        pointer: session.pointer,
        item_size: session.item_size,
        flow_axis: session.scroll_axis.cross(),
    }
}

fn snapshot(session: &DragSession, decorator: &dyn ProxyDecorator) -> ProxySnapshot {
    let progress = session.proxy.value();
    ProxySnapshot {
        index: session.dragged,
        rect: session.proxy_rect(),
        progress,
        decoration: decorator.decorate(session.dragged, progress),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{ImmediateRecognizer, ThresholdRecognizer};
    use gridshift_core::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Groups stacked as rows of 10×10 cells, no scrolling.
    #[derive(Default)]
    struct Rows {
        groups: Vec<usize>,
        opened: usize,
        closed: usize,
        repaints: Vec<Repaint>,
    }

    impl Rows {
        fn new(groups: &[usize]) -> Self {
            Self {
                groups: groups.to_vec(),
                ..Self::default()
            }
        }
    }

    impl crate::host::GridGeometry for Rows {
        fn slot_rect(&self, index: GridIndex) -> Option<Rect> {
            let count = *self.groups.get(index.group)?;
            (index.item <= count).then(|| {
                Rect::new(index.item as f32 * 10.0, index.group as f32 * 10.0, 10.0, 10.0)
            })
        }

        fn new_group_rect(&self) -> Option<Rect> {
            Some(Rect::new(0.0, self.groups.len() as f32 * 10.0, 40.0, 10.0))
        }
    }

    impl ReorderHost for Rows {
        fn scrollable(&mut self) -> Option<&mut dyn crate::host::Scrollable> {
            None
        }

        fn open_proxy(&mut self, _proxy: &ProxySnapshot) {
            self.opened += 1;
        }

        fn close_proxy(&mut self) {
            self.closed += 1;
        }

        fn request_repaint(&mut self, what: Repaint) {
            self.repaints.push(what);
        }
    }

    type Log = Rc<RefCell<Vec<(GridIndex, GridIndex)>>>;

    fn coordinator(host: &mut Rows) -> (ReorderCoordinator, Log) {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        let mut coordinator = ReorderCoordinator::new(ReorderConfig::instant(), host.groups.clone())
            .expect("valid config")
            .with_on_reorder(move |from, to| sink.borrow_mut().push((from, to)));
        for index in coordinator.shape().clone().indices() {
            coordinator.register_item(index, host);
        }
        (coordinator, log)
    }

    fn at(x: f32, y: f32) -> PointerEvent {
        PointerEvent::at(x, y)
    }

    fn eager() -> Box<dyn DragRecognizer> {
        Box::new(ImmediateRecognizer::on_down())
    }

    fn all_offsets_zero(coordinator: &ReorderCoordinator) -> bool {
        coordinator
            .registry()
            .indices()
            .into_iter()
            .all(|index| coordinator.item_offset(index) == Offset::ZERO)
    }

    #[test]
    fn invalid_start_leaves_state_untouched() {
        let mut host = Rows::new(&[2]);
        let (mut coordinator, _) = coordinator(&mut host);
        let err = coordinator
            .start_item_drag_reorder(GridIndex::new(3, 0), at(0.0, 0.0), eager(), &mut host)
            .unwrap_err();
        assert_eq!(
            err,
            ReorderError::InvalidDragTarget {
                index: GridIndex::new(3, 0)
            }
        );
        assert_eq!(coordinator.phase(), SessionPhase::Idle);
        assert_eq!(host.opened, 0);
        assert!(coordinator.proxy().is_none());
    }

    #[test]
    fn drag_forward_commits_once() {
        let mut host = Rows::new(&[4]);
        let (mut coordinator, log) = coordinator(&mut host);
        let token = coordinator
            .start_item_drag_reorder(GridIndex::new(0, 0), at(5.0, 5.0), eager(), &mut host)
            .expect("start");
        assert_eq!(coordinator.phase(), SessionPhase::Dragging);
        assert!(coordinator.is_item_dragging(GridIndex::new(0, 0)));
        assert_eq!(host.opened, 1);

        let effect = coordinator.pointer_move(token, at(35.0, 5.0), &mut host);
        assert!(matches!(
            effect,
            ReorderEffect::InsertChanged { insert, .. } if insert == GridIndex::new(0, 3)
        ));
        assert_eq!(
            coordinator.item_offset(GridIndex::new(0, 2)),
            Offset::new(-10.0, 0.0)
        );

        let effect = coordinator.pointer_up(token, &mut host);
        assert!(matches!(effect, ReorderEffect::Dropping { drop_position, .. }
            if drop_position == Point::new(30.0, 0.0)));
        assert!(log.borrow().is_empty());

        let outcome = coordinator.tick(Duration::from_millis(16), &mut host);
        assert!(matches!(outcome.effect, Some(ReorderEffect::Committed { .. })));
        assert!(!outcome.needs_frame);
        assert_eq!(
            *log.borrow(),
            vec![(GridIndex::new(0, 0), GridIndex::new(0, 3))]
        );

        assert_eq!(coordinator.phase(), SessionPhase::Idle);
        assert!(all_offsets_zero(&coordinator));
        assert!(!coordinator.is_item_dragging(GridIndex::new(0, 0)));
        assert_eq!(host.closed, 1);

        coordinator.tick(Duration::from_millis(16), &mut host);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn returning_to_origin_settles_without_callback() {
        let mut host = Rows::new(&[4]);
        let (mut coordinator, log) = coordinator(&mut host);
        let token = coordinator
            .start_item_drag_reorder(GridIndex::new(0, 0), at(5.0, 5.0), eager(), &mut host)
            .expect("start");
        coordinator.pointer_move(token, at(35.0, 5.0), &mut host);
        coordinator.pointer_move(token, at(5.0, 5.0), &mut host);
        assert_eq!(coordinator.insert_index(), Some(GridIndex::new(0, 0)));

        coordinator.pointer_up(token, &mut host);
        let outcome = coordinator.tick(Duration::from_millis(16), &mut host);
        assert!(matches!(outcome.effect, Some(ReorderEffect::Settled { .. })));
        assert!(log.borrow().is_empty());
        assert!(all_offsets_zero(&coordinator));
    }

    #[test]
    fn start_then_cancel_resets_everything() {
        let mut host = Rows::new(&[4, 4, 4]);
        let (mut coordinator, log) = coordinator(&mut host);
        let token = coordinator
            .start_item_drag_reorder(GridIndex::new(2, 3), at(35.0, 25.0), eager(), &mut host)
            .expect("start");
        coordinator.pointer_move(token, at(5.0, 25.0), &mut host);

        let effect = coordinator.cancel_reorder(&mut host);
        assert!(matches!(
            effect,
            ReorderEffect::Canceled {
                reason: CancelReason::Explicit,
                ..
            }
        ));
        assert!(all_offsets_zero(&coordinator));
        assert!(log.borrow().is_empty());
        assert_eq!(host.closed, 1);
        assert_eq!(
            coordinator.cancel_reorder(&mut host),
            ReorderEffect::Noop {
                reason: NoopReason::Idle
            }
        );
        assert_eq!(host.closed, 1);
    }

    #[test]
    fn second_start_cancels_first_and_stales_its_token() {
        let mut host = Rows::new(&[3]);
        let (mut coordinator, _) = coordinator(&mut host);
        let first = coordinator
            .start_item_drag_reorder(GridIndex::new(0, 0), at(5.0, 5.0), eager(), &mut host)
            .expect("start");
        let second = coordinator
            .start_item_drag_reorder(GridIndex::new(0, 2), at(25.0, 5.0), eager(), &mut host)
            .expect("restart");
        assert_ne!(first.session, second.session);
        assert!(!coordinator.is_item_dragging(GridIndex::new(0, 0)));
        assert!(coordinator.is_item_dragging(GridIndex::new(0, 2)));
        assert_eq!(
            coordinator.pointer_move(first, at(0.0, 0.0), &mut host),
            ReorderEffect::Noop {
                reason: NoopReason::StaleToken
            }
        );
    }

    #[test]
    fn shape_change_cancels_before_commit() {
        let mut host = Rows::new(&[5, 5]);
        let (mut coordinator, log) = coordinator(&mut host);
        let token = coordinator
            .start_item_drag_reorder(GridIndex::new(0, 0), at(5.0, 5.0), eager(), &mut host)
            .expect("start");
        coordinator.pointer_move(token, at(25.0, 5.0), &mut host);
        coordinator.pointer_up(token, &mut host);

        let effect = coordinator.update_shape([5, 4], &mut host);
        assert!(matches!(
            effect,
            ReorderEffect::Canceled {
                reason: CancelReason::ShapeChanged,
                ..
            }
        ));
        coordinator.tick(Duration::from_millis(16), &mut host);
        assert!(log.borrow().is_empty());
        assert_eq!(coordinator.shape(), &GridShape::from([5, 4]));
    }

    #[test]
    fn release_before_accept_cancels() {
        let mut host = Rows::new(&[2]);
        let (mut coordinator, _) = coordinator(&mut host);
        let token = coordinator
            .start_item_drag_reorder(
                GridIndex::new(0, 0),
                at(5.0, 5.0),
                Box::new(ThresholdRecognizer::new(8.0)),
                &mut host,
            )
            .expect("start");
        assert_eq!(coordinator.phase(), SessionPhase::Starting);
        assert_eq!(
            coordinator.pointer_move(token, at(6.0, 5.0), &mut host),
            ReorderEffect::Noop {
                reason: NoopReason::PendingRecognition
            }
        );
        assert!(matches!(
            coordinator.pointer_up(token, &mut host),
            ReorderEffect::Canceled {
                reason: CancelReason::ReleasedBeforeAccept,
                ..
            }
        ));
        assert_eq!(host.opened, 0);
        assert_eq!(host.closed, 0);
    }

    #[test]
    fn threshold_acceptance_keeps_press_offset() {
        let mut host = Rows::new(&[4]);
        let (mut coordinator, _) = coordinator(&mut host);
        let token = coordinator
            .start_item_drag_reorder(
                GridIndex::new(0, 0),
                at(5.0, 5.0),
                Box::new(ThresholdRecognizer::new(8.0)),
                &mut host,
            )
            .expect("start");
        let effect = coordinator.pointer_move(token, at(25.0, 5.0), &mut host);
        assert!(matches!(effect, ReorderEffect::Accepted { .. }));
        assert_eq!(coordinator.insert_index(), Some(GridIndex::new(0, 2)));
        let proxy = coordinator.proxy().expect("proxy");
        assert_eq!(proxy.rect, Rect::new(20.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn dropping_on_new_group_target() {
        let mut host = Rows::new(&[3, 3]);
        let (mut coordinator, log) = coordinator(&mut host);
        let token = coordinator
            .start_item_drag_reorder(GridIndex::new(1, 1), at(15.0, 15.0), eager(), &mut host)
            .expect("start");
        coordinator.pointer_move(token, at(15.0, 25.0), &mut host);
        assert_eq!(coordinator.insert_index(), Some(GridIndex::new(2, 0)));
        coordinator.pointer_up(token, &mut host);
        coordinator.tick(Duration::from_millis(16), &mut host);
        assert_eq!(
            *log.borrow(),
            vec![(GridIndex::new(1, 1), GridIndex::new(2, 0))]
        );
    }

    #[test]
    fn cell_mounting_mid_drag_is_placed_and_hidden() {
        let mut host = Rows::new(&[4]);
        let (mut coordinator, _) = coordinator(&mut host);
        let token = coordinator
            .start_item_drag_reorder(GridIndex::new(0, 0), at(5.0, 5.0), eager(), &mut host)
            .expect("start");
        coordinator.pointer_move(token, at(35.0, 5.0), &mut host);

        let handle = coordinator
            .registry()
            .lookup(GridIndex::new(0, 2))
            .map(|h| h.id())
            .expect("mounted");
        assert!(coordinator.unregister_item(GridIndex::new(0, 2), handle));
        coordinator.register_item(GridIndex::new(0, 2), &mut host);
        assert_eq!(
            coordinator.item_offset(GridIndex::new(0, 2)),
            Offset::new(-10.0, 0.0)
        );

        coordinator.register_item(GridIndex::new(0, 0), &mut host);
        assert!(coordinator.item_visual(GridIndex::new(0, 0)).dragging);
    }

    #[test]
    fn cell_key_carries_session() {
        let mut host = Rows::new(&[2]);
        let (mut coordinator, _) = coordinator(&mut host);
        let idle = coordinator.cell_key("a", GridIndex::new(0, 0));
        assert_eq!(idle.session, None);
        let token = coordinator
            .start_item_drag_reorder(GridIndex::new(0, 0), at(5.0, 5.0), eager(), &mut host)
            .expect("start");
        let dragging = coordinator.cell_key("a", GridIndex::new(0, 0));
        assert_eq!(dragging.session, Some(token.session));
        assert_ne!(idle, dragging);
    }

    #[test]
    fn decorator_hook_is_used() {
        let mut host = Rows::new(&[2]);
        let (coordinator, _) = coordinator(&mut host);
        let mut coordinator = coordinator.with_decorator(|_: GridIndex, _: f32| ProxyDecoration {
            elevation: 42.0,
            ..ProxyDecoration::default()
        });
        coordinator
            .start_item_drag_reorder(GridIndex::new(0, 0), at(5.0, 5.0), eager(), &mut host)
            .expect("start");
        let decorated = coordinator.decorate_proxy("card").expect("proxy shown");
        assert_eq!(decorated.decoration.elevation, 42.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ReorderConfig::default();
        config.autoscroll.coefficient = -1.0;
        assert!(matches!(
            ReorderCoordinator::new(config, [1]),
            Err(ReorderError::InvalidConfig { .. })
        ));
    }
}
