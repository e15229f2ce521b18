//! Engine facade: the single write path to the surface.
//!
//! [`GridEngine`] owns the surface together with the reconciler, the gesture
//! controller and the mode controller. Model changes, gestures, imperative
//! calls and mode switches all go through it, one at a time, so no two
//! writers ever race on the surface.
//!
//! # Data Flow
//!
//! ```text
//! GridModel --reconcile--> surface
//! pointer   --gesture----> surface --end_gesture--> LayoutChanged --> persistence
//! ```
//!
//! Listeners receive events synchronously and cannot call back into the
//! engine while it is dispatching.

use std::collections::BTreeMap;

use tracing::{debug, info, info_span, warn};

use crate::compact;
use crate::config::GridConfig;
use crate::error::{GestureError, GridConfigError, GridError};
use crate::events::{EventBus, GridEvent, ListenerId};
use crate::geometry::GridRect;
use crate::interaction::{
    DeferredWrite, FinishedGesture, GestureKind, InteractionController, InteractionState,
};
use crate::mode::{DragAffordance, Mode, ModeController, ModeTransition};
use crate::model::GridItem;
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::surface::{BatchGuard, GridSurface, NativeEvent};

/// Imperative capability handed to hosts (toolbars, widget pickers).
pub trait GridHandle {
    fn add_item(&mut self, item: GridItem) -> Result<GridRect, GridError>;
    fn remove_item(&mut self, id: &str) -> Result<(), GridError>;
    fn remove_all(&mut self) -> Result<usize, GridError>;
    fn set_interactive(&mut self, enabled: bool) -> Result<(), GridError>;
    fn snapshot(&self) -> Vec<GridItem>;
    /// Auto-arrange and emit `LayoutChanged`.
    fn compact(&mut self) -> Result<Vec<GridItem>, GridError>;
}

type SurfaceFactory<S> = Box<dyn FnMut(&GridConfig) -> S>;

pub struct GridEngine<S: GridSurface> {
    config: GridConfig,
    surface: S,
    reconciler: Reconciler,
    interactions: InteractionController,
    mode: ModeController,
    events: EventBus,
    rebuild: Option<SurfaceFactory<S>>,
    torn_down: bool,
}

impl<S: GridSurface> GridEngine<S> {
    /// Validate `config` and take ownership of `surface`.
    pub fn new(config: GridConfig, mut surface: S) -> Result<Self, GridConfigError> {
        config.validate()?;
        let mode = config.initial_mode();
        surface.set_static(mode.is_static());
        surface.set_animate(config.animate_in(mode));
        debug!(columns = config.columns, ?mode, policy = %config.float_policy, "grid engine created");
        Ok(Self {
            config,
            surface,
            reconciler: Reconciler::new(),
            interactions: InteractionController::new(),
            mode: ModeController::new(mode),
            events: EventBus::new(),
            rebuild: None,
            torn_down: false,
        })
    }

    /// Factory used when the surface cannot toggle interactivity live.
    #[must_use]
    pub fn with_rebuild<F>(mut self, factory: F) -> Self
    where
        F: FnMut(&GridConfig) -> S + 'static,
    {
        self.rebuild = Some(Box::new(factory));
        self
    }

    #[must_use]
    pub fn with_affordance(mut self, affordance: DragAffordance) -> Self {
        self.mode = self.mode.clone().with_affordance(affordance);
        self
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Rects the reconciler considers applied.
    pub fn applied(&self) -> &BTreeMap<String, GridRect> {
        self.reconciler.applied()
    }

    pub fn interaction_state(&self, id: &str) -> InteractionState {
        self.interactions.state(id)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GridEvent) + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.events.len()
    }

    fn ensure_live(&self) -> Result<(), GridError> {
        if self.torn_down {
            Err(GridError::TornDown)
        } else {
            Ok(())
        }
    }

    fn ensure_editable(&self) -> Result<(), GridError> {
        self.ensure_live()?;
        if self.mode().is_static() {
            return Err(GestureError::StaticMode.into());
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Model → surface
    // ---------------------------------------------------------------------

    /// Bring the surface in line with `desired`.
    pub fn reconcile(&mut self, desired: &[GridItem]) -> Result<ReconcileReport, GridError> {
        self.ensure_live()?;
        let report = self
            .reconciler
            .apply(&mut self.surface, &mut self.interactions, desired);
        self.forward_native();
        Ok(report)
    }

    /// Forward registration events the surface produced on its own.
    ///
    /// In `Editable` mode a non-empty batch is treated as a user edit and
    /// emits one `LayoutChanged`.
    pub fn pump_native_events(&mut self) -> Result<usize, GridError> {
        self.ensure_live()?;
        let forwarded = self.forward_native();
        if forwarded > 0 && self.mode().is_editable() {
            self.commit_layout();
        }
        Ok(forwarded)
    }

    fn forward_native(&mut self) -> usize {
        let native = self.surface.take_native_events();
        for event in &native {
            let event = match event {
                NativeEvent::Added(id) => GridEvent::SurfaceItemAdded(id.clone()),
                NativeEvent::Removed(id) => GridEvent::SurfaceItemRemoved(id.clone()),
            };
            self.events.emit(&event);
        }
        native.len()
    }

    /// Adopt the surface state as canonical and announce it.
    fn commit_layout(&mut self) -> Vec<GridItem> {
        let snapshot = self.surface.snapshot();
        if self.interactions.any_active() {
            self.adopt_settled();
        } else {
            self.reconciler.record(&snapshot);
        }
        self.events
            .emit(&GridEvent::LayoutChanged(snapshot.clone()));
        snapshot
    }

    /// Record where settling left every item that is not under a pointer.
    fn adopt_settled(&mut self) {
        let settled: Vec<GridItem> = self
            .surface
            .snapshot()
            .into_iter()
            .filter(|item| !self.interactions.is_interacting(&item.id))
            .collect();
        self.reconciler.merge(&settled);
    }

    /// Make the settled layout the restore point of every gesture still open.
    fn rebase_open_gestures(&mut self) {
        if !self.interactions.any_active() {
            return;
        }
        for item in self.surface.snapshot() {
            if !self.interactions.is_interacting(&item.id) {
                self.interactions.rebase(&item.id, item.rect);
            }
        }
    }

    /// Ids under a pointer, other than `anchor`.
    fn held_except(&self, anchor: Option<&str>) -> Vec<String> {
        self.interactions
            .active_ids()
            .into_iter()
            .filter(|id| Some(id.as_str()) != anchor)
            .collect()
    }

    // ---------------------------------------------------------------------
    // Gestures
    // ---------------------------------------------------------------------

    pub fn begin_gesture(&mut self, id: &str, kind: GestureKind) -> Result<(), GridError> {
        self.ensure_editable()?;
        let item = self
            .surface
            .item(id)
            .ok_or_else(|| GestureError::UnknownItem { id: id.to_owned() })?;
        if item.locked {
            return Err(GestureError::ItemLocked { id: id.to_owned() }.into());
        }
        let baseline = self.surface.snapshot();
        let sequence = self.interactions.begin(id, kind, item.rect, baseline)?;
        debug!(item = %id, ?kind, sequence, "gesture started");
        self.events.emit(&GridEvent::ItemInteractionStarted {
            id: id.to_owned(),
            kind,
        });
        Ok(())
    }

    /// Start a drag from a pointer-down on `hit_path` (innermost region first).
    pub fn begin_drag_at(&mut self, id: &str, hit_path: &[&str]) -> Result<(), GridError> {
        self.ensure_editable()?;
        if !self.mode.affordance().allows_drag_start(hit_path) {
            return Err(GestureError::OutsideHandle { id: id.to_owned() }.into());
        }
        self.begin_gesture(id, GestureKind::Drag)
    }

    /// Intermediate drag frame. Moves the item; emits nothing.
    pub fn drag_to(&mut self, id: &str, x: u16, y: u16) -> Result<GridRect, GridError> {
        let current = self.gesture_rect(id, GestureKind::Drag)?;
        self.move_live(id, current.with_position(x, y))
    }

    /// Intermediate resize frame. Resizes the item; emits nothing.
    pub fn resize_to(&mut self, id: &str, w: u16, h: u16) -> Result<GridRect, GridError> {
        let current = self.gesture_rect(id, GestureKind::Resize)?;
        self.move_live(id, current.with_size(w, h))
    }

    fn gesture_rect(&self, id: &str, kind: GestureKind) -> Result<GridRect, GridError> {
        self.ensure_live()?;
        match self.interactions.kind_of(id) {
            None => return Err(GestureError::NotInteracting { id: id.to_owned() }.into()),
            Some(active) if active != kind => {
                return Err(GestureError::KindMismatch { id: id.to_owned() }.into());
            }
            Some(_) => {}
        }
        self.surface
            .item(id)
            .map(|item| item.rect)
            .ok_or_else(|| GridError::UnknownItem { id: id.to_owned() })
    }

    /// Write one frame and push colliding neighbours out of the way.
    ///
    /// Items held by other gestures are obstacles, never pushed.
    fn move_live(&mut self, id: &str, rect: GridRect) -> Result<GridRect, GridError> {
        let held = self.held_except(Some(id));
        let mut batch = BatchGuard::new(&mut self.surface);
        batch
            .update_widget(id, rect)
            .ok_or_else(|| GridError::UnknownItem { id: id.to_owned() })?;
        batch.settle(Some(id), &held);
        batch
            .item(id)
            .map(|item| item.rect)
            .ok_or_else(|| GridError::UnknownItem { id: id.to_owned() })
    }

    /// Commit the gesture on `id`.
    ///
    /// Replays writes that were queued meanwhile, settles the whole grid
    /// around the committed item (model writes that landed mid-gesture may
    /// overlap it), then reads the full surface snapshot, makes it the
    /// applied state and emits exactly one `LayoutChanged`. Items held by
    /// other gestures stay where their pointers put them, and the settled
    /// layout becomes those gestures' restore point.
    pub fn end_gesture(&mut self, id: &str) -> Result<Vec<GridItem>, GridError> {
        self.ensure_live()?;
        let finished = self.interactions.finish(id)?;
        debug!(item = %id, kind = ?finished.kind, "gesture committed");
        let held = self.held_except(None);
        {
            let mut batch = BatchGuard::new(&mut self.surface);
            self.reconciler.replay(&mut *batch, id, finished.deferred);
            let anchor = batch.item(id).map(|_| id);
            batch.settle(anchor, &held);
        }
        self.rebase_open_gestures();
        self.forward_native();
        self.events.emit(&GridEvent::ItemInteractionEnded {
            id: id.to_owned(),
            kind: finished.kind,
            committed: true,
        });
        Ok(self.commit_layout())
    }

    /// Abort the gesture on `id` and put the pre-gesture layout back.
    pub fn cancel_gesture(&mut self, id: &str) -> Result<(), GridError> {
        self.ensure_live()?;
        let finished = self.interactions.finish(id)?;
        self.settle_cancelled(finished);
        Ok(())
    }

    /// Put the baseline back for every item not held by another gesture,
    /// replay queued writes, and settle around the cancelled item.
    fn settle_cancelled(&mut self, finished: FinishedGesture) {
        debug!(item = %finished.id, kind = ?finished.kind, "gesture cancelled");
        let held = self.held_except(None);
        let baseline: Vec<GridItem> = finished
            .baseline
            .into_iter()
            .filter(|item| !held.contains(&item.id))
            .collect();
        {
            let mut batch = BatchGuard::new(&mut self.surface);
            batch.restore(&baseline);
            self.reconciler
                .replay(&mut *batch, &finished.id, finished.deferred);
            let anchor = batch.item(&finished.id).map(|_| finished.id.as_str());
            batch.settle(anchor, &held);
        }
        self.adopt_settled();
        self.rebase_open_gestures();
        self.events.emit(&GridEvent::ItemInteractionEnded {
            id: finished.id,
            kind: finished.kind,
            committed: false,
        });
        self.forward_native();
    }

    /// Newest gesture first, so each baseline is restored over the frames of
    /// the gestures that started after it.
    fn cancel_all_gestures(&mut self) {
        for finished in self.interactions.finish_all().into_iter().rev() {
            self.settle_cancelled(finished);
        }
    }

    // ---------------------------------------------------------------------
    // Mode
    // ---------------------------------------------------------------------

    /// Switch between `Editable` and `Static`, preserving every rect.
    ///
    /// In-flight gestures are cancelled first. Surfaces that cannot toggle
    /// live are rebuilt through the factory given to
    /// [`with_rebuild`](Self::with_rebuild).
    pub fn set_mode(&mut self, to: Mode) -> Result<(), GridError> {
        self.ensure_live()?;
        let _span = info_span!("mode_transition", from = ?self.mode(), ?to).entered();
        match self.mode.plan(to, self.surface.supports_live_toggle()) {
            ModeTransition::Unchanged => return Ok(()),
            ModeTransition::LiveToggle { to } => {
                self.cancel_all_gestures();
                self.surface.set_static(to.is_static());
                self.surface.set_animate(self.config.animate_in(to));
            }
            ModeTransition::Rebuild { to } => {
                if self.rebuild.is_none() {
                    return Err(GridError::RebuildUnavailable);
                }
                self.cancel_all_gestures();
                self.rebuild_surface(to)?;
            }
        }
        self.config.editable = to.is_editable();
        self.mode.commit(to);
        info!(mode = ?to, "grid mode changed");
        Ok(())
    }

    fn rebuild_surface(&mut self, to: Mode) -> Result<(), GridError> {
        let snapshot = self.surface.snapshot();
        let mut config = self.config.clone();
        config.editable = to.is_editable();
        let Some(factory) = self.rebuild.as_mut() else {
            return Err(GridError::RebuildUnavailable);
        };
        let mut fresh = factory(&config);
        fresh.set_static(to.is_static());
        fresh.set_animate(config.animate_in(to));
        {
            let mut batch = BatchGuard::new(&mut fresh);
            for item in &snapshot {
                if let Err(err) = batch.add_widget(item) {
                    warn!(item = %item.id, error = %err, "item not rebound after rebuild");
                    self.reconciler.forget(&item.id);
                }
            }
        }
        // Registration noise from rebinding is not a layout change.
        let _ = fresh.take_native_events();
        self.surface.destroy();
        self.surface = fresh;
        info!(items = snapshot.len(), "surface rebuilt");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------------

    /// Detach every listener, drop gestures, and destroy the surface.
    ///
    /// Idempotent. Every later call returns [`GridError::TornDown`].
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let detached = self.events.clear();
        let abandoned = self.interactions.finish_all().len();
        self.surface.destroy();
        self.rebuild = None;
        self.torn_down = true;
        debug!(detached, abandoned, "grid engine torn down");
    }
}

impl<S: GridSurface> Drop for GridEngine<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<S: GridSurface> GridHandle for GridEngine<S> {
    fn add_item(&mut self, item: GridItem) -> Result<GridRect, GridError> {
        self.ensure_live()?;
        let held = self.held_except(None);
        let rect = {
            let mut batch = BatchGuard::new(&mut self.surface);
            let placed = batch.add_widget(&item)?;
            batch.settle(Some(&item.id), &held);
            batch.item(&item.id).map_or(placed, |settled| settled.rect)
        };
        // Neighbours may have been pushed; the applied state must follow them.
        self.adopt_settled();
        self.forward_native();
        if self.mode().is_editable() {
            self.commit_layout();
        }
        Ok(rect)
    }

    fn remove_item(&mut self, id: &str) -> Result<(), GridError> {
        self.ensure_live()?;
        if self.interactions.defer(id, DeferredWrite::Remove) {
            debug!(item = %id, "remove deferred behind gesture");
            return Ok(());
        }
        if !self.surface.remove_widget(id) {
            return Err(GridError::UnknownItem { id: id.to_owned() });
        }
        self.reconciler.forget(id);
        self.forward_native();
        if self.mode().is_editable() {
            self.commit_layout();
        }
        Ok(())
    }

    fn remove_all(&mut self) -> Result<usize, GridError> {
        self.ensure_live()?;
        self.cancel_all_gestures();
        let ids: Vec<String> = self
            .surface
            .snapshot()
            .into_iter()
            .map(|item| item.id)
            .collect();
        {
            let mut batch = BatchGuard::new(&mut self.surface);
            for id in &ids {
                batch.remove_widget(id);
            }
        }
        self.reconciler.clear();
        self.forward_native();
        if self.mode().is_editable() {
            self.commit_layout();
        }
        Ok(ids.len())
    }

    fn set_interactive(&mut self, enabled: bool) -> Result<(), GridError> {
        self.set_mode(if enabled { Mode::Editable } else { Mode::Static })
    }

    fn snapshot(&self) -> Vec<GridItem> {
        self.surface.snapshot()
    }

    fn compact(&mut self) -> Result<Vec<GridItem>, GridError> {
        self.ensure_live()?;
        if let Some(id) = self.interactions.active_ids().into_iter().next() {
            return Err(GestureError::InFlight { id }.into());
        }
        let packed = compact::compact(&self.surface.snapshot(), self.config.columns);
        {
            let mut batch = BatchGuard::new(&mut self.surface);
            batch.restore(&packed);
        }
        debug!(items = packed.len(), "layout compacted");
        Ok(self.commit_layout())
    }
}
