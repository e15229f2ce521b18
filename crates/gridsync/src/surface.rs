//! Boundary to the imperative grid surface.
//!
//! [`GridSurface`] is the long-lived, mutable widget grid the engine drives:
//! it tracks registrations, resolves collisions, and recalculates layout.
//! Everything above it (reconciliation, gestures, mode switches) talks to the
//! surface only through this trait.
//!
//! Writes place items exactly where they are asked to go. Collision
//! resolution is a separate step, [`GridSurface::settle`], which the engine
//! runs after interactive moves and imperative adds. Canonical model writes
//! are never rearranged behind the model's back.
//!
//! # Batching
//!
//! `begin_update`/`end_update` nest by count. Mutations made while the depth
//! is non-zero mark the surface dirty; the single relayout fires when the
//! outermost batch closes. [`BatchGuard`] pairs the two calls so the batch is
//! closed on every exit path, including unwinding.
//!
//! [`VirtualSurface`] is the in-memory implementation used by headless
//! display canvases and by the test suite.

use std::ops::{Deref, DerefMut};

use rustc_hash::FxHashSet;
use tracing::{trace, warn};

use crate::config::{FloatPolicy, GridConfig};
use crate::error::ItemBindingError;
use crate::geometry::GridRect;
use crate::model::GridItem;

/// Registration change reported by the surface itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    Added(String),
    Removed(String),
}

/// The imperative grid library the engine reconciles against.
pub trait GridSurface {
    /// Suspend relayout. Nests.
    fn begin_update(&mut self);

    /// Resume relayout; recalculates once when the outermost batch closes.
    fn end_update(&mut self);

    /// Register an item so it takes part in collision detection.
    ///
    /// Returns the rect after clamping to bounds and columns.
    fn add_widget(&mut self, item: &GridItem) -> Result<GridRect, ItemBindingError>;

    /// Deregister an item. Rendered content is left to its owner.
    fn remove_widget(&mut self, id: &str) -> bool;

    /// Move/resize a registered item. `None` if the id is unknown.
    fn update_widget(&mut self, id: &str, rect: GridRect) -> Option<GridRect>;

    /// Put known items back at the given rects.
    fn restore(&mut self, items: &[GridItem]);

    /// Resolve overlaps under the configured float policy, giving `anchor`
    /// priority over every other unlocked item.
    ///
    /// Items in `held` are under a pointer. Like locked items they are never
    /// moved; everything else is moved clear of them.
    fn settle(&mut self, anchor: Option<&str>, held: &[String]);

    fn item(&self, id: &str) -> Option<GridItem>;

    fn set_static(&mut self, static_grid: bool);

    fn set_animate(&mut self, animate: bool);

    /// Whether interactivity can be toggled on a live instance.
    fn supports_live_toggle(&self) -> bool {
        true
    }

    /// Every registered item, in registration order.
    fn snapshot(&self) -> Vec<GridItem>;

    /// Drain registration events produced since the last call.
    fn take_native_events(&mut self) -> Vec<NativeEvent>;

    /// Number of layout recalculations performed so far.
    fn relayout_count(&self) -> u64;

    /// Drop all registrations and release the instance.
    fn destroy(&mut self);
}

/// Open batch on a surface; closes it on drop.
pub struct BatchGuard<'a, S: GridSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: GridSurface + ?Sized> BatchGuard<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        surface.begin_update();
        Self { surface }
    }
}

impl<S: GridSurface + ?Sized> Deref for BatchGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: GridSurface + ?Sized> DerefMut for BatchGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: GridSurface + ?Sized> Drop for BatchGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.end_update();
    }
}

/// In-memory grid surface with downward collision resolution.
///
/// Under [`FloatPolicy::CollisionAvoid`], [`settle`](GridSurface::settle)
/// keeps locked and held items where they are, places the anchor next (moved down
/// past any locked item it hits), then the remaining items in `(y, x)` order,
/// each moved down just far enough to clear everything already placed.
/// Items never move up on their own; gap removal is the compactor's job.
#[derive(Debug, Clone)]
pub struct VirtualSurface {
    columns: u16,
    float_policy: FloatPolicy,
    items: Vec<GridItem>,
    batch_depth: u32,
    pending_relayout: bool,
    relayouts: u64,
    static_grid: bool,
    animate: bool,
    live_toggle: bool,
    require_targets: bool,
    targets: FxHashSet<String>,
    native: Vec<NativeEvent>,
    destroyed: bool,
}

impl VirtualSurface {
    pub fn new(config: &GridConfig) -> Self {
        Self {
            columns: config.columns,
            float_policy: config.float_policy,
            items: Vec::new(),
            batch_depth: 0,
            pending_relayout: false,
            relayouts: 0,
            static_grid: !config.editable,
            animate: config.animate_in(config.initial_mode()),
            live_toggle: true,
            require_targets: false,
            targets: FxHashSet::default(),
            native: Vec::new(),
            destroyed: false,
        }
    }

    /// Refuse to bind items whose render target has not been mounted.
    #[must_use]
    pub fn with_render_targets(mut self) -> Self {
        self.require_targets = true;
        self
    }

    /// Behave like a library that cannot toggle interactivity live.
    #[must_use]
    pub fn without_live_toggle(mut self) -> Self {
        self.live_toggle = false;
        self
    }

    pub fn mount_target(&mut self, id: impl Into<String>) {
        self.targets.insert(id.into());
    }

    pub fn unmount_target(&mut self, id: &str) -> bool {
        self.targets.remove(id)
    }

    pub fn is_static(&self) -> bool {
        self.static_grid
    }

    pub fn animates(&self) -> bool {
        self.animate
    }

    pub fn batch_depth(&self) -> u32 {
        self.batch_depth
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn request_relayout(&mut self) {
        if self.batch_depth > 0 {
            self.pending_relayout = true;
        } else {
            self.relayouts += 1;
            trace!(relayouts = self.relayouts, "surface relayout");
        }
    }

    /// Resolve collisions. `anchor` is placed before every other movable item.
    /// Returns whether any item moved.
    fn resolve_collisions(&mut self, anchor: Option<usize>, held: &[String]) -> bool {
        if self.float_policy == FloatPolicy::Free {
            return false;
        }
        let fixed = |item: &GridItem| item.locked || held.iter().any(|id| *id == item.id);
        let mut order: Vec<usize> = (0..self.items.len())
            .filter(|&i| Some(i) != anchor)
            .collect();
        order.sort_by_key(|&i| {
            let item = &self.items[i];
            (!fixed(item), item.rect.y, item.rect.x, i)
        });
        let split = order.partition_point(|&i| fixed(&self.items[i]));

        let mut placed: Vec<GridRect> = order[..split]
            .iter()
            .map(|&i| self.items[i].rect)
            .collect();
        let mut moved = false;
        if let Some(anchor) = anchor {
            moved |= self.drop_into(anchor, &mut placed);
        }
        for &i in &order[split..] {
            moved |= self.drop_into(i, &mut placed);
        }
        moved
    }

    fn drop_into(&mut self, index: usize, placed: &mut Vec<GridRect>) -> bool {
        let mut rect = self.items[index].rect;
        while let Some(bottom) = placed
            .iter()
            .filter(|p| p.intersects(&rect))
            .map(GridRect::bottom)
            .max()
        {
            rect.y = bottom;
        }
        placed.push(rect);
        let moved = self.items[index].rect != rect;
        self.items[index].rect = rect;
        moved
    }
}

impl GridSurface for VirtualSurface {
    fn begin_update(&mut self) {
        self.batch_depth += 1;
    }

    fn end_update(&mut self) {
        if self.batch_depth == 0 {
            warn!("end_update without matching begin_update");
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 && self.pending_relayout {
            self.pending_relayout = false;
            self.relayouts += 1;
            trace!(relayouts = self.relayouts, "surface relayout (batched)");
        }
    }

    fn add_widget(&mut self, item: &GridItem) -> Result<GridRect, ItemBindingError> {
        if self.destroyed {
            return Err(ItemBindingError::SurfaceDestroyed {
                id: item.id.clone(),
            });
        }
        if self.index_of(&item.id).is_some() {
            return Err(ItemBindingError::DuplicateId {
                id: item.id.clone(),
            });
        }
        if self.require_targets && !self.targets.contains(&item.id) {
            return Err(ItemBindingError::MissingRenderTarget {
                id: item.id.clone(),
            });
        }
        let item = item.normalized(self.columns, self.float_policy);
        let rect = item.rect;
        self.native.push(NativeEvent::Added(item.id.clone()));
        self.items.push(item);
        self.request_relayout();
        Ok(rect)
    }

    fn remove_widget(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.items.remove(index);
        self.native.push(NativeEvent::Removed(id.to_owned()));
        self.request_relayout();
        true
    }

    fn update_widget(&mut self, id: &str, rect: GridRect) -> Option<GridRect> {
        let index = self.index_of(id)?;
        let target = self.items[index]
            .clone()
            .with_rect(rect)
            .normalized(self.columns, self.float_policy)
            .rect;
        if target == self.items[index].rect {
            return Some(target);
        }
        self.items[index].rect = target;
        self.request_relayout();
        Some(target)
    }

    fn restore(&mut self, items: &[GridItem]) {
        let mut changed = false;
        for wanted in items {
            if let Some(index) = self.index_of(&wanted.id) {
                if self.items[index].rect != wanted.rect {
                    self.items[index].rect = wanted.rect;
                    changed = true;
                }
            }
        }
        if changed {
            self.request_relayout();
        }
    }

    fn settle(&mut self, anchor: Option<&str>, held: &[String]) {
        let anchor = anchor.and_then(|id| self.index_of(id));
        if self.resolve_collisions(anchor, held) {
            self.request_relayout();
        }
    }

    fn item(&self, id: &str) -> Option<GridItem> {
        self.items.iter().find(|item| item.id == id).cloned()
    }

    fn set_static(&mut self, static_grid: bool) {
        self.static_grid = static_grid;
    }

    fn set_animate(&mut self, animate: bool) {
        self.animate = animate;
    }

    fn supports_live_toggle(&self) -> bool {
        self.live_toggle
    }

    fn snapshot(&self) -> Vec<GridItem> {
        self.items.clone()
    }

    fn take_native_events(&mut self) -> Vec<NativeEvent> {
        std::mem::take(&mut self.native)
    }

    fn relayout_count(&self) -> u64 {
        self.relayouts
    }

    fn destroy(&mut self) {
        self.items.clear();
        self.native.clear();
        self.batch_depth = 0;
        self.pending_relayout = false;
        self.destroyed = true;
    }
}
