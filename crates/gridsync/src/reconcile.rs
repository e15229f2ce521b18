//! Declarative-to-surface reconciliation.
//!
//! The [`Reconciler`] remembers the rect it last applied for every id
//! (`P`). Given a desired item list (`D`) it plans
//!
//! - `remove = P \ D`
//! - `add = D \ P`
//! - `update = { id in P ∩ D : rect(P, id) != rect(D, id) }`
//!
//! and applies the whole plan inside one [`BatchGuard`], so the surface
//! recalculates layout once per pass regardless of how many operations ran.
//!
//! # Failure Modes
//!
//! - An add the surface refuses is logged and skipped. It stays out of `P`,
//!   so the next pass plans it again.
//! - An update for an id the surface lost is treated the same way: the id
//!   leaves `P` and is re-added next pass.
//! - Writes aimed at an item with a gesture in flight are queued on the
//!   [`InteractionController`] and replayed when the gesture ends. Writes to
//!   idle items land immediately and are carried into every open gesture
//!   baseline.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, debug_span, warn};

use crate::geometry::GridRect;
use crate::interaction::{DeferredWrite, InteractionController};
use crate::model::GridItem;
use crate::surface::{BatchGuard, GridSurface};

/// Operations needed to move the surface from `P` to `D`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub add: Vec<GridItem>,
    pub update: Vec<GridItem>,
    pub remove: Vec<String>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.update.is_empty() && self.remove.is_empty()
    }

    pub fn len(&self) -> usize {
        self.add.len() + self.update.len() + self.remove.len()
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    /// Ids whose write failed and will be retried.
    pub skipped: Vec<String>,
    /// Writes queued behind an in-flight gesture.
    pub deferred: usize,
    /// Layout recalculations the pass caused on the surface.
    pub relayouts: u64,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.added == 0
            && self.updated == 0
            && self.removed == 0
            && self.skipped.is_empty()
            && self.deferred == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    applied: BTreeMap<String, GridRect>,
    passes: u64,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last applied rect per id.
    pub fn applied(&self) -> &BTreeMap<String, GridRect> {
        &self.applied
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Diff `desired` against the applied state.
    ///
    /// Adds and updates follow `desired` order; removals are sorted by id.
    /// A repeated id in `desired` is ignored after its first occurrence.
    pub fn plan(&self, desired: &[GridItem]) -> ReconcilePlan {
        let mut plan = ReconcilePlan::default();
        let mut wanted = BTreeSet::new();
        for item in desired {
            if !wanted.insert(item.id.as_str()) {
                warn!(item = %item.id, "duplicate id in desired layout; ignoring repeat");
                continue;
            }
            match self.applied.get(&item.id) {
                None => plan.add.push(item.clone()),
                Some(rect) if *rect != item.rect => plan.update.push(item.clone()),
                Some(_) => {}
            }
        }
        plan.remove = self
            .applied
            .keys()
            .filter(|id| !wanted.contains(id.as_str()))
            .cloned()
            .collect();
        plan
    }

    /// Plan and apply `desired` in a single batch.
    pub fn apply<S: GridSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        interactions: &mut InteractionController,
        desired: &[GridItem],
    ) -> ReconcileReport {
        self.passes += 1;
        let _span = debug_span!("reconcile", pass = self.passes).entered();
        let plan = self.plan(desired);
        let mut report = ReconcileReport::default();
        if plan.is_empty() {
            return report;
        }

        let before = surface.relayout_count();
        {
            let mut batch = BatchGuard::new(surface);
            for id in plan.remove {
                if interactions.defer(&id, DeferredWrite::Remove) {
                    debug!(item = %id, "remove deferred behind gesture");
                    report.deferred += 1;
                    continue;
                }
                batch.remove_widget(&id);
                self.applied.remove(&id);
                report.removed += 1;
            }
            for item in plan.add {
                match batch.add_widget(&item) {
                    Ok(_) => {
                        self.applied.insert(item.id, item.rect);
                        report.added += 1;
                    }
                    Err(err) => {
                        warn!(item = %item.id, error = %err, "add skipped; retrying next pass");
                        report.skipped.push(item.id);
                    }
                }
            }
            for item in plan.update {
                if interactions.is_interacting(&item.id) {
                    debug!(item = %item.id, "update deferred behind gesture");
                    let id = item.id.clone();
                    interactions.defer(&id, DeferredWrite::Update(item));
                    report.deferred += 1;
                    continue;
                }
                if let Some(placed) = batch.update_widget(&item.id, item.rect) {
                    interactions.rebase(&item.id, placed);
                    self.applied.insert(item.id, item.rect);
                    report.updated += 1;
                } else {
                    warn!(item = %item.id, "surface lost item; re-adding next pass");
                    self.applied.remove(&item.id);
                    report.skipped.push(item.id);
                }
            }
        }
        report.relayouts = surface.relayout_count() - before;
        debug!(
            added = report.added,
            updated = report.updated,
            removed = report.removed,
            skipped = report.skipped.len(),
            deferred = report.deferred,
            "reconcile pass applied"
        );
        report
    }

    /// Replay writes that were queued behind a gesture on `id`.
    pub fn replay<S: GridSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        id: &str,
        writes: Vec<DeferredWrite>,
    ) -> usize {
        if writes.is_empty() {
            return 0;
        }
        let mut batch = BatchGuard::new(surface);
        let mut replayed = 0;
        for write in writes {
            match write {
                DeferredWrite::Update(item) => {
                    if batch.update_widget(id, item.rect).is_some() {
                        self.applied.insert(id.to_owned(), item.rect);
                        replayed += 1;
                    }
                }
                DeferredWrite::Remove => {
                    if batch.remove_widget(id) {
                        replayed += 1;
                    }
                    self.applied.remove(id);
                }
            }
        }
        debug!(item = %id, replayed, "deferred writes replayed");
        replayed
    }

    /// Adopt an authoritative layout as the applied state.
    pub fn record(&mut self, items: &[GridItem]) {
        self.applied = items
            .iter()
            .map(|item| (item.id.clone(), item.rect))
            .collect();
    }

    /// Overwrite the applied rect of each of `items`, keeping every other entry.
    pub fn merge(&mut self, items: &[GridItem]) {
        for item in items {
            self.applied.insert(item.id.clone(), item.rect);
        }
    }

    pub fn forget(&mut self, id: &str) -> bool {
        self.applied.remove(id).is_some()
    }

    pub fn clear(&mut self) {
        self.applied.clear();
    }
}
