//! Per-item gesture lifecycle.
//!
//! ```text
//! Idle -> Interacting -> Idle (commit or cancel)
//! ```
//!
//! While an item is `Interacting`, reconciliation writes aimed at it are
//! queued here instead of being applied, so the engine never fights the
//! pointer. The queue is handed back, in arrival order, when the gesture
//! finishes.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::GestureError;
use crate::geometry::GridRect;
use crate::model::GridItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Drag,
    Resize,
}

/// Lifecycle state of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Interacting {
        kind: GestureKind,
        origin: GridRect,
        sequence: u64,
    },
}

/// A reconciliation write that arrived mid-gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredWrite {
    Update(GridItem),
    Remove,
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    kind: GestureKind,
    origin: GridRect,
    sequence: u64,
    baseline: Vec<GridItem>,
    deferred: VecDeque<DeferredWrite>,
}

/// A gesture taken out of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedGesture {
    pub id: String,
    pub kind: GestureKind,
    pub origin: GridRect,
    /// Full surface snapshot taken when the gesture started.
    pub baseline: Vec<GridItem>,
    pub deferred: Vec<DeferredWrite>,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    active: FxHashMap<String, ActiveGesture>,
    sequence: u64,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: &str) -> InteractionState {
        match self.active.get(id) {
            Some(gesture) => InteractionState::Interacting {
                kind: gesture.kind,
                origin: gesture.origin,
                sequence: gesture.sequence,
            },
            None => InteractionState::Idle,
        }
    }

    pub fn is_interacting(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    pub fn any_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Interacting ids, oldest gesture first.
    pub fn active_ids(&self) -> Vec<String> {
        let mut ids: Vec<(u64, &String)> = self
            .active
            .iter()
            .map(|(id, gesture)| (gesture.sequence, id))
            .collect();
        ids.sort_unstable();
        ids.into_iter().map(|(_, id)| id.clone()).collect()
    }

    pub fn kind_of(&self, id: &str) -> Option<GestureKind> {
        self.active.get(id).map(|gesture| gesture.kind)
    }

    /// Mark `id` as interacting. Returns the gesture sequence number.
    pub fn begin(
        &mut self,
        id: &str,
        kind: GestureKind,
        origin: GridRect,
        baseline: Vec<GridItem>,
    ) -> Result<u64, GestureError> {
        if self.active.contains_key(id) {
            return Err(GestureError::AlreadyInteracting { id: id.to_owned() });
        }
        self.sequence += 1;
        self.active.insert(
            id.to_owned(),
            ActiveGesture {
                kind,
                origin,
                sequence: self.sequence,
                baseline,
                deferred: VecDeque::new(),
            },
        );
        Ok(self.sequence)
    }

    /// Queue `write` if `id` is interacting. Returns whether it was queued.
    pub fn defer(&mut self, id: &str, write: DeferredWrite) -> bool {
        match self.active.get_mut(id) {
            Some(gesture) => {
                gesture.deferred.push_back(write);
                true
            }
            None => false,
        }
    }

    /// Carry a model write to an idle item into every open baseline, so a
    /// later cancel does not undo it.
    pub fn rebase(&mut self, id: &str, rect: GridRect) {
        for gesture in self.active.values_mut() {
            if let Some(item) = gesture.baseline.iter_mut().find(|item| item.id == id) {
                item.rect = rect;
            }
        }
    }

    pub fn deferred_len(&self, id: &str) -> usize {
        self.active
            .get(id)
            .map_or(0, |gesture| gesture.deferred.len())
    }

    /// Return `id` to `Idle`, handing back its baseline and queued writes.
    pub fn finish(&mut self, id: &str) -> Result<FinishedGesture, GestureError> {
        let gesture = self
            .active
            .remove(id)
            .ok_or_else(|| GestureError::NotInteracting { id: id.to_owned() })?;
        Ok(FinishedGesture {
            id: id.to_owned(),
            kind: gesture.kind,
            origin: gesture.origin,
            baseline: gesture.baseline,
            deferred: gesture.deferred.into(),
        })
    }

    /// Finish every gesture, oldest first.
    pub fn finish_all(&mut self) -> Vec<FinishedGesture> {
        self.active_ids()
            .iter()
            .filter_map(|id| self.finish(id).ok())
            .collect()
    }
}
