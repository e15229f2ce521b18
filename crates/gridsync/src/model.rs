//! Canonical, declarative layout model.
//!
//! [`GridModel`] is what the console edits and persists. The engine never
//! reads it directly; callers hand `model.items()` to
//! [`GridEngine::reconcile`](crate::GridEngine::reconcile) and feed
//! `LayoutChanged` payloads back through [`GridModel::adopt`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{FloatPolicy, GridConfig};
use crate::error::{GridConfigError, GridError, ItemBindingError};
use crate::geometry::{GridRect, SizeBounds};
use crate::snapshot::{LAYOUT_SCHEMA_VERSION, LayoutSnapshot, LayoutValidationError};

/// Opaque handle to rendered widget content. Owned by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(String);

impl ContentKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A positioned, sized widget placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridItem {
    pub id: String,
    #[serde(flatten)]
    pub rect: GridRect,
    #[serde(flatten)]
    pub bounds: SizeBounds,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentKey>,
    /// Extension data carried verbatim for the rendering layer.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

impl GridItem {
    pub fn new(id: impl Into<String>, x: u16, y: u16, w: u16, h: u16) -> Self {
        Self {
            id: id.into(),
            rect: GridRect::new(x, y, w, h),
            bounds: SizeBounds::UNBOUNDED,
            locked: false,
            content: None,
            extensions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: SizeBounds) -> Self {
        self.bounds = bounds;
        self
    }

    #[must_use]
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: ContentKey) -> Self {
        self.content = Some(content);
        self
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_rect(mut self, rect: GridRect) -> Self {
        self.rect = rect;
        self
    }

    /// `(id, x, y, w, h)` view used when comparing layouts.
    pub fn placement(&self) -> (&str, u16, u16, u16, u16) {
        (self.id.as_str(), self.rect.x, self.rect.y, self.rect.w, self.rect.h)
    }

    /// Clamp the rect into the size bounds and the column count.
    ///
    /// Width never exceeds `columns`. Under collision avoidance the item is
    /// also shifted left so that `x + w <= columns`.
    #[must_use]
    pub fn normalized(&self, columns: u16, policy: FloatPolicy) -> Self {
        let (w, h) = self.bounds.clamp_size(self.rect.w, self.rect.h);
        let w = w.min(columns.max(1));
        let x = match policy {
            FloatPolicy::CollisionAvoid => self.rect.x.min(columns.saturating_sub(w)),
            FloatPolicy::Free => self.rect.x,
        };
        let mut item = self.clone();
        item.rect = GridRect::new(x, self.rect.y, w, h);
        item
    }
}

/// Ordered collection of items plus the grid they live on.
#[derive(Debug, Clone, PartialEq)]
pub struct GridModel {
    config: GridConfig,
    items: Vec<GridItem>,
}

impl GridModel {
    pub fn new(config: GridConfig) -> Result<Self, GridConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            items: Vec::new(),
        })
    }

    /// Rebuild a model from a persisted snapshot.
    ///
    /// The snapshot must validate and must have been saved for the same
    /// column count as `config`.
    pub fn from_snapshot(config: GridConfig, snapshot: LayoutSnapshot) -> Result<Self, GridError> {
        let mut model = Self::new(config)?;
        snapshot.validate()?;
        if snapshot.columns != model.config.columns {
            return Err(LayoutValidationError::ColumnMismatch {
                found: snapshot.columns,
                expected: model.config.columns,
            }
            .into());
        }
        model.items = snapshot.items;
        Ok(model)
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GridItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Append a new item. Ids must be unique and rects non-empty.
    pub fn insert(&mut self, item: GridItem) -> Result<(), ItemBindingError> {
        if self.contains(&item.id) {
            return Err(ItemBindingError::DuplicateId { id: item.id });
        }
        let columns = self.config.columns;
        let out_of_bounds = self.config.float_policy == FloatPolicy::CollisionAvoid
            && !item.rect.fits_columns(columns);
        if item.rect.is_empty() || out_of_bounds {
            return Err(ItemBindingError::InvalidRect {
                rect: item.rect,
                id: item.id,
                columns,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Insert or replace by id, keeping the original position in the order.
    pub fn upsert(&mut self, item: GridItem) -> Option<GridItem> {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => Some(std::mem::replace(existing, item)),
            None => {
                self.items.push(item);
                None
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<GridItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Adopt an authoritative layout (a `LayoutChanged` payload).
    pub fn adopt(&mut self, items: &[GridItem]) {
        self.items = items.to_vec();
    }

    /// First row-major position where a `w`x`h` item fits without overlap.
    pub fn first_free_slot(&self, w: u16, h: u16) -> GridRect {
        let columns = self.config.columns;
        let w = w.clamp(1, columns.max(1));
        let h = h.max(1);
        let bottom = self
            .items
            .iter()
            .map(|item| item.rect.bottom())
            .max()
            .unwrap_or(0);
        for y in 0..=bottom {
            for x in 0..=columns.saturating_sub(w) {
                let candidate = GridRect::new(x, y, w, h);
                if !self.items.iter().any(|item| item.rect.intersects(&candidate)) {
                    return candidate;
                }
            }
        }
        GridRect::new(0, bottom, w, h)
    }

    /// Ids of every overlapping pair, in model order.
    pub fn overlaps(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (i, a) in self.items.iter().enumerate() {
            for b in &self.items[i + 1..] {
                if a.rect.intersects(&b.rect) {
                    pairs.push((a.id.clone(), b.id.clone()));
                }
            }
        }
        pairs
    }

    /// Persisted form of the model.
    pub fn to_snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            schema_version: LAYOUT_SCHEMA_VERSION,
            columns: self.config.columns,
            float_policy: self.config.float_policy,
            items: self.items.clone(),
            extensions: BTreeMap::new(),
        }
    }
}
