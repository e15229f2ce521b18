//! Persisted layout schema v1.
//!
//! A [`LayoutSnapshot`] is what the persistence adapter stores for a canvas.
//! All snapshots carry their schema version; loaders reject unknown versions.
//!
//! ```
//! use gridsync::{FloatPolicy, GridItem, LayoutSnapshot};
//!
//! let snapshot = LayoutSnapshot::new(16, vec![GridItem::new("clock", 0, 0, 4, 2)]);
//! assert!(snapshot.validate().is_ok());
//! assert_eq!(snapshot.float_policy, FloatPolicy::CollisionAvoid);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::FloatPolicy;
use crate::model::GridItem;

/// Current layout schema version.
pub const LAYOUT_SCHEMA_VERSION: u16 = 1;

/// Persisted layout of one canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    #[serde(default = "default_layout_version")]
    pub schema_version: u16,
    pub columns: u16,
    #[serde(default)]
    pub float_policy: FloatPolicy,
    pub items: Vec<GridItem>,
    /// Forward-compatible extension bag.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

fn default_layout_version() -> u16 {
    LAYOUT_SCHEMA_VERSION
}

impl LayoutSnapshot {
    /// Collision-avoiding v1 snapshot.
    #[must_use]
    pub fn new(columns: u16, items: Vec<GridItem>) -> Self {
        Self {
            schema_version: LAYOUT_SCHEMA_VERSION,
            columns,
            float_policy: FloatPolicy::CollisionAvoid,
            items,
            extensions: BTreeMap::new(),
        }
    }

    /// Validate version and geometry.
    ///
    /// Under collision avoidance items must fit the columns and must not
    /// overlap; free-floating layouts only need non-empty rects.
    pub fn validate(&self) -> Result<(), LayoutValidationError> {
        if self.schema_version != LAYOUT_SCHEMA_VERSION {
            return Err(LayoutValidationError::UnsupportedVersion {
                found: self.schema_version,
                expected: LAYOUT_SCHEMA_VERSION,
            });
        }
        if self.columns == 0 {
            return Err(LayoutValidationError::ZeroColumns);
        }

        let mut seen = BTreeSet::new();
        for item in &self.items {
            if !seen.insert(item.id.as_str()) {
                return Err(LayoutValidationError::DuplicateId {
                    id: item.id.clone(),
                });
            }
            if item.rect.is_empty() {
                return Err(LayoutValidationError::EmptyItem {
                    id: item.id.clone(),
                });
            }
        }

        if self.float_policy == FloatPolicy::Free {
            return Ok(());
        }

        for (i, a) in self.items.iter().enumerate() {
            if !a.rect.fits_columns(self.columns) {
                return Err(LayoutValidationError::OutOfBounds {
                    id: a.id.clone(),
                    right: a.rect.right(),
                    columns: self.columns,
                });
            }
            if let Some(b) = self.items[i + 1..].iter().find(|b| a.rect.intersects(&b.rect)) {
                return Err(LayoutValidationError::Overlap {
                    first: a.id.clone(),
                    second: b.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Deterministic hash of the placements, for change diagnostics.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = rustc_hash::FxHasher::default();
        self.schema_version.hash(&mut hasher);
        self.columns.hash(&mut hasher);
        for item in &self.items {
            item.placement().hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Errors from snapshot validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutValidationError {
    UnsupportedVersion { found: u16, expected: u16 },
    ZeroColumns,
    ColumnMismatch { found: u16, expected: u16 },
    DuplicateId { id: String },
    EmptyItem { id: String },
    OutOfBounds { id: String, right: u16, columns: u16 },
    Overlap { first: String, second: String },
}

impl fmt::Display for LayoutValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, expected } => write!(
                f,
                "unsupported layout schema version {found} (expected {expected})"
            ),
            Self::ZeroColumns => write!(f, "layout must have at least one column"),
            Self::ColumnMismatch { found, expected } => write!(
                f,
                "layout was saved for {found} columns but the grid has {expected}"
            ),
            Self::DuplicateId { id } => write!(f, "item {id} appears more than once"),
            Self::EmptyItem { id } => write!(f, "item {id} has zero width or height"),
            Self::OutOfBounds { id, right, columns } => write!(
                f,
                "item {id} ends at column {right} but the grid has {columns}"
            ),
            Self::Overlap { first, second } => write!(f, "items {first} and {second} overlap"),
        }
    }
}

impl std::error::Error for LayoutValidationError {}
