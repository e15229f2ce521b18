//! Error taxonomy.
//!
//! Only [`GridConfigError`] is fatal. Binding failures are skipped and retried
//! on the next reconciliation pass; gesture misuse is reported to the caller;
//! persistence failures belong to the external adapter.

use std::fmt;

use crate::geometry::GridRect;
use crate::snapshot::LayoutValidationError;

/// Invalid grid configuration. Construction fails.
#[derive(Debug, Clone, PartialEq)]
pub enum GridConfigError {
    ZeroColumns,
    TooManyColumns { columns: u16, max: u16 },
    InvalidMargin { value: f32 },
    InvalidCellHeight { value: f32 },
}

impl fmt::Display for GridConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroColumns => write!(f, "grid must have at least one column"),
            Self::TooManyColumns { columns, max } => {
                write!(f, "grid has {columns} columns (max {max})")
            }
            Self::InvalidMargin { value } => {
                write!(f, "margin must be finite and non-negative, got {value}")
            }
            Self::InvalidCellHeight { value } => {
                write!(f, "fixed cell height must be finite and positive, got {value}")
            }
        }
    }
}

impl std::error::Error for GridConfigError {}

/// An item could not be registered with the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemBindingError {
    MissingRenderTarget { id: String },
    DuplicateId { id: String },
    InvalidRect { id: String, rect: GridRect, columns: u16 },
    SurfaceDestroyed { id: String },
}

impl ItemBindingError {
    /// Id of the item that failed to bind.
    pub fn item_id(&self) -> &str {
        match self {
            Self::MissingRenderTarget { id }
            | Self::DuplicateId { id }
            | Self::InvalidRect { id, .. }
            | Self::SurfaceDestroyed { id } => id,
        }
    }
}

impl fmt::Display for ItemBindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRenderTarget { id } => {
                write!(f, "render target for item {id} is not mounted")
            }
            Self::DuplicateId { id } => write!(f, "item {id} is already on the grid"),
            Self::InvalidRect { id, rect, columns } => write!(
                f,
                "item {id} has invalid rect {}x{} at ({}, {}) for {columns} columns",
                rect.w, rect.h, rect.x, rect.y
            ),
            Self::SurfaceDestroyed { id } => {
                write!(f, "cannot bind item {id}: surface was destroyed")
            }
        }
    }
}

impl std::error::Error for ItemBindingError {}

/// Gesture lifecycle misuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureError {
    UnknownItem { id: String },
    ItemLocked { id: String },
    StaticMode,
    OutsideHandle { id: String },
    AlreadyInteracting { id: String },
    NotInteracting { id: String },
    KindMismatch { id: String },
    InFlight { id: String },
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownItem { id } => write!(f, "no item {id} on the grid"),
            Self::ItemLocked { id } => write!(f, "item {id} is locked"),
            Self::StaticMode => write!(f, "grid is static; gestures are disabled"),
            Self::OutsideHandle { id } => {
                write!(f, "pointer is outside the drag handle of item {id}")
            }
            Self::AlreadyInteracting { id } => {
                write!(f, "item {id} already has a gesture in flight")
            }
            Self::NotInteracting { id } => write!(f, "item {id} has no gesture in flight"),
            Self::KindMismatch { id } => {
                write!(f, "frame does not match the gesture kind of item {id}")
            }
            Self::InFlight { id } => {
                write!(f, "operation blocked while item {id} is being moved")
            }
        }
    }
}

impl std::error::Error for GestureError {}

/// Failure reported by the external persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceError {
    pub message: String,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layout save failed: {}", self.message)
    }
}

impl std::error::Error for PersistenceError {}

/// Errors surfaced by [`GridEngine`](crate::GridEngine).
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    Config(GridConfigError),
    Binding(ItemBindingError),
    Gesture(GestureError),
    Layout(LayoutValidationError),
    UnknownItem { id: String },
    RebuildUnavailable,
    TornDown,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid grid config: {err}"),
            Self::Binding(err) => fmt::Display::fmt(err, f),
            Self::Gesture(err) => fmt::Display::fmt(err, f),
            Self::Layout(err) => write!(f, "invalid layout snapshot: {err}"),
            Self::UnknownItem { id } => write!(f, "no item {id} on the grid"),
            Self::RebuildUnavailable => write!(
                f,
                "surface cannot toggle interactivity live and no rebuild factory is set"
            ),
            Self::TornDown => write!(f, "grid engine was torn down"),
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Binding(err) => Some(err),
            Self::Gesture(err) => Some(err),
            Self::Layout(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GridConfigError> for GridError {
    fn from(err: GridConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<ItemBindingError> for GridError {
    fn from(err: ItemBindingError) -> Self {
        Self::Binding(err)
    }
}

impl From<LayoutValidationError> for GridError {
    fn from(err: LayoutValidationError) -> Self {
        Self::Layout(err)
    }
}

impl From<GestureError> for GridError {
    fn from(err: GestureError) -> Self {
        Self::Gesture(err)
    }
}
