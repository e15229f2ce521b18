#![forbid(unsafe_code)]

//! Grid layout reconciliation for signage canvases.
//!
//! A canvas is a list of rectangular widget placements on a discrete grid.
//! The console edits that list declaratively; a long-lived, imperative grid
//! surface renders it and lets users drag and resize widgets. This crate keeps
//! the two in sync without tearing the surface down:
//!
//! - [`Reconciler`] diffs the desired list against what was last applied and
//!   applies adds, updates and removals in one batch (one relayout).
//! - [`InteractionController`] tracks drags/resizes and holds back writes to
//!   items under the pointer until the gesture ends.
//! - [`ModeController`] switches between the editable admin canvas and the
//!   static display canvas, rebuilding the surface when it cannot toggle live.
//! - [`compact()`] packs items upward with a deterministic shelf heuristic.
//! - [`GridEngine`] ties them together and is the only writer to the surface.
//!
//! ```
//! use gridsync::{GridConfig, GridEngine, GridHandle, GridItem, Orientation, VirtualSurface};
//!
//! let config = GridConfig::for_orientation(Orientation::Landscape);
//! let surface = VirtualSurface::new(&config);
//! let mut engine = GridEngine::new(config, surface).unwrap();
//!
//! let report = engine
//!     .reconcile(&[GridItem::new("clock", 0, 0, 4, 2), GridItem::new("news", 4, 0, 8, 4)])
//!     .unwrap();
//! assert_eq!(report.added, 2);
//! assert_eq!(report.relayouts, 1);
//! assert_eq!(engine.snapshot().len(), 2);
//! ```

pub mod compact;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod interaction;
pub mod mode;
pub mod model;
pub mod reconcile;
pub mod snapshot;
pub mod surface;

pub use compact::compact;
pub use config::{
    CellHeight, DEFAULT_MARGIN, FloatPolicy, GridConfig, MAX_COLUMNS, Margin, Orientation,
};
pub use engine::{GridEngine, GridHandle};
pub use error::{
    GestureError, GridConfigError, GridError, ItemBindingError, PersistenceError,
};
pub use events::{EventBus, GridEvent, LayoutPersistence, ListenerId, PersistenceBridge};
pub use geometry::{GridRect, SizeBounds};
pub use interaction::{
    DeferredWrite, FinishedGesture, GestureKind, InteractionController, InteractionState,
};
pub use mode::{DragAffordance, Mode, ModeController, ModeTransition};
pub use model::{ContentKey, GridItem, GridModel};
pub use reconcile::{ReconcilePlan, ReconcileReport, Reconciler};
pub use snapshot::{LAYOUT_SCHEMA_VERSION, LayoutSnapshot, LayoutValidationError};
pub use surface::{BatchGuard, GridSurface, NativeEvent, VirtualSurface};
