//! Editable vs. static operation.
//!
//! The admin canvas runs `Editable`; remote displays run `Static`, which
//! disables drag/resize and animation but still takes programmatic updates.
//! When the surface cannot toggle interactivity on a live instance, a
//! transition is planned as a rebuild instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Editable,
    Static,
}

impl Mode {
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Editable)
    }

    pub const fn is_static(self) -> bool {
        matches!(self, Self::Static)
    }
}

/// Where a drag may start within an item.
///
/// A hit path lists the named regions under the pointer, innermost first.
/// A drag starts only if the handle region is reached before any cancel
/// region, so buttons nested inside the handle keep their clicks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragAffordance {
    pub handle: String,
    pub cancel: Vec<String>,
}

impl Default for DragAffordance {
    fn default() -> Self {
        Self {
            handle: "grid-item-content".to_owned(),
            cancel: vec!["no-drag".to_owned()],
        }
    }
}

impl DragAffordance {
    pub fn allows_drag_start(&self, hit_path: &[&str]) -> bool {
        for region in hit_path {
            if self.cancel.iter().any(|cancel| cancel == region) {
                return false;
            }
            if *region == self.handle {
                return true;
            }
        }
        false
    }
}

/// How a mode change must be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    Unchanged,
    LiveToggle { to: Mode },
    Rebuild { to: Mode },
}

#[derive(Debug, Clone)]
pub struct ModeController {
    mode: Mode,
    affordance: DragAffordance,
    transitions: u64,
}

impl ModeController {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            affordance: DragAffordance::default(),
            transitions: 0,
        }
    }

    #[must_use]
    pub fn with_affordance(mut self, affordance: DragAffordance) -> Self {
        self.affordance = affordance;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn affordance(&self) -> &DragAffordance {
        &self.affordance
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    pub fn plan(&self, to: Mode, live_toggle: bool) -> ModeTransition {
        if to == self.mode {
            ModeTransition::Unchanged
        } else if live_toggle {
            ModeTransition::LiveToggle { to }
        } else {
            ModeTransition::Rebuild { to }
        }
    }

    pub fn commit(&mut self, to: Mode) {
        if to != self.mode {
            self.mode = to;
            self.transitions += 1;
        }
    }
}
