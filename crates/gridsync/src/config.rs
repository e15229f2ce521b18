//! Grid configuration.
//!
//! [`GridConfig`] is the init input of the engine. It deserializes from the
//! camelCase JSON shape the console stores:
//!
//! ```
//! use gridsync::{CellHeight, FloatPolicy, GridConfig, Margin};
//!
//! let config: GridConfig = serde_json::from_str(
//!     r#"{"columns":16,"margin":[4,8],"cellHeight":"auto","floatPolicy":"free"}"#,
//! ).unwrap();
//! assert_eq!(config.columns, 16);
//! assert_eq!(config.margin, Margin::Axes([4.0, 8.0]));
//! assert_eq!(config.cell_height, CellHeight::Auto);
//! assert_eq!(config.float_policy, FloatPolicy::Free);
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GridConfigError;
use crate::mode::Mode;

/// Largest column count accepted by [`GridConfig::validate`].
pub const MAX_COLUMNS: u16 = 128;

/// Margin applied when none is configured.
pub const DEFAULT_MARGIN: f32 = 5.0;

/// Display orientation of the target screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Column count used for canvases of this orientation.
    #[must_use]
    pub const fn columns(self) -> u16 {
        match self {
            Self::Portrait => 9,
            Self::Landscape => 16,
        }
    }
}

/// Gap between cells, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Margin {
    /// Same gap on both axes.
    Uniform(f32),
    /// `[horizontal, vertical]`.
    Axes([f32; 2]),
}

impl Margin {
    pub fn horizontal(self) -> f32 {
        match self {
            Self::Uniform(v) => v,
            Self::Axes([h, _]) => h,
        }
    }

    pub fn vertical(self) -> f32 {
        match self {
            Self::Uniform(v) => v,
            Self::Axes([_, v]) => v,
        }
    }

    fn first_invalid(self) -> Option<f32> {
        [self.horizontal(), self.vertical()]
            .into_iter()
            .find(|v| !v.is_finite() || *v < 0.0)
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::Uniform(DEFAULT_MARGIN)
    }
}

/// Row height: derived from the column width, or fixed in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "CellHeightRepr", into = "CellHeightRepr")]
pub enum CellHeight {
    #[default]
    Auto,
    Fixed(f32),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CellHeightRepr {
    Keyword(String),
    Pixels(f32),
}

impl TryFrom<CellHeightRepr> for CellHeight {
    type Error = String;

    fn try_from(repr: CellHeightRepr) -> Result<Self, Self::Error> {
        match repr {
            CellHeightRepr::Keyword(keyword) if keyword == "auto" => Ok(Self::Auto),
            CellHeightRepr::Keyword(keyword) => {
                Err(format!("unknown cellHeight keyword `{keyword}`"))
            }
            CellHeightRepr::Pixels(px) => Ok(Self::Fixed(px)),
        }
    }
}

impl From<CellHeight> for CellHeightRepr {
    fn from(value: CellHeight) -> Self {
        match value {
            CellHeight::Auto => Self::Keyword("auto".to_owned()),
            CellHeight::Fixed(px) => Self::Pixels(px),
        }
    }
}

/// Whether items may overlap freely or are pushed apart on collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FloatPolicy {
    #[default]
    CollisionAvoid,
    Free,
}

impl fmt::Display for FloatPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CollisionAvoid => f.write_str("collision-avoid"),
            Self::Free => f.write_str("free"),
        }
    }
}

/// Init-time configuration of a grid surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub columns: u16,
    #[serde(default)]
    pub margin: Margin,
    #[serde(default)]
    pub cell_height: CellHeight,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default = "default_true")]
    pub animate: bool,
    #[serde(default)]
    pub float_policy: FloatPolicy,
}

fn default_true() -> bool {
    true
}

impl GridConfig {
    /// Editable, animated, collision-avoiding grid with `columns` columns.
    #[must_use]
    pub fn new(columns: u16) -> Self {
        Self {
            columns,
            margin: Margin::default(),
            cell_height: CellHeight::Auto,
            editable: true,
            animate: true,
            float_policy: FloatPolicy::CollisionAvoid,
        }
    }

    /// Config for a canvas of the given orientation.
    #[must_use]
    pub fn for_orientation(orientation: Orientation) -> Self {
        Self::new(orientation.columns())
    }

    #[must_use]
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn with_cell_height(mut self, cell_height: CellHeight) -> Self {
        self.cell_height = cell_height;
        self
    }

    #[must_use]
    pub fn with_float_policy(mut self, float_policy: FloatPolicy) -> Self {
        self.float_policy = float_policy;
        self
    }

    #[must_use]
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    #[must_use]
    pub fn animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    /// Initial operating mode implied by `editable`.
    pub fn initial_mode(&self) -> Mode {
        if self.editable {
            Mode::Editable
        } else {
            Mode::Static
        }
    }

    /// Whether the surface should animate in `mode`. Static canvases never do.
    pub fn animate_in(&self, mode: Mode) -> bool {
        self.animate && mode.is_editable()
    }

    /// Check the configuration before a surface is built from it.
    pub fn validate(&self) -> Result<(), GridConfigError> {
        if self.columns == 0 {
            return Err(GridConfigError::ZeroColumns);
        }
        if self.columns > MAX_COLUMNS {
            return Err(GridConfigError::TooManyColumns {
                columns: self.columns,
                max: MAX_COLUMNS,
            });
        }
        if let Some(value) = self.margin.first_invalid() {
            return Err(GridConfigError::InvalidMargin { value });
        }
        if let CellHeight::Fixed(px) = self.cell_height {
            if !px.is_finite() || px <= 0.0 {
                return Err(GridConfigError::InvalidCellHeight { value: px });
            }
        }
        Ok(())
    }
}
