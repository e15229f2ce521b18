//! Grid-unit rectangles and size bounds.

use serde::{Deserialize, Serialize};

/// A placement on the layout grid, measured in grid units.
///
/// Origin at the top-left cell. `x`/`w` count columns, `y`/`h` count rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridRect {
    /// Left column (inclusive).
    pub x: u16,
    /// Top row (inclusive).
    pub y: u16,
    /// Width in columns.
    pub w: u16,
    /// Height in rows.
    pub h: u16,
}

impl GridRect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.w)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.h)
    }

    /// Area in cells.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.w as u32 * self.h as u32
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Whether the column spans of `self` and `other` share at least one column.
    #[inline]
    pub const fn shares_columns(&self, other: &GridRect) -> bool {
        self.x < other.right() && other.x < self.right()
    }

    /// Whether the two rectangles overlap. Empty rectangles never overlap.
    #[inline]
    pub const fn intersects(&self, other: &GridRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.shares_columns(other)
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Whether the rectangle stays within `columns`.
    #[inline]
    pub const fn fits_columns(&self, columns: u16) -> bool {
        self.right() <= columns
    }

    /// Same size, new origin.
    #[inline]
    #[must_use]
    pub const fn with_position(self, x: u16, y: u16) -> Self {
        Self::new(x, y, self.w, self.h)
    }

    /// Same origin, new size.
    #[inline]
    #[must_use]
    pub const fn with_size(self, w: u16, h: u16) -> Self {
        Self::new(self.x, self.y, w, h)
    }
}

/// Optional per-item size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<u16>,
}

impl SizeBounds {
    /// No limits beyond the implicit minimum of one unit.
    pub const UNBOUNDED: Self = Self {
        min_w: None,
        max_w: None,
        min_h: None,
        max_h: None,
    };

    /// Clamp a requested size into the declared bounds.
    ///
    /// Sizes never drop below 1. If a declared minimum exceeds the declared
    /// maximum the minimum wins.
    #[must_use]
    pub fn clamp_size(&self, w: u16, h: u16) -> (u16, u16) {
        (
            clamp_axis(w, self.min_w, self.max_w),
            clamp_axis(h, self.min_h, self.max_h),
        )
    }

    /// Whether `(w, h)` already satisfies the bounds.
    pub fn admits(&self, w: u16, h: u16) -> bool {
        self.clamp_size(w, h) == (w, h)
    }
}

fn clamp_axis(value: u16, min: Option<u16>, max: Option<u16>) -> u16 {
    let mut value = value.max(1);
    if let Some(max) = max {
        value = value.min(max.max(1));
    }
    if let Some(min) = min {
        value = value.max(min);
    }
    value
}
