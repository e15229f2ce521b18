//! Gap-removal packing ("auto-arrange").
//!
//! A shelf heuristic, not optimal bin packing:
//!
//! 1. Visit items in row-major order of their current `(y, x)`, ties broken
//!    by id.
//! 2. Keep a per-column watermark: the first free row in that column.
//! 3. Place each item at its current column span, on the highest watermark
//!    the span covers. An item that would cross the right edge wraps to
//!    column 0 and lands on the watermark of its new span, not on a fresh
//!    shelf below the tallest column. A fresh shelf would let a second pass
//!    lift the item again.
//! 4. Raise the watermark of every column the item occupies to its bottom.
//!
//! Locked items are pinned where they are; an unlocked item that would land
//! on one is moved down past it. Running the compactor on its own output
//! returns the same placement.

use crate::geometry::GridRect;
use crate::model::GridItem;

/// Compact `items` onto a grid of `columns`. Output keeps the input order.
pub fn compact(items: &[GridItem], columns: u16) -> Vec<GridItem> {
    let columns = columns.max(1);
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&items[a], &items[b]);
        (a.rect.y, a.rect.x, &a.id).cmp(&(b.rect.y, b.rect.x, &b.id))
    });

    let pinned: Vec<GridRect> = items
        .iter()
        .filter(|item| item.locked)
        .map(|item| item.rect)
        .collect();
    let mut watermark = vec![0_u16; usize::from(columns)];
    let mut out = items.to_vec();

    for index in order {
        let item = &items[index];
        if item.locked {
            continue;
        }
        let w = item.rect.w.clamp(1, columns);
        let x = if item.rect.x.saturating_add(w) > columns {
            0
        } else {
            item.rect.x
        };
        let span = usize::from(x)..usize::from(x + w);
        let floor = watermark[span.clone()].iter().copied().max().unwrap_or(0);

        let mut rect = GridRect::new(x, floor, w, item.rect.h.max(1));
        while let Some(bottom) = pinned
            .iter()
            .filter(|pin| pin.intersects(&rect))
            .map(GridRect::bottom)
            .max()
        {
            rect.y = bottom;
        }

        for column in &mut watermark[span] {
            *column = rect.bottom();
        }
        out[index].rect = rect;
    }
    out
}
