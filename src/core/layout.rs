//! Layout tracker: caches item offsets and heights at known-stable moments.
//!
//! Same-row detection runs on these cached values, never on live layout,
//! so the only places that refresh them are [`remeasure`] (init and
//! resize) and [`record`] (appended items).

use std::ops::Range;

use super::item::{GridItem, ItemIndex};

/// Live, on-screen geometry of the grid in document pixels.
pub trait LayoutSurface {
    /// Current top of item `index`.
    fn offset_top(&self, index: ItemIndex) -> f64;
    /// Current rendered height of item `index`.
    fn height(&self, index: ItemIndex) -> f64;
    /// Current top of a preview panel anchored at item `anchor`.
    fn panel_top(&self, anchor: ItemIndex) -> f64;
}

/// Read every item's offset (and height when `include_height`) from
/// `surface` into its cache.
pub fn remeasure(items: &mut [GridItem], surface: &impl LayoutSurface, include_height: bool) {
    for item in items.iter_mut() {
        item.offset_top = surface.offset_top(item.index);
        if include_height {
            item.height = surface.height(item.index);
        }
    }
    tracing::debug!(count = items.len(), include_height, "remeasured grid items");
}

/// Measure offset and height of freshly appended items.
pub fn record(items: &mut [GridItem], range: Range<ItemIndex>, surface: &impl LayoutSurface) {
    for item in &mut items[range] {
        item.offset_top = surface.offset_top(item.index);
        item.height = surface.height(item.index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::fixtures;

    /// Two columns, 100 px tall rows, every item 90 px tall.
    struct TwoColumns;

    impl LayoutSurface for TwoColumns {
        fn offset_top(&self, index: ItemIndex) -> f64 {
            (index / 2) as f64 * 100.0
        }
        fn height(&self, _index: ItemIndex) -> f64 {
            90.0
        }
        fn panel_top(&self, anchor: ItemIndex) -> f64 {
            self.offset_top(anchor) + 100.0
        }
    }

    #[test]
    fn remeasure_with_height_updates_both() {
        let mut items = fixtures::grid(1, 4, 0.0);

        remeasure(&mut items, &TwoColumns, true);

        let offsets: Vec<f64> = items.iter().map(|i| i.offset_top).collect();
        assert_eq!(offsets, vec![0.0, 0.0, 100.0, 100.0]);
        assert!(items.iter().all(|i| i.height == 90.0));
    }

    #[test]
    fn remeasure_without_height_keeps_cached_height() {
        let mut items = fixtures::grid(1, 4, 250.0);

        remeasure(&mut items, &TwoColumns, false);

        assert_eq!(items[3].offset_top, 100.0);
        assert!(items.iter().all(|i| i.height == 250.0));
    }

    #[test]
    fn record_touches_only_the_given_range() {
        let mut items = fixtures::grid(1, 4, 250.0);

        record(&mut items, 2..4, &TwoColumns);

        assert_eq!(items[1].height, 250.0);
        assert_eq!(items[2].height, 90.0);
        assert_eq!(items[3].offset_top, 100.0);
    }
}
