//! Grid items: payload plus cached layout measurements.

use std::ops::Range;
use std::sync::Arc;

use url::Url;

/// Index into the ordered item sequence, assigned at registration.
pub type ItemIndex = usize;

/// What a grid item's trigger carries.  Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPayload {
    /// Thumbnail shown in the grid.
    pub thumb: String,
    /// Large image shown in the preview (absolute or document-relative).
    pub largesrc: String,
    pub title: String,
    pub description: String,
    /// Optional "Visit website" target.
    pub url: Option<String>,
}

/// One element of the grid.
#[derive(Debug, Clone)]
pub struct GridItem {
    pub index: ItemIndex,
    /// Cached vertical offset (px), valid since the last re-measurement.
    pub offset_top: f64,
    /// Cached height (px), valid since the last height measurement.
    pub height: f64,
    pub payload: Arc<ItemPayload>,
    /// Location of the document the item came from; relative sources
    /// resolve against it.
    pub document: Arc<Url>,
}

/// Append `payloads` to `items`, assigning consecutive indices.
/// Returns the index range of the new items (not yet measured).
pub fn register(
    items: &mut Vec<GridItem>,
    payloads: impl IntoIterator<Item = ItemPayload>,
    document: Arc<Url>,
) -> Range<ItemIndex> {
    let start = items.len();
    for payload in payloads {
        let index = items.len();
        items.push(GridItem {
            index,
            offset_top: 0.0,
            height: 0.0,
            payload: Arc::new(payload),
            document: Arc::clone(&document),
        });
    }
    start..items.len()
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn register_assigns_consecutive_indices() {
        let mut items = Vec::new();
        let first = register(&mut items, (0..3).map(payload), document());
        let second = register(&mut items, (3..5).map(payload), document());

        assert_eq!(first, 0..3);
        assert_eq!(second, 3..5);
        assert!(items.iter().enumerate().all(|(i, item)| item.index == i));
    }
}
