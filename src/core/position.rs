//! Preview sizing and scroll positioning.
//!
//! The preview is sized so that, together with the shrunken row above it,
//! part of the next row stays visible, but never below `min_height`.

/// Gap between the expanded item's thumbnail and its preview panel (px).
pub const MARGIN_EXPANDED: f64 = 10.0;
/// Share of the item height (percent) kept visible above the preview.
pub const ITEM_HEIGHT_REDUCTION_PCT: f64 = 67.0;

/// Target heights for an opening preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewHeights {
    /// Height of the preview panel.
    pub preview: f64,
    /// Height of the expanded item (thumbnail + margin + panel).
    pub item: f64,
}

/// Compute preview and item heights for an item `item_height` tall in a
/// viewport `viewport_height` tall.
pub fn calc_height(item_height: f64, viewport_height: f64, min_height: f64) -> PreviewHeights {
    let reduction = item_height * ITEM_HEIGHT_REDUCTION_PCT / 100.0;
    let preview = viewport_height - item_height - MARGIN_EXPANDED - reduction;
    if preview < min_height {
        return PreviewHeights {
            preview: min_height,
            item: min_height + item_height + MARGIN_EXPANDED,
        };
    }
    PreviewHeights {
        preview,
        item: viewport_height - reduction,
    }
}

/// Inputs for [`scroll_target`], all in document pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollInputs {
    /// Cached offset of the bound item (its row top).
    pub item_top: f64,
    /// Cached height of the bound item.
    pub item_height: f64,
    /// Computed preview panel height.
    pub preview_height: f64,
    /// Live top of the preview panel.
    pub panel_top: f64,
    /// Height of a preview that is being removed above the panel.
    pub pending_extra: f64,
    pub viewport_height: f64,
}

/// Document offset to scroll to so the preview comes into view.
pub fn scroll_target(inputs: &ScrollInputs) -> f64 {
    let panel_top = inputs.panel_top - inputs.pending_extra;
    let height = inputs.preview_height;
    let viewport = inputs.viewport_height;

    if height + inputs.item_height + MARGIN_EXPANDED <= viewport {
        // Row and preview fit: show the row.
        inputs.item_top
    } else if height < viewport {
        // Align the panel's bottom with the viewport's bottom.
        panel_top - (viewport - height)
    } else {
        panel_top
    }
}
