//! Live grid flow: where every item and preview panel currently sits.
//!
//! Items are fixed-size boxes laid out left to right and wrapped into
//! centred rows.  An item enlarged by a preview makes its whole row taller,
//! pushing the rows below down; the preview panel spans the full grid width
//! just below the enlarged item's thumbnail.

use super::item::ItemIndex;
use super::layout::LayoutSurface;
use super::position::MARGIN_EXPANDED;

/// Box geometry of the grid, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowConfig {
    pub item_width: f64,
    pub item_height: f64,
    /// Horizontal and vertical spacing between items.
    pub gap: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            item_width: 250.0,
            item_height: 250.0,
            gap: 10.0,
        }
    }
}

/// Axis-aligned rectangle in document pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DocRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DocRect {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Height override for an item carrying a preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSlot {
    pub anchor: ItemIndex,
    pub item_height: f64,
}

#[derive(Debug, Clone)]
struct FlowRow {
    top: f64,
    height: f64,
}

/// Computed layout for one instant.
#[derive(Debug, Clone)]
pub struct GridFlow {
    config: FlowConfig,
    width: f64,
    /// Live rect per item (height includes any enlargement).
    items: Vec<DocRect>,
    /// Row of each item.
    row_of: Vec<usize>,
    rows: Vec<FlowRow>,
    height: f64,
}

impl GridFlow {
    /// Lay out `count` items in a viewport `viewport_width` wide.
    pub fn compute(config: FlowConfig, count: usize, viewport_width: f64, slots: &[PanelSlot]) -> Self {
        let columns = Self::columns_for(&config, viewport_width);
        let mut items = Vec::with_capacity(count);
        let mut row_of = Vec::with_capacity(count);
        let mut rows = Vec::new();
        let mut y = config.gap;

        for first in (0..count).step_by(columns) {
            let last = (first + columns).min(count);
            let in_row = (last - first) as f64;
            let row_width = in_row * config.item_width + (in_row - 1.0) * config.gap;
            let mut x = ((viewport_width - row_width) / 2.0).max(0.0);
            let mut row_height = 0.0_f64;

            for index in first..last {
                let height = slots
                    .iter()
                    .filter(|s| s.anchor == index)
                    .map(|s| s.item_height)
                    .fold(config.item_height, f64::max);
                items.push(DocRect {
                    x,
                    y,
                    width: config.item_width,
                    height,
                });
                row_of.push(rows.len());
                row_height = row_height.max(height);
                x += config.item_width + config.gap;
            }

            rows.push(FlowRow {
                top: y,
                height: row_height,
            });
            y += row_height + config.gap;
        }

        Self {
            config,
            width: viewport_width,
            items,
            row_of,
            rows,
            height: y,
        }
    }

    /// Number of columns that fit in `width` (at least one).
    pub fn columns_for(config: &FlowConfig, width: f64) -> usize {
        let stride = config.item_width + config.gap;
        if stride <= 0.0 {
            return 1;
        }
        (((width + config.gap) / stride).floor() as usize).max(1)
    }

    /// Viewport width the flow was laid out for.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Bottom of the last row plus trailing gap.
    pub fn document_height(&self) -> f64 {
        self.height
    }

    /// The item's thumbnail box: its trigger area.
    pub fn thumb_rect(&self, index: ItemIndex) -> Option<DocRect> {
        self.items.get(index).map(|r| DocRect {
            height: self.config.item_height,
            ..*r
        })
    }

    /// Visible rect of a panel `panel_height` tall anchored at `anchor`,
    /// clipped to the bottom of the anchor's row.
    pub fn panel_rect(&self, anchor: ItemIndex, panel_height: f64) -> Option<DocRect> {
        let thumb = self.thumb_rect(anchor)?;
        let row = self.rows.get(*self.row_of.get(anchor)?)?;
        let top = thumb.bottom() + MARGIN_EXPANDED;
        let row_bottom = row.top + row.height;
        Some(DocRect {
            x: 0.0,
            y: top,
            width: self.width,
            height: panel_height.min(row_bottom - top).max(0.0),
        })
    }

    /// Item whose trigger contains the document point, if any.
    pub fn trigger_at(&self, x: f64, y: f64) -> Option<ItemIndex> {
        (0..self.items.len()).find(|&i| self.thumb_rect(i).is_some_and(|r| r.contains(x, y)))
    }
}

impl LayoutSurface for GridFlow {
    fn offset_top(&self, index: ItemIndex) -> f64 {
        self.items.get(index).map_or(0.0, |r| r.y)
    }

    fn height(&self, index: ItemIndex) -> f64 {
        self.items.get(index).map_or(0.0, |r| r.height)
    }

    fn panel_top(&self, anchor: ItemIndex) -> f64 {
        self.thumb_rect(anchor)
            .map_or(0.0, |r| r.bottom() + MARGIN_EXPANDED)
    }
}
