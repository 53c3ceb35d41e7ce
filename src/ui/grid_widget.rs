//! Thumbnail grid widget.
//!
//! Draws every visible item as a bordered tile with its thumbnail, the
//! expanded item highlighted, and the "Load more" control under the last
//! row while further pages remain.

use std::sync::Arc;

use image::RgbaImage;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use super::halfblocks;
use super::projection::{blit, Projection};
use super::spinner;
use super::theme::Theme;
use crate::core::flow::{DocRect, GridFlow};
use crate::core::item::{GridItem, ItemIndex};

/// Space reserved under the last row for the footer control (px).
pub const FOOTER_PX: f64 = 64.0;
const BUTTON_W_PX: f64 = 160.0;
const BUTTON_H_PX: f64 = 32.0;

/// What sits under the last row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Footer {
    None,
    LoadMore,
    /// A page is preloading.
    Loading { tick: u64 },
}

/// Document rect of the footer button below `flow`.
pub fn footer_rect(flow: &GridFlow) -> DocRect {
    DocRect {
        x: ((flow.width() - BUTTON_W_PX) / 2.0).max(0.0),
        y: flow.document_height() + (FOOTER_PX - BUTTON_H_PX) / 2.0,
        width: BUTTON_W_PX,
        height: BUTTON_H_PX,
    }
}

/// Clickable regions returned after rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridHitZones {
    pub load_more: Option<Rect>,
}

pub struct GridWidget<'a> {
    pub flow: &'a GridFlow,
    pub items: &'a [GridItem],
    /// Decoded thumbnails, indexed like `items`.
    pub thumbs: &'a [Option<Arc<RgbaImage>>],
    pub expanded: Option<ItemIndex>,
    pub projection: Projection,
    pub footer: Footer,
}

impl GridWidget<'_> {
    /// Render and return hit zones for mouse interaction.
    pub fn render_and_hit(self, buf: &mut Buffer) -> GridHitZones {
        for item in self.items {
            let Some(rect) = self.flow.thumb_rect(item.index) else {
                continue;
            };
            let cell_box = self.projection.cell_box(&rect);
            let Some(clip) = self.projection.visible(cell_box) else {
                continue;
            };
            let mut scratch = Buffer::empty(cell_box.local());
            self.render_tile(item, &mut scratch);
            blit(&scratch, cell_box, clip, buf);
        }

        let mut hits = GridHitZones::default();
        if self.footer != Footer::None {
            let button = self.projection.cell_box(&footer_rect(self.flow));
            if let Some(clip) = self.projection.visible(button) {
                let mut scratch = Buffer::empty(button.local());
                render_button(self.footer, &mut scratch);
                blit(&scratch, button, clip, buf);
                if self.footer == Footer::LoadMore {
                    hits.load_more = Some(clip);
                }
            }
        }
        hits
    }

    fn render_tile(&self, item: &GridItem, buf: &mut Buffer) {
        let area = buf.area;
        let expanded = self.expanded == Some(item.index);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if expanded { BorderType::Thick } else { BorderType::Rounded })
            .border_style(if expanded {
                Theme::expanded_border_style()
            } else {
                Theme::tile_border_style()
            });
        let inner = block.inner(area);
        block.render(area, buf);

        match self.thumbs.get(item.index).and_then(Option::as_ref) {
            Some(img) => halfblocks::render_image(img, inner, buf),
            None => {
                // Not decoded (yet, or ever): show the title instead.
                let y = inner.y + inner.height / 2;
                Paragraph::new(item.payload.title.as_str())
                    .style(Theme::tile_caption_style())
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(Rect::new(inner.x, y, inner.width, inner.bottom().saturating_sub(y)), buf);
            }
        }
    }
}

fn render_button(footer: Footer, buf: &mut Buffer) {
    let area = buf.area;
    let label = match footer {
        Footer::Loading { tick } => format!("{} Loading…", spinner::frame(tick)),
        _ => "Load more".to_string(),
    };
    let block = Block::default().style(Theme::button_style());
    let y = area.height / 2;
    block.render(area, buf);
    Paragraph::new(Line::from(label))
        .style(Theme::button_style())
        .alignment(Alignment::Center)
        .render(Rect::new(area.x, area.y + y, area.width, area.height.min(1)), buf);
}
