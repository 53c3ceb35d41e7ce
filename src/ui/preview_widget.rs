//! Inline preview panel.
//!
//! Renders a close control, the full-image region (loading indicator while
//! the large image is pending) and the details region with the optional
//! "Visit website" link.  The panel is clipped to its current animated
//! height, so content is revealed as it opens.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::halfblocks;
use super::projection::{blit, Projection};
use super::spinner::LoadingIndicator;
use super::theme::Theme;
use crate::core::flow::DocRect;
use crate::core::preview::{ImageSlot, PanelView};

const CLOSE_LABEL: &str = "[x]";
const LINK_LABEL: &str = " Visit website ";

/// Clickable regions returned after rendering, in screen cells.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PreviewHitZones {
    pub close: Option<Rect>,
    pub link: Option<Rect>,
}

pub struct PreviewWidget<'a> {
    pub view: &'a PanelView<'a>,
    /// Visible panel rect in the document.
    pub rect: DocRect,
    /// Thumbnail of the expanded item; `▲` points at it.
    pub pointer: Option<DocRect>,
    pub projection: Projection,
    /// Viewport below the compact width: no full-image region.
    pub compact: bool,
    pub tick: u64,
}

/// Local (panel-relative) positions of the interactive parts.
#[derive(Debug, Default)]
struct LocalZones {
    close: Option<Rect>,
    link: Option<Rect>,
}

impl PreviewWidget<'_> {
    /// Render and return hit zones for mouse interaction.
    pub fn render_and_hit(self, buf: &mut Buffer) -> PreviewHitZones {
        let panel_box = self.projection.cell_box(&self.rect);
        let Some(clip) = self.projection.visible(panel_box) else {
            return PreviewHitZones::default();
        };

        let mut scratch = Buffer::empty(panel_box.local());
        let local = self.render_local(&mut scratch);

        if let Some(pointer) = self.pointer.filter(|_| self.view.active) {
            let thumb = self.projection.cell_box(&pointer);
            let col = thumb.x + thumb.width as i32 / 2 - panel_box.x;
            if col >= 0 && (col as u16) < scratch.area.width && scratch.area.height > 0 {
                if let Some(cell) = scratch.cell_mut(Position::new(col as u16, 0)) {
                    cell.set_char('▲').set_style(Theme::expanded_border_style());
                }
            }
        }

        blit(&scratch, panel_box, clip, buf);

        let to_screen = |r: Rect| self.projection.visible(panel_box.offset(r));
        PreviewHitZones {
            close: local.close.and_then(to_screen),
            link: local.link.and_then(to_screen),
        }
    }

    fn render_local(&self, buf: &mut Buffer) -> LocalZones {
        let area = buf.area;
        let mut zones = LocalZones::default();
        if area.width < 4 || area.height == 0 {
            return zones;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::panel_border_style())
            .style(Theme::panel_style());
        let inner = block.inner(area);
        block.render(area, buf);

        let close = Rect::new(area.width.saturating_sub(5), 0, 3, 1);
        Paragraph::new(Span::styled(CLOSE_LABEL, Theme::close_style())).render(close, buf);
        zones.close = Some(close);

        if inner.width == 0 || inner.height == 0 {
            return zones;
        }

        let details = if self.compact {
            inner
        } else {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(inner);
            self.render_image_region(halves[0], buf);
            halves[1]
        };
        zones.link = self.render_details(details, buf);
        zones
    }

    fn render_image_region(&self, area: Rect, buf: &mut Buffer) {
        let area = area.inner(ratatui::layout::Margin::new(1, 0));
        match self.view.image {
            Some(ImageSlot::Ready(img)) => halfblocks::render_image(img, area, buf),
            Some(ImageSlot::Pending) => LoadingIndicator {
                label: "loading",
                tick: self.tick,
            }
            .render(area, buf),
            // Collapsing previews hide their image; compact ones never load it.
            Some(ImageSlot::Hidden) | None => {}
        }
    }

    /// Title, description and link; returns the link's local rect.
    fn render_details(&self, area: Rect, buf: &mut Buffer) -> Option<Rect> {
        let area = area.inner(ratatui::layout::Margin::new(2, 1));
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let content = self.view.content;

        Paragraph::new(Line::styled(content.title.as_str(), Theme::title_style()))
            .render(Rect::new(area.x, area.y, area.width, 1), buf);

        // Link pinned to the bottom of the region.
        let link = content.link.as_ref().and_then(|_| {
            if area.height < 3 {
                return None;
            }
            let width = (LINK_LABEL.chars().count() as u16).min(area.width);
            Some(Rect::new(area.x, area.bottom() - 1, width, 1))
        });
        if let Some(link) = link {
            Paragraph::new(Span::styled(LINK_LABEL, Theme::link_style())).render(link, buf);
        }

        let desc_top = area.y + 2;
        let desc_bottom = link.map_or(area.bottom(), |l| l.y.saturating_sub(1));
        if desc_bottom > desc_top {
            Paragraph::new(content.description.as_str())
                .style(Theme::description_style())
                .wrap(Wrap { trim: true })
                .render(Rect::new(area.x, desc_top, area.width, desc_bottom - desc_top), buf);
        }
        link
    }
}
