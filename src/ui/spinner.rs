//! Loading indicator: a small spinner and label centred in a given area.

use ratatui::{buffer::Buffer, layout::Rect, text::Line, widgets::Widget};

use super::theme::Theme;

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner frame for `tick`.
pub fn frame(tick: u64) -> &'static str {
    SPINNER_FRAMES[(tick as usize) % SPINNER_FRAMES.len()]
}

/// "⠋ loading" centred in its area; shown while an image is pending.
pub struct LoadingIndicator<'a> {
    pub label: &'a str,
    /// Monotonically increasing tick counter (drives the spinner frame).
    pub tick: u64,
}

impl Widget for LoadingIndicator<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let text = format!("{} {}", frame(self.tick), self.label);
        let width = (text.chars().count() as u16).min(area.width);
        let x = area.x + (area.width - width) / 2;
        let y = area.y + area.height / 2;
        buf.set_line(x, y, &Line::styled(text, Theme::loading_style()), width);
    }
}
