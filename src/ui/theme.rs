//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme.  Change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── grid ───────────────────────────────────────────────────
    pub fn tile_border_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    /// Border of the item carrying the open preview.
    pub fn expanded_border_style() -> Style {
        Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tile_caption_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn button_style() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Gray)
            .add_modifier(Modifier::BOLD)
    }

    // ── preview ────────────────────────────────────────────────
    pub fn panel_style() -> Style {
        Style::default().bg(Color::Rgb(0x33, 0x33, 0x33)).fg(Color::White)
    }

    pub fn panel_border_style() -> Style {
        Style::default().fg(Color::Rgb(0x55, 0x55, 0x55))
    }

    pub fn close_style() -> Style {
        Style::default()
            .fg(Color::LightRed)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn description_style() -> Style {
        Style::default().fg(Color::Rgb(0xd6, 0xd6, 0xd6))
    }

    pub fn link_style() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Rgb(0x99, 0x99, 0x99))
            .add_modifier(Modifier::BOLD)
    }

    pub fn loading_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}
