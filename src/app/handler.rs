//! Input handling: maps key/mouse events to state mutations.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;

use super::event::AppEvent;
use super::image_runtime::ImageUpdate;
use super::state::AppState;

/// Dispatch one terminal event.
pub fn handle_event(state: &mut AppState, event: AppEvent, now: Instant) {
    match event {
        AppEvent::Key(key) => handle_key(state, key),
        AppEvent::Click { column, row } => handle_click(state, column, row, now),
        AppEvent::Wheel { lines } => handle_wheel(state, lines, now),
        AppEvent::Resize(w, h) => state.on_resize(Rect::new(0, 0, w, h), now),
    }
}

/// Keys only quit; everything else is mouse driven.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
    if ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
        state.should_quit = true;
    }
}

/// Left click at a terminal cell.
pub fn handle_click(state: &mut AppState, column: u16, row: u16, now: Instant) {
    if !state.wired {
        return;
    }

    if state.preview_hits.close.is_some_and(|r| point_in_rect(r, column, row)) {
        state.preview.close(now);
        return;
    }
    if state.preview_hits.link.is_some_and(|r| point_in_rect(r, column, row)) {
        if let Some(link) = state.preview.active().and_then(|a| a.content().link.clone()) {
            tracing::info!(%link, "visiting");
            state.visited_url = Some(link);
            state.should_quit = true;
        }
        return;
    }
    if state.grid_hits.load_more.is_some_and(|r| point_in_rect(r, column, row)) {
        state.request_next_page();
        return;
    }

    let Some((x, y)) = state.projection().to_doc(column, row) else {
        return;
    };
    if let Some(index) = state.flow(now).trigger_at(x, y) {
        state.toggle(index, now);
    }
}

/// Scroll the document by whole terminal rows.
pub fn handle_wheel(state: &mut AppState, lines: i16, now: Instant) {
    let flow = state.flow(now);
    let max = state.max_scroll(&flow);
    let delta = f64::from(lines) * state.cells.height;
    state.scroll.scroll_by(delta, max);
}

/// Apply a finished background image job.
pub fn handle_image_update(state: &mut AppState, update: ImageUpdate, now: Instant) {
    match update {
        ImageUpdate::Large { preview, src, result } => match result {
            Ok(image) => {
                if state.preview.on_image_loaded(&src, image) {
                    tracing::debug!(preview, %src, "large image installed");
                }
            }
            Err(e) => {
                tracing::warn!(preview, %src, "large image failed: {e}");
                let current = state
                    .preview
                    .active()
                    .is_some_and(|a| a.content().image_src.as_ref() == Some(&src));
                if current {
                    state.status_message = Some(format!("Could not load {src}"));
                }
            }
        },
        ImageUpdate::PageSettled { page, thumbs } => state.on_page_settled(page, thumbs, now),
    }
}

fn point_in_rect(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}
