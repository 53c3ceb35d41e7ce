//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a background task that
//! forwards them over a channel so the main loop stays non-blocking.

use std::time::Duration;

use crossterm::event::{
    self, Event as CtEvent, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use tokio::sync::mpsc;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Left button pressed at a terminal cell.
    Click { column: u16, row: u16 },
    /// Wheel scrolled; positive `lines` scroll the document down.
    Wheel { lines: i16 },
    Resize(u16, u16),
}

/// Map a crossterm mouse event to a click or wheel event.  Moves, drags and
/// other buttons are dropped.
fn map_mouse(m: MouseEvent) -> Option<AppEvent> {
    match m.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(AppEvent::Click {
            column: m.column,
            row: m.row,
        }),
        MouseEventKind::ScrollDown => Some(AppEvent::Wheel { lines: 3 }),
        MouseEventKind::ScrollUp => Some(AppEvent::Wheel { lines: -3 }),
        _ => None,
    }
}

/// Spawns a blocking reader that polls the terminal for events and sends them
/// through the returned channel.  It stops once the receiver is dropped.
pub fn spawn_event_reader(poll_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || {
        while !tx.is_closed() {
            // Poll with a timeout so a dropped receiver is noticed.
            if !event::poll(poll_rate).unwrap_or(false) {
                continue;
            }
            let Ok(ev) = event::read() else {
                continue;
            };
            let app_event = match ev {
                CtEvent::Key(k) if k.kind == KeyEventKind::Press => AppEvent::Key(k),
                CtEvent::Mouse(m) => match map_mouse(m) {
                    Some(e) => e,
                    None => continue,
                },
                CtEvent::Resize(w, h) => AppEvent::Resize(w, h),
                _ => continue,
            };
            if tx.send(app_event).is_err() {
                break;
            }
        }
    });

    rx
}
