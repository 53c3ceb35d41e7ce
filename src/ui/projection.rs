//! Mapping between document pixels and terminal cells.
//!
//! Widgets that may be partly scrolled out of view draw into a scratch
//! buffer of their full cell size, then [`blit`] copies the visible part.

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
};

use crate::core::flow::DocRect;
use crate::core::viewport::CellMetrics;

/// A cell-space box that may extend past the screen edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBox {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl CellBox {
    /// Same size, at the origin; the area of a scratch buffer.
    pub fn local(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Sub-box at `local` (relative to this box).
    pub fn offset(&self, local: Rect) -> CellBox {
        CellBox {
            x: self.x + local.x as i32,
            y: self.y + local.y as i32,
            width: local.width,
            height: local.height,
        }
    }
}

/// The grid area, scrolled to `scroll` document pixels.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub area: Rect,
    pub cells: CellMetrics,
    pub scroll: f64,
}

impl Projection {
    /// Cells covered by a document rect.  Edges are rounded so that
    /// neighbouring rects never share a cell.
    pub fn cell_box(&self, r: &DocRect) -> CellBox {
        let col0 = (r.x / self.cells.width).round() as i32;
        let col1 = (r.right() / self.cells.width).round() as i32;
        let row0 = ((r.y - self.scroll) / self.cells.height).round() as i32;
        let row1 = ((r.bottom() - self.scroll) / self.cells.height).round() as i32;
        CellBox {
            x: self.area.x as i32 + col0,
            y: self.area.y as i32 + row0,
            width: (col1 - col0).clamp(0, u16::MAX as i32) as u16,
            height: (row1 - row0).clamp(0, u16::MAX as i32) as u16,
        }
    }

    /// On-screen part of `b`, if any.
    pub fn visible(&self, b: CellBox) -> Option<Rect> {
        let x0 = b.x.max(self.area.x as i32);
        let y0 = b.y.max(self.area.y as i32);
        let x1 = (b.x + b.width as i32).min(self.area.right() as i32);
        let y1 = (b.y + b.height as i32).min(self.area.bottom() as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16))
    }

    /// Document point under the centre of a screen cell.
    pub fn to_doc(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        if !self.area.contains(Position::new(column, row)) {
            return None;
        }
        let x = ((column - self.area.x) as f64 + 0.5) * self.cells.width;
        let y = ((row - self.area.y) as f64 + 0.5) * self.cells.height + self.scroll;
        Some((x, y))
    }
}

/// Copy `src` (whose area starts at the origin) onto `dst` at `at`,
/// skipping cells outside `clip`.
pub fn blit(src: &Buffer, at: CellBox, clip: Rect, dst: &mut Buffer) {
    for y in 0..src.area.height {
        let sy = at.y + y as i32;
        if sy < clip.y as i32 || sy >= clip.bottom() as i32 {
            continue;
        }
        for x in 0..src.area.width {
            let sx = at.x + x as i32;
            if sx < clip.x as i32 || sx >= clip.right() as i32 {
                continue;
            }
            let target = Position::new(sx as u16, sy as u16);
            if let (Some(cell), Some(out)) = (src.cell(Position::new(x, y)), dst.cell_mut(target)) {
                *out = cell.clone();
            }
        }
    }
}
