//! Viewport tracking and the terminal-cell ↔ pixel mapping.

/// Most recent viewport measurement, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportState {
    pub width: f64,
    pub height: f64,
}

/// Anything that can report the current viewport size in pixels.
pub trait ViewportSource {
    fn inner_size(&self) -> (f64, f64);
}

impl ViewportState {
    /// Re-read the viewport size from `source`.
    pub fn refresh(&mut self, source: &impl ViewportSource) {
        let (width, height) = source.inner_size();
        self.width = width;
        self.height = height;
    }
}

/// Pixel size of one terminal cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width: f64,
    pub height: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 16.0,
        }
    }
}

impl CellMetrics {
    /// Derive cell size from the terminal's reported pixel dimensions,
    /// falling back to the default when the terminal reports none.
    pub fn from_window(columns: u16, rows: u16, px_width: u16, px_height: u16) -> Self {
        if columns == 0 || rows == 0 || px_width == 0 || px_height == 0 {
            return Self::default();
        }
        Self {
            width: px_width as f64 / columns as f64,
            height: px_height as f64 / rows as f64,
        }
    }

    pub fn cols_to_px(&self, cols: u16) -> f64 {
        cols as f64 * self.width
    }

    pub fn rows_to_px(&self, rows: u16) -> f64 {
        rows as f64 * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64, f64);

    impl ViewportSource for Fixed {
        fn inner_size(&self) -> (f64, f64) {
            (self.0, self.1)
        }
    }

    #[test]
    fn refresh_replaces_previous_measurement() {
        let mut viewport = ViewportState::default();
        viewport.refresh(&Fixed(1280.0, 800.0));
        viewport.refresh(&Fixed(640.0, 480.0));

        assert_eq!(viewport, ViewportState { width: 640.0, height: 480.0 });
    }

    #[test]
    fn cell_metrics_fall_back_without_pixel_size() {
        assert_eq!(CellMetrics::from_window(80, 24, 0, 0), CellMetrics::default());
    }

    #[test]
    fn cell_metrics_from_reported_pixels() {
        let cells = CellMetrics::from_window(100, 50, 1000, 1000);
        assert_eq!(cells.width, 10.0);
        assert_eq!(cells.height, 20.0);
        assert_eq!(cells.rows_to_px(3), 60.0);
    }
}
