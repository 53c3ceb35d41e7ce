//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use ratatui::layout::Rect;
use url::Url;

use crate::config::AppConfig;
use crate::core::{
    flow::{GridFlow, PanelSlot},
    item::{self, GridItem, ItemIndex, ItemPayload},
    layout,
    manifest::Manifest,
    preview::{Effect, ImageSlot, PreviewController, PreviewId, Stage},
    scan::{self, ScanConfig},
    source,
    viewport::{CellMetrics, ViewportSource, ViewportState},
};
use crate::ui::{
    grid_widget::{Footer, GridHitZones, FOOTER_PX},
    layout::AppLayout,
    preview_widget::PreviewHitZones,
    projection::Projection,
    smooth_scroll::SmoothScroll,
};

use super::debounce::{Debouncer, RESIZE_QUIET};
use super::image_runtime::Thumbs;

/// Frame interval while anything moves.
pub const FRAME: Duration = Duration::from_millis(16);
/// Spinner interval while something loads.
const SPINNER_FRAME: Duration = Duration::from_millis(80);

/// One source of grid items.
#[derive(Debug)]
pub struct Page {
    pub label: String,
    pub document: Arc<Url>,
    pub items: Vec<ItemPayload>,
    /// Indices of the page's items once appended.
    pub range: Option<Range<ItemIndex>>,
}

impl Page {
    /// Load a manifest file or scan an image directory.
    pub fn load(path: &Path, scan_config: &ScanConfig) -> anyhow::Result<Self> {
        let (document, items) = if path.is_dir() {
            let document = source::document_for_dir(path)?;
            (document, scan::scan_images(path, scan_config))
        } else {
            let manifest = Manifest::load(path)?;
            (manifest.document, manifest.items)
        };
        tracing::info!(source = %path.display(), items = items.len(), "loaded page");
        Ok(Self {
            label: path.display().to_string(),
            document: Arc::new(document),
            items,
            range: None,
        })
    }

    /// Resolved thumbnail sources; unresolvable ones stay `None`.
    pub fn thumb_sources(&self) -> Vec<Option<Url>> {
        self.items
            .iter()
            .map(|p| match source::resolve(&p.thumb, &self.document) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(title = %p.title, "thumbnail unavailable: {e}");
                    None
                }
            })
            .collect()
    }
}

/// The grid area measured in pixels.
struct GridViewport {
    area: Rect,
    cells: CellMetrics,
}

impl ViewportSource for GridViewport {
    fn inner_size(&self) -> (f64, f64) {
        (self.cells.cols_to_px(self.area.width), self.cells.rows_to_px(self.area.height))
    }
}

/// Top-level application state.
pub struct AppState {
    pub config: AppConfig,
    /// Every registered item, in order.
    pub items: Vec<GridItem>,
    /// Decoded thumbnails, indexed like `items`.
    pub thumbs: Thumbs,
    /// All pages; the first is the initial grid.
    pub pages: Vec<Page>,
    /// Page currently preloading.
    pub preloading: Option<usize>,
    pub preview: PreviewController,
    /// Cached viewport, refreshed at start-up and after a resize settles.
    pub viewport: ViewportState,
    pub cells: CellMetrics,
    /// Live grid area on screen.
    pub grid_area: Rect,
    pub scroll: SmoothScroll,
    /// Clicks are ignored until the initial thumbnails have settled.
    pub wired: bool,
    pub resize: Debouncer,
    pub grid_hits: GridHitZones,
    /// Hit zones of the active preview panel.
    pub preview_hits: PreviewHitZones,
    /// Large images to load (drained by the runtime).
    pub image_requests: Vec<(PreviewId, Url)>,
    /// Pages whose thumbnails should be preloaded (drained by the runtime).
    pub preload_requests: Vec<usize>,
    /// Link followed by the user, printed for the shell wrapper.
    pub visited_url: Option<String>,
    pub status_message: Option<String>,
    pub should_quit: bool,
    /// Monotonic frame counter (drives spinners).
    pub tick: u64,
}

impl AppState {
    pub fn new(config: AppConfig, pages: Vec<Page>, terminal_area: Rect, cells: CellMetrics) -> Self {
        let preview = PreviewController::new(config.settings.clone());
        let mut state = Self {
            config,
            items: Vec::new(),
            thumbs: Vec::new(),
            pages,
            preloading: None,
            preview,
            viewport: ViewportState::default(),
            cells,
            grid_area: AppLayout::from_area(terminal_area).grid_area,
            scroll: SmoothScroll::new(0.3),
            wired: false,
            resize: Debouncer::new(RESIZE_QUIET),
            grid_hits: GridHitZones::default(),
            preview_hits: PreviewHitZones::default(),
            image_requests: Vec::new(),
            preload_requests: Vec::new(),
            visited_url: None,
            status_message: None,
            should_quit: false,
            tick: 0,
        };
        state.refresh_viewport();

        // The initial grid is shown at once; events wait for its thumbnails.
        if let Some(first) = state.pages.first_mut() {
            let payloads = std::mem::take(&mut first.items);
            let range = item::register(&mut state.items, payloads, Arc::clone(&first.document));
            state.thumbs.resize(state.items.len(), None);
            first.range = Some(range);
            state.preloading = Some(0);
            state.preload_requests.push(0);
        }
        state
    }

    // ── geometry ────────────────────────────────────────────────

    /// Live layout at `now`, including every preview's animated height.
    pub fn flow(&self, now: Instant) -> GridFlow {
        let slots: Vec<PanelSlot> = self
            .preview
            .panels(now)
            .iter()
            .map(|p| PanelSlot {
                anchor: p.anchor,
                item_height: p.item_height,
            })
            .collect();
        GridFlow::compute(self.config.flow, self.items.len(), self.live_width(), &slots)
    }

    /// Width of the grid area right now (the cached viewport may lag).
    fn live_width(&self) -> f64 {
        self.cells.cols_to_px(self.grid_area.width)
    }

    pub fn footer(&self) -> Footer {
        match self.preloading {
            Some(page) if page > 0 => Footer::Loading { tick: self.tick },
            _ if self.next_page().is_some() => Footer::LoadMore,
            _ => Footer::None,
        }
    }

    pub fn document_height(&self, flow: &GridFlow) -> f64 {
        match self.footer() {
            Footer::None => flow.document_height(),
            _ => flow.document_height() + FOOTER_PX,
        }
    }

    /// Largest scroll offset for `flow`.
    pub fn max_scroll(&self, flow: &GridFlow) -> f64 {
        (self.document_height(flow) - self.cells.rows_to_px(self.grid_area.height)).max(0.0)
    }

    pub fn projection(&self) -> Projection {
        Projection {
            area: self.grid_area,
            cells: self.cells,
            scroll: self.scroll.offset(),
        }
    }

    fn refresh_viewport(&mut self) {
        self.viewport.refresh(&GridViewport {
            area: self.grid_area,
            cells: self.cells,
        });
    }

    // ── pages ───────────────────────────────────────────────────

    /// First page not yet appended.
    pub fn next_page(&self) -> Option<usize> {
        self.pages.iter().position(|p| p.range.is_none())
    }

    /// Start preloading the next page, unless one is already underway.
    pub fn request_next_page(&mut self) {
        if self.preloading.is_some() {
            return;
        }
        if let Some(page) = self.next_page() {
            tracing::debug!(page, "preloading next page");
            self.preloading = Some(page);
            self.preload_requests.push(page);
        }
    }

    /// Sources to preload for `page`.
    pub fn page_thumb_sources(&self, page: usize) -> Vec<Option<Url>> {
        match self.pages.get(page) {
            // The initial page's payloads already live in `items`.
            Some(Page { range: Some(range), document, .. }) => self.items[range.clone()]
                .iter()
                .map(|item| source::resolve(&item.payload.thumb, document).ok())
                .collect(),
            Some(p) => p.thumb_sources(),
            None => Vec::new(),
        }
    }

    /// Every thumbnail of `page` has settled: finish start-up or append.
    ///
    /// Appended items are measured from the live flow, so an open preview's
    /// enlarged item inflates their cached offsets until the next resize.
    pub fn on_page_settled(&mut self, page: usize, thumbs: Thumbs, now: Instant) {
        if self.preloading == Some(page) {
            self.preloading = None;
        }
        let Some(entry) = self.pages.get_mut(page) else {
            return;
        };

        match entry.range.clone() {
            Some(range) => {
                // Initial grid: install thumbnails, take the first
                // measurement and start accepting clicks.
                for (slot, thumb) in range.zip(thumbs) {
                    self.thumbs[slot] = thumb;
                }
                let flow = self.flow(now);
                layout::remeasure(&mut self.items, &flow, true);
                self.wired = true;
                tracing::info!(items = self.items.len(), "grid ready");
            }
            None => {
                let payloads = std::mem::take(&mut entry.items);
                let document = Arc::clone(&entry.document);
                let label = entry.label.clone();
                let range = item::register(&mut self.items, payloads, document);
                entry.range = Some(range.clone());
                self.thumbs.resize(self.items.len(), None);
                for (slot, thumb) in range.clone().zip(thumbs) {
                    self.thumbs[slot] = thumb;
                }
                let flow = self.flow(now);
                layout::record(&mut self.items, range.clone(), &flow);
                tracing::info!(page, source = %label, appended = range.len(), "page appended");
                self.status_message = Some(format!(" {} more items from {label}", range.len()));
            }
        }
    }

    // ── preview plumbing ────────────────────────────────────────

    /// Trigger click on item `index`.
    pub fn toggle(&mut self, index: ItemIndex, now: Instant) {
        self.status_message = None;
        let flow = self.flow(now);
        let stage = Stage {
            items: &self.items,
            viewport: self.viewport,
            surface: &flow,
        };
        let effects = self.preview.toggle(index, &stage, now);
        self.apply_effects(effects, now);
    }

    /// Run due preview steps.
    pub fn advance(&mut self, now: Instant) {
        let flow = self.flow(now);
        let stage = Stage {
            items: &self.items,
            viewport: self.viewport,
            surface: &flow,
        };
        let effects = self.preview.advance(now, &stage);
        self.apply_effects(effects, now);
    }

    fn apply_effects(&mut self, effects: Vec<Effect>, now: Instant) {
        for effect in effects {
            match effect {
                Effect::LoadImage { preview, src } => self.image_requests.push((preview, src)),
                Effect::ScrollTo { top } => {
                    // Clamp against the layout the transitions are heading to.
                    let settled = self.flow(now + self.preview.settings().speed);
                    let max = self.max_scroll(&settled);
                    self.scroll.scroll_to(top, max);
                }
            }
        }
    }

    // ── resize ──────────────────────────────────────────────────

    /// Terminal resized: re-lay out at once, reset caches once it settles.
    pub fn on_resize(&mut self, terminal_area: Rect, now: Instant) {
        self.grid_area = AppLayout::from_area(terminal_area).grid_area;
        self.resize.call(now);
    }

    /// Debounced resize handler.
    pub fn settle_resize(&mut self, now: Instant) {
        if !self.resize.fire(now) {
            return;
        }
        self.refresh_viewport();
        self.preview.force_close();
        let flow = self.flow(now);
        layout::remeasure(&mut self.items, &flow, false);
        let max = self.max_scroll(&flow);
        self.scroll.clamp(max);
        tracing::debug!(width = self.viewport.width, height = self.viewport.height, "resize settled");
    }

    // ── clock ───────────────────────────────────────────────────

    /// When the main loop must wake up next without input.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        let animating = self.preview.is_animating(now) || self.scroll.is_animating();
        let loading = self.preloading.is_some()
            || self
                .preview
                .active()
                .is_some_and(|a| matches!(a.image(), ImageSlot::Pending));

        let frame = if animating {
            Some(now + FRAME)
        } else if loading {
            Some(now + SPINNER_FRAME)
        } else {
            None
        };
        [self.preview.next_deadline(now), self.resize.deadline(), frame]
            .into_iter()
            .flatten()
            .min()
    }
}

/// Load every source given on the command line.
pub fn load_pages(sources: &[PathBuf], scan_config: &ScanConfig) -> anyhow::Result<Vec<Page>> {
    sources
        .iter()
        .map(|path| Page::load(path, scan_config).with_context(|| format!("cannot load {}", path.display())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, CliOverrides, ConfigFile};
    use crate::core::item::fixtures;
    use crate::core::preview::SETTLE_DELAY;

    fn config() -> AppConfig {
        AppConfig::resolve(ConfigFile::default(), CliOverrides::default()).unwrap()
    }

    fn page(n: usize) -> Page {
        Page {
            label: format!("page {n}"),
            document: fixtures::document(),
            items: (0..n).map(fixtures::payload).collect(),
            range: None,
        }
    }

    /// 160 × 60 cells at 8 × 16 px: a 1280 × 944 px grid (one status row).
    fn state(pages: Vec<Page>) -> AppState {
        AppState::new(config(), pages, Rect::new(0, 0, 160, 60), CellMetrics::default())
    }

    fn settle_first_page(state: &mut AppState, now: Instant) {
        let n = state.items.len();
        state.on_page_settled(0, vec![None; n], now);
    }

    #[test]
    fn initial_page_waits_for_thumbnails() {
        // GIVEN a grid with eight items
        let t0 = Instant::now();
        let mut s = state(vec![page(8)]);

        // THEN items are registered but clicks are not wired yet
        assert_eq!(s.items.len(), 8);
        assert!(!s.wired);
        assert_eq!(s.preload_requests, vec![0]);
        assert_eq!(s.viewport, ViewportState { width: 1280.0, height: 944.0 });

        // WHEN the thumbnails settle
        settle_first_page(&mut s, t0);

        // THEN items are measured: four 250 px columns, rows 260 px apart
        assert!(s.wired);
        assert_eq!(s.items[3].offset_top, 10.0);
        assert_eq!(s.items[4].offset_top, 270.0);
        assert!(s.items.iter().all(|i| i.height == 250.0));
    }

    #[test]
    fn load_more_appends_and_records_next_page() {
        let t0 = Instant::now();
        let mut s = state(vec![page(4), page(2)]);
        settle_first_page(&mut s, t0);
        assert_eq!(s.footer(), Footer::LoadMore);

        s.request_next_page();
        assert_eq!(s.preload_requests, vec![0, 1]);
        assert!(matches!(s.footer(), Footer::Loading { .. }));

        s.on_page_settled(1, vec![None, None], t0);

        assert_eq!(s.items.len(), 6);
        assert_eq!(s.thumbs.len(), 6);
        assert_eq!(s.items[4].offset_top, 270.0);
        assert_eq!(s.footer(), Footer::None);
    }

    #[test]
    fn click_opens_preview_after_settling() {
        let t0 = Instant::now();
        let mut s = state(vec![page(8)]);
        settle_first_page(&mut s, t0);

        s.toggle(5, t0);
        assert_eq!(s.preview.expanded(), Some(5));
        assert_eq!(s.image_requests.len(), 1);

        s.advance(t0 + SETTLE_DELAY);
        assert!(s.preview.active().and_then(|a| a.heights()).is_some());
        assert!(s.next_deadline(t0 + SETTLE_DELAY).is_some());
    }

    #[test]
    fn resize_settles_after_quiet_period() {
        let t0 = Instant::now();
        let mut s = state(vec![page(8)]);
        settle_first_page(&mut s, t0);
        s.toggle(0, t0);
        s.advance(t0 + SETTLE_DELAY);

        // WHEN the terminal shrinks to two columns of items
        s.on_resize(Rect::new(0, 0, 66, 60), t0 + SETTLE_DELAY);
        s.settle_resize(t0 + SETTLE_DELAY);
        assert!(s.preview.active().is_some(), "resize handling is debounced");

        let later = t0 + SETTLE_DELAY + RESIZE_QUIET;
        s.settle_resize(later);

        // THEN the preview is gone and offsets reflect the new layout
        assert!(s.preview.active().is_none());
        assert_eq!(s.preview.collapsing_count(), 0);
        assert_eq!(s.viewport.width, 528.0);
        assert_eq!(s.items[2].offset_top, 270.0);
    }
}
