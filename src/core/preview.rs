//! Preview controller: owns the single expanding preview.
//!
//! ## Lifecycle
//!
//! * `Closed` → [`show`](PreviewController::show) allocates a preview bound
//!   to the item and schedules its open step after [`SETTLE_DELAY`].
//! * `Open` → `show` of an item in the same row rebinds the existing
//!   preview in place; `show` of an item in another row closes the current
//!   preview and opens a new one.
//! * [`close`](PreviewController::close) moves the preview to the
//!   collapsing list; after the settling delay its heights animate back
//!   and, once the item's height transition ends, it is detached.
//! * [`force_close`](PreviewController::force_close) drops everything at
//!   once (window resize).
//!
//! Nothing here touches the terminal.  Time is passed in explicitly and
//! side effects the runtime must perform come back as [`Effect`]s.

use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbaImage;
use url::Url;

use super::item::{GridItem, ItemIndex};
use super::layout::LayoutSurface;
use super::position::{self, PreviewHeights, ScrollInputs};
use super::settings::Settings;
use super::source;
use super::transition::Transition;
use super::viewport::ViewportState;

/// Pause between a structural change and measuring/animating it.
pub const SETTLE_DELAY: Duration = Duration::from_millis(25);

/// Identity of one preview allocation.
pub type PreviewId = u64;

/// Work the runtime performs on the controller's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Begin loading `src` for `preview`.
    LoadImage { preview: PreviewId, src: Url },
    /// Smoothly scroll the document to `top`.
    ScrollTo { top: f64 },
}

/// Text and link shown in the details region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewContent {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    /// Resolved large-image source of the bound item.
    pub image_src: Option<Url>,
}

/// State of the full-image region.
#[derive(Debug, Clone)]
pub enum ImageSlot {
    /// Region not displayed (compact viewport); nothing is loaded.
    Hidden,
    /// Loading indicator visible.
    Pending,
    Ready(Arc<RgbaImage>),
}

/// What the controller reads from the world when it acts.
pub struct Stage<'a, S: LayoutSurface> {
    pub items: &'a [GridItem],
    pub viewport: ViewportState,
    pub surface: &'a S,
}

/// The open preview.
#[derive(Debug)]
pub struct ActivePreview {
    id: PreviewId,
    /// Item whose content is shown (the "expanded" item).
    bound: ItemIndex,
    /// Item the preview was created for; its height is the one enlarged.
    anchor: ItemIndex,
    /// Cached offset of the row the preview belongs to.
    row_position: f64,
    /// Computed by the open step.
    heights: Option<PreviewHeights>,
    content: PreviewContent,
    image: ImageSlot,
    panel: Transition,
    item: Transition,
}

impl ActivePreview {
    pub fn id(&self) -> PreviewId {
        self.id
    }
    pub fn bound(&self) -> ItemIndex {
        self.bound
    }
    pub fn anchor(&self) -> ItemIndex {
        self.anchor
    }
    pub fn heights(&self) -> Option<PreviewHeights> {
        self.heights
    }
    pub fn content(&self) -> &PreviewContent {
        &self.content
    }
    pub fn image(&self) -> &ImageSlot {
        &self.image
    }
}

/// A closed preview animating away.
#[derive(Debug)]
struct CollapsingPreview {
    id: PreviewId,
    anchor: ItemIndex,
    content: PreviewContent,
    panel: Transition,
    item: Transition,
    /// The close step has run and heights are heading back.
    started: bool,
}

/// A preview panel as the renderer sees it at one instant.
#[derive(Debug)]
pub struct PanelView<'a> {
    pub id: PreviewId,
    pub anchor: ItemIndex,
    pub panel_height: f64,
    pub item_height: f64,
    pub content: &'a PreviewContent,
    /// `None` while collapsing: the image is hidden during teardown.
    pub image: Option<&'a ImageSlot>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Instant,
    preview: PreviewId,
    step: Step,
}

/// The preview state machine.
#[derive(Debug)]
pub struct PreviewController {
    settings: Settings,
    active: Option<ActivePreview>,
    collapsing: Vec<CollapsingPreview>,
    pending: Vec<Pending>,
    /// Height of a removed preview above the next one; consumed by the
    /// next positioning.
    scroll_extra: f64,
    next_id: PreviewId,
}

impl PreviewController {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            active: None,
            collapsing: Vec::new(),
            pending: Vec::new(),
            scroll_extra: 0.0,
            next_id: 1,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn active(&self) -> Option<&ActivePreview> {
        self.active.as_ref()
    }

    /// The item carrying the expanded state, if any.
    pub fn expanded(&self) -> Option<ItemIndex> {
        self.active.as_ref().map(|a| a.bound)
    }

    pub fn scroll_extra(&self) -> f64 {
        self.scroll_extra
    }

    /// Number of closed previews still animating away.
    pub fn collapsing_count(&self) -> usize {
        self.collapsing.len()
    }

    // ── transitions ─────────────────────────────────────────────

    /// Trigger click: close the expanded item, show any other.
    pub fn toggle<S: LayoutSurface>(
        &mut self,
        index: ItemIndex,
        stage: &Stage<'_, S>,
        now: Instant,
    ) -> Vec<Effect> {
        if self.expanded() == Some(index) {
            self.close(now);
            Vec::new()
        } else {
            self.show(index, stage, now)
        }
    }

    /// Show the preview for item `index`.
    pub fn show<S: LayoutSurface>(
        &mut self,
        index: ItemIndex,
        stage: &Stage<'_, S>,
        now: Instant,
    ) -> Vec<Effect> {
        let Some(item) = stage.items.get(index) else {
            tracing::warn!(index, "show requested for unknown item");
            return Vec::new();
        };

        self.scroll_extra = 0.0;
        let position = item.offset_top;

        if let Some(active) = &self.active {
            // Same row iff the cached offsets are equal.
            if active.row_position == position {
                return self.update(index, stage);
            }
            // Removing a preview above shifts the new one up by its height.
            if position > active.row_position {
                self.scroll_extra = active.heights.map_or(0.0, |h| h.preview);
            }
            self.close(now);
        }

        let id = self.next_id;
        self.next_id += 1;
        let mut preview = ActivePreview {
            id,
            bound: index,
            anchor: index,
            row_position: position,
            heights: None,
            content: PreviewContent::default(),
            image: ImageSlot::Hidden,
            panel: Transition::at_rest(0.0, now),
            item: Transition::at_rest(item.height, now),
        };
        let effects = bind_content(&self.settings, &mut preview, item, stage.viewport);
        tracing::debug!(id, index, row = position, "preview created");

        self.active = Some(preview);
        self.schedule(id, Step::Open, now);
        effects
    }

    /// Rebind the open preview to another item of its row.
    fn update<S: LayoutSurface>(&mut self, index: ItemIndex, stage: &Stage<'_, S>) -> Vec<Effect> {
        let (Some(active), Some(item)) = (self.active.as_mut(), stage.items.get(index)) else {
            return Vec::new();
        };
        tracing::debug!(id = active.id, from = active.bound, to = index, "same-row preview update");
        active.bound = index;

        let mut effects = Vec::new();
        // Before the open step the pending step positions the preview.
        if let Some(heights) = active.heights {
            if let Some(top) = position_preview(active, heights, stage, &mut self.scroll_extra) {
                effects.push(Effect::ScrollTo { top });
            }
        }
        effects.extend(bind_content(&self.settings, active, item, stage.viewport));
        effects
    }

    /// Close the open preview with an animated teardown.
    pub fn close(&mut self, now: Instant) {
        let Some(active) = self.active.take() else {
            return;
        };
        // A pending open for this preview is superseded.
        self.pending.retain(|p| p.preview != active.id);
        tracing::debug!(id = active.id, anchor = active.anchor, "preview closing");

        self.collapsing.push(CollapsingPreview {
            id: active.id,
            anchor: active.anchor,
            content: active.content,
            panel: active.panel,
            item: active.item,
            started: false,
        });
        self.schedule(active.id, Step::Close, now);
    }

    /// Drop every preview immediately.
    pub fn force_close(&mut self) {
        if self.active.is_some() || !self.collapsing.is_empty() {
            tracing::debug!("preview force-closed");
        }
        self.active = None;
        self.collapsing.clear();
        self.pending.clear();
        self.scroll_extra = 0.0;
    }

    /// Install a loaded large image if it still belongs to the bound item.
    /// Returns whether the image was installed.
    pub fn on_image_loaded(&mut self, src: &Url, image: Arc<RgbaImage>) -> bool {
        let Some(active) = self.active.as_mut() else {
            tracing::debug!(%src, "discarding image: no open preview");
            return false;
        };
        if active.content.image_src.as_ref() != Some(src) {
            tracing::debug!(%src, bound = active.bound, "discarding stale image");
            return false;
        }
        if matches!(active.image, ImageSlot::Hidden) {
            return false;
        }
        active.image = ImageSlot::Ready(image);
        true
    }

    // ── clock ───────────────────────────────────────────────────

    /// Run due steps and settle finished transitions.
    pub fn advance<S: LayoutSurface>(&mut self, now: Instant, stage: &Stage<'_, S>) -> Vec<Effect> {
        let mut effects = Vec::new();

        while let Some(pos) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by_key(|(_, p)| p.due)
            .map(|(i, _)| i)
        {
            let pending = self.pending.remove(pos);
            match pending.step {
                Step::Open => effects.extend(self.run_open(pending.preview, stage, now)),
                Step::Close => self.run_close(pending.preview, stage, now),
            }
        }

        // Detach collapsed previews whose item height reached its target.
        self.collapsing.retain(|c| {
            let done = c.started && !c.item.is_running(now);
            if done {
                tracing::debug!(id = c.id, anchor = c.anchor, "preview detached");
            }
            !done
        });

        effects
    }

    /// Earliest instant at which [`advance`](Self::advance) has work.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        let timers = self.pending.iter().map(|p| p.due);
        let active = self
            .active
            .iter()
            .flat_map(|a| [&a.panel, &a.item])
            .filter(|t| t.is_running(now))
            .map(Transition::ends_at);
        let collapsing = self
            .collapsing
            .iter()
            .filter(|c| c.started)
            .map(|c| c.item.ends_at().max(now));
        timers.chain(active).chain(collapsing).min()
    }

    /// Whether any height is in motion.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.active
            .iter()
            .any(|a| a.panel.is_running(now) || a.item.is_running(now))
            || self
                .collapsing
                .iter()
                .any(|c| c.panel.is_running(now) || c.item.is_running(now))
    }

    // ── rendering view ──────────────────────────────────────────

    /// Panels to draw, collapsing ones first.
    pub fn panels(&self, now: Instant) -> Vec<PanelView<'_>> {
        let collapsing = self.collapsing.iter().map(|c| PanelView {
            id: c.id,
            anchor: c.anchor,
            panel_height: c.panel.value_at(now),
            item_height: c.item.value_at(now),
            content: &c.content,
            image: None,
            active: false,
        });
        let active = self.active.iter().map(|a| PanelView {
            id: a.id,
            anchor: a.anchor,
            panel_height: a.panel.value_at(now),
            item_height: a.item.value_at(now),
            content: &a.content,
            image: Some(&a.image),
            active: true,
        });
        collapsing.chain(active).collect()
    }

    // ── steps ───────────────────────────────────────────────────

    fn schedule(&mut self, preview: PreviewId, step: Step, now: Instant) {
        self.pending.push(Pending {
            due: now + SETTLE_DELAY,
            preview,
            step,
        });
    }

    fn run_open<S: LayoutSurface>(
        &mut self,
        id: PreviewId,
        stage: &Stage<'_, S>,
        now: Instant,
    ) -> Option<Effect> {
        let active = self.active.as_mut().filter(|a| a.id == id)?;
        let item = stage.items.get(active.bound)?;

        let heights = position::calc_height(item.height, stage.viewport.height, self.settings.min_height);
        active.heights = Some(heights);
        if self.settings.animates() {
            let (speed, easing) = (self.settings.speed, self.settings.easing);
            active.panel.retarget(heights.preview, now, speed, easing);
            active.item.retarget(heights.item, now, speed, easing);
        } else {
            active.panel.jump(heights.preview, now);
            active.item.jump(heights.item, now);
        }
        tracing::debug!(id, preview = heights.preview, item = heights.item, "preview opening");

        position_preview(active, heights, stage, &mut self.scroll_extra).map(|top| Effect::ScrollTo { top })
    }

    fn run_close<S: LayoutSurface>(&mut self, id: PreviewId, stage: &Stage<'_, S>, now: Instant) {
        let Some(collapsing) = self.collapsing.iter_mut().find(|c| c.id == id) else {
            return;
        };
        let restore = stage
            .items
            .get(collapsing.anchor)
            .map_or_else(|| collapsing.item.target(), |item| item.height);

        collapsing.started = true;
        if self.settings.animates() {
            let (speed, easing) = (self.settings.speed, self.settings.easing);
            collapsing.panel.retarget(0.0, now, speed, easing);
            collapsing.item.retarget(restore, now, speed, easing);
        } else {
            collapsing.panel.jump(0.0, now);
            collapsing.item.jump(restore, now);
        }
    }
}

/// Fill `preview` with `item`'s content and start loading its image.
fn bind_content(
    settings: &Settings,
    preview: &mut ActivePreview,
    item: &GridItem,
    viewport: ViewportState,
) -> Vec<Effect> {
    let payload = &item.payload;
    let image_src = match source::resolve(&payload.largesrc, &item.document) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(index = item.index, "large image unavailable: {e}");
            None
        }
    };
    let link = if settings.show_visit_button {
        payload.url.clone().filter(|u| !u.is_empty())
    } else {
        None
    };
    preview.content = PreviewContent {
        title: payload.title.clone(),
        description: payload.description.clone(),
        link,
        image_src: image_src.clone(),
    };

    // The previous image is dropped before the next one loads.
    if viewport.width < settings.compact_width {
        preview.image = ImageSlot::Hidden;
        return Vec::new();
    }
    preview.image = ImageSlot::Pending;
    image_src
        .map(|src| Effect::LoadImage {
            preview: preview.id,
            src,
        })
        .into_iter()
        .collect()
}

/// Compute the scroll target for `active` and consume the pending extra.
fn position_preview<S: LayoutSurface>(
    active: &ActivePreview,
    heights: PreviewHeights,
    stage: &Stage<'_, S>,
    scroll_extra: &mut f64,
) -> Option<f64> {
    let item = stage.items.get(active.bound)?;
    let top = position::scroll_target(&ScrollInputs {
        item_top: item.offset_top,
        item_height: item.height,
        preview_height: heights.preview,
        panel_top: stage.surface.panel_top(active.anchor),
        pending_extra: *scroll_extra,
        viewport_height: stage.viewport.height,
    });
    *scroll_extra = 0.0;
    Some(top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::fixtures;
    use crate::core::position::MARGIN_EXPANDED;
    use crate::core::settings::PreviewOptions;

    const ITEM_H: f64 = 200.0;
    const ROW_STRIDE: f64 = ITEM_H + 10.0;

    /// Live layout: panels sit below their anchor's thumbnail, shifted
    /// down by `extra_above` (a collapsing preview higher up).
    struct Surface {
        extra_above: f64,
    }

    impl LayoutSurface for Surface {
        fn offset_top(&self, index: ItemIndex) -> f64 {
            (index / 3) as f64 * ROW_STRIDE
        }
        fn height(&self, _index: ItemIndex) -> f64 {
            ITEM_H
        }
        fn panel_top(&self, anchor: ItemIndex) -> f64 {
            self.offset_top(anchor) + ITEM_H + MARGIN_EXPANDED + self.extra_above
        }
    }

    struct World {
        items: Vec<GridItem>,
        surface: Surface,
        viewport: ViewportState,
    }

    impl World {
        /// Three rows of three items in a 1200×1000 viewport.
        fn new() -> Self {
            Self {
                items: fixtures::grid(3, 3, ITEM_H),
                surface: Surface { extra_above: 0.0 },
                viewport: ViewportState {
                    width: 1200.0,
                    height: 1000.0,
                },
            }
        }

        fn stage(&self) -> Stage<'_, Surface> {
            Stage {
                items: &self.items,
                viewport: self.viewport,
                surface: &self.surface,
            }
        }

        fn src(&self, index: ItemIndex) -> Url {
            source::resolve(&self.items[index].payload.largesrc, &self.items[index].document).unwrap()
        }
    }

    fn controller() -> PreviewController {
        PreviewController::new(Settings::default())
    }

    fn after(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    fn pixel() -> Arc<RgbaImage> {
        Arc::new(RgbaImage::new(1, 1))
    }

    #[test]
    fn show_from_closed_opens_after_settling_delay() {
        // GIVEN a closed controller
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();

        // WHEN item 4 is shown
        let effects = ctl.show(4, &world.stage(), t0);

        // THEN the preview exists immediately and starts loading the image
        assert_eq!(ctl.expanded(), Some(4));
        assert_eq!(
            effects,
            vec![Effect::LoadImage {
                preview: ctl.active().unwrap().id(),
                src: world.src(4)
            }]
        );
        // AND heights are only computed once the settling delay passed
        assert!(ctl.active().unwrap().heights().is_none());
        assert!(ctl.advance(after(t0, 10), &world.stage()).is_empty());

        let effects = ctl.advance(after(t0, 25), &world.stage());
        let heights = ctl.active().unwrap().heights().unwrap();
        assert_eq!(heights, PreviewHeights { preview: 656.0, item: 866.0 });
        // 656 + 200 + 10 fits in 1000: scroll to the row top
        assert_eq!(effects, vec![Effect::ScrollTo { top: ROW_STRIDE }]);
    }

    #[test]
    fn heights_animate_toward_their_targets() {
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.show(0, &world.stage(), t0);
        ctl.advance(after(t0, 25), &world.stage());

        let mid = ctl.panels(after(t0, 200));
        assert!(mid[0].panel_height > 0.0 && mid[0].panel_height < 656.0);

        let end = ctl.panels(after(t0, 25 + 350));
        assert_eq!(end[0].panel_height, 656.0);
        assert_eq!(end[0].item_height, 866.0);
    }

    #[test]
    fn toggling_the_open_item_closes_it() {
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();

        ctl.toggle(1, &world.stage(), t0);
        let effects = ctl.toggle(1, &world.stage(), t0);

        assert!(effects.is_empty());
        assert_eq!(ctl.expanded(), None);
    }

    #[test]
    fn repeated_toggles_alternate() {
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();

        for n in 1..=7 {
            ctl.toggle(5, &world.stage(), t0);
            let open = n % 2 == 1;
            assert_eq!(ctl.expanded().is_some(), open, "after {n} toggles");
        }
    }

    #[test]
    fn same_row_show_updates_in_place() {
        // GIVEN an open, fully laid out preview for item 3
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.show(3, &world.stage(), t0);
        ctl.advance(after(t0, 25), &world.stage());
        let id = ctl.active().unwrap().id();
        assert!(ctl.on_image_loaded(&world.src(3), pixel()));

        // WHEN item 5 (same row) is shown
        let effects = ctl.show(5, &world.stage(), after(t0, 500));

        // THEN the same preview is rebound, not recreated
        let active = ctl.active().unwrap();
        assert_eq!(active.id(), id);
        assert_eq!(active.bound(), 5);
        assert_eq!(active.anchor(), 3);
        assert_eq!(ctl.collapsing_count(), 0);
        // AND the previous image is gone before the new one loads
        assert!(matches!(active.image(), ImageSlot::Pending));
        assert_eq!(active.content().title, "Item 5");
        assert_eq!(
            effects,
            vec![
                Effect::ScrollTo { top: ROW_STRIDE },
                Effect::LoadImage {
                    preview: id,
                    src: world.src(5)
                },
            ]
        );
    }

    #[test]
    fn same_row_update_before_open_step_leaves_positioning_to_it() {
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.show(0, &world.stage(), t0);

        let effects = ctl.show(2, &world.stage(), after(t0, 5));

        assert!(effects.iter().all(|e| matches!(e, Effect::LoadImage { .. })));
        let effects = ctl.advance(after(t0, 25), &world.stage());
        assert_eq!(effects, vec![Effect::ScrollTo { top: 0.0 }]);
        assert_eq!(ctl.active().unwrap().bound(), 2);
    }

    #[test]
    fn different_row_below_closes_then_opens_with_scroll_extra() {
        // GIVEN an open preview on row 0
        let mut world = World::new();
        let mut ctl = PreviewController::new(
            Settings::resolve(&PreviewOptions {
                min_height: Some(900.0),
                ..PreviewOptions::default()
            })
            .unwrap(),
        );
        let t0 = Instant::now();
        ctl.show(1, &world.stage(), t0);
        ctl.advance(after(t0, 25), &world.stage());
        let old = ctl.active().unwrap().id();

        // WHEN an item on row 1 is shown
        let t1 = after(t0, 1000);
        ctl.show(4, &world.stage(), t1);

        // THEN the old preview collapses and a new one exists
        assert_eq!(ctl.collapsing_count(), 1);
        assert_ne!(ctl.active().unwrap().id(), old);
        // AND the old preview's height is carried forward
        assert_eq!(ctl.scroll_extra(), 900.0);

        // WHEN the open step runs while the old panel is still in the layout
        world.surface.extra_above = 900.0;
        let effects = ctl.advance(after(t1, 25), &world.stage());

        // THEN positioning subtracts it: 900 + 200 + 10 > 1000 and 900 < 1000,
        // so the panel bottom is aligned: (210 + 200 + 10 + 900 - 900) - (1000 - 900)
        assert_eq!(effects, vec![Effect::ScrollTo { top: 320.0 }]);
        // AND the extra is consumed exactly once
        assert_eq!(ctl.scroll_extra(), 0.0);
    }

    #[test]
    fn different_row_above_carries_no_scroll_extra() {
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.show(7, &world.stage(), t0);
        ctl.advance(after(t0, 25), &world.stage());

        ctl.show(1, &world.stage(), after(t0, 100));

        assert_eq!(ctl.scroll_extra(), 0.0);
        assert_eq!(ctl.expanded(), Some(1));
    }

    #[test]
    fn scroll_extra_resets_on_the_next_show() {
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.show(0, &world.stage(), t0);
        ctl.advance(after(t0, 25), &world.stage());
        ctl.show(4, &world.stage(), after(t0, 100));
        assert_eq!(ctl.scroll_extra(), 656.0);

        // A show that never reaches its open step leaves the extra pending,
        // but the next show starts from zero.
        ctl.show(5, &world.stage(), after(t0, 101));
        assert_eq!(ctl.scroll_extra(), 0.0);
    }

    #[test]
    fn stale_image_is_discarded() {
        // GIVEN a preview bound to item 0 loading X
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.show(0, &world.stage(), t0);

        // WHEN it is rebound to item 1 (loading Y) before X arrives
        ctl.show(1, &world.stage(), after(t0, 10));

        // THEN X is discarded and the slot still waits for Y
        assert!(!ctl.on_image_loaded(&world.src(0), pixel()));
        assert!(matches!(ctl.active().unwrap().image(), ImageSlot::Pending));

        // AND Y is installed when it arrives
        assert!(ctl.on_image_loaded(&world.src(1), pixel()));
        assert!(matches!(ctl.active().unwrap().image(), ImageSlot::Ready(_)));
    }

    #[test]
    fn image_after_close_is_discarded() {
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.show(0, &world.stage(), t0);
        ctl.close(t0);

        assert!(!ctl.on_image_loaded(&world.src(0), pixel()));
    }

    #[test]
    fn compact_viewport_skips_image_loading() {
        let mut world = World::new();
        world.viewport.width = 640.0;
        let mut ctl = controller();

        let effects = ctl.show(0, &world.stage(), Instant::now());

        assert!(effects.is_empty());
        assert!(matches!(ctl.active().unwrap().image(), ImageSlot::Hidden));
        assert!(!ctl.on_image_loaded(&world.src(0), pixel()));
    }

    #[test]
    fn close_detaches_after_the_height_transition() {
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.show(0, &world.stage(), t0);
        ctl.advance(after(t0, 25), &world.stage());

        let t1 = after(t0, 1000);
        ctl.close(t1);
        assert_eq!(ctl.expanded(), None);
        assert_eq!(ctl.collapsing_count(), 1);

        ctl.advance(after(t1, 25), &world.stage());
        ctl.advance(after(t1, 200), &world.stage());
        assert_eq!(ctl.collapsing_count(), 1);
        let panels = ctl.panels(after(t1, 200));
        assert!(panels[0].image.is_none());
        assert!(panels[0].item_height > ITEM_H);

        ctl.advance(after(t1, 25 + 350), &world.stage());
        assert_eq!(ctl.collapsing_count(), 0);
    }

    #[test]
    fn without_transitions_close_completes_synchronously() {
        let world = World::new();
        let mut ctl = PreviewController::new(
            Settings::resolve(&PreviewOptions {
                transitions: Some(false),
                ..PreviewOptions::default()
            })
            .unwrap(),
        );
        let t0 = Instant::now();
        ctl.show(0, &world.stage(), t0);
        ctl.advance(after(t0, 25), &world.stage());
        assert_eq!(ctl.panels(after(t0, 25))[0].panel_height, 656.0);

        ctl.close(after(t0, 30));
        ctl.advance(after(t0, 55), &world.stage());

        assert_eq!(ctl.collapsing_count(), 0);
        assert!(!ctl.is_animating(after(t0, 55)));
    }

    #[test]
    fn close_before_open_step_cancels_it() {
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.show(0, &world.stage(), t0);

        ctl.close(after(t0, 5));
        let effects = ctl.advance(after(t0, 100), &world.stage());

        // No positioning happened, and a zero-height panel detaches at once.
        assert!(effects.is_empty());
        assert_eq!(ctl.collapsing_count(), 0);
        assert_eq!(ctl.next_deadline(after(t0, 100)), None);
    }

    #[test]
    fn force_close_drops_everything() {
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();
        ctl.show(0, &world.stage(), t0);
        ctl.advance(after(t0, 25), &world.stage());
        ctl.show(4, &world.stage(), after(t0, 50));

        ctl.force_close();

        assert_eq!(ctl.expanded(), None);
        assert_eq!(ctl.collapsing_count(), 0);
        assert_eq!(ctl.scroll_extra(), 0.0);
        assert!(ctl.advance(after(t0, 1000), &world.stage()).is_empty());
        assert!(ctl.panels(after(t0, 1000)).is_empty());
    }

    #[test]
    fn visit_link_follows_settings_and_payload() {
        let mut world = World::new();
        Arc::make_mut(&mut world.items[2].payload).url = None;
        let mut ctl = controller();
        let t0 = Instant::now();

        ctl.show(1, &world.stage(), t0);
        assert_eq!(
            ctl.active().unwrap().content().link.as_deref(),
            Some("https://example.com/1")
        );

        ctl.show(2, &world.stage(), t0);
        assert_eq!(ctl.active().unwrap().content().link, None);

        let mut hidden = PreviewController::new(
            Settings::resolve(&PreviewOptions {
                show_visit_button: Some(false),
                ..PreviewOptions::default()
            })
            .unwrap(),
        );
        hidden.show(1, &world.stage(), t0);
        assert_eq!(hidden.active().unwrap().content().link, None);
    }

    #[test]
    fn next_deadline_tracks_timers_then_transitions() {
        let world = World::new();
        let mut ctl = controller();
        let t0 = Instant::now();
        assert_eq!(ctl.next_deadline(t0), None);

        ctl.show(0, &world.stage(), t0);
        assert_eq!(ctl.next_deadline(t0), Some(after(t0, 25)));

        ctl.advance(after(t0, 25), &world.stage());
        assert_eq!(ctl.next_deadline(after(t0, 25)), Some(after(t0, 375)));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Toggle(ItemIndex),
            Close,
            Resize,
            Wait(u64),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => (0usize..9).prop_map(Op::Toggle),
                1 => Just(Op::Close),
                1 => Just(Op::Resize),
                2 => (0u64..500).prop_map(Op::Wait),
            ]
        }

        proptest! {
            #[test]
            fn expanded_item_matches_reference_model(ops in proptest::collection::vec(op(), 1..40)) {
                let world = World::new();
                let mut ctl = controller();
                let mut now = Instant::now();
                let mut model: Option<ItemIndex> = None;

                for op in ops {
                    match op {
                        Op::Toggle(i) => {
                            ctl.toggle(i, &world.stage(), now);
                            model = if model == Some(i) { None } else { Some(i) };
                        }
                        Op::Close => {
                            ctl.close(now);
                            model = None;
                        }
                        Op::Resize => {
                            ctl.force_close();
                            model = None;
                        }
                        Op::Wait(ms) => {
                            now += Duration::from_millis(ms);
                            ctl.advance(now, &world.stage());
                        }
                    }
                    prop_assert_eq!(ctl.expanded(), model);
                    prop_assert!(ctl.panels(now).iter().filter(|p| p.active).count() <= 1);
                }

                // Every teardown eventually completes exactly once.
                now += Duration::from_secs(2);
                ctl.advance(now, &world.stage());
                ctl.advance(now + Duration::from_secs(1), &world.stage());
                prop_assert_eq!(ctl.collapsing_count(), 0);
                prop_assert_eq!(ctl.expanded(), model);
            }
        }
    }
}
