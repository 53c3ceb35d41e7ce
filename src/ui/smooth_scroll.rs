//! Document scroll with exponential ease-out.
//!
//! Scroll requests set a target; each tick the displayed offset closes a
//! fixed share of the remaining distance, so long jumps decelerate visibly.

/// Pixel-offset smooth scroll animator.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    /// Offset currently displayed.
    position: f64,
    /// Where the document is heading.
    target: f64,
    /// Damping: `distance *= (1 - speed)` each tick.
    speed: f64,
}

impl SmoothScroll {
    pub fn new(speed: f64) -> Self {
        Self {
            position: 0.0,
            target: 0.0,
            speed: speed.clamp(0.05, 1.0),
        }
    }

    /// Head for `top`, clamped to `[0, max]`.
    pub fn scroll_to(&mut self, top: f64, max: f64) {
        self.target = top.clamp(0.0, max.max(0.0));
    }

    /// Move the target by `delta` pixels (mouse wheel).
    pub fn scroll_by(&mut self, delta: f64, max: f64) {
        self.scroll_to(self.target + delta, max);
    }

    /// Re-clamp after the document shrank.  The displayed offset follows
    /// at once so nothing renders past the end.
    pub fn clamp(&mut self, max: f64) {
        let max = max.max(0.0);
        self.target = self.target.min(max);
        self.position = self.position.min(max);
    }

    /// Approach the target.  Call once per frame.
    pub fn tick(&mut self) {
        let distance = self.target - self.position;
        if distance.abs() < 0.5 {
            self.position = self.target;
        } else {
            self.position += distance * self.speed;
        }
    }

    /// Current document offset in pixels.
    pub fn offset(&self) -> f64 {
        self.position
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// True while the displayed offset still moves.
    pub fn is_animating(&self) -> bool {
        self.position != self.target
    }
}
