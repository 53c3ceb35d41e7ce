//! Interruptible height transitions.
//!
//! A [`Transition`] interpolates a height from the value it showed when it
//! was (re)targeted to a new value, over the configured speed and easing.
//! Like a CSS transition, retargeting mid-flight starts from the currently
//! displayed value, and a change to the same value finishes at once.

use std::time::{Duration, Instant};

use super::settings::Easing;

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
    easing: Easing,
}

impl Transition {
    /// A transition resting at `value`.
    pub fn at_rest(value: f64, now: Instant) -> Self {
        Self {
            from: value,
            to: value,
            started: now,
            duration: Duration::ZERO,
            easing: Easing::Linear,
        }
    }

    /// Value displayed at `now`.
    pub fn value_at(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed >= self.duration {
            return self.to;
        }
        let progress = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * self.easing.apply(progress)
    }

    /// Start moving toward `to`.  Returns `false` when nothing changes
    /// visually, in which case no end signal is due.
    pub fn retarget(&mut self, to: f64, now: Instant, duration: Duration, easing: Easing) -> bool {
        let from = self.value_at(now);
        self.from = from;
        self.to = to;
        self.started = now;
        self.easing = easing;
        if from == to {
            self.duration = Duration::ZERO;
            return false;
        }
        self.duration = duration;
        true
    }

    /// Jump straight to `to`.
    pub fn jump(&mut self, to: f64, now: Instant) {
        *self = Self::at_rest(to, now);
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    /// When the transition reaches its target.
    pub fn ends_at(&self) -> Instant {
        self.started + self.duration
    }

    pub fn is_running(&self, now: Instant) -> bool {
        !self.duration.is_zero() && now < self.ends_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEED: Duration = Duration::from_millis(100);

    #[test]
    fn linear_transition_interpolates() {
        let t0 = Instant::now();
        let mut t = Transition::at_rest(0.0, t0);

        assert!(t.retarget(200.0, t0, SPEED, Easing::Linear));

        assert_eq!(t.value_at(t0), 0.0);
        assert!((t.value_at(t0 + Duration::from_millis(50)) - 100.0).abs() < 1e-9);
        assert_eq!(t.value_at(t0 + SPEED), 200.0);
        assert!(!t.is_running(t0 + SPEED));
    }

    #[test]
    fn retarget_mid_flight_starts_from_displayed_value() {
        let t0 = Instant::now();
        let mut t = Transition::at_rest(0.0, t0);
        t.retarget(200.0, t0, SPEED, Easing::Linear);

        let mid = t0 + Duration::from_millis(50);
        t.retarget(0.0, mid, SPEED, Easing::Linear);

        assert!((t.value_at(mid) - 100.0).abs() < 1e-9);
        assert_eq!(t.ends_at(), mid + SPEED);
    }

    #[test]
    fn retarget_to_same_value_does_not_run() {
        let t0 = Instant::now();
        let mut t = Transition::at_rest(250.0, t0);

        assert!(!t.retarget(250.0, t0, SPEED, Easing::EASE));
        assert!(!t.is_running(t0));
    }

    #[test]
    fn jump_settles_immediately() {
        let t0 = Instant::now();
        let mut t = Transition::at_rest(0.0, t0);
        t.retarget(500.0, t0, SPEED, Easing::EASE);

        t.jump(80.0, t0);

        assert_eq!(t.value_at(t0), 80.0);
        assert!(!t.is_running(t0));
    }
}
