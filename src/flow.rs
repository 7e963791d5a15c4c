use std::time::{Duration, Instant};

pub const MIN_MULTIPLIER: f64 = 1.0;
pub const MAX_MULTIPLIER: f64 = 5.0;
/// Added on every edit
pub const GROWTH_PER_EDIT: f64 = 0.05;
/// Applied on each decay tick once the writer has gone idle
pub const DECAY_FACTOR: f64 = 0.95;
/// Idle time after which decay kicks in (strictly greater than)
pub const IDLE_THRESHOLD: Duration = Duration::from_millis(2000);
/// Cadence of the decay check
pub const DECAY_TICK: Duration = Duration::from_millis(500);

/// Momentum multiplier that rewards continuous writing.
///
/// Grows with each edit and decays while the writer is idle. Always in
/// `[MIN_MULTIPLIER, MAX_MULTIPLIER]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowMultiplier {
    value: f64,
    last_interaction: Instant,
}

impl FlowMultiplier {
    pub fn new(now: Instant) -> Self {
        Self {
            value: MIN_MULTIPLIER,
            last_interaction: now,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn last_interaction(&self) -> Instant {
        self.last_interaction
    }

    pub fn on_interaction(&mut self, now: Instant) {
        self.last_interaction = now;
        self.value = (self.value + GROWTH_PER_EDIT).min(MAX_MULTIPLIER);
    }

    pub fn is_idle(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_interaction) > IDLE_THRESHOLD
    }

    /// Returns true if the tick changed the multiplier
    pub fn on_decay_tick(&mut self, now: Instant) -> bool {
        if !self.is_idle(now) {
            return false;
        }

        let next = (self.value * DECAY_FACTOR).max(MIN_MULTIPLIER);
        let changed = next != self.value;
        self.value = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_one() {
        let flow = FlowMultiplier::new(Instant::now());
        assert_eq!(flow.value(), 1.0);
    }

    #[test]
    fn test_single_edit_grows() {
        let now = Instant::now();
        let mut flow = FlowMultiplier::new(now);
        flow.on_interaction(now);
        assert!((flow.value() - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_growth_clamps_at_max() {
        let now = Instant::now();
        let mut flow = FlowMultiplier::new(now);
        for _ in 0..100 {
            flow.on_interaction(now);
        }
        assert_eq!(flow.value(), MAX_MULTIPLIER);
    }

    #[test]
    fn test_no_decay_within_idle_threshold() {
        let start = Instant::now();
        let mut flow = FlowMultiplier::new(start);
        flow.on_interaction(start);

        assert!(!flow.on_decay_tick(start + Duration::from_millis(500)));
        assert!(!flow.on_decay_tick(start + IDLE_THRESHOLD));
        assert!((flow.value() - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_decay_after_idle() {
        let start = Instant::now();
        let mut flow = FlowMultiplier::new(start);
        for _ in 0..20 {
            flow.on_interaction(start);
        }
        let before = flow.value();

        assert!(flow.on_decay_tick(start + Duration::from_millis(2500)));
        assert!((flow.value() - before * DECAY_FACTOR).abs() < 1e-12);
    }

    #[test]
    fn test_decay_floors_at_min() {
        let start = Instant::now();
        let mut flow = FlowMultiplier::new(start);
        for _ in 0..100 {
            flow.on_interaction(start);
        }

        let mut t = start + Duration::from_millis(2500);
        let mut previous = flow.value();
        for _ in 0..200 {
            flow.on_decay_tick(t);
            assert!(flow.value() <= previous);
            assert!(flow.value() >= MIN_MULTIPLIER);
            previous = flow.value();
            t += DECAY_TICK;
        }
        assert_eq!(flow.value(), MIN_MULTIPLIER);
        assert!(!flow.on_decay_tick(t));
    }

    #[test]
    fn test_edit_resets_idle_clock() {
        let start = Instant::now();
        let mut flow = FlowMultiplier::new(start);
        let later = start + Duration::from_secs(10);
        assert!(flow.is_idle(later));

        flow.on_interaction(later);
        assert!(!flow.is_idle(later + Duration::from_secs(1)));
        assert_eq!(flow.last_interaction(), later);
    }
}
