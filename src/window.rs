use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const HORIZON: Duration = Duration::from_secs(1);

/// Timestamps of manual presses, oldest first.
#[derive(Debug, Default)]
pub struct ClickWindow {
    events: VecDeque<Instant>,
}

impl ClickWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at: Instant) {
        // The hook appends in order; `record_at` callers may pass any instant.
        let idx = self.events.partition_point(|&t| t <= at);
        self.events.insert(idx, at);
    }

    /// Drops every event at or before `now - HORIZON`.
    pub fn prune(&mut self, now: Instant) {
        let Some(cutoff) = now.checked_sub(HORIZON) else {
            return;
        };
        while matches!(self.events.front(), Some(&t) if t <= cutoff) {
            self.events.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Instant> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn prune_keeps_only_trailing_second() {
        let base = Instant::now();
        let mut window = ClickWindow::new();
        for offset in [0, 200, 900, 1100, 1500] {
            window.push(base + ms(offset));
        }

        window.prune(base + ms(2000));
        let kept: Vec<_> = window.iter().map(|&t| t - base).collect();
        assert_eq!(kept, vec![ms(1100), ms(1500)]);
    }

    #[test]
    fn event_exactly_on_horizon_is_dropped() {
        let base = Instant::now();
        let mut window = ClickWindow::new();
        window.push(base);
        window.push(base + ms(1));
        window.prune(base + HORIZON);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn prune_is_idempotent() {
        let base = Instant::now();
        let mut window = ClickWindow::new();
        for offset in (0..3000).step_by(150) {
            window.push(base + ms(offset));
        }
        let now = base + ms(2600);

        window.prune(now);
        let once: Vec<_> = window.iter().copied().collect();
        window.prune(now);
        let twice: Vec<_> = window.iter().copied().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn nothing_older_than_horizon_survives() {
        let base = Instant::now();
        let mut window = ClickWindow::new();
        for offset in [5, 480, 1020, 1700, 2300, 2310] {
            window.push(base + ms(offset));
        }
        let now = base + ms(2400);
        window.prune(now);
        assert!(window.iter().all(|&t| now - t < HORIZON));
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn late_arrivals_stay_ordered() {
        let base = Instant::now();
        let mut window = ClickWindow::new();
        window.push(base + ms(300));
        window.push(base + ms(100));
        window.push(base + ms(200));
        let kept: Vec<_> = window.iter().map(|&t| t - base).collect();
        assert_eq!(kept, vec![ms(100), ms(200), ms(300)]);
    }
}
