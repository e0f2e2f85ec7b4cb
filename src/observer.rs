use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use rdev::Button;

use crate::window::ClickWindow;

/// Records manual left presses into a rolling window.
///
/// `on_press_event` runs on the system hook thread, so it only takes two short
/// locks and never formats or emits anything. Log lines for recorded clicks are
/// queued and drained by the engine loop.
pub struct InputObserver {
    window: Mutex<ClickWindow>,
    unreported: Mutex<Vec<Instant>>,
    emitting: AtomicBool,
    epoch: Instant,
}

impl InputObserver {
    pub fn new() -> Self {
        Self {
            window: Mutex::new(ClickWindow::new()),
            unreported: Mutex::new(Vec::new()),
            emitting: AtomicBool::new(false),
            epoch: Instant::now(),
        }
    }

    pub fn on_press_event(&self, button: Button, is_down: bool) {
        if is_down && button == Button::Left && !self.is_emitting() {
            self.record_at(Instant::now());
        }
    }

    pub(crate) fn record_at(&self, at: Instant) {
        lock(&self.window).push(at);
        lock(&self.unreported).push(at);
    }

    /// Prunes the window relative to `now` and returns what is left.
    pub fn real_cps(&self, now: Instant) -> u32 {
        let mut window = lock(&self.window);
        window.prune(now);
        u32::try_from(window.len()).unwrap_or(u32::MAX)
    }

    #[cfg(test)]
    pub fn window_len(&self) -> usize {
        lock(&self.window).len()
    }

    /// Takes the queued click log lines, oldest first.
    pub fn drain_log(&self) -> Vec<String> {
        let taken = std::mem::take(&mut *lock(&self.unreported));
        taken
            .into_iter()
            .map(|at| {
                let secs = at.saturating_duration_since(self.epoch).as_secs_f64();
                format!("Click at {secs:.3} seconds\n")
            })
            .collect()
    }

    pub fn is_emitting(&self) -> bool {
        self.emitting.load(Ordering::SeqCst)
    }

    /// Suppresses capture until the returned guard is dropped.
    pub fn begin_emitting(&self) -> EmittingGuard<'_> {
        self.emitting.store(true, Ordering::SeqCst);
        EmittingGuard {
            flag: &self.emitting,
        }
    }
}

pub struct EmittingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for EmittingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

// A panic while holding the lock cannot leave the window half-updated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn records_only_left_presses() {
        let observer = InputObserver::new();
        observer.on_press_event(Button::Left, true);
        observer.on_press_event(Button::Left, false);
        observer.on_press_event(Button::Right, true);
        observer.on_press_event(Button::Middle, true);
        assert_eq!(observer.window_len(), 1);
    }

    #[test]
    fn suppressed_while_emitting() {
        let observer = InputObserver::new();
        {
            let _guard = observer.begin_emitting();
            assert!(observer.is_emitting());
            observer.on_press_event(Button::Left, true);
            observer.on_press_event(Button::Left, true);
        }
        assert!(!observer.is_emitting());
        assert_eq!(observer.window_len(), 0);
        assert!(observer.drain_log().is_empty());

        observer.on_press_event(Button::Left, true);
        assert_eq!(observer.window_len(), 1);
    }

    #[test]
    fn drain_log_formats_milliseconds_once() {
        let observer = InputObserver::new();
        observer.record_at(observer.epoch + Duration::from_millis(1234));
        observer.record_at(observer.epoch + Duration::from_millis(2000));

        assert_eq!(
            observer.drain_log(),
            vec![
                "Click at 1.234 seconds\n".to_string(),
                "Click at 2.000 seconds\n".to_string(),
            ]
        );
        assert!(observer.drain_log().is_empty());
    }

    #[test]
    fn real_cps_prunes_old_clicks() {
        let observer = InputObserver::new();
        let now = Instant::now() + Duration::from_secs(5);
        observer.record_at(now - Duration::from_millis(1500));
        observer.record_at(now - Duration::from_millis(400));
        observer.record_at(now - Duration::from_millis(100));
        assert_eq!(observer.real_cps(now), 2);
        assert_eq!(observer.window_len(), 2);
    }
}
