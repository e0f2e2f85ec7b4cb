use std::sync::{Arc, Mutex, MutexGuard, Once, OnceLock, PoisonError};
use std::thread;

use rdev::{Event, EventType};
use tracing::{debug, error};

use crate::error::{ClickerError, Result};
use crate::observer::InputObserver;

// rdev::listen never returns on success, so one hook thread serves every run.
static HUB: OnceLock<Hub> = OnceLock::new();
static LISTENER: Once = Once::new();

#[derive(Default)]
struct Hub {
    target: Mutex<Option<Arc<InputObserver>>>,
    failure: Mutex<Option<String>>,
}

fn hub() -> &'static Hub {
    HUB.get_or_init(Hub::default)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn dispatch(event: Event) {
    let (button, is_down) = match event.event_type {
        EventType::ButtonPress(button) => (button, true),
        EventType::ButtonRelease(button) => (button, false),
        _ => return,
    };
    let target = lock(&hub().target).clone();
    if let Some(observer) = target {
        observer.on_press_event(button, is_down);
    }
}

fn ensure_listener() -> Result<()> {
    let mut spawn_error = None;
    LISTENER.call_once(|| {
        let spawned = thread::Builder::new()
            .name("input-hook".into())
            .spawn(|| {
                debug!("starting global input hook");
                if let Err(e) = rdev::listen(dispatch) {
                    error!(?e, "global input hook failed");
                    *lock(&hub().failure) = Some(format!("{e:?}"));
                }
            });
        if let Err(e) = spawned {
            *lock(&hub().failure) = Some(e.to_string());
            spawn_error = Some(e);
        }
    });
    match spawn_error {
        Some(e) => Err(ClickerError::DeviceUnavailable(format!(
            "could not start input hook: {e}"
        ))),
        None => current_failure(),
    }
}

fn current_failure() -> Result<()> {
    match lock(&hub().failure).as_ref() {
        Some(reason) => Err(ClickerError::DeviceUnavailable(format!(
            "input capture failed: {reason}"
        ))),
        None => Ok(()),
    }
}

/// Routes global button events to `observer` until the guard is dropped.
pub fn attach(observer: Arc<InputObserver>) -> Result<CaptureGuard> {
    ensure_listener()?;
    *lock(&hub().target) = Some(observer.clone());
    debug!("observer attached to input hook");
    Ok(CaptureGuard { observer })
}

pub struct CaptureGuard {
    observer: Arc<InputObserver>,
}

impl CaptureGuard {
    /// Fails once the hook thread has reported an error.
    pub fn health(&self) -> Result<()> {
        current_failure()
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        let mut target = lock(&hub().target);
        if target
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &self.observer))
        {
            *target = None;
            debug!("observer detached from input hook");
        }
    }
}
