use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, error, info, trace};

use crate::capture::{self, CaptureGuard};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::observer::InputObserver;
use crate::policy;
use crate::report::{Reporter, StatusTone};
use crate::synth::{ClickSink, SystemMouse};

const IDLE_SLEEP: Duration = Duration::from_millis(100);
const PRESS_MIN_SECS: f64 = 0.015;
const PRESS_MAX_SECS: f64 = 0.030;
const JITTER_FRACTION: f64 = 0.15;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum EnginePhase {
    Idle,
    Running,
    Draining,
    Stopped,
}

impl EnginePhase {
    pub fn to_u8(self) -> u8 {
        match self {
            EnginePhase::Idle => 0,
            EnginePhase::Running => 1,
            EnginePhase::Draining => 2,
            EnginePhase::Stopped => 3,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => EnginePhase::Idle,
            1 => EnginePhase::Running,
            2 => EnginePhase::Draining,
            _ => EnginePhase::Stopped,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Decision {
    pub real_cps: u32,
    pub output_cps: u32,
}

pub struct Engine<S: ClickSink> {
    config: EngineConfig,
    sink: S,
    observer: Arc<InputObserver>,
    reporter: Arc<dyn Reporter>,
    running: Arc<AtomicBool>,
    phase: Arc<AtomicU8>,
    capture: Option<CaptureGuard>,
}

impl<S: ClickSink> Engine<S> {
    /// Clearing `running` asks the engine to stop after the current burst click.
    pub fn new(
        config: EngineConfig,
        sink: S,
        observer: Arc<InputObserver>,
        reporter: Arc<dyn Reporter>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            sink,
            observer,
            reporter,
            running,
            phase: Arc::new(AtomicU8::new(EnginePhase::Idle.to_u8())),
            capture: None,
        }
    }

    pub fn with_capture(mut self, capture: CaptureGuard) -> Self {
        self.capture = Some(capture);
        self
    }

    fn set_phase(&self, phase: EnginePhase) {
        debug!(?phase, "engine phase");
        self.phase.store(phase.to_u8(), Ordering::SeqCst);
    }

    pub fn run(mut self) {
        self.set_phase(EnginePhase::Running);
        info!(
            target_cps = self.config.target_cps,
            min_cps = self.config.min_cps,
            "clicker started"
        );
        self.reporter.log(&format!(
            "AutoClicker started with Target CPS={}, Min CPS={}\n",
            self.config.target_cps, self.config.min_cps
        ));

        let outcome = self.drive();

        self.set_phase(EnginePhase::Draining);
        self.running.store(false, Ordering::SeqCst);
        drop(self.capture.take());
        self.flush_observer_log();

        match outcome {
            Ok(()) => self.reporter.status(
                "Clicker stopped. You can edit config or restart.",
                StatusTone::Stopped,
            ),
            Err(e) => {
                error!(%e, "clicker run aborted");
                self.reporter
                    .status(&format!("Error: {e}"), StatusTone::Warning);
            }
        }
        self.reporter.log("AutoClicker stopped.\n");
        info!("clicker stopped");
        self.set_phase(EnginePhase::Stopped);
    }

    fn drive(&mut self) -> Result<()> {
        while self.running.load(Ordering::SeqCst) {
            if let Some(capture) = &self.capture {
                capture.health()?;
            }
            let decision = self.evaluate(Instant::now());
            if decision.output_cps > 0 {
                self.burst(decision.output_cps)?;
            } else {
                thread::sleep(IDLE_SLEEP);
            }
        }
        Ok(())
    }

    /// One measurement cycle: prune, count, apply the policy, report.
    pub fn evaluate(&mut self, now: Instant) -> Decision {
        self.flush_observer_log();
        let real_cps = self.observer.real_cps(now);
        let output_cps =
            policy::output_cps(real_cps, self.config.min_cps, self.config.target_cps);
        trace!(real_cps, output_cps, "cycle");
        self.reporter.status(
            &format!("Status: Running - Real CPS: {real_cps} - Output CPS: {output_cps}"),
            StatusTone::Running,
        );
        Decision {
            real_cps,
            output_cps,
        }
    }

    fn flush_observer_log(&self) {
        for line in self.observer.drain_log() {
            self.reporter.log(&line);
        }
    }

    /// Emits up to `n` clicks paced around `target_cps`. Returns how many were
    /// sent before the running flag was cleared.
    pub fn burst(&mut self, n: u32) -> Result<u32> {
        let _emitting = self.observer.begin_emitting();
        let mut rng = rand::thread_rng();
        let base_interval = 1.0 / f64::from(self.config.target_cps);
        let jitter = base_interval * JITTER_FRACTION;
        let mut sent = 0;

        for _ in 0..n {
            if !self.running.load(Ordering::SeqCst) {
                debug!(sent, requested = n, "burst cut short");
                break;
            }
            self.sink.press()?;
            let press_secs = rng.gen_range(PRESS_MIN_SECS..=PRESS_MAX_SECS);
            thread::sleep(Duration::from_secs_f64(press_secs));
            self.sink.release()?;
            sent += 1;

            let interval = base_interval + rng.gen_range(-jitter..=jitter);
            thread::sleep(Duration::from_secs_f64((interval - press_secs).max(0.0)));
        }
        Ok(sent)
    }
}

impl<S: ClickSink + Send + 'static> Engine<S> {
    pub fn spawn(self) -> Result<ClickerHandle> {
        let running = self.running.clone();
        let phase = self.phase.clone();
        let thread = thread::Builder::new()
            .name("clicker-engine".into())
            .spawn(move || self.run())?;
        Ok(ClickerHandle {
            running,
            phase,
            thread: Some(thread),
        })
    }
}

/// Validates `config`, grabs the input devices and starts a run.
pub fn start(config: EngineConfig, reporter: Arc<dyn Reporter>) -> Result<ClickerHandle> {
    config.validate()?;
    let mouse = SystemMouse::open()?;
    let observer = Arc::new(InputObserver::new());
    let capture = capture::attach(observer.clone())?;
    let running = Arc::new(AtomicBool::new(true));
    Engine::new(config, mouse, observer, reporter, running)
        .with_capture(capture)
        .spawn()
}

pub struct ClickerHandle {
    running: Arc<AtomicBool>,
    phase: Arc<AtomicU8>,
    thread: Option<JoinHandle<()>>,
}

impl ClickerHandle {
    pub fn phase(&self) -> EnginePhase {
        EnginePhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// True once the run has ended, whether stopped or aborted.
    pub fn is_finished(&self) -> bool {
        self.phase() == EnginePhase::Stopped
    }

    /// Signals the engine and blocks until it reaches `Stopped`.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("clicker thread panicked");
            }
        }
    }
}

impl Drop for ClickerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
