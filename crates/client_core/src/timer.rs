use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::debug;

const STOPWATCH_TICK: Duration = Duration::from_secs(1);

/// A callback run on a fixed period until cancelled or dropped.
///
/// The first run happens one full period after spawning.
pub struct PeriodicTask {
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::spawn_until(period, move || {
            on_tick();
            true
        })
    }

    /// Like [`spawn`](Self::spawn), but stops itself once `on_tick` returns `false`.
    pub fn spawn_until<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                interval.tick().await;
                if !on_tick() {
                    break;
                }
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Resolves once the task has stopped on its own or was cancelled.
    pub fn finished(mut self) -> impl Future<Output = ()> {
        let handle = self.handle.take();
        async move {
            if let Some(handle) = handle {
                let _ = handle.await;
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwatchStatus {
    Running,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockDisplay {
    pub minutes: String,
    pub seconds: String,
}

impl std::fmt::Display for ClockDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.minutes, self.seconds)
    }
}

pub fn clock_display(total_secs: u64) -> ClockDisplay {
    ClockDisplay {
        minutes: format!("{:02}", total_secs / 60),
        seconds: format!("{:02}", total_secs % 60),
    }
}

/// Whole-second brew stopwatch with start/stop toggle and reset.
pub struct Stopwatch {
    elapsed: Arc<AtomicU64>,
    ticker: Option<PeriodicTask>,
    tick: Duration,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::with_tick(STOPWATCH_TICK)
    }

    /// Period between increments; one second outside of tests.
    pub fn with_tick(tick: Duration) -> Self {
        Self {
            elapsed: Arc::new(AtomicU64::new(0)),
            ticker: None,
            tick,
        }
    }

    pub fn status(&self) -> StopwatchStatus {
        if self.ticker.is_some() {
            StopwatchStatus::Running
        } else {
            StopwatchStatus::Stopped
        }
    }

    pub fn start(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let elapsed = Arc::clone(&self.elapsed);
        self.ticker = Some(PeriodicTask::spawn(self.tick, move || {
            elapsed.fetch_add(1, Ordering::SeqCst);
        }));
        debug!(elapsed_secs = self.elapsed_secs(), "stopwatch started");
    }

    pub fn stop(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
            debug!(elapsed_secs = self.elapsed_secs(), "stopwatch stopped");
        }
    }

    pub fn toggle(&mut self) -> StopwatchStatus {
        match self.status() {
            StopwatchStatus::Running => self.stop(),
            StopwatchStatus::Stopped => self.start(),
        }
        self.status()
    }

    /// Stops the stopwatch and sets it back to zero.
    pub fn reset(&mut self) {
        self.stop();
        self.elapsed.store(0, Ordering::SeqCst);
    }

    /// Advances by one second without waiting for the ticker.
    pub fn tick(&self) {
        self.elapsed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.load(Ordering::SeqCst)
    }

    pub fn display(&self) -> ClockDisplay {
        clock_display(self.elapsed_secs())
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}
