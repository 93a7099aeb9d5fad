//! Cooperative software timer.
//!
//! Stands in for a hardware timer channel: a periodic tick increments a
//! shared counter and invokes at most one registered [`TickHandler`]. The
//! owning node observes progress with the non-blocking [`SoftwareTimer::elapsed`]
//! poll.
//!
//! There is one handler slot. Starting the timer again replaces the handler
//! and stopping it clears the slot.
//!
//! # Example
//!
//! ```
//! use latchkey_hardware::SoftwareTimer;
//!
//! # async fn example() {
//! let mut timer = SoftwareTimer::new();
//! timer.delay(15).await;
//! assert!(!timer.is_running());
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, sleep};
use tracing::trace;

use latchkey_core::constants::{TIMER_POLL_MS, TIMER_TICK_MS};

/// Callback invoked on every timer tick with the new tick count.
pub trait TickHandler: Send + Sync {
    fn on_tick(&self, tick: u32);
}

impl<F> TickHandler for F
where
    F: Fn(u32) + Send + Sync,
{
    fn on_tick(&self, tick: u32) {
        self(tick)
    }
}

/// Periodic tick source with a single handler slot.
pub struct SoftwareTimer {
    ticks: Arc<AtomicU32>,
    handler: Option<Arc<dyn TickHandler>>,
    task: Option<JoinHandle<()>>,
    target: u32,
}

impl SoftwareTimer {
    pub fn new() -> Self {
        Self {
            ticks: Arc::new(AtomicU32::new(0)),
            handler: None,
            task: None,
            target: 0,
        }
    }

    /// Start ticking every `period`, replacing any running schedule and
    /// handler. The tick counter restarts from zero.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self, period: Duration, handler: Option<Arc<dyn TickHandler>>) {
        self.stop();
        self.ticks.store(0, Ordering::Release);
        self.handler = handler.clone();

        let ticks = Arc::clone(&self.ticks);
        self.task = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let tick = ticks.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
                if let Some(handler) = &handler {
                    handler.on_tick(tick);
                }
            }
        }));
    }

    /// Stop ticking and clear the handler slot.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.handler = None;
    }

    /// Arm the `elapsed` poll to fire after `ticks` more ticks.
    pub fn arm(&mut self, ticks: u32) {
        self.target = self.ticks().saturating_add(ticks);
    }

    /// Returns `true` once the armed number of ticks has passed.
    pub fn elapsed(&self) -> bool {
        self.ticks() >= self.target
    }

    /// Ticks since the last `start`.
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Wait `seconds` whole seconds on the tick counter, then stop.
    pub async fn delay(&mut self, seconds: u32) {
        self.start(Duration::from_millis(TIMER_TICK_MS), None);
        self.arm(seconds);
        trace!("Timer armed for {}s", seconds);

        while !self.elapsed() {
            sleep(Duration::from_millis(TIMER_POLL_MS)).await;
        }
        self.stop();
    }
}

impl Default for SoftwareTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SoftwareTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SoftwareTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareTimer")
            .field("ticks", &self.ticks())
            .field("target", &self.target)
            .field("running", &self.is_running())
            .field("has_handler", &self.has_handler())
            .finish()
    }
}
