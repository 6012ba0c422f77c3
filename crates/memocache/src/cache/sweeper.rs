//! Background sweep of expired entries
//!
//! Each sweeper owns a detached thread named `memocache-sweeper` that drives
//! a single-threaded tokio runtime. The thread ticks on a fixed period and
//! exits as soon as its [`CancellationToken`] is cancelled or the cache it
//! serves is gone. Nothing joins the thread, so an abandoned sweeper never
//! keeps the process alive.

use std::io;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::CacheResult;

const SWEEPER_THREAD_NAME: &str = "memocache-sweeper";

/// Lifecycle of a cache's background sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    /// Periodic sweeps are scheduled
    Running,
    /// Sweeping was stopped by `destroy` (or the sweeper exited); permanent
    Stopped,
    /// No sweeper was configured or it could not be started
    Disabled,
}

/// Handle to a running (or absent) background sweep
#[derive(Debug)]
pub(crate) struct Sweeper {
    token: Option<CancellationToken>,
    stopped: AtomicBool,
}

impl Sweeper {
    /// Sweeper that never runs
    pub(crate) fn disabled() -> Self {
        Self { token: None, stopped: AtomicBool::new(false) }
    }

    /// Start sweeping every `period`
    ///
    /// `sweep` runs once per tick on the sweeper thread; returning
    /// [`ControlFlow::Break`] ends the loop. The first tick happens one full
    /// period after start.
    ///
    /// The runtime is built on the sweeper thread itself, so nothing
    /// runtime-owned is ever dropped on the calling thread, even when the
    /// caller is inside an async context.
    ///
    /// # Errors
    /// Returns [`crate::CacheError::SweeperSpawn`] if the runtime or thread
    /// cannot be created.
    pub(crate) fn spawn<F>(period: Duration, sweep: F) -> CacheResult<Self>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        // Cancels the token however the thread ends, panics included.
        let exit_guard = token.clone().drop_guard();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<io::Result<()>>(1);

        thread::Builder::new().name(SWEEPER_THREAD_NAME.to_owned()).spawn(move || {
            let _exit_guard = exit_guard;
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            if ready_tx.send(Ok(())).is_err() {
                return;
            }
            runtime.block_on(sweep_loop(period, cancelled, sweep));
        })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => return Err(io::Error::other("sweeper thread exited during startup").into()),
        }

        let interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        info!(interval_ms, "Cache sweeper started");
        Ok(Self { token: Some(token), stopped: AtomicBool::new(false) })
    }

    /// Cancel future sweeps
    ///
    /// Returns `true` only for the call that actually stopped a running
    /// sweeper. A sweeper whose thread already exited reports `false`. A
    /// sweep already in progress is allowed to finish.
    pub(crate) fn stop(&self) -> bool {
        let Some(token) = &self.token else {
            return false;
        };
        if self.stopped.swap(true, Ordering::AcqRel) {
            return false;
        }
        let was_running = !token.is_cancelled();
        token.cancel();
        was_running
    }

    pub(crate) fn state(&self) -> SweepState {
        match &self.token {
            None => SweepState::Disabled,
            Some(token) if token.is_cancelled() => SweepState::Stopped,
            Some(_) => SweepState::Running,
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if let Some(token) = &self.token {
            token.cancel();
        }
    }
}

async fn sweep_loop<F>(period: Duration, token: CancellationToken, mut sweep: F)
where
    F: FnMut() -> ControlFlow<()>,
{
    let Some(first_tick) = Instant::now().checked_add(period) else {
        // Period too large to ever elapse.
        token.cancelled().await;
        return;
    };

    let mut ticker = time::interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!("Cache sweeper cancelled");
                break;
            }
            _ = ticker.tick() => {
                if sweep().is_break() {
                    debug!("Cache store released, sweeper exiting");
                    break;
                }
            }
        }
    }
}
