// src/ingest/scheduler.rs
use metrics::counter;
use std::future::Future;
use std::time::{Duration, Instant};

/// Shortest pause between two runs, however long the previous run took.
pub const MIN_PAUSE: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub interval: Duration,
    /// Stop after this many runs; `None` loops forever.
    pub max_runs: Option<u64>,
}

impl SchedulerCfg {
    pub fn every_minutes(minutes: u64) -> Self {
        Self {
            interval: Duration::from_secs(minutes.saturating_mul(60)),
            max_runs: None,
        }
    }
}

/// Pause owed after a run that took `elapsed`.
pub fn next_pause(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed).max(MIN_PAUSE)
}

/// Run `task` immediately, then again every `cfg.interval` (start to start).
/// A failing run is logged and the loop carries on. Returns the number of runs.
pub async fn run_periodic<F, Fut, T>(cfg: SchedulerCfg, mut task: F) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut runs = 0u64;
    loop {
        let started = Instant::now();
        match task().await {
            Ok(_) => counter!("scheduler_runs_total", "result" => "ok").increment(1),
            Err(e) => {
                counter!("scheduler_runs_total", "result" => "error").increment(1);
                tracing::error!(target: "scheduler", error = ?e, "scheduled run failed");
            }
        }
        runs += 1;
        if cfg.max_runs.is_some_and(|max| runs >= max) {
            return runs;
        }

        let pause = next_pause(cfg.interval, started.elapsed());
        tracing::info!(target: "scheduler", pause_secs = pause.as_secs(), "sleeping until next run");
        tokio::time::sleep(pause).await;
    }
}
