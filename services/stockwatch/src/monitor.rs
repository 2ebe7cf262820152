//! Per-target polling loop and lifecycle

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::TargetConfig;
use crate::evaluator::{self, CheckSpec};
use crate::notifier::WebhookNotifier;
use crate::selector::Matcher;
use crate::source::ContentSource;
use crate::throttle::FetchThrottle;

/// Consecutive failed checks before an extra warning is emitted.
/// Failures still only ever degrade to "not available"; the counter is
/// observability, not behavior.
const FAILURE_WARN_THRESHOLD: u32 = 5;

/// A running monitor's cancellation handle and polling task
struct RunState {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Everything the polling loop needs, cloned out of the monitor at start
struct PollContext {
    name: String,
    url: String,
    matcher: Matcher,
    check: CheckSpec,
    refresh: Duration,
    cooldown: Duration,
    source: Arc<dyn ContentSource>,
    throttle: FetchThrottle,
    notifier: Arc<WebhookNotifier>,
}

/// Owns one target's polling lifecycle
pub struct TargetMonitor {
    name: String,
    url: String,
    matcher: Matcher,
    check: CheckSpec,
    refresh: Duration,
    cooldown: Duration,
    source: Arc<dyn ContentSource>,
    throttle: FetchThrottle,
    notifier: Arc<WebhookNotifier>,
    run: Option<RunState>,
}

impl std::fmt::Debug for TargetMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetMonitor")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("running", &self.run.is_some())
            .finish()
    }
}

impl TargetMonitor {
    /// Validate the target and build its selectors and payload. All
    /// configuration problems surface here, before the first poll.
    pub fn new(
        config: &TargetConfig,
        source: Arc<dyn ContentSource>,
        throttle: FetchThrottle,
        notifier: Arc<WebhookNotifier>,
    ) -> crate::Result<Self> {
        config.validate()?;
        let matcher = Matcher::from_config(config)?;
        let check = CheckSpec::new(&config.check_string, config.check_polarity);

        Ok(Self {
            name: config.name.clone(),
            url: config.url.clone(),
            matcher,
            check,
            refresh: Duration::from_secs(config.refresh_seconds),
            cooldown: Duration::from_secs(config.cooldown_seconds),
            source,
            throttle,
            notifier,
            run: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Spawn the polling loop. Starting a monitor that is already running
    /// is a no-op; `stop` first to restart it.
    pub fn start(&mut self) {
        if self.run.is_some() {
            tracing::warn!("[{}] Already running, ignoring start", self.name);
            return;
        }

        let cancel = CancellationToken::new();
        let ctx = PollContext {
            name: self.name.clone(),
            url: self.url.clone(),
            matcher: self.matcher.clone(),
            check: self.check.clone(),
            refresh: self.refresh,
            cooldown: self.cooldown,
            source: Arc::clone(&self.source),
            throttle: self.throttle.clone(),
            notifier: Arc::clone(&self.notifier),
        };
        let loop_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            poll_loop(ctx, loop_cancel).await;
        });

        self.run = Some(RunState { cancel, task });
        tracing::info!("[{}] Monitor started", self.name);
    }

    /// Signal cancellation, then wait for the polling task to fully exit.
    /// Once this returns no further fetch, evaluation or notification will
    /// start for this target. Stopping a monitor that never started is a
    /// no-op.
    pub async fn stop(&mut self) {
        if let Some(run) = self.run.take() {
            run.cancel.cancel();
            if let Err(e) = run.task.await {
                tracing::warn!("[{}] Polling task ended abnormally: {}", self.name, e);
            }
            tracing::info!("[{}] Monitor stopped", self.name);
        }
    }
}

async fn poll_loop(ctx: PollContext, cancel: CancellationToken) {
    let mut consecutive_failures: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let outcome = match check_once(&ctx, &cancel).await {
            Some(outcome) => outcome,
            None => break,
        };

        let available = match outcome {
            Ok(available) => {
                consecutive_failures = 0;
                available
            }
            Err(e) => {
                consecutive_failures += 1;
                match &e {
                    crate::StockwatchError::Selector(_) => {
                        tracing::warn!("[{}] Selector drift: {}", ctx.name, e);
                    }
                    _ => tracing::warn!("[{}] Check failed: {}", ctx.name, e),
                }
                if consecutive_failures == FAILURE_WARN_THRESHOLD {
                    tracing::warn!(
                        "[{}] {} consecutive failed checks",
                        ctx.name,
                        consecutive_failures
                    );
                }
                false
            }
        };

        let interval = next_interval(available, &ctx);
        if available {
            tracing::info!(
                "[{}] Available! Dispatching webhook notification",
                ctx.name
            );
            tracing::info!(
                "[{}] Checking again in {}",
                ctx.name,
                format_interval(interval)
            );
            let notifier = Arc::clone(&ctx.notifier);
            tokio::spawn(async move {
                // Delivery outcome is logged by the notifier; the loop does
                // not wait for it.
                let _ = notifier.notify().await;
            });
        } else {
            tracing::info!(
                "[{}] Not available. Trying again in {}",
                ctx.name,
                format_interval(interval)
            );
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => {
                tracing::debug!("[{}] Wait interrupted by shutdown", ctx.name);
                break;
            }
        }
    }

    tracing::debug!("[{}] Polling loop exited", ctx.name);
}

/// One fetch+evaluate cycle. `None` means cancellation fired while waiting
/// for a fetch slot; errors from the collaborators bubble up for the loop
/// to log and degrade to "not available".
async fn check_once(ctx: &PollContext, cancel: &CancellationToken) -> Option<crate::Result<bool>> {
    tracing::info!("[{}] Checking {}", ctx.name, ctx.url);

    let permit = ctx.throttle.acquire(cancel).await?;
    let fetched = ctx
        .source
        .fetch(&ctx.url, ctx.matcher.readiness_selector())
        .await;
    drop(permit);

    Some(match fetched {
        Ok(snapshot) => evaluator::evaluate(&snapshot, &ctx.matcher, &ctx.check),
        Err(e) => Err(e),
    })
}

fn next_interval(available: bool, ctx: &PollContext) -> Duration {
    if available {
        ctx.cooldown
    } else {
        ctx.refresh
    }
}

fn format_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    if secs > 60 {
        format!("{} seconds ({:.1} mins)", secs, secs as f64 / 60.0)
    } else {
        format!("{} seconds", secs)
    }
}
