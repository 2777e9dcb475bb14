//! Lifecycle instrumentation for build operations.
//!
//! [`log_lifecycle`] turns any async operation into a uniformly logged one:
//! an informational line when it starts, and exactly one terminal line when
//! it settles - success with a humanized elapsed duration, or failure with a
//! message extracted from the cause. Logging is a pure side effect; the
//! operation's own result or failure value passes through unchanged.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Leveled text sink for lifecycle messages.
///
/// Both methods are fire-and-forget; no return value is consumed.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Logger that forwards to the `tracing` ecosystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// A captured log line with its level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    Info(String),
    Error(String),
}

/// Logger that records lines in memory, for tests and embedders that want
/// to inspect the lifecycle output of a run.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured lines, in emission order.
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.lines.lock().push(LogLine::Info(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.lines.lock().push(LogLine::Error(message.to_string()));
    }
}

/// Extraction of a human-readable message from a failure cause.
///
/// Failure causes are opaque to the wrapper; this is the only assumption it
/// makes about them. Returning `None` selects the terse `"<name> failed."`
/// log form for causes that carry no usable text.
pub trait FailureMessage {
    fn failure_message(&self) -> Option<String>;
}

const HUMANIZE_STEPS: &[(&str, u128)] = &[
    ("day", 86_400_000),
    ("hour", 3_600_000),
    ("min", 60_000),
    ("s", 1_000),
    ("ms", 1),
];

/// Render a duration as its non-zero components, largest unit first.
///
/// Each component is floor-divided from the remainder after larger units are
/// consumed; zero components are omitted. Anything under a millisecond
/// renders as `"0ms"`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use kiln_build::humanize_duration;
///
/// assert_eq!(humanize_duration(Duration::ZERO), "0ms");
/// assert_eq!(humanize_duration(Duration::from_millis(90_061)), "1min 30s 61ms");
/// ```
pub fn humanize_duration(duration: Duration) -> String {
    let mut remaining = duration.as_millis();
    if remaining < 1 {
        return "0ms".to_string();
    }
    let mut parts = Vec::new();
    for (unit, amount) in HUMANIZE_STEPS {
        if remaining >= *amount {
            parts.push(format!("{}{}", remaining / amount, unit));
            remaining %= amount;
        }
    }
    parts.join(" ")
}

/// Run `op` with start/succeeded/failed logging around its settlement.
///
/// The start instant is captured before `op` is invoked, so the reported
/// duration covers the whole operation including its initial synchronous
/// work. The settlement is forwarded to the caller untouched; the wrapper
/// never swallows an outcome or substitutes its own.
pub async fn log_lifecycle<F, Fut, T, E>(
    name: &str,
    logger: &dyn Logger,
    op: F,
) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: FailureMessage,
{
    logger.info(&format!("{name} start"));
    let started = Instant::now();
    let result = op().await;
    match &result {
        Ok(_) => logger.info(&format!(
            "{name} succeeded, costs: {}",
            humanize_duration(started.elapsed())
        )),
        Err(cause) => match cause.failure_message() {
            Some(message) => logger.error(&format!("{name} failed: {message}")),
            None => logger.error(&format!("{name} failed.")),
        },
    }
    result
}

/// A named operation with lifecycle logging attached.
///
/// Wrap once, call many times; each call logs its own start/terminal pair.
/// Wrappers nest: wrapping an already-wrapped operation logs nested pairs
/// while still forwarding the innermost settlement to the outermost caller.
pub struct Lifecycle<F> {
    name: String,
    op: F,
    logger: Arc<dyn Logger>,
}

impl<F, Fut, T, E> Lifecycle<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: FailureMessage,
{
    pub fn new(name: impl Into<String>, op: F, logger: Arc<dyn Logger>) -> Self {
        Self {
            name: name.into(),
            op,
            logger,
        }
    }

    /// Invoke the wrapped operation.
    pub async fn call(&self) -> Result<T, E> {
        log_lifecycle(&self.name, &*self.logger, || (self.op)()).await
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
