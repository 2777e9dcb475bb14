//! Compiler collaborator interface and the external-process implementation.
//!
//! The compiler is a black box to this crate: it receives a configuration
//! and a completion callback, and the callback fires exactly once with the
//! outcome of the run. [`ProcessCompiler`] is the concrete collaborator that
//! shells out to an external bundler command.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::BuildConfig;
use crate::diagnostics::Diagnostic;

/// Completion callback for a one-shot compiler run.
///
/// `FnOnce` makes double settlement unrepresentable at the type level.
pub type CompilerCallback = Box<dyn FnOnce(CompilerOutcome) + Send + 'static>;

/// Opaque failure reported by a run that aborted before producing stats.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CompilerError {
    message: String,
}

impl CompilerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Terminal report of a compiler run.
#[derive(Debug)]
pub enum CompilerOutcome {
    /// The run aborted before producing stats.
    Failed(CompilerError),
    /// The run completed; trivial runs may carry no stats.
    Finished(Option<Stats>),
}

/// Accumulated result of a completed compiler run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Stats {
    /// Whether the run accumulated any error-level diagnostics.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Serializable snapshot of the run, diagnostics in reported order.
    pub fn to_json(&self) -> StatsJson {
        StatsJson {
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Serialized stats document, the shape external compilers print.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsJson {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

/// One-shot build execution collaborator.
pub trait Compiler: Send + Sync {
    /// Start a run; `done` fires exactly once with the outcome.
    fn run(&self, config: BuildConfig, done: CompilerCallback);
}

/// Compiler that shells out to an external bundler command.
///
/// The configuration is written to the child's stdin as JSON. The child is
/// expected to print a stats document to stdout, or nothing at all for a
/// trivial run. Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessCompiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl Compiler for ProcessCompiler {
    fn run(&self, config: BuildConfig, done: CompilerCallback) {
        let program = self.program.clone();
        let args = self.args.clone();
        tokio::spawn(async move {
            done(run_process(&program, &args, &config).await);
        });
    }
}

async fn run_process(program: &Path, args: &[String], config: &BuildConfig) -> CompilerOutcome {
    let payload = match serde_json::to_vec(config) {
        Ok(payload) => payload,
        Err(err) => {
            return CompilerOutcome::Failed(CompilerError::new(format!(
                "config is not serializable: {err}"
            )));
        }
    };

    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            return CompilerOutcome::Failed(CompilerError::new(format!(
                "failed to start {}: {err}",
                program.display()
            )));
        }
    };

    // Dropping stdin closes the pipe so the child sees end of input.
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(err) = stdin.write_all(&payload).await {
            return CompilerOutcome::Failed(CompilerError::new(format!(
                "failed to hand off config: {err}"
            )));
        }
    }

    let output = match child.wait_with_output().await {
        Ok(output) => output,
        Err(err) => {
            return CompilerOutcome::Failed(CompilerError::new(format!(
                "compiler did not finish: {err}"
            )));
        }
    };

    if output.stdout.iter().all(u8::is_ascii_whitespace) {
        if output.status.success() {
            return CompilerOutcome::Finished(None);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        return CompilerOutcome::Failed(CompilerError::new(if stderr.is_empty() {
            format!("compiler exited with {}", output.status)
        } else {
            stderr.to_string()
        }));
    }

    // A stats document on stdout wins over the exit code: compilers exit
    // nonzero when compilation errors are reported, and those belong to the
    // diagnostics channel, not the compiler-failure channel.
    match serde_json::from_slice::<StatsJson>(&output.stdout) {
        Ok(json) => CompilerOutcome::Finished(Some(Stats {
            errors: json.errors,
            warnings: json.warnings,
        })),
        Err(err) => CompilerOutcome::Failed(CompilerError::new(format!(
            "unreadable stats output: {err}"
        ))),
    }
}
