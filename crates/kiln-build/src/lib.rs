//! # kiln-build
//!
//! Build orchestration core: produce dist files by driving a one-shot
//! compiler run, with uniform lifecycle logging around the whole operation.
//!
//! The crate is organized around two pieces:
//!
//! - [`lifecycle`] wraps any async operation so that every invocation logs a
//!   start line and exactly one terminal line (success with elapsed duration,
//!   or failure with an extracted message) while forwarding the operation's
//!   settlement unchanged.
//! - [`generate`](generate()) obtains a [`BuildConfig`] from a
//!   [`ConfigProvider`], hands it to a [`Compiler`] collaborator, and
//!   translates the one-shot completion callback into a single settled
//!   outcome.
//!
//! ## Quick start
//!
//! ```no_run
//! use kiln_build::{generate_logged, FileConfigProvider, ProcessCompiler, TracingLogger};
//!
//! # #[tokio::main]
//! # async fn main() -> kiln_build::Result<()> {
//! let provider = FileConfigProvider::new("build-config.json");
//! let compiler = ProcessCompiler::new("webpack");
//! generate_logged(&provider, &compiler, &TracingLogger).await?;
//! # Ok(()) }
//! ```

pub mod compiler;
pub mod config;
pub mod diagnostics;
mod generate;
pub mod lifecycle;
pub mod util;

pub use compiler::{
    Compiler, CompilerCallback, CompilerError, CompilerOutcome, ProcessCompiler, Stats, StatsJson,
};
pub use config::{BuildConfig, BuildMode, ConfigProvider, FileConfigProvider};
pub use diagnostics::{Diagnostic, Severity};
pub use generate::{generate, generate_logged};
pub use lifecycle::{
    FailureMessage, Lifecycle, LogLine, Logger, MemoryLogger, TracingLogger, humanize_duration,
    log_lifecycle,
};

/// Error types for kiln-build operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration provider could not produce a usable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The compiler run aborted before producing stats.
    #[error("compiler error: {0}")]
    Compiler(#[from] compiler::CompilerError),

    /// The compiler ran to completion but reported errors. The diagnostics
    /// keep their reported order; callers that need a human summary must
    /// handle a collection, not a scalar.
    #[error("compilation failed: {}", diagnostics::summarize(.0))]
    Compilation(Vec<diagnostics::Diagnostic>),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for kiln-build operations.
pub type Result<T> = std::result::Result<T, Error>;

impl lifecycle::FailureMessage for Error {
    fn failure_message(&self) -> Option<String> {
        match self {
            // The cause text, not the taxonomy prefix: the lifecycle log line
            // already names the operation that failed.
            Error::Config(cause) => Some(cause.clone()),
            Error::Compiler(err) => Some(err.to_string()),
            Error::Compilation(diags) => Some(diagnostics::summarize(diags)),
            Error::Io(err) => Some(err.to_string()),
        }
    }
}
