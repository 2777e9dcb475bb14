//! kiln - one-shot build runner.
//!
//! Parses command-line arguments, initializes logging, and drives a single
//! compiler run through the instrumented generate entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use kiln_build::{FileConfigProvider, ProcessCompiler, TracingLogger, generate_logged};

mod logger;
mod ui;

/// Produce dist files by driving a one-shot compiler run.
#[derive(Debug, Parser)]
#[command(name = "kiln", version, about)]
struct Cli {
    /// Path to the build configuration file.
    #[arg(long, default_value = "build-config.json")]
    config: PathBuf,

    /// Compiler command to invoke.
    #[arg(long, default_value = "webpack")]
    compiler: PathBuf,

    /// Extra argument passed to the compiler (repeatable).
    #[arg(long = "compiler-arg")]
    compiler_args: Vec<String>,

    /// Enable debug-level logging.
    #[arg(long, short)]
    verbose: bool,

    /// Only log errors.
    #[arg(long, short)]
    quiet: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose, cli.quiet, cli.no_color);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::debug!(
        "config: {}, compiler: {}",
        cli.config.display(),
        cli.compiler.display()
    );

    let provider = FileConfigProvider::new(&cli.config);
    let compiler = ProcessCompiler::new(&cli.compiler).args(cli.compiler_args);

    generate_logged(&provider, &compiler, &TracingLogger)
        .await
        .context("build did not complete")?;

    ui::success("dist files are ready");
    Ok(())
}
