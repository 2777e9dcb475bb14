//! One-shot artifact generation.

use tokio::sync::oneshot;

use crate::compiler::{Compiler, CompilerError, CompilerOutcome};
use crate::config::ConfigProvider;
use crate::lifecycle::{Logger, log_lifecycle};
use crate::{Error, Result};

/// Run the compiler once and settle with the translated outcome.
///
/// The configuration comes from `provider`; its failure propagates as this
/// operation's failure. The compiler's one-shot callback is adapted through
/// a oneshot channel, and its report translates in order: a reported error
/// becomes [`Error::Compiler`], a completed run with accumulated errors
/// becomes [`Error::Compilation`] carrying the ordered diagnostics, and
/// anything else settles as success with no value.
pub async fn generate(provider: &dyn ConfigProvider, compiler: &dyn Compiler) -> Result<()> {
    let config = provider.config().await?;
    tracing::debug!("running compiler with public path {}", config.public_path());

    let (settled, outcome) = oneshot::channel();
    compiler.run(
        config,
        Box::new(move |report| {
            // FnOnce callback: the channel cannot be fed twice.
            let _ = settled.send(report);
        }),
    );

    // A collaborator that drops its callback without firing would otherwise
    // hang the build forever.
    let report = outcome
        .await
        .map_err(|_| Error::Compiler(CompilerError::new("compiler dropped without reporting")))?;

    match report {
        CompilerOutcome::Failed(err) => Err(Error::Compiler(err)),
        CompilerOutcome::Finished(Some(stats)) if stats.has_errors() => {
            Err(Error::Compilation(stats.to_json().errors))
        }
        CompilerOutcome::Finished(_) => Ok(()),
    }
}

/// The exported entry point: [`generate`] wrapped with lifecycle logging
/// under the name `Generate`.
pub async fn generate_logged(
    provider: &dyn ConfigProvider,
    compiler: &dyn Compiler,
    logger: &dyn Logger,
) -> Result<()> {
    log_lifecycle("Generate", logger, || generate(provider, compiler)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompilerCallback, Stats};
    use crate::config::BuildConfig;
    use crate::diagnostics::Diagnostic;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct FixedConfig;

    #[async_trait]
    impl ConfigProvider for FixedConfig {
        async fn config(&self) -> Result<BuildConfig> {
            Ok(BuildConfig::default())
        }
    }

    struct FailingConfig;

    #[async_trait]
    impl ConfigProvider for FailingConfig {
        async fn config(&self) -> Result<BuildConfig> {
            Err(Error::Config("unreadable build-config.json".to_string()))
        }
    }

    /// Fires its scripted outcome synchronously from within `run`.
    struct ScriptedCompiler(Mutex<Option<CompilerOutcome>>);

    impl ScriptedCompiler {
        fn new(outcome: CompilerOutcome) -> Self {
            Self(Mutex::new(Some(outcome)))
        }
    }

    impl Compiler for ScriptedCompiler {
        fn run(&self, _config: BuildConfig, done: CompilerCallback) {
            let outcome = self.0.lock().take().expect("outcome already consumed");
            done(outcome);
        }
    }

    /// Drops the callback without ever firing it.
    struct SilentCompiler;

    impl Compiler for SilentCompiler {
        fn run(&self, _config: BuildConfig, done: CompilerCallback) {
            drop(done);
        }
    }

    #[tokio::test]
    async fn statsless_finish_settles_as_success() {
        let compiler = ScriptedCompiler::new(CompilerOutcome::Finished(None));
        generate(&FixedConfig, &compiler).await.unwrap();
    }

    #[tokio::test]
    async fn clean_stats_settle_as_success() {
        let compiler = ScriptedCompiler::new(CompilerOutcome::Finished(Some(Stats {
            errors: Vec::new(),
            warnings: vec![Diagnostic::warning("deprecated import")],
        })));
        generate(&FixedConfig, &compiler).await.unwrap();
    }

    #[tokio::test]
    async fn stats_with_errors_keep_the_collection_shape() {
        let compiler = ScriptedCompiler::new(CompilerOutcome::Finished(Some(Stats {
            errors: vec![
                Diagnostic::error("Module not found"),
                Diagnostic::error("Unexpected token"),
            ],
            warnings: Vec::new(),
        })));
        match generate(&FixedConfig, &compiler).await {
            Err(Error::Compilation(diags)) => {
                assert_eq!(diags.len(), 2);
                assert_eq!(diags[0].message, "Module not found");
                assert_eq!(diags[1].message, "Unexpected token");
            }
            other => panic!("expected compilation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reported_error_wins_over_stats() {
        let compiler = ScriptedCompiler::new(CompilerOutcome::Failed(CompilerError::new(
            "out of memory",
        )));
        match generate(&FixedConfig, &compiler).await {
            Err(Error::Compiler(err)) => assert_eq!(err.to_string(), "out of memory"),
            other => panic!("expected compiler failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn config_failure_propagates_unchanged() {
        let compiler = ScriptedCompiler::new(CompilerOutcome::Finished(None));
        match generate(&FailingConfig, &compiler).await {
            Err(Error::Config(cause)) => assert_eq!(cause, "unreadable build-config.json"),
            other => panic!("expected config failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropped_callback_settles_instead_of_hanging() {
        match generate(&FixedConfig, &SilentCompiler).await {
            Err(Error::Compiler(err)) => {
                assert_eq!(err.to_string(), "compiler dropped without reporting");
            }
            other => panic!("expected compiler failure, got {other:?}"),
        }
    }
}
