//! Build configuration model and its provider seam.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::util::path_from_url;
use crate::{Error, Result};

/// Optimization posture for a build run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    #[default]
    Production,
}

/// Input handed to the compiler for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildConfig {
    /// Entry modules, relative to the project root.
    pub entry: Vec<String>,
    /// Directory that receives the dist files.
    pub output_dir: PathBuf,
    pub mode: BuildMode,
    /// Base URL the artifacts will be served from.
    pub public_url: Option<String>,
    pub source_map: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            entry: vec!["src/index.js".to_string()],
            output_dir: PathBuf::from("dist"),
            mode: BuildMode::default(),
            public_url: None,
            source_map: false,
        }
    }
}

impl BuildConfig {
    /// Path prefix the artifacts are served under, with surrounding slashes.
    pub fn public_path(&self) -> String {
        self.public_url
            .as_deref()
            .map(|url| path_from_url(url, true))
            .unwrap_or_else(|| "/".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        if self.entry.is_empty() {
            return Err(Error::Config("at least one entry is required".to_string()));
        }
        Ok(())
    }
}

/// Source of the build configuration.
///
/// Failures propagate transparently as the configuration error of the run.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn config(&self) -> Result<BuildConfig>;
}

/// Loads the configuration from a JSON file.
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn config(&self) -> Result<BuildConfig> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|err| Error::Config(format!("cannot read {}: {err}", self.path.display())))?;
        let config: BuildConfig = serde_json::from_slice(&raw)
            .map_err(|err| Error::Config(format!("invalid config {}: {err}", self.path.display())))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_a_production_bundle() {
        let config = BuildConfig::default();
        assert_eq!(config.entry, vec!["src/index.js".to_string()]);
        assert_eq!(config.output_dir, PathBuf::from("dist"));
        assert_eq!(config.mode, BuildMode::Production);
        assert_eq!(config.public_path(), "/");
    }

    #[test]
    fn public_path_comes_from_the_public_url() {
        let config = BuildConfig {
            public_url: Some("https://cdn.example.com/assets".to_string()),
            ..BuildConfig::default()
        };
        assert_eq!(config.public_path(), "/assets/");
    }

    #[test]
    fn rejects_empty_entry_list() {
        let config = BuildConfig {
            entry: Vec::new(),
            ..BuildConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn parses_camel_case_fields() {
        let config: BuildConfig = serde_json::from_str(
            r#"{"entry": ["src/main.ts"], "outputDir": "build", "mode": "development", "sourceMap": true}"#,
        )
        .unwrap();
        assert_eq!(config.entry, vec!["src/main.ts".to_string()]);
        assert_eq!(config.output_dir, PathBuf::from("build"));
        assert_eq!(config.mode, BuildMode::Development);
        assert!(config.source_map);
    }

    #[tokio::test]
    async fn file_provider_loads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build-config.json");
        std::fs::write(&path, r#"{"entry": ["src/app.tsx"]}"#).unwrap();

        let provider = FileConfigProvider::new(&path);
        let config = provider.config().await.unwrap();
        assert_eq!(config.entry, vec!["src/app.tsx".to_string()]);
    }

    #[tokio::test]
    async fn missing_file_is_a_config_error() {
        let provider = FileConfigProvider::new("no-such-build-config.json");
        match provider.config().await {
            Err(Error::Config(cause)) => assert!(cause.contains("no-such-build-config.json")),
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
