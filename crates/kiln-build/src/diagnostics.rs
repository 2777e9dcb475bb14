//! Compiler diagnostic types.
//!
//! A completed compiler run reports an ordered list of diagnostics in its
//! stats document. Depending on the compiler, entries arrive either as bare
//! message strings or as structured objects; both deserialize into
//! [`Diagnostic`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

/// A single entry reported by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DiagnosticRepr")]
pub struct Diagnostic {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: None,
            line: None,
            column: None,
            severity: Severity::Error,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(message)
        }
    }

    pub fn with_location(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line, self.column) {
            (Some(file), Some(line), Some(column)) => {
                write!(f, "{file}:{line}:{column}: {}", self.message)
            }
            (Some(file), _, _) => write!(f, "{file}: {}", self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Accepted wire shapes for a diagnostic entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum DiagnosticRepr {
    Full {
        message: String,
        #[serde(default, alias = "moduleName")]
        file: Option<String>,
        #[serde(default)]
        line: Option<u32>,
        #[serde(default)]
        column: Option<u32>,
        #[serde(default)]
        severity: Severity,
    },
    Text(String),
}

impl From<DiagnosticRepr> for Diagnostic {
    fn from(repr: DiagnosticRepr) -> Self {
        match repr {
            DiagnosticRepr::Full {
                message,
                file,
                line,
                column,
                severity,
            } => Self {
                message,
                file,
                line,
                column,
                severity,
            },
            DiagnosticRepr::Text(message) => Self::error(message),
        }
    }
}

/// Join diagnostic messages into a single human-readable line.
pub fn summarize(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return "unknown compilation error".to_string();
    }
    diagnostics
        .iter()
        .map(|d| d.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
