//! Structured error types shared across arbores crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`ArgError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (sites, node ids, iteration numbers, ...).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the sampler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum ArgError {
    /// Malformed or inconsistent genome data.
    #[error("data error: {0}")]
    Data(ErrorInfo),
    /// Malformed path input (for example an initial path file).
    #[error("path error: {0}")]
    Path(ErrorInfo),
    /// A committed path failed structural completeness or data compatibility.
    ///
    /// This is a defect in the sampler, never a user error, and halts the run.
    #[error("invariant violation: {0}")]
    Invariant(ErrorInfo),
    /// Invalid run configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// The large-input confirmation gate was refused.
    #[error("run declined: {0}")]
    Declined(ErrorInfo),
    /// Serialization and file system errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl ArgError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            ArgError::Data(info)
            | ArgError::Path(info)
            | ArgError::Invariant(info)
            | ArgError::Config(info)
            | ArgError::Declined(info)
            | ArgError::Serde(info) => info,
        }
    }

    /// Returns true for errors that signal a sampler defect rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ArgError::Invariant(_))
    }

    /// Wraps an I/O failure together with the path it concerned.
    pub fn io(code: &str, err: impl Display, path: impl Display) -> Self {
        ArgError::Serde(ErrorInfo::new(code, err.to_string()).with_context("path", path.to_string()))
    }
}
