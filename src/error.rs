//! Error types for lokoctl.
//!
//! Configuration-stage errors (`ExtensionNotFound`, `ConfigurationIncomplete`,
//! `Decode`, `Validation`) are always raised before any external engine runs.
//! Engine-stage errors carry the phase or component they happened in.

use thiserror::Error;

use crate::diagnostics::Diagnostics;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LokoError {
    #[error("no {category} with name '{name}' found (available: {})", available.join(", "))]
    ExtensionNotFound {
        category: &'static str,
        name: String,
        available: Vec<String>,
    },

    #[error("configuration incomplete: {0}")]
    ConfigurationIncomplete(String),

    #[error("invalid configuration shape in {section}: {message}{}", location_suffix(.location))]
    Decode {
        section: String,
        message: String,
        location: Option<(usize, usize)>,
    },

    #[error("invalid configuration in {section}:\n{diagnostics}")]
    Validation {
        section: String,
        diagnostics: Diagnostics,
    },

    #[error("{phase} failed: {message}")]
    Engine { phase: String, message: String },

    #[error("cluster verification failed: {0}")]
    Verification(String),

    #[error("operation cancelled: {0}")]
    Cancelled(String),

    #[error("failed to render {what}: {message}")]
    Render { what: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn location_suffix(location: &Option<(usize, usize)>) -> String {
    match location {
        Some((line, column)) => format!(" (line {line}, column {column})"),
        None => String::new(),
    }
}

impl LokoError {
    pub fn not_found(
        category: &'static str,
        name: impl Into<String>,
        available: Vec<String>,
    ) -> Self {
        Self::ExtensionNotFound {
            category,
            name: name.into(),
            available,
        }
    }

    pub fn decode(section: impl Into<String>, err: &serde_yaml::Error) -> Self {
        Self::Decode {
            section: section.into(),
            message: err.to_string(),
            location: err.location().map(|l| (l.line(), l.column())),
        }
    }

    pub fn validation(section: impl Into<String>, diagnostics: Diagnostics) -> Self {
        Self::Validation {
            section: section.into(),
            diagnostics,
        }
    }

    pub fn engine(phase: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Engine {
            phase: phase.into(),
            message: format!("{err:#}"),
        }
    }

    pub fn render(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Render {
            what: what.into(),
            message: err.to_string(),
        }
    }

    /// True for errors raised while resolving configuration, before any
    /// engine is touched.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            LokoError::ExtensionNotFound { .. }
                | LokoError::ConfigurationIncomplete(_)
                | LokoError::Decode { .. }
                | LokoError::Validation { .. }
        )
    }
}

pub type Result<T, E = LokoError> = std::result::Result<T, E>;
