//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (worker count, timeouts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: Settings → Result<(), Vec<ValidationError>>

use std::fmt;

use tracing_subscriber::EnvFilter;

use crate::config::schema::Settings;

/// A single semantic problem with the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every field and collect all problems.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let server = &settings.server;

    if server.hostname.trim().is_empty() {
        errors.push(ValidationError {
            field: "server.hostname",
            message: "must not be empty".to_string(),
        });
    }
    if server.workers == Some(0) {
        errors.push(ValidationError {
            field: "server.workers",
            message: "must be at least 1 when set".to_string(),
        });
    }
    if server.request_timeout_secs == Some(0) {
        errors.push(ValidationError {
            field: "server.request_timeout_secs",
            message: "must be greater than 0 when set".to_string(),
        });
    }
    if let Err(e) = EnvFilter::try_new(&settings.logging.level) {
        errors.push(ValidationError {
            field: "logging.level",
            message: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let mut settings = Settings::default();
        settings.server.hostname = " ".into();
        settings.server.workers = Some(0);
        settings.server.request_timeout_secs = Some(0);

        let errors = validate_settings(&settings).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            ["server.hostname", "server.workers", "server.request_timeout_secs"]
        );
    }
}
