use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    ValidationError(String),
    ParseError(String),
    IoError(String),
    PreconditionNotMet(String),
    /// A pipeline stage failed; earlier stages keep whatever they persisted.
    StageFailed { stage: String, source: Box<AppError> },
}

impl AppError {
    /// Wraps an error with the pipeline stage it occurred in.
    pub fn in_stage(stage: &str) -> impl FnOnce(AppError) -> AppError + '_ {
        move |source| AppError::StageFailed {
            stage: stage.to_string(),
            source: Box::new(source),
        }
    }

    /// Short machine-readable code used in failure responses.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::ParseError(_) => "PARSE_ERROR",
            AppError::IoError(_) => "IO_FAILURE",
            AppError::PreconditionNotMet(_) => "PRECONDITION_NOT_MET",
            AppError::StageFailed { source, .. } => source.code(),
        }
    }

    pub fn stage(&self) -> Option<&str> {
        match self {
            AppError::StageFailed { stage, .. } => Some(stage),
            _ => None,
        }
    }

    /// The innermost error, skipping stage wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// Human message plus optional low-level detail for failure responses.
    pub fn describe(&self) -> (String, Option<String>) {
        match self.root() {
            AppError::ValidationError(msg) | AppError::PreconditionNotMet(msg) => {
                (msg.clone(), None)
            }
            AppError::IoError(msg) => ("Storage operation failed".to_string(), Some(msg.clone())),
            AppError::ParseError(msg) => ("Failed to parse input".to_string(), Some(msg.clone())),
            AppError::Internal(msg) => ("Internal server error".to_string(), Some(msg.clone())),
            AppError::StageFailed { .. } => ("Internal server error".to_string(), None),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
            AppError::PreconditionNotMet(msg) => write!(f, "Precondition not met: {}", msg),
            AppError::StageFailed { stage, source } => write!(f, "{} failed: {}", stage, source),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            AppError::IoError(err.to_string())
        } else {
            AppError::ParseError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_wrapper_keeps_inner_code() {
        let err = AppError::in_stage("persist test cases")(AppError::IoError("disk full".into()));
        assert_eq!(err.code(), "IO_FAILURE");
        assert_eq!(err.stage(), Some("persist test cases"));
        let (message, details) = err.describe();
        assert_eq!(message, "Storage operation failed");
        assert_eq!(details.as_deref(), Some("disk full"));
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = AppError::ValidationError("User story too short".into());
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.describe().0, "User story too short");
        assert!(err.stage().is_none());
    }
}
