use blockalign::{EditorError, ManifestError, ParseInconsistency};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DoctorError>;

/// Exit code of a `check` that found invalid or unexpected blocks.
pub const CHECK_FAILED_EXIT_CODE: i32 = 2;

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("block type not found: {name}")]
    BlockNotFound { name: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("check failed: {invalid} of {total} blocks invalid")]
    CheckFailed { invalid: usize, total: usize },

    #[error("check failed: {0}")]
    Inconsistent(#[from] ParseInconsistency),
}

impl DoctorError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CheckFailed { .. } | Self::Inconsistent(_) => CHECK_FAILED_EXIT_CODE,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DoctorError;

    #[test]
    fn check_failure_has_its_own_exit_code() {
        let error = DoctorError::CheckFailed {
            invalid: 1,
            total: 3,
        };
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "check failed: 1 of 3 blocks invalid");

        let error = DoctorError::from(blockalign::ParseInconsistency::BlockCount { count: 0 });
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn other_errors_exit_with_one() {
        assert_eq!(DoctorError::invalid("boom").exit_code(), 1);
        assert_eq!(
            DoctorError::BlockNotFound {
                name: "x".to_string()
            }
            .exit_code(),
            1
        );
    }
}
