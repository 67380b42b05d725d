//! Exit codes for the ic-core CLI.
//!
//! Exit codes communicate the failure category without requiring output
//! parsing. Input errors (the artifact itself is bad) are kept apart from
//! environment errors. Usage errors exit with 2 from clap.

use ic_common::Error;

/// Exit codes for ic-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Every artifact processed
    Clean = 0,

    /// Configuration error
    ConfigError = 10,

    /// Input artifact is malformed or violates the record schema
    InputRejected = 11,

    /// Encoding error
    EncodeError = 12,

    /// Object storage error
    StorageError = 13,

    /// Alert delivery error
    AlertError = 14,

    /// I/O error
    IoError = 15,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            e if e.is_input_error() => ExitCode::InputRejected,
            Error::Encode(_) => ExitCode::EncodeError,
            Error::Storage(_) => ExitCode::StorageError,
            Error::Alert(_) => ExitCode::AlertError,
            Error::Config(_) => ExitCode::ConfigError,
            Error::Io(_) => ExitCode::IoError,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ic_common::{SchemaViolation, StorageError};

    #[test]
    fn test_error_categories() {
        let err = Error::SchemaViolation {
            index: 0,
            violation: SchemaViolation::MissingField("id"),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::InputRejected);
        assert_eq!(ExitCode::from(&Error::EmptyBatch), ExitCode::InputRejected);
        assert_eq!(
            ExitCode::from(&Error::Storage(StorageError::InvalidKey("x".into()))),
            ExitCode::StorageError
        );
        assert_eq!(
            ExitCode::from(&Error::Config("no bucket".into())),
            ExitCode::ConfigError
        );
    }

    #[test]
    fn test_success_and_error_ranges() {
        assert!(ExitCode::Clean.is_success());
        assert!(!ExitCode::Clean.is_error());
        assert!(ExitCode::InputRejected.is_error());
        assert_eq!(i32::from(ExitCode::InternalError), 99);
    }
}
