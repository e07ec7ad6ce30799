//! Error types for the incentive engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for the conditions that stop a period run outright. Recoverable data-quality
//! issues are reported as [`Diagnostic`](crate::models::Diagnostic)s instead.

use thiserror::Error;

use crate::models::Period;

/// The main error type for the incentive engine.
///
/// # Example
///
/// ```
/// use incentive_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/program.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/program.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No policy is effective for the requested period.
    #[error("No policy effective for period {period}")]
    PolicyNotFound {
        /// The period that has no policy.
        period: Period,
    },

    /// A period string could not be parsed.
    #[error("Invalid period '{value}': {message}")]
    InvalidPeriod {
        /// The offending value.
        value: String,
        /// What was wrong with it.
        message: String,
    },

    /// A progression table violated its shape or monotonicity rules.
    #[error("Invalid progression table: {message}")]
    InvalidProgressionTable {
        /// A description of the violation.
        message: String,
    },

    /// A field of the period inputs was invalid.
    #[error("Invalid input field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The previous-period snapshot belongs to a different period.
    #[error("Previous snapshot is for {found}, expected {expected}")]
    SnapshotMismatch {
        /// The period the snapshot should describe.
        expected: Period,
        /// The period the snapshot actually describes.
        found: Period,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/file.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/file.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_policy_not_found_displays_period() {
        let error = EngineError::PolicyNotFound {
            period: Period::new(2020, 1).unwrap(),
        };
        assert_eq!(error.to_string(), "No policy effective for period 2020-01");
    }

    #[test]
    fn test_invalid_period_displays_value_and_message() {
        let error = EngineError::InvalidPeriod {
            value: "2025-13".to_string(),
            message: "month must be 1-12".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid period '2025-13': month must be 1-12"
        );
    }

    #[test]
    fn test_invalid_input_displays_field_and_message() {
        let error = EngineError::InvalidInput {
            field: "roster".to_string(),
            message: "duplicate employee id 'E001'".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid input field 'roster': duplicate employee id 'E001'"
        );
    }

    #[test]
    fn test_snapshot_mismatch_displays_both_periods() {
        let error = EngineError::SnapshotMismatch {
            expected: Period::new(2025, 10).unwrap(),
            found: Period::new(2025, 8).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Previous snapshot is for 2025-08, expected 2025-10"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_policy_not_found() -> EngineResult<()> {
            Err(EngineError::PolicyNotFound {
                period: Period::new(2020, 1).unwrap(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_policy_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
