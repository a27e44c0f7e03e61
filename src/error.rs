//! Structured error types for the simulation kernel.
//!
//! All fallible public APIs return `Result<T, SimError>`. This lets
//! callers distinguish run-time scheduling defects (a backward time step)
//! from construction-time configuration mistakes without relying on
//! panics or stringly-typed errors.

use thiserror::Error;

/// The top-level error type for the simulation kernel and its models.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    // ── Run-time errors ───────────────────────────────────

    /// A dequeued event's time precedes the previously processed event's
    /// time. The clock must never move backward; this always indicates a
    /// defect in the queue or in model logic that scheduled into the past.
    #[error("event at T={event} precedes the clock at T={current}; event times must be non-decreasing")]
    TimeRegression { current: f64, event: f64 },

    // ── Configuration errors ──────────────────────────────

    /// An exponential distribution was requested with neither a mean nor
    /// a rate.
    #[error("one of mean or rate must be specified for an exponential distribution")]
    ExponentialUnderspecified,

    /// An exponential distribution parameter was zero or negative.
    #[error("exponential {param} must be strictly positive, got {value}")]
    InvalidExponential { param: &'static str, value: f64 },

    /// A model rejected its configuration.
    #[error("invalid model configuration: {0}")]
    InvalidModel(String),
}

/// Convenience alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_regression_display() {
        let e = SimError::TimeRegression {
            current: 10.0,
            event: 3.0,
        };
        assert!(e.to_string().contains("T=3"));
        assert!(e.to_string().contains("T=10"));
    }

    #[test]
    fn test_underspecified_display() {
        let e = SimError::ExponentialUnderspecified;
        assert!(e.to_string().contains("mean or rate"));
    }

    #[test]
    fn test_invalid_exponential_display() {
        let e = SimError::InvalidExponential {
            param: "mean",
            value: -2.0,
        };
        assert_eq!(
            e.to_string(),
            "exponential mean must be strictly positive, got -2"
        );
    }

    #[test]
    fn test_is_std_error() {
        let e: Box<dyn std::error::Error> = Box::new(SimError::ExponentialUnderspecified);
        assert!(!e.to_string().is_empty());
    }
}
