use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors raised by the swing engine.
///
/// These abort the current operation. Data-quality problems that the engine can
/// recover from are reported as [`crate::core::Diagnostic`] values instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter (e.g., a swing height above the suspension point).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No anthropometric record exists for the requested age.
    #[error("no anthropometric data for age {0}")]
    UnknownAge(u8),

    /// Impact surface must be strictly positive to derive a pressure.
    #[error("impact surface must be > 0 cm², got {0}")]
    InvalidSurface(f64),

    /// Inconsistent engine configuration (thresholds, geometry).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Malformed JSON configuration.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Propagated I/O errors (reading configuration files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::InvalidParameter("height must not exceed swing length".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("height"));
    }

    #[test]
    fn unknown_age_names_the_age() {
        let msg = Error::UnknownAge(9).to_string();
        assert!(msg.contains("age 9"));
    }

    #[test]
    fn json_errors_convert() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: Error = err.into();
        assert!(matches!(e, Error::Json(_)));
    }
}
