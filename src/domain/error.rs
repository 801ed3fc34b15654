//! Domain error types.

/// Top-level error type for accrue.
#[derive(Debug, thiserror::Error)]
pub enum AccrueError {
    #[error("invalid period sequence at period {period_index}: {reason}")]
    InvalidSequence { period_index: u32, reason: String },

    #[error("arithmetic domain error at period {period_index}: {quantity} = {value} ({reason})")]
    ArithmeticDomain {
        period_index: u32,
        quantity: String,
        value: f64,
        reason: String,
    },

    #[error("projection failed at period {period_index}: {source}")]
    PropagatedCalculation {
        period_index: u32,
        #[source]
        source: Box<AccrueError>,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown preset '{name}' (expected conservative, moderate or optimistic)")]
    UnknownPreset { name: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AccrueError {
    /// Shorthand for a value that cannot be used as a divisor or input.
    pub(crate) fn domain(period_index: u32, quantity: &str, value: f64, reason: &str) -> Self {
        AccrueError::ArithmeticDomain {
            period_index,
            quantity: quantity.to_string(),
            value,
            reason: reason.to_string(),
        }
    }

    /// The innermost error, unwrapping any propagation layers.
    pub fn root_cause(&self) -> &AccrueError {
        match self {
            AccrueError::PropagatedCalculation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<&AccrueError> for std::process::ExitCode {
    fn from(err: &AccrueError) -> Self {
        let code: u8 = match err {
            AccrueError::Io(_) | AccrueError::Report { .. } => 1,
            AccrueError::ConfigParse { .. }
            | AccrueError::ConfigMissing { .. }
            | AccrueError::ConfigInvalid { .. } => 2,
            AccrueError::InvalidSequence { .. }
            | AccrueError::ArithmeticDomain { .. }
            | AccrueError::PropagatedCalculation { .. } => 3,
            AccrueError::UnknownPreset { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_nested_propagation() {
        let inner = AccrueError::domain(3, "unit_sourcing_cost_beginning", 0.0, "must be positive");
        let wrapped = AccrueError::PropagatedCalculation {
            period_index: 3,
            source: Box::new(inner),
        };
        assert!(matches!(
            wrapped.root_cause(),
            AccrueError::ArithmeticDomain { period_index: 3, .. }
        ));
    }

    #[test]
    fn display_includes_context() {
        let err = AccrueError::InvalidSequence {
            period_index: 2,
            reason: "previous period state is required".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("period 2"));
        assert!(msg.contains("previous period state is required"));
    }

    #[test]
    fn propagated_error_exposes_source() {
        use std::error::Error;
        let err = AccrueError::PropagatedCalculation {
            period_index: 4,
            source: Box::new(AccrueError::domain(4, "x", -1.0, "negative")),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("projection failed at period 4"));
    }
}
