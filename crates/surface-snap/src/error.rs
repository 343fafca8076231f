use thiserror::Error;

/// Result type for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;

/// Recoverable failures inside the alignment pipeline.
///
/// None of these abort a drag session: the caller keeps the last applied
/// transform (or the last drag values) and waits for the next event.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignError {
    #[error("pointer ray does not hit the target surface")]
    NoIntersection,

    #[error("no pointer movement since the reference point")]
    DegenerateDrag,

    #[error("non-finite {0}")]
    NumericFault(&'static str),
}

/// Errors surfaced by tool activation and host calls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Invalid argument: no object to duplicate was given")]
    MissingTarget,

    #[error("Invalid argument: expected one object to duplicate, got {0}")]
    MultipleTargets(usize),

    #[error("Invalid argument: unknown flag {0}")]
    UnknownFlag(String),

    #[error("Invalid argument: flag {flag} expects a boolean, got {value:?}")]
    InvalidFlagValue { flag: String, value: String },

    #[error("Invalid argument: no object named {0} in the scene")]
    UnknownSource(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Invalid primitive for {object}: {reason}")]
    InvalidPrimitive { object: String, reason: String },

    #[error("Cannot freeze transforms of instance {0}")]
    InstanceFreeze(String),

    #[error(transparent)]
    Align(#[from] AlignError),
}

impl ToolError {
    /// Whether this error belongs to the invalid-invocation class that
    /// prevents the tool from starting.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            ToolError::MissingTarget
                | ToolError::MultipleTargets(_)
                | ToolError::UnknownFlag(_)
                | ToolError::InvalidFlagValue { .. }
                | ToolError::UnknownSource(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_error_converts_into_tool_error() {
        let err: ToolError = AlignError::NoIntersection.into();
        assert_eq!(err, ToolError::Align(AlignError::NoIntersection));
        assert!(!err.is_invalid_argument());
        assert_eq!(err.to_string(), "pointer ray does not hit the target surface");
    }

    #[test]
    fn test_invalid_argument_class() {
        assert!(ToolError::MissingTarget.is_invalid_argument());
        assert!(ToolError::MultipleTargets(2).is_invalid_argument());
        assert!(ToolError::UnknownSource("pCube9".into()).is_invalid_argument());
        assert!(!ToolError::ObjectNotFound("x".into()).is_invalid_argument());
    }

    #[test]
    fn test_flag_value_message() {
        let err = ToolError::InvalidFlagValue {
            flag: "-rotation".into(),
            value: "maybe".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid argument: flag -rotation expects a boolean, got \"maybe\""
        );
    }
}
