use derive_more::From;
use orion_error::{ErrorCode, UvsReason};

/// Typed engine failures.
///
/// Everything except [`EngineError::DivisionByZero`] is a compile-time
/// (save-time) failure; division by zero is the only error evaluation can
/// produce, and it is recovered per record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid filter at {path}: {detail}")]
    FilterValidation { path: String, detail: String },
    #[error("invalid rule at {path}: {detail}")]
    RuleValidation { path: String, detail: String },
    #[error("unsupported {kind} condition {code:?} at {path}")]
    UnsupportedCondition {
        path: String,
        kind: &'static str,
        code: String,
    },
    #[error("division by zero applying `{field} / 0`")]
    DivisionByZero { field: String },
    #[error("invalid field map at {path}: {detail}")]
    FieldMap { path: String, detail: String },
}

impl EngineError {
    pub fn filter(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::FilterValidation {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn rule(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::RuleValidation {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn field_map(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::FieldMap {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// The coarse domain reason for this error.
    pub fn reason(&self) -> CoreReason {
        match self {
            Self::FilterValidation { .. } => CoreReason::FilterValidation,
            Self::RuleValidation { .. } => CoreReason::RuleValidation,
            Self::UnsupportedCondition { .. } => CoreReason::UnsupportedCondition,
            Self::DivisionByZero { .. } => CoreReason::DivisionByZero,
            Self::FieldMap { .. } => CoreReason::FieldMap,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum CoreReason {
    #[error("filter validation error")]
    FilterValidation,
    #[error("rule validation error")]
    RuleValidation,
    #[error("unsupported condition")]
    UnsupportedCondition,
    #[error("division by zero")]
    DivisionByZero,
    #[error("field map error")]
    FieldMap,
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for CoreReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::FilterValidation => 1001,
            Self::RuleValidation => 1002,
            Self::UnsupportedCondition => 1003,
            Self::DivisionByZero => 1004,
            Self::FieldMap => 1005,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_have_stable_codes() {
        assert_eq!(CoreReason::FilterValidation.error_code(), 1001);
        assert_eq!(CoreReason::RuleValidation.error_code(), 1002);
        assert_eq!(CoreReason::UnsupportedCondition.error_code(), 1003);
        assert_eq!(CoreReason::DivisionByZero.error_code(), 1004);
        assert_eq!(CoreReason::FieldMap.error_code(), 1005);
    }

    #[test]
    fn errors_map_to_their_reason() {
        let div = EngineError::DivisionByZero {
            field: "salary".into(),
        };
        assert_eq!(div.reason(), CoreReason::DivisionByZero);
        assert_eq!(
            EngineError::rule("atom_rules[0]", "bad").reason(),
            CoreReason::RuleValidation
        );
        assert_eq!(
            EngineError::field_map("[1]", "empty title").reason(),
            CoreReason::FieldMap
        );
    }
}
