use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};
use pr_core::error::{CoreReason, EngineError};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum RuntimeReason {
    #[error("workspace load error")]
    Load,
    #[error("export error")]
    Export,
    #[error("export cancelled")]
    Cancelled,
    #[error("{0}")]
    Core(CoreReason),
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for RuntimeReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::Load => 2001,
            Self::Export => 2002,
            Self::Cancelled => 2003,
            Self::Core(c) => c.error_code(),
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type RuntimeError = StructError<RuntimeReason>;
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Wrap a document compilation failure, keeping its domain reason.
pub fn engine_error(e: EngineError) -> RuntimeError {
    StructError::from(RuntimeReason::Core(e.reason())).with_detail(e.to_string())
}

pub(crate) fn cancelled() -> RuntimeError {
    StructError::from(RuntimeReason::Cancelled)
        .with_detail("export cancelled; partial results discarded")
}
