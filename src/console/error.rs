//! Console error types

use thiserror::Error;

/// Console error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("E01: unknown command")]
    UnknownCommand,
    #[error("E02: invalid value")]
    InvalidValue,
    #[error("E03: missing argument")]
    MissingArg,
    #[error("E04: out of range")]
    OutOfRange,
    /// Dangerous command without its `confirm` argument
    #[error("E05: requires 'confirm'")]
    RequiresConfirm,
    #[error("E06: NVS error")]
    NvsError,
    #[error("E07: unknown parameter")]
    UnknownParam,
    /// The macro store failed to build at startup
    #[error("E08: no macros available")]
    NoMacros,
}

impl ConsoleError {
    /// Short error code, e.g. `E04`
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "E01",
            Self::InvalidValue => "E02",
            Self::MissingArg => "E03",
            Self::OutOfRange => "E04",
            Self::RequiresConfirm => "E05",
            Self::NvsError => "E06",
            Self::UnknownParam => "E07",
            Self::NoMacros => "E08",
        }
    }
}

impl From<crate::config::ParamParseError> for ConsoleError {
    fn from(e: crate::config::ParamParseError) -> Self {
        match e {
            crate::config::ParamParseError::Invalid => Self::InvalidValue,
            crate::config::ParamParseError::OutOfRange => Self::OutOfRange,
        }
    }
}
