use thiserror::Error;

/// Failure to decode a persisted or user-supplied enum value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown {kind} ordinal {value}")]
    UnknownOrdinal { kind: &'static str, value: i64 },
    #[error("unknown {kind} '{value}'")]
    UnknownName { kind: &'static str, value: String },
}
