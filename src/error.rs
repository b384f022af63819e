use std::str::Utf8Error;
use thiserror::Error;

use crate::decode::ElementType;

/// Error type for CBOR decoding operations.
///
/// Encoding never fails; every variant here describes a problem with the input document.
/// After any error the decoder position is unspecified and decoding of the current document
/// should be abandoned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CborError {
    #[error("not enough data: needed {needed} bytes, {remaining} remaining")]
    InsufficientData { needed: u64, remaining: usize },

    #[error("malformed input: {0}")]
    MalformedInput(&'static str),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ElementType,
        found: ElementType,
    },

    #[error("data items nested deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("invalid UTF-8 in text string: {0}")]
    InvalidUtf8(#[from] Utf8Error),
}

pub type Result<T> = std::result::Result<T, CborError>;
