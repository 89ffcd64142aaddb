use thiserror::Error;

/// Errors raised while constructing or parsing core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address length: {0} bytes, expected 20")]
    InvalidAddressLength(usize),

    #[error("invalid address format: {0}")]
    InvalidAddressFormat(String),

    #[error("invalid hash length: {0} bytes, expected 32")]
    InvalidHashLength(usize),

    #[error("bech32 error: {0}")]
    Bech32(String),

    #[error("hex error: {0}")]
    Hex(String),

    #[error("weight exceeds 192 bits")]
    WeightOverflow,

    #[error("invalid weight string: {0}")]
    InvalidWeightString(String),
}

impl From<hex::FromHexError> for TypesError {
    fn from(err: hex::FromHexError) -> Self {
        TypesError::Hex(err.to_string())
    }
}
