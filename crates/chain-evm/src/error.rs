use thiserror::Error;

/// EVM primitive errors.
#[derive(Debug, Error)]
pub enum EvmError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("malformed typed data: {0}")]
    MalformedTypedData(String),

    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidSignatureLength(usize),

    #[error("unsupported chain: {0}")]
    UnsupportedChain(u64),
}
