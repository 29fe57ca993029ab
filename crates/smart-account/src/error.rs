use chain_evm::error::EvmError;
use thiserror::Error;

use crate::oracle::OracleError;

#[derive(Debug, Error)]
pub enum SmartAccountError {
    #[error("Malformed typed data: {0}")]
    MalformedTypedData(String),

    #[error("Invalid signature length: expected 65 bytes, got {0}")]
    InvalidSignatureLength(usize),

    #[error("Owner index {index} out of range for account with {owners} owner(s)")]
    OwnerIndexOutOfRange { index: u8, owners: usize },

    #[error("Signing oracle failed: {0}")]
    Oracle(#[source] OracleError),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error(transparent)]
    Evm(EvmError),
}

impl From<EvmError> for SmartAccountError {
    fn from(e: EvmError) -> Self {
        match e {
            EvmError::MalformedTypedData(msg) => SmartAccountError::MalformedTypedData(msg),
            EvmError::InvalidSignatureLength(len) => SmartAccountError::InvalidSignatureLength(len),
            other => SmartAccountError::Evm(other),
        }
    }
}
