//! Replay-safe EIP-712 signing for Coinbase Smart Wallet accounts.
//!
//! Supports:
//! - Wrapping an arbitrary typed-data hash in the account's replay-safe envelope
//! - Delegating the envelope signature to a [`oracle::SigningOracle`]
//! - Encoding the owner signature as a `SignatureWrapper` for ERC-1271
//! - An in-process oracle backed by local owner keys

pub mod account;
pub mod error;
pub mod local_oracle;
pub mod oracle;
pub mod replay_safe;
pub mod sign;
pub mod signature_wrapper;

pub use account::EvmSmartAccount;
pub use error::SmartAccountError;
pub use sign::{sign_and_wrap_typed_data, SignTypedDataOptions, SignTypedDataResult};
