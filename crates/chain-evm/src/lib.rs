//! EVM primitives for the wallet SDK.
//!
//! This crate provides:
//! - Address parsing with EIP-55 checksum validation
//! - EIP-712 typed-data validation and hashing
//! - 65-byte `r || s || v` signatures with signer recovery
//! - Minimal head/tail ABI encoding and decoding
//! - ERC-1271 `isValidSignature` call encoding
//! - EVM network definitions

pub mod abi;
pub mod address;
pub mod chains;
pub mod eip712;
pub mod erc1271;
pub mod error;
pub mod signature;
