//! Replay-safe envelope for smart account signatures.
//!
//! A Coinbase Smart Wallet does not validate a signature over the caller's
//! hash directly. It re-wraps the hash in its own EIP-712 domain, bound to
//! the chain and to the account contract, and expects the owner to have
//! signed that envelope. The same approval therefore cannot be replayed on
//! another chain or on another account that shares the owner key.

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256};
use chain_evm::eip712::{TypedData, TypedDataDomain, TypedDataField, EIP712_DOMAIN_TYPE};
use serde_json::json;

use crate::error::SmartAccountError;

pub const DOMAIN_NAME: &str = "Coinbase Smart Wallet";
pub const DOMAIN_VERSION: &str = "1";
pub const PRIMARY_TYPE: &str = "CoinbaseSmartWalletMessage";

/// Builds the envelope `CoinbaseSmartWalletMessage { hash }` under the
/// domain `{name, version, chainId, verifyingContract = smart_account}`.
pub fn replay_safe_typed_data(
    original_hash: B256,
    chain_id: u64,
    smart_account: Address,
) -> Result<TypedData, SmartAccountError> {
    let domain = TypedDataDomain {
        name: Some(DOMAIN_NAME.to_string()),
        version: Some(DOMAIN_VERSION.to_string()),
        chain_id: Some(chain_id),
        verifying_contract: Some(smart_account),
        salt: None,
    };

    let mut types = BTreeMap::new();
    types.insert(EIP712_DOMAIN_TYPE.to_string(), domain.fields());
    types.insert(
        PRIMARY_TYPE.to_string(),
        vec![TypedDataField::new("hash", "bytes32")],
    );

    let message = json!({ "hash": original_hash });

    Ok(TypedData::new(domain, types, PRIMARY_TYPE, &message)?)
}

/// The digest an owner key signs for `original_hash` on this account.
pub fn replay_safe_hash(
    original_hash: B256,
    chain_id: u64,
    smart_account: Address,
) -> Result<B256, SmartAccountError> {
    Ok(replay_safe_typed_data(original_hash, chain_id, smart_account)?.signing_hash())
}
