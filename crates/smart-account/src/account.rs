use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::signature_wrapper::OwnerIndex;

/// A contract-based EVM account whose signatures are validated on-chain
/// against its registered owner keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmSmartAccount {
    /// Address of the smart account contract.
    pub address: Address,
    /// Owner addresses, in on-chain owner index order.
    pub owners: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EvmSmartAccount {
    pub fn new(address: Address, owners: Vec<Address>) -> Self {
        Self {
            address,
            owners,
            name: None,
        }
    }

    /// The owner registered at `index`, if any.
    pub fn owner(&self, index: OwnerIndex) -> Option<Address> {
        self.owners.get(usize::from(index)).copied()
    }
}
