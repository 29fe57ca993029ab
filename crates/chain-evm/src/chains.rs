use serde::Serialize;

use crate::error::EvmError;

/// Definition of an EVM-compatible network.
#[derive(Debug, Clone, Serialize)]
pub struct EvmChain {
    pub chain_id: u64,
    /// Network identifier as used by the wallet API (e.g. `base-sepolia`).
    pub network: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub is_testnet: bool,
}

/// Base (chain ID 8453).
pub const BASE: EvmChain = EvmChain {
    chain_id: 8453,
    network: "base",
    name: "Base",
    symbol: "ETH",
    is_testnet: false,
};

/// Base Sepolia Testnet (chain ID 84532).
pub const BASE_SEPOLIA: EvmChain = EvmChain {
    chain_id: 84532,
    network: "base-sepolia",
    name: "Base Sepolia",
    symbol: "ETH",
    is_testnet: true,
};

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: EvmChain = EvmChain {
    chain_id: 1,
    network: "ethereum",
    name: "Ethereum",
    symbol: "ETH",
    is_testnet: false,
};

/// Ethereum Sepolia Testnet (chain ID 11155111).
pub const ETHEREUM_SEPOLIA: EvmChain = EvmChain {
    chain_id: 11155111,
    network: "ethereum-sepolia",
    name: "Sepolia",
    symbol: "ETH",
    is_testnet: true,
};

/// Arbitrum One (chain ID 42161).
pub const ARBITRUM: EvmChain = EvmChain {
    chain_id: 42161,
    network: "arbitrum",
    name: "Arbitrum One",
    symbol: "ETH",
    is_testnet: false,
};

/// Optimism (chain ID 10).
pub const OPTIMISM: EvmChain = EvmChain {
    chain_id: 10,
    network: "optimism",
    name: "Optimism",
    symbol: "ETH",
    is_testnet: false,
};

/// Polygon PoS (chain ID 137).
pub const POLYGON: EvmChain = EvmChain {
    chain_id: 137,
    network: "polygon",
    name: "Polygon",
    symbol: "POL",
    is_testnet: false,
};

/// Avalanche C-Chain (chain ID 43114).
pub const AVALANCHE: EvmChain = EvmChain {
    chain_id: 43114,
    network: "avalanche",
    name: "Avalanche C-Chain",
    symbol: "AVAX",
    is_testnet: false,
};

/// All supported EVM chains.
const ALL_CHAINS: &[&EvmChain] = &[
    &BASE,
    &BASE_SEPOLIA,
    &ETHEREUM,
    &ETHEREUM_SEPOLIA,
    &ARBITRUM,
    &OPTIMISM,
    &POLYGON,
    &AVALANCHE,
];

/// Returns the chain definition for a given chain ID, or `None` if unsupported.
pub fn get_chain(chain_id: u64) -> Option<&'static EvmChain> {
    ALL_CHAINS.iter().find(|c| c.chain_id == chain_id).copied()
}

/// Returns the chain definition for a network identifier such as `base-sepolia`.
pub fn get_chain_by_network(network: &str) -> Option<&'static EvmChain> {
    ALL_CHAINS.iter().find(|c| c.network == network).copied()
}

/// Human-readable name for a chain ID; unknown IDs are shown numerically.
pub fn display_name(chain_id: u64) -> String {
    match get_chain(chain_id) {
        Some(chain) => chain.name.to_string(),
        None => format!("chain {chain_id}"),
    }
}

/// Like [`get_chain`], but an unknown chain ID is an error.
pub fn require_chain(chain_id: u64) -> Result<&'static EvmChain, EvmError> {
    get_chain(chain_id).ok_or(EvmError::UnsupportedChain(chain_id))
}

/// Returns all supported EVM chain definitions.
pub fn supported_chains() -> Vec<&'static EvmChain> {
    ALL_CHAINS.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_base() {
        let chain = get_chain(8453).expect("Base should be supported");
        assert_eq!(chain.name, "Base");
        assert_eq!(chain.network, "base");
        assert!(!chain.is_testnet);
    }

    #[test]
    fn get_base_sepolia_by_network() {
        let chain = get_chain_by_network("base-sepolia").expect("Base Sepolia should be supported");
        assert_eq!(chain.chain_id, 84532);
        assert!(chain.is_testnet);
    }

    #[test]
    fn get_ethereum() {
        let chain = get_chain(1).expect("Ethereum should be supported");
        assert_eq!(chain.network, "ethereum");
        assert_eq!(chain.symbol, "ETH");
    }

    #[test]
    fn unsupported_chain_returns_none() {
        assert!(get_chain(999999).is_none());
        assert!(get_chain_by_network("solana").is_none());
    }

    #[test]
    fn require_unknown_chain_errors() {
        assert!(matches!(require_chain(999999), Err(EvmError::UnsupportedChain(999999))));
        assert_eq!(require_chain(10).unwrap().name, "Optimism");
    }

    #[test]
    fn display_name_falls_back_to_number() {
        assert_eq!(display_name(42161), "Arbitrum One");
        assert_eq!(display_name(31337), "chain 31337");
    }

    #[test]
    fn network_ids_are_unique() {
        let chains = supported_chains();
        for (i, a) in chains.iter().enumerate() {
            for b in &chains[i + 1..] {
                assert_ne!(a.network, b.network);
                assert_ne!(a.chain_id, b.chain_id);
            }
        }
    }

    #[test]
    fn supported_chains_contains_testnets() {
        let testnets: Vec<_> = supported_chains().into_iter().filter(|c| c.is_testnet).collect();
        assert_eq!(testnets.len(), 2);
    }
}
