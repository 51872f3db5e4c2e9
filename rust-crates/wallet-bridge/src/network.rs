use crate::types::{
    Address,
    ChainId,
};

const PLACEHOLDER_CONTRACT: Address = Address::new([
    0x12, 0x34, 0x56, 0x78, 0x90, 0x12, 0x34, 0x56, 0x78, 0x90, 0x12, 0x34, 0x56, 0x78,
    0x90, 0x12, 0x34, 0x56, 0x78, 0x90,
]);

pub const UNKNOWN_NETWORK: &str = "Unknown Network";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Network {
    pub chain_id: ChainId,
    pub name: &'static str,
    pub currency: &'static str,
    pub rpc_url: &'static str,
    pub contract: Address,
}

pub const NETWORKS: [Network; 5] = [
    Network {
        chain_id: ChainId::ETHEREUM,
        name: "Ethereum Mainnet",
        currency: "ETH",
        rpc_url: "https://mainnet.infura.io/v3/",
        contract: PLACEHOLDER_CONTRACT,
    },
    Network {
        chain_id: ChainId::BSC,
        name: "BSC Mainnet",
        currency: "BNB",
        rpc_url: "https://bsc-dataseed.binance.org/",
        contract: PLACEHOLDER_CONTRACT,
    },
    Network {
        chain_id: ChainId::POLYGON,
        name: "Polygon Mainnet",
        currency: "MATIC",
        rpc_url: "https://polygon-rpc.com/",
        contract: PLACEHOLDER_CONTRACT,
    },
    Network {
        chain_id: ChainId::ARBITRUM,
        name: "Arbitrum One",
        currency: "ETH",
        rpc_url: "https://arb1.arbitrum.io/rpc",
        contract: PLACEHOLDER_CONTRACT,
    },
    Network {
        chain_id: ChainId::SEPOLIA,
        name: "Sepolia Testnet",
        currency: "ETH",
        rpc_url: "https://sepolia.infura.io/v3/",
        contract: PLACEHOLDER_CONTRACT,
    },
];

impl Network {
    pub fn lookup(chain_id: ChainId) -> Option<&'static Network> {
        NETWORKS.iter().find(|n| n.chain_id == chain_id)
    }

    pub fn name_of(chain_id: ChainId) -> &'static str {
        Self::lookup(chain_id).map_or(UNKNOWN_NETWORK, |n| n.name)
    }

    /// Native currency symbol, falling back to ETH for unknown chains.
    pub fn currency_of(chain_id: ChainId) -> &'static str {
        Self::lookup(chain_id).map_or("ETH", |n| n.currency)
    }
}
