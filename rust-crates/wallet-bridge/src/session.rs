use crate::{
    network::Network,
    types::{
        Address,
        ChainId,
    },
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletSession {
    pub account: Option<Address>,
    pub chain_id: Option<ChainId>,
    pub is_connected: bool,
}

impl WalletSession {
    pub fn connected(account: Address, chain_id: ChainId) -> Self {
        Self {
            account: Some(account),
            chain_id: Some(chain_id),
            is_connected: true,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn network(&self) -> Option<&'static Network> {
        self.chain_id.and_then(Network::lookup)
    }

    pub fn network_name(&self) -> &'static str {
        self.chain_id
            .map_or(crate::network::UNKNOWN_NETWORK, Network::name_of)
    }
}

/// What a provider event did to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionChange {
    Unchanged,
    Disconnected,
    AccountChanged(Address),
    ChainChanged {
        chain_id: ChainId,
        network_name: &'static str,
    },
}
