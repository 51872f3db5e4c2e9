mod bridge;
mod dev_wallet;
mod network;
mod provider;
mod receipt;
mod session;
mod types;

pub use bridge::{
    BridgeError,
    WalletBridge,
    submit_flip,
};
pub use dev_wallet::DevWallet;
pub use network::{
    NETWORKS,
    Network,
    UNKNOWN_NETWORK,
};
pub use provider::{
    ContractEvent,
    FlipTransaction,
    ProviderError,
    ProviderEvent,
    TransactionReceipt,
    WalletProvider,
};
pub use receipt::{
    FlipReceipt,
    parse_flip_receipt,
};
pub use session::{
    SessionChange,
    WalletSession,
};
pub use types::{
    Address,
    ChainId,
    ParseError,
    TxHash,
    Wei,
};
