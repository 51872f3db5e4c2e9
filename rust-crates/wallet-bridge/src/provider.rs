use crate::types::{
    Address,
    ChainId,
    TxHash,
    Wei,
};
use std::future::Future;
use tokio::sync::mpsc;

/// EIP-1193 style failures a wallet can report.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("User rejected the request.")]
    UserRejected,
    #[error("The requested account has not been authorized by the user.")]
    Unauthorized,
    #[error("Unrecognized chain ID {0}")]
    UnsupportedChain(ChainId),
    #[error("wallet is on chain {current}, transaction targets chain {requested}")]
    ChainMismatch { current: ChainId, requested: ChainId },
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Wei, available: Wei },
    #[error("provider error: {0}")]
    Rpc(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(ChainId),
}

/// Payable `flipCoin(bool)` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlipTransaction {
    pub from: Address,
    pub to: Address,
    pub chain_id: ChainId,
    /// `true` for heads.
    pub choice: bool,
    pub value: Wei,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractEvent {
    CoinFlipped {
        player: Address,
        choice: bool,
        result: bool,
        amount: Wei,
        won: bool,
    },
    Other {
        name: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub tx_hash: TxHash,
    /// `false` when the transaction reverted.
    pub status: bool,
    pub logs: Vec<ContractEvent>,
}

pub trait WalletProvider: Send + Sync + 'static {
    /// Accounts already authorized, without prompting.
    fn accounts(&self) -> impl Future<Output = Result<Vec<Address>, ProviderError>> + Send;

    /// Prompts the user to authorize accounts.
    fn request_accounts(
        &self,
    ) -> impl Future<Output = Result<Vec<Address>, ProviderError>> + Send;

    fn chain_id(&self) -> impl Future<Output = Result<ChainId, ProviderError>> + Send;

    fn balance(
        &self,
        account: Address,
    ) -> impl Future<Output = Result<Wei, ProviderError>> + Send;

    /// Submits the transaction and waits for its receipt.
    fn send_flip(
        &self,
        tx: FlipTransaction,
    ) -> impl Future<Output = Result<TransactionReceipt, ProviderError>> + Send;

    fn switch_chain(
        &self,
        chain_id: ChainId,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent>;
}
