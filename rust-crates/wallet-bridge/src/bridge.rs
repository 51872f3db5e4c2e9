use crate::{
    network::Network,
    provider::{
        FlipTransaction,
        ProviderError,
        ProviderEvent,
        WalletProvider,
    },
    receipt::{
        FlipReceipt,
        parse_flip_receipt,
    },
    session::{
        SessionChange,
        WalletSession,
    },
    types::{
        Address,
        ChainId,
        TxHash,
        Wei,
    },
};
use coinflip::{
    Amount,
    CoinSide,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{
    debug,
    info,
    warn,
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("Please install MetaMask to use Web3 features")]
    NoProvider,
    #[error("Please connect your wallet first")]
    NotConnected,
    #[error("wallet returned no accounts")]
    NoAccounts,
    #[error("no coinflip contract deployed on chain {0}")]
    NoContract(ChainId),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },
    #[error("transaction {tx_hash} emitted no CoinFlipped event")]
    MissingFlipEvent { tx_hash: TxHash },
    #[error("malformed flip result in {tx_hash}: {reason}")]
    MalformedResult {
        tx_hash: TxHash,
        reason: &'static str,
    },
}

/// Session bookkeeping on top of an optional injected provider.
pub struct WalletBridge<P> {
    provider: Option<Arc<P>>,
    session: WalletSession,
}

impl<P: WalletProvider> WalletBridge<P> {
    pub fn new(provider: Option<Arc<P>>) -> Self {
        Self {
            provider,
            session: WalletSession::default(),
        }
    }

    pub fn is_detected(&self) -> bool {
        self.provider.is_some()
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn provider(&self) -> Result<&Arc<P>, BridgeError> {
        self.provider.as_ref().ok_or(BridgeError::NoProvider)
    }

    pub fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<ProviderEvent>> {
        self.provider.as_ref().map(|p| p.subscribe())
    }

    /// Picks up an existing authorization without prompting. Returns
    /// whether the session is now connected.
    pub async fn restore(&mut self) -> Result<bool, BridgeError> {
        let provider = Arc::clone(self.provider()?);
        let accounts = provider.accounts().await?;
        let Some(account) = accounts.first().copied() else {
            debug!("no previously authorized accounts");
            return Ok(false);
        };
        let chain_id = provider.chain_id().await?;
        self.session = WalletSession::connected(account, chain_id);
        info!(%account, %chain_id, "wallet session restored");
        Ok(true)
    }

    pub async fn connect(&mut self) -> Result<Address, BridgeError> {
        let provider = Arc::clone(self.provider()?);
        let accounts = provider.request_accounts().await?;
        let account = accounts.first().copied().ok_or(BridgeError::NoAccounts)?;
        let chain_id = provider.chain_id().await?;
        self.session = WalletSession::connected(account, chain_id);
        info!(%account, %chain_id, "wallet connected");
        Ok(account)
    }

    pub fn disconnect(&mut self) {
        if self.session.is_connected {
            info!("wallet disconnected");
        }
        self.session.clear();
    }

    pub fn handle_event(&mut self, event: ProviderEvent) -> SessionChange {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.first().copied() {
                None if self.session.is_connected => {
                    self.disconnect();
                    SessionChange::Disconnected
                }
                None => SessionChange::Unchanged,
                Some(account) if self.session.account == Some(account) => {
                    SessionChange::Unchanged
                }
                Some(account) => {
                    info!(%account, "wallet account changed");
                    self.session.account = Some(account);
                    SessionChange::AccountChanged(account)
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                self.session.chain_id = Some(chain_id);
                let network_name = Network::name_of(chain_id);
                info!(%chain_id, network = network_name, "wallet chain changed");
                SessionChange::ChainChanged {
                    chain_id,
                    network_name,
                }
            }
        }
    }

    pub async fn wallet_balance(&self) -> Result<Wei, BridgeError> {
        let provider = self.provider()?;
        let account = self.session.account.ok_or(BridgeError::NotConnected)?;
        Ok(provider.balance(account).await?)
    }

    pub async fn switch_network(&self, chain_id: ChainId) -> Result<(), BridgeError> {
        let provider = self.provider()?;
        provider.switch_chain(chain_id).await.map_err(|e| {
            warn!(error = %e, %chain_id, "network switch failed");
            BridgeError::from(e)
        })
    }

    /// Builds the contract call for the current session.
    pub fn flip_transaction(
        &self,
        choice: CoinSide,
        amount: Amount,
    ) -> Result<FlipTransaction, BridgeError> {
        let (Some(from), Some(chain_id), true) = (
            self.session.account,
            self.session.chain_id,
            self.session.is_connected,
        ) else {
            return Err(BridgeError::NotConnected);
        };
        self.provider()?;
        let network = Network::lookup(chain_id).ok_or(BridgeError::NoContract(chain_id))?;
        Ok(FlipTransaction {
            from,
            to: network.contract,
            chain_id,
            choice: choice.as_bool(),
            value: Wei::from_amount(amount),
        })
    }
}

/// Sends the flip and validates the receipt.
pub async fn submit_flip<P: WalletProvider>(
    provider: &P,
    tx: FlipTransaction,
) -> Result<FlipReceipt, BridgeError> {
    debug!(from = %tx.from, chain_id = %tx.chain_id, choice = tx.choice, "submitting flip");
    let receipt = provider.send_flip(tx.clone()).await?;
    let flip = parse_flip_receipt(&tx, receipt)?;
    info!(tx_hash = %flip.tx_hash, won = flip.won, "flip confirmed on chain");
    Ok(flip)
}
