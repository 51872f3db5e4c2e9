use crate::{
    network::Network,
    provider::{
        ContractEvent,
        FlipTransaction,
        ProviderError,
        ProviderEvent,
        TransactionReceipt,
        WalletProvider,
    },
    types::{
        Address,
        ChainId,
        TxHash,
        Wei,
    },
};
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use sha2::{
    Digest,
    Sha256,
};
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        MutexGuard,
        PoisonError,
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::{
    debug,
    info,
};

/// In-process wallet that also plays the deployed coinflip contract.
pub struct DevWallet {
    state: Mutex<DevWalletState>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ProviderEvent>>>,
    latency: Duration,
}

struct DevWalletState {
    accounts: Vec<Address>,
    authorized: bool,
    approve_requests: bool,
    chain_id: ChainId,
    balances: HashMap<Address, Wei>,
    nonce: u64,
    rng: StdRng,
    reject_next: bool,
    omit_next_event: bool,
}

impl DevWallet {
    pub fn new(account: Address, chain_id: ChainId, balance: Wei) -> Self {
        Self {
            state: Mutex::new(DevWalletState {
                accounts: vec![account],
                authorized: false,
                approve_requests: true,
                chain_id,
                balances: HashMap::from([(account, balance)]),
                nonce: 0,
                rng: StdRng::from_os_rng(),
                reject_next: false,
                omit_next_event: false,
            }),
            subscribers: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.lock().rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Starts with accounts already exposed, as after an earlier visit.
    pub fn pre_authorized(self) -> Self {
        self.lock().authorized = true;
        self
    }

    /// Makes `eth_requestAccounts` fail as if the user closed the prompt.
    pub fn declining_requests(self) -> Self {
        self.lock().approve_requests = false;
        self
    }

    pub fn with_account(self, account: Address, balance: Wei) -> Self {
        {
            let mut state = self.lock();
            state.accounts.push(account);
            state.balances.insert(account, balance);
        }
        self
    }

    pub fn reject_next_transaction(&self) {
        self.lock().reject_next = true;
    }

    pub fn omit_next_event(&self) {
        self.lock().omit_next_event = true;
    }

    pub fn balance_of(&self, account: Address) -> Wei {
        self.lock()
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    /// Moves `account` to the front, as when the user picks another account.
    pub fn select_account(&self, account: Address) {
        let accounts = {
            let mut state = self.lock();
            state.accounts.retain(|a| *a != account);
            state.accounts.insert(0, account);
            state.balances.entry(account).or_default();
            if !state.authorized {
                return;
            }
            state.accounts.clone()
        };
        self.emit(ProviderEvent::AccountsChanged(accounts));
    }

    /// Drops authorization, as when the user locks the wallet.
    pub fn lock_accounts(&self) {
        let was_authorized = std::mem::replace(&mut self.lock().authorized, false);
        if was_authorized {
            self.emit(ProviderEvent::AccountsChanged(Vec::new()));
        }
    }

    /// Switches chains from the wallet side, unknown ids included.
    pub fn change_chain(&self, chain_id: ChainId) {
        self.lock().chain_id = chain_id;
        self.emit(ProviderEvent::ChainChanged(chain_id));
    }

    fn lock(&self) -> MutexGuard<'_, DevWalletState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ProviderEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn exposed_accounts(&self) -> Vec<Address> {
        let state = self.lock();
        if state.authorized {
            state.accounts.clone()
        } else {
            Vec::new()
        }
    }

    fn authorize(&self) -> Result<Vec<Address>, ProviderError> {
        let mut state = self.lock();
        if !state.approve_requests {
            return Err(ProviderError::UserRejected);
        }
        state.authorized = true;
        Ok(state.accounts.clone())
    }

    fn execute_flip(&self, tx: FlipTransaction) -> Result<TransactionReceipt, ProviderError> {
        let mut state = self.lock();
        if !state.authorized || !state.accounts.contains(&tx.from) {
            return Err(ProviderError::Unauthorized);
        }
        if tx.chain_id != state.chain_id {
            return Err(ProviderError::ChainMismatch {
                current: state.chain_id,
                requested: tx.chain_id,
            });
        }
        if std::mem::take(&mut state.reject_next) {
            return Err(ProviderError::UserRejected);
        }
        let available = state.balances.get(&tx.from).copied().unwrap_or_default();
        let after_stake = available
            .checked_sub(tx.value)
            .ok_or(ProviderError::InsufficientFunds {
                needed: tx.value,
                available,
            })?;

        state.nonce += 1;
        let tx_hash = transaction_hash(&tx, state.nonce);
        let deployed = Network::lookup(tx.chain_id).is_some_and(|n| n.contract == tx.to);
        if !deployed {
            debug!(%tx_hash, to = %tx.to, "call to address without contract reverted");
            return Ok(TransactionReceipt {
                tx_hash,
                status: false,
                logs: Vec::new(),
            });
        }

        let result = state.rng.random_bool(0.5);
        let won = result == tx.choice;
        let payout = if won { tx.value.saturating_mul(2) } else { Wei::ZERO };
        state
            .balances
            .insert(tx.from, after_stake.saturating_add(payout));

        let logs = if std::mem::take(&mut state.omit_next_event) {
            Vec::new()
        } else {
            vec![ContractEvent::CoinFlipped {
                player: tx.from,
                choice: tx.choice,
                result,
                amount: tx.value,
                won,
            }]
        };
        info!(%tx_hash, won, "dev wallet mined flip");
        Ok(TransactionReceipt {
            tx_hash,
            status: true,
            logs,
        })
    }
}

fn transaction_hash(tx: &FlipTransaction, nonce: u64) -> TxHash {
    let mut hasher = Sha256::new();
    hasher.update(tx.from.as_bytes());
    hasher.update(tx.to.as_bytes());
    hasher.update(tx.chain_id.0.to_be_bytes());
    hasher.update([u8::from(tx.choice)]);
    hasher.update(tx.value.0.to_be_bytes());
    hasher.update(nonce.to_be_bytes());
    TxHash::new(hasher.finalize().into())
}

impl WalletProvider for DevWallet {
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        Ok(self.exposed_accounts())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.simulate_latency().await;
        self.authorize()
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderError> {
        Ok(self.lock().chain_id)
    }

    async fn balance(&self, account: Address) -> Result<Wei, ProviderError> {
        Ok(self.balance_of(account))
    }

    async fn send_flip(&self, tx: FlipTransaction) -> Result<TransactionReceipt, ProviderError> {
        self.simulate_latency().await;
        self.execute_flip(tx)
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ProviderError> {
        if Network::lookup(chain_id).is_none() {
            return Err(ProviderError::UnsupportedChain(chain_id));
        }
        self.change_chain(chain_id);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }
}
