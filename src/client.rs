use crate::{
    notifications::{
        CONFIRM_PROMPT_DURATION,
        INSTALL_PROMPT_DURATION,
        Level,
        Notification,
        Notifications,
    },
    settings::Settings,
    ui,
};
use chrono::{
    DateTime,
    Local,
};
use coinflip::{
    Amount,
    ChainConfirmation,
    CoinSide,
    CoinflipGame,
    Currency,
    FlipId,
    FlipMode,
    GameSnapshot,
    OutcomeSource,
    RandomOutcome,
    Settlement,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use std::{
    collections::VecDeque,
    sync::Arc,
    time::{
        Duration,
        Instant,
    },
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
};
use tracing::{
    debug,
    error,
    info,
    warn,
};
use wallet_bridge::{
    Address,
    BridgeError,
    ChainId,
    FlipReceipt,
    FlipTransaction,
    NETWORKS,
    Network,
    ProviderEvent,
    SessionChange,
    WalletBridge,
    WalletProvider,
    WalletSession,
    Wei,
    submit_flip,
};

const TICK_INTERVAL: Duration = Duration::from_millis(250);
const READY: &str = "Ready";

pub struct AppConfig<P> {
    pub settings: Settings,
    /// `None` when no wallet provider is installed.
    pub provider: Option<Arc<P>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub at: DateTime<Local>,
    pub mode: FlipMode,
    pub choice: CoinSide,
    pub outcome: CoinSide,
    pub amount: Amount,
    pub currency: Currency,
    pub won: bool,
    pub tx_hash: Option<String>,
}

impl HistoryEntry {
    fn from_settlement(settlement: &Settlement, at: DateTime<Local>) -> Self {
        Self {
            at,
            mode: settlement.flip.mode,
            choice: settlement.flip.choice,
            outcome: settlement.outcome,
            amount: settlement.flip.amount,
            currency: settlement.flip.currency,
            won: settlement.won,
            tx_hash: settlement.tx_hash.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletView {
    pub detected: bool,
    pub connected: bool,
    pub account: Option<Address>,
    pub chain_id: Option<ChainId>,
    pub network: &'static str,
    pub balance: Option<Wei>,
    pub native_currency: &'static str,
}

impl WalletView {
    pub fn balance_label(&self) -> Option<String> {
        self.balance
            .map(|wei| format!("{} {}", wei.ether_fixed(6), self.native_currency))
    }
}

#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub game: GameSnapshot,
    pub mode: FlipMode,
    pub bet_input: String,
    pub balances: Vec<(Currency, Amount)>,
    pub wallet: WalletView,
    pub notifications: Vec<Notification>,
    pub history: Vec<HistoryEntry>,
    pub status: String,
}

#[derive(Debug)]
pub enum FlipWorkerEvent {
    Confirmed { id: FlipId, receipt: FlipReceipt },
    Failed { id: FlipId, error: BridgeError },
    AnimationDone { id: FlipId },
}

impl FlipWorkerEvent {
    pub fn id(&self) -> FlipId {
        match self {
            FlipWorkerEvent::Confirmed { id, .. }
            | FlipWorkerEvent::Failed { id, .. }
            | FlipWorkerEvent::AnimationDone { id } => *id,
        }
    }
}

/// Timer and wallet work for one flip, run off the UI loop.
pub enum FlipJob<P> {
    Animate {
        id: FlipId,
        delay: Duration,
    },
    Submit {
        id: FlipId,
        provider: Arc<P>,
        tx: FlipTransaction,
        delay: Duration,
    },
}

impl<P: WalletProvider> FlipJob<P> {
    pub fn id(&self) -> FlipId {
        match self {
            FlipJob::Animate { id, .. } | FlipJob::Submit { id, .. } => *id,
        }
    }

    pub async fn run(self, events: mpsc::UnboundedSender<FlipWorkerEvent>) {
        match self {
            FlipJob::Animate { id, delay } => {
                tokio::time::sleep(delay).await;
                report(&events, FlipWorkerEvent::AnimationDone { id });
            }
            FlipJob::Submit {
                id,
                provider,
                tx,
                delay,
            } => match submit_flip(&*provider, tx).await {
                Ok(receipt) => {
                    if !report(&events, FlipWorkerEvent::Confirmed { id, receipt }) {
                        return;
                    }
                    tokio::time::sleep(delay).await;
                    report(&events, FlipWorkerEvent::AnimationDone { id });
                }
                Err(error) => {
                    report(&events, FlipWorkerEvent::Failed { id, error });
                }
            },
        }
    }

    pub fn spawn(self, events: mpsc::UnboundedSender<FlipWorkerEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}

pub struct AppController<P, O = RandomOutcome> {
    game: CoinflipGame,
    bridge: WalletBridge<P>,
    outcomes: O,
    mode: FlipMode,
    notifications: Notifications,
    history: VecDeque<HistoryEntry>,
    history_depth: usize,
    animation_delay: Duration,
    bet_input: String,
    wallet_balance: Option<Wei>,
    status: String,
}

impl<P: WalletProvider, O: OutcomeSource> AppController<P, O> {
    pub fn new(config: AppConfig<P>, outcomes: O) -> Self {
        let AppConfig { settings, provider } = config;
        let mut game = CoinflipGame::new(settings.ledger());
        game.select_currency(settings.default_currency);
        game.set_bet_amount(settings.default_bet);
        Self {
            game,
            bridge: WalletBridge::new(provider),
            outcomes,
            mode: FlipMode::Demo,
            notifications: Notifications::new(settings.notification_duration()),
            history: VecDeque::new(),
            history_depth: settings.history_depth,
            animation_delay: settings.animation_delay(),
            bet_input: settings.default_bet.compact(),
            wallet_balance: None,
            status: READY.to_string(),
        }
    }

    pub fn game(&self) -> &CoinflipGame {
        &self.game
    }

    pub fn mode(&self) -> FlipMode {
        self.mode
    }

    pub fn session(&self) -> &WalletSession {
        self.bridge.session()
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<ProviderEvent>> {
        self.bridge.subscribe()
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            game: self.game.snapshot(),
            mode: self.mode,
            bet_input: self.bet_input.clone(),
            balances: self.game.ledger().iter().collect(),
            wallet: self.wallet_view(),
            notifications: self.notifications.active().cloned().collect(),
            history: self.history.iter().cloned().collect(),
            status: self.status.clone(),
        }
    }

    fn wallet_view(&self) -> WalletView {
        let session = self.bridge.session();
        WalletView {
            detected: self.bridge.is_detected(),
            connected: session.is_connected,
            account: session.account,
            chain_id: session.chain_id,
            network: session.network_name(),
            balance: self.wallet_balance,
            native_currency: self.native_currency(),
        }
    }

    fn native_currency(&self) -> &'static str {
        self.bridge
            .session()
            .chain_id
            .map_or("ETH", Network::currency_of)
    }

    pub fn select_choice(&mut self, choice: CoinSide) {
        self.game.select_choice(choice);
    }

    pub fn next_currency(&mut self) {
        let next = self.game.state().selected_currency.next();
        self.game.select_currency(next);
    }

    pub fn prev_currency(&mut self) {
        let prev = self.game.state().selected_currency.prev();
        self.game.select_currency(prev);
    }

    pub fn set_bet_input(&mut self, raw: impl Into<String>) {
        self.bet_input = raw.into();
        if let Err(e) = self.game.set_bet_input(&self.bet_input) {
            debug!(error = %e, input = %self.bet_input, "bet input treated as zero");
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            FlipMode::Demo => FlipMode::Blockchain,
            FlipMode::Blockchain => FlipMode::Demo,
        };
        info!(mode = %self.mode, "flip mode changed");
    }

    pub fn reset(&mut self) {
        self.game.reset();
        if !self.game.state().is_flipping() {
            self.set_status(READY);
        }
    }

    /// Starts a flip when the trigger allows it; the returned job has to run
    /// for the flip to settle.
    pub fn request_flip(&mut self) -> Option<FlipJob<P>> {
        let trigger = self.game.trigger_state();
        if !trigger.enabled {
            debug!(label = %trigger.label, "flip request ignored");
            return None;
        }
        match self.mode {
            FlipMode::Demo => {
                let flip = self.game.start_demo_flip(&mut self.outcomes)?;
                self.set_status("Flipping...");
                Some(FlipJob::Animate {
                    id: flip.id,
                    delay: self.animation_delay,
                })
            }
            FlipMode::Blockchain => {
                let state = self.game.state();
                let choice = state.selected_choice?;
                let tx = match self.bridge.flip_transaction(choice, state.bet_amount) {
                    Ok(tx) => tx,
                    Err(e) => {
                        self.report_bridge_error(&e);
                        return None;
                    }
                };
                let provider = match self.bridge.provider() {
                    Ok(provider) => Arc::clone(provider),
                    Err(e) => {
                        self.report_bridge_error(&e);
                        return None;
                    }
                };
                let flip = self.game.start_chain_flip()?;
                self.notifications.push_for(
                    Level::Info,
                    "Please confirm the transaction in your wallet",
                    CONFIRM_PROMPT_DURATION,
                );
                self.set_status("Confirming Transaction...");
                Some(FlipJob::Submit {
                    id: flip.id,
                    provider,
                    tx,
                    delay: self.animation_delay,
                })
            }
        }
    }

    fn report_bridge_error(&mut self, e: &BridgeError) {
        match e {
            BridgeError::NoProvider => self.notifications.push_for(
                Level::Warning,
                e.to_string(),
                INSTALL_PROMPT_DURATION,
            ),
            other => self.notifications.push(Level::Error, other.to_string()),
        }
    }

    pub async fn handle_worker_event(&mut self, event: FlipWorkerEvent) {
        match event {
            FlipWorkerEvent::Confirmed { id, receipt } => {
                let preview = receipt.tx_hash.short();
                let confirmation = ChainConfirmation {
                    outcome: receipt.outcome,
                    tx_hash: receipt.tx_hash.to_string(),
                };
                if self.game.confirm_chain_flip(id, confirmation) {
                    self.notifications.push(
                        Level::Success,
                        format!("Transaction confirmed! Hash: {preview}"),
                    );
                    self.set_status("Flipping...");
                } else {
                    warn!(flip = %id, "confirmation for a flip that is no longer pending");
                }
            }
            FlipWorkerEvent::Failed { id, error } => {
                error!(flip = %id, error = %error, "chain flip failed");
                if self.game.abort_flip(id) {
                    self.notifications
                        .push(Level::Error, format!("Transaction failed: {error}"));
                    self.set_status(READY);
                }
            }
            FlipWorkerEvent::AnimationDone { id } => {
                let Some(settlement) = self.game.settle(id) else {
                    warn!(flip = %id, "animation finished for unknown flip");
                    return;
                };
                self.record_history(&settlement);
                let summary = self.describe_settlement(&settlement);
                self.set_status(summary);
                if settlement.flip.mode == FlipMode::Blockchain {
                    self.refresh_wallet_balance().await;
                }
            }
        }
    }

    fn record_history(&mut self, settlement: &Settlement) {
        self.history
            .push_front(HistoryEntry::from_settlement(settlement, Local::now()));
        self.history.truncate(self.history_depth);
    }

    fn describe_settlement(&self, settlement: &Settlement) -> String {
        let landed = format!(
            "The coin landed on {}!",
            settlement.outcome.label().to_uppercase()
        );
        let unit = match settlement.flip.mode {
            FlipMode::Demo => settlement.flip.currency.symbol(),
            FlipMode::Blockchain => self.native_currency(),
        };
        let amount = settlement.flip.amount.fixed(8);
        let verdict = if settlement.won {
            format!("You won {amount} {unit}!")
        } else {
            format!("You lost {amount} {unit}.")
        };
        match (&settlement.balance_after, &settlement.tx_hash) {
            (Some(balance), _) => format!(
                "{landed} {verdict} Your new balance: {} {unit}",
                balance.fixed(8)
            ),
            (None, Some(hash)) => {
                format!("{landed} {verdict} Transaction Hash: {}", hash_preview(hash))
            }
            (None, None) => format!("{landed} {verdict}"),
        }
    }

    /// Picks up an earlier authorization, as on page load.
    pub async fn restore_wallet(&mut self) {
        match self.bridge.restore().await {
            Ok(true) => self.refresh_wallet_balance().await,
            Ok(false) => {}
            Err(e @ BridgeError::NoProvider) => self.report_bridge_error(&e),
            Err(e) => warn!(error = %e, "checking existing wallet connection failed"),
        }
    }

    pub async fn connect_wallet(&mut self) {
        match self.bridge.connect().await {
            Ok(account) => {
                self.notifications
                    .push(Level::Success, "Wallet connected successfully!");
                self.set_status(format!("Connected {}", account.short()));
                self.refresh_wallet_balance().await;
            }
            Err(e @ BridgeError::NoProvider) => self.report_bridge_error(&e),
            Err(e) => {
                error!(error = %e, "wallet connection failed");
                self.notifications.push(Level::Error, "Failed to connect wallet");
            }
        }
    }

    pub fn disconnect_wallet(&mut self) {
        self.bridge.disconnect();
        self.on_disconnected();
    }

    fn on_disconnected(&mut self) {
        self.wallet_balance = None;
        if self.mode == FlipMode::Blockchain {
            self.mode = FlipMode::Demo;
        }
        self.notifications.push(Level::Info, "Wallet disconnected");
    }

    pub async fn handle_provider_event(&mut self, event: ProviderEvent) {
        match self.bridge.handle_event(event) {
            SessionChange::Unchanged => {}
            SessionChange::Disconnected => self.on_disconnected(),
            SessionChange::AccountChanged(_) => {
                self.notifications.push(Level::Info, "Account changed");
                self.refresh_wallet_balance().await;
            }
            SessionChange::ChainChanged { network_name, .. } => {
                self.notifications
                    .push(Level::Info, format!("Switched to {network_name}"));
                self.refresh_wallet_balance().await;
            }
        }
    }

    /// Asks the wallet to move to the next supported network.
    pub async fn switch_to_next_network(&mut self) {
        let current = self.bridge.session().chain_id;
        let position = current.and_then(|c| NETWORKS.iter().position(|n| n.chain_id == c));
        let next = match position {
            Some(idx) => NETWORKS[(idx + 1) % NETWORKS.len()],
            None => NETWORKS[0],
        };
        if let Err(e) = self.bridge.switch_network(next.chain_id).await {
            match e {
                BridgeError::NoProvider => self.report_bridge_error(&e),
                _ => self
                    .notifications
                    .push(Level::Error, "Failed to switch network"),
            }
        }
    }

    pub async fn refresh_wallet_balance(&mut self) {
        if !self.bridge.session().is_connected {
            self.wallet_balance = None;
            return;
        }
        match self.bridge.wallet_balance().await {
            Ok(balance) => self.wallet_balance = Some(balance),
            Err(e) => {
                warn!(error = %e, "wallet balance refresh failed");
                self.wallet_balance = None;
            }
        }
    }

    /// Expires notifications; returns whether a redraw is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.notifications.prune(now)
    }

    pub async fn handle_user_event(&mut self, event: ui::UserEvent) -> Option<FlipJob<P>> {
        match event {
            ui::UserEvent::ChooseHeads => self.select_choice(CoinSide::Heads),
            ui::UserEvent::ChooseTails => self.select_choice(CoinSide::Tails),
            ui::UserEvent::NextCurrency => self.next_currency(),
            ui::UserEvent::PrevCurrency => self.prev_currency(),
            ui::UserEvent::SetBet(raw) => self.set_bet_input(raw),
            ui::UserEvent::ToggleMode => self.toggle_mode(),
            ui::UserEvent::Reset => self.reset(),
            ui::UserEvent::Flip => return self.request_flip(),
            ui::UserEvent::ConnectWallet => self.connect_wallet().await,
            ui::UserEvent::DisconnectWallet => self.disconnect_wallet(),
            ui::UserEvent::NextNetwork => self.switch_to_next_network().await,
            ui::UserEvent::Redraw | ui::UserEvent::Quit => {}
        }
        None
    }
}

/// Returns false once the controller has stopped listening.
fn report(events: &mpsc::UnboundedSender<FlipWorkerEvent>, event: FlipWorkerEvent) -> bool {
    match events.send(event) {
        Ok(()) => true,
        Err(mpsc::error::SendError(event)) => {
            debug!(flip = %event.id(), "flip worker event dropped, controller gone");
            false
        }
    }
}

pub(crate) fn hash_preview(hash: &str) -> String {
    let mut preview: String = hash.chars().take(10).collect();
    if hash.chars().nth(10).is_some() {
        preview.push_str("...");
    }
    preview
}

pub async fn run_app<P: WalletProvider>(config: AppConfig<P>) -> Result<()> {
    let controller = AppController::new(config, RandomOutcome::thread_local());
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    info!("Starting UI");
    ui::terminal_enter(&mut ui_state)?;
    info!("UI ready");
    let res = run_loop(controller, &mut ui_state, &mut input_events).await;
    ui::terminal_exit()?;
    res
}

async fn next_provider_event(
    events: &mut Option<mpsc::UnboundedReceiver<ProviderEvent>>,
) -> Option<ProviderEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn run_loop<P: WalletProvider, O: OutcomeSource>(
    mut controller: AppController<P, O>,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
) -> Result<()> {
    info!("Running app loop");
    let (worker_tx, mut worker_rx) = mpsc::unbounded_channel();
    let mut provider_events = controller.subscribe();
    controller.restore_wallet().await;
    ui::draw(ui_state, &controller.snapshot()).wrap_err("initial draw failed")?;

    let mut tick = tokio::time::interval(TICK_INTERVAL);
    loop {
        tokio::select! {
            Some(event) = worker_rx.recv() => {
                controller.handle_worker_event(event).await;
            }
            maybe_event = next_provider_event(&mut provider_events) => {
                match maybe_event {
                    Some(event) => controller.handle_provider_event(event).await,
                    None => {
                        warn!("provider event channel closed");
                        provider_events = None;
                        continue;
                    }
                }
            }
            _ = tick.tick() => {
                if !controller.tick(Instant::now()) {
                    continue;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted; abandoning in-flight state");
                break;
            }
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                let Some(ev) = ui::interpret_event(ui_state, event) else {
                    continue;
                };
                if matches!(ev, ui::UserEvent::Quit) {
                    break;
                }
                if let Some(job) = controller.handle_user_event(ev).await {
                    debug!(flip = %job.id(), "spawning flip job");
                    job.spawn(worker_tx.clone());
                }
            }
        }
        ui::draw(ui_state, &controller.snapshot()).wrap_err("draw after update failed")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn hash_preview__keeps_ten_characters() {
        assert_eq!("0xabcdef12...", hash_preview("0xabcdef1234567890"));
        assert_eq!("0xabc", hash_preview("0xabc"));
        assert_eq!("0xabcdef12", hash_preview("0xabcdef12"));
        assert_eq!("ħħħħħħħħħħ...", hash_preview("ħħħħħħħħħħħħ"));
    }

    #[test]
    fn report__returns_false_once_the_receiver_is_gone() {
        // given
        let mut game = CoinflipGame::default();
        game.select_choice(coinflip::CoinSide::Heads);
        let id = game.start_chain_flip().unwrap().id;
        let (tx, rx) = mpsc::unbounded_channel();

        // when
        let delivered = report(&tx, FlipWorkerEvent::AnimationDone { id });
        drop(rx);
        let dropped = report(&tx, FlipWorkerEvent::AnimationDone { id });

        // then
        assert!(delivered);
        assert!(!dropped);
    }
}
