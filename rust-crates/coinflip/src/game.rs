use crate::{
    amount::{
        Amount,
        AmountError,
    },
    currency::Currency,
    ledger::BalanceLedger,
    outcome::OutcomeSource,
    side::CoinSide,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    time::Duration,
};
use tracing::{
    debug,
    info,
};

#[cfg(test)]
mod tests;

/// How long the coin spins before a flip settles.
pub const DEFAULT_ANIMATION_DELAY: Duration = Duration::from_secs(5);

pub const DEFAULT_BET: Amount = Amount::from_base_units(100_000);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipMode {
    #[default]
    Demo,
    Blockchain,
}

impl fmt::Display for FlipMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlipMode::Demo => f.write_str("Demo"),
            FlipMode::Blockchain => f.write_str("Blockchain"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlipId(u64);

impl fmt::Display for FlipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bet parameters frozen at the moment a flip starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFlip {
    pub id: FlipId,
    pub mode: FlipMode,
    pub choice: CoinSide,
    pub currency: Currency,
    pub amount: Amount,
}

/// Outcome reported back by a confirmed blockchain flip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainConfirmation {
    pub outcome: CoinSide,
    pub tx_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub flip: PendingFlip,
    pub outcome: CoinSide,
    pub won: bool,
    /// Demo balance after settlement; `None` for blockchain flips.
    pub balance_after: Option<Amount>,
    pub tx_hash: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlipStage {
    AwaitingConfirmation,
    Animating {
        outcome: CoinSide,
        tx_hash: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InFlight {
    pub flip: PendingFlip,
    pub stage: FlipStage,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Flipping(InFlight),
    Settled(Settlement),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerLabel {
    FlipCoin,
    FlipAgain,
    SelectChoiceAndAmount,
    InvalidAmount,
    InsufficientBalance,
    Flipping,
    ConfirmingTransaction,
}

impl fmt::Display for TriggerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TriggerLabel::FlipCoin => "Flip Coin",
            TriggerLabel::FlipAgain => "Flip Again",
            TriggerLabel::SelectChoiceAndAmount => "Select Choice & Amount",
            TriggerLabel::InvalidAmount => "Invalid Amount",
            TriggerLabel::InsufficientBalance => "Insufficient Balance",
            TriggerLabel::Flipping => "Flipping...",
            TriggerLabel::ConfirmingTransaction => "Confirming Transaction...",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerState {
    pub enabled: bool,
    pub label: TriggerLabel,
}

impl TriggerState {
    fn enabled(label: TriggerLabel) -> Self {
        Self {
            enabled: true,
            label,
        }
    }

    fn disabled(label: TriggerLabel) -> Self {
        Self {
            enabled: false,
            label,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub selected_choice: Option<CoinSide>,
    pub selected_currency: Currency,
    pub bet_amount: Amount,
    pub game_result: Option<CoinSide>,
    pub phase: Phase,
}

impl GameState {
    pub fn is_flipping(&self) -> bool {
        matches!(self.phase, Phase::Flipping(_))
    }

    /// A round is underway or has just settled and not yet been cleared.
    pub fn is_playing(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        match &self.phase {
            Phase::Flipping(in_flight) => Some(in_flight),
            _ => None,
        }
    }

    pub fn last_settlement(&self) -> Option<&Settlement> {
        match &self.phase {
            Phase::Settled(settlement) => Some(settlement),
            _ => None,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            selected_choice: None,
            selected_currency: Currency::default(),
            bet_amount: DEFAULT_BET,
            game_result: None,
            phase: Phase::Idle,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSnapshot {
    pub state: GameState,
    pub balance: Amount,
    pub trigger: TriggerState,
}

/// Coinflip state machine: Idle -> Flipping -> Settled -> Idle.
#[derive(Clone, Debug)]
pub struct CoinflipGame {
    state: GameState,
    ledger: BalanceLedger,
    next_flip: u64,
}

impl CoinflipGame {
    pub fn new(ledger: BalanceLedger) -> Self {
        Self::with_state(ledger, GameState::default())
    }

    pub fn with_state(ledger: BalanceLedger, state: GameState) -> Self {
        Self {
            state,
            ledger,
            next_flip: 1,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    pub fn balance(&self) -> Amount {
        self.ledger.balance(self.state.selected_currency)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            state: self.state.clone(),
            balance: self.balance(),
            trigger: self.trigger_state(),
        }
    }

    pub fn select_choice(&mut self, choice: CoinSide) {
        if self.state.is_flipping() {
            debug!(%choice, "choice ignored while flipping");
            return;
        }
        self.state.selected_choice = Some(choice);
        self.leave_settled();
    }

    pub fn select_currency(&mut self, currency: Currency) {
        self.state.selected_currency = currency;
        self.leave_settled();
    }

    pub fn set_bet_amount(&mut self, amount: Amount) {
        self.state.bet_amount = amount;
        self.leave_settled();
    }

    /// Applies raw form input through [`Amount::parse_prefix`]. Text with
    /// no numeric prefix counts as zero.
    pub fn set_bet_input(&mut self, raw: &str) -> Result<Amount, AmountError> {
        let parsed = Amount::parse_prefix(raw);
        self.set_bet_amount(parsed.clone().unwrap_or_default());
        parsed
    }

    pub fn trigger_state(&self) -> TriggerState {
        if let Phase::Flipping(in_flight) = &self.state.phase {
            let label = match in_flight.stage {
                FlipStage::AwaitingConfirmation => TriggerLabel::ConfirmingTransaction,
                FlipStage::Animating { .. } => TriggerLabel::Flipping,
            };
            return TriggerState::disabled(label);
        }
        let amount = self.state.bet_amount;
        if amount.is_zero() {
            return TriggerState::disabled(TriggerLabel::InvalidAmount);
        }
        if amount > self.balance() {
            return TriggerState::disabled(TriggerLabel::InsufficientBalance);
        }
        if self.state.selected_choice.is_none() {
            return TriggerState::disabled(TriggerLabel::SelectChoiceAndAmount);
        }
        match self.state.phase {
            Phase::Settled(_) => TriggerState::enabled(TriggerLabel::FlipAgain),
            _ => TriggerState::enabled(TriggerLabel::FlipCoin),
        }
    }

    pub fn can_flip(&self) -> bool {
        self.trigger_state().enabled
    }

    /// Starts a locally resolved flip. The outcome is drawn immediately and
    /// revealed by [`CoinflipGame::settle`]. Returns `None` when the trigger
    /// is disabled.
    pub fn start_demo_flip<O>(&mut self, outcomes: &mut O) -> Option<PendingFlip>
    where
        O: OutcomeSource + ?Sized,
    {
        let flip = self.open_flip(FlipMode::Demo)?;
        let outcome = outcomes.draw();
        self.state.phase = Phase::Flipping(InFlight {
            flip: flip.clone(),
            stage: FlipStage::Animating {
                outcome,
                tx_hash: None,
            },
        });
        Some(flip)
    }

    /// Starts a flip whose outcome comes from a wallet transaction.
    pub fn start_chain_flip(&mut self) -> Option<PendingFlip> {
        let flip = self.open_flip(FlipMode::Blockchain)?;
        self.state.phase = Phase::Flipping(InFlight {
            flip: flip.clone(),
            stage: FlipStage::AwaitingConfirmation,
        });
        Some(flip)
    }

    /// Records the confirmed transaction and moves the flip into its
    /// animation stage.
    pub fn confirm_chain_flip(&mut self, id: FlipId, confirmation: ChainConfirmation) -> bool {
        let Phase::Flipping(in_flight) = &mut self.state.phase else {
            return false;
        };
        if in_flight.flip.id != id || in_flight.stage != FlipStage::AwaitingConfirmation {
            return false;
        }
        debug!(flip = %id, tx = %confirmation.tx_hash, "chain flip confirmed");
        in_flight.stage = FlipStage::Animating {
            outcome: confirmation.outcome,
            tx_hash: Some(confirmation.tx_hash),
        };
        true
    }

    /// Reveals the outcome of the in-flight flip and settles the demo ledger.
    pub fn settle(&mut self, id: FlipId) -> Option<Settlement> {
        let Phase::Flipping(in_flight) = &self.state.phase else {
            return None;
        };
        if in_flight.flip.id != id {
            return None;
        }
        let FlipStage::Animating { outcome, tx_hash } = &in_flight.stage else {
            return None;
        };
        let flip = in_flight.flip.clone();
        let outcome = *outcome;
        let tx_hash = tx_hash.clone();
        let won = outcome == flip.choice;
        let balance_after = match flip.mode {
            FlipMode::Demo if won => Some(self.ledger.credit(flip.currency, flip.amount)),
            FlipMode::Demo => Some(self.ledger.debit(flip.currency, flip.amount)),
            FlipMode::Blockchain => None,
        };
        let settlement = Settlement {
            flip,
            outcome,
            won,
            balance_after,
            tx_hash,
        };
        info!(
            flip = %id,
            mode = %settlement.flip.mode,
            choice = %settlement.flip.choice,
            %outcome,
            won,
            amount = %settlement.flip.amount,
            currency = %settlement.flip.currency,
            "flip settled"
        );
        self.state.game_result = Some(outcome);
        self.state.phase = Phase::Settled(settlement.clone());
        Some(settlement)
    }

    /// Drops the in-flight flip after an integration failure.
    pub fn abort_flip(&mut self, id: FlipId) -> bool {
        match &self.state.phase {
            Phase::Flipping(in_flight) if in_flight.flip.id == id => {
                debug!(flip = %id, "flip aborted");
                self.state.phase = Phase::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        if self.state.is_flipping() {
            debug!("reset ignored while flipping");
            return;
        }
        self.state.selected_choice = None;
        self.state.game_result = None;
        self.state.phase = Phase::Idle;
    }

    fn open_flip(&mut self, mode: FlipMode) -> Option<PendingFlip> {
        let trigger = self.trigger_state();
        if !trigger.enabled {
            debug!(label = %trigger.label, "flip trigger disabled");
            return None;
        }
        let choice = self.state.selected_choice?;
        let id = FlipId(self.next_flip);
        self.next_flip += 1;
        self.state.game_result = None;
        Some(PendingFlip {
            id,
            mode,
            choice,
            currency: self.state.selected_currency,
            amount: self.state.bet_amount,
        })
    }

    fn leave_settled(&mut self) {
        if matches!(self.state.phase, Phase::Settled(_)) {
            self.state.phase = Phase::Idle;
        }
    }
}

impl Default for CoinflipGame {
    fn default() -> Self {
        Self::new(BalanceLedger::demo())
    }
}
