pub mod amount;
pub mod currency;
pub mod game;
pub mod ledger;
pub mod outcome;
pub mod side;

pub use crate::amount::{
    Amount,
    AmountError,
    DECIMALS,
};
pub use crate::currency::{
    Currency,
    UnknownCurrency,
};
pub use crate::game::{
    ChainConfirmation,
    CoinflipGame,
    DEFAULT_ANIMATION_DELAY,
    DEFAULT_BET,
    FlipId,
    FlipMode,
    FlipStage,
    GameSnapshot,
    GameState,
    InFlight,
    PendingFlip,
    Phase,
    Settlement,
    TriggerLabel,
    TriggerState,
};
pub use crate::ledger::BalanceLedger;
#[cfg(any(test, feature = "test-helpers"))]
pub use crate::outcome::ScriptedOutcomes;
pub use crate::outcome::{
    OutcomeSource,
    RandomOutcome,
};
pub use crate::side::CoinSide;
