use coinflip::{
    Amount,
    BalanceLedger,
    Currency,
    DEFAULT_ANIMATION_DELAY,
    DEFAULT_BET,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::BTreeMap,
    fs,
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

pub const DEFAULT_NOTIFICATION_MS: u64 = 3_000;
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub animation_delay_ms: u64,
    pub default_currency: Currency,
    pub default_bet: Amount,
    pub notification_ms: u64,
    pub history_depth: usize,
    /// Replaces the demo seed for the listed currencies.
    pub starting_balances: BTreeMap<Currency, Amount>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            animation_delay_ms: DEFAULT_ANIMATION_DELAY.as_millis() as u64,
            default_currency: Currency::default(),
            default_bet: DEFAULT_BET,
            notification_ms: DEFAULT_NOTIFICATION_MS,
            history_depth: DEFAULT_HISTORY_DEPTH,
            starting_balances: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read settings file {}", path.display()))?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&data)
            .wrap_err_with(|| format!("Failed to parse settings file {}", path.display()))
    }

    /// Loads `path` after tilde expansion, or the defaults when no file is given.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        match path {
            Some(raw) => Self::load(expand_path(raw)),
            None => Ok(Self::default()),
        }
    }

    pub fn animation_delay(&self) -> Duration {
        Duration::from_millis(self.animation_delay_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn ledger(&self) -> BalanceLedger {
        self.starting_balances
            .iter()
            .fold(BalanceLedger::demo(), |ledger, (currency, amount)| {
                ledger.with_balance(*currency, *amount)
            })
    }
}

pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
