use crate::amount::Amount;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    str::FromStr,
};

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Btc,
    Usdt,
    Usdc,
    Eth,
    Sol,
    Xrp,
    Trx,
    Ltc,
    Doge,
    Cash,
}

impl Currency {
    pub const ALL: [Currency; 10] = [
        Currency::Btc,
        Currency::Usdt,
        Currency::Usdc,
        Currency::Eth,
        Currency::Sol,
        Currency::Xrp,
        Currency::Trx,
        Currency::Ltc,
        Currency::Doge,
        Currency::Cash,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Btc => "BTC",
            Currency::Usdt => "USDT",
            Currency::Usdc => "USDC",
            Currency::Eth => "ETH",
            Currency::Sol => "SOL",
            Currency::Xrp => "XRP",
            Currency::Trx => "TRX",
            Currency::Ltc => "LTC",
            Currency::Doge => "DOGE",
            Currency::Cash => "CASH",
        }
    }

    /// Starting balance handed out in demo mode.
    pub fn demo_seed(self) -> Amount {
        match self {
            Currency::Btc => Amount::from_whole(1),
            Currency::Usdt | Currency::Usdc | Currency::Cash => Amount::from_whole(10_000),
            Currency::Eth => Amount::from_whole(10),
            Currency::Sol => Amount::from_whole(500),
            Currency::Xrp => Amount::from_whole(50_000),
            Currency::Trx | Currency::Doge => Amount::from_whole(100_000),
            Currency::Ltc => Amount::from_whole(50),
        }
    }

    pub fn next(self) -> Currency {
        let idx = Self::position(self);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Currency {
        let idx = Self::position(self);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn position(currency: Currency) -> usize {
        Self::ALL
            .iter()
            .position(|c| *c == currency)
            .unwrap_or_default()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown currency symbol: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.symbol().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCurrency(wanted.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn next__wraps_around_the_selector() {
        assert_eq!(Currency::Usdt, Currency::Btc.next());
        assert_eq!(Currency::Btc, Currency::Cash.next());
        assert_eq!(Currency::Cash, Currency::Btc.prev());
    }

    #[test]
    fn from_str__is_case_insensitive() {
        assert_eq!(Ok(Currency::Doge), "doge".parse());
        assert_eq!(Ok(Currency::Eth), " ETH ".parse());
        assert!("BNB".parse::<Currency>().is_err());
    }
}
