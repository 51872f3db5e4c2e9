use crate::{
    amount::Amount,
    currency::Currency,
};
use std::collections::BTreeMap;

/// In-memory demo balances, one per currency. Balances never go below zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceLedger {
    balances: BTreeMap<Currency, Amount>,
}

impl BalanceLedger {
    pub fn empty() -> Self {
        Self {
            balances: BTreeMap::new(),
        }
    }

    pub fn demo() -> Self {
        Self {
            balances: Currency::ALL
                .into_iter()
                .map(|c| (c, c.demo_seed()))
                .collect(),
        }
    }

    pub fn with_balance(mut self, currency: Currency, amount: Amount) -> Self {
        self.balances.insert(currency, amount);
        self
    }

    pub fn balance(&self, currency: Currency) -> Amount {
        self.balances.get(&currency).copied().unwrap_or_default()
    }

    pub fn set(&mut self, currency: Currency, amount: Amount) {
        self.balances.insert(currency, amount);
    }

    pub fn credit(&mut self, currency: Currency, amount: Amount) -> Amount {
        let entry = self.balances.entry(currency).or_default();
        *entry = entry.saturating_add(amount);
        *entry
    }

    /// Debits `amount`, clamping the balance at zero.
    pub fn debit(&mut self, currency: Currency, amount: Amount) -> Amount {
        let entry = self.balances.entry(currency).or_default();
        *entry = entry.saturating_sub(amount);
        *entry
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, Amount)> + '_ {
        self.balances.iter().map(|(c, a)| (*c, *a))
    }
}

impl Default for BalanceLedger {
    fn default() -> Self {
        Self::demo()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn demo__seeds_every_currency() {
        let ledger = BalanceLedger::demo();
        assert_eq!(Amount::from_whole(1), ledger.balance(Currency::Btc));
        assert_eq!(Amount::from_whole(100_000), ledger.balance(Currency::Doge));
        assert_eq!(Currency::ALL.len(), ledger.iter().count());
    }

    #[test]
    fn debit__clamps_at_zero() {
        // given
        let half: Amount = "0.0005".parse().unwrap();
        let mut ledger = BalanceLedger::empty().with_balance(Currency::Btc, half);

        // when
        let after = ledger.debit(Currency::Btc, "0.001".parse().unwrap());

        // then
        assert_eq!(Amount::ZERO, after);
        assert_eq!(Amount::ZERO, ledger.balance(Currency::Btc));
    }

    #[test]
    fn balance__is_zero_for_unseeded_currency() {
        let ledger = BalanceLedger::empty();
        assert_eq!(Amount::ZERO, ledger.balance(Currency::Sol));
    }
}
