use coinflip::Amount;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    str::FromStr,
};

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;
/// Wei per base unit of an 8-decimal [`Amount`].
const WEI_PER_AMOUNT_UNIT: u128 = 10_000_000_000;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid address {0:?}: expected 0x followed by 40 hex digits")]
    Address(String),
    #[error("invalid chain id {0:?}")]
    ChainId(String),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// `0x1234...7890` form used in wallet badges.
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| ParseError::Address(raw.to_string()))?;
        let bytes = hex::decode(digits).map_err(|_| ParseError::Address(raw.to_string()))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ParseError::Address(raw.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const ETHEREUM: ChainId = ChainId(1);
    pub const BSC: ChainId = ChainId(56);
    pub const POLYGON: ChainId = ChainId(137);
    pub const ARBITRUM: ChainId = ChainId(42161);
    pub const SEPOLIA: ChainId = ChainId(11155111);

    /// Hex form providers report, e.g. `0xaa36a7`.
    pub fn hex(self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = ParseError;

    /// Accepts the provider's hex form (`0x89`) as well as plain decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(digits) => u64::from_str_radix(digits, 16),
            None => raw.parse::<u64>(),
        };
        parsed
            .map(ChainId)
            .map_err(|_| ParseError::ChainId(raw.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wei(pub u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);

    pub fn from_amount(amount: Amount) -> Self {
        Wei(amount.base_units() as u128 * WEI_PER_AMOUNT_UNIT)
    }

    pub fn from_ether(whole: u64) -> Self {
        Wei(whole as u128 * WEI_PER_ETHER)
    }

    pub fn checked_sub(self, other: Wei) -> Option<Wei> {
        self.0.checked_sub(other.0).map(Wei)
    }

    pub fn saturating_add(self, other: Wei) -> Wei {
        Wei(self.0.saturating_add(other.0))
    }

    pub fn saturating_mul(self, factor: u128) -> Wei {
        Wei(self.0.saturating_mul(factor))
    }

    /// Ether value truncated to `places` fractional digits.
    pub fn ether_fixed(self, places: usize) -> String {
        let whole = self.0 / WEI_PER_ETHER;
        if places == 0 {
            return whole.to_string();
        }
        let fraction = format!("{:018}", self.0 % WEI_PER_ETHER);
        format!("{whole}.{}", &fraction[..places.min(18)])
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// First ten characters, as shown in confirmation toasts.
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}...", &full[..10])
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({self})")
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn address__round_trips_and_shortens() {
        let raw = "0x1234567890123456789012345678901234567890";
        let address: Address = raw.parse().unwrap();
        assert_eq!(raw, address.to_string());
        assert_eq!("0x1234...7890", address.short());
    }

    #[test]
    fn address__rejects_wrong_length_or_prefix() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!(
            "1234567890123456789012345678901234567890"
                .parse::<Address>()
                .is_err()
        );
        assert!(
            "0xzz34567890123456789012345678901234567890"
                .parse::<Address>()
                .is_err()
        );
    }

    #[test]
    fn chain_id__parses_hex_and_decimal() {
        assert_eq!(Ok(ChainId::SEPOLIA), "0xaa36a7".parse());
        assert_eq!(Ok(ChainId::POLYGON), "137".parse());
        assert_eq!("0x89", ChainId::POLYGON.hex());
        assert!("0xgg".parse::<ChainId>().is_err());
    }

    #[test]
    fn wei__converts_from_amount() {
        let amount: Amount = "0.001".parse().unwrap();
        assert_eq!(Wei(1_000_000_000_000_000), Wei::from_amount(amount));
        assert_eq!("1.500000", Wei(1_500_000_000_000_000_000).ether_fixed(6));
    }
}
