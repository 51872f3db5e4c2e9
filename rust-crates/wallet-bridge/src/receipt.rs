use crate::{
    BridgeError,
    provider::{
        ContractEvent,
        FlipTransaction,
        TransactionReceipt,
    },
    types::{
        TxHash,
        Wei,
    },
};
use coinflip::CoinSide;

/// Validated result of an on-chain flip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlipReceipt {
    pub outcome: CoinSide,
    pub won: bool,
    pub amount: Wei,
    pub tx_hash: TxHash,
}

/// Extracts the `CoinFlipped` event that belongs to `tx` and checks it
/// against the request.
pub fn parse_flip_receipt(
    tx: &FlipTransaction,
    receipt: TransactionReceipt,
) -> Result<FlipReceipt, BridgeError> {
    let tx_hash = receipt.tx_hash;
    if !receipt.status {
        return Err(BridgeError::Reverted { tx_hash });
    }
    let (player, choice, result, amount, won) = receipt
        .logs
        .into_iter()
        .find_map(|log| match log {
            ContractEvent::CoinFlipped {
                player,
                choice,
                result,
                amount,
                won,
            } => Some((player, choice, result, amount, won)),
            ContractEvent::Other { .. } => None,
        })
        .ok_or(BridgeError::MissingFlipEvent { tx_hash })?;

    let malformed = |reason: &'static str| BridgeError::MalformedResult { tx_hash, reason };
    if player != tx.from {
        return Err(malformed("event player does not match sender"));
    }
    if choice != tx.choice {
        return Err(malformed("event choice does not match request"));
    }
    if won != (choice == result) {
        return Err(malformed("win flag contradicts outcome"));
    }
    Ok(FlipReceipt {
        outcome: CoinSide::from_bool(result),
        won,
        amount,
        tx_hash,
    })
}
