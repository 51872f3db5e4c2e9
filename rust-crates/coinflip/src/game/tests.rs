#![allow(non_snake_case)]

use super::*;
use crate::outcome::ScriptedOutcomes;
use proptest::prelude::*;

fn amount(raw: &str) -> Amount {
    raw.parse().unwrap()
}

fn game_with_btc(balance: &str) -> CoinflipGame {
    CoinflipGame::new(BalanceLedger::empty().with_balance(Currency::Btc, amount(balance)))
}

#[test]
fn trigger_state__enabled_once_choice_and_amount_are_valid() {
    // given
    let mut game = CoinflipGame::default();
    assert_eq!(
        TriggerLabel::SelectChoiceAndAmount,
        game.trigger_state().label
    );

    // when
    game.select_choice(CoinSide::Heads);

    // then
    let expected = TriggerState {
        enabled: true,
        label: TriggerLabel::FlipCoin,
    };
    assert_eq!(expected, game.trigger_state());
}

#[test]
fn trigger_state__reports_insufficient_balance() {
    // given
    let mut game = game_with_btc("0.0005");
    game.select_choice(CoinSide::Heads);

    // when
    game.set_bet_amount(amount("0.001"));

    // then
    let actual = game.trigger_state();
    assert!(!actual.enabled);
    assert_eq!("Insufficient Balance", actual.label.to_string());
}

#[test]
fn trigger_state__reports_invalid_amount_for_zero_or_garbage() {
    // given
    let mut game = CoinflipGame::default();
    game.select_choice(CoinSide::Tails);

    // when
    let parsed = game.set_bet_input("abc");

    // then
    assert!(parsed.is_err());
    assert_eq!(Amount::ZERO, game.state().bet_amount);
    assert_eq!(
        TriggerState {
            enabled: false,
            label: TriggerLabel::InvalidAmount,
        },
        game.trigger_state()
    );
}

#[test]
fn set_bet_input__keeps_the_numeric_prefix_of_trailing_junk() {
    // given
    let mut game = game_with_btc("1.0");
    game.select_choice(CoinSide::Heads);

    // when
    let doubled_dot = game.set_bet_input("0.001.5");
    let doubled_dot_label = game.trigger_state().label;
    let suffixed = game.set_bet_input("0.5abc");

    // then
    assert_eq!(Ok(amount("0.001")), doubled_dot);
    assert_eq!(TriggerLabel::FlipCoin, doubled_dot_label);
    assert_eq!(Ok(amount("0.5")), suffixed);
    assert_eq!(amount("0.5"), game.state().bet_amount);
    assert!(game.can_flip());
}

#[test]
fn settle__win_credits_the_bet() {
    // given
    let mut game = game_with_btc("1.0");
    game.select_choice(CoinSide::Heads);
    game.set_bet_amount(amount("0.001"));
    let mut outcomes = ScriptedOutcomes::always(CoinSide::Heads);

    // when
    let flip = game.start_demo_flip(&mut outcomes).unwrap();
    let settlement = game.settle(flip.id).unwrap();

    // then
    assert!(settlement.won);
    assert_eq!(Some(amount("1.001")), settlement.balance_after);
    assert_eq!(amount("1.001"), game.balance());
    assert_eq!(Some(CoinSide::Heads), game.state().game_result);
    assert_eq!(TriggerLabel::FlipAgain, game.trigger_state().label);
}

#[test]
fn settle__loss_debits_clamped_at_zero() {
    // given
    let mut game = game_with_btc("0.001");
    game.select_choice(CoinSide::Heads);
    game.set_bet_amount(amount("0.001"));
    let mut outcomes = ScriptedOutcomes::always(CoinSide::Tails);

    // when
    let flip = game.start_demo_flip(&mut outcomes).unwrap();
    let settlement = game.settle(flip.id).unwrap();

    // then
    assert!(!settlement.won);
    assert_eq!(Amount::ZERO, game.balance());
    assert_eq!(TriggerLabel::InsufficientBalance, game.trigger_state().label);
}

#[test]
fn start_demo_flip__is_a_no_op_while_flipping() {
    // given
    let mut game = CoinflipGame::default();
    game.select_choice(CoinSide::Heads);
    let mut outcomes = ScriptedOutcomes::always(CoinSide::Heads);
    let first = game.start_demo_flip(&mut outcomes).unwrap();
    let before = game.snapshot();

    // when
    let second = game.start_demo_flip(&mut outcomes);
    let chain = game.start_chain_flip();

    // then
    assert_eq!(None, second);
    assert_eq!(None, chain);
    assert_eq!(1, outcomes.drawn());
    assert_eq!(before, game.snapshot());
    assert_eq!(TriggerLabel::Flipping, game.trigger_state().label);
    assert!(game.settle(first.id).is_some());
}

#[test]
fn pending_flip__settles_with_parameters_frozen_at_start() {
    // given
    let mut game = CoinflipGame::default();
    game.select_choice(CoinSide::Heads);
    game.set_bet_amount(amount("0.5"));
    let mut outcomes = ScriptedOutcomes::always(CoinSide::Heads);
    let flip = game.start_demo_flip(&mut outcomes).unwrap();

    // when
    game.select_choice(CoinSide::Tails);
    game.select_currency(Currency::Eth);
    game.set_bet_amount(amount("3"));
    let settlement = game.settle(flip.id).unwrap();

    // then
    assert!(settlement.won);
    assert_eq!(CoinSide::Heads, settlement.flip.choice);
    assert_eq!(amount("1.5"), game.ledger().balance(Currency::Btc));
    assert_eq!(amount("10"), game.ledger().balance(Currency::Eth));
}

#[test]
fn settle__ignores_unknown_flip_ids() {
    // given
    let mut game = CoinflipGame::default();
    game.select_choice(CoinSide::Heads);
    let mut outcomes = ScriptedOutcomes::always(CoinSide::Heads);
    let flip = game.start_demo_flip(&mut outcomes).unwrap();

    // when
    let stale = game.settle(FlipId(flip.id.0 + 1));

    // then
    assert_eq!(None, stale);
    assert!(game.state().is_flipping());
}

#[test]
fn chain_flip__waits_for_confirmation_before_settling() {
    // given
    let mut game = CoinflipGame::default();
    game.select_choice(CoinSide::Tails);
    let flip = game.start_chain_flip().unwrap();
    assert_eq!(
        TriggerLabel::ConfirmingTransaction,
        game.trigger_state().label
    );
    assert_eq!(None, game.settle(flip.id));

    // when
    let confirmed = game.confirm_chain_flip(
        flip.id,
        ChainConfirmation {
            outcome: CoinSide::Tails,
            tx_hash: "0xabc".to_string(),
        },
    );
    let settlement = game.settle(flip.id).unwrap();

    // then
    assert!(confirmed);
    assert!(settlement.won);
    assert_eq!(None, settlement.balance_after);
    assert_eq!(Some("0xabc".to_string()), settlement.tx_hash);
    assert_eq!(Currency::Btc.demo_seed(), game.balance());
}

#[test]
fn abort_flip__returns_to_idle() {
    // given
    let mut game = CoinflipGame::default();
    game.select_choice(CoinSide::Heads);
    let flip = game.start_chain_flip().unwrap();

    // when
    let aborted = game.abort_flip(flip.id);

    // then
    assert!(aborted);
    assert_eq!(Phase::Idle, game.state().phase);
    assert_eq!(TriggerLabel::FlipCoin, game.trigger_state().label);
}

#[test]
fn reset__clears_choice_and_result_but_not_while_flipping() {
    // given
    let mut game = CoinflipGame::default();
    game.select_choice(CoinSide::Heads);
    let mut outcomes = ScriptedOutcomes::always(CoinSide::Tails);
    let flip = game.start_demo_flip(&mut outcomes).unwrap();

    // when
    game.reset();
    let still_flipping = game.state().is_flipping();
    game.settle(flip.id);
    game.reset();

    // then
    assert!(still_flipping);
    assert_eq!(None, game.state().selected_choice);
    assert_eq!(None, game.state().game_result);
    assert_eq!(Phase::Idle, game.state().phase);
}

#[test]
fn select_choice__moves_settled_back_to_idle() {
    // given
    let mut game = CoinflipGame::default();
    game.select_choice(CoinSide::Heads);
    let mut outcomes = ScriptedOutcomes::always(CoinSide::Heads);
    let flip = game.start_demo_flip(&mut outcomes).unwrap();
    game.settle(flip.id);
    assert!(game.state().is_playing());

    // when
    game.select_choice(CoinSide::Tails);

    // then
    assert!(!game.state().is_playing());
    assert_eq!(TriggerLabel::FlipCoin, game.trigger_state().label);
}

proptest! {
    #[test]
    fn trigger_state__enabled_iff_amount_within_balance(
        balance in 0u64..=10_000_000_000,
        bet in 0u64..=20_000_000_000,
    ) {
        let mut game = CoinflipGame::new(
            BalanceLedger::empty().with_balance(Currency::Btc, Amount::from_base_units(balance)),
        );
        game.select_choice(CoinSide::Heads);
        game.set_bet_amount(Amount::from_base_units(bet));
        let expected = bet > 0 && bet <= balance;
        prop_assert_eq!(expected, game.can_flip());
    }

    #[test]
    fn settle__balance_follows_symmetric_payout(
        balance in 0u64..=10_000_000_000,
        bet in 1u64..=10_000_000_000,
        heads in any::<bool>(),
    ) {
        prop_assume!(bet <= balance);
        let mut game = CoinflipGame::new(
            BalanceLedger::empty().with_balance(Currency::Btc, Amount::from_base_units(balance)),
        );
        game.select_choice(CoinSide::Heads);
        game.set_bet_amount(Amount::from_base_units(bet));
        let mut outcomes = ScriptedOutcomes::always(CoinSide::from_bool(heads));
        let flip = game.start_demo_flip(&mut outcomes).unwrap();
        let settlement = game.settle(flip.id).unwrap();
        let expected = if heads { balance + bet } else { balance.saturating_sub(bet) };
        prop_assert_eq!(Amount::from_base_units(expected), game.balance());
        prop_assert_eq!(heads, settlement.won);
    }
}
