use super::*;
use coinflip::{
    Currency,
    FlipMode,
    Phase,
};
use hopium_coinflip::client::FlipJob;

async fn connected_blockchain_controller() -> (TestController, Arc<DevWallet>) {
    let (mut controller, wallet) = controller(
        instant_settings(),
        Some(dev_wallet()),
        ScriptedOutcomes::always(CoinSide::Heads),
    );
    controller.connect_wallet().await;
    controller.toggle_mode();
    controller.select_choice(CoinSide::Heads);
    (controller, wallet.unwrap())
}

#[tokio::test]
async fn request_flip__blockchain_requires_connected_wallet() {
    // given
    let (mut controller, _) = controller(
        instant_settings(),
        Some(dev_wallet()),
        ScriptedOutcomes::always(CoinSide::Heads),
    );
    controller.toggle_mode();
    controller.select_choice(CoinSide::Heads);

    // when
    let job = controller.request_flip();

    // then
    assert!(job.is_none());
    assert_eq!(Phase::Idle, controller.game().state().phase);
    assert_eq!(
        Some((Level::Error, "Please connect your wallet first".to_string())),
        latest_notification(&controller)
    );
}

#[tokio::test]
async fn request_flip__blockchain_without_provider_asks_to_connect_first() {
    let mut controller = demo_controller(CoinSide::Heads);
    controller.toggle_mode();
    controller.select_choice(CoinSide::Heads);

    assert!(controller.request_flip().is_none());
    assert_eq!(Phase::Idle, controller.game().state().phase);
    assert_eq!(
        Some((Level::Error, "Please connect your wallet first".to_string())),
        latest_notification(&controller)
    );
}

#[tokio::test]
async fn request_flip__blockchain_settles_from_wallet_receipt() {
    // given
    let (mut controller, wallet) = connected_blockchain_controller().await;
    let before = wallet.balance_of(player());

    // when
    let job = controller.request_flip().unwrap();
    assert!(matches!(job, FlipJob::Submit { .. }));
    assert_eq!(
        "Confirming Transaction...",
        controller.game().trigger_state().label.to_string()
    );
    assert!(has_notification(
        &controller,
        Level::Info,
        "Please confirm the transaction in your wallet"
    ));
    drive(&mut controller, job).await;

    // then
    let snapshot = controller.snapshot();
    let entry = &snapshot.history[0];
    assert_eq!(FlipMode::Blockchain, entry.mode);
    let hash = entry.tx_hash.clone().unwrap();
    let confirmed = format!("Transaction confirmed! Hash: {}...", &hash[..10]);
    assert!(has_notification(&controller, Level::Success, &confirmed));
    assert_eq!(
        Currency::Btc.demo_seed(),
        controller.game().ledger().balance(Currency::Btc)
    );
    let stake = Wei::from_amount(entry.amount);
    let expected = if entry.won {
        before.saturating_add(stake)
    } else {
        before.checked_sub(stake).unwrap()
    };
    assert_eq!(Some(expected), snapshot.wallet.balance);
    assert!(snapshot.status.contains("ETH"));
}

#[tokio::test]
async fn request_flip__rejected_transaction_returns_to_idle() {
    // given
    let (mut controller, wallet) = connected_blockchain_controller().await;
    wallet.reject_next_transaction();

    // when
    let job = controller.request_flip().unwrap();
    drive(&mut controller, job).await;

    // then
    assert_eq!(Phase::Idle, controller.game().state().phase);
    assert_eq!(0, controller.history().count());
    assert_eq!(
        Some((
            Level::Error,
            "Transaction failed: User rejected the request.".to_string()
        )),
        latest_notification(&controller)
    );
    assert!(controller.game().can_flip());
}

#[tokio::test]
async fn request_flip__missing_flip_event_is_a_failure() {
    // given
    let (mut controller, wallet) = connected_blockchain_controller().await;
    wallet.omit_next_event();

    // when
    let job = controller.request_flip().unwrap();
    drive(&mut controller, job).await;

    // then
    assert_eq!(Phase::Idle, controller.game().state().phase);
    let (level, message) = latest_notification(&controller).unwrap();
    assert_eq!(Level::Error, level);
    assert!(message.starts_with("Transaction failed: transaction 0x"));
    assert!(message.ends_with("emitted no CoinFlipped event"));
}

#[tokio::test]
async fn request_flip__stake_above_wallet_funds_fails() {
    // given
    let (mut controller, _wallet) = connected_blockchain_controller().await;
    controller.next_currency();
    controller.set_bet_input("5");

    // when
    let job = controller.request_flip().unwrap();
    drive(&mut controller, job).await;

    // then
    let (level, message) = latest_notification(&controller).unwrap();
    assert_eq!(Level::Error, level);
    assert!(message.starts_with("Transaction failed: insufficient funds"));
    assert_eq!(Phase::Idle, controller.game().state().phase);
}
