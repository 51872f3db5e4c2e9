#![allow(non_snake_case)]

mod blockchain_flip;

use coinflip::{
    CoinSide,
    ScriptedOutcomes,
};
use hopium_coinflip::{
    client::{
        AppConfig,
        AppController,
        FlipJob,
    },
    notifications::Level,
    settings::Settings,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use wallet_bridge::{
    Address,
    ChainId,
    DevWallet,
    Wei,
};

pub type TestController = AppController<DevWallet, ScriptedOutcomes>;

pub fn player() -> Address {
    "0x00000000000000000000000000000000000000aa".parse().unwrap()
}

pub fn dev_wallet() -> DevWallet {
    DevWallet::new(player(), ChainId::SEPOLIA, Wei::from_ether(1)).with_seed(42)
}

pub fn instant_settings() -> Settings {
    Settings {
        animation_delay_ms: 0,
        ..Settings::default()
    }
}

pub fn controller(
    settings: Settings,
    wallet: Option<DevWallet>,
    outcomes: ScriptedOutcomes,
) -> (TestController, Option<Arc<DevWallet>>) {
    let provider = wallet.map(Arc::new);
    let config = AppConfig {
        settings,
        provider: provider.clone(),
    };
    (AppController::new(config, outcomes), provider)
}

pub fn demo_controller(outcome: CoinSide) -> TestController {
    controller(instant_settings(), None, ScriptedOutcomes::always(outcome)).0
}

/// Runs a flip job to completion and feeds every worker event back.
pub async fn drive(controller: &mut TestController, job: FlipJob<DevWallet>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    job.run(tx).await;
    while let Some(event) = rx.recv().await {
        controller.handle_worker_event(event).await;
    }
}

pub fn latest_notification(controller: &TestController) -> Option<(Level, String)> {
    controller
        .notifications()
        .latest()
        .map(|n| (n.level, n.message.clone()))
}

pub fn has_notification(controller: &TestController, level: Level, message: &str) -> bool {
    controller
        .notifications()
        .active()
        .any(|n| n.level == level && n.message == message)
}
