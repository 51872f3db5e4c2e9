pub mod client;
pub mod notifications;
pub mod settings;
pub mod ui;
pub mod wallets;
