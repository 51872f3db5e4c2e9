use clap::Parser;
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use hopium_coinflip::{
    client,
    settings::{
        self,
        Settings,
    },
    wallets,
};
use std::sync::Arc;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::{
    EnvFilter,
    fmt,
};
use wallet_bridge::{
    ChainId,
    DevWallet,
};

#[derive(Parser, Debug)]
#[command(name = "hopium-coinflip", about = "Terminal coinflip with demo and wallet modes")]
struct Cli {
    /// JSON settings file
    #[arg(long)]
    config: Option<String>,
    /// Dev wallet profile to load (`<name>.wallet`)
    #[arg(long)]
    wallet: Option<String>,
    /// Directory holding wallet profiles (defaults to ~/.hopium/wallets)
    #[arg(long)]
    wallet_dir: Option<String>,
    /// Run as if no wallet provider were installed
    #[arg(long, conflicts_with_all = ["wallet", "wallet_dir"])]
    no_wallet: bool,
    /// Chain the wallet starts on, decimal or 0x-hex
    #[arg(long)]
    chain: Option<ChainId>,
    /// Directory for the rolling log file
    #[arg(long, default_value = "~/.hopium/logs")]
    log_dir: String,
}

fn init_tracing(log_dir: &str) -> Result<WorkerGuard> {
    let dir = settings::expand_path(log_dir);
    std::fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("Failed to create log directory {}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(dir, "hopium-coinflip.log"));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!(e))?;
    Ok(guard)
}

fn build_provider(cli: &Cli) -> Result<Option<Arc<DevWallet>>> {
    if cli.no_wallet {
        return Ok(None);
    }
    let profile = match &cli.wallet {
        Some(name) => {
            let dir = wallets::resolve_wallet_dir(cli.wallet_dir.as_deref())?;
            let descriptor = wallets::find_wallet(&dir, name)?;
            wallets::load_profile(&descriptor)?
        }
        None => wallets::WalletProfile::builtin(),
    };
    Ok(Some(Arc::new(profile.into_dev_wallet(cli.chain)?)))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _guard = init_tracing(&cli.log_dir)?;
    tracing::info!("starting hopium-coinflip client");
    let settings = Settings::resolve(cli.config.as_deref())?;
    let provider = build_provider(&cli)?;
    client::run_app(client::AppConfig { settings, provider }).await
}
