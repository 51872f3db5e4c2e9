use coinflip::Amount;
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};
use wallet_bridge::{
    Address,
    ChainId,
    DevWallet,
    Wei,
};

#[derive(Clone, Debug)]
pub struct WalletDescriptor {
    pub name: String,
    pub path: PathBuf,
}

impl WalletDescriptor {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }
}

/// Contents of a `<name>.wallet` file describing a simulated wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletProfile {
    pub accounts: Vec<Address>,
    #[serde(default = "default_chain")]
    pub chain_id: ChainId,
    /// Ether held by every listed account.
    pub balance: Amount,
    #[serde(default)]
    pub pre_authorized: bool,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_chain() -> ChainId {
    ChainId::SEPOLIA
}

impl WalletProfile {
    /// Profile used when no `--wallet` is given.
    pub fn builtin() -> Self {
        Self {
            accounts: vec![Address::new([
                0x5a, 0x11, 0xe7, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0xc0, 0x1f, 0x11,
            ])],
            chain_id: default_chain(),
            balance: Amount::from_whole(1),
            pre_authorized: false,
            latency_ms: 1_500,
            seed: None,
        }
    }

    pub fn into_dev_wallet(self, chain_override: Option<ChainId>) -> Result<DevWallet> {
        let mut accounts = self.accounts.into_iter();
        let primary = accounts
            .next()
            .ok_or_else(|| eyre!("Wallet profile lists no accounts"))?;
        let balance = Wei::from_amount(self.balance);
        let chain_id = chain_override.unwrap_or(self.chain_id);
        let mut wallet = accounts.fold(
            DevWallet::new(primary, chain_id, balance),
            |wallet, account| wallet.with_account(account, balance),
        );
        if self.pre_authorized {
            wallet = wallet.pre_authorized();
        }
        if let Some(seed) = self.seed {
            wallet = wallet.with_seed(seed);
        }
        Ok(wallet.with_latency(Duration::from_millis(self.latency_ms)))
    }
}

pub fn default_wallet_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").wrap_err("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".hopium").join("wallets"))
}

pub fn resolve_wallet_dir(dir: Option<&str>) -> Result<PathBuf> {
    match dir {
        Some(raw) => {
            let expanded = shellexpand::tilde(raw);
            Ok(PathBuf::from(expanded.into_owned()))
        }
        None => default_wallet_dir(),
    }
}

pub fn list_wallets(dir: &Path) -> Result<Vec<WalletDescriptor>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut wallets = Vec::new();
    for entry in fs::read_dir(dir).wrap_err("Failed to read wallet directory")? {
        let entry = entry.wrap_err("Failed to read wallet entry")?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("wallet") {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| eyre!("Invalid wallet filename {:?}", path))?
            .to_owned();
        wallets.push(WalletDescriptor::new(name, path));
    }
    wallets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(wallets)
}

pub fn find_wallet(dir: &Path, name: &str) -> Result<WalletDescriptor> {
    let wallets = list_wallets(dir)?;
    wallets
        .into_iter()
        .find(|w| w.name == name)
        .ok_or_else(|| eyre!("Wallet '{name}' not found in {}", dir.to_string_lossy()))
}

pub fn load_profile(descriptor: &WalletDescriptor) -> Result<WalletProfile> {
    let data = fs::read_to_string(&descriptor.path)
        .wrap_err_with(|| format!("Failed to read wallet '{}'", descriptor.name))?;
    serde_json::from_str(&data)
        .wrap_err_with(|| format!("Wallet '{}' is not a valid profile", descriptor.name))
}
