//! # Command Context
//!
//! Everything a subcommand needs that comes from flags, files or the
//! environment: settings, the ledger client, the evidence store, and (for
//! writes) the signing session.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use stl_core::Role;
use stl_crypto::{FsContentStore, SigningIdentity};
use stl_ledger::{Ed25519Session, HttpLedgerClient, LedgerConfig};
use stl_registry::{Registry, RegistrySettings};
use url::Url;

/// Evidence directory used when neither the settings file nor
/// `STL_CONTENT_ROOT` names one.
pub const DEFAULT_CONTENT_ROOT: &str = ".stl/evidence";

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Settings file (YAML).
    #[arg(long, global = true, env = "STL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Key file holding a hex Ed25519 seed. Required for writes.
    #[arg(long, global = true, env = "STL_KEY_FILE")]
    pub key: Option<PathBuf>,

    /// Role claimed by this session.
    #[arg(long, global = true, env = "STL_ROLE", default_value = "reporter")]
    pub role: Role,

    /// Ledger gateway URL; overrides STL_LEDGER_URL.
    #[arg(long, global = true)]
    pub ledger_url: Option<Url>,
}

pub struct Context {
    pub settings: RegistrySettings,
    pub registry: Registry<HttpLedgerClient>,
}

impl Context {
    pub fn open(opts: &GlobalOpts) -> Result<Self> {
        let settings = RegistrySettings::load(opts.config.as_deref())
            .context("failed to load registry settings")?;

        let mut ledger_config = LedgerConfig::from_env().context("invalid ledger configuration")?;
        if let Some(url) = &opts.ledger_url {
            ledger_config.base_url = url.clone();
        }
        tracing::debug!(?ledger_config, "ledger configuration");
        let ledger = HttpLedgerClient::new(ledger_config).context("failed to build ledger client")?;

        let root = settings
            .content_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_ROOT));
        let content = FsContentStore::new(root);

        let registry = Registry::from_settings(Arc::new(ledger), Arc::new(content), &settings);
        Ok(Self { settings, registry })
    }
}

/// Load the signing session named by `--key` with the `--role` claim.
pub fn session(opts: &GlobalOpts) -> Result<Ed25519Session> {
    let path = opts
        .key
        .as_deref()
        .context("this command signs a transaction; pass --key or set STL_KEY_FILE")?;
    let identity = load_identity(path)?;
    Ok(Ed25519Session::new(identity, opts.role))
}

pub fn load_identity(path: &Path) -> Result<SigningIdentity> {
    let text = zeroize::Zeroizing::new(
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read key file {}", path.display()))?,
    );
    SigningIdentity::from_seed_hex(text.trim())
        .with_context(|| format!("invalid key file {}", path.display()))
}
