//! # Keys Subcommand
//!
//! Ed25519 key files: a single line holding the hex seed. The principal the
//! ledger attributes calls to is derived from the public key.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use stl_crypto::SigningIdentity;
use stl_ledger::principal_for;
use zeroize::Zeroizing;

use crate::context::load_identity;

#[derive(Args, Debug)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub command: KeysCommand,
}

#[derive(Subcommand, Debug)]
pub enum KeysCommand {
    /// Generate a new key file.
    Generate {
        /// Where to write the seed. Refuses to overwrite.
        #[arg(long)]
        out: PathBuf,
    },

    /// Print the principal and public key of a key file.
    Show {
        /// Key file to read.
        key: PathBuf,
    },
}

pub fn run_keys(args: &KeysArgs) -> Result<u8> {
    match &args.command {
        KeysCommand::Generate { out } => {
            let identity = SigningIdentity::generate();
            write_key_file(out, &identity)?;
            tracing::info!(path = %out.display(), "key file written");
            print_identity(&identity);
            Ok(0)
        }
        KeysCommand::Show { key } => {
            print_identity(&load_identity(key)?);
            Ok(0)
        }
    }
}

fn print_identity(identity: &SigningIdentity) {
    let public_key = identity.public_key();
    println!("principal:  {}", principal_for(&public_key));
    println!("public key: {}", public_key.to_hex());
}

/// Create `path` exclusively, owner-readable only on unix.
pub fn write_key_file(path: &Path, identity: &SigningIdentity) -> Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("failed to create key file {}", path.display()))?;
    let seed = Zeroizing::new(identity.export_seed_hex());
    writeln!(file, "{}", seed.as_str())
        .with_context(|| format!("failed to write key file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.key");
        let identity = SigningIdentity::generate();
        write_key_file(&path, &identity).unwrap();

        let loaded = load_identity(&path).unwrap();
        assert_eq!(loaded.public_key(), identity.public_key());
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.key");
        write_key_file(&path, &SigningIdentity::generate()).unwrap();
        assert!(write_key_file(&path, &SigningIdentity::generate()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.key");
        write_key_file(&path, &SigningIdentity::generate()).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
