//! Minimal file-backed wallet for the CLI.
//!
//! A JSON file in the data directory holding hex-encoded Ed25519 private
//! keys. Key custody beyond the CLI surface is out of scope for the node;
//! anything more than local testing should keep keys elsewhere.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use strand_crypto::{encode_address, keypair_from_seed};
use strand_types::Account;

const WALLET_FILE: &str = "wallet.json";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WalletFile {
    pub version: u32,
    /// Hex-encoded 32-byte private keys.
    pub keys: Vec<String>,
}

pub fn wallet_path(data_dir: &Path) -> PathBuf {
    data_dir.join(WALLET_FILE)
}

pub fn load(data_dir: &Path) -> anyhow::Result<WalletFile> {
    let path = wallet_path(data_dir);
    if !path.exists() {
        return Ok(WalletFile {
            version: 1,
            keys: Vec::new(),
        });
    }
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn save(data_dir: &Path, wallet: &WalletFile) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let path = wallet_path(data_dir);
    let text = serde_json::to_string_pretty(wallet)?;
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Add a private key (hex) to the wallet; returns the derived address.
pub fn add_key(data_dir: &Path, private_key_hex: &str) -> anyhow::Result<String> {
    let bytes = hex::decode(private_key_hex).context("private key is not valid hex")?;
    let seed: [u8; 32] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("private key must be exactly 32 bytes"))?;
    let keys = keypair_from_seed(&seed);
    let address = encode_address(&Account::from(keys.public));

    let mut wallet = load(data_dir)?;
    if wallet.keys.iter().any(|k| k == private_key_hex) {
        bail!("key already present in wallet");
    }
    wallet.keys.push(private_key_hex.to_string());
    save(data_dir, &wallet)?;
    Ok(address)
}

/// Delete the wallet file. Returns whether anything was removed.
pub fn destroy(data_dir: &Path) -> anyhow::Result<bool> {
    let path = wallet_path(data_dir);
    if path.exists() {
        std::fs::remove_file(&path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}
