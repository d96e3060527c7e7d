//! Account display encoding with the `strd_` prefix.
//!
//! CLI and logs render accounts as `strd_` followed by the hex key. The
//! ledger itself only ever handles the raw 32-byte form.

use thiserror::Error;

use strand_types::Account;

/// The standard prefix for rendered strand accounts.
pub const ADDRESS_PREFIX: &str = "strd_";

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("address must start with {ADDRESS_PREFIX}")]
    MissingPrefix,

    #[error("address body must be 64 hex characters")]
    BadLength,

    #[error("address body is not valid hex: {0}")]
    BadHex(#[from] hex::FromHexError),
}

/// Render an account as a display address.
pub fn encode_address(account: &Account) -> String {
    format!("{}{}", ADDRESS_PREFIX, hex::encode(account.as_bytes()))
}

/// Parse a display address back into an account.
pub fn decode_address(address: &str) -> Result<Account, AddressError> {
    let body = address
        .strip_prefix(ADDRESS_PREFIX)
        .ok_or(AddressError::MissingPrefix)?;
    if body.len() != 64 {
        return Err(AddressError::BadLength);
    }
    let bytes = hex::decode(body)?;
    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    Ok(Account::new(key))
}
