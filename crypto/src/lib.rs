//! Cryptographic primitives for the strand ledger.
//!
//! - **Ed25519** for block and vote signing.
//! - **Blake2b-256** for block hashing.
//! - Account display encoding with the `strd_` prefix.

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{decode_address, encode_address, AddressError};
pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::{generate_keypair, keypair_from_seed};
pub use sign::{sign_message, verify_signature};
