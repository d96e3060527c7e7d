//! Ed25519 key pair generation.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

use strand_types::{KeyPair, PrivateKey, PublicKey};

/// Generate a new random key pair from the OS entropy source.
pub fn generate_keypair() -> KeyPair {
    let signing_key = SigningKey::generate(&mut OsRng);
    keypair_from_signing_key(signing_key)
}

/// Derive a deterministic key pair from a 32-byte seed.
///
/// Used for the well-known dev/test network genesis keys and for wallet
/// key derivation.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let signing_key = SigningKey::from_bytes(seed);
    keypair_from_signing_key(signing_key)
}

fn keypair_from_signing_key(signing_key: SigningKey) -> KeyPair {
    let public = PublicKey(signing_key.verifying_key().to_bytes());
    let private = PrivateKey(signing_key.to_bytes());
    KeyPair { public, private }
}
