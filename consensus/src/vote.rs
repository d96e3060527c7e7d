//! Vote messages — a representative's signed statement naming block hashes.

use serde::{Deserialize, Serialize};

use strand_crypto::{sign_message, verify_signature};
use strand_types::{Account, BlockHash, KeyPair, Signature};

/// Domain separator so vote signatures can never collide with block
/// signatures over the same bytes.
const VOTE_PREFIX: &[u8] = b"vote ";

/// A vote: `{ account, sequence, hashes[] }` signed by the account.
///
/// The sequence is per-representative and monotone; elections keep only the
/// newest vote from each representative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub account: Account,
    pub sequence: u64,
    pub hashes: Vec<BlockHash>,
    pub signature: Signature,
}

impl Vote {
    pub fn new_signed(key: &KeyPair, sequence: u64, hashes: Vec<BlockHash>) -> Self {
        let mut vote = Self {
            account: Account::from(key.public),
            sequence,
            hashes,
            signature: Signature::ZERO,
        };
        vote.signature = sign_message(&vote.signing_bytes(), &key.private);
        vote
    }

    fn signing_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(VOTE_PREFIX.len() + 32 + 8 + 32 * self.hashes.len());
        bytes.extend_from_slice(VOTE_PREFIX);
        bytes.extend_from_slice(self.account.as_bytes());
        bytes.extend_from_slice(&self.sequence.to_be_bytes());
        for hash in &self.hashes {
            bytes.extend_from_slice(hash.as_bytes());
        }
        bytes
    }

    pub fn validate(&self) -> bool {
        !self.hashes.is_empty()
            && verify_signature(
                &self.signing_bytes(),
                &self.signature,
                &self.account.public_key(),
            )
    }
}
