//! Genesis block creation — the first block on each network.
//!
//! The genesis block is a legacy open block whose source field carries the
//! genesis account itself, signed by the genesis key. It mints the entire
//! supply and delegates it to the genesis account as representative.

use strand_crypto::sign_message;
use strand_types::{Block, BlockHash, OpenBlock, Signature};

use crate::constants::LedgerConstants;

/// Build the signed genesis open block for a network.
pub fn create_genesis_block(constants: &LedgerConstants) -> Block {
    let mut block = Block::Open(OpenBlock {
        source: BlockHash::from(constants.genesis_account),
        representative: constants.genesis_account,
        account: constants.genesis_account,
        signature: Signature::ZERO,
        work: 0,
    });
    let hash = block.hash();
    block.set_signature(sign_message(
        hash.as_bytes(),
        &constants.genesis_key.private,
    ));
    block
}
