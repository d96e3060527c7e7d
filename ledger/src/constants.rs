//! Per-network ledger constants — genesis identity, epoch links, burn account.

use strand_crypto::keypair_from_seed;
use strand_types::{Account, Amount, BlockHash, Epoch, KeyPair, NetworkId};

/// Well-known seeds for the deterministic genesis keypairs.
///
/// The live seed stands in for a key generated and discarded at launch;
/// test and dev seeds are published so anyone can drive those networks.
fn genesis_seed(network: NetworkId) -> [u8; 32] {
    let mut seed = [0u8; 32];
    match network {
        NetworkId::Live => seed[31] = 1,
        NetworkId::Test => seed[31] = 2,
        NetworkId::Dev => {}
    }
    seed
}

/// Epoch link constants: ASCII-tagged 32-byte values that can never be a
/// real block hash or account in practice.
fn epoch_link(network: NetworkId, epoch: Epoch) -> BlockHash {
    let mut link = [0u8; 32];
    let tag: &[u8; 16] = match epoch {
        Epoch::Epoch0 => b"strand epoch v0 ",
        Epoch::Epoch1 => b"strand epoch v1 ",
        Epoch::Epoch2 => b"strand epoch v2 ",
    };
    let net: &[u8; 4] = match network {
        NetworkId::Live => b"live",
        NetworkId::Test => b"test",
        NetworkId::Dev => b"dev\0",
    };
    link[..16].copy_from_slice(tag);
    link[16..20].copy_from_slice(net);
    BlockHash::new(link)
}

/// Fixed parameters of one strand network.
pub struct LedgerConstants {
    pub network: NetworkId,
    pub genesis_key: KeyPair,
    pub genesis_account: Account,
    /// The full supply, minted by the genesis open block.
    pub genesis_amount: Amount,
    pub burn_account: Account,
    /// Link value of an epoch-1 upgrade block.
    pub epoch_1_link: BlockHash,
    /// Link value of an epoch-2 upgrade block.
    pub epoch_2_link: BlockHash,
    /// The distinguished key allowed to sign epoch blocks.
    pub epoch_signer: Account,
}

impl LedgerConstants {
    pub fn for_network(network: NetworkId) -> Self {
        let genesis_key = keypair_from_seed(&genesis_seed(network));
        let genesis_account = Account::from(genesis_key.public);
        Self {
            network,
            genesis_account,
            genesis_amount: Amount::MAX,
            burn_account: Account::BURN,
            epoch_1_link: epoch_link(network, Epoch::Epoch1),
            epoch_2_link: epoch_link(network, Epoch::Epoch2),
            // Epoch upgrades are distributed by the same authority that
            // minted the supply.
            epoch_signer: genesis_account,
            genesis_key,
        }
    }

    pub fn dev() -> Self {
        Self::for_network(NetworkId::Dev)
    }

    /// Which epoch a state block's link upgrades to, if it is an epoch link.
    pub fn epoch_of_link(&self, link: &BlockHash) -> Option<Epoch> {
        if *link == self.epoch_1_link {
            Some(Epoch::Epoch1)
        } else if *link == self.epoch_2_link {
            Some(Epoch::Epoch2)
        } else {
            None
        }
    }

    pub fn is_epoch_link(&self, link: &BlockHash) -> bool {
        self.epoch_of_link(link).is_some()
    }
}
