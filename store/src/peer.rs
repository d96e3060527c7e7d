//! Peers table — `ipv6 (16 B) ‖ port (2 B) → ()`. Endpoint cache reloaded
//! at startup so the node can rejoin the network without bootstrap seeds.

use std::net::{Ipv6Addr, SocketAddrV6};

use heed::{RoTxn, RwTxn};

use crate::environment::LedgerStore;
use crate::error::StoreError;

pub struct PeerStore<'a> {
    pub(crate) store: &'a LedgerStore,
}

fn peer_key(endpoint: &SocketAddrV6) -> [u8; 18] {
    let mut key = [0u8; 18];
    key[..16].copy_from_slice(&endpoint.ip().octets());
    key[16..].copy_from_slice(&endpoint.port().to_be_bytes());
    key
}

impl PeerStore<'_> {
    pub fn put(&self, txn: &mut RwTxn, endpoint: &SocketAddrV6) -> Result<(), StoreError> {
        self.store.peers_db.put(txn, &peer_key(endpoint), &[])?;
        Ok(())
    }

    pub fn del(&self, txn: &mut RwTxn, endpoint: &SocketAddrV6) -> Result<(), StoreError> {
        self.store.peers_db.delete(txn, &peer_key(endpoint))?;
        Ok(())
    }

    pub fn exists(&self, txn: &RoTxn, endpoint: &SocketAddrV6) -> Result<bool, StoreError> {
        Ok(self.store.peers_db.get(txn, &peer_key(endpoint))?.is_some())
    }

    pub fn iter(&self, txn: &RoTxn) -> Result<Vec<SocketAddrV6>, StoreError> {
        let mut out = Vec::new();
        for item in self.store.peers_db.iter(txn)? {
            let (key, _) = item?;
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&key[..16]);
            let port = u16::from_be_bytes([key[16], key[17]]);
            out.push(SocketAddrV6::new(Ipv6Addr::from(octets), port, 0, 0));
        }
        Ok(out)
    }

    pub fn count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.store.peers_db.len(txn)?)
    }

    pub fn clear(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        self.store.peers_db.clear(txn)?;
        Ok(())
    }
}
