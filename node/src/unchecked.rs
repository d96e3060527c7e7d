//! Unchecked block buffer — blocks whose previous or source is missing.
//!
//! Entries are keyed by the missing dependency hash; when that hash is
//! admitted, all waiting blocks are drained and re-submitted. Within a
//! dependency bucket a block appears at most once. The buffer is
//! size-bounded with FIFO eviction, and a periodic sweep removes entries
//! past the TTL. The block processor mirrors inserts and removals into the
//! persisted unchecked table so gaps survive a restart.

use std::collections::{HashMap, VecDeque};

use strand_types::{Block, BlockHash};

/// Why a block is parked here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GapKind {
    /// The block's `previous` hash is unknown.
    Previous,
    /// The referenced send (source / link) is unknown.
    Source,
}

#[derive(Clone, Debug)]
struct UncheckedEntry {
    block: Block,
    received_at: u64,
}

/// Result of inserting into the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Same block already waiting on this dependency.
    Duplicate,
    /// Inserted; these (dependency, block_hash) pairs were evicted to make
    /// room and must also be removed from the persisted table.
    Evicted(Vec<(BlockHash, BlockHash)>),
}

pub struct UncheckedMap {
    entries: HashMap<BlockHash, Vec<UncheckedEntry>>,
    /// Insertion order across all buckets, for FIFO eviction.
    order: VecDeque<(BlockHash, BlockHash)>,
    count: usize,
    max_size: usize,
}

impl UncheckedMap {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            count: 0,
            max_size,
        }
    }

    /// Park `block` until `dependency` arrives.
    pub fn insert(&mut self, dependency: BlockHash, block: Block, now: u64) -> InsertOutcome {
        let hash = block.hash();
        let bucket = self.entries.entry(dependency).or_default();
        if bucket.iter().any(|entry| entry.block.hash() == hash) {
            return InsertOutcome::Duplicate;
        }
        bucket.push(UncheckedEntry {
            block,
            received_at: now,
        });
        self.order.push_back((dependency, hash));
        self.count += 1;

        let mut evicted = Vec::new();
        while self.count > self.max_size {
            let Some((old_dependency, old_hash)) = self.order.pop_front() else {
                break;
            };
            if self.remove(&old_dependency, &old_hash) {
                evicted.push((old_dependency, old_hash));
            }
        }
        if evicted.is_empty() {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::Evicted(evicted)
        }
    }

    /// Release every block waiting on `dependency`.
    pub fn drain(&mut self, dependency: &BlockHash) -> Vec<Block> {
        match self.entries.remove(dependency) {
            Some(bucket) => {
                self.count -= bucket.len();
                bucket.into_iter().map(|entry| entry.block).collect()
            }
            None => Vec::new(),
        }
    }

    fn remove(&mut self, dependency: &BlockHash, hash: &BlockHash) -> bool {
        let Some(bucket) = self.entries.get_mut(dependency) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|entry| entry.block.hash() != *hash);
        let removed = before - bucket.len();
        if bucket.is_empty() {
            self.entries.remove(dependency);
        }
        self.count -= removed;
        removed > 0
    }

    /// Sweep entries older than `ttl_secs`, returning the removed
    /// (dependency, block_hash) pairs for table mirroring.
    pub fn clear_expired(&mut self, ttl_secs: u64, now: u64) -> Vec<(BlockHash, BlockHash)> {
        let mut removed = Vec::new();
        self.entries.retain(|dependency, bucket| {
            bucket.retain(|entry| {
                let expired = now.saturating_sub(entry.received_at) >= ttl_secs;
                if expired {
                    removed.push((*dependency, entry.block.hash()));
                }
                !expired
            });
            !bucket.is_empty()
        });
        self.count -= removed.len();
        self.order
            .retain(|pair| !removed.iter().any(|gone| gone == pair));
        removed
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
