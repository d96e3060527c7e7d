//! Block processing pipeline.
//!
//! Arriving blocks pass work validation, then run through the ledger under
//! the write queue. Progress releases unchecked dependents and notifies
//! observers; gaps park the block in the unchecked buffer (mirrored to the
//! persisted table); forks seed an election with both contenders.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use strand_consensus::ActiveElections;
use strand_ledger::{Ledger, ProcessCode, ProcessResult};
use strand_types::{Block, BlockHash, Timestamp};
use strand_work::{validate_work, WorkBlockKind, WorkThresholds};

use crate::ledger_event::{EventBus, LedgerEvent};
use crate::unchecked::{GapKind, InsertOutcome, UncheckedMap};
use crate::write_queue::{WriteQueue, Writer};
use crate::NodeError;

/// Where an incoming block originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockSource {
    /// Received from a peer.
    Network,
    /// Submitted locally (CLI or wallet).
    Local,
    /// Re-queued from the unchecked buffer.
    Unchecked,
}

/// Outcome of processing one block through the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockStatus {
    /// The work nonce does not clear the threshold for this block kind.
    BadWork,
    /// The ledger ran; inspect the embedded result code.
    Ledger(ProcessResult),
}

#[derive(Clone, Debug)]
struct BlockContext {
    block: Block,
    source: BlockSource,
}

/// Bounded two-lane queue: local submissions are dequeued before network
/// traffic so user operations are never starved by floods.
struct ProcessingQueue {
    local: VecDeque<BlockContext>,
    network: VecDeque<BlockContext>,
    max_capacity: usize,
}

impl ProcessingQueue {
    fn new(max_capacity: usize) -> Self {
        Self {
            local: VecDeque::new(),
            network: VecDeque::new(),
            max_capacity,
        }
    }

    fn enqueue(&mut self, ctx: BlockContext) -> bool {
        if self.len() >= self.max_capacity {
            return false;
        }
        match ctx.source {
            BlockSource::Local => self.local.push_back(ctx),
            _ => self.network.push_back(ctx),
        }
        true
    }

    fn dequeue(&mut self) -> Option<BlockContext> {
        self.local.pop_front().or_else(|| self.network.pop_front())
    }

    fn len(&self) -> usize {
        self.local.len() + self.network.len()
    }
}

pub struct BlockProcessor {
    ledger: Arc<Ledger>,
    elections: Arc<Mutex<ActiveElections>>,
    events: Arc<EventBus>,
    write_queue: Arc<WriteQueue>,
    unchecked: Mutex<UncheckedMap>,
    queue: Mutex<ProcessingQueue>,
    thresholds: WorkThresholds,
}

impl BlockProcessor {
    pub fn new(
        ledger: Arc<Ledger>,
        elections: Arc<Mutex<ActiveElections>>,
        events: Arc<EventBus>,
        write_queue: Arc<WriteQueue>,
        thresholds: WorkThresholds,
        queue_capacity: usize,
        unchecked_capacity: usize,
    ) -> Self {
        Self {
            ledger,
            elections,
            events,
            write_queue,
            unchecked: Mutex::new(UncheckedMap::new(unchecked_capacity)),
            queue: Mutex::new(ProcessingQueue::new(queue_capacity)),
            thresholds,
        }
    }

    /// Reload persisted gap entries into the in-memory buffer (startup).
    pub fn reload_unchecked(&self) -> Result<usize, NodeError> {
        let rtxn = self.ledger.store().read_txn()?;
        let entries = self.ledger.store().unchecked().iter(&rtxn)?;
        let now = Timestamp::now().as_secs();
        let mut map = self.unchecked.lock().expect("unchecked poisoned");
        let count = entries.len();
        for (dependency, block) in entries {
            map.insert(dependency, block, now);
        }
        Ok(count)
    }

    /// Enqueue a block. Returns `false` under backpressure; the network
    /// layer must stop accepting publishes until the queue drains.
    pub fn submit(&self, block: Block, source: BlockSource) -> bool {
        self.queue
            .lock()
            .expect("block queue poisoned")
            .enqueue(BlockContext { block, source })
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().expect("block queue poisoned").len()
    }

    pub fn unchecked_len(&self) -> usize {
        self.unchecked.lock().expect("unchecked poisoned").len()
    }

    /// Process queued blocks until empty, returning per-block outcomes.
    pub fn drain(&self) -> Result<Vec<(BlockHash, BlockStatus)>, NodeError> {
        let mut outcomes = Vec::new();
        loop {
            let next = self.queue.lock().expect("block queue poisoned").dequeue();
            let Some(ctx) = next else { break };
            let hash = ctx.block.hash();
            let status = self.process_block(ctx.block)?;
            outcomes.push((hash, status));
        }
        Ok(outcomes)
    }

    /// Run one block through work validation and the ledger.
    pub fn process_block(&self, block: Block) -> Result<BlockStatus, NodeError> {
        let hash = block.hash();
        let kind = match &block {
            Block::Open(_) | Block::Receive(_) => WorkBlockKind::Receive,
            _ => WorkBlockKind::Base,
        };
        if !validate_work(&block.work_root(), block.work(), self.thresholds.threshold_for(kind)) {
            tracing::debug!(block = %hash, "rejected: insufficient work");
            return Ok(BlockStatus::BadWork);
        }

        let guard = self.write_queue.enter(Writer::BlockProcessing);
        let mut txn = self.ledger.store().write_txn()?;
        let result = self.ledger.process(&mut txn, &block)?;

        match result.code {
            ProcessCode::Progress => {
                // Clear the persisted gap bucket keyed by this hash inside
                // the same transaction the block commits under.
                self.ledger.store().unchecked().del_dependents(&mut txn, &hash)?;
                txn.commit().map_err(strand_store::StoreError::from)?;
                drop(guard);

                self.events.emit(&LedgerEvent::BlockAdmitted {
                    hash,
                    account: result.account.expect("progress carries account"),
                });
                tracing::debug!(block = %hash, "admitted");

                // Anything waiting on this hash can now be retried.
                let dependents = self
                    .unchecked
                    .lock()
                    .expect("unchecked poisoned")
                    .drain(&hash);
                for dependent in dependents {
                    self.submit(dependent, BlockSource::Unchecked);
                }
            }
            ProcessCode::GapPrevious => {
                drop(txn);
                self.park(guard, block.previous(), block, GapKind::Previous)?;
            }
            ProcessCode::GapSource => {
                drop(txn);
                let dependency = block
                    .source()
                    .or_else(|| block.link())
                    .unwrap_or(BlockHash::ZERO);
                self.park(guard, dependency, block, GapKind::Source)?;
            }
            ProcessCode::Fork => {
                drop(txn);
                drop(guard);
                self.start_fork_election(block)?;
            }
            code => {
                drop(txn);
                drop(guard);
                tracing::debug!(block = %hash, ?code, "rejected");
                self.events.emit(&LedgerEvent::BlockRejected { hash, code });
            }
        }
        Ok(BlockStatus::Ledger(result))
    }

    /// Park a gapped block in memory and in the persisted table.
    fn park(
        &self,
        guard: crate::write_queue::WriteGuard<'_>,
        dependency: BlockHash,
        block: Block,
        kind: GapKind,
    ) -> Result<(), NodeError> {
        let hash = block.hash();
        let now = Timestamp::now().as_secs();
        let outcome = self
            .unchecked
            .lock()
            .expect("unchecked poisoned")
            .insert(dependency, block.clone(), now);

        let mut txn = self.ledger.store().write_txn()?;
        match &outcome {
            InsertOutcome::Duplicate => {}
            InsertOutcome::Inserted => {
                self.ledger.store().unchecked().put(&mut txn, &dependency, &block)?;
            }
            InsertOutcome::Evicted(evicted) => {
                self.ledger.store().unchecked().put(&mut txn, &dependency, &block)?;
                for (gone_dependency, gone_hash) in evicted {
                    self.ledger
                        .store()
                        .unchecked()
                        .del(&mut txn, gone_dependency, gone_hash)?;
                }
            }
        }
        txn.commit().map_err(strand_store::StoreError::from)?;
        drop(guard);

        tracing::debug!(block = %hash, %dependency, ?kind, "parked unchecked");
        self.events.emit(&LedgerEvent::BlockQueued { hash, dependency });
        Ok(())
    }

    /// Periodic TTL sweep over the unchecked buffer and its mirror table.
    pub fn sweep_unchecked(&self, ttl_secs: u64) -> Result<usize, NodeError> {
        let now = Timestamp::now().as_secs();
        let removed = self
            .unchecked
            .lock()
            .expect("unchecked poisoned")
            .clear_expired(ttl_secs, now);
        if removed.is_empty() {
            return Ok(0);
        }
        let guard = self.write_queue.enter(Writer::BlockProcessing);
        let mut txn = self.ledger.store().write_txn()?;
        for (dependency, hash) in &removed {
            self.ledger.store().unchecked().del(&mut txn, dependency, hash)?;
        }
        txn.commit().map_err(strand_store::StoreError::from)?;
        drop(guard);
        tracing::debug!(count = removed.len(), "swept expired unchecked entries");
        Ok(removed.len())
    }

    /// Seed an election with the installed occupant of the contested slot
    /// and the incoming alternate.
    fn start_fork_election(&self, incoming: Block) -> Result<(), NodeError> {
        let root = incoming.root();
        let hash = incoming.hash();
        let existing = {
            let rtxn = self.ledger.store().read_txn()?;
            let previous = incoming.previous();
            let occupant_hash = if previous.is_zero() {
                // Open-slot fork: the occupant is the account's open block.
                incoming.account_field().and_then(|account| {
                    self.ledger
                        .store()
                        .account()
                        .get(&rtxn, &account)
                        .ok()
                        .flatten()
                        .map(|info| info.open_block)
                })
            } else {
                self.ledger.store().block().successor(&rtxn, &previous)?
            };
            occupant_hash
                .and_then(|h| self.ledger.store().block().get(&rtxn, &h).ok().flatten())
                .map(|(block, _)| block)
        };

        let now = Timestamp::now();
        let mut elections = self.elections.lock().expect("elections poisoned");
        if let Some(existing) = existing {
            let _ = elections.insert(existing, now);
        }
        match elections.insert(incoming, now) {
            Ok(_) => {
                self.events.emit(&LedgerEvent::ForkDetected {
                    root,
                    incoming: hash,
                });
                tracing::info!(%root, incoming = %hash, "fork detected, election running");
            }
            Err(err) => {
                tracing::warn!(%root, %err, "could not start fork election");
            }
        }
        Ok(())
    }
}
