//! Confirmation-height processor — cements a confirmed tip and every
//! uncemented ancestor it depends on, across accounts.
//!
//! From the tip, walk backward to the account's cemented frontier; any
//! receive on the way whose source chain is not yet cemented queues that
//! chain first. Work is deduplicated per account in a pending-writes set
//! and flushed in bounded batches, each under its own write transaction.
//! `block_cemented` observations fire after commit, in strictly increasing
//! height order per account.

use std::collections::HashMap;
use std::sync::Arc;

use strand_ledger::Ledger;
use strand_types::{Account, BlockHash, ConfirmationHeightInfo};

use crate::ledger_event::{EventBus, LedgerEvent};
use crate::write_queue::{WriteQueue, Writer};
use crate::NodeError;

/// One account's cementation step: everything up to `height`.
#[derive(Clone, Debug)]
struct PendingWrite {
    account: Account,
    height: u64,
    frontier: BlockHash,
}

pub struct ConfirmationHeightProcessor {
    ledger: Arc<Ledger>,
    events: Arc<EventBus>,
    write_queue: Arc<WriteQueue>,
    batch_size: usize,
}

impl ConfirmationHeightProcessor {
    pub fn new(
        ledger: Arc<Ledger>,
        events: Arc<EventBus>,
        write_queue: Arc<WriteQueue>,
        batch_size: usize,
    ) -> Self {
        Self {
            ledger,
            events,
            write_queue,
            batch_size,
        }
    }

    /// Cement `tip` and all its uncemented ancestors. Returns the number of
    /// blocks cemented. Re-cementing is a no-op.
    pub fn cement(&self, tip: &BlockHash) -> Result<u64, NodeError> {
        let writes = self.plan(tip)?;
        let mut total = 0;
        for write in writes {
            total += self.flush(&write)?;
        }
        Ok(total)
    }

    /// Walk the dependency graph and produce per-account writes, dependency
    /// chains (receive sources) first.
    fn plan(&self, tip: &BlockHash) -> Result<Vec<PendingWrite>, NodeError> {
        let mut writes: Vec<PendingWrite> = Vec::new();
        // Account → planned height, for dedup and dependency checks.
        let mut planned: HashMap<Account, u64> = HashMap::new();
        let mut stack: Vec<BlockHash> = vec![*tip];

        while let Some(top) = stack.last().copied() {
            let rtxn = self.ledger.store().read_txn()?;
            let Some((_, sideband)) = self.ledger.store().block().get(&rtxn, &top)? else {
                // Rolled back or pruned since it was queued.
                stack.pop();
                continue;
            };
            let account = sideband.account;
            let stored = self
                .ledger
                .store()
                .confirmation_height()
                .get(&rtxn, &account)?
                .height;
            let base = stored.max(planned.get(&account).copied().unwrap_or(0));
            if sideband.height <= base {
                stack.pop();
                continue;
            }

            // Find the lowest receive in (base, height] whose source chain
            // is not yet cemented or planned.
            let mut cursor = top;
            let mut lowest_source = None;
            loop {
                let Some((block, block_sideband)) =
                    self.ledger.store().block().get(&rtxn, &cursor)?
                else {
                    break;
                };
                if block_sideband.details.is_receive {
                    let source = block.source().or_else(|| block.link());
                    if let Some(source) = source {
                        if self.needs_cementing(&rtxn, &source, &planned)? {
                            lowest_source = Some(source);
                        }
                    }
                }
                if block_sideband.height <= base + 1 {
                    break;
                }
                cursor = block.previous();
            }

            if let Some(source) = lowest_source {
                stack.push(source);
                continue;
            }

            match planned.get(&account) {
                Some(existing) if *existing >= sideband.height => {}
                _ => {
                    planned.insert(account, sideband.height);
                    if let Some(write) = writes.iter_mut().find(|w| w.account == account) {
                        write.height = sideband.height;
                        write.frontier = top;
                    } else {
                        writes.push(PendingWrite {
                            account,
                            height: sideband.height,
                            frontier: top,
                        });
                    }
                }
            }
            stack.pop();
        }
        Ok(writes)
    }

    /// Whether `hash` still needs cementing, given what's already planned.
    fn needs_cementing(
        &self,
        rtxn: &strand_store::RoTxn,
        hash: &BlockHash,
        planned: &HashMap<Account, u64>,
    ) -> Result<bool, NodeError> {
        let Some((_, sideband)) = self.ledger.store().block().get(rtxn, hash)? else {
            // Unknown or pruned sources have nothing left to cement.
            return Ok(false);
        };
        let stored = self
            .ledger
            .store()
            .confirmation_height()
            .get(rtxn, &sideband.account)?
            .height;
        let effective = stored.max(planned.get(&sideband.account).copied().unwrap_or(0));
        Ok(sideband.height > effective)
    }

    /// Apply one account's write in bounded batches and publish cemented
    /// observations in height order.
    fn flush(&self, write: &PendingWrite) -> Result<u64, NodeError> {
        // Collect the uncemented span bottom-up.
        let span: Vec<(u64, BlockHash)> = {
            let rtxn = self.ledger.store().read_txn()?;
            let stored = self
                .ledger
                .store()
                .confirmation_height()
                .get(&rtxn, &write.account)?
                .height;
            if write.height <= stored {
                return Ok(0);
            }
            let mut span = Vec::with_capacity((write.height - stored) as usize);
            let mut cursor = write.frontier;
            let mut height = write.height;
            while height > stored {
                span.push((height, cursor));
                let Some((block, _)) = self.ledger.store().block().get(&rtxn, &cursor)? else {
                    return Err(NodeError::Ledger(strand_ledger::LedgerError::BlockNotFound(
                        cursor,
                    )));
                };
                cursor = block.previous();
                height -= 1;
            }
            span.reverse();
            span
        };

        let mut cemented = 0;
        for chunk in span.chunks(self.batch_size.max(1)) {
            let (chunk_height, chunk_frontier) = *chunk.last().expect("chunks are non-empty");

            let guard = self.write_queue.enter(Writer::Cementation);
            let mut txn = self.ledger.store().write_txn()?;
            let current = self
                .ledger
                .store()
                .confirmation_height()
                .get(&txn, &write.account)?
                .height;
            // Monotone: another path may have cemented past this chunk.
            if chunk_height <= current {
                drop(txn);
                drop(guard);
                continue;
            }
            self.ledger.store().confirmation_height().put(
                &mut txn,
                &write.account,
                &ConfirmationHeightInfo::new(chunk_height, chunk_frontier),
            )?;
            txn.commit().map_err(strand_store::StoreError::from)?;
            drop(guard);

            for (height, hash) in chunk {
                if *height <= current {
                    continue;
                }
                cemented += 1;
                self.events.emit(&LedgerEvent::BlockCemented {
                    hash: *hash,
                    account: write.account,
                    height: *height,
                });
            }
            tracing::debug!(
                account = %write.account,
                height = chunk_height,
                "cemented batch"
            );
        }
        Ok(cemented)
    }
}
