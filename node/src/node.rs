//! The node — wires the ledger, elections and cementation together and
//! runs the periodic drivers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use strand_consensus::{
    online_weight::MAX_SAMPLES, ActiveElections, AdmitOutcome, OnlineWeightSampler, RepTier,
    Vote, VoteQueue, VoteResults,
};
use strand_ledger::{Ledger, LedgerConstants, ProcessCode};
use strand_store::LedgerStore;
use strand_types::{Account, Amount, BlockHash, NetworkId, QualifiedRoot, Root, Timestamp};
use strand_work::WorkThresholds;

use crate::block_processor::{BlockProcessor, BlockSource, BlockStatus};
use crate::config::NodeConfig;
use crate::confirmation_height::ConfirmationHeightProcessor;
use crate::ledger_event::{EventBus, LedgerEvent};
use crate::write_queue::{WriteQueue, Writer};
use crate::NodeError;

pub struct Node {
    pub config: NodeConfig,
    store: Arc<LedgerStore>,
    pub ledger: Arc<Ledger>,
    pub elections: Arc<Mutex<ActiveElections>>,
    pub block_processor: Arc<BlockProcessor>,
    pub cementation: Arc<ConfirmationHeightProcessor>,
    sampler: Mutex<OnlineWeightSampler>,
    vote_queue: Mutex<VoteQueue>,
    events: Arc<EventBus>,
    write_queue: Arc<WriteQueue>,
    stopped: AtomicBool,
    stop_signal: Notify,
}

impl Node {
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        Self::with_events(config, EventBus::new())
    }

    /// Build the node with pre-registered event listeners.
    pub fn with_events(config: NodeConfig, events: EventBus) -> Result<Self, NodeError> {
        let data_path = config.data_dir.join(config.network.as_str());
        let store = Arc::new(LedgerStore::open(&data_path)?);
        let constants = LedgerConstants::for_network(config.network);
        let ledger = Arc::new(Ledger::new(Arc::clone(&store), constants)?);
        let events = Arc::new(events);
        let write_queue = Arc::new(WriteQueue::new());
        let elections = Arc::new(Mutex::new(ActiveElections::new(config.max_elections)));

        let thresholds = match config.network {
            NetworkId::Live => WorkThresholds::live(),
            NetworkId::Test | NetworkId::Dev => WorkThresholds::disabled(),
        };
        let block_processor = Arc::new(BlockProcessor::new(
            Arc::clone(&ledger),
            Arc::clone(&elections),
            Arc::clone(&events),
            Arc::clone(&write_queue),
            thresholds,
            config.block_queue_capacity,
            config.unchecked_capacity,
        ));
        let reloaded = block_processor.reload_unchecked()?;
        if reloaded > 0 {
            tracing::info!(count = reloaded, "reloaded persisted unchecked entries");
        }

        let cementation = Arc::new(ConfirmationHeightProcessor::new(
            Arc::clone(&ledger),
            Arc::clone(&events),
            Arc::clone(&write_queue),
            config.cement_batch_size,
        ));

        let sampler = Mutex::new(OnlineWeightSampler::new(
            config.online_sample_interval_secs,
            Amount::new(config.online_minimum),
        ));

        let vote_queue = Mutex::new(VoteQueue::new(config.vote_queue_capacity));

        Ok(Self {
            config,
            store,
            ledger,
            elections,
            block_processor,
            cementation,
            sampler,
            vote_queue,
            events,
            write_queue,
            stopped: AtomicBool::new(false),
            stop_signal: Notify::new(),
        })
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    // ── Block intake ────────────────────────────────────────────────────

    /// Enqueue a block; `false` means backpressure is active.
    pub fn submit_block(&self, block: strand_types::Block, source: BlockSource) -> bool {
        self.block_processor.submit(block, source)
    }

    /// Synchronously process everything queued.
    pub fn drain_blocks(&self) -> Result<Vec<(BlockHash, BlockStatus)>, NodeError> {
        self.block_processor.drain()
    }

    // ── Votes ───────────────────────────────────────────────────────────

    /// Network intake: validate and queue a vote for the next drain.
    /// Past the ceiling, level-based admission sheds minor reps first.
    pub fn enqueue_vote(&self, vote: Vote) -> Result<AdmitOutcome, NodeError> {
        if !vote.validate() {
            return Err(strand_consensus::ConsensusError::InvalidVote.into());
        }
        let weight = self.ledger.weight(&vote.account);
        let online = self.online_weight()?;
        Ok(self
            .vote_queue
            .lock()
            .expect("vote queue poisoned")
            .admit(vote, weight, online))
    }

    /// Process every queued vote.
    pub fn drain_votes(&self) -> Result<usize, NodeError> {
        let mut drained = 0;
        loop {
            let next = self.vote_queue.lock().expect("vote queue poisoned").pop();
            let Some(vote) = next else { break };
            self.process_vote(&vote)?;
            drained += 1;
        }
        Ok(drained)
    }

    /// Validate and ingest one vote message, applying any winner switches
    /// and confirmations it causes.
    pub fn process_vote(&self, vote: &Vote) -> Result<VoteResults, NodeError> {
        if !vote.validate() {
            return Err(strand_consensus::ConsensusError::InvalidVote.into());
        }
        let now = Timestamp::now();
        self.sampler
            .lock()
            .expect("sampler poisoned")
            .observe(&vote.account, now.as_secs());

        let online_weight = self.online_weight()?;
        let online_minimum = self
            .sampler
            .lock()
            .expect("sampler poisoned")
            .minimum();
        let ledger = Arc::clone(&self.ledger);
        let weight_of = move |account: &Account| ledger.weight(account);

        let results = self
            .elections
            .lock()
            .expect("elections poisoned")
            .process_vote(vote, &weight_of, online_weight, online_minimum, now);

        for (root, outcome) in &results.outcomes {
            if let Some(from) = outcome.switched_from {
                self.switch_winner(root, &from)?;
            }
            if let Some(status) = outcome.confirmed {
                self.confirm_winner(root, &status.winner)?;
            }
        }
        Ok(results)
    }

    /// The current quorum denominator: median over the persisted sample
    /// series with the configured minimum mixed in.
    pub fn online_weight(&self) -> Result<Amount, NodeError> {
        let rtxn = self.store.read_txn()?;
        let series: Vec<Amount> = self
            .store
            .online_weight()
            .iter(&rtxn)?
            .into_iter()
            .map(|(_, weight)| weight)
            .collect();
        Ok(self
            .sampler
            .lock()
            .expect("sampler poisoned")
            .online_weight(&series))
    }

    // ── Election consequences ───────────────────────────────────────────

    /// Replace the installed chain head with the election's new winner:
    /// roll back the losing head (and its dependents) and apply the winner,
    /// indivisibly from the view of other writers.
    fn switch_winner(&self, root: &Root, losing: &BlockHash) -> Result<(), NodeError> {
        let winner = self
            .elections
            .lock()
            .expect("elections poisoned")
            .election(root)
            .and_then(|election| election.winner_block().cloned());
        let Some(winner) = winner else {
            return Ok(());
        };
        let winner_hash = winner.hash();

        let guard = self.write_queue.enter(Writer::WinnerSwitch);
        let mut txn = self.store.write_txn()?;
        if self.ledger.block_confirmed(&txn, losing)? {
            // Never unseat cemented state; the election lost the race.
            drop(txn);
            drop(guard);
            tracing::warn!(%root, %losing, "refusing winner switch against cemented block");
            return Ok(());
        }
        if self.store.block().exists(&txn, losing)? {
            self.ledger.rollback(&mut txn, losing)?;
        }
        let result = self.ledger.process(&mut txn, &winner)?;
        if result.code != ProcessCode::Progress {
            tracing::warn!(%root, winner = %winner_hash, code = ?result.code, "winner re-application failed");
        }
        txn.commit().map_err(strand_store::StoreError::from)?;
        drop(guard);

        tracing::info!(%root, from = %losing, to = %winner_hash, "election winner switched");
        Ok(())
    }

    /// A quorum winner: record the final vote, cement its chain, and
    /// cascade-confirm ancestors that are the sole candidate of an active
    /// election (one level, never recursive).
    fn confirm_winner(&self, root: &Root, winner: &BlockHash) -> Result<(), NodeError> {
        let winner_block = {
            let rtxn = self.store.read_txn()?;
            self.store.block().get(&rtxn, winner)?.map(|(block, _)| block)
        };
        let Some(winner_block) = winner_block else {
            tracing::warn!(%root, %winner, "confirmed winner not in ledger yet");
            return Ok(());
        };

        {
            let guard = self.write_queue.enter(Writer::WinnerSwitch);
            let mut txn = self.store.write_txn()?;
            let qualified = QualifiedRoot::new(*root, winner_block.previous());
            self.store.final_vote().put(&mut txn, &qualified, winner)?;
            txn.commit().map_err(strand_store::StoreError::from)?;
            drop(guard);
        }

        self.events.emit(&LedgerEvent::ElectionConfirmed {
            root: *root,
            winner: *winner,
        });

        // Cascade before cementing so dependent elections close under the
        // same confirmation wave.
        let now = Timestamp::now();
        let mut dependents = vec![winner_block.previous()];
        if let Some(source) = winner_block.source() {
            dependents.push(source);
        }
        if let Some(link) = winner_block.link() {
            dependents.push(link);
        }
        let mut cascaded = Vec::new();
        {
            let mut elections = self.elections.lock().expect("elections poisoned");
            for dependent in dependents {
                if dependent.is_zero() {
                    continue;
                }
                if let Some((dep_root, status)) = elections.confirm_if_sole(&dependent, now) {
                    cascaded.push((dep_root, status.winner));
                }
            }
        }
        for (dep_root, dep_winner) in &cascaded {
            self.events.emit(&LedgerEvent::ElectionConfirmed {
                root: *dep_root,
                winner: *dep_winner,
            });
        }

        let cemented = self.cementation.cement(winner)?;
        for (_, dep_winner) in &cascaded {
            self.cementation.cement(dep_winner)?;
        }
        tracing::info!(%root, %winner, cemented, "election confirmed");
        Ok(())
    }

    // ── Periodic drivers ────────────────────────────────────────────────

    /// One announcement round: rebroadcast winners and pick reps to
    /// solicit. The transport layer consumes the round; out of scope here.
    pub fn tick_elections(&self) -> strand_consensus::AnnouncementRound {
        let representatives = self.principal_representatives();
        let round = self
            .elections
            .lock()
            .expect("elections poisoned")
            .tick(&representatives, Timestamp::now());
        if !round.rebroadcast.is_empty() || !round.expired.is_empty() {
            tracing::debug!(
                rebroadcast = round.rebroadcast.len(),
                requests = round.requests.len(),
                expired = round.expired.len(),
                "announcement round"
            );
        }
        round
    }

    /// Representatives above the dust tier at the current online weight.
    pub fn principal_representatives(&self) -> Vec<Account> {
        let online = self.online_weight().unwrap_or(Amount::ZERO);
        self.ledger
            .rep_weights()
            .into_iter()
            .filter(|(_, weight)| RepTier::of(*weight, online) > RepTier::None)
            .map(|(account, _)| account)
            .collect()
    }

    /// Append one online-weight sample to the persisted series.
    pub fn sample_online_weight(&self) -> Result<Amount, NodeError> {
        let now = Timestamp::now().as_secs();
        let weights = self.ledger.rep_weights();
        let sample = {
            let mut sampler = self.sampler.lock().expect("sampler poisoned");
            sampler.prune(now);
            sampler.sample(now, &weights)
        };

        let guard = self.write_queue.enter(Writer::BlockProcessing);
        let mut txn = self.store.write_txn()?;
        self.store.online_weight().put(&mut txn, now, sample)?;
        self.store.online_weight().trim(&mut txn, MAX_SAMPLES)?;
        txn.commit().map_err(strand_store::StoreError::from)?;
        drop(guard);

        tracing::debug!(sample = %sample, "online weight sampled");
        Ok(sample)
    }

    /// Run the periodic drivers until [`Node::stop`] is called.
    pub async fn run(&self) -> Result<(), NodeError> {
        let mut announce =
            tokio::time::interval(Duration::from_millis(self.config.announcement_interval_ms));
        let mut sample =
            tokio::time::interval(Duration::from_secs(self.config.online_sample_interval_secs));
        let mut sweep = tokio::time::interval(Duration::from_secs(
            (self.config.unchecked_ttl_secs / 8).max(60),
        ));

        tracing::info!(network = self.config.network.as_str(), "node running");
        loop {
            if self.stopped.load(Ordering::SeqCst) {
                break;
            }
            tokio::select! {
                _ = announce.tick() => {
                    self.drain_blocks()?;
                    self.drain_votes()?;
                    self.tick_elections();
                }
                _ = sample.tick() => {
                    self.sample_online_weight()?;
                }
                _ = sweep.tick() => {
                    self.block_processor.sweep_unchecked(self.config.unchecked_ttl_secs)?;
                }
                _ = self.stop_signal.notified() => {}
            }
        }
        tracing::info!("node stopped");
        Ok(())
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.stop_signal.notify_waiters();
    }
}
