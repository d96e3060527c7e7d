//! Active elections container — routes votes, drives announcement rounds,
//! reaps finished elections.
//!
//! Elections are keyed by chain root; at most one exists per root. A vote
//! names block hashes, so an index from candidate hash to root fans each
//! vote out to the election it belongs to.

use std::collections::HashMap;

use strand_types::{Account, Amount, Block, BlockHash, Root, Timestamp};

use crate::election::{Election, ElectionStatus, TallyOutcome, VoteOutcome};
use crate::error::ConsensusError;
use crate::rep_tiers::RepTier;
use crate::vote::Vote;

/// Announcement rounds after which a confirmed election is reaped.
const CONFIRMED_CUTOFF: u32 = 4;
/// Announcement rounds after which an unconfirmed election is dropped with
/// no ledger effect.
const UNCONFIRMED_CUTOFF: u32 = 20;
/// A rep's vote on a root is worth re-requesting after this long.
const STALE_VOTE_SECS: u64 = 15;

/// What one announcement tick wants the node to do.
#[derive(Clone, Debug, Default)]
pub struct AnnouncementRound {
    /// Current winners to rebroadcast.
    pub rebroadcast: Vec<Block>,
    /// Per root: representatives to solicit votes from.
    pub requests: Vec<(Root, Vec<Account>)>,
    /// Elections dropped this round without confirming.
    pub expired: Vec<Root>,
    /// Confirmed elections whose results have been handed over.
    pub reaped: Vec<Root>,
}

/// Aggregate result of ingesting one vote message.
#[derive(Clone, Debug, Default)]
pub struct VoteResults {
    /// At least one hash was recorded and re-tallied.
    pub processed: bool,
    /// At least one hash was a replay — the voter may be behind.
    pub replay: bool,
    /// Tally consequences per root, in vote order.
    pub outcomes: Vec<(Root, TallyOutcome)>,
}

pub struct ActiveElections {
    roots: HashMap<Root, Election>,
    by_hash: HashMap<BlockHash, Root>,
    max_elections: usize,
}

impl ActiveElections {
    pub fn new(max_elections: usize) -> Self {
        Self {
            roots: HashMap::new(),
            by_hash: HashMap::new(),
            max_elections,
        }
    }

    /// Start an election for `block`'s root, or add `block` as a candidate
    /// to the existing one. Returns whether a new election was created.
    pub fn insert(&mut self, block: Block, now: Timestamp) -> Result<bool, ConsensusError> {
        let root = block.root();
        let hash = block.hash();
        if let Some(election) = self.roots.get_mut(&root) {
            if election.add_candidate(block) {
                self.by_hash.insert(hash, root);
            }
            return Ok(false);
        }
        if self.roots.len() >= self.max_elections {
            return Err(ConsensusError::ElectionCapacityReached(self.max_elections));
        }
        self.roots.insert(root, Election::new(block, now));
        self.by_hash.insert(hash, root);
        tracing::debug!(%root, winner = %hash, "election started");
        Ok(true)
    }

    /// Route a validated vote to the elections its hashes belong to.
    ///
    /// `weight_of` resolves a representative's current weight at the
    /// cemented view; `online_weight`/`online_minimum` parameterise both
    /// the cooldown tiers and the quorum.
    pub fn process_vote(
        &mut self,
        vote: &Vote,
        weight_of: &dyn Fn(&Account) -> Amount,
        online_weight: Amount,
        online_minimum: Amount,
        now: Timestamp,
    ) -> VoteResults {
        let mut results = VoteResults::default();
        let weight = weight_of(&vote.account);
        let tier = RepTier::of(weight, online_weight);
        let Some(cooldown) = tier.cooldown_secs() else {
            // Dust-weight representative — drop outright.
            return results;
        };

        for hash in &vote.hashes {
            let Some(root) = self.by_hash.get(hash).copied() else {
                continue;
            };
            let Some(election) = self.roots.get_mut(&root) else {
                continue;
            };
            match election.vote(&vote.account, vote.sequence, *hash, now, cooldown) {
                VoteOutcome::Processed => {
                    results.processed = true;
                    let outcome =
                        election.evaluate(weight_of, online_weight, online_minimum, now);
                    if outcome != TallyOutcome::default() {
                        results.outcomes.push((root, outcome));
                    }
                }
                VoteOutcome::Replay => results.replay = true,
                VoteOutcome::Ignored => {}
            }
        }
        results
    }

    /// Cascade helper: confirm the election owning `hash` iff `hash` is its
    /// sole candidate. Non-recursive by construction.
    pub fn confirm_if_sole(
        &mut self,
        hash: &BlockHash,
        now: Timestamp,
    ) -> Option<(Root, ElectionStatus)> {
        let root = self.by_hash.get(hash).copied()?;
        let election = self.roots.get_mut(&root)?;
        if election.confirmed || election.stopped || !election.is_sole_block(hash) {
            return None;
        }
        election.confirmed = true;
        election.winner = *hash;
        let status = ElectionStatus {
            winner: *hash,
            tally: Amount::ZERO,
            duration_ms: election.start_time.elapsed_since(now).saturating_mul(1000),
        };
        Some((root, status))
    }

    /// One announcement round: collect winners to rebroadcast and stale
    /// reps to solicit, bump counters, and reap finished elections.
    pub fn tick(&mut self, representatives: &[Account], now: Timestamp) -> AnnouncementRound {
        let mut round = AnnouncementRound::default();
        for (root, election) in self.roots.iter_mut() {
            election.announcements += 1;
            if election.confirmed {
                if election.announcements >= CONFIRMED_CUTOFF {
                    round.reaped.push(*root);
                }
                continue;
            }
            if election.announcements >= UNCONFIRMED_CUTOFF {
                election.stopped = true;
                round.expired.push(*root);
                continue;
            }
            if let Some(winner) = election.winner_block() {
                round.rebroadcast.push(winner.clone());
            }
            let stale = election.stale_voters(representatives.iter(), STALE_VOTE_SECS, now);
            if !stale.is_empty() {
                round.requests.push((*root, stale));
            }
        }
        for root in round.expired.iter().chain(round.reaped.iter()) {
            self.erase(root);
        }
        round
    }

    /// Drop an election and its hash index entries.
    pub fn erase(&mut self, root: &Root) {
        if let Some(election) = self.roots.remove(root) {
            for hash in election.blocks.keys() {
                self.by_hash.remove(hash);
            }
        }
    }

    pub fn election(&self, root: &Root) -> Option<&Election> {
        self.roots.get(root)
    }

    pub fn election_mut(&mut self, root: &Root) -> Option<&mut Election> {
        self.roots.get_mut(root)
    }

    pub fn root_of(&self, hash: &BlockHash) -> Option<Root> {
        self.by_hash.get(hash).copied()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn at_capacity(&self) -> bool {
        self.roots.len() >= self.max_elections
    }
}
