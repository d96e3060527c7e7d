//! Election state machine — one per contended chain root.
//!
//! Tracks every candidate block for the slot and the most recent vote from
//! each representative. A candidate confirms when its lead over the
//! runner-up exceeds the quorum delta (a fixed fraction of online weight)
//! and the total tally clears the online minimum.

use std::collections::HashMap;

use strand_types::{Account, Amount, Block, BlockHash, Root, Timestamp};

/// Quorum delta: 67% of online weight, in basis points.
const QUORUM_BPS: u128 = 6700;
const BPS_DENOMINATOR: u128 = 10_000;

/// The latest tallied vote from one representative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteInfo {
    pub time: Timestamp,
    pub sequence: u64,
    pub hash: BlockHash,
}

/// Outcome of feeding one vote into an election.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Recorded and tallied.
    Processed,
    /// Not newer than the tallied vote — the sender may be behind; callers
    /// use this to rebroadcast our own highest known vote.
    Replay,
    /// Dropped (stopped election, dust-weight rep, or cooldown).
    Ignored,
}

/// Summary of a confirmed election.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElectionStatus {
    pub winner: BlockHash,
    pub tally: Amount,
    pub duration_ms: u64,
}

/// What a re-tally produced: possibly a forced winner switch (the ledger
/// must roll back and re-apply), possibly confirmation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TallyOutcome {
    pub switched_from: Option<BlockHash>,
    pub confirmed: Option<ElectionStatus>,
}

/// A single election over one chain slot.
#[derive(Clone, Debug)]
pub struct Election {
    pub root: Root,
    /// The candidate currently installed in the ledger for this slot.
    pub winner: BlockHash,
    /// Every candidate seen for this slot, by hash.
    pub blocks: HashMap<BlockHash, Block>,
    /// Latest vote per representative.
    pub last_votes: HashMap<Account, VoteInfo>,
    /// Announcement rounds since creation.
    pub announcements: u32,
    pub confirmed: bool,
    pub stopped: bool,
    pub start_time: Timestamp,
}

impl Election {
    /// Create an election seeded with the block currently occupying the
    /// slot.
    pub fn new(block: Block, now: Timestamp) -> Self {
        let hash = block.hash();
        let root = block.root();
        let mut blocks = HashMap::new();
        blocks.insert(hash, block);
        Self {
            root,
            winner: hash,
            blocks,
            last_votes: HashMap::new(),
            announcements: 0,
            confirmed: false,
            stopped: false,
            start_time: now,
        }
    }

    /// Add a contending candidate. Returns false if it was already known.
    pub fn add_candidate(&mut self, block: Block) -> bool {
        let hash = block.hash();
        self.blocks.insert(hash, block).is_none()
    }

    /// Ingest one (representative, sequence, hash) vote.
    ///
    /// Replacement rules: strictly greater sequence wins; an equal sequence
    /// only wins with a lexicographically smaller hash (a deterministic
    /// tie-break both sides agree on). Replacement is additionally gated by
    /// the representative's cooldown, scaled to its weight tier.
    pub fn vote(
        &mut self,
        voter: &Account,
        sequence: u64,
        hash: BlockHash,
        now: Timestamp,
        cooldown_secs: u64,
    ) -> VoteOutcome {
        if self.stopped {
            return VoteOutcome::Ignored;
        }
        match self.last_votes.get(voter) {
            Some(last) => {
                let newer = sequence > last.sequence
                    || (sequence == last.sequence && hash < last.hash);
                if !newer {
                    return VoteOutcome::Replay;
                }
                if last.time.elapsed_since(now) < cooldown_secs {
                    return VoteOutcome::Ignored;
                }
            }
            None => {}
        }
        self.last_votes.insert(
            *voter,
            VoteInfo {
                time: now,
                sequence,
                hash,
            },
        );
        VoteOutcome::Processed
    }

    /// Per-candidate sums of the latest votes, heaviest first.
    pub fn tally(&self, weight_of: &dyn Fn(&Account) -> Amount) -> Vec<(Amount, BlockHash)> {
        let mut sums: HashMap<BlockHash, u128> = HashMap::new();
        for (voter, info) in &self.last_votes {
            *sums.entry(info.hash).or_insert(0) += weight_of(voter).raw();
        }
        let mut tally: Vec<(Amount, BlockHash)> = sums
            .into_iter()
            .map(|(hash, weight)| (Amount::new(weight), hash))
            .collect();
        // Heaviest first; equal weights break on hash so ordering is stable.
        tally.sort_by(|a, b| b.cmp(a));
        tally
    }

    /// Re-tally after new votes: switch the winner if a better-supported
    /// candidate emerged, and confirm if quorum is reached.
    ///
    /// Quorum: `first − second > online_weight × 67%` AND
    /// `Σ tally ≥ online_minimum`.
    pub fn evaluate(
        &mut self,
        weight_of: &dyn Fn(&Account) -> Amount,
        online_weight: Amount,
        online_minimum: Amount,
        now: Timestamp,
    ) -> TallyOutcome {
        let mut outcome = TallyOutcome::default();
        if self.confirmed || self.stopped {
            return outcome;
        }
        let tally = self.tally(weight_of);
        let Some(&(first_weight, first_hash)) = tally.first() else {
            return outcome;
        };
        let second_weight = tally.get(1).map(|(w, _)| *w).unwrap_or(Amount::ZERO);
        let total: u128 = tally.iter().map(|(w, _)| w.raw()).sum();

        if Amount::new(total) >= online_minimum && first_hash != self.winner {
            outcome.switched_from = Some(self.winner);
            self.winner = first_hash;
        }

        let delta = online_weight.raw().saturating_mul(QUORUM_BPS) / BPS_DENOMINATOR;
        let lead = first_weight.raw().saturating_sub(second_weight.raw());
        if lead > delta && Amount::new(total) >= online_minimum {
            self.confirmed = true;
            let status = ElectionStatus {
                winner: self.winner,
                tally: first_weight,
                duration_ms: self.start_time.elapsed_since(now).saturating_mul(1000),
            };
            outcome.confirmed = Some(status);
        }
        outcome
    }

    /// Representatives whose last vote is missing or older than
    /// `stale_after_secs` — the ones worth soliciting.
    pub fn stale_voters<'a>(
        &self,
        representatives: impl IntoIterator<Item = &'a Account>,
        stale_after_secs: u64,
        now: Timestamp,
    ) -> Vec<Account> {
        representatives
            .into_iter()
            .filter(|rep| match self.last_votes.get(rep) {
                None => true,
                Some(info) => info.time.elapsed_since(now) >= stale_after_secs,
            })
            .copied()
            .collect()
    }

    pub fn winner_block(&self) -> Option<&Block> {
        self.blocks.get(&self.winner)
    }

    /// Whether this election tracks exactly one candidate — the condition
    /// for non-recursive cascade confirmation of ancestors.
    pub fn is_sole_block(&self, hash: &BlockHash) -> bool {
        self.blocks.len() == 1 && self.blocks.contains_key(hash)
    }
}
