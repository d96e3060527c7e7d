//! Bounded vote intake queue with tier-based admission.
//!
//! Under load, low-stake votes are shed first: past the soft ceiling only
//! mid-tier and principal reps are admitted, past the hard ceiling only
//! principals, and a full queue drops everything. Elections never see a
//! vote that didn't make it through here.

use std::collections::VecDeque;

use strand_types::Amount;

use crate::rep_tiers::RepTier;
use crate::vote::Vote;

/// Fraction of capacity where sub-1% reps start being shed.
const SOFT_CEILING_PCT: usize = 50;
/// Fraction of capacity where only ≥5% reps are admitted.
const HARD_CEILING_PCT: usize = 80;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmitOutcome {
    Admitted,
    /// Shed by level-based admission or dust weight.
    Shed,
    /// Queue completely full.
    Dropped,
}

pub struct VoteQueue {
    queue: VecDeque<Vote>,
    capacity: usize,
}

impl VoteQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity,
        }
    }

    /// Admit a vote given its sender's weight against online weight.
    pub fn admit(&mut self, vote: Vote, weight: Amount, online_weight: Amount) -> AdmitOutcome {
        let tier = RepTier::of(weight, online_weight);
        if tier == RepTier::None {
            return AdmitOutcome::Shed;
        }
        let len = self.queue.len();
        if len >= self.capacity {
            return AdmitOutcome::Dropped;
        }
        let minimum_tier = if len >= self.capacity * HARD_CEILING_PCT / 100 {
            RepTier::Tier3
        } else if len >= self.capacity * SOFT_CEILING_PCT / 100 {
            RepTier::Tier2
        } else {
            RepTier::Tier1
        };
        if tier < minimum_tier {
            return AdmitOutcome::Shed;
        }
        self.queue.push_back(vote);
        AdmitOutcome::Admitted
    }

    pub fn pop(&mut self) -> Option<Vote> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
