//! Online weight sampling — the quorum denominator.
//!
//! A representative is online if it voted within the sampling window. Every
//! sample interval the node sums the weights of online representatives and
//! appends the sum to a bounded persisted series; the effective online
//! weight is the median of that series with the configured minimum mixed
//! in, so a brief connectivity dip can't collapse the quorum.

use std::collections::HashMap;

use strand_types::{Account, Amount};

/// Default sampling window: reps voting within the last 5 minutes count.
pub const DEFAULT_WINDOW_SECS: u64 = 300;
/// Bounded length of the persisted sample series (two weeks of hourly
/// samples).
pub const MAX_SAMPLES: usize = 336;

pub struct OnlineWeightSampler {
    /// Representative → timestamp of their most recent vote.
    recent_voters: HashMap<Account, u64>,
    window_secs: u64,
    /// Floor mixed into every median calculation.
    minimum: Amount,
}

impl OnlineWeightSampler {
    pub fn new(window_secs: u64, minimum: Amount) -> Self {
        Self {
            recent_voters: HashMap::new(),
            window_secs,
            minimum,
        }
    }

    /// Record that a representative cast a vote at the given timestamp.
    pub fn observe(&mut self, rep: &Account, timestamp: u64) {
        let entry = self.recent_voters.entry(*rep).or_insert(0);
        if timestamp > *entry {
            *entry = timestamp;
        }
    }

    /// Representatives that voted within the window.
    pub fn online_representatives(&self, now: u64) -> Vec<Account> {
        let cutoff = now.saturating_sub(self.window_secs);
        self.recent_voters
            .iter()
            .filter(|(_, &last_vote)| last_vote >= cutoff)
            .map(|(account, _)| *account)
            .collect()
    }

    /// One sample: the summed weight of currently-online representatives.
    pub fn sample(&self, now: u64, weights: &HashMap<Account, Amount>) -> Amount {
        let cutoff = now.saturating_sub(self.window_secs);
        let total = self
            .recent_voters
            .iter()
            .filter(|(_, &last_vote)| last_vote >= cutoff)
            .map(|(account, _)| weights.get(account).map(|w| w.raw()).unwrap_or(0))
            .sum();
        Amount::new(total)
    }

    /// The effective online weight: median over the sample series with the
    /// configured minimum included as one sample.
    pub fn online_weight(&self, series: &[Amount]) -> Amount {
        let mut samples: Vec<u128> = series.iter().map(|a| a.raw()).collect();
        samples.push(self.minimum.raw());
        samples.sort_unstable();
        Amount::new(samples[samples.len() / 2])
    }

    pub fn minimum(&self) -> Amount {
        self.minimum
    }

    /// Drop representatives that fell out of the window.
    pub fn prune(&mut self, now: u64) {
        let cutoff = now.saturating_sub(self.window_secs);
        self.recent_voters
            .retain(|_, &mut last_vote| last_vote >= cutoff);
    }

    pub fn tracked_count(&self) -> usize {
        self.recent_voters.len()
    }
}
