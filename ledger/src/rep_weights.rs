//! Cached representative weights, maintained incrementally on every head
//! change.
//!
//! Avoids scanning all accounts to compute a representative's delegated
//! weight. Rebuilt once at startup from the full account set, then kept in
//! lockstep with the persisted representation table under the same write
//! transaction that moves the balance.

use std::collections::HashMap;

use strand_types::{Account, Amount};

/// In-memory representative weight cache.
#[derive(Clone, Debug, Default)]
pub struct RepWeights {
    /// representative → total delegated balance.
    weights: HashMap<Account, u128>,
}

impl RepWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from an iterator of `(representative, balance)` pairs —
    /// one per account, taken from the accounts table.
    pub fn rebuild(delegations: impl IntoIterator<Item = (Account, Amount)>) -> Self {
        let mut cache = Self::new();
        for (representative, balance) in delegations {
            cache.add(&representative, balance);
        }
        cache
    }

    pub fn add(&mut self, representative: &Account, amount: Amount) {
        if amount.is_zero() {
            return;
        }
        let entry = self.weights.entry(*representative).or_insert(0);
        *entry = entry.saturating_add(amount.raw());
    }

    pub fn sub(&mut self, representative: &Account, amount: Amount) {
        if let Some(entry) = self.weights.get_mut(representative) {
            *entry = entry.saturating_sub(amount.raw());
            if *entry == 0 {
                self.weights.remove(representative);
            }
        }
    }

    /// A representative with no delegations weighs zero.
    pub fn weight(&self, representative: &Account) -> Amount {
        Amount::new(self.weights.get(representative).copied().unwrap_or(0))
    }

    /// Snapshot of all representatives and their weights.
    pub fn all(&self) -> HashMap<Account, Amount> {
        self.weights
            .iter()
            .map(|(rep, weight)| (*rep, Amount::new(*weight)))
            .collect()
    }

    pub fn rep_count(&self) -> usize {
        self.weights.len()
    }
}
