//! Representative tiers by share of online weight.
//!
//! Votes from heavier representatives settle elections faster and are worth
//! re-tallying more often; dust-weight reps are dropped outright. The same
//! partition drives vote-queue admission under load, shedding minor reps
//! first.

use strand_types::Amount;

/// Basis-point thresholds over online weight.
const TIER_1_BPS: u128 = 10; // 0.1%
const TIER_2_BPS: u128 = 100; // 1%
const TIER_3_BPS: u128 = 500; // 5%
const BPS_DENOMINATOR: u128 = 10_000;

/// A representative's standing relative to the online voting weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RepTier {
    /// Below 0.1% — votes are dropped.
    None,
    /// 0.1% – 1%.
    Tier1,
    /// 1% – 5%.
    Tier2,
    /// 5% and above.
    Tier3,
}

impl RepTier {
    pub fn of(weight: Amount, online_weight: Amount) -> Self {
        if online_weight.is_zero() {
            return Self::None;
        }
        let bps = weight
            .raw()
            .saturating_mul(BPS_DENOMINATOR)
            .checked_div(online_weight.raw())
            .unwrap_or(0);
        if bps >= TIER_3_BPS {
            Self::Tier3
        } else if bps >= TIER_2_BPS {
            Self::Tier2
        } else if bps >= TIER_1_BPS {
            Self::Tier1
        } else {
            Self::None
        }
    }

    /// Minimum seconds between tallied re-votes from this tier, or `None`
    /// when the tier doesn't vote at all.
    pub fn cooldown_secs(&self) -> Option<u64> {
        match self {
            Self::None => None,
            Self::Tier1 => Some(15),
            Self::Tier2 => Some(5),
            Self::Tier3 => Some(1),
        }
    }
}
