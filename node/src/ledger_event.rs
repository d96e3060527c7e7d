//! Events emitted after ledger commits, for subscribers.

use strand_ledger::ProcessCode;
use strand_types::{Account, BlockHash, Root};

/// Ledger-level events observers can subscribe to via the [`EventBus`].
///
/// Events fire only after the write transaction that produced them has
/// committed.
#[derive(Clone, Debug)]
pub enum LedgerEvent {
    /// A block passed validation and entered the ledger.
    BlockAdmitted {
        hash: BlockHash,
        account: Account,
    },
    /// A block was rejected with the given code.
    BlockRejected {
        hash: BlockHash,
        code: ProcessCode,
    },
    /// A block was parked in the unchecked buffer.
    BlockQueued {
        hash: BlockHash,
        dependency: BlockHash,
    },
    /// Two blocks contend for one chain slot; an election is running.
    ForkDetected {
        root: Root,
        incoming: BlockHash,
    },
    /// An election reached quorum.
    ElectionConfirmed {
        root: Root,
        winner: BlockHash,
    },
    /// A block became irreversible. Per account, these fire in strictly
    /// increasing height order.
    BlockCemented {
        hash: BlockHash,
        account: Account,
        height: u64,
    },
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the emitting thread; keep handlers fast
/// to avoid stalling block processing.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}
