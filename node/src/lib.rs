//! The strand node core.
//!
//! Wires the ledger state machine, the active-elections engine and the
//! confirmation-height processor together: arriving blocks run through the
//! block processor under the write queue, successful admissions notify
//! observers and release unchecked dependents, forks start elections, and
//! quorum hands winners to the cementation path.

pub mod block_processor;
pub mod config;
pub mod confirmation_height;
pub mod error;
pub mod ledger_event;
pub mod logging;
pub mod node;
pub mod unchecked;
pub mod write_queue;

pub use block_processor::{BlockProcessor, BlockStatus, BlockSource};
pub use config::NodeConfig;
pub use confirmation_height::ConfirmationHeightProcessor;
pub use error::NodeError;
pub use ledger_event::{EventBus, LedgerEvent};
pub use logging::init_logging;
pub use node::Node;
pub use unchecked::UncheckedMap;
pub use write_queue::{WriteQueue, Writer};
