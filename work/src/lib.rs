//! Anti-spam proof-of-work over block roots.
//!
//! The ledger treats work as a black-box predicate: a nonce is valid for a
//! block when the Blake2b digest of `root ‖ nonce` clears the network's
//! difficulty threshold for that block kind. Validation happens before the
//! ledger processor runs; generation is only needed by tests and the CLI.

pub mod generator;
pub mod thresholds;
pub mod validator;

pub use generator::{WorkError, WorkGenerator, WorkNonce};
pub use thresholds::{WorkBlockKind, WorkThresholds};
pub use validator::{validate_work, work_value};
