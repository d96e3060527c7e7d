//! Database schema migration engine.
//!
//! Tracks a monotonically increasing schema version in the version table
//! and runs sequential migration steps to bring an older database up to
//! date, each step inside its own write transaction. A dated file backup is
//! taken before any destructive step. Databases older than the minimum
//! supported version and databases written by newer code are both refused.

use crate::environment::LedgerStore;
use crate::error::StoreError;
use crate::maintenance::snapshot;

/// Oldest schema this code can still upgrade from.
pub const MINIMUM_SCHEMA_VERSION: u32 = 1;
/// The schema version the current code expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Runs database migrations to bring the schema up to date.
pub struct Migrator;

impl Migrator {
    pub fn run(store: &LedgerStore) -> Result<(), StoreError> {
        let current = {
            let rtxn = store.read_txn()?;
            store.meta().schema_version(&rtxn)?
        };

        if current == CURRENT_SCHEMA_VERSION {
            tracing::debug!(version = current, "database schema is up to date");
            return Ok(());
        }

        if current == 0 {
            // Fresh database — stamp the current version and return.
            let mut wtxn = store.write_txn()?;
            store
                .meta()
                .set_schema_version(&mut wtxn, CURRENT_SCHEMA_VERSION)?;
            wtxn.commit()?;
            return Ok(());
        }

        if current > CURRENT_SCHEMA_VERSION {
            return Err(StoreError::VersionTooNew {
                found: current,
                current: CURRENT_SCHEMA_VERSION,
            });
        }

        if current < MINIMUM_SCHEMA_VERSION {
            return Err(StoreError::VersionTooOld {
                found: current,
                minimum: MINIMUM_SCHEMA_VERSION,
            });
        }

        for version in current..CURRENT_SCHEMA_VERSION {
            tracing::info!(from = version, to = version + 1, "running migration");
            run_step(store, version, version + 1)?;
        }

        tracing::info!(version = CURRENT_SCHEMA_VERSION, "migration complete");
        Ok(())
    }
}

fn run_step(store: &LedgerStore, from: u32, to: u32) -> Result<(), StoreError> {
    match (from, to) {
        (1, 2) => {
            // Schema v2 drops per-account unchecked buckets in favour of the
            // (dependency ‖ block_hash) composite key. Old entries are
            // correctable state, so the step simply clears the table — but a
            // backup is taken first since data is discarded.
            let backup = snapshot(store)?;
            tracing::info!(backup = %backup.display(), "backup taken before destructive step");
            let mut wtxn = store.write_txn()?;
            store.unchecked().clear(&mut wtxn)?;
            store.meta().set_schema_version(&mut wtxn, to)?;
            wtxn.commit()?;
            Ok(())
        }
        _ => Err(StoreError::NotFound("unknown migration step")),
    }
}
