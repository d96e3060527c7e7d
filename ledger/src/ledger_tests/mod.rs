mod helpers;
mod process_epoch;
mod process_legacy;
mod process_state;
mod rollback_chains;
