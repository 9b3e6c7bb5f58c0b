#![doc(test(attr(deny(warnings))))]

//! Sales Core offers the date-indexed product ledger, per-day totals, and CSV
//! export primitives that power the sales-tracking CLI.

pub mod cli;
pub mod config;
pub mod currency;
pub mod errors;
pub mod export;
pub mod input;
pub mod ledger;
pub mod session;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Sales Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
