#![doc(test(attr(deny(warnings))))]

//! Fintrack Core offers the ledger, recurring-transaction, and reporting
//! primitives that power a personal finance tracker's outer surfaces.

pub mod errors;
pub mod ledger;
pub mod services;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Fintrack Core tracing initialized.");
    });
}
