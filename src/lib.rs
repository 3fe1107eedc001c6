//! Instant freight quotes: tiered pricing, ZIP-to-ZIP distance lookup with a
//! geometric fallback, a two-tier distance cache and a local ledger of
//! saved quotes.

pub mod domain;
pub mod infra;
pub mod services;
pub mod util;
