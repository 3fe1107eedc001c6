//! Stateful coordinators that sit between the UI and the adapters.

pub mod engine;
pub mod ledger;
pub mod orchestrator;
pub mod quote_desk;

pub use engine::{Engine, EngineError, QuoteOrchestrator};
pub use ledger::{SavedQuoteLedger, MAX_SAVED_QUOTES};
pub use orchestrator::{
    DistanceMode, DistanceStatus, EstimateOrchestrator, Resolvers, ResolutionJob,
    ResolutionOutcome,
};
pub use quote_desk::{FinalizedQuote, QuoteDesk, ReviewError, SaveError};
