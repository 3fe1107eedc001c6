//! Adapters for everything outside the process: HTTP services and durable
//! storage.

pub mod cache;
pub mod geocode;
pub mod routing;
pub mod storage;
pub mod submission;

pub use cache::{DistanceCache, TieredDistanceCache};
pub use geocode::{GeocodeError, GeocodeResolver, ZippopotamClient};
pub use routing::{resolve_distance, DistanceSource, OsrmClient, RouteDistance, RouteError, RouteResolver};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use submission::{
    HttpSubmissionSink, LoopbackSink, QuoteSubmission, ReviewRequest, SubmissionError,
    SubmissionReceipt, SubmissionSink,
};
