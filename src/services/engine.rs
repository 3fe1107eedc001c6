//! Wires settings into concrete adapters.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::infra::cache::TieredDistanceCache;
use crate::infra::geocode::{GeocodeError, ZippopotamClient};
use crate::infra::routing::{OsrmClient, RouteError};
use crate::infra::storage::{default_data_dir, FileStore, KeyValueStore, MemoryStore};
use crate::infra::submission::{HttpSubmissionSink, LoopbackSink, SubmissionError, SubmissionSink};
use crate::services::ledger::SavedQuoteLedger;
use crate::services::orchestrator::{DistanceMode, EstimateOrchestrator, Resolvers};
use crate::services::quote_desk::QuoteDesk;
use crate::util::settings::Settings;

pub type QuoteOrchestrator = EstimateOrchestrator<TieredDistanceCache>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("geocoder setup failed: {0}")]
    Geocode(#[from] GeocodeError),
    #[error("router setup failed: {0}")]
    Route(#[from] RouteError),
    #[error("submission setup failed: {0}")]
    Submission(#[from] SubmissionError),
}

#[derive(Clone)]
pub struct Engine {
    pub settings: Settings,
    pub store: Arc<dyn KeyValueStore>,
    pub resolvers: Resolvers,
    pub desk: Arc<QuoteDesk>,
}

impl Engine {
    pub fn from_settings(settings: Settings) -> Result<Self, EngineError> {
        let store = open_store(&settings);
        Self::with_store(settings, store)
    }

    pub fn with_store(settings: Settings, store: Arc<dyn KeyValueStore>) -> Result<Self, EngineError> {
        let geocoder = ZippopotamClient::with_base_url(&settings.geocode_base_url)?;
        let router = OsrmClient::with_base_url(&settings.routing_base_url)?;
        let sink: Arc<dyn SubmissionSink> = match settings.submission_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Arc::new(HttpSubmissionSink::new(url.trim())?),
            _ => {
                info!("no submission endpoint configured, recording quotes locally");
                Arc::new(LoopbackSink)
            }
        };

        Ok(Self {
            resolvers: Resolvers::new(Arc::new(geocoder), Arc::new(router)),
            desk: Arc::new(QuoteDesk::new(sink, settings.pricing.clone())),
            store,
            settings,
        })
    }

    pub fn orchestrator(&self) -> QuoteOrchestrator {
        let mode = if self.settings.auto_distance {
            DistanceMode::Auto
        } else {
            DistanceMode::Manual
        };
        EstimateOrchestrator::new(
            self.settings.pricing.clone(),
            self.resolvers.clone(),
            TieredDistanceCache::new(self.store.clone()),
        )
        .with_mode(mode)
    }

    pub fn ledger(&self) -> SavedQuoteLedger {
        SavedQuoteLedger::load(self.store.clone())
    }
}

fn open_store(settings: &Settings) -> Arc<dyn KeyValueStore> {
    match settings.data_dir.clone().or_else(default_data_dir) {
        Some(root) => {
            info!(target: "storage", root = %root.display(), "using file storage");
            Arc::new(FileStore::new(root))
        }
        None => {
            warn!(target: "storage", "no data directory available, nothing will persist");
            Arc::new(MemoryStore::new())
        }
    }
}
