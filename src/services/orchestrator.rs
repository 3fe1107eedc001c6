//! Keeps the quote draft, its distance-lookup status and the instant
//! estimate in sync.
//!
//! The orchestrator is a plain state machine driven from one thread. Input
//! edits return an optional [`ResolutionJob`]; the caller runs it wherever
//! it likes and hands the [`ResolutionOutcome`] back to
//! [`EstimateOrchestrator::apply`]. Each job carries a ticket and a
//! cancellation token. A newer ZIP pair cancels the older token, and an
//! outcome whose ticket is no longer current is dropped, so a stale lookup
//! can never overwrite the distance of the active pair.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{compute_estimate, EstimateBreakdown, PricingTable, QuoteDraft, ZipPair};
use crate::infra::cache::DistanceCache;
use crate::infra::geocode::{GeocodeError, GeocodeResolver};
use crate::infra::routing::{resolve_distance, RouteDistance, RouteResolver};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistanceStatus {
    #[default]
    Idle,
    Calculating,
    Done,
    Error,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistanceMode {
    #[default]
    Auto,
    Manual,
}

#[derive(Clone)]
pub struct Resolvers {
    pub geocoder: Arc<dyn GeocodeResolver>,
    pub router: Arc<dyn RouteResolver>,
}

impl Resolvers {
    pub fn new(geocoder: Arc<dyn GeocodeResolver>, router: Arc<dyn RouteResolver>) -> Self {
        Self { geocoder, router }
    }
}

#[derive(Debug)]
pub enum ResolutionFailure {
    Geocode(GeocodeError),
    Cancelled,
}

impl From<GeocodeError> for ResolutionFailure {
    fn from(err: GeocodeError) -> Self {
        ResolutionFailure::Geocode(err)
    }
}

/// Network work for one ZIP pair: both geocodes concurrently, then the route.
pub struct ResolutionJob {
    pair: ZipPair,
    ticket: u64,
    token: CancellationToken,
    resolvers: Resolvers,
}

impl ResolutionJob {
    pub fn pair(&self) -> &ZipPair {
        &self.pair
    }

    pub async fn run(self) -> ResolutionOutcome {
        let result = tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ResolutionFailure::Cancelled),
            result = resolve_pair(&self.resolvers, &self.pair) => result,
        };
        ResolutionOutcome {
            pair: self.pair,
            ticket: self.ticket,
            result,
        }
    }
}

async fn resolve_pair(
    resolvers: &Resolvers,
    pair: &ZipPair,
) -> Result<RouteDistance, ResolutionFailure> {
    let geocoder = resolvers.geocoder.as_ref();
    let (from, to) = tokio::try_join!(
        geocoder.resolve_zip(&pair.origin),
        geocoder.resolve_zip(&pair.destination),
    )?;
    Ok(resolve_distance(resolvers.router.as_ref(), from, to).await)
}

#[derive(Debug)]
pub struct ResolutionOutcome {
    pub pair: ZipPair,
    ticket: u64,
    pub result: Result<RouteDistance, ResolutionFailure>,
}

struct InFlight {
    ticket: u64,
    token: CancellationToken,
}

pub struct EstimateOrchestrator<C: DistanceCache> {
    draft: QuoteDraft,
    pricing: PricingTable,
    mode: DistanceMode,
    status: DistanceStatus,
    /// Pair the current status refers to (looked up, cached or failed).
    active_pair: Option<ZipPair>,
    /// Last pair whose distance was written into the draft this lifetime.
    last_resolved: Option<ZipPair>,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    resolvers: Resolvers,
    cache: C,
}

impl<C: DistanceCache> EstimateOrchestrator<C> {
    pub fn new(pricing: PricingTable, resolvers: Resolvers, cache: C) -> Self {
        Self {
            draft: QuoteDraft::default(),
            pricing,
            mode: DistanceMode::Auto,
            status: DistanceStatus::Idle,
            active_pair: None,
            last_resolved: None,
            in_flight: None,
            next_ticket: 0,
            resolvers,
            cache,
        }
    }

    pub fn with_mode(mut self, mode: DistanceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn draft(&self) -> &QuoteDraft {
        &self.draft
    }

    pub fn status(&self) -> DistanceStatus {
        self.status
    }

    pub fn mode(&self) -> DistanceMode {
        self.mode
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    pub fn cache_mut(&mut self) -> &mut C {
        &mut self.cache
    }

    pub fn is_resolving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Recomputed on every call; the calculation is constant time.
    pub fn estimate(&self) -> Option<EstimateBreakdown> {
        compute_estimate(&self.draft, &self.pricing)
    }

    /// Applies a form edit and returns the lookup to run, if the edit calls
    /// for one.
    pub fn update(&mut self, edit: impl FnOnce(&mut QuoteDraft)) -> Option<ResolutionJob> {
        edit(&mut self.draft);
        self.sync()
    }

    /// Manual mode leaves the distance to the user. Switching back to auto
    /// forgets the last resolved pair so the current pair is looked up again
    /// (usually straight from the cache).
    pub fn set_mode(&mut self, mode: DistanceMode) -> Option<ResolutionJob> {
        if self.mode == mode {
            return None;
        }
        self.mode = mode;
        if mode == DistanceMode::Auto {
            self.last_resolved = None;
            self.active_pair = None;
        }
        self.sync()
    }

    pub fn toggle_mode(&mut self) -> Option<ResolutionJob> {
        let next = match self.mode {
            DistanceMode::Auto => DistanceMode::Manual,
            DistanceMode::Manual => DistanceMode::Auto,
        };
        self.set_mode(next)
    }

    /// Cancels any in-flight lookup, e.g. when the view goes away.
    pub fn cancel_pending(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!(target: "orchestrator", ticket = in_flight.ticket, "cancelling lookup");
            in_flight.token.cancel();
        }
    }

    /// The view went away mid-lookup. Cancels it and forgets the pair so
    /// [`refresh`](Self::refresh) starts over when the view returns.
    pub fn detach(&mut self) {
        if self.in_flight.is_some() {
            self.cancel_pending();
            self.active_pair = None;
            self.status = DistanceStatus::Idle;
        }
    }

    /// Re-evaluates the current draft without editing it.
    pub fn refresh(&mut self) -> Option<ResolutionJob> {
        self.sync()
    }

    fn sync(&mut self) -> Option<ResolutionJob> {
        let pair = match (self.mode, self.draft.zip_pair()) {
            (DistanceMode::Auto, Some(pair)) => pair,
            _ => {
                self.cancel_pending();
                self.active_pair = None;
                self.status = DistanceStatus::Idle;
                return None;
            }
        };

        if self.active_pair.as_ref() == Some(&pair) {
            return None;
        }

        self.cancel_pending();
        self.active_pair = Some(pair.clone());

        if self.last_resolved.as_ref() == Some(&pair) {
            self.status = DistanceStatus::Done;
            return None;
        }

        self.status = DistanceStatus::Calculating;
        if let Some(miles) = self.cache.get(&pair) {
            debug!(target: "orchestrator", %pair, miles, "distance served from cache");
            self.fill_distance(pair, miles);
            return None;
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let token = CancellationToken::new();
        self.in_flight = Some(InFlight {
            ticket,
            token: token.clone(),
        });
        debug!(target: "orchestrator", %pair, ticket, "starting distance lookup");

        Some(ResolutionJob {
            pair,
            ticket,
            token,
            resolvers: self.resolvers.clone(),
        })
    }

    /// Commits a finished lookup. Returns `false` when the outcome belongs to
    /// a pair that is no longer active and was discarded.
    pub fn apply(&mut self, outcome: ResolutionOutcome) -> bool {
        let current = matches!(
            &self.in_flight,
            Some(in_flight) if in_flight.ticket == outcome.ticket && !in_flight.token.is_cancelled()
        );
        if !current {
            debug!(target: "orchestrator", pair = %outcome.pair, "discarding stale lookup");
            return false;
        }
        self.in_flight = None;

        match outcome.result {
            Ok(distance) => {
                info!(
                    target: "orchestrator",
                    pair = %outcome.pair,
                    miles = distance.miles,
                    source = ?distance.source,
                    "distance resolved"
                );
                self.cache.put(&outcome.pair, distance.miles);
                self.fill_distance(outcome.pair, distance.miles);
                true
            }
            Err(ResolutionFailure::Geocode(err)) => {
                warn!(target: "orchestrator", pair = %outcome.pair, error = %err, "ZIP lookup failed");
                self.status = DistanceStatus::Error;
                true
            }
            Err(ResolutionFailure::Cancelled) => false,
        }
    }

    fn fill_distance(&mut self, pair: ZipPair, miles: u32) {
        self.draft.distance_miles = miles.to_string();
        self.last_resolved = Some(pair);
        self.status = DistanceStatus::Done;
    }
}

impl<C: DistanceCache> Drop for EstimateOrchestrator<C> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
