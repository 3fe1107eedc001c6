//! Finalizes quotes: contact checks, submission, and the decision whether a
//! quote goes into the ledger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{
    compute_estimate, rate_estimate, ContactDetails, PricingTable, QuoteDraft, SavedQuote,
    ValidationError,
};
use crate::infra::submission::{QuoteSubmission, ReviewRequest, SubmissionError, SubmissionSink};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("quote rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("a manual review was already requested this session")]
    AlreadyRequested,
    #[error("review request failed: {0}")]
    Failed(#[from] SubmissionError),
}

/// A quote the caller should append to the ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalizedQuote {
    pub entry: SavedQuote,
    /// Sink reference; absent when saved offline.
    pub reference: Option<String>,
}

pub struct QuoteDesk {
    sink: Arc<dyn SubmissionSink>,
    pricing: PricingTable,
    review_requested: AtomicBool,
}

impl QuoteDesk {
    pub fn new(sink: Arc<dyn SubmissionSink>, pricing: PricingTable) -> Self {
        Self {
            sink,
            pricing,
            review_requested: AtomicBool::new(false),
        }
    }

    pub fn review_requested(&self) -> bool {
        self.review_requested.load(Ordering::SeqCst)
    }

    pub async fn save_quote(
        &self,
        draft: &QuoteDraft,
        contact: &ContactDetails,
    ) -> Result<FinalizedQuote, SaveError> {
        contact.validate_complete()?;
        let input = draft.validate()?;
        let estimate = rate_estimate(&input, &self.pricing);
        let submission =
            QuoteSubmission::new(&input, &contact.full_name, &contact.email, &draft.notes);

        match self.sink.submit_quote(&submission).await {
            Ok(receipt) => {
                info!(target: "submission", reference = ?receipt.reference, total = estimate.total, "quote saved");
                Ok(FinalizedQuote {
                    entry: SavedQuote::new(&input, &estimate, false),
                    reference: receipt.reference,
                })
            }
            Err(err) if err.is_network() => {
                warn!(target: "submission", error = %err, "sink unreachable, saving offline");
                Ok(FinalizedQuote {
                    entry: SavedQuote::new(&input, &estimate, true),
                    reference: None,
                })
            }
            Err(err) => {
                warn!(target: "submission", error = %err, "quote rejected");
                Err(SaveError::Rejected(rejection_message(err)))
            }
        }
    }

    /// Sends the raw draft for a human to price. Only one request per
    /// session is accepted; a failed attempt does not use it up.
    pub async fn request_review(
        &self,
        draft: &QuoteDraft,
        contact: &ContactDetails,
    ) -> Result<Option<String>, ReviewError> {
        contact.validate_complete()?;
        if self.review_requested.swap(true, Ordering::SeqCst) {
            return Err(ReviewError::AlreadyRequested);
        }

        let estimate = compute_estimate(draft, &self.pricing);
        let request = ReviewRequest::new(draft, contact, estimate);
        match self.sink.request_review(&request).await {
            Ok(receipt) => {
                info!(target: "submission", reference = ?receipt.reference, "manual review requested");
                Ok(receipt.reference)
            }
            Err(err) => {
                self.review_requested.store(false, Ordering::SeqCst);
                warn!(target: "submission", error = %err, "manual review request failed");
                Err(ReviewError::Failed(err))
            }
        }
    }
}

fn rejection_message(err: SubmissionError) -> String {
    match err {
        SubmissionError::Rejected(message) => message,
        other => other.to_string(),
    }
}
