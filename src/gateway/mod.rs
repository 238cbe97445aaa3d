//! Submission gateway — delivers a completed trip record to the intake service.
//!
//! A gateway makes a single attempt per call and never retries. Every failure
//! cause (bad status, transport error, unreadable body) collapses into
//! [`SubmissionOutcome::Failure`]; callers never see a raw error.

pub mod payload;
pub mod simulated;
pub mod webhook;

pub use payload::{IntakePayload, Traveler, TripDetails};
pub use simulated::SimulatedGateway;
pub use webhook::WebhookGateway;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::IntakeConfig;
use crate::error::GatewayError;

/// Which way a submission went, without the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Failure,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success { server_message: Option<String> },
    Failure { reason: String },
}

impl SubmissionOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success { .. } => OutcomeKind::Success,
            Self::Failure { .. } => OutcomeKind::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<Result<Option<String>, GatewayError>> for SubmissionOutcome {
    fn from(result: Result<Option<String>, GatewayError>) -> Self {
        match result {
            Ok(server_message) => Self::Success { server_message },
            Err(e) => Self::Failure {
                reason: e.to_string(),
            },
        }
    }
}

/// Sends an assembled trip record to the intake service.
///
/// The payload is a read-only snapshot; gateways never see engine state.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Submit once. Resolves exactly one outcome.
    async fn submit(&self, payload: &IntakePayload) -> SubmissionOutcome;
}

/// Build the gateway the configuration asks for: the webhook when a URL is
/// set, the simulated gateway otherwise.
pub fn create_gateway(config: &IntakeConfig) -> Arc<dyn SubmissionGateway> {
    match &config.webhook_url {
        Some(url) => Arc::new(WebhookGateway::new(url.clone(), config.timeout)),
        None => Arc::new(SimulatedGateway::new(
            config.simulated_delay,
            config.simulated_outcome,
        )),
    }
}
