use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{BrewRequest, ScoreResult, SCORE_PATH};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ScoringError;

/// Something that turns a recipe into a score.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn evaluate(&self, request: &BrewRequest) -> Result<ScoreResult, ScoringError>;
}

/// HTTP client for `POST /api/score`.
///
/// Sends exactly one request per call: no retry, no caching, no timeout.
#[derive(Clone)]
pub struct ScoringClient {
    http: Client,
    endpoint: Url,
}

impl ScoringClient {
    pub fn new(server_url: &str) -> Result<Self, ScoringError> {
        Self::with_http_client(Client::new(), server_url)
    }

    pub fn with_http_client(http: Client, server_url: &str) -> Result<Self, ScoringError> {
        let endpoint = Url::parse(server_url)
            .and_then(|base| base.join(SCORE_PATH))
            .map_err(|source| ScoringError::Endpoint {
                url: server_url.to_string(),
                source,
            })?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Scorer for ScoringClient {
    async fn evaluate(&self, request: &BrewRequest) -> Result<ScoreResult, ScoringError> {
        debug!(endpoint = %self.endpoint, method = %request.method, "sending recipe for scoring");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(ScoringError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %status, "scoring service rejected recipe");
            return Err(ScoringError::Status(status));
        }

        let body = response.bytes().await.map_err(ScoringError::Transport)?;
        let result: ScoreResult = serde_json::from_slice(&body).map_err(ScoringError::Parse)?;
        info!(
            method = %request.method,
            total_score = result.total_score,
            feedback = result.feedback.len(),
            "recipe scored"
        );
        Ok(result)
    }
}
