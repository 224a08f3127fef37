use reqwest::StatusCode;
use shared::error::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("invalid scoring service url '{url}': {source}")]
    Endpoint {
        url: String,
        source: url::ParseError,
    },
    #[error("scoring request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("scoring service responded with status {0}")]
    Status(StatusCode),
    #[error("scoring response could not be decoded: {0}")]
    Parse(#[source] serde_json::Error),
}

impl ScoringError {
    /// Transport failures and non-success statuses.
    pub fn is_network(&self) -> bool {
        matches!(self, ScoringError::Transport(_) | ScoringError::Status(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, ScoringError::Parse(_))
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a recipe is already being scored")]
    Busy,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("brew history unavailable: {0:#}")]
    History(#[source] anyhow::Error),
}

impl SessionError {
    /// Whether the controller already passed this error to the renderer.
    /// Only a refused concurrent submit is left to the caller.
    pub fn is_reported(&self) -> bool {
        !matches!(self, SessionError::Busy)
    }

    /// Text shown to the user when a submission fails.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Busy => "Still scoring the previous recipe; please wait.".to_string(),
            SessionError::Validation(err) => format!("Check the recipe: {err}."),
            SessionError::Scoring(_) => {
                "Something went wrong while scoring the recipe. Make sure the server is running."
                    .to_string()
            }
            SessionError::History(_) => {
                "Brew history could not be read or saved.".to_string()
            }
        }
    }
}
