use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{
    domain::EntryId,
    protocol::{BrewRequest, HistoryEntry, ScoreResult},
};
use storage::HistoryStore;
use tracing::{error, info, warn};

use crate::{error::SessionError, form::RecipeForm, scoring::Scorer};

/// Draws whatever the controller hands over. Data only flows one way.
pub trait ResultRenderer: Send + Sync {
    fn render_result(&self, request: &BrewRequest, result: &ScoreResult);
    fn render_history(&self, entries: &[HistoryEntry]);
    fn show_error(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Submitting,
    Rendered { entry_id: EntryId },
    ErrorShown { message: String },
}

impl SessionPhase {
    pub fn accepts_submit(&self) -> bool {
        !matches!(self, SessionPhase::Submitting)
    }
}

/// Drives one submit cycle: validate, score, record, render.
///
/// A submit that arrives while another is still being scored is refused with
/// [`SessionError::Busy`] and changes nothing.
pub struct SessionController {
    scorer: Arc<dyn Scorer>,
    history: HistoryStore,
    renderer: Arc<dyn ResultRenderer>,
    phase: Mutex<SessionPhase>,
}

impl SessionController {
    pub fn new(
        scorer: Arc<dyn Scorer>,
        history: HistoryStore,
        renderer: Arc<dyn ResultRenderer>,
    ) -> Self {
        Self {
            scorer,
            history,
            renderer,
            phase: Mutex::new(SessionPhase::Idle),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock_phase().clone()
    }

    /// A submit future dropped before completion puts the controller back to
    /// [`SessionPhase::Idle`].
    pub async fn submit(&self, form: &RecipeForm) -> Result<HistoryEntry, SessionError> {
        let request = {
            let mut phase = self.lock_phase();
            if !phase.accepts_submit() {
                warn!(method = %form.method, "submit ignored while another recipe is being scored");
                return Err(SessionError::Busy);
            }
            match form.to_request() {
                Ok(request) => {
                    *phase = SessionPhase::Submitting;
                    request
                }
                Err(err) => {
                    let err = SessionError::from(err);
                    *phase = self.fail(&err);
                    return Err(err);
                }
            }
        };

        let in_flight = InFlight::new(&self.phase);
        let outcome = self.score_and_record(request).await;

        let mut phase = in_flight.finish();
        match outcome {
            Ok((request, entry)) => {
                *phase = SessionPhase::Rendered { entry_id: entry.id };
                drop(phase);
                self.renderer.render_result(&request, &entry.result);
                Ok(entry)
            }
            Err(err) => {
                *phase = self.fail(&err);
                Err(err)
            }
        }
    }

    /// Leaves the result or error view.
    pub fn back(&self) {
        let mut phase = self.lock_phase();
        if phase.accepts_submit() {
            *phase = SessionPhase::Idle;
        }
    }

    pub async fn show_history(&self) -> Result<Vec<HistoryEntry>, SessionError> {
        let entries = self.history.list().await.map_err(SessionError::History)?;
        self.renderer.render_history(&entries);
        Ok(entries)
    }

    pub async fn clear_history(&self) -> Result<(), SessionError> {
        self.history.clear().await.map_err(SessionError::History)?;
        self.renderer.render_history(&[]);
        Ok(())
    }

    fn lock_phase(&self) -> MutexGuard<'_, SessionPhase> {
        lock_phase(&self.phase)
    }

    async fn score_and_record(
        &self,
        request: BrewRequest,
    ) -> Result<(BrewRequest, HistoryEntry), SessionError> {
        let result = self.scorer.evaluate(&request).await?;
        let entry = self
            .history
            .append(request.clone(), result)
            .await
            .map_err(SessionError::History)?;
        info!(entry_id = %entry.id, total_score = entry.result.total_score, "submission recorded");
        Ok((request, entry))
    }

    fn fail(&self, err: &SessionError) -> SessionPhase {
        match err {
            SessionError::Validation(_) | SessionError::Busy => {
                warn!(error = %err, "submission refused")
            }
            _ => error!(error = %err, "submission failed"),
        }
        let message = err.user_message();
        self.renderer.show_error(&message);
        SessionPhase::ErrorShown { message }
    }
}

fn lock_phase(phase: &Mutex<SessionPhase>) -> MutexGuard<'_, SessionPhase> {
    phase.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the controller in `Submitting`; falls back to `Idle` if dropped
/// before [`finish`](Self::finish).
struct InFlight<'a> {
    phase: &'a Mutex<SessionPhase>,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(phase: &'a Mutex<SessionPhase>) -> Self {
        Self { phase, armed: true }
    }

    fn finish(mut self) -> MutexGuard<'a, SessionPhase> {
        self.armed = false;
        lock_phase(self.phase)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("submission abandoned before scoring finished");
            *lock_phase(self.phase) = SessionPhase::Idle;
        }
    }
}
