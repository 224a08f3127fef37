//! Client side of the brew scorer: recipe form, scoring client, submit cycle,
//! brew history access and the small brewing utilities around them.

pub mod error;
pub mod form;
pub mod ratio;
pub mod scoring;
pub mod session;
pub mod timer;
pub mod view;

pub use error::{ScoringError, SessionError};
pub use form::RecipeForm;
pub use ratio::RatioCalculator;
pub use scoring::{Scorer, ScoringClient};
pub use session::{ResultRenderer, SessionController, SessionPhase};
pub use timer::{PeriodicTask, Stopwatch, StopwatchStatus};
pub use view::{ResultView, ScoreReveal, ScoreTier};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod session_tests;
