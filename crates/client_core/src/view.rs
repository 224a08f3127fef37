//! Plain data handed to whatever draws the results.

use std::time::Duration;

use shared::protocol::{HistoryEntry, ScoreResult};

use crate::form::{format_number, RecipeForm};

const REVEAL_DURATION: Duration = Duration::from_millis(1500);
const REVEAL_STEPS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Excellent,
    Good,
    NeedsWork,
}

impl ScoreTier {
    pub fn for_score(total_score: f64) -> Self {
        if total_score >= 90.0 {
            ScoreTier::Excellent
        } else if total_score >= 80.0 {
            ScoreTier::Good
        } else {
            ScoreTier::NeedsWork
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: &'static str,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub total_score: f64,
    pub tier: ScoreTier,
    /// Set for near-perfect brews.
    pub highlight: bool,
    pub ratio_label: String,
    pub ideal_ratio: String,
    pub ideal_temp: String,
    pub ideal_time: String,
    pub score_bars: Vec<Bar>,
    pub flavor_bars: Vec<Bar>,
    pub feedback: Vec<String>,
}

impl ResultView {
    pub fn from_result(result: &ScoreResult) -> Self {
        let score_bars = vec![
            Bar {
                label: "ratio",
                percent: result.ratio_percent(),
            },
            Bar {
                label: "temperature",
                percent: result.temp_percent(),
            },
            Bar {
                label: "time",
                percent: result.time_percent(),
            },
        ];
        let flavor_bars = result
            .flavor
            .axes()
            .into_iter()
            .map(|(label, value)| Bar {
                label,
                percent: value * 10.0,
            })
            .collect();

        Self {
            total_score: result.total_score,
            tier: ScoreTier::for_score(result.total_score),
            highlight: result.total_score >= 95.0,
            ratio_label: format!("1:{:.1}", finite_or_zero(result.calculated_ratio)),
            ideal_ratio: result.ideal_ratio.clone(),
            ideal_temp: result.ideal_temp.clone(),
            ideal_time: result.ideal_time.clone(),
            score_bars,
            flavor_bars,
            feedback: result.feedback.clone(),
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Count-up of the total score in fixed steps, ending exactly on the target.
#[derive(Debug, Clone)]
pub struct ScoreReveal {
    target: f64,
    increment: f64,
    current: f64,
    done: bool,
}

impl ScoreReveal {
    pub fn new(target: f64) -> Self {
        let target = finite_or_zero(target);
        Self {
            target,
            increment: target / f64::from(REVEAL_STEPS),
            current: 0.0,
            done: false,
        }
    }

    pub fn step_interval() -> Duration {
        REVEAL_DURATION / REVEAL_STEPS
    }
}

impl Iterator for ScoreReveal {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.done {
            return None;
        }
        self.current += self.increment;
        if self.current >= self.target {
            self.current = self.target;
            self.done = true;
        }
        Some(self.current.round() as i64)
    }
}

/// Recipe summary placed on the clipboard.
pub fn share_text(form: &RecipeForm, score: &str) -> String {
    format!(
        "Celestial Brew Recipe ☕✨\nMethod: {}\nCoffee: {}g\nWater: {}g\nTemp: {}°C\nTime: {}s\nScore: {}/100",
        form.method.label(),
        form.coffee_dose.trim(),
        form.water_yield.trim(),
        form.temperature.trim(),
        form.brew_time.trim(),
        score,
    )
}

pub fn history_line(entry: &HistoryEntry) -> String {
    format!(
        "{:<12} {}  • {}g / {}g  {:>3}",
        entry.recipe.method.label(),
        entry.date.format("%-d %b %H:%M"),
        format_number(entry.recipe.coffee_dose),
        format_number(entry.recipe.water_yield),
        entry.result.total_score.round() as i64,
    )
}

/// Shown when the history is empty.
pub const EMPTY_HISTORY_TEXT: &str = "No brews recorded yet.";
