//! Terminal drawing of results, history and errors.

use std::io::{self, Write};

use client_core::{
    view::{history_line, Bar, EMPTY_HISTORY_TEXT},
    ResultRenderer, ResultView, ScoreReveal, ScoreTier,
};
use shared::protocol::{BrewRequest, HistoryEntry, ScoreResult};
use tokio::time;

const BAR_WIDTH: usize = 20;

pub struct TerminalRenderer {
    /// When set, the caller animates the total score with [`reveal_score`].
    pub animate: bool,
}

impl ResultRenderer for TerminalRenderer {
    fn render_result(&self, request: &BrewRequest, result: &ScoreResult) {
        let view = ResultView::from_result(result);
        let mut out = io::stdout().lock();

        let _ = writeln!(out, "{} recipe scored", request.method.label());
        let _ = writeln!(out, "  ratio      {}", view.ratio_label);
        let _ = writeln!(out, "  ideal      ratio {}", view.ideal_ratio);
        let _ = writeln!(out, "             temp  {}", view.ideal_temp);
        let _ = writeln!(out, "             time  {}", view.ideal_time);
        let _ = writeln!(out);
        for bar in &view.score_bars {
            let _ = writeln!(out, "  {}", draw_bar(bar));
        }
        let _ = writeln!(out);
        for bar in &view.flavor_bars {
            let _ = writeln!(out, "  {}", draw_bar(bar));
        }
        if !view.feedback.is_empty() {
            let _ = writeln!(out);
            for line in &view.feedback {
                let _ = writeln!(out, "  - {line}");
            }
        }
        let _ = writeln!(out);
        if !self.animate {
            let _ = writeln!(out, "{}", score_line(&view, view.total_score.round() as i64));
        }
    }

    fn render_history(&self, entries: &[HistoryEntry]) {
        let mut out = io::stdout().lock();
        if entries.is_empty() {
            let _ = writeln!(out, "{EMPTY_HISTORY_TEXT}");
            return;
        }
        for entry in entries {
            let _ = writeln!(out, "{}", history_line(entry));
        }
    }

    fn show_error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

/// Counts the score line up to the result's total.
pub async fn reveal_score(result: &ScoreResult) {
    let view = ResultView::from_result(result);
    let mut interval = time::interval(ScoreReveal::step_interval());
    for frame in ScoreReveal::new(view.total_score) {
        interval.tick().await;
        print!("\r{}", score_line(&view, frame));
        let _ = io::stdout().flush();
    }
    println!();
}

fn score_line(view: &ResultView, shown: i64) -> String {
    let verdict = match view.tier {
        ScoreTier::Excellent => "excellent",
        ScoreTier::Good => "good",
        ScoreTier::NeedsWork => "needs work",
    };
    let sparkle = if view.highlight { " ✨" } else { "" };
    format!("Score {shown:>3}/100  ({verdict}){sparkle}")
}

fn draw_bar(bar: &Bar) -> String {
    let filled = ((bar.percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "{:<12} {}{} {:>5.1}%",
        bar.label,
        "█".repeat(filled),
        "·".repeat(BAR_WIDTH - filled),
        bar.percent
    )
}
