use std::{sync::Arc, time::Duration};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use shared::{
    domain::BrewMethod,
    error::ValidationError,
    protocol::{BrewRequest, FlavorProfile, HistoryEntry, ScoreResult},
};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;
use crate::{
    timer::clock_display,
    view::{history_line, share_text},
};

#[derive(Clone)]
struct ScoreServerState {
    received: Arc<Mutex<Vec<Value>>>,
    status: StatusCode,
    body: &'static str,
}

async fn handle_score(
    State(state): State<ScoreServerState>,
    Json(payload): Json<Value>,
) -> (StatusCode, &'static str) {
    state.received.lock().await.push(payload);
    (state.status, state.body)
}

async fn spawn_score_server(
    status: StatusCode,
    body: &'static str,
) -> (String, Arc<Mutex<Vec<Value>>>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = ScoreServerState {
        received: Arc::clone(&received),
        status,
        body,
    };
    let app = Router::new()
        .route("/api/score", post(handle_score))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), received)
}

const SCORED_V60: &str = r#"{
    "total_score": 92,
    "ratio_score": 40,
    "temp_score": 30,
    "time_score": 22,
    "feedback": ["Seduhan yang bagus.", "Suhu sedikit rendah."],
    "ideal_ratio": "1:15 - 1:17",
    "ideal_temp": "90 - 96 °C",
    "ideal_time": "150 - 210 detik",
    "calculated_ratio": 16.666666666666668,
    "flavor": {"acidity": 6, "sweetness": 5, "body": 5, "bitterness": 4}
}"#;

#[tokio::test]
async fn evaluate_posts_recipe_and_decodes_score() {
    let (server_url, received) = spawn_score_server(StatusCode::OK, SCORED_V60).await;
    let client = ScoringClient::new(&server_url).expect("client");
    let request = BrewRequest::from_defaults(BrewMethod::V60);

    let result = client.evaluate(&request).await.expect("score");

    assert_eq!(result.total_score, 92.0);
    assert_eq!(result.feedback.len(), 2);
    assert_eq!(result.flavor.acidity, 6.0);

    let received = received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["method"], "v60");
    assert_eq!(received[0]["coffee_dose"], 15.0);
    assert_eq!(received[0]["brew_time"], 180);
    assert_eq!(received[0]["grind_size"], "medium-fine");
}

#[tokio::test]
async fn identical_requests_are_each_sent() {
    let (server_url, received) = spawn_score_server(StatusCode::OK, SCORED_V60).await;
    let client = ScoringClient::new(&server_url).expect("client");
    let request = BrewRequest::from_defaults(BrewMethod::Espresso);

    client.evaluate(&request).await.expect("first");
    client.evaluate(&request).await.expect("second");

    assert_eq!(received.lock().await.len(), 2);
}

#[tokio::test]
async fn non_success_status_is_a_network_error() {
    let (server_url, received) =
        spawn_score_server(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
    let client = ScoringClient::new(&server_url).expect("client");

    let err = client
        .evaluate(&BrewRequest::from_defaults(BrewMethod::V60))
        .await
        .expect_err("must fail");

    assert!(err.is_network(), "unexpected error: {err}");
    assert!(matches!(
        err,
        ScoringError::Status(status) if status == StatusCode::INTERNAL_SERVER_ERROR
    ));
    assert_eq!(received.lock().await.len(), 1, "no retry expected");
}

#[tokio::test]
async fn undecodable_body_is_a_parse_error() {
    let (server_url, _received) = spawn_score_server(StatusCode::OK, "<html>oops</html>").await;
    let client = ScoringClient::new(&server_url).expect("client");

    let err = client
        .evaluate(&BrewRequest::from_defaults(BrewMethod::V60))
        .await
        .expect_err("must fail");

    assert!(err.is_parse(), "unexpected error: {err}");
    assert!(!err.is_network());
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = ScoringClient::new(&format!("http://{addr}")).expect("client");
    let err = client
        .evaluate(&BrewRequest::from_defaults(BrewMethod::V60))
        .await
        .expect_err("must fail");

    assert!(matches!(err, ScoringError::Transport(_)), "unexpected error: {err}");
}

#[test]
fn endpoint_replaces_any_base_path() {
    let client = ScoringClient::new("http://localhost:8080/brew/").expect("client");
    assert_eq!(client.endpoint().as_str(), "http://localhost:8080/api/score");

    let err = ScoringClient::new("not a url").err().expect("must fail");
    assert!(matches!(err, ScoringError::Endpoint { .. }));
}

#[test]
fn form_starts_from_method_defaults() {
    let form = RecipeForm::new(BrewMethod::Espresso);
    assert_eq!(form.coffee_dose, "18");
    assert_eq!(form.water_yield, "36");
    assert_eq!(form.temperature, "92");
    assert_eq!(form.brew_time, "30");
    assert_eq!(form.grind_size, "fine");
    assert_eq!(form.roast_level, "medium");
}

#[test]
fn selecting_a_method_overwrites_edits() {
    let mut form = RecipeForm::new(BrewMethod::V60);
    form.coffee_dose = "17.5".to_string();
    form.roast_level = "dark".to_string();

    form.select_method(BrewMethod::FrenchPress);

    assert_eq!(form.method, BrewMethod::FrenchPress);
    assert_eq!(form.coffee_dose, "20");
    assert_eq!(form.brew_time, "270");
    assert_eq!(form.grind_size, "coarse");
    assert_eq!(form.roast_level, "medium");
}

#[test]
fn form_builds_scenario_request() {
    let mut form = RecipeForm::new(BrewMethod::V60);
    form.coffee_dose = " 15 ".to_string();

    let request = form.to_request().expect("valid");
    assert_eq!(request, BrewRequest::from_defaults(BrewMethod::V60));
}

#[test]
fn form_refuses_values_that_are_not_numbers() {
    let mut form = RecipeForm::new(BrewMethod::V60);
    form.coffee_dose = String::new();
    assert_eq!(
        form.to_request(),
        Err(ValidationError::Missing {
            field: "coffee_dose"
        })
    );

    form.coffee_dose = "15".to_string();
    form.temperature = "hot".to_string();
    assert_eq!(
        form.to_request(),
        Err(ValidationError::NotANumber {
            field: "temperature",
            raw: "hot".to_string()
        })
    );

    form.temperature = "NaN".to_string();
    assert_eq!(form.to_request().map_err(|err| err.field()), Err("temperature"));
}

#[test]
fn form_refuses_non_positive_amounts_and_fractional_time() {
    let mut form = RecipeForm::new(BrewMethod::Aeropress);
    form.water_yield = "0".to_string();
    assert_eq!(
        form.to_request(),
        Err(ValidationError::NonPositive {
            field: "water_yield",
            value: 0.0
        })
    );

    form.water_yield = "200".to_string();
    form.brew_time = "-5".to_string();
    assert_eq!(
        form.to_request(),
        Err(ValidationError::InvalidTime {
            raw: "-5".to_string()
        })
    );
}

#[test]
fn cold_temperatures_are_allowed() {
    let mut form = RecipeForm::new(BrewMethod::ColdBrew);
    form.temperature = "4".to_string();
    let request = form.to_request().expect("valid");
    assert_eq!(request.temperature, 4.0);
    assert_eq!(request.brew_time, 57_600);
}

#[test]
fn ratio_calculator_rounds_water() {
    let calculator = RatioCalculator::new(16.5, 18.0);
    assert_eq!(calculator.water(), 297.0);
}

#[test]
fn ratio_calculator_treats_garbage_as_zero() {
    let calculator = RatioCalculator::from_inputs("abc", "18");
    assert_eq!(calculator.ratio, 0.0);
    assert_eq!(calculator.water(), 0.0);

    let calculator = RatioCalculator::from_inputs("16.5", "");
    assert_eq!(calculator.water(), 0.0);
}

#[test]
fn ratio_calculator_reads_leading_numbers() {
    let calculator = RatioCalculator::from_inputs(" 16.5x", "18g");
    assert_eq!(calculator.ratio, 16.5);
    assert_eq!(calculator.dose, 18.0);
    assert_eq!(calculator.water(), 297.0);

    let calculator = RatioCalculator::from_inputs("1:16", "g18");
    assert_eq!(calculator.ratio, 1.0);
    assert_eq!(calculator.dose, 0.0);

    let calculator = RatioCalculator::from_inputs("infinity", "NaN");
    assert_eq!(calculator.ratio, 0.0);
    assert_eq!(calculator.dose, 0.0);
}

#[test]
fn applying_the_calculator_updates_dose_and_water() {
    let mut form = RecipeForm::new(BrewMethod::V60);
    let mut calculator = RatioCalculator::seeded(&form.coffee_dose);
    assert_eq!(calculator.dose, 15.0);
    calculator.ratio = 16.5;
    calculator.dose = 18.0;

    form.apply_ratio(&calculator);

    assert_eq!(form.coffee_dose, "18");
    assert_eq!(form.water_yield, "297");
    assert_eq!(form.temperature, "93");
}

#[test]
fn clock_display_is_zero_padded() {
    assert_eq!(clock_display(0).to_string(), "00:00");
    assert_eq!(clock_display(65).to_string(), "01:05");
    assert_eq!(clock_display(59 * 60 + 59).to_string(), "59:59");
    assert_eq!(clock_display(6000).minutes, "100");
}

#[tokio::test(start_paused = true)]
async fn stopwatch_counts_whole_seconds_while_running() {
    let mut stopwatch = Stopwatch::new();
    assert_eq!(stopwatch.toggle(), StopwatchStatus::Running);

    tokio::time::sleep(Duration::from_millis(65_500)).await;

    let display = stopwatch.display();
    assert_eq!(display.minutes, "01");
    assert_eq!(display.seconds, "05");
}

#[tokio::test(start_paused = true)]
async fn stopping_cancels_the_ticker() {
    let mut stopwatch = Stopwatch::new();
    stopwatch.start();
    tokio::time::sleep(Duration::from_millis(3_500)).await;

    assert_eq!(stopwatch.toggle(), StopwatchStatus::Stopped);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(stopwatch.elapsed_secs(), 3);

    stopwatch.start();
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(stopwatch.elapsed_secs(), 5);
}

#[tokio::test(start_paused = true)]
async fn reset_stops_and_zeroes() {
    let mut stopwatch = Stopwatch::new();
    stopwatch.start();
    tokio::time::sleep(Duration::from_millis(7_500)).await;

    stopwatch.reset();
    assert_eq!(stopwatch.status(), StopwatchStatus::Stopped);
    assert_eq!(stopwatch.display().to_string(), "00:00");

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(stopwatch.elapsed_secs(), 0);
}

#[tokio::test(start_paused = true)]
async fn periodic_task_can_stop_itself() {
    let runs = Arc::new(std::sync::atomic::AtomicU32::new(0));
    let counter = Arc::clone(&runs);
    let task = PeriodicTask::spawn_until(Duration::from_millis(25), move || {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1 < 4
    });

    task.finished().await;
    assert_eq!(runs.load(std::sync::atomic::Ordering::SeqCst), 4);
}

#[test]
fn score_reveal_ends_on_target() {
    let frames: Vec<i64> = ScoreReveal::new(92.0).collect();

    assert!(frames.len() >= 60 && frames.len() <= 61, "frames: {}", frames.len());
    assert_eq!(frames.last(), Some(&92));
    assert!(frames.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(ScoreReveal::step_interval(), Duration::from_millis(25));
}

#[test]
fn score_reveal_of_zero_is_a_single_frame() {
    assert_eq!(ScoreReveal::new(0.0).collect::<Vec<_>>(), vec![0]);
}

#[test]
fn result_view_derives_bars_and_tier() {
    let result: ScoreResult = serde_json::from_str(SCORED_V60).expect("decode");
    let view = ResultView::from_result(&result);

    assert_eq!(view.tier, ScoreTier::Excellent);
    assert!(!view.highlight);
    assert_eq!(view.ratio_label, "1:16.7");
    assert_eq!(view.score_bars[0].percent, 100.0);
    assert_eq!(view.score_bars[1].percent, 100.0);
    assert!((view.score_bars[2].percent - 73.333).abs() < 0.01);
    assert_eq!(view.flavor_bars[0].label, "acidity");
    assert_eq!(view.flavor_bars[0].percent, 60.0);
    assert_eq!(view.feedback.len(), 2);
}

#[test]
fn result_view_survives_an_empty_result() {
    let view = ResultView::from_result(&ScoreResult::default());
    assert_eq!(view.tier, ScoreTier::NeedsWork);
    assert_eq!(view.ratio_label, "1:0.0");
    assert!(view.feedback.is_empty());
    assert!(view.flavor_bars.iter().all(|bar| bar.percent == 0.0));
}

#[test]
fn tiers_follow_score_thresholds() {
    assert_eq!(ScoreTier::for_score(90.0), ScoreTier::Excellent);
    assert_eq!(ScoreTier::for_score(89.9), ScoreTier::Good);
    assert_eq!(ScoreTier::for_score(80.0), ScoreTier::Good);
    assert_eq!(ScoreTier::for_score(79.0), ScoreTier::NeedsWork);

    let result = ScoreResult {
        total_score: 96.0,
        ..ScoreResult::default()
    };
    assert!(ResultView::from_result(&result).highlight);
}

#[test]
fn flavor_bars_are_clamped_to_the_scale() {
    let result = ScoreResult {
        flavor: FlavorProfile {
            acidity: 14.0,
            sweetness: -2.0,
            body: 7.0,
            bitterness: 10.0,
        },
        ..ScoreResult::default()
    };
    let percents: Vec<f64> = ResultView::from_result(&result)
        .flavor_bars
        .iter()
        .map(|bar| bar.percent)
        .collect();
    assert_eq!(percents, vec![100.0, 0.0, 70.0, 100.0]);
}

#[test]
fn share_text_summarises_the_form() {
    let form = RecipeForm::new(BrewMethod::V60);
    assert_eq!(
        share_text(&form, "92"),
        "Celestial Brew Recipe ☕✨\nMethod: V60\nCoffee: 15g\nWater: 250g\nTemp: 93°C\nTime: 180s\nScore: 92/100"
    );
}

#[test]
fn history_line_shows_method_amounts_and_score() {
    use chrono::TimeZone;

    let entry = HistoryEntry {
        id: shared::domain::EntryId(1),
        recipe: BrewRequest::from_defaults(BrewMethod::FrenchPress),
        result: ScoreResult {
            total_score: 84.0,
            ..ScoreResult::default()
        },
        date: chrono::Utc.with_ymd_and_hms(2026, 10, 18, 7, 5, 0).unwrap(),
    };

    let line = history_line(&entry);
    assert!(line.starts_with("FRENCHPRESS"), "line: {line}");
    assert!(line.contains("18 Oct 07:05"), "line: {line}");
    assert!(line.contains("20g / 300g"), "line: {line}");
    assert!(line.ends_with(" 84"), "line: {line}");
}
