//! Request handlers for the prediction endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use super::AppState;
use super::types::{
    DayForecastRequest, DayForecastResponse, ErrorResponse, InsightsResponse, PredictResponse,
};
use crate::config::ValidationMode;
use crate::model::{LoadedModel, ModelError};
use crate::schema::{DISPLAY_NAMES, FeatureVector};

/// Hour of day at which the synthesized temperature curve peaks.
const WARMEST_HOUR: f64 = 14.0;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Returns the model's prediction for a single feature vector.
///
/// `POST /predict` → 200 + `PredictResponse` JSON
/// In strict validation mode, out-of-range fields → 400 + `ErrorResponse`.
/// Without a loaded model → 503 + `ErrorResponse`.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(input): Json<FeatureVector>,
) -> Result<Json<PredictResponse>, ApiError> {
    check_features(&input, state.validation)?;
    let model = require_model(&state)?;
    let prediction = model.predict(&input).map_err(|e| error_response(&e))?;
    Ok(Json(PredictResponse {
        predicted_energy_consumption: prediction,
    }))
}

/// Expands summary inputs into 24 hourly vectors and predicts the day.
///
/// `POST /predict_day` → 200 + `DayForecastResponse` JSON
/// The synthesized temperature curve is returned alongside the
/// predictions because the caller charts both.
pub async fn predict_day(
    State(state): State<Arc<AppState>>,
    Json(input): Json<DayForecastRequest>,
) -> Result<Json<DayForecastResponse>, ApiError> {
    check_day_request(&input, state.validation)?;
    let model = require_model(&state)?;

    let temps = temperature_curve(input.temperature_max, input.temperature_min);
    let vectors: Vec<FeatureVector> = temps
        .iter()
        .enumerate()
        .map(|(hour, &temperature)| FeatureVector {
            temperature,
            humidity: input.humidity,
            occupancy_rate: hourly_occupancy(input.occupancy_rate, hour as u32),
            hour: hour as u32,
            day_of_week: input.day_of_week,
            is_weekend: input.is_weekend,
            square_footage: input.square_footage,
        })
        .collect();

    let predictions = model
        .predict_batch(&vectors)
        .map_err(|e| error_response(&e))?;
    Ok(Json(DayForecastResponse {
        hourly_predictions: predictions,
        hourly_temps: temps,
    }))
}

/// Returns feature display names with their learned importance weights.
///
/// `GET /model_insights` → 200 + `InsightsResponse` JSON
pub async fn model_insights(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InsightsResponse>, ApiError> {
    let model = require_model(&state)?;
    Ok(Json(InsightsResponse {
        features: DISPLAY_NAMES.iter().map(|s| s.to_string()).collect(),
        importance: model.importance().to_vec(),
    }))
}

/// Synthesized hourly temperatures: a cosine curve between the daily
/// extremes, coldest before dawn and peaking at 14:00.
fn temperature_curve(max: f64, min: f64) -> Vec<f64> {
    let mid = (max + min) / 2.0;
    let half = (max - min) / 2.0;
    (0..24)
        .map(|h| mid + half * ((f64::from(h) - WARMEST_HOUR) / 12.0 * std::f64::consts::PI).cos())
        .collect()
}

/// Occupancy for a forecast hour: full rate during business hours
/// (08:00–18:00 inclusive), 20% otherwise.
fn hourly_occupancy(rate: f64, hour: u32) -> f64 {
    if (8..=18).contains(&hour) {
        rate
    } else {
        rate * 0.2
    }
}

fn require_model(state: &AppState) -> Result<&LoadedModel, ApiError> {
    state
        .model
        .as_ref()
        .ok_or_else(|| error_response(&ModelError::Unavailable))
}

fn error_response(err: &ModelError) -> ApiError {
    let status = match err {
        ModelError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn reject(problems: Vec<String>) -> Result<(), ApiError> {
    if problems.is_empty() {
        return Ok(());
    }
    Err((
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: problems.join("; "),
        }),
    ))
}

/// Strict-mode range checks for a single-point prediction.
///
/// Permissive mode forwards everything to the model unchecked; that is
/// the documented baseline behavior, not an oversight.
fn check_features(input: &FeatureVector, mode: ValidationMode) -> Result<(), ApiError> {
    if mode == ValidationMode::Permissive {
        return Ok(());
    }
    let mut problems = Vec::new();
    if !(0.0..=100.0).contains(&input.humidity) {
        problems.push(format!("humidity {} outside [0, 100]", input.humidity));
    }
    if !(0.0..=1.0).contains(&input.occupancy_rate) {
        problems.push(format!(
            "occupancy_rate {} outside [0, 1]",
            input.occupancy_rate
        ));
    }
    if input.hour > 23 {
        problems.push(format!("hour {} outside 0-23", input.hour));
    }
    if input.day_of_week > 6 {
        problems.push(format!("day_of_week {} outside 0-6", input.day_of_week));
    }
    if input.is_weekend != FeatureVector::weekend_flag(input.day_of_week) {
        problems.push(format!(
            "is_weekend {} inconsistent with day_of_week {}",
            input.is_weekend, input.day_of_week
        ));
    }
    if input.square_footage == 0 {
        problems.push("square_footage must be positive".to_string());
    }
    reject(problems)
}

/// Strict-mode range checks for a day forecast request.
fn check_day_request(input: &DayForecastRequest, mode: ValidationMode) -> Result<(), ApiError> {
    if mode == ValidationMode::Permissive {
        return Ok(());
    }
    let mut problems = Vec::new();
    if input.temperature_max < input.temperature_min {
        problems.push(format!(
            "temperature_max {} below temperature_min {}",
            input.temperature_max, input.temperature_min
        ));
    }
    if !(0.0..=100.0).contains(&input.humidity) {
        problems.push(format!("humidity {} outside [0, 100]", input.humidity));
    }
    if !(0.0..=1.0).contains(&input.occupancy_rate) {
        problems.push(format!(
            "occupancy_rate {} outside [0, 1]",
            input.occupancy_rate
        ));
    }
    if input.day_of_week > 6 {
        problems.push(format!("day_of_week {} outside 0-6", input.day_of_week));
    }
    if input.is_weekend != FeatureVector::weekend_flag(input.day_of_week) {
        problems.push(format!(
            "is_weekend {} inconsistent with day_of_week {}",
            input.is_weekend, input.day_of_week
        ));
    }
    if input.square_footage == 0 {
        problems.push("square_footage must be positive".to_string());
    }
    reject(problems)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::TrainerConfig;
    use crate::datagen::generate;
    use crate::model::train_from_records;

    fn trained_state(validation: ValidationMode) -> Arc<AppState> {
        let records = generate(5, 42);
        let cfg = TrainerConfig {
            n_trees: 5,
            ..TrainerConfig::default()
        };
        let artifact = train_from_records(&records, &cfg).expect("training should succeed");
        Arc::new(AppState {
            model: Some(LoadedModel::new(artifact)),
            validation,
        })
    }

    fn degraded_state() -> Arc<AppState> {
        Arc::new(AppState {
            model: None,
            validation: ValidationMode::Permissive,
        })
    }

    fn predict_body() -> Value {
        json!({
            "temperature": 25.0,
            "humidity": 60.0,
            "occupancy_rate": 0.5,
            "hour": 14,
            "day_of_week": 2,
            "is_weekend": 0,
            "square_footage": 2500
        })
    }

    fn day_body() -> Value {
        json!({
            "temperature_max": 30.0,
            "temperature_min": 18.0,
            "humidity": 55.0,
            "occupancy_rate": 0.7,
            "day_of_week": 1,
            "is_weekend": 0,
            "square_footage": 3200
        })
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn predict_returns_nonnegative_prediction() {
        let app = router(trained_state(ValidationMode::Permissive));
        let resp = app.oneshot(post_json("/predict", &predict_body())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let prediction = json["predicted_energy_consumption"]
            .as_f64()
            .expect("prediction should be a float");
        assert!(prediction >= 0.0);
    }

    #[tokio::test]
    async fn predict_is_idempotent_over_the_wire() {
        let state = trained_state(ValidationMode::Permissive);
        let first = router(state.clone())
            .oneshot(post_json("/predict", &predict_body()))
            .await
            .unwrap();
        let second = router(state)
            .oneshot(post_json("/predict", &predict_body()))
            .await
            .unwrap();
        assert_eq!(body_json(first).await, body_json(second).await);
    }

    #[tokio::test]
    async fn predict_day_returns_24_predictions_and_temps() {
        let app = router(trained_state(ValidationMode::Permissive));
        let resp = app.oneshot(post_json("/predict_day", &day_body())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let predictions = json["hourly_predictions"].as_array().unwrap();
        let temps = json["hourly_temps"].as_array().unwrap();
        assert_eq!(predictions.len(), 24);
        assert_eq!(temps.len(), 24);
    }

    #[tokio::test]
    async fn model_insights_returns_schema_aligned_weights() {
        let app = router(trained_state(ValidationMode::Permissive));
        let req = Request::builder()
            .uri("/model_insights")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let features = json["features"].as_array().unwrap();
        let importance = json["importance"].as_array().unwrap();
        assert_eq!(features.len(), DISPLAY_NAMES.len());
        assert_eq!(importance.len(), DISPLAY_NAMES.len());
        for (got, expected) in features.iter().zip(DISPLAY_NAMES) {
            assert_eq!(got.as_str(), Some(expected));
        }
        for weight in importance {
            assert!(weight.as_f64().unwrap_or(-1.0) >= 0.0);
        }
    }

    #[tokio::test]
    async fn degraded_server_returns_503_not_a_crash() {
        let state = degraded_state();

        let resp = router(state.clone())
            .oneshot(post_json("/predict", &predict_body()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(resp).await;
        assert!(
            json["error"]
                .as_str()
                .unwrap_or_default()
                .contains("model unavailable")
        );

        let resp = router(state.clone())
            .oneshot(post_json("/predict_day", &day_body()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let req = Request::builder()
            .uri("/model_insights")
            .body(Body::empty())
            .unwrap();
        let resp = router(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn permissive_mode_accepts_out_of_range_inputs() {
        let app = router(trained_state(ValidationMode::Permissive));
        let mut body = predict_body();
        body["humidity"] = json!(150.0);
        body["occupancy_rate"] = json!(3.5);
        let resp = app.oneshot(post_json("/predict", &body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn permissive_mode_accepts_inconsistent_weekend_flag() {
        let app = router(trained_state(ValidationMode::Permissive));
        let mut body = predict_body();
        body["day_of_week"] = json!(6);
        body["is_weekend"] = json!(0);
        let resp = app.oneshot(post_json("/predict", &body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn strict_mode_rejects_out_of_range_inputs() {
        let app = router(trained_state(ValidationMode::Strict));
        let mut body = predict_body();
        body["humidity"] = json!(150.0);
        let resp = app.oneshot(post_json("/predict", &body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap_or_default().contains("humidity"));
    }

    #[tokio::test]
    async fn strict_mode_rejects_inverted_temperature_range() {
        let app = router(trained_state(ValidationMode::Strict));
        let mut body = day_body();
        body["temperature_max"] = json!(10.0);
        body["temperature_min"] = json!(20.0);
        let resp = app.oneshot(post_json("/predict_day", &body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn temperature_curve_peaks_at_warmest_hour() {
        let temps = temperature_curve(30.0, 18.0);
        assert_eq!(temps.len(), 24);
        let peak = temps
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(h, _)| h);
        assert_eq!(peak, Some(14));
        assert!((temps[14] - 30.0).abs() < 1e-9);
        assert!((temps[2] - 18.0).abs() < 1e-9, "coldest at 02:00");
    }

    #[test]
    fn temperature_curve_is_symmetric_around_the_peak() {
        let temps = temperature_curve(28.0, 12.0);
        for offset in 1..=9 {
            let before = temps[14 - offset];
            let after = temps[14 + offset];
            assert!(
                (before - after).abs() < 1e-9,
                "hours {} and {} should mirror: {before} vs {after}",
                14 - offset,
                14 + offset
            );
        }
    }

    #[test]
    fn occupancy_boost_covers_business_hours_inclusive() {
        let rate = 0.8;
        assert_eq!(hourly_occupancy(rate, 7), rate * 0.2);
        assert_eq!(hourly_occupancy(rate, 8), rate);
        assert_eq!(hourly_occupancy(rate, 18), rate);
        assert_eq!(hourly_occupancy(rate, 19), rate * 0.2);
    }
}
