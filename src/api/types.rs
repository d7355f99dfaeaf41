//! API request and response types.
//!
//! Request field names follow the dataset CSV schema so the dashboard
//! collaborator can reuse the same field vocabulary everywhere.

use serde::{Deserialize, Serialize};

/// Response body for a single-point prediction.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Predicted energy consumption (kWh).
    pub predicted_energy_consumption: f64,
}

/// Summary inputs for a 24-hour forecast.
///
/// The server expands this into 24 hourly feature vectors: a cosine
/// temperature curve between `temperature_min` and `temperature_max`,
/// business-hours occupancy, and the remaining fields held constant.
#[derive(Debug, Clone, Deserialize)]
pub struct DayForecastRequest {
    /// Expected daily maximum temperature (°C).
    pub temperature_max: f64,
    /// Expected daily minimum temperature (°C).
    pub temperature_min: f64,
    /// Relative humidity held constant across the day (%).
    pub humidity: f64,
    /// Business-hours occupancy fraction (0.0–1.0).
    pub occupancy_rate: f64,
    /// Day of week (0–6, 0 = Monday).
    pub day_of_week: u32,
    /// Weekend flag (0/1).
    pub is_weekend: u8,
    /// Active floor area (square feet).
    pub square_footage: u32,
}

/// Response body for a 24-hour forecast.
#[derive(Debug, Serialize)]
pub struct DayForecastResponse {
    /// Predicted consumption per hour (kWh), hours 0–23.
    pub hourly_predictions: Vec<f64>,
    /// Synthesized temperature per hour (°C), for charting.
    pub hourly_temps: Vec<f64>,
}

/// Response body for feature-importance introspection.
#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    /// Feature display names in schema order.
    pub features: Vec<String>,
    /// Learned importance weights aligned to `features`.
    pub importance: Vec<f64>,
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
