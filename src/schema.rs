//! Shared feature schema: the model's ordered input contract.
//!
//! Column order fed to the model at inference time must match training
//! order, so the generator, trainer, and server all build model rows
//! through this module instead of carrying their own column lists.

use serde::{Deserialize, Serialize};

/// Number of model input features.
pub const FEATURE_COUNT: usize = 7;

/// Canonical dataset column names, in model input order.
pub const COLUMN_NAMES: [&str; FEATURE_COUNT] = [
    "temperature",
    "humidity",
    "occupancy_rate",
    "hour",
    "day_of_week",
    "is_weekend",
    "square_footage",
];

/// Display names for feature-importance reporting, aligned to [`COLUMN_NAMES`].
pub const DISPLAY_NAMES: [&str; FEATURE_COUNT] = [
    "Temperature",
    "Humidity",
    "Occupancy",
    "Hour",
    "Day",
    "Weekend",
    "Sq Ft",
];

/// One concrete instantiation of the feature schema.
///
/// # Examples
///
/// ```
/// use energy_forecast::schema::{FEATURE_COUNT, FeatureVector};
///
/// let features = FeatureVector {
///     temperature: 25.0,
///     humidity: 60.0,
///     occupancy_rate: 0.5,
///     hour: 14,
///     day_of_week: 2,
///     is_weekend: 0,
///     square_footage: 2500,
/// };
/// assert_eq!(features.to_row().len(), FEATURE_COUNT);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Outside air temperature (°C).
    pub temperature: f64,
    /// Relative humidity (%, 0–100).
    pub humidity: f64,
    /// Fraction of the facility occupied (0.0–1.0).
    pub occupancy_rate: f64,
    /// Hour of day (0–23).
    pub hour: u32,
    /// Day of week (0–6, 0 = Monday).
    pub day_of_week: u32,
    /// Weekend flag (1 iff `day_of_week` >= 5).
    pub is_weekend: u8,
    /// Active floor area (square feet, positive).
    pub square_footage: u32,
}

impl FeatureVector {
    /// Converts the vector into a model input row in canonical column order.
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        [
            self.temperature,
            self.humidity,
            self.occupancy_rate,
            f64::from(self.hour),
            f64::from(self.day_of_week),
            f64::from(self.is_weekend),
            f64::from(self.square_footage),
        ]
    }

    /// Weekend flag derived from a day-of-week index (0 = Monday).
    pub fn weekend_flag(day_of_week: u32) -> u8 {
        u8::from(day_of_week >= 5)
    }
}
