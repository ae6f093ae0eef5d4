//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Car data as supplied by the caller, already flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSummary {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub category: String,
    /// Range in km
    pub range: f64,
    /// 0-100 km/h time, e.g. "4.4s"
    pub acceleration: String,
    /// Power in hp
    #[serde(default)]
    pub power: Option<f64>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Request body for POST /api/compare
#[derive(Debug, Clone, Deserialize)]
pub struct CompareRequest {
    pub car1: Option<CarSummary>,
    pub car2: Option<CarSummary>,
}

impl CompareRequest {
    /// Returns both cars, or an error message if either is missing.
    pub fn validate(self) -> Result<(CarSummary, CarSummary), String> {
        match (self.car1, self.car2) {
            (Some(car1), Some(car2)) => Ok((car1, car2)),
            _ => Err("Both cars are required for comparison".to_string()),
        }
    }
}

/// Request body for POST /api/recommendations
///
/// `preferences` is opaque to the gateway: it only keys the cache and, when
/// no `summary` is given, is flattened into the prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub preferences: Value,
    /// Pre-built compact preference summary
    #[serde(default)]
    pub summary: Option<String>,
    /// Candidate cars, already filtered by the caller
    #[serde(default)]
    pub cars: Vec<CarSummary>,
}

impl RecommendationRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if !self.preferences.is_object() {
            return Some("Preferences are required".to_string());
        }
        if self.cars.is_empty() {
            return Some("At least one candidate car is required".to_string());
        }
        None
    }
}
