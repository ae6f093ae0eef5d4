//! Prompt Building Module
//!
//! Compact prompts for comparison and recommendation. Car data is trimmed
//! to the fields the model needs to keep token usage low.

use serde::Serialize;
use serde_json::Value;

use crate::models::CarSummary;

/// Features kept per car in a comparison prompt
pub const COMPARISON_FEATURES: usize = 5;
/// Features kept per car in a recommendation prompt
pub const RECOMMENDATION_FEATURES: usize = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparedCar<'a> {
    name: &'a str,
    brand: &'a str,
    price: f64,
    category: &'a str,
    range: f64,
    acceleration: &'a str,
    power: Option<f64>,
    top_features: &'a [String],
}

impl<'a> From<&'a CarSummary> for ComparedCar<'a> {
    fn from(car: &'a CarSummary) -> Self {
        Self {
            name: &car.name,
            brand: &car.brand,
            price: car.price,
            category: &car.category,
            range: car.range,
            acceleration: &car.acceleration,
            power: car.power,
            top_features: truncated(&car.features, COMPARISON_FEATURES),
        }
    }
}

#[derive(Debug, Serialize)]
struct CandidateCar<'a> {
    id: &'a str,
    name: &'a str,
    brand: &'a str,
    price: f64,
    category: &'a str,
    range: f64,
    acceleration: &'a str,
    features: &'a [String],
}

impl<'a> From<&'a CarSummary> for CandidateCar<'a> {
    fn from(car: &'a CarSummary) -> Self {
        Self {
            id: &car.id,
            name: &car.name,
            brand: &car.brand,
            price: car.price,
            category: &car.category,
            range: car.range,
            acceleration: &car.acceleration,
            features: truncated(&car.features, RECOMMENDATION_FEATURES),
        }
    }
}

fn truncated(features: &[String], max: usize) -> &[String] {
    &features[..features.len().min(max)]
}

fn to_json<T: Serialize>(value: &T) -> String {
    // Plain structs of strings and numbers always serialize
    serde_json::to_string(value).unwrap_or_default()
}

// == Comparison ==
/// Prompt asking the model to pick a winner between two cars.
pub fn comparison_prompt(car1: &CarSummary, car2: &CarSummary) -> String {
    format!(
        "EV expert: compare cars, pick winner.\n\n\
         Car1: {}\n\
         Car2: {}\n\n\
         JSON only (2 sentences max): \
         {{\"winner\":\"\",\"summary\":\"\",\"reasons\":[\"\",\"\",\"\"],\"bestFor\":\"\",\"valueProposition\":\"\"}}",
        to_json(&ComparedCar::from(car1)),
        to_json(&ComparedCar::from(car2)),
    )
}

// == Recommendation ==
/// Prompt asking the model to rank candidate cars for a user.
pub fn recommendation_prompt(preference_summary: &str, cars: &[CarSummary]) -> String {
    let candidates: Vec<CandidateCar<'_>> = cars.iter().map(CandidateCar::from).collect();

    format!(
        "EV expert: recommend 3-4 best cars.\n\n\
         User needs: {}\n\n\
         Options: {}\n\n\
         JSON (brief): \
         {{\"recommendations\":[{{\"carId\":\"\",\"matchPercentage\":0,\"reason\":\"\",\"strengths\":[\"\",\"\"],\"considerations\":\"\"}}],\"summary\":\"\"}}",
        preference_summary,
        to_json(&candidates),
    )
}

// == Preference Summary ==
/// Flattens a preference object into `key:value|key:value`.
///
/// Arrays are joined with commas; empty values are skipped.
pub fn compact_summary(preferences: &Value) -> String {
    let Some(map) = preferences.as_object() else {
        return String::new();
    };

    map.iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (!rendered.is_empty()).then(|| format!("{}:{}", key, rendered))
        })
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn car(id: &str, features: usize) -> CarSummary {
        CarSummary {
            id: id.to_string(),
            name: format!("{} name", id),
            brand: "Brand".to_string(),
            price: 40000.0,
            category: "SUV".to_string(),
            range: 450.0,
            acceleration: "5.9s".to_string(),
            power: Some(300.0),
            features: (0..features).map(|i| format!("feature-{}", i)).collect(),
        }
    }

    #[test]
    fn test_comparison_prompt_trims_features() {
        let prompt = comparison_prompt(&car("a", 8), &car("b", 2));

        assert!(prompt.starts_with("EV expert: compare cars, pick winner."));
        assert!(prompt.contains("\"topFeatures\":[\"feature-0\",\"feature-1\",\"feature-2\",\"feature-3\",\"feature-4\"]"));
        assert!(!prompt.contains("feature-5"));
        assert!(prompt.contains("\"valueProposition\""));
        // ids are not sent for comparisons
        assert!(!prompt.contains("\"id\""));
    }

    #[test]
    fn test_recommendation_prompt() {
        let prompt = recommendation_prompt("budget:50k", &[car("a", 5), car("b", 1)]);

        assert!(prompt.contains("User needs: budget:50k"));
        assert!(prompt.contains("\"id\":\"a\""));
        assert!(prompt.contains("\"id\":\"b\""));
        assert!(!prompt.contains("feature-3"));
        assert!(prompt.contains("\"matchPercentage\":0"));
    }

    #[test]
    fn test_compact_summary() {
        let prefs = json!({
            "budget": "40k-60k",
            "features": ["autopilot", "heated seats"],
            "brand": "",
            "seats": 5
        });
        let summary = compact_summary(&prefs);

        assert!(summary.contains("budget:40k-60k"));
        assert!(summary.contains("features:autopilot,heated seats"));
        assert!(summary.contains("seats:5"));
        assert!(!summary.contains("brand"));
    }

    #[test]
    fn test_compact_summary_non_object() {
        assert_eq!(compact_summary(&json!("cheap")), "");
    }
}
