use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PropertyDraft;

/// Success wrapper the prediction service puts around every body except health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

pub type PredictionEnvelope = Envelope<PredictionResponse>;
pub type ModelInfoEnvelope = Envelope<ModelInfo>;
pub type HistoryEnvelope = Envelope<Vec<HistoryEntry>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_price: f64,
    pub confidence_score: f64,
    pub model_name: String,
    #[serde(default)]
    pub features_used: FeaturesUsed,
}

/// Draft fields echoed back by the service. Only the ones the result view
/// summarises are typed; anything else is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturesUsed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_feet: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_years: Option<f64>,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub test_r2_score: f64,
    pub test_rmse: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_mae: Option<f64>,
    pub training_samples: u64,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_loaded: Option<bool>,
}

/// Outcome of the one-shot health probe. Never an error: an unreachable
/// service is an ordinary `Offline` value.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerStatus {
    Online(HealthReport),
    Offline { error: String },
}

impl ServerStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ServerStatus::Online(report) if report.status == "healthy")
    }

    pub fn label(&self) -> &'static str {
        if self.is_healthy() {
            "Connected"
        } else {
            "Offline"
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ServerStatus::Offline { error } => Some(error),
            ServerStatus::Online(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(flatten)]
    pub features: PropertyDraft,
    pub predicted_price: f64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_prediction_envelope_with_partial_echo() {
        let body = serde_json::json!({
            "success": true,
            "data": {
                "predicted_price": 452000.0,
                "model_name": "GradientBoosting",
                "confidence_score": 0.873,
                "features_used": { "square_feet": 2500, "bedrooms": 4, "floors": 2 }
            },
            "history_id": 17
        });

        let envelope: PredictionEnvelope = serde_json::from_value(body).expect("decode");
        assert!(envelope.success);
        assert_eq!(envelope.history_id, Some(17));
        let used = &envelope.data.features_used;
        assert_eq!(used.square_feet, Some(2500.0));
        assert_eq!(used.bathrooms, None);
        assert_eq!(used.other.get("floors"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn health_status_is_healthy_only_for_healthy_reports() {
        let online = ServerStatus::Online(HealthReport {
            status: "healthy".to_string(),
            service: Some("House PredictionAPI".to_string()),
            model_loaded: Some(true),
        });
        assert!(online.is_healthy());
        assert_eq!(online.label(), "Connected");

        let degraded = ServerStatus::Online(HealthReport {
            status: "degraded".to_string(),
            service: None,
            model_loaded: None,
        });
        assert!(!degraded.is_healthy());

        let offline = ServerStatus::Offline {
            error: "No response from server. Please check if the backend is running.".to_string(),
        };
        assert_eq!(offline.label(), "Offline");
        assert!(offline.error().is_some());
    }

    #[test]
    fn decodes_history_rows_with_flattened_features() {
        let body = serde_json::json!({
            "success": true,
            "count": 1,
            "data": [{
                "id": 3,
                "square_feet": 1800, "bedrooms": 3, "bathrooms": 2, "age_years": 40,
                "garage_spaces": 1, "lot_size_sqft": 6000, "floors": 1,
                "crime_rate": 2.0, "school_rating": 6, "distance_to_city_miles": 8.5,
                "has_pool": 0, "has_fireplace": 1, "has_renovated": 0,
                "neighborhood_quality": 3,
                "predicted_price": 310500.25,
                "created_at": "2025-03-01T12:30:00Z"
            }]
        });

        let envelope: HistoryEnvelope = serde_json::from_value(body).expect("decode");
        assert_eq!(envelope.count, Some(1));
        let entry = &envelope.data[0];
        assert_eq!(entry.features.square_feet, 1800);
        assert_eq!(entry.features.has_pool, 0);
        assert_eq!(entry.predicted_price, 310500.25);
    }
}
