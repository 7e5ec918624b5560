//! Display formatting for prediction results and model metadata.
//!
//! Everything here is pure: no I/O and no mutation of the inputs.

use crate::protocol::{ModelInfo, PredictionResponse};

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryItem {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionView {
    /// Whole-dollar US currency, e.g. `$452,000`.
    pub price: String,
    pub model_name: String,
    /// One decimal place with a percent sign, e.g. `87.3%`.
    pub confidence: String,
    /// The displayed percentage as a number, e.g. `87.3`.
    pub confidence_percent: f64,
    pub summary: Vec<SummaryItem>,
}

impl PredictionView {
    /// Width of the confidence indicator, as a 0..=1 proportion of its track.
    pub fn confidence_fill(&self) -> f32 {
        (self.confidence_percent / 100.0).clamp(0.0, 1.0) as f32
    }
}

/// Nothing to show is a valid state, so a missing result yields `None`.
pub fn present_prediction(result: Option<&PredictionResponse>) -> Option<PredictionView> {
    let result = result?;
    let confidence_percent = round_to(result.confidence_score * 100.0, 1);
    let used = &result.features_used;

    let mut summary = Vec::with_capacity(4);
    if let Some(square_feet) = used.square_feet {
        summary.push(SummaryItem {
            label: "Size",
            value: format!("{} ft²", format_number(square_feet)),
        });
    }
    if let Some(bedrooms) = used.bedrooms {
        summary.push(SummaryItem {
            label: "Beds",
            value: format!("{} bd", format_whole(bedrooms)),
        });
    }
    if let Some(bathrooms) = used.bathrooms {
        summary.push(SummaryItem {
            label: "Baths",
            value: format!("{} ba", format_whole(bathrooms)),
        });
    }
    if let Some(age_years) = used.age_years {
        summary.push(SummaryItem {
            label: "Age",
            value: format!("{} yrs", format_whole(age_years)),
        });
    }

    Some(PredictionView {
        price: format_usd_whole(result.predicted_price),
        model_name: result.model_name.clone(),
        confidence: format!("{confidence_percent:.1}%"),
        confidence_percent,
        summary,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfoView {
    pub algorithm: String,
    pub accuracy: String,
    pub rmse: String,
    pub training_set: String,
    pub features: Vec<String>,
}

pub fn present_model_info(info: &ModelInfo) -> ModelInfoView {
    ModelInfoView {
        algorithm: info.model_name.clone(),
        accuracy: format!("{}%", fixed(info.test_r2_score * 100.0, 1)),
        rmse: format!("${}k", fixed(info.test_rmse / 1000.0, 0)),
        training_set: format!("{}k houses", fixed(info.training_samples as f64 / 1000.0, 1)),
        features: info
            .features
            .iter()
            .map(|feature| feature.replace('_', " "))
            .collect(),
    }
}

/// `452000.4` -> `$452,000`; negative amounts keep their sign in front.
pub fn format_usd_whole(amount: f64) -> String {
    let whole = amount.round() as i64;
    if whole < 0 {
        format!("-${}", group_thousands(whole.unsigned_abs()))
    } else {
        format!("${}", group_thousands(whole.unsigned_abs()))
    }
}

/// Thousands-separated number with up to three fraction digits, trailing zeros dropped.
pub fn format_number(value: f64) -> String {
    let rounded = round_to(value, 3);
    let sign = if rounded < 0.0 { "-" } else { "" };
    let magnitude = rounded.abs();
    let integer = magnitude.trunc();
    let grouped = group_thousands(integer as u64);

    let fraction = format!("{:.3}", magnitude - integer);
    let fraction = fraction.trim_start_matches('0').trim_end_matches('0');
    if fraction == "." || fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}{fraction}")
    }
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_whole(value: f64) -> String {
    (value.round() as i64).to_string()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, round_to(value, decimals as i32))
}
