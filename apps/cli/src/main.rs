use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{PredictionApi, PredictorClient, DEFAULT_HISTORY_LIMIT};
use shared::{
    domain::{PropertyDraft, PropertyField},
    error::ApiError,
    presentation::{format_usd_whole, present_model_info, present_prediction},
    protocol::ServerStatus,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "predictor", about = "Command-line client for the house price prediction service")]
struct Args {
    /// Base URL of the prediction API; overrides predictor.toml and PREDICTOR_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe the service and report whether it is reachable.
    Health,
    /// Show metadata for the model currently served.
    ModelInfo,
    /// Request a price estimate. Unset fields keep their defaults.
    Predict {
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        assignments: Vec<String>,
    },
    /// List the most recent stored predictions.
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ApiError>() {
                Some(api_err) => {
                    eprintln!("error: {}", api_err.message);
                    if !api_err.details.is_empty() {
                        eprintln!("details: {}", api_err.details);
                    }
                }
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let settings = client_core::load_settings().with_api_url_override(args.api_url);
    let client = PredictorClient::from_settings(&settings)?;
    tracing::debug!(api_base_url = %client.base_url(), "using prediction service");

    match args.command {
        Command::Health => {
            print_health(&client.health_check().await);
        }
        Command::ModelInfo => {
            let envelope = client.get_model_info().await?;
            let view = present_model_info(&envelope.data);
            println!("Algorithm:    {}", view.algorithm);
            println!("Accuracy:     {}", view.accuracy);
            println!("Error (RMSE): {}", view.rmse);
            println!("Training set: {}", view.training_set);
            println!("Features:     {}", view.features.join(", "));
        }
        Command::Predict { assignments } => {
            let draft = build_draft(&assignments)?;
            let envelope = client.predict_price(&draft).await?;
            let view = present_prediction(Some(&envelope.data))
                .ok_or_else(|| anyhow!("service returned no prediction"))?;
            println!("Estimated value: {}", view.price);
            println!("Model:           {}", view.model_name);
            println!("Confidence:      {}", view.confidence);
            if !view.summary.is_empty() {
                let summary: Vec<String> = view
                    .summary
                    .iter()
                    .map(|item| format!("{} {}", item.label, item.value))
                    .collect();
                println!("Summary:         {}", summary.join(" | "));
            }
            if let Some(history_id) = envelope.history_id {
                println!("Saved as history entry #{history_id}");
            }
        }
        Command::History { limit } => {
            let envelope = client.get_prediction_history(limit).await?;
            if envelope.data.is_empty() {
                println!("No predictions recorded yet.");
            }
            for entry in &envelope.data {
                let features = &entry.features;
                println!(
                    "#{:<5} {}  {:>12}  {} ft², {} bd, {} ba, {} yrs",
                    entry.id,
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    format_usd_whole(entry.predicted_price),
                    features.square_feet,
                    features.bedrooms,
                    features.bathrooms,
                    features.age_years,
                );
            }
        }
    }
    Ok(())
}

fn print_health(status: &ServerStatus) {
    match status {
        ServerStatus::Online(report) => {
            println!("{}: {}", status.label(), report.status);
            if let Some(service) = &report.service {
                println!("Service:      {service}");
            }
            if let Some(model_loaded) = report.model_loaded {
                println!("Model loaded: {model_loaded}");
            }
        }
        ServerStatus::Offline { error } => println!("{}: {error}", status.label()),
    }
}

/// Applies `field=value` pairs over the default draft, in order.
fn build_draft(assignments: &[String]) -> Result<PropertyDraft> {
    let mut draft = PropertyDraft::default();
    for assignment in assignments {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected FIELD=VALUE, got '{assignment}'"))?;
        let field: PropertyField = name.parse()?;
        draft
            .apply_raw(field, raw)
            .with_context(|| format!("invalid value for {field}"))?;
        let spec = field.spec();
        if !spec.contains(draft.get(field).as_f64()) {
            tracing::warn!(field = field.name(), "value outside {} to {}", spec.min, spec.max);
        }
    }
    Ok(draft)
}
