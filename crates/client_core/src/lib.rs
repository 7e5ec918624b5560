use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::PropertyDraft,
    error::ApiError,
    protocol::{
        HealthReport, HistoryEnvelope, ModelInfoEnvelope, PredictionEnvelope, ServerStatus,
    },
};
use tracing::{debug, warn};
use url::Url;

pub mod config;
pub use config::{load_settings, ClientSettings};

/// Uniform bound on every call; a stalled request fails into the connection error path.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

const HEALTH_PATH: &str = "health/";
const MODEL_INFO_PATH: &str = "model-info/";
const PREDICT_PATH: &str = "predict/";
const HISTORY_PATH: &str = "history/";

/// The four remote operations of the prediction service.
///
/// Every failure reaches callers as an [`ApiError`], except the health probe,
/// which folds failures into [`ServerStatus::Offline`].
#[async_trait]
pub trait PredictionApi: Send + Sync {
    async fn health_check(&self) -> ServerStatus;
    async fn get_model_info(&self) -> Result<ModelInfoEnvelope, ApiError>;
    async fn predict_price(&self, draft: &PropertyDraft) -> Result<PredictionEnvelope, ApiError>;
    async fn get_prediction_history(&self, limit: u32) -> Result<HistoryEnvelope, ApiError>;
}

#[derive(Debug, Clone)]
pub struct PredictorClient {
    http: Client,
    base_url: String,
}

impl PredictorClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ApiError> {
        Self::new(settings.api_base_url.clone())
    }

    pub(crate) fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| ApiError::request_setup(err.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Paths are trailing-slash sensitive on the service side, so they are
    /// appended verbatim to the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}/{path}", self.base_url.trim_end_matches('/'));
        Url::parse(&raw).map_err(|err| {
            let err = ApiError::request_setup(format!("invalid endpoint URL '{raw}': {err}"));
            warn!(endpoint = %raw, details = %err.details, "could not build request");
            err
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        debug!(operation, "sending prediction service request");
        let response = request
            .send()
            .await
            .map_err(|err| normalize_transport_error(operation, err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let parsed = serde_json::from_slice::<serde_json::Value>(&body)
                .unwrap_or(serde_json::Value::Null);
            let err = ApiError::from_error_body(status.as_u16(), &parsed);
            warn!(
                operation,
                status = err.status,
                message = %err.message,
                details = %err.details,
                "prediction service returned an error status"
            );
            return Err(err);
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| normalize_transport_error(operation, err))?;
        serde_json::from_slice(&body).map_err(|err| {
            let err = ApiError::server(
                status.as_u16(),
                None,
                Some(format!("invalid response body: {err}")),
            );
            warn!(operation, status = err.status, details = %err.details, "undecodable response");
            err
        })
    }

    async fn fetch_health(&self) -> Result<HealthReport, ApiError> {
        let url = self.endpoint(HEALTH_PATH)?;
        self.execute("health_check", self.http.get(url)).await
    }
}

fn normalize_transport_error(operation: &'static str, err: reqwest::Error) -> ApiError {
    let normalized = if err.is_builder() {
        ApiError::request_setup(err.to_string())
    } else {
        ApiError::connection()
    };
    warn!(
        operation,
        timeout = err.is_timeout(),
        connect = err.is_connect(),
        "prediction service request failed: {err}"
    );
    normalized
}

#[async_trait]
impl PredictionApi for PredictorClient {
    async fn health_check(&self) -> ServerStatus {
        match self.fetch_health().await {
            Ok(report) => ServerStatus::Online(report),
            Err(err) => ServerStatus::Offline { error: err.message },
        }
    }

    async fn get_model_info(&self) -> Result<ModelInfoEnvelope, ApiError> {
        let url = self.endpoint(MODEL_INFO_PATH)?;
        self.execute("get_model_info", self.http.get(url)).await
    }

    async fn predict_price(&self, draft: &PropertyDraft) -> Result<PredictionEnvelope, ApiError> {
        let url = self.endpoint(PREDICT_PATH)?;
        self.execute("predict_price", self.http.post(url).json(draft)).await
    }

    async fn get_prediction_history(&self, limit: u32) -> Result<HistoryEnvelope, ApiError> {
        let url = self.endpoint(HISTORY_PATH)?;
        self.execute(
            "get_prediction_history",
            self.http.get(url).query(&[("limit", limit)]),
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
