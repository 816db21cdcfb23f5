use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use shared::{
    domain::{ClusterCount, RatingMap},
    error::ApiErrorBody,
    protocol::{
        Cluster, ReclusterOutcome, ReclusterRequest, RecommendationRequest, RecommendationResult,
        SummariesOutcome, SystemStats,
    },
};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub mod controller;
pub mod export;
pub mod inflight;
pub mod notifications;

pub use controller::{
    Command, CommandOutcome, ControllerError, ControllerOptions, ViewController, ViewEvent,
    WizardStep,
};
pub use export::ExportArtifact;
pub use inflight::{Action, InflightActions, InflightGuard};
pub use notifications::{Notification, NotificationBoard, NotificationCenter, NotificationKind};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Backend {
        status: StatusCode,
        message: String,
    },
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP contract of the recommendation backend.
#[async_trait]
pub trait RecommendationApi: Send + Sync {
    async fn stats(&self) -> Result<SystemStats, ClientError>;
    async fn clusters(&self) -> Result<Vec<Cluster>, ClientError>;
    async fn recluster(&self, num_clusters: ClusterCount) -> Result<ReclusterOutcome, ClientError>;
    async fn generate_summaries(&self) -> Result<SummariesOutcome, ClientError>;
    async fn recommendations(
        &self,
        ratings: &RatingMap,
    ) -> Result<RecommendationResult, ClientError>;
    async fn export(&self, result: &RecommendationResult)
        -> Result<serde_json::Value, ClientError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Failure(ApiErrorBody),
    Success(T),
}

pub struct HttpRecommendationApi {
    http: Client,
    server_url: String,
}

impl HttpRecommendationApi {
    pub fn new(server_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Result<Self, ClientError> {
        let raw = server_url.into();
        let parsed = Url::parse(raw.trim()).map_err(|source| ClientError::InvalidServerUrl {
            url: raw.clone(),
            source,
        })?;
        Ok(Self {
            http,
            server_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.server_url)
    }
}

async fn decode_response<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    let body = res.bytes().await?;
    debug!(%status, bytes = body.len(), "backend response");

    match serde_json::from_slice::<Envelope<T>>(&body) {
        Ok(Envelope::Failure(ApiErrorBody { error })) => Err(ClientError::Backend {
            status,
            message: error,
        }),
        Ok(Envelope::Success(value)) if status.is_success() => Ok(value),
        Ok(Envelope::Success(_)) => Err(ClientError::Status(status)),
        Err(_) if !status.is_success() => Err(ClientError::Status(status)),
        Err(_) => Ok(serde_json::from_slice(&body)?),
    }
}

#[async_trait]
impl RecommendationApi for HttpRecommendationApi {
    async fn stats(&self) -> Result<SystemStats, ClientError> {
        let res = self.http.get(self.endpoint("stats")).send().await?;
        decode_response(res).await
    }

    async fn clusters(&self) -> Result<Vec<Cluster>, ClientError> {
        let res = self.http.get(self.endpoint("clusters")).send().await?;
        decode_response(res).await
    }

    async fn recluster(&self, num_clusters: ClusterCount) -> Result<ReclusterOutcome, ClientError> {
        let res = self
            .http
            .post(self.endpoint("recluster"))
            .json(&ReclusterRequest { num_clusters })
            .send()
            .await?;
        decode_response(res).await
    }

    async fn generate_summaries(&self) -> Result<SummariesOutcome, ClientError> {
        let res = self
            .http
            .post(self.endpoint("generate_summaries"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        decode_response(res).await
    }

    async fn recommendations(
        &self,
        ratings: &RatingMap,
    ) -> Result<RecommendationResult, ClientError> {
        let res = self
            .http
            .post(self.endpoint("recommendations"))
            .json(&RecommendationRequest {
                ratings: ratings.clone(),
            })
            .send()
            .await?;
        decode_response(res).await
    }

    async fn export(
        &self,
        result: &RecommendationResult,
    ) -> Result<serde_json::Value, ClientError> {
        let res = self
            .http
            .post(self.endpoint("export"))
            .json(result)
            .send()
            .await?;
        decode_response(res).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
