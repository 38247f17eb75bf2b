//! The opaque upscaling backend, reached over HTTP.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use shared::{
    error::ProtocolError,
    protocol::{
        AppInfo, HealthResponse, UpscaleResponse, UpscaledImage, HEALTH_PATH, INFO_PATH,
        UPLOAD_FIELD, UPSCALE_PATH,
    },
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{
    config::{ConfigError, Settings},
    validator::CandidateFile,
};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Every way an upload can fail. The workflow treats all variants alike; only the text differs.
#[derive(Debug, Error)]
pub enum RemoteFailure {
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("could not build upload request: {0}")]
    Request(#[source] reqwest::Error),
    #[error("{0}")]
    Declared(String),
    #[error("malformed response (HTTP {status}): {detail}")]
    Malformed { status: u16, detail: String },
}

#[derive(Debug, Error)]
pub enum HealthCheckFailure {
    #[error("health endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend reported status '{0}'")]
    Unhealthy(String),
    #[error("malformed health response (HTTP {status}): {detail}")]
    Malformed { status: u16, detail: String },
}

#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn upscale(&self, file: &CandidateFile) -> Result<UpscaledImage, RemoteFailure>;
    async fn health(&self) -> Result<HealthResponse, HealthCheckFailure>;
    async fn fetch_info(&self) -> Result<AppInfo, RemoteFailure>;
}

pub struct HttpRemoteService {
    http: Client,
    upscale_url: Url,
    health_url: Url,
    info_url: Url,
}

impl HttpRemoteService {
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        let base = settings.base_url()?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            upscale_url: endpoint(&base, UPSCALE_PATH)?,
            health_url: endpoint(&base, HEALTH_PATH)?,
            info_url: endpoint(&base, INFO_PATH)?,
        })
    }

    pub fn upscale_url(&self) -> &Url {
        &self.upscale_url
    }
}

fn endpoint(base: &Url, path: &str) -> Result<Url, ConfigError> {
    base.join(path)
        .map_err(|source| ConfigError::InvalidServerUrl {
            url: base.to_string(),
            source,
        })
}

fn malformed(status: StatusCode, detail: impl ToString) -> RemoteFailure {
    RemoteFailure::Malformed {
        status: status.as_u16(),
        detail: detail.to_string(),
    }
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn upscale(&self, file: &CandidateFile) -> Result<UpscaledImage, RemoteFailure> {
        let started = Instant::now();
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.media_type())
            .map_err(RemoteFailure::Request)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http
            .post(self.upscale_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(RemoteFailure::Transport)?;

        // Failure bodies arrive with 4xx/5xx and are still JSON, so the status is not checked here.
        let status = response.status();
        let body = response.bytes().await.map_err(RemoteFailure::Transport)?;
        let parsed: UpscaleResponse =
            serde_json::from_slice(&body).map_err(|err| malformed(status, err))?;

        info!(
            file = file.name(),
            status = status.as_u16(),
            success = parsed.success,
            elapsed_ms = started.elapsed().as_millis() as u64,
            original_size = ?parsed.original_size,
            result_size = ?parsed.result_size,
            "upscale request finished"
        );

        parsed.into_result().map_err(|err| match err {
            ProtocolError::Declared(message) => RemoteFailure::Declared(message),
            ProtocolError::MissingImage => malformed(status, err),
        })
    }

    async fn health(&self) -> Result<HealthResponse, HealthCheckFailure> {
        let response = self
            .http
            .get(self.health_url.clone())
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        let parsed: HealthResponse =
            serde_json::from_slice(&body).map_err(|err| HealthCheckFailure::Malformed {
                status: status.as_u16(),
                detail: err.to_string(),
            })?;
        debug!(status = status.as_u16(), reported = %parsed.status, "health response");

        if parsed.is_healthy() {
            Ok(parsed)
        } else {
            Err(HealthCheckFailure::Unhealthy(parsed.status))
        }
    }

    async fn fetch_info(&self) -> Result<AppInfo, RemoteFailure> {
        let response = self
            .http
            .get(self.info_url.clone())
            .send()
            .await
            .map_err(RemoteFailure::Transport)?
            .error_for_status()
            .map_err(RemoteFailure::Transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(RemoteFailure::Transport)?;
        serde_json::from_slice(&body).map_err(|err| malformed(status, err))
    }
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
