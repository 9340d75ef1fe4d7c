use std::time::Duration;

use monitor_logging::monitor_debug;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{FailureKind, JobMetadata, JobStatusSnapshot, ServiceError};

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub bearer_token: Option<String>,
}

impl ServiceSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            bearer_token: None,
        }
    }
}

/// The remote job-status API, as seen by the monitor.
#[async_trait::async_trait]
pub trait StatusService: Send + Sync {
    async fn get_by_id(&self, job_id: &str) -> Result<JobMetadata, ServiceError>;

    async fn get_status(&self, job_id: &str) -> Result<JobStatusSnapshot, ServiceError>;

    async fn terminate(&self, job_id: &str) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStatusService {
    settings: ServiceSettings,
    client: reqwest::Client,
}

impl ReqwestStatusService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    /// `{base}/projects/{job_id}[/{suffix}]`, with the id as one encoded segment.
    fn job_url(&self, job_id: &str, suffix: Option<&str>) -> Result<Url, ServiceError> {
        let mut url = self.settings.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ServiceError::new(FailureKind::InvalidUrl, "base url cannot carry a path")
            })?;
            segments.pop_if_empty().push("projects").push(job_id);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.settings.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, ServiceError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ServiceError> {
        monitor_debug!("GET {}", url);
        let body = self.send(self.client.get(url)).await?;
        serde_json::from_slice(&body)
            .map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl StatusService for ReqwestStatusService {
    async fn get_by_id(&self, job_id: &str) -> Result<JobMetadata, ServiceError> {
        let url = self.job_url(job_id, None)?;
        self.get_json(url).await
    }

    async fn get_status(&self, job_id: &str) -> Result<JobStatusSnapshot, ServiceError> {
        let url = self.job_url(job_id, Some("status"))?;
        self.get_json(url).await
    }

    async fn terminate(&self, job_id: &str) -> Result<(), ServiceError> {
        let url = self.job_url(job_id, Some("terminate"))?;
        monitor_debug!("POST {}", url);
        self.send(self.client.post(url)).await.map(|_| ())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ServiceError::new(FailureKind::Decode, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
