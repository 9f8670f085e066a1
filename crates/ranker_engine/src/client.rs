use std::sync::Arc;
use std::time::Duration;

use ranker_core::{
    BatchStatusReport, JobId, RequirementStatusReport, ResultsPage, ServiceError, UploadFile,
};
use ranker_logging::{ranker_debug, ranker_warn};
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::types::{BatchStatusBody, RankedPayload, RequirementStatusBody, SubmitResponse};

const UPLOAD_REQUIREMENT_PATH: &str = "api/resume-processor/upload-requirements/";
const UPLOAD_BATCH_PATH: &str = "api/resume-processor/upload-resumes/";

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Ensures the base URL ends with exactly one `/` so relative endpoints join under it.
pub fn normalize_base_url(raw: &str) -> String {
    format!("{}/", raw.trim().trim_end_matches('/'))
}

/// Session/identity provider seam. Login and token refresh live elsewhere.
pub trait CredentialSource: Send + Sync {
    fn is_authorized(&self) -> bool;
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed token, e.g. read once from the environment.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|token| !token.trim().is_empty()),
        }
    }
}

impl CredentialSource for StaticCredentials {
    fn is_authorized(&self) -> bool {
        self.token.is_some()
    }

    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Remote job service contract consumed by the orchestrator.
#[async_trait::async_trait]
pub trait JobService: Send + Sync {
    async fn submit_requirement(&self, file: &UploadFile) -> Result<JobId, ServiceError>;

    async fn requirement_status(&self, id: JobId) -> Result<RequirementStatusReport, ServiceError>;

    async fn submit_batch(
        &self,
        requirement_id: JobId,
        file: &UploadFile,
    ) -> Result<JobId, ServiceError>;

    async fn batch_status(&self, id: JobId) -> Result<BatchStatusReport, ServiceError>;

    async fn ranked_results(&self, batch_id: JobId, page: u32)
        -> Result<ResultsPage, ServiceError>;
}

/// REST implementation of [`JobService`].
#[derive(Clone)]
pub struct ReqwestJobService {
    client: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialSource>,
}

impl ReqwestJobService {
    pub fn new(
        settings: ServiceSettings,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, ServiceError> {
        let base_url = Url::parse(&normalize_base_url(&settings.base_url)).map_err(|err| {
            ServiceError::transport(format!("invalid base url {}: {err}", settings.base_url))
        })?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|err| ServiceError::transport(format!("invalid endpoint {path}: {err}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        if status.is_client_error() {
            let message = extract_error_message(&body).unwrap_or_else(|| status.to_string());
            ranker_warn!("{} rejected with {}: {}", url, status, message);
            return Err(ServiceError::validation(status.as_u16(), message));
        }
        if !status.is_success() {
            let message = extract_error_message(&body)
                .unwrap_or_else(|| format!("http status {status}"));
            ranker_warn!("{} failed with {}: {}", url, status, message);
            return Err(ServiceError::transport(message));
        }

        ranker_debug!("{} answered {} ({} bytes)", url, status, body.len());
        serde_json::from_slice(&body)
            .map_err(|err| ServiceError::transport(format!("invalid response from {url}: {err}")))
    }

    async fn upload(&self, path: &str, form: Form) -> Result<JobId, ServiceError> {
        let url = self.endpoint(path)?;
        let response: SubmitResponse = self.send(self.client.post(url).multipart(form)).await?;
        Ok(response.id)
    }
}

#[async_trait::async_trait]
impl JobService for ReqwestJobService {
    async fn submit_requirement(&self, file: &UploadFile) -> Result<JobId, ServiceError> {
        let form = Form::new().part("pdf_file", file_part(file));
        self.upload(UPLOAD_REQUIREMENT_PATH, form).await
    }

    async fn requirement_status(&self, id: JobId) -> Result<RequirementStatusReport, ServiceError> {
        let url = self.endpoint(&format!("api/resume-processor/requirements/{id}/status/"))?;
        let body: RequirementStatusBody = self.send(self.client.get(url)).await?;
        Ok(RequirementStatusReport {
            status: body.status,
            title: body.title,
        })
    }

    async fn submit_batch(
        &self,
        requirement_id: JobId,
        file: &UploadFile,
    ) -> Result<JobId, ServiceError> {
        let form = Form::new()
            .part("zip_file", file_part(file))
            .text("job_requirement", requirement_id.to_string());
        self.upload(UPLOAD_BATCH_PATH, form).await
    }

    async fn batch_status(&self, id: JobId) -> Result<BatchStatusReport, ServiceError> {
        let url = self.endpoint(&format!("api/resume-processor/batches/{id}/status/"))?;
        let body: BatchStatusBody = self.send(self.client.get(url)).await?;
        Ok(BatchStatusReport {
            status: body.status,
        })
    }

    async fn ranked_results(
        &self,
        batch_id: JobId,
        page: u32,
    ) -> Result<ResultsPage, ServiceError> {
        let mut url =
            self.endpoint(&format!("api/resume-processor/batches/{batch_id}/ranked-resumes/"))?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        let payload: RankedPayload = self.send(self.client.get(url)).await?;
        Ok(payload.into())
    }
}

fn file_part(file: &UploadFile) -> Part {
    Part::stream_with_length(file.bytes.clone(), file.bytes.len() as u64)
        .file_name(file.name.clone())
}

/// Pulls a human-readable message out of a structured error body:
/// `{"detail": "..."}` first, otherwise the first field error.
fn extract_error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;
    if let Some(detail) = object.get("detail").and_then(first_text) {
        return Some(detail);
    }
    object
        .iter()
        .find_map(|(field, value)| first_text(value).map(|text| format!("{field}: {text}")))
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Array(values) => values.iter().find_map(first_text),
        _ => None,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::transport(format!("request timed out: {err}"));
    }
    ServiceError::transport(err.to_string())
}
