use std::path::Path;
use std::time::Duration;

use bytes::BytesMut;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode, Url};
use watermark_logging::{wm_debug, wm_info};

use crate::wire::{ErrorBody, StatusBody, UploadBody, ZipBody, ZipRequestBody};
use crate::{FailureKind, JobStatus, ServiceError, UploadOutcome, UploadRequest};

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Largest file the client will send.
    pub max_upload_bytes: u64,
    /// Largest processed image or zip the client will accept.
    pub max_download_bytes: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_upload_bytes: 64 * 1024 * 1024,
            max_download_bytes: 512 * 1024 * 1024,
        }
    }
}

/// The processing service as seen by the engine.
#[async_trait::async_trait]
pub trait WatermarkService: Send + Sync {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadOutcome, ServiceError>;

    async fn status(&self, job_id: &str) -> Result<JobStatus, ServiceError>;

    /// Fetch a server-provided URL (absolute or server-relative).
    async fn download(&self, url: &str) -> Result<Vec<u8>, ServiceError>;

    /// Ask the server to pack result files; returns the zip URL.
    async fn request_zip(&self, filenames: &[String]) -> Result<String, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestService {
    settings: ServiceSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let mut raw = settings.base_url.trim().to_string();
        // Relative joins must keep any path prefix of the base.
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base
            .join(path)
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn read_limited(&self, response: Response) -> Result<Vec<u8>, ServiceError> {
        let max_bytes = self.settings.max_download_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ServiceError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = buffer.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ServiceError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.to_vec())
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ServiceError> {
        let body = self.read_limited(response).await?;
        serde_json::from_slice(&body)
            .map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl WatermarkService for ReqwestService {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadOutcome, ServiceError> {
        let file_name = request
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ServiceError::new(FailureKind::Io, "path has no file name"))?;
        let metadata = tokio::fs::metadata(&request.path)
            .await
            .map_err(|err| ServiceError::new(FailureKind::Io, err.to_string()))?;
        if metadata.len() > self.settings.max_upload_bytes {
            return Err(ServiceError::new(
                FailureKind::TooLarge {
                    max_bytes: self.settings.max_upload_bytes,
                    actual: Some(metadata.len()),
                },
                "file too large to upload",
            ));
        }
        let bytes = tokio::fs::read(&request.path)
            .await
            .map_err(|err| ServiceError::new(FailureKind::Io, err.to_string()))?;

        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(mime_for(&request.path))
            .map_err(map_reqwest_error)?;
        let mut form = Form::new()
            .part("file", part)
            .text("watermark_type", request.watermark_type.to_string())
            .text("image_quality", request.image_quality.clone())
            .text(
                "burn_after_read",
                if request.burn_after_read { "1" } else { "0" },
            );
        if let Some(logo) = &request.logo_preference {
            form = form.text("logo_preference", logo.clone());
        }

        let mut url = self.endpoint("upload")?;
        url.query_pairs_mut().append_pair("lang", &request.lang);
        wm_info!("Uploading {} to {}", file_name, url);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = self.check_status(response).await?;
        let body: UploadBody = self.read_json(response).await?;

        if let Some(job_id) = body.task_id {
            return Ok(UploadOutcome::Accepted { job_id });
        }
        if body.needs_logo_choice {
            return Ok(UploadOutcome::NeedsLogoChoice);
        }
        Err(ServiceError::new(
            FailureKind::Decode,
            "upload response carried neither task_id nor needs_logo_choice",
        ))
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, ServiceError> {
        let mut url = self.endpoint("status/")?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::new(FailureKind::InvalidUrl, "base cannot be a base"))?
            .pop_if_empty()
            .push(job_id);
        wm_debug!("Polling {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ServiceError::new(
                FailureKind::UnknownJob,
                format!("job {job_id} not found"),
            ));
        }
        let response = self.check_status(response).await?;
        let body: StatusBody = self.read_json(response).await?;
        body.into_status()
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        let url = self.endpoint(url)?;
        wm_debug!("Downloading {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = self.check_status(response).await?;
        self.read_limited(response).await
    }

    async fn request_zip(&self, filenames: &[String]) -> Result<String, ServiceError> {
        let url = self.endpoint("download_zip")?;
        let body = serde_json::to_vec(&ZipRequestBody { filenames })
            .map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))?;
        wm_info!("Requesting zip of {} files", filenames.len());

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = self.check_status(response).await?;
        let body: ZipBody = self.read_json(response).await?;
        body.zip_url
            .ok_or_else(|| ServiceError::new(FailureKind::Decode, "zip response without zip_url"))
    }
}

impl ReqwestService {
    /// Turns a non-success response into an error, keeping the server's message.
    async fn check_status(&self, response: Response) -> Result<Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = self.read_limited(response).await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.error);
        Err(match message {
            Some(message) => ServiceError::new(
                FailureKind::Rejected {
                    status: status.as_u16(),
                    message: message.clone(),
                },
                message,
            ),
            None => ServiceError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string()),
        })
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
