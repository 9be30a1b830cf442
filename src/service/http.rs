// src/service/http.rs
// HTTP adapter for the transcription server

use super::{
    LanguageCode, ServiceError, ServiceResponse, TranscriptionResult, TranscriptionService,
    UploadRequest,
};
use async_trait::async_trait;
use reqwest::{multipart, Url};
use std::time::Duration;

const LANGUAGES_PATH: &str = "/languages";
const TRANSCRIBE_PATH: &str = "/transcribe";

pub struct HttpTranscriptionService {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpTranscriptionService {
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        tracing::info!("Transcription service client initialized for {}", base_url);

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|e| ServiceError::NetworkError(format!("invalid endpoint {}: {}", path, e)))
    }
}

#[async_trait]
impl TranscriptionService for HttpTranscriptionService {
    async fn languages(&self) -> Result<Vec<LanguageCode>, ServiceError> {
        let url = self.endpoint(LANGUAGES_PATH)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::DecodeError(e.to_string()))
    }

    async fn submit(
        &self,
        request: &UploadRequest,
    ) -> Result<Box<dyn ServiceResponse>, ServiceError> {
        tracing::info!(
            "Uploading {} ({} bytes, {} -> {})",
            request.file.file_name,
            request.file.bytes.len(),
            request.spoken_lang,
            request.target_lang
        );

        let file_part = multipart::Part::bytes(request.file.bytes.clone())
            .file_name(request.file.file_name.clone())
            .mime_str(&request.file.mime_type)
            .map_err(|e| ServiceError::NetworkError(e.to_string()))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("spoken_lang", request.spoken_lang.as_str().to_string())
            .text("target_lang", request.target_lang.as_str().to_string());

        let url = self.endpoint(TRANSCRIBE_PATH)?;
        let response = self.client.post(url).multipart(form).send().await?;

        Ok(Box::new(HttpResponse { inner: response }))
    }

    fn name(&self) -> &str {
        "HTTP"
    }
}

struct HttpResponse {
    inner: reqwest::Response,
}

#[async_trait]
impl ServiceResponse for HttpResponse {
    fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    async fn result(self: Box<Self>) -> Result<TranscriptionResult, ServiceError> {
        let body = self.inner.bytes().await?;
        TranscriptionResult::from_json(&body)
    }
}
