// src/service/mod.rs
// Service Module - remote language directory, transcription and artifact endpoints

mod artifacts;
#[cfg(test)]
pub(crate) mod fake;
mod http;
mod types;

pub use artifacts::ArtifactStore;
pub use http::HttpTranscriptionService;
pub use types::{
    LanguageCode, SelectedFile, ServiceError, TranscriptionOutput, TranscriptionResult,
    UploadRequest,
};

use async_trait::async_trait;

/// Remote side of the upload workflow
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Fetch the supported language identifiers, in server order
    async fn languages(&self) -> Result<Vec<LanguageCode>, ServiceError>;

    /// Send an upload and return as soon as the response headers arrive
    async fn submit(
        &self,
        request: &UploadRequest,
    ) -> Result<Box<dyn ServiceResponse>, ServiceError>;

    /// Get service name
    fn name(&self) -> &str;
}

/// A response whose headers have been received but whose body is still pending
#[async_trait]
pub trait ServiceResponse: Send {
    fn status(&self) -> u16;

    fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    /// Read and decode the body
    async fn result(self: Box<Self>) -> Result<TranscriptionResult, ServiceError>;
}
