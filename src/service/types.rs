// src/service/types.rs
// Service Types and Error Definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque language identifier as returned by the language directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A media file picked by the user, held in memory until submission
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for_file_name(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Guess a MIME type from the file extension of an uploaded media file
pub fn mime_for_file_name(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "mp3" => "audio/mpeg",
        "aac" => "audio/aac",
        _ => "application/octet-stream",
    }
}

/// One submission to the transcription service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Workflow generation this request belongs to
    pub generation: u64,
    pub file: SelectedFile,
    pub spoken_lang: LanguageCode,
    pub target_lang: LanguageCode,
}

/// Successful payload of `POST /transcribe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionOutput {
    pub transcribed_text: String,
    pub translated_text: String,
    /// Artifact name of the generated subtitle file
    pub srt_file: String,
    /// Artifact name of the subtitled video
    pub video_file: String,
}

/// Parsed body of `POST /transcribe`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionResult {
    Success(TranscriptionOutput),
    /// Application-level failure reported with a 2xx status
    Failure { error: String },
}

#[derive(Deserialize)]
struct RawTranscriptionBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    transcribed_text: Option<String>,
    #[serde(default)]
    translated_text: Option<String>,
    #[serde(default)]
    srt_file: Option<String>,
    #[serde(default)]
    video_file: Option<String>,
}

impl TranscriptionResult {
    /// Decode a response body. A non-empty `error` field wins over any other content.
    pub fn from_json(body: &[u8]) -> Result<Self, ServiceError> {
        let raw: RawTranscriptionBody = serde_json::from_slice(body)
            .map_err(|e| ServiceError::DecodeError(e.to_string()))?;

        if let Some(error) = raw.error.filter(|e| !e.is_empty()) {
            return Ok(TranscriptionResult::Failure { error });
        }

        let missing = |field: &str| ServiceError::DecodeError(format!("missing field `{}`", field));

        Ok(TranscriptionResult::Success(TranscriptionOutput {
            transcribed_text: raw.transcribed_text.ok_or_else(|| missing("transcribed_text"))?,
            translated_text: raw.translated_text.ok_or_else(|| missing("translated_text"))?,
            srt_file: raw.srt_file.ok_or_else(|| missing("srt_file"))?,
            video_file: raw.video_file.ok_or_else(|| missing("video_file"))?,
        }))
    }
}

/// Service error types
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    TimeoutError,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Invalid response: {0}")]
    DecodeError(String),

    #[error("Invalid artifact name: {0}")]
    InvalidArtifactName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Returns true if the failure happened on the wire rather than in the payload
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ServiceError::NetworkError(_) | ServiceError::TimeoutError | ServiceError::HttpStatus(_)
        )
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::TimeoutError
        } else if e.is_decode() {
            ServiceError::DecodeError(e.to_string())
        } else {
            ServiceError::NetworkError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_field_wins() {
        let body = br#"{"error": "unsupported codec", "transcribed_text": "hi"}"#;
        let result = TranscriptionResult::from_json(body).unwrap();
        assert_eq!(
            result,
            TranscriptionResult::Failure {
                error: "unsupported codec".to_string()
            }
        );
    }

    #[test]
    fn test_empty_error_is_ignored() {
        let body = br#"{"error": "", "transcribed_text": "hola", "translated_text": "hello",
                        "srt_file": "a.srt", "video_file": "a_subtitled.mp4"}"#;
        match TranscriptionResult::from_json(body).unwrap() {
            TranscriptionResult::Success(out) => {
                assert_eq!(out.transcribed_text, "hola");
                assert_eq!(out.video_file, "a_subtitled.mp4");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_is_decode_error() {
        let body = br#"{"transcribed_text": "hola", "translated_text": "hello"}"#;
        let err = TranscriptionResult::from_json(body).unwrap_err();
        assert!(matches!(err, ServiceError::DecodeError(ref m) if m.contains("srt_file")));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_garbage_body_is_decode_error() {
        let err = TranscriptionResult::from_json(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, ServiceError::DecodeError(_)));
    }

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_for_file_name("clip.MP4"), "video/mp4");
        assert_eq!(mime_for_file_name("voice.m4a"), "audio/mp4");
        assert_eq!(mime_for_file_name("README"), "application/octet-stream");
    }

    #[test]
    fn test_language_code_is_transparent() {
        let codes: Vec<LanguageCode> = serde_json::from_str(r#"["en", "hi"]"#).unwrap();
        assert_eq!(codes, vec![LanguageCode::from("en"), LanguageCode::from("hi")]);
    }
}
