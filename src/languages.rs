// src/languages.rs
// Language directory client

use crate::service::{LanguageCode, ServiceError, TranscriptionService};

/// Fetch the supported languages once, preserving server order.
/// No retry: callers decide how a failure shows up.
pub async fn load_languages(
    service: &dyn TranscriptionService,
) -> Result<Vec<LanguageCode>, ServiceError> {
    let languages = service.languages().await?;

    if languages.is_empty() {
        tracing::warn!("{} returned an empty language list", service.name());
    } else {
        tracing::info!(
            "Loaded {} languages from {}",
            languages.len(),
            service.name()
        );
    }

    Ok(languages)
}
