use crate::service::{LanguageCode, TranscriptionOutput};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

pub const DEFAULT_HISTORY_LIMIT: usize = 3;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: String,
    pub spoken_lang: LanguageCode,
    pub target_lang: LanguageCode,
    pub srt_file: String,
    pub video_file: String,
    pub word_count: u32,
}

/// Most recent successful results, newest first
#[derive(Debug, Clone)]
pub struct RecentResults {
    limit: usize,
    items: Vec<HistoryItem>,
}

impl RecentResults {
    /// At least one entry is always kept
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            items: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        spoken_lang: &LanguageCode,
        target_lang: &LanguageCode,
        output: &TranscriptionOutput,
    ) -> &HistoryItem {
        let item = HistoryItem {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            spoken_lang: spoken_lang.clone(),
            target_lang: target_lang.clone(),
            srt_file: output.srt_file.clone(),
            video_file: output.video_file.clone(),
            word_count: output.translated_text.split_whitespace().count() as u32,
        };

        self.items.insert(0, item);
        self.items.truncate(self.limit);
        &self.items[0]
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }
}

impl Default for RecentResults {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
