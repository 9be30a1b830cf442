use super::progress::{Milestones, Progress};
use crate::service::{
    ArtifactStore, LanguageCode, SelectedFile, TranscriptionOutput, TranscriptionResult,
    UploadRequest,
};
use serde::Serialize;

pub const NO_FILE_NOTICE: &str = "Please select a file.";
pub const HTTP_FAILURE_MESSAGE: &str = "Failed to process the file.";
const ERROR_NOTICE_PREFIX: &str = "An error occurred: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    /// Transient: resolved within the same transition that entered it
    Validating,
    Submitting,
    AwaitingResult,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Phase::Submitting | Phase::AwaitingResult)
    }
}

/// A dropdown of language identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionControl {
    options: Vec<LanguageCode>,
    selected: Option<LanguageCode>,
}

impl SelectionControl {
    /// Replace the options with `languages`, selecting the first one
    pub fn populate(&mut self, languages: &[LanguageCode]) {
        self.options = languages.to_vec();
        self.selected = self.options.first().cloned();
    }

    /// Returns false if `code` is not one of the options
    pub fn select(&mut self, code: &LanguageCode) -> bool {
        if self.options.contains(code) {
            self.selected = Some(code.clone());
            true
        } else {
            false
        }
    }

    pub fn options(&self) -> &[LanguageCode] {
        &self.options
    }

    pub fn selected(&self) -> Option<&LanguageCode> {
        self.selected.as_ref()
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    LanguagesLoaded(Vec<LanguageCode>),
    LanguagesFailed(String),
    FileSelected(SelectedFile),
    FileCleared,
    SpokenLanguageSelected(LanguageCode),
    TargetLanguageSelected(LanguageCode),
    SubmitRequested,
    HeadersReceived { generation: u64, status: u16 },
    ResultParsed { generation: u64, result: TranscriptionResult },
    RequestFailed { generation: u64, message: String },
    /// Back to idle; anything still in flight becomes stale
    Reset,
}

/// Work the driver must perform after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit(UploadRequest),
    /// Blocking notice shown to the user
    Alert(String),
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    pub phase: Phase,
    pub progress: Progress,
    pub spoken: SelectionControl,
    pub target: SelectionControl,
    /// Set when the language list could not be loaded
    pub language_error: Option<String>,
    pub file: Option<SelectedFile>,
    pub transcribed_text: String,
    pub translated_text: String,
    pub srt_link: Option<String>,
    pub video_link: Option<String>,
    pub results_visible: bool,
    pub last_notice: Option<String>,
    pub last_result: Option<TranscriptionOutput>,
    /// Incremented by every accepted submission
    pub generation: u64,
    milestones: Milestones,
}

impl WorkflowState {
    pub fn new(milestones: Milestones) -> Self {
        Self {
            milestones,
            ..Self::default()
        }
    }

    /// Pure transition: consumes the state and returns its successor plus an optional effect
    pub fn apply(mut self, event: Event) -> (Self, Option<Effect>) {
        let effect = match event {
            Event::LanguagesLoaded(languages) => {
                self.spoken.populate(&languages);
                self.target.populate(&languages);
                self.language_error = None;
                None
            }
            Event::LanguagesFailed(message) => {
                self.language_error = Some(message);
                None
            }
            Event::FileSelected(file) => {
                self.file = Some(file);
                None
            }
            Event::FileCleared => {
                self.file = None;
                None
            }
            Event::SpokenLanguageSelected(code) => {
                if !self.spoken.select(&code) {
                    tracing::warn!("Ignoring unknown spoken language '{}'", code);
                }
                None
            }
            Event::TargetLanguageSelected(code) => {
                if !self.target.select(&code) {
                    tracing::warn!("Ignoring unknown target language '{}'", code);
                }
                None
            }
            Event::SubmitRequested => self.submit(),
            Event::HeadersReceived { generation, status } => {
                if !self.accepts(generation, &[Phase::Submitting]) {
                    return (self, None);
                }
                if !(200..300).contains(&status) {
                    tracing::warn!("Transcription request {} failed with HTTP {}", generation, status);
                    Some(self.fail(HTTP_FAILURE_MESSAGE))
                } else {
                    self.phase = Phase::AwaitingResult;
                    self.progress = Progress::percent(self.milestones.headers);
                    None
                }
            }
            Event::ResultParsed { generation, result } => {
                if !self.accepts(generation, &[Phase::AwaitingResult]) {
                    return (self, None);
                }
                match result {
                    TranscriptionResult::Failure { error } => Some(self.fail(&error)),
                    TranscriptionResult::Success(output) => {
                        self.succeed(output);
                        None
                    }
                }
            }
            Event::RequestFailed { generation, message } => {
                if !self.accepts(generation, &[Phase::Submitting, Phase::AwaitingResult]) {
                    return (self, None);
                }
                Some(self.fail(&message))
            }
            Event::Reset => {
                if self.phase.is_in_flight() {
                    self.generation += 1;
                }
                self.phase = Phase::Idle;
                self.progress = Progress::Blank;
                self.last_notice = None;
                None
            }
        };

        (self, effect)
    }

    fn submit(&mut self) -> Option<Effect> {
        let previous = self.phase;
        self.phase = Phase::Validating;

        let Some(file) = self.file.clone() else {
            // An outstanding request keeps its phase; a missing file never touches progress.
            self.phase = if previous.is_in_flight() {
                previous
            } else {
                Phase::Failed
            };
            self.last_notice = Some(NO_FILE_NOTICE.to_string());
            return Some(Effect::Alert(NO_FILE_NOTICE.to_string()));
        };

        self.generation += 1;
        self.phase = Phase::Submitting;
        self.progress = Progress::percent(self.milestones.submitted);
        self.last_notice = None;

        Some(Effect::Submit(UploadRequest {
            generation: self.generation,
            file,
            spoken_lang: self.spoken.selected().cloned().unwrap_or_default(),
            target_lang: self.target.selected().cloned().unwrap_or_default(),
        }))
    }

    fn succeed(&mut self, output: TranscriptionOutput) {
        self.phase = Phase::Succeeded;
        self.progress = Progress::percent(self.milestones.complete);
        self.transcribed_text = output.transcribed_text.clone();
        self.translated_text = output.translated_text.clone();
        self.srt_link = Some(ArtifactStore::link(&output.srt_file));
        self.video_link = Some(ArtifactStore::link(&output.video_file));
        self.results_visible = true;
        self.last_result = Some(output);
    }

    fn fail(&mut self, message: &str) -> Effect {
        let notice = format!("{}{}", ERROR_NOTICE_PREFIX, message);
        self.phase = Phase::Failed;
        self.progress = Progress::Blank;
        self.last_notice = Some(notice.clone());
        Effect::Alert(notice)
    }

    fn accepts(&self, generation: u64, phases: &[Phase]) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "Discarding stale response for request {} (current {})",
                generation,
                self.generation
            );
            return false;
        }
        if !phases.contains(&self.phase) {
            tracing::debug!(
                "Discarding response for request {} in phase {:?}",
                generation,
                self.phase
            );
            return false;
        }
        true
    }
}
