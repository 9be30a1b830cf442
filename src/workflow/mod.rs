use crate::languages;
use crate::service::{
    LanguageCode, SelectedFile, ServiceError, TranscriptionOutput, TranscriptionResult,
    TranscriptionService,
};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub mod history;
pub mod progress;
pub mod render;
pub mod state;

pub use history::{HistoryItem, RecentResults};
pub use progress::{Milestones, Progress};
pub use render::{render, View};
pub use state::{Effect, Event, Phase, SelectionControl, WorkflowState};

/// Presentation surface the workflow draws on
pub trait ViewSink: Send + Sync {
    /// Called after every transition with the fresh projection
    fn render(&self, view: &View);

    /// Blocking notice
    fn alert(&self, message: &str);
}

/// How one `submit` call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded(TranscriptionOutput),
    Failed(String),
    /// Refused before any request was sent
    Rejected(String),
    /// A newer submission or a reset took over while this one was running
    Superseded,
}

pub struct UploadWorkflow {
    service: Arc<dyn TranscriptionService>,
    sink: Arc<dyn ViewSink>,
    state: Mutex<WorkflowState>,
    history: Mutex<RecentResults>,
}

impl UploadWorkflow {
    pub fn new(
        service: Arc<dyn TranscriptionService>,
        sink: Arc<dyn ViewSink>,
        milestones: Milestones,
        history_limit: usize,
    ) -> Self {
        tracing::info!("Upload workflow using {} service", service.name());

        Self {
            service,
            sink,
            state: Mutex::new(WorkflowState::new(milestones)),
            history: Mutex::new(RecentResults::new(history_limit)),
        }
    }

    /// Load the language list into both selection controls.
    /// A failure leaves the controls empty and is recorded on the state.
    pub async fn initialize(&self) -> Result<usize, ServiceError> {
        match languages::load_languages(self.service.as_ref()).await {
            Ok(list) => {
                let count = list.len();
                self.dispatch(Event::LanguagesLoaded(list));
                Ok(count)
            }
            Err(e) => {
                tracing::warn!("Language list unavailable: {}", e);
                self.dispatch(Event::LanguagesFailed(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn select_file(&self, file: SelectedFile) {
        self.dispatch(Event::FileSelected(file));
    }

    pub async fn select_file_path(&self, path: &Path) -> Result<(), ServiceError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        tracing::info!("Selected {} ({} bytes)", file_name, bytes.len());
        self.select_file(SelectedFile::new(file_name, bytes));
        Ok(())
    }

    /// Returns false when `code` is not one of the loaded languages
    pub fn select_spoken(&self, code: LanguageCode) -> bool {
        self.dispatch(Event::SpokenLanguageSelected(code.clone()));
        self.lock_state().spoken.selected() == Some(&code)
    }

    /// Returns false when `code` is not one of the loaded languages
    pub fn select_target(&self, code: LanguageCode) -> bool {
        self.dispatch(Event::TargetLanguageSelected(code.clone()));
        self.lock_state().target.selected() == Some(&code)
    }

    pub fn reset(&self) {
        self.dispatch(Event::Reset);
    }

    /// Run one submission to completion
    pub async fn submit(&self) -> Outcome {
        let request = match self.dispatch(Event::SubmitRequested) {
            Some(Effect::Submit(request)) => request,
            Some(Effect::Alert(notice)) => return Outcome::Rejected(notice),
            None => return Outcome::Rejected(String::new()),
        };
        let generation = request.generation;

        let response = match self.service.submit(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Upload {} failed ({}): {}", generation, failure_class(&e), e);
                self.dispatch(Event::RequestFailed {
                    generation,
                    message: e.to_string(),
                });
                return self.outcome(generation);
            }
        };

        let status = response.status();
        self.dispatch(Event::HeadersReceived { generation, status });
        if !response.is_success() || !self.is_current(generation) {
            if !response.is_success() {
                tracing::warn!("Upload {} failed (transport): HTTP {}", generation, status);
            }
            return self.outcome(generation);
        }

        match response.result().await {
            Ok(result) => {
                if let TranscriptionResult::Failure { error } = &result {
                    tracing::warn!("Upload {} rejected by server: {}", generation, error);
                }
                self.dispatch(Event::ResultParsed { generation, result });
            }
            Err(e) => {
                tracing::error!(
                    "Response for upload {} unreadable ({}): {}",
                    generation,
                    failure_class(&e),
                    e
                );
                self.dispatch(Event::RequestFailed {
                    generation,
                    message: e.to_string(),
                });
            }
        }

        let outcome = self.outcome(generation);
        if let Outcome::Succeeded(output) = &outcome {
            self.remember(&request.spoken_lang, &request.target_lang, output);
        }
        outcome
    }

    pub fn state(&self) -> WorkflowState {
        self.lock_state().clone()
    }

    pub fn view(&self) -> View {
        render(&self.lock_state())
    }

    pub fn history(&self) -> Vec<HistoryItem> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .items()
            .to_vec()
    }

    fn dispatch(&self, event: Event) -> Option<Effect> {
        let (view, effect) = {
            let mut guard = self.lock_state();
            let current = std::mem::take(&mut *guard);
            let (next, effect) = current.apply(event);
            *guard = next;
            (render(&guard), effect)
        };

        self.sink.render(&view);
        if let Some(Effect::Alert(message)) = &effect {
            self.sink.alert(message);
        }
        effect
    }

    fn remember(&self, spoken: &LanguageCode, target: &LanguageCode, output: &TranscriptionOutput) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        let item = history.record(spoken, target, output);
        tracing::info!("Recorded result {} ({} words)", item.id, item.word_count);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock_state().generation == generation
    }

    fn outcome(&self, generation: u64) -> Outcome {
        let state = self.lock_state();
        if state.generation != generation {
            return Outcome::Superseded;
        }
        match state.phase {
            Phase::Succeeded => state
                .last_result
                .clone()
                .map(Outcome::Succeeded)
                .unwrap_or(Outcome::Superseded),
            Phase::Failed => Outcome::Failed(state.last_notice.clone().unwrap_or_default()),
            _ => Outcome::Superseded,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Failure class for logging: wire-level problems versus anything else in the chain
fn failure_class(error: &ServiceError) -> &'static str {
    if error.is_transport() {
        "transport"
    } else {
        "unexpected"
    }
}
