mod config;
mod languages;
mod service;
mod workflow;

pub use config::{ClientConfig, ConfigError};
pub use service::{
    ArtifactStore, HttpTranscriptionService, LanguageCode, SelectedFile, ServiceError,
    ServiceResponse, TranscriptionOutput, TranscriptionResult, TranscriptionService,
    UploadRequest,
};
pub use workflow::{
    render, HistoryItem, Milestones, Outcome, Phase, Progress, RecentResults, SelectionControl,
    UploadWorkflow, View, ViewSink, WorkflowState,
};

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

const USAGE: &str = "usage: subtitle-client <file> [spoken_lang] [target_lang] [--download]";

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    file: PathBuf,
    spoken_lang: Option<LanguageCode>,
    target_lang: Option<LanguageCode>,
    download: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs, RunError> {
    let mut download = false;
    let mut positional = Vec::new();

    for arg in args {
        match arg.as_str() {
            "--download" | "-d" => download = true,
            "--help" | "-h" => return Err(RunError::Usage(USAGE.to_string())),
            flag if flag.starts_with('-') => {
                return Err(RunError::Usage(format!("unknown option '{}'\n{}", flag, USAGE)))
            }
            value => positional.push(value.to_string()),
        }
    }

    if positional.is_empty() || positional.len() > 3 {
        return Err(RunError::Usage(USAGE.to_string()));
    }

    let mut positional = positional.into_iter();
    Ok(CliArgs {
        file: positional.next().map(PathBuf::from).unwrap_or_default(),
        spoken_lang: positional.next().map(LanguageCode::new),
        target_lang: positional.next().map(LanguageCode::new),
        download,
    })
}

/// Explicit languages from the command line must be ones the server offers
fn apply_language_choice(workflow: &UploadWorkflow, cli: &CliArgs) -> Result<(), RunError> {
    if let Some(code) = &cli.spoken_lang {
        if !workflow.select_spoken(code.clone()) {
            return Err(unknown_language("spoken", code, workflow));
        }
    }
    if let Some(code) = &cli.target_lang {
        if !workflow.select_target(code.clone()) {
            return Err(unknown_language("target", code, workflow));
        }
    }
    Ok(())
}

fn unknown_language(role: &str, code: &LanguageCode, workflow: &UploadWorkflow) -> RunError {
    let known = workflow.view().spoken_options;
    if known.is_empty() {
        RunError::Usage(format!(
            "unknown {} language '{}': the language list could not be loaded",
            role, code
        ))
    } else {
        RunError::Usage(format!(
            "unknown {} language '{}' (known: {})",
            role,
            code,
            known.join(", ")
        ))
    }
}

/// Terminal presentation: progress through tracing, notices on stderr
#[derive(Default)]
struct ConsoleSink {
    last_progress: Mutex<String>,
}

impl ViewSink for ConsoleSink {
    fn render(&self, view: &View) {
        let mut last = self.last_progress.lock().unwrap_or_else(|e| e.into_inner());
        if *last != view.progress_width {
            *last = view.progress_width.clone();
            tracing::info!("Progress {} ({:?})", view.progress_width, view.phase);
        }
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Run one upload cycle from command-line arguments. Returns the submission outcome.
pub async fn run(args: Vec<String>) -> Result<Outcome, RunError> {
    // Load environment variables from .env file
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt().with_writer(std::io::stderr).try_init();

    let cli = parse_args(&args)?;
    let config = ClientConfig::load()?;
    let base_url = config.server_base()?;

    let service = Arc::new(HttpTranscriptionService::new(
        base_url.clone(),
        config.timeout(),
    )?);
    let workflow = UploadWorkflow::new(
        service,
        Arc::new(ConsoleSink::default()),
        config.milestones,
        config.history_limit,
    );

    if let Err(e) = workflow.initialize().await {
        tracing::debug!("Continuing without a language list: {}", e);
    }

    workflow.select_file_path(&cli.file).await?;
    apply_language_choice(&workflow, &cli)?;

    let outcome = workflow.submit().await;
    print!("{}", workflow.view());

    if let (true, Outcome::Succeeded(output)) = (cli.download, &outcome) {
        let store = ArtifactStore::new(base_url, config.timeout())?;
        for name in [&output.srt_file, &output.video_file] {
            let path = store.fetch(name, &config.download_dir).await?;
            println!("Saved {}", path.display());
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fake::{EventLog, ScriptedService};

    struct QuietSink;

    impl ViewSink for QuietSink {
        fn render(&self, _view: &View) {}

        fn alert(&self, _message: &str) {}
    }

    fn workflow_with(service: ScriptedService) -> UploadWorkflow {
        UploadWorkflow::new(
            Arc::new(service),
            Arc::new(QuietSink),
            Milestones::default(),
            3,
        )
    }

    fn cli(spoken: Option<&str>, target: Option<&str>) -> CliArgs {
        CliArgs {
            file: PathBuf::from("talk.mp4"),
            spoken_lang: spoken.map(LanguageCode::from),
            target_lang: target.map(LanguageCode::from),
            download: false,
        }
    }

    #[tokio::test]
    async fn test_known_languages_are_applied() {
        let workflow = workflow_with(ScriptedService::new(&["english", "hindi"], EventLog::default()));
        workflow.initialize().await.unwrap();

        apply_language_choice(&workflow, &cli(Some("hindi"), Some("english"))).unwrap();
        let view = workflow.view();
        assert_eq!(view.spoken_selected.as_deref(), Some("hindi"));
        assert_eq!(view.target_selected.as_deref(), Some("english"));
    }

    #[tokio::test]
    async fn test_unknown_language_is_a_usage_error() {
        let workflow = workflow_with(ScriptedService::new(&["english", "hindi"], EventLog::default()));
        workflow.initialize().await.unwrap();

        match apply_language_choice(&workflow, &cli(Some("Hindi"), None)) {
            Err(RunError::Usage(message)) => {
                assert!(message.contains("'Hindi'"));
                assert!(message.contains("english, hindi"));
            }
            other => panic!("expected usage error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_language_without_list_is_a_usage_error() {
        let workflow = workflow_with(ScriptedService::failing_languages("refused", EventLog::default()));
        assert!(workflow.initialize().await.is_err());

        match apply_language_choice(&workflow, &cli(None, Some("english"))) {
            Err(RunError::Usage(message)) => {
                assert!(message.contains("target language 'english'"));
                assert!(message.contains("could not be loaded"));
            }
            other => panic!("expected usage error, got {:?}", other),
        }

        assert!(apply_language_choice(&workflow, &cli(None, None)).is_ok());
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_full_args() {
        let cli = parse_args(&args(&["talk.mp4", "hindi", "english", "--download"])).unwrap();
        assert_eq!(cli.file, PathBuf::from("talk.mp4"));
        assert_eq!(cli.spoken_lang, Some(LanguageCode::from("hindi")));
        assert_eq!(cli.target_lang, Some(LanguageCode::from("english")));
        assert!(cli.download);
    }

    #[test]
    fn test_parse_file_only() {
        let cli = parse_args(&args(&["voice.wav"])).unwrap();
        assert_eq!(cli.spoken_lang, None);
        assert_eq!(cli.target_lang, None);
        assert!(!cli.download);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(parse_args(&[]), Err(RunError::Usage(_))));
        assert!(matches!(
            parse_args(&args(&["a.mp4", "--verbose"])),
            Err(RunError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&args(&["a", "b", "c", "d"])),
            Err(RunError::Usage(_))
        ));
    }
}
