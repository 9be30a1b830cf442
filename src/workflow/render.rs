use super::progress::Progress;
use super::state::{Phase, WorkflowState};
use serde::Serialize;
use std::fmt;

/// Everything a front end needs to draw the form, derived from `WorkflowState`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub phase: Phase,
    /// Bar width, e.g. `"60%"`; `"0%"` when blank
    pub progress_width: String,
    /// Bar label; empty when blank
    pub progress_text: String,
    pub spoken_options: Vec<String>,
    pub spoken_selected: Option<String>,
    pub target_options: Vec<String>,
    pub target_selected: Option<String>,
    pub file_name: Option<String>,
    pub transcribed_text: String,
    pub translated_text: String,
    pub srt_href: Option<String>,
    pub video_href: Option<String>,
    pub results_visible: bool,
}

pub fn render(state: &WorkflowState) -> View {
    let (progress_width, progress_text) = match state.progress {
        Progress::Blank => ("0%".to_string(), String::new()),
        Progress::Percent(p) => (format!("{}%", p), format!("{}%", p)),
    };

    let strings = |codes: &[crate::service::LanguageCode]| -> Vec<String> {
        codes.iter().map(|c| c.as_str().to_string()).collect()
    };

    View {
        phase: state.phase,
        progress_width,
        progress_text,
        spoken_options: strings(state.spoken.options()),
        spoken_selected: state.spoken.selected().map(|c| c.to_string()),
        target_options: strings(state.target.options()),
        target_selected: state.target.selected().map(|c| c.to_string()),
        file_name: state.file.as_ref().map(|f| f.file_name.clone()),
        transcribed_text: state.transcribed_text.clone(),
        translated_text: state.translated_text.clone(),
        srt_href: state.srt_link.clone(),
        video_href: state.video_link.clone(),
        results_visible: state.results_visible,
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {:?} [{}]", self.phase, self.progress_width)?;
        if !self.results_visible {
            return Ok(());
        }
        writeln!(f)?;
        writeln!(f, "Transcribed text:\n{}", self.transcribed_text)?;
        writeln!(f)?;
        writeln!(f, "Translated text:\n{}", self.translated_text)?;
        writeln!(f)?;
        if let Some(href) = &self.srt_href {
            writeln!(f, "Subtitles: {}", href)?;
        }
        if let Some(href) = &self.video_href {
            writeln!(f, "Video: {}", href)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::LanguageCode;
    use crate::workflow::state::Event;

    #[test]
    fn test_blank_progress_renders_empty_label() {
        let view = render(&WorkflowState::default());
        assert_eq!(view.progress_width, "0%");
        assert_eq!(view.progress_text, "");
        assert!(!view.results_visible);
        assert_eq!(view.phase, Phase::Idle);
    }

    #[test]
    fn test_percent_renders_width_and_label() {
        let mut state = WorkflowState::default();
        state.progress = Progress::Percent(60);
        let view = render(&state);
        assert_eq!(view.progress_width, "60%");
        assert_eq!(view.progress_text, "60%");
    }

    #[test]
    fn test_controls_are_projected() {
        let languages = vec![LanguageCode::from("ja"), LanguageCode::from("ko")];
        let (state, _) = WorkflowState::default().apply(Event::LanguagesLoaded(languages));
        let view = render(&state);
        assert_eq!(view.spoken_options, vec!["ja", "ko"]);
        assert_eq!(view.target_options, view.spoken_options);
        assert_eq!(view.target_selected.as_deref(), Some("ja"));
    }

    #[test]
    fn test_display_hides_results_until_visible() {
        let mut state = WorkflowState::default();
        state.transcribed_text = "hidden".to_string();
        let text = render(&state).to_string();
        assert!(!text.contains("hidden"));

        state.results_visible = true;
        state.srt_link = Some("/download/a.srt".to_string());
        let text = render(&state).to_string();
        assert!(text.contains("hidden"));
        assert!(text.contains("/download/a.srt"));
    }
}
