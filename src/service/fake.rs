// src/service/fake.rs
// Scripted in-memory service for tests

use super::{
    LanguageCode, ServiceError, ServiceResponse, TranscriptionResult, TranscriptionService,
    UploadRequest,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub enum Reply {
    Status {
        status: u16,
        body: Result<TranscriptionResult, String>,
    },
    NetworkFailure(String),
    /// Hold the submission until the sender fires, then answer with the inner reply
    Gated(oneshot::Receiver<()>, Box<Reply>),
}

pub struct ScriptedService {
    languages: Result<Vec<LanguageCode>, String>,
    replies: Mutex<VecDeque<Reply>>,
    pub submitted: Mutex<Vec<UploadRequest>>,
    pub log: EventLog,
}

impl ScriptedService {
    pub fn new(languages: &[&str], log: EventLog) -> Self {
        Self {
            languages: Ok(languages.iter().map(|c| LanguageCode::from(*c)).collect()),
            replies: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            log,
        }
    }

    pub fn failing_languages(message: &str, log: EventLog) -> Self {
        Self {
            languages: Err(message.to_string()),
            ..Self::new(&[], log)
        }
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn submission_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    fn note(&self, entry: &str) {
        self.log.lock().unwrap().push(entry.to_string());
    }
}

#[async_trait]
impl TranscriptionService for ScriptedService {
    async fn languages(&self) -> Result<Vec<LanguageCode>, ServiceError> {
        self.note("languages");
        self.languages
            .clone()
            .map_err(ServiceError::NetworkError)
    }

    async fn submit(
        &self,
        request: &UploadRequest,
    ) -> Result<Box<dyn ServiceResponse>, ServiceError> {
        self.note(&format!("submit:{}", request.generation));
        self.submitted.lock().unwrap().push(request.clone());

        let mut reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply left");

        while let Reply::Gated(gate, inner) = reply {
            let _ = gate.await;
            reply = *inner;
        }

        match reply {
            Reply::Status { status, body } => Ok(Box::new(ScriptedResponse {
                status,
                body,
                log: self.log.clone(),
            })),
            Reply::NetworkFailure(message) => Err(ServiceError::NetworkError(message)),
            Reply::Gated(..) => unreachable!(),
        }
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}

struct ScriptedResponse {
    status: u16,
    body: Result<TranscriptionResult, String>,
    log: EventLog,
}

#[async_trait]
impl ServiceResponse for ScriptedResponse {
    fn status(&self) -> u16 {
        self.status
    }

    async fn result(self: Box<Self>) -> Result<TranscriptionResult, ServiceError> {
        self.log.lock().unwrap().push("body".to_string());
        self.body.map_err(ServiceError::DecodeError)
    }
}
