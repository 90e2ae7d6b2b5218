use std::{
    fs,
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
};

use color_eyre::eyre::{Result, eyre};
use reqwest::{Client, multipart};
use serde_json::{Value, json};
use tokio::runtime::Runtime;

use crate::{App, config::Difficulty, log_util::log_debug, study_result::StudyResult};

/// One of the eight user-triggered backend operations. Each maps to exactly
/// one tab and one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upload,
    Ask,
    Search,
    Summary,
    Quiz,
    Flashcards,
    MindMap,
    StudyPlan,
}

impl Action {
    pub(crate) const ALL: [Action; 8] = [
        Action::Upload,
        Action::Ask,
        Action::Search,
        Action::Summary,
        Action::Quiz,
        Action::Flashcards,
        Action::MindMap,
        Action::StudyPlan,
    ];

    pub(crate) fn path(self) -> &'static str {
        match self {
            Self::Upload => "/pdf/upload",
            Self::Ask => "/query/ask",
            Self::Search => "/query/search",
            Self::Summary => "/generate/summary",
            Self::Quiz => "/generate/quiz",
            Self::Flashcards => "/generate/flashcards",
            Self::MindMap => "/generate/mindmap",
            Self::StudyPlan => "/generate/studyplan",
        }
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            Self::Upload => "Upload PDF",
            Self::Ask => "Ask Query",
            Self::Search => "Search",
            Self::Summary => "Summary",
            Self::Quiz => "Quiz",
            Self::Flashcards => "Flashcards",
            Self::MindMap => "Mind Map",
            Self::StudyPlan => "Study Plan",
        }
    }

    /// Message shown for a non-success status whose body carries no `detail`.
    pub(crate) fn request_failed_message(self) -> &'static str {
        match self {
            Self::Upload => "Upload failed",
            Self::Ask => "Query failed",
            Self::Search => "Search failed",
            Self::Summary => "Summary generation failed",
            Self::Quiz => "Quiz generation failed",
            Self::Flashcards => "Flashcard generation failed",
            Self::MindMap => "Mindmap generation failed",
            Self::StudyPlan => "Study plan generation failed",
        }
    }

    /// Message shown when the backend cannot be reached or a success
    /// response cannot be decoded.
    pub(crate) fn transport_failure_message(self) -> &'static str {
        match self {
            Self::Upload => "Failed to upload PDF",
            Self::Ask => "Failed to get answer",
            Self::Search => "Failed to search",
            Self::Summary => "Failed to generate summary",
            Self::Quiz => "Failed to generate quiz",
            Self::Flashcards => "Failed to generate flashcards",
            Self::MindMap => "Failed to generate mindmap",
            Self::StudyPlan => "Failed to generate study plan",
        }
    }

    /// Tabs whose form is a free-text field claim printable keys for typing.
    pub(crate) fn has_text_input(self) -> bool {
        matches!(self, Self::Upload | Self::Ask | Self::Search)
    }
}

/// Form state snapshot captured on the UI thread when an action is submitted.
#[derive(Debug, Clone)]
pub(crate) enum ActionRequest {
    Upload { file_path: PathBuf },
    Ask { query: String },
    Search { query: String },
    Summary,
    Quiz { num_questions: usize, difficulty: Difficulty },
    Flashcards { num_cards: usize },
    MindMap,
    StudyPlan { duration_days: usize },
}

impl ActionRequest {
    pub(crate) fn action(&self) -> Action {
        match self {
            Self::Upload { .. } => Action::Upload,
            Self::Ask { .. } => Action::Ask,
            Self::Search { .. } => Action::Search,
            Self::Summary => Action::Summary,
            Self::Quiz { .. } => Action::Quiz,
            Self::Flashcards { .. } => Action::Flashcards,
            Self::MindMap => Action::MindMap,
            Self::StudyPlan { .. } => Action::StudyPlan,
        }
    }
}

#[derive(Debug)]
pub(crate) enum ApiTaskMessage {
    Success { action: Action, result: StudyResult },
    Error { action: Action, message: String },
}

/// Issues requests against the StudyHub backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    api_base: String,
}

impl ApiClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.api_base
    }

    /// Execute one action against the backend and decode the response.
    ///
    /// Errors carry the exact text to display: the server's `detail` for a
    /// non-success status, or the action's generic fallback otherwise.
    pub(crate) async fn execute(&self, request: ActionRequest) -> Result<StudyResult> {
        let action = request.action();
        let endpoint = format!("{}{}", self.api_base, action.path());
        log_debug(&format!("ApiClient: POST {}", endpoint));

        let builder = match &request {
            ActionRequest::Upload { file_path } => {
                let form = upload_form(file_path)?;
                self.client.post(&endpoint).multipart(form)
            }
            ActionRequest::Ask { query } | ActionRequest::Search { query } => {
                self.client.post(&endpoint).json(&json!({ "query": query }))
            }
            ActionRequest::Summary | ActionRequest::MindMap => {
                self.client.post(&endpoint).json(&json!({}))
            }
            ActionRequest::Quiz {
                num_questions,
                difficulty,
            } => self.client.post(&endpoint).json(&json!({
                "num_questions": num_questions,
                "difficulty": difficulty.as_request_value(),
            })),
            ActionRequest::Flashcards { num_cards } => self
                .client
                .post(&endpoint)
                .json(&json!({ "num_cards": num_cards })),
            ActionRequest::StudyPlan { duration_days } => self
                .client
                .post(&endpoint)
                .json(&json!({ "duration_days": duration_days })),
        };

        let response = builder.send().await.map_err(|err| {
            log_debug(&format!("ApiClient: {} transport error: {}", action.path(), err));
            eyre!(action.transport_failure_message())
        })?;

        let status = response.status();
        log_debug(&format!("ApiClient: {} returned {}", action.path(), status));

        if !status.is_success() {
            // A response did arrive, so an undecodable error body still
            // reports the request-failed fallback, not a transport failure.
            let body = response.json::<Value>().await.unwrap_or_else(|err| {
                log_debug(&format!(
                    "ApiClient: {} error body decode error: {}",
                    action.path(),
                    err
                ));
                Value::Null
            });
            return Err(eyre!(error_message(action, &body)));
        }

        let body: Value = response.json().await.map_err(|err| {
            log_debug(&format!("ApiClient: {} body decode error: {}", action.path(), err));
            eyre!(action.transport_failure_message())
        })?;

        Ok(StudyResult::from_response(action, body))
    }
}

/// Error text for a non-success status: the server-supplied `detail` string
/// when present, the per-action fallback otherwise.
pub(crate) fn error_message(action: Action, body: &Value) -> String {
    body.get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| action.request_failed_message().to_string())
}

fn upload_form(file_path: &Path) -> Result<multipart::Form> {
    let bytes = fs::read(file_path)
        .map_err(|err| eyre!(format!("Failed to read {}: {}", file_path.display(), err)))?;
    let file_name = file_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.pdf")
        .to_string();
    let part = multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str("application/pdf")
        .map_err(|err| {
            log_debug(&format!("ApiClient: multipart build error: {}", err));
            eyre!(Action::Upload.transport_failure_message())
        })?;
    Ok(multipart::Form::new().part("file", part))
}

/// Submit an action from the UI thread. The request runs on a background
/// worker with its own Tokio runtime; the outcome arrives through the app's
/// result channel and is picked up by the main loop's polling.
///
/// A submission while a request is already in flight replaces the tracked
/// receiver, so the superseded request's late response is discarded.
pub(crate) fn submit_action(app: &mut App, request: ActionRequest) {
    let action = request.action();
    log_debug(&format!("App: submitting {} request", action.title()));

    let client = app.api_client.clone();
    let (sender, receiver) = mpsc::channel();
    app.result_receiver = Some(receiver);
    app.loading = true;
    app.loading_frame = 0;
    app.result = None;
    app.error = None;
    app.status = None;
    app.revealed.clear();
    app.flipped.clear();
    app.selected_item = 0;
    app.scroll = 0;

    thread::spawn(move || {
        let runtime = match Runtime::new() {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = sender.send(ApiTaskMessage::Error {
                    action,
                    message: format!("Failed to build Tokio runtime: {}", err),
                });
                return;
            }
        };

        let result = runtime.block_on(client.execute(request));
        drop(runtime);

        match result {
            Ok(decoded) => {
                let _ = sender.send(ApiTaskMessage::Success {
                    action,
                    result: decoded,
                });
            }
            Err(err) => {
                let _ = sender.send(ApiTaskMessage::Error {
                    action,
                    message: err.to_string(),
                });
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_message_uses_server_detail_verbatim() {
        let body = json!({"detail": "No PDF uploaded yet. Please upload a PDF first."});
        for action in Action::ALL {
            assert_eq!(
                error_message(action, &body),
                "No PDF uploaded yet. Please upload a PDF first."
            );
        }
    }

    #[test]
    fn error_message_falls_back_per_action_without_detail() {
        let body = json!({"unexpected": true});
        assert_eq!(error_message(Action::Upload, &body), "Upload failed");
        assert_eq!(error_message(Action::Ask, &body), "Query failed");
        assert_eq!(error_message(Action::StudyPlan, &body), "Study plan generation failed");
    }

    #[test]
    fn error_message_ignores_non_string_detail() {
        let body = json!({"detail": {"code": 42}});
        assert_eq!(error_message(Action::Search, &body), "Search failed");
    }

    #[test]
    fn error_message_falls_back_for_undecodable_error_bodies() {
        assert_eq!(error_message(Action::Upload, &Value::Null), "Upload failed");
    }

    #[test]
    fn every_action_has_a_distinct_endpoint() {
        let mut paths: Vec<&str> = Action::ALL.iter().map(|action| action.path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), Action::ALL.len());
    }
}
