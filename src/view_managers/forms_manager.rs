use std::path::PathBuf;

use crate::{
    App,
    api_client::{self, Action, ActionRequest},
    log_util::log_debug,
};

const MIN_QUESTIONS: usize = 1;
const MAX_QUESTIONS: usize = 20;
const MIN_CARDS: usize = 1;
const MAX_CARDS: usize = 50;
const MIN_STUDY_DAYS: usize = 1;
const MAX_STUDY_DAYS: usize = 30;

pub(crate) struct FormsManager<'a> {
    app: &'a mut App,
}

impl<'a> FormsManager<'a> {
    pub(crate) fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    /// Append a typed character to the active tab's text field.
    pub(crate) fn push_char(&mut self, ch: char) {
        match self.app.tab {
            Action::Upload => self.app.file_path.push(ch),
            Action::Ask => self.app.query.push(ch),
            Action::Search => self.app.search_query.push(ch),
            _ => {}
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.app.tab {
            Action::Upload => {
                self.app.file_path.pop();
            }
            Action::Ask => {
                self.app.query.pop();
            }
            Action::Search => {
                self.app.search_query.pop();
            }
            _ => {}
        }
    }

    /// Step the active tab's numeric field, clamped to the backend's limits.
    pub(crate) fn adjust_numeric(&mut self, delta: isize) {
        match self.app.tab {
            Action::Quiz => {
                self.app.num_questions =
                    step(self.app.num_questions, delta, MIN_QUESTIONS, MAX_QUESTIONS);
            }
            Action::Flashcards => {
                self.app.num_cards = step(self.app.num_cards, delta, MIN_CARDS, MAX_CARDS);
            }
            Action::StudyPlan => {
                self.app.study_days = step(self.app.study_days, delta, MIN_STUDY_DAYS, MAX_STUDY_DAYS);
            }
            _ => {}
        }
    }

    pub(crate) fn cycle_difficulty(&mut self) {
        if self.app.tab == Action::Quiz {
            self.app.difficulty = self.app.difficulty.next();
        }
    }

    /// Validate the active tab's preconditions and issue its request.
    /// A failed precondition surfaces immediately, without a network call.
    pub(crate) fn submit(&mut self) {
        let request = match self.app.tab {
            Action::Upload => {
                let path = self.app.file_path.trim();
                if path.is_empty() {
                    self.reject("Please select a PDF file");
                    return;
                }
                ActionRequest::Upload {
                    file_path: PathBuf::from(path),
                }
            }
            Action::Ask => {
                let query = self.app.query.trim();
                if query.is_empty() {
                    self.reject("Please enter a question");
                    return;
                }
                ActionRequest::Ask {
                    query: query.to_string(),
                }
            }
            Action::Search => {
                let query = self.app.search_query.trim();
                if query.is_empty() {
                    self.reject("Please enter a search query");
                    return;
                }
                ActionRequest::Search {
                    query: query.to_string(),
                }
            }
            Action::Summary => ActionRequest::Summary,
            Action::Quiz => ActionRequest::Quiz {
                num_questions: self.app.num_questions,
                difficulty: self.app.difficulty,
            },
            Action::Flashcards => ActionRequest::Flashcards {
                num_cards: self.app.num_cards,
            },
            Action::MindMap => ActionRequest::MindMap,
            Action::StudyPlan => ActionRequest::StudyPlan {
                duration_days: self.app.study_days,
            },
        };

        api_client::submit_action(self.app, request);
    }

    fn reject(&mut self, message: &str) {
        self.app.error = Some(message.to_string());
        self.app.result = None;
        log_debug(&format!(
            "App: rejected {} submission: {}",
            self.app.tab.title(),
            message
        ));
    }
}

fn step(value: usize, delta: isize, minimum: usize, maximum: usize) -> usize {
    let updated = value as isize + delta;
    updated.clamp(minimum as isize, maximum as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Difficulty;
    use crate::test_support::test_app;

    #[test]
    fn empty_upload_path_is_rejected_without_a_request() {
        let mut app = test_app();
        app.tab = Action::Upload;
        app.file_path = "   ".to_string();

        FormsManager::new(&mut app).submit();

        assert_eq!(app.error.as_deref(), Some("Please select a PDF file"));
        assert!(!app.loading, "precondition failures must not start a request");
        assert!(app.result_receiver.is_none());
    }

    #[test]
    fn empty_query_is_rejected_without_a_request() {
        let mut app = test_app();
        app.tab = Action::Ask;

        FormsManager::new(&mut app).submit();

        assert_eq!(app.error.as_deref(), Some("Please enter a question"));
        assert!(!app.loading);
    }

    #[test]
    fn numeric_fields_clamp_at_their_limits() {
        let mut app = test_app();
        app.tab = Action::Quiz;
        app.num_questions = MAX_QUESTIONS;
        FormsManager::new(&mut app).adjust_numeric(1);
        assert_eq!(app.num_questions, MAX_QUESTIONS);

        app.num_questions = MIN_QUESTIONS;
        FormsManager::new(&mut app).adjust_numeric(-1);
        assert_eq!(app.num_questions, MIN_QUESTIONS);

        FormsManager::new(&mut app).adjust_numeric(3);
        assert_eq!(app.num_questions, MIN_QUESTIONS + 3);
    }

    #[test]
    fn difficulty_only_cycles_on_the_quiz_tab() {
        let mut app = test_app();
        app.tab = Action::Flashcards;
        let before = app.difficulty;
        FormsManager::new(&mut app).cycle_difficulty();
        assert_eq!(app.difficulty, before);

        app.tab = Action::Quiz;
        app.difficulty = Difficulty::Medium;
        FormsManager::new(&mut app).cycle_difficulty();
        assert_eq!(app.difficulty, Difficulty::Hard);
    }

    #[test]
    fn typing_edits_the_active_tabs_buffer_only() {
        let mut app = test_app();
        app.tab = Action::Ask;
        for ch in "hi".chars() {
            FormsManager::new(&mut app).push_char(ch);
        }
        assert_eq!(app.query, "hi");
        assert!(app.search_query.is_empty());

        FormsManager::new(&mut app).backspace();
        assert_eq!(app.query, "h");
    }
}
