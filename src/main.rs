mod api_client;
mod config;
mod log_util;
mod study_result;
mod ui_renderer;
mod view_managers;

use api_client::{Action, ApiClient, ApiTaskMessage};
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use dotenvy::dotenv;
use log_util::log_debug;
use ratatui::{DefaultTerminal, Frame};
use std::{
    collections::HashSet,
    sync::mpsc::{Receiver, TryRecvError},
    time::Duration,
};
use study_result::StudyResult;
use ui_renderer::UiRenderer;
use view_managers::{FormsManager, ResultsManager, TabsManager};

pub(crate) const LOADING_FRAMES: [&str; 4] = ["-", "\\", "|", "/"];

fn main() -> color_eyre::Result<()> {
    dotenv().ok();
    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = App::new().run(terminal);
    ratatui::restore();
    result
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    pub(crate) running: bool,
    /// Currently active tab; each tab corresponds to one backend action.
    pub(crate) tab: Action,
    /// Path of the PDF to upload.
    pub(crate) file_path: String,
    /// Question text for the ask tab.
    pub(crate) query: String,
    /// Query text for the search tab.
    pub(crate) search_query: String,
    pub(crate) num_questions: usize,
    pub(crate) difficulty: config::Difficulty,
    pub(crate) num_cards: usize,
    pub(crate) study_days: usize,
    /// Decoded result of the most recent completed action, if any.
    pub(crate) result: Option<StudyResult>,
    /// Single replaceable error banner.
    pub(crate) error: Option<String>,
    /// Latest informational message summarising the current result.
    pub(crate) status: Option<String>,
    /// Indicates whether a backend request is currently running.
    pub(crate) loading: bool,
    /// Spinner frame index for the active loading indicator.
    pub(crate) loading_frame: usize,
    /// Receives the outcome of the most recently submitted request.
    pub(crate) result_receiver: Option<Receiver<ApiTaskMessage>>,
    /// Indices of quiz questions whose answer is currently revealed.
    pub(crate) revealed: HashSet<usize>,
    /// Indices of flashcards currently showing their back face.
    pub(crate) flipped: HashSet<usize>,
    /// Cursor within the rendered result items.
    pub(crate) selected_item: usize,
    /// Vertical scroll offset of the result panel.
    pub(crate) scroll: u16,
    pub(crate) api_client: ApiClient,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new() -> Self {
        let mut startup_error: Option<String> = None;
        if let Err(err) = config::initialize() {
            Self::push_error(
                &mut startup_error,
                format!("Configuration load failed: {}", err),
            );
        }
        let config = config::current();

        Self {
            running: false,
            tab: Action::Upload,
            file_path: String::new(),
            query: String::new(),
            search_query: String::new(),
            num_questions: config.default_num_questions,
            difficulty: config.default_difficulty,
            num_cards: config.default_num_cards,
            study_days: config.default_study_days,
            result: None,
            error: startup_error,
            status: None,
            loading: false,
            loading_frame: 0,
            result_receiver: None,
            revealed: HashSet::new(),
            flipped: HashSet::new(),
            selected_item: 0,
            scroll: 0,
            api_client: ApiClient::new(config.api_base_url),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.running = true;
        let tick_rate = Duration::from_millis(120);
        while self.running {
            self.poll_api_messages();
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events(tick_rate)?;
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        UiRenderer::new(self).render(frame);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    fn handle_crossterm_events(&mut self, tick_rate: Duration) -> Result<()> {
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(_) => {}
                Event::Resize(_, _) => {}
                _ => {}
            }
            self.poll_api_messages();
        } else {
            self.on_tick();
        }
        Ok(())
    }

    fn on_tick(&mut self) {
        if self.loading {
            self.loading_frame = (self.loading_frame + 1) % LOADING_FRAMES.len();
        }
        self.poll_api_messages();
    }

    /// Drain the result channel. Loading always clears here, whether the
    /// worker answered or died, so the view can never stay stuck in loading
    /// once the worker is gone.
    fn poll_api_messages(&mut self) {
        let mut clear_receiver = false;
        if let Some(receiver) = self.result_receiver.as_ref() {
            match receiver.try_recv() {
                Ok(message) => {
                    self.loading = false;
                    clear_receiver = true;
                    match message {
                        ApiTaskMessage::Success { action, result } => {
                            self.handle_api_success(action, result)
                        }
                        ApiTaskMessage::Error { action, message } => {
                            self.handle_api_error(action, message)
                        }
                    }
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.loading = false;
                    clear_receiver = true;
                    self.handle_api_error(
                        self.tab,
                        "Background request worker disconnected".to_string(),
                    );
                }
            }
        }

        if clear_receiver {
            self.result_receiver = None;
        }
    }

    fn handle_api_success(&mut self, action: Action, result: StudyResult) {
        if action != self.tab {
            log_debug(&format!(
                "App: discarding {} response after tab switch",
                action.title()
            ));
            return;
        }

        self.revealed.clear();
        self.flipped.clear();
        self.selected_item = 0;
        self.scroll = 0;
        self.status = Some(result_status(&result));
        log_debug(&format!("App: stored {} result", action.title()));
        self.result = Some(result);
    }

    fn handle_api_error(&mut self, action: Action, message: String) {
        if action != self.tab {
            log_debug(&format!(
                "App: discarding {} error after tab switch: {}",
                action.title(),
                message
            ));
            return;
        }
        log_debug(&format!("App: {} failed: {}", action.title(), message));
        self.error = Some(message);
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc)
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Tab) => TabsManager::new(self).next_tab(),
            (_, KeyCode::BackTab) => TabsManager::new(self).previous_tab(),
            _ if self.tab.has_text_input() => self.on_text_tab_key(key),
            _ => self.on_generator_tab_key(key),
        }
    }

    /// Upload, ask and search claim printable keys for their text field.
    fn on_text_tab_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Enter) => FormsManager::new(self).submit(),
            (KeyModifiers::NONE, KeyCode::Backspace) => FormsManager::new(self).backspace(),
            (KeyModifiers::NONE, KeyCode::Down) => ResultsManager::new(self).select_next(),
            (KeyModifiers::NONE, KeyCode::Up) => ResultsManager::new(self).select_previous(),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(ch)) => {
                FormsManager::new(self).push_char(ch)
            }
            _ => {}
        }
    }

    fn on_generator_tab_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => self.quit(),
            (KeyModifiers::NONE, KeyCode::Char(digit @ '1'..='8')) => {
                TabsManager::new(self).jump_to(digit)
            }
            (KeyModifiers::NONE, KeyCode::Enter) => {
                if ResultsManager::has_toggleable_items(self) {
                    ResultsManager::new(self).toggle_selected();
                } else {
                    FormsManager::new(self).submit();
                }
            }
            (KeyModifiers::NONE, KeyCode::Char('g')) => FormsManager::new(self).submit(),
            (KeyModifiers::NONE, KeyCode::Char(' ')) => {
                ResultsManager::new(self).toggle_selected()
            }
            (KeyModifiers::NONE, KeyCode::Down | KeyCode::Char('j')) => {
                ResultsManager::new(self).select_next()
            }
            (KeyModifiers::NONE, KeyCode::Up | KeyCode::Char('k')) => {
                ResultsManager::new(self).select_previous()
            }
            (KeyModifiers::NONE, KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-')) => {
                FormsManager::new(self).adjust_numeric(-1)
            }
            (
                KeyModifiers::NONE,
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') | KeyCode::Char('='),
            ) => FormsManager::new(self).adjust_numeric(1),
            (KeyModifiers::NONE, KeyCode::Char('d')) => FormsManager::new(self).cycle_difficulty(),
            _ => {}
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }

    /// Append a message to an optional error slot.
    pub(crate) fn push_error(slot: &mut Option<String>, message: String) {
        if let Some(existing) = slot {
            existing.push_str(" | ");
            existing.push_str(&message);
        } else {
            *slot = Some(message);
        }
    }
}

fn result_status(result: &StudyResult) -> String {
    match result {
        StudyResult::Upload(_) => "Upload complete".to_string(),
        StudyResult::Answer(_) => "Answer received".to_string(),
        StudyResult::SearchHits(hits) => format!("{} matching section(s)", hits.len()),
        StudyResult::Summary(_) => "Summary ready".to_string(),
        StudyResult::Quiz(questions) => format!("Quiz ready with {} question(s)", questions.len()),
        StudyResult::Flashcards(cards) => format!("{} flashcard(s) ready", cards.len()),
        StudyResult::MindMap(_) => "Mind map ready".to_string(),
        StudyResult::StudyPlan(plan) => format!("Study plan ready for {} day(s)", plan.days.len()),
        StudyResult::Raw(_) => "Response shape was unexpected; showing raw text".to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A default-state [`App`] that never touches the network or the
    /// filesystem, for exercising state transitions in tests.
    pub(crate) fn test_app() -> App {
        App {
            running: false,
            tab: Action::Upload,
            file_path: String::new(),
            query: String::new(),
            search_query: String::new(),
            num_questions: 5,
            difficulty: config::Difficulty::Medium,
            num_cards: 10,
            study_days: 7,
            result: None,
            error: None,
            status: None,
            loading: false,
            loading_frame: 0,
            result_receiver: None,
            revealed: HashSet::new(),
            flipped: HashSet::new(),
            selected_item: 0,
            scroll: 0,
            api_client: ApiClient::new("http://localhost:8000"),
        }
    }
}
