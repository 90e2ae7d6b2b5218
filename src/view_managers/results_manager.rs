use std::collections::HashSet;

use crate::{App, log_util::log_debug, study_result::StudyResult};

pub(crate) struct ResultsManager<'a> {
    app: &'a mut App,
}

impl<'a> ResultsManager<'a> {
    pub(crate) fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    /// Whether Enter should toggle the selected item instead of resubmitting.
    pub(crate) fn has_toggleable_items(app: &App) -> bool {
        Self::item_count(app) > 0
            && matches!(
                app.result,
                Some(StudyResult::Quiz(_)) | Some(StudyResult::Flashcards(_))
            )
    }

    pub(crate) fn item_count(app: &App) -> usize {
        match &app.result {
            Some(StudyResult::Quiz(questions)) => questions.len(),
            Some(StudyResult::Flashcards(cards)) => cards.len(),
            Some(StudyResult::SearchHits(hits)) => hits.len(),
            _ => 0,
        }
    }

    pub(crate) fn select_next(&mut self) {
        let count = Self::item_count(self.app);
        if count == 0 {
            self.scroll_down();
            return;
        }
        self.app.selected_item = (self.app.selected_item + 1) % count;
    }

    pub(crate) fn select_previous(&mut self) {
        let count = Self::item_count(self.app);
        if count == 0 {
            self.scroll_up();
            return;
        }
        if self.app.selected_item == 0 {
            self.app.selected_item = count - 1;
        } else {
            self.app.selected_item -= 1;
        }
    }

    /// Flip the selected item's boolean: answer reveal for quiz questions,
    /// face flip for flashcards. Toggling twice restores the original state.
    pub(crate) fn toggle_selected(&mut self) {
        let index = self.app.selected_item;
        match &self.app.result {
            Some(StudyResult::Quiz(questions)) if index < questions.len() => {
                toggle_flag(&mut self.app.revealed, index);
                log_debug(&format!(
                    "App: question {} answer {}",
                    index + 1,
                    if self.app.revealed.contains(&index) {
                        "revealed"
                    } else {
                        "hidden"
                    }
                ));
            }
            Some(StudyResult::Flashcards(cards)) if index < cards.len() => {
                toggle_flag(&mut self.app.flipped, index);
                log_debug(&format!(
                    "App: card {} showing {}",
                    index + 1,
                    if self.app.flipped.contains(&index) {
                        "back"
                    } else {
                        "front"
                    }
                ));
            }
            _ => {}
        }
    }

    pub(crate) fn scroll_down(&mut self) {
        self.app.scroll = self.app.scroll.saturating_add(1);
    }

    pub(crate) fn scroll_up(&mut self) {
        self.app.scroll = self.app.scroll.saturating_sub(1);
    }
}

fn toggle_flag(flags: &mut HashSet<usize>, index: usize) {
    if !flags.remove(&index) {
        flags.insert(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::Action;
    use crate::study_result::{Flashcard, QuizQuestion};
    use crate::test_support::test_app;

    fn quiz_app(question_count: usize) -> App {
        let mut app = test_app();
        app.tab = Action::Quiz;
        let questions = (0..question_count)
            .map(|index| QuizQuestion {
                question: format!("Question {}", index + 1),
                options: vec!["yes".to_string(), "no".to_string()],
                answer: Some("A".to_string()),
                explanation: None,
            })
            .collect();
        app.result = Some(StudyResult::Quiz(questions));
        app
    }

    fn flashcards_app(card_count: usize) -> App {
        let mut app = test_app();
        app.tab = Action::Flashcards;
        let cards = (0..card_count)
            .map(|index| Flashcard {
                front: format!("front {}", index),
                back: format!("back {}", index),
                category: None,
            })
            .collect();
        app.result = Some(StudyResult::Flashcards(cards));
        app
    }

    #[test]
    fn reveal_toggle_is_idempotent_under_double_toggle() {
        let mut app = quiz_app(3);
        app.selected_item = 1;

        ResultsManager::new(&mut app).toggle_selected();
        assert!(app.revealed.contains(&1));

        ResultsManager::new(&mut app).toggle_selected();
        assert!(!app.revealed.contains(&1), "double-toggle must return to hidden");
        assert!(app.revealed.is_empty());
    }

    #[test]
    fn flip_state_is_independent_per_card() {
        let mut app = flashcards_app(4);
        app.selected_item = 0;
        ResultsManager::new(&mut app).toggle_selected();

        app.selected_item = 2;
        ResultsManager::new(&mut app).toggle_selected();

        assert!(app.flipped.contains(&0));
        assert!(!app.flipped.contains(&1));
        assert!(app.flipped.contains(&2));
        assert!(!app.flipped.contains(&3));

        // Flipping one card back leaves the other untouched.
        app.selected_item = 0;
        ResultsManager::new(&mut app).toggle_selected();
        assert!(!app.flipped.contains(&0));
        assert!(app.flipped.contains(&2));
    }

    #[test]
    fn selection_wraps_across_items() {
        let mut app = quiz_app(2);
        ResultsManager::new(&mut app).select_next();
        assert_eq!(app.selected_item, 1);
        ResultsManager::new(&mut app).select_next();
        assert_eq!(app.selected_item, 0);
        ResultsManager::new(&mut app).select_previous();
        assert_eq!(app.selected_item, 1);
    }

    #[test]
    fn toggling_out_of_range_does_nothing() {
        let mut app = quiz_app(1);
        app.selected_item = 5;
        ResultsManager::new(&mut app).toggle_selected();
        assert!(app.revealed.is_empty());
    }

    #[test]
    fn text_results_scroll_instead_of_selecting() {
        let mut app = test_app();
        app.result = Some(StudyResult::Summary("long text".to_string()));
        ResultsManager::new(&mut app).select_next();
        assert_eq!(app.scroll, 1);
        ResultsManager::new(&mut app).select_previous();
        assert_eq!(app.scroll, 0);
        assert!(!ResultsManager::has_toggleable_items(&app));
    }
}
