use crate::{App, api_client::Action, log_util::log_debug};

pub(crate) struct TabsManager<'a> {
    app: &'a mut App,
}

impl<'a> TabsManager<'a> {
    pub(crate) fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    /// Make `tab` the active tab, discarding everything the previous tab was
    /// showing so its content never renders under the new tab.
    pub(crate) fn activate(&mut self, tab: Action) {
        if self.app.tab == tab {
            return;
        }
        self.app.tab = tab;
        Self::clear_tab_state(self.app);
        log_debug(&format!("App: switched to {} tab", tab.title()));
    }

    pub(crate) fn next_tab(&mut self) {
        let position = Self::position(self.app.tab);
        self.activate(Action::ALL[(position + 1) % Action::ALL.len()]);
    }

    pub(crate) fn previous_tab(&mut self) {
        let position = Self::position(self.app.tab);
        let previous = position
            .checked_sub(1)
            .unwrap_or(Action::ALL.len() - 1);
        self.activate(Action::ALL[previous]);
    }

    pub(crate) fn jump_to(&mut self, digit: char) {
        if let Some(index) = digit.to_digit(10) {
            let index = index as usize;
            if (1..=Action::ALL.len()).contains(&index) {
                self.activate(Action::ALL[index - 1]);
            }
        }
    }

    pub(crate) fn clear_tab_state(app: &mut App) {
        app.result = None;
        app.error = None;
        app.status = None;
        app.revealed.clear();
        app.flipped.clear();
        app.selected_item = 0;
        app.scroll = 0;
    }

    fn position(tab: Action) -> usize {
        Action::ALL
            .iter()
            .position(|candidate| *candidate == tab)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::study_result::StudyResult;
    use crate::test_support::test_app;

    #[test]
    fn switching_tabs_clears_result_error_and_toggles() {
        let mut app = test_app();
        app.tab = Action::Quiz;
        app.result = Some(StudyResult::Answer("stale".to_string()));
        app.error = Some("stale error".to_string());
        app.status = Some("stale status".to_string());
        app.revealed.insert(0);
        app.revealed.insert(3);
        app.flipped.insert(1);
        app.selected_item = 2;
        app.scroll = 9;

        TabsManager::new(&mut app).activate(Action::Flashcards);

        assert_eq!(app.tab, Action::Flashcards);
        assert!(app.result.is_none());
        assert!(app.error.is_none());
        assert!(app.status.is_none());
        assert!(app.revealed.is_empty());
        assert!(app.flipped.is_empty());
        assert_eq!(app.selected_item, 0);
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn reactivating_the_current_tab_keeps_its_state() {
        let mut app = test_app();
        app.tab = Action::Quiz;
        app.revealed.insert(1);

        TabsManager::new(&mut app).activate(Action::Quiz);

        assert!(app.revealed.contains(&1));
    }

    #[test]
    fn tab_cycling_wraps_in_both_directions() {
        let mut app = test_app();
        app.tab = Action::StudyPlan;
        TabsManager::new(&mut app).next_tab();
        assert_eq!(app.tab, Action::Upload);

        TabsManager::new(&mut app).previous_tab();
        assert_eq!(app.tab, Action::StudyPlan);
    }

    #[test]
    fn digit_jump_targets_the_matching_tab() {
        let mut app = test_app();
        TabsManager::new(&mut app).jump_to('5');
        assert_eq!(app.tab, Action::Quiz);

        TabsManager::new(&mut app).jump_to('9');
        assert_eq!(app.tab, Action::Quiz, "out-of-range digits are ignored");
    }
}
