use crate::{
    App, LOADING_FRAMES,
    api_client::Action,
    study_result::{
        self, Flashcard, MindMapNode, QuizQuestion, SearchHit, StudyPlan, StudyResult,
    },
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph, Tabs, Wrap},
};

/// Color/icon pairs cycled by mind-map nesting depth.
const MINDMAP_PALETTE: [(Color, &str); 5] = [
    (Color::Cyan, "◆"),
    (Color::Yellow, "●"),
    (Color::Green, "▸"),
    (Color::Magenta, "•"),
    (Color::Blue, "·"),
];

pub(crate) struct UiRenderer<'a> {
    app: &'a App,
}

impl<'a> UiRenderer<'a> {
    pub(crate) fn new(app: &'a App) -> Self {
        Self { app }
    }

    pub(crate) fn render(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Min(6),
                Constraint::Length(5),
            ])
            .split(frame.area());

        self.render_header(frame, layout[0]);
        self.render_tab_bar(frame, layout[1]);
        self.render_form(frame, layout[2]);
        self.render_result(frame, layout[3]);
        self.render_status(frame, layout[4]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = Line::from("StudyHub AI Assistant").bold().cyan().centered();
        let body = format!(
            "Transform your PDFs into interactive study materials\nBackend: {}",
            self.app.api_client.base_url()
        );
        frame.render_widget(
            Paragraph::new(body)
                .block(Block::bordered().title(title))
                .centered(),
            area,
        );
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = Action::ALL
            .iter()
            .enumerate()
            .map(|(index, action)| {
                Line::from(vec![
                    Span::styled(format!("{} ", index + 1), Style::default().dim()),
                    Span::raw(action.title()),
                ])
            })
            .collect();
        let selected = Action::ALL
            .iter()
            .position(|action| *action == self.app.tab)
            .unwrap_or(0);

        frame.render_widget(
            Tabs::new(titles)
                .block(Block::bordered())
                .select(selected)
                .highlight_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
            area,
        );
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let app = self.app;
        let body = match app.tab {
            Action::Upload => format!(
                "File path: {}▌\nUpload a PDF to make it available to every other tab.",
                app.file_path
            ),
            Action::Ask => format!(
                "Question: {}▌\nAnswers are grounded in the uploaded PDF.",
                app.query
            ),
            Action::Search => format!(
                "Search terms: {}▌\nFinds the sections of the PDF closest to your terms.",
                app.search_query
            ),
            Action::Summary => {
                "Generate a concise summary of the uploaded PDF.".to_string()
            }
            Action::Quiz => format!(
                "Questions: {}\nDifficulty: {}",
                app.num_questions,
                app.difficulty.label()
            ),
            Action::Flashcards => format!("Cards: {}", app.num_cards),
            Action::MindMap => {
                "Visualize key concepts and their relationships.".to_string()
            }
            Action::StudyPlan => format!("Duration: {} day(s)", app.study_days),
        };

        frame.render_widget(
            Paragraph::new(body)
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(Line::from(app.tab.title()))),
            area,
        );
    }

    fn render_result(&self, frame: &mut Frame, area: Rect) {
        let lines = self.result_lines();
        frame.render_widget(
            Paragraph::new(Text::from(lines))
                .wrap(Wrap { trim: false })
                .scroll((self.app.scroll, 0))
                .block(Block::bordered().title(Line::from("Result"))),
            area,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let app = self.app;
        let mut status_lines = Vec::new();
        if let Some(error) = &app.error {
            status_lines.push(format!("Error: {}", error));
        }
        if let Some(status) = &app.status {
            status_lines.push(format!("Status: {}", status));
        }
        status_lines.push(key_hint(app.tab).to_string());
        status_lines.push("Tab/Shift-Tab switch tabs. Esc or Ctrl-C quits.".to_string());

        frame.render_widget(
            Paragraph::new(status_lines.join("\n"))
                .block(Block::bordered().title(Line::from("Status"))),
            area,
        );
    }

    fn result_lines(&self) -> Vec<Line<'static>> {
        let app = self.app;
        if app.loading {
            let frame_symbol = LOADING_FRAMES[app.loading_frame % LOADING_FRAMES.len()];
            return vec![
                Line::from(format!("{} Waiting for the StudyHub backend…", frame_symbol)),
                Line::default(),
                Line::from("Results will appear here once the request completes."),
            ];
        }

        match &app.result {
            None => vec![Line::from(idle_hint(app.tab))],
            Some(StudyResult::Upload(value)) => text_block(&pretty(value)),
            Some(StudyResult::Answer(answer)) => {
                let mut lines = vec![Line::from("Answer:").bold().cyan(), Line::default()];
                lines.extend(text_block(answer));
                lines
            }
            Some(StudyResult::Summary(summary)) => text_block(summary),
            Some(StudyResult::SearchHits(hits)) => search_lines(app, hits),
            Some(StudyResult::Quiz(questions)) => quiz_lines(app, questions),
            Some(StudyResult::Flashcards(cards)) => flashcard_lines(app, cards),
            Some(StudyResult::MindMap(root)) => mindmap_lines(root),
            Some(StudyResult::StudyPlan(plan)) => studyplan_lines(plan),
            Some(StudyResult::Raw(text)) => text_block(text),
        }
    }
}

fn idle_hint(tab: Action) -> &'static str {
    match tab {
        Action::Upload => "No upload yet. Provide a path above and press Enter.",
        Action::Ask => "Ask a question about the uploaded PDF to see the answer here.",
        Action::Search => "Matching sections of the PDF will appear here.",
        Action::Summary => "Press Enter to generate a summary.",
        Action::Quiz => "Press Enter to generate a quiz.",
        Action::Flashcards => "Press Enter to generate flashcards.",
        Action::MindMap => "Press Enter to generate a mind map.",
        Action::StudyPlan => "Press Enter to generate a study plan.",
    }
}

fn key_hint(tab: Action) -> &'static str {
    match tab {
        Action::Upload => "Type the PDF path. Enter uploads.",
        Action::Ask => "Type your question. Enter submits. ↑/↓ scroll the answer.",
        Action::Search => "Type search terms. Enter searches. ↑/↓ move through hits.",
        Action::Summary => "Enter or g generates. j/k scroll.",
        Action::Quiz => {
            "Enter/g generates. j/k select a question, Space reveals. ←/→ count, d difficulty."
        }
        Action::Flashcards => "Enter/g generates. j/k select a card, Space flips it. ←/→ count.",
        Action::MindMap => "Enter or g generates. j/k scroll.",
        Action::StudyPlan => "Enter or g generates. ←/→ days. j/k scroll.",
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn text_block(text: &str) -> Vec<Line<'static>> {
    if text.is_empty() {
        return vec![Line::from("(empty response)")];
    }
    text.lines().map(|line| Line::from(line.to_string())).collect()
}

fn search_lines(app: &App, hits: &[SearchHit]) -> Vec<Line<'static>> {
    if hits.is_empty() {
        return vec![Line::from("No matching sections found.")];
    }
    let mut lines = Vec::new();
    for (index, hit) in hits.iter().enumerate() {
        let marker = if index == app.selected_item { "▶" } else { " " };
        let mut header = format!("{} Hit {}", marker, index + 1);
        if let Some(relevance) = &hit.relevance {
            header.push_str(&format!(" (relevance: {})", relevance));
        }
        if let Some(chunk_id) = hit.chunk_id {
            header.push_str(&format!(" (chunk {})", chunk_id));
        }
        lines.push(Line::from(header).dim());
        lines.push(Line::from(format!("   {}", hit.text)));
        lines.push(Line::default());
    }
    lines
}

fn quiz_lines(app: &App, questions: &[QuizQuestion]) -> Vec<Line<'static>> {
    if questions.is_empty() {
        return vec![Line::from("The quiz came back without any questions.")];
    }
    let total = questions.len();
    let mut lines = Vec::new();
    for (index, question) in questions.iter().enumerate() {
        let marker = if index == app.selected_item { "▶" } else { " " };
        lines.push(
            Line::from(format!(
                "{} Question {}/{}: {}",
                marker,
                index + 1,
                total,
                question.question
            ))
            .bold(),
        );
        if question.options.is_empty() {
            lines.push(Line::from("     (no answer options provided)"));
        }
        for (option_index, option) in question.options.iter().enumerate() {
            lines.push(Line::from(format!(
                "     {}. {}",
                option_label(option_index),
                option
            )));
        }
        if app.revealed.contains(&index) {
            if question.answer.is_none() && question.explanation.is_none() {
                lines.push(Line::from("     (no answer provided)").dim());
            }
            if let Some(answer) = &question.answer {
                lines.push(Line::from(format!("     Answer: {}", answer)).green());
            }
            if let Some(explanation) = &question.explanation {
                lines.push(Line::from(format!("     Explanation: {}", explanation)));
            }
        } else {
            lines.push(Line::from("     Space reveals the answer").dim());
        }
        lines.push(Line::default());
    }
    lines
}

fn flashcard_lines(app: &App, cards: &[Flashcard]) -> Vec<Line<'static>> {
    if cards.is_empty() {
        return vec![Line::from("No flashcards were generated.")];
    }
    let total = cards.len();
    let mut lines = Vec::new();
    for (index, card) in cards.iter().enumerate() {
        let marker = if index == app.selected_item { "▶" } else { " " };
        let flipped = app.flipped.contains(&index);
        let (face, text) = if flipped {
            ("back", &card.back)
        } else {
            ("front", &card.front)
        };
        let mut header = format!("{} Card {}/{} [{}]", marker, index + 1, total, face);
        if let Some(category) = &card.category {
            header.push_str(&format!(" ({})", category));
        }
        lines.push(Line::from(header).bold());
        lines.push(Line::from(format!("     {}", text)));
        lines.push(Line::default());
    }
    lines
}

fn mindmap_lines(root: &MindMapNode) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for entry in study_result::flatten_mindmap(root) {
        let (color, icon) = MINDMAP_PALETTE[entry.depth % MINDMAP_PALETTE.len()];
        let indent = "  ".repeat(entry.depth);
        lines.push(Line::from(vec![
            Span::raw(indent.clone()),
            Span::styled(
                format!("{} {}", icon, entry.label),
                Style::default().fg(color),
            ),
        ]));
        if let Some(description) = entry.description {
            lines.push(Line::from(format!("{}  {}", indent, description)).dim());
        }
        if entry.truncated {
            lines.push(Line::from(format!("{}  (deeper levels omitted)", indent)).dim());
        }
    }
    lines
}

fn studyplan_lines(plan: &StudyPlan) -> Vec<Line<'static>> {
    if plan.days.is_empty() {
        return vec![Line::from("The study plan came back without any days.")];
    }
    let mut lines = Vec::new();
    for (index, day) in plan.days.iter().enumerate() {
        let day_number = day.day.unwrap_or(index as u64 + 1);
        lines.push(Line::from(format!("Day {}", day_number)).bold().cyan());
        if let Some(duration) = &day.duration {
            lines.push(Line::from(format!("  Duration: {}", duration)));
        }
        if !day.topics.is_empty() {
            lines.push(Line::from("  Topics:"));
            for topic in &day.topics {
                lines.push(Line::from(format!("    - {}", topic)));
            }
        }
        if !day.tasks.is_empty() {
            lines.push(Line::from("  Tasks:"));
            for task in &day.tasks {
                lines.push(Line::from(format!("    - {}", task)));
            }
        }
        lines.push(Line::default());
    }
    if !plan.tips.is_empty() {
        lines.push(Line::from("Tips").bold());
        for tip in &plan.tips {
            lines.push(Line::from(format!("  - {}", tip)));
        }
    }
    lines
}

fn option_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
