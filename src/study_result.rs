use serde_json::Value;

use crate::api_client::Action;

/// Nodes nested deeper than this are kept but their children are dropped,
/// since the backend gives no acyclicity or depth guarantee for mind maps.
pub(crate) const MAX_MINDMAP_DEPTH: usize = 12;

const LABEL_FIELDS: [&str; 3] = ["title", "name", "topic"];
const CHILD_FIELDS: [&str; 2] = ["children", "subtopics"];

/// Decoded backend result, tagged by the action that produced it.
///
/// Every structured variant has [`StudyResult::Raw`] as its fallback: the
/// backend's shapes are ad hoc and may change, so decoding never errors.
/// Anything unexpected is carried as display-ready text instead.
#[derive(Debug, Clone, PartialEq)]
pub enum StudyResult {
    /// Upload status echoed whole, exactly as the backend reported it.
    Upload(Value),
    Answer(String),
    SearchHits(Vec<SearchHit>),
    Summary(String),
    Quiz(Vec<QuizQuestion>),
    Flashcards(Vec<Flashcard>),
    MindMap(MindMapNode),
    StudyPlan(StudyPlan),
    /// Unparseable or unexpected shape, rendered as preformatted text.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub relevance: Option<String>,
    pub chunk_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub question: String,
    /// Option texts in original order; the renderer letters them by position.
    pub options: Vec<String>,
    pub answer: Option<String>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MindMapNode {
    pub label: String,
    pub description: Option<String>,
    pub children: Vec<MindMapNode>,
    /// Set when children existed but were dropped at [`MAX_MINDMAP_DEPTH`].
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudyPlan {
    pub days: Vec<StudyDay>,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudyDay {
    /// Explicit day number when the backend provides one; the renderer
    /// derives one from the list position otherwise.
    pub day: Option<u64>,
    pub topics: Vec<String>,
    pub tasks: Vec<String>,
    pub duration: Option<String>,
}

/// One line of a rendered mind map, in pre-order.
#[derive(Debug, Clone, PartialEq)]
pub struct MindMapEntry {
    pub depth: usize,
    pub label: String,
    pub description: Option<String>,
    pub truncated: bool,
}

impl StudyResult {
    /// Decode a successful response body for the given action.
    pub fn from_response(action: Action, body: Value) -> Self {
        match action {
            Action::Upload => Self::Upload(body),
            Action::Ask => match body.get("answer").and_then(Value::as_str) {
                Some(answer) => Self::Answer(answer.to_string()),
                None => Self::raw(&body),
            },
            Action::Search => match body.get("results").and_then(Value::as_array) {
                Some(items) => Self::SearchHits(items.iter().map(parse_search_hit).collect()),
                None => Self::raw(&body),
            },
            Action::Summary => match body.get("summary").and_then(Value::as_str) {
                Some(summary) => Self::Summary(summary.to_string()),
                None => Self::raw(&body),
            },
            Action::Quiz => match embedded_value(&body, "quiz") {
                Embedded::Missing => Self::raw(&body),
                Embedded::Text(text) => Self::Raw(text),
                Embedded::Structured(value) => match parse_quiz(&value) {
                    Some(questions) => Self::Quiz(questions),
                    None => Self::raw(&value),
                },
            },
            Action::Flashcards => match embedded_value(&body, "flashcards") {
                Embedded::Missing => Self::raw(&body),
                Embedded::Text(text) => Self::Raw(text),
                Embedded::Structured(value) => match parse_flashcards(&value) {
                    Some(cards) => Self::Flashcards(cards),
                    None => Self::raw(&value),
                },
            },
            Action::MindMap => match embedded_value(&body, "mindmap") {
                Embedded::Missing => Self::raw(&body),
                Embedded::Text(text) => Self::Raw(text),
                Embedded::Structured(value) => match parse_mindmap_node(&value, 0) {
                    Some(root) => Self::MindMap(root),
                    None => Self::raw(&value),
                },
            },
            Action::StudyPlan => match embedded_value(&body, "study_plan") {
                Embedded::Missing => Self::raw(&body),
                Embedded::Text(text) => Self::Raw(text),
                Embedded::Structured(value) => match parse_study_plan(&value) {
                    Some(plan) => Self::StudyPlan(plan),
                    None => Self::raw(&value),
                },
            },
        }
    }

    fn raw(value: &Value) -> Self {
        Self::Raw(pretty(value))
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

enum Embedded {
    Missing,
    /// A string field that does not contain JSON; shown as-is.
    Text(String),
    Structured(Value),
}

/// Pull a result field out of the response body, accepting both an
/// already-structured value and a JSON-encoded string.
fn embedded_value(body: &Value, field: &str) -> Embedded {
    match body.get(field) {
        None => Embedded::Missing,
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => Embedded::Structured(parsed),
            Err(_) => Embedded::Text(raw.clone()),
        },
        Some(other) => Embedded::Structured(other.clone()),
    }
}

fn parse_search_hit(item: &Value) -> SearchHit {
    SearchHit {
        text: item
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| pretty(item)),
        relevance: string_field(item, &["relevance"]),
        chunk_id: item.get("chunk_id").and_then(Value::as_u64),
    }
}

fn parse_quiz(value: &Value) -> Option<Vec<QuizQuestion>> {
    let items = question_items(value)?;
    let mut questions = Vec::with_capacity(items.len());
    for item in items {
        let question = item.get("question").and_then(Value::as_str)?.to_string();
        questions.push(QuizQuestion {
            question,
            options: parse_options(item.get("options")),
            answer: string_field(item, &["answer", "correct_answer"]),
            explanation: string_field(item, &["explanation"]),
        });
    }
    Some(questions)
}

fn question_items(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("questions").and_then(Value::as_array),
        _ => None,
    }
}

/// Options arrive as a letter-to-text map, a list of strings, or a list of
/// objects carrying a `text` field. Order of a map follows its keys, which
/// matches the lettered order the backend emits.
fn parse_options(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(option_text).collect(),
        Some(Value::Object(map)) => map.values().map(option_text).collect(),
        _ => Vec::new(),
    }
}

fn option_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    }
}

fn parse_flashcards(value: &Value) -> Option<Vec<Flashcard>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.get("cards").and_then(Value::as_array)?,
        _ => return None,
    };
    let mut cards = Vec::with_capacity(items.len());
    for item in items {
        cards.push(Flashcard {
            front: item.get("front").and_then(Value::as_str)?.to_string(),
            back: item.get("back").and_then(Value::as_str)?.to_string(),
            category: string_field(item, &["category"]),
        });
    }
    Some(cards)
}

fn parse_mindmap_node(value: &Value, depth: usize) -> Option<MindMapNode> {
    if let Value::String(label) = value {
        // Leaf subtopics are often plain strings.
        return Some(MindMapNode {
            label: label.clone(),
            description: None,
            children: Vec::new(),
            truncated: false,
        });
    }

    let label = string_field(value, &LABEL_FIELDS)?;
    let description = string_field(value, &["description"]);
    let child_values = CHILD_FIELDS
        .iter()
        .find_map(|name| value.get(*name).and_then(Value::as_array));

    let has_children = child_values.map(|items| !items.is_empty()).unwrap_or(false);
    if has_children && depth + 1 >= MAX_MINDMAP_DEPTH {
        return Some(MindMapNode {
            label,
            description,
            children: Vec::new(),
            truncated: true,
        });
    }

    let children = child_values
        .map(|items| {
            items
                .iter()
                .filter_map(|child| parse_mindmap_node(child, depth + 1))
                .collect()
        })
        .unwrap_or_default();

    Some(MindMapNode {
        label,
        description,
        children,
        truncated: false,
    })
}

fn parse_study_plan(value: &Value) -> Option<StudyPlan> {
    let (days_value, tips_value) = match value {
        Value::Array(_) => (Some(value), None),
        Value::Object(map) => (
            ["daily_plan", "days"].iter().find_map(|name| map.get(*name)),
            map.get("tips"),
        ),
        _ => (None, None),
    };

    let items = days_value.and_then(Value::as_array)?;
    let days = items
        .iter()
        .map(|item| StudyDay {
            day: item.get("day").and_then(Value::as_u64),
            topics: string_list(item.get("topics")),
            tasks: string_list(item.get("tasks")),
            duration: string_field(item, &["duration", "estimated_time"]),
        })
        .collect();

    let tips = tips_value.map(|value| string_list(Some(value))).unwrap_or_default();
    Some(StudyPlan { days, tips })
}

fn string_field(item: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| item.get(*name).and_then(Value::as_str))
        .map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Flatten a mind map into pre-order entries the renderer can style by depth.
pub(crate) fn flatten_mindmap(root: &MindMapNode) -> Vec<MindMapEntry> {
    let mut entries = Vec::new();
    push_entries(root, 0, &mut entries);
    entries
}

fn push_entries(node: &MindMapNode, depth: usize, out: &mut Vec<MindMapEntry>) {
    out.push(MindMapEntry {
        depth,
        label: node.label.clone(),
        description: node.description.clone(),
        truncated: node.truncated,
    });
    for child in &node.children {
        push_entries(child, depth + 1, out);
    }
}
