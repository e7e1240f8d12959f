use serde::{Deserialize, Serialize};

pub const OUTLINE_FALLBACK_TITLE: &str = "Parsing Error";
pub const LESSON_FALLBACK_CONTENT: &str = "Content could not be generated";
const QUIZ_FALLBACK_QUESTION: &str =
    "Quiz content could not be generated properly. Please try again.";
const QUIZ_FALLBACK_EXPLANATION: &str = "This is a fallback question due to generation error.";

/// Identifiers come back from models as either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(u64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOutline {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<CourseSection>,
}

impl CourseOutline {
    pub fn fallback(raw: &str) -> Self {
        Self {
            title: OUTLINE_FALLBACK_TITLE.to_string(),
            description: raw.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn lesson_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.lessons.len())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSection {
    #[serde(default)]
    pub id: Option<ItemId>,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<LessonOutline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonOutline {
    #[serde(default)]
    pub id: Option<ItemId>,
    pub title: String,
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    pub content: String,
}

impl Lesson {
    /// Lesson returned when the model output cannot be recovered or fails validation.
    pub fn fallback(lesson_title: &str) -> Self {
        Self {
            title: lesson_title.to_string(),
            content: LESSON_FALLBACK_CONTENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LessonContent {
    Text(String),
    Paragraphs(Vec<String>),
}

impl LessonContent {
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Paragraphs(paragraphs) => paragraphs.join("\n\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    pub fn title_for(lesson_title: &str) -> String {
        format!("Quiz: {lesson_title}")
    }

    pub fn fallback(lesson_title: &str) -> Self {
        Self {
            title: Self::title_for(lesson_title),
            questions: vec![QuizQuestion {
                id: Some(ItemId::Number(1)),
                question: QUIZ_FALLBACK_QUESTION.to_string(),
                options: ["Option A", "Option B", "Option C", "Option D"]
                    .iter()
                    .map(|option| (*option).to_string())
                    .collect(),
                correct_answer: 0,
                explanation: QUIZ_FALLBACK_EXPLANATION.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(default)]
    pub id: Option<ItemId>,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}
