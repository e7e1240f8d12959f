use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{
    CourseOutline, ErrorCode, GenerationError, Lesson, LessonContent, Quiz, QuizQuestion,
};

pub const COURSE_OUTLINE_JSON_SCHEMA: &str = r#"
{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["title", "sections"],
  "properties": {
    "title": { "type": "string", "minLength": 1 },
    "description": { "type": "string" },
    "sections": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["title"],
        "properties": {
          "id": { "type": ["integer", "string"] },
          "title": { "type": "string", "minLength": 1 },
          "lessons": {
            "type": "array",
            "items": {
              "type": "object",
              "required": ["title"],
              "properties": {
                "id": { "type": ["integer", "string"] },
                "title": { "type": "string", "minLength": 1 },
                "duration": { "type": "string" }
              }
            }
          }
        }
      }
    }
  }
}
"#;

pub const LESSON_JSON_SCHEMA: &str = r#"
{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["title", "content"],
  "properties": {
    "title": { "type": "string" },
    "content": {
      "anyOf": [
        { "type": "string" },
        { "type": "array", "items": { "type": "string" } }
      ]
    }
  }
}
"#;

pub const QUIZ_JSON_SCHEMA: &str = r#"
{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["questions"],
  "properties": {
    "title": { "type": "string" },
    "questions": { "type": "array" }
  }
}
"#;

/// Applied to each quiz question on its own so one malformed entry does not sink the quiz.
pub const QUIZ_QUESTION_JSON_SCHEMA: &str = r#"
{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["question", "options", "correctAnswer"],
  "properties": {
    "id": { "type": ["integer", "string"] },
    "question": { "type": "string", "minLength": 1 },
    "options": {
      "type": "array",
      "minItems": 2,
      "items": { "type": "string" }
    },
    "correctAnswer": { "type": "integer", "minimum": 0 },
    "explanation": { "type": "string" }
  }
}
"#;

/// Typed gate applied after the sanitizer has recovered a JSON object.
pub struct CourseSchemaValidator {
    outline: JSONSchema,
    lesson: JSONSchema,
    quiz: JSONSchema,
    quiz_question: JSONSchema,
}

impl CourseSchemaValidator {
    pub fn new() -> Result<Self, GenerationError> {
        Ok(Self {
            outline: compile("course outline", COURSE_OUTLINE_JSON_SCHEMA)?,
            lesson: compile("lesson", LESSON_JSON_SCHEMA)?,
            quiz: compile("quiz", QUIZ_JSON_SCHEMA)?,
            quiz_question: compile("quiz question", QUIZ_QUESTION_JSON_SCHEMA)?,
        })
    }

    pub fn validate_outline(&self, value: Value) -> Result<CourseOutline, GenerationError> {
        validate_and_decode(&self.outline, "course outline", value)
    }

    /// Array content is joined into paragraphs. The title is returned as given.
    pub fn validate_lesson(&self, value: Value) -> Result<Lesson, GenerationError> {
        let raw: RawLesson = validate_and_decode(&self.lesson, "lesson", value)?;
        Ok(Lesson {
            title: raw.title,
            content: raw.content.into_text(),
        })
    }

    /// Fails only when `questions` is missing or not an array. Questions that do not match
    /// the question schema are dropped one by one, so the result may hold none.
    pub fn validate_quiz(&self, value: Value) -> Result<Quiz, GenerationError> {
        let raw: RawQuiz = validate_and_decode(&self.quiz, "quiz", value)?;
        let total = raw.questions.len();
        let questions = raw
            .questions
            .into_iter()
            .enumerate()
            .filter_map(|(index, question)| {
                let decoded: Result<QuizQuestion, _> =
                    validate_and_decode(&self.quiz_question, "quiz question", question);
                decoded
                    .inspect_err(|error| {
                        tracing::warn!(index, %error, "dropping malformed quiz question");
                    })
                    .ok()
            })
            .collect::<Vec<_>>();
        if questions.len() < total {
            tracing::debug!(kept = questions.len(), total, "filtered quiz questions");
        }

        Ok(Quiz {
            title: raw.title.unwrap_or_default(),
            questions,
        })
    }
}

#[derive(serde::Deserialize)]
struct RawLesson {
    title: String,
    content: LessonContent,
}

#[derive(serde::Deserialize)]
struct RawQuiz {
    #[serde(default)]
    title: Option<String>,
    questions: Vec<Value>,
}

fn compile(name: &str, schema: &str) -> Result<JSONSchema, GenerationError> {
    let schema: Value = serde_json::from_str(schema).map_err(|err| {
        GenerationError::new(
            ErrorCode::UnknownError,
            format!("invalid built-in {name} schema: {err}"),
        )
    })?;
    JSONSchema::compile(&schema).map_err(|err| {
        GenerationError::new(
            ErrorCode::UnknownError,
            format!("failed to compile {name} schema: {err}"),
        )
    })
}

fn validate_and_decode<T>(schema: &JSONSchema, name: &str, value: Value) -> Result<T, GenerationError>
where
    T: DeserializeOwned,
{
    schema
        .validate(&value)
        .map_err(|errors| schema_validation_error(name, errors))?;

    serde_json::from_value(value).map_err(|err| {
        GenerationError::new(
            ErrorCode::InvalidResponse,
            format!("{name} JSON did not match the expected contract: {err}"),
        )
    })
}

fn schema_validation_error<'a, I>(name: &str, errors: I) -> GenerationError
where
    I: IntoIterator<Item = jsonschema::ValidationError<'a>>,
{
    let details = errors
        .into_iter()
        .map(|err| err.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    GenerationError::new(
        ErrorCode::InvalidResponse,
        format!("{name} schema validation failed: {details}"),
    )
}
