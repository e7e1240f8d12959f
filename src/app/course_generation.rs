use serde_json::{Value, json};

use crate::domain::{
    CourseOutline, GenerationError, LESSON_FALLBACK_CONTENT, Lesson, OrchestrationError, Quiz,
};
use crate::infra::llm::schema_validator::CourseSchemaValidator;
use crate::infra::llm::{PromptBuilder, SanitizeOptions, is_parse_failure, safe_parse_json};

use super::GenerationService;

/// Course outline, lesson and quiz generation on top of the provider fallback.
///
/// Provider exhaustion propagates as an error. Malformed model output never does: each use
/// case degrades to a well-shaped fallback record instead.
pub struct CourseGenerator {
    service: GenerationService,
    validator: CourseSchemaValidator,
}

impl CourseGenerator {
    pub fn new(service: GenerationService) -> Result<Self, GenerationError> {
        Ok(Self {
            service,
            validator: CourseSchemaValidator::new()?,
        })
    }

    pub fn generate_course_outline(&self, topic: &str) -> Result<CourseOutline, OrchestrationError> {
        let topic = require_field("Topic", topic)?;
        let output = self.service.generate(&PromptBuilder::course_outline(topic))?.output;

        let options = SanitizeOptions::new()
            .with_fallback(json!({ "sections": [] }))
            .require(["title", "sections"]);
        let parsed = safe_parse_json(&output, &options);
        if is_parse_failure(&parsed) {
            return Ok(CourseOutline::fallback(&output));
        }

        match self.validator.validate_outline(Value::Object(parsed)) {
            Ok(outline) => Ok(outline),
            Err(error) => {
                tracing::warn!(%error, "course outline failed validation");
                Ok(CourseOutline::fallback(&output))
            }
        }
    }

    pub fn generate_lesson(
        &self,
        topic: &str,
        lesson_title: &str,
    ) -> Result<Lesson, OrchestrationError> {
        let topic = require_field("Topic", topic)?;
        let lesson_title = require_field("lessonTitle", lesson_title)?;
        let output = self
            .service
            .generate(&PromptBuilder::lesson(topic, lesson_title))?
            .output;

        let options = SanitizeOptions::new()
            .with_fallback(json!({ "title": lesson_title }))
            .require(["title", "content"]);
        let parsed = safe_parse_json(&output, &options);
        if is_parse_failure(&parsed) {
            return Ok(Lesson::fallback(lesson_title));
        }

        let mut lesson = match self.validator.validate_lesson(Value::Object(parsed)) {
            Ok(lesson) => lesson,
            Err(error) => {
                tracing::warn!(%error, "lesson failed validation");
                return Ok(Lesson::fallback(lesson_title));
            }
        };
        if lesson.title.trim().is_empty() {
            lesson.title = lesson_title.to_string();
        }
        if lesson.content.trim().is_empty() {
            lesson.content = LESSON_FALLBACK_CONTENT.to_string();
        }
        Ok(lesson)
    }

    pub fn generate_quiz(&self, topic: &str, lesson_title: &str) -> Result<Quiz, OrchestrationError> {
        let topic = require_field("Topic", topic)?;
        let lesson_title = require_field("lessonTitle", lesson_title)?;
        let output = self
            .service
            .generate(&PromptBuilder::quiz(topic, lesson_title))?
            .output;

        let options = SanitizeOptions::new().require(["questions"]);
        let parsed = safe_parse_json(&output, &options);
        if is_parse_failure(&parsed) {
            return Ok(Quiz::fallback(lesson_title));
        }

        let mut quiz = match self.validator.validate_quiz(Value::Object(parsed)) {
            Ok(quiz) => quiz,
            Err(error) => {
                tracing::warn!(%error, "quiz failed validation");
                return Ok(Quiz::fallback(lesson_title));
            }
        };
        if quiz.title.trim().is_empty() {
            quiz.title = Quiz::title_for(lesson_title);
        }
        Ok(quiz)
    }
}

fn require_field<'a>(name: &str, value: &'a str) -> Result<&'a str, OrchestrationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OrchestrationError::invalid_input(format!("{name} is required")));
    }
    Ok(trimmed)
}
