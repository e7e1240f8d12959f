mod course;
mod errors;
mod generation_contract;

pub use course::{
    CourseOutline, CourseSection, ItemId, LESSON_FALLBACK_CONTENT, Lesson, LessonContent,
    LessonOutline, OUTLINE_FALLBACK_TITLE, Quiz, QuizQuestion,
};
pub use errors::{ErrorCode, GenerationError, OrchestrationError};
pub use generation_contract::{GenerationResult, ProviderDescriptor, validate_prompt};
