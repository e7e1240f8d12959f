mod course_generation;
mod generation_service;

pub use course_generation::CourseGenerator;
pub use generation_service::GenerationService;
