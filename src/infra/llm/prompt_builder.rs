pub struct PromptBuilder;

impl PromptBuilder {
    pub fn course_outline(topic: &str) -> String {
        let topic = topic.trim();
        format!(
            "Generate a course OUTLINE for the topic \"{topic}\".

Rules:
- At least 4 sections.
- Each section must have 1-3 lessons.
- Each lesson has a short duration estimate such as \"15 min\".

Return ONLY valid JSON in this shape:
{{
  \"title\": \"...\",
  \"description\": \"...\",
  \"sections\": [
    {{ \"id\": 1, \"title\": \"...\", \"lessons\": [ {{ \"id\": 1, \"title\": \"...\", \"duration\": \"...\" }} ] }}
  ]
}}"
        )
    }

    pub fn lesson(topic: &str, lesson_title: &str) -> String {
        let topic = topic.trim();
        let lesson_title = lesson_title.trim();
        format!(
            "Write a detailed lesson for the course \"{topic}\", lesson \"{lesson_title}\".

Return ONLY valid JSON with no markdown and no backticks:
{{
  \"title\": \"{lesson_title}\",
  \"content\": \"...\"
}}

Lesson requirements:
- Start teaching immediately; no \"In this lesson...\" introduction.
- Cover theory and core concepts in depth, with real-world examples.
- Describe diagrams or metaphors in words where they help.
- Include practical syntax or formats when relevant.
- Point out common mistakes and best practices.
- Aim for 1000-1200 words in an engaging, beginner-friendly tone.

Escape every newline inside \"content\" as \\n so the JSON stays valid."
        )
    }

    pub fn quiz(topic: &str, lesson_title: &str) -> String {
        let topic = topic.trim();
        let lesson_title = lesson_title.trim();
        format!(
            "Create a quiz for the course \"{topic}\", lesson \"{lesson_title}\".

Return ONLY valid JSON with no markdown and no backticks:
{{
  \"title\": \"Quiz: {lesson_title}\",
  \"questions\": [
    {{
      \"id\": 1,
      \"question\": \"...?\",
      \"options\": [\"Option A\", \"Option B\", \"Option C\", \"Option D\"],
      \"correctAnswer\": 0,
      \"explanation\": \"...\"
    }}
  ]
}}

Quiz requirements:
- Exactly 5 multiple-choice questions with 4 options each.
- correctAnswer is the 0-based index of the correct option.
- Mix difficulty: 2 easy, 2 medium, 1 challenging.
- Test understanding of key concepts; avoid trick questions.
- Give a brief explanation for every correct answer."
        )
    }
}
