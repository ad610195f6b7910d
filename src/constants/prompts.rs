pub const QUIZ_GENERATOR_PROMPT: &str = r#"You are a quiz generator. Create educational quizzes in JSON format.

Return ONLY valid JSON in this exact format:
{
  "title": "Quiz Title",
  "description": "Brief description",
  "questions": [
    {
      "prompt": "Question text",
      "solution_text": "Detailed explanation in HTML",
      "solution_video_url": "",
      "options": [
        {"option_text": "Option A", "is_correct": false},
        {"option_text": "Option B", "is_correct": true},
        {"option_text": "Option C", "is_correct": false},
        {"option_text": "Option D", "is_correct": false}
      ]
    }
  ]
}

Rules:
- Each question must have exactly 4 options
- Exactly one option per question must be is_correct: true
- solution_text should be a detailed HTML explanation
- Make questions educational and well-structured"#;

pub const EXPLANATION_PROMPT: &str = "You generate concise, well-structured HTML explanations for MCQ answers. Use semantic tags (h3, p, ul, li, code). Avoid external scripts or styles.";

pub fn quiz_request_prompt(topic: &str, question_count: u32, difficulty: &str) -> String {
    format!(
        "Create a {difficulty} level quiz about: {topic}\n\n\
         Generate exactly {question_count} questions with 4 multiple choice options each.\n\
         Include detailed explanations for each correct answer.\n\n\
         Return the quiz in the specified JSON format."
    )
}

pub fn explanation_request_prompt(question: &str, correct_answer: &str) -> String {
    let correct_answer = if correct_answer.trim().is_empty() {
        "(not provided)"
    } else {
        correct_answer
    };
    format!(
        "Question: {question}\nCorrect Answer: {correct_answer}\n\n\
         Write a thorough but concise explanation in HTML with:\n\
         - A short heading\n\
         - Why the correct option is correct\n\
         - Why the other options are wrong\n\
         - If helpful, a short example snippet in <code>"
    )
}
