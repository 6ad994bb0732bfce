//! Quiz data model.
//!
//! Field names mirror the quiz JSON produced by the authoring side (`q`,
//! `options`, `correct`, `explanation`, `image`) so existing files
//! deserialize without adaptation. A question whose `options` list has
//! exactly one entry is an essay question; the sole entry is the model
//! answer the grader scores against.

use serde::{Deserialize, Serialize};

/// One quiz question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Prompt text, markdown-lite (fenced code, inline code, newlines).
    #[serde(rename = "q")]
    pub prompt: String,

    /// Ordered option texts. A single entry marks an essay question.
    pub options: Vec<String>,

    /// Index of the correct option. Absent for essay questions.
    #[serde(default)]
    pub correct: Option<usize>,

    #[serde(default)]
    pub explanation: Option<String>,

    /// Image source: an http(s) URL or a local file path.
    #[serde(default)]
    pub image: Option<String>,
}

impl Question {
    pub fn is_essay(&self) -> bool {
        self.options.len() == 1
    }

    /// Model answer for essay questions.
    pub fn model_answer(&self) -> Option<&str> {
        if self.is_essay() {
            self.options.first().map(String::as_str)
        } else {
            None
        }
    }
}

/// The user's response to one question, parallel to the question list.
/// Deserializes from the app's answers array: an option index, free text,
/// or `null` for a skipped question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum UserAnswer {
    Choice(usize),
    Text(String),
    #[default]
    Skipped,
}

impl UserAnswer {
    pub fn is_skipped(&self) -> bool {
        match self {
            UserAnswer::Skipped => true,
            UserAnswer::Text(t) => t.trim().is_empty(),
            UserAnswer::Choice(_) => false,
        }
    }
}

/// Per-question outcome shown in the header strip in results mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Correct,
    Wrong,
    Skipped,
    Essay,
}

impl QuestionStatus {
    pub fn of(question: &Question, answer: &UserAnswer) -> Self {
        if question.is_essay() {
            return QuestionStatus::Essay;
        }
        match answer {
            UserAnswer::Choice(i) if Some(*i) == question.correct => QuestionStatus::Correct,
            UserAnswer::Choice(_) => QuestionStatus::Wrong,
            _ => QuestionStatus::Skipped,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestionStatus::Correct => "CORRECT",
            QuestionStatus::Wrong => "WRONG",
            QuestionStatus::Skipped => "SKIPPED",
            QuestionStatus::Essay => "ESSAY",
        }
    }
}

/// Export configuration: document title and identity strings for the page
/// chrome. Page geometry is fixed (see [`crate::theme`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    pub title: String,
    #[serde(default = "default_username")]
    pub username: String,
    /// Branding line in the footer, drawn through the rasterization path so
    /// it may be non-Latin.
    #[serde(default = "default_watermark")]
    pub watermark: String,
}

fn default_username() -> String {
    "User".to_string()
}

fn default_watermark() -> String {
    "Crafted with quizpress".to_string()
}

impl Default for QuizConfig {
    fn default() -> Self {
        QuizConfig {
            title: "Quiz".to_string(),
            username: default_username(),
            watermark: default_watermark(),
        }
    }
}

/// Aggregate tally for the results-mode score block. Essay questions are
/// counted but excluded from the percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub correct: usize,
    pub wrong: usize,
    pub skipped: usize,
    pub essays: usize,
    pub scorable: usize,
    pub percentage: u32,
}

impl ScoreSummary {
    pub const PASS_THRESHOLD: u32 = 70;

    pub fn compute(questions: &[Question], answers: &[UserAnswer]) -> Self {
        let mut s = ScoreSummary {
            correct: 0,
            wrong: 0,
            skipped: 0,
            essays: 0,
            scorable: 0,
            percentage: 0,
        };
        for (i, q) in questions.iter().enumerate() {
            let answer = answers.get(i).cloned().unwrap_or_default();
            if q.is_essay() {
                s.essays += 1;
                continue;
            }
            s.scorable += 1;
            match QuestionStatus::of(q, &answer) {
                QuestionStatus::Correct => s.correct += 1,
                QuestionStatus::Wrong => s.wrong += 1,
                _ => s.skipped += 1,
            }
        }
        if s.scorable > 0 {
            s.percentage = ((s.correct as f32 / s.scorable as f32) * 100.0).round() as u32;
        }
        s
    }

    pub fn is_passing(&self) -> bool {
        self.percentage >= Self::PASS_THRESHOLD
    }
}

/// Strip raw control characters that would corrupt PDF streams, normalize
/// line endings, and trim. All other Unicode passes through untouched.
pub fn sanitize(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || !(c.is_control()))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parse a question list from the app's quiz JSON.
pub fn questions_from_json(json: &str) -> Result<Vec<Question>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_json_round_trip() {
        let json = r#"[
            {"q": "What is `2 + 2`?", "options": ["3", "4", "5"], "correct": 1,
             "explanation": "Basic arithmetic."},
            {"q": "Define TCP.", "options": ["Transmission Control Protocol"]}
        ]"#;
        let questions = questions_from_json(json).unwrap();
        assert_eq!(questions.len(), 2);
        assert!(!questions[0].is_essay());
        assert_eq!(questions[0].correct, Some(1));
        assert!(questions[1].is_essay());
        assert_eq!(
            questions[1].model_answer(),
            Some("Transmission Control Protocol")
        );
    }

    #[test]
    fn answers_accept_index_text_and_null() {
        let answers: Vec<UserAnswer> = serde_json::from_str(r#"[2, "my essay", null]"#).unwrap();
        assert_eq!(answers[0], UserAnswer::Choice(2));
        assert_eq!(answers[1], UserAnswer::Text("my essay".to_string()));
        assert_eq!(answers[2], UserAnswer::Skipped);
    }

    #[test]
    fn status_classification() {
        let q = Question {
            prompt: "p".into(),
            options: vec!["a".into(), "b".into()],
            correct: Some(1),
            explanation: None,
            image: None,
        };
        assert_eq!(
            QuestionStatus::of(&q, &UserAnswer::Choice(1)),
            QuestionStatus::Correct
        );
        assert_eq!(
            QuestionStatus::of(&q, &UserAnswer::Choice(0)),
            QuestionStatus::Wrong
        );
        assert_eq!(
            QuestionStatus::of(&q, &UserAnswer::Skipped),
            QuestionStatus::Skipped
        );
    }

    #[test]
    fn score_summary_excludes_essays() {
        let mc = |correct: usize| Question {
            prompt: "p".into(),
            options: vec!["a".into(), "b".into()],
            correct: Some(correct),
            explanation: None,
            image: None,
        };
        let essay = Question {
            prompt: "p".into(),
            options: vec!["model".into()],
            correct: None,
            explanation: None,
            image: None,
        };
        let questions = vec![mc(0), mc(1), essay];
        let answers = vec![
            UserAnswer::Choice(0),
            UserAnswer::Choice(0),
            UserAnswer::Text("attempt".into()),
        ];
        let s = ScoreSummary::compute(&questions, &answers);
        assert_eq!(s.correct, 1);
        assert_eq!(s.wrong, 1);
        assert_eq!(s.essays, 1);
        assert_eq!(s.scorable, 2);
        assert_eq!(s.percentage, 50);
        assert!(!s.is_passing());
    }

    #[test]
    fn sanitize_strips_control_chars_only() {
        assert_eq!(sanitize("  a\u{0007}b\r\nc  "), "ab\nc");
        assert_eq!(sanitize("سؤال\nجواب"), "سؤال\nجواب");
    }
}
