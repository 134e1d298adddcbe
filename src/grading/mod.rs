// Answer grading through an external text-grading service

pub mod openrouter;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use openrouter::OpenRouterGrader;

/// Highest score a grader can award for one answer
pub const MAX_GRADE: u32 = 10;

/// Score and feedback for a single answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    /// Points earned, always within `0..=MAX_GRADE`
    pub score: u32,
    pub feedback: String,
    /// Unparsed text returned by the grading service
    pub raw: String,
}

#[derive(Debug, Error)]
pub enum GradingError {
    #[error("Missing environment variable OPENROUTER_API_KEY")]
    MissingApiKey,

    #[error("Grading service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Grading service error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed grading service response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait Grader: Send + Sync {
    /// Grade `user_answer` against the standard answer of `question`
    async fn grade(
        &self,
        question: &str,
        standard_answer: &str,
        user_answer: &str,
    ) -> Result<Grade, GradingError>;

    /// Verify the grading service is reachable and the credentials work
    async fn check(&self) -> Result<(), GradingError>;
}

/// Build a grade from the text of a grading reply.
///
/// The reply should contain `{"score": <number>, "feedback": "<text>"}`,
/// possibly wrapped in prose or a code fence. Replies without a parseable
/// object earn 0 points and the raw text becomes the feedback.
pub fn parse_grade(content: &str) -> Grade {
    let raw = content.to_string();
    let fallback_feedback = content.trim().to_string();

    let parsed = extract_json_object(content)
        .and_then(|json| serde_json::from_str::<Value>(json).ok())
        .filter(Value::is_object);

    let Some(value) = parsed else {
        tracing::warn!("Grading reply had no JSON object, awarding 0 points");
        return Grade {
            score: 0,
            feedback: fallback_feedback,
            raw,
        };
    };

    let score = value.get("score").and_then(score_from_value).unwrap_or(0);
    let feedback = value
        .get("feedback")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or(fallback_feedback);

    Grade {
        score,
        feedback,
        raw,
    }
}

/// Text from the first `{` to the last `}`
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

fn score_from_value(value: &Value) -> Option<u32> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !score.is_finite() {
        return None;
    }

    Some(score.trunc().clamp(0.0, MAX_GRADE as f64) as u32)
}
