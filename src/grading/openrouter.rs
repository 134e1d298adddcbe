use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{parse_grade, Grade, Grader, GradingError};
use crate::config::GradingConfig;

/// Grades answers through an OpenRouter chat completion
pub struct OpenRouterGrader {
    http_client: reqwest::Client,
    config: GradingConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenRouterGrader {
    pub fn new(http_client: reqwest::Client, config: GradingConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Send a single-message completion and return the reply text
    async fn complete(&self, prompt: &str) -> Result<String, GradingError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GradingError::MissingApiKey)?;

        let payload = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.config.site_url)
            .header("X-Title", &self.config.app_name)
            .timeout(self.config.timeout())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            tracing::error!("Grading request failed: {} - {}", status, body);
            return Err(GradingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| GradingError::MalformedResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                GradingError::MalformedResponse("missing choices[0].message.content".to_string())
            })
    }
}

#[async_trait]
impl Grader for OpenRouterGrader {
    async fn grade(
        &self,
        question: &str,
        standard_answer: &str,
        user_answer: &str,
    ) -> Result<Grade, GradingError> {
        tracing::debug!("Requesting grade from {}", self.config.model);

        let prompt = grading_prompt(question, standard_answer, user_answer);
        let content = self.complete(&prompt).await?;
        let grade = parse_grade(&content);

        tracing::debug!("Grading service awarded {} points", grade.score);
        Ok(grade)
    }

    async fn check(&self) -> Result<(), GradingError> {
        self.complete("Reply with the single word: pong").await?;
        tracing::info!("Grading service check succeeded");
        Ok(())
    }
}

/// Rubric sent to the grading model
fn grading_prompt(question: &str, standard_answer: &str, user_answer: &str) -> String {
    format!(
        r#"You are an encouraging and supportive teacher. Be objective and fair; do not be
overly strict about formatting. If the standard answer is a placeholder like
"Personal Answer", give an objective score based solely on the student answer.

Question: {question}
Standard Answer: {standard_answer}
Student Answer: {user_answer}

Task:
1. Rate the student answer from 0 to 10.
2. Provide a very short feedback (max 2 sentences).

Respond strictly as JSON:
{{
    "score": <number>,
    "feedback": "<text>"
}}"#
    )
}
