use std::path::Path;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

/// Separator between group name and question index in a question id
pub const QUESTION_ID_SEPARATOR: &str = "::";

const BUILTIN_QUESTIONS: &str = include_str!("../../data/questions.json");

static BUILTIN_BANK: Lazy<QuestionBank> = Lazy::new(|| {
    QuestionBank::from_json(BUILTIN_QUESTIONS).expect("embedded question bank is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("Invalid question id")]
    InvalidQuestionId,

    #[error("Question does not exist")]
    QuestionNotFound,

    #[error("Unknown group.")]
    UnknownGroup,

    #[error("No groups available to pick from.")]
    NoGroupsAvailable,

    #[error("No more questions available in this group.")]
    NoQuestionsAvailable,
}

#[derive(Debug, Clone, Deserialize)]
struct QuestionEntry {
    prompt: String,
    answer: String,
}

#[derive(Debug, Clone, Deserialize)]
struct QuestionGroup {
    group: String,
    questions: Vec<QuestionEntry>,
}

/// A question resolved from the bank, including its standard answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub group: String,
    pub prompt: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub id: String,
    pub label: String,
    pub question_count: usize,
}

/// Question groups in wheel order
#[derive(Debug, Clone)]
pub struct QuestionBank {
    groups: Vec<QuestionGroup>,
}

impl QuestionBank {
    /// Load a question bank from a JSON file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let bank = Self::from_json(&content)?;

        tracing::info!(
            "Loaded {} question groups ({} questions)",
            bank.groups.len(),
            bank.question_count()
        );

        Ok(bank)
    }

    /// The question bank compiled into the binary
    pub fn builtin() -> Self {
        BUILTIN_BANK.clone()
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let groups: Vec<QuestionGroup> = serde_json::from_str(content)?;

        if groups.is_empty() {
            bail!("question bank has no groups");
        }
        for (idx, group) in groups.iter().enumerate() {
            if group.group.trim().is_empty() || group.group.contains(QUESTION_ID_SEPARATOR) {
                bail!("invalid group name {:?}", group.group);
            }
            if group.questions.is_empty() {
                bail!("group {:?} has no questions", group.group);
            }
            if groups[..idx].iter().any(|g| g.group == group.group) {
                bail!("duplicate group {:?}", group.group);
            }
        }

        Ok(Self { groups })
    }

    pub fn question_count(&self) -> usize {
        self.groups.iter().map(|g| g.questions.len()).sum()
    }

    pub fn groups(&self) -> Vec<GroupSummary> {
        self.groups
            .iter()
            .map(|g| GroupSummary {
                id: g.group.clone(),
                label: g.group.clone(),
                question_count: g.questions.len(),
            })
            .collect()
    }

    /// Look up a question by its `GROUP::index` id
    pub fn question(&self, question_id: &str) -> Result<Question, QuestionError> {
        let (group, index) = decode_question_id(question_id)?;
        let entry = self
            .find_group(group)
            .and_then(|g| g.questions.get(index))
            .ok_or(QuestionError::QuestionNotFound)?;

        Ok(Self::build_question(group, index, entry))
    }

    /// Spin the group wheel, skipping `excluded` groups
    pub fn random_group<R: Rng>(
        &self,
        excluded: &[String],
        rng: &mut R,
    ) -> Result<String, QuestionError> {
        let choices: Vec<&QuestionGroup> = self
            .groups
            .iter()
            .filter(|g| !excluded.contains(&g.group))
            .collect();

        if choices.is_empty() {
            return Err(QuestionError::NoGroupsAvailable);
        }

        let idx = rng.random_range(0..choices.len());
        Ok(choices[idx].group.clone())
    }

    /// Spin the question wheel of `group`, skipping already asked question ids
    pub fn random_question<R: Rng>(
        &self,
        group: &str,
        excluded_ids: &[String],
        rng: &mut R,
    ) -> Result<Question, QuestionError> {
        let entries = &self
            .find_group(group)
            .ok_or(QuestionError::UnknownGroup)?
            .questions;

        let valid_indexes: Vec<usize> = (0..entries.len())
            .filter(|&idx| !excluded_ids.contains(&encode_question_id(group, idx)))
            .collect();

        if valid_indexes.is_empty() {
            return Err(QuestionError::NoQuestionsAvailable);
        }

        let index = valid_indexes[rng.random_range(0..valid_indexes.len())];
        Ok(Self::build_question(group, index, &entries[index]))
    }

    fn find_group(&self, group: &str) -> Option<&QuestionGroup> {
        self.groups.iter().find(|g| g.group == group)
    }

    fn build_question(group: &str, index: usize, entry: &QuestionEntry) -> Question {
        Question {
            id: encode_question_id(group, index),
            group: group.to_string(),
            prompt: entry.prompt.clone(),
            answer: entry.answer.clone(),
        }
    }
}

pub fn encode_question_id(group: &str, index: usize) -> String {
    format!("{}{}{}", group, QUESTION_ID_SEPARATOR, index)
}

fn decode_question_id(question_id: &str) -> Result<(&str, usize), QuestionError> {
    let (group, index) = question_id
        .split_once(QUESTION_ID_SEPARATOR)
        .ok_or(QuestionError::InvalidQuestionId)?;
    let index = index
        .parse::<usize>()
        .map_err(|_| QuestionError::InvalidQuestionId)?;
    Ok((group, index))
}
