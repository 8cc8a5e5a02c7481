//! Question catalog: rounds, categories and questions.
//!
//! The catalog is immutable once loaded. Question ids are derived from the
//! category id, round id and point value so they stay stable across restarts
//! and can be referenced from persisted snapshots.

use crate::types::{CategoryId, QuestionId};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Catalog shipped with the binary
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog has no rounds")]
    Empty,

    #[error("round '{0}' has no questions")]
    EmptyRound(String),

    #[error("duplicate question id '{0}'")]
    DuplicateQuestion(QuestionId),
}

#[derive(Debug, Clone)]
pub struct Question {
    pub id: QuestionId,
    pub value: u32,
    pub prompt: String,
    pub answer: String,
    pub media: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone)]
pub struct Round {
    pub id: String,
    pub title: String,
    pub index: usize,
    pub categories: Vec<Category>,
}

impl Round {
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.categories.iter().flat_map(|c| c.questions.iter())
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    rounds: Vec<Round>,
}

// Raw on-disk shape, before ids are derived
#[derive(Debug, Deserialize)]
struct CatalogFile {
    rounds: Vec<RoundDef>,
}

#[derive(Debug, Deserialize)]
struct RoundDef {
    id: String,
    title: String,
    categories: Vec<CategoryDef>,
}

#[derive(Debug, Deserialize)]
struct CategoryDef {
    id: String,
    title: String,
    questions: Vec<QuestionDef>,
}

#[derive(Debug, Deserialize)]
struct QuestionDef {
    value: u32,
    prompt: String,
    answer: String,
    #[serde(default)]
    media: Option<String>,
}

impl Catalog {
    /// The built-in question set
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load from a JSON file, or the built-in set when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Self::from_json(&raw)
            }
            None => Self::builtin(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::decorate(file)
    }

    fn decorate(file: CatalogFile) -> Result<Self, CatalogError> {
        if file.rounds.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        let mut rounds = Vec::with_capacity(file.rounds.len());

        for (index, round) in file.rounds.into_iter().enumerate() {
            let mut categories = Vec::with_capacity(round.categories.len());
            for category in round.categories {
                let mut questions = Vec::with_capacity(category.questions.len());
                for q in category.questions {
                    let id = format!("{}-{}-{}", category.id, round.id, q.value);
                    if !seen.insert(id.clone()) {
                        return Err(CatalogError::DuplicateQuestion(id));
                    }
                    questions.push(Question {
                        id,
                        value: q.value,
                        prompt: q.prompt,
                        answer: q.answer,
                        media: q.media,
                    });
                }
                categories.push(Category {
                    id: category.id,
                    title: category.title,
                    questions,
                });
            }

            let round = Round {
                id: round.id,
                title: round.title,
                index,
                categories,
            };
            if round.questions().next().is_none() {
                return Err(CatalogError::EmptyRound(round.id));
            }
            rounds.push(round);
        }

        Ok(Self { rounds })
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// Find a question together with the category that holds it
    pub fn find(&self, id: &str) -> Option<(&Category, &Question)> {
        self.rounds
            .iter()
            .flat_map(|r| r.categories.iter())
            .find_map(|c| c.questions.iter().find(|q| q.id == id).map(|q| (c, q)))
    }
}
