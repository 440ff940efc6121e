//! Core data model types for geoquiz.
//!
//! Flat domain records produced by a `ContentSource` from the backend's
//! nested document graph.

use serde::{Deserialize, Serialize};

use crate::rich_text::RichDocument;

/// Placeholder used when a category has no description text.
pub const NO_DESCRIPTION: &str = "No description available";
/// Placeholder used when a question has no explanation text.
pub const NO_EXPLANATION: &str = "No explanation available";
/// Placeholder used when an option entry has no label text.
pub const NO_OPTION_TEXT: &str = "No option text available";

/// A quiz topic grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// One answer choice of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: String,
    pub text: String,
}

/// A media file referenced from a question body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    /// As stored by the backend; may be scheme-relative (`//images...`).
    pub url: String,
    pub content_type: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Asset {
    /// URL with an `https:` scheme added when the stored one is scheme-relative.
    pub fn absolute_url(&self) -> String {
        if self.url.starts_with("//") {
            format!("https:{}", self.url)
        } else {
            self.url.clone()
        }
    }

    /// Caption text: the description, falling back to the title.
    pub fn caption(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .or_else(|| self.title.as_deref().filter(|t| !t.is_empty()))
    }
}

/// One quiz item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    /// Short prompt line (the `question` field).
    pub prompt: String,
    pub body: RichDocument,
    /// Ordered answer choices; never empty.
    pub options: Vec<QuizOption>,
    /// Always the id of exactly one member of `options`.
    pub correct_option_id: String,
    pub explanation: String,
    /// Assets referenced by embedded-asset nodes in `body`.
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    pub fn correct_option(&self) -> Option<&QuizOption> {
        self.option(&self.correct_option_id)
    }

    pub fn is_correct(&self, option_id: &str) -> bool {
        self.correct_option_id == option_id
    }
}
