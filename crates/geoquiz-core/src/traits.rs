//! Core trait definitions for content backends.
//!
//! Implemented by the `geoquiz-content` crate (Contentful client and an
//! in-memory mock).

use async_trait::async_trait;

use crate::model::{Category, Question};

/// A read-only source of quiz content.
///
/// Errors are returned as `anyhow::Error`, usually wrapping a
/// [`ContentError`](crate::error::ContentError) that callers may downcast
/// to classify the failure.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable source name (e.g. "contentful").
    fn name(&self) -> &str;

    /// Fetch all quiz categories, in backend order.
    async fn fetch_categories(&self) -> anyhow::Result<Vec<Category>>;

    /// Fetch the questions of one category, with options and assets resolved.
    async fn fetch_questions(&self, category_id: &str) -> anyhow::Result<Vec<Question>>;
}
