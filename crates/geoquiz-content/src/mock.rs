//! Mock content source for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use geoquiz_core::error::ContentError;
use geoquiz_core::model::{Category, Question};
use geoquiz_core::traits::ContentSource;

/// An in-memory content source for exercising the quiz flow without a backend.
pub struct MockSource {
    categories: Vec<Category>,
    /// Map of category id → questions.
    questions: HashMap<String, Vec<Question>>,
    /// Category ids whose fetch fails with a server error.
    failing: HashSet<String>,
    /// Number of fetches made.
    call_count: AtomicU32,
    /// Category of the last question fetch.
    last_category: Mutex<Option<String>>,
}

impl MockSource {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            questions: HashMap::new(),
            failing: HashSet::new(),
            call_count: AtomicU32::new(0),
            last_category: Mutex::new(None),
        }
    }

    /// Serve `questions` for `category_id`.
    pub fn with_questions(mut self, category_id: &str, questions: Vec<Question>) -> Self {
        self.questions.insert(category_id.to_string(), questions);
        self
    }

    /// Make question fetches for `category_id` fail with HTTP 500.
    pub fn with_failure(mut self, category_id: &str) -> Self {
        self.failing.insert(category_id.to_string());
        self
    }

    /// Get the number of fetches made to this source.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the category of the last question fetch.
    pub fn last_category(&self) -> Option<String> {
        self.last_category
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ContentSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_categories(&self) -> anyhow::Result<Vec<Category>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.categories.clone())
    }

    async fn fetch_questions(&self, category_id: &str) -> anyhow::Result<Vec<Question>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_category
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(category_id.to_string());

        if self.failing.contains(category_id) {
            return Err(ContentError::Http { status: 500 }.into());
        }
        Ok(self.questions.get(category_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str) -> Category {
        Category {
            id: id.into(),
            name: id.to_uppercase(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn serves_configured_content() {
        let source = MockSource::new(vec![category("a"), category("b")]).with_failure("b");

        assert_eq!(source.fetch_categories().await.unwrap().len(), 2);
        assert!(source.fetch_questions("a").await.unwrap().is_empty());
        assert_eq!(source.last_category().as_deref(), Some("a"));

        let err = source.fetch_questions("b").await.unwrap_err();
        assert!(err.downcast_ref::<ContentError>().unwrap().is_network());
        assert_eq!(source.call_count(), 3);
    }
}
