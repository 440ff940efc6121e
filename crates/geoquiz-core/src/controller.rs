//! Quiz controller.
//!
//! Drives a [`QuizSession`] from user actions: performs the fetches through a
//! [`ContentSource`], turns every failure into a user-facing message and puts
//! the session back in a safe stage. Nothing here is fatal; the user recovers
//! by picking a category again.

use std::sync::Arc;

use crate::error::{ContentError, SessionError};
use crate::model::Category;
use crate::session::{LoadOutcome, QuizSession, RequestToken, Stage};
use crate::traits::ContentSource;

pub const NO_CATEGORIES: &str = "No categories found. Please try again later.";
pub const CATEGORIES_FAILED: &str = "Failed to load categories. Please try again later.";
pub const NO_QUESTIONS: &str = "No questions found for this category. Please try another category.";
pub const QUESTIONS_FAILED: &str = "Failed to load questions. Please try again later.";
pub const REQUEST_TIMED_OUT: &str = "The request timed out. Please try again.";

/// Owns the content source, the category list and the current session.
pub struct QuizController {
    source: Arc<dyn ContentSource>,
    session: QuizSession,
    categories: Vec<Category>,
    error: Option<String>,
    loading: bool,
}

impl QuizController {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            session: QuizSession::new(),
            categories: Vec::new(),
            error: None,
            loading: false,
        }
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn stage(&self) -> Stage {
        self.session.stage()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Message to show the user after the last failed action.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Load the category list. Returns `true` if at least one category is available.
    pub async fn load_categories(&mut self) -> bool {
        self.loading = true;
        let result = self.source.fetch_categories().await;
        self.loading = false;

        match result {
            Ok(categories) if categories.is_empty() => {
                tracing::warn!(source = self.source.name(), "no categories returned");
                self.categories.clear();
                self.error = Some(NO_CATEGORIES.to_string());
            }
            Ok(categories) => {
                tracing::debug!(count = categories.len(), "categories loaded");
                self.categories = categories;
                self.error = None;
            }
            Err(e) => {
                tracing::error!(source = self.source.name(), "error loading categories: {e:#}");
                self.error = Some(failure_message(&e, CATEGORIES_FAILED));
            }
        }
        !self.categories.is_empty()
    }

    /// Fetch the category's questions and enter the quiz.
    ///
    /// Returns `true` if the session is now in quiz. On an empty category or
    /// a failed fetch the session stays in category selection and
    /// [`error`](Self::error) explains why.
    pub async fn start_quiz(&mut self, category_id: &str) -> bool {
        let token = self.session.begin_loading(category_id);
        self.load_questions(token).await
    }

    /// "Try again" from the results screen: re-fetch the same category.
    pub async fn try_again(&mut self) -> bool {
        match self.session.retry() {
            Some(token) => self.load_questions(token).await,
            None => false,
        }
    }

    /// "Choose new quiz" from the results screen.
    pub fn choose_new_quiz(&mut self) {
        self.session.reset();
        self.error = None;
    }

    /// "Back to categories" from the review screen.
    pub fn back_to_categories(&mut self) {
        self.session.reset();
    }

    pub fn answer(&mut self, option_id: &str) -> Result<(), SessionError> {
        self.session.answer(option_id)
    }

    pub fn next(&mut self) -> bool {
        self.session.next()
    }

    pub fn previous(&mut self) -> bool {
        self.session.previous()
    }

    pub fn finish(&mut self) -> Result<(), SessionError> {
        self.session.finish()
    }

    pub fn review(&mut self) -> Result<(), SessionError> {
        self.session.review()
    }

    async fn load_questions(&mut self, token: RequestToken) -> bool {
        let Some(category_id) = self.session.category_id().map(str::to_string) else {
            return false;
        };

        self.loading = true;
        let result = self.source.fetch_questions(&category_id).await;
        self.loading = false;

        match result {
            Ok(questions) => match self.session.complete_loading(token, questions) {
                LoadOutcome::Started { questions } => {
                    tracing::info!(category_id = %category_id, questions, "quiz started");
                    self.error = None;
                    true
                }
                LoadOutcome::Empty => {
                    tracing::warn!(category_id = %category_id, "category has no questions");
                    self.error = Some(NO_QUESTIONS.to_string());
                    false
                }
                LoadOutcome::Stale => false,
            },
            Err(e) => {
                tracing::error!(category_id = %category_id, "error starting quiz: {e:#}");
                if self.session.fail_loading(token) {
                    self.error = Some(failure_message(&e, QUESTIONS_FAILED));
                }
                false
            }
        }
    }
}

fn failure_message(err: &anyhow::Error, fallback: &str) -> String {
    match err.downcast_ref::<ContentError>() {
        Some(e) if e.is_timeout() => REQUEST_TIMED_OUT.to_string(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;
    use crate::session::tests::question;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubSource {
        categories: Vec<Category>,
        /// Category lists returned by successive fetches before falling back to `categories`.
        category_batches: Mutex<VecDeque<Vec<Category>>>,
        questions: HashMap<String, Vec<Question>>,
        timeout: bool,
    }

    #[async_trait]
    impl ContentSource for StubSource {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch_categories(&self) -> anyhow::Result<Vec<Category>> {
            if self.timeout {
                return Err(ContentError::Timeout(10).into());
            }
            if let Some(batch) = self.category_batches.lock().unwrap().pop_front() {
                return Ok(batch);
            }
            Ok(self.categories.clone())
        }

        async fn fetch_questions(&self, category_id: &str) -> anyhow::Result<Vec<Question>> {
            if self.timeout {
                return Err(ContentError::Timeout(10).into());
            }
            self.questions
                .get(category_id)
                .cloned()
                .ok_or_else(|| ContentError::Http { status: 404 }.into())
        }
    }

    fn category(id: &str) -> Category {
        Category {
            id: id.into(),
            name: format!("Categoria {id}"),
            description: "Desc".into(),
        }
    }

    fn stub() -> StubSource {
        let mut questions = HashMap::new();
        questions.insert(
            "rocks".to_string(),
            vec![question("q1", "a"), question("q2", "b"), question("q3", "c")],
        );
        questions.insert("empty".to_string(), vec![]);
        StubSource {
            categories: vec![category("rocks"), category("empty")],
            questions,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn loads_categories() {
        let mut c = QuizController::new(Arc::new(stub()));
        assert!(c.load_categories().await);
        assert_eq!(c.categories().len(), 2);
        assert_eq!(c.error(), None);
        assert!(!c.is_loading());
    }

    #[tokio::test]
    async fn empty_categories_show_message() {
        let mut c = QuizController::new(Arc::new(StubSource::default()));
        assert!(!c.load_categories().await);
        assert_eq!(c.error(), Some(NO_CATEGORIES));
        assert_eq!(c.stage(), Stage::CategorySelection);
    }

    #[tokio::test]
    async fn empty_reload_clears_previous_categories() {
        let source = StubSource {
            category_batches: Mutex::new(VecDeque::from(vec![vec![category("rocks")], vec![]])),
            ..Default::default()
        };
        let mut c = QuizController::new(Arc::new(source));
        assert!(c.load_categories().await);
        assert_eq!(c.categories().len(), 1);

        assert!(!c.load_categories().await);
        assert!(c.categories().is_empty());
        assert_eq!(c.error(), Some(NO_CATEGORIES));
    }

    #[tokio::test]
    async fn full_flow_and_score() {
        let mut c = QuizController::new(Arc::new(stub()));
        assert!(c.start_quiz("rocks").await);
        assert_eq!(c.stage(), Stage::InQuiz);

        c.answer("q1-a").unwrap();
        c.next();
        c.answer("q2-a").unwrap();
        c.next();
        c.finish().unwrap();
        assert_eq!(c.session().score(), 1);

        c.review().unwrap();
        c.back_to_categories();
        assert_eq!(c.stage(), Stage::CategorySelection);
    }

    #[tokio::test]
    async fn empty_category_stays_in_selection() {
        let mut c = QuizController::new(Arc::new(stub()));
        assert!(!c.start_quiz("empty").await);
        assert_eq!(c.stage(), Stage::CategorySelection);
        assert_eq!(c.error(), Some(NO_QUESTIONS));
    }

    #[tokio::test]
    async fn failed_fetch_shows_retry_message() {
        let mut c = QuizController::new(Arc::new(stub()));
        assert!(!c.start_quiz("missing").await);
        assert_eq!(c.stage(), Stage::CategorySelection);
        assert_eq!(c.error(), Some(QUESTIONS_FAILED));

        // a later success clears the message
        assert!(c.start_quiz("rocks").await);
        assert_eq!(c.error(), None);
    }

    #[tokio::test]
    async fn timeout_reverts_to_category_selection() {
        let source = StubSource {
            timeout: true,
            ..stub()
        };
        let mut c = QuizController::new(Arc::new(source));
        assert!(!c.start_quiz("rocks").await);
        assert_eq!(c.stage(), Stage::CategorySelection);
        assert_eq!(c.error(), Some(REQUEST_TIMED_OUT));

        assert!(!c.load_categories().await);
        assert_eq!(c.error(), Some(REQUEST_TIMED_OUT));
    }

    #[tokio::test]
    async fn try_again_restarts_same_category() {
        let mut c = QuizController::new(Arc::new(stub()));
        assert!(!c.try_again().await);

        c.start_quiz("rocks").await;
        c.answer("q1-a").unwrap();
        c.finish().unwrap();

        assert!(c.try_again().await);
        assert_eq!(c.stage(), Stage::InQuiz);
        assert_eq!(c.session().category_id(), Some("rocks"));
        assert!(c.session().answers().is_empty());

        c.finish().unwrap();
        c.choose_new_quiz();
        assert_eq!(c.stage(), Stage::CategorySelection);
        assert!(c.session().questions().is_empty());
    }
}
