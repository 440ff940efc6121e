//! Quiz session state machine.
//!
//! Holds the navigation, answer and scoring state of a single quiz run.
//! Stage flow:
//!
//! ```text
//! CategorySelection -> InQuiz -> Results -> Review
//!        ^                ^         |          |
//!        |                +-(retry)-+          |
//!        +------------(reset)------+-----------+
//! ```
//!
//! Question loading is split into [`QuizSession::begin_loading`] and
//! [`QuizSession::complete_loading`] so the caller can fetch in between.
//! Every `begin_loading` and every `reset` bumps a generation counter; a result carrying an
//! older [`RequestToken`] is ignored, so overlapping fetches can never
//! overwrite the state of a newer one.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::model::Question;

/// Label shown for questions the user never answered.
pub const UNANSWERED: &str = "Não respondida";

/// Percentage at or above which the results screen celebrates.
pub const ENCOURAGING_THRESHOLD: f64 = 70.0;

/// Current phase of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    #[default]
    CategorySelection,
    InQuiz,
    Results,
    Review,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::CategorySelection => write!(f, "category-selection"),
            Stage::InQuiz => write!(f, "in-quiz"),
            Stage::Results => write!(f, "results"),
            Stage::Review => write!(f, "review"),
        }
    }
}

/// Identifies one question fetch; only the latest token is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// What happened when a fetch result was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Questions installed; the session is now in quiz.
    Started { questions: usize },
    /// The category has no questions; the session stays in category selection.
    Empty,
    /// A newer fetch was started after this one; the result was dropped.
    Stale,
}

/// Score of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
}

impl QuizSummary {
    pub fn incorrect(&self) -> usize {
        self.total - self.correct
    }

    pub fn is_encouraging(&self) -> bool {
        self.percentage >= ENCOURAGING_THRESHOLD
    }
}

/// One row of the review screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewItem<'a> {
    /// 1-based position in the quiz.
    pub number: usize,
    pub question: &'a Question,
    /// Text of the chosen option, or [`UNANSWERED`].
    pub answer_text: &'a str,
    pub correct: bool,
}

/// Count questions whose recorded answer is the correct option.
///
/// Unanswered questions count as incorrect.
pub fn score(questions: &[Question], answers: &HashMap<String, String>) -> usize {
    questions
        .iter()
        .filter(|q| answers.get(&q.id).is_some_and(|a| q.is_correct(a)))
        .count()
}

/// Runtime state of one quiz session. Never persisted.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    stage: Stage,
    category_id: Option<String>,
    questions: Vec<Question>,
    current_index: usize,
    answers: HashMap<String, String>,
    selected: Option<String>,
    generation: u64,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: Stage::CategorySelection,
            category_id: None,
            questions: Vec::new(),
            current_index: 0,
            answers: HashMap::new(),
            selected: None,
            generation: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Category of the latest load, kept across resets for "try again".
    pub fn category_id(&self) -> Option<&str> {
        self.category_id.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn answers(&self) -> &HashMap<String, String> {
        &self.answers
    }

    /// Option selected for the current question, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_last_question(&self) -> bool {
        !self.questions.is_empty() && self.current_index == self.questions.len() - 1
    }

    /// Whether the UI should enable "next"/"finish": an answer is selected.
    pub fn can_advance(&self) -> bool {
        self.stage == Stage::InQuiz && self.selected.is_some()
    }

    /// `(current_index + 1) / len * 100`, or 0 with no questions.
    pub fn progress_percent(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        (self.current_index + 1) as f64 / self.questions.len() as f64 * 100.0
    }

    /// Start loading questions for `category_id`.
    ///
    /// The stage is left untouched until the result is applied.
    pub fn begin_loading(&mut self, category_id: &str) -> RequestToken {
        self.generation += 1;
        self.category_id = Some(category_id.to_string());
        tracing::debug!(
            session = %self.id,
            category_id,
            generation = self.generation,
            "loading questions"
        );
        RequestToken(self.generation)
    }

    /// Whether `token` belongs to the most recent `begin_loading`.
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation
    }

    /// Install fetched questions.
    pub fn complete_loading(&mut self, token: RequestToken, questions: Vec<Question>) -> LoadOutcome {
        if !self.is_current(token) {
            tracing::debug!(session = %self.id, "dropping stale question load");
            return LoadOutcome::Stale;
        }
        if questions.is_empty() {
            self.clear();
            self.stage = Stage::CategorySelection;
            return LoadOutcome::Empty;
        }

        let count = questions.len();
        self.clear();
        self.questions = questions;
        self.stage = Stage::InQuiz;
        LoadOutcome::Started { questions: count }
    }

    /// Record a failed fetch. Returns `false` if the token was stale.
    pub fn fail_loading(&mut self, token: RequestToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.clear();
        self.stage = Stage::CategorySelection;
        true
    }

    /// Record an answer for the current question. Does not advance.
    pub fn answer(&mut self, option_id: &str) -> Result<(), SessionError> {
        self.expect_stage(Stage::InQuiz, "answer")?;
        let question = self
            .questions
            .get(self.current_index)
            .ok_or(SessionError::NoCurrentQuestion)?;
        if question.option(option_id).is_none() {
            return Err(SessionError::UnknownOption(option_id.to_string()));
        }

        self.answers
            .insert(question.id.clone(), option_id.to_string());
        self.selected = Some(option_id.to_string());
        Ok(())
    }

    /// Move to the next question. No-op (returns `false`) on the last one.
    pub fn next(&mut self) -> bool {
        if self.stage != Stage::InQuiz || self.current_index + 1 >= self.questions.len() {
            return false;
        }
        self.move_to(self.current_index + 1);
        true
    }

    /// Move to the previous question. No-op (returns `false`) on the first one.
    pub fn previous(&mut self) -> bool {
        if self.stage != Stage::InQuiz || self.current_index == 0 {
            return false;
        }
        self.move_to(self.current_index - 1);
        true
    }

    /// End the quiz. Completeness is not enforced.
    pub fn finish(&mut self) -> Result<(), SessionError> {
        self.expect_stage(Stage::InQuiz, "finish")?;
        self.stage = Stage::Results;
        Ok(())
    }

    /// Open the review screen from the results screen.
    pub fn review(&mut self) -> Result<(), SessionError> {
        self.expect_stage(Stage::Results, "review")?;
        self.stage = Stage::Review;
        Ok(())
    }

    /// Drop questions and answers and go back to category selection.
    ///
    /// Any load still in flight becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.clear();
        self.stage = Stage::CategorySelection;
    }

    /// Restart the same category from the results screen.
    ///
    /// Returns the token for the new fetch, or `None` when not in results or
    /// no category was ever loaded.
    pub fn retry(&mut self) -> Option<RequestToken> {
        if self.stage != Stage::Results {
            return None;
        }
        let category_id = self.category_id.clone()?;
        self.reset();
        Some(self.begin_loading(&category_id))
    }

    pub fn score(&self) -> usize {
        score(&self.questions, &self.answers)
    }

    pub fn summary(&self) -> QuizSummary {
        let correct = self.score();
        let total = self.questions.len();
        let percentage = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };
        QuizSummary {
            correct,
            total,
            percentage,
        }
    }

    pub fn review_items(&self) -> Vec<ReviewItem<'_>> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let chosen = self.answers.get(&q.id);
                ReviewItem {
                    number: i + 1,
                    question: q,
                    answer_text: chosen
                        .and_then(|id| q.option(id))
                        .map(|o| o.text.as_str())
                        .unwrap_or(UNANSWERED),
                    correct: chosen.is_some_and(|id| q.is_correct(id)),
                }
            })
            .collect()
    }

    fn move_to(&mut self, index: usize) {
        self.current_index = index;
        self.selected = self
            .questions
            .get(index)
            .and_then(|q| self.answers.get(&q.id))
            .cloned();
    }

    fn clear(&mut self) {
        self.questions.clear();
        self.answers.clear();
        self.current_index = 0;
        self.selected = None;
    }

    fn expect_stage(&self, stage: Stage, action: &'static str) -> Result<(), SessionError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.stage,
                action,
            })
        }
    }
}
