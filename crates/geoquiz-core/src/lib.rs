//! geoquiz-core: domain model, rich-text rendering and quiz state.
//!
//! This crate defines the data model, the `ContentSource` trait, the
//! rich-content renderer and the quiz session state machine that the rest
//! of geoquiz builds on.

pub mod controller;
pub mod error;
pub mod model;
pub mod render;
pub mod rich_text;
pub mod session;
pub mod traits;

pub use error::{ContentError, SessionError};
pub use model::{Asset, Category, Question, QuizOption};
pub use rich_text::{Node, RichDocument};
pub use session::{QuizSession, Stage};
