//! geoquiz-report: presentation of quiz content.
//!
//! Lays out rendered rich text and quiz state as self-contained HTML pages
//! or terminal text, styled by an explicit [`Theme`].

pub mod html;
pub mod text;
pub mod theme;

pub use html::{
    elements_to_html, generate_quiz_page, generate_results_page, generate_review_page,
    write_html_page,
};
pub use text::elements_to_text;
pub use theme::Theme;
