//! The `geoquiz preview` command: export a category as an answer key or a sample quiz or results page.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use geoquiz_core::controller::QuizController;
use geoquiz_core::model::Question;
use geoquiz_core::render::{render, Element};
use geoquiz_core::session::{ReviewItem, UNANSWERED};
use geoquiz_report::{
    generate_quiz_page, generate_results_page, generate_review_page, write_html_page, Theme,
};

use super::controller_from_config;

pub async fn execute(
    category: String,
    output: Option<PathBuf>,
    format: String,
    page: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (mut controller, config) = controller_from_config(config_path)?;

    if !controller.start_quiz(&category).await {
        anyhow::bail!(
            "{}",
            controller.error().unwrap_or("no questions available")
        );
    }
    let count = controller.session().questions().len();

    let path = output.unwrap_or_else(|| PathBuf::from(format!("geoquiz-preview-{category}.{format}")));
    match format.as_str() {
        "html" => {
            let theme = Theme::default().with_overrides(&config.theme);
            let html = match page.as_str() {
                "review" => generate_review_page(&answer_key(controller.session().questions()), &theme),
                "quiz" => generate_quiz_page(controller.session(), &theme),
                "results" => {
                    answer_all_correctly(&mut controller)?;
                    generate_results_page(&controller.session().summary(), &theme)
                }
                other => anyhow::bail!("unknown page: {other} (expected review, quiz or results)"),
            };
            write_html_page(&html, &path)?;
        }
        "json" => {
            if page != "review" {
                anyhow::bail!("--page {page} is only available with --format html");
            }
            let document = PreviewDocument::new(&category, controller.session().questions());
            let json = serde_json::to_string_pretty(&document)?;
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        other => anyhow::bail!("unknown format: {other} (expected html or json)"),
    }

    eprintln!("Wrote {count} questions to {}", path.display());
    Ok(())
}

/// Play through the loaded quiz choosing every correct option, then finish.
fn answer_all_correctly(controller: &mut QuizController) -> Result<()> {
    loop {
        let correct = controller
            .session()
            .current_question()
            .map(|q| q.correct_option_id.clone());
        if let Some(option_id) = correct {
            controller.answer(&option_id)?;
        }
        if !controller.next() {
            break;
        }
    }
    controller.finish()?;
    Ok(())
}

/// Review rows that show each question's correct option as the answer.
fn answer_key(questions: &[Question]) -> Vec<ReviewItem<'_>> {
    questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let correct = question.correct_option();
            ReviewItem {
                number: i + 1,
                question,
                answer_text: correct.map(|o| o.text.as_str()).unwrap_or(UNANSWERED),
                correct: correct.is_some(),
            }
        })
        .collect()
}

#[derive(Serialize)]
struct PreviewDocument<'a> {
    category_id: &'a str,
    generated_at: chrono::DateTime<chrono::Utc>,
    questions: Vec<PreviewQuestion<'a>>,
}

#[derive(Serialize)]
struct PreviewQuestion<'a> {
    #[serde(flatten)]
    question: &'a Question,
    rendered: Vec<Element>,
}

impl<'a> PreviewDocument<'a> {
    fn new(category_id: &'a str, questions: &'a [Question]) -> Self {
        Self {
            category_id,
            generated_at: chrono::Utc::now(),
            questions: questions
                .iter()
                .map(|question| PreviewQuestion {
                    question,
                    rendered: render(&question.body, &question.assets),
                })
                .collect(),
        }
    }
}
