//! HTML page generator.
//!
//! Produces self-contained HTML files with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use geoquiz_core::render::{render, Element, Figure};
use geoquiz_core::rich_text::MarkKind;
use geoquiz_core::session::{QuizSession, QuizSummary, ReviewItem};

use crate::theme::Theme;

pub const MISSING_MEDIA_TEXT: &str = "Imagem não encontrada.";

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Render displayable elements as an HTML fragment.
pub fn elements_to_html(elements: &[Element]) -> String {
    let mut html = String::new();
    for element in elements {
        push_element(&mut html, element);
    }
    html
}

fn push_children(html: &mut String, children: &[Element]) {
    for child in children {
        push_element(html, child);
    }
}

fn push_wrapped(html: &mut String, open: &str, close: &str, children: &[Element]) {
    html.push_str(open);
    push_children(html, children);
    html.push_str(close);
}

fn push_element(html: &mut String, element: &Element) {
    match element {
        Element::Heading { level, children } => {
            let level = (*level).clamp(1, 6);
            push_wrapped(
                html,
                &format!("<h{level} class=\"rt-heading\">"),
                &format!("</h{level}>\n"),
                children,
            );
        }
        Element::Paragraph { children } => push_wrapped(html, "<p>", "</p>\n", children),
        Element::List { ordered, children } => {
            let tag = if *ordered { "ol" } else { "ul" };
            push_wrapped(html, &format!("<{tag}>\n"), &format!("</{tag}>\n"), children);
        }
        Element::ListItem { children } => push_wrapped(html, "<li>", "</li>\n", children),
        Element::Quote { children } => {
            push_wrapped(html, "<blockquote>", "</blockquote>\n", children)
        }
        Element::Rule => html.push_str("<hr>\n"),
        Element::Table { children } => {
            push_wrapped(html, "<table class=\"rt-table\">\n", "</table>\n", children)
        }
        Element::TableRow { children } => push_wrapped(html, "<tr>", "</tr>\n", children),
        Element::TableCell { header, children } => {
            let tag = if *header { "th" } else { "td" };
            push_wrapped(html, &format!("<{tag}>"), &format!("</{tag}>"), children);
        }
        Element::Media(figure) => push_figure(html, figure),
        Element::MissingMedia { asset_id } => html.push_str(&format!(
            "<p class=\"missing-media\" data-asset=\"{}\">{MISSING_MEDIA_TEXT}</p>\n",
            html_escape(asset_id)
        )),
        Element::EntryBlock { children } => {
            push_wrapped(html, "<div class=\"embedded-entry\">", "</div>\n", children)
        }
        Element::EntryInline { children } => push_wrapped(
            html,
            "<span class=\"embedded-entry-inline\">",
            "</span>",
            children,
        ),
        Element::Link {
            href,
            external,
            children,
        } => {
            if *external {
                html.push_str(&format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"rt-link\">",
                    html_escape(href)
                ));
                push_children(html, children);
                html.push_str("<span class=\"external\" aria-hidden=\"true\">&#x2197;</span></a>");
            } else {
                push_wrapped(
                    html,
                    &format!("<a href=\"{}\" class=\"rt-link\">", html_escape(href)),
                    "</a>",
                    children,
                );
            }
        }
        Element::Marked { mark, children } => {
            let (open, close) = match mark {
                MarkKind::Bold => ("<strong>", "</strong>"),
                MarkKind::Italic => ("<em>", "</em>"),
                MarkKind::Underline => ("<span class=\"underline\">", "</span>"),
                MarkKind::Code => ("<code>", "</code>"),
                MarkKind::Other => ("", ""),
            };
            push_wrapped(html, open, close, children);
        }
        Element::Text { value } => html.push_str(&html_escape(value)),
    }
}

fn push_figure(html: &mut String, figure: &Figure) {
    html.push_str("<figure class=\"media\">\n");
    html.push_str(&format!(
        "<img src=\"{}\" alt=\"{}\" width=\"{}\" height=\"{}\" loading=\"lazy\">\n",
        html_escape(&figure.src),
        html_escape(&figure.alt),
        figure.width,
        figure.height
    ));
    if let Some(caption) = &figure.caption {
        html.push_str(&format!("<figcaption>{}</figcaption>\n", html_escape(caption)));
    }
    html.push_str("</figure>\n");
}

fn page_start(title: &str, theme: &Theme) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{} | Geodinâmica</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(&theme.to_css());
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n<main>\n");
    html
}

fn page_end(mut html: String) -> String {
    html.push_str("</main>\n<footer>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Gerado em {}</p>\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</footer>\n</body>\n</html>");
    html
}

/// Generate a page showing the session's current question.
pub fn generate_quiz_page(session: &QuizSession, theme: &Theme) -> String {
    let mut html = page_start("Quiz", theme);

    let Some(question) = session.current_question() else {
        html.push_str("<p class=\"meta\">Nenhuma questão carregada.</p>\n");
        return page_end(html);
    };

    let total = session.questions().len();
    let progress = session.progress_percent();
    html.push_str("<section class=\"card quiz\">\n");
    html.push_str("<header class=\"progress-header\">\n");
    html.push_str(&format!(
        "<span>Questão {} de {}</span>\n<span>{:.0}% completo</span>\n",
        session.current_index() + 1,
        total,
        progress.round()
    ));
    html.push_str("</header>\n");
    html.push_str(&format!(
        "<div class=\"progress\"><div class=\"progress-bar\" style=\"width: {progress:.0}%\"></div></div>\n"
    ));

    html.push_str(&format!("<h2>{}</h2>\n", html_escape(&question.prompt)));
    html.push_str("<div class=\"question-body\">\n");
    html.push_str(&elements_to_html(&render(&question.body, &question.assets)));
    html.push_str("</div>\n");

    html.push_str("<ul class=\"options\">\n");
    for option in &question.options {
        let checked = session.selected() == Some(option.id.as_str());
        html.push_str(&format!(
            "<li><label><input type=\"radio\" name=\"{}\" value=\"{}\"{}> {}</label></li>\n",
            html_escape(&question.id),
            html_escape(&option.id),
            if checked { " checked" } else { "" },
            html_escape(&option.text)
        ));
    }
    html.push_str("</ul>\n");

    html.push_str("<nav class=\"actions\">\n");
    html.push_str(&format!(
        "<button{}>Anterior</button>\n",
        disabled(session.current_index() == 0)
    ));
    let forward = if session.is_last_question() {
        "Finalizar"
    } else {
        "Próxima"
    };
    html.push_str(&format!(
        "<button class=\"primary\"{}>{forward}</button>\n",
        disabled(!session.can_advance())
    ));
    html.push_str("</nav>\n</section>\n");

    page_end(html)
}

fn disabled(yes: bool) -> &'static str {
    if yes {
        " disabled"
    } else {
        ""
    }
}

/// Generate the results page for a finished quiz.
pub fn generate_results_page(summary: &QuizSummary, theme: &Theme) -> String {
    let mut html = page_start("Resultados do Quiz", theme);

    html.push_str("<section class=\"card results\">\n");
    html.push_str("<h1>Resultados do Quiz</h1>\n");
    html.push_str(&generate_bar_chart(summary));
    let mascot = if summary.is_encouraging() {
        "Geo feliz"
    } else {
        "Geo encorajador"
    };
    html.push_str(&format!("<p class=\"mascot\">{mascot}</p>\n"));
    html.push_str(&format!(
        "<p class=\"score\">Você acertou {} de {} questões!</p>\n",
        summary.correct, summary.total
    ));
    html.push_str("<nav class=\"actions\">\n");
    html.push_str("<button class=\"primary\">Revisar Quiz</button>\n");
    html.push_str("<button class=\"primary\">Tentar Novamente</button>\n");
    html.push_str("<button class=\"primary\">Escolher Novo Quiz</button>\n");
    html.push_str("</nav>\n</section>\n");

    page_end(html)
}

/// Generate the review page: every question with the given answer and the explanation.
pub fn generate_review_page(items: &[ReviewItem<'_>], theme: &Theme) -> String {
    let mut html = page_start("Revisão", theme);

    for item in items {
        let question = item.question;
        html.push_str("<section class=\"card review\">\n");
        html.push_str(&format!("<h2>Questão {}</h2>\n", item.number));
        html.push_str(&format!(
            "<p class=\"prompt\">{}</p>\n",
            html_escape(&question.prompt)
        ));
        html.push_str("<div class=\"question-body\">\n");
        html.push_str(&elements_to_html(&render(&question.body, &question.assets)));
        html.push_str("</div>\n");
        html.push_str(&format!(
            "<p>Sua resposta: {}</p>\n",
            html_escape(item.answer_text)
        ));
        if item.correct {
            html.push_str("<p class=\"verdict correct\">Correta</p>\n");
        } else {
            html.push_str("<p class=\"verdict incorrect\">Incorreta</p>\n");
            if let Some(option) = question.correct_option() {
                html.push_str(&format!(
                    "<p>Resposta correta: {}</p>\n",
                    html_escape(&option.text)
                ));
            }
        }
        html.push_str(&format!(
            "<div class=\"explanation\"><strong>Explicação:</strong>\n<p>{}</p></div>\n",
            html_escape(&question.explanation)
        ));
        html.push_str("</section>\n");
    }

    html.push_str("<nav class=\"actions\"><button>Voltar às Categorias</button></nav>\n");
    page_end(html)
}

/// Write an HTML page to a file, creating parent directories.
pub fn write_html_page(html: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart(summary: &QuizSummary) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 120;

    let total = summary.total.max(1) as f64;
    let rows = [
        ("Corretas", summary.correct, "var(--accent)"),
        ("Incorretas", summary.incorrect(), "var(--destructive)"),
    ];

    let total_height = rows.len() * (bar_height + padding) + padding;
    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (label, count, color)) in rows.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let share = *count as f64 / total;
        let width = (share * max_width as f64) as usize;

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            label
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.0}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            share * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--background); color: var(--foreground); }
main { max-width: 56rem; margin: 0 auto; }
h1 { color: var(--primary); text-align: center; }
.rt-heading { color: var(--primary); }
.meta { color: var(--muted-foreground); }
.card { border: 1px solid var(--border); border-radius: 8px; padding: 1.5rem; margin: 1.5rem 0; }
.progress-header { display: flex; justify-content: space-between; }
.progress { height: 0.5rem; background: var(--muted); border-radius: 4px; margin: 0.5rem 0 1.5rem; }
.progress-bar { height: 100%; background: var(--primary); border-radius: 4px; }
.options { list-style: none; padding: 0; }
.options li { margin: 0.5rem 0; }
.actions { display: flex; gap: 1rem; justify-content: center; margin-top: 1.5rem; }
button { padding: 0.5rem 1rem; border: 1px solid var(--border); border-radius: 6px; background: var(--background); color: var(--foreground); }
button.primary { background: var(--primary); color: var(--primary-foreground); border-color: var(--primary); }
button[disabled] { opacity: 0.5; }
.rt-link { color: var(--primary); }
.external { margin-left: 0.25rem; }
.underline { text-decoration: underline; }
code { background: var(--muted); color: var(--destructive); padding: 0.1rem 0.25rem; border-radius: 4px; font-family: 'JetBrains Mono', 'Fira Code', monospace; }
blockquote { border-left: 4px solid var(--border); padding-left: 1rem; font-style: italic; }
hr { border: 0; border-top: 1px solid var(--border); margin: 2rem 0; }
table.rt-table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { padding: 0.5rem 1rem; border-top: 1px solid var(--border); text-align: left; }
th { background: var(--muted); }
figure.media { margin: 1.5rem 0; }
figure.media img { max-width: 100%; height: auto; border-radius: 8px; }
figcaption { font-size: 0.875rem; color: var(--muted-foreground); text-align: center; margin-top: 0.5rem; }
.missing-media { color: var(--destructive); background: var(--muted); padding: 0.5rem; border-radius: 4px; }
.embedded-entry { border: 1px solid var(--border); border-radius: 6px; padding: 1rem; margin: 1rem 0; }
.embedded-entry-inline { background: var(--muted); padding: 0.1rem 0.25rem; border-radius: 4px; }
.score { font-size: 1.5rem; font-weight: bold; text-align: center; }
.mascot { text-align: center; color: var(--secondary); }
.verdict { font-weight: 600; }
.correct { color: var(--success); }
.incorrect { color: var(--destructive); }
svg { display: block; margin: 1rem auto; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use geoquiz_core::model::{Asset, Question, QuizOption};
    use geoquiz_core::rich_text::{Mark, Node, RichDocument};
    use geoquiz_core::session::LoadOutcome;

    fn question(id: &str) -> Question {
        Question {
            id: id.into(),
            prompt: format!("Pergunta <{id}>"),
            body: RichDocument::new(vec![
                Node::Paragraph(vec![Node::text("Observe a rocha")]),
                Node::EmbeddedAsset {
                    target: "img".into(),
                },
            ]),
            options: vec![
                QuizOption {
                    id: format!("{id}-a"),
                    text: "Basalto".into(),
                },
                QuizOption {
                    id: format!("{id}-b"),
                    text: "Granito".into(),
                },
            ],
            correct_option_id: format!("{id}-a"),
            explanation: "Rocha vulcânica".into(),
            assets: vec![Asset {
                id: "img".into(),
                url: "//images.example/basalt.jpg".into(),
                content_type: "image/jpeg".into(),
                file_name: "basalt.jpg".into(),
                width: None,
                height: None,
                title: Some("Basalto".into()),
                description: None,
            }],
        }
    }

    fn started_session(questions: Vec<Question>) -> QuizSession {
        let mut session = QuizSession::new();
        let token = session.begin_loading("rocks");
        let outcome = session.complete_loading(token, questions);
        assert!(matches!(outcome, LoadOutcome::Started { .. }));
        session
    }

    #[test]
    fn escapes_text_and_attributes() {
        let elements = vec![Element::Paragraph {
            children: vec![
                Element::text("a < b & \"c\""),
                Element::Link {
                    href: "https://x.test/?q=\"1\"".into(),
                    external: true,
                    children: vec![Element::text("link")],
                },
            ],
        }];
        let html = elements_to_html(&elements);
        assert!(html.contains("a &lt; b &amp; &quot;c&quot;"));
        assert!(html.contains("href=\"https://x.test/?q=&quot;1&quot;\""));
        assert!(html.contains("target=\"_blank\" rel=\"noopener noreferrer\""));
        assert!(html.contains("class=\"external\""));
    }

    #[test]
    fn inert_links_have_no_target() {
        let html = elements_to_html(&[Element::Link {
            href: "#".into(),
            external: false,
            children: vec![Element::text("entrada")],
        }]);
        assert_eq!(html, "<a href=\"#\" class=\"rt-link\">entrada</a>");
    }

    #[test]
    fn marks_nest() {
        let doc = RichDocument::new(vec![Node::Paragraph(vec![Node::Text {
            value: "x".into(),
            marks: vec![Mark::new(MarkKind::Bold), Mark::new(MarkKind::Code)],
        }])]);
        let html = elements_to_html(&render(&doc, &[]));
        assert_eq!(html, "<p><code><strong>x</strong></code></p>\n");
    }

    #[test]
    fn media_and_missing_media() {
        let q = question("q1");
        let html = elements_to_html(&render(&q.body, &q.assets));
        assert!(html.contains("<img src=\"https://images.example/basalt.jpg\" alt=\"Basalto\" width=\"800\" height=\"600\""));
        assert!(html.contains("<figcaption>Basalto</figcaption>"));

        let html = elements_to_html(&render(&q.body, &[]));
        assert!(html.contains(MISSING_MEDIA_TEXT));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn quiz_page_shows_progress_and_navigation() {
        let mut session = started_session(vec![question("q1"), question("q2")]);
        let html = generate_quiz_page(&session, &Theme::default());
        assert!(html.contains("Questão 1 de 2"));
        assert!(html.contains("50% completo"));
        assert!(html.contains("Pergunta &lt;q1&gt;"));
        assert!(html.contains("<button disabled>Anterior</button>"));
        assert!(html.contains("<button class=\"primary\" disabled>Próxima</button>"));
        assert!(html.contains("--primary: rgb(139, 48, 140);"));

        session.answer("q1-b").unwrap();
        session.next();
        let html = generate_quiz_page(&session, &Theme::default());
        assert!(html.contains("Questão 2 de 2"));
        assert!(html.contains("100% completo"));
        assert!(html.contains(">Finalizar</button>"));
        assert!(html.contains("<button>Anterior</button>"));
    }

    #[test]
    fn quiz_page_without_questions() {
        let html = generate_quiz_page(&QuizSession::new(), &Theme::default());
        assert!(html.contains("Nenhuma questão carregada."));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn results_page() {
        let summary = QuizSummary {
            correct: 1,
            total: 3,
            percentage: 100.0 / 3.0,
        };
        let html = generate_results_page(&summary, &Theme::default());
        assert!(html.contains("Resultados do Quiz"));
        assert!(html.contains("Você acertou 1 de 3 questões!"));
        assert!(html.contains("Geo encorajador"));
        assert!(html.contains("Tentar Novamente"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn review_page() {
        let mut session = started_session(vec![question("q1"), question("q2")]);
        session.answer("q1-a").unwrap();
        session.finish().unwrap();
        session.review().unwrap();

        let html = generate_review_page(&session.review_items(), &Theme::default());
        assert!(html.contains("Questão 1"));
        assert!(html.contains("Sua resposta: Basalto"));
        assert!(html.contains("Sua resposta: Não respondida"));
        assert!(html.contains("class=\"verdict correct\">Correta"));
        assert!(html.contains("class=\"verdict incorrect\">Incorreta"));
        assert!(html.contains("Resposta correta: Basalto"));
        assert!(html.contains("Rocha vulcânica"));
        assert!(html.contains("Voltar às Categorias"));
    }

    #[test]
    fn write_page_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("quiz.html");

        write_html_page("<html></html>", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    }
}
