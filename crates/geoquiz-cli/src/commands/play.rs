//! The `geoquiz play` command: an interactive quiz on stdin/stdout.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use geoquiz_core::controller::QuizController;
use geoquiz_core::render::render;
use geoquiz_core::session::QuizSession;
use geoquiz_core::Stage;
use geoquiz_report::elements_to_text;

use super::categories::category_table;
use super::controller_from_config;

pub async fn execute(category: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let (mut controller, _) = controller_from_config(config_path)?;
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    play(&mut controller, category, &mut input, &mut output).await
}

/// Whether the loop should keep going after handling one screen.
enum Flow {
    Continue,
    Quit,
}

/// Run the quiz loop until the user quits or input ends.
pub async fn play<R: BufRead, W: Write>(
    controller: &mut QuizController,
    category: Option<String>,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    if !controller.load_categories().await {
        anyhow::bail!(
            "{}",
            controller.error().unwrap_or("no categories available")
        );
    }

    if let Some(id) = category {
        if !controller.start_quiz(&id).await {
            show_error(controller, out)?;
        }
    }

    loop {
        let flow = match controller.stage() {
            Stage::CategorySelection => select_category(controller, input, out).await?,
            Stage::InQuiz => quiz_step(controller, input, out)?,
            Stage::Results => results_step(controller, input, out).await?,
            Stage::Review => review_step(controller, input, out)?,
        };
        if let Flow::Quit = flow {
            out.flush()?;
            return Ok(());
        }
    }
}

fn read_command<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> Result<Option<String>> {
    write!(out, "{prompt} ")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}

fn show_error<W: Write>(controller: &QuizController, out: &mut W) -> Result<()> {
    if let Some(message) = controller.error() {
        writeln!(out, "\n! {message}")?;
    }
    Ok(())
}

async fn select_category<R: BufRead, W: Write>(
    controller: &mut QuizController,
    input: &mut R,
    out: &mut W,
) -> Result<Flow> {
    writeln!(out, "\nBem-vindo à Geodinâmica\n")?;
    writeln!(out, "{}", category_table(controller.categories()))?;

    let Some(command) = read_command(input, out, "Escolha uma categoria (número) ou q para sair:")?
    else {
        return Ok(Flow::Quit);
    };
    if command == "q" {
        return Ok(Flow::Quit);
    }

    let chosen = command
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| controller.categories().get(i))
        .map(|c| c.id.clone());
    match chosen {
        Some(id) => {
            writeln!(out, "Carregando...")?;
            if !controller.start_quiz(&id).await {
                show_error(controller, out)?;
            }
        }
        None => writeln!(out, "Opção inválida: {command}")?,
    }
    Ok(Flow::Continue)
}

fn print_question<W: Write>(session: &QuizSession, out: &mut W) -> Result<()> {
    let Some(question) = session.current_question() else {
        return Ok(());
    };

    writeln!(
        out,
        "\nQuestão {} de {} ({:.0}% completo)",
        session.current_index() + 1,
        session.questions().len(),
        session.progress_percent().round()
    )?;
    writeln!(out, "\n{}\n", question.prompt)?;
    let body = elements_to_text(&render(&question.body, &question.assets));
    if !body.is_empty() {
        writeln!(out, "{body}\n")?;
    }
    for (i, option) in question.options.iter().enumerate() {
        let marker = if session.selected() == Some(option.id.as_str()) {
            "*"
        } else {
            " "
        };
        writeln!(out, " {marker} {}) {}", i + 1, option.text)?;
    }
    Ok(())
}

fn quiz_step<R: BufRead, W: Write>(
    controller: &mut QuizController,
    input: &mut R,
    out: &mut W,
) -> Result<Flow> {
    print_question(controller.session(), out)?;

    let forward = if controller.session().is_last_question() {
        "n finalizar"
    } else {
        "n próxima"
    };
    let prompt = format!("[número] responder, {forward}, p anterior, q sair:");
    let Some(command) = read_command(input, out, &prompt)? else {
        return Ok(Flow::Quit);
    };

    match command.as_str() {
        "q" => return Ok(Flow::Quit),
        "n" => {
            if !controller.session().can_advance() {
                writeln!(out, "Selecione uma resposta primeiro.")?;
            } else if controller.session().is_last_question() {
                controller.finish()?;
            } else {
                controller.next();
            }
        }
        "p" => {
            if !controller.previous() {
                writeln!(out, "Esta é a primeira questão.")?;
            }
        }
        other => {
            let option_id = other
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| {
                    controller
                        .session()
                        .current_question()
                        .and_then(|q| q.options.get(i))
                })
                .map(|o| o.id.clone());
            match option_id {
                Some(id) => controller.answer(&id)?,
                None => writeln!(out, "Opção inválida: {other}")?,
            }
        }
    }
    Ok(Flow::Continue)
}

async fn results_step<R: BufRead, W: Write>(
    controller: &mut QuizController,
    input: &mut R,
    out: &mut W,
) -> Result<Flow> {
    let summary = controller.session().summary();
    writeln!(out, "\nResultados do Quiz\n")?;
    writeln!(
        out,
        "Você acertou {} de {} questões! ({:.0}%)",
        summary.correct, summary.total, summary.percentage
    )?;
    if summary.is_encouraging() {
        writeln!(out, "Geo está feliz com o seu resultado!")?;
    } else {
        writeln!(out, "Geo acredita que você pode melhorar. Continue tentando!")?;
    }

    let Some(command) = read_command(
        input,
        out,
        "r revisar quiz, t tentar novamente, c escolher novo quiz, q sair:",
    )?
    else {
        return Ok(Flow::Quit);
    };

    match command.as_str() {
        "q" => return Ok(Flow::Quit),
        "r" => controller.review()?,
        "t" => {
            if !controller.try_again().await {
                show_error(controller, out)?;
            }
        }
        "c" => controller.choose_new_quiz(),
        other => writeln!(out, "Opção inválida: {other}")?,
    }
    Ok(Flow::Continue)
}

fn review_step<R: BufRead, W: Write>(
    controller: &mut QuizController,
    input: &mut R,
    out: &mut W,
) -> Result<Flow> {
    for item in controller.session().review_items() {
        let question = item.question;
        writeln!(out, "\nQuestão {}", item.number)?;
        writeln!(out, "{}", question.prompt)?;
        let body = elements_to_text(&render(&question.body, &question.assets));
        if !body.is_empty() {
            writeln!(out, "{body}")?;
        }
        writeln!(out, "Sua resposta: {}", item.answer_text)?;
        writeln!(
            out,
            "{}",
            if item.correct { "Correta" } else { "Incorreta" }
        )?;
        writeln!(out, "Explicação: {}", question.explanation)?;
    }

    let Some(command) = read_command(input, out, "\nEnter para voltar às categorias, q para sair:")?
    else {
        return Ok(Flow::Quit);
    };
    if command == "q" {
        return Ok(Flow::Quit);
    }
    controller.back_to_categories();
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use geoquiz_content::MockSource;
    use geoquiz_core::model::{Category, Question, QuizOption};
    use geoquiz_core::rich_text::{Node, RichDocument};

    fn question(id: &str) -> Question {
        Question {
            id: id.into(),
            prompt: format!("Pergunta {id}"),
            body: RichDocument::new(vec![Node::Paragraph(vec![Node::text("Corpo")])]),
            options: ["a", "b", "c"]
                .iter()
                .map(|o| QuizOption {
                    id: format!("{id}-{o}"),
                    text: format!("Opção {o}"),
                })
                .collect(),
            correct_option_id: format!("{id}-a"),
            explanation: format!("Explicação de {id}"),
            assets: vec![],
        }
    }

    fn controller() -> QuizController {
        let source = MockSource::new(vec![
            Category {
                id: "rocks".into(),
                name: "Rochas".into(),
                description: String::new(),
            },
            Category {
                id: "empty".into(),
                name: "Vazia".into(),
                description: String::new(),
            },
        ])
        .with_questions("rocks", vec![question("q1"), question("q2"), question("q3")]);
        QuizController::new(Arc::new(source))
    }

    async fn run(controller: &mut QuizController, category: Option<&str>, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        play(controller, category.map(str::to_string), &mut input, &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn one_of_three_then_review() {
        let mut c = controller();
        let out = run(&mut c, None, "1\n1\nn\n2\nn\nn\n3\nn\nr\nq\n").await;

        assert!(out.contains("Questão 1 de 3 (33% completo)"));
        assert!(out.contains("Selecione uma resposta primeiro."));
        assert!(out.contains("n finalizar"));
        assert!(out.contains("Você acertou 1 de 3 questões! (33%)"));
        assert!(out.contains("Sua resposta: Opção c"));
        assert!(out.contains("Explicação de q2"));
        assert_eq!(c.stage(), Stage::Review);
    }

    #[tokio::test]
    async fn empty_category_reports_error_and_stays() {
        let mut c = controller();
        let out = run(&mut c, None, "2\nq\n").await;
        assert!(out.contains("No questions found for this category"));
        assert_eq!(c.stage(), Stage::CategorySelection);
    }

    #[tokio::test]
    async fn category_flag_skips_menu_and_try_again_restarts() {
        let mut c = controller();
        let out = run(&mut c, Some("rocks"), "1\nn\n1\nn\n1\nn\nt\nq\n").await;
        assert!(!out.contains("Escolha uma categoria"));
        assert!(out.contains("Você acertou 3 de 3 questões!"));
        assert_eq!(c.stage(), Stage::InQuiz);
        assert_eq!(c.session().current_index(), 0);
        assert!(c.session().answers().is_empty());
    }

    #[tokio::test]
    async fn cannot_finish_without_answering() {
        let mut c = controller();
        let out = run(&mut c, Some("rocks"), "f\nn\nq\n").await;
        assert!(out.contains("Opção inválida: f"));
        assert!(out.contains("Selecione uma resposta primeiro."));
        assert!(!out.contains("Resultados do Quiz"));
        assert_eq!(c.stage(), Stage::InQuiz);
        assert_eq!(c.session().current_index(), 0);
    }

    #[tokio::test]
    async fn navigation_restores_selection() {
        let mut c = controller();
        let out = run(&mut c, Some("rocks"), "2\nn\np\nq\n").await;
        assert!(out.contains(" * 2) Opção b"));
        assert_eq!(c.session().current_index(), 0);
        assert_eq!(c.session().selected(), Some("q1-b"));
    }

    #[tokio::test]
    async fn invalid_input_is_reported() {
        let mut c = controller();
        let out = run(&mut c, None, "9\nq\n").await;
        assert!(out.contains("Opção inválida: 9"));
    }

    #[tokio::test]
    async fn end_of_input_quits() {
        let mut c = controller();
        run(&mut c, Some("rocks"), "").await;
        assert_eq!(c.stage(), Stage::InQuiz);
    }
}
