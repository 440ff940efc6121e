//! Plain terminal rendering of displayable elements.
//!
//! Output is markdown-flavoured: `#` headings, `-`/`1.` list bullets, `>`
//! quotes and `[image: ...]` placeholders for media.

use geoquiz_core::render::Element;
use geoquiz_core::rich_text::MarkKind;

use crate::html::MISSING_MEDIA_TEXT;

/// Render elements as terminal text. Blocks are separated by blank lines.
pub fn elements_to_text(elements: &[Element]) -> String {
    let blocks: Vec<String> = elements
        .iter()
        .map(|e| block(e, 0))
        .filter(|b| !b.trim().is_empty())
        .collect();
    blocks.join("\n\n")
}

fn block(element: &Element, depth: usize) -> String {
    match element {
        Element::Heading { level, children } => {
            format!("{} {}", "#".repeat(*level as usize), inline(children))
        }
        Element::Paragraph { children } => inline(children),
        Element::List { ordered, children } => {
            let indent = "  ".repeat(depth);
            children
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let bullet = if *ordered {
                        format!("{}.", i + 1)
                    } else {
                        "-".to_string()
                    };
                    format!("{indent}{bullet} {}", list_item(item, depth))
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Element::ListItem { .. } => list_item(element, depth),
        Element::Quote { children } => children
            .iter()
            .map(|c| block(c, depth))
            .collect::<Vec<_>>()
            .join("\n")
            .lines()
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Element::Rule => "---".to_string(),
        Element::Table { children } => children
            .iter()
            .map(|row| block(row, depth))
            .collect::<Vec<_>>()
            .join("\n"),
        Element::TableRow { children } => {
            let cells: Vec<String> = children.iter().map(|c| inline(c.children())).collect();
            format!("| {} |", cells.join(" | "))
        }
        Element::EntryBlock { children } => children
            .iter()
            .map(|c| block(c, depth))
            .collect::<Vec<_>>()
            .join("\n"),
        Element::Media(figure) => match &figure.caption {
            Some(caption) => format!("[imagem: {caption}] <{}>", figure.src),
            None => format!("[imagem] <{}>", figure.src),
        },
        Element::MissingMedia { .. } => format!("[{MISSING_MEDIA_TEXT}]"),
        other => inline(std::slice::from_ref(other)),
    }
}

/// Text of a list item: its first block inline, nested lists indented below.
fn list_item(item: &Element, depth: usize) -> String {
    let mut lines = Vec::new();
    for child in item.children() {
        match child {
            Element::List { .. } => lines.push(format!("\n{}", block(child, depth + 1))),
            Element::Paragraph { children } => {
                if !lines.is_empty() {
                    lines.push(" ".to_string());
                }
                lines.push(inline(children));
            }
            other => lines.push(inline(std::slice::from_ref(other))),
        }
    }
    lines.concat()
}

fn inline(elements: &[Element]) -> String {
    let mut out = String::new();
    for element in elements {
        match element {
            Element::Text { value } => out.push_str(value),
            Element::Marked { mark, children } => {
                let inner = inline(children);
                let wrapped = match mark {
                    MarkKind::Bold => format!("**{inner}**"),
                    MarkKind::Italic => format!("*{inner}*"),
                    MarkKind::Underline => format!("_{inner}_"),
                    MarkKind::Code => format!("`{inner}`"),
                    MarkKind::Other => inner,
                };
                out.push_str(&wrapped);
            }
            Element::Link {
                href,
                external,
                children,
            } => {
                let label = inline(children);
                if *external {
                    out.push_str(&format!("{label} <{href}>"));
                } else {
                    out.push_str(&label);
                }
            }
            Element::Media(_) | Element::MissingMedia { .. } | Element::Rule => {
                out.push_str(&block(element, 0));
            }
            other => out.push_str(&inline(other.children())),
        }
    }
    out
}
