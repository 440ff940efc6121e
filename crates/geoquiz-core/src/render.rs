//! Rich-content renderer.
//!
//! Turns a [`RichDocument`] into a tree of displayable [`Element`]s that the
//! presentation layer can lay out as HTML or terminal text. Rendering is a
//! pure function of the document and the asset list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::Asset;
use crate::rich_text::{MarkKind, Node, RichDocument};

/// Width used when an asset carries no image dimensions.
pub const DEFAULT_MEDIA_WIDTH: u32 = 800;
/// Height used when an asset carries no image dimensions.
pub const DEFAULT_MEDIA_HEIGHT: u32 = 600;
/// Alt text used when an asset has neither description nor title.
pub const DEFAULT_ALT_TEXT: &str = "Imagem";

/// A displayable node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Heading {
        level: u8,
        children: Vec<Element>,
    },
    Paragraph {
        children: Vec<Element>,
    },
    List {
        ordered: bool,
        children: Vec<Element>,
    },
    ListItem {
        children: Vec<Element>,
    },
    Quote {
        children: Vec<Element>,
    },
    Rule,
    Table {
        children: Vec<Element>,
    },
    TableRow {
        children: Vec<Element>,
    },
    TableCell {
        header: bool,
        children: Vec<Element>,
    },
    Media(Figure),
    /// An embedded asset whose id was not in the asset list.
    MissingMedia {
        asset_id: String,
    },
    EntryBlock {
        children: Vec<Element>,
    },
    EntryInline {
        children: Vec<Element>,
    },
    /// `external` links open in a new context; inert links point at `#`.
    Link {
        href: String,
        external: bool,
        children: Vec<Element>,
    },
    Marked {
        mark: MarkKind,
        children: Vec<Element>,
    },
    Text {
        value: String,
    },
}

/// A resolved embedded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    pub asset_id: String,
    pub src: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
    pub caption: Option<String>,
    pub content_type: String,
}

impl Element {
    pub fn text(value: impl Into<String>) -> Self {
        Element::Text {
            value: value.into(),
        }
    }

    pub fn children(&self) -> &[Element] {
        match self {
            Element::Heading { children, .. }
            | Element::Paragraph { children }
            | Element::List { children, .. }
            | Element::ListItem { children }
            | Element::Quote { children }
            | Element::Table { children }
            | Element::TableRow { children }
            | Element::TableCell { children, .. }
            | Element::EntryBlock { children }
            | Element::EntryInline { children }
            | Element::Link { children, .. }
            | Element::Marked { children, .. } => children,
            Element::Rule
            | Element::Media(_)
            | Element::MissingMedia { .. }
            | Element::Text { .. } => &[],
        }
    }

    /// Depth-first, pre-order walk.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

/// Render a document, resolving embedded assets against `assets`.
pub fn render(document: &RichDocument, assets: &[Asset]) -> Vec<Element> {
    let renderer = Renderer::new(assets);
    renderer.render_nodes(&document.content)
}

struct Renderer<'a> {
    assets: HashMap<&'a str, &'a Asset>,
}

impl<'a> Renderer<'a> {
    fn new(assets: &'a [Asset]) -> Self {
        Self {
            assets: assets.iter().map(|a| (a.id.as_str(), a)).collect(),
        }
    }

    fn render_nodes(&self, nodes: &[Node]) -> Vec<Element> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.render_into(node, &mut out);
        }
        out
    }

    fn render_into(&self, node: &Node, out: &mut Vec<Element>) {
        let element = match node {
            // Unknown kinds are transparent: their children render in place.
            Node::Unknown { children, .. } => {
                for child in children {
                    self.render_into(child, out);
                }
                return;
            }
            Node::Paragraph(c) => Element::Paragraph {
                children: self.render_nodes(c),
            },
            Node::Heading { level, children } => Element::Heading {
                level: (*level).clamp(1, 6),
                children: self.render_nodes(children),
            },
            Node::UnorderedList(c) => Element::List {
                ordered: false,
                children: self.render_nodes(c),
            },
            Node::OrderedList(c) => Element::List {
                ordered: true,
                children: self.render_nodes(c),
            },
            Node::ListItem(c) => Element::ListItem {
                children: self.render_nodes(c),
            },
            Node::Quote(c) => Element::Quote {
                children: self.render_nodes(c),
            },
            Node::HorizontalRule => Element::Rule,
            Node::Table(c) => Element::Table {
                children: self.render_nodes(c),
            },
            Node::TableRow(c) => Element::TableRow {
                children: self.render_nodes(c),
            },
            Node::TableCell(c) => Element::TableCell {
                header: false,
                children: self.render_nodes(c),
            },
            Node::TableHeaderCell(c) => Element::TableCell {
                header: true,
                children: self.render_nodes(c),
            },
            Node::EmbeddedAsset { target } => self.render_asset(target),
            Node::EmbeddedEntry { children, .. } => Element::EntryBlock {
                children: self.render_nodes(children),
            },
            Node::InlineEntry { children, .. } => Element::EntryInline {
                children: self.render_nodes(children),
            },
            Node::Hyperlink { uri, children } => Element::Link {
                href: uri.clone(),
                external: true,
                children: self.render_nodes(children),
            },
            Node::EntryHyperlink { children, .. } | Node::AssetHyperlink { children, .. } => {
                Element::Link {
                    href: "#".to_string(),
                    external: false,
                    children: self.render_nodes(children),
                }
            }
            Node::Text { value, marks } => marks
                .iter()
                .filter(|m| m.kind != MarkKind::Other)
                .fold(Element::text(value.clone()), |inner, mark| Element::Marked {
                    mark: mark.kind,
                    children: vec![inner],
                }),
        };
        out.push(element);
    }

    fn render_asset(&self, asset_id: &str) -> Element {
        let Some(asset) = self.assets.get(asset_id) else {
            tracing::debug!(asset_id, "embedded asset not found in side-loaded assets");
            return Element::MissingMedia {
                asset_id: asset_id.to_string(),
            };
        };

        let caption = asset.caption().map(str::to_string);
        Element::Media(Figure {
            asset_id: asset.id.clone(),
            src: asset.absolute_url(),
            alt: caption.clone().unwrap_or_else(|| DEFAULT_ALT_TEXT.to_string()),
            width: asset.width.unwrap_or(DEFAULT_MEDIA_WIDTH),
            height: asset.height.unwrap_or(DEFAULT_MEDIA_HEIGHT),
            caption,
            content_type: asset.content_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_text::Mark;

    fn granite() -> Asset {
        Asset {
            id: "granite".into(),
            url: "//images.ctfassets.net/space/granite.jpg".into(),
            content_type: "image/jpeg".into(),
            file_name: "granite.jpg".into(),
            width: Some(1024),
            height: None,
            title: Some("Granito".into()),
            description: Some("Granito rosa".into()),
        }
    }

    fn embedded(id: &str) -> Node {
        Node::EmbeddedAsset { target: id.into() }
    }

    #[test]
    fn embedded_asset_resolves_to_media() {
        let doc = RichDocument::new(vec![embedded("granite")]);
        let out = render(&doc, &[granite()]);

        assert_eq!(out.len(), 1);
        match &out[0] {
            Element::Media(fig) => {
                assert_eq!(fig.src, "https://images.ctfassets.net/space/granite.jpg");
                assert_eq!(fig.caption.as_deref(), Some("Granito rosa"));
                assert_eq!(fig.alt, "Granito rosa");
                assert_eq!(fig.width, 1024);
                assert_eq!(fig.height, DEFAULT_MEDIA_HEIGHT);
            }
            other => panic!("expected media, got {other:?}"),
        }
    }

    #[test]
    fn missing_asset_renders_placeholder() {
        let doc = RichDocument::new(vec![
            Node::Paragraph(vec![Node::text("antes")]),
            embedded("nope"),
        ]);
        let out = render(&doc, &[granite()]);
        assert_eq!(
            out[1],
            Element::MissingMedia {
                asset_id: "nope".into()
            }
        );
    }

    #[test]
    fn marks_compose_first_innermost() {
        let doc = RichDocument::new(vec![Node::Paragraph(vec![Node::Text {
            value: "quartzo".into(),
            marks: vec![Mark::new(MarkKind::Bold), Mark::new(MarkKind::Italic)],
        }])]);
        let out = render(&doc, &[]);

        let expected = Element::Marked {
            mark: MarkKind::Italic,
            children: vec![Element::Marked {
                mark: MarkKind::Bold,
                children: vec![Element::text("quartzo")],
            }],
        };
        assert_eq!(out[0].children()[0], expected);
    }

    #[test]
    fn links_external_and_inert() {
        let doc = RichDocument::new(vec![Node::Paragraph(vec![
            Node::Hyperlink {
                uri: "https://usgs.gov".into(),
                children: vec![Node::text("USGS")],
            },
            Node::EntryHyperlink {
                target: "entry-1".into(),
                children: vec![Node::text("ver")],
            },
            Node::AssetHyperlink {
                target: "asset-1".into(),
                children: vec![Node::text("arquivo")],
            },
        ])]);
        let out = render(&doc, &[]);
        let links = out[0].children();

        assert!(matches!(&links[0], Element::Link { href, external: true, .. } if href == "https://usgs.gov"));
        assert!(matches!(&links[1], Element::Link { href, external: false, .. } if href == "#"));
        assert!(matches!(&links[2], Element::Link { href, external: false, .. } if href == "#"));
    }

    #[test]
    fn structure_and_order_preserved() {
        let doc = RichDocument::new(vec![
            Node::Heading {
                level: 3,
                children: vec![Node::text("Título")],
            },
            Node::OrderedList(vec![
                Node::ListItem(vec![Node::Paragraph(vec![Node::text("um")])]),
                Node::ListItem(vec![Node::Paragraph(vec![Node::text("dois")])]),
            ]),
            Node::HorizontalRule,
            Node::Table(vec![Node::TableRow(vec![
                Node::TableHeaderCell(vec![Node::text("h")]),
                Node::TableCell(vec![Node::text("c")]),
            ])]),
            Node::Quote(vec![Node::Paragraph(vec![Node::text("citação")])]),
            Node::EmbeddedEntry {
                target: "e".into(),
                children: vec![],
            },
        ]);
        let out = render(&doc, &[]);

        assert!(matches!(out[0], Element::Heading { level: 3, .. }));
        assert!(matches!(out[1], Element::List { ordered: true, .. }));
        assert_eq!(out[1].children().len(), 2);
        assert_eq!(out[2], Element::Rule);
        let row = &out[3].children()[0];
        assert!(matches!(row.children()[0], Element::TableCell { header: true, .. }));
        assert!(matches!(row.children()[1], Element::TableCell { header: false, .. }));
        assert!(matches!(out[4], Element::Quote { .. }));
        assert!(matches!(out[5], Element::EntryBlock { .. }));

        let mut texts = Vec::new();
        for el in &out {
            el.walk(&mut |e| {
                if let Element::Text { value } = e {
                    texts.push(value.as_str());
                }
            });
        }
        assert_eq!(texts, vec!["Título", "um", "dois", "h", "c", "citação"]);
    }

    #[test]
    fn unknown_nodes_are_transparent_and_text_is_verbatim() {
        let doc = RichDocument::new(vec![Node::Unknown {
            node_type: "future-block".into(),
            children: vec![Node::Paragraph(vec![Node::text("linha 1\n  linha 2")])],
        }]);
        let out = render(&doc, &[]);
        assert_eq!(
            out,
            vec![Element::Paragraph {
                children: vec![Element::text("linha 1\n  linha 2")]
            }]
        );
    }

    #[test]
    fn render_is_deterministic() {
        let doc = RichDocument::new(vec![
            embedded("granite"),
            embedded("missing"),
            Node::Paragraph(vec![Node::text("x")]),
        ]);
        let assets = [granite()];
        assert_eq!(render(&doc, &assets), render(&doc, &assets));
    }
}
