//! Rich document tree.
//!
//! Mirrors the Contentful rich-text JSON format (`nodeType`, `content`,
//! `data`, `value`, `marks`) as an explicit sum type. Unrecognized node
//! types deserialize to [`Node::Unknown`] so new backend node kinds never
//! make a whole document unreadable.

use serde::{Deserialize, Serialize};

/// A text mark such as bold or italic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: MarkKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
    Code,
    /// Superscript, strikethrough and friends: kept but rendered as plain text.
    #[serde(other)]
    Other,
}

impl Mark {
    pub fn new(kind: MarkKind) -> Self {
        Self { kind }
    }
}

/// One node of a rich document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub enum Node {
    Paragraph(Vec<Node>),
    /// Heading with level clamped to 1..=6.
    Heading {
        level: u8,
        children: Vec<Node>,
    },
    UnorderedList(Vec<Node>),
    OrderedList(Vec<Node>),
    ListItem(Vec<Node>),
    Quote(Vec<Node>),
    HorizontalRule,
    Table(Vec<Node>),
    TableRow(Vec<Node>),
    TableCell(Vec<Node>),
    TableHeaderCell(Vec<Node>),
    /// Block-level reference to a side-loaded asset.
    EmbeddedAsset {
        target: String,
    },
    EmbeddedEntry {
        target: String,
        children: Vec<Node>,
    },
    InlineEntry {
        target: String,
        children: Vec<Node>,
    },
    Hyperlink {
        uri: String,
        children: Vec<Node>,
    },
    EntryHyperlink {
        target: String,
        children: Vec<Node>,
    },
    AssetHyperlink {
        target: String,
        children: Vec<Node>,
    },
    Text {
        value: String,
        marks: Vec<Mark>,
    },
    Unknown {
        node_type: String,
        children: Vec<Node>,
    },
}

impl Node {
    /// Plain text node without marks.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
            marks: Vec::new(),
        }
    }

    /// Child nodes, in document order.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph(c)
            | Node::UnorderedList(c)
            | Node::OrderedList(c)
            | Node::ListItem(c)
            | Node::Quote(c)
            | Node::Table(c)
            | Node::TableRow(c)
            | Node::TableCell(c)
            | Node::TableHeaderCell(c) => c,
            Node::Heading { children, .. }
            | Node::EmbeddedEntry { children, .. }
            | Node::InlineEntry { children, .. }
            | Node::Hyperlink { children, .. }
            | Node::EntryHyperlink { children, .. }
            | Node::AssetHyperlink { children, .. }
            | Node::Unknown { children, .. } => children,
            Node::HorizontalRule | Node::EmbeddedAsset { .. } | Node::Text { .. } => &[],
        }
    }

    /// Depth-first, pre-order walk over this node and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// `nodeType` string used by the wire format.
    pub fn node_type(&self) -> &str {
        match self {
            Node::Paragraph(_) => "paragraph",
            Node::Heading { level, .. } => HEADING_TYPES[usize::from(clamp_level(*level)) - 1],
            Node::UnorderedList(_) => "unordered-list",
            Node::OrderedList(_) => "ordered-list",
            Node::ListItem(_) => "list-item",
            Node::Quote(_) => "blockquote",
            Node::HorizontalRule => "hr",
            Node::Table(_) => "table",
            Node::TableRow(_) => "table-row",
            Node::TableCell(_) => "table-cell",
            Node::TableHeaderCell(_) => "table-header-cell",
            Node::EmbeddedAsset { .. } => "embedded-asset-block",
            Node::EmbeddedEntry { .. } => "embedded-entry-block",
            Node::InlineEntry { .. } => "embedded-entry-inline",
            Node::Hyperlink { .. } => "hyperlink",
            Node::EntryHyperlink { .. } => "entry-hyperlink",
            Node::AssetHyperlink { .. } => "asset-hyperlink",
            Node::Text { .. } => "text",
            Node::Unknown { node_type, .. } => node_type,
        }
    }
}

const HEADING_TYPES: [&str; 6] = [
    "heading-1",
    "heading-2",
    "heading-3",
    "heading-4",
    "heading-5",
    "heading-6",
];

fn clamp_level(level: u8) -> u8 {
    level.clamp(1, 6)
}

/// A whole rich-text document (the `document` root node).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub struct RichDocument {
    pub content: Vec<Node>,
}

impl RichDocument {
    pub fn new(content: Vec<Node>) -> Self {
        Self { content }
    }

    /// Text of the first run of the first block, if it is a non-empty text node.
    ///
    /// Used to turn short rich-text fields (descriptions, explanations,
    /// option labels) into plain strings.
    pub fn leading_text(&self) -> Option<&str> {
        match self.content.first()?.children().first()? {
            Node::Text { value, .. } if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    /// All text runs concatenated, one line per top-level block.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|block| {
                let mut line = String::new();
                block.walk(&mut |node| {
                    if let Node::Text { value, .. } = node {
                        line.push_str(value);
                    }
                });
                line
            })
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Ids referenced by embedded-asset blocks, in traversal order.
    pub fn embedded_asset_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for node in &self.content {
            node.walk(&mut |n| {
                if let Node::EmbeddedAsset { target } = n {
                    ids.push(target.as_str());
                }
            });
        }
        ids
    }
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawNode {
    #[serde(rename = "nodeType", default)]
    node_type: String,
    #[serde(default)]
    data: RawData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    marks: Vec<Mark>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<RawTarget>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawTarget {
    #[serde(default)]
    sys: RawSys,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawSys {
    #[serde(default)]
    id: String,
}

impl RawData {
    fn target_id(&self) -> String {
        self.target
            .as_ref()
            .map(|t| t.sys.id.clone())
            .unwrap_or_default()
    }

    fn with_target(id: String) -> Self {
        Self {
            uri: None,
            target: Some(RawTarget {
                sys: RawSys { id },
            }),
        }
    }
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let RawNode {
            node_type,
            data,
            content,
            value,
            marks,
        } = raw;

        if let Some(level) = node_type
            .strip_prefix("heading-")
            .and_then(|l| l.parse::<u8>().ok())
            .filter(|l| (1..=6).contains(l))
        {
            return Node::Heading {
                level,
                children: content,
            };
        }

        match node_type.as_str() {
            "paragraph" => Node::Paragraph(content),
            "unordered-list" => Node::UnorderedList(content),
            "ordered-list" => Node::OrderedList(content),
            "list-item" => Node::ListItem(content),
            "blockquote" => Node::Quote(content),
            "hr" => Node::HorizontalRule,
            "table" => Node::Table(content),
            "table-row" => Node::TableRow(content),
            "table-cell" => Node::TableCell(content),
            "table-header-cell" => Node::TableHeaderCell(content),
            "embedded-asset-block" => Node::EmbeddedAsset {
                target: data.target_id(),
            },
            "embedded-entry-block" => Node::EmbeddedEntry {
                target: data.target_id(),
                children: content,
            },
            "embedded-entry-inline" => Node::InlineEntry {
                target: data.target_id(),
                children: content,
            },
            "hyperlink" => Node::Hyperlink {
                uri: data.uri.unwrap_or_default(),
                children: content,
            },
            "entry-hyperlink" => Node::EntryHyperlink {
                target: data.target_id(),
                children: content,
            },
            "asset-hyperlink" => Node::AssetHyperlink {
                target: data.target_id(),
                children: content,
            },
            "text" => Node::Text {
                value: value.unwrap_or_default(),
                marks,
            },
            _ => Node::Unknown {
                node_type,
                children: content,
            },
        }
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        let node_type = node.node_type().to_string();
        let mut raw = RawNode {
            node_type,
            ..Default::default()
        };
        match node {
            Node::Paragraph(c)
            | Node::UnorderedList(c)
            | Node::OrderedList(c)
            | Node::ListItem(c)
            | Node::Quote(c)
            | Node::Table(c)
            | Node::TableRow(c)
            | Node::TableCell(c)
            | Node::TableHeaderCell(c) => raw.content = c,
            Node::Heading { children, .. } | Node::Unknown { children, .. } => {
                raw.content = children
            }
            Node::HorizontalRule => {}
            Node::EmbeddedAsset { target } => raw.data = RawData::with_target(target),
            Node::EmbeddedEntry { target, children }
            | Node::InlineEntry { target, children }
            | Node::EntryHyperlink { target, children }
            | Node::AssetHyperlink { target, children } => {
                raw.data = RawData::with_target(target);
                raw.content = children;
            }
            Node::Hyperlink { uri, children } => {
                raw.data.uri = Some(uri);
                raw.content = children;
            }
            Node::Text { value, marks } => {
                raw.value = Some(value);
                raw.marks = marks;
            }
        }
        raw
    }
}

impl From<RawNode> for RichDocument {
    fn from(raw: RawNode) -> Self {
        Self {
            content: raw.content,
        }
    }
}

impl From<RichDocument> for RawNode {
    fn from(doc: RichDocument) -> Self {
        RawNode {
            node_type: "document".to_string(),
            content: doc.content,
            ..Default::default()
        }
    }
}
