//! Color theme shared by every rendered page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named set of color variables, emitted as CSS custom properties.
///
/// Themes are passed explicitly to the renderers; nothing is installed
/// globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Variable name (without the leading `--`) → CSS color value.
    pub colors: BTreeMap<String, String>,
}

const PALETTE: &[(&str, &str)] = &[
    ("primary", "rgb(139, 48, 140)"),
    ("primary-foreground", "rgb(255, 255, 255)"),
    ("secondary", "rgb(29, 44, 64)"),
    ("secondary-foreground", "rgb(255, 255, 255)"),
    ("accent", "rgb(37, 184, 217)"),
    ("accent-foreground", "rgb(29, 44, 64)"),
    ("warning", "rgb(242, 166, 73)"),
    ("destructive", "rgb(217, 48, 48)"),
    ("success", "rgb(34, 139, 84)"),
    ("background", "rgb(255, 255, 255)"),
    ("foreground", "rgb(29, 44, 64)"),
    ("muted", "rgb(243, 244, 246)"),
    ("muted-foreground", "rgb(107, 114, 128)"),
    ("border", "rgb(209, 213, 219)"),
];

impl Default for Theme {
    fn default() -> Self {
        Self::geodinamica()
    }
}

impl Theme {
    /// The Geodinâmica palette.
    pub fn geodinamica() -> Self {
        Self {
            colors: PALETTE
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Replace or add colors. Keys may be given with or without `--`.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (name, value) in overrides {
            let name = name.trim_start_matches("--").trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }
            self.colors.insert(name.to_string(), value.to_string());
        }
        self
    }

    pub fn color(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(String::as_str)
    }

    /// A `:root { --name: value; ... }` block.
    pub fn to_css(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in &self.colors {
            // Strip characters that could close the declaration block.
            let value: String = value
                .chars()
                .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>'))
                .collect();
            css.push_str(&format!("  --{name}: {value};\n"));
        }
        css.push_str("}\n");
        css
    }
}
