//! Content payload: placeholder key -> copy to draw.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Content = BTreeMap<String, ContentValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentValue {
    Text(String),
    Lines(Vec<String>),
}

impl ContentValue {
    /// The string drawn for this value. Sequences join on a single space.
    pub fn display_text(&self) -> String {
        match self {
            ContentValue::Text(text) => text.clone(),
            ContentValue::Lines(lines) => lines.join(" "),
        }
    }
}

impl From<&str> for ContentValue {
    fn from(value: &str) -> Self {
        ContentValue::Text(value.to_string())
    }
}

impl From<String> for ContentValue {
    fn from(value: String) -> Self {
        ContentValue::Text(value)
    }
}

impl From<Vec<String>> for ContentValue {
    fn from(value: Vec<String>) -> Self {
        ContentValue::Lines(value)
    }
}

/// Display text for `key`, or `None` when there is nothing to draw.
pub fn text_for(content: &Content, key: &str) -> Option<String> {
    let text = content.get(key)?.display_text();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
