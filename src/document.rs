//! Document Module — `.tui` project files.
//!
//! A document is `{ version: "1", meta: { name, theme, savedAt }, tree }`
//! written as 2-space indented JSON. Only version "1" is accepted.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::ComponentNode;

pub const FORMAT_VERSION: &str = "1";
pub const FILE_EXTENSION: &str = "tui";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid .tui JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported .tui version: {0}")]
    UnsupportedVersion(String),
    #[error(".tui document has no component tree")]
    MissingTree,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuiDocument {
    pub version: String,
    #[serde(default)]
    pub meta: DocumentMeta,
    pub tree: ComponentNode,
}

impl TuiDocument {
    /// Wrap a tree; the document name is the root's name.
    pub fn new(tree: ComponentNode, theme: Option<String>, saved_at: Option<String>) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            meta: DocumentMeta {
                name: tree.name.clone(),
                theme,
                saved_at,
            },
            tree,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(json)?;
        match value.get("version") {
            Some(Value::String(v)) if v == FORMAT_VERSION => {}
            Some(Value::String(v)) => return Err(DocumentError::UnsupportedVersion(v.clone())),
            Some(other) => return Err(DocumentError::UnsupportedVersion(other.to_string())),
            None => return Err(DocumentError::UnsupportedVersion("missing".to_string())),
        }
        match value.get("tree") {
            None | Some(Value::Null) => return Err(DocumentError::MissingTree),
            Some(_) => {}
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Lowercased root name, whitespace runs replaced by `-`, plus `.tui`.
    pub fn suggested_file_name(&self) -> String {
        format!("{}.{FILE_EXTENSION}", slug(&self.tree.name))
    }
}

fn slug(name: &str) -> String {
    static WHITESPACE: OnceLock<Option<Regex>> = OnceLock::new();
    let lower = name.to_lowercase();
    match WHITESPACE.get_or_init(|| Regex::new(r"\s+").ok()) {
        Some(re) => re.replace_all(&lower, "-").into_owned(),
        None => lower.split_whitespace().collect::<Vec<_>>().join("-"),
    }
}
