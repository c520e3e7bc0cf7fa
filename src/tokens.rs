//! Token Document - Typed Token Tree
//!
//! JSON token files are classified structurally into groups and color
//! tokens up front; the walker only ever sees [`TokenNode`].

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::convert::Oklch;
use crate::pipeline::PipelineError;

/// Token metadata keys. Never treated as children.
pub const METADATA_KEYS: [&str; 3] = ["$description", "$type", "$value"];

/// Keys whose presence marks an object as a color token.
pub const COLOR_KEYS: [&str; 3] = ["l", "c", "h"];

#[derive(Debug, Clone, PartialEq)]
pub enum TokenNode {
    /// Nested nodes in document order.
    Group(Vec<(String, TokenNode)>),
    Color(ColorToken),
    /// Primitive or array; carries no tokens.
    Leaf,
}

/// A color token as authored: numeric payloads read from each component's `$value`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorToken {
    pub description: Option<String>,
    pub l: Option<f64>,
    pub c: Option<f64>,
    pub h: Option<f64>,
}

impl ColorToken {
    /// Build from an object holding all of `l`, `c`, `h`; `None` otherwise.
    pub fn from_map(map: &Map<String, Value>) -> Option<Self> {
        if !COLOR_KEYS.iter().all(|key| map.contains_key(*key)) {
            return None;
        }

        let description = map
            .get("$description")
            .or_else(|| map.get("description"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self {
            description,
            l: numeric_leaf(map, "l"),
            c: numeric_leaf(map, "c"),
            h: numeric_leaf(map, "h"),
        })
    }

    /// Stored triple, if every component is present.
    pub fn components(&self) -> Option<Oklch> {
        Some(Oklch {
            l: self.l?,
            c: self.c?,
            h: self.h?,
        })
    }
}

fn numeric_leaf(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key)?.get("$value")?.as_f64()
}

impl TokenNode {
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return TokenNode::Leaf;
        };

        if let Some(token) = ColorToken::from_map(map) {
            return TokenNode::Color(token);
        }

        let children = map
            .iter()
            .filter(|(key, _)| !METADATA_KEYS.contains(&key.as_str()))
            .map(|(key, child)| (key.clone(), TokenNode::from_value(child)))
            .collect();
        TokenNode::Group(children)
    }
}

/// A color token found by the walker.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTokenEntry<'a> {
    /// The token's own key.
    pub name: &'a str,
    /// Path of the enclosing group; empty at the top level.
    pub parent_path: String,
    /// Fully qualified path, including `name`.
    pub path: String,
    pub token: &'a ColorToken,
}

pub fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Depth-first, pre-order by insertion. Color tokens are not descended into.
pub fn find_color_tokens<'a>(node: &'a TokenNode, prefix: &str) -> Vec<ColorTokenEntry<'a>> {
    let mut found = vec![];
    collect(node, prefix, &mut found);
    found
}

fn collect<'a>(node: &'a TokenNode, prefix: &str, found: &mut Vec<ColorTokenEntry<'a>>) {
    let TokenNode::Group(children) = node else {
        return;
    };

    for (key, child) in children {
        let path = join_path(prefix, key);
        match child {
            TokenNode::Color(token) => {
                debug!(%path, "Found color token");
                found.push(ColorTokenEntry {
                    name: key,
                    parent_path: prefix.to_string(),
                    path,
                    token,
                });
            }
            TokenNode::Group(_) => collect(child, &path, found),
            TokenNode::Leaf => {}
        }
    }
}

/// A parsed token file
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDocument {
    pub root: TokenNode,
}

impl TokenDocument {
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(content)?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        Self {
            root: TokenNode::from_value(value),
        }
    }

    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Self::parse(&content).map_err(|source| PipelineError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded token document");
        Ok(document)
    }

    pub fn color_tokens(&self) -> Vec<ColorTokenEntry<'_>> {
        find_color_tokens(&self.root, "")
    }
}
