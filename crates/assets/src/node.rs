//! Brace-delimited node text format used by music definition files.
//!
//! ```text
//! BACKGROUND_MUSIC
//! {
//!     planet = Kerbin   // trailing comments are allowed
//!     path = MyMod/Music/kerbin.wav
//! }
//! ```
//!
//! Nodes nest, values are `key = value` pairs trimmed of whitespace, and a
//! node may be written on a single line (`NAME { key = value }`).

use crate::ConfigError;

/// One parsed node with its values and child nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigNode {
    name: String,
    line: usize,
    values: Vec<(String, String)>,
    nodes: Vec<ConfigNode>,
}

fn syntax(line: usize, message: impl Into<String>) -> ConfigError {
    ConfigError::Syntax {
        line,
        message: message.into(),
    }
}

fn strip_comment(line: &str) -> &str {
    line.split_once("//").map_or(line, |(before, _)| before)
}

impl ConfigNode {
    /// Parse a whole file. The returned root node is unnamed and holds the
    /// top-level values and nodes. A leading byte-order mark is ignored.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut root = ConfigNode::default();
        let mut open: Vec<ConfigNode> = Vec::new();
        let mut pending: Option<(String, usize)> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let mut rest = strip_comment(raw);

            loop {
                rest = rest.trim_start();
                if rest.is_empty() {
                    break;
                }

                if let Some(after) = rest.strip_prefix('{') {
                    let Some((name, line)) = pending.take() else {
                        return Err(syntax(line_no, "'{' without a node name"));
                    };
                    open.push(ConfigNode {
                        name,
                        line,
                        ..Default::default()
                    });
                    rest = after;
                    continue;
                }

                if let Some(after) = rest.strip_prefix('}') {
                    if let Some((name, _)) = pending.take() {
                        return Err(syntax(line_no, format!("expected '{{' after {name}")));
                    }
                    let Some(node) = open.pop() else {
                        return Err(syntax(line_no, "unmatched '}'"));
                    };
                    match open.last_mut() {
                        Some(parent) => parent.nodes.push(node),
                        None => root.nodes.push(node),
                    }
                    rest = after;
                    continue;
                }

                let end = rest.find(['{', '}']).unwrap_or(rest.len());
                let (token, after) = rest.split_at(end);
                if let Some((key, value)) = token.split_once('=') {
                    if let Some((name, _)) = pending.take() {
                        return Err(syntax(line_no, format!("expected '{{' after {name}")));
                    }
                    let key = key.trim();
                    if key.is_empty() {
                        return Err(syntax(line_no, "value without a key"));
                    }
                    let current = match open.last_mut() {
                        Some(node) => node,
                        None => &mut root,
                    };
                    current
                        .values
                        .push((key.to_string(), value.trim().to_string()));
                } else {
                    let name = token.trim().to_string();
                    if let Some((previous, _)) = pending.replace((name, line_no)) {
                        return Err(syntax(line_no, format!("expected '{{' after {previous}")));
                    }
                }
                rest = after;
            }
        }

        if let Some((name, line)) = pending {
            return Err(syntax(line, format!("node {name} has no body")));
        }
        if let Some(unclosed) = open.last() {
            return Err(syntax(
                unclosed.line,
                format!("node {} is never closed", unclosed.name),
            ));
        }
        Ok(root)
    }

    /// Node name (empty for the root).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Line the node name appeared on (0 for the root).
    pub fn line(&self) -> usize {
        self.line
    }

    /// First value stored under `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values in file order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Child nodes called `name`, in file order.
    pub fn nodes<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> + 'a {
        self.nodes.iter().filter(move |node| node.name == name)
    }

    /// Every child node.
    pub fn children(&self) -> &[ConfigNode] {
        &self.nodes
    }
}
