//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::depth::estimate_total_steps;
use crate::domain::error::{DomainError, DomainResult};

/// Text keyed by locale code, e.g. `{"en": "Yes", "es": "Sí"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(locale.into(), text.into());
        self
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.0.contains_key(locale)
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A labeled edge from a question node to another node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: LocalizedText,
    pub next: String,
}

/// Payload of a result (leaf) node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    #[serde(rename = "mbti")]
    pub code: TypeCode,
    pub title: LocalizedText,
    pub summary: LocalizedText,
}

/// A point in the decision tree.
///
/// Content documents distinguish the variants by shape: question nodes carry
/// `question` and `options`, result nodes carry a single `result` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Question {
        question: LocalizedText,
        options: Vec<ChoiceOption>,
    },
    Result {
        result: ResultInfo,
    },
}

impl Node {
    pub fn is_result(&self) -> bool {
        matches!(self, Node::Result { .. })
    }

    pub fn options(&self) -> &[ChoiceOption] {
        match self {
            Node::Question { options, .. } => options,
            Node::Result { .. } => &[],
        }
    }

    pub fn as_result(&self) -> Option<&ResultInfo> {
        match self {
            Node::Result { result } => Some(result),
            Node::Question { .. } => None,
        }
    }
}

/// Personality type code carried by a result node.
///
/// Stored upper-case; content may use any casing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypeCode(String);

impl TypeCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case form used in result routes.
    pub fn slug(&self) -> String {
        self.0.to_lowercase()
    }

    /// The standard type this code denotes, if any.
    pub fn mbti(&self) -> Option<MbtiType> {
        self.0.parse().ok()
    }

    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl From<String> for TypeCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<TypeCode> for String {
    fn from(code: TypeCode) -> Self {
        code.0
    }
}

impl From<MbtiType> for TypeCode {
    fn from(t: MbtiType) -> Self {
        Self(t.as_str().to_string())
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown personality type: {0}")]
pub struct UnknownTypeError(pub String);

/// The 16 fixed personality classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MbtiType {
    Intj,
    Intp,
    Infj,
    Infp,
    Istj,
    Isfj,
    Istp,
    Isfp,
    Entp,
    Enfp,
    Enfj,
    Esfj,
    Estp,
    Esfp,
    Estj,
    Entj,
}

impl MbtiType {
    pub const ALL: [MbtiType; 16] = [
        MbtiType::Intj,
        MbtiType::Intp,
        MbtiType::Infj,
        MbtiType::Infp,
        MbtiType::Istj,
        MbtiType::Isfj,
        MbtiType::Istp,
        MbtiType::Isfp,
        MbtiType::Entp,
        MbtiType::Enfp,
        MbtiType::Enfj,
        MbtiType::Esfj,
        MbtiType::Estp,
        MbtiType::Esfp,
        MbtiType::Estj,
        MbtiType::Entj,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MbtiType::Intj => "INTJ",
            MbtiType::Intp => "INTP",
            MbtiType::Infj => "INFJ",
            MbtiType::Infp => "INFP",
            MbtiType::Istj => "ISTJ",
            MbtiType::Isfj => "ISFJ",
            MbtiType::Istp => "ISTP",
            MbtiType::Isfp => "ISFP",
            MbtiType::Entp => "ENTP",
            MbtiType::Enfp => "ENFP",
            MbtiType::Enfj => "ENFJ",
            MbtiType::Esfj => "ESFJ",
            MbtiType::Estp => "ESTP",
            MbtiType::Esfp => "ESFP",
            MbtiType::Estj => "ESTJ",
            MbtiType::Entj => "ENTJ",
        }
    }
}

impl FromStr for MbtiType {
    type Err = UnknownTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        MbtiType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTypeError(s.to_string()))
    }
}

impl fmt::Display for MbtiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable quiz graph: node map plus designated start key.
///
/// The total-step estimate is computed on first use and cached for the
/// lifetime of the tree, so every session sharing an `Arc<Tree>` reuses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub start: String,
    pub nodes: BTreeMap<String, Node>,
    #[serde(skip)]
    total_steps: OnceLock<usize>,
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.nodes == other.nodes
    }
}

impl Tree {
    pub fn new(start: impl Into<String>, nodes: BTreeMap<String, Node>) -> Self {
        Self {
            start: start.into(),
            nodes,
            total_steps: OnceLock::new(),
        }
    }

    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Look up a node, treating absence as a content-integrity fault.
    pub fn require(&self, key: &str) -> DomainResult<&Node> {
        self.nodes.get(key).ok_or_else(|| DomainError::MalformedTree {
            key: key.to_string(),
        })
    }

    /// Worst-case number of steps from the start node (cached).
    pub fn total_steps(&self) -> usize {
        *self
            .total_steps
            .get_or_init(|| estimate_total_steps(self, &self.start))
    }

    /// All result nodes with their keys, in key order.
    pub fn results(&self) -> impl Iterator<Item = (&str, &ResultInfo)> {
        self.nodes
            .iter()
            .filter_map(|(key, node)| node.as_result().map(|r| (key.as_str(), r)))
    }

    /// Find a result by type code.
    ///
    /// Tries the conventional `leaf_<slug>` key first, then scans all result
    /// nodes for a case-insensitive code match.
    pub fn find_result(&self, code: &str) -> Option<(&str, &ResultInfo)> {
        let conventional = format!("leaf_{}", code.trim().to_lowercase());
        if let Some((key, Node::Result { result })) = self.nodes.get_key_value(&conventional) {
            if result.code.matches(code) {
                return Some((key.as_str(), result));
            }
        }
        self.results().find(|(_, r)| r.code.matches(code))
    }
}
