//! A bidirectional translator between MAL (the Meta Attack Language, a declarative
//! language for describing attack graphs) and a structured JSON document. The parser
//! consumes `.mal` source, with its categories of typed assets carrying attack
//! steps, defenses, probability distributions, CIA annotations, trace tags,
//! metadata and cross-asset associations, and builds an ordered in-memory document.
//! The emitter performs the inverse walk, producing well-formed MAL text that
//! re-parses to the same document, and the JSON layer serialises the document in a
//! canonical sorted-key form.
//!
//! This crate deliberately does *not* evaluate the attack graph: there is no
//! simulation, no probability computation, and no checking that an attack step's
//! target asset actually exists. Inheritance (`extends`) is recorded by name only.
//! The aim is faithful, order-preserving translation between the two surface forms.

/// Errors to do with parsing MAL and handling document representations.
pub mod error;
mod combine;
mod into_mal;
mod json;
mod parser;
mod source;

// Using this structure for ease of storing utility functions
#[cfg(test)]
pub mod tests;

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// A parsed MAL document. All mappings preserve source declaration order, and the
/// emitter iterates them in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// File-level `#key: "value"` declarations (e.g. `id`, `version`).
    pub defines: IndexMap<String, String>,
    /// Categories by name. Empty when the source declared none.
    pub categories: IndexMap<String, Category>,
    /// Associations in declaration order. Duplicates are permitted and are
    /// distinguished by position.
    pub associations: Vec<Association>,
    /// Unrecognized top-level keys from an externally provided JSON document.
    /// These are preserved by [`Document::combine`] and skipped (with a debug
    /// trace) by the MAL emitter; the parser never produces them.
    pub extra: IndexMap<String, Value>,
}

/// A `category` block: a named grouping of assets with its own metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    pub meta: Meta,
    pub assets: IndexMap<String, Asset>,
}

/// An `asset` declaration inside a category.
///
/// `extends` records the base asset's name only; no resolution is performed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Asset {
    pub meta: Meta,
    pub attributes: IndexMap<String, Attribute>,
    pub extends: Option<String>,
    pub is_abstract: bool,
}

/// An attack step or defense on an asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub meta: Meta,
    pub kind: AttributeKind,
    /// Probability distribution descriptor (e.g. `Exponential(0.02)`), stored
    /// verbatim and never interpreted.
    pub probability: Option<String>,
    /// CIA annotation: a subset of {C, I, A}, kept sorted in that literal order
    /// and deduplicated.
    pub cia: Option<Vec<Cia>>,
    /// `@hidden`/`@debug`/`@trace` annotations in order of appearance.
    pub tags: Vec<Tag>,
    /// `+>` expressions.
    pub append: IndexMap<ExprKey, String>,
    /// `->` expressions.
    pub leads_to: IndexMap<ExprKey, String>,
    /// `<-` expressions.
    pub require: IndexMap<ExprKey, String>,
}
impl Attribute {
    /// Creates an empty attribute of the given kind.
    pub fn new(kind: AttributeKind) -> Self {
        Self {
            meta: Meta::default(),
            kind,
            probability: None,
            cia: None,
            tags: Vec::new(),
            append: IndexMap::new(),
            leads_to: IndexMap::new(),
            require: IndexMap::new(),
        }
    }
    /// Gets the expression block for the given direction.
    pub fn expressions(&self, direction: Direction) -> &IndexMap<ExprKey, String> {
        match direction {
            Direction::Append => &self.append,
            Direction::LeadsTo => &self.leads_to,
            Direction::Require => &self.require,
        }
    }
    /// Gets the expression block for the given direction, mutably.
    pub fn expressions_mut(&mut self, direction: Direction) -> &mut IndexMap<ExprKey, String> {
        match direction {
            Direction::Append => &mut self.append,
            Direction::LeadsTo => &mut self.leads_to,
            Direction::Require => &mut self.require,
        }
    }
}

/// The closed set of attribute types. The symbol and name forms are only used at
/// the surface-syntax and document boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// A logical-or attack step, written `|`.
    Or,
    /// A logical-and attack step, written `&`.
    And,
    /// A protection mechanism, written `#`.
    Defense,
    /// Activates when a linked asset exists, written `E`.
    Exists,
    /// Activates when a linked asset is absent, written `!E`.
    Lacks,
}
impl AttributeKind {
    /// Parses the MAL symbol form (`|`, `&`, `#`, `E`, `!E`).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "|" => Some(Self::Or),
            "&" => Some(Self::And),
            "#" => Some(Self::Defense),
            "E" => Some(Self::Exists),
            "!E" => Some(Self::Lacks),
            _ => None,
        }
    }
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Or => "|",
            Self::And => "&",
            Self::Defense => "#",
            Self::Exists => "E",
            Self::Lacks => "!E",
        }
    }
    /// Parses the document name form (`or`, `and`, `defense`, `exists`, `lacks`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "or" => Some(Self::Or),
            "and" => Some(Self::And),
            "defense" => Some(Self::Defense),
            "exists" => Some(Self::Exists),
            "lacks" => Some(Self::Lacks),
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Defense => "defense",
            Self::Exists => "exists",
            Self::Lacks => "lacks",
        }
    }
}

/// One letter of a `{C,I,A}` annotation. The derived ordering is the literal
/// sequence C, I, A, which is the order annotations are stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Cia {
    C,
    I,
    A,
}
impl Cia {
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "C" => Some(Self::C),
            "I" => Some(Self::I),
            "A" => Some(Self::A),
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::C => "C",
            Self::I => "I",
            Self::A => "A",
        }
    }
}

/// A `@`-annotation on an attack step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Hidden,
    Debug,
    Trace,
}
impl Tag {
    /// Parses a whitespace-delimited token of an attribute header line. Only the
    /// exact annotations `@hidden`, `@debug` and `@trace` are recognized.
    pub fn from_annotation(token: &str) -> Option<Self> {
        match token {
            "@hidden" => Some(Self::Hidden),
            "@debug" => Some(Self::Debug),
            "@trace" => Some(Self::Trace),
            _ => None,
        }
    }
    /// Parses the bare document form (leading `@` stripped).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hidden" => Some(Self::Hidden),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// The direction of an expression block on an attack step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Appends to an inherited step, written `+>`.
    Append,
    /// Leads to another step, written `->`.
    LeadsTo,
    /// Requires a linked asset, written `<-`.
    Require,
}
impl Direction {
    /// All directions, in the order blocks are emitted.
    pub const ALL: [Direction; 3] = [Direction::Append, Direction::LeadsTo, Direction::Require];

    /// Parses the two-character operator that opens an expression line.
    pub fn from_operator(operator: &str) -> Option<Self> {
        match operator {
            "+>" => Some(Self::Append),
            "->" => Some(Self::LeadsTo),
            "<-" => Some(Self::Require),
            _ => None,
        }
    }
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Append => "+>",
            Self::LeadsTo => "->",
            Self::Require => "<-",
        }
    }
    /// The document key this direction is stored under.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::LeadsTo => "leads_to",
            Self::Require => "require",
        }
    }
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "append" => Some(Self::Append),
            "leads_to" => Some(Self::LeadsTo),
            "require" => Some(Self::Require),
            _ => None,
        }
    }
}

/// The key of one expression element: either the identifier of a `let` binding,
/// or the position assigned to a bare expression. Both flatten to a plain string
/// at the document boundary (`"x"` / `"0"`), where an all-digits key reads back
/// as positional.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprKey {
    Let(String),
    Index(u64),
}
impl ExprKey {
    /// Reads a document-boundary key string back into its typed form.
    pub fn from_str(key: &str) -> Self {
        if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = key.parse() {
                return Self::Index(index);
            }
        }
        Self::Let(key.to_string())
    }
}
impl fmt::Display for ExprKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Let(name) => write!(f, "{name}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A named bidirectional link between two assets:
/// `asset_l [field_l] mult_l <-- name --> mult_r [field_r] asset_r`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Association {
    pub name: String,
    pub asset_l: String,
    pub field_l: String,
    pub mult_l: String,
    pub asset_r: String,
    pub field_r: String,
    pub mult_r: String,
    pub meta: Meta,
}

/// Metadata attached to a document node: an ordered mapping from free-form keys
/// (word characters and internal spaces) to string values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    inner: IndexMap<String, String>,
}
// Metadata is overwhelmingly manipulated as the underlying mapping
impl std::ops::Deref for Meta {
    type Target = IndexMap<String, String>;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl std::ops::DerefMut for Meta {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
