use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing MAL source into a document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A line did not match any pattern permitted in its context. Parsing stops
    /// at the first such line; there is no recovery.
    #[error("Improper syntax: {line:?}")]
    ImproperSyntax { line: String },
    /// The line source ran out while a block was still open.
    #[error("Incomplete script at:\n {last_line:?}")]
    Incomplete { last_line: String },
    /// A source or included file could not be read.
    #[error("Error while opening {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while reading a document from JSON or combining
/// documents. A document whose shape violates the structural expectations fails
/// here, before any MAL emission takes place.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The combine operation was handed a JSON value that is not a mapping.
    #[error("cannot combine a document with a non-mapping value")]
    IncompatibleOperand,
    #[error("document root must be a JSON object")]
    RootNotObject,
    #[error("failed to parse JSON document")]
    Json {
        #[source]
        source: serde_json::Error,
    },
    #[error("category {name:?} is not structured as a category")]
    MalformedCategory { name: String },
    #[error("asset {name:?} is missing required fields")]
    MalformedAsset { name: String },
    #[error("metadata on {owner:?} must map string keys to string values")]
    MalformedMeta { owner: String },
    #[error("attack step {name:?} is missing required fields")]
    MalformedAttribute { name: String },
    #[error("unknown attack step type {kind:?} on {name:?}")]
    UnknownAttributeType { name: String, kind: String },
    #[error("invalid CIA entry on {name:?} (expected \"C\", \"I\" or \"A\")")]
    MalformedCia { name: String },
    #[error("invalid tag on {name:?} (expected \"hidden\", \"debug\" or \"trace\")")]
    UnknownTag { name: String },
    #[error("expressions under {name:?} must map string keys to string values")]
    MalformedExpressions { name: String },
    #[error("association at index {index} is missing required fields")]
    MalformedAssociation { index: usize },
}
