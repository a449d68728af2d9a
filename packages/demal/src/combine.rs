//! Combining two documents into a new one, mirroring the refinement semantics
//! of `include`: later definitions override or extend earlier ones.

use crate::error::DocumentError;
use crate::Document;
use serde_json::Value;

impl Document {
    /// Produces the union of this document and `other`, leaving both operands
    /// untouched.
    ///
    /// Defines from `other` override same-named defines here. Categories present
    /// on both sides are merged: the right-hand category's metadata and assets
    /// update the base entry key by key. Categories only on the right are
    /// appended in right-hand order. Associations are replaced wholesale by the
    /// right-hand sequence when it is nonempty. Unrecognized top-level keys
    /// shallow-merge when both sides hold mappings and replace otherwise.
    pub fn combine(&self, other: &Document) -> Document {
        let mut result = self.clone();

        for (key, value) in &other.defines {
            result.defines.insert(key.clone(), value.clone());
        }

        for (name, category) in &other.categories {
            match result.categories.get_mut(name) {
                Some(base) => {
                    for (key, value) in category.meta.iter() {
                        base.meta.insert(key.clone(), value.clone());
                    }
                    for (asset_name, asset) in &category.assets {
                        base.assets.insert(asset_name.clone(), asset.clone());
                    }
                }
                None => {
                    result.categories.insert(name.clone(), category.clone());
                }
            }
        }

        if !other.associations.is_empty() {
            result.associations = other.associations.clone();
        }

        for (key, value) in &other.extra {
            let merged = match (result.extra.get(key), value) {
                (Some(Value::Object(base)), Value::Object(update)) => {
                    let mut base = base.clone();
                    for (entry_key, entry_value) in update {
                        base.insert(entry_key.clone(), entry_value.clone());
                    }
                    Value::Object(base)
                }
                _ => value.clone(),
            };
            result.extra.insert(key.clone(), merged);
        }

        result
    }

    /// Combines this document with a raw JSON mapping, e.g. `{"version":
    /// "1.3.3.7"}`. Any JSON value that is not a mapping is rejected; a mapping
    /// that fails the document shape checks propagates that failure.
    pub fn combine_json(&self, value: &Value) -> Result<Document, DocumentError> {
        if !value.is_object() {
            return Err(DocumentError::IncompatibleOperand);
        }
        Ok(self.combine(&Document::from_json_value(value)?))
    }
}
