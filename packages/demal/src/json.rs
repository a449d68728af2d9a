//! Conversion between the document and its JSON wire form.
//!
//! The wire layout puts defines at the top level alongside `categories` and
//! `associations`. Objects are built on `serde_json`'s default map type, which
//! keeps keys sorted, so both the pretty and compact forms are canonical: parsing
//! a document's own JSON output and re-emitting it is byte-identical.

use crate::error::DocumentError;
use crate::{
    Asset, Association, Attribute, AttributeKind, Category, Cia, Direction, Document, ExprKey,
    Meta, Tag,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

impl Document {
    /// Converts this document into a JSON value with the wire layout: defines as
    /// top-level string entries, `categories` and `associations` beside them
    /// (omitted while empty), and any preserved unrecognized keys as-is.
    pub fn to_json_value(&self) -> Value {
        let mut root = Map::new();
        for (key, value) in &self.defines {
            root.insert(key.clone(), Value::String(value.clone()));
        }
        if !self.categories.is_empty() {
            let mut categories = Map::new();
            for (name, category) in &self.categories {
                categories.insert(name.clone(), category.to_json_value());
            }
            root.insert("categories".to_string(), Value::Object(categories));
        }
        if !self.associations.is_empty() {
            root.insert(
                "associations".to_string(),
                Value::Array(
                    self.associations
                        .iter()
                        .map(Association::to_json_value)
                        .collect(),
                ),
            );
        }
        for (key, value) in &self.extra {
            root.insert(key.clone(), value.clone());
        }
        Value::Object(root)
    }

    /// Serialises this document to JSON text: pretty-printed with two-space
    /// indentation, or compact on a single line. Both forms have sorted keys and
    /// end with a single trailing newline.
    pub fn to_json_string(&self, pretty: bool) -> String {
        let value = self.to_json_value();
        // This is guaranteed to be a valid JSON value
        let mut rendered = if pretty {
            serde_json::to_string_pretty(&value).unwrap()
        } else {
            serde_json::to_string(&value).unwrap()
        };
        rendered.push('\n');
        rendered
    }

    /// Reads a document from a JSON value, applying the structural checks of the
    /// wire layout. Top-level string entries become defines; unrecognized
    /// top-level keys are preserved in [`Document::extra`].
    pub fn from_json_value(value: &Value) -> Result<Self, DocumentError> {
        let Value::Object(root) = value else {
            return Err(DocumentError::RootNotObject);
        };
        let mut document = Document::default();
        for (key, value) in root {
            match (key.as_str(), value) {
                (_, Value::String(s)) => {
                    document.defines.insert(key.clone(), s.clone());
                }
                ("categories", Value::Object(categories)) => {
                    for (name, category) in categories {
                        document
                            .categories
                            .insert(name.clone(), Category::from_json_value(name, category)?);
                    }
                }
                ("associations", Value::Array(associations)) => {
                    for (index, association) in associations.iter().enumerate() {
                        document
                            .associations
                            .push(Association::from_json_value(index, association)?);
                    }
                }
                _ => {
                    document.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(document)
    }

    /// Parses JSON text into a document.
    pub fn from_json_str(s: &str) -> Result<Self, DocumentError> {
        let value: Value =
            serde_json::from_str(s).map_err(|source| DocumentError::Json { source })?;
        Self::from_json_value(&value)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}
impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Document::from_json_value(&value).map_err(serde::de::Error::custom)
    }
}

impl Category {
    fn to_json_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("meta".to_string(), self.meta.to_json_value());
        let mut assets = Map::new();
        for (name, asset) in &self.assets {
            assets.insert(name.clone(), asset.to_json_value());
        }
        map.insert("assets".to_string(), Value::Object(assets));
        Value::Object(map)
    }
    fn from_json_value(name: &str, value: &Value) -> Result<Self, DocumentError> {
        let Value::Object(map) = value else {
            return Err(DocumentError::MalformedCategory {
                name: name.to_string(),
            });
        };
        let Some(Value::Object(assets_map)) = map.get("assets") else {
            return Err(DocumentError::MalformedCategory {
                name: name.to_string(),
            });
        };
        let mut category = Category {
            meta: meta_from_json(map, name)?,
            assets: Default::default(),
        };
        for (asset_name, asset) in assets_map {
            category
                .assets
                .insert(asset_name.clone(), Asset::from_json_value(asset_name, asset)?);
        }
        Ok(category)
    }
}

impl Asset {
    fn to_json_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("meta".to_string(), self.meta.to_json_value());
        let mut attributes = Map::new();
        for (name, attribute) in &self.attributes {
            attributes.insert(name.clone(), attribute.to_json_value());
        }
        map.insert("attributes".to_string(), Value::Object(attributes));
        map.insert(
            "extends".to_string(),
            self.extends
                .as_ref()
                .map(|base| Value::String(base.clone()))
                .unwrap_or(Value::Null),
        );
        map.insert("abstract".to_string(), Value::Bool(self.is_abstract));
        Value::Object(map)
    }
    fn from_json_value(name: &str, value: &Value) -> Result<Self, DocumentError> {
        let malformed = || DocumentError::MalformedAsset {
            name: name.to_string(),
        };
        let Value::Object(map) = value else {
            return Err(malformed());
        };
        let Some(Value::Object(attributes_map)) = map.get("attributes") else {
            return Err(malformed());
        };
        let extends = match map.get("extends").ok_or_else(malformed)? {
            Value::Null => None,
            Value::String(base) => Some(base.clone()),
            _ => return Err(malformed()),
        };
        let Some(Value::Bool(is_abstract)) = map.get("abstract") else {
            return Err(malformed());
        };
        let mut asset = Asset {
            meta: meta_from_json(map, name)?,
            attributes: Default::default(),
            extends,
            is_abstract: *is_abstract,
        };
        for (attribute_name, attribute) in attributes_map {
            asset.attributes.insert(
                attribute_name.clone(),
                Attribute::from_json_value(attribute_name, attribute)?,
            );
        }
        Ok(asset)
    }
}

impl Attribute {
    fn to_json_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("meta".to_string(), self.meta.to_json_value());
        map.insert(
            "type".to_string(),
            Value::String(self.kind.as_str().to_string()),
        );
        map.insert(
            "probability".to_string(),
            self.probability
                .as_ref()
                .map(|prob| Value::String(prob.clone()))
                .unwrap_or(Value::Null),
        );
        map.insert(
            "cia".to_string(),
            self.cia
                .as_ref()
                .map(|cia| {
                    Value::Array(
                        cia.iter()
                            .map(|part| Value::String(part.as_str().to_string()))
                            .collect(),
                    )
                })
                .unwrap_or(Value::Null),
        );
        map.insert(
            "tags".to_string(),
            Value::Array(
                self.tags
                    .iter()
                    .map(|tag| Value::String(tag.as_str().to_string()))
                    .collect(),
            ),
        );
        for direction in Direction::ALL {
            let expressions = self.expressions(direction);
            if expressions.is_empty() {
                continue;
            }
            let mut block = Map::new();
            for (key, value) in expressions {
                block.insert(key.to_string(), Value::String(value.clone()));
            }
            map.insert(direction.key().to_string(), Value::Object(block));
        }
        Value::Object(map)
    }
    fn from_json_value(name: &str, value: &Value) -> Result<Self, DocumentError> {
        let malformed = || DocumentError::MalformedAttribute {
            name: name.to_string(),
        };
        let Value::Object(map) = value else {
            return Err(malformed());
        };
        let Some(Value::String(kind_str)) = map.get("type") else {
            return Err(malformed());
        };
        let kind = AttributeKind::from_name(kind_str).ok_or_else(|| {
            DocumentError::UnknownAttributeType {
                name: name.to_string(),
                kind: kind_str.clone(),
            }
        })?;

        let mut attribute = Attribute::new(kind);
        attribute.meta = meta_from_json(map, name)?;
        attribute.probability = match map.get("probability").ok_or_else(malformed)? {
            Value::Null => None,
            Value::String(prob) => Some(prob.clone()),
            _ => return Err(malformed()),
        };
        attribute.cia = match map.get("cia").ok_or_else(malformed)? {
            Value::Null => None,
            Value::Array(letters) => {
                let mut parts = letters
                    .iter()
                    .map(|letter| {
                        letter
                            .as_str()
                            .and_then(Cia::from_letter)
                            .ok_or_else(|| DocumentError::MalformedCia {
                                name: name.to_string(),
                            })
                    })
                    .collect::<Result<Vec<Cia>, DocumentError>>()?;
                parts.sort();
                parts.dedup();
                Some(parts)
            }
            _ => {
                return Err(DocumentError::MalformedCia {
                    name: name.to_string(),
                })
            }
        };
        let Some(Value::Array(tags)) = map.get("tags") else {
            return Err(malformed());
        };
        attribute.tags = tags
            .iter()
            .map(|tag| {
                tag.as_str()
                    .and_then(Tag::from_name)
                    .ok_or_else(|| DocumentError::UnknownTag {
                        name: name.to_string(),
                    })
            })
            .collect::<Result<Vec<Tag>, DocumentError>>()?;

        for (key, block) in map {
            // Anything that isn't a directional key is skipped, like the other
            // unrecognized fields of a node
            let Some(direction) = Direction::from_key(key) else {
                continue;
            };
            let Value::Object(entries) = block else {
                return Err(DocumentError::MalformedExpressions {
                    name: name.to_string(),
                });
            };
            let field = attribute.expressions_mut(direction);
            for (entry_key, entry_value) in entries {
                let Value::String(expression) = entry_value else {
                    return Err(DocumentError::MalformedExpressions {
                        name: name.to_string(),
                    });
                };
                field.insert(ExprKey::from_str(entry_key), expression.clone());
            }
        }
        Ok(attribute)
    }
}

impl Association {
    fn to_json_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("meta".to_string(), self.meta.to_json_value());
        map.insert("asset_l".to_string(), Value::String(self.asset_l.clone()));
        map.insert("asset_r".to_string(), Value::String(self.asset_r.clone()));
        map.insert("field_l".to_string(), Value::String(self.field_l.clone()));
        map.insert("field_r".to_string(), Value::String(self.field_r.clone()));
        map.insert("mult_l".to_string(), Value::String(self.mult_l.clone()));
        map.insert("mult_r".to_string(), Value::String(self.mult_r.clone()));
        Value::Object(map)
    }
    fn from_json_value(index: usize, value: &Value) -> Result<Self, DocumentError> {
        let malformed = || DocumentError::MalformedAssociation { index };
        let Value::Object(map) = value else {
            return Err(malformed());
        };
        let field = |key: &str| -> Result<String, DocumentError> {
            match map.get(key) {
                Some(Value::String(s)) => Ok(s.clone()),
                _ => Err(malformed()),
            }
        };
        Ok(Association {
            name: field("name")?,
            asset_l: field("asset_l")?,
            field_l: field("field_l")?,
            mult_l: field("mult_l")?,
            asset_r: field("asset_r")?,
            field_r: field("field_r")?,
            mult_r: field("mult_r")?,
            meta: meta_from_json(map, &format!("association {index}"))?,
        })
    }
}

impl Meta {
    fn to_json_value(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in self.iter() {
            map.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(map)
    }
}

/// Reads the optional `meta` entry of a node's JSON object. A missing entry is
/// an empty mapping; a present one must map strings to strings.
fn meta_from_json(map: &Map<String, Value>, owner: &str) -> Result<Meta, DocumentError> {
    let mut meta = Meta::default();
    match map.get("meta") {
        None => Ok(meta),
        Some(Value::Object(entries)) => {
            for (key, value) in entries {
                let Value::String(value) = value else {
                    return Err(DocumentError::MalformedMeta {
                        owner: owner.to_string(),
                    });
                };
                meta.insert(key.clone(), value.clone());
            }
            Ok(meta)
        }
        Some(_) => Err(DocumentError::MalformedMeta {
            owner: owner.to_string(),
        }),
    }
}
