use super::*;
use crate::error::DocumentError;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn wire_format_should_flatten_defines_and_sort_keys() {
    let document = parse(
        r#"#version: "1.0.0"
#id: "x"

category System {
  asset Host {
    | compromise [Bernoulli(0.5)] {C,I} @hidden
  }
}
"#,
    );
    let expected = r#"{
  "categories": {
    "System": {
      "assets": {
        "Host": {
          "abstract": false,
          "attributes": {
            "compromise": {
              "cia": [
                "C",
                "I"
              ],
              "meta": {},
              "probability": "Bernoulli(0.5)",
              "tags": [
                "hidden"
              ],
              "type": "or"
            }
          },
          "extends": null,
          "meta": {}
        }
      },
      "meta": {}
    }
  },
  "id": "x",
  "version": "1.0.0"
}
"#;
    assert_eq!(document.to_json_string(true), expected);
}

#[test]
fn compact_form_should_be_a_single_line() {
    let document = parse("#id: \"x\"\n");
    assert_eq!(document.to_json_string(false), "{\"id\":\"x\"}\n");
}

#[test]
fn pretty_json_should_be_canonical() {
    let document = parse(NETWORK_MODEL);
    let pretty = document.to_json_string(true);
    let reloaded = Document::from_json_str(&pretty).unwrap();
    assert_eq!(reloaded.to_json_string(true), pretty);
}

#[test]
fn absent_fields_should_serialise_as_null() {
    let document = parse(
        r#"category C {
  asset A {
    | plain
  }
}
"#,
    );
    let value = document.to_json_value();
    let attribute = &value["categories"]["C"]["assets"]["A"]["attributes"]["plain"];
    assert_eq!(attribute["probability"], json!(null));
    assert_eq!(attribute["cia"], json!(null));
    assert_eq!(attribute["tags"], json!([]));
    assert_eq!(value["categories"]["C"]["assets"]["A"]["extends"], json!(null));
}

#[test]
fn expression_blocks_should_only_appear_when_present() {
    let document = parse(
        r#"category C {
  asset A {
    | step
      -> next.attack
  }
}
"#,
    );
    let value = document.to_json_value();
    let attribute = &value["categories"]["C"]["assets"]["A"]["attributes"]["step"];
    assert_eq!(attribute["leads_to"], json!({"0": "next.attack"}));
    assert!(attribute.get("append").is_none());
    assert!(attribute.get("require").is_none());
}

#[test]
fn json_should_load_back_into_a_document() {
    let document = parse(NETWORK_MODEL);
    let reloaded = Document::from_json_str(&document.to_json_string(true)).unwrap();

    // Key order changes to the canonical sorted order, but the contents match
    assert_eq!(reloaded.defines, document.defines);
    assert_eq!(reloaded.associations, document.associations);
    assert_eq!(reloaded.categories, document.categories);
}

#[test]
fn serde_bridges_should_agree_with_the_manual_conversions() {
    let document = parse(NETWORK_MODEL);
    let through_serde = serde_json::to_value(&document).unwrap();
    assert_eq!(through_serde, document.to_json_value());

    let back: Document = serde_json::from_value(through_serde).unwrap();
    assert_eq!(back, Document::from_json_value(&document.to_json_value()).unwrap());
}

#[test]
fn unknown_top_level_keys_should_be_preserved() {
    let document =
        Document::from_json_str("{\"id\": \"x\", \"custom\": {\"a\": 1}}").unwrap();
    assert_eq!(document.defines["id"], "x");
    assert_eq!(document.extra["custom"], json!({"a": 1}));
    // And they survive serialisation
    assert_eq!(
        document.to_json_string(false),
        "{\"custom\":{\"a\":1},\"id\":\"x\"}\n"
    );
}

#[test]
fn non_object_roots_should_be_rejected() {
    assert!(matches!(
        Document::from_json_str("[]").unwrap_err(),
        DocumentError::RootNotObject
    ));
    assert!(matches!(
        Document::from_json_str("not json at all").unwrap_err(),
        DocumentError::Json { .. }
    ));
}

/// Builds the JSON form of an asset with a single attribute, for shape tests.
fn asset_with_attribute(attribute: serde_json::Value) -> serde_json::Value {
    json!({
        "categories": {
            "C": {
                "meta": {},
                "assets": {
                    "A": {
                        "meta": {},
                        "abstract": false,
                        "extends": null,
                        "attributes": { "x": attribute },
                    }
                }
            }
        }
    })
}

#[test]
fn malformed_nodes_should_be_rejected() {
    // A category without assets
    let error =
        Document::from_json_value(&json!({"categories": {"C": {"meta": {}}}})).unwrap_err();
    assert!(matches!(error, DocumentError::MalformedCategory { .. }));

    // An attribute with an unknown type
    let error = Document::from_json_value(&asset_with_attribute(json!({
        "type": "bogus", "probability": null, "cia": null, "tags": [], "meta": {}
    })))
    .unwrap_err();
    assert!(matches!(error, DocumentError::UnknownAttributeType { .. }));

    // An attribute missing its required fields entirely
    let error =
        Document::from_json_value(&asset_with_attribute(json!({"type": "or"}))).unwrap_err();
    assert!(matches!(error, DocumentError::MalformedAttribute { .. }));

    // An association missing a side
    let error = Document::from_json_value(&json!({
        "associations": [{"name": "Link", "asset_l": "A", "field_l": "l", "mult_l": "1"}]
    }))
    .unwrap_err();
    assert!(matches!(error, DocumentError::MalformedAssociation { .. }));
}

#[test]
fn json_loaded_cia_should_be_normalised() {
    let document = Document::from_json_value(&asset_with_attribute(json!({
        "type": "or", "probability": null, "cia": ["I", "C", "I"], "tags": [], "meta": {}
    })))
    .unwrap();
    let attribute = &document.categories["C"].assets["A"].attributes["x"];
    assert_eq!(attribute.cia, Some(vec![Cia::C, Cia::I]));
}
