use super::*;
use crate::error::DocumentError;
use serde_json::json;

#[test]
fn right_hand_defines_should_override() {
    let a = parse("#id: \"x\"\n#version: \"1.0.0\"\n");
    let b = parse("#version: \"0.0.0\"\n");
    let combined = a.combine(&b);
    assert_eq!(combined.defines["id"], "x");
    assert_eq!(combined.defines["version"], "0.0.0");
}

#[test]
fn combining_should_not_alias_its_operands() {
    let a = parse(NETWORK_MODEL);
    let b = parse("#version: \"9.9.9\"\ncategory Extra {\n  asset Thing {\n    | use\n  }\n}\n");
    let a_before = a.clone();
    let b_before = b.clone();

    let combined = a.combine(&b);
    assert_eq!(a, a_before);
    assert_eq!(b, b_before);
    assert_eq!(combined.defines["version"], "9.9.9");
}

#[test]
fn overlapping_categories_should_merge_assets() {
    let a = parse(
        r#"category System {
  asset Host {
    | old
  }
  asset Network {
    | access
  }
}
"#,
    );
    let b = parse(
        r#"category System {
  asset Host {
    | new
  }
  asset Password {
    | guess
  }
}
"#,
    );
    let combined = a.combine(&b);
    let system = &combined.categories["System"];
    // Host is replaced by the right-hand version, Password is appended
    assert_eq!(
        system.assets.keys().collect::<Vec<_>>(),
        ["Host", "Network", "Password"]
    );
    assert!(system.assets["Host"].attributes.contains_key("new"));
    assert!(!system.assets["Host"].attributes.contains_key("old"));
}

#[test]
fn overlapping_categories_should_merge_metadata() {
    let a = parse("category C\n  kept: \"a\"\n  replaced: \"a\"\n{\n}\n");
    let b = parse("category C\n  replaced: \"b\"\n  added: \"b\"\n{\n}\n");
    let combined = a.combine(&b);
    let meta = &combined.categories["C"].meta;
    assert_eq!(meta["kept"], "a");
    assert_eq!(meta["replaced"], "b");
    assert_eq!(meta["added"], "b");
}

#[test]
fn right_only_categories_should_be_appended() {
    let a = parse("category One {\n  asset A {\n    | x\n  }\n}\n");
    let b = parse("category Two {\n  asset B {\n    | y\n  }\n}\n");
    let combined = a.combine(&b);
    assert_eq!(combined.categories.keys().collect::<Vec<_>>(), ["One", "Two"]);
}

#[test]
fn associations_should_be_replaced_wholesale() {
    let a = parse("associations {\n  A [l] 1 <-- First --> 1 [r] B\n}\n");
    let b = parse(
        "associations {\n  C [l] * <-- Second --> * [r] D\n  E [l] 1 <-- Third --> 1 [r] F\n}\n",
    );
    let combined = a.combine(&b);
    assert_eq!(combined.associations.len(), 2);
    assert_eq!(combined.associations[0].name, "Second");

    // An empty right-hand sequence leaves the base untouched
    let unchanged = a.combine(&parse("#id: \"x\"\n"));
    assert_eq!(unchanged.associations.len(), 1);
    assert_eq!(unchanged.associations[0].name, "First");
}

#[test]
fn combining_with_a_json_mapping_should_work() {
    let document = parse("#id: \"x\"\n#version: \"1.0.0\"\n");
    let combined = document
        .combine_json(&json!({"version": "1.3.3.7"}))
        .unwrap();
    assert_eq!(combined.defines["version"], "1.3.3.7");
    assert_eq!(combined.defines["id"], "x");
}

#[test]
fn non_mapping_operands_should_be_rejected() {
    let document = parse("#id: \"x\"\n");
    assert!(matches!(
        document.combine_json(&json!([1, 2, 3])).unwrap_err(),
        DocumentError::IncompatibleOperand
    ));
    assert!(matches!(
        document.combine_json(&json!("just a string")).unwrap_err(),
        DocumentError::IncompatibleOperand
    ));
}

#[test]
fn unrecognized_keys_should_survive_combination() {
    let a = Document::from_json_value(&json!({"id": "x", "custom": {"a": 1}})).unwrap();
    let b = Document::from_json_value(&json!({"custom": {"b": 2}, "other": true})).unwrap();
    let combined = a.combine(&b);
    assert_eq!(combined.extra["custom"], json!({"a": 1, "b": 2}));
    assert_eq!(combined.extra["other"], json!(true));
}

#[test]
fn combining_defines_only_documents_should_behave_like_update() {
    let a = parse("#one: \"1\"\n#two: \"2\"\n");
    let b = parse("#two: \"22\"\n#three: \"3\"\n");
    let combined = a.combine(&b);
    assert_eq!(
        combined
            .defines
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect::<Vec<_>>(),
        [("one", "1"), ("two", "22"), ("three", "3")]
    );
}
