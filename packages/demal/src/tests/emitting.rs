use super::*;
use pretty_assertions::assert_eq;

/// The banner every emitted file starts with.
fn banner() -> String {
    concat!("// Output from demal v", env!("CARGO_PKG_VERSION"), "\n").to_string()
}

#[test]
fn emitted_mal_should_reparse_to_the_same_document() {
    let document = parse(NETWORK_MODEL);
    let emitted = document.to_mal_string();
    let reparsed = parse(&emitted);

    assert_eq!(document, reparsed);
    // Byte-for-byte at the JSON layer
    assert_eq!(document.to_json_string(true), reparsed.to_json_string(true));
}

#[test]
fn emission_should_be_stable_across_cycles() {
    let document = parse(NETWORK_MODEL);
    let first = document.to_mal_string();
    let second = parse(&first).to_mal_string();
    assert_eq!(first, second);
}

#[test]
fn emitted_layout_should_match_the_fixed_structure() {
    let document = parse(
        r#"#id: "x"

category System {
  asset Host {
    | compromise [Bernoulli(0.5)] {C,I} @hidden
  }
}
"#,
    );
    let expected = banner()
        + r#"
#id: "x"

category System {
  asset Host {
    | compromise [Bernoulli(0.5)] {C,I} @hidden
  }
}
"#;
    assert_eq!(document.to_mal_string(), expected);
}

#[test]
fn metadata_should_push_the_brace_to_its_own_line() {
    let document = parse(
        r#"category System
  description: "Core"
{
  asset Host
    owner: "ops"
  {
    | probe
      description: "Scan"
  }
}
"#,
    );
    let expected = banner()
        + "\n"
        + r#"
category System
  description: "Core"
{
  asset Host
    owner: "ops"
  {
    | probe
      description: "Scan"
  }
}
"#;
    assert_eq!(document.to_mal_string(), expected);
}

#[test]
fn expression_continuations_should_use_the_nine_space_layout() {
    let document = parse(
        r#"category C {
  asset A {
    | step
      -> let x = other.attack,
         peer.do
  }
}
"#,
    );
    let emitted = document.to_mal_string();
    assert!(emitted.contains("      -> let x = other.attack,\n         peer.do\n"));
    // The layout itself must survive a round-trip
    assert_eq!(parse(&emitted), document);
}

#[test]
fn expression_blocks_should_emit_in_fixed_direction_order() {
    let document = parse(
        r#"category C {
  asset A {
    | step
      <- pre.condition
      -> next.step
      +> extra.step
  }
}
"#,
    );
    let emitted = document.to_mal_string();
    let append = emitted.find("+> extra.step").unwrap();
    let leads_to = emitted.find("-> next.step").unwrap();
    let require = emitted.find("<- pre.condition").unwrap();
    assert!(append < leads_to && leads_to < require);
}

#[test]
fn assets_should_be_separated_by_a_blank_line() {
    let document = parse(
        r#"category C {
  asset A {
    | x
  }
  asset B {
    | y
  }
}
"#,
    );
    let expected = banner()
        + "\n"
        + r#"
category C {
  asset A {
    | x
  }

  asset B {
    | y
  }
}
"#;
    assert_eq!(document.to_mal_string(), expected);
}

#[test]
fn associations_should_emit_in_canonical_form() {
    let document = parse(
        r#"associations {
  Network [net] 1 <-- Connection --> * [hosts] Host
    description: "Hosts on a network"
}
"#,
    );
    let expected = banner()
        + "\n"
        + r#"
associations {
  Network [net] 1 <-- Connection --> * [hosts] Host
    description: "Hosts on a network"
}
"#;
    assert_eq!(document.to_mal_string(), expected);
}

#[test]
fn unrecognized_document_keys_should_be_skipped() {
    let document =
        Document::from_json_str("{\"id\": \"x\", \"custom\": {\"a\": 1}}").unwrap();
    let emitted = document.to_mal_string();
    assert!(emitted.contains("#id: \"x\""));
    assert!(!emitted.contains("custom"));
}
