//! The core logic for converting an in-memory document back into MAL source
//! text.
//!
//! The layout is fixed so that output is stable: defines first, then each
//! category with its assets, then the associations block. Everything the walk
//! produces re-parses to an equal document.

use crate::{Asset, Association, Attribute, Category, Cia, Direction, Document, ExprKey, Meta};

impl Document {
    /// Converts this document into MAL source text.
    ///
    /// Top-level keys that have no MAL form (anything outside defines,
    /// categories and associations) are skipped with a debug trace.
    pub fn to_mal_string(&self) -> String {
        let mut out = String::new();
        out.push_str(concat!("// Output from demal v", env!("CARGO_PKG_VERSION"), "\n"));

        // Defines stay up top
        for (key, value) in &self.defines {
            out.push_str(&format!("\n#{key}: \"{value}\""));
        }
        out.push('\n');

        for (name, category) in &self.categories {
            write_category(&mut out, name, category);
        }
        if !self.associations.is_empty() {
            write_associations(&mut out, &self.associations);
        }
        for key in self.extra.keys() {
            tracing::debug!("unrecognized key {key:?} has no MAL form, skipping");
        }
        out
    }
}

fn write_category(out: &mut String, name: &str, category: &Category) {
    let meta = meta_block(&category.meta, 1);
    out.push_str(&format!("\ncategory {name}"));
    if meta.is_empty() {
        out.push_str(" {\n");
    } else {
        out.push_str(&format!("\n{meta}\n{{\n"));
    }

    let mut first = true;
    for (asset_name, asset) in &category.assets {
        // A blank line between assets
        if !first {
            out.push('\n');
        }
        first = false;
        write_asset(out, asset_name, asset);
    }
    out.push_str("}\n");
}

fn write_asset(out: &mut String, name: &str, asset: &Asset) {
    let meta = meta_block(&asset.meta, 2);
    let abstract_prefix = if asset.is_abstract { "abstract " } else { "" };
    let extends = asset
        .extends
        .as_deref()
        .map(|base| format!(" extends {base}"))
        .unwrap_or_default();
    out.push_str(&format!("  {abstract_prefix}asset {name}{extends}"));
    if meta.is_empty() {
        out.push_str(" {\n");
    } else {
        out.push_str(&format!("\n{meta}\n  {{\n"));
    }

    for (attribute_name, attribute) in &asset.attributes {
        write_attribute(out, attribute_name, attribute);
    }
    out.push_str("  }\n");
}

fn write_attribute(out: &mut String, name: &str, attribute: &Attribute) {
    // The header line: symbol, name, then any decorations
    let mut decorations = Vec::new();
    if let Some(probability) = attribute.probability.as_deref().filter(|p| !p.is_empty()) {
        decorations.push(format!("[{probability}]"));
    }
    if let Some(cia) = attribute.cia.as_deref().filter(|cia| !cia.is_empty()) {
        let letters = cia.iter().map(Cia::as_str).collect::<Vec<_>>().join(",");
        decorations.push(format!("{{{letters}}}"));
    }
    for tag in &attribute.tags {
        decorations.push(format!("@{}", tag.as_str()));
    }
    out.push_str(&format!("    {} {name}", attribute.kind.symbol()));
    if !decorations.is_empty() {
        out.push(' ');
        out.push_str(&decorations.join(" "));
    }

    let meta = meta_block(&attribute.meta, 3);
    if meta.is_empty() {
        out.push('\n');
    } else {
        out.push_str(&format!("\n{meta}\n"));
    }

    // Expression blocks: first element after the operator, continuations on
    // their own lines at nine spaces, preceded by a comma
    for direction in Direction::ALL {
        let expressions = attribute.expressions(direction);
        if expressions.is_empty() {
            continue;
        }
        for (i, (key, value)) in expressions.iter().enumerate() {
            let element = match key {
                ExprKey::Index(_) => value.clone(),
                ExprKey::Let(binding) => format!("let {binding} = {value}"),
            };
            if i == 0 {
                out.push_str(&format!("      {} {element}", direction.operator()));
            } else {
                out.push_str(&format!(",\n         {element}"));
            }
        }
        out.push('\n');
    }
}

fn write_associations(out: &mut String, associations: &[Association]) {
    out.push_str("\nassociations {\n");
    for association in associations {
        out.push_str(&format!(
            "  {} [{}] {} <-- {} --> {} [{}] {}",
            association.asset_l,
            association.field_l,
            association.mult_l,
            association.name,
            association.mult_r,
            association.field_r,
            association.asset_r
        ));
        let meta = meta_block(&association.meta, 2);
        if meta.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!("\n{meta}\n"));
        }
    }
    out.push_str("}\n");
}

/// Renders a metadata mapping as indented `key: "value"` lines, or an empty
/// string when there is no metadata.
fn meta_block(meta: &Meta, indent_level: usize) -> String {
    let indent = "  ".repeat(indent_level);
    meta.iter()
        .map(|(key, value)| format!("{indent}{key}: \"{value}\""))
        .collect::<Vec<_>>()
        .join("\n")
}
