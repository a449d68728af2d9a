//! The core parsing logic that converts MAL source into the in-memory document.
//!
//! This is a recursive-descent parser driven by anchored line patterns: the
//! top-level driver dispatches on the first match among defines, includes,
//! category headers and association blocks, and hands the line cursor to the
//! relevant sub-parser for anything that spans multiple lines.

use crate::error::ParseError;
use crate::source::LineSource;
use crate::{
    Asset, Association, Attribute, AttributeKind, Category, Cia, Direction, Document, ExprKey,
    Meta, Tag,
};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static DEFINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^#(\w+):\s*"(.*)""#).expect("valid regex"));
static INCLUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^include "(.*)""#).expect("valid regex"));
static CATEGORY_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^category \w+").expect("valid regex"));
static ASSOCIATIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^associations\s*\{$").expect("valid regex"));
static CATEGORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^category (\w+)").expect("valid regex"));
static ASSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(abstract )?asset (\w+)( extends (\w+))?").expect("valid regex"));
static META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^([\w ]+):\s*"(.*)""#).expect("valid regex"));
static ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([|&#E]|[!E]{2})\s+(\w+)(\s+\[([\w(). ,]+)\])?").expect("valid regex"));
static CIA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*([CIA])(,\s*([CIA])(,\s*([CIA]))?)?\s*\}").expect("valid regex"));
static LET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^let ([A-Za-z_]\w*)\s*=\s*"?([^"]+)"?"#).expect("valid regex"));
static ASSOCIATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)\s+\[(\w+)\]\s+([\d*.]+)\s+<--\s*(\w+)\s*-->\s+([\d*.]+)\s+\[(\w+)\]\s+(\w+)")
        .expect("valid regex")
});

impl Document {
    /// Parses a document from MAL source text. `include` directives are resolved
    /// relative to the process's current directory and parse into the same
    /// document; repeated includes re-execute.
    pub fn from_mal_str(src: &str) -> Result<Self, ParseError> {
        let mut document = Document::default();
        parse_source_into(&mut document, src)?;
        Ok(document)
    }
    /// Reads and parses a MAL file. The file is fully read and closed before
    /// parsing begins.
    pub fn from_mal_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let mut document = Document::default();
        parse_file_into(&mut document, path.as_ref())?;
        Ok(document)
    }
}

fn parse_file_into(document: &mut Document, path: &Path) -> Result<(), ParseError> {
    let raw = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source_into(document, &raw)
}

/// The top-level driver for one file.
fn parse_source_into(document: &mut Document, raw: &str) -> Result<(), ParseError> {
    let mut lines = LineSource::new(raw);
    while let Some(line) = lines.next("parse") {
        if let Some(caps) = DEFINE_RE.captures(&line) {
            document.defines.insert(caps[1].to_string(), caps[2].to_string());
        } else if let Some(caps) = INCLUDE_RE.captures(&line) {
            parse_file_into(document, Path::new(&caps[1]))?;
        } else if CATEGORY_LINE_RE.is_match(&line) {
            parse_category(document, &mut lines, &line)?;
        } else if ASSOCIATIONS_RE.is_match(&line) {
            parse_associations(document, &mut lines)?;
        } else {
            return Err(ParseError::ImproperSyntax { line });
        }
    }
    Ok(())
}

/// Parses a `category` block starting at its header line. The category is
/// registered once its block has been fully consumed; re-declaring a name
/// replaces the earlier category in place.
fn parse_category(
    document: &mut Document,
    lines: &mut LineSource,
    header: &str,
) -> Result<(), ParseError> {
    let caps = CATEGORY_RE
        .captures(header)
        .ok_or_else(|| ParseError::ImproperSyntax {
            line: header.to_string(),
        })?;
    let name = caps[1].to_string();
    let mut category = Category::default();
    read_meta_until_brace(&mut category.meta, lines, header, "parse_header")?;

    loop {
        let line = lines.advance("parse_category")?;
        if line.contains('}') {
            break;
        }
        let (asset_name, mut asset) = parse_asset_header(lines, &line)?;
        parse_asset_body(&mut asset, lines)?;
        category.assets.insert(asset_name, asset);
    }
    document.categories.insert(name, category);
    Ok(())
}

/// Parses an asset header line (`(abstract)? asset Name (extends Base)?`) and
/// any metadata lines preceding the opening brace.
fn parse_asset_header(lines: &mut LineSource, header: &str) -> Result<(String, Asset), ParseError> {
    let caps = ASSET_RE
        .captures(header)
        .ok_or_else(|| ParseError::ImproperSyntax {
            line: header.to_string(),
        })?;
    let name = caps[2].to_string();
    let mut asset = Asset {
        is_abstract: caps.get(1).is_some(),
        extends: caps.get(4).map(|base| base.as_str().to_string()),
        ..Asset::default()
    };
    read_meta_until_brace(&mut asset.meta, lines, header, "parse_header")?;
    Ok((name, asset))
}

/// Consumes metadata lines up to and including the line that carries the opening
/// brace. A header that already contains `{` has no metadata; intervening lines
/// that do not match `key: "value"` are skipped.
fn read_meta_until_brace(
    meta: &mut Meta,
    lines: &mut LineSource,
    header: &str,
    caller: &'static str,
) -> Result<(), ParseError> {
    if header.contains('{') {
        return Ok(());
    }
    loop {
        let line = lines.advance(caller)?;
        if let Some(caps) = META_RE.captures(&line) {
            meta.insert(caps[1].to_string(), caps[2].to_string());
        } else if line.contains('{') {
            // Content after the brace is ignored
            return Ok(());
        }
    }
}

/// Parses an asset body: attribute headers, metadata attached to the current
/// attribute, and directional expression blocks, until the closing brace.
fn parse_asset_body(asset: &mut Asset, lines: &mut LineSource) -> Result<(), ParseError> {
    // The name of the most recent attribute header; metadata and expressions
    // attach to it
    let mut current: Option<String> = None;

    loop {
        let line = lines.advance("parse_asset")?;
        if let Some((name, attribute)) = parse_attribute_header(&line) {
            asset.attributes.insert(name.clone(), attribute);
            current = Some(name);
        } else if let Some(caps) = META_RE.captures(&line) {
            // Metadata before any attribute header has nothing to attach to and
            // is dropped
            if let Some(attribute) = current.as_ref().and_then(|name| asset.attributes.get_mut(name))
            {
                attribute.meta.insert(caps[1].to_string(), caps[2].to_string());
            }
        } else if let Some(direction) = line
            .split_whitespace()
            .next()
            .and_then(Direction::from_operator)
        {
            let Some(attribute) = current.as_ref().and_then(|name| asset.attributes.get_mut(name))
            else {
                return Err(ParseError::ImproperSyntax { line });
            };
            // Remove the operator and one following space if present
            let rest = line[2..].strip_prefix(' ').unwrap_or(&line[2..]).to_string();
            parse_expression(attribute, direction, lines, rest)?;
        } else if line.contains('}') {
            return Ok(());
        } else {
            return Err(ParseError::ImproperSyntax { line });
        }
    }
}

/// Recognizes an attribute header (`<sym> <name> [prob]? {C,I,A}? @tag*`),
/// returning the new attribute if the line is one.
fn parse_attribute_header(line: &str) -> Option<(String, Attribute)> {
    let caps = ATTRIBUTE_RE.captures(line)?;
    let kind = AttributeKind::from_symbol(&caps[1])?;
    let name = caps[2].to_string();

    let mut attribute = Attribute::new(kind);
    attribute.probability = caps.get(4).map(|prob| prob.as_str().to_string());
    attribute.cia = CIA_RE.captures(line).map(|cia| {
        let mut parts: Vec<Cia> = [cia.get(1), cia.get(3), cia.get(5)]
            .into_iter()
            .flatten()
            .filter_map(|letter| Cia::from_letter(letter.as_str()))
            .collect();
        parts.sort();
        parts.dedup();
        parts
    });
    attribute.tags = line.split_whitespace().filter_map(Tag::from_annotation).collect();
    Some((name, attribute))
}

/// Parses a directional expression: a comma-terminated list, one element per
/// line, where each element is either `let <ident> = <expr>` or a bare
/// expression stored under the next positional key. Repeated blocks of the same
/// direction accumulate, with positional numbering continuing from one past the
/// current maximum.
fn parse_expression(
    attribute: &mut Attribute,
    direction: Direction,
    lines: &mut LineSource,
    first: String,
) -> Result<(), ParseError> {
    let field = attribute.expressions_mut(direction);
    let mut index = field
        .keys()
        .filter_map(|key| match key {
            ExprKey::Index(i) => Some(*i + 1),
            ExprKey::Let(_) => None,
        })
        .max()
        .unwrap_or(0);

    let mut line = first;
    loop {
        let (key, value) = match LET_RE.captures(&line) {
            Some(caps) => (ExprKey::Let(caps[1].to_string()), caps[2].to_string()),
            None => {
                let key = ExprKey::Index(index);
                index += 1;
                (key, line.clone())
            }
        };
        field.insert(key, value.trim_end_matches(',').to_string());
        if !line.ends_with(',') {
            return Ok(());
        }
        line = lines.advance("parse_expression")?;
    }
}

/// Parses an `associations` block. Full entries are appended in order and
/// metadata attaches to the entry this block most recently produced; any other
/// line is ignored.
fn parse_associations(document: &mut Document, lines: &mut LineSource) -> Result<(), ParseError> {
    let mut current: Option<usize> = None;

    loop {
        let line = lines.advance("parse_associations")?;
        if let Some(caps) = ASSOCIATION_RE.captures(&line) {
            document.associations.push(Association {
                asset_l: caps[1].to_string(),
                field_l: caps[2].to_string(),
                mult_l: caps[3].to_string(),
                name: caps[4].to_string(),
                mult_r: caps[5].to_string(),
                field_r: caps[6].to_string(),
                asset_r: caps[7].to_string(),
                meta: Meta::default(),
            });
            current = Some(document.associations.len() - 1);
        } else if let Some(caps) = META_RE.captures(&line) {
            if let Some(association) = current.and_then(|i| document.associations.get_mut(i)) {
                association.meta.insert(caps[1].to_string(), caps[2].to_string());
            }
        } else if line.contains('}') {
            return Ok(());
        }
    }
}
