//! The translation driver used by the `demal` binary: direction resolution,
//! input/output endpoints with their default filenames, and the actual
//! read-translate-write cycle.

use demal::error::{DocumentError, ParseError};
use demal::Document;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while driving a translation.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("error while reading standard input")]
    Stdin {
        #[source]
        source: io::Error,
    },
    #[error("Error while opening {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error while writing {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The direction of a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Parse MAL source and emit the JSON document.
    MalToJson,
    /// Read a JSON document and emit MAL source.
    JsonToMal,
}
impl Direction {
    /// The extension appended to the input filename to derive the default
    /// output filename.
    pub fn output_extension(&self) -> &'static str {
        match self {
            Self::MalToJson => "json",
            Self::JsonToMal => "mal",
        }
    }
}

/// Where translated input comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    Path(PathBuf),
}
impl Input {
    /// Interprets a CLI operand: `-` is standard input.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }
}

/// Where translated output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    Path(PathBuf),
}
impl Output {
    /// Interprets a CLI operand: `-` is standard output.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdout
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }
}

/// Resolves the translation direction: `--reverse` forces JSON-to-MAL,
/// otherwise a `.json` input suffix selects it and anything else (including
/// standard input) is treated as MAL source.
pub fn direction_for(input: &Input, reverse: bool) -> Direction {
    if reverse {
        return Direction::JsonToMal;
    }
    match input {
        Input::Path(path)
            if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json")) =>
        {
            Direction::JsonToMal
        }
        _ => Direction::MalToJson,
    }
}

/// The output path used when none is given: the input filename with the
/// direction's extension appended, or `output.<ext>` when reading standard
/// input.
pub fn default_output(input: &Input, direction: Direction) -> PathBuf {
    let ext = direction.output_extension();
    match input {
        Input::Path(path) => PathBuf::from(format!("{}.{ext}", path.display())),
        Input::Stdin => PathBuf::from(format!("output.{ext}")),
    }
}

/// Whether the terminal supports styled output.
pub fn styled_output() -> bool {
    !cfg!(windows)
        || ["WT_SESSION", "WT_PROFILE_ID"]
            .iter()
            .any(|var| std::env::var_os(var).is_some())
}

/// Performs one full translation. The input is read completely before parsing
/// begins, and the output is serialised completely in-memory before anything is
/// written, so a failure never leaves a partial file behind.
pub fn translate(
    input: &Input,
    output: Option<&Output>,
    direction: Direction,
) -> Result<(), TranslateError> {
    let document = match (direction, input) {
        (Direction::MalToJson, Input::Path(path)) => Document::from_mal_file(path)?,
        (Direction::MalToJson, Input::Stdin) => Document::from_mal_str(&read_stdin()?)?,
        (Direction::JsonToMal, Input::Path(path)) => {
            let raw = fs::read_to_string(path).map_err(|source| TranslateError::Read {
                path: path.clone(),
                source,
            })?;
            Document::from_json_str(&raw)?
        }
        (Direction::JsonToMal, Input::Stdin) => Document::from_json_str(&read_stdin()?)?,
    };

    let rendered = match direction {
        Direction::MalToJson => document.to_json_string(true),
        Direction::JsonToMal => document.to_mal_string(),
    };

    let resolved;
    let output = match output {
        Some(output) => output,
        None => {
            resolved = Output::Path(default_output(input, direction));
            &resolved
        }
    };
    match output {
        Output::Stdout => match io::stdout().write_all(rendered.as_bytes()) {
            Ok(()) => Ok(()),
            // A closed pipe downstream is not our failure
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            Err(source) => Err(TranslateError::Write {
                path: PathBuf::from("-"),
                source,
            }),
        },
        Output::Path(path) => fs::write(path, rendered).map_err(|source| TranslateError::Write {
            path: path.clone(),
            source,
        }),
    }
}

fn read_stdin() -> Result<String, TranslateError> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|source| TranslateError::Stdin { source })?;
    Ok(buffer)
}
