#![cfg(feature = "cli")]

use anyhow::bail;
use clap::Parser;
use demal_tools::{direction_for, styled_output, translate, Input, Output};
use tracing_subscriber::filter::LevelFilter;

fn main() -> Result<(), anyhow::Error> {
    let opts = Options::parse();

    // The word `debug` may stand in for (or follow) the output operand; it is
    // never a filename
    let mut debug = false;
    let mut output_arg: Option<String> = None;
    for arg in &opts.rest {
        if arg == "debug" {
            debug = true;
        } else if output_arg.is_none() {
            output_arg = Some(arg.clone());
        } else {
            bail!("unexpected argument: {arg:?}");
        }
    }

    // Parser trace lines go to stderr so they never mix with translated output
    tracing_subscriber::fmt()
        .with_max_level(if debug {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        })
        .with_writer(std::io::stderr)
        .with_ansi(styled_output())
        .init();

    let input = Input::from_arg(&opts.input);
    let direction = direction_for(&input, opts.reverse);
    let output = output_arg.as_deref().map(Output::from_arg);
    translate(&input, output.as_ref(), direction)?;

    Ok(())
}

/// MAL (Meta Attack Language) to JSON encoding/decoding tool
#[derive(Parser, Debug)]
#[command(version, disable_version_flag = true)]
struct Options {
    /// Input file: a `.mal` source, a `.json` document, or `-` for standard
    /// input
    input: String,
    /// Output file, `-` for standard output; the literal word `debug` enables
    /// parser trace output on stderr instead
    #[arg(value_name = "OUTPUT")]
    rest: Vec<String>,
    /// Emit MAL from a JSON document instead of JSON from MAL
    #[arg(short = 'r', long)]
    reverse: bool,
    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,
}
