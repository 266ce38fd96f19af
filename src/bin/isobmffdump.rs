//! CLI front-end for the `isobmff` library: reads a file, parses its
//! top-level box tree, and prints it either as an indented outline or
//! as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use isobmff::{BoxBody, ParseLimits, ParsedBox};

#[derive(Parser)]
#[command(name = "isobmffdump", about = "Dump the box tree of an ISOBMFF/MP4 file")]
struct Args {
    /// Path to the file to dump.
    path: PathBuf,

    /// Print the box tree as JSON instead of an indented outline.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    let data = std::fs::read(&args.path).with_context(|| format!("reading {}", args.path.display()))?;
    let boxes = ParsedBox::parse_top_level(&data, ParseLimits::default())
        .with_context(|| format!("parsing {}", args.path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&boxes)?);
    } else {
        print_tree(&boxes, 0);
    }
    Ok(())
}

fn print_tree<'a>(boxes: impl IntoIterator<Item = &'a ParsedBox>, depth: usize) {
    for b in boxes {
        println!("{}{} {}", "  ".repeat(depth), b.tag, summarize(b));
        print_tree(b.children(), depth + 1);
    }
}

fn summarize(b: &ParsedBox) -> String {
    match &b.body {
        BoxBody::Container(children) => format!("(container, {} children)", children.len()),
        BoxBody::Raw(data) => {
            let preview_len = data.len().min(16);
            format!("raw[{} bytes] {}{}", data.len(), hex::encode(&data[..preview_len]), if data.len() > preview_len { "..." } else { "" })
        }
        other => format!("{other:?}"),
    }
}
