//! Minimal CLI: convert → (any format | any format)
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use crate::convert::{Converter, Format, Limits};
use crate::diag::Conversion;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert structural type declarations between notations (TypeScript,
/// SQL, Zod, Protobuf, JSON Schema)
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// parse one notation and emit another
    Convert(ConvertArgs),
    /// list the supported notations
    Formats(FormatsArgs),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JSON Pointer to select a subdocument in JSON inputs (e.g. /components/schemas/User)
    #[arg(long)]
    json_pointer: Option<String>,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// source notation
    #[arg(long, value_enum)]
    from: Format,

    /// target notation
    #[arg(long, value_enum)]
    to: Format,

    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted); multiple inputs are concatenated in input order
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// refuse inputs larger than this many bytes
    #[arg(long, default_value_t = Limits::default().max_input_bytes)]
    max_input_bytes: usize,
}

#[derive(Args, Debug)]
struct FormatsArgs {
    /// machine-readable output
    #[arg(long)]
    json: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Formats(args) => {
                if args.json {
                    println!("{}", serde_json::to_string(&Format::ALL)?);
                } else {
                    for f in Format::ALL {
                        println!("{}", f.name());
                    }
                }
                Ok(())
            }
            Command::Convert(args) => run_convert(args),
        }
    }
}

fn run_convert(args: &ConvertArgs) -> anyhow::Result<()> {
    let sources = args.input_settings.load()?;
    let converter = Converter::new(args.from, args.to)
        .with_limits(Limits { max_input_bytes: args.max_input_bytes });

    // every conversion is an independent snapshot; results come back in
    // input order regardless of completion order
    let results: Vec<(String, Conversion)> = sources
        .par_iter()
        .map(|(label, text)| (label.clone(), converter.convert(text)))
        .collect();

    let mut rendered = Vec::with_capacity(results.len());
    let mut failed = 0usize;
    for (label, conversion) in &results {
        for w in &conversion.warnings {
            eprintln!("{} {label}: {w}", "warning:".yellow().bold());
        }
        match &conversion.diagnostic {
            Some(diag) => {
                failed += 1;
                eprintln!("{} {label}: {diag}", "error:".red().bold());
            }
            None => rendered.push(conversion.output.as_str()),
        }
    }

    let combined = rendered.join("\n");
    if let Some(out) = args.out.as_ref() {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(out, &combined).with_context(|| format!("writing {}", out.display()))?;
    } else if !combined.is_empty() {
        println!("{combined}");
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} input(s) produced no output", results.len());
    }
    Ok(())
}

impl InputSettings {
    /// Resolve inputs to `(label, content)` pairs, applying the JSON
    /// pointer where the content parses as JSON.
    fn load(&self) -> anyhow::Result<Vec<(String, String)>> {
        let mut out = Vec::new();
        for (label, content) in read_sources(&self.input)? {
            let content = match &self.json_pointer {
                Some(pointer) => select_pointer(&content, pointer).unwrap_or(content),
                None => content,
            };
            out.push((label, content));
        }
        Ok(out)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_sources(patterns: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for path in resolve_file_path_patterns(patterns)? {
        if path.as_os_str() == "-" {
            let text = std::io::read_to_string(std::io::stdin()).context("reading stdin")?;
            out.push(("<stdin>".to_string(), text));
            continue;
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        out.push((path.to_string_lossy().to_string(), text));
    }
    Ok(out)
}

fn select_pointer(content: &str, pointer: &str) -> Option<String> {
    let doc: serde_json::Value = serde_json::from_str(content).ok()?;
    let node = doc.pointer(pointer)?;
    serde_json::to_string_pretty(node).ok()
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if pattern == "-" {
            out.push(PathBuf::from("-"));
            continue;
        }

        if has_glob_chars(pattern) {
            // Treat as a glob pattern
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // Treat as a literal path
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
