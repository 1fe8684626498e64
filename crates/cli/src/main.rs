mod outcome;
mod tree;

use anyhow::{Context, Result, bail};
use argtree::{CommandLine, Report, locale};
use argtree_schema::CommandSchema;
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::outcome::Outcome;

/// Exit status of `argtree parse` when the command line is rejected.
const PARSE_FAILURE: i32 = 2;

#[derive(Parser)]
#[command(name = "argtree")]
#[command(version, about = "Inspect how argtree normalizes and parses command lines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a command-line string into tokens and print them as JSON
    Split(SplitArgs),

    /// Parse tokens against a JSON declaration schema and print the outcome
    Parse(ParseArgs),
}

#[derive(Parser)]
struct SplitArgs {
    /// The command-line string
    #[arg(value_name = "LINE")]
    line: String,

    /// Pass the line through the UTF-16 entry point
    #[arg(long)]
    wide: bool,

    /// Pass the line through the narrow entry point, stored in this locale's
    /// encoding (an empty value selects the process locale)
    #[arg(long, value_name = "LOCALE", conflicts_with = "wide")]
    locale: Option<String>,
}

#[derive(Parser)]
struct ParseArgs {
    /// JSON schema describing the declarations
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,

    /// Split and parse this command-line string instead of TOKENS
    #[arg(short, long, value_name = "LINE", conflicts_with = "tokens")]
    line: Option<String>,

    /// Tokens to parse, given after `--`
    #[arg(last = true, value_name = "TOKENS")]
    tokens: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Split(args) => split(args),
        Commands::Parse(args) => parse(args),
    }
}

fn split(args: SplitArgs) -> Result<()> {
    tracing::debug!("executing split command");

    let command_line = if args.wide {
        let units: Vec<u16> = args.line.encode_utf16().collect();
        CommandLine::from_wide(&units)?
    } else if let Some(name) = args.locale.as_deref() {
        let bytes = match locale::resolve(Some(name))? {
            Some(encoding) => {
                let (bytes, _, unmappable) = encoding.encode(&args.line);
                if unmappable {
                    bail!("the line cannot be represented in {}", encoding.name());
                }
                bytes.into_owned()
            }
            None => args.line.into_bytes(),
        };
        CommandLine::from_bytes(&bytes, Some(name))?
    } else {
        CommandLine::split(&args.line)
    };

    println!("{}", serde_json::to_string_pretty(&command_line)?);
    Ok(())
}

fn parse(args: ParseArgs) -> Result<()> {
    tracing::debug!("executing parse command");

    let text = fs::read_to_string(&args.schema)
        .with_context(|| format!("failed to read schema: {}", args.schema.display()))?;
    let schema = CommandSchema::from_json(&text)
        .with_context(|| format!("invalid schema: {}", args.schema.display()))?;
    let mut parser = tree::build(&schema)?;

    let command_line = match args.line {
        Some(line) => CommandLine::split(&line),
        None => CommandLine::new(args.tokens),
    };

    let mut report = Report::new();
    let ok = parser.parse(&command_line, &mut report).is_ok();
    for diagnostic in report.warnings() {
        tracing::warn!("{}", diagnostic.message);
    }

    let outcome = Outcome::new(ok, &report, &parser);
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !ok {
        std::process::exit(PARSE_FAILURE);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
