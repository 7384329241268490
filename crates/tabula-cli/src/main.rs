use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tabula_engine::Engine;
use tabula_model::{decode_values, Attribute, AttributeKind};
use tabula_payload::{parse_stream, Frame};
use tabula_script::parse_script;

#[derive(Debug, Parser)]
#[command(name = "tabula")]
#[command(about = "Run instruction scripts against a tabula column store and inspect what they leave behind.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute a script and write the payload artifact it produces.
    Run(RunArgs),
    /// Decode a payload blob and print its frames as JSON.
    Inspect(InspectArgs),
    /// Decode a raw column file and print its values as JSON.
    Column(ColumnArgs),
    /// Print the size of a raw column file in bytes.
    Stat(StatArgs),
}

#[derive(Debug, Parser)]
struct RunArgs {
    /// Instruction script, one instruction per line.
    script: PathBuf,

    /// Store root; tables become directories under this path.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Payload artifact path. Defaults to `<root>/out.bin`.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct InspectArgs {
    /// Payload blob, e.g. the artifact a `run` left behind.
    file: PathBuf,
}

#[derive(Debug, Parser)]
struct ColumnArgs {
    /// Table the column belongs to.
    table: String,

    /// Column to decode.
    column: String,

    /// Value kind stored in the column (column files carry no header).
    #[arg(long)]
    kind: String,

    /// Store root; tables become directories under this path.
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[derive(Debug, Parser)]
struct StatArgs {
    /// Table the column belongs to.
    table: String,

    /// Column to stat.
    column: String,

    /// Store root; tables become directories under this path.
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    ok: bool,
    executed: usize,
    artifact: String,
    payload_hex: String,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport {
    hex: String,
    frames: Vec<Frame>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ColumnReport {
    table: String,
    column: String,
    kind: AttributeKind,
    count: u64,
    values: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatReport {
    table: String,
    column: String,
    size: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args),
        Command::Inspect(args) => inspect(args),
        Command::Column(args) => column(args),
        Command::Stat(args) => stat(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("read script {}", args.script.display()))?;
    let instructions = parse_script(&source)
        .with_context(|| format!("parse script {}", args.script.display()))?;

    for instruction in &instructions {
        println!("{instruction}");
    }

    let artifact = args.out.unwrap_or_else(|| args.root.join("out.bin"));
    let mut engine = Engine::with_root(&args.root);
    let outcome = engine.run_to_path(&instructions, &artifact)?;

    let report = RunReport {
        ok: outcome.is_success(),
        executed: outcome.executed,
        artifact: artifact.display().to_string(),
        payload_hex: hex::encode(&outcome.payload),
        error: outcome.error.as_ref().map(|err| err.to_string()),
    };
    println!("{}", serde_json::to_string(&report)?);

    if !report.ok {
        std::process::exit(1);
    }
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("read payload {}", args.file.display()))?;
    let frames = parse_stream(&bytes)
        .with_context(|| format!("parse payload {}", args.file.display()))?;

    let report = InspectReport {
        hex: hex::encode(&bytes),
        frames,
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn column(args: ColumnArgs) -> Result<()> {
    let kind: AttributeKind = args.kind.parse()?;
    let Some(width) = kind.fixed_width() else {
        anyhow::bail!("column files never hold {kind} values");
    };

    let path = args.root.join(&args.table).join(&args.column);
    let bytes = std::fs::read(&path)
        .with_context(|| format!("read column file {}", path.display()))?;

    // Same rule as `load count`: a trailing partial value is ignored.
    let count = (bytes.len() / width) as u64;
    let values = decode_values(&bytes[..count as usize * width], kind, count)?;

    let report = ColumnReport {
        table: args.table,
        column: args.column,
        kind,
        count,
        values,
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn stat(args: StatArgs) -> Result<()> {
    let path = args.root.join(&args.table).join(&args.column);
    let metadata = std::fs::metadata(&path)
        .with_context(|| format!("stat column file {}", path.display()))?;

    let report = StatReport {
        table: args.table,
        column: args.column,
        size: metadata.len(),
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
