//! # typevert-cli
//!
//! Runs YAML rule documents over JSON input.
//!
//! Rule documents are loaded in the order given, so a document may only
//! reference converters declared by earlier ones. The last document is the
//! entry converter unless `--converter` names another.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use typevert_ir::{Value, json};
use typevert_mapping::{Converter, GeneratedConverter, Registry};

#[derive(Parser)]
#[command(name = "typevert")]
#[command(about = "Declarative object-to-object mapping")]
#[command(version)]
struct Cli {
    /// Log rule evaluation to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a JSON document through a converter
    Map {
        /// Rule document paths, dependencies first
        #[arg(short, long = "rules", required = true, num_args = 1..)]
        rules: Vec<PathBuf>,

        /// Input JSON file; an array root is mapped element by element
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Entry converter name (default: the last document's)
        #[arg(short, long)]
        converter: Option<String>,
    },

    /// Load rule documents and report the converters they declare
    Check {
        /// Rule document paths, dependencies first
        #[arg(short, long = "rules", required = true, num_args = 1..)]
        rules: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Map {
            rules,
            input,
            output,
            converter,
        } => run_map(&rules, &input, output.as_deref(), converter.as_deref()),
        Commands::Check { rules } => run_check(&rules),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_rules(paths: &[PathBuf]) -> anyhow::Result<(Registry, Vec<GeneratedConverter>)> {
    let mut registry = Registry::with_builtins();
    let converters = paths
        .iter()
        .map(|path| {
            registry
                .load_file(path)
                .with_context(|| format!("Failed to load rules from {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok((registry, converters))
}

fn run_map(
    rules: &[PathBuf],
    input: &Path,
    output: Option<&Path>,
    converter: Option<&str>,
) -> anyhow::Result<()> {
    let (registry, loaded) = load_rules(rules)?;

    let entry = match converter {
        Some(name) => registry.converter(name).with_context(|| {
            format!(
                "Unknown converter '{name}'; available: {}",
                registry.converter_names().join(", ")
            )
        })?,
        None => match loaded.last() {
            Some(last) => registry
                .converter(last.name())
                .with_context(|| format!("Converter '{}' was not registered", last.name()))?,
            None => bail!("No rule documents given"),
        },
    };
    let converter = entry.instantiate();
    tracing::info!(converter = entry.name(), input = %input.display(), "Mapping");

    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let source =
        json::parse_str(&text).with_context(|| format!("Invalid JSON in {}", input.display()))?;

    let target = match source {
        Value::List(items) => Value::List(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    converter
                        .convert(item)
                        .with_context(|| format!("Element {index} failed to convert"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?,
        ),
        other => converter.convert(other)?,
    };

    let rendered = serde_json::to_string_pretty(&serde_json::Value::from(target))?;
    match output {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(output = %path.display(), "Wrote mapped output");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn run_check(rules: &[PathBuf]) -> anyhow::Result<()> {
    let (_, loaded) = load_rules(rules)?;
    for converter in &loaded {
        let mapping = converter.mapping();
        println!(
            "{}: {} -> {} ({} rules)",
            converter.name(),
            mapping.source_type(),
            mapping.target_type().name(),
            mapping.rule_count()
        );
    }
    Ok(())
}
