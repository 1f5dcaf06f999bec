//! Reportsmith CLI - normalize batch responses and check report configurations
//!
//! Usage:
//!   reportsmith normalize <response.txt>
//!   reportsmith validate <config.json> [--exhaustive]
//!   reportsmith tables <schema> [--config <config.json>] [--batch]
//!   reportsmith fields <schema> <config.json> <table> [--type <type>] [--batch]
//!
//! Examples:
//!   reportsmith normalize data/stock_batch.txt --pretty
//!   reportsmith validate reports/sales.json
//!   reportsmith fields data/schema_batch.txt reports/sales.json Sales --type number --batch

use clap::{Parser, Subcommand};
use reportsmith::batch::BatchNormalizer;
use reportsmith::config::Settings;
use reportsmith::graph::RelationshipGraph;
use reportsmith::index::SchemaIndex;
use reportsmith::logging;
use reportsmith::model::{ReportConfig, Schema, SemanticType};
use reportsmith::validation::{self, ValidationMode};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "reportsmith")]
#[command(about = "Reportsmith - report configuration integrity checks")]
#[command(version)]
struct Cli {
    /// Path to a reportsmith.toml (overrides the default search)
    #[arg(long, global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a batch response into a record array
    Normalize {
        /// Path to the raw batch response
        file: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a report configuration
    Validate {
        /// Path to the configuration JSON
        file: PathBuf,

        /// Report every violation instead of the first
        #[arg(long)]
        exhaustive: bool,
    },

    /// List declared tables, or the tables wired by a configuration's joins
    Tables {
        /// Path to the schema (JSON mapping, or batch response with --batch)
        schema: PathBuf,

        /// Restrict to tables connected by this configuration's joins
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Treat the schema file as a raw batch response
        #[arg(long)]
        batch: bool,
    },

    /// List selectable fields of a table
    Fields {
        /// Path to the schema (JSON mapping, or batch response with --batch)
        schema: PathBuf,

        /// Path to the configuration JSON
        config: PathBuf,

        /// Table name (or "calculated")
        table: String,

        /// Semantic type filter ("number" includes currency and percentage)
        #[arg(short = 't', long = "type")]
        type_filter: Option<String>,

        /// Treat the schema file as a raw batch response
        #[arg(long)]
        batch: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config_file {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&settings.logging) {
        eprintln!("Logging disabled: {}", e);
    }

    let normalizer =
        BatchNormalizer::new().sanitize_placeholders(settings.normalizer.sanitize_placeholders);

    match cli.command {
        Commands::Normalize { file, pretty } => cmd_normalize(&normalizer, &file, pretty),
        Commands::Validate { file, exhaustive } => {
            let mode = if exhaustive {
                ValidationMode::Exhaustive
            } else {
                settings.validation.mode
            };
            cmd_validate(&file, mode)
        }
        Commands::Tables {
            schema,
            config,
            batch,
        } => cmd_tables(&normalizer, &schema, config.as_deref(), batch),
        Commands::Fields {
            schema,
            config,
            table,
            type_filter,
            batch,
        } => cmd_fields(&normalizer, &schema, &config, &table, type_filter, batch),
    }
}

fn cmd_normalize(normalizer: &BatchNormalizer, file: &Path, pretty: bool) -> ExitCode {
    let Some(raw) = read_file(file) else {
        return ExitCode::FAILURE;
    };

    match normalizer.normalize(&raw) {
        Ok(batch) => {
            if batch.skipped_parts > 0 {
                eprintln!("Skipped {} unparseable part(s)", batch.skipped_parts);
            }
            print_json(&batch, pretty)
        }
        Err(e) => {
            eprintln!("Upstream integration error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(file: &Path, mode: ValidationMode) -> ExitCode {
    let Some(config) = read_config(file) else {
        return ExitCode::FAILURE;
    };

    match mode {
        ValidationMode::First => {
            let verdict = validation::validate(&config);
            let code = print_json(&verdict, true);
            if verdict.is_valid {
                code
            } else {
                ExitCode::FAILURE
            }
        }
        ValidationMode::Exhaustive => {
            let violations = validation::validate_all(&config);
            if violations.is_empty() {
                println!("Configuration is valid");
                return ExitCode::SUCCESS;
            }
            for violation in &violations {
                println!("{}", violation);
            }
            ExitCode::FAILURE
        }
    }
}

fn cmd_tables(
    normalizer: &BatchNormalizer,
    schema: &Path,
    config: Option<&Path>,
    batch: bool,
) -> ExitCode {
    let Some(index) = load_index(normalizer, schema, batch) else {
        return ExitCode::FAILURE;
    };

    let Some(config_path) = config else {
        for table in index.list_tables() {
            println!("{}", table);
        }
        return ExitCode::SUCCESS;
    };

    let Some(config) = read_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let declared = index.list_tables();
    for table in index.body_tables(&config) {
        if table == reportsmith::model::CALCULATED_TABLE || declared.contains(&table) {
            println!("{}", table);
        } else {
            println!("{} (not in schema)", table);
        }
    }

    let islands = RelationshipGraph::build(&config).component_count();
    if islands > 1 {
        eprintln!("Warning: joins form {} disconnected groups", islands);
    }
    ExitCode::SUCCESS
}

fn cmd_fields(
    normalizer: &BatchNormalizer,
    schema: &Path,
    config: &Path,
    table: &str,
    type_filter: Option<String>,
    batch: bool,
) -> ExitCode {
    let Some(index) = load_index(normalizer, schema, batch) else {
        return ExitCode::FAILURE;
    };
    let Some(config) = read_config(config) else {
        return ExitCode::FAILURE;
    };

    let filter = type_filter.map(SemanticType::from);
    let fields = index.list_fields(table, &config, filter.as_ref());
    print_json(&fields, true)
}

fn read_file(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            None
        }
    }
}

fn read_config(path: &Path) -> Option<ReportConfig> {
    let source = read_file(path)?;
    match serde_json::from_str(&source) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Invalid configuration '{}': {}", path.display(), e);
            None
        }
    }
}

fn load_index(normalizer: &BatchNormalizer, path: &Path, batch: bool) -> Option<SchemaIndex> {
    let source = read_file(path)?;
    let schema = if batch {
        match normalizer.normalize(&source) {
            Ok(normalized) => Schema::from_records(&normalized.records),
            Err(e) => {
                eprintln!("Upstream integration error: {}", e);
                return None;
            }
        }
    } else {
        match serde_json::from_str(&source) {
            Ok(schema) => schema,
            Err(e) => {
                eprintln!("Invalid schema '{}': {}", path.display(), e);
                return None;
            }
        }
    };
    Some(SchemaIndex::new(Arc::new(schema)))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> ExitCode {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match rendered {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to render output: {}", e);
            ExitCode::FAILURE
        }
    }
}
