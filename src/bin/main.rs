//! Captain CLI - Compile pipeline result queries to SQL
//!
//! Usage:
//!   captain compile [STORE] --target <T>... [--condition <C>...] [--output <format>]
//!   captain pipelines [STORE]
//!   captain tables [STORE]
//!
//! Examples:
//!   captain compile results.json -t mean.error -t rnorm -c "mean.error < 0.5"
//!   captain compile results.json -t mse.error --output json
//!   captain pipelines results.json

use captain::compile::{compile_with_store, CompileOptions};
use captain::config::Settings;
use captain::pipeline;
use captain::store::{Store, Table};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "captain")]
#[command(about = "Captain - Compile pipeline result queries to per-pipeline SQL")]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to CAPTAIN_CONFIG, ./captain.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile targets and conditions to one query per pipeline
    Compile {
        /// Path to the result store (JSON); falls back to [store].path
        store: Option<PathBuf>,

        /// Target field (`table.field`) or table name
        #[arg(short, long = "target", required = true)]
        targets: Vec<String>,

        /// Condition over `table.field` references; all are ANDed
        #[arg(short, long = "condition")]
        conditions: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// List every candidate pipeline in a result store
    Pipelines {
        /// Path to the result store (JSON); falls back to [store].path
        store: Option<PathBuf>,
    },

    /// List step tables with their columns
    Tables {
        /// Path to the result store (JSON); falls back to [store].path
        store: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One query per line
    Sql,
    /// JSON object with pipelines and queries
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Compile {
            store,
            targets,
            conditions,
            output,
        } => cmd_compile(&settings, store, targets, conditions, output),
        Commands::Pipelines { store } => cmd_pipelines(&settings, store),
        Commands::Tables { store } => cmd_tables(&settings, store),
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, captain::config::SettingsError> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

/// Load the store given on the command line, or the configured one.
fn open_store(settings: &Settings, store: Option<PathBuf>) -> Result<Store, String> {
    let path = match store {
        Some(path) => path,
        None => settings
            .store_path()
            .map_err(|e| format!("Config error: {}", e))?
            .ok_or_else(|| "No store given and no [store].path configured".to_string())?,
    };
    Store::from_file(&path).map_err(|e| format!("Error loading store '{}': {}", path.display(), e))
}

fn cmd_compile(
    settings: &Settings,
    store: Option<PathBuf>,
    targets: Vec<String>,
    conditions: Vec<String>,
    output: OutputFormat,
) -> ExitCode {
    let store = match open_store(settings, store) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::FAILURE;
        }
    };

    let options = CompileOptions::from(settings);
    let compiled = match compile_with_store(&store, &targets, &conditions, &options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        OutputFormat::Sql => {
            for query in compiled.queries() {
                println!("{}", query);
            }
        }
        OutputFormat::Json => {
            let doc = serde_json::json!({
                "pipelines": compiled.pipelines(),
                "queries": compiled.queries(),
            });
            match serde_json::to_string_pretty(&doc) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error writing JSON: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }
    ExitCode::SUCCESS
}

fn cmd_pipelines(settings: &Settings, store: Option<PathBuf>) -> ExitCode {
    let store = match open_store(settings, store) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::FAILURE;
        }
    };

    match pipeline::enumerate(&store, &settings.naming) {
        Ok(chains) if chains.is_empty() => {
            println!("No pipelines found.");
            ExitCode::SUCCESS
        }
        Ok(chains) => {
            for chain in &chains {
                println!("{}", chain);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Store error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_tables(settings: &Settings, store: Option<PathBuf>) -> ExitCode {
    let store = match open_store(settings, store) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::FAILURE;
        }
    };

    let mut templates = Vec::new();
    for (name, table) in store.tables() {
        match table {
            Table::Step(step) => {
                println!("{} ({} rows)", name, step.row_count());
                for (column, kind) in step.schema() {
                    println!("    - {} {}", column, kind);
                }
            }
            Table::Template(template) => templates.push((name, template)),
        }
    }

    if !templates.is_empty() {
        println!();
        println!("Templates:");
        for (name, template) in templates {
            for roles in &template.pipelines {
                println!("  - {}: {}", name, roles.join(" -> "));
            }
        }
    }

    ExitCode::SUCCESS
}
