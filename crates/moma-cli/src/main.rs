//! MoMa metadata CLI.
//!
//! Provides the `moma` binary for converting dataset documents, validating
//! PG-JSON graphs, and ingesting, querying and deleting datasets in a
//! SQLite store. Uses the same core, storage and query crates as the HTTP
//! server.
//!
//! Exit codes: 0 = success, 1 = bad input, 2 = schema violation,
//! 3 = I/O or store error.

use std::io::Read;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use moma_core::{convert_value, PgGraph, SchemaValidator, ValidationReport};
use moma_query::{query_datasets, FilterSpec};
use moma_storage::{GraphAdapter, SqliteStore};

/// MoMa dataset metadata tools.
#[derive(Parser)]
#[command(name = "moma", about = "MoMa dataset metadata tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a dataset document to PG-JSON.
    Convert {
        /// Document file, or `-` for stdin.
        input: String,

        /// Also print the issues absorbed during conversion.
        #[arg(long)]
        issues: bool,
    },

    /// Validate a PG-JSON graph against the label registry.
    Validate {
        /// PG-JSON file, or `-` for stdin.
        input: String,

        /// Report findings without failing.
        #[arg(long)]
        lenient: bool,
    },

    /// Convert, validate and store a dataset document.
    Ingest {
        /// Path to the database file.
        #[arg(short, long, default_value = "moma.db")]
        db: String,

        /// Document file (or PG-JSON with `--pg-json`), or `-` for stdin.
        input: String,

        /// Treat the input as a PG-JSON graph instead of a document.
        #[arg(long)]
        pg_json: bool,

        /// Store graphs that fail validation.
        #[arg(long)]
        lenient: bool,
    },

    /// Run a dataset query.
    Query {
        #[arg(short, long, default_value = "moma.db")]
        db: String,

        /// Filter as inline JSON.
        #[arg(short, long, default_value = "{}")]
        filter: String,
    },

    /// Delete datasets and their dependent entities.
    Delete {
        #[arg(short, long, default_value = "moma.db")]
        db: String,

        /// Dataset ids to delete.
        ids: Vec<String>,

        /// Required to delete every dataset when no ids are given.
        #[arg(long)]
        all: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Convert { input, issues } => run_convert(&input, issues),
        Commands::Validate { input, lenient } => run_validate(&input, lenient),
        Commands::Ingest {
            db,
            input,
            pg_json,
            lenient,
        } => run_ingest(&db, &input, pg_json, lenient),
        Commands::Query { db, filter } => run_query(&db, &filter),
        Commands::Delete { db, ids, all } => run_delete(&db, ids, all),
    };
    process::exit(exit_code);
}

fn run_convert(input: &str, with_issues: bool) -> i32 {
    let value = match read_json(input) {
        Ok(v) => v,
        Err(code) => return code,
    };
    match convert_value(value) {
        Ok(conversion) if with_issues => print_json(&json!({
            "graph": conversion.graph,
            "issues": conversion.issues,
        })),
        Ok(conversion) => print_json(&conversion.graph),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn run_validate(input: &str, lenient: bool) -> i32 {
    let graph = match read_graph(input) {
        Ok(g) => g,
        Err(code) => return code,
    };
    let report = SchemaValidator::new(!lenient).validate(&graph);
    let code = print_json(&report);
    if code == 0 && !report.is_valid {
        return 2;
    }
    code
}

fn run_ingest(db_path: &str, input: &str, pg_json: bool, lenient: bool) -> i32 {
    let value = match read_json(input) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let (graph, issues) = if pg_json {
        match PgGraph::from_value(value) {
            Ok(g) => (g, Vec::new()),
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        }
    } else {
        match convert_value(value) {
            Ok(c) => (c.graph, c.issues),
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        }
    };
    if graph.is_empty() {
        eprintln!("Error: nothing to ingest (missing dataset identifier?)");
        return 1;
    }
    for issue in &issues {
        eprintln!("warning: {}", serde_json::to_string(issue).unwrap_or_default());
    }

    let report = SchemaValidator::new(!lenient).validate(&graph);
    if !report.is_valid {
        report_findings(&report);
        return 2;
    }

    let mut adapter = match open_adapter(db_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match adapter.ingest(&graph) {
        Ok(status) => print_json(&status),
        Err(e) => {
            eprintln!("Error: ingest failed: {}", e);
            3
        }
    }
}

fn run_query(db_path: &str, filter: &str) -> i32 {
    let spec: FilterSpec = match serde_json::from_str(filter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: invalid filter: {}", e);
            return 1;
        }
    };
    let adapter = match open_adapter(db_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match query_datasets(&adapter, &spec) {
        Ok(page) => print_json(&page),
        Err(moma_query::QueryError::InvalidFilter(msg)) => {
            eprintln!("Error: invalid filter: {}", msg);
            1
        }
        Err(e) => {
            eprintln!("Error: query failed: {}", e);
            3
        }
    }
}

fn run_delete(db_path: &str, ids: Vec<String>, all: bool) -> i32 {
    if ids.is_empty() && !all {
        eprintln!("Error: no dataset ids given (pass --all to delete every dataset)");
        return 1;
    }
    let mut adapter = match open_adapter(db_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match adapter.cascade_delete(&ids) {
        Ok(status) => print_json(&status),
        Err(e) => {
            eprintln!("Error: delete failed: {}", e);
            3
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_adapter(db_path: &str) -> Result<GraphAdapter<SqliteStore>, i32> {
    match SqliteStore::new(db_path) {
        Ok(store) => Ok(GraphAdapter::new(store)),
        Err(e) => {
            eprintln!("Error: failed to open database '{}': {}", db_path, e);
            Err(3)
        }
    }
}

fn read_json(input: &str) -> Result<serde_json::Value, i32> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map(|_| buf)
    } else {
        std::fs::read_to_string(input)
    };
    let text = text.map_err(|e| {
        eprintln!("Error: failed to read '{}': {}", input, e);
        3
    })?;
    serde_json::from_str(&text).map_err(|e| {
        eprintln!("Error: '{}' is not valid JSON: {}", input, e);
        1
    })
}

fn read_graph(input: &str) -> Result<PgGraph, i32> {
    PgGraph::from_value(read_json(input)?).map_err(|e| {
        eprintln!("Error: {}", e);
        1
    })
}

fn report_findings(report: &ValidationReport) {
    eprintln!("Schema validation failed:");
    for finding in &report.invalid_nodes {
        eprintln!("  - {}: no node kind matches {:?}", finding.id, finding.labels);
    }
    for finding in &report.unknown_labels {
        eprintln!("  - {}: unknown labels in {:?}", finding.id, finding.labels);
    }
    for id in &report.nodes_without_labels {
        eprintln!("  - {}: no labels", id);
    }
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize result: {}", e);
            3
        }
    }
}
