//! Command-line front end for the varejo analytics engine.
//!
//! Loads the dataset from a directory of CSV files, then lists or runs
//! catalog queries and prints the results as a table, JSON, or CSV.

use anyhow::{bail, Context};
use std::env;
use std::path::PathBuf;
use varejo::{export, DatasetConfig, Executor, Params, TableStore, Topic, Value, CATALOG};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let Some(command) = args.first() else {
        print_help();
        return Ok(());
    };

    match command.as_str() {
        "--version" | "-v" => {
            println!("varejo v{VERSION}");
        }
        "--help" | "-h" | "help" => {
            print_help();
        }
        "list" => {
            list_queries();
        }
        "run" => {
            run_query(&args[1..])?;
        }
        other => {
            print_help();
            bail!("unknown command '{other}'");
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"varejo v{VERSION} - retail analytics over the Brazilian e-commerce dataset

Usage:
  varejo-cli list
      List every catalog query, grouped by topic.

  varejo-cli run <query_id> [name=value ...] [options]
      Load the dataset and execute one catalog query.

Options for run:
  --data-dir <dir>   Directory holding the dataset CSV files (default: ./data)
  --json             Print the result as JSON instead of a table
  --csv <file>       Write the result to a CSV file

Examples:
  varejo-cli run orders_yoy_growth
  varejo-cli run top_product_categories limit=10
  varejo-cli run cost_increase_between_years base_year=2017 target_year=2018 --json
"#
    );
}

fn list_queries() {
    for topic in [
        Topic::Trends,
        Topic::Geography,
        Topic::Economy,
        Topic::Delivery,
        Topic::Payments,
        Topic::Products,
    ] {
        println!("{topic}:");
        for def in CATALOG.iter().filter(|d| d.topic == topic) {
            let params: Vec<String> = def
                .params
                .iter()
                .map(|p| match p.default {
                    Some(d) => format!("{}={d}", p.name),
                    None => p.name.to_string(),
                })
                .collect();
            if params.is_empty() {
                println!("  {:<36} {}", def.id.as_str(), def.description);
            } else {
                println!(
                    "  {:<36} {}  [{}]",
                    def.id.as_str(),
                    def.description,
                    params.join(", ")
                );
            }
        }
        println!();
    }
}

fn run_query(args: &[String]) -> anyhow::Result<()> {
    let Some(query_id) = args.first() else {
        bail!("usage: varejo-cli run <query_id> [name=value ...]");
    };

    let mut data_dir = PathBuf::from("./data");
    let mut json = false;
    let mut csv_path: Option<PathBuf> = None;
    let mut params = Params::new();

    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--data-dir" => {
                let dir = rest.next().context("--data-dir needs a directory")?;
                data_dir = PathBuf::from(dir);
            }
            "--json" => json = true,
            "--csv" => {
                let path = rest.next().context("--csv needs a file path")?;
                csv_path = Some(PathBuf::from(path));
            }
            pair => {
                let (name, value) = pair
                    .split_once('=')
                    .with_context(|| format!("expected name=value, got '{pair}'"))?;
                let value: i64 = value
                    .parse()
                    .with_context(|| format!("parameter '{name}' must be an integer"))?;
                params.set(name, value);
            }
        }
    }

    let store = TableStore::load_dataset(&DatasetConfig::new(&data_dir))
        .with_context(|| format!("loading dataset from {}", data_dir.display()))?;

    let executor = Executor::new(&store);
    let result = executor.run_named(query_id, &params)?;

    if let Some(path) = csv_path {
        export::write_csv_file(&result, &path)?;
        println!("{} row(s) written to {}", result.len(), path.display());
    } else if json {
        println!("{}", serde_json::to_string_pretty(&*result)?);
    } else {
        display_table(&result);
    }

    Ok(())
}

fn display_table(rs: &varejo::ResultSet) {
    if rs.is_empty() {
        println!("no results");
        return;
    }

    let mut widths: Vec<usize> = rs.columns.iter().map(|c| c.name.len()).collect();
    let cells: Vec<Vec<String>> = rs
        .rows
        .iter()
        .map(|row| row.iter().map(render_cell).collect())
        .collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    print_rule(&widths, "┌", "┬", "┐");
    print!("│");
    for (i, col) in rs.columns.iter().enumerate() {
        print!(" {:width$} │", col.name, width = widths[i]);
    }
    println!();
    print_rule(&widths, "├", "┼", "┤");

    for row in &cells {
        print!("│");
        for (i, cell) in row.iter().enumerate() {
            print!(" {:width$} │", cell, width = widths[i]);
        }
        println!();
    }
    print_rule(&widths, "└", "┴", "┘");
    println!("{} row(s)", rs.len());
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Float(f) => format!("{f:.2}"),
        other => other.to_string(),
    }
}

fn print_rule(widths: &[usize], left: &str, mid: &str, right: &str) {
    print!("{left}");
    for (i, width) in widths.iter().enumerate() {
        print!("{}", "─".repeat(width + 2));
        print!("{}", if i < widths.len() - 1 { mid } else { right });
    }
    println!();
}
