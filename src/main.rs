use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use rusty_tabular::ColumnProfile;
use rusty_tabular::Criteria;
use rusty_tabular::DataModel;
use rusty_tabular::Dataset;
use rusty_tabular::JoinConfig;
use rusty_tabular::JoinType;
use rusty_tabular::QualityReport;
use rusty_tabular::Table;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rusty_tabular")]
#[command(about = "Profile, relate and join the sheets of a JSON workbook")]
struct Args {
    /// JSON workbook: an object of sheet name to array of row objects
    workbook: PathBuf,

    /// Sheet to use as the base table (default: first non-empty sheet)
    #[arg(short, long)]
    base: Option<String>,

    /// Turn suggested joins into INNER joins
    #[arg(long)]
    inner: bool,

    /// Only analyze sheets matching these glob patterns
    #[arg(short, long = "sheets")]
    sheets: Vec<String>,

    /// Extra text values to treat as null, besides the empty string
    #[arg(long = "null")]
    nulls: Vec<String>,

    /// Include a data-quality report of the joined dataset
    #[arg(long)]
    report: bool,
}

/// A table's profile without its rows.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TableSummary<'a> {
    id: &'a str,
    table_name: &'a str,
    row_count: usize,
    columns: &'a [ColumnProfile],
    primary_date_column: Option<&'a str>,
    primary_measure_column: Option<&'a str>,
    dimensions: &'a [String],
}

impl<'a> From<&'a Table> for TableSummary<'a> {
    fn from(table: &'a Table) -> Self {
        TableSummary {
            id: &table.id,
            table_name: &table.table_name,
            row_count: table.row_count,
            columns: &table.columns,
            primary_date_column: table.primary_date_column.as_deref(),
            primary_measure_column: table.primary_measure_column.as_deref(),
            dimensions: &table.dimensions,
        }
    }
}

#[derive(Serialize)]
struct Output<'a> {
    tables: Vec<TableSummary<'a>>,
    model: &'a DataModel,
    dataset: &'a Dataset,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<QualityReport>,
}

fn criteria(args: &Args) -> Result<Criteria> {
    let patterns: Vec<&str> = args.sheets.iter().map(String::as_str).collect();
    let mut criteria = if patterns.is_empty() {
        Criteria::default()
    } else {
        Criteria::with_sheet_patterns(&patterns).context("Invalid sheet pattern")?
    };
    criteria.nulls.extend(args.nulls.iter().cloned());
    Ok(criteria)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let document = std::fs::read_to_string(&args.workbook)
        .with_context(|| format!("Failed to read {}", args.workbook.display()))?;
    let tables = rusty_tabular::analyze_workbook(&document, &criteria(&args)?)
        .with_context(|| args.workbook.display().to_string())?;

    let base = match &args.base {
        Some(name) => tables
            .iter()
            .find(|table| &table.table_name == name)
            .with_context(|| format!("Sheet '{name}' not found or empty"))?,
        None => tables.first().context("No sheets to analyze")?,
    };
    info!(base = base.table_name.as_str(), tables = tables.len(), "analyzed workbook");

    let joins: Vec<JoinConfig> = rusty_tabular::suggest(&base.id, &tables)
        .into_iter()
        .map(|join| JoinConfig {
            join_type: if args.inner { JoinType::Inner } else { join.join_type },
            ..join
        })
        .collect();
    let model = DataModel::new(base.id.to_owned(), joins);
    let dataset = rusty_tabular::execute(&tables, &model).context("Failed to execute data model")?;

    let output = Output {
        tables: tables.iter().map(TableSummary::from).collect(),
        model: &model,
        dataset: &dataset,
        report: args.report.then(|| QualityReport::of(&dataset)),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
