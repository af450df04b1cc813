//! ledgerxml - Generate reports from ledger journals.
//!
//! # Usage
//!
//! ```bash
//! ledgerxml journal.ledger stats
//! ledgerxml journal.ledger totals --account Expenses
//! ledgerxml --xml export.xml register --begin 2024-01-01 --end 2024-04-01
//! ```
//!
//! # Reports
//!
//! - `stats` - Show ledger statistics
//! - `accounts` - Show the account tree
//! - `commodities` - List all commodities
//! - `register` - List transactions with their postings
//! - `totals` - Sum posted quantities per commodity

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use ledgerxml_core::{parse_query_date, Account, Ledger, TransactionList};
use ledgerxml_loader::{load_from_file, load_from_process, ProcessConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Output format for reports that support machine-readable output.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for tooling integration
    Json,
}

/// Generate reports from ledger journals.
#[derive(Parser, Debug)]
#[command(name = "ledgerxml")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The journal to process (or an XML export with --xml)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// The report to generate
    #[command(subcommand)]
    pub report: Report,

    /// Read FILE as an XML export instead of running ledger on it
    #[arg(long, global = true)]
    pub xml: bool,

    /// The ledger program used to export journals
    #[arg(long, value_name = "PATH", default_value = "ledger", global = true)]
    pub ledger_bin: PathBuf,

    /// Sort expression passed to ledger
    #[arg(long, value_name = "EXPR", default_value = "date", global = true)]
    pub sort: String,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Transaction selection shared by `register` and `totals`.
#[derive(clap::Args, Debug, Default)]
pub struct Filter {
    /// Keep transactions with a posting whose account matches this regex
    #[arg(short, long, value_name = "REGEX")]
    pub account: Option<String>,

    /// Keep transactions on or after this date (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub begin: Option<String>,

    /// Keep transactions before this date (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub end: Option<String>,
}

/// Available reports.
#[derive(Subcommand, Debug)]
pub enum Report {
    /// Show ledger statistics
    Stats,
    /// Show the account tree
    Accounts,
    /// List all commodities
    Commodities,
    /// List transactions and their postings
    Register {
        /// Transaction selection
        #[command(flatten)]
        filter: Filter,
        /// Output format
        #[arg(long, short = 'f', value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Sum posted quantities per commodity
    Totals {
        /// Transaction selection
        #[command(flatten)]
        filter: Filter,
        /// Output format
        #[arg(long, short = 'f', value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Main entry point for the report command.
pub fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut stdout = io::stdout().lock();
    match run(&args, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Load the ledger and write the requested report to `writer`.
pub fn run<W: Write>(args: &Args, writer: &mut W) -> Result<()> {
    if !args.file.exists() {
        anyhow::bail!("file not found: {}", args.file.display());
    }

    tracing::debug!(file = %args.file.display(), xml = args.xml, "loading ledger");
    let ledger = load(args).with_context(|| format!("failed to load {}", args.file.display()))?;

    match &args.report {
        Report::Stats => report_stats(&ledger, writer),
        Report::Accounts => report_accounts(&ledger, writer),
        Report::Commodities => report_commodities(&ledger, writer),
        Report::Register { filter, format } => {
            let list = select(&ledger, filter)?;
            report_register(&list, *format, writer)
        }
        Report::Totals { filter, format } => {
            let list = select(&ledger, filter)?;
            report_totals(&list, *format, writer)
        }
    }
}

fn load(args: &Args) -> Result<Ledger> {
    if args.xml {
        return Ok(load_from_file(&args.file)?);
    }
    let config = ProcessConfig::default()
        .with_program(&args.ledger_bin)
        .with_sort(Some(args.sort.clone()).filter(|s| !s.is_empty()));
    Ok(load_from_process(&args.file, &config)?)
}

/// Apply the account and date filters.
fn select<'a>(ledger: &'a Ledger, filter: &Filter) -> Result<TransactionList<'a>> {
    let mut list = ledger.transactions();

    if let Some(pattern) = &filter.account {
        list = list.filter_by_account_pattern(pattern)?;
    }

    if filter.begin.is_some() || filter.end.is_some() {
        let start = parse_bound(filter.begin.as_deref(), NaiveDate::MIN)?;
        let end = parse_bound(filter.end.as_deref(), NaiveDate::MAX)?;
        list = list.filter_by_date_range(start, end)?;
    }

    Ok(list)
}

fn parse_bound(text: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    Ok(text.map(parse_query_date).transpose()?.unwrap_or(default))
}

fn report_stats<W: Write>(ledger: &Ledger, writer: &mut W) -> Result<()> {
    let transactions = ledger.transactions();
    let postings: usize = transactions.iter().map(|t| t.postings.len()).sum();

    writeln!(writer, "Ledger Statistics")?;
    writeln!(writer, "{}", "=".repeat(40))?;
    writeln!(writer)?;
    writeln!(writer, "Version:       {}", ledger.version)?;
    writeln!(writer, "Commodities:   {}", ledger.commodities.len())?;
    writeln!(writer, "Accounts:      {}", ledger.accounts.len())?;
    writeln!(writer, "Transactions:  {}", transactions.len())?;
    writeln!(writer, "Postings:      {postings}")?;
    if let Some((first, last)) = transactions.date_span() {
        writeln!(writer, "First date:    {first}")?;
        writeln!(writer, "Last date:     {last}")?;
    }
    Ok(())
}

fn report_accounts<W: Write>(ledger: &Ledger, writer: &mut W) -> Result<()> {
    for root in &ledger.roots {
        write_account_tree(root, 0, writer)?;
    }
    Ok(())
}

/// Nameless nodes are not printed; their children stay at the same level.
fn write_account_tree<W: Write>(account: &Account, level: usize, writer: &mut W) -> Result<()> {
    let child_level = if account.is_named() {
        writeln!(writer, "{}{}", "  ".repeat(level), account.name)?;
        level + 1
    } else {
        level
    };
    for child in &account.subaccounts {
        write_account_tree(child, child_level, writer)?;
    }
    Ok(())
}

fn report_commodities<W: Write>(ledger: &Ledger, writer: &mut W) -> Result<()> {
    for commodity in &ledger.commodities {
        if commodity.flags.is_empty() {
            writeln!(writer, "{}", commodity.symbol)?;
        } else {
            writeln!(writer, "{:<10} {}", commodity.symbol, commodity.flags)?;
        }
    }
    Ok(())
}

fn report_register<W: Write>(
    list: &TransactionList<'_>,
    format: OutputFormat,
    writer: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let transactions: Vec<_> = list.iter().collect();
            serde_json::to_writer_pretty(&mut *writer, &transactions)?;
            writeln!(writer)?;
        }
        OutputFormat::Text => {
            for txn in list {
                writeln!(writer, "{} {}", txn.date.format("%Y/%m/%d"), txn.payee)?;
                for posting in &txn.postings {
                    writeln!(
                        writer,
                        "    {:<40} {:>12} {}",
                        posting.account.path, posting.quantity, posting.commodity.symbol
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn report_totals<W: Write>(
    list: &TransactionList<'_>,
    format: OutputFormat,
    writer: &mut W,
) -> Result<()> {
    let totals = list.totals()?;
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &totals)?;
            writeln!(writer)?;
        }
        OutputFormat::Text => {
            for (symbol, quantity) in &totals {
                writeln!(writer, "{quantity:>15} {symbol}")?;
            }
        }
    }
    Ok(())
}
