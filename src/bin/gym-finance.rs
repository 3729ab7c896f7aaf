//! CLI for exporting and browsing the gym ledger.

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use gym_finance::client::LedgerClient;
use gym_finance::error::LedgerError;
use gym_finance::export::{
    DirectorySink, ExportFormat, ExportSession, describe, format_currency, format_signed_amount,
};
use gym_finance::models::{
    FilterSet, MemberId, NaiveDate, PageRequest, Transaction, TransactionKind, TransactionStats,
};
use gym_finance::source::{LedgerSource, MAX_PAGE_SIZE};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Environment variable holding the API token.
const TOKEN_ENV: &str = "GYM_API_TOKEN";

/// Environment variable overriding the API base URL.
const URL_ENV: &str = "GYM_API_URL";

/// Log filter used when `RUST_LOG` is unset. Export outcomes are reported
/// by the command itself, so library events stay quiet.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Export and browse the gym finance ledger.
#[derive(Debug, Parser)]
#[command(name = "gym-finance", version, about)]
struct Cli {
    /// API base URL (default: $GYM_API_URL or http://localhost:9000).
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Export every matching transaction to a CSV or PDF file.
    Export {
        /// Output format.
        #[arg(value_enum)]
        format: FormatArg,
        /// Directory for the file (default: the downloads folder).
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Filters applied to the export.
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show one page of transactions.
    Transactions {
        /// One-based page number.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
        /// Only transactions of this member.
        #[arg(long, value_name = "ID")]
        member: Option<i64>,
        /// Filters applied to the listing.
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show server-side totals.
    Stats {
        /// Filters applied to the totals.
        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Export formats accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Quoted delimited text.
    Csv,
    /// Paginated PDF table.
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => Self::Csv,
            FormatArg::Pdf => Self::Pdf,
        }
    }
}

/// Filter flags shared by every subcommand.
#[derive(Debug, Clone, Args)]
struct FilterArgs {
    /// Transaction kind (income, expense, positive_return, negative_return).
    #[arg(long, value_parser = parse_kind)]
    kind: Option<TransactionKind>,
    /// First day included (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// Last day included (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
}

impl FilterArgs {
    /// Builds the filter set, rejecting inverted ranges.
    fn filters(&self) -> Result<FilterSet, String> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(format!("--from {from} is after --to {to}"));
        }
        Ok(FilterSet {
            kind: self.kind,
            start_date: self.from,
            end_date: self.to,
        })
    }
}

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|err| format!("{err}"))
}

/// Parses a transaction kind by its API name for clap.
fn parse_kind(s: &str) -> Result<TransactionKind, String> {
    s.parse().map_err(|err: LedgerError| err.to_string())
}

/// Reads a non-empty environment variable.
fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|val| !val.is_empty())
}

/// Reads the API token from the environment.
fn read_token() -> io::Result<Option<String>> {
    if let Some(token) = read_env(TOKEN_ENV) {
        return Ok(Some(token));
    }
    let mut err = io::stderr().lock();
    writeln!(
        err,
        "{} {} environment variable is not set",
        "error:".red().bold(),
        TOKEN_ENV.bold()
    )?;
    writeln!(
        err,
        "  {} create a .env file with {}=<your_token>",
        "hint:".cyan(),
        TOKEN_ENV
    )?;
    Ok(None)
}

/// Prints a single error line to stderr.
fn report_error(context: &str, err: &dyn core::fmt::Display) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} {context}: {err}",
        "error:".red().bold()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Runs the CLI, returning an appropriate exit code.
async fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let Some(token) = read_token()? else {
        return Ok(ExitCode::FAILURE);
    };

    let mut builder = LedgerClient::builder().token(token);
    if let Some(url) = cli.api_url.or_else(|| read_env(URL_ENV)) {
        builder = builder.base_url(url);
    }
    let client = match builder.build() {
        Ok(client) => client,
        Err(err) => return report_error("failed to build client", &err),
    };

    dispatch(client, cli.command).await
}

/// Dispatches to the appropriate subcommand handler.
async fn dispatch(client: LedgerClient, command: Command) -> io::Result<ExitCode> {
    match command {
        Command::Export {
            format,
            out_dir,
            filters,
        } => cmd_export(client, format.into(), out_dir, &filters).await,
        Command::Transactions {
            page,
            member,
            filters,
        } => cmd_transactions(&client, page, member.map(MemberId::new), &filters).await,
        Command::Stats { filters } => cmd_stats(&client, &filters).await,
    }
}

/// Executes the `export` subcommand.
async fn cmd_export<S: LedgerSource>(
    source: S,
    format: ExportFormat,
    out_dir: Option<PathBuf>,
    args: &FilterArgs,
) -> io::Result<ExitCode> {
    let filters = match args.filters() {
        Ok(filters) => filters,
        Err(err) => return report_error("invalid filters", &err),
    };
    let dir = match out_dir.map_or_else(DirectorySink::default_dir, Ok) {
        Ok(dir) => dir,
        Err(err) => return report_error("no output directory", &err),
    };
    let sink = match DirectorySink::new(dir) {
        Ok(sink) => sink,
        Err(err) => return report_error("failed to prepare output directory", &err),
    };
    let session = ExportSession::new(source, sink);

    let spinner = make_spinner(&format!("Exporting transactions ({})...", describe(&filters)));
    match session.export_transactions(&filters, format).await {
        Ok(path) => {
            spinner.finish_and_clear();
            writeln!(
                io::stdout().lock(),
                "{} {}",
                "Export saved:".green().bold(),
                path.display()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            spinner.finish_and_clear();
            report_error("export failed", &err)
        }
    }
}

/// Executes the `transactions` subcommand.
async fn cmd_transactions(
    client: &LedgerClient,
    page: u32,
    member: Option<MemberId>,
    args: &FilterArgs,
) -> io::Result<ExitCode> {
    let filters = match args.filters() {
        Ok(filters) => filters,
        Err(err) => return report_error("invalid filters", &err),
    };
    let request = PageRequest::new(page, MAX_PAGE_SIZE);
    let result = match member {
        Some(member) => client.member_transactions(member, &filters, request).await,
        None => client.list_transactions(&filters, request).await,
    };
    match result {
        Ok(listing) => {
            print_transactions_table(&listing.items, page, listing.total_count)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_error("failed to list transactions", &err),
    }
}

/// Executes the `stats` subcommand.
async fn cmd_stats(client: &LedgerClient, args: &FilterArgs) -> io::Result<ExitCode> {
    let filters = match args.filters() {
        Ok(filters) => filters,
        Err(err) => return report_error("invalid filters", &err),
    };
    match client.transaction_stats(&filters).await {
        Ok(stats) => {
            print_stats_table(&stats)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_error("failed to load stats", &err),
    }
}

/// Prints transactions in a table.
fn print_transactions_table(txs: &[Transaction], page: u32, total: usize) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if txs.is_empty() {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Description").fg(Color::Cyan),
        Cell::new("Member").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
    ]);

    for tx in txs {
        let color = if tx.kind.is_inflow() {
            Color::Green
        } else {
            Color::Red
        };
        _ = table.add_row(vec![
            Cell::new(tx.occurred_at),
            Cell::new(tx.kind.label()),
            Cell::new(tx.description_or_category()),
            Cell::new(tx.counterparty_name().unwrap_or("\u{2014}")),
            Cell::new(format_signed_amount(tx)).fg(color),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Transactions".green().bold(),
        format_args!("(page {page}, {} of {total})", txs.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints server-side totals in a table.
fn print_stats_table(stats: &TransactionStats) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Metric").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
    ]);

    let rows = [
        ("Total income", stats.total_income),
        ("Total outflows", stats.total_outflows),
        ("Net profit", stats.net_profit),
        ("This month income", stats.this_month_income),
        ("This month outflows", stats.this_month_outflows),
        ("Last month income", stats.last_month_income),
        ("Last month outflows", stats.last_month_outflows),
    ];
    for (name, amount) in rows {
        _ = table.add_row(vec![Cell::new(name), Cell::new(format_currency(amount))]);
    }
    let change = stats
        .income_change_percent()
        .map_or_else(|| "\u{2014}".to_owned(), |percent| format!("{percent}%"));
    _ = table.add_row(vec![Cell::new("Income change"), Cell::new(change)]);

    writeln!(out, "{}", "Ledger Stats".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Entry point.
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            // stderr itself failed; nothing left to report to.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
