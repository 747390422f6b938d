//! Command-line front end for exporting bank history.

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, Months};
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use netbank_export::config::{CURRENCY_ENV, DEFAULT_CURRENCY, OfxConfig, OfxTimezone, TIMEZONE_ENV};
use netbank_export::export::filename::{DEFAULT_TEMPLATE, PENDING_TEMPLATE};
use netbank_export::export::{self, ExportDescriptor, ExportFormat};
use netbank_export::models::{Account, DateRange, Decimal, NaiveDate, Transaction};
use netbank_export::session::{
    BlockingBank, Credentials, PASSWORD_ENV, SnapshotBank, USERNAME_ENV, select_account,
};
use owo_colors::OwoColorize;

/// Accepted `--from`/`--to` layouts, tried in order.
const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

/// History window used when `--from` is omitted.
const DEFAULT_HISTORY_MONTHS: u32 = 3;

/// Export account history to CSV, QIF, OFX or JSON.
#[derive(Debug, Parser)]
#[command(name = "netbank", version, about)]
struct Cli {
    /// Client number.
    #[arg(short, long, global = true, env = USERNAME_ENV)]
    username: Option<String>,
    /// Password.
    #[arg(short, long, global = true, env = PASSWORD_ENV, hide_env_values = true)]
    password: Option<String>,
    /// Snapshot directory to read from (default: XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    snapshot_dir: Option<PathBuf>,
    /// Statement currency for OFX output.
    #[arg(long, global = true, env = CURRENCY_ENV, default_value = DEFAULT_CURRENCY)]
    currency: String,
    /// Timezone suffix for OFX dates, e.g. `+10:AEST`.
    #[arg(long, global = true, env = TIMEZONE_ENV, value_parser = parse_timezone)]
    timezone: Option<OfxTimezone>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// List accounts and balances.
    List,
    /// Download posted transactions for a date range.
    Download(DownloadArgs),
    /// Download pending transactions.
    DownloadPending(PendingArgs),
}

/// Arguments for the `download` subcommand.
#[derive(Debug, Args)]
struct DownloadArgs {
    /// Account name or number (first match wins).
    #[arg(short, long)]
    account: String,
    /// First day, `DD/MM/YYYY` or `YYYY-MM-DD` (default: three months ago).
    #[arg(short, long, value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// Last day, `DD/MM/YYYY` or `YYYY-MM-DD` (default: today).
    #[arg(short, long, value_parser = parse_date)]
    to: Option<NaiveDate>,
    /// Output file name template.
    #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
    output: String,
    /// Export format.
    #[arg(long, default_value = "json", value_parser = parse_format)]
    format: ExportFormat,
}

/// Arguments for the `download-pending` subcommand.
#[derive(Debug, Args)]
struct PendingArgs {
    /// Account name or number (first match wins).
    #[arg(short, long)]
    account: String,
    /// Output file name template.
    #[arg(short, long, default_value = PENDING_TEMPLATE)]
    output: String,
    /// Export format.
    #[arg(long, default_value = "json", value_parser = parse_format)]
    format: ExportFormat,
}

/// Parses a date in any of [`DATE_FORMATS`] for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    DATE_FORMATS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(s.trim(), layout).ok())
        .ok_or_else(|| format!("'{s}' is not a DD/MM/YYYY or YYYY-MM-DD date"))
}

/// Parses an export format identifier for clap.
fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse().map_err(|err| format!("{err}"))
}

/// Parses an OFX timezone suffix for clap.
fn parse_timezone(s: &str) -> Result<OfxTimezone, String> {
    s.parse().map_err(|err| format!("{err}"))
}

/// Fills in the default `download` window ending `today`.
fn resolve_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> netbank_export::error::Result<DateRange> {
    let end = to.unwrap_or(today);
    let start = from.unwrap_or_else(|| {
        end.checked_sub_months(Months::new(DEFAULT_HISTORY_MONTHS))
            .unwrap_or(end)
    });
    DateRange::new(start, end)
}

/// Builds credentials from flags or environment, printing a hint when
/// either part is missing.
fn read_credentials(
    username: Option<String>,
    password: Option<String>,
) -> io::Result<Option<Credentials>> {
    match (username, password) {
        (Some(user), Some(pass)) if !user.is_empty() => Ok(Some(Credentials::new(user, pass))),
        _ => {
            let mut err = io::stderr().lock();
            writeln!(
                err,
                "{} client number and password are required",
                "error:".red().bold()
            )?;
            writeln!(
                err,
                "  {} pass -u/-p or set {} and {} (a .env file works too)",
                "hint:".cyan(),
                USERNAME_ENV.bold(),
                PASSWORD_ENV.bold()
            )?;
            Ok(None)
        }
    }
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let Some(credentials) = read_credentials(cli.username, cli.password)? else {
        return Ok(ExitCode::FAILURE);
    };

    let bank = match create_bank(cli.snapshot_dir) {
        Ok(bank) => bank,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to open session: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut config = match OfxConfig::new().currency(&cli.currency) {
        Ok(config) => config,
        Err(err) => {
            writeln!(io::stderr().lock(), "{} {err}", "error:".red().bold())?;
            return Ok(ExitCode::FAILURE);
        }
    };
    if let Some(timezone) = cli.timezone {
        config = config.timezone(timezone);
    }

    dispatch(&bank, &credentials, &config, cli.command)
}

/// Opens the snapshot session at `dir`, or at the default data directory.
fn create_bank(dir: Option<PathBuf>) -> netbank_export::error::Result<SnapshotBank> {
    let dir = match dir {
        Some(dir) => dir,
        None => SnapshotBank::default_dir()?,
    };
    Ok(SnapshotBank::new(dir))
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<B: BlockingBank>(
    bank: &B,
    credentials: &Credentials,
    config: &OfxConfig,
    command: Command,
) -> io::Result<ExitCode> {
    match command {
        Command::List => cmd_list(bank, credentials),
        Command::Download(args) => {
            let today = Local::now().date_naive();
            cmd_download(bank, credentials, config, &args, today)
        }
        Command::DownloadPending(args) => {
            let today = Local::now().date_naive();
            cmd_download_pending(bank, credentials, config, &args, today)
        }
    }
}

/// Logs on, printing any failure. `None` means the error was reported.
fn logon<B: BlockingBank>(bank: &B, credentials: &Credentials) -> io::Result<Option<Vec<Account>>> {
    let spinner = make_spinner("Logging on...");
    let result = bank.logon(credentials);
    spinner.finish_and_clear();
    match result {
        Ok(accounts) => Ok(Some(accounts)),
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} logon failed: {err}",
                "error:".red().bold()
            )?;
            Ok(None)
        }
    }
}

/// Finds the account matching `pattern`, printing an error if none does.
fn find_account(accounts: &[Account], pattern: &str) -> io::Result<Option<Account>> {
    match select_account(accounts, pattern) {
        Ok(account) => Ok(Some(account.clone())),
        Err(err) => {
            writeln!(io::stderr().lock(), "{} {err}", "error:".red().bold())?;
            Ok(None)
        }
    }
}

/// Executes the `list` subcommand.
fn cmd_list<B: BlockingBank>(bank: &B, credentials: &Credentials) -> io::Result<ExitCode> {
    let Some(accounts) = logon(bank, credentials)? else {
        return Ok(ExitCode::FAILURE);
    };
    print_accounts_table(&accounts)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `download` subcommand.
fn cmd_download<B: BlockingBank>(
    bank: &B,
    credentials: &Credentials,
    config: &OfxConfig,
    args: &DownloadArgs,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    let range = match resolve_range(args.from, args.to, today) {
        Ok(range) => range,
        Err(err) => {
            writeln!(io::stderr().lock(), "{} {err}", "error:".red().bold())?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let Some(accounts) = logon(bank, credentials)? else {
        return Ok(ExitCode::FAILURE);
    };
    let Some(account) = find_account(&accounts, &args.account)? else {
        return Ok(ExitCode::FAILURE);
    };

    let spinner = make_spinner("Downloading history...");
    let history = bank.download_history(&account, Some(range.start()), Some(range.end()));
    spinner.finish_and_clear();
    let history = match history {
        Ok(history) => history,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} download failed: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let descriptor = ExportDescriptor::new(
        args.format,
        &args.output,
        &account,
        Some(range.start()),
        Some(range.end()),
    );
    export_to_file(&descriptor, &history.transactions, &account, range, config)
}

/// Executes the `download-pending` subcommand.
fn cmd_download_pending<B: BlockingBank>(
    bank: &B,
    credentials: &Credentials,
    config: &OfxConfig,
    args: &PendingArgs,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    let Some(accounts) = logon(bank, credentials)? else {
        return Ok(ExitCode::FAILURE);
    };
    let Some(account) = find_account(&accounts, &args.account)? else {
        return Ok(ExitCode::FAILURE);
    };

    let spinner = make_spinner("Downloading pending transactions...");
    let history = bank.download_history(&account, None, None);
    spinner.finish_and_clear();
    let pendings = match history {
        Ok(history) => history.pending_tagged(),
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} download failed: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let range = DateRange::spanning(&pendings, today);
    let descriptor = ExportDescriptor::new(args.format, &args.output, &account, None, None);
    export_to_file(&descriptor, &pendings, &account, range, config)
}

/// Encodes `transactions` and writes them where `descriptor` points.
fn export_to_file(
    descriptor: &ExportDescriptor,
    transactions: &[Transaction],
    account: &Account,
    range: DateRange,
    config: &OfxConfig,
) -> io::Result<ExitCode> {
    let written = export::encode(descriptor.format(), transactions, account, range, config)
        .and_then(|content| descriptor.write(&content));
    if let Err(err) = written {
        writeln!(
            io::stderr().lock(),
            "{} export failed: {err}",
            "error:".red().bold()
        )?;
        return Ok(ExitCode::FAILURE);
    }

    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} {}",
        "Retrieved".green().bold(),
        format_args!("{} transactions", transactions.len())
    )?;
    writeln!(
        out,
        "  {} {}",
        "wrote".dimmed(),
        descriptor.path().display()
    )?;
    Ok(ExitCode::SUCCESS)
}

// ── Output formatting ────────────────────────────────────────────────

/// Prints accounts in a table.
fn print_accounts_table(accounts: &[Account]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if accounts.is_empty() {
        writeln!(out, "{}", "No accounts found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Number").fg(Color::Cyan),
        Cell::new("Balance").fg(Color::Cyan),
        Cell::new("Available").fg(Color::Cyan),
    ]);

    for acc in accounts {
        let money = |value: Option<Decimal>| {
            value.map_or_else(|| "\u{2014}".to_owned(), |amount| format!("{amount:.2}"))
        };
        _ = table.add_row(vec![
            Cell::new(&acc.name),
            Cell::new(&acc.number),
            Cell::new(money(acc.balance)).set_alignment(CellAlignment::Right),
            Cell::new(money(acc.available)).set_alignment(CellAlignment::Right),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Accounts".green().bold(),
        format_args!("({})", accounts.len()).dimmed()
    )?;
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
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
