//! CLI binary for smoke-testing the Duitku gateway integration.

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use duitku_rs::checkout::CheckoutBlocking;
use duitku_rs::config::{DuitkuConfig, EnvProvider};
use duitku_rs::models::{
    MerchantOrderId, OrderRecord, PaymentMethod, TransactionRequest, TransactionResponse,
    TransactionStatus,
};
use duitku_rs::qris;
use duitku_rs::store::{BlockingStore, FileStore};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Duitku gateway CLI — create transactions, poll status, build QRIS
/// payloads.
#[derive(Debug, Parser)]
#[command(name = "duitku", version, about)]
struct Cli {
    /// Override the order-store directory (default: XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Build a dynamic (amount-bearing) QRIS payload from a static one.
    Qris(QrisArgs),
    /// Check a QRIS payload's structure and CRC.
    QrisVerify {
        /// Payload string to verify.
        #[arg(long)]
        payload: String,
    },
    /// List payment methods and fees for an amount.
    Methods {
        /// Order amount in whole Rupiah.
        #[arg(long)]
        amount: i64,
    },
    /// Create a gateway transaction.
    Create(CreateArgs),
    /// Poll the gateway for a transaction's status.
    Status {
        /// Merchant order id to query.
        #[arg(long)]
        order_id: String,
    },
    /// List locally recorded orders.
    Orders,
}

/// Arguments for the `qris` subcommand.
#[derive(Debug, Args)]
struct QrisArgs {
    /// The merchant's static QRIS string.
    #[arg(long)]
    payload: String,
    /// Transaction amount in whole Rupiah.
    #[arg(long)]
    amount: i64,
}

/// Arguments for the `create` subcommand.
#[derive(Debug, Args)]
struct CreateArgs {
    /// Amount in whole Rupiah.
    #[arg(long)]
    amount: i64,
    /// Gateway payment-method code (e.g. SP for QRIS).
    #[arg(long, default_value = "SP")]
    method: String,
    /// Merchant order id; generated from the clock when omitted.
    #[arg(long)]
    order_id: Option<String>,
    /// Purchase description.
    #[arg(long, default_value = "CLI test order")]
    product: String,
    /// Customer e-mail.
    #[arg(long)]
    email: String,
    /// Callback URL the gateway will POST the result to.
    #[arg(long)]
    callback_url: String,
    /// Return URL for the customer.
    #[arg(long)]
    return_url: String,
    /// Payment window in minutes.
    #[arg(long)]
    expiry: Option<i64>,
}

/// Reads gateway credentials from the environment.
fn read_config() -> io::Result<Option<DuitkuConfig>> {
    match DuitkuConfig::from_provider(&EnvProvider::new()) {
        Ok(config) => Ok(Some(config)),
        Err(err) => {
            let mut out = io::stderr().lock();
            writeln!(out, "{} {err}", "error:".red().bold())?;
            writeln!(
                out,
                "  {} create a .env file with DUITKU_MERCHANT_CODE and DUITKU_API_KEY",
                "hint:".cyan()
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
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    // The QRIS codec commands are pure and need no credentials.
    let command = match cli.command {
        Command::Qris(args) => return cmd_qris(&args),
        Command::QrisVerify { payload } => return cmd_qris_verify(&payload),
        gateway_command @ (Command::Methods { .. }
        | Command::Create(_)
        | Command::Status { .. }
        | Command::Orders) => gateway_command,
    };

    let Some(config) = read_config()? else {
        return Ok(ExitCode::FAILURE);
    };

    let store = match create_store(cli.data_dir) {
        Ok(store) => store,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to initialize order store: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let checkout = match CheckoutBlocking::builder().config(config).store(store).build() {
        Ok(checkout) => checkout,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to build client: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    dispatch(&checkout, command)
}

/// Creates the order store, using `data_dir` if provided or the default
/// XDG data directory otherwise.
fn create_store(data_dir: Option<PathBuf>) -> duitku_rs::error::Result<FileStore> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => FileStore::default_dir()?,
    };
    FileStore::new(dir)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<S: BlockingStore>(
    checkout: &CheckoutBlocking<S>,
    command: Command,
) -> io::Result<ExitCode> {
    match command {
        // Normally handled before the client is built; kept total for
        // callers that route everything through dispatch.
        Command::Qris(args) => cmd_qris(&args),
        Command::QrisVerify { payload } => cmd_qris_verify(&payload),
        Command::Methods { amount } => cmd_methods(checkout, amount),
        Command::Create(args) => cmd_create(checkout, args),
        Command::Status { order_id } => cmd_status(checkout, &order_id),
        Command::Orders => cmd_orders(checkout),
    }
}

/// Executes the `qris` subcommand: builds and prints a dynamic payload.
fn cmd_qris(args: &QrisArgs) -> io::Result<ExitCode> {
    match qris::build_dynamic(&args.payload, args.amount) {
        Ok(dynamic) => {
            let mut out = io::stdout().lock();
            writeln!(out, "{dynamic}")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} invalid static QRIS payload: {err}",
                "error:".red().bold()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `qris-verify` subcommand.
fn cmd_qris_verify(payload: &str) -> io::Result<ExitCode> {
    match qris::verify(payload) {
        Ok(()) => {
            writeln!(io::stdout().lock(), "{}", "payload OK".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} {err}",
                "error:".red().bold()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `methods` subcommand: lists payment methods and fees.
fn cmd_methods<S: BlockingStore>(
    checkout: &CheckoutBlocking<S>,
    amount: i64,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Fetching payment methods...");

    match checkout.inner_client().payment_methods(amount) {
        Ok(response) => {
            spinner.finish_and_clear();
            print_methods_table(&response.payment_fee)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            spinner.finish_and_clear();
            writeln!(
                io::stderr().lock(),
                "{} listing failed: {err}",
                "error:".red().bold()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `create` subcommand: creates a gateway transaction.
fn cmd_create<S: BlockingStore>(
    checkout: &CheckoutBlocking<S>,
    args: CreateArgs,
) -> io::Result<ExitCode> {
    let order_id = args.order_id.unwrap_or_else(generated_order_id);
    let mut request = TransactionRequest::new(
        args.amount,
        args.method,
        MerchantOrderId::from(order_id),
        args.product,
        args.email,
        args.callback_url,
        args.return_url,
    );
    request.expiry_period = args.expiry;

    let spinner = make_spinner("Creating transaction...");

    match checkout.pay(request) {
        Ok(response) => {
            spinner.finish_and_clear();
            print_created_transaction(&response)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            spinner.finish_and_clear();
            writeln!(
                io::stderr().lock(),
                "{} transaction failed: {err}",
                "error:".red().bold()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `status` subcommand: polls and records the status.
fn cmd_status<S: BlockingStore>(
    checkout: &CheckoutBlocking<S>,
    order_id: &str,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Checking transaction status...");

    match checkout.refresh_status(&MerchantOrderId::from(order_id)) {
        Ok(response) => {
            spinner.finish_and_clear();
            let mut out = io::stdout().lock();
            writeln!(
                out,
                "{} {} {}",
                order_id.bold(),
                status_label(response.status_code),
                format_args!("({})", response.status_message).dimmed()
            )?;
            if let Some(amount) = response.amount.as_deref() {
                writeln!(out, "  {} Rp{amount}", "Amount:".bold())?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            spinner.finish_and_clear();
            writeln!(
                io::stderr().lock(),
                "{} status check failed: {err}",
                "error:".red().bold()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `orders` subcommand: lists locally recorded orders.
fn cmd_orders<S: BlockingStore>(checkout: &CheckoutBlocking<S>) -> io::Result<ExitCode> {
    match checkout.orders() {
        Ok(orders) => {
            print_orders_table(&orders)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to read orders: {err}",
                "error:".red().bold()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

// ── Output formatting ────────────────────────────────────────────────

/// Generates an order id from the current clock.
fn generated_order_id() -> String {
    format!("ORDER-{}", chrono::Utc::now().format("%Y%m%d%H%M%S%3f"))
}

/// Renders a status with an appropriate color.
fn status_label(status: TransactionStatus) -> String {
    match status {
        TransactionStatus::Success => status.label().green().bold().to_string(),
        TransactionStatus::Pending => status.label().yellow().to_string(),
        TransactionStatus::Cancelled => status.label().red().to_string(),
        TransactionStatus::Unknown => status.label().dimmed().to_string(),
    }
}

/// Prints the result of a created transaction.
fn print_created_transaction(response: &TransactionResponse) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Transaction created!".green().bold())?;
    writeln!(out)?;
    writeln!(out, "  {} {}", "Reference:".bold(), response.reference)?;
    if let Some(url) = response.payment_url.as_deref() {
        writeln!(out, "  {} {url}", "Payment URL:".bold())?;
    }
    if let Some(va_number) = response.va_number.as_deref() {
        writeln!(out, "  {} {va_number}", "VA number:".bold())?;
    }
    if let Some(qr_string) = response.qr_string.as_deref() {
        writeln!(out, "  {} {qr_string}", "QR string:".bold())?;
    }
    if let Some(amount) = response.amount.as_deref() {
        writeln!(out, "  {} Rp{amount}", "Amount:".bold())?;
    }
    Ok(())
}

/// Prints payment methods in a table.
fn print_methods_table(methods: &[PaymentMethod]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if methods.is_empty() {
        writeln!(out, "{}", "No payment methods available.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Code").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Fee").fg(Color::Cyan),
    ]);

    for method in methods {
        _ = table.add_row(vec![
            Cell::new(&method.payment_method),
            Cell::new(&method.payment_name),
            Cell::new(&method.total_fee),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Payment Methods".green().bold(),
        format_args!("({})", methods.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints recorded orders in a table.
fn print_orders_table(orders: &[OrderRecord]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if orders.is_empty() {
        writeln!(out, "{}", "No orders recorded.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Order ID").fg(Color::Cyan),
        Cell::new("Reference").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
        Cell::new("Method").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
        Cell::new("Updated").fg(Color::Cyan),
    ]);

    for order in orders {
        let reference = order
            .reference
            .as_ref()
            .map_or_else(|| "\u{2014}".to_owned(), ToString::to_string);
        let method = order.payment_method.as_deref().unwrap_or("\u{2014}");
        let status_cell = match order.status {
            TransactionStatus::Success => Cell::new(order.status.label()).fg(Color::Green),
            TransactionStatus::Pending => Cell::new(order.status.label()).fg(Color::Yellow),
            TransactionStatus::Cancelled => Cell::new(order.status.label()).fg(Color::Red),
            TransactionStatus::Unknown => Cell::new(order.status.label()).fg(Color::DarkGrey),
        };
        _ = table.add_row(vec![
            Cell::new(order.merchant_order_id.as_inner()),
            Cell::new(reference),
            Cell::new(order.amount),
            Cell::new(method),
            status_cell,
            Cell::new(order.updated.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Recorded Orders".green().bold(),
        format_args!("({})", orders.len()).dimmed()
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
            // Last-resort error output — if stderr itself failed, nothing
            // we can do.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
