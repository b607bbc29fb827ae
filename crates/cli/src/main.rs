use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use trade_journal_core::backend::identity::{IdentityClient, SignUpOutcome};
use trade_journal_core::errors::CoreError;
use trade_journal_core::models::analytics::PerformanceSummary;
use trade_journal_core::models::forex::{ForexDirection, NewForexOperation, DEFAULT_INITIAL_CAPITAL};
use trade_journal_core::models::operation::OperationId;
use trade_journal_core::models::session::Session;
use trade_journal_core::models::settings::BackendSettings;
use trade_journal_core::models::stock::{NewStockOperation, StockDirection};
use trade_journal_core::services::notifier::CollectingNotifier;
use trade_journal_core::TradeJournal;

#[derive(Parser)]
#[command(name = "trade-journal", version, about = "Log stock and forex operations and review their performance")]
struct Cli {
    /// Account email used to sign in
    #[arg(long, env = "TRADE_JOURNAL_EMAIL", global = true)]
    email: Option<String>,

    /// Account password used to sign in
    #[arg(long, env = "TRADE_JOURNAL_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Equity operations
    Stocks {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Currency-pair operations
    Forex {
        #[command(subcommand)]
        action: ForexAction,
    },
    /// Profit, ROI and win rate for both classes
    Summary,
    /// Create an account with --email/--password
    SignUp,
    /// Show or change the profile display name
    Profile {
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum StockAction {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        date: NaiveDate,
        /// purchase or sale
        #[arg(long)]
        direction: StockDirection,
        #[arg(long)]
        entry: f64,
        #[arg(long)]
        exit: f64,
        #[arg(long)]
        quantity: u32,
    },
    Remove {
        id: String,
    },
}

#[derive(Subcommand)]
enum ForexAction {
    List,
    Add {
        /// e.g. EUR/USD
        #[arg(long)]
        pair: String,
        #[arg(long)]
        date: NaiveDate,
        /// buy or sell
        #[arg(long)]
        direction: ForexDirection,
        #[arg(long)]
        entry: f64,
        #[arg(long)]
        exit: f64,
        #[arg(long)]
        lot_size: f64,
        #[arg(long, default_value_t = DEFAULT_INITIAL_CAPITAL)]
        capital: f64,
    },
    Remove {
        id: String,
    },
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CoreError> {
    let settings = BackendSettings::from_env()?;
    let identity = IdentityClient::new(&settings)?;

    if let Command::SignUp = cli.command {
        let (email, password) = credentials(&cli)?;
        match identity.sign_up(email, password).await? {
            SignUpOutcome::SignedIn(session) => println!("Account created, signed in as {}", session.user_id()),
            SignUpOutcome::ConfirmationRequired(user) => {
                println!("Account {} created; check your email to confirm it", user.id)
            }
        }
        return Ok(());
    }

    let session = match (&cli.email, &cli.password) {
        (Some(email), Some(password)) => Some(identity.sign_in_with_password(email, password).await?),
        _ => None,
    };

    let notifier = Arc::new(CollectingNotifier::new());
    let mut journal = TradeJournal::connect(&settings, notifier.clone())?;
    info!(signed_in = session.is_some(), "journal ready");

    let result = execute(&mut journal, cli.command, session.as_ref()).await;
    for notification in notifier.drain() {
        println!("[{}] {}", notification.level, notification.message);
    }
    result
}

fn credentials(cli: &Cli) -> Result<(&str, &str), CoreError> {
    match (&cli.email, &cli.password) {
        (Some(email), Some(password)) => Ok((email.as_str(), password.as_str())),
        _ => Err(CoreError::Unauthenticated(
            "--email and --password (or TRADE_JOURNAL_EMAIL / TRADE_JOURNAL_PASSWORD) are required".into(),
        )),
    }
}

async fn execute(
    journal: &mut TradeJournal,
    command: Command,
    session: Option<&Session>,
) -> Result<(), CoreError> {
    match command {
        Command::Stocks { action } => match action {
            StockAction::List => {
                journal.refresh_stocks(session).await;
                print_stocks(journal);
            }
            StockAction::Add { name, date, direction, entry, exit, quantity } => {
                let draft = NewStockOperation::new(name, date, direction, entry, exit, quantity);
                let op = journal.add_stock_operation(session, &draft).await?;
                println!("{}  profit {:.2}", op.id, op.profit);
            }
            StockAction::Remove { id } => {
                let outcome = journal
                    .remove_stock_operation(session, &OperationId::new(id))
                    .await?;
                println!("{outcome:?}");
            }
        },
        Command::Forex { action } => match action {
            ForexAction::List => {
                journal.refresh_forex(session).await;
                print_forex(journal);
            }
            ForexAction::Add { pair, date, direction, entry, exit, lot_size, capital } => {
                let draft = NewForexOperation::new(pair, date, direction, entry, exit, lot_size, capital);
                let op = journal.add_forex_operation(session, &draft).await?;
                println!("{}  profit {:.2}  roi {:.2}%", op.id, op.profit, op.roi);
            }
            ForexAction::Remove { id } => {
                let outcome = journal
                    .remove_forex_operation(session, &OperationId::new(id))
                    .await?;
                println!("{outcome:?}");
            }
        },
        Command::Summary => {
            journal.refresh(session).await;
            print_summary("Stocks", &journal.stock_summary());
            print_summary("Forex", &journal.forex_summary());
            print_summary("Overall", &journal.overall_summary());
        }
        Command::Profile { name } => {
            let session = session.ok_or_else(|| {
                CoreError::Unauthenticated("sign in to view or change your profile".into())
            })?;
            let profile = match name {
                Some(name) => Some(journal.profiles().update_display_name(session, &name).await?),
                None => journal.profiles().fetch(session).await?,
            };
            match profile.and_then(|p| p.display_name) {
                Some(name) => println!("Display name: {name}"),
                None => println!("No display name set"),
            }
        }
        Command::SignUp => {}
    }
    Ok(())
}

fn print_stocks(journal: &TradeJournal) {
    if journal.stock_operations().is_empty() {
        println!("No operations recorded");
        return;
    }
    println!(
        "{:<36}  {:<12}  {:<10}  {:<8}  {:>12}  {:>12}  {:>8}  {:>12}",
        "id", "stock", "date", "type", "entry", "exit", "qty", "profit"
    );
    for op in journal.stock_operations() {
        println!(
            "{:<36}  {:<12}  {:<10}  {:<8}  {:>12.2}  {:>12.2}  {:>8}  {:>12.2}",
            op.id, op.stock_name, op.date, op.direction, op.entry_price, op.exit_price, op.quantity, op.profit
        );
    }
    let curve = journal.stock_profit_curve();
    if let Some(last) = curve.last() {
        println!("accumulated profit: {:.2}", last.accumulated);
    }
}

fn print_forex(journal: &TradeJournal) {
    if journal.forex_operations().is_empty() {
        println!("No operations recorded");
        return;
    }
    println!(
        "{:<36}  {:<8}  {:<10}  {:<4}  {:>10}  {:>10}  {:>6}  {:>10}  {:>10}  {:>9}",
        "id", "pair", "date", "type", "entry", "exit", "lot", "capital", "profit", "roi"
    );
    for op in journal.forex_operations() {
        println!(
            "{:<36}  {:<8}  {:<10}  {:<4}  {:>10.5}  {:>10.5}  {:>6.2}  {:>10}  {:>10.2}  {:>8.2}%",
            op.id,
            op.currency_pair,
            op.date,
            op.direction,
            op.entry_price,
            op.exit_price,
            op.lot_size,
            op.initial_capital,
            op.profit,
            op.roi
        );
    }
    let split = journal.forex_win_loss();
    println!("wins: {}  losses: {}", split.wins, split.losses);
}

fn print_summary(title: &str, summary: &PerformanceSummary) {
    print!(
        "{title:<8} operations {:>4}  total profit {:>12}  win rate {:>5}",
        summary.total_operations,
        summary.total_profit_display(),
        summary.win_rate_display()
    );
    match summary.average_roi_display() {
        Some(roi) => println!("  average ROI {roi:>9}"),
        None => println!(),
    }
}
