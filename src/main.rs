use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use rust_decimal::Decimal;

use budgetbook::budget::commands::{
    AddEntry, Command, DeleteEntry, DeleteTransaction, RecordTransaction, RenameMonth, UpdateEntry, UpdateTransaction,
};
use budgetbook::budget::ledger::{Ledger, UsageLevel};
use budgetbook::budget::Kind;
use budgetbook::data::{self, Section};

#[derive(Parser)]
#[command(name = "budgetbook", version, about = "Monthly budget tracker backed by a spreadsheet file")]
struct Cli {
    /// Budget workbook to read and write
    #[arg(short, long, env = "BUDGET_FILE", global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a fresh budget with the default expense categories
    New {
        /// Month label, defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Replace the workbook if it already exists
        #[arg(long)]
        force: bool,
    },
    /// Show totals, budget usage and the expense breakdown
    Summary,
    /// Income source commands
    #[command(subcommand)]
    Income(EntryCommands),
    /// Expense category commands
    #[command(subcommand)]
    Expense(EntryCommands),
    /// Record a transaction and credit its category
    Record {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
        #[arg(value_enum)]
        kind: KindArg,
        category: String,
        amount: Decimal,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Transaction log commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),
    /// Print one section as CSV
    List {
        #[arg(value_enum)]
        section: SectionArg,
    },
    /// Print transactions grouped by date, newest first
    History,
    /// Rename the month and save under its default file name
    RenameMonth { month: String },
}

#[derive(Subcommand)]
enum EntryCommands {
    Add {
        category: String,
        amount: Decimal,
    },
    Edit {
        index: usize,
        category: String,
        amount: Decimal,
    },
    Remove {
        index: usize,
    },
}

#[derive(Subcommand)]
enum TransactionCommands {
    Edit {
        index: usize,
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
        #[arg(value_enum)]
        kind: KindArg,
        category: String,
        amount: Decimal,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    Remove {
        index: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for Kind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Income => Kind::Income,
            KindArg::Expense => Kind::Expense,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SectionArg {
    Incomes,
    Expenses,
    Transactions,
}

impl From<SectionArg> for Section {
    fn from(section: SectionArg) -> Self {
        match section {
            SectionArg::Incomes => Section::Incomes,
            SectionArg::Expenses => Section::Expenses,
            SectionArg::Transactions => Section::Transactions,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::New { month, force } => {
            let ledger = month.map(Ledger::for_month).unwrap_or_default();
            let path = data::create(&ledger, cli.file.as_deref(), force)
                .context("not creating a new budget, use --force to overwrite")?;
            println!("Created {}", path.display());
        },
        Commands::Summary => print_summary(&load(cli.file.as_deref())?),
        Commands::Income(command) => apply(cli.file.as_deref(), entry_command(Kind::Income, command)?)?,
        Commands::Expense(command) => apply(cli.file.as_deref(), entry_command(Kind::Expense, command)?)?,
        Commands::Record {
            date,
            kind,
            category,
            amount,
            description,
        } => {
            check_entry(&category, amount)?;
            let command = RecordTransaction::new(date, category, description, amount, kind.into());
            apply(cli.file.as_deref(), command.into())?;
        },
        Commands::Transaction(TransactionCommands::Edit {
            index,
            date,
            kind,
            category,
            amount,
            description,
        }) => {
            check_entry(&category, amount)?;
            let command = UpdateTransaction::new(index, date, category, description, amount, kind.into());
            apply(cli.file.as_deref(), command.into())?;
        },
        Commands::Transaction(TransactionCommands::Remove { index }) => {
            apply(cli.file.as_deref(), DeleteTransaction::new(index).into())?;
        },
        Commands::List { section } => {
            let ledger = load(cli.file.as_deref())?;
            data::write_csv(&ledger, section.into(), std::io::stdout())?;
        },
        Commands::History => print_history(&load(cli.file.as_deref())?),
        Commands::RenameMonth { month } => {
            let path = require_file(cli.file.as_deref())?;
            let mut ledger = data::import(path)?;
            ledger.execute(RenameMonth::new(month).into())?;

            let target = path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(data::default_file_name(ledger.month()));
            let written = data::export(&ledger, Some(target.as_path()))?;
            println!("Saved {}", written.display());
        },
    }

    Ok(())
}

fn require_file(file: Option<&Path>) -> Result<&Path> {
    match file {
        Some(path) => Ok(path),
        None => bail!("no budget file given, use --file or BUDGET_FILE"),
    }
}

fn load(file: Option<&Path>) -> Result<Ledger> {
    let path = require_file(file)?;
    data::import(path).with_context(|| format!("failed to load {}", path.display()))
}

/// Loads the workbook, applies one command and writes it back in place.
fn apply(file: Option<&Path>, command: Command) -> Result<()> {
    let path = require_file(file)?;
    let mut ledger = load(Some(path))?;

    ledger.execute(command)?;
    debug!("saving {}", path.display());
    data::export(&ledger, Some(path))?;

    Ok(())
}

fn check_entry(category: &str, amount: Decimal) -> Result<()> {
    if category.trim().is_empty() {
        bail!("category must not be empty");
    }

    if amount.is_sign_negative() {
        bail!("amount must not be negative");
    }

    Ok(())
}

fn entry_command(kind: Kind, command: EntryCommands) -> Result<Command> {
    let command = match command {
        EntryCommands::Add { category, amount } => {
            check_entry(&category, amount)?;
            AddEntry::new(kind, category, amount).into()
        },
        EntryCommands::Edit {
            index,
            category,
            amount,
        } => {
            check_entry(&category, amount)?;
            UpdateEntry::new(kind, index, category, amount).into()
        },
        EntryCommands::Remove { index } => DeleteEntry::new(kind, index).into(),
    };

    Ok(command)
}

fn print_summary(ledger: &Ledger) {
    let totals = ledger.totals();

    println!("Budget for {}", ledger.month());
    println!("  Income:   {:>12.2}", totals.income);
    println!("  Expenses: {:>12.2}", totals.expenses);
    println!("  Balance:  {:>12.2}", totals.net);

    match ledger.usage() {
        Some(ratio) => {
            let level = match UsageLevel::from_ratio(ratio) {
                UsageLevel::Healthy => "on track",
                UsageLevel::Warning => "getting close",
                UsageLevel::Exceeded => "over budget",
            };
            println!("You've used {:.1}% of your income ({})", ratio * Decimal::ONE_HUNDRED, level);
        },
        None => println!("Add income to see your budget usage"),
    }

    let breakdown = ledger.expense_breakdown();
    if !breakdown.is_empty() {
        println!("Expense breakdown:");
        for slice in breakdown {
            println!(
                "  {:<20} {:>12.2} {:>6.1}%",
                slice.category,
                slice.amount,
                slice.share * Decimal::ONE_HUNDRED
            );
        }
    }
}

fn print_history(ledger: &Ledger) {
    for (day, transactions) in ledger.group_transactions_by_date() {
        println!("{}", day.format("%A, %B %d, %Y"));
        for transaction in transactions {
            let sign = match transaction.kind() {
                Kind::Income => '+',
                Kind::Expense => '-',
            };
            println!(
                "  {}{:<12.2} {:<20} {}",
                sign,
                transaction.amount(),
                transaction.category(),
                transaction.description()
            );
        }
    }
}
