use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use fintrack_rs::{
    BudgetService, NewBudget, Transaction, TransactionKind, UserID, initialize_db,
    stores::{
        LedgerStore,
        sqlite::{SQLiteBudgetStore, SQLiteCategoryStore, SQLiteLedgerStore},
    },
};

/// A utility for creating a test database for the REST API server of fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The user that owns the demo data.
    #[arg(long, default_value_t = 1)]
    user_id: i64,
}

/// (days ago, amount in cents, kind, category, target, recurring every n days)
const DEMO_TRANSACTIONS: [(i64, i64, TransactionKind, &str, &str, Option<u32>); 8] = [
    (60, 500_000, TransactionKind::Income, "Salary", "Employer", Some(30)),
    (30, 500_000, TransactionKind::Income, "Salary", "Employer", Some(30)),
    (28, 180_000, TransactionKind::Expense, "Housing", "Landlord", Some(30)),
    (21, 4_599, TransactionKind::Expense, "Food & Dining", "Cafe", None),
    (14, 12_000, TransactionKind::Expense, "Utilities", "Power Co", Some(30)),
    (10, 75_000, TransactionKind::Income, "Freelance", "Client", None),
    (5, 8_250, TransactionKind::Expense, "Transportation", "Fuel", None),
    (2, 1_599, TransactionKind::Expense, "Entertainment", "Streaming", Some(30)),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let conn = Arc::new(Mutex::new(conn));
    let ledger = SQLiteLedgerStore::new(conn.clone());
    let budgets = BudgetService::new(
        SQLiteBudgetStore::new(conn.clone()),
        SQLiteCategoryStore::new(conn),
    );
    let user_id = UserID::new(args.user_id);
    let now = OffsetDateTime::now_utc();

    println!("Creating transactions for user {user_id}...");

    for (days_ago, cents, kind, category, target, recurring) in DEMO_TRANSACTIONS {
        let mut builder = Transaction::build(user_id, Decimal::new(cents, 2), kind, category)
            .target(target)
            .created(now - Duration::days(days_ago));

        if recurring.is_some() {
            builder = builder.recurring(recurring);
        }

        ledger.create(builder)?;
    }

    println!("Creating budget...");

    let budget = budgets.create_budget(NewBudget {
        user_id,
        name: "Monthly".to_owned(),
        description: "Everyday spending".to_owned(),
    })?;
    // Category IDs follow the order of the default catalogue.
    budgets.add_budget_item(budget.id, 1, Decimal::new(600, 0), 30)?;
    budgets.add_budget_item(budget.id, 2, Decimal::new(250, 0), 30)?;
    budgets.add_budget_item(budget.id, 4, Decimal::new(100, 0), 30)?;

    println!("Success!");

    Ok(())
}
