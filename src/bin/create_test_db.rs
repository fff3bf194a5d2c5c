use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use budgetbot::{
    CategoryName, NewBudget, NewTransaction, PasswordHash, Period, TransactionKind,
    ValidatedPassword, create_transaction, create_user, initialize_db, upsert_budget,
};

/// A utility for creating a demo database for the budget tracker API.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Transactions for the demo month as (day offset, kind, category, amount).
const DEMO_TRANSACTIONS: [(i64, TransactionKind, &str, f64); 10] = [
    (0, TransactionKind::Income, "Salary", 4000.0),
    (0, TransactionKind::Expense, "Rent payment", 1200.0),
    (2, TransactionKind::Expense, "Zomato", 450.0),
    (4, TransactionKind::Expense, "Uber ride", 85.0),
    (6, TransactionKind::Expense, "Electricity bill", 140.0),
    (9, TransactionKind::Expense, "Swiggy dinner", 380.0),
    (12, TransactionKind::Expense, "Netflix", 15.0),
    (15, TransactionKind::Expense, "Amazon order", 230.0),
    (18, TransactionKind::Expense, "Pharmacy", 40.0),
    (20, TransactionKind::Income, "Freelance", 600.0),
];

/// Budgets for the demo month as (category, limit).
const DEMO_BUDGETS: [(&str, f64); 5] = [
    ("Food", 1000.0),
    ("Rent", 1500.0),
    ("Travel", 100.0),
    ("Shopping", 200.0),
    ("Entertainment", 0.0),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user demo@example.com with the password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("Demo", &"demo@example.com".parse()?, password_hash, &conn)?;

    let period = Period::containing(OffsetDateTime::now_utc().date());
    println!("Adding transactions and budgets for {}...", period.label());

    for (day_offset, kind, category, amount) in DEMO_TRANSACTIONS {
        let date = period.first_day() + Duration::days(day_offset);
        let transaction =
            NewTransaction::new(kind, CategoryName::new(category)?, amount, date)?;
        create_transaction(user.id, transaction, &conn)?;
    }

    for (category, limit) in DEMO_BUDGETS {
        let budget = NewBudget::new(period, CategoryName::new(category)?, limit)?;
        upsert_budget(user.id, budget, &conn)?;
    }

    println!("Success!");

    Ok(())
}
