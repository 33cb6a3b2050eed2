use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use budgetboard::{
    AccountKind, AccountName, CategoryName, Email, PasswordHash, Transaction, ValidatedPassword,
    create_account, create_category, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the budgetboard server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

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

    println!("Creating test user test@example.com with the password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Email::new("test@example.com")?, password_hash, &conn)?;

    println!("Creating accounts...");
    let everyday = create_account(
        AccountName::new("Everyday")?,
        AccountKind::Checking,
        1_500.0,
        user.id,
        &conn,
    )?;
    let savings = create_account(
        AccountName::new("Savings")?,
        AccountKind::Savings,
        8_000.0,
        user.id,
        &conn,
    )?;
    let credit_card = create_account(
        AccountName::new("Credit Card")?,
        AccountKind::Credit,
        0.0,
        user.id,
        &conn,
    )?;

    println!("Creating categories...");
    let salary = create_category(CategoryName::new("Salary")?, true, user.id, &conn)?;
    let rent = create_category(CategoryName::new("Rent")?, false, user.id, &conn)?;
    let groceries = create_category(CategoryName::new("Groceries")?, false, user.id, &conn)?;
    let transport = create_category(CategoryName::new("Transport")?, false, user.id, &conn)?;
    let eating_out = create_category(CategoryName::new("Eating Out")?, false, user.id, &conn)?;

    println!("Creating a year of transactions...");
    let today = OffsetDateTime::now_utc().date();
    let mut transaction_count = 0;

    for days_ago in (0..365).rev() {
        let date = today - Duration::days(days_ago);
        // Varies amounts between days without pulling in a random number generator.
        let jitter = (days_ago % 7) as f64;

        let mut builders = Vec::new();

        match date.day() {
            1 => {
                builders.push(
                    Transaction::build(everyday.id, 4_200.0, date, "Pay day")
                        .category_id(Some(salary.id)),
                );
                builders.push(Transaction::build(savings.id, 500.0, date, "Savings transfer"));
                builders.push(Transaction::build(
                    everyday.id,
                    -500.0,
                    date,
                    "Savings transfer",
                ));
            }
            3 => builders.push(
                Transaction::build(everyday.id, -1_850.0, date, "Rent")
                    .category_id(Some(rent.id)),
            ),
            15 => builders.push(
                Transaction::build(credit_card.id, -60.0, date, "Bus pass top up")
                    .category_id(Some(transport.id)),
            ),
            20 => builders.push(Transaction::build(
                credit_card.id,
                300.0 + jitter * 10.0,
                date,
                "Credit card repayment",
            )),
            _ => {}
        }

        if date.weekday() == time::Weekday::Saturday {
            builders.push(
                Transaction::build(everyday.id, -(95.0 + jitter * 6.5), date, "Supermarket")
                    .category_id(Some(groceries.id)),
            );
        }

        if days_ago % 9 == 0 {
            builders.push(
                Transaction::build(credit_card.id, -(18.5 + jitter * 3.0), date, "Takeaways")
                    .category_id(Some(eating_out.id)),
            );
        }

        if days_ago % 23 == 0 {
            builders.push(Transaction::build(
                everyday.id,
                -(12.0 + jitter),
                date,
                "Corner store",
            ));
        }

        for builder in builders {
            create_transaction(builder, user.id, &conn)?;
            transaction_count += 1;
        }
    }

    println!("Created {transaction_count} transactions.");
    println!("Success!");

    Ok(())
}
