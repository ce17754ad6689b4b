use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{HavenError, Result};
use crate::fmt::money;
use crate::matcher::{auto_match, suggest_matches};

pub fn run(account: &str) -> Result<()> {
    let conn = open_db()?;
    let account_id: i64 = conn
        .query_row("SELECT id FROM accounts WHERE name = ?1", [account], |r| r.get(0))
        .map_err(|_| HavenError::UnknownAccount(account.to_string()))?;

    let result = auto_match(&conn, account_id)?;
    println!("{} of {} unmatched transactions auto-matched", result.matched, result.scanned);
    Ok(())
}

pub fn suggest(id: i64) -> Result<()> {
    let conn = open_db()?;
    let (date, description, amount): (String, String, f64) = conn
        .query_row(
            "SELECT date, description, amount FROM bank_transactions WHERE id = ?1",
            [id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .map_err(|_| HavenError::NotFound("transaction", id))?;

    println!("Transaction {id}: {date}  {description}  {}", money(amount));

    let suggestions = suggest_matches(&conn, id)?;
    if suggestions.is_empty() {
        println!("No suggestions above the confidence floor.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Confidence", "Type", "ID", "Candidate", "Amount"]);
    for s in suggestions {
        table.add_row(vec![
            Cell::new(s.confidence),
            Cell::new(s.kind),
            Cell::new(s.id),
            Cell::new(&s.description),
            Cell::new(if s.amount != 0.0 { money(s.amount) } else { String::new() }),
        ]);
    }
    println!("{table}");
    Ok(())
}
