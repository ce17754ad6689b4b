use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{HavenError, Result};
use crate::fmt::money;
use crate::transactions::{self, MatchType, TxFilter};

fn account_id_by_name(conn: &rusqlite::Connection, name: &str) -> Result<i64> {
    conn.query_row("SELECT id FROM accounts WHERE name = ?1", [name], |r| r.get(0))
        .map_err(|_| HavenError::UnknownAccount(name.to_string()))
}

#[allow(clippy::too_many_arguments)]
pub fn list(
    account: Option<&str>,
    status: Option<String>,
    category: Option<String>,
    from: Option<String>,
    to: Option<String>,
    limit: usize,
) -> Result<()> {
    let conn = open_db()?;
    let account_id = match account {
        Some(name) => Some(account_id_by_name(&conn, name)?),
        None => None,
    };
    let filter = TxFilter {
        account_id,
        match_status: status,
        category,
        date_from: from,
        date_to: to,
        limit: Some(limit),
    };
    let rows = transactions::list(&conn, &filter)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Amount", "Status", "Category", "Conf"]);
    for t in &rows {
        let status = match t.match_status.as_str() {
            "matched" => t.match_status.green().to_string(),
            "excluded" => t.match_status.dimmed().to_string(),
            _ => t.match_status.clone(),
        };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.date),
            Cell::new(&t.description),
            Cell::new(money(t.amount)),
            Cell::new(status),
            Cell::new(t.category.as_deref().unwrap_or("")),
            Cell::new(t.match_confidence.map(|c| c.to_string()).unwrap_or_default()),
        ]);
    }
    println!("Transactions ({} shown)\n{table}", rows.len());
    Ok(())
}

pub fn manual_match(id: i64, match_type: &str, match_id: i64, category: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let match_type = MatchType::parse(match_type)?;
    transactions::manual_match(&conn, id, match_type, match_id, category)?;
    println!("Matched transaction {id}");
    Ok(())
}

pub fn unmatch(id: i64) -> Result<()> {
    let conn = open_db()?;
    transactions::unmatch(&conn, id)?;
    println!("Unmatched transaction {id}");
    Ok(())
}

pub fn categorize(ids: &[i64], category: &str) -> Result<()> {
    let conn = open_db()?;
    let updated = transactions::bulk_categorize(&conn, ids, category)?;
    println!("{updated} transaction(s) set to {category}");
    Ok(())
}

pub fn exclude(id: i64, undo: bool) -> Result<()> {
    let conn = open_db()?;
    transactions::set_excluded(&conn, id, !undo)?;
    if undo {
        println!("Transaction {id} back in reconciliation");
    } else {
        println!("Transaction {id} excluded from reconciliation");
    }
    Ok(())
}

pub fn summary(account: Option<&str>, from: Option<&str>, to: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let account_id = match account {
        Some(name) => Some(account_id_by_name(&conn, name)?),
        None => None,
    };
    let rows = transactions::category_summary(&conn, account_id, from, to)?;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Count", "Total"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.category),
            Cell::new(row.count),
            Cell::new(money(row.total)),
        ]);
    }
    println!("Category summary\n{table}");
    Ok(())
}

pub fn undo_import(id: i64) -> Result<()> {
    let conn = open_db()?;
    let result = transactions::delete_import_batch(&conn, id)?;
    println!("{} deleted, {} matched rows skipped", result.deleted, result.skipped);
    Ok(())
}
