use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_db, today};
use crate::error::Result;
use crate::expected::{self, ExpectedFilter};
use crate::fmt::money;

pub fn list(
    period: Option<String>,
    status: Option<String>,
    payment_type: Option<String>,
    participant: Option<i64>,
) -> Result<()> {
    let conn = open_db()?;
    let filter = ExpectedFilter {
        period,
        status,
        payment_type,
        participant_id: participant,
        limit: None,
    };
    let rows = expected::list(&conn, &filter)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Type", "Expected", "Date", "Period", "Status", "Received", "Variance"]);
    for ep in &rows {
        let status = match ep.status.as_str() {
            "received" => ep.status.green().to_string(),
            "overdue" => ep.status.red().to_string(),
            "partial" => ep.status.yellow().to_string(),
            "cancelled" => ep.status.dimmed().to_string(),
            _ => ep.status.clone(),
        };
        table.add_row(vec![
            Cell::new(ep.id),
            Cell::new(&ep.payment_type),
            Cell::new(money(ep.expected_amount)),
            Cell::new(&ep.expected_date),
            Cell::new(&ep.period_month),
            Cell::new(status),
            Cell::new(ep.received_amount.map(money).unwrap_or_default()),
            Cell::new(ep.variance.map(money).unwrap_or_default()),
        ]);
    }
    println!("Expected payments ({})\n{table}", rows.len());
    Ok(())
}

pub fn received(id: i64, amount: f64, date: Option<String>, transaction: Option<i64>) -> Result<()> {
    let conn = open_db()?;
    let date = date.unwrap_or_else(today);
    let result = expected::mark_received(&conn, id, amount, &date, transaction)?;
    println!(
        "Expected payment {id}: {} ({} variance)",
        result.status,
        money(result.variance)
    );
    Ok(())
}

pub fn cancel(id: i64) -> Result<()> {
    let conn = open_db()?;
    expected::cancel(&conn, id)?;
    println!("Cancelled expected payment {id}");
    Ok(())
}

pub fn overdue(as_of: Option<String>) -> Result<()> {
    let conn = open_db()?;
    let as_of = as_of.unwrap_or_else(today);
    let swept = expected::sweep_overdue(&conn, &as_of)?;
    println!("{swept} expected payment(s) marked overdue as of {as_of}");
    Ok(())
}

pub fn summary(period: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let rows = expected::summary(&conn, period)?;

    let mut table = Table::new();
    table.set_header(vec!["Type", "Count", "Expected", "Received", "Outstanding"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.payment_type),
            Cell::new(row.count),
            Cell::new(money(row.expected_total)),
            Cell::new(money(row.received_total)),
            Cell::new(row.outstanding_count),
        ]);
    }
    match period {
        Some(p) => println!("Expected payments for {p}\n{table}"),
        None => println!("Expected payments (all periods)\n{table}"),
    }
    Ok(())
}
