use rusqlite::Connection;

use crate::dates;
use crate::error::{HavenError, Result};
use crate::models::ExpectedPayment;

/// Received amounts under this fraction of the expected amount are partial.
pub const PARTIAL_THRESHOLD: f64 = 0.95;

#[derive(Debug)]
pub struct MarkReceivedResult {
    pub status: String,
    pub variance: f64,
}

fn expected_amount(conn: &Connection, id: i64) -> Result<f64> {
    conn.query_row(
        "SELECT expected_amount FROM expected_payments WHERE id = ?1",
        [id],
        |row| row.get(0),
    )
    .map_err(|_| HavenError::NotFound("expected payment", id))
}

/// Record money against an obligation. The status is derived from the
/// received fraction, never passed in; a linked transaction is marked in
/// the same call so the two sides cannot drift.
pub fn mark_received(
    conn: &Connection,
    id: i64,
    received_amount: f64,
    received_date: &str,
    transaction_id: Option<i64>,
) -> Result<MarkReceivedResult> {
    let expected = expected_amount(conn, id)?;
    // Both rows must exist before either side is touched, so a missing
    // transaction aborts without leaving the obligation half-updated.
    if let Some(tx_id) = transaction_id {
        conn.query_row("SELECT id FROM bank_transactions WHERE id = ?1", [tx_id], |_| Ok(()))
            .map_err(|_| HavenError::NotFound("transaction", tx_id))?;
    }
    let variance = received_amount - expected;
    let status = if received_amount < expected * PARTIAL_THRESHOLD {
        "partial"
    } else {
        "received"
    };

    conn.execute(
        "UPDATE expected_payments SET status = ?1, received_amount = ?2, received_date = ?3, \
         variance = ?4, matched_transaction_id = ?5, updated_at = datetime('now') WHERE id = ?6",
        rusqlite::params![status, received_amount, received_date, variance, transaction_id, id],
    )?;

    if let Some(tx_id) = transaction_id {
        conn.execute(
            "UPDATE bank_transactions SET match_status = 'matched', \
             matched_expected_payment_id = ?1, updated_at = datetime('now') WHERE id = ?2",
            rusqlite::params![id, tx_id],
        )?;
    }

    Ok(MarkReceivedResult {
        status: status.to_string(),
        variance,
    })
}

pub fn cancel(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE expected_payments SET status = 'cancelled', updated_at = datetime('now') \
         WHERE id = ?1",
        [id],
    )?;
    if changed == 0 {
        return Err(HavenError::NotFound("expected payment", id));
    }
    Ok(())
}

/// Flip pending obligations whose expected date has passed to overdue.
/// Safe to run any number of times; only pending rows are touched.
pub fn sweep_overdue(conn: &Connection, today: &str) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE expected_payments SET status = 'overdue', updated_at = datetime('now') \
         WHERE status = 'pending' AND expected_date < ?1",
        [today],
    )?;
    Ok(changed)
}

// ---------------------------------------------------------------------------
// Listing and summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ExpectedFilter {
    pub period: Option<String>,
    pub status: Option<String>,
    pub payment_type: Option<String>,
    pub participant_id: Option<i64>,
    pub limit: Option<usize>,
}

pub fn list(conn: &Connection, filter: &ExpectedFilter) -> Result<Vec<ExpectedPayment>> {
    if let Some(period) = &filter.period {
        dates::parse_period(period)?;
    }
    let mut sql = String::from(
        "SELECT id, payment_type, participant_id, plan_id, property_id, owner_id, \
         expected_amount, expected_date, period_month, period_start, period_end, status, \
         source_type, received_amount, received_date, variance, matched_transaction_id, notes \
         FROM expected_payments WHERE 1=1",
    );
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    if let Some(period) = &filter.period {
        sql.push_str(&format!(" AND period_month = ?{}", params.len() + 1));
        params.push(Box::new(period.clone()));
    }
    if let Some(status) = &filter.status {
        sql.push_str(&format!(" AND status = ?{}", params.len() + 1));
        params.push(Box::new(status.clone()));
    }
    if let Some(payment_type) = &filter.payment_type {
        sql.push_str(&format!(" AND payment_type = ?{}", params.len() + 1));
        params.push(Box::new(payment_type.clone()));
    }
    if let Some(participant_id) = filter.participant_id {
        sql.push_str(&format!(" AND participant_id = ?{}", params.len() + 1));
        params.push(Box::new(participant_id));
    }
    sql.push_str(" ORDER BY expected_date, id");
    if let Some(limit) = filter.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())), |row| {
            Ok(ExpectedPayment {
                id: row.get(0)?,
                payment_type: row.get(1)?,
                participant_id: row.get(2)?,
                plan_id: row.get(3)?,
                property_id: row.get(4)?,
                owner_id: row.get(5)?,
                expected_amount: row.get(6)?,
                expected_date: row.get(7)?,
                period_month: row.get(8)?,
                period_start: row.get(9)?,
                period_end: row.get(10)?,
                status: row.get(11)?,
                source_type: row.get(12)?,
                received_amount: row.get(13)?,
                received_date: row.get(14)?,
                variance: row.get(15)?,
                matched_transaction_id: row.get(16)?,
                notes: row.get(17)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug)]
pub struct SummaryRow {
    pub payment_type: String,
    pub count: i64,
    pub expected_total: f64,
    pub received_total: f64,
    pub outstanding_count: i64,
}

/// Per-type rollup for one period (or all periods when none is given).
/// Cancelled obligations are excluded from the totals.
pub fn summary(conn: &Connection, period: Option<&str>) -> Result<Vec<SummaryRow>> {
    if let Some(p) = period {
        dates::parse_period(p)?;
    }
    let sql = "SELECT payment_type, count(*), sum(expected_amount), \
               coalesce(sum(received_amount), 0), \
               sum(CASE WHEN status IN ('pending', 'overdue') THEN 1 ELSE 0 END) \
               FROM expected_payments \
               WHERE status != 'cancelled' AND (?1 IS NULL OR period_month = ?1) \
               GROUP BY payment_type ORDER BY payment_type";
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([period], |row| {
            Ok(SummaryRow {
                payment_type: row.get(0)?,
                count: row.get(1)?,
                expected_total: row.get(2)?,
                received_total: row.get(3)?,
                outstanding_count: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
