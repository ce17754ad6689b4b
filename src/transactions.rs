use rusqlite::Connection;

use crate::error::{HavenError, Result};
use crate::models::BankTransaction;

pub const CATEGORIES: &[&str] = &[
    "sda_income",
    "rrc_income",
    "owner_payment",
    "maintenance",
    "other_income",
    "other_expense",
    "transfer",
    "uncategorized",
];

fn validate_category(category: &str) -> Result<()> {
    if CATEGORIES.contains(&category) {
        return Ok(());
    }
    Err(HavenError::Other(format!(
        "Unknown category '{category}'. Valid categories: {}",
        CATEGORIES.join(", ")
    )))
}

/// The five things a transaction can be manually matched against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchType {
    Payment,
    OwnerPayment,
    Claim,
    Participant,
    ExpectedPayment,
}

impl MatchType {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "payment" => Ok(Self::Payment),
            "owner-payment" | "owner_payment" => Ok(Self::OwnerPayment),
            "claim" => Ok(Self::Claim),
            "participant" => Ok(Self::Participant),
            "expected-payment" | "expected_payment" => Ok(Self::ExpectedPayment),
            _ => Err(HavenError::Other(format!(
                "Unknown match type '{s}'. Valid types: payment, owner-payment, claim, \
                 participant, expected-payment"
            ))),
        }
    }

    fn fk_column(self) -> &'static str {
        match self {
            Self::Payment => "matched_payment_id",
            Self::OwnerPayment => "matched_owner_payment_id",
            Self::Claim => "matched_claim_id",
            Self::Participant => "matched_participant_id",
            Self::ExpectedPayment => "matched_expected_payment_id",
        }
    }

    /// Category stamped when the caller does not supply one. Expected-payment
    /// matches carry no default; the obligation type already says what it is.
    fn default_category(self) -> Option<&'static str> {
        match self {
            Self::Payment | Self::Claim => Some("sda_income"),
            Self::OwnerPayment => Some("owner_payment"),
            Self::Participant => Some("rrc_income"),
            Self::ExpectedPayment => None,
        }
    }
}

pub fn manual_match(
    conn: &Connection,
    transaction_id: i64,
    match_type: MatchType,
    match_id: i64,
    category: Option<&str>,
) -> Result<()> {
    if let Some(c) = category {
        validate_category(c)?;
    }
    let category = category.or(match_type.default_category());
    let changed = match category {
        Some(c) => conn.execute(
            &format!(
                "UPDATE bank_transactions SET match_status = 'matched', {} = ?1, \
                 category = ?2, updated_at = datetime('now') WHERE id = ?3",
                match_type.fk_column()
            ),
            rusqlite::params![match_id, c, transaction_id],
        )?,
        None => conn.execute(
            &format!(
                "UPDATE bank_transactions SET match_status = 'matched', {} = ?1, \
                 updated_at = datetime('now') WHERE id = ?2",
                match_type.fk_column()
            ),
            rusqlite::params![match_id, transaction_id],
        )?,
    };
    if changed == 0 {
        return Err(HavenError::NotFound("transaction", transaction_id));
    }
    Ok(())
}

/// Clear every match foreign key and the confidence, whichever was set.
pub fn unmatch(conn: &Connection, transaction_id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE bank_transactions SET match_status = 'unmatched', matched_payment_id = NULL, \
         matched_owner_payment_id = NULL, matched_claim_id = NULL, matched_participant_id = NULL, \
         matched_expected_payment_id = NULL, match_confidence = NULL, \
         updated_at = datetime('now') WHERE id = ?1",
        [transaction_id],
    )?;
    if changed == 0 {
        return Err(HavenError::NotFound("transaction", transaction_id));
    }
    Ok(())
}

/// Set the category only; match state is untouched.
pub fn categorize(conn: &Connection, transaction_id: i64, category: &str) -> Result<()> {
    validate_category(category)?;
    let changed = conn.execute(
        "UPDATE bank_transactions SET category = ?1, updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![category, transaction_id],
    )?;
    if changed == 0 {
        return Err(HavenError::NotFound("transaction", transaction_id));
    }
    Ok(())
}

pub fn bulk_categorize(conn: &Connection, transaction_ids: &[i64], category: &str) -> Result<usize> {
    validate_category(category)?;
    let mut updated = 0usize;
    let mut stmt = conn.prepare(
        "UPDATE bank_transactions SET category = ?1, updated_at = datetime('now') WHERE id = ?2",
    )?;
    for id in transaction_ids {
        updated += stmt.execute(rusqlite::params![category, id])?;
    }
    Ok(updated)
}

/// Toggle a transaction in or out of reconciliation views.
pub fn set_excluded(conn: &Connection, transaction_id: i64, excluded: bool) -> Result<()> {
    let status = if excluded { "excluded" } else { "unmatched" };
    let changed = conn.execute(
        "UPDATE bank_transactions SET match_status = ?1, updated_at = datetime('now') WHERE id = ?2",
        rusqlite::params![status, transaction_id],
    )?;
    if changed == 0 {
        return Err(HavenError::NotFound("transaction", transaction_id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TxFilter {
    pub account_id: Option<i64>,
    pub match_status: Option<String>,
    pub category: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: Option<usize>,
}

pub fn list(conn: &Connection, filter: &TxFilter) -> Result<Vec<BankTransaction>> {
    let mut sql = String::from(
        "SELECT id, account_id, date, description, reference, amount, balance, \
         transaction_type, match_status, matched_payment_id, matched_owner_payment_id, \
         matched_claim_id, matched_participant_id, matched_expected_payment_id, \
         match_confidence, category, notes, import_source, import_id \
         FROM bank_transactions WHERE 1=1",
    );
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    if let Some(account_id) = filter.account_id {
        sql.push_str(&format!(" AND account_id = ?{}", params.len() + 1));
        params.push(Box::new(account_id));
    }
    if let Some(match_status) = &filter.match_status {
        sql.push_str(&format!(" AND match_status = ?{}", params.len() + 1));
        params.push(Box::new(match_status.clone()));
    }
    if let Some(category) = &filter.category {
        sql.push_str(&format!(" AND category = ?{}", params.len() + 1));
        params.push(Box::new(category.clone()));
    }
    if let Some(date_from) = &filter.date_from {
        sql.push_str(&format!(" AND date >= ?{}", params.len() + 1));
        params.push(Box::new(date_from.clone()));
    }
    if let Some(date_to) = &filter.date_to {
        sql.push_str(&format!(" AND date <= ?{}", params.len() + 1));
        params.push(Box::new(date_to.clone()));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())), |row| {
            Ok(BankTransaction {
                id: row.get(0)?,
                account_id: row.get(1)?,
                date: row.get(2)?,
                description: row.get(3)?,
                reference: row.get(4)?,
                amount: row.get(5)?,
                balance: row.get(6)?,
                transaction_type: row.get(7)?,
                match_status: row.get(8)?,
                matched_payment_id: row.get(9)?,
                matched_owner_payment_id: row.get(10)?,
                matched_claim_id: row.get(11)?,
                matched_participant_id: row.get(12)?,
                matched_expected_payment_id: row.get(13)?,
                match_confidence: row.get(14)?,
                category: row.get(15)?,
                notes: row.get(16)?,
                import_source: row.get(17)?,
                import_id: row.get(18)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug)]
pub struct CategoryTotal {
    pub category: String,
    pub count: i64,
    pub total: f64,
}

pub fn category_summary(
    conn: &Connection,
    account_id: Option<i64>,
    date_from: Option<&str>,
    date_to: Option<&str>,
) -> Result<Vec<CategoryTotal>> {
    let sql = "SELECT coalesce(category, 'uncategorized'), count(*), sum(amount) \
               FROM bank_transactions \
               WHERE (?1 IS NULL OR account_id = ?1) \
                 AND (?2 IS NULL OR date >= ?2) \
                 AND (?3 IS NULL OR date <= ?3) \
               GROUP BY coalesce(category, 'uncategorized') ORDER BY 1";
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(rusqlite::params![account_id, date_from, date_to], |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                count: row.get(1)?,
                total: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug)]
pub struct BatchUndo {
    pub deleted: usize,
    pub skipped: usize,
}

/// Undo an import batch. Only rows still unmatched are deleted; anything a
/// human or the matcher has touched stays and is reported as skipped.
pub fn delete_import_batch(conn: &Connection, import_id: i64) -> Result<BatchUndo> {
    let total: i64 = conn
        .query_row(
            "SELECT count(*) FROM bank_transactions WHERE import_id = ?1",
            [import_id],
            |r| r.get(0),
        )
        .unwrap_or(0);
    let exists: bool = conn
        .query_row("SELECT 1 FROM imports WHERE id = ?1", [import_id], |_| Ok(true))
        .unwrap_or(false);
    if !exists {
        return Err(HavenError::NotFound("import batch", import_id));
    }

    let deleted = conn.execute(
        "DELETE FROM bank_transactions WHERE import_id = ?1 AND match_status = 'unmatched'",
        [import_id],
    )?;

    Ok(BatchUndo {
        deleted,
        skipped: total as usize - deleted,
    })
}
