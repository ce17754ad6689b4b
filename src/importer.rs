use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::{HavenError, Result};
use crate::models::ParsedRow;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -inner.trim().parse::<f64>().unwrap_or(0.0);
    }
    s.parse().unwrap_or(0.0)
}

/// Australian bank exports use DD/MM/YYYY.
pub fn parse_date_dmy(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let d: u32 = parts[0].parse().ok()?;
    let m: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    chrono::NaiveDate::from_ymd_opt(y, m, d).map(|dt| dt.format("%Y-%m-%d").to_string())
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn is_duplicate_row(conn: &Connection, account_id: i64, row: &ParsedRow) -> bool {
    let mut stmt = conn
        .prepare_cached(
            "SELECT 1 FROM bank_transactions WHERE account_id = ?1 AND date = ?2 AND amount = ?3 AND description = ?4",
        )
        .unwrap();
    stmt.exists(rusqlite::params![account_id, row.date, row.amount, row.description])
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Bank formats: enum dispatch instead of trait objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BankFormat {
    Anz,
    Westpac,
}

impl BankFormat {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Anz => "anz",
            Self::Westpac => "westpac",
        }
    }

    /// Tag recorded as import provenance on each transaction.
    pub fn source(&self) -> &'static str {
        match self {
            Self::Anz => "csv_anz",
            Self::Westpac => "csv_westpac",
        }
    }

    #[allow(dead_code)]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Anz => "ANZ",
            Self::Westpac => "Westpac",
        }
    }

    pub fn detect(&self, file_path: &Path) -> bool {
        match self {
            Self::Anz => detect_anz(file_path),
            Self::Westpac => detect_westpac(file_path),
        }
    }

    pub fn parse(&self, file_path: &Path) -> Result<Vec<ParsedRow>> {
        match self {
            Self::Anz => parse_anz(file_path),
            Self::Westpac => parse_westpac(file_path),
        }
    }
}

const ALL_FORMATS: &[BankFormat] = &[BankFormat::Anz, BankFormat::Westpac];

pub fn get_by_key(key: &str) -> Option<BankFormat> {
    ALL_FORMATS.iter().find(|f| f.key() == key).copied()
}

pub fn get_for_file(file_path: &Path) -> Option<BankFormat> {
    ALL_FORMATS.iter().find(|f| f.detect(file_path)).copied()
}

// ---------------------------------------------------------------------------
// import_rows: the import entry point over pre-parsed rows
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ImportResult {
    pub imported: usize,
    pub duplicates: usize,
    pub import_id: i64,
    pub duplicate_file: bool,
}

/// Insert pre-parsed rows for one account, skipping any row that already
/// exists with the same (date, amount, description). Duplicates are counted,
/// never rejected. Returns the batch id so the import can be undone later.
pub fn import_rows(
    conn: &Connection,
    account_id: i64,
    source: &str,
    filename: Option<&str>,
    checksum: Option<&str>,
    rows: &[ParsedRow],
) -> Result<ImportResult> {
    conn.execute(
        "INSERT INTO imports (filename, account_id, record_count, checksum, source) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![filename, account_id, rows.len() as i64, checksum, source],
    )?;
    let import_id = conn.last_insert_rowid();

    let mut imported = 0usize;
    let mut duplicates = 0usize;
    for row in rows {
        if is_duplicate_row(conn, account_id, row) {
            duplicates += 1;
            continue;
        }
        let transaction_type = if row.amount >= 0.0 { "credit" } else { "debit" };
        conn.execute(
            "INSERT INTO bank_transactions (account_id, date, description, reference, amount, balance, transaction_type, match_status, import_source, import_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'unmatched', ?8, ?9)",
            rusqlite::params![
                account_id,
                row.date,
                row.description,
                row.reference,
                row.amount,
                row.balance,
                transaction_type,
                source,
                import_id,
            ],
        )?;
        imported += 1;
    }

    Ok(ImportResult {
        imported,
        duplicates,
        import_id,
        duplicate_file: false,
    })
}

/// Parse a bank CSV and import it. A file whose checksum has already been
/// imported for this account is short-circuited without touching rows.
pub fn import_file(
    conn: &Connection,
    file_path: &Path,
    account_name: &str,
    format_key: Option<&str>,
) -> Result<ImportResult> {
    let account_id: i64 = conn
        .query_row("SELECT id FROM accounts WHERE name = ?1", [account_name], |row| row.get(0))
        .map_err(|_| HavenError::UnknownAccount(account_name.to_string()))?;

    let checksum = compute_checksum(file_path)?;
    {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1 AND account_id = ?2")?;
        if stmt.exists(rusqlite::params![checksum, account_id])? {
            return Ok(ImportResult {
                imported: 0,
                duplicates: 0,
                import_id: 0,
                duplicate_file: true,
            });
        }
    }

    let format = if let Some(key) = format_key {
        get_by_key(key).ok_or_else(|| HavenError::UnknownFormat(key.to_string()))?
    } else {
        get_for_file(file_path)
            .ok_or_else(|| HavenError::Other("could not detect bank format; pass --format".to_string()))?
    };

    let rows = format.parse(file_path)?;
    let filename = file_path.file_name().and_then(|n| n.to_str());
    import_rows(conn, account_id, format.source(), filename, Some(&checksum), &rows)
}

// ---------------------------------------------------------------------------
// ANZ parser: Date,Amount,Description[,Balance]
// ---------------------------------------------------------------------------

fn detect_anz(file_path: &Path) -> bool {
    let Ok(file) = std::fs::File::open(file_path) else {
        return false;
    };
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    for result in rdr.records().take(5) {
        let Ok(record) = result else { continue };
        if record.len() >= 3 && record[0].trim() == "Date" && record[1].trim() == "Amount" {
            return true;
        }
        // Headerless export: first field parses as DD/MM/YYYY, second as amount
        if record.len() >= 3
            && parse_date_dmy(&record[0]).is_some()
            && record[1].replace(',', "").trim().parse::<f64>().is_ok()
        {
            return true;
        }
    }
    false
}

fn parse_anz(file_path: &Path) -> Result<Vec<ParsedRow>> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut rows = Vec::new();

    for result in rdr.records() {
        let Ok(record) = result else { continue };
        if record.len() < 3 || record[0].trim() == "Date" {
            continue;
        }
        let Some(date) = parse_date_dmy(&record[0]) else {
            continue;
        };
        let description = record[2].trim().to_string();
        if description.is_empty() {
            continue;
        }
        let amount = parse_amount(&record[1]);
        let balance = record
            .get(3)
            .filter(|b| !b.trim().is_empty())
            .map(parse_amount);
        rows.push(ParsedRow {
            date,
            description,
            reference: None,
            amount,
            balance,
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Westpac parser: Date,Narration,Debit,Credit[,Balance]
// ---------------------------------------------------------------------------

fn detect_westpac(file_path: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(file_path) else {
        return false;
    };
    content.lines().next().map_or(false, |l| l.contains("Narration"))
}

fn parse_westpac(file_path: &Path) -> Result<Vec<ParsedRow>> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut rows = Vec::new();
    let mut found_header = false;
    let (mut idx_date, mut idx_desc, mut idx_debit, mut idx_credit, mut idx_balance) =
        (0, 1, 2, 3, 4);

    for result in rdr.records() {
        let record = result?;
        if !found_header {
            if record.iter().any(|f| f.trim() == "Narration") {
                for (i, field) in record.iter().enumerate() {
                    match field.trim() {
                        "Date" => idx_date = i,
                        "Narration" => idx_desc = i,
                        "Debit" => idx_debit = i,
                        "Credit" => idx_credit = i,
                        "Balance" => idx_balance = i,
                        _ => {}
                    }
                }
                found_header = true;
            }
            continue;
        }
        if record.len() <= idx_desc {
            continue;
        }
        let Some(date) = parse_date_dmy(&record[idx_date]) else {
            continue;
        };
        let description = record[idx_desc].trim().to_string();
        if description.is_empty() {
            continue;
        }
        let debit = record.get(idx_debit).map(parse_amount).unwrap_or(0.0);
        let credit = record.get(idx_credit).map(parse_amount).unwrap_or(0.0);
        let amount = if credit != 0.0 { credit.abs() } else { -debit.abs() };
        if amount == 0.0 {
            continue;
        }
        let balance = record
            .get(idx_balance)
            .filter(|b| !b.trim().is_empty())
            .map(parse_amount);
        rows.push(ParsedRow {
            date,
            description,
            reference: None,
            amount,
            balance,
        });
    }
    Ok(rows)
}
