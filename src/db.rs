use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    bank_name TEXT,
    last_four TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS owners (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    contact_email TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS properties (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    owner_id INTEGER,
    management_fee_percent REAL DEFAULT 0,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (owner_id) REFERENCES owners(id)
);

CREATE TABLE IF NOT EXISTS participants (
    id INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    ndis_number TEXT NOT NULL,
    property_id INTEGER,
    status TEXT NOT NULL DEFAULT 'active',
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (property_id) REFERENCES properties(id)
);

CREATE TABLE IF NOT EXISTS plans (
    id INTEGER PRIMARY KEY,
    participant_id INTEGER NOT NULL,
    monthly_sda_amount REAL,
    annual_sda_budget REAL NOT NULL DEFAULT 0,
    claim_day INTEGER,
    rent_contribution REAL,
    rent_frequency TEXT,
    plan_status TEXT NOT NULL DEFAULT 'current',
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (participant_id) REFERENCES participants(id)
);

CREATE TABLE IF NOT EXISTS owner_payments (
    id INTEGER PRIMARY KEY,
    owner_id INTEGER NOT NULL,
    property_id INTEGER,
    amount REAL NOT NULL,
    payment_date TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (owner_id) REFERENCES owners(id),
    FOREIGN KEY (property_id) REFERENCES properties(id)
);

CREATE TABLE IF NOT EXISTS expected_payments (
    id INTEGER PRIMARY KEY,
    payment_type TEXT NOT NULL,
    participant_id INTEGER,
    plan_id INTEGER,
    property_id INTEGER,
    owner_id INTEGER,
    expected_amount REAL NOT NULL,
    expected_date TEXT NOT NULL,
    period_month TEXT NOT NULL,
    period_start TEXT,
    period_end TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    source_type TEXT NOT NULL DEFAULT 'manual',
    received_amount REAL,
    received_date TEXT,
    variance REAL,
    matched_transaction_id INTEGER,
    notes TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (participant_id) REFERENCES participants(id),
    FOREIGN KEY (plan_id) REFERENCES plans(id),
    FOREIGN KEY (property_id) REFERENCES properties(id),
    FOREIGN KEY (owner_id) REFERENCES owners(id)
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT,
    account_id INTEGER NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    checksum TEXT,
    source TEXT NOT NULL,
    FOREIGN KEY (account_id) REFERENCES accounts(id)
);

CREATE TABLE IF NOT EXISTS bank_transactions (
    id INTEGER PRIMARY KEY,
    account_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    reference TEXT,
    amount REAL NOT NULL,
    balance REAL,
    transaction_type TEXT NOT NULL,
    match_status TEXT NOT NULL DEFAULT 'unmatched',
    matched_payment_id INTEGER,
    matched_owner_payment_id INTEGER,
    matched_claim_id INTEGER,
    matched_participant_id INTEGER,
    matched_expected_payment_id INTEGER,
    match_confidence INTEGER,
    category TEXT,
    notes TEXT,
    import_source TEXT,
    import_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (account_id) REFERENCES accounts(id),
    FOREIGN KEY (import_id) REFERENCES imports(id)
);

CREATE INDEX IF NOT EXISTS idx_expected_period ON expected_payments(period_month);
CREATE INDEX IF NOT EXISTS idx_expected_status ON expected_payments(status);
CREATE INDEX IF NOT EXISTS idx_tx_account ON bank_transactions(account_id);
CREATE INDEX IF NOT EXISTS idx_tx_match_status ON bank_transactions(match_status);
CREATE INDEX IF NOT EXISTS idx_tx_import ON bank_transactions(import_id);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
