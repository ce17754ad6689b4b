use std::path::PathBuf;

use crate::cli::open_db;
use crate::error::{HavenError, Result};
use crate::importer::import_file;
use crate::matcher::auto_match;

pub fn run(file: &str, account: &str, format: Option<&str>, no_match: bool) -> Result<()> {
    let file_path = PathBuf::from(file);
    let conn = open_db()?;

    let result = import_file(&conn, &file_path, account, format)?;

    if result.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    println!(
        "{} imported, {} skipped (duplicates), batch {}",
        result.imported, result.duplicates, result.import_id
    );

    if no_match {
        return Ok(());
    }

    let account_id: i64 = conn
        .query_row("SELECT id FROM accounts WHERE name = ?1", [account], |r| r.get(0))
        .map_err(|_| HavenError::UnknownAccount(account.to_string()))?;
    let matched = auto_match(&conn, account_id)?;
    println!("{} of {} unmatched transactions auto-matched", matched.matched, matched.scanned);

    Ok(())
}
