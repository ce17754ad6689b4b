use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;

pub fn add(name: &str, bank: Option<&str>, last_four: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    conn.execute(
        "INSERT INTO accounts (name, bank_name, last_four) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, bank, last_four],
    )?;
    println!("Added account: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut stmt = conn.prepare("SELECT id, name, bank_name, last_four FROM accounts")?;
    let rows: Vec<(i64, String, Option<String>, Option<String>)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Bank", "Last Four"]);
    for (id, name, bank, last) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(name),
            Cell::new(bank.unwrap_or_default()),
            Cell::new(last.unwrap_or_default()),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}
