use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;

pub fn add(name: &str, email: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    conn.execute(
        "INSERT INTO owners (name, contact_email) VALUES (?1, ?2)",
        rusqlite::params![name, email],
    )?;
    println!("Added owner: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut stmt = conn.prepare(
        "SELECT o.id, o.name, o.contact_email, count(p.id) \
         FROM owners o LEFT JOIN properties p ON p.owner_id = o.id \
         GROUP BY o.id ORDER BY o.id",
    )?;
    let rows: Vec<(i64, String, Option<String>, i64)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Email", "Properties"]);
    for (id, name, email, properties) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(name),
            Cell::new(email.unwrap_or_default()),
            Cell::new(properties),
        ]);
    }
    println!("Owners\n{table}");
    Ok(())
}
