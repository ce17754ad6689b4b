use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{HavenError, Result};

pub fn add(name: &str, owner: Option<&str>, fee: f64) -> Result<()> {
    let conn = open_db()?;
    let owner_id: Option<i64> = match owner {
        Some(owner_name) => Some(
            conn.query_row("SELECT id FROM owners WHERE name = ?1", [owner_name], |r| r.get(0))
                .map_err(|_| HavenError::Other(format!("Unknown owner: {owner_name}")))?,
        ),
        None => None,
    };
    conn.execute(
        "INSERT INTO properties (name, owner_id, management_fee_percent) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, owner_id, fee],
    )?;
    println!("Added property: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, o.name, p.management_fee_percent, p.is_active \
         FROM properties p LEFT JOIN owners o ON o.id = p.owner_id ORDER BY p.id",
    )?;
    let rows: Vec<(i64, String, Option<String>, f64, bool)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Owner", "Fee %", "Active"]);
    for (id, name, owner, fee, active) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(name),
            Cell::new(owner.unwrap_or_default()),
            Cell::new(format!("{fee:.1}")),
            Cell::new(if active { "yes" } else { "no" }),
        ]);
    }
    println!("Properties\n{table}");
    Ok(())
}

pub fn deactivate(id: i64) -> Result<()> {
    let conn = open_db()?;
    let changed = conn.execute("UPDATE properties SET is_active = 0 WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(HavenError::NotFound("property", id));
    }
    println!("Deactivated property {id}");
    Ok(())
}
