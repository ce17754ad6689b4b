use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{HavenError, Result};

pub fn add(first_name: &str, last_name: &str, ndis: &str, property: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let property_id: Option<i64> = match property {
        Some(property_name) => Some(
            conn.query_row("SELECT id FROM properties WHERE name = ?1", [property_name], |r| r.get(0))
                .map_err(|_| HavenError::Other(format!("Unknown property: {property_name}")))?,
        ),
        None => None,
    };
    conn.execute(
        "INSERT INTO participants (first_name, last_name, ndis_number, property_id) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![first_name, last_name, ndis, property_id],
    )?;
    println!("Added participant: {first_name} {last_name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut stmt = conn.prepare(
        "SELECT pa.id, pa.first_name || ' ' || pa.last_name, pa.ndis_number, pr.name, pa.status \
         FROM participants pa LEFT JOIN properties pr ON pr.id = pa.property_id ORDER BY pa.id",
    )?;
    let rows: Vec<(i64, String, String, Option<String>, String)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "NDIS Number", "Property", "Status"]);
    for (id, name, ndis, property, status) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(name),
            Cell::new(ndis),
            Cell::new(property.unwrap_or_default()),
            Cell::new(status),
        ]);
    }
    println!("Participants\n{table}");
    Ok(())
}

pub fn deactivate(id: i64) -> Result<()> {
    let conn = open_db()?;
    let changed = conn.execute("UPDATE participants SET status = 'inactive' WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(HavenError::NotFound("participant", id));
    }
    println!("Deactivated participant {id}");
    Ok(())
}
