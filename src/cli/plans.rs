use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{HavenError, Result};
use crate::fmt::money;

pub fn add(
    participant: i64,
    monthly: Option<f64>,
    annual: Option<f64>,
    claim_day: Option<u32>,
    rent: Option<f64>,
    frequency: Option<&str>,
) -> Result<()> {
    if monthly.is_none() && annual.is_none() && rent.is_none() {
        return Err(HavenError::Other(
            "A plan needs at least one of --monthly, --annual, or --rent".to_string(),
        ));
    }
    if let Some(f) = frequency {
        if !matches!(f, "weekly" | "fortnightly" | "monthly") {
            return Err(HavenError::Other(format!(
                "Unknown rent frequency '{f}'. Valid: weekly, fortnightly, monthly"
            )));
        }
    }
    let conn = open_db()?;
    let exists: bool = conn
        .query_row("SELECT 1 FROM participants WHERE id = ?1", [participant], |_| Ok(true))
        .unwrap_or(false);
    if !exists {
        return Err(HavenError::NotFound("participant", participant));
    }
    conn.execute(
        "INSERT INTO plans (participant_id, monthly_sda_amount, annual_sda_budget, claim_day, \
         rent_contribution, rent_frequency) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![participant, monthly, annual.unwrap_or(0.0), claim_day, rent, frequency],
    )?;
    println!("Added plan for participant {participant}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut stmt = conn.prepare(
        "SELECT pl.id, pa.first_name || ' ' || pa.last_name, pl.monthly_sda_amount, \
         pl.annual_sda_budget, pl.claim_day, pl.rent_contribution, pl.rent_frequency, pl.plan_status \
         FROM plans pl JOIN participants pa ON pa.id = pl.participant_id ORDER BY pl.id",
    )?;
    #[allow(clippy::type_complexity)]
    let rows: Vec<(i64, String, Option<f64>, f64, Option<u32>, Option<f64>, Option<String>, String)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Participant", "Monthly SDA", "Annual SDA", "Claim Day", "Rent", "Status"]);
    for (id, participant, monthly, annual, claim_day, rent, frequency, status) in rows {
        let rent_label = match (rent, frequency) {
            (Some(amount), Some(freq)) => format!("{} {freq}", money(amount)),
            (Some(amount), None) => money(amount),
            _ => String::new(),
        };
        table.add_row(vec![
            Cell::new(id),
            Cell::new(participant),
            Cell::new(monthly.map(money).unwrap_or_default()),
            Cell::new(if annual > 0.0 { money(annual) } else { String::new() }),
            Cell::new(claim_day.map(|d| d.to_string()).unwrap_or_default()),
            Cell::new(rent_label),
            Cell::new(status),
        ]);
    }
    println!("Plans\n{table}");
    Ok(())
}
