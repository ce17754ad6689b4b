use rusqlite::Connection;

use crate::dates;
use crate::error::Result;
use crate::models::{Participant, Plan, Property};

pub const DEFAULT_CLAIM_DAY: u32 = 15;
pub const DEFAULT_OWNER_PAYMENT_DAY: u32 = 5;

pub struct GenerateResult {
    pub sda_created: usize,
    pub rrc_created: usize,
    pub owner_created: usize,
}

impl GenerateResult {
    pub fn total(&self) -> usize {
        self.sda_created + self.rrc_created + self.owner_created
    }
}

// ---------------------------------------------------------------------------
// Row loading
// ---------------------------------------------------------------------------

/// Active participants paired with their current plan. A participant with no
/// current plan does not appear; one row per participant (lowest plan id wins
/// if data ever holds more than one current plan).
fn active_participants_with_plans(conn: &Connection) -> Result<Vec<(Participant, Plan)>> {
    let mut stmt = conn.prepare(
        "SELECT pa.id, pa.first_name, pa.last_name, pa.ndis_number, pa.property_id, pa.status, \
                pl.id, pl.participant_id, pl.monthly_sda_amount, pl.annual_sda_budget, \
                pl.claim_day, pl.rent_contribution, pl.rent_frequency, pl.plan_status \
         FROM participants pa JOIN plans pl ON pl.participant_id = pa.id \
         WHERE pa.status = 'active' AND pl.plan_status = 'current' \
         ORDER BY pa.id, pl.id",
    )?;
    let rows: Vec<(Participant, Plan)> = stmt
        .query_map([], |row| {
            Ok((
                Participant {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    ndis_number: row.get(3)?,
                    property_id: row.get(4)?,
                    status: row.get(5)?,
                },
                Plan {
                    id: row.get(6)?,
                    participant_id: row.get(7)?,
                    monthly_sda_amount: row.get(8)?,
                    annual_sda_budget: row.get(9)?,
                    claim_day: row.get(10)?,
                    rent_contribution: row.get(11)?,
                    rent_frequency: row.get(12)?,
                    plan_status: row.get(13)?,
                },
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut result: Vec<(Participant, Plan)> = Vec::with_capacity(rows.len());
    for (participant, plan) in rows {
        if result.last().map_or(true, |(p, _)| p.id != participant.id) {
            result.push((participant, plan));
        }
    }
    Ok(result)
}

fn active_properties(conn: &Connection) -> Result<Vec<Property>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, owner_id, management_fee_percent, is_active \
         FROM properties WHERE is_active = 1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Property {
                id: row.get(0)?,
                name: row.get(1)?,
                owner_id: row.get(2)?,
                management_fee_percent: row.get(3)?,
                is_active: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn participant_expected_exists(
    conn: &Connection,
    participant_id: i64,
    period: &str,
    payment_type: &str,
) -> Result<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM expected_payments \
         WHERE participant_id = ?1 AND period_month = ?2 AND payment_type = ?3",
    )?;
    Ok(stmt.exists(rusqlite::params![participant_id, period, payment_type])?)
}

fn owner_expected_exists(conn: &Connection, property_id: i64, period: &str) -> Result<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM expected_payments \
         WHERE property_id = ?1 AND period_month = ?2 AND payment_type = 'owner_disbursement'",
    )?;
    Ok(stmt.exists(rusqlite::params![property_id, period])?)
}

// ---------------------------------------------------------------------------
// Generators: one per payment category, each idempotent per period
// ---------------------------------------------------------------------------

/// Expected SDA funding income for the period: one row per active participant
/// with a current plan and a non-zero monthly amount. Expected on the plan's
/// claim day (default 15).
pub fn generate_sda(conn: &Connection, period: &str) -> Result<usize> {
    let period_start = dates::period_start(period)?;
    let period_end = dates::period_end(period)?;
    let mut created = 0usize;

    for (participant, plan) in active_participants_with_plans(conn)? {
        let amount = plan.monthly_sda();
        if amount == 0.0 {
            continue;
        }
        if participant_expected_exists(conn, participant.id, period, "sda_income")? {
            continue;
        }
        let claim_day = plan.claim_day.unwrap_or(DEFAULT_CLAIM_DAY);
        let expected_date = dates::day_in_period(period, claim_day);
        conn.execute(
            "INSERT INTO expected_payments (payment_type, participant_id, plan_id, property_id, \
             expected_amount, expected_date, period_month, period_start, period_end, status, source_type) \
             VALUES ('sda_income', ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'pending', 'auto_generated')",
            rusqlite::params![
                participant.id,
                plan.id,
                participant.property_id,
                amount,
                expected_date,
                period,
                period_start,
                period_end,
            ],
        )?;
        created += 1;
    }
    Ok(created)
}

/// Expected rent contributions for the period. Contributions accrue through
/// the month, so the expected date is the period end.
pub fn generate_rrc(conn: &Connection, period: &str) -> Result<usize> {
    let period_start = dates::period_start(period)?;
    let period_end = dates::period_end(period)?;
    let mut created = 0usize;

    for (participant, plan) in active_participants_with_plans(conn)? {
        let Some(amount) = plan.monthly_rent_contribution() else {
            continue;
        };
        if participant_expected_exists(conn, participant.id, period, "rrc_income")? {
            continue;
        }
        conn.execute(
            "INSERT INTO expected_payments (payment_type, participant_id, plan_id, property_id, \
             expected_amount, expected_date, period_month, period_start, period_end, status, source_type) \
             VALUES ('rrc_income', ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'pending', 'auto_generated')",
            rusqlite::params![
                participant.id,
                plan.id,
                participant.property_id,
                amount,
                period_end,
                period,
                period_start,
                period_end,
            ],
        )?;
        created += 1;
    }
    Ok(created)
}

/// Expected owner disbursements: per active property, the total income of its
/// active participants less the management fee. Skipped when the total is
/// zero or negative.
pub fn generate_owner(conn: &Connection, period: &str, payment_day: u32) -> Result<usize> {
    dates::parse_period(period)?;
    let participants = active_participants_with_plans(conn)?;
    let mut created = 0usize;

    for property in active_properties(conn)? {
        if owner_expected_exists(conn, property.id, period)? {
            continue;
        }
        let mut total = 0.0;
        for (participant, plan) in &participants {
            if participant.property_id != Some(property.id) {
                continue;
            }
            let income = plan.monthly_sda() + plan.monthly_rent_contribution().unwrap_or(0.0);
            total += income * (1.0 - property.management_fee_percent / 100.0);
        }
        if total <= 0.0 {
            continue;
        }
        let expected_date = dates::day_in_period(period, payment_day);
        conn.execute(
            "INSERT INTO expected_payments (payment_type, property_id, owner_id, \
             expected_amount, expected_date, period_month, status, source_type) \
             VALUES ('owner_disbursement', ?1, ?2, ?3, ?4, ?5, 'pending', 'auto_generated')",
            rusqlite::params![property.id, property.owner_id, total, expected_date, period],
        )?;
        created += 1;
    }
    Ok(created)
}

/// All three categories for an explicit period. The "current month" scheduled
/// variant is the caller computing the period and passing it in.
pub fn generate_all(conn: &Connection, period: &str, payment_day: u32) -> Result<GenerateResult> {
    Ok(GenerateResult {
        sda_created: generate_sda(conn, period)?,
        rrc_created: generate_rrc(conn, period)?,
        owner_created: generate_owner(conn, period, payment_day)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn add_owner(conn: &Connection, name: &str) -> i64 {
        conn.execute("INSERT INTO owners (name) VALUES (?1)", [name]).unwrap();
        conn.last_insert_rowid()
    }

    fn add_property(conn: &Connection, name: &str, owner_id: i64, fee: f64) -> i64 {
        conn.execute(
            "INSERT INTO properties (name, owner_id, management_fee_percent) VALUES (?1, ?2, ?3)",
            rusqlite::params![name, owner_id, fee],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn add_participant(conn: &Connection, first: &str, last: &str, property_id: Option<i64>) -> i64 {
        let existing: i64 = conn
            .query_row("SELECT count(*) FROM participants", [], |r| r.get(0))
            .unwrap();
        conn.execute(
            "INSERT INTO participants (first_name, last_name, ndis_number, property_id) \
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![first, last, format!("43{:07}", existing + 1), property_id],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[allow(clippy::too_many_arguments)]
    fn add_plan(
        conn: &Connection,
        participant_id: i64,
        monthly: Option<f64>,
        annual: f64,
        claim_day: Option<u32>,
        rent: Option<f64>,
        freq: Option<&str>,
    ) -> i64 {
        conn.execute(
            "INSERT INTO plans (participant_id, monthly_sda_amount, annual_sda_budget, claim_day, \
             rent_contribution, rent_frequency) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![participant_id, monthly, annual, claim_day, rent, freq],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn seed_basic(conn: &Connection) -> (i64, i64) {
        let owner = add_owner(conn, "J. Chen");
        let property = add_property(conn, "12 Banksia St", owner, 10.0);
        let participant = add_participant(conn, "Jane", "Citizen", Some(property));
        add_plan(conn, participant, Some(3000.0), 36000.0, Some(15), Some(100.0), Some("weekly"));
        (property, participant)
    }

    #[test]
    fn test_generate_all_creates_three_categories() {
        let (_dir, conn) = test_db();
        seed_basic(&conn);
        let result = generate_all(&conn, "2025-03", 5).unwrap();
        assert_eq!(result.sda_created, 1);
        assert_eq!(result.rrc_created, 1);
        assert_eq!(result.owner_created, 1);
        assert_eq!(result.total(), 3);
    }

    #[test]
    fn test_generate_all_is_idempotent() {
        let (_dir, conn) = test_db();
        seed_basic(&conn);
        generate_all(&conn, "2025-03", 5).unwrap();
        let second = generate_all(&conn, "2025-03", 5).unwrap();
        assert_eq!(second.sda_created, 0);
        assert_eq!(second.rrc_created, 0);
        assert_eq!(second.owner_created, 0);
        let count: i64 = conn
            .query_row("SELECT count(*) FROM expected_payments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_distinct_periods_both_generate() {
        let (_dir, conn) = test_db();
        seed_basic(&conn);
        generate_all(&conn, "2025-03", 5).unwrap();
        let next = generate_all(&conn, "2025-04", 5).unwrap();
        assert_eq!(next.total(), 3);
    }

    #[test]
    fn test_sda_expected_date_uses_claim_day() {
        let (_dir, conn) = test_db();
        let participant = add_participant(&conn, "Paul", "Mason", None);
        add_plan(&conn, participant, Some(2000.0), 0.0, Some(20), None, None);
        generate_sda(&conn, "2025-03").unwrap();
        let date: String = conn
            .query_row(
                "SELECT expected_date FROM expected_payments WHERE payment_type = 'sda_income'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(date, "2025-03-20");
    }

    #[test]
    fn test_sda_claim_day_defaults_to_15() {
        let (_dir, conn) = test_db();
        let participant = add_participant(&conn, "Paul", "Mason", None);
        add_plan(&conn, participant, Some(2000.0), 0.0, None, None, None);
        generate_sda(&conn, "2025-03").unwrap();
        let date: String = conn
            .query_row("SELECT expected_date FROM expected_payments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(date, "2025-03-15");
    }

    #[test]
    fn test_sda_falls_back_to_annual_budget() {
        let (_dir, conn) = test_db();
        let participant = add_participant(&conn, "Paul", "Mason", None);
        add_plan(&conn, participant, None, 24000.0, None, None, None);
        generate_sda(&conn, "2025-03").unwrap();
        let amount: f64 = conn
            .query_row("SELECT expected_amount FROM expected_payments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(amount, 2000.0);
    }

    #[test]
    fn test_sda_sets_period_bounds() {
        let (_dir, conn) = test_db();
        seed_basic(&conn);
        generate_sda(&conn, "2025-02").unwrap();
        let (start, end): (String, String) = conn
            .query_row(
                "SELECT period_start, period_end FROM expected_payments WHERE payment_type = 'sda_income'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(start, "2025-02-01");
        assert_eq!(end, "2025-02-28");
    }

    #[test]
    fn test_rrc_expected_date_is_period_end() {
        let (_dir, conn) = test_db();
        seed_basic(&conn);
        generate_rrc(&conn, "2025-04").unwrap();
        let date: String = conn
            .query_row(
                "SELECT expected_date FROM expected_payments WHERE payment_type = 'rrc_income'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(date, "2025-04-30");
    }

    #[test]
    fn test_rrc_weekly_amount_normalized() {
        let (_dir, conn) = test_db();
        seed_basic(&conn); // $100/week
        generate_rrc(&conn, "2025-03").unwrap();
        let amount: f64 = conn
            .query_row(
                "SELECT expected_amount FROM expected_payments WHERE payment_type = 'rrc_income'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!((amount - 433.33).abs() < 0.01, "got {amount}");
    }

    #[test]
    fn test_rrc_skipped_when_no_contribution() {
        let (_dir, conn) = test_db();
        let participant = add_participant(&conn, "Paul", "Mason", None);
        add_plan(&conn, participant, Some(2000.0), 0.0, None, None, None);
        let created = generate_rrc(&conn, "2025-03").unwrap();
        assert_eq!(created, 0);
    }

    #[test]
    fn test_participant_without_plan_skipped_silently() {
        let (_dir, conn) = test_db();
        add_participant(&conn, "No", "Plan", None);
        let result = generate_all(&conn, "2025-03", 5).unwrap();
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_inactive_participant_skipped() {
        let (_dir, conn) = test_db();
        let (_, participant) = seed_basic(&conn);
        conn.execute("UPDATE participants SET status = 'exited' WHERE id = ?1", [participant])
            .unwrap();
        let result = generate_all(&conn, "2025-03", 5).unwrap();
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_expired_plan_skipped() {
        let (_dir, conn) = test_db();
        let participant = add_participant(&conn, "Paul", "Mason", None);
        let plan = add_plan(&conn, participant, Some(2000.0), 0.0, None, None, None);
        conn.execute("UPDATE plans SET plan_status = 'expired' WHERE id = ?1", [plan]).unwrap();
        assert_eq!(generate_sda(&conn, "2025-03").unwrap(), 0);
    }

    #[test]
    fn test_owner_disbursement_applies_management_fee() {
        let (_dir, conn) = test_db();
        seed_basic(&conn); // $3000 SDA + ~$433.33 RRC, 10% fee
        let created = generate_owner(&conn, "2025-03", 5).unwrap();
        assert_eq!(created, 1);
        let (amount, date): (f64, String) = conn
            .query_row(
                "SELECT expected_amount, expected_date FROM expected_payments \
                 WHERE payment_type = 'owner_disbursement'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        let expected = (3000.0 + 100.0 * 52.0 / 12.0) * 0.9;
        assert!((amount - expected).abs() < 0.01, "got {amount}, want {expected}");
        assert_eq!(date, "2025-03-05");
    }

    #[test]
    fn test_owner_disbursement_sums_participants() {
        let (_dir, conn) = test_db();
        let owner = add_owner(&conn, "J. Chen");
        let property = add_property(&conn, "12 Banksia St", owner, 0.0);
        let p1 = add_participant(&conn, "Jane", "Citizen", Some(property));
        add_plan(&conn, p1, Some(3000.0), 0.0, None, None, None);
        let p2 = add_participant(&conn, "Paul", "Mason", Some(property));
        add_plan(&conn, p2, Some(2000.0), 0.0, None, None, None);
        generate_owner(&conn, "2025-03", 5).unwrap();
        let amount: f64 = conn
            .query_row(
                "SELECT expected_amount FROM expected_payments WHERE payment_type = 'owner_disbursement'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(amount, 5000.0);
    }

    #[test]
    fn test_owner_disbursement_skipped_for_empty_property() {
        let (_dir, conn) = test_db();
        let owner = add_owner(&conn, "J. Chen");
        add_property(&conn, "Empty House", owner, 10.0);
        assert_eq!(generate_owner(&conn, "2025-03", 5).unwrap(), 0);
    }

    #[test]
    fn test_owner_disbursement_skipped_for_inactive_property() {
        let (_dir, conn) = test_db();
        let (property, _) = seed_basic(&conn);
        conn.execute("UPDATE properties SET is_active = 0 WHERE id = ?1", [property]).unwrap();
        assert_eq!(generate_owner(&conn, "2025-03", 5).unwrap(), 0);
    }

    #[test]
    fn test_invalid_period_rejected() {
        let (_dir, conn) = test_db();
        assert!(generate_all(&conn, "2025-13", 5).is_err());
        assert!(generate_all(&conn, "march", 5).is_err());
    }
}
