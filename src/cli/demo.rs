use rusqlite::Connection;

use crate::cli::{current_period, open_db};
use crate::dates::day_in_period;
use crate::error::{HavenError, Result};
use crate::generator::generate_all;
use crate::importer::import_rows;
use crate::matcher::auto_match;
use crate::models::ParsedRow;

const ACCOUNT_NAME: &str = "Operating";
const OWNER_NAME: &str = "Meridian Property Group";

struct DemoParticipant {
    first_name: &'static str,
    last_name: &'static str,
    ndis_number: &'static str,
    property: &'static str,
    monthly_sda: Option<f64>,
    annual_sda: f64,
    claim_day: Option<u32>,
    rent: f64,
    rent_frequency: &'static str,
}

const PARTICIPANTS: &[DemoParticipant] = &[
    DemoParticipant {
        first_name: "Jane",
        last_name: "Citizen",
        ndis_number: "430000001",
        property: "12 Rosella St",
        monthly_sda: Some(2200.0),
        annual_sda: 0.0,
        claim_day: Some(15),
        rent: 120.0,
        rent_frequency: "weekly",
    },
    DemoParticipant {
        first_name: "Marcus",
        last_name: "Webb",
        ndis_number: "430000002",
        property: "12 Rosella St",
        monthly_sda: None,
        annual_sda: 31200.0,
        claim_day: None,
        rent: 250.0,
        rent_frequency: "fortnightly",
    },
    DemoParticipant {
        first_name: "Priya",
        last_name: "Sharma",
        ndis_number: "430000003",
        property: "4 Banksia Ct",
        monthly_sda: Some(1950.0),
        annual_sda: 0.0,
        claim_day: Some(10),
        rent: 520.0,
        rent_frequency: "monthly",
    },
];

fn demo_transactions(period: &str) -> Vec<ParsedRow> {
    let row = |day: u32, description: &str, amount: f64| ParsedRow {
        date: day_in_period(period, day),
        description: description.to_string(),
        reference: None,
        amount,
        balance: None,
    };
    vec![
        row(16, "NDIS SDA PAYMENT 430000001", 2200.00),
        row(20, "CENTREPAY JANE CITIZEN", 520.00),
        row(18, "DIRECT CREDIT MARCUS WEBB RENT", 541.67),
        row(5, "TRANSFER MERIDIAN PROPERTY GROUP", -4200.00),
        row(11, "BUNNINGS WAREHOUSE 1274", -89.50),
        row(28, "INTEREST PAID", 1.23),
    ]
}

fn seed_entities(conn: &Connection) -> Result<i64> {
    conn.execute("INSERT INTO accounts (name, bank_name) VALUES (?1, 'ANZ')", [ACCOUNT_NAME])?;
    let account_id = conn.last_insert_rowid();

    conn.execute(
        "INSERT INTO owners (name, contact_email) VALUES (?1, 'accounts@meridianpg.example')",
        [OWNER_NAME],
    )?;
    let owner_id = conn.last_insert_rowid();

    for (name, fee) in [("12 Rosella St", 8.0), ("4 Banksia Ct", 10.0)] {
        conn.execute(
            "INSERT INTO properties (name, owner_id, management_fee_percent) VALUES (?1, ?2, ?3)",
            rusqlite::params![name, owner_id, fee],
        )?;
    }

    for p in PARTICIPANTS {
        let property_id: i64 =
            conn.query_row("SELECT id FROM properties WHERE name = ?1", [p.property], |r| r.get(0))?;
        conn.execute(
            "INSERT INTO participants (first_name, last_name, ndis_number, property_id) \
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![p.first_name, p.last_name, p.ndis_number, property_id],
        )?;
        let participant_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO plans (participant_id, monthly_sda_amount, annual_sda_budget, claim_day, \
             rent_contribution, rent_frequency) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                participant_id,
                p.monthly_sda,
                p.annual_sda,
                p.claim_day,
                p.rent,
                p.rent_frequency,
            ],
        )?;
    }

    Ok(account_id)
}

pub fn run() -> Result<()> {
    let conn = open_db()?;

    let already: bool = conn
        .query_row("SELECT 1 FROM accounts WHERE name = ?1", [ACCOUNT_NAME], |_| Ok(true))
        .unwrap_or(false);
    if already {
        return Err(HavenError::Other(
            "Demo data already loaded (account 'Operating' exists).".to_string(),
        ));
    }

    let account_id = seed_entities(&conn)?;
    println!("Seeded 1 owner, 2 properties, 3 participants with plans.");

    let period = current_period();
    let generated = generate_all(&conn, &period, 5)?;
    println!(
        "{period}: {} SDA, {} RRC, {} owner disbursements generated",
        generated.sda_created, generated.rrc_created, generated.owner_created
    );

    let rows = demo_transactions(&period);
    let imported = import_rows(&conn, account_id, "demo", Some("demo"), None, &rows)?;
    println!("{} sample transactions imported (batch {})", imported.imported, imported.import_id);

    let matched = auto_match(&conn, account_id)?;
    println!("{} of {} auto-matched", matched.matched, matched.scanned);
    println!();
    println!("Try: `haven expected list --period {period}`, `haven tx list`, `haven match suggest <id>`");

    Ok(())
}
