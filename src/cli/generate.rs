use crate::cli::{current_period, open_db};
use crate::error::{HavenError, Result};
use crate::generator::{self, DEFAULT_OWNER_PAYMENT_DAY};
use crate::settings::load_settings;

pub fn run(period: Option<String>, only: Option<String>, payment_day: Option<u32>) -> Result<()> {
    let period = period.unwrap_or_else(current_period);
    let settings = load_settings();
    let payment_day = payment_day.unwrap_or(if settings.owner_payment_day > 0 {
        settings.owner_payment_day
    } else {
        DEFAULT_OWNER_PAYMENT_DAY
    });
    let conn = open_db()?;

    match only.as_deref() {
        None => {
            let result = generator::generate_all(&conn, &period, payment_day)?;
            println!(
                "{period}: {} SDA, {} RRC, {} owner disbursements created ({} total)",
                result.sda_created,
                result.rrc_created,
                result.owner_created,
                result.total()
            );
        }
        Some("sda") => {
            let created = generator::generate_sda(&conn, &period)?;
            println!("{period}: {created} SDA expected payments created");
        }
        Some("rrc") => {
            let created = generator::generate_rrc(&conn, &period)?;
            println!("{period}: {created} RRC expected payments created");
        }
        Some("owner") => {
            let created = generator::generate_owner(&conn, &period, payment_day)?;
            println!("{period}: {created} owner disbursements created");
        }
        Some(other) => {
            return Err(HavenError::Other(format!(
                "Unknown category '{other}'. Valid: sda, rrc, owner"
            )));
        }
    }

    Ok(())
}
