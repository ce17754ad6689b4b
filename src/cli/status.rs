use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("haven.db");

    println!(
        "Provider:   {}",
        if settings.provider_name.is_empty() { "(not set)" } else { &settings.provider_name }
    );
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;

        let accounts: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |r| r.get(0))?;
        let properties: i64 = conn.query_row(
            "SELECT count(*) FROM properties WHERE is_active = 1",
            [],
            |r| r.get(0),
        )?;
        let participants: i64 = conn.query_row(
            "SELECT count(*) FROM participants WHERE status = 'active'",
            [],
            |r| r.get(0),
        )?;
        let pending: i64 = conn.query_row(
            "SELECT count(*) FROM expected_payments WHERE status = 'pending'",
            [],
            |r| r.get(0),
        )?;
        let overdue: i64 = conn.query_row(
            "SELECT count(*) FROM expected_payments WHERE status = 'overdue'",
            [],
            |r| r.get(0),
        )?;
        let transactions: i64 =
            conn.query_row("SELECT count(*) FROM bank_transactions", [], |r| r.get(0))?;
        let unmatched: i64 = conn.query_row(
            "SELECT count(*) FROM bank_transactions WHERE match_status = 'unmatched'",
            [],
            |r| r.get(0),
        )?;

        println!();
        println!("Accounts:        {accounts}");
        println!("Properties:      {properties}");
        println!("Participants:    {participants}");
        println!("Pending:         {pending}");
        println!("Overdue:         {overdue}");
        println!("Transactions:    {transactions} ({unmatched} unmatched)");
    } else {
        println!();
        println!("Database not found. Run `haven init` to set up.");
    }

    Ok(())
}
