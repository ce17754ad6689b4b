pub mod accounts;
pub mod demo;
pub mod expected;
pub mod generate;
pub mod import;
pub mod init;
pub mod matching;
pub mod owners;
pub mod participants;
pub mod plans;
pub mod properties;
pub mod status;
pub mod tx;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::Result;
use crate::settings::get_data_dir;

pub(crate) fn open_db() -> Result<Connection> {
    get_connection(&get_data_dir().join("haven.db"))
}

/// Current calendar month as YYYY-MM, for commands that default to "now".
pub(crate) fn current_period() -> String {
    use chrono::Datelike;
    let today = chrono::Local::now().date_naive();
    format!("{:04}-{:02}", today.year(), today.month())
}

pub(crate) fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[derive(Parser)]
#[command(name = "haven", about = "SDA housing reconciliation CLI: expected payments, bank imports, matching.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Haven: choose a data directory and initialize the database.
    Init {
        /// Path for Haven data (default: ~/Documents/haven)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Provider name shown in summaries
        #[arg(long)]
        provider: Option<String>,
    },
    /// Manage bank accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage property owners.
    Owners {
        #[command(subcommand)]
        command: OwnersCommands,
    },
    /// Manage properties.
    Properties {
        #[command(subcommand)]
        command: PropertiesCommands,
    },
    /// Manage participants.
    Participants {
        #[command(subcommand)]
        command: ParticipantsCommands,
    },
    /// Manage participant funding plans.
    Plans {
        #[command(subcommand)]
        command: PlansCommands,
    },
    /// Import a bank CSV and auto-match new transactions.
    Import {
        /// Path to CSV file to import
        file: String,
        /// Account name to import into
        #[arg(long)]
        account: String,
        /// Bank format key (anz, westpac); detected from the file if omitted
        #[arg(long)]
        format: Option<String>,
        /// Skip the automatic matching pass after import
        #[arg(long = "no-match")]
        no_match: bool,
    },
    /// Generate expected payments for a period.
    Generate {
        /// Period: YYYY-MM (default: current month)
        #[arg(long)]
        period: Option<String>,
        /// Generate one category only: sda, rrc, owner
        #[arg(long)]
        only: Option<String>,
        /// Day of month for owner disbursements
        #[arg(long = "payment-day")]
        payment_day: Option<u32>,
    },
    /// Run or inspect transaction matching.
    Match {
        #[command(subcommand)]
        command: MatchCommands,
    },
    /// Inspect and override bank transactions.
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },
    /// Inspect and settle expected payments.
    Expected {
        #[command(subcommand)]
        command: ExpectedCommands,
    },
    /// Load sample data (owner, property, participants, plans) to explore Haven.
    Demo,
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new bank account.
    Add {
        /// Account name, e.g. 'Operating'
        name: String,
        /// Bank name
        #[arg(long)]
        bank: Option<String>,
        /// Last 4 digits of account number
        #[arg(long = "last-four")]
        last_four: Option<String>,
    },
    /// List all accounts.
    List,
}

#[derive(Subcommand)]
pub enum OwnersCommands {
    /// Add a property owner.
    Add {
        /// Owner name
        name: String,
        /// Contact email
        #[arg(long)]
        email: Option<String>,
    },
    /// List all owners.
    List,
}

#[derive(Subcommand)]
pub enum PropertiesCommands {
    /// Add a property.
    Add {
        /// Property name, e.g. '12 Rosella St'
        name: String,
        /// Owner name
        #[arg(long)]
        owner: Option<String>,
        /// Management fee percent withheld from disbursements
        #[arg(long, default_value = "0")]
        fee: f64,
    },
    /// List all properties.
    List,
    /// Deactivate a property (excluded from generation).
    Deactivate {
        /// Property ID (shown in `haven properties list`)
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ParticipantsCommands {
    /// Add a participant.
    Add {
        /// First name
        first_name: String,
        /// Last name
        last_name: String,
        /// NDIS number
        #[arg(long)]
        ndis: String,
        /// Property name the participant lives at
        #[arg(long)]
        property: Option<String>,
    },
    /// List all participants.
    List,
    /// Mark a participant inactive (excluded from generation and matching).
    Deactivate {
        /// Participant ID (shown in `haven participants list`)
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum PlansCommands {
    /// Add a funding plan for a participant.
    Add {
        /// Participant ID
        #[arg(long)]
        participant: i64,
        /// Explicit monthly SDA amount
        #[arg(long)]
        monthly: Option<f64>,
        /// Annual SDA budget (used as annual/12 when no monthly amount)
        #[arg(long)]
        annual: Option<f64>,
        /// Day of month SDA claims are expected
        #[arg(long = "claim-day")]
        claim_day: Option<u32>,
        /// Rent contribution amount
        #[arg(long)]
        rent: Option<f64>,
        /// Rent frequency: weekly, fortnightly, monthly
        #[arg(long)]
        frequency: Option<String>,
    },
    /// List all plans.
    List,
}

#[derive(Subcommand)]
pub enum MatchCommands {
    /// Run the automatic matching pass for an account.
    Run {
        /// Account name
        account: String,
    },
    /// Show ranked match suggestions for one transaction.
    Suggest {
        /// Transaction ID (shown in `haven tx list`)
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// List transactions.
    List {
        /// Account name
        #[arg(long)]
        account: Option<String>,
        /// Match status: unmatched, matched, partially_matched, excluded
        #[arg(long)]
        status: Option<String>,
        /// Category filter
        #[arg(long)]
        category: Option<String>,
        /// Earliest date: YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// Latest date: YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
        /// Maximum rows shown
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Manually match a transaction.
    Match {
        /// Transaction ID
        id: i64,
        /// Match type: payment, owner-payment, claim, participant, expected-payment
        #[arg(long = "type")]
        match_type: String,
        /// ID of the matched record
        #[arg(long = "to")]
        match_id: i64,
        /// Category override (default depends on match type)
        #[arg(long)]
        category: Option<String>,
    },
    /// Clear a transaction's match.
    Unmatch {
        /// Transaction ID
        id: i64,
    },
    /// Set a category on one or more transactions without matching.
    Categorize {
        /// Transaction IDs
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Category to assign
        #[arg(long)]
        category: String,
    },
    /// Exclude a transaction from reconciliation (or include it back).
    Exclude {
        /// Transaction ID
        id: i64,
        /// Put the transaction back into reconciliation
        #[arg(long)]
        undo: bool,
    },
    /// Totals by category.
    Summary {
        /// Account name
        #[arg(long)]
        account: Option<String>,
        /// Earliest date: YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// Latest date: YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
    },
    /// Undo an import batch: delete its still-unmatched transactions.
    UndoImport {
        /// Import batch ID (printed at import time)
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ExpectedCommands {
    /// List expected payments.
    List {
        /// Period: YYYY-MM
        #[arg(long)]
        period: Option<String>,
        /// Status: pending, partial, received, overdue, cancelled
        #[arg(long)]
        status: Option<String>,
        /// Payment type: sda_income, rrc_income, owner_disbursement
        #[arg(long = "type")]
        payment_type: Option<String>,
        /// Participant ID
        #[arg(long)]
        participant: Option<i64>,
    },
    /// Record money received against an expected payment.
    Received {
        /// Expected payment ID
        id: i64,
        /// Amount received
        amount: f64,
        /// Date received: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Bank transaction to link and mark matched
        #[arg(long)]
        transaction: Option<i64>,
    },
    /// Cancel an expected payment.
    Cancel {
        /// Expected payment ID
        id: i64,
    },
    /// Flip past-due pending payments to overdue.
    Overdue {
        /// Treat this date as today: YYYY-MM-DD
        #[arg(long = "as-of")]
        as_of: Option<String>,
    },
    /// Per-type totals for a period.
    Summary {
        /// Period: YYYY-MM (default: all periods)
        #[arg(long)]
        period: Option<String>,
    },
}
