mod cli;
mod dates;
mod db;
mod error;
mod expected;
mod fmt;
mod generator;
mod importer;
mod matcher;
mod models;
mod settings;
mod transactions;

use clap::Parser;

use cli::{
    AccountsCommands, Cli, Commands, ExpectedCommands, MatchCommands, OwnersCommands,
    ParticipantsCommands, PlansCommands, PropertiesCommands, TxCommands,
};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, provider } => cli::init::run(data_dir, provider),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add { name, bank, last_four } => {
                cli::accounts::add(&name, bank.as_deref(), last_four.as_deref())
            }
            AccountsCommands::List => cli::accounts::list(),
        },
        Commands::Owners { command } => match command {
            OwnersCommands::Add { name, email } => cli::owners::add(&name, email.as_deref()),
            OwnersCommands::List => cli::owners::list(),
        },
        Commands::Properties { command } => match command {
            PropertiesCommands::Add { name, owner, fee } => {
                cli::properties::add(&name, owner.as_deref(), fee)
            }
            PropertiesCommands::List => cli::properties::list(),
            PropertiesCommands::Deactivate { id } => cli::properties::deactivate(id),
        },
        Commands::Participants { command } => match command {
            ParticipantsCommands::Add {
                first_name,
                last_name,
                ndis,
                property,
            } => cli::participants::add(&first_name, &last_name, &ndis, property.as_deref()),
            ParticipantsCommands::List => cli::participants::list(),
            ParticipantsCommands::Deactivate { id } => cli::participants::deactivate(id),
        },
        Commands::Plans { command } => match command {
            PlansCommands::Add {
                participant,
                monthly,
                annual,
                claim_day,
                rent,
                frequency,
            } => cli::plans::add(participant, monthly, annual, claim_day, rent, frequency.as_deref()),
            PlansCommands::List => cli::plans::list(),
        },
        Commands::Import {
            file,
            account,
            format,
            no_match,
        } => cli::import::run(&file, &account, format.as_deref(), no_match),
        Commands::Generate {
            period,
            only,
            payment_day,
        } => cli::generate::run(period, only, payment_day),
        Commands::Match { command } => match command {
            MatchCommands::Run { account } => cli::matching::run(&account),
            MatchCommands::Suggest { id } => cli::matching::suggest(id),
        },
        Commands::Tx { command } => match command {
            TxCommands::List {
                account,
                status,
                category,
                from,
                to,
                limit,
            } => cli::tx::list(account.as_deref(), status, category, from, to, limit),
            TxCommands::Match {
                id,
                match_type,
                match_id,
                category,
            } => cli::tx::manual_match(id, &match_type, match_id, category.as_deref()),
            TxCommands::Unmatch { id } => cli::tx::unmatch(id),
            TxCommands::Categorize { ids, category } => cli::tx::categorize(&ids, &category),
            TxCommands::Exclude { id, undo } => cli::tx::exclude(id, undo),
            TxCommands::Summary { account, from, to } => {
                cli::tx::summary(account.as_deref(), from.as_deref(), to.as_deref())
            }
            TxCommands::UndoImport { id } => cli::tx::undo_import(id),
        },
        Commands::Expected { command } => match command {
            ExpectedCommands::List {
                period,
                status,
                payment_type,
                participant,
            } => cli::expected::list(period, status, payment_type, participant),
            ExpectedCommands::Received {
                id,
                amount,
                date,
                transaction,
            } => cli::expected::received(id, amount, date, transaction),
            ExpectedCommands::Cancel { id } => cli::expected::cancel(id),
            ExpectedCommands::Overdue { as_of } => cli::expected::overdue(as_of),
            ExpectedCommands::Summary { period } => cli::expected::summary(period.as_deref()),
        },
        Commands::Demo => cli::demo::run(),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
