//! `contacts` command-line front-end.
//!
//! # Responsibility
//! - Resolve connection settings from flags, the saved profile and defaults.
//! - Map one subcommand to one contact service call and print the result.
//!
//! # Commands
//!
//! - `test-connection`, `init-schema`
//! - `add`, `edit`, `delete`, `delete-all`
//! - `show`, `list`, `search`, `count`
//! - `import`, `export`
//! - `save-credentials`, `forget-credentials`

mod output;

use clap::{Args, Parser, Subcommand};
use contacts_core::transfer::csv::{export_to_path, import_from_path};
use contacts_core::{
    default_config_dir, init_logging, ConnectionSettings, ContactDraft, ContactId,
    ContactService, CredentialError, CredentialStore, ImportOutcome, SavedCredentials,
    SqliteContactRepository, DEFAULT_PORT,
};
use log::info;
use output::Output;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_DATABASE: &str = "contacts";
const FALLBACK_USER: &str = "contacts";

/// Manage a contacts database from the command line.
#[derive(Parser)]
#[command(name = "contacts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database host (defaults to the saved profile, then localhost)
    #[arg(global = true, long)]
    host: Option<String>,

    /// Database port
    #[arg(global = true, long)]
    port: Option<u16>,

    /// Database user
    #[arg(global = true, short, long)]
    user: Option<String>,

    /// Database password (never saved)
    #[arg(global = true, long, default_value = "")]
    password: String,

    /// Database name or file path (`:memory:` for a throwaway store)
    #[arg(global = true, short, long)]
    database: Option<String>,

    /// Save host, port, user and database for later runs
    #[arg(global = true, long)]
    remember: bool,

    /// Print results as JSON
    #[arg(global = true, long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(global = true, long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(global = true, long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the database answers
    TestConnection,

    /// Create the contacts table and indexes if missing
    InitSchema,

    /// Add one contact
    Add(NewContactArgs),

    /// Change fields of an existing contact
    Edit {
        id: ContactId,

        #[command(flatten)]
        fields: EditContactArgs,
    },

    /// Delete one contact
    Delete { id: ContactId },

    /// Delete every contact
    DeleteAll {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Show one contact
    Show { id: ContactId },

    /// List contacts
    List {
        /// Sort column (id, first_name, last_name, email, mobile)
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Search first name, last name, email and mobile
    Search { query: String },

    /// Print the number of contacts
    Count,

    /// Import contacts from a CSV file in one transaction
    Import { file: PathBuf },

    /// Export all contacts to a CSV file
    Export { file: PathBuf },

    /// Save the resolved host, port, user and database
    SaveCredentials,

    /// Remove the saved connection profile
    ForgetCredentials,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::TestConnection => "test-connection",
            Self::InitSchema => "init-schema",
            Self::Add(_) => "add",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::DeleteAll { .. } => "delete-all",
            Self::Show { .. } => "show",
            Self::List { .. } => "list",
            Self::Search { .. } => "search",
            Self::Count => "count",
            Self::Import { .. } => "import",
            Self::Export { .. } => "export",
            Self::SaveCredentials => "save-credentials",
            Self::ForgetCredentials => "forget-credentials",
        }
    }
}

#[derive(Args)]
struct NewContactArgs {
    #[arg(long, default_value = "")]
    first: String,
    #[arg(long, default_value = "")]
    last: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    mobile: String,
}

#[derive(Args)]
struct EditContactArgs {
    #[arg(long)]
    first: Option<String>,
    #[arg(long)]
    last: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    mobile: Option<String>,
}

impl EditContactArgs {
    fn apply(self, draft: &mut ContactDraft) {
        if let Some(first) = self.first {
            draft.first_name = first;
        }
        if let Some(last) = self.last {
            draft.last_name = last;
        }
        if let Some(email) = self.email {
            draft.email = email;
        }
        if let Some(mobile) = self.mobile {
            draft.mobile = mobile;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config_dir = match default_config_dir() {
        Ok(dir) => Some(dir),
        Err(err) => {
            eprintln!("warning: {err}; saved connection profile unavailable");
            None
        }
    };
    start_logging(&cli, config_dir.as_deref())?;

    let credentials = config_dir.map(CredentialStore::new);
    execute(cli, credentials.as_ref())
}

/// Runs one command. `credentials` is `None` when no profile location exists.
fn execute(cli: Cli, credentials: Option<&CredentialStore>) -> Result<(), Box<dyn Error>> {
    let out = Output::new(cli.json);
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    let needs_profile = cli.remember
        || matches!(
            cli.command,
            Commands::SaveCredentials | Commands::ForgetCredentials
        );
    if needs_profile && credentials.is_none() {
        return Err(CredentialError::NoHomeDir.into());
    }

    if let Commands::ForgetCredentials = cli.command {
        if let Some(credentials) = credentials {
            credentials.clear()?;
        }
        out.message("Saved connection profile removed");
        return Ok(());
    }

    let saved = match credentials {
        Some(credentials) => credentials.load()?,
        None => None,
    };
    let settings = resolve_settings(&cli, saved);
    if let Some(credentials) = credentials.filter(|_| needs_profile) {
        credentials.save(&SavedCredentials::from_settings(&settings))?;
        if let Commands::SaveCredentials = cli.command {
            out.message(&format!(
                "Saved connection profile to {}",
                credentials.path().display()
            ));
            return Ok(());
        }
    }

    let repo = SqliteContactRepository::connect(&settings)?;
    let mut service = ContactService::new(repo);
    if !matches!(cli.command, Commands::TestConnection | Commands::InitSchema) {
        service.ensure_schema()?;
    }

    match cli.command {
        Commands::TestConnection => {
            if !service.test_connection() {
                return Err("connection failed".into());
            }
            out.message("Connection OK");
        }
        Commands::InitSchema => {
            service.ensure_schema()?;
            out.message("Database schema initialized");
        }
        Commands::Add(args) => {
            let draft = ContactDraft::new(args.first, args.last, args.email, args.mobile);
            let id = service.insert(&draft)?;
            out.created(id);
        }
        Commands::Edit { id, fields } => {
            let existing = service
                .get_by_id(id)
                .ok_or_else(|| format!("contact not found with id: {id}"))?;
            let mut draft = existing.to_draft();
            fields.apply(&mut draft);
            service.update(id, &draft)?;
            out.message(&format!("Updated contact {id}"));
        }
        Commands::Delete { id } => {
            service.delete(id)?;
            out.message(&format!("Deleted contact {id}"));
        }
        Commands::DeleteAll { yes } => {
            if !yes {
                return Err("refusing to delete all contacts without --yes".into());
            }
            let removed = service.delete_all()?;
            out.message(&format!("Deleted {removed} contacts"));
        }
        Commands::Show { id } => match service.get_by_id(id) {
            Some(contact) => out.contact(&contact)?,
            None => return Err(format!("contact not found with id: {id}").into()),
        },
        Commands::List { sort, desc } => {
            let contacts = match sort {
                Some(column) => service.sorted(&column, !desc),
                None => service.list_all(),
            };
            out.contacts(&contacts)?;
        }
        Commands::Search { query } => {
            out.contacts(&service.search(&query))?;
        }
        Commands::Count => out.count(service.count()),
        Commands::Import { file } => {
            let drafts = import_from_path(&file)?;
            match service.try_import(&drafts)? {
                ImportOutcome::Committed { inserted } => {
                    out.message(&format!("Successfully imported {inserted} contacts"));
                }
                ImportOutcome::RolledBack { failed_row, reason } => {
                    return Err(format!(
                        "import rolled back at record {}: {reason}",
                        failed_row + 1
                    )
                    .into());
                }
            }
        }
        Commands::Export { file } => {
            let written = export_to_path(&file, &service.list_all())?;
            out.message(&format!("Successfully exported {written} contacts"));
        }
        Commands::SaveCredentials | Commands::ForgetCredentials => {}
    }

    Ok(())
}

/// Starts file logging in `--log-dir`, else `<config>/logs`. Without
/// either directory the run is not logged.
fn start_logging(cli: &Cli, config_dir: Option<&Path>) -> Result<(), String> {
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| contacts_core::default_log_level().to_string());
    let log_dir = match (&cli.log_dir, config_dir) {
        (Some(dir), _) => dir.clone(),
        (None, Some(config_dir)) => config_dir.join("logs"),
        (None, None) => return Ok(()),
    };
    init_logging(&level, &log_dir.to_string_lossy())
}

/// Flags win over the saved profile, which wins over defaults.
fn resolve_settings(cli: &Cli, saved: Option<SavedCredentials>) -> ConnectionSettings {
    let saved = saved.unwrap_or_else(|| SavedCredentials {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_PORT,
        user: std::env::var("USER").unwrap_or_else(|_| FALLBACK_USER.to_string()),
        database: DEFAULT_DATABASE.to_string(),
    });

    ConnectionSettings {
        host: cli.host.clone().unwrap_or(saved.host),
        port: cli.port.unwrap_or(saved.port),
        user: cli.user.clone().unwrap_or(saved.user),
        password: cli.password.clone(),
        database: cli.database.clone().unwrap_or(saved.database),
    }
}
