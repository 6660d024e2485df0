//! mockprep - mock interview practice tracker
//!
//! Records interview attempts, recommends the next interviewer and reports
//! progress statistics for a user.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/mockprep/data.db (~/.local/share/mockprep/data.db)
//! - Config: $XDG_CONFIG_HOME/mockprep/config.toml (~/.config/mockprep/config.toml)
//! - Logs: $XDG_STATE_HOME/mockprep/

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mockprep_core::attempts::{self, ListRequest, DEFAULT_PAGE_SIZE};
use mockprep_core::{
    analytics, AttemptId, AttemptStatus, AttemptUpdate, Catalog, Config, Database, Difficulty,
    NewAttempt, UserId,
};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mockprep")]
#[command(about = "Mock interview practice tracker")]
#[command(version)]
struct Args {
    /// User the command acts on
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Database file (default: from config)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Record and manage interview attempts
    #[command(subcommand)]
    Attempt(AttemptCommand),

    /// Show progress statistics
    Stats,

    /// Recommend the next interviewer
    Recommend,

    /// List interviewer characters
    Characters {
        /// Only characters at this difficulty
        #[arg(short, long)]
        difficulty: Option<Difficulty>,
    },

    /// Show one interviewer character
    Character { id: String },

    /// Browse professions
    #[command(subcommand)]
    Professions(ProfessionsCommand),
}

#[derive(Subcommand)]
enum AttemptCommand {
    /// Record a finished attempt from JSON
    Create {
        /// JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// List attempts, newest first
    List {
        #[arg(short, long)]
        status: Option<AttemptStatus>,

        #[arg(short, long)]
        profession: Option<String>,

        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: usize,

        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Show one attempt
    Show { id: String },

    /// Update an attempt from JSON
    Update {
        id: String,

        /// JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// Delete an attempt
    Delete { id: String },

    /// Most recent completed attempts
    Recent,
}

#[derive(Subcommand)]
enum ProfessionsCommand {
    /// List categories with profession counts
    Categories,

    /// List professions in a category
    Category { id: String },

    /// Show one profession and its category
    Show { id: String },

    /// Search professions by name, description or keyword
    Search { query: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        mockprep_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let catalog = Catalog::load(&config.catalog).context("failed to load catalog")?;

    let format = args.format;
    match args.command {
        Command::Characters { difficulty } => {
            let characters: Vec<_> = match difficulty {
                Some(tier) => catalog.by_difficulty(tier).collect(),
                None => catalog.characters().iter().collect(),
            };
            emit(format, &characters, || render::characters(&characters))
        }
        Command::Character { id } => {
            let character = catalog
                .character(&id)
                .with_context(|| format!("character not found: {}", id))?;
            emit(format, character, || render::character(character))
        }
        Command::Professions(command) => cmd_professions(&catalog, command, format),
        Command::Attempt(command) => {
            let user = parse_user(args.user.as_deref())?;
            let db = open_database(args.database.as_deref(), &config)?;
            cmd_attempt(&db, &user, command, format)
        }
        Command::Stats => {
            let user = parse_user(args.user.as_deref())?;
            let db = open_database(args.database.as_deref(), &config)?;
            let report = analytics::generate_stats(&db, &user)?;
            emit(format, &report, || render::stats(&report))
        }
        Command::Recommend => {
            let user = parse_user(args.user.as_deref())?;
            let db = open_database(args.database.as_deref(), &config)?;
            let payload = analytics::recommend(&db, &catalog, &user)?;
            emit(format, &payload, || render::recommendation(&payload))
        }
    }
}

fn open_database(override_path: Option<&Path>, config: &Config) -> Result<Database> {
    let db_path = override_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.resolved_database_path());
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;
    Ok(db)
}

fn cmd_attempt(db: &Database, user: &UserId, command: AttemptCommand, format: OutputFormat) -> Result<()> {
    match command {
        AttemptCommand::Create { input } => {
            let new: NewAttempt = read_json(&input)?;
            let attempt = attempts::create(db, user, new)?;
            emit(format, &attempt, || render::attempt(&attempt))
        }
        AttemptCommand::List {
            status,
            profession,
            limit,
            page,
        } => {
            let request = ListRequest {
                status,
                profession_id: profession,
                limit,
                page,
            };
            let page = attempts::list(db, user, &request)?;
            emit(format, &page, || render::attempt_page(&page))
        }
        AttemptCommand::Show { id } => {
            let attempt = attempts::get(db, user, &AttemptId::parse(&id)?)?;
            emit(format, &attempt, || render::attempt(&attempt))
        }
        AttemptCommand::Update { id, input } => {
            let id = AttemptId::parse(&id)?;
            let changes: AttemptUpdate = read_json(&input)?;
            let attempt = attempts::update(db, user, &id, changes)?;
            emit(format, &attempt, || render::attempt(&attempt))
        }
        AttemptCommand::Delete { id } => {
            let id = AttemptId::parse(&id)?;
            attempts::delete(db, user, &id)?;
            let deleted = serde_json::json!({ "deleted": id });
            emit(format, &deleted, || format!("Deleted attempt {}\n", id))
        }
        AttemptCommand::Recent => {
            let summaries = attempts::recent(db, user)?;
            emit(format, &summaries, || render::summaries(&summaries))
        }
    }
}

fn cmd_professions(catalog: &Catalog, command: ProfessionsCommand, format: OutputFormat) -> Result<()> {
    match command {
        ProfessionsCommand::Categories => {
            let categories = catalog.categories();
            emit(format, &categories, || render::categories(&categories))
        }
        ProfessionsCommand::Category { id } => {
            let professions = catalog.professions_in(&id)?;
            emit(format, &professions, || render::professions(professions))
        }
        ProfessionsCommand::Show { id } => {
            let found = catalog
                .profession(&id)
                .with_context(|| format!("profession not found: {}", id))?;
            emit(format, &found, || render::profession_matches(std::slice::from_ref(&found)))
        }
        ProfessionsCommand::Search { query } => {
            let matches = catalog.search(&query)?;
            emit(format, &matches, || render::profession_matches(&matches))
        }
    }
}

fn parse_user(raw: Option<&str>) -> Result<UserId> {
    let raw = raw.context("--user is required for this command")?;
    Ok(UserId::parse(raw)?)
}

/// Read a JSON document from a file, or stdin when `path` is `-`.
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&content).context("invalid JSON input")
}

fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", text()),
    }
    Ok(())
}
