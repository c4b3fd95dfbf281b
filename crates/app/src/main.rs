use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::{QuestionBank, QuizSettings, QuizSettingsDraft, QuizSettingsError};
use services::{AppServices, Clock};
use tracing::info;

mod logging;
mod shell;

const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidSeconds { raw: String },
    Settings(QuizSettingsError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSeconds { raw } => write!(f, "invalid --seconds value: {raw}"),
            ArgsError::Settings(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--db <sqlite_url> | --memory] [--bank <file.json>] [--seconds <n>] [--no-welcome] [--no-history]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --seconds 30");
    eprintln!("  built-in general knowledge bank");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_BANK, QUIZ_SECONDS, QUIZ_DEBUG_LOGGING, RUST_LOG");
    eprintln!();
    eprintln!("Commands while running:");
    eprintln!("  start | next | reset | quit, a letter to pick an option, or type an answer");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DbTarget {
    Sqlite(String),
    Memory,
}

impl DbTarget {
    /// `sqlite::memory:` maps to the in-process store; pooled connections
    /// would each see a separate empty database.
    fn from_url(raw: String) -> Self {
        match normalize_sqlite_url(raw) {
            url if url == "sqlite::memory:" => Self::Memory,
            url => Self::Sqlite(url),
        }
    }
}

#[derive(Debug)]
struct Args {
    db: DbTarget,
    bank_path: Option<PathBuf>,
    settings: QuizSettings,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db = env("QUIZ_DB_URL")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| DbTarget::Sqlite(DEFAULT_DB_URL.into()), DbTarget::from_url);
        let mut bank_path = env("QUIZ_BANK")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let mut draft = QuizSettingsDraft::new();
        draft.seconds_per_question = env("QUIZ_SECONDS")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|seconds| *seconds > 0);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db = DbTarget::from_url(value);
                }
                "--memory" => db = DbTarget::Memory,
                "--bank" => {
                    bank_path = Some(PathBuf::from(require_value(args, "--bank")?));
                }
                "--seconds" => {
                    let value = require_value(args, "--seconds")?;
                    let parsed: u32 = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeconds { raw: value.clone() })?;
                    draft.seconds_per_question = Some(parsed);
                }
                "--no-welcome" => draft.show_welcome_screen = Some(false),
                "--no-history" => draft.persist_history = Some(false),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let settings = draft.validate().map_err(ArgsError::Settings)?;
        Ok(Self {
            db,
            bank_path,
            settings,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directories if missing.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn load_bank(path: Option<&std::path::Path>) -> Result<QuestionBank, Box<dyn std::error::Error>> {
    let bank = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
            QuestionBank::from_json_str(&raw)?
        }
        None => QuestionBank::general_knowledge()?,
    };
    Ok(bank)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(&mut std::env::args().skip(1), |key| std::env::var(key).ok())
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;

    logging::init();

    let bank = Arc::new(load_bank(parsed.bank_path.as_deref())?);
    let clock = Clock::default_clock();

    // Open + migrate SQLite in the binary glue.
    let services = match &parsed.db {
        DbTarget::Memory => AppServices::in_memory(clock),
        DbTarget::Sqlite(url) => {
            prepare_sqlite_file(url)?;
            AppServices::new_sqlite(url, clock).await?
        }
    };
    info!(
        db = ?parsed.db,
        total_questions = bank.total_questions(),
        seconds_per_question = parsed.settings.seconds_per_question(),
        "starting quiz"
    );

    let quiz = services.spawn_quiz(bank, parsed.settings);
    let renderer = tokio::spawn(shell::render_loop(quiz.subscribe()));

    let result = shell::input_loop(&quiz).await;
    quiz.shutdown();
    drop(quiz);
    let _ = renderer.await;

    Ok(result?)
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
