use std::fmt;
use std::io::{self, BufRead, Write};

use athena_core::model::{Attendance, SessionId};
use athena_core::search::SearchTarget;
use chrono::{NaiveDate, Weekday};
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::learning::{LearningSession, LearningView, Speaker};
use services::{AppServices, Clock, TimetableBoard};
use storage::seed::{plan_sessions, reseed};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "athena=info,services=info,storage=info";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidSessionId { raw: String },
    InvalidMark { raw: String },
    InvalidDay { raw: String },
    InvalidDate { raw: String },
    InvalidSeed { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSessionId { raw } => write!(f, "invalid --id value: {raw}"),
            ArgsError::InvalidMark { raw } => {
                write!(f, "invalid --value {raw} (expected present, absent or none)")
            }
            ArgsError::InvalidDay { raw } => write!(f, "invalid --day value: {raw}"),
            ArgsError::InvalidDate { raw } => {
                write!(f, "invalid --today value: {raw} (expected YYYY-MM-DD)")
            }
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
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
    eprintln!("  athena timetable [--db <sqlite_url>] [--day <mon..sun>]");
    eprintln!("  athena stats     [--db <sqlite_url>]");
    eprintln!("  athena mark      [--db <sqlite_url>] --id <class_id> --value <present|absent|none>");
    eprintln!("  athena learn     [--db <sqlite_url>]");
    eprintln!("  athena inbox     [--db <sqlite_url>]");
    eprintln!("  athena modules   [--db <sqlite_url>] [--query <text>]");
    eprintln!("  athena search    [--db <sqlite_url>] --query <text>");
    eprintln!("  athena seed      [--db <sqlite_url>] [--today <YYYY-MM-DD>] [--seed <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://dev.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ATHENA_DB_URL, ATHENA_AI_API_KEY, ATHENA_AI_BASE_URL, ATHENA_AI_MODEL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Timetable,
    Stats,
    Mark,
    Learn,
    Inbox,
    Modules,
    Search,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "timetable" => Some(Self::Timetable),
            "stats" => Some(Self::Stats),
            "mark" => Some(Self::Mark),
            "learn" => Some(Self::Learn),
            "inbox" => Some(Self::Inbox),
            "modules" => Some(Self::Modules),
            "search" => Some(Self::Search),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    day: Option<Weekday>,
    session_id: Option<SessionId>,
    mark: Option<Option<Attendance>>,
    today: Option<NaiveDate>,
    seed: Option<u64>,
    query: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var("ATHENA_DB_URL")
                .ok()
                .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url),
            day: None,
            session_id: None,
            mark: None,
            today: None,
            seed: None,
            query: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--day" => {
                    let value = require_value(args, "--day")?;
                    parsed.day = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidDay { raw: value.clone() })?,
                    );
                }
                "--id" => {
                    let value = require_value(args, "--id")?;
                    parsed.session_id = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidSessionId { raw: value.clone() })?,
                    );
                }
                "--value" => {
                    let value = require_value(args, "--value")?;
                    parsed.mark = Some(parse_mark(&value)?);
                }
                "--today" => {
                    let value = require_value(args, "--today")?;
                    parsed.today = Some(
                        NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                            .map_err(|_| ArgsError::InvalidDate { raw: value.clone() })?,
                    );
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    parsed.seed = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?,
                    );
                }
                "--query" => {
                    parsed.query = Some(require_value(args, "--query")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn parse_mark(raw: &str) -> Result<Option<Attendance>, ArgsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "present" => Ok(Some(Attendance::Present)),
        "absent" => Ok(Some(Attendance::Absent)),
        "none" | "clear" => Ok(None),
        _ => Err(ArgsError::InvalidMark {
            raw: raw.to_string(),
        }),
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
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            io::Error::new(io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default()).await?;
    tracing::debug!(db = %parsed.db_url, ?cmd, "services ready");

    match cmd {
        Command::Timetable => {
            let mut board = services.timetable();
            board.load().await;
            print_timetable(&board, parsed.day);
            Ok(())
        }
        Command::Stats => {
            let mut board = services.timetable();
            board.load().await;
            print_stats(&board);
            Ok(())
        }
        Command::Mark => {
            let id = parsed
                .session_id
                .ok_or(ArgsError::MissingValue { flag: "--id" })?;
            let value = parsed
                .mark
                .ok_or(ArgsError::MissingValue { flag: "--value" })?;
            let mut board = services.timetable();
            board.load().await;
            board.mark(id, value).await?;
            if let Some(session) = board.get(id) {
                println!(
                    "{} {} {}: {}",
                    session.module_code,
                    session.class_date,
                    session.formatted_time(),
                    session.label().as_str()
                );
            }
            Ok(())
        }
        Command::Learn => {
            let session = services.learning_session()?;
            learn_loop(session).await
        }
        Command::Inbox => {
            let inbox = services.notifications();
            println!("{} unread", inbox.unread_count());
            for n in inbox.items() {
                let dot = if n.read { " " } else { "*" };
                println!("{dot} {:<26} {:<18} {}", n.title, n.sender, n.date);
            }
            Ok(())
        }
        Command::Modules => {
            let query = parsed.query.as_deref().unwrap_or("");
            let mut any = false;
            for m in services.modules(query) {
                any = true;
                println!(
                    "{:<4} {:<9} {:<28} {:<6} {:<20} {}",
                    m.id,
                    m.code,
                    m.name,
                    m.status.as_str(),
                    m.term,
                    m.instructors.join(", ")
                );
            }
            if !any {
                println!("No modules match.");
            }
            Ok(())
        }
        Command::Search => {
            let query = parsed
                .query
                .ok_or(ArgsError::MissingValue { flag: "--query" })?;
            let suggestions = services.search_suggestions(&query);
            if suggestions.is_empty() {
                println!("No results.");
            }
            for s in suggestions {
                let target = match &s.target {
                    SearchTarget::Page(path) => path.clone(),
                    SearchTarget::Module(id) => format!("/modules ({id})"),
                    SearchTarget::External(url) => url.clone(),
                };
                println!("{:<28} {:<28} {target}", s.label, s.sub);
            }
            Ok(())
        }
        Command::Seed => {
            let today = parsed.today.unwrap_or_else(|| services.clock().today());
            let mut rng = match parsed.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let planned = plan_sessions(today, &mut rng)?;
            let report = reseed(services.storage().sessions.as_ref(), planned).await?;
            println!(
                "seeded {} classes around {today} (removed {})",
                report.inserted, report.removed
            );
            Ok(())
        }
    }
}

fn print_timetable(board: &TimetableBoard, day: Option<Weekday>) {
    let today = board.today();
    let sessions: Vec<_> = match day {
        Some(day) => board.day(day).collect(),
        None => board.sessions().iter().collect(),
    };
    if sessions.is_empty() {
        println!("No classes scheduled.");
        return;
    }
    for s in sessions {
        let lock = if athena_core::attendance::is_editable(s.class_date, today) {
            ""
        } else {
            " (locked)"
        };
        println!(
            "#{:<4} {} {:<9} {}  {:<8} {:<7} {:<8} {}{lock}",
            s.id.value(),
            s.class_date,
            s.day_name(),
            s.formatted_time(),
            s.duration_label(),
            s.module_code,
            s.label().as_str(),
            s.class_location,
        );
    }
}

fn print_stats(board: &TimetableBoard) {
    let stats = board.stats();
    println!(
        "Overall attendance: {}% ({} of {} classes held)",
        stats.percentage, stats.total_attended, stats.total_held
    );
    for module in board.by_module() {
        println!(
            "  {:<8} {:>3}%  {}/{}",
            module.module_code, module.percentage, module.attended, module.marked
        );
    }
}

fn print_learn_help() {
    println!("Commands:");
    println!("  modules            list modules");
    println!("  module <id>        pick a module (e.g. m1)");
    println!("  levels             show the level map");
    println!("  level <n>          open a level");
    println!("  quiz               start the open level's quiz");
    println!("  answer <n>         answer with option n (1-based)");
    println!("  back               go back one screen");
    println!("  ask <text>         ask the tutor anything");
    println!("  quit");
}

async fn learn_loop(mut session: LearningSession) -> Result<(), Box<dyn std::error::Error>> {
    let mut printed = flush_transcript(&session, 0);
    print_learn_help();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("athena> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let (verb, rest) = line
            .trim()
            .split_once(' ')
            .map_or((line.trim(), ""), |(v, r)| (v, r.trim()));

        let result: Result<(), Box<dyn std::error::Error>> = match verb {
            "" => Ok(()),
            "quit" | "exit" => break,
            "help" => {
                print_learn_help();
                Ok(())
            }
            "modules" => {
                for m in session.modules() {
                    println!("  {}  {:<8} {}", m.id, m.code, m.name);
                }
                Ok(())
            }
            "module" => session.select_module(rest).map_err(Into::into),
            "levels" => {
                print_levels(&session);
                Ok(())
            }
            "level" => match rest.parse() {
                Ok(id) => session.select_level(id).await.map_err(Into::into),
                Err(err) => Err(err.into()),
            },
            "quiz" => session.start_quiz().map(|()| print_quiz(&session)).map_err(Into::into),
            "answer" => match rest.parse::<usize>() {
                Ok(n) if n >= 1 => session
                    .submit_answer(n - 1)
                    .await
                    .map(|outcome| println!("Score: {}%", outcome.score))
                    .map_err(Into::into),
                _ => {
                    println!("answer takes an option number starting at 1");
                    Ok(())
                }
            },
            "back" => {
                session.back();
                Ok(())
            }
            "ask" => {
                session.send(rest).await;
                Ok(())
            }
            other => {
                println!("unknown command: {other} (try help)");
                Ok(())
            }
        };

        if let Err(err) = result {
            println!("{err}");
        }
        printed = flush_transcript(&session, printed);
        if session.view() == LearningView::Content {
            print_content(&session);
        }
    }
    Ok(())
}

fn flush_transcript(session: &LearningSession, from: usize) -> usize {
    let lines = session.transcript();
    for line in &lines[from..] {
        let who = match line.speaker {
            Speaker::Learner => "you",
            Speaker::Tutor => "athena",
        };
        println!("[{who}] {}", line.text);
    }
    lines.len()
}

fn print_levels(session: &LearningSession) {
    let progress = session.progress();
    println!("{}/{} levels completed", progress.completed, progress.total);
    for level in session.levels().levels() {
        println!(
            "  {} {:<20} {}",
            level.id(),
            level.title(),
            level.status().as_str()
        );
    }
}

fn print_content(session: &LearningSession) {
    if let Some(level) = session.current_level() {
        println!("== {} ==", level.title());
        println!("{}", level.content());
        for example in level.examples() {
            println!("  > {example}");
        }
        println!("(type quiz when ready)");
    }
}

fn print_quiz(session: &LearningSession) {
    if let Some(level) = session.current_level() {
        let question = level.gate_question();
        println!("{}", question.question());
        for (i, option) in question.options().iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(&mut args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn parses_mark_values() {
        assert_eq!(parse_mark("Present").unwrap(), Some(Attendance::Present));
        assert_eq!(parse_mark("absent").unwrap(), Some(Attendance::Absent));
        assert_eq!(parse_mark("none").unwrap(), None);
        assert!(parse_mark("late").is_err());
    }

    #[test]
    fn parses_flags() {
        let args = parse(&[
            "--db", "sqlite::memory:", "--id", "7", "--value", "absent", "--day", "wed",
        ])
        .unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.session_id, Some(SessionId::new(7)));
        assert_eq!(args.mark, Some(Some(Attendance::Absent)));
        assert_eq!(args.day, Some(Weekday::Wed));

        let args = parse(&["--today", "2023-11-15", "--seed", "42", "--query", "calc"]).unwrap();
        assert_eq!(args.today, NaiveDate::from_ymd_opt(2023, 11, 15));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.query.as_deref(), Some("calc"));
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(matches!(
            parse(&["--id"]),
            Err(ArgsError::MissingValue { flag: "--id" })
        ));
        assert!(matches!(
            parse(&["--today", "15/11/2023"]),
            Err(ArgsError::InvalidDate { .. })
        ));
        assert!(matches!(parse(&["--bogus"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn normalizes_relative_paths() {
        assert_eq!(
            normalize_sqlite_url("sqlite://already.db".into()),
            "sqlite://already.db"
        );
        let url = normalize_sqlite_url("data/dev.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/dev.sqlite3"));
    }
}
