//! `gradebook` binary: service host and command-line client.
//!
//! # Responsibility
//! - `serve` opens the store, binds the three record services and hosts them.
//! - `student`, `subject` and `score` resolve remote handles from an
//!   endpoint and print results as JSON.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use gradebook_core::{
    default_log_level, init_logging, init_stderr_logging, parse_iso_date, Score, ScoreId, Services,
    Store, Student, Subject,
};
use gradebook_rpc::{ServiceLocator, ServiceRegistry, Server, DEFAULT_PORT};
use log::info;
use serde_json::Value;
use std::path::PathBuf;

const DEFAULT_ENDPOINT: &str = "gradebook://127.0.0.1:1099";

#[derive(Parser)]
#[command(name = "gradebook")]
#[command(about = "Student, subject and score records over a remote service host")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = default_log_level())]
    log_level: String,

    /// Absolute directory for rotating log files; logs go to stderr when omitted
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Host the record services
    Serve(ServeArgs),
    /// Student records
    Student {
        #[command(flatten)]
        remote: RemoteArgs,
        #[command(subcommand)]
        action: StudentAction,
    },
    /// Subject records
    Subject {
        #[command(flatten)]
        remote: RemoteArgs,
        #[command(subcommand)]
        action: SubjectAction,
    },
    /// Score records
    Score {
        #[command(flatten)]
        remote: RemoteArgs,
        #[command(subcommand)]
        action: ScoreAction,
    },
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// SQLite database file; an in-memory store is used when omitted
    #[arg(long)]
    db: Option<PathBuf>,
}

#[derive(Args)]
struct RemoteArgs {
    /// Service host address
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
}

#[derive(Args)]
struct StudentFields {
    #[arg(long)]
    msv: String,
    #[arg(long)]
    ten: String,
    /// Birth date as YYYY-MM-DD
    #[arg(long)]
    ngay_sinh: String,
    #[arg(long, default_value = "")]
    que_quan: String,
}

#[derive(Subcommand)]
enum StudentAction {
    List,
    Get {
        msv: String,
    },
    Add(StudentFields),
    Update(StudentFields),
    Delete {
        msv: String,
    },
}

#[derive(Args)]
struct SubjectFields {
    #[arg(long)]
    ma_mon: String,
    #[arg(long)]
    ten_mon: String,
    #[arg(long)]
    so_tin_chi: i64,
}

#[derive(Subcommand)]
enum SubjectAction {
    List,
    Get {
        ma_mon: String,
    },
    Add(SubjectFields),
    Update(SubjectFields),
    Delete {
        ma_mon: String,
    },
}

#[derive(Args)]
struct ScoreFields {
    #[arg(long)]
    msv: String,
    #[arg(long)]
    ma_mon: String,
    #[arg(long, allow_negative_numbers = true)]
    diem: f64,
}

#[derive(Subcommand)]
enum ScoreAction {
    /// All scores, or one student's scores with --msv
    List {
        #[arg(long)]
        msv: Option<String>,
    },
    Get {
        msv: String,
        ma_mon: String,
    },
    /// One score by the id returned from `add`
    GetById {
        id: ScoreId,
    },
    Add(ScoreFields),
    Update(ScoreFields),
    Delete {
        msv: String,
        ma_mon: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    match cli.command {
        Command::Serve(args) => serve(args),
        Command::Student { remote, action } => print_json(run_student(&connect(&remote)?, action)?),
        Command::Subject { remote, action } => print_json(run_subject(&connect(&remote)?, action)?),
        Command::Score { remote, action } => print_json(run_score(&connect(&remote)?, action)?),
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let outcome = match &cli.log_dir {
        Some(dir) => {
            let dir = dir
                .to_str()
                .ok_or_else(|| anyhow!("log dir is not valid UTF-8: {}", dir.display()))?;
            init_logging(&cli.log_level, dir)
        }
        None => init_stderr_logging(&cli.log_level),
    };
    outcome.map_err(|message| anyhow!("logging setup failed: {message}"))
}

fn serve(args: ServeArgs) -> Result<()> {
    let store = match &args.db {
        Some(path) => Store::open(path)
            .with_context(|| format!("cannot open database {}", path.display()))?,
        None => Store::open_in_memory().context("cannot open in-memory database")?,
    };
    let registry = ServiceRegistry::with_services(&Services::local(store))?;
    let server = Server::bind((args.host.as_str(), args.port), registry)
        .with_context(|| format!("cannot bind {}:{}", args.host, args.port))?;
    info!(
        "event=serve module=cli status=ok addr={} persistent={}",
        server.local_addr()?,
        args.db.is_some()
    );
    server.serve()?;
    Ok(())
}

fn connect(remote: &RemoteArgs) -> Result<Services> {
    let locator = ServiceLocator::new(&remote.endpoint)?;
    Ok(locator.resolve_all()?)
}

fn run_student(services: &Services, action: StudentAction) -> Result<Value> {
    let students = &services.students;
    let value = match action {
        StudentAction::List => serde_json::to_value(students.get_all()?)?,
        StudentAction::Get { msv } => serde_json::to_value(
            students
                .find_by_id(&msv)?
                .ok_or_else(|| anyhow!("student `{msv}` not found"))?,
        )?,
        StudentAction::Add(fields) => serde_json::to_value(students.add(&fields.into_student()?)?)?,
        StudentAction::Update(fields) => {
            serde_json::to_value(students.update(&fields.into_student()?)?)?
        }
        StudentAction::Delete { msv } => {
            students.delete(&msv)?;
            Value::Null
        }
    };
    Ok(value)
}

fn run_subject(services: &Services, action: SubjectAction) -> Result<Value> {
    let subjects = &services.subjects;
    let value = match action {
        SubjectAction::List => serde_json::to_value(subjects.get_all()?)?,
        SubjectAction::Get { ma_mon } => serde_json::to_value(
            subjects
                .find_by_id(&ma_mon)?
                .ok_or_else(|| anyhow!("subject `{ma_mon}` not found"))?,
        )?,
        SubjectAction::Add(fields) => serde_json::to_value(subjects.add(&fields.into_subject())?)?,
        SubjectAction::Update(fields) => {
            serde_json::to_value(subjects.update(&fields.into_subject())?)?
        }
        SubjectAction::Delete { ma_mon } => {
            subjects.delete(&ma_mon)?;
            Value::Null
        }
    };
    Ok(value)
}

fn run_score(services: &Services, action: ScoreAction) -> Result<Value> {
    let scores = &services.scores;
    let value = match action {
        ScoreAction::List { msv: Some(msv) } => serde_json::to_value(scores.list_by_student(&msv)?)?,
        ScoreAction::List { msv: None } => serde_json::to_value(scores.get_all()?)?,
        ScoreAction::Get { msv, ma_mon } => serde_json::to_value(
            scores
                .find_by_key(&msv, &ma_mon)?
                .ok_or_else(|| anyhow!("score for student `{msv}` in subject `{ma_mon}` not found"))?,
        )?,
        ScoreAction::GetById { id } => serde_json::to_value(
            scores
                .find_by_id(id)?
                .ok_or_else(|| anyhow!("score #{id} not found"))?,
        )?,
        ScoreAction::Add(fields) => serde_json::to_value(scores.add(&fields.into_score())?)?,
        ScoreAction::Update(fields) => serde_json::to_value(scores.update(&fields.into_score())?)?,
        ScoreAction::Delete { msv, ma_mon } => {
            scores.delete(&msv, &ma_mon)?;
            Value::Null
        }
    };
    Ok(value)
}

fn print_json(value: Value) -> Result<()> {
    if !value.is_null() {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

impl StudentFields {
    fn into_student(self) -> Result<Student> {
        let ngay_sinh = parse_iso_date("ngaySinh", &self.ngay_sinh)?;
        Ok(Student::new(self.msv, self.ten, ngay_sinh, self.que_quan))
    }
}

impl SubjectFields {
    fn into_subject(self) -> Subject {
        Subject::new(self.ma_mon, self.ten_mon, self.so_tin_chi)
    }
}

impl ScoreFields {
    fn into_score(self) -> Score {
        Score::new(self.msv, self.ma_mon, self.diem)
    }
}
