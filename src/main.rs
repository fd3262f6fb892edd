use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use u_exam::config::ExamConfig;
use u_exam::export;
use u_exam::scheduler::{ExamScheduler, ScheduleRequest};
use u_exam::workbook::Workbook;
use u_exam::{ErrorKind, ExamError};

/// Compiles the constraints of a master workbook into an exam timetable.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Master workbook (JSON) with the subject sheets and the timeslot sheet.
    #[arg(short, long)]
    master: PathBuf,

    /// Also load items referenced by the selected ones.
    #[arg(short = 'x', long)]
    load_indirects: bool,

    /// Only schedule this group (sheet name).
    #[arg(short, long)]
    grade: Option<String>,

    /// Only schedule this course level.
    #[arg(short, long)]
    course: Option<u32>,

    /// Only schedule this term.
    #[arg(short, long)]
    semester: Option<u32>,

    /// Output file. Defaults to `<master>-timetable.json` next to the master.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every scheduled item with its constraints.
    #[arg(short, long)]
    verbose: bool,

    /// Debug logging.
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    fn level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }

    fn config(&self) -> Result<ExamConfig, ExamError> {
        let mut config = match &self.config {
            Some(path) => ExamConfig::load(path)?,
            None => ExamConfig::default(),
        };
        if self.load_indirects {
            config.load_indirects = true;
        }
        if let Some(group) = &self.grade {
            config.selection.group = Some(group.clone());
        }
        if let Some(course) = self.course {
            config.selection.course = Some(course);
        }
        if let Some(term) = self.semester {
            config.selection.term = Some(term);
        }
        Ok(config)
    }
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Input => 1,
        ErrorKind::Syntax => 2,
        ErrorKind::UnresolvedReference => 3,
        ErrorKind::EmptyDomain => 4,
        ErrorKind::NoSolution => 5,
    }
}

fn run(cli: &Cli) -> Result<(), ExamError> {
    let config = cli.config()?;
    let output = export::output_path(&cli.master, cli.output.as_deref())?;

    let workbook = Workbook::load(&cli.master)?;
    info!(master = %cli.master.display(), sheets = workbook.sheets.len(), "master loaded");

    let request = ScheduleRequest::new(workbook).with_config(config);
    let timetable = ExamScheduler::new().schedule(&request)?;

    if cli.verbose {
        for item in &timetable.items {
            println!("{item}");
            for line in item.describe_constraints() {
                println!("{line}");
            }
        }
    }

    export::write_timetable(&timetable.items, &request.config.columns, &output)?;

    println!("Timetable written to {}", output.display());
    print!("{}", timetable.summary);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error ({:?}): {e}", e.kind());
            ExitCode::from(exit_code(e.kind()))
        }
    }
}
