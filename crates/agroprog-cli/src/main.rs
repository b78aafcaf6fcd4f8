//! agroprog CLI - Weekly application program
//!
//! Reads the field status, application rule and dosage tables, schedules
//! every application due over the requested weeks and writes the two-sheet
//! program workbook.

use std::path::{Path, PathBuf};
use std::process;

use agroprog_core::{Horizon, ProgramInputs, Renderer, ScheduleError, Scheduler};
use agroprog_parser::records::parse_day_first_date;
use agroprog_parser::{load_dosages, load_rules, load_statuses};
use agroprog_render::{report_file_name, ExcelRenderer, JsonRenderer, TextRenderer};
use agroprog_solver::{generate_calendar, resolve_statuses, WeeklySolver};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod diagnostics;

use config::Config;
use diagnostics::{ExitCode, TerminalEmitter};

#[derive(Parser)]
#[command(name = "agroprog")]
#[command(author, version, about = "Weekly agricultural application scheduler", long_about = None)]
struct Cli {
    /// Verbose logging (-v warn, -vv info, -vvv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./agroprog.toml when present)
    #[arg(long, global = true, env = "AGROPROG_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the application program and write the workbook
    Generate(GenerateArgs),

    /// Read and validate the three input tables
    Check {
        #[command(flatten)]
        files: InputFiles,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the week windows of a horizon
    Calendar {
        /// First day of week 1 (dd/mm/yyyy or yyyy-mm-dd), today if omitted
        #[arg(long, value_parser = parse_start)]
        start: Option<NaiveDate>,

        /// Number of weeks (1-12)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        weeks: Option<u32>,
    },
}

#[derive(Args)]
struct InputFiles {
    /// Field status table (Lote, Bloque, Area_ha, Estado, Fecha_Estado, G_Forza)
    #[arg(long, value_name = "FILE")]
    status: Option<PathBuf>,

    /// Application rules table (Aplicacion, Edad_calendario, Estado_valido)
    #[arg(long, value_name = "FILE")]
    applications: Option<PathBuf>,

    /// Dosage table (Aplicacion, Tipo_Insumo, Cod_Insumo, Insumo, UM, Dosis)
    #[arg(long, value_name = "FILE")]
    inputs: Option<PathBuf>,

    /// Sheet of the dosage workbook to read
    #[arg(long, value_name = "NAME")]
    dosage_sheet: Option<String>,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    files: InputFiles,

    /// First day of week 1 (dd/mm/yyyy or yyyy-mm-dd), today if omitted
    #[arg(long, value_parser = parse_start)]
    start: Option<NaiveDate>,

    /// Number of weeks (1-12)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
    weeks: Option<u32>,

    /// Directory for the workbook, named after the start date
    #[arg(long, value_name = "DIR", conflicts_with = "output")]
    output_dir: Option<PathBuf>,

    /// Exact workbook path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Preview format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Fail when a scheduled application has no dosage record
    #[arg(long)]
    strict: bool,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,

    /// Value of the Finca column
    #[arg(long, value_name = "NAME")]
    farm_name: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_start(value: &str) -> Result<NaiveDate, String> {
    parse_day_first_date(value)
        .ok_or_else(|| format!("invalid date '{value}', expected dd/mm/yyyy or yyyy-mm-dd"))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn main() -> process::ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let quiet = matches!(&cli.command, Commands::Generate(args) if args.quiet);
    let mut emitter = TerminalEmitter::new(std::io::stderr(), quiet);

    match run(cli, &mut emitter) {
        Ok(()) => emitter.exit_code().into(),
        Err(err) => {
            emitter.error(&err);
            ExitCode::Failure.into()
        }
    }
}

fn run<W: std::io::Write>(cli: Cli, emitter: &mut TerminalEmitter<W>) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate(args) => generate(&config, args, emitter),
        Commands::Check { files, format } => check(&config, &files, format),
        Commands::Calendar { start, weeks } => {
            let horizon = Horizon::new(
                start.unwrap_or_else(today),
                weeks.unwrap_or(config.default_weeks),
            )?;
            for week in generate_calendar(horizon.start, horizon.weeks) {
                println!(
                    "{:>2}  {}  {}  {}",
                    week.week_index,
                    week.start_date.format("%d/%m/%Y"),
                    week.end_date.format("%d/%m/%Y"),
                    week.label()
                );
            }
            Ok(())
        }
    }
}

impl InputFiles {
    /// The three table paths, or every table that is not given or not a file
    fn resolve(&self) -> Result<(&Path, &Path, &Path), ScheduleError> {
        let tables = [
            ("status", &self.status),
            ("applications", &self.applications),
            ("inputs", &self.inputs),
        ];
        let missing: Vec<String> = tables
            .iter()
            .filter(|(_, path)| !path.as_deref().is_some_and(Path::is_file))
            .map(|(name, _)| (*name).to_string())
            .collect();

        match (&self.status, &self.applications, &self.inputs) {
            (Some(status), Some(applications), Some(inputs)) if missing.is_empty() => {
                Ok((status.as_path(), applications.as_path(), inputs.as_path()))
            }
            _ => Err(ScheduleError::MissingInput(missing)),
        }
    }

    fn load(&self, config: &Config) -> Result<ProgramInputs> {
        let (status_path, rules_path, dosage_path) = self.resolve()?;
        let sheet = self
            .dosage_sheet
            .as_deref()
            .unwrap_or(config.dosage_sheet.as_str());

        let statuses = load_statuses(status_path)
            .with_context(|| format!("Failed to load {}", status_path.display()))?;
        let rules = load_rules(rules_path)
            .with_context(|| format!("Failed to load {}", rules_path.display()))?;
        let dosages = load_dosages(dosage_path, sheet)
            .with_context(|| format!("Failed to load {}", dosage_path.display()))?;

        tracing::info!(
            statuses = statuses.len(),
            rules = rules.len(),
            dosages = dosages.len(),
            "inputs loaded"
        );
        Ok(ProgramInputs::new(statuses, rules, dosages))
    }
}

fn generate<W: std::io::Write>(
    config: &Config,
    args: GenerateArgs,
    emitter: &mut TerminalEmitter<W>,
) -> Result<()> {
    let inputs = args.files.load(config)?;
    let start = args.start.unwrap_or_else(today);
    let horizon = Horizon::new(start, args.weeks.unwrap_or(config.default_weeks))?;

    let mut solver =
        WeeklySolver::new().farm_name(args.farm_name.as_deref().unwrap_or(&config.farm_name));
    if args.strict {
        solver = solver.strict();
    }

    let report = match solver.schedule(&inputs, &horizon) {
        Ok(report) => report,
        Err(ScheduleError::EmptySchedule) => {
            emitter.notice(&format!(
                "no applications scheduled between {} and {}",
                horizon.start.format("%d/%m/%Y"),
                horizon.end().format("%d/%m/%Y")
            ));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    emitter.program_warnings(&report.warnings);

    // The workbook is complete in memory before anything touches disk
    let workbook = ExcelRenderer::new().render(&report)?;

    if !args.quiet {
        match args.format {
            OutputFormat::Text => print!("{}", TextRenderer::new().render(&report)?),
            OutputFormat::Json => println!("{}", JsonRenderer::new().pretty().render(&report)?),
        }
    }

    let path = match args.output {
        Some(path) => path,
        None => args
            .output_dir
            .unwrap_or_else(|| config.output_dir.clone())
            .join(report_file_name(&config.file_tag, horizon.start)),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, workbook)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), "workbook written");
    emitter.info(&format!("wrote {}", path.display()));
    Ok(())
}

fn check(config: &Config, files: &InputFiles, format: OutputFormat) -> Result<()> {
    let inputs = files.load(config)?;
    let field_blocks = resolve_statuses(&inputs.statuses).len();

    match format {
        OutputFormat::Text => {
            println!(
                "status: {} records, {} field/blocks",
                inputs.statuses.len(),
                field_blocks
            );
            println!("applications: {} rules", inputs.rules.len());
            println!("inputs: {} dosage records", inputs.dosages.len());
        }
        OutputFormat::Json => {
            let counts = serde_json::json!({
                "status": inputs.statuses.len(),
                "field_blocks": field_blocks,
                "applications": inputs.rules.len(),
                "inputs": inputs.dosages.len(),
            });
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
    }
    Ok(())
}
