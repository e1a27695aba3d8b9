mod settings;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use promptmix_core::{CombineMode, Config, Library, LibraryValue, validate_config};
use promptmix_engine::{
    BatchReport, EngineError, Session, apply_overrides, generate_batch, generate_cartesian,
};
use promptmix_io::{
    IoError, combinations_to_tsv, load_config, merge_default_libraries, parse_library_column,
    parse_master_sheet, save_config, write_combinations_csv, write_library_tsv,
};
use settings::{Settings, SettingsError, load_settings, save_settings};

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] promptmix_core::Error),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("store error: {0}")]
    Store(#[from] IoError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

#[derive(Parser, Debug)]
#[command(name = "promptmix", version, about = "Randomized-library combination generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a starter configuration, or merge starter libraries into an
    /// existing one.
    Init(InitArgs),
    /// Generate a batch of combinations into a run directory.
    Generate(GenerateArgs),
    /// Import libraries from a spreadsheet export into the configuration.
    Import(ImportArgs),
    /// Export library contents as TSV.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Path of the configuration to create.
    config: PathBuf,
    /// Overwrite an existing configuration instead of merging.
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Configuration to generate from.
    config: PathBuf,
    /// Number of combinations (random mode).
    #[arg(long, default_value_t = 10)]
    count: usize,
    /// RNG seed; falls back to promptmix.toml, then to OS entropy.
    #[arg(long)]
    seed: Option<u64>,
    /// Override the configuration's combination mode.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Base directory for run artifacts.
    #[arg(long)]
    run_dir: Option<PathBuf>,
    /// Output format for results.
    #[arg(long, value_enum, default_value = "csv")]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Spreadsheet export (CSV/TSV) to read.
    file: PathBuf,
    /// Configuration to merge into (created when missing).
    #[arg(long)]
    config: PathBuf,
    /// Treat the file as a master sheet (header row names libraries).
    #[arg(long, default_value_t = false)]
    master: bool,
    /// Library name for single-column imports.
    #[arg(long)]
    library: Option<String>,
    /// Cell delimiter of the input file.
    #[arg(long, value_enum, default_value = "tab")]
    delimiter: DelimiterArg,
    /// Replace existing libraries of the same name instead of keeping them.
    #[arg(long, default_value_t = false)]
    replace: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Configuration whose libraries are exported.
    config: PathBuf,
    /// Output TSV path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Random,
    Cartesian,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Tsv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DelimiterArg {
    Tab,
    Comma,
}

impl DelimiterArg {
    fn byte(self) -> u8 {
        match self {
            DelimiterArg::Tab => b'\t',
            DelimiterArg::Comma => b',',
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Init(args) => run_init(args),
        Command::Generate(args) => run_generate(args),
        Command::Import(args) => run_import(args),
        Command::Export(args) => run_export(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn starter_libraries() -> Vec<Library> {
    vec![
        Library::new(
            "场景",
            vec![
                LibraryValue::categorized("森林", vec!["自然".to_string()]),
                LibraryValue::categorized("海边", vec!["自然".to_string()]),
                LibraryValue::categorized("高楼", vec!["都市".to_string()]),
            ],
        ),
        Library::new(
            "风格",
            vec![
                LibraryValue::plain("水彩"),
                LibraryValue::plain("写实"),
                LibraryValue::weighted("素描", 2.0),
            ],
        ),
    ]
}

fn run_init(args: InitArgs) -> Result<(), CliError> {
    let config = if args.config.exists() && !args.force {
        let mut existing = load_config(&args.config)?;
        let added = merge_default_libraries(&mut existing, &starter_libraries());
        info!(added, path = %args.config.display(), "merged starter libraries");
        existing
    } else {
        info!(path = %args.config.display(), "writing starter configuration");
        Config::new(starter_libraries())
    };

    save_config(&args.config, &config)?;

    if let Some(dir) = args.config.parent() {
        if !dir.join(settings::SETTINGS_FILE).exists() {
            save_settings(dir, &Settings::default())?;
        }
    }
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let config_dir = args
        .config
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let settings = load_settings(&config_dir)?;

    let config = load_config(&args.config)?;
    for warning in validate_config(&config)? {
        warn!(code = %warning.code, message = %warning.message, "config warning");
    }

    let mut config = config;
    if let Some(mode) = args.mode {
        config.mode = match mode {
            ModeArg::Random => CombineMode::Random,
            ModeArg::Cartesian => CombineMode::Cartesian,
        };
    }

    let seed = args.seed.or(settings.default_seed);
    let mut session = match seed {
        Some(seed) => Session::with_seed(seed),
        None => Session::new(),
    };

    let base = args
        .run_dir
        .or(settings.run_dir)
        .unwrap_or_else(|| PathBuf::from("runs"));
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%SZ");
    let run_dir = base.join(format!("{timestamp}__run_{}", Uuid::new_v4()));
    fs::create_dir_all(&run_dir)?;

    info!(
        config = %args.config.display(),
        mode = ?config.mode,
        count = args.count,
        seed = ?seed,
        "generation started"
    );

    let (mut combinations, report) = match config.mode {
        CombineMode::Random => generate_batch(&config, &mut session, args.count),
        CombineMode::Cartesian => {
            let combinations = generate_cartesian(&config, &mut session);
            let mut report = BatchReport::new(combinations.len());
            report.generated = combinations.len();
            (combinations, report)
        }
    };
    apply_overrides(&mut combinations, &config.overrides)?;

    match args.format {
        OutputFormat::Csv => {
            write_combinations_csv(&run_dir.join("results.csv"), &combinations)?;
        }
        OutputFormat::Tsv => {
            fs::write(run_dir.join("results.tsv"), combinations_to_tsv(&combinations))?;
        }
    }
    fs::write(
        run_dir.join("batch_report.json"),
        serde_json::to_vec_pretty(&report)?,
    )?;

    info!(
        run_dir = %run_dir.display(),
        generated = report.generated,
        duplicates = report.duplicates_tolerated,
        "generation finished"
    );
    println!("{}", run_dir.display());
    Ok(())
}

fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let file = File::open(&args.file)?;
    let imported = if args.master {
        parse_master_sheet(file, args.delimiter.byte())?
    } else {
        let name = args.library.ok_or_else(|| {
            CliError::InvalidArgs("--library is required unless --master is set".to_string())
        })?;
        vec![parse_library_column(&name, file, args.delimiter.byte())?]
    };

    let mut config = if args.config.exists() {
        load_config(&args.config)?
    } else {
        Config::default()
    };

    let mut added = 0;
    let mut replaced = 0;
    for library in imported {
        match config
            .libraries
            .iter_mut()
            .find(|existing| existing.name == library.name)
        {
            Some(existing) if args.replace => {
                *existing = library;
                replaced += 1;
            }
            Some(existing) => {
                warn!(library = %existing.name, "library exists, skipped (use --replace)");
            }
            None => {
                config.libraries.push(library);
                added += 1;
            }
        }
    }

    validate_config(&config)?;
    save_config(&args.config, &config)?;
    info!(added, replaced, config = %args.config.display(), "import finished");
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<(), CliError> {
    let config = load_config(&args.config)?;
    write_library_tsv(&args.out, &config.libraries)?;
    info!(
        libraries = config.libraries.len(),
        out = %args.out.display(),
        "export finished"
    );
    Ok(())
}
