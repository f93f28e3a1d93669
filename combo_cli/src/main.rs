//! # combo CLI
//!
//! Command line front end for `combo_core`: generate combination files from
//! a `.combo.json` model, lint a model, list the built-in code tables and
//! scaffold starter models.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use serde::Serialize;

use combo_core::codes::DesignCode;
use combo_core::combinations::{CombinationSet, CombinationWriter, OutputFormat, Situation, WriterOptions};
use combo_core::file_io::{load_model, save_model, write_combination_files};
use combo_core::lint::LintWarning;
use combo_core::model::{CombinationModel, MODEL_EXTENSION};

#[derive(Parser)]
#[command(
    name = "combo",
    about = "Load combination generator for limit state design codes",
    version,
    propagate_version = true
)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate combinations from a model file
    Generate {
        /// Model file (.combo.json)
        model: PathBuf,

        /// Situations to generate (default: the model's selection)
        #[arg(long, value_enum, value_delimiter = ',')]
        situation: Vec<SituationArg>,

        #[arg(long, value_enum, default_value_t = FormatArg::Plain)]
        format: FormatArg,

        /// Directory for one file per situation (default: print to stdout)
        #[arg(long, short = 'o', env = "COMBO_OUTPUT")]
        output: Option<PathBuf>,

        /// First combination number for csv/json rows
        #[arg(long, default_value_t = 1)]
        offset: usize,

        /// Decimal places of coefficients
        #[arg(long, default_value_t = 4)]
        precision: usize,
    },

    /// Report consistency findings of a model
    Lint {
        /// Model file (.combo.json)
        model: PathBuf,
    },

    /// List the built-in design code tables
    Codes,

    /// Write a starter model
    Init {
        /// Path of the new model file
        path: PathBuf,

        #[arg(long, value_enum, default_value_t = CodeArg::Ec0Buildings)]
        code: CodeArg,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SituationArg {
    UlsPersistent,
    UlsAccidental,
    UlsSeismic,
    SlsRare,
    SlsFrequent,
    SlsQuasiPermanent,
}

impl From<SituationArg> for Situation {
    fn from(arg: SituationArg) -> Self {
        match arg {
            SituationArg::UlsPersistent => Situation::UlsPersistent,
            SituationArg::UlsAccidental => Situation::UlsAccidental,
            SituationArg::UlsSeismic => Situation::UlsSeismic,
            SituationArg::SlsRare => Situation::SlsRare,
            SituationArg::SlsFrequent => Situation::SlsFrequent,
            SituationArg::SlsQuasiPermanent => Situation::SlsQuasiPermanent,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Plain,
    Script,
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Plain => OutputFormat::Plain,
            FormatArg::Script => OutputFormat::Script,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CodeArg {
    Ec0Buildings,
    Ec0Bridges,
    Iapf,
    Sia260,
}

impl From<CodeArg> for DesignCode {
    fn from(arg: CodeArg) -> Self {
        match arg {
            CodeArg::Ec0Buildings => DesignCode::Ec0Buildings,
            CodeArg::Ec0Bridges => DesignCode::Ec0Bridges,
            CodeArg::Iapf => DesignCode::Iapf,
            CodeArg::Sia260 => DesignCode::Sia260,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            model,
            situation,
            format,
            output,
            offset,
            precision,
        } => {
            let writer = CombinationWriter::new(WriterOptions {
                precision,
                ..WriterOptions::default()
            });
            generate(&model, &situation, format.into(), output.as_deref(), offset, &writer, cli.json)
        }
        Commands::Lint { model } => lint(&model, cli.json),
        Commands::Codes => codes(cli.json),
        Commands::Init { path, code, force } => init(&path, code.into(), force),
    }
}

fn open_model(path: &Path) -> Result<CombinationModel> {
    load_model(path).with_context(|| format!("failed to load model {}", path.display()))
}

#[derive(Serialize)]
struct GenerateSummary {
    situation: Situation,
    combinations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
}

fn generate(
    path: &Path,
    situations: &[SituationArg],
    format: OutputFormat,
    output: Option<&Path>,
    offset: usize,
    writer: &CombinationWriter,
    json: bool,
) -> Result<()> {
    let model = open_model(path)?;
    let generator = model
        .build_generator()
        .with_context(|| format!("invalid model {}", path.display()))?;

    let selected: Vec<Situation> = if situations.is_empty() {
        model.situations.clone()
    } else {
        situations.iter().map(|&s| s.into()).collect()
    };

    let sets = selected
        .iter()
        .map(|&s| generator.generate(s))
        .collect::<Result<Vec<CombinationSet>, _>>()
        .context("combination generation failed")?;

    match output {
        Some(dir) => {
            let paths = write_combination_files(&sets, writer, format, offset, dir)
                .with_context(|| format!("failed to write combinations to {}", dir.display()))?;
            let summary: Vec<GenerateSummary> = sets
                .iter()
                .zip(paths)
                .map(|(set, path)| GenerateSummary {
                    situation: set.situation,
                    combinations: set.len(),
                    path: Some(path),
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for row in &summary {
                    let shown = row.path.as_deref().map(|p| p.display().to_string()).unwrap_or_default();
                    println!("{:<22} {:>5}  {}", row.situation.key(), row.combinations, shown);
                }
            }
        }
        None => {
            let mut next_id = offset;
            for set in &sets {
                print!("{}", writer.render(set, format, next_id)?);
                next_id += set.len();
            }
        }
    }
    Ok(())
}

fn lint(path: &Path, json: bool) -> Result<()> {
    let model = open_model(path)?;
    let generator = model
        .build_generator()
        .with_context(|| format!("invalid model {}", path.display()))?;
    let warnings: Vec<LintWarning> = generator.lint().context("relation resolution failed")?;

    for warning in &warnings {
        log::warn!("{}", warning);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&warnings)?);
    } else if warnings.is_empty() {
        println!("{}: no findings", path.display());
    } else {
        for warning in &warnings {
            println!("{}: {}", path.display(), warning);
        }
        println!("{} finding(s)", warnings.len());
    }
    Ok(())
}

#[derive(Serialize)]
struct CodeSummary {
    code: DesignCode,
    description: &'static str,
    reference: &'static str,
    partial_safety_factors: Vec<String>,
    combination_factors: Vec<String>,
}

fn codes(json: bool) -> Result<()> {
    let summaries: Vec<CodeSummary> = DesignCode::ALL
        .iter()
        .map(|&code| {
            let tables = code.factor_tables();
            CodeSummary {
                code,
                description: code.description(),
                reference: code.reference(),
                partial_safety_factors: tables.partial_safety_factors.keys().cloned().collect(),
                combination_factors: tables.combination_factors.keys().cloned().collect(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        println!("{} - {} ({})", summary.code.code(), summary.description, summary.reference);
        println!("  γ: {}", summary.partial_safety_factors.join(", "));
        println!("  ψ: {}", summary.combination_factors.join(", "));
    }
    Ok(())
}

fn init(path: &Path, code: DesignCode, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if !path.to_string_lossy().ends_with(MODEL_EXTENSION) {
        log::warn!("model files are usually named *.{}", MODEL_EXTENSION);
    }

    let model = CombinationModel::starter(code);
    save_model(&model, path).with_context(|| format!("failed to write {}", path.display()))?;
    println!("created {} ({})", path.display(), code.description());
    Ok(())
}
