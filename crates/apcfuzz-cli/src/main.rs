//! apcfuzz CLI - Differential testing for an arbitrary-precision calculator
//!
//! Usage:
//!   apcfuzz arith --iterations 5000       # Random arithmetic expressions
//!   apcfuzz numerals --iterations 5000    # Random base conversions
//!   apcfuzz matrix --cases-per-cell 10    # Every (source, target) base pair
//!   apcfuzz interactive                   # Type expressions, compare live
//!   apcfuzz widths                        # Print and check the limb table
//!   apcfuzz config                        # Print the effective config
//!
//! Exit status is 0 when every case passed, 1 when any case failed or the
//! run was aborted.

mod interactive;

use anyhow::{Context, Result};
use clap::{Args as RunArgs, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tabled::{Table, Tabled};

use apcfuzz::{CaseReport, Harness, HarnessConfig, Mode, ProcessSubject, limbs, report};

/// apcfuzz - Compare a calculator binary against a big-integer oracle
#[derive(Parser, Debug)]
#[command(name = "apcfuzz")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Calculator binary under test [default: build/apc]
    #[arg(long, global = true)]
    subject: Option<PathBuf>,

    /// JSON config file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Which non-empty output line holds the answer, counted from the end
    #[arg(long, global = true)]
    line_from_end: Option<usize>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(RunArgs, Debug)]
struct RunOpts {
    /// Seed for case generation (default: taken from the clock and printed)
    #[arg(long)]
    seed: Option<u64>,

    /// Save a JSON report to this path
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print passing cases too
    #[arg(long)]
    show_all: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Random arithmetic expressions
    Arith {
        /// Number of cases
        #[arg(long, default_value = "1000")]
        iterations: usize,

        /// Deepest expression level
        #[arg(long)]
        max_depth: Option<usize>,

        /// Chance that a literal is written in a random base
        #[arg(long)]
        based_literals: Option<f64>,

        #[command(flatten)]
        run: RunOpts,
    },
    /// Random numerals converted between random bases
    Numerals {
        /// Number of cases
        #[arg(long, default_value = "1000")]
        iterations: usize,

        #[command(flatten)]
        run: RunOpts,
    },
    /// Every ordered pair of distinct bases
    Matrix {
        /// Numerals per (source, target) pair
        #[arg(long, default_value = "5")]
        cases_per_cell: usize,

        #[command(flatten)]
        run: RunOpts,
    },
    /// Read expressions and compare answers as they are typed
    Interactive,
    /// Print the packed-digit width table and check its overflow bounds
    Widths {
        #[arg(long, value_enum, default_value_t = WidthFormat::Lookup)]
        format: WidthFormat,
    },
    /// Print the effective configuration as JSON
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum WidthFormat {
    /// Lookup-table initializer, one base per line
    Lookup,
    /// Aligned table
    Table,
}

#[derive(Tabled)]
struct WidthRow {
    #[tabled(rename = "Base")]
    base: u32,
    #[tabled(rename = "Digits per limb")]
    max_exponent: u32,
    #[tabled(rename = "Limb capacity")]
    limb_capacity: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args)?;

    let passed = match &args.command {
        Command::Arith {
            iterations,
            max_depth,
            based_literals,
            run,
        } => {
            let mut config = config;
            if let Some(depth) = max_depth {
                config.generator = config.generator.max_depth(*depth);
            }
            if let Some(p) = based_literals {
                config.generator = config.generator.based_literal_probability(*p);
            }
            run_mode(&config, Mode::Arithmetic, *iterations, run)?
        }
        Command::Numerals { iterations, run } => {
            run_mode(&config, Mode::Numerals, *iterations, run)?
        }
        Command::Matrix {
            cases_per_cell,
            run,
        } => run_mode(&config, Mode::Matrix, *cases_per_cell, run)?,
        Command::Interactive => {
            interactive::run(&config)?;
            true
        }
        Command::Widths { format } => widths(*format)?,
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            true
        }
    };

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` means debug and the default is warn.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "apcfuzz=debug,warn" } else { "warn" })
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Defaults, then the config file, then flags.
fn load_config(args: &Args) -> Result<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    if let Some(subject) = &args.subject {
        config = config.subject(subject);
    }
    if let Some(offset) = args.line_from_end {
        config = config.result_line_from_end(offset);
    }
    Ok(config)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() ^ (u64::from(d.subsec_nanos()) << 32))
        .unwrap_or(0)
}

/// Run one mode; `count` is iterations, or cases per cell for the matrix.
fn run_mode(config: &HarnessConfig, mode: Mode, count: usize, opts: &RunOpts) -> Result<bool> {
    let seed = opts.seed.unwrap_or_else(clock_seed);
    println!(
        "{} {} against {} (seed {})",
        "Running".bold().green(),
        mode,
        config.subject.display(),
        seed
    );

    let harness = Harness::new(ProcessSubject::new(&config.subject), config)
        .context("Harness setup failed")?;

    let show_all = opts.show_all;
    let on_case = |case: &CaseReport| {
        if !case.verdict.is_pass() {
            print!("{}", report::render_failure(case).red());
        } else if show_all {
            println!("{} {} = {}", "PASS".green(), case.subject_input, case.expected);
        }
    };
    let outcome = match mode {
        Mode::Arithmetic => harness.run_arithmetic(seed, count, on_case),
        Mode::Numerals => harness.run_numerals(seed, count, on_case),
        Mode::Matrix => harness.run_matrix(seed, count, on_case),
    }
    .context("Run aborted")?;

    println!("\n{}", "Summary:".bold());
    print!("{}", report::render_summary(mode, &outcome.statistics));
    if outcome.skipped > 0 {
        println!("{} {} cases could not be checked", "SKIPPED".yellow(), outcome.skipped);
    }

    if let Some(path) = &opts.save {
        let saved = report::build_report(
            mode,
            seed,
            &config.subject.display().to_string(),
            &outcome.statistics,
            &outcome.failures,
        );
        report::save_report(&saved, path)
            .with_context(|| format!("Failed to save report: {}", path.display()))?;
        println!("\n{} report to {}", "Saved".green(), path.display());
    }

    Ok(outcome.all_passed())
}

fn widths(format: WidthFormat) -> Result<bool> {
    let table = limbs::width_table().context("Failed to build width table")?;
    match format {
        WidthFormat::Lookup => print!("{}", limbs::render_table(&table)),
        WidthFormat::Table => {
            let rows: Vec<WidthRow> = table
                .iter()
                .map(|e| WidthRow {
                    base: e.base,
                    max_exponent: e.max_exponent,
                    limb_capacity: e.limb_capacity,
                })
                .collect();
            println!("{}", Table::new(rows));
        }
    }

    match limbs::verify_limb_table(&table) {
        Ok(checked) => {
            println!("{} {checked} triples, no overflow", "OK".green());
            Ok(true)
        }
        Err(e) => {
            eprintln!("{} {e}", "FAIL".red().bold());
            Ok(false)
        }
    }
}
