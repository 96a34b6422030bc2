use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use rayon::prelude::*;

use fifteen_solver::heuristic::check_admissibility;
use fifteen_solver::pattern_db::{DEFAULT_PATH, TABLE_SIZE};
use fifteen_solver::puzzle::distances_from_goal;
use fifteen_solver::util::{move_labels, read_input, read_puzzles};
use fifteen_solver::{
    DebugPrintable, Estimator, MissingDbPolicy, Outcome, PatternDb, Preset, Puzzle, Solver, SolverConfig, Strategy,
};

#[derive(Debug, Parser)]
#[command(name = "fifteen_solver", about = "Optimal 15-puzzle solver: IDA* and RBFS over a walking-distance heuristic")]
struct Cli {
    /// Log at info level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve one board: 16 numbers as arguments, or one line on stdin
    Solve {
        tiles: Vec<String>,

        #[command(flatten)]
        opts: SolveOpts,

        /// Print every intermediate board of the solution
        #[arg(long)]
        show_states: bool,
    },
    /// Build the walking-distance pattern database and write it to disk
    BuildDb {
        #[arg(long, default_value = DEFAULT_PATH)]
        output: PathBuf,
    },
    /// Solve every board of a puzzle file (one per line) in parallel
    Batch {
        input: PathBuf,

        #[arg(long, default_value = "answers.txt")]
        output: PathBuf,

        /// Worker threads (defaults to one per core)
        #[arg(long)]
        threads: Option<usize>,

        #[command(flatten)]
        opts: SolveOpts,
    },
    /// Compare a heuristic preset with exact BFS distances near the goal
    Verify {
        #[arg(long, default_value_t = 10)]
        depth: u32,

        #[arg(long, value_enum, default_value_t = Preset::WalkingDistance)]
        heuristic: Preset,

        /// Table to use; built in memory when omitted
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct SolveOpts {
    /// JSON solver config; the flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    #[arg(long, value_enum)]
    heuristic: Option<Preset>,

    /// Walking-distance table path
    #[arg(long)]
    db: Option<PathBuf>,

    /// Keep solving without walking distance when the table cannot be loaded
    #[arg(long)]
    fallback: bool,

    #[arg(long)]
    max_bound: Option<u32>,
}

impl SolveOpts {
    fn resolve(&self) -> anyhow::Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::load(path)?,
            None => SolverConfig::default(),
        };

        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(preset) = self.heuristic {
            config.heuristic = preset.config();
        }
        if let Some(db) = &self.db {
            config.pattern_db = db.clone();
        }
        if self.fallback {
            config.on_missing_db = MissingDbPolicy::Fallback;
        }
        if self.max_bound.is_some() {
            config.max_bound = self.max_bound;
        }

        Ok(config)
    }
}

fn solve(tiles: &[String], opts: &SolveOpts, show_states: bool, verbose: bool) -> anyhow::Result<()> {
    if tiles.is_empty() {
        eprintln!("Enter 16 numbers separated by spaces:");
    }
    let input = read_input(tiles, io::stdin().lock()).context("failed to read board")?;
    let puzzle: Puzzle = input.parse().context("invalid board")?;
    let config = opts.resolve()?;

    println!("Initial state:");
    puzzle.debug_print(false);

    if !puzzle.is_solvable() {
        println!("{}", "The puzzle is not solvable.".red());
        return Ok(());
    }
    println!("{}", "The puzzle is solvable.".green());

    let evaluator = config.evaluator();
    let estimator = evaluator.estimator()?;
    if verbose {
        println!("Heuristic: {}", estimator.breakdown(&puzzle)?);
        println!("Manhattan distance per tile:");
        puzzle.debug_print(true);
    }

    let mut solver = Solver::new(&estimator, config.strategy).with_max_bound(config.max_bound);
    match solver.solve(&puzzle)? {
        Outcome::Unsolvable => println!("{}", "The puzzle is not solvable.".red()),
        Outcome::Solved(solution) => {
            println!("Moves: {}", solution.len());
            println!("Sequence: {}", move_labels(&solution.moves));
            println!("Generated states: {}", solution.stats.generated);

            if show_states {
                for (step, state) in puzzle.replay(&solution.moves)?.iter().enumerate() {
                    println!("Step {}:", step);
                    state.debug_print(false);
                }
            }
        }
    }

    Ok(())
}

fn build_db(output: &Path) -> anyhow::Result<()> {
    let pb = ProgressBar::new(TABLE_SIZE as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] profiles {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let db = PatternDb::build_with_progress(Some(&pb));
    pb.finish_with_message("done");

    db.save(output)?;
    println!("Saved {} profiles to {}", db.len(), output.display());
    Ok(())
}

fn batch(input: &Path, output: &Path, threads: Option<usize>, opts: &SolveOpts) -> anyhow::Result<()> {
    let entries = read_puzzles(input).with_context(|| format!("failed to read {}", input.display()))?;
    let config = opts.resolve()?;

    if let Some(threads) = threads {
        rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
    }

    let evaluator = config.evaluator();
    let estimator = evaluator.estimator()?;

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] puzzles {bar:40.cyan/blue} {pos}/{len}")?
            .progress_chars("=>-"),
    );

    let answers: Vec<String> = entries
        .par_iter()
        .map(|entry| {
            let answer = match &entry.puzzle {
                Err(e) => format!("error: {}", e),
                Ok(puzzle) => {
                    let mut solver = Solver::new(&estimator, config.strategy).with_max_bound(config.max_bound);
                    match solver.solve(puzzle) {
                        Ok(Outcome::Solved(solution)) if solution.is_empty() => "-".to_string(),
                        Ok(Outcome::Solved(solution)) => solution.moves_str(),
                        Ok(Outcome::Unsolvable) => "unsolvable".to_string(),
                        Err(e) => format!("error: {}", e),
                    }
                }
            };
            pb.inc(1);
            answer
        })
        .collect();
    pb.finish();

    let file = File::create(output).with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(
        writer,
        "# {} puzzles, {:?}, {:?}, {}",
        answers.len(),
        config.strategy,
        config.heuristic,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    for answer in &answers {
        writeln!(writer, "{}", answer)?;
    }
    writer.flush()?;

    println!("Wrote {} answers to {}", answers.len(), output.display());
    Ok(())
}

fn verify(depth: u32, preset: Preset, db: Option<&Path>) -> anyhow::Result<()> {
    let config = preset.config();

    let table = if config.walking_distance {
        Some(match db {
            Some(path) => PatternDb::load(path)?,
            None => PatternDb::build(),
        })
    } else {
        None
    };

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("enumerating boards within {} moves", depth));
    let corpus = distances_from_goal(depth);
    spinner.finish_and_clear();

    let estimator = Estimator::new(config, table.as_ref());
    let report = check_admissibility(&estimator, &corpus)?;

    println!(
        "{:?}: checked {} boards within {} moves, {} over-estimates",
        preset,
        report.checked,
        depth,
        report.violations.len()
    );
    for violation in report.violations.iter().take(10) {
        println!(
            "  {} exact {} estimate {}",
            violation.puzzle.serialized(),
            violation.exact,
            violation.estimate
        );
    }

    if report.is_admissible() {
        println!("{}", "no over-estimates found".green());
    } else {
        println!("{}", "heuristic over-estimates on this corpus".yellow());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Info } else { LevelFilter::Warn };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();

    match &cli.command {
        Command::Solve {
            tiles,
            opts,
            show_states,
        } => solve(tiles, opts, *show_states, cli.verbose),
        Command::BuildDb { output } => build_db(output),
        Command::Batch {
            input,
            output,
            threads,
            opts,
        } => batch(input, output, *threads, opts),
        Command::Verify { depth, heuristic, db } => verify(*depth, *heuristic, db.as_deref()),
    }
}
