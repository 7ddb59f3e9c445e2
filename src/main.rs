//! Command line front end for the Rikudo solver and generator

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{LevelFilter, Log, Metadata, Record};
use rikudo::{
    config::{CliOverrides, Settings, SolveMethod},
    graph::{save_graph_to_file, Graph},
    rikudo::{MinimalityReport, Puzzle, PuzzleMinimizer, RikudoProblem, SolveOutcome},
    utils::{ColorOutput, PuzzleFormatter},
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "rikudo")]
#[command(about = "Rikudo puzzle solver and generator")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Sat,
    Backtracking,
}

impl From<MethodArg> for SolveMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Sat => SolveMethod::Sat,
            MethodArg::Backtracking => SolveMethod::Backtracking,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a puzzle
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Puzzle file (overrides config)
        #[arg(short, long)]
        puzzle: Option<PathBuf>,

        /// Start vertex (overrides config)
        #[arg(long)]
        start: Option<usize>,

        /// End vertex (overrides config)
        #[arg(long)]
        end: Option<usize>,

        /// Solving method (overrides config)
        #[arg(short, long, value_enum)]
        method: Option<MethodArg>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also count all solutions
        #[arg(long)]
        count: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate a minimal puzzle with a unique solution
    Generate {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Start vertex (overrides config)
        #[arg(long)]
        start: Option<usize>,

        /// End vertex (overrides config)
        #[arg(long)]
        end: Option<usize>,

        /// Random seed (overrides config)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check that a puzzle is uniquely solvable and minimal
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Puzzle file
        #[arg(short, long)]
        puzzle: PathBuf,

        /// Drop redundant hints and write the puzzle back
        #[arg(long)]
        fix: bool,
    },

    /// Create example configuration and input files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

/// Prints library log records to stderr
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: bool) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if verbose { LevelFilter::Debug } else { LevelFilter::Warn });
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            config,
            puzzle,
            start,
            end,
            method,
            output,
            count,
            verbose,
        } => {
            init_logging(verbose);
            let overrides = CliOverrides {
                start,
                end,
                method: method.map(SolveMethod::from),
                puzzle_file: puzzle,
                output_dir: output,
                ..Default::default()
            };
            solve_command(config, overrides, count, verbose)
        }
        Commands::Generate {
            config,
            start,
            end,
            seed,
            output,
            verbose,
        } => {
            init_logging(verbose);
            let overrides = CliOverrides {
                start,
                end,
                seed,
                output_dir: output,
                ..Default::default()
            };
            generate_command(config, overrides, verbose)
        }
        Commands::Check { config, puzzle, fix } => {
            init_logging(false);
            check_command(config, puzzle, fix)
        }
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

fn load_settings(config_path: &PathBuf, overrides: &CliOverrides) -> Result<Settings> {
    let mut settings = if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!(
                "Config file {} not found, using defaults",
                config_path.display()
            ))
        );
        Settings::default()
    };
    settings.merge_with_cli(overrides);
    Ok(settings)
}

fn solve_command(config_path: PathBuf, overrides: CliOverrides, count: bool, verbose: bool) -> Result<()> {
    println!("{}", ColorOutput::info("🔄 Starting Rikudo solver"));

    let settings = load_settings(&config_path, &overrides)?;
    let problem = RikudoProblem::new(settings)?;
    let puzzle = problem.load_puzzle().context("Failed to load puzzle")?;
    let layout = problem.layout();

    println!("{}", PuzzleFormatter::format_puzzle(&puzzle, layout));
    if verbose {
        println!("{}", problem.encoding_statistics(&puzzle)?);
    }

    let report = problem.solve(&puzzle).context("Failed to solve puzzle")?;
    match report.outcome {
        SolveOutcome::Solved(_) => println!(
            "{}",
            ColorOutput::success(&format!("✅ Solved in {:.3}s", report.solve_time.as_secs_f64()))
        ),
        SolveOutcome::Unsatisfiable => {
            println!("{}", ColorOutput::warning("❌ Puzzle has no solution"));
            return Ok(());
        }
        SolveOutcome::Timeout => {
            println!("{}", ColorOutput::warning("⏱️  Solver timed out"));
            return Ok(());
        }
    }

    if let Some(solution) = &report.solution {
        println!("\n{}", PuzzleFormatter::format_solution(solution, layout));

        let output = &problem.settings().output;
        let path = PuzzleFormatter::save_solution(solution, &output.output_directory, output.format, layout)
            .context("Failed to save solution")?;
        println!("{}", ColorOutput::success(&format!("Solution saved to {}", path.display())));
    }

    if count {
        let solutions = problem.count_solutions(&puzzle, None)?;
        println!("Solutions: {}", solutions);
    }

    Ok(())
}

fn generate_command(config_path: PathBuf, overrides: CliOverrides, verbose: bool) -> Result<()> {
    println!("{}", ColorOutput::info("🎲 Generating Rikudo puzzle"));

    let settings = load_settings(&config_path, &overrides)?;
    let problem = RikudoProblem::new(settings)?;
    let layout = problem.layout();

    let start_time = Instant::now();
    let generated = problem.generate().context("Failed to generate puzzle")?;
    println!(
        "{}",
        ColorOutput::success(&format!(
            "✅ Generated a puzzle with {} hints in {:.3}s",
            generated.puzzle.hint_count(),
            start_time.elapsed().as_secs_f64()
        ))
    );

    println!("{}", PuzzleFormatter::format_puzzle(&generated.puzzle, layout));
    if verbose {
        println!("{}", generated.statistics);
        println!("{}", PuzzleFormatter::format_path(&generated.solution, layout));
    }

    let output = &problem.settings().output;
    let name = format!("puzzle_{}v_{}h", generated.puzzle.vertex_count(), generated.puzzle.hint_count());
    let path = PuzzleFormatter::save_puzzle(&generated.puzzle, &output.output_directory, &name, output.format, layout)
        .context("Failed to save puzzle")?;
    println!("{}", ColorOutput::success(&format!("Puzzle saved to {}", path.display())));

    Ok(())
}

fn check_command(config_path: PathBuf, puzzle_path: PathBuf, fix: bool) -> Result<()> {
    println!("{}", ColorOutput::info("🔍 Checking puzzle..."));

    let settings = load_settings(&config_path, &CliOverrides::default())?;
    let problem = RikudoProblem::new(settings)?;
    let mut puzzle = Puzzle::load_from_file(&puzzle_path)?;

    let report = problem.check(&puzzle)?;
    match &report {
        MinimalityReport::Minimal => println!("{}", ColorOutput::success("✅ Puzzle is unique and minimal")),
        MinimalityReport::Redundant(_) => println!("{}", ColorOutput::warning(&format!("⚠️  Puzzle is {}", report))),
        MinimalityReport::NotUnique(_) => println!("{}", ColorOutput::error(&format!("❌ Puzzle is {}", report))),
    }

    if fix && matches!(report, MinimalityReport::Redundant(_)) {
        let removed = PuzzleMinimizer::new(problem.encoder()).makes_good(&mut puzzle)?;
        for hint in &removed {
            println!("Dropped {}", hint);
        }
        puzzle.save_to_file(&puzzle_path)?;
        println!(
            "{}",
            ColorOutput::success(&format!("Minimal puzzle written to {}", puzzle_path.display()))
        );
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("🛠️  Setting up project structure..."));

    let config_dir = directory.join("config");
    let input_dir = directory.join("input");
    let output_dir = directory.join("output/puzzles");

    for dir in [&config_dir, &input_dir, &output_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    // An example adjacency file: the 5-cycle
    let graph_path = input_dir.join("cycle5.txt");
    save_graph_to_file(&Graph::cycle(5)?, &graph_path)?;
    println!("Created: {}", graph_path.display());

    let examples_dir = config_dir.join("examples");
    std::fs::create_dir_all(&examples_dir)?;

    let mut backtracking = Settings::default();
    backtracking.solver.method = SolveMethod::Backtracking;
    backtracking.to_file(&examples_dir.join("backtracking.yaml"))?;

    let mut from_file = Settings::default();
    from_file.graph.topology = rikudo::config::Topology::File;
    from_file.graph.adjacency_file = Some(PathBuf::from("input/cycle5.txt"));
    from_file.puzzle.start = 0;
    from_file.puzzle.end = 4;
    from_file.to_file(&examples_dir.join("cycle_file.yaml"))?;

    let mut large = Settings::default();
    large.graph.width = 6;
    large.graph.height = 6;
    large.puzzle.end = 5;
    large.generator.seed = Some(1);
    large.to_file(&examples_dir.join("grid6x6.yaml"))?;

    println!("Created example configurations in: {}", examples_dir.display());

    println!("\n{}", ColorOutput::success("✅ Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: cargo run -- generate --config config/default.yaml");
    println!("3. Run: cargo run -- solve --puzzle output/puzzles/<file>.json");

    Ok(())
}
