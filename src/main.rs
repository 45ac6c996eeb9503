//! Command-line runner: generate, multiply in parallel, watch, report.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use matmul_monitor::config::DEFAULT_PRINT_LIMIT;
use matmul_monitor::matrix::display::{fits_print_limit, format_matrix};
use matmul_monitor::matrix::generate::DEFAULT_SEED;
use matmul_monitor::partition::available_cores;
use matmul_monitor::report::distribution_table;
use matmul_monitor::{Orchestrator, RunConfig};

#[derive(Parser, Debug)]
#[command(
    name = "matmul-monitor",
    version,
    about = "Multiply two random integer matrices on pinned worker threads and watch them run"
)]
struct Cli {
    /// Rows of A (prompted for when omitted)
    #[arg(long, env = "MATMUL_ROWS_A")]
    rows_a: Option<usize>,

    /// Columns of A, which is also the rows of B (prompted for when omitted)
    #[arg(long, env = "MATMUL_COLS_A")]
    cols_a: Option<usize>,

    /// Columns of B (prompted for when omitted)
    #[arg(long, env = "MATMUL_COLS_B")]
    cols_b: Option<usize>,

    /// Seed for operand generation
    #[arg(long, env = "MATMUL_SEED", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Worker threads, capped at the available cores and at rows of A
    #[arg(short, long, env = "MATMUL_THREADS")]
    threads: Option<usize>,

    /// Milliseconds between two frames of the live table
    #[arg(
        long,
        env = "MATMUL_INTERVAL_MS",
        default_value_t = 50,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    interval_ms: u64,

    /// Print A, B and C when every side is at most this long
    #[arg(long, env = "MATMUL_PRINT_LIMIT", default_value_t = DEFAULT_PRINT_LIMIT)]
    print_limit: usize,

    /// Also time the single-threaded product and check the result against it
    #[arg(long, env = "MATMUL_COMPARE")]
    compare: bool,
}

fn prompt(label: &str) -> io::Result<usize> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{}: ", label);
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no value for {}", label),
            ));
        }
        match line.trim().parse() {
            Ok(v) => return Ok(v),
            Err(_) => println!("  not a non-negative integer: {:?}", line.trim()),
        }
    }
}

fn build_config(cli: Cli) -> io::Result<RunConfig> {
    let rows_a = match cli.rows_a {
        Some(v) => v,
        None => prompt("Rows of A")?,
    };
    let cols_a = match cli.cols_a {
        Some(v) => v,
        None => prompt("Columns of A (= rows of B)")?,
    };
    let cols_b = match cli.cols_b {
        Some(v) => v,
        None => prompt("Columns of B")?,
    };

    Ok(RunConfig {
        rows_a,
        cols_a,
        cols_b,
        seed: cli.seed,
        threads: cli.threads,
        monitor_interval: Duration::from_millis(cli.interval_ms),
        print_limit: cli.print_limit,
        compare_sequential: cli.compare,
    })
}

fn run(config: RunConfig) -> matmul_monitor::Result<()> {
    config.validate()?;
    let orchestrator = Orchestrator::new(config.clone());
    let ranges = orchestrator.plan()?;
    let printable = fits_print_limit(config.rows_a, config.cols_b, config.print_limit);

    println!("\nSeed: {}", config.seed);
    println!("Logical cores available: {}", available_cores());
    println!("Worker threads:          {}", ranges.len());
    print!("{}", distribution_table(&ranges));
    println!("\nStarting monitored parallel multiplication...\n");

    let outcome = orchestrator.run()?;

    if printable {
        print!("{}", format_matrix(&outcome.a, "A"));
        print!("{}", format_matrix(&outcome.b, "B"));
        print!("{}", format_matrix(&outcome.c, "C = A x B"));
    }
    print!("{}", outcome.summary);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("matmul_monitor=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    println!("=== Matrix Multiplication - Parallel ===\n");

    let config = match build_config(cli) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "could not read dimensions");
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "multiplication failed");
            ExitCode::FAILURE
        }
    }
}
