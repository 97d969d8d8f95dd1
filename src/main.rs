use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use spinelog::config::EngineConfig;
use spinelog::engine::Machine;
use spinelog::printer;

/// Answers shown in `--count` mode before the rest are only counted.
const SHOWN_ANSWERS: usize = 5;

#[derive(Parser)]
#[command(name = "spinelog")]
#[command(about = "Run a sentence-form logic program and print its answers.", long_about = None)]
struct Cli {
    /// Program file; its last clause is the query.
    file: PathBuf,

    /// Dump the symbol table and compiled clauses before running.
    #[arg(long)]
    listing: bool,

    /// Print the first few answers and the total count only.
    #[arg(long)]
    count: bool,

    /// Stop after this many answers.
    #[arg(long)]
    max_answers: Option<usize>,

    /// Clause count from which argument indexing is used.
    #[arg(long)]
    index_threshold: Option<usize>,

    /// Never build the argument index.
    #[arg(long, conflicts_with = "index_threshold")]
    no_index: bool,
}

impl Cli {
    fn config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(n) = self.index_threshold {
            config.index_threshold = n;
        }
        if self.no_index {
            config.index_threshold = usize::MAX;
        }
        config
    }
}

fn main() -> ExitCode {
    init_logging();
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

/// `SPINELOG_TRACE=1` turns on engine tracing; otherwise `RUST_LOG` applies.
fn init_logging() {
    let trace = std::env::var("SPINELOG_TRACE")
        .map(|v| v == "1")
        .unwrap_or(false);
    let filter = if trace {
        EnvFilter::new("spinelog=trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    info!(file = %cli.file.display(), "processing");
    let start = Instant::now();
    let mut machine = Machine::from_file(&cli.file, cli.config())
        .with_context(|| format!("loading {}", cli.file.display()))?;
    info!(
        clauses = machine.clauses().len(),
        symbols = machine.symbols().count(),
        indexed = machine.is_indexed(),
        elapsed = ?start.elapsed(),
        "loaded"
    );

    if cli.listing {
        print!(
            "{}",
            printer::listing(machine.clauses(), machine.heap(), machine.symbols())
        );
    }

    info!("executing");
    let start = Instant::now();
    let limit = cli.max_answers.unwrap_or(usize::MAX);
    let mut total = 0;
    for answer in machine.answers().take(limit) {
        if !cli.count {
            println!("{}", printer::show_term(&answer));
        } else if total < SHOWN_ANSWERS {
            println!("[{}] *** ANSWER={}", total, printer::show_term(&answer));
        }
        total += 1;
    }
    if cli.count {
        if total > SHOWN_ANSWERS {
            println!("...");
        }
        println!("TOTAL ANSWERS={}", total);
    }
    info!(answers = total, elapsed = ?start.elapsed(), "done");
    Ok(())
}
