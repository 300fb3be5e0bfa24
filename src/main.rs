//! Replays a virtual-address trace against a demand-paged address space
//! backed by a paging store, writing one report line per reference and a
//! statistics summary at the end.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use vmtrace::engine::TranslationEngine;
use vmtrace::error::VmError;
use vmtrace::io::{read_trace, write_report};
use vmtrace::memory::PagingStore;

#[derive(Parser)]
#[command(about = "Translates virtual address traces against a paged backing store")]
struct Cli {
    /// Trace file with one virtual address per line, optionally marked R or W
    trace: PathBuf,

    /// Backing store image holding every page's canonical content
    #[arg(short, long, default_value = "BACKING_STORE.bin")]
    store: PathBuf,

    /// Report file receiving one line per translated address
    #[arg(short, long, default_value = "results.txt")]
    output: PathBuf,

    /// Log every fault and write-back as it happens
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), VmError> {
    let trace = read_trace(&cli.trace)?;
    let store = PagingStore::open(&cli.store)?;
    let mut engine = TranslationEngine::new(store);

    let mut results = Vec::with_capacity(trace.len());
    for entry in &trace {
        match engine.translate(entry.address, entry.kind) {
            Ok(translation) => results.push(translation),
            // A rejected address leaves the engine intact; drop it and go on.
            Err(e @ VmError::AddressOutOfRange(_)) => log::warn!("{e}"),
            Err(e) => return Err(e),
        }
    }

    write_report(&cli.output, &results)?;
    println!("{}", engine.stats());
    Ok(())
}
