//! `skein`: drive a consistent-hash load balancer from command scripts.
//!
//! # Usage
//!
//! ```text
//! skein run commands.txt                 # run a script, results to stdout
//! skein run commands.txt -o results.txt  # results to a file
//! skein run < commands.txt               # script from stdin
//! skein -c skein.toml run commands.txt   # with a config file
//! skein stats commands.txt               # per-store counts and ring layout
//! skein bench -n 100000 -s 8             # in-memory throughput run
//! ```

mod config;
mod script;

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skein_balancer::LoadBalancer;
use skein_types::StoreId;
use tracing::info;

use config::CliConfig;
use script::ScriptRunner;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "skein",
    version,
    about = "Consistent-hash load balancer script driver"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true, env = "SKEIN_CONFIG")]
    config: Option<PathBuf>,

    /// Override bucket count per store.
    #[arg(short, long, global = true)]
    buckets: Option<usize>,

    /// Store to register before the script runs. Can be repeated; replaces
    /// `initial_stores` from the config file.
    #[arg(long = "store", global = true)]
    stores: Vec<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command script and write one line per result.
    Run {
        /// Script file. Reads stdin when omitted.
        script: Option<PathBuf>,

        /// Write results to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a script silently, then print per-store counts and the ring.
    Stats {
        /// Script file. Reads stdin when omitted.
        script: Option<PathBuf>,
    },

    /// Store and retrieve generated keys to measure throughput.
    Bench {
        /// Number of keys to store and retrieve.
        #[arg(short = 'n', long, default_value = "100000")]
        count: usize,

        /// Number of stores to spread keys over.
        #[arg(short, long, default_value = "8")]
        servers: u32,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    // CLI args override config file values.
    if let Some(buckets) = cli.buckets {
        config.balancer.bucket_count = buckets;
    }
    if !cli.stores.is_empty() {
        config.balancer.initial_stores = cli.stores.into_iter().map(StoreId::new).collect();
    }

    match cli.command {
        Commands::Run { script, output } => cmd_run(&config, script.as_deref(), output.as_deref()),
        Commands::Stats { script } => cmd_stats(&config, script.as_deref()),
        Commands::Bench { count, servers } => cmd_bench(&config, count, servers),
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
/// Logs go to stderr so they never mix with script results.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Build a balancer from config and register the initial stores.
fn build_balancer(config: &CliConfig) -> Result<LoadBalancer> {
    let mut balancer = LoadBalancer::new(config.balancer_config());
    for &id in &config.balancer.initial_stores {
        balancer
            .add_store(id)
            .with_context(|| format!("failed to add initial store {id}"))?;
    }
    Ok(balancer)
}

fn read_script(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read script {}", p.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read script from stdin")?;
            Ok(source)
        }
    }
}

// -----------------------------------------------------------------------
// skein run
// -----------------------------------------------------------------------

fn cmd_run(config: &CliConfig, script: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let source = read_script(script)?;
    let mut runner = ScriptRunner::new(build_balancer(config)?);

    let mut out: Box<dyn Write> = match output {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("failed to create {}", p.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let summary = runner.run(&source, &mut out).context("script failed")?;
    out.flush().context("failed to flush output")?;

    info!(
        commands = summary.commands,
        lines = summary.lines,
        migrations = summary.migrations,
        stores = runner.balancer().store_count(),
        entries = runner.balancer().len(),
        "script finished"
    );
    Ok(())
}

// -----------------------------------------------------------------------
// skein stats
// -----------------------------------------------------------------------

fn cmd_stats(config: &CliConfig, script: Option<&Path>) -> Result<()> {
    let source = read_script(script)?;
    let mut runner = ScriptRunner::new(build_balancer(config)?);
    let summary = runner.run(&source, &mut io::sink()).context("script failed")?;

    let balancer = runner.balancer();
    println!("Commands: {}", summary.commands);
    println!("Migrations: {}", summary.migrations);
    println!();

    println!("Stores: {}", balancer.store_count());
    for id in balancer.store_ids() {
        let Some(store) = balancer.get_store(id) else {
            continue;
        };
        let stats = store.stats();
        println!(
            "  server {id}: entries={} bytes={} buckets={}/{} longest_chain={}",
            stats.entries,
            stats.bytes,
            stats.occupied_buckets,
            store.bucket_count(),
            stats.longest_chain,
        );
    }
    println!("Total entries: {}", balancer.len());
    println!();

    println!("Ring: {} labels", balancer.ring().len());
    for (position, label) in balancer.ring().labels().enumerate() {
        println!(
            "  {position:>4}  label={:<8} server={:<6} replica={} hash={:#010x}",
            label.raw(),
            label.store().get(),
            label.replica(),
            label.hash(),
        );
    }
    Ok(())
}

// -----------------------------------------------------------------------
// skein bench
// -----------------------------------------------------------------------

fn cmd_bench(config: &CliConfig, count: usize, servers: u32) -> Result<()> {
    println!("Skein Benchmark");
    println!("  keys:    {count}");
    println!("  servers: {servers}");
    println!("  buckets: {}", config.balancer.bucket_count);
    println!();

    let mut balancer = LoadBalancer::new(config.balancer_config());
    for id in 0..servers {
        balancer.add_store(StoreId::new(id))?;
    }

    let keys = generate_bench_keys(count);

    // --- Store ---
    print!("Storing {count} keys... ");
    let start = Instant::now();
    for key in &keys {
        balancer.store(key, key)?;
    }
    let store_dur = start.elapsed();
    let store_ops = count as f64 / store_dur.as_secs_f64();
    println!("{:.2}s ({store_ops:.0} ops/s)", store_dur.as_secs_f64());

    // --- Retrieve ---
    print!("Retrieving {count} keys... ");
    let start = Instant::now();
    let mut found = 0usize;
    for key in &keys {
        if balancer.retrieve(key).is_some() {
            found += 1;
        }
    }
    let retrieve_dur = start.elapsed();
    let retrieve_ops = count as f64 / retrieve_dur.as_secs_f64();
    println!("{:.2}s ({retrieve_ops:.0} ops/s)", retrieve_dur.as_secs_f64());

    // --- Add one more server ---
    print!("Adding server {servers}... ");
    let start = Instant::now();
    let moved = balancer.add_store(StoreId::new(servers))?;
    println!("{:.2}s ({} keys moved)", start.elapsed().as_secs_f64(), moved.len());

    println!();
    println!("Summary:");
    println!("  Store throughput:    {store_ops:.0} ops/s");
    println!("  Retrieve throughput: {retrieve_ops:.0} ops/s");
    println!("  Keys found:          {found}/{count}");
    println!("  Distinct entries:    {}", balancer.len());

    Ok(())
}

/// Generate deterministic keys for benchmarking.
fn generate_bench_keys(count: usize) -> Vec<Vec<u8>> {
    let mut state: u32 = 0xDEAD_BEEF;
    (0..count)
        .map(|i| {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            format!("key-{i}-{state:08x}").into_bytes()
        })
        .collect()
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
