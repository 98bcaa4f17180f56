use anyhow::{anyhow, Context, Result};
use bloomset_core::{BloomFilter, FilterConfig, HashStrategy};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "bloomset", about = "Bloom filter over string keys")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print sizing and the modelled error rate of a configuration
    Info {
        /// JSON filter configuration (built-in default when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Insert every line of --insert, then test every line of --query
    Check {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        insert: PathBuf,
        #[arg(long)]
        query: Option<PathBuf>,
        /// Extra values to test, comma separated
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        value: Vec<String>,
    },

    /// Emit a configuration sized for a target error rate
    Estimate {
        #[arg(long)]
        expected: u64,
        #[arg(long)]
        error_rate: f64,
    },

    /// Measure the false-positive rate on random disjoint strings
    Simulate {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 10_000)]
        inserts: usize,
        #[arg(long, default_value_t = 10_000)]
        queries: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Serialize)]
struct FilterInfo {
    expected_elements: u64,
    num_bits: u32,
    num_hashes: usize,
    error_rate: f64,
    strategies: Vec<String>,
}

#[derive(Serialize)]
struct SimulationReport {
    inserted: usize,
    queried: usize,
    false_positives: usize,
    empirical_rate: f64,
    model_rate: f64,
    fill_ratio: f64,
}

fn load_config(path: Option<&Path>) -> Result<FilterConfig> {
    match path {
        Some(p) => FilterConfig::load(p).with_context(|| format!("reading config {}", p.display())),
        None => Ok(FilterConfig::default()),
    }
}

/// One value per line. Blank lines are kept: the empty string is a valid key.
fn read_values(path: &Path) -> Result<Vec<String>> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(s.lines().map(str::to_owned).collect())
}

/// Groups consecutive strategies of the same kind: `murmur32, double_hash x8`.
fn describe(strategies: &[HashStrategy]) -> Vec<String> {
    let mut out: Vec<(&'static str, usize)> = Vec::new();
    for s in strategies {
        match out.last_mut() {
            Some((name, n)) if *name == s.name() => *n += 1,
            _ => out.push((s.name(), 1)),
        }
    }
    out.into_iter()
        .map(|(name, n)| if n == 1 { name.to_string() } else { format!("{name} x{n}") })
        .collect()
}

fn filter_info(f: &BloomFilter) -> FilterInfo {
    FilterInfo {
        expected_elements: f.expected_elements(),
        num_bits: f.num_bits(),
        num_hashes: f.num_hashes(),
        error_rate: f.error_rate(),
        strategies: describe(f.strategies()),
    }
}

fn random_word(rng: &mut StdRng, prefix: char) -> String {
    let mut s = String::with_capacity(9);
    s.push(prefix);
    for _ in 0..8 {
        s.push(char::from(b'A' + rng.random_range(0..26u8)));
    }
    s
}

fn simulate(mut f: BloomFilter, inserts: usize, queries: usize, seed: Option<u64>) -> SimulationReport {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    // disjoint by prefix
    for _ in 0..inserts {
        f.add(&random_word(&mut rng, 'A'));
    }
    let false_positives = (0..queries).filter(|_| f.exists(&random_word(&mut rng, 'B'))).count();
    SimulationReport {
        inserted: inserts,
        queried: queries,
        false_positives,
        empirical_rate: if queries > 0 { false_positives as f64 / queries as f64 } else { 0.0 },
        model_rate: f.error_rate(),
        fill_ratio: f.fill_ratio(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Info { config, json } => {
            let f = load_config(config.as_deref())?.build()?;
            let info = filter_info(&f);
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("expected_elements: {}", info.expected_elements);
                println!("num_bits: {}", info.num_bits);
                println!("num_hashes: {}", info.num_hashes);
                println!("error_rate: {:.6}", info.error_rate);
                println!("strategies: {}", info.strategies.join(", "));
            }
        }
        Cmd::Check { config, insert, query, value } => {
            let mut f = load_config(config.as_deref())?.build()?;
            let inserted = read_values(&insert)?;
            for v in &inserted {
                f.add(v);
            }
            let mut probes = match query {
                Some(q) => read_values(&q)?,
                None => Vec::new(),
            };
            probes.extend(value);
            if probes.is_empty() {
                return Err(anyhow!("nothing to check: pass --query and/or --value"));
            }
            let mut present = 0usize;
            for p in &probes {
                let hit = f.exists(p);
                present += hit as usize;
                println!("{}\t{}", if hit { "maybe" } else { "absent" }, p);
            }
            info!(inserted = inserted.len(), probes = probes.len(), present, fill = f.fill_ratio(), "check done");
        }
        Cmd::Estimate { expected, error_rate } => {
            if !(error_rate > 0.0 && error_rate < 1.0) {
                return Err(anyhow!("--error-rate must be in (0, 1), got {error_rate}"));
            }
            let cfg = FilterConfig::for_error_rate(expected, error_rate);
            let f = cfg.build()?;
            info!(num_bits = f.num_bits(), num_hashes = f.num_hashes(), error_rate = f.error_rate(), "estimate");
            println!("{}", cfg.to_json()?);
        }
        Cmd::Simulate { config, inserts, queries, seed } => {
            let f = load_config(config.as_deref())?.build()?;
            let report = simulate(f, inserts, queries, seed);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
