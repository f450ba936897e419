use clap::{Parser, Subcommand};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use rotating_cuckoo_rs::{
    ApproximateSetOps, CuckooTable, FilterConfig, Fingerprint, OccupancyStats,
    RotatingTable, RotationManager, TableSnapshot,
};
use serde::Serialize;
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure true/false positives and negatives against a word list
    Check {
        /// Newline-delimited words, at least twice `capacity` lines
        #[arg(short, long)]
        words: PathBuf,

        /// Number of words inserted before checking
        #[arg(short, long, default_value = "16384")]
        capacity: usize,

        /// Highest acceptable false negative rate
        #[arg(short, long, default_value = "0.01")]
        error_rate: f64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print only lines that were not seen before
    Dedup {
        /// Input file, stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Slots in the first table (overrides RCF_INITIAL_SIZE_K)
        #[arg(long)]
        initial_size: Option<usize>,
    },
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
struct Score {
    true_positives: usize,
    true_negatives: usize,
    false_positives: usize,
    false_negatives: usize,
}

impl Score {
    fn record(&mut self, positive: bool, should_be_positive: bool, key: &str) {
        match (should_be_positive, positive) {
            (true, true) => self.true_positives += 1,
            (true, false) => self.false_negatives += 1,
            (false, true) => {
                self.false_positives += 1;
                tracing::error!(key, "false positive");
            }
            (false, false) => self.true_negatives += 1,
        }
    }

    fn false_positive_rate(&self) -> f64 {
        self.false_positives as f64
            / (self.false_positives + self.true_negatives).max(1) as f64
    }

    fn false_negative_rate(&self) -> f64 {
        self.false_negatives as f64
            / (self.false_negatives + self.true_positives).max(1) as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
enum Verdict {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Serialize)]
struct StageReport {
    stage: &'static str,
    score: Score,
    /// Fingerprints dropped at the end of a displacement chain
    dropped_on_insert: usize,
    false_positive_rate: f64,
    false_negative_rate: f64,
    verdict: Verdict,
    tables: Vec<TableSnapshot>,
}

impl StageReport {
    fn new(
        stage: &'static str,
        score: Score,
        dropped_on_insert: usize,
        error_rate: f64,
        tables: Vec<TableSnapshot>,
    ) -> Self {
        let false_negative_rate = score.false_negative_rate();
        let verdict = if false_negative_rate > error_rate {
            Verdict::Fail
        } else if score.false_positives > 0 {
            Verdict::Warn
        } else {
            Verdict::Pass
        };
        Self {
            stage,
            score,
            dropped_on_insert,
            false_positive_rate: score.false_positive_rate(),
            false_negative_rate,
            verdict,
            tables,
        }
    }
}

/// One word per line. Blank lines count as words so the known/unknown split
/// follows line numbers.
fn read_words(reader: impl BufRead) -> io::Result<Vec<String>> {
    reader
        .lines()
        .map(|line| line.map(|word| word.trim_end_matches('\r').to_string()))
        .collect()
}

fn fingerprint(config: &FilterConfig, word: &str) -> Fingerprint {
    (config.fingerprint_function)(word.as_bytes(), config.hash_seed)
}

fn check_table(
    config: &FilterConfig,
    known: &[String],
    unknown: &[String],
    error_rate: f64,
) -> Result<StageReport, Box<dyn std::error::Error>> {
    let mut table = CuckooTable::with_max_tries(known.len() * 2, config.max_tries)?;

    let dropped = known
        .iter()
        .filter(|word| table.insert(fingerprint(config, word)).is_some())
        .count();

    let mut score = Score::default();
    for word in known {
        score.record(table.contains(fingerprint(config, word)), true, word);
    }
    for word in unknown {
        score.record(table.contains(fingerprint(config, word)), false, word);
    }
    info!(size_k = table.size_k(), count = table.count(), dropped, "cuckoo table checked");

    Ok(StageReport::new("cuckoo table", score, dropped, error_rate, Vec::new()))
}

fn check_rotating_table(
    config: &FilterConfig,
    known: &[String],
    unknown: &[String],
    error_rate: f64,
) -> Result<StageReport, Box<dyn std::error::Error>> {
    let mut table = RotatingTable::new(known.len() * 2, config)?;

    let dropped = known
        .iter()
        .filter(|word| table.insert(fingerprint(config, word)).is_some())
        .count();

    let mut score = Score::default();
    for word in known {
        score.record(table.lookup(fingerprint(config, word)), true, word);
    }
    for word in unknown {
        score.record(table.lookup(fingerprint(config, word)), false, word);
    }

    let tables = vec![TableSnapshot::from(&table)];
    Ok(StageReport::new("rotating table", score, dropped, error_rate, tables))
}

fn check_manager(
    config: &FilterConfig,
    known: &[String],
    unknown: &[String],
    error_rate: f64,
) -> Result<StageReport, Box<dyn std::error::Error>> {
    let config = FilterConfig {
        initial_size_k: (known.len() / 2).max(1),
        ..config.clone()
    };
    let mut filter = RotationManager::new(config)?;

    for word in known {
        filter.insert_item(word.as_bytes())?;
        filter.contains_item(word.as_bytes());
    }

    let mut score = Score::default();
    for word in known {
        score.record(filter.contains_item(word.as_bytes()), true, word);
    }
    for word in unknown {
        score.record(filter.contains_item(word.as_bytes()), false, word);
    }

    info!(filter = ?filter, "rotation manager checked");
    Ok(StageReport::new(
        "rotation manager",
        score,
        0,
        error_rate,
        filter.snapshot().tables,
    ))
}

fn print_reports(reports: &[StageReport]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Stage"),
            Cell::new("TP").set_alignment(CellAlignment::Right),
            Cell::new("TN").set_alignment(CellAlignment::Right),
            Cell::new("FP").set_alignment(CellAlignment::Right),
            Cell::new("FN").set_alignment(CellAlignment::Right),
            Cell::new("Dropped").set_alignment(CellAlignment::Right),
            Cell::new("FP rate").set_alignment(CellAlignment::Right),
            Cell::new("FN rate").set_alignment(CellAlignment::Right),
            Cell::new("Verdict"),
        ]);

    for report in reports {
        table.add_row(vec![
            Cell::new(report.stage),
            Cell::new(report.score.true_positives),
            Cell::new(report.score.true_negatives),
            Cell::new(report.score.false_positives),
            Cell::new(report.score.false_negatives),
            Cell::new(report.dropped_on_insert),
            Cell::new(format!("{:.4}", report.false_positive_rate)),
            Cell::new(format!("{:.4}", report.false_negative_rate)),
            Cell::new(format!("{:?}", report.verdict)),
        ]);
    }
    println!("{table}");

    for report in reports {
        for snapshot in &report.tables {
            println!("\n[{}]\n{snapshot}", report.stage);
        }
    }
}

fn dedup(
    config: FilterConfig,
    input: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut filter = RotationManager::new(config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let (mut seen, mut emitted) = (0usize, 0usize);
    for line in reader.lines() {
        let line = line?;
        seen += 1;
        if filter.insert_if_absent(line.as_bytes())? {
            emitted += 1;
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;

    info!(seen, emitted, "dedup finished");
    eprintln!("{}", filter.snapshot());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = FilterConfig::from_env()?;

    match cli.command {
        Commands::Check {
            words,
            capacity,
            error_rate,
            json,
        } => {
            let words = read_words(BufReader::new(File::open(&words)?))?;
            let known_len = capacity.min(words.len());
            let (known, rest) = words.split_at(known_len);
            let unknown = &rest[..rest.len().min(capacity * 2)];
            if known.is_empty() || unknown.is_empty() {
                return Err("word list needs more lines than --capacity".into());
            }
            info!(known = known.len(), unknown = unknown.len(), "loaded word list");

            let reports = vec![
                check_table(&config, known, unknown, error_rate)?,
                check_rotating_table(&config, known, unknown, error_rate)?,
                check_manager(&config, known, unknown, error_rate)?,
            ];

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                print_reports(&reports);
            }

            let failures = reports.iter().filter(|r| r.verdict == Verdict::Fail).count();
            let warnings = reports.iter().filter(|r| r.verdict == Verdict::Warn).count();
            println!("\n** {failures} failures, {warnings} warnings");
            if failures > 0 {
                std::process::exit(1);
            }
        }
        Commands::Dedup {
            input,
            initial_size,
        } => {
            let config = match initial_size {
                Some(initial_size_k) => FilterConfig {
                    initial_size_k,
                    ..config
                },
                None => config,
            };
            dedup(config, input.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_words_keeps_blank_lines() {
        let words = read_words(Cursor::new("alpha\r\n\nbeta\n")).unwrap();
        assert_eq!(words, vec!["alpha", "", "beta"]);
    }
}
