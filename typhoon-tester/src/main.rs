mod logic;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{GameplayStrategy, ScenarioResult, run_strategy};
use typhoon_game::{CatalogSource, EmbeddedCatalog};

#[derive(Debug, Parser)]
#[command(name = "typhoon-tester", version = "0.1.0")]
#[command(about = "Automated QA for Typhoon Night - seeded autoplay with invariant and replay checks")]
struct Args {
    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of sessions per strategy and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Strategies to play (comma-separated), or "all"
    #[arg(long, default_value = "all")]
    strategies: String,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_seeds(input: &str) -> Result<Vec<u64>> {
    let seeds = split_csv(input)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed '{token}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        bail!("no seeds given");
    }
    Ok(seeds)
}

fn parse_strategies(input: &str) -> Result<Vec<GameplayStrategy>> {
    if input.trim().eq_ignore_ascii_case("all") {
        return Ok(GameplayStrategy::ALL.to_vec());
    }
    let strategies = split_csv(input)
        .iter()
        .map(|token| token.parse::<GameplayStrategy>().map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;
    if strategies.is_empty() {
        bail!("no strategies given");
    }
    Ok(strategies)
}

fn announce_banner(args: &Args, seeds: &[u64], strategies: &[GameplayStrategy]) {
    println!("{}", "🌀 Typhoon Night Automated Tester".bright_cyan().bold());
    println!("Seeds: {seeds:?}");
    let labels: Vec<&str> = strategies.iter().map(|s| s.label()).collect();
    println!("Strategies: {}", labels.join(", "));
    println!("Iterations: {}", args.iterations);
    println!();
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start_time = Instant::now();

    let seeds = parse_seeds(&args.seeds)?;
    let strategies = parse_strategies(&args.strategies)?;
    let catalog = match EmbeddedCatalog.load_catalog() {
        Ok(catalog) => catalog,
        Err(never) => match never {},
    };

    announce_banner(&args, &seeds, &strategies);

    let mut results = Vec::new();
    for &seed in &seeds {
        for &strategy in &strategies {
            let result = run_strategy(&catalog, strategy, seed, args.iterations, args.verbose);
            if args.verbose {
                let status = if result.passed {
                    "✅".green()
                } else {
                    "❌".red()
                };
                println!("{status} {}", result.scenario_name);
            }
            results.push(result);
        }
    }

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|result| !result.passed) {
        eprintln!("{}", "Some autoplay runs failed".red());
        std::process::exit(1);
    }
    Ok(())
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, results)?,
        _ => {
            logic::reports::generate_console_report(
                &mut output_target,
                results,
                start_time.elapsed(),
            )?;
            let duration = start_time.elapsed();
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
