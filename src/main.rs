// dcopsim: a testbed for local-search DCOP algorithms (DSA, MGM, MGM-2).
// Instances are generated here, the solver core lives in the library.

// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use dcopsim::metrics::analyzer::{self, RunReport};
use dcopsim::metrics::logger::HistoryLogger;
use dcopsim::prelude::*;
use dcopsim::problem::CostPattern;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, Level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    Run {
        #[arg(short, long, default_value = "dsa")]
        algorithm: String,
        #[arg(short = 'n', long, default_value_t = 30)]
        agents: usize,
        #[arg(short, long, default_value_t = 10)]
        domain: usize,
        #[arg(long, default_value_t = 0.2)]
        p1: f64,
        #[arg(long, default_value_t = 1.0)]
        p2: f64,
        #[arg(short, long, default_value_t = 125)]
        steps: u64,
        #[arg(long, default_value_t = 0.7)]
        dsa_p: f64,
        #[arg(long, default_value_t = 0.5)]
        offer_p: f64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        coloring: bool,
        /// Write history CSV and report JSON into results/
        #[arg(long)]
        save: bool,
    },

    Compare {
        #[arg(short, long, default_value = "dsa,mgm,mgm2")]
        algorithms: String,
        #[arg(short = 'n', long, default_value_t = 30)]
        agents: usize,
        #[arg(short, long, default_value_t = 10)]
        domain: usize,
        #[arg(long, default_value_t = 0.2)]
        p1: f64,
        /// Comma separated, one comparison per value
        #[arg(long, default_value = "1.0")]
        p2: String,
        #[arg(short, long, default_value_t = 125)]
        steps: u64,
        #[arg(short, long, default_value_t = 10)]
        repetitions: u32,
        #[arg(long, default_value_t = 0.7)]
        dsa_p: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        save: bool,
    },

    List,
}

fn main() -> Result<()> {
    let program_start = Instant::now();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            algorithm,
            agents,
            domain,
            p1,
            p2,
            steps,
            dsa_p,
            offer_p,
            seed,
            coloring,
            save,
        } => {
            let pattern = if coloring { CostPattern::Coloring } else { CostPattern::Random };
            let generator = GeneratorConfig::new(agents, domain)
                .with_density(p1, p2)
                .with_pattern(pattern)
                .with_seed(seed.unwrap_or_else(rand::random));
            let params = AlgorithmParams::default()
                .with_dsa_probability(dsa_p)
                .with_pair_offer_probability(offer_p);
            run_single(&algorithm, &generator, params, seed, steps, save)?;
        }

        Commands::Compare {
            algorithms,
            agents,
            domain,
            p1,
            p2,
            steps,
            repetitions,
            dsa_p,
            seed,
            save,
        } => {
            let names: Vec<&str> = algorithms.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
            let params = AlgorithmParams::default().with_dsa_probability(dsa_p);
            for p2 in parse_list(&p2)? {
                let generator = GeneratorConfig::new(agents, domain).with_density(p1, p2);
                compare(&names, &generator, params, steps, repetitions, seed, save)?;
            }
        }

        Commands::List => {
            println!("\nAvailable algorithms");

            for name in StrategyRegistry::global().list() {
                println!("  - {}", name);
            }

            println!("\nUsage: cargo run -- run --algorithm <name>");
            println!("Example: cargo run -- run --algorithm mgm2 --steps 250\n");
        }
    }

    info!("Total runtime: {:.2}s", program_start.elapsed().as_secs_f64());

    Ok(())
}

fn run_single(
    algorithm: &str,
    generator: &GeneratorConfig,
    params: AlgorithmParams,
    seed: Option<u64>,
    steps: u64,
    save: bool,
) -> Result<()> {
    let instance = generator.generate()?;
    info!(
        "Instance: {} agents, {} edges, domain {} (p1={}, p2={})",
        generator.agents,
        instance.edge_count(),
        generator.domain_size,
        generator.p1,
        generator.p2
    );

    let mut config = SimConfig::default()
        .with_name(format!("{}_n{}_d{}", algorithm, generator.agents, generator.domain_size))
        .with_algorithm(algorithm)
        .with_params(params);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    let mut sim = Simulation::new(&instance, config)?;

    let pb = ProgressBar::new(steps);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.orange/yellow} {pos}/{len} rounds {msg}")?
            .progress_chars("█▓░"),
    );
    for _ in 0..steps {
        sim.step();
        pb.inc(1);
        pb.set_message(format!("Cost: {}", sim.global_cost()));
    }
    pb.finish_with_message(format!("Final cost: {}", sim.final_global_cost()));

    let name = sim.config().name.clone();
    let report = analyzer::analyze(sim.history(), &name, sim.algorithm());
    info!(
        "{}: {} -> {} (best {} at round {}, {:.1}% better)",
        report.algorithm,
        report.initial_cost,
        report.final_cost,
        report.best_cost,
        report.best_round,
        report.improvement * 100.0
    );

    if save {
        save_run(&name, sim.history(), &report)?;
    }
    Ok(())
}

fn save_run(name: &str, history: &[CostSample], report: &RunReport) -> Result<()> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    std::fs::create_dir_all("results")?;

    let csv_path = format!("results/{}_{}.csv", name, timestamp);
    let mut logger = HistoryLogger::new(&csv_path)?;
    logger.log_batch(history)?;
    info!("History saved to: {}", csv_path);

    let json_path = format!("results/{}_{}_analysis.json", name, timestamp);
    std::fs::write(&json_path, serde_json::to_string_pretty(report)?)?;
    info!("Analysis saved to: {}", json_path);
    Ok(())
}

fn compare(
    algorithms: &[&str],
    generator: &GeneratorConfig,
    params: AlgorithmParams,
    steps: u64,
    repetitions: u32,
    seed: u64,
    save: bool,
) -> Result<()> {
    for name in algorithms {
        if !StrategyRegistry::global().contains(name) {
            anyhow::bail!("Unknown algorithm: {}", name);
        }
    }

    info!("Comparison: {} (p1={}, p2={})", algorithms.join(", "), generator.p1, generator.p2);
    info!("Repetitions: {}, rounds per run: {}", repetitions, steps);

    // Every algorithm sees the same instances
    let instances = (0..repetitions)
        .map(|rep| generator.clone().with_seed(seed + rep as u64).generate())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let pb = ProgressBar::new((algorithms.len() * instances.len()) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.orange/yellow} {pos}/{len} runs {msg}")?
            .progress_chars("█▓░"),
    );

    let mut averaged = Vec::new();
    for &algorithm in algorithms {
        pb.set_message(algorithm.to_string());
        let reports = instances
            .par_iter()
            .enumerate()
            .map(|(rep, instance)| -> std::result::Result<RunReport, DcopError> {
                let config = SimConfig::default()
                    .with_name(format!("{}_{}", algorithm, rep))
                    .with_algorithm(algorithm)
                    .with_params(params)
                    .with_seed(seed + rep as u64)
                    .sequential();
                let mut sim = Simulation::new(instance, config)?;
                sim.run(steps);
                pb.inc(1);
                Ok(analyzer::analyze(sim.history(), &sim.config().name, sim.algorithm()))
            })
            .collect::<std::result::Result<Vec<_>, DcopError>>()?;

        if let Some(mut avg) = analyzer::average_reports(&reports) {
            avg.name = format!("{}_p2_{}", algorithm, generator.p2);
            averaged.push(avg);
        }
    }
    pb.finish_with_message("Comparison complete");

    comparison_table(&averaged);

    if save {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        std::fs::create_dir_all("results")?;
        let path = format!("results/comparison_p2_{}_{}.json", generator.p2, timestamp);
        std::fs::write(&path, serde_json::to_string_pretty(&averaged)?)?;
        info!("Comparison saved to: {}", path);
    }
    Ok(())
}

fn parse_list(values: &str) -> Result<Vec<f64>> {
    values
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().map_err(|e| anyhow::anyhow!("Bad number '{}': {}", s, e)))
        .collect()
}

fn comparison_table(reports: &[RunReport]) {
    println!("\n╔══════════════╦══════════════╦══════════════╦══════════════╦══════════════╗");
    println!("║ Algorithm    ║ Initial cost ║ Final cost   ║ Best cost    ║ Improvement  ║");
    println!("╠══════════════╬══════════════╬══════════════╬══════════════╬══════════════╣");

    for report in reports {
        println!(
            "║ {:<12} ║ {:>12.2} ║ {:>12.2} ║ {:>12.2} ║ {:>11.2}% ║",
            report.algorithm,
            report.initial_cost,
            report.final_cost,
            report.best_cost,
            report.improvement * 100.0,
        );
    }

    println!("╚══════════════╩══════════════╩══════════════╩══════════════╩══════════════╝\n");

    if let Some(best) = reports
        .iter()
        .min_by(|a, b| a.final_cost.total_cmp(&b.final_cost))
    {
        println!("Lowest final cost: {} ({:.2})", best.algorithm, best.final_cost);
    }
    println!();
}
