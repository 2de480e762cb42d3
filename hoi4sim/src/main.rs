use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hoi4sim::loader::{self, Source};
use hoi4sim::report;
use hoi4sim_core::{run_sweep_with, Country, Date, Parallelism};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "hoi4sim", author, version, about = "Find when to switch from civilian to military factories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate every switch day and report final production for each
    Sweep {
        #[command(flatten)]
        input: InputArgs,

        /// Run every simulation on the calling thread
        #[arg(long)]
        sequential: bool,

        /// Worker threads (default: one per core)
        #[arg(long, conflicts_with = "sequential")]
        threads: Option<usize>,
    },

    /// Simulate a single switch day and report every day
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Day on which construction switches to military factories
        #[arg(long)]
        switch_day: u32,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Country tag (history files) or name (CSV)
    #[arg(short, long)]
    country: String,

    /// Path to the game install (auto-detected if neither this nor --csv is given)
    #[arg(long, conflicts_with = "csv")]
    game_path: Option<PathBuf>,

    /// Flat per-state CSV instead of the game's history files
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Days to simulate (1999 runs from 1936.1.1 to Barbarossa)
    #[arg(short, long, default_value_t = 1999)]
    duration: u32,

    /// Date of day 0, used to label output rows
    #[arg(long, default_value = "1936.1.1")]
    start_date: Date,

    /// JSON file overriding the default rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Write CSV here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl InputArgs {
    fn source(&self) -> Result<Source> {
        if let Some(csv) = &self.csv {
            return Ok(Source::Csv(csv.clone()));
        }
        let game_path = match &self.game_path {
            Some(path) => path.clone(),
            None => hoi4data::path::detect_game_path()
                .context("no game install found; pass --game-path or --csv")?,
        };
        Ok(Source::Game(game_path))
    }

    fn load_country(&self) -> Result<Country> {
        let rules = loader::load_rules(self.rules.as_deref())?;
        let setup = loader::load_country_setup(&self.source()?, &self.country)?;
        log::info!(
            "{}: {} states, {} civilian / {} military factories, stability {:.2}, war support {:.2}",
            setup.tag,
            setup.states.len(),
            setup.civilian_factories(),
            setup.military_factories(),
            setup.stability,
            setup.war_support
        );
        loader::build_country(&setup, Arc::new(rules))
    }

    fn writer(&self) -> Result<Box<dyn Write>> {
        Ok(match &self.output {
            Some(path) => Box::new(
                std::fs::File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?,
            ),
            None => Box::new(std::io::stdout().lock()),
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = std::str::FromStr::from_str(&cli.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Sweep {
            input,
            sequential,
            threads,
        } => {
            let country = input.load_country()?;
            let parallelism = if sequential {
                Parallelism::Sequential
            } else {
                Parallelism::Parallel
            };
            log::info!(
                "Sweeping {} switch days ({:?})",
                input.duration,
                parallelism
            );

            let start = std::time::Instant::now();
            let results = match threads {
                Some(n) => {
                    let pool = rayon::ThreadPoolBuilder::new()
                        .num_threads(n)
                        .build()
                        .context("failed to build thread pool")?;
                    pool.install(|| run_sweep_with(&country, input.duration, parallelism))
                }
                None => run_sweep_with(&country, input.duration, parallelism),
            };
            log::info!("Sweep finished in {:.2?}", start.elapsed());

            if let Some(best) = results.best_switch_day() {
                log::info!(
                    "Best switch day: {} ({}), {:.1} production, {} civ / {} mil",
                    best.switch_day,
                    input.start_date.add_days(best.switch_day),
                    best.military_production,
                    best.civilian_factories,
                    best.military_factories
                );
            }
            report::write_sweep_csv(input.writer()?, &results, input.start_date)
                .context("failed to write sweep CSV")?;
        }
        Commands::Run { input, switch_day } => {
            let mut country = input.load_country()?;
            let mut days = Vec::with_capacity(input.duration as usize);
            country.calculate_results_observed(switch_day, input.duration, |day, c| {
                days.push(c.snapshot(day));
            });
            log::info!(
                "Switch day {}: {:.1} production, {} civ / {} mil, economy level {}",
                switch_day,
                country.military_production(),
                country.civilian_factories(),
                country.military_factories(),
                country.economy_level()
            );
            report::write_run_csv(input.writer()?, &days, input.start_date)
                .context("failed to write run CSV")?;
        }
    }

    Ok(())
}
