use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use movie_integrate::config::{Blocking, MatchConfig, MissingYearPolicy, RightReuse, DEFAULT_THRESHOLD};
use movie_integrate::pipeline::run_files;
use movie_integrate::progress::{format_duration, set_log_only};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MissingYear {
    /// Two missing years compare equal
    Equal,
    /// A missing year never matches anything
    NeverEqual,
}

impl From<MissingYear> for MissingYearPolicy {
    fn from(value: MissingYear) -> Self {
        match value {
            MissingYear::Equal => MissingYearPolicy::Equal,
            MissingYear::NeverEqual => MissingYearPolicy::NeverEqual,
        }
    }
}

#[derive(Parser)]
#[command(name = "movie-integrate")]
#[command(about = "Link cleaned IMDb and TMDB movie tables into one merged table")]
struct Args {
    #[arg(long, default_value = "imdb_cleaned.csv")]
    imdb: PathBuf,

    #[arg(long, default_value = "tmdb_cleaned.csv")]
    tmdb: PathBuf,

    #[arg(long, default_value = "integration_output")]
    output_dir: PathBuf,

    /// Minimum token-sort similarity for a fuzzy match (inclusive)
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    #[arg(long, value_enum, default_value = "equal")]
    missing_year: MissingYear,

    /// Each TMDB row may be linked to at most one IMDb row
    #[arg(long)]
    exclusive_right: bool,

    /// Compare against every TMDB row instead of the same release year only
    #[arg(long)]
    no_blocking: bool,

    #[arg(long, default_value = "0")]
    workers: usize,

    /// Hide progress bars and report through the log instead
    #[arg(long)]
    log_only: bool,
}

impl Args {
    fn match_config(&self) -> MatchConfig {
        MatchConfig::default()
            .with_threshold(self.threshold)
            .with_missing_year(self.missing_year.into())
            .with_blocking(if self.no_blocking {
                Blocking::Disabled
            } else {
                Blocking::ReleaseYear
            })
            .with_right_reuse(if self.exclusive_right {
                RightReuse::Exclusive
            } else {
                RightReuse::Allow
            })
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let args = Args::parse();
    set_log_only(args.log_only);

    if args.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    let start = Instant::now();
    let config = args.match_config();
    info!(
        "Integrating {:?} with {:?} (threshold {:.2}, {:?}, {:?}, {:?})",
        args.imdb, args.tmdb, config.threshold, config.blocking, config.missing_year, config.right_reuse
    );

    let (integration, paths) = run_files(&args.imdb, &args.tmdb, &args.output_dir, &config)
        .with_context(|| format!("Integration into {:?} failed", args.output_dir))?;
    let log = &integration.log;

    println!("\n{:=<60}", "");
    println!("Integration complete!");
    println!("  IMDb rows:        {}", log.imdb_total_rows);
    println!("  TMDB rows:        {}", log.tmdb_total_rows);
    println!("  Exact matches:    {}", log.exact_matches_saved);
    println!("  Fuzzy matches:    {}", log.fuzzy_matches_saved);
    println!("  Unmatched IMDb:   {}", log.unmatched_imdb_saved);
    println!("  Match rate:       {:.1}%", log.match_rate());
    println!("  Merged table:     {}", paths.merged_csv.display());
    println!("  Log:              {}", paths.log_json.display());
    println!("  Elapsed:          {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");

    println!("{}", log.to_json().context("Failed to render integration log")?);

    Ok(())
}
