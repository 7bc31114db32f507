//! Inspect IMDb rows the fuzzy matcher rejected and how the threshold moves them.
//!
//! Usage: analyze-unmatched [--imdb imdb_cleaned.csv] [--tmdb tmdb_cleaned.csv] [--limit N]
//!
//! Runs the full integration in memory and writes nothing.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use movie_integrate::config::{Blocking, MatchConfig, DEFAULT_THRESHOLD};
use movie_integrate::pipeline::integrate;
use movie_integrate::progress::{format_duration, set_log_only};
use movie_integrate::table::{load_imdb, load_tmdb};

const SWEEP: [f64; 4] = [0.80, 0.85, 0.90, 0.95];

#[derive(Parser)]
#[command(name = "analyze-unmatched")]
#[command(about = "Report near misses of the fuzzy title matcher")]
struct Args {
    #[arg(long, default_value = "imdb_cleaned.csv")]
    imdb: PathBuf,

    #[arg(long, default_value = "tmdb_cleaned.csv")]
    tmdb: PathBuf,

    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    #[arg(long)]
    no_blocking: bool,

    /// Number of near misses to print
    #[arg(long, default_value = "25")]
    limit: usize,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let args = Args::parse();
    set_log_only(true);

    let start = Instant::now();
    let imdb = load_imdb(&args.imdb).with_context(|| format!("Failed to load {:?}", args.imdb))?;
    let tmdb = load_tmdb(&args.tmdb).with_context(|| format!("Failed to load {:?}", args.tmdb))?;
    println!(
        "Loaded {} IMDb rows and {} TMDB rows",
        imdb.rows.len(),
        tmdb.rows.len()
    );

    let mut config = MatchConfig::default().with_threshold(args.threshold);
    if args.no_blocking {
        config = config.with_blocking(Blocking::Disabled);
    }
    let result = integrate(imdb.rows, tmdb.rows, &config)?;
    let log = &result.log;

    println!("\n{:=<60}", "");
    println!("Unmatched analysis ({})", format_duration(start.elapsed()));
    println!("  Pending after exact:   {}", log.left_only_before_fuzzy);
    println!("  Fuzzy accepted:        {}", log.fuzzy_match_count);
    println!("  Below threshold:       {}", log.fuzzy_below_threshold);
    println!("  No candidates:         {}", log.fuzzy_no_candidates);
    println!("{:=<60}", "");

    println!("\nAccepted fuzzy links by threshold:");
    for t in SWEEP {
        let marker = if (t - config.threshold).abs() < 1e-9 { " (current)" } else { "" };
        println!("  >= {:.2}: {:>6}{}", t, result.accepted_at(t), marker);
    }

    let ranked = result.ranked_near_misses();
    println!(
        "\nTop {} near misses (of {}):",
        args.limit.min(ranked.len()),
        ranked.len()
    );
    for miss in ranked.iter().take(args.limit) {
        let left = &result.imdb[miss.left];
        let right = &result.tmdb[miss.right];
        println!(
            "  {:.3}  {:?} ({}) ~ {:?} ({})",
            miss.score,
            left.title_norm,
            year_label(left.release_year()),
            right.title_norm,
            year_label(right.release_year()),
        );
    }

    Ok(())
}

fn year_label(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
}
