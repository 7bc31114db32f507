//! Pipeline entry points.
//!
//! `integrate` is a pure function from the two source tables to the fused
//! table and its log. `write_outputs` persists both artifacts so that a
//! failed run never leaves a partial table or log behind.

use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::MatchConfig;
use crate::error::Result;
use crate::exact::exact_merge;
use crate::fusion::fuse;
use crate::fuzzy::link_remaining;
use crate::models::{FusedMovie, ImdbMovie, Match, NearMiss, NormalizedRow, TmdbMovie};
use crate::normalize::normalize_table;
use crate::safety::validate_output_path;
use crate::scoring::{SimilarityScorer, TokenSortRatio};
use crate::stats::IntegrationLog;
use crate::table::{load_imdb, load_tmdb, write_fused};

pub const MERGED_CSV: &str = "merged_movies.csv";
pub const LOG_JSON: &str = "merge_log.json";

/// Result of one integration run.
#[derive(Debug, Clone)]
pub struct Integration {
    pub imdb: Vec<NormalizedRow<ImdbMovie>>,
    pub tmdb: Vec<NormalizedRow<TmdbMovie>>,
    pub fused: Vec<FusedMovie>,
    pub fuzzy_matches: Vec<Match>,
    pub near_misses: Vec<NearMiss>,
    pub log: IntegrationLog,
}

impl Integration {
    /// Near misses by descending score; equal scores keep IMDb order.
    pub fn ranked_near_misses(&self) -> Vec<&NearMiss> {
        let mut ranked: Vec<&NearMiss> = self.near_misses.iter().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    /// Fuzzy links this run would have accepted at another threshold.
    ///
    /// Computed from the best candidate of every pending row. With exclusive
    /// Right rows this is an estimate.
    pub fn accepted_at(&self, threshold: f64) -> usize {
        self.fuzzy_matches
            .iter()
            .filter(|m| m.confidence >= threshold)
            .count()
            + self
                .near_misses
                .iter()
                .filter(|n| n.score >= threshold)
                .count()
    }
}

/// Where the artifacts of a run were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub merged_csv: PathBuf,
    pub log_json: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            merged_csv: dir.join(MERGED_CSV),
            log_json: dir.join(LOG_JSON),
        }
    }
}

/// Run normalizer, exact matcher, fuzzy matcher and fusion with the default scorer.
pub fn integrate(
    imdb: Vec<ImdbMovie>,
    tmdb: Vec<TmdbMovie>,
    config: &MatchConfig,
) -> Result<Integration> {
    integrate_with(imdb, tmdb, config, &TokenSortRatio)
}

pub fn integrate_with<S: SimilarityScorer + ?Sized>(
    imdb: Vec<ImdbMovie>,
    tmdb: Vec<TmdbMovie>,
    config: &MatchConfig,
    scorer: &S,
) -> Result<Integration> {
    config.validate()?;

    let left = normalize_table(imdb);
    let right = normalize_table(tmdb);
    info!("Normalized {} IMDb and {} TMDB rows", left.len(), right.len());

    let exact = exact_merge(&left, &right, config.missing_year);
    let fuzzy = link_remaining(&exact.rows, &left, &right, config, scorer);
    let fused = fuse(exact.rows.clone(), &fuzzy.matches, &left, &right);

    let log = IntegrationLog::new(left.len(), right.len(), &exact, &fuzzy, &fused);
    log.log_summary();

    Ok(Integration {
        imdb: left,
        tmdb: right,
        fused,
        fuzzy_matches: fuzzy.matches,
        near_misses: fuzzy.near_misses,
        log,
    })
}

/// Sibling temporary path used while an artifact is being written.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

fn write_temp<F>(path: &Path, write: F) -> Result<PathBuf>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let tmp = temp_path(path);
    let result = (|| -> Result<()> {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        write(&mut writer)?;
        writer.flush()?;
        Ok(())
    })();
    match result {
        Ok(()) => Ok(tmp),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

/// Write the fused table and the log into `dir`, replacing previous artifacts.
///
/// Both files are written to temporary siblings first and only renamed into
/// place once both are complete; the table is renamed before the log. The
/// table and log on disk belong to the same run only once this returns `Ok`.
pub fn write_outputs(dir: &Path, integration: &Integration) -> Result<OutputPaths> {
    fs::create_dir_all(dir)?;
    let paths = OutputPaths::in_dir(dir);

    let table_tmp = write_temp(&paths.merged_csv, |w| write_fused(w, &integration.fused))?;
    let log_tmp = match write_temp(&paths.log_json, |w| {
        serde_json::to_writer_pretty(&mut *w, &integration.log)?;
        writeln!(w)?;
        Ok(())
    }) {
        Ok(tmp) => tmp,
        Err(e) => {
            let _ = fs::remove_file(&table_tmp);
            return Err(e);
        }
    };

    if let Err(e) = fs::rename(&table_tmp, &paths.merged_csv) {
        let _ = fs::remove_file(&table_tmp);
        let _ = fs::remove_file(&log_tmp);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&log_tmp, &paths.log_json) {
        let _ = fs::remove_file(&log_tmp);
        return Err(e.into());
    }
    info!(
        "Wrote {} and {}",
        paths.merged_csv.display(),
        paths.log_json.display()
    );
    Ok(paths)
}

/// Load both cleaned tables, integrate them, and write the artifacts.
pub fn run_files(
    imdb_path: &Path,
    tmdb_path: &Path,
    output_dir: &Path,
    config: &MatchConfig,
) -> Result<(Integration, OutputPaths)> {
    config.validate()?;
    let planned = OutputPaths::in_dir(output_dir);
    let inputs = [imdb_path, tmdb_path];
    validate_output_path(&planned.merged_csv, "csv", &inputs)?;
    validate_output_path(&planned.log_json, "json", &inputs)?;

    let imdb = load_imdb(imdb_path)?;
    let tmdb = load_tmdb(tmdb_path)?;

    let integration = integrate(imdb.rows, tmdb.rows, config)?;
    let paths = write_outputs(output_dir, &integration)?;
    Ok((integration, paths))
}
