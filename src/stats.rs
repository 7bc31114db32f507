//! Integration log: flat counters describing one run.
//!
//! Built once from the final fused table and never mutated afterwards.

use log::info;
use serde::Serialize;

use crate::exact::ExactMerge;
use crate::fuzzy::FuzzyLinkage;
use crate::models::{FusedMovie, MatchStatus};
use crate::normalize::normalize_genre;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrationLog {
    // Inputs
    pub imdb_total_rows: usize,
    pub tmdb_total_rows: usize,

    // Stage counts
    pub exact_match_count: usize,
    pub left_only_before_fuzzy: usize,
    pub fuzzy_match_count: usize,

    // Final table
    pub final_merged_rows: usize,
    pub exact_matches_saved: usize,
    pub fuzzy_matches_saved: usize,
    pub unmatched_imdb_saved: usize,

    // Transparency
    pub duplicate_tmdb_keys: usize,
    pub fuzzy_no_candidates: usize,
    pub fuzzy_below_threshold: usize,
    pub genre_disagreements: usize, // matched rows whose genre sets differ
    pub runtime_disagreements: usize,
}

impl IntegrationLog {
    pub fn new(
        imdb_total_rows: usize,
        tmdb_total_rows: usize,
        exact: &ExactMerge,
        fuzzy: &FuzzyLinkage,
        fused: &[FusedMovie],
    ) -> Self {
        let saved = |status: MatchStatus| fused.iter().filter(|f| f.match_status == status).count();

        Self {
            imdb_total_rows,
            tmdb_total_rows,
            exact_match_count: exact.matched_count(),
            left_only_before_fuzzy: exact.left_only_count(),
            fuzzy_match_count: fuzzy.matches.len(),
            final_merged_rows: fused.len(),
            exact_matches_saved: saved(MatchStatus::Both),
            fuzzy_matches_saved: saved(MatchStatus::Fuzzy),
            unmatched_imdb_saved: saved(MatchStatus::LeftOnly),
            duplicate_tmdb_keys: exact.duplicate_right_keys,
            fuzzy_no_candidates: fuzzy.no_candidates,
            fuzzy_below_threshold: fuzzy.near_misses.len(),
            genre_disagreements: fused.iter().filter(|f| genres_disagree(f)).count(),
            runtime_disagreements: fused.iter().filter(|f| runtimes_disagree(f)).count(),
        }
    }

    /// Calculate match rate as a percentage of IMDb rows
    pub fn match_rate(&self) -> f64 {
        if self.imdb_total_rows == 0 {
            0.0
        } else {
            100.0 * (self.exact_matches_saved + self.fuzzy_matches_saved) as f64
                / self.imdb_total_rows as f64
        }
    }

    /// Every IMDb row is accounted for exactly once
    pub fn is_consistent(&self) -> bool {
        self.exact_matches_saved + self.fuzzy_matches_saved + self.unmatched_imdb_saved
            == self.final_merged_rows
            && self.final_merged_rows == self.imdb_total_rows
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Log counts at info level
    pub fn log_summary(&self) {
        info!(
            "Integration: {} IMDb rows, {} TMDB rows -> {} exact, {} fuzzy, {} unmatched ({:.1}% matched)",
            self.imdb_total_rows,
            self.tmdb_total_rows,
            self.exact_matches_saved,
            self.fuzzy_matches_saved,
            self.unmatched_imdb_saved,
            self.match_rate()
        );
    }
}

fn genres_disagree(f: &FusedMovie) -> bool {
    match (f.genre_imdb.as_deref(), f.genre_tmdb.as_deref()) {
        (Some(a), Some(b)) => normalize_genre(Some(a)) != normalize_genre(Some(b)),
        _ => false,
    }
}

fn runtimes_disagree(f: &FusedMovie) -> bool {
    matches!((f.runtime_imdb, f.runtime_tmdb), (Some(a), Some(b)) if a != b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Match, MatchMethod, MergedRow, TmdbFields};

    fn fused(status: MatchStatus, genres: (&str, &str), runtimes: (i64, i64)) -> FusedMovie {
        FusedMovie {
            title: Some("t".to_string()),
            release_year: Some(2000),
            release_year_tmdb: None,
            director: None,
            genre_imdb: Some(genres.0.to_string()),
            genre_tmdb: Some(genres.1.to_string()),
            rating_imdb: None,
            vote_average_tmdb: None,
            vote_count_tmdb: None,
            budget_in_millions: None,
            revenue_in_millions: None,
            gross_in_millions: None,
            popularity: None,
            runtime_imdb: Some(runtimes.0),
            runtime_tmdb: Some(runtimes.1),
            metascore: None,
            match_status: status,
        }
    }

    fn merged_row(left: usize, status: MatchStatus) -> MergedRow {
        MergedRow {
            left,
            right: None,
            tmdb: TmdbFields::default(),
            status,
        }
    }

    #[test]
    fn test_counts_and_consistency() {
        let exact = ExactMerge {
            rows: vec![
                merged_row(0, MatchStatus::Both),
                merged_row(1, MatchStatus::LeftOnly),
                merged_row(2, MatchStatus::LeftOnly),
            ],
            duplicate_right_keys: 2,
        };
        let fuzzy = FuzzyLinkage {
            matches: vec![Match {
                left: 1,
                right: 0,
                confidence: 0.93,
                method: MatchMethod::Fuzzy,
            }],
            near_misses: Vec::new(),
            no_candidates: 1,
        };
        let rows = vec![
            fused(MatchStatus::Both, ("Drama, Crime", "crime,drama"), (100, 100)),
            fused(MatchStatus::Fuzzy, ("Drama", "Thriller"), (100, 98)),
            fused(MatchStatus::LeftOnly, ("Drama", "Drama"), (90, 90)),
        ];

        let log = IntegrationLog::new(3, 10, &exact, &fuzzy, &rows);
        assert_eq!(log.exact_match_count, 1);
        assert_eq!(log.left_only_before_fuzzy, 2);
        assert_eq!(log.fuzzy_match_count, 1);
        assert_eq!(log.exact_matches_saved, 1);
        assert_eq!(log.fuzzy_matches_saved, 1);
        assert_eq!(log.unmatched_imdb_saved, 1);
        assert_eq!(log.duplicate_tmdb_keys, 2);
        assert_eq!(log.fuzzy_no_candidates, 1);
        assert_eq!(log.genre_disagreements, 1);
        assert_eq!(log.runtime_disagreements, 1);
        assert!(log.is_consistent());
        assert!((log.match_rate() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_is_flat_numbers() {
        let exact = ExactMerge {
            rows: Vec::new(),
            duplicate_right_keys: 0,
        };
        let log = IntegrationLog::new(0, 0, &exact, &FuzzyLinkage::default(), &[]);
        let value: serde_json::Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 14);
        assert!(object.values().all(|v| v.is_u64()));
        assert_eq!(object["final_merged_rows"], 0);
        assert_eq!(log.match_rate(), 0.0);
    }
}
