//! Core data models for IMDb/TMDB integration.
//!
//! This module contains the typed source records, the intermediate rows
//! passed between matching stages, and the fused output row.

use serde::Serialize;
use std::fmt;

// ============================================================================
// Source Records
// ============================================================================

/// Access to the fields every source record is keyed on.
pub trait MovieKey {
    fn title(&self) -> Option<&str>;
    fn release_year(&self) -> Option<i32>;
    fn genre(&self) -> Option<&str>;
}

/// Left (primary) record from the cleaned IMDb table.
/// Drives output cardinality: every IMDb movie yields exactly one fused row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImdbMovie {
    pub title: Option<String>,
    pub director: Option<String>,
    pub release_year: Option<i32>,
    pub genre: Option<String>,       // comma-joined category list
    pub rating: Option<f64>,         // 0-10
    pub metascore: Option<f64>,
    pub runtime_in_minutes: Option<i64>,
    pub gross_in_millions: Option<f64>,
}

/// Right (supplementary) record from the cleaned TMDB table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TmdbMovie {
    pub title: Option<String>,
    pub release_year: Option<i32>,
    pub genre: Option<String>,
    pub budget_in_millions: Option<f64>,
    pub popularity: Option<f64>,
    pub revenue_in_millions: Option<f64>,
    pub runtime_in_minutes: Option<i64>,
    pub vote_average: Option<f64>, // 0-10
    pub vote_count: Option<i64>,
}

impl MovieKey for ImdbMovie {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn release_year(&self) -> Option<i32> {
        self.release_year
    }

    fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }
}

impl MovieKey for TmdbMovie {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn release_year(&self) -> Option<i32> {
        self.release_year
    }

    fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }
}

/// Source record with its precomputed join keys.
/// The row id of a record is its index in the normalized table.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedRow<T> {
    pub record: T,
    pub title_norm: String, // never missing: absent titles normalize to ""
    pub genre_norm: String,
}

impl<T: MovieKey> NormalizedRow<T> {
    pub fn release_year(&self) -> Option<i32> {
        self.record.release_year()
    }
}

// ============================================================================
// Matching Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Fuzzy,
}

/// Accepted link between a Left and a Right row.
/// Each Left row appears in at most one accepted match.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub left: usize,
    pub right: usize,
    pub confidence: f64, // 0.0 to 1.0; exact matches are 1.0
    pub method: MatchMethod,
}

/// Best fuzzy candidate that scored below the acceptance threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct NearMiss {
    pub left: usize,
    pub right: usize,
    pub score: f64,
}

/// Provenance tag of a fused row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Produced by the exact matcher
    Both,
    /// Produced by the fuzzy matcher
    Fuzzy,
    /// No match found
    LeftOnly,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Both => "both",
            MatchStatus::Fuzzy => "fuzzy",
            MatchStatus::LeftOnly => "left_only",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-side columns carried on a merged row (all missing when unmatched).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TmdbFields {
    pub release_year: Option<i32>,
    pub genre: Option<String>,
    pub budget_in_millions: Option<f64>,
    pub popularity: Option<f64>,
    pub revenue_in_millions: Option<f64>,
    pub runtime_in_minutes: Option<i64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
}

impl TmdbFields {
    pub fn from_movie(movie: &TmdbMovie) -> Self {
        Self::default().fill_missing(movie)
    }

    /// Returns a copy where every missing field takes the value from `movie`.
    /// Fields that already hold a value are never replaced.
    pub fn fill_missing(self, movie: &TmdbMovie) -> Self {
        Self {
            release_year: self.release_year.or(movie.release_year),
            genre: self.genre.or_else(|| movie.genre.clone()),
            budget_in_millions: self.budget_in_millions.or(movie.budget_in_millions),
            popularity: self.popularity.or(movie.popularity),
            revenue_in_millions: self.revenue_in_millions.or(movie.revenue_in_millions),
            runtime_in_minutes: self.runtime_in_minutes.or(movie.runtime_in_minutes),
            vote_average: self.vote_average.or(movie.vote_average),
            vote_count: self.vote_count.or(movie.vote_count),
        }
    }
}

/// Output of the exact matcher: one per Left row, in Left order.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub left: usize,
    pub right: Option<usize>,
    pub tmdb: TmdbFields,
    pub status: MatchStatus, // Both or LeftOnly after the exact stage
}

// ============================================================================
// Output Models
// ============================================================================

/// Final fused row (one per IMDb movie).
///
/// ## Precedence
///
/// - `rating_imdb` is the preferred rating; `vote_average_tmdb` is always kept
///   alongside it and never overwritten.
/// - Runtime, genre and release year are kept from both sides when they
///   disagree (`*_imdb` / `*_tmdb`).
/// - Budget, revenue and popularity only exist on TMDB and pass through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedMovie {
    pub title: Option<String>,
    pub release_year: Option<i32>,
    pub release_year_tmdb: Option<i32>,
    pub director: Option<String>,
    pub genre_imdb: Option<String>,
    pub genre_tmdb: Option<String>,
    pub rating_imdb: Option<f64>,
    pub vote_average_tmdb: Option<f64>,
    pub vote_count_tmdb: Option<i64>,
    pub budget_in_millions: Option<f64>,
    pub revenue_in_millions: Option<f64>,
    pub gross_in_millions: Option<f64>,
    pub popularity: Option<f64>,
    pub runtime_imdb: Option<i64>,
    pub runtime_tmdb: Option<i64>,
    pub metascore: Option<f64>,
    pub match_status: MatchStatus,
}

/// Column order of the fused table, matching `FusedMovie` field order.
pub const FUSED_COLUMNS: [&str; 17] = [
    "title",
    "release_year",
    "release_year_tmdb",
    "director",
    "genre_imdb",
    "genre_tmdb",
    "rating_imdb",
    "vote_average_tmdb",
    "vote_count_tmdb",
    "budget_in_millions",
    "revenue_in_millions",
    "gross_in_millions",
    "popularity",
    "runtime_imdb",
    "runtime_tmdb",
    "metascore",
    "match_status",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn tmdb(popularity: f64, runtime: i64) -> TmdbMovie {
        TmdbMovie {
            title: Some("Heat".to_string()),
            release_year: Some(1995),
            popularity: Some(popularity),
            runtime_in_minutes: Some(runtime),
            ..Default::default()
        }
    }

    #[test]
    fn test_fill_missing_keeps_existing_values() {
        let exact = TmdbFields::from_movie(&tmdb(20.0, 170));
        let filled = exact.clone().fill_missing(&TmdbMovie {
            budget_in_millions: Some(60.0),
            ..tmdb(99.0, 1)
        });

        assert_eq!(filled.popularity, Some(20.0));
        assert_eq!(filled.runtime_in_minutes, Some(170));
        assert_eq!(filled.budget_in_millions, Some(60.0));
    }

    #[test]
    fn test_from_movie_copies_all_fields() {
        let fields = TmdbFields::from_movie(&tmdb(20.0, 170));
        assert_eq!(fields.release_year, Some(1995));
        assert_eq!(fields.popularity, Some(20.0));
        assert_eq!(fields.vote_count, None);
    }

    #[test]
    fn test_match_status_labels() {
        assert_eq!(MatchStatus::Both.to_string(), "both");
        assert_eq!(MatchStatus::Fuzzy.to_string(), "fuzzy");
        assert_eq!(MatchStatus::LeftOnly.to_string(), "left_only");
    }
}
