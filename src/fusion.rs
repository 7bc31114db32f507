//! Fusion of exact and fuzzy results into the fixed output schema.

use rustc_hash::FxHashMap;

use crate::models::{
    FusedMovie, ImdbMovie, Match, MatchStatus, MergedRow, NormalizedRow, TmdbFields, TmdbMovie,
};

/// Fill fuzzy-matched rows and project every merged row to a `FusedMovie`.
///
/// Only rows the exact matcher left unmatched take fuzzy data, and only
/// into fields that are still missing. Output order and cardinality follow
/// `merged`, which follows the Left table.
pub fn fuse(
    merged: Vec<MergedRow>,
    fuzzy: &[Match],
    left: &[NormalizedRow<ImdbMovie>],
    right: &[NormalizedRow<TmdbMovie>],
) -> Vec<FusedMovie> {
    let by_left: FxHashMap<usize, &Match> = fuzzy.iter().map(|m| (m.left, m)).collect();

    merged
        .into_iter()
        .map(|row| {
            let (tmdb, status) = match by_left.get(&row.left) {
                Some(m) if row.status == MatchStatus::LeftOnly => (
                    row.tmdb.fill_missing(&right[m.right].record),
                    MatchStatus::Fuzzy,
                ),
                _ => (row.tmdb, row.status),
            };
            project(&left[row.left].record, tmdb, status)
        })
        .collect()
}

/// Project one IMDb record plus its TMDB fields into the output schema.
pub fn project(imdb: &ImdbMovie, tmdb: TmdbFields, status: MatchStatus) -> FusedMovie {
    FusedMovie {
        title: imdb.title.clone(),
        release_year: imdb.release_year,
        release_year_tmdb: tmdb.release_year,
        director: imdb.director.clone(),
        genre_imdb: imdb.genre.clone(),
        genre_tmdb: tmdb.genre,
        rating_imdb: imdb.rating,
        vote_average_tmdb: tmdb.vote_average,
        vote_count_tmdb: tmdb.vote_count,
        budget_in_millions: tmdb.budget_in_millions,
        revenue_in_millions: tmdb.revenue_in_millions,
        gross_in_millions: imdb.gross_in_millions,
        popularity: tmdb.popularity,
        runtime_imdb: imdb.runtime_in_minutes,
        runtime_tmdb: tmdb.runtime_in_minutes,
        metascore: imdb.metascore,
        match_status: status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchMethod;
    use crate::normalize::normalize_table;

    fn imdb(title: &str) -> ImdbMovie {
        ImdbMovie {
            title: Some(title.to_string()),
            director: Some("Someone".to_string()),
            release_year: Some(2002),
            genre: Some("Action, Adventure".to_string()),
            rating: Some(7.4),
            metascore: Some(73.0),
            runtime_in_minutes: Some(121),
            gross_in_millions: Some(403.71),
        }
    }

    fn tmdb(title: &str) -> TmdbMovie {
        TmdbMovie {
            title: Some(title.to_string()),
            release_year: Some(2002),
            genre: Some("Action, Fantasy".to_string()),
            budget_in_millions: Some(139.0),
            popularity: Some(82.2),
            revenue_in_millions: Some(821.7),
            runtime_in_minutes: Some(121),
            vote_average: Some(6.8),
            vote_count: Some(5265),
        }
    }

    fn fuzzy_match(left: usize, right: usize) -> Match {
        Match {
            left,
            right,
            confidence: 0.95,
            method: MatchMethod::Fuzzy,
        }
    }

    #[test]
    fn test_project_keeps_both_ratings_and_runtimes() {
        let fused = project(
            &imdb("Spiderman"),
            TmdbFields::from_movie(&TmdbMovie {
                runtime_in_minutes: Some(118),
                ..tmdb("Spider-Man")
            }),
            MatchStatus::Both,
        );
        assert_eq!(fused.rating_imdb, Some(7.4));
        assert_eq!(fused.vote_average_tmdb, Some(6.8));
        assert_eq!(fused.runtime_imdb, Some(121));
        assert_eq!(fused.runtime_tmdb, Some(118));
        assert_eq!(fused.genre_imdb.as_deref(), Some("Action, Adventure"));
        assert_eq!(fused.genre_tmdb.as_deref(), Some("Action, Fantasy"));
        assert_eq!(fused.budget_in_millions, Some(139.0));
        assert_eq!(fused.gross_in_millions, Some(403.71));
    }

    #[test]
    fn test_fuzzy_fill_sets_status() {
        let left = normalize_table(vec![imdb("Spiderman")]);
        let right = normalize_table(vec![tmdb("Spider-Man")]);
        let merged = vec![MergedRow {
            left: 0,
            right: None,
            tmdb: TmdbFields::default(),
            status: MatchStatus::LeftOnly,
        }];

        let fused = fuse(merged, &[fuzzy_match(0, 0)], &left, &right);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].match_status, MatchStatus::Fuzzy);
        assert_eq!(fused[0].popularity, Some(82.2));
        assert_eq!(fused[0].vote_count_tmdb, Some(5265));
    }

    #[test]
    fn test_fuzzy_never_touches_exact_rows() {
        let left = normalize_table(vec![imdb("Spiderman")]);
        let right = normalize_table(vec![
            tmdb("Spiderman"),
            TmdbMovie {
                popularity: Some(1.0),
                ..tmdb("Spider-Man")
            },
        ]);
        let merged = vec![MergedRow {
            left: 0,
            right: Some(0),
            tmdb: TmdbFields::from_movie(&right[0].record),
            status: MatchStatus::Both,
        }];

        let fused = fuse(merged, &[fuzzy_match(0, 1)], &left, &right);
        assert_eq!(fused[0].match_status, MatchStatus::Both);
        assert_eq!(fused[0].popularity, Some(82.2));
    }

    #[test]
    fn test_fuzzy_fill_only_missing_fields() {
        let left = normalize_table(vec![imdb("Spiderman")]);
        let right = normalize_table(vec![tmdb("Spider-Man")]);
        let merged = vec![MergedRow {
            left: 0,
            right: None,
            tmdb: TmdbFields {
                popularity: Some(5.0),
                ..Default::default()
            },
            status: MatchStatus::LeftOnly,
        }];

        let fused = fuse(merged, &[fuzzy_match(0, 0)], &left, &right);
        assert_eq!(fused[0].popularity, Some(5.0));
        assert_eq!(fused[0].budget_in_millions, Some(139.0));
    }

    #[test]
    fn test_unmatched_rows_have_null_tmdb_fields() {
        let left = normalize_table(vec![imdb("Heat"), imdb("Alien")]);
        let right: Vec<NormalizedRow<TmdbMovie>> = Vec::new();
        let merged = (0..2)
            .map(|i| MergedRow {
                left: i,
                right: None,
                tmdb: TmdbFields::default(),
                status: MatchStatus::LeftOnly,
            })
            .collect();

        let fused = fuse(merged, &[], &left, &right);
        assert_eq!(fused.len(), 2);
        assert_eq!(fused[1].title.as_deref(), Some("Alien"));
        assert!(fused.iter().all(|f| f.match_status == MatchStatus::LeftOnly));
        assert!(fused.iter().all(|f| f.popularity.is_none()
            && f.vote_average_tmdb.is_none()
            && f.release_year_tmdb.is_none()));
    }
}
