//! Exact matching on (normalized title, release year).
//!
//! Left-outer join: every Left row yields exactly one `MergedRow`, in Left
//! order. When several Right rows share a key, the first one in Right order
//! wins and the extra rows are counted as duplicate keys.

use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::config::MissingYearPolicy;
use crate::models::{ImdbMovie, MatchStatus, MergedRow, NormalizedRow, TmdbFields, TmdbMovie};

/// Join key: (title_norm, release_year)
type ExactKey<'a> = (&'a str, Option<i32>);

#[derive(Debug, Clone, PartialEq)]
pub struct ExactMerge {
    pub rows: Vec<MergedRow>,
    /// Right rows shadowed by an earlier Right row with the same key
    pub duplicate_right_keys: usize,
}

impl ExactMerge {
    pub fn matched_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.status == MatchStatus::Both)
            .count()
    }

    pub fn left_only_count(&self) -> usize {
        self.rows.len() - self.matched_count()
    }
}

/// Build the Right-side key index. First occurrence of each key wins.
fn build_index<'a>(
    right: &'a [NormalizedRow<TmdbMovie>],
    policy: MissingYearPolicy,
) -> (FxHashMap<ExactKey<'a>, usize>, usize) {
    let mut index: FxHashMap<ExactKey<'a>, usize> = FxHashMap::default();
    let mut duplicates = 0;

    for (i, row) in right.iter().enumerate() {
        let year = row.release_year();
        if year.is_none() && policy == MissingYearPolicy::NeverEqual {
            continue;
        }
        let key = (row.title_norm.as_str(), year);
        if index.contains_key(&key) {
            duplicates += 1;
        } else {
            index.insert(key, i);
        }
    }

    (index, duplicates)
}

/// Left-outer join of `left` with `right` on (title_norm, release_year).
pub fn exact_merge(
    left: &[NormalizedRow<ImdbMovie>],
    right: &[NormalizedRow<TmdbMovie>],
    policy: MissingYearPolicy,
) -> ExactMerge {
    let (index, duplicate_right_keys) = build_index(right, policy);
    if duplicate_right_keys > 0 {
        warn!(
            "{} TMDB rows share a (title, year) key with an earlier row; first occurrence kept",
            duplicate_right_keys
        );
    }

    let rows: Vec<MergedRow> = left
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let year = row.release_year();
            let hit = if year.is_none() && policy == MissingYearPolicy::NeverEqual {
                None
            } else {
                index.get(&(row.title_norm.as_str(), year)).copied()
            };

            match hit {
                Some(r) => MergedRow {
                    left: i,
                    right: Some(r),
                    tmdb: TmdbFields::from_movie(&right[r].record),
                    status: MatchStatus::Both,
                },
                None => MergedRow {
                    left: i,
                    right: None,
                    tmdb: TmdbFields::default(),
                    status: MatchStatus::LeftOnly,
                },
            }
        })
        .collect();

    let merge = ExactMerge {
        rows,
        duplicate_right_keys,
    };
    info!(
        "Exact merge: {} matched, {} left only",
        merge.matched_count(),
        merge.left_only_count()
    );
    merge
}
