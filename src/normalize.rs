//! Key normalization shared by the exact and fuzzy matchers.
//!
//! CRITICAL: `normalize_title` defines the exact-match key. Any change here
//! changes match counts on both sides.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::{MovieKey, NormalizedRow};

// ============================================================================
// KEY NORMALIZATION
// ============================================================================

/// Normalize a title for matching: trimmed, lower-cased, internal whitespace
/// collapsed to single spaces. A missing title normalizes to "".
pub fn normalize_title(title: Option<&str>) -> String {
    match title {
        None => String::new(),
        Some(t) => t.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase(),
    }
}

/// Normalize a comma-joined genre list so that order and case do not matter.
/// e.g., "Sci-Fi, Action" → "action, sci-fi"
pub fn normalize_genre(genre: Option<&str>) -> String {
    let Some(genre) = genre else {
        return String::new();
    };
    let mut parts: Vec<String> = genre
        .split(',')
        .map(|g| g.trim().to_lowercase())
        .filter(|g| !g.is_empty())
        .collect();
    parts.sort();
    parts.join(", ")
}

// ============================================================================
// COLUMN NAMES
// ============================================================================

/// Make column names unique, preserving order.
/// Later occurrences of a repeated name get the lowest 1-based numeric suffix
/// not already taken by an earlier column:
/// ["genre", "title", "genre", "genre"] → ["genre", "title", "genre_1", "genre_2"]
/// ["genre", "genre_1", "genre"] → ["genre", "genre_1", "genre_2"]
pub fn make_unique_columns<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    let mut emitted: FxHashSet<String> = FxHashSet::default();
    let mut next_suffix: FxHashMap<&str, usize> = FxHashMap::default();
    columns
        .iter()
        .map(|c| {
            let name = c.as_ref();
            if emitted.insert(name.to_string()) {
                return name.to_string();
            }
            let suffix = next_suffix.entry(name).or_insert(1);
            loop {
                let candidate = format!("{}_{}", name, suffix);
                *suffix += 1;
                if emitted.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}

// ============================================================================
// TABLES
// ============================================================================

/// Attach join keys to every record. Order and cardinality are preserved.
pub fn normalize_table<T: MovieKey>(rows: Vec<T>) -> Vec<NormalizedRow<T>> {
    rows.into_iter()
        .map(|record| {
            let title_norm = normalize_title(record.title());
            let genre_norm = normalize_genre(record.genre());
            NormalizedRow {
                record,
                title_norm,
                genre_norm,
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImdbMovie;

    #[test]
    fn test_normalize_title_basic() {
        assert_eq!(normalize_title(Some("Inception")), "inception");
        assert_eq!(normalize_title(Some("inception ")), "inception");
        assert_eq!(normalize_title(Some("  The   Dark\tKnight ")), "the dark knight");
        assert_eq!(normalize_title(Some("Spider-Man")), "spider-man");
    }

    #[test]
    fn test_normalize_title_missing() {
        assert_eq!(normalize_title(None), "");
        assert_eq!(normalize_title(Some("   ")), "");
    }

    #[test]
    fn test_normalize_genre_order_insensitive() {
        assert_eq!(
            normalize_genre(Some("Sci-Fi, Action")),
            normalize_genre(Some("action,sci-fi"))
        );
        assert_eq!(normalize_genre(Some("Drama, , Crime")), "crime, drama");
        assert_eq!(normalize_genre(None), "");
    }

    #[test]
    fn test_make_unique_columns() {
        assert_eq!(
            make_unique_columns(&["genre", "title", "genre", "genre"]),
            vec!["genre", "title", "genre_1", "genre_2"]
        );
        assert_eq!(make_unique_columns(&["a", "b"]), vec!["a", "b"]);
        assert!(make_unique_columns::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_make_unique_columns_avoids_existing_suffix() {
        assert_eq!(
            make_unique_columns(&["genre", "genre_1", "genre"]),
            vec!["genre", "genre_1", "genre_2"]
        );
        assert_eq!(
            make_unique_columns(&["genre", "genre", "genre_1"]),
            vec!["genre", "genre_1", "genre_1_1"]
        );
    }

    #[test]
    fn test_normalize_table_preserves_order() {
        let rows = vec![
            ImdbMovie {
                title: Some("Heat ".to_string()),
                ..Default::default()
            },
            ImdbMovie::default(),
        ];
        let normalized = normalize_table(rows);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].title_norm, "heat");
        assert_eq!(normalized[1].title_norm, "");
    }
}
