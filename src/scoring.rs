//! Title similarity scoring for the fuzzy matcher.
//!
//! A single `SimilarityScorer` capability is used by the pipeline; its one
//! implementation is `TokenSortRatio`.

/// Similarity between two normalized titles, in [0.0, 1.0].
/// 1.0 means token-for-token identical.
pub trait SimilarityScorer: Sync {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Token-sort ratio: tokens of each title are sorted and re-joined, then the
/// two strings are compared with the normalized indel similarity
/// `2 * LCS / (len_a + len_b)` over characters.
/// Word order never affects the score.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

impl SimilarityScorer for TokenSortRatio {
    fn score(&self, a: &str, b: &str) -> f64 {
        let a_sorted = sort_tokens(a);
        let b_sorted = sort_tokens(b);
        // A missing title carries no evidence for a match
        if a_sorted.is_empty() || b_sorted.is_empty() {
            return 0.0;
        }
        if a_sorted == b_sorted {
            return 1.0;
        }
        indel_ratio(&a_sorted, &b_sorted)
    }
}

/// Split on whitespace, sort tokens, and join with single spaces.
pub fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Normalized indel similarity (0.0 to 1.0).
pub fn indel_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 1.0;
    }
    let lcs = lcs_length(&a_chars, &b_chars);
    (2 * lcs) as f64 / total as f64
}

/// LCS length using two-row DP (space-optimised).
fn lcs_length(a: &[char], b: &[char]) -> usize {
    let n = b.len();
    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
        curr.fill(0);
    }
    prev[n]
}
