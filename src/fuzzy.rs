//! Fuzzy linking of Left rows the exact matcher left unmatched.
//!
//! Candidates are blocked by release year, scored with a `SimilarityScorer`,
//! and the single best candidate is accepted when its score reaches the
//! configured threshold. Ties go to the candidate seen first in Right order.

use log::{debug, info};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::{Blocking, MatchConfig, RightReuse};
use crate::models::{
    ImdbMovie, Match, MatchMethod, MatchStatus, MergedRow, NearMiss, NormalizedRow, TmdbMovie,
};
use crate::progress::{report_rows, stage_bar};
use crate::scoring::SimilarityScorer;

/// Progress log interval in log-only mode
const LOG_INTERVAL: u64 = 500;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuzzyLinkage {
    /// Accepted matches in Left order, at most one per Left row
    pub matches: Vec<Match>,
    /// Best candidates that scored below the threshold
    pub near_misses: Vec<NearMiss>,
    /// Left rows with an empty candidate block
    pub no_candidates: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum RowOutcome {
    Accepted(Match),
    Rejected(NearMiss),
    NoCandidates,
}

/// Right row ids grouped by release year, each block in Right order.
/// Rows without a year belong to no block.
pub fn build_year_blocks(right: &[NormalizedRow<TmdbMovie>]) -> FxHashMap<i32, Vec<usize>> {
    let mut blocks: FxHashMap<i32, Vec<usize>> = FxHashMap::default();
    for (i, row) in right.iter().enumerate() {
        if let Some(year) = row.release_year() {
            blocks.entry(year).or_default().push(i);
        }
    }
    blocks
}

struct Linker<'a, S: ?Sized> {
    left: &'a [NormalizedRow<ImdbMovie>],
    right: &'a [NormalizedRow<TmdbMovie>],
    blocks: FxHashMap<i32, Vec<usize>>,
    all_rows: Vec<usize>,
    config: &'a MatchConfig,
    scorer: &'a S,
}

impl<'a, S: SimilarityScorer + ?Sized> Linker<'a, S> {
    fn candidates(&self, left_idx: usize) -> &[usize] {
        match self.config.blocking {
            Blocking::Disabled => self.all_rows.as_slice(),
            Blocking::ReleaseYear => self.left[left_idx]
                .release_year()
                .and_then(|year| self.blocks.get(&year))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }

    /// Score one Left row against its block, skipping excluded Right rows.
    fn link_row(&self, left_idx: usize, excluded: Option<&FxHashSet<usize>>) -> RowOutcome {
        let title = self.left[left_idx].title_norm.as_str();
        let mut best: Option<(usize, f64)> = None;

        for &r in self.candidates(left_idx) {
            if excluded.is_some_and(|used| used.contains(&r)) {
                continue;
            }
            let score = self.scorer.score(title, &self.right[r].title_norm);
            // Strict comparison keeps the first-seen candidate on ties
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((r, score));
            }
        }

        match best {
            None => RowOutcome::NoCandidates,
            Some((right, score)) if score >= self.config.threshold => {
                RowOutcome::Accepted(Match {
                    left: left_idx,
                    right,
                    confidence: score,
                    method: MatchMethod::Fuzzy,
                })
            }
            Some((right, score)) => RowOutcome::Rejected(NearMiss {
                left: left_idx,
                right,
                score,
            }),
        }
    }
}

/// Try to link every `left_only` row of the exact merge to a Right row.
/// Rows matched exactly are never considered.
pub fn link_remaining<S: SimilarityScorer + ?Sized>(
    merged: &[MergedRow],
    left: &[NormalizedRow<ImdbMovie>],
    right: &[NormalizedRow<TmdbMovie>],
    config: &MatchConfig,
    scorer: &S,
) -> FuzzyLinkage {
    let pending: Vec<usize> = merged
        .iter()
        .filter(|m| m.status == MatchStatus::LeftOnly)
        .map(|m| m.left)
        .collect();

    let linker = Linker {
        left,
        right,
        blocks: build_year_blocks(right),
        all_rows: (0..right.len()).collect(),
        config,
        scorer,
    };

    let total = pending.len() as u64;
    let pb = stage_bar(total, "Fuzzy matching");

    let outcomes: Vec<RowOutcome> = match config.right_reuse {
        RightReuse::Allow => pending
            .par_iter()
            .map(|&i| {
                let outcome = linker.link_row(i, None);
                pb.inc(1);
                report_rows("fuzzy", pb.position(), total, LOG_INTERVAL);
                outcome
            })
            .collect(),
        RightReuse::Exclusive => {
            let mut used: FxHashSet<usize> = merged.iter().filter_map(|m| m.right).collect();
            let mut outcomes = Vec::with_capacity(pending.len());
            for &i in &pending {
                let outcome = linker.link_row(i, Some(&used));
                if let RowOutcome::Accepted(m) = &outcome {
                    used.insert(m.right);
                }
                outcomes.push(outcome);
                pb.inc(1);
                report_rows("fuzzy", pb.position(), total, LOG_INTERVAL);
            }
            outcomes
        }
    };

    let mut linkage = FuzzyLinkage::default();
    for outcome in outcomes {
        match outcome {
            RowOutcome::Accepted(m) => {
                debug!(
                    "Fuzzy match: {:?} -> {:?} ({:.3})",
                    left[m.left].title_norm, right[m.right].title_norm, m.confidence
                );
                linkage.matches.push(m);
            }
            RowOutcome::Rejected(miss) => linkage.near_misses.push(miss),
            RowOutcome::NoCandidates => linkage.no_candidates += 1,
        }
    }

    pb.finish_with_message(format!(
        "Fuzzy matching: {} accepted of {} pending",
        linkage.matches.len(),
        pending.len()
    ));
    info!(
        "Fuzzy linkage: {} accepted, {} below threshold, {} without candidates",
        linkage.matches.len(),
        linkage.near_misses.len(),
        linkage.no_candidates
    );
    linkage
}
