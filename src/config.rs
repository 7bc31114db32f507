//! Matching configuration passed through the pipeline entry point.

use crate::error::{IntegrationError, Result};

/// Default minimum score for accepting a fuzzy match (inclusive)
pub const DEFAULT_THRESHOLD: f64 = 0.90;

/// How the exact matcher compares two missing release years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingYearPolicy {
    /// Missing is its own equality class: same title + both years missing matches
    #[default]
    Equal,
    /// A missing year never equals anything, including another missing year
    NeverEqual,
}

/// Whether a Right record may be linked to more than one Left record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RightReuse {
    #[default]
    Allow,
    /// Right rows already taken by an exact match, or by an earlier fuzzy
    /// match in Left order, are not offered as fuzzy candidates
    Exclusive,
}

/// Candidate restriction for the fuzzy matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blocking {
    /// Candidates must share the Left row's release year; missing years never block
    #[default]
    ReleaseYear,
    /// Every Right row is a candidate
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    pub threshold: f64,
    pub blocking: Blocking,
    pub missing_year: MissingYearPolicy,
    pub right_reuse: RightReuse,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            blocking: Blocking::default(),
            missing_year: MissingYearPolicy::default(),
            right_reuse: RightReuse::default(),
        }
    }
}

impl MatchConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_blocking(mut self, blocking: Blocking) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn with_missing_year(mut self, policy: MissingYearPolicy) -> Self {
        self.missing_year = policy;
        self
    }

    pub fn with_right_reuse(mut self, reuse: RightReuse) -> Self {
        self.right_reuse = reuse;
        self
    }

    /// Reject configurations that cannot produce meaningful matches.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(IntegrationError::InvalidConfig(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.threshold, 0.90);
        assert_eq!(config.blocking, Blocking::ReleaseYear);
        assert_eq!(config.missing_year, MissingYearPolicy::Equal);
        assert_eq!(config.right_reuse, RightReuse::Allow);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(MatchConfig::default().with_threshold(0.0).validate().is_ok());
        assert!(MatchConfig::default().with_threshold(1.0).validate().is_ok());
        assert!(MatchConfig::default().with_threshold(1.01).validate().is_err());
        assert!(MatchConfig::default().with_threshold(-0.1).validate().is_err());
        assert!(MatchConfig::default()
            .with_threshold(f64::NAN)
            .validate()
            .is_err());
    }
}
