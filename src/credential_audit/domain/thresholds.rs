use std::collections::BTreeSet;

/// Day counts used when no thresholds are supplied
pub const DEFAULT_THRESHOLDS: [i64; 8] = [15, 10, 5, 4, 3, 2, 1, 0];

/// Set of day counts at which a credential gets reported.
///
/// An empty set is valid and distinct from the default: it matches only
/// credentials that have already expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdSet(BTreeSet<i64>);

impl ThresholdSet {
    pub fn new<I: IntoIterator<Item = i64>>(days: I) -> Self {
        Self(days.into_iter().collect())
    }

    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Parses a comma-separated list such as `"30,7,1"`, dropping tokens that
    /// are not integers. Returns the default set when nothing usable remains.
    pub fn parse_lenient(input: Option<&str>) -> Self {
        let parsed: BTreeSet<i64> = input
            .unwrap_or_default()
            .split(',')
            .filter_map(|token| token.trim().parse::<i64>().ok())
            .collect();

        if parsed.is_empty() {
            Self::default()
        } else {
            Self(parsed)
        }
    }

    /// Strict variant for configuration: any bad token is an error.
    pub fn parse_strict(input: &str) -> std::result::Result<Self, String> {
        let mut days = BTreeSet::new();
        for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let value = token
                .parse::<i64>()
                .map_err(|_| format!("'{}' is not a whole number of days", token))?;
            days.insert(value);
        }
        Ok(Self(days))
    }

    pub fn contains(&self, days: i64) -> bool {
        self.0.contains(&days)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest first
    pub fn days(&self) -> Vec<i64> {
        self.0.iter().rev().copied().collect()
    }
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLDS)
    }
}

impl std::fmt::Display for ThresholdSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .days()
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}", joined)
    }
}
