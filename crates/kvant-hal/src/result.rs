//! Execution results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Histogram of measurement outcomes.
///
/// Keys are bitstrings with the highest classical bit index leftmost, so
/// `"10"` means clbit 1 read `1` and clbit 0 read `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: BTreeMap<String, u64>,
}

impl Counts {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a histogram from `(bitstring, count)` pairs; repeated keys add up.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, u64)>) -> Self {
        let mut counts = Self::new();
        for (bitstring, count) in pairs {
            counts.insert(bitstring, count);
        }
        counts
    }

    /// Add `count` occurrences of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Occurrences of `bitstring`, zero if never seen.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no outcome was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate outcomes in lexicographic bitstring order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// Outcomes ordered by descending count, ties broken by bitstring.
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut entries: Vec<_> = self.counts.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// The most frequent outcome.
    pub fn most_frequent(&self) -> Option<(&String, &u64)> {
        self.sorted().into_iter().next()
    }

    /// Fold another histogram into this one.
    pub fn merge(&mut self, other: Counts) {
        for (bitstring, count) in other.counts {
            self.insert(bitstring, count);
        }
    }

    /// Relative frequency of `bitstring`.
    pub fn probability(&self, bitstring: &str) -> f64 {
        match self.total_shots() {
            0 => 0.0,
            total => self.get(bitstring) as f64 / total as f64,
        }
    }

    /// Histogram over a subset of classical bits.
    ///
    /// `clbits` are clbit indices; the result keeps the same
    /// highest-index-leftmost order among the selected bits.
    pub fn marginal(&self, clbits: &[usize]) -> Counts {
        let mut selected = clbits.to_vec();
        selected.sort_unstable();
        selected.dedup();

        let mut out = Counts::new();
        for (bitstring, &count) in &self.counts {
            let bytes = bitstring.as_bytes();
            let key: String = selected
                .iter()
                .rev()
                .map(|&c| match bytes.len().checked_sub(c + 1) {
                    Some(pos) => bytes[pos] as char,
                    None => '0',
                })
                .collect();
            out.insert(key, count);
        }
        out
    }
}

impl<'a> IntoIterator for &'a Counts {
    type Item = (&'a String, &'a u64);
    type IntoIter = std::collections::btree_map::Iter<'a, String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

/// Result of executing a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement histogram.
    pub counts: Counts,
    /// Number of shots the histogram covers.
    pub shots: u32,
    /// Wall-clock execution time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Backend-specific extras (seed, requested shots, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ExecutionResult {
    /// Create a result from a histogram.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Set the execution time.
    #[must_use]
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let mut counts = Counts::new();
        counts.insert("00", 3);
        counts.insert("11", 5);
        counts.insert("00", 2);

        assert_eq!(counts.get("00"), 5);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total_shots(), 10);
        assert_eq!(counts.len(), 2);
        assert!((counts.probability("11") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sorted_and_most_frequent() {
        let counts = Counts::from_pairs([("01", 4u64), ("10", 4), ("11", 9)]);
        let sorted: Vec<_> = counts.sorted().into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(sorted, ["11", "01", "10"]);
        assert_eq!(counts.most_frequent(), Some((&"11".to_string(), &9)));
        assert_eq!(Counts::new().most_frequent(), None);
        assert_eq!(Counts::new().probability("0"), 0.0);
    }

    #[test]
    fn test_merge() {
        let mut a = Counts::from_pairs([("0", 1u64), ("1", 2)]);
        a.merge(Counts::from_pairs([("1", 3u64), ("0", 0)]));
        assert_eq!(a.get("1"), 5);
        assert_eq!(a.total_shots(), 6);
    }

    #[test]
    fn test_marginal_keeps_bit_order() {
        // clbit 2 leftmost
        let counts = Counts::from_pairs([("100", 7u64), ("001", 3), ("101", 5)]);
        let m = counts.marginal(&[2]);
        assert_eq!(m.get("1"), 12);
        assert_eq!(m.get("0"), 3);

        let m = counts.marginal(&[0, 2]);
        assert_eq!(m.get("10"), 7);
        assert_eq!(m.get("01"), 3);
        assert_eq!(m.get("11"), 5);
    }

    #[test]
    fn test_execution_result_serde() {
        let result = ExecutionResult::new(Counts::from_pairs([("0", 10u64)]), 10)
            .with_execution_time(3)
            .with_metadata("seed", serde_json::json!(42));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["counts"]["0"], 10);
        assert_eq!(json["metadata"]["seed"], 42);

        let back: ExecutionResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
