//! Window-style computations as plain functions over row sequences
//!
//! The catalog expresses its LAG / percentage-of-total / LIMIT logic through
//! these helpers instead of a SQL engine's window syntax, so the arithmetic
//! edge cases (zero base, single group, empty input) are unit-testable in
//! isolation.

/// Round to 2 decimal places. All percentage columns in the catalog carry
/// this precision.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Growth of each value relative to its predecessor, in percent.
///
/// The first entry has no predecessor and yields None. A zero predecessor is
/// treated the same way: the growth is undefined, not an error.
pub fn lag_growth(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &curr in values {
        let growth = match prev {
            Some(base) if base != 0.0 => Some(round2((curr - base) * 100.0 / base)),
            _ => None,
        };
        out.push(growth);
        prev = Some(curr);
    }
    out
}

/// Percentage of each value against the sum of all values, to 2 decimals.
///
/// Over the complete, unfiltered input the results sum to 100 within
/// rounding tolerance. A zero total maps every entry to 0.
pub fn percentage_of_total(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|&v| round2(v * 100.0 / total)).collect()
}

/// Rank order for extreme-value queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Largest metric first.
    Descending,
    /// Smallest metric first.
    Ascending,
}

/// Take the top `n` entries by metric.
///
/// The input must already be ordered by grouping key (BTreeMap iteration
/// order gives this for free); the sort is stable, so metric ties resolve to
/// ascending key order. That tie-break is deterministic where SQL's
/// `ORDER BY ... LIMIT` would be engine-dependent.
pub fn rank<K>(mut entries: Vec<(K, f64)>, n: usize, direction: Direction) -> Vec<(K, f64)> {
    entries.sort_by(|a, b| {
        let ord = a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal);
        match direction {
            Direction::Descending => ord.reverse(),
            Direction::Ascending => ord,
        }
    });
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lag_growth_first_is_none() {
        assert_eq!(lag_growth(&[100.0]), vec![None]);
        assert_eq!(lag_growth(&[]), Vec::<Option<f64>>::new());
    }

    #[test]
    fn test_lag_growth_exact() {
        let growth = lag_growth(&[100.0, 150.0, 75.0]);
        assert_eq!(growth, vec![None, Some(50.0), Some(-50.0)]);
    }

    #[test]
    fn test_lag_growth_zero_base_is_none() {
        let growth = lag_growth(&[0.0, 10.0, 20.0]);
        assert_eq!(growth, vec![None, None, Some(100.0)]);
    }

    #[test]
    fn test_percentage_sums_to_100() {
        let pct = percentage_of_total(&[1.0, 1.0, 1.0]);
        let sum: f64 = pct.iter().sum();
        assert!((sum - 100.0).abs() <= 0.01, "sum was {sum}");
    }

    #[test]
    fn test_percentage_single_and_empty() {
        assert_eq!(percentage_of_total(&[7.0]), vec![100.0]);
        assert_eq!(percentage_of_total(&[]), Vec::<f64>::new());
        assert_eq!(percentage_of_total(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_rank_truncates_and_orders() {
        let entries = vec![
            ("AC".to_string(), 3.0),
            ("BA".to_string(), 9.0),
            ("MG".to_string(), 1.0),
            ("RJ".to_string(), 7.0),
            ("RR".to_string(), 5.0),
            ("SP".to_string(), 8.0),
        ];
        let top = rank(entries.clone(), 5, Direction::Descending);
        let keys: Vec<&str> = top.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["BA", "SP", "RJ", "RR", "AC"]);

        let bottom = rank(entries, 5, Direction::Ascending);
        let keys: Vec<&str> = bottom.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["MG", "AC", "RR", "RJ", "SP"]);
    }

    #[test]
    fn test_rank_ties_break_by_key_order() {
        let entries = vec![
            ("AC".to_string(), 5.0),
            ("SP".to_string(), 5.0),
            ("TO".to_string(), 5.0),
        ];
        let top = rank(entries, 2, Direction::Descending);
        let keys: Vec<&str> = top.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["AC", "SP"]);
    }
}
