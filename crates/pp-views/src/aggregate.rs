//! Aggregations drawn when no series is plotted

use indexmap::IndexMap;
use pp_core::BinSpec;

/// Equal-width binning of a value range
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` ascending bin edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    /// Width shared by every bin
    pub fn width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) if !self.counts.is_empty() => (last - first) / self.counts.len() as f64,
            _ => 0.0,
        }
    }
}

/// Bin `values` into equal-width bins over their range.
///
/// Returns `None` for empty input or when any value is undefined. A
/// constant column yields a single unit-wide bin centred on the value.
pub fn histogram(values: &[f64], bins: BinSpec) -> Option<Histogram> {
    if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return Some(Histogram {
            edges: vec![min - 0.5, min + 0.5],
            counts: vec![values.len()],
        });
    }

    let n = bins.bin_count(values.len());
    let span = max - min;
    let edges = (0..=n).map(|i| min + span * i as f64 / n as f64).collect();

    let mut counts = vec![0; n];
    for value in values {
        let bin = (((value - min) / span) * n as f64).floor() as usize;
        counts[bin.min(n - 1)] += 1;
    }

    Some(Histogram { edges, counts })
}

/// Occurrence count of each distinct label
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCounts {
    /// Distinct labels in first-seen order
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

impl CategoryCounts {
    /// Bar positions `0..labels.len()`
    pub fn positions(&self) -> Vec<f64> {
        (0..self.labels.len()).map(|i| i as f64).collect()
    }

    pub fn heights(&self) -> Vec<f64> {
        self.counts.iter().map(|&c| c as f64).collect()
    }
}

/// Count labels; `None` when any entry is undefined
pub fn category_counts(values: &[Option<String>]) -> Option<CategoryCounts> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value.as_deref()?).or_insert(0) += 1;
    }

    Some(CategoryCounts {
        labels: counts.keys().map(|label| label.to_string()).collect(),
        counts: counts.into_values().collect(),
    })
}

/// Bar width for one bar per row: `fraction` of the smallest gap between
/// distinct x values, or of a one-unit gap when there are fewer than two
pub fn row_bar_width(x: &[f64], fraction: f64) -> f64 {
    let mut sorted: Vec<f64> = x.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let gap = sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > 0.0)
        .fold(f64::INFINITY, f64::min);

    if gap.is_finite() {
        gap * fraction
    } else {
        fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_fixed_bins() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 10.0];
        let hist = histogram(&values, BinSpec::Fixed(5)).unwrap();

        assert_eq!(hist.edges, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(hist.counts, vec![2, 2, 1, 0, 1]);
        assert_eq!(hist.centers(), vec![1.0, 3.0, 5.0, 7.0, 9.0]);
        assert_eq!(hist.width(), 2.0);
        assert_eq!(hist.counts.iter().sum::<usize>(), values.len());
    }

    #[test]
    fn test_histogram_auto_bins() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let hist = histogram(&values, BinSpec::Auto).unwrap();

        assert_eq!(hist.counts.len(), 8);
        assert_eq!(hist.counts.iter().sum::<usize>(), 100);
    }

    #[test]
    fn test_histogram_constant_and_undefined() {
        let hist = histogram(&[3.0, 3.0, 3.0], BinSpec::Fixed(10)).unwrap();
        assert_eq!(hist.edges, vec![2.5, 3.5]);
        assert_eq!(hist.counts, vec![3]);

        assert!(histogram(&[], BinSpec::Fixed(10)).is_none());
        assert!(histogram(&[1.0, f64::NAN], BinSpec::Fixed(10)).is_none());
    }

    #[test]
    fn test_category_counts_first_seen_order() {
        let values: Vec<Option<String>> = ["x", "y", "x", "z", "x"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        let counts = category_counts(&values).unwrap();

        assert_eq!(counts.labels, vec!["x", "y", "z"]);
        assert_eq!(counts.counts, vec![3, 1, 1]);
        assert_eq!(counts.positions(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_category_counts_rejects_undefined() {
        let values = vec![Some("x".to_string()), None];
        assert!(category_counts(&values).is_none());
    }

    #[test]
    fn test_row_bar_width() {
        assert_eq!(row_bar_width(&[0.0, 2.0, 3.0, 3.0], 0.5), 0.5);
        assert_eq!(row_bar_width(&[4.0, 0.0, 8.0], 0.8), 3.2);
    }

    #[test]
    fn test_row_bar_width_without_gap_uses_unit_slot() {
        assert_eq!(row_bar_width(&[1.0], 0.8), 0.8);
        assert_eq!(row_bar_width(&[2.0, 2.0, f64::NAN], 0.8), 0.8);
        assert_eq!(row_bar_width(&[], 0.5), 0.5);
    }

    #[test]
    fn test_histogram_bin_count_is_bounded() {
        let hist = histogram(&[0.0, 1.0], BinSpec::Fixed(usize::MAX)).unwrap();
        assert_eq!(hist.counts.len(), pp_core::MAX_BINS);
        assert_eq!(hist.edges.len(), pp_core::MAX_BINS + 1);
        assert_eq!(hist.counts.iter().sum::<usize>(), 2);
    }
}
