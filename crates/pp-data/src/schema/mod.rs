//! Column kind detection for text-sourced tables

use crate::table::ColumnKind;

/// Decide the kind of a column read as text.
///
/// A column is continuous when every defined entry parses as a number;
/// a column with no defined entries is continuous too, so it reads as all
/// `NaN` rather than as an empty category.
pub fn infer_kind(values: &[Option<String>]) -> ColumnKind {
    let all_numeric = values
        .iter()
        .flatten()
        .all(|value| value.parse::<f64>().is_ok());

    if all_numeric {
        ColumnKind::Continuous
    } else {
        ColumnKind::Categorical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_numeric_with_gaps_is_continuous() {
        assert_eq!(infer_kind(&owned(&[Some("1"), None, Some("2.5e3")])), ColumnKind::Continuous);
        assert_eq!(infer_kind(&owned(&[None, None])), ColumnKind::Continuous);
    }

    #[test]
    fn test_any_label_makes_categorical() {
        assert_eq!(infer_kind(&owned(&[Some("1"), Some("red")])), ColumnKind::Categorical);
        assert_eq!(infer_kind(&owned(&[Some("true"), Some("false")])), ColumnKind::Categorical);
    }
}
