// Tercile classification of indicator columns.
//
// A column is split into Low / Medium / High at its 1/3 and 2/3 quantiles.
// Intervals are closed on the right, so a value sitting exactly on a
// boundary goes to the lower class. Degenerate columns never fail:
// - no numeric values at all -> every position is NoData,
// - a single distinct value  -> Medium wherever a value exists,
// - quantile edges that collapse (heavy ties) -> equal-width bins over
//   [min, max].
use crate::table::IndicatorTable;
use crate::types::Category;
use crate::util::{parse_f64_safe, quantile_sorted, sorted_values};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binning {
    AllMissing,
    Constant(f64),
    Terciles { lower: f64, upper: f64 },
    EqualWidth { lower: f64, upper: f64 },
}

impl Binning {
    /// Choose the binning for the non-null values of a column.
    pub fn for_values(values: &[f64]) -> Binning {
        let sorted = sorted_values(values);
        let (min, max) = match (sorted.first(), sorted.last()) {
            (Some(min), Some(max)) => (*min, *max),
            _ => return Binning::AllMissing,
        };
        if min == max {
            return Binning::Constant(min);
        }

        if let (Some(q1), Some(q2)) = (
            quantile_sorted(&sorted, 1.0 / 3.0),
            quantile_sorted(&sorted, 2.0 / 3.0),
        ) {
            // Edges must be strictly increasing, otherwise a tercile is empty.
            if min < q1 && q1 < q2 && q2 < max {
                return Binning::Terciles { lower: q1, upper: q2 };
            }
            tracing::debug!(min, q1, q2, max, "tercile edges collapse; using equal-width bins");
        }

        let width = (max - min) / 3.0;
        Binning::EqualWidth {
            lower: min + width,
            upper: min + 2.0 * width,
        }
    }

    /// Class of one value. `None`, NaN and infinities are NoData.
    pub fn category(&self, value: Option<f64>) -> Category {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return Category::NoData;
        };
        match *self {
            Binning::AllMissing => Category::NoData,
            Binning::Constant(_) => Category::Medium,
            Binning::Terciles { lower, upper } | Binning::EqualWidth { lower, upper } => {
                if v <= lower {
                    Category::Low
                } else if v <= upper {
                    Category::Medium
                } else {
                    Category::High
                }
            }
        }
    }
}

/// Classify already-coerced values; output is parallel to the input.
pub fn classify_values(values: &[Option<f64>]) -> Vec<Category> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let binning = Binning::for_values(&present);
    values.iter().map(|v| binning.category(*v)).collect()
}

/// Coerce raw cells to numbers, then classify. Blank or non-numeric cells
/// count as missing.
pub fn classify_raw<S: AsRef<str>>(raw: &[Option<S>]) -> Vec<Category> {
    let values: Vec<Option<f64>> = raw
        .iter()
        .map(|c| parse_f64_safe(c.as_ref().map(|s| s.as_ref())))
        .collect();
    classify_values(&values)
}

/// Classify one indicator over every row of `table`. An absent column
/// yields NoData for every row.
pub fn classify_indicator(table: &IndicatorTable, indicator: &str) -> Vec<Category> {
    match table.column(indicator) {
        Some(cells) => classify_raw(cells),
        None => {
            tracing::debug!(scenario = table.scenario(), indicator, "indicator column absent");
            vec![Category::NoData; table.len()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Category::*;

    fn some(v: &[f64]) -> Vec<Option<f64>> {
        v.iter().copied().map(Some).collect()
    }

    #[test]
    fn three_values_split_into_three_classes() {
        assert_eq!(classify_values(&some(&[10.0, 20.0, 30.0])), vec![Low, Medium, High]);
    }

    #[test]
    fn order_of_input_is_preserved() {
        assert_eq!(classify_values(&some(&[30.0, 10.0, 20.0])), vec![High, Low, Medium]);
    }

    #[test]
    fn all_missing_is_no_data() {
        assert_eq!(classify_values(&[None, None, None, None]), vec![NoData; 4]);
        assert!(classify_values(&[]).is_empty());
        assert_eq!(classify_raw(&[Some("n/a"), None, Some("")]), vec![NoData; 3]);
    }

    #[test]
    fn constant_column_is_medium() {
        assert_eq!(classify_values(&some(&[5.0, 5.0, 5.0])), vec![Medium; 3]);
        assert_eq!(
            classify_values(&[Some(5.0), None, Some(5.0)]),
            vec![Medium, NoData, Medium]
        );
    }

    #[test]
    fn nulls_map_to_no_data_and_only_nulls() {
        let input = [Some(1.0), None, Some(4.0), Some(2.0), None, Some(9.0), Some(7.0)];
        let out = classify_values(&input);
        assert_eq!(out.len(), input.len());
        for (v, c) in input.iter().zip(&out) {
            assert_eq!(v.is_none(), c.is_no_data());
        }
        assert!(out.contains(&Low) && out.contains(&High));
    }

    #[test]
    fn non_finite_values_are_no_data() {
        let out = classify_values(&[Some(1.0), Some(2.0), Some(3.0), Some(f64::NAN), Some(f64::INFINITY)]);
        assert_eq!(out, vec![Low, Medium, High, NoData, NoData]);
        assert_eq!(classify_values(&[Some(5.0), Some(f64::NAN)]), vec![Medium, NoData]);
        assert_eq!(classify_values(&[Some(f64::NEG_INFINITY)]), vec![NoData]);
    }

    #[test]
    fn boundary_ties_go_to_lower_class() {
        // n = 4: q1 = 2.0, q2 = 3.0 exactly on data points.
        let b = Binning::for_values(&[1.0, 2.0, 3.0, 4.0]);
        match b {
            Binning::Terciles { lower, upper } => {
                assert!((lower - 2.0).abs() < 1e-12);
                assert!((upper - 3.0).abs() < 1e-12);
            }
            other => panic!("expected terciles, got {other:?}"),
        }
        assert_eq!(b.category(Some(2.0)), Low);
        assert_eq!(b.category(Some(3.0)), Medium);
        assert_eq!(b.category(Some(3.000_1)), High);
    }

    #[test]
    fn collapsed_terciles_fall_back_to_equal_width() {
        let values = some(&[1.0, 1.0, 1.0, 1.0, 2.0]);
        let b = Binning::for_values(&[1.0, 1.0, 1.0, 1.0, 2.0]);
        assert!(matches!(b, Binning::EqualWidth { .. }));
        assert_eq!(classify_values(&values), vec![Low, Low, Low, Low, High]);

        let b = Binning::for_values(&[0.0, 0.0, 0.0, 6.0, 6.0, 6.0, 3.0]);
        assert!(matches!(b, Binning::EqualWidth { .. }));
        assert_eq!(b.category(Some(3.0)), Medium);
    }

    #[test]
    fn two_distinct_values_use_low_and_high() {
        assert_eq!(classify_values(&some(&[1.0, 2.0])), vec![Low, High]);
    }

    #[test]
    fn raw_cells_are_coerced() {
        assert_eq!(
            classify_raw(&[Some("10"), Some(" 20 "), Some("thirty"), Some("1,000")]),
            vec![Low, Medium, NoData, High]
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let input = [Some(3.2), None, Some(-1.0), Some(8.8), Some(3.2), Some(0.0)];
        assert_eq!(classify_values(&input), classify_values(&input));
    }
}
