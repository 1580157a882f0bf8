//! Descriptive statistics in the familiar `describe` layout
//!
//! Numeric columns report `count`, `mean`, `std`, `min`, the quartiles and `max`.
//! When a dataset has no numeric column at all, every column is summarised
//! categorically with `count`, `unique`, `top` and `freq`.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

use super::Dataset;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Summarises a dataset column by column, preserving column order
pub fn describe(dataset: &Dataset) -> IndexMap<String, ColumnSummary> {
    let has_numeric = dataset.columns().iter().any(|c| c.data.is_numeric());

    dataset
        .columns()
        .iter()
        .filter(|c| !has_numeric || c.data.is_numeric())
        .map(|column| {
            let summary = if has_numeric {
                let values: Vec<f64> = dataset
                    .numeric_column(&column.name)
                    .unwrap_or_default()
                    .into_iter()
                    .flatten()
                    .collect();
                ColumnSummary::Numeric(summarize_numeric(values))
            } else {
                ColumnSummary::Categorical(summarize_categorical(column.data.display_cells()))
            };
            (column.name.clone(), summary)
        })
        .collect()
}

pub fn summarize_numeric(mut values: Vec<f64>) -> NumericSummary {
    let count = values.len();
    if count == 0 {
        return NumericSummary {
            count,
            mean: None,
            std: None,
            min: None,
            q25: None,
            q50: None,
            q75: None,
            max: None,
        };
    }

    values.sort_by(f64::total_cmp);

    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (count > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    });

    NumericSummary {
        count,
        mean: Some(mean),
        std,
        min: values.first().copied(),
        q25: Some(quantile(&values, 0.25)),
        q50: Some(quantile(&values, 0.50)),
        q75: Some(quantile(&values, 0.75)),
        max: values.last().copied(),
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn summarize_categorical(cells: Vec<Option<String>>) -> CategoricalSummary {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for cell in cells.iter().flatten() {
        let entry = counts.entry(cell.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(cell.as_str());
        }
        *entry += 1;
    }

    // first appearance wins ties
    let top = order
        .iter()
        .fold(None::<(&str, usize)>, |best, value| {
            let freq = counts[value];
            match best {
                Some((_, best_freq)) if best_freq >= freq => best,
                _ => Some((*value, freq)),
            }
        });

    CategoricalSummary {
        count: cells.iter().flatten().count(),
        unique: order.len(),
        top: top.map(|(v, _)| v.to_string()),
        freq: top.map(|(_, f)| f),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dataset(text: &str) -> Dataset {
        Dataset::from_reader(text.as_bytes(), b',', &PathBuf::from("t.csv")).unwrap()
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|a| (a - b).abs() < 1e-9).unwrap_or(false)
    }

    #[test]
    fn test_numeric_summary() {
        let summary = summarize_numeric(vec![5.0, 1.0, 3.0, 2.0, 4.0]);

        assert_eq!(summary.count, 5);
        assert!(approx(summary.mean, 3.0));
        assert!(approx(summary.std, 2.5_f64.sqrt()));
        assert!(approx(summary.min, 1.0));
        assert!(approx(summary.q25, 2.0));
        assert!(approx(summary.q50, 3.0));
        assert!(approx(summary.q75, 4.0));
        assert!(approx(summary.max, 5.0));
    }

    #[test]
    fn test_quantile_interpolates() {
        let summary = summarize_numeric(vec![1.0, 2.0, 3.0, 4.0]);
        assert!(approx(summary.q25, 1.75));
        assert!(approx(summary.q50, 2.5));
        assert!(approx(summary.q75, 3.25));
    }

    #[test]
    fn test_single_and_empty_values() {
        let single = summarize_numeric(vec![7.0]);
        assert_eq!(single.count, 1);
        assert!(single.std.is_none());
        assert!(approx(single.q75, 7.0));

        let empty = summarize_numeric(vec![]);
        assert_eq!(empty.count, 0);
        assert!(empty.mean.is_none());
    }

    #[test]
    fn test_describe_skips_text_when_numeric_present() {
        let ds = dataset("name,x,y\na,1,\nb,2,4\n");
        let table = describe(&ds);

        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        match &table["y"] {
            ColumnSummary::Numeric(s) => assert_eq!(s.count, 1),
            other => panic!("expected numeric summary, got {:?}", other),
        }
    }

    #[test]
    fn test_describe_categorical_fallback() {
        let ds = dataset("color\nred\nblue\nblue\nred\ngreen\n");
        let table = describe(&ds);

        match &table["color"] {
            ColumnSummary::Categorical(s) => {
                assert_eq!(s.count, 5);
                assert_eq!(s.unique, 3);
                assert_eq!(s.top.as_deref(), Some("red"));
                assert_eq!(s.freq, Some(2));
            }
            other => panic!("expected categorical summary, got {:?}", other),
        }
    }

    #[test]
    fn test_serialized_keys() {
        let ds = dataset("x\n1\n2\n");
        let json = serde_json::to_value(describe(&ds)).unwrap();
        let keys: Vec<&str> = json["x"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec!["count", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
    }
}
