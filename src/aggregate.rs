//! Chart-ready summaries derived from a record collection.
//!
//! Everything in here is a pure function: the input is only read, and each
//! call returns freshly allocated output.

use std::collections::HashMap;

use tracing::trace;

use crate::domain::DashError;
use crate::record::Record;

/// One `(label, value)` pair of a ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingEntry {
    pub name: String,
    pub value: f64,
}

/// Count accumulator of a distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    /// Largest values first
    Top,
    /// Smallest values first
    Bottom,
}

/// The `n` highest (or lowest) entries of `records`.
///
/// Entries with equal values keep their input order. NaN values go after
/// every number in both directions.
pub fn top_n<T>(
    records: &[T],
    value_of: impl Fn(&T) -> f64,
    label_of: impl Fn(&T) -> String,
    n: usize,
    direction: Rank,
) -> Vec<RankingEntry> {
    let mut entries: Vec<RankingEntry> = records
        .iter()
        .map(|r| RankingEntry {
            name: label_of(r),
            value: value_of(r),
        })
        .collect();

    // sort_by is stable, ties stay in input order
    entries.sort_by(|a, b| match (a.value.is_nan(), b.value.is_nan()) {
        (false, false) => {
            let ord = a.value.total_cmp(&b.value);
            match direction {
                Rank::Top => ord.reverse(),
                Rank::Bottom => ord,
            }
        }
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    });
    entries.truncate(n);
    entries
}

/// Counts `records` into the buckets named by `bucket_order`.
///
/// Fails with [`DashError::UnknownBucketLabel`] as soon as `classify` returns
/// a label that is not part of `bucket_order`. A label listed twice counts
/// into its first bucket; the later copy stays at 0.
pub fn distribute<T, L: AsRef<str>>(
    records: &[T],
    classify: impl Fn(&T) -> String,
    bucket_order: &[L],
) -> Result<Vec<Bucket>, DashError> {
    let mut buckets: Vec<Bucket> = bucket_order
        .iter()
        .map(|label| Bucket {
            label: label.as_ref().to_string(),
            count: 0,
        })
        .collect();
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(bucket_order.len());
    for (idx, label) in bucket_order.iter().enumerate() {
        positions.entry(label.as_ref()).or_insert(idx);
    }

    for record in records {
        let label = classify(record);
        match positions.get(label.as_str()) {
            Some(&idx) => buckets[idx].count += 1,
            None => return Err(DashError::UnknownBucketLabel(label)),
        }
    }
    trace!("Distributed {} records into {} buckets", records.len(), buckets.len());
    Ok(buckets)
}

/// Number of records per key, in order of first occurrence of the key.
pub fn count_by<T>(records: &[T], key_of: impl Fn(&T) -> String) -> Vec<RankingEntry> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<RankingEntry> = Vec::new();
    for record in records {
        let key = key_of(record);
        match positions.get(&key) {
            Some(&idx) => entries[idx].value += 1.0,
            None => {
                positions.insert(key.clone(), entries.len());
                entries.push(RankingEntry {
                    name: key,
                    value: 1.0,
                });
            }
        }
    }
    entries
}

/// Histogram of the distinct string forms of field `key`.
///
/// Buckets are ordered by count, most frequent first; equal counts keep the
/// order in which the values first appear. Missing fields count as "".
pub fn value_counts<'a>(records: impl IntoIterator<Item = &'a Record>, key: &str) -> Vec<Bucket> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();
    for record in records {
        let label = record.get(key).map(|v| v.display()).unwrap_or_default();
        match positions.get(&label) {
            Some(&idx) => buckets[idx].count += 1,
            None => {
                positions.insert(label.clone(), buckets.len());
                buckets.push(Bucket { label, count: 1 });
            }
        }
    }
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

/// Ordered numeric ranges with labels.
///
/// Every range is half-open `[lower, upper)` except the last one, which
/// includes its upper bound. Using the same `Bins` for the classifier and the
/// bucket order keeps both consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    edges: Vec<f64>,
    labels: Vec<String>,
}

impl Bins {
    /// Bins between consecutive `edges`, labelled by `label(lower, upper)`.
    pub fn new(edges: &[f64], label: impl Fn(f64, f64) -> String) -> Self {
        let labels = edges.windows(2).map(|w| label(w[0], w[1])).collect();
        Self {
            edges: edges.to_vec(),
            labels,
        }
    }

    /// `0-20%`, `20-40%`, ... `80-100%`
    pub fn percentage(step: usize) -> Self {
        let step = step.clamp(1, 100);
        let mut edges: Vec<f64> = (0..100).step_by(step).map(|e| e as f64).collect();
        edges.push(100.0);
        Self::new(&edges, |lo, hi| format!("{lo}-{hi}%"))
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn classify(&self, value: f64) -> Option<&str> {
        let last = self.labels.len().checked_sub(1)?;
        self.edges.windows(2).enumerate().find_map(|(idx, w)| {
            let inside = value >= w[0] && (value < w[1] || (idx == last && value == w[1]));
            inside.then(|| self.labels[idx].as_str())
        })
    }

    /// [`distribute`] with this set of bins.
    ///
    /// Values outside every bin fail with [`DashError::UnknownBucketLabel`]
    /// carrying the offending value.
    pub fn distribute<T>(
        &self,
        records: &[T],
        value_of: impl Fn(&T) -> f64,
    ) -> Result<Vec<Bucket>, DashError> {
        distribute(
            records,
            |r| {
                let value = value_of(r);
                self.classify(value)
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string())
            },
            &self.labels,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, value: f64) -> (String, f64) {
        (name.to_string(), value)
    }

    fn rank(records: &[(String, f64)], n: usize, direction: Rank) -> Vec<RankingEntry> {
        top_n(records, |r| r.1, |r| r.0.clone(), n, direction)
    }

    #[test]
    fn top_n_keeps_input_order_on_ties() {
        let records = vec![entry("A", 5.0), entry("B", 5.0), entry("C", 3.0)];
        let top = rank(&records, 2, Rank::Top);
        assert_eq!(
            top,
            vec![
                RankingEntry { name: "A".into(), value: 5.0 },
                RankingEntry { name: "B".into(), value: 5.0 },
            ]
        );
    }

    #[test]
    fn bottom_n_ascending() {
        let records = vec![entry("A", 5.0), entry("B", 1.0), entry("C", 3.0), entry("D", 1.0)];
        let names: Vec<String> = rank(&records, 3, Rank::Bottom)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["B", "D", "C"]);
    }

    #[test]
    fn top_n_shorter_than_n() {
        let records = vec![entry("A", 1.0)];
        assert_eq!(rank(&records, 5, Rank::Top).len(), 1);
        assert!(rank(&[], 5, Rank::Top).is_empty());
        assert!(rank(&records, 0, Rank::Top).is_empty());
    }

    #[test]
    fn distribute_counts_in_bucket_order() {
        let statuses = vec!["Active", "Fault", "Active", "Idle"];
        let buckets = distribute(&statuses, |s| s.to_string(), &["Idle", "Active", "Fault"]).unwrap();
        assert_eq!(
            buckets,
            vec![
                Bucket { label: "Idle".into(), count: 1 },
                Bucket { label: "Active".into(), count: 2 },
                Bucket { label: "Fault".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn top_n_puts_nan_last() {
        let records: Vec<(String, f64)> = (0..200i32)
            .map(|i| {
                let value = if i % 7 == 0 { f64::NAN } else { f64::from((i * 37) % 101) };
                entry(&format!("E{i}"), value)
            })
            .collect();
        let top = rank(&records, 200, Rank::Top);
        assert!(top[..171].windows(2).all(|w| w[0].value >= w[1].value));
        assert!(top[171..].iter().all(|e| e.value.is_nan()));
        assert_eq!(top[171].name, "E0");

        let bottom = rank(&records, 5, Rank::Bottom);
        let values: Vec<f64> = bottom.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![0.0, 1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn distribute_counts_duplicate_label_once() {
        let statuses = vec!["Active", "Idle", "Active"];
        let buckets = distribute(&statuses, |s| s.to_string(), &["Active", "Idle", "Active"]).unwrap();
        let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 0]);
    }

    #[test]
    fn distribute_rejects_unknown_label() {
        let statuses = vec!["Active", "Retired"];
        let err = distribute(&statuses, |s| s.to_string(), &["Active"]).unwrap_err();
        assert!(matches!(err, DashError::UnknownBucketLabel(l) if l == "Retired"));
    }

    #[test]
    fn distribute_empty_input_gives_zero_buckets() {
        let empty: Vec<&str> = Vec::new();
        let buckets = distribute(&empty, |s| s.to_string(), &["a", "b"]).unwrap();
        assert!(buckets.iter().all(|b| b.count == 0));
        assert_eq!(buckets.len(), 2);
    }

    #[test]
    fn count_by_first_occurrence() {
        let faults = vec!["MARC 8051", "MARC 8050", "MARC 8051"];
        let counts = count_by(&faults, |f| f.to_string());
        assert_eq!(counts[0], RankingEntry { name: "MARC 8051".into(), value: 2.0 });
        assert_eq!(counts[1], RankingEntry { name: "MARC 8050".into(), value: 1.0 });
    }

    #[test]
    fn value_counts_most_frequent_first() {
        let records = vec![
            Record::new().with("status", "Idle"),
            Record::new().with("status", "Active"),
            Record::new().with("status", "Active"),
            Record::new(),
        ];
        let counts = value_counts(&records, "status");
        assert_eq!(counts[0], Bucket { label: "Active".into(), count: 2 });
        assert_eq!(counts[1], Bucket { label: "Idle".into(), count: 1 });
        assert_eq!(counts[2], Bucket { label: "".into(), count: 1 });
    }

    #[test]
    fn percentage_bins() {
        let bins = Bins::percentage(20);
        assert_eq!(bins.labels(), &["0-20%", "20-40%", "40-60%", "60-80%", "80-100%"]);
        assert_eq!(bins.classify(0.0), Some("0-20%"));
        assert_eq!(bins.classify(20.0), Some("20-40%"));
        assert_eq!(bins.classify(100.0), Some("80-100%"));
        assert_eq!(bins.classify(100.5), None);
        assert_eq!(bins.classify(-1.0), None);
    }

    #[test]
    fn bins_distribute_reports_out_of_range() {
        let bins = Bins::percentage(50);
        let values = vec![10.0, 75.0, 100.0];
        let buckets = bins.distribute(&values, |v| *v).unwrap();
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[1].count, 2);

        let err = bins.distribute(&[120.0], |v| *v).unwrap_err();
        assert!(matches!(err, DashError::UnknownBucketLabel(l) if l == "120"));
    }
}
