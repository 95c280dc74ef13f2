//! Selecting datasets by their summary statistics.
use crate::catalog::Task;
use crate::{Error, Pmlb};
use log::{debug, info};
use serde::Deserialize;
use std::io::Read;

/// One row of the summary-statistics table.
///
/// Numeric cells that are empty or not a number (`NA`, `nan`, ...) are `None` and
/// never satisfy a bound.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryRow {
    /// Dataset name.
    pub dataset: String,
    /// Number of instances (rows).
    #[serde(rename = "#instances", default, deserialize_with = "csv::invalid_option")]
    pub n_instances: Option<f64>,
    /// Number of features.
    #[serde(rename = "#features", default, deserialize_with = "csv::invalid_option")]
    pub n_features: Option<f64>,
    /// Number of distinct target values.
    #[serde(rename = "#Classes", default, deserialize_with = "csv::invalid_option")]
    pub n_classes: Option<f64>,
    /// Class imbalance, 0 for perfectly balanced.
    #[serde(rename = "Imbalance_metric", default, deserialize_with = "csv::invalid_option")]
    pub imbalance: Option<f64>,
    /// e.g. `binary`, `categorical`, `continuous`.
    #[serde(rename = "Endpoint_type")]
    pub endpoint_type: Option<String>,
    /// `classification` or `regression`.
    pub problem_type: Option<String>,
}

/// Parse the summary table from CSV. Columns other than the ones in
/// [`SummaryRow`] are ignored.
pub fn parse_summary<R: Read>(reader: R) -> Result<Vec<SummaryRow>, Error> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// A conjunction of constraints on [`SummaryRow`]s. Unset constraints match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetFilter {
    /// Inclusive lower bound on the instance count.
    pub obs_min: Option<f64>,
    /// Inclusive upper bound on the instance count.
    pub obs_max: Option<f64>,
    /// Inclusive lower bound on the feature count.
    pub feat_min: Option<f64>,
    /// Inclusive upper bound on the feature count.
    pub feat_max: Option<f64>,
    /// Inclusive lower bound on the class count.
    pub class_min: Option<f64>,
    /// Inclusive upper bound on the class count.
    pub class_max: Option<f64>,
    /// Exact endpoint type.
    pub endpoint_type: Option<String>,
    /// Strict upper bound on the imbalance metric.
    pub max_imbalance: Option<f64>,
    /// Exact problem type.
    pub task: Option<Task>,
}

impl DatasetFilter {
    /// A filter with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// At least `n` instances.
    pub fn obs_min(mut self, n: impl Into<f64>) -> Self {
        self.obs_min = Some(n.into());
        self
    }

    /// At most `n` instances.
    pub fn obs_max(mut self, n: impl Into<f64>) -> Self {
        self.obs_max = Some(n.into());
        self
    }

    /// At least `n` features.
    pub fn feat_min(mut self, n: impl Into<f64>) -> Self {
        self.feat_min = Some(n.into());
        self
    }

    /// At most `n` features.
    pub fn feat_max(mut self, n: impl Into<f64>) -> Self {
        self.feat_max = Some(n.into());
        self
    }

    /// At least `n` classes.
    pub fn class_min(mut self, n: impl Into<f64>) -> Self {
        self.class_min = Some(n.into());
        self
    }

    /// At most `n` classes.
    pub fn class_max(mut self, n: impl Into<f64>) -> Self {
        self.class_max = Some(n.into());
        self
    }

    /// Endpoint type equal to `endpoint_type`.
    pub fn endpoint_type(mut self, endpoint_type: impl Into<String>) -> Self {
        self.endpoint_type = Some(endpoint_type.into());
        self
    }

    /// Imbalance strictly below `max`.
    pub fn max_imbalance(mut self, max: f64) -> Self {
        self.max_imbalance = Some(max);
        self
    }

    /// Problem type equal to `task`.
    pub fn task(mut self, task: Task) -> Self {
        self.task = Some(task);
        self
    }

    /// Whether `row` satisfies every constraint that is set.
    pub fn matches(&self, row: &SummaryRow) -> bool {
        fn at_least(value: Option<f64>, bound: Option<f64>) -> bool {
            match (value, bound) {
                (_, None) => true,
                (Some(v), Some(b)) => v >= b,
                (None, Some(_)) => false,
            }
        }
        fn at_most(value: Option<f64>, bound: Option<f64>) -> bool {
            match (value, bound) {
                (_, None) => true,
                (Some(v), Some(b)) => v <= b,
                (None, Some(_)) => false,
            }
        }

        at_least(row.n_instances, self.obs_min)
            && at_most(row.n_instances, self.obs_max)
            && at_least(row.n_features, self.feat_min)
            && at_most(row.n_features, self.feat_max)
            && at_least(row.n_classes, self.class_min)
            && at_most(row.n_classes, self.class_max)
            && match (row.imbalance, self.max_imbalance) {
                (_, None) => true,
                (Some(v), Some(max)) => v < max,
                (None, Some(_)) => false,
            }
            && self
                .endpoint_type
                .as_deref()
                .map_or(true, |e| row.endpoint_type.as_deref() == Some(e))
            && self
                .task
                .map_or(true, |t| row.problem_type.as_deref() == Some(t.as_str()))
    }

    /// Names of the rows in `rows` that match, in table order.
    pub fn apply<'a>(&self, rows: &'a [SummaryRow]) -> Vec<&'a str> {
        rows.iter()
            .filter(|row| self.matches(row))
            .map(|row| row.dataset.as_str())
            .collect()
    }
}

impl Pmlb {
    /// Download the summary-statistics table. Never cached.
    pub fn summary(&self) -> Result<Vec<SummaryRow>, Error> {
        info!("downloading {}", self.summary_url);
        let bytes = self.remote.get(&self.summary_url)?;
        parse_summary(&bytes[..])
    }

    /// Names of the datasets in the summary table that satisfy `filter`.
    ///
    /// An empty list when nothing matches.
    pub fn filter_datasets(&self, filter: &DatasetFilter) -> Result<Vec<String>, Error> {
        let rows = self.summary()?;
        let names: Vec<String> = filter.apply(&rows).into_iter().map(String::from).collect();
        debug!("{} of {} datasets match {filter:?}", names.len(), rows.len());
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemote;
    use crate::PmlbBuilder;

    const SUMMARY_URL: &str = "http://mirror.test/all_summary_stats.csv";
    const SUMMARY: &str = "\
dataset,#instances,#features,#binary_features,#Classes,Imbalance_metric,Endpoint_type,problem_type
iris,150,4,0,3,0.0,categorical,classification
adult,48842,14,1,2,0.27,binary,classification
564_fried,40768,10,0,,,continuous,regression
mushroom,8124,22,5,2,0.0013,binary,classification
";

    fn client() -> Pmlb {
        let remote = MemoryRemote::new();
        remote.insert(SUMMARY_URL, SUMMARY.as_bytes().to_vec());
        PmlbBuilder::new()
            .with_summary_url(SUMMARY_URL)
            .without_cache_dir()
            .with_remote(remote)
            .build()
            .unwrap()
    }

    #[test]
    fn parse_rows() {
        let rows = parse_summary(SUMMARY.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].dataset, "iris");
        assert_eq!(rows[0].n_instances, Some(150.0));
        assert_eq!(rows[0].endpoint_type.as_deref(), Some("categorical"));
        assert_eq!(rows[2].n_classes, None);
        assert_eq!(rows[2].imbalance, None);
    }

    #[test]
    fn missing_markers_in_numeric_cells() {
        let text = "\
dataset,#instances,#features,#Classes,Imbalance_metric,Endpoint_type,problem_type
iris,150,4,3,0.0,categorical,classification
564_fried,40768,10,NA,NA,continuous,regression
";
        let rows = parse_summary(text.as_bytes()).unwrap();
        assert_eq!(rows[1].n_classes, None);
        assert_eq!(rows[1].imbalance, None);

        let remote = MemoryRemote::new();
        remote.insert(SUMMARY_URL, text.as_bytes().to_vec());
        let pmlb = PmlbBuilder::new()
            .with_summary_url(SUMMARY_URL)
            .with_remote(remote)
            .build()
            .unwrap();
        let names = pmlb.filter_datasets(&DatasetFilter::new()).unwrap();
        assert_eq!(names, vec!["iris", "564_fried"]);
        let names = pmlb
            .filter_datasets(&DatasetFilter::new().class_max(5))
            .unwrap();
        assert_eq!(names, vec!["iris"]);
    }

    #[test]
    fn no_constraints_returns_everything() {
        let names = client().filter_datasets(&DatasetFilter::new()).unwrap();
        assert_eq!(names, vec!["iris", "adult", "564_fried", "mushroom"]);
    }

    #[test]
    fn impossible_constraint_returns_nothing() {
        let names = client()
            .filter_datasets(&DatasetFilter::new().obs_min(1_000_000))
            .unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn bounds_are_inclusive() {
        let pmlb = client();
        let names = pmlb
            .filter_datasets(&DatasetFilter::new().obs_min(150).obs_max(8124))
            .unwrap();
        assert_eq!(names, vec!["iris", "mushroom"]);

        let names = pmlb
            .filter_datasets(&DatasetFilter::new().feat_min(10).feat_max(14))
            .unwrap();
        assert_eq!(names, vec!["adult", "564_fried"]);
    }

    #[test]
    fn imbalance_is_strict() {
        let names = client()
            .filter_datasets(&DatasetFilter::new().max_imbalance(0.27))
            .unwrap();
        assert_eq!(names, vec!["iris", "mushroom"]);
    }

    #[test]
    fn empty_cells_fail_bounds_on_their_column_only() {
        let pmlb = client();
        let names = pmlb
            .filter_datasets(&DatasetFilter::new().class_min(0))
            .unwrap();
        assert!(!names.contains(&"564_fried".to_string()));

        let names = pmlb
            .filter_datasets(&DatasetFilter::new().feat_min(0))
            .unwrap();
        assert!(names.contains(&"564_fried".to_string()));
    }

    #[test]
    fn categorical_constraints() {
        let pmlb = client();
        let names = pmlb
            .filter_datasets(&DatasetFilter::new().endpoint_type("binary"))
            .unwrap();
        assert_eq!(names, vec!["adult", "mushroom"]);

        let names = pmlb
            .filter_datasets(&DatasetFilter::new().task(Task::Regression))
            .unwrap();
        assert_eq!(names, vec!["564_fried"]);

        let names = pmlb
            .filter_datasets(
                &DatasetFilter::new()
                    .task(Task::Classification)
                    .class_max(2)
                    .max_imbalance(0.1),
            )
            .unwrap();
        assert_eq!(names, vec!["mushroom"]);
    }

    #[test]
    fn summary_is_fetched_on_every_call() {
        let remote = MemoryRemote::new();
        remote.insert(SUMMARY_URL, SUMMARY.as_bytes().to_vec());
        let pmlb = PmlbBuilder::new()
            .with_summary_url(SUMMARY_URL)
            .with_remote(remote.clone())
            .build()
            .unwrap();
        pmlb.filter_datasets(&DatasetFilter::new()).unwrap();
        pmlb.filter_datasets(&DatasetFilter::new()).unwrap();
        assert_eq!(remote.requests().len(), 2);
    }
}
