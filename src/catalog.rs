//! The fixed list of dataset names known to PMLB.
//!
//! The names are bundled with the crate and parsed once, on first access.
use std::collections::BTreeSet;
use std::sync::OnceLock;

const CLASSIFICATION: &str = include_str!("../data/classification_datasets.txt");
const REGRESSION: &str = include_str!("../data/regression_datasets.txt");

/// The kind of problem a dataset is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Discrete target.
    Classification,
    /// Continuous target.
    Regression,
}

impl Task {
    /// The spelling used in the `problem_type` column of the summary table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Classification => "classification",
            Task::Regression => "regression",
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Catalog {
    classification: Vec<&'static str>,
    regression: Vec<&'static str>,
    all: BTreeSet<&'static str>,
}

fn parse(list: &'static str) -> Vec<&'static str> {
    list.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        let classification = parse(CLASSIFICATION);
        let regression = parse(REGRESSION);
        let all = classification
            .iter()
            .chain(regression.iter())
            .copied()
            .collect();
        Catalog {
            classification,
            regression,
            all,
        }
    })
}

/// Names of the classification datasets, in catalog order.
pub fn classification_dataset_names() -> &'static [&'static str] {
    &catalog().classification
}

/// Names of the regression datasets, in catalog order.
pub fn regression_dataset_names() -> &'static [&'static str] {
    &catalog().regression
}

/// Every known dataset name, classification first.
pub fn dataset_names() -> impl Iterator<Item = &'static str> {
    let catalog = catalog();
    catalog
        .classification
        .iter()
        .chain(catalog.regression.iter())
        .copied()
}

/// Whether `name` is a dataset PMLB knows about.
pub fn is_known(name: &str) -> bool {
    catalog().all.contains(name)
}

/// Which partition of the catalog `name` belongs to, if any.
pub fn task_of(name: &str) -> Option<Task> {
    let catalog = catalog();
    if catalog.classification.iter().any(|n| *n == name) {
        Some(Task::Classification)
    } else if catalog.regression.iter().any(|n| *n == name) {
        Some(Task::Regression)
    } else {
        None
    }
}
