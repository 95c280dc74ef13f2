#![deny(missing_docs)]
//! This crate fetches the datasets of the
//! [Penn Machine Learning Benchmark](https://github.com/EpistasisLab/pmlb) (PMLB).
//!
//! Datasets are gzip-compressed TSV files with a `target` column. They can be kept in a
//! local cache directory, and the remote summary-statistics table can be used to pick
//! datasets by size, class count or problem type.
//!
//! ```no_run
//! use pmlb::{DatasetFilter, FetchOptions, Pmlb, Task};
//!
//! let pmlb = Pmlb::new().unwrap();
//! let iris = pmlb
//!     .fetch_data("iris", &FetchOptions::new().cache_dir("./pmlb_cache"))
//!     .unwrap();
//! println!("{} rows", iris.n_rows());
//!
//! let small = pmlb
//!     .filter_datasets(&DatasetFilter::new().obs_max(200).task(Task::Classification))
//!     .unwrap();
//! println!("{small:?}");
//! ```
use reqwest::blocking::Client;
use reqwest::Error as ReqwestError;
use std::path::PathBuf;
use thiserror::Error;

pub mod catalog;
pub mod changes;
pub mod fetch;
pub mod remote;
pub mod summary;
pub mod table;

pub use catalog::{
    classification_dataset_names, dataset_names, is_known, regression_dataset_names, task_of, Task,
};
pub use changes::{changed_datasets, changed_datasets_in, ChangedDatasets};
pub use fetch::{cache_path, dataset_url, FetchOptions, Fetched};
pub use remote::{HttpRemote, MemoryRemote, Remote};
pub use summary::{DatasetFilter, SummaryRow};
pub use table::{Table, Value, TARGET};

/// Where the dataset files live.
pub const GITHUB_URL: &str = "https://github.com/EpistasisLab/penn-ml-benchmarks/raw/master/datasets";

/// Where the summary-statistics table lives.
pub const SUMMARY_URL: &str =
    "https://raw.githubusercontent.com/EpistasisLab/penn-ml-benchmarks/master/datasets/all_summary_stats.csv";

/// Environment variable naming the default cache directory.
pub const CACHE_DIR_ENV: &str = "PMLB_CACHE_DIR";

/// Error type for PMLB
#[derive(Debug, Error)]
pub enum Error {
    /// The name is not in the catalog, or the remote does not have it.
    #[error("Dataset not found in PMLB: {0}")]
    UnknownDataset(String),

    /// Features and labels were requested from a table without a `target` column.
    #[error("no `target` column")]
    MissingTarget,

    /// A cell that should be a number is not.
    #[error("column {column:?} row {row} is not numeric")]
    NonNumeric {
        /// Column name.
        column: String,
        /// Zero-based row index.
        row: usize,
    },

    /// A row does not have one field per column.
    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        /// One-based line number, header included.
        line: u64,
        /// Number of columns in the header.
        expected: usize,
        /// Number of fields on the line.
        found: usize,
    },

    /// `git` failed.
    #[error("git: {0}")]
    Git(String),

    /// Error in the request
    #[error("request error: {0}")]
    Request(#[from] ReqwestError),

    /// Filesystem or decompression error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited text
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Could not shape the feature matrix
    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Client to fetch and filter PMLB datasets.
pub struct Pmlb {
    remote: Box<dyn Remote>,
    base_url: String,
    summary_url: String,
    cache_dir: Option<PathBuf>,
}

impl Pmlb {
    /// A client with default settings, see [`PmlbBuilder::new`].
    pub fn new() -> Result<Self, Error> {
        PmlbBuilder::new().build()
    }

    /// Default cache root used when [`FetchOptions::cache_dir`] is unset.
    pub fn cache_dir(&self) -> Option<&std::path::Path> {
        self.cache_dir.as_deref()
    }
}

/// Helper to create a [`Pmlb`] with custom settings.
pub struct PmlbBuilder {
    base_url: String,
    summary_url: String,
    cache_dir: Option<PathBuf>,
    user_agent: String,
    remote: Option<Box<dyn Remote>>,
}

impl Default for PmlbBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PmlbBuilder {
    /// Defaults to the GitHub-hosted files, and to the `PMLB_CACHE_DIR`
    /// environment variable for the cache directory (no cache when unset).
    pub fn new() -> Self {
        let cache_dir = std::env::var_os(CACHE_DIR_ENV)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);
        Self {
            base_url: GITHUB_URL.to_string(),
            summary_url: SUMMARY_URL.to_string(),
            cache_dir,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            remote: None,
        }
    }

    /// Fetch dataset files from under `base_url`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the summary-statistics CSV from `summary_url`.
    pub fn with_summary_url(mut self, summary_url: impl Into<String>) -> Self {
        self.summary_url = summary_url.into();
        self
    }

    /// Cache datasets under `cache_dir` unless a call says otherwise.
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    /// Do not cache unless a call asks for it, whatever the environment says.
    pub fn without_cache_dir(mut self) -> Self {
        self.cache_dir = None;
        self
    }

    /// User agent of the HTTP client. Ignored with [`PmlbBuilder::with_remote`].
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Use `remote` instead of HTTP.
    pub fn with_remote(mut self, remote: impl Remote + 'static) -> Self {
        self.remote = Some(Box::new(remote));
        self
    }

    /// Consume the builder.
    pub fn build(self) -> Result<Pmlb, Error> {
        let remote = match self.remote {
            Some(remote) => remote,
            None => {
                let client = Client::builder().user_agent(self.user_agent).build()?;
                Box::new(HttpRemote::new(client))
            }
        };
        Ok(Pmlb {
            remote,
            base_url: self.base_url,
            summary_url: self.summary_url,
            cache_dir: self.cache_dir,
        })
    }
}
