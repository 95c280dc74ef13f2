//! Fetching single datasets, with an optional local cache.
use crate::catalog;
use crate::table::Table;
use crate::{Error, Pmlb};
use log::{debug, info, warn};
use ndarray::{Array1, Array2};
use std::path::{Path, PathBuf};

/// Extension shared by remote files and cache entries.
pub const SUFFIX: &str = ".tsv.gz";

/// `<base>/<name>/<name>.tsv.gz`
pub fn dataset_url(base: &str, name: &str) -> String {
    format!("{}/{name}/{name}{SUFFIX}", base.trim_end_matches('/'))
}

/// `<root>/<name>/<name>.tsv.gz`
pub fn cache_path(root: &Path, name: &str) -> PathBuf {
    root.join(name).join(format!("{name}{SUFFIX}"))
}

/// How a dataset should be fetched and handed back.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Return features and labels separately instead of the whole table.
    pub return_xy: bool,
    /// Local cache root. Falls back to the client's default when `None`.
    pub cache_dir: Option<PathBuf>,
    /// Skip the cache entirely, including the client's default.
    pub no_cache: bool,
    /// Drop every row that has a missing value.
    pub dropna: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            return_xy: false,
            cache_dir: None,
            no_cache: false,
            dropna: true,
        }
    }
}

impl FetchOptions {
    /// Defaults: whole table, no explicit cache, drop missing values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for `(features, labels)` instead of the table.
    pub fn return_xy(mut self, return_xy: bool) -> Self {
        self.return_xy = return_xy;
        self
    }

    /// Read from and populate the cache under `cache_dir`.
    pub fn cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self.no_cache = false;
        self
    }

    /// Always download, never read or write a cache.
    pub fn no_cache(mut self) -> Self {
        self.cache_dir = None;
        self.no_cache = true;
        self
    }

    /// Whether rows with missing values are dropped.
    pub fn dropna(mut self, dropna: bool) -> Self {
        self.dropna = dropna;
        self
    }
}

/// What [`Pmlb::fetch`] returns.
#[derive(Debug, Clone)]
pub enum Fetched {
    /// The whole dataset.
    Table(Table),
    /// Every column but `target`, and the `target` column.
    Separated {
        /// One row per instance, one column per feature.
        features: Array2<f64>,
        /// The labels.
        labels: Array1<f64>,
    },
}

impl Pmlb {
    /// The remote URL of the dataset `name` under this client's base URL.
    pub fn dataset_url(&self, name: &str) -> String {
        dataset_url(&self.base_url, name)
    }

    /// Fetch a dataset, from the cache when one is configured and populated,
    /// otherwise from the remote.
    ///
    /// A file already present in the cache is returned as is, even for names the
    /// catalog does not know.
    pub fn fetch(&self, name: &str, options: &FetchOptions) -> Result<Fetched, Error> {
        let table = self.fetch_data(name, options)?;
        if options.return_xy {
            let (features, labels) = table.split_xy()?;
            Ok(Fetched::Separated { features, labels })
        } else {
            Ok(Fetched::Table(table))
        }
    }

    /// [`Pmlb::fetch`], always returning the whole table.
    pub fn fetch_data(&self, name: &str, options: &FetchOptions) -> Result<Table, Error> {
        let cache_dir = if options.no_cache {
            None
        } else {
            options.cache_dir.as_deref().or(self.cache_dir.as_deref())
        };
        let mut table = match cache_dir {
            None => self.download(name)?,
            Some(root) => self.fetch_cached(name, root)?,
        };
        if options.dropna {
            let dropped = table.dropna();
            if dropped > 0 {
                debug!("{name}: dropped {dropped} rows with missing values");
            }
        }
        Ok(table)
    }

    /// [`Pmlb::fetch`], always returning `(features, labels)`.
    pub fn fetch_xy(
        &self,
        name: &str,
        options: &FetchOptions,
    ) -> Result<(Array2<f64>, Array1<f64>), Error> {
        self.fetch_data(name, options)?.split_xy()
    }

    fn fetch_cached(&self, name: &str, root: &Path) -> Result<Table, Error> {
        let path = cache_path(root, name);
        if path.exists() {
            debug!("{name}: cache hit at {}", path.display());
            return Table::read_path(&path);
        }

        debug!("{name}: cache miss at {}", path.display());
        let table = self.download(name)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        table.write_path(&path)?;
        info!("{name}: cached at {}", path.display());
        Ok(table)
    }

    fn download(&self, name: &str) -> Result<Table, Error> {
        if !catalog::is_known(name) {
            warn!("{name} is not a PMLB dataset");
            return Err(Error::UnknownDataset(name.to_string()));
        }
        let url = self.dataset_url(name);
        if !self.remote.exists(&url)? {
            warn!("{url} does not exist");
            return Err(Error::UnknownDataset(name.to_string()));
        }
        info!("downloading {url}");
        let bytes = self.remote.get(&url)?;
        Table::from_tsv_gz(&bytes[..])
    }
}
