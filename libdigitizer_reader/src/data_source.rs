use hdf5::{File, Group};
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::error::DataSourceError;

/// A structured data source which yields named arrays by key.
///
/// The RawDataContainer only ever talks to its data through this trait, so the digitizer
/// data can come from an HDF5 file or be assembled in memory.
pub trait DataSource {
    /// A human readable name for logging
    fn name(&self) -> String;

    /// All of the keys available in the source
    fn keys(&self) -> Result<Vec<String>, DataSourceError>;

    /// Read a matrix of waveforms (events x samples) stored under key
    fn read_waveforms(&self, key: &str) -> Result<Array2<f64>, DataSourceError>;

    /// Read a flat array of clock counts stored under key
    fn read_timestamps(&self, key: &str) -> Result<Array1<u64>, DataSourceError>;
}

/// A simple struct which wraps around the hdf5-rust library.
///
/// Opens an HDF5 file for reading digitizer data. All of the datasets are expected to be
/// members of a single group (the tree), i.e.
///
/// ```text
/// data.h5
/// tree
/// |---- channel0_waveforms(dset, events x samples)
/// |---- channel1_waveforms(dset, events x samples)
/// |---- timestamp(dset)
/// ```
#[derive(Debug)]
pub struct Hdf5Source {
    _file_handle: File, // The group is only valid while the file is open
    path: PathBuf,
    tree: Group,
    size_bytes: u64,
}

impl Hdf5Source {
    /// Open the file at path and find the tree group
    pub fn open(path: &Path, tree_name: &str) -> Result<Self, DataSourceError> {
        let file_handle = File::open(path).map_err(|source| DataSourceError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let size_bytes = std::fs::metadata(path)?.len();
        if !file_handle.link_exists(tree_name) {
            return Err(DataSourceError::MissingTree(tree_name.to_string()));
        }
        let tree = file_handle
            .group(tree_name)
            .map_err(|source| DataSourceError::ReadFailed {
                key: tree_name.to_string(),
                source,
            })?;
        Ok(Self {
            _file_handle: file_handle,
            path: path.to_path_buf(),
            tree,
            size_bytes,
        })
    }

    pub fn get_size_bytes(&self) -> u64 {
        self.size_bytes
    }

    fn dataset(&self, key: &str) -> Result<hdf5::Dataset, DataSourceError> {
        if !self.tree.link_exists(key) {
            return Err(DataSourceError::MissingKey(key.to_string()));
        }
        self.tree
            .dataset(key)
            .map_err(|source| DataSourceError::ReadFailed {
                key: key.to_string(),
                source,
            })
    }
}

impl DataSource for Hdf5Source {
    fn name(&self) -> String {
        format!(
            "{} ({})",
            self.path.to_string_lossy(),
            human_bytes::human_bytes(self.size_bytes as f64)
        )
    }

    fn keys(&self) -> Result<Vec<String>, DataSourceError> {
        self.tree
            .member_names()
            .map_err(|source| DataSourceError::ReadFailed {
                key: self.tree.name(),
                source,
            })
    }

    fn read_waveforms(&self, key: &str) -> Result<Array2<f64>, DataSourceError> {
        // Raw digitizer counts are integers on disk; hdf5 converts them on read
        self.dataset(key)?
            .read_2d::<f64>()
            .map_err(|source| DataSourceError::ReadFailed {
                key: key.to_string(),
                source,
            })
    }

    fn read_timestamps(&self, key: &str) -> Result<Array1<u64>, DataSourceError> {
        self.dataset(key)?
            .read_1d::<u64>()
            .map_err(|source| DataSourceError::ReadFailed {
                key: key.to_string(),
                source,
            })
    }
}

/// An in-memory data source, useful for embedding the reader or for testing
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    waveforms: BTreeMap<String, Array2<f64>>,
    timestamps: BTreeMap<String, Array1<u64>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_waveforms(mut self, key: &str, waveforms: Array2<f64>) -> Self {
        self.waveforms.insert(key.to_string(), waveforms);
        self
    }

    pub fn with_timestamps(mut self, key: &str, timestamps: Array1<u64>) -> Self {
        self.timestamps.insert(key.to_string(), timestamps);
        self
    }
}

impl DataSource for MemorySource {
    fn name(&self) -> String {
        String::from("memory")
    }

    fn keys(&self) -> Result<Vec<String>, DataSourceError> {
        Ok(self
            .waveforms
            .keys()
            .chain(self.timestamps.keys())
            .cloned()
            .collect())
    }

    fn read_waveforms(&self, key: &str) -> Result<Array2<f64>, DataSourceError> {
        self.waveforms
            .get(key)
            .cloned()
            .ok_or_else(|| DataSourceError::MissingKey(key.to_string()))
    }

    fn read_timestamps(&self, key: &str) -> Result<Array1<u64>, DataSourceError> {
        self.timestamps
            .get(key)
            .cloned()
            .ok_or_else(|| DataSourceError::MissingKey(key.to_string()))
    }
}
