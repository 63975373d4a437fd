use std::path::PathBuf;
use thiserror::Error;

use super::constants::BASELINE_WINDOW;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("Could not open data source {path:?}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: hdf5::Error,
    },
    #[error("Data source does not contain a group named {0}")]
    MissingTree(String),
    #[error("Data source does not contain the key {0}")]
    MissingKey(String),
    #[error("Failed to read key {key} from data source: {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: hdf5::Error,
    },
    #[error("Data source failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum RawDataError {
    #[error("RawDataContainer failed due to data source error: {0}")]
    SourceError(#[from] DataSourceError),
    #[error("RawDataContainer found no keys matching channel<N>_waveforms in the source")]
    NoChannels,
    #[error("RawDataContainer found waveform key {0} with an invalid channel number")]
    BadChannelKey(String),
    #[error("RawDataContainer could not find the timestamp key {0} in the source")]
    MissingTimestamps(String),
}

impl DataSourceError {
    /// The source could not be opened or read, as opposed to having the wrong layout
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, Self::MissingTree(_) | Self::MissingKey(_))
    }
}

impl RawDataError {
    /// The source was readable but its keys are not what we expect
    pub fn is_malformed_source(&self) -> bool {
        match self {
            Self::SourceError(e) => !e.is_unavailable(),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaveformError {
    #[error("Waveform is empty and has no minimum")]
    Empty,
    #[error("Waveform {index} of channel {channel} has {length} samples; at least {required} are needed for the baseline", required = BASELINE_WINDOW)]
    TooShort {
        channel: u32,
        index: usize,
        length: usize,
    },
}

#[derive(Debug, Error)]
pub enum PreprocessorError {
    #[error("Preprocessor failed due to an invalid waveform: {0}")]
    InvalidWaveform(#[from] WaveformError),
}

#[derive(Debug, Error)]
pub enum EventDataError {
    #[error("EventData failed due to RawDataContainer error: {0}")]
    RawDataError(#[from] RawDataError),
    #[error("EventData failed due to Preprocessor error: {0}")]
    PreprocessorError(#[from] PreprocessorError),
    #[error("EventData failed to build an event from waveform {index} of channel {channel}: {source}")]
    InvalidWaveform {
        channel: u32,
        index: usize,
        #[source]
        source: WaveformError,
    },
    #[error("EventData could not assign a timestamp to waveform {index} of channel {channel}; the timestamp stream is empty")]
    NoTimestamps { channel: u32, index: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}
