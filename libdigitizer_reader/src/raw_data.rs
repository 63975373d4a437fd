use ndarray::{Array1, Array2};
use std::collections::BTreeSet;

use super::config::ReaderConfig;
use super::constants::{CHANNEL_KEY_PREFIX, WAVEFORM_KEY_SUFFIX};
use super::data_source::DataSource;
use super::error::{DataSourceError, RawDataError};

/// The name of the waveform dataset for a given channel
pub fn waveform_key(channel: u32) -> String {
    format!("{CHANNEL_KEY_PREFIX}{channel}{WAVEFORM_KEY_SUFFIX}")
}

/// Extract the channel number from a key of the form channel<N>_waveforms.
///
/// Returns `Ok(None)` if the key is not a waveform key at all.
fn parse_channel_key(key: &str) -> Result<Option<u32>, RawDataError> {
    let number = match key
        .strip_prefix(CHANNEL_KEY_PREFIX)
        .and_then(|rest| rest.strip_suffix(WAVEFORM_KEY_SUFFIX))
    {
        Some(n) => n,
        None => return Ok(None),
    };
    match number.parse::<u32>() {
        Ok(channel) => Ok(Some(channel)),
        Err(_) => Err(RawDataError::BadChannelKey(key.to_string())),
    }
}

/// RawDataContainer holds the unprocessed digitizer data read from a DataSource.
///
/// `waveforms[i]` is the (events x samples) matrix for `channels[i]`. The timestamps are a
/// single global stream shared by all channels; its length typically differs from the number
/// of waveforms on any channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDataContainer {
    channels: Vec<u32>,
    waveforms: Vec<Array2<f64>>,
    timestamps: Array1<u64>,
}

impl RawDataContainer {
    /// Read the channels, waveforms, and timestamps from a source
    pub fn new<S: DataSource>(source: &S, config: &ReaderConfig) -> Result<Self, RawDataError> {
        spdlog::info!("Reading data from {}...", source.name());
        let keys = source.keys()?;
        let channels = Self::get_channel_list(&keys)?;
        if channels.is_empty() {
            if config.allow_empty_source {
                spdlog::warn!("No channel waveforms found in {}", source.name());
            } else {
                return Err(RawDataError::NoChannels);
            }
        }
        spdlog::info!("Found channels: {:?}", channels);

        let waveforms = channels
            .iter()
            .map(|channel| source.read_waveforms(&waveform_key(*channel)))
            .collect::<Result<Vec<_>, _>>()?;

        let timestamps = match source.read_timestamps(&config.timestamp_key) {
            Ok(ts) => ts,
            Err(DataSourceError::MissingKey(key)) => {
                return Err(RawDataError::MissingTimestamps(key))
            }
            Err(e) => return Err(RawDataError::SourceError(e)),
        };
        spdlog::info!("Read {} timestamps.", timestamps.len());

        Ok(Self {
            channels,
            waveforms,
            timestamps,
        })
    }

    /// Assemble a container from arrays which have already been read.
    ///
    /// Panics if channels and waveforms differ in length.
    pub fn from_parts(
        channels: Vec<u32>,
        waveforms: Vec<Array2<f64>>,
        timestamps: Array1<u64>,
    ) -> Self {
        assert_eq!(channels.len(), waveforms.len());
        Self {
            channels,
            waveforms,
            timestamps,
        }
    }

    /// The set of channels, deduplicated and in ascending order
    fn get_channel_list(keys: &[String]) -> Result<Vec<u32>, RawDataError> {
        let mut channels = BTreeSet::new();
        for key in keys {
            if let Some(channel) = parse_channel_key(key)? {
                channels.insert(channel);
            }
        }
        Ok(channels.into_iter().collect())
    }

    pub fn channels(&self) -> &[u32] {
        &self.channels
    }

    pub fn waveforms(&self) -> &[Array2<f64>] {
        &self.waveforms
    }

    pub fn timestamps(&self) -> &Array1<u64> {
        &self.timestamps
    }

    /// The waveform matrix for a channel, if that channel exists
    pub fn waveforms_for(&self, channel: u32) -> Option<&Array2<f64>> {
        self.channels
            .iter()
            .position(|c| *c == channel)
            .map(|idx| &self.waveforms[idx])
    }

    /// Number of waveforms captured on a channel
    pub fn n_events(&self, channel: u32) -> usize {
        self.waveforms_for(channel).map_or(0, |w| w.nrows())
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Split the container into its arrays
    pub fn into_parts(self) -> (Vec<u32>, Vec<Array2<f64>>, Array1<u64>) {
        (self.channels, self.waveforms, self.timestamps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::MemorySource;
    use ndarray::arr1;

    #[test]
    fn test_channel_discovery() {
        let source = MemorySource::new()
            .with_waveforms("channel2_waveforms", Array2::zeros((3, 60)))
            .with_waveforms("channel0_waveforms", Array2::zeros((1, 60)))
            .with_waveforms("trigger_settings", Array2::zeros((1, 1)))
            .with_timestamps("timestamp", arr1(&[1, 2]));
        let raw = RawDataContainer::new(&source, &ReaderConfig::default()).unwrap();
        assert_eq!(raw.channels(), &[0, 2]);
        assert_eq!(raw.waveforms().len(), 2);
        assert_eq!(raw.n_events(0), 1);
        assert_eq!(raw.n_events(2), 3);
        assert_eq!(raw.n_events(5), 0);
        assert_eq!(raw.timestamps(), &arr1(&[1, 2]));
    }

    #[test]
    fn test_parse_channel_key() {
        assert_eq!(parse_channel_key("channel12_waveforms").unwrap(), Some(12));
        assert_eq!(parse_channel_key("timestamp").unwrap(), None);
        assert_eq!(parse_channel_key("channel1_baselines").unwrap(), None);
        assert!(matches!(
            parse_channel_key("channelA_waveforms"),
            Err(RawDataError::BadChannelKey(_))
        ));
        assert_eq!(waveform_key(7), "channel7_waveforms");
    }

    #[test]
    fn test_no_channels() {
        let source = MemorySource::new().with_timestamps("timestamp", arr1(&[1]));
        let result = RawDataContainer::new(&source, &ReaderConfig::default());
        match result {
            Err(e) => {
                assert!(e.is_malformed_source());
                assert!(matches!(e, RawDataError::NoChannels));
            }
            Ok(_) => panic!(),
        }

        let config = ReaderConfig {
            allow_empty_source: true,
            ..Default::default()
        };
        let raw = RawDataContainer::new(&source, &config).unwrap();
        assert!(raw.is_empty());
    }

    #[test]
    fn test_missing_timestamps() {
        let source =
            MemorySource::new().with_waveforms("channel0_waveforms", Array2::zeros((1, 60)));
        match RawDataContainer::new(&source, &ReaderConfig::default()) {
            Err(RawDataError::MissingTimestamps(key)) => assert_eq!(key, "timestamp"),
            _ => panic!(),
        }
    }
}
