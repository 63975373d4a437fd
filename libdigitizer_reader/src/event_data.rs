use ndarray::ArrayView1;
use std::collections::BTreeMap;
use std::path::Path;

use super::config::ReaderConfig;
use super::data_source::{DataSource, Hdf5Source};
use super::error::{EventDataError, RawDataError};
use super::event::DigitizerEvent;
use super::preprocessor::Preprocessor;
use super::raw_data::RawDataContainer;

/// Map of channel number to the events captured on that channel, in capture order
pub type EventMap = BTreeMap<u32, Vec<DigitizerEvent>>;

/// A cursor which walks the global timestamp stream in a circle.
///
/// Each call to `advance` hands out the next timestamp, going back to the start of the stream
/// once the end is reached.
#[derive(Debug, Clone)]
pub struct TimestampCursor<'a> {
    timestamps: ArrayView1<'a, u64>,
    position: usize,
}

impl<'a> TimestampCursor<'a> {
    pub fn new(timestamps: ArrayView1<'a, u64>) -> Self {
        Self {
            timestamps,
            position: 0,
        }
    }

    /// Returns None only if the stream is empty
    pub fn advance(&mut self) -> Option<u64> {
        if self.timestamps.is_empty() {
            return None;
        }
        let ts = self.timestamps[self.position % self.timestamps.len()];
        self.position += 1;
        Some(ts)
    }

    /// How many timestamps have been handed out
    pub fn position(&self) -> usize {
        self.position
    }
}

/// EventCollection pairs the preprocessed waveforms with timestamps.
///
/// All channels share a single TimestampCursor. Channels are visited in container order and
/// the waveforms of each channel in capture order, each waveform taking the next timestamp
/// from the cursor. That order is part of the contract: changing it changes which timestamp
/// every event receives.
#[derive(Debug, Clone, Default)]
pub struct EventCollection {
    events: EventMap,
}

impl EventCollection {
    /// Create the events from (preprocessed) data
    pub fn new(data: &RawDataContainer) -> Result<Self, EventDataError> {
        spdlog::info!("Creating event map...");
        let mut cursor = TimestampCursor::new(data.timestamps().view());
        let mut events = EventMap::new();
        for (channel, waveforms) in data.channels().iter().zip(data.waveforms().iter()) {
            let mut channel_events = Vec::with_capacity(waveforms.nrows());
            for (index, waveform) in waveforms.rows().into_iter().enumerate() {
                let timestamp = cursor.advance().ok_or(EventDataError::NoTimestamps {
                    channel: *channel,
                    index,
                })?;
                let event = DigitizerEvent::new(waveform.to_owned(), timestamp).map_err(
                    |source| EventDataError::InvalidWaveform {
                        channel: *channel,
                        index,
                        source,
                    },
                )?;
                channel_events.push(event);
            }
            events.insert(*channel, channel_events);
        }
        if cursor.position() > data.timestamps().len() {
            spdlog::debug!(
                "Timestamp stream of length {} was reused for {} events",
                data.timestamps().len(),
                cursor.position()
            );
        }
        Ok(Self { events })
    }

    /// Read, preprocess, and build the event map from any DataSource
    pub fn create_from_source<S: DataSource>(
        source: &S,
        config: &ReaderConfig,
    ) -> Result<EventMap, EventDataError> {
        let raw_data = RawDataContainer::new(source, config)?;
        let preprocessed_data = Preprocessor::preprocess(raw_data)?;
        Ok(Self::new(&preprocessed_data)?.into_map())
    }

    /// Read, preprocess, and build the event map from an HDF5 file.
    ///
    /// This is the main entry point of the library.
    pub fn create_from_file(path: &Path, config: &ReaderConfig) -> Result<EventMap, EventDataError> {
        let source = Hdf5Source::open(path, &config.tree_name).map_err(RawDataError::from)?;
        Self::create_from_source(&source, config)
    }

    pub fn channels(&self) -> impl Iterator<Item = &u32> {
        self.events.keys()
    }

    /// Events for a channel, if that channel exists
    pub fn events(&self, channel: u32) -> Option<&[DigitizerEvent]> {
        self.events.get(&channel).map(|e| e.as_slice())
    }

    /// Total number of events across all channels
    pub fn n_events(&self) -> usize {
        self.events.values().map(|e| e.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &Vec<DigitizerEvent>)> {
        self.events.iter()
    }

    pub fn into_map(self) -> EventMap {
        self.events
    }
}
