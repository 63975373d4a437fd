use ndarray::{Array1, ArrayView1};

use super::error::WaveformError;

/// A single digitizer event: one (preprocessed) waveform and its timestamp.
///
/// The amplitude is computed once, when the event is created. Pulses are negative-going, so
/// the amplitude is the magnitude of the waveform minimum.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitizerEvent {
    waveform: Array1<f64>,
    timestamp: u64,
    amplitude: f64,
}

impl DigitizerEvent {
    pub fn new(waveform: Array1<f64>, timestamp: u64) -> Result<Self, WaveformError> {
        let minimum = waveform
            .iter()
            .copied()
            .reduce(f64::min)
            .ok_or(WaveformError::Empty)?;
        Ok(Self {
            waveform,
            timestamp,
            amplitude: -minimum,
        })
    }

    pub fn waveform(&self) -> ArrayView1<f64> {
        self.waveform.view()
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }
}
