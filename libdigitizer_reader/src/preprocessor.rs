use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};

use super::constants::{ADC_FULL_SCALE, BASELINE_WINDOW, TIMESTAMP_ROLLOVER};
use super::error::{PreprocessorError, WaveformError};
use super::raw_data::RawDataContainer;

/// Subtract the baseline of each waveform in a channel.
///
/// The baseline is the mean of the first `BASELINE_WINDOW` samples of each waveform (row). It
/// is computed in raw digitizer counts, so this must run before `convert_to_volts`.
pub fn subtract_baseline(
    waveforms: ArrayView2<f64>,
    channel: u32,
) -> Result<Array2<f64>, WaveformError> {
    if waveforms.nrows() == 0 {
        return Ok(waveforms.to_owned());
    }
    // Every row of the matrix has the same length, so the first waveform is the offender
    if waveforms.ncols() < BASELINE_WINDOW {
        return Err(WaveformError::TooShort {
            channel,
            index: 0,
            length: waveforms.ncols(),
        });
    }
    let baselines = waveforms
        .slice(s![.., ..BASELINE_WINDOW])
        .mean_axis(Axis(1))
        .unwrap_or_else(|| Array1::zeros(waveforms.nrows()));
    Ok(&waveforms - &baselines.insert_axis(Axis(1)))
}

/// Turn digitizer counts into volts (12 bit digitizer, 1 V range)
pub fn convert_to_volts(waveforms: ArrayView2<f64>) -> Array2<f64> {
    &waveforms / ADC_FULL_SCALE
}

/// Find the indices at which the timestamp clock rolled over.
///
/// A rollover is any index `i + 1` where `timestamps[i] > timestamps[i + 1]`.
pub fn find_reset_indices(timestamps: ArrayView1<u64>) -> Vec<usize> {
    timestamps
        .windows(2)
        .into_iter()
        .enumerate()
        .filter(|(_, pair)| pair[0] > pair[1])
        .map(|(idx, _)| idx + 1)
        .collect()
}

/// Unwrap the 30-bit timestamp clock.
///
/// Every rollover adds one clock period to all of the timestamps from that point on, so after
/// the k-th rollover the timestamps carry k periods. We assume the clock never wraps more than
/// once between two consecutive timestamps.
pub fn correct_timestamps(timestamps: ArrayView1<u64>) -> Array1<u64> {
    let mut corrected = timestamps.to_owned();
    for reset_index in find_reset_indices(timestamps) {
        corrected
            .slice_mut(s![reset_index..])
            .mapv_inplace(|ts| ts + TIMESTAMP_ROLLOVER);
    }
    corrected
}

/// Preprocessor applies the corrections to the raw digitizer data before it is turned into
/// events.
///
/// The order is fixed: baseline subtraction, conversion to volts, timestamp unwrapping.
#[derive(Debug)]
pub struct Preprocessor {
    data: RawDataContainer,
}

impl Preprocessor {
    pub fn new(data: RawDataContainer) -> Self {
        Self { data }
    }

    fn subtract_baseline(self) -> Result<Self, PreprocessorError> {
        let (channels, waveforms, timestamps) = self.data.into_parts();
        let waveforms = channels
            .iter()
            .zip(waveforms.iter())
            .map(|(channel, wf)| subtract_baseline(wf.view(), *channel))
            .collect::<Result<Vec<_>, _>>()?;
        spdlog::debug!("Subtracted baselines for {} channels", channels.len());
        Ok(Self::new(RawDataContainer::from_parts(
            channels, waveforms, timestamps,
        )))
    }

    fn convert_to_volts(self) -> Self {
        let (channels, waveforms, timestamps) = self.data.into_parts();
        let waveforms = waveforms
            .iter()
            .map(|wf| convert_to_volts(wf.view()))
            .collect();
        spdlog::debug!("Converted waveforms to volts");
        Self::new(RawDataContainer::from_parts(
            channels, waveforms, timestamps,
        ))
    }

    fn correct_timestamps(self) -> Self {
        let (channels, waveforms, timestamps) = self.data.into_parts();
        let n_resets = find_reset_indices(timestamps.view()).len();
        let timestamps = correct_timestamps(timestamps.view());
        spdlog::debug!("Corrected {} timestamp rollovers", n_resets);
        Self::new(RawDataContainer::from_parts(
            channels, waveforms, timestamps,
        ))
    }

    /// Apply all of the corrections and return the preprocessed data
    pub fn preprocess(data: RawDataContainer) -> Result<RawDataContainer, PreprocessorError> {
        spdlog::info!("Preprocessing...");
        let preprocessor = Self::new(data)
            .subtract_baseline()?
            .convert_to_volts()
            .correct_timestamps();
        Ok(preprocessor.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array};

    const TOLERANCE: f64 = 1.0e-9;

    #[test]
    fn test_baseline_and_volts() {
        let mut raw = Array2::<f64>::from_elem((1, 60), 1000.0);
        raw[[0, 55]] = 4096.0;
        let baselined = subtract_baseline(raw.view(), 0).unwrap();
        let volts = convert_to_volts(baselined.view());
        assert_eq!(volts[[0, 55]], (4096.0 - 1000.0) / 4096.0);
        assert_eq!(volts[[0, 10]], 0.0);
    }

    #[test]
    fn test_baseline_window_mean_is_zero() {
        let raw = Array::from_shape_fn((4, 80), |(row, col)| {
            (row * 37 + col * 13 % 29) as f64 + 2000.0
        });
        let baselined = subtract_baseline(raw.view(), 3).unwrap();
        for row in baselined.rows() {
            let mean = row.slice(s![..BASELINE_WINDOW]).mean().unwrap();
            assert!(mean.abs() < TOLERANCE);
        }
        // Volts are exactly the baselined counts divided by the full scale
        let volts = convert_to_volts(baselined.view());
        for (v, b) in volts.iter().zip(baselined.iter()) {
            assert_eq!(*v, *b / ADC_FULL_SCALE);
        }
    }

    #[test]
    fn test_short_waveform() {
        let raw = Array2::<f64>::zeros((2, 49));
        assert_eq!(
            subtract_baseline(raw.view(), 4),
            Err(WaveformError::TooShort {
                channel: 4,
                index: 0,
                length: 49
            })
        );
        // A channel with no waveforms has nothing to correct
        let empty = Array2::<f64>::zeros((0, 0));
        assert_eq!(subtract_baseline(empty.view(), 4).unwrap().nrows(), 0);
    }

    #[test]
    fn test_single_reset() {
        let ts = arr1(&[5u64, 6, 2, 3]);
        assert_eq!(find_reset_indices(ts.view()), vec![2]);
        assert_eq!(
            correct_timestamps(ts.view()),
            arr1(&[5, 6, 2 + TIMESTAMP_ROLLOVER, 3 + TIMESTAMP_ROLLOVER])
        );
    }

    #[test]
    fn test_two_resets() {
        let ts = arr1(&[3u64, 1, 0, 5]);
        assert_eq!(find_reset_indices(ts.view()), vec![1, 2]);
        assert_eq!(
            correct_timestamps(ts.view()),
            arr1(&[
                3,
                1 + TIMESTAMP_ROLLOVER,
                2 * TIMESTAMP_ROLLOVER,
                5 + 2 * TIMESTAMP_ROLLOVER
            ])
        );
    }

    #[test]
    fn test_no_reset_and_short_streams() {
        let ts = arr1(&[1u64, 1, 7, 900]);
        assert_eq!(correct_timestamps(ts.view()), ts);
        assert!(correct_timestamps(Array1::<u64>::zeros(0).view()).is_empty());
        assert_eq!(correct_timestamps(arr1(&[42u64]).view()), arr1(&[42]));
    }

    #[test]
    fn test_corrected_timestamps_non_decreasing() {
        // A clock sampled with a stride that wraps many times
        let stride = TIMESTAMP_ROLLOVER / 3 + 12_345;
        let ts = Array1::from_iter((0..200u64).map(|i| (i * stride) % TIMESTAMP_ROLLOVER));
        let corrected = correct_timestamps(ts.view());
        for pair in corrected.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        for (raw, fixed) in ts.iter().zip(corrected.iter()) {
            assert_eq!(fixed % TIMESTAMP_ROLLOVER, *raw);
        }
    }

    #[test]
    fn test_preprocess() {
        let mut ch0 = Array2::<f64>::from_elem((2, 60), 100.0);
        ch0[[1, 59]] = -300.0;
        let ch1 = Array2::<f64>::from_elem((1, 50), 7.0);
        let raw = RawDataContainer::from_parts(vec![0, 1], vec![ch0, ch1], arr1(&[5, 6, 2, 3]));
        let data = Preprocessor::preprocess(raw).unwrap();
        assert_eq!(data.channels(), &[0, 1]);
        assert_eq!(data.waveforms()[0][[1, 59]], -400.0 / 4096.0);
        assert!(data.waveforms()[1].iter().all(|s| *s == 0.0));
        assert_eq!(data.timestamps()[3], 3 + TIMESTAMP_ROLLOVER);
    }

    #[test]
    fn test_preprocess_reports_channel() {
        let raw = RawDataContainer::from_parts(
            vec![0, 8],
            vec![Array2::zeros((1, 60)), Array2::zeros((1, 10))],
            arr1(&[1]),
        );
        match Preprocessor::preprocess(raw) {
            Err(PreprocessorError::InvalidWaveform(WaveformError::TooShort { channel, .. })) => {
                assert_eq!(channel, 8)
            }
            _ => panic!(),
        }
    }
}
