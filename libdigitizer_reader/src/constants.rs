// Digitizer hardware constants

/// Number of leading (pre-trigger) samples averaged to estimate a waveform baseline
pub const BASELINE_WINDOW: usize = 50;
/// 12-bit digitizer with a 1 V range: counts / 4096 = volts
pub const ADC_FULL_SCALE: f64 = 4096.0;
/// The timestamp clock is a 30-bit counter
pub const TIMESTAMP_BITS: u32 = 30;
pub const TIMESTAMP_ROLLOVER: u64 = 1 << TIMESTAMP_BITS;

// Data source naming conventions

pub const DEFAULT_TREE_NAME: &str = "tree";
pub const DEFAULT_TIMESTAMP_KEY: &str = "timestamp";
pub const CHANNEL_KEY_PREFIX: &str = "channel";
pub const WAVEFORM_KEY_SUFFIX: &str = "_waveforms";
