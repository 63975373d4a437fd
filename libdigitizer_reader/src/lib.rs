//! # digitizer_reader
//!
//! digitizer_reader loads waveform data captured by a multi-channel 12-bit digitizer and
//! turns it into per-channel events ready for analysis. The data is read from an HDF5 file,
//! the waveforms are baseline-subtracted and converted to volts, and the 30-bit digitizer
//! timestamp clock is unwrapped.
//!
//! ## Installation
//!
//! Currently the only method of install is from source.
//!
//! ### HDF5
//!
//! Before building digitizer_reader, HDF5 must be installed. Typically this will be
//! installed using a package manager (homebrew, apt, etc), and the Rust libraries will auto
//! detect the location of the HDF install. If HDF5 is installed to a custom location, write
//! the following snippet into the file `.cargo/config.toml` in the repository:
//!
//! ```toml
//! [env]
//! HDF5_DIR="/path/to/my/hdf5/install/"
//!
//! [build]
//! rustflags="-C link-args=-Wl,-rpath,/path/to/my/hdf5/install/lib"
//! ```
//!
//! ### Building & Install
//!
//! To build and install the CLI use `cargo install --path ./digitizer_reader_cli` from the
//! top level repository.
//!
//! ## Usage
//!
//! ```no_run
//! use libdigitizer_reader::config::ReaderConfig;
//! use libdigitizer_reader::event_data::EventCollection;
//! use std::path::Path;
//!
//! let events = EventCollection::create_from_file(Path::new("run_0001.h5"), &ReaderConfig::default())
//!     .expect("Failed to load digitizer data");
//! for (channel, channel_events) in events.iter() {
//!     println!("Channel {channel} has {} events", channel_events.len());
//! }
//! ```
//!
//! ## Configuration
//!
//! The YAML format of a configuration file is as follows:
//!
//! ```yml
//! tree_name: tree
//! timestamp_key: timestamp
//! allow_empty_source: false
//! ```
//!
//! If `allow_empty_source` is false, a file without any `channel<N>_waveforms` datasets is
//! an error. Otherwise it loads as an empty event map.
//!
//! ## Input Data Format
//!
//! ```text
//! data.h5
//! tree
//! |---- channel0_waveforms(dset, events x samples, digitizer counts)
//! |---- channel1_waveforms(dset, events x samples, digitizer counts)
//! |---- ...
//! |---- timestamp(dset, clock counts)
//! ```
//!
//! ## Preprocessing
//!
//! 1. The baseline of each waveform is the mean of its first 50 samples and is subtracted
//!    from the waveform.
//! 2. Samples are divided by 4096 (12-bit digitizer, 1 V range) to give volts.
//! 3. The timestamp clock is a 30-bit counter. Each time it rolls over, 2^30 is added to all
//!    later timestamps.
//!
//! The timestamp stream is global rather than per channel. Events take timestamps from it
//! channel by channel (in ascending channel order) and in capture order within a channel,
//! starting over at the beginning of the stream when it runs out.
pub mod config;
pub mod constants;
pub mod data_source;
pub mod error;
pub mod event;
pub mod event_data;
pub mod preprocessor;
pub mod raw_data;
