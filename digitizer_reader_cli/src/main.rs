//! # digitizer_reader_cli
//!
//! Part of the digitizer_reader crate family.
//!
//! Loads a digitizer HDF5 file, preprocesses it, and logs a summary of the events on each
//! channel.
//!
//! ## Use
//!
//! ```bash
//! digitizer_reader_cli -f /path/to/data.h5 -c /path/to/config.yml
//! ```
//!
//! The config is optional; without it the defaults are used. A template config can be made
//! with
//!
//! ```bash
//! digitizer_reader_cli -c /path/to/config.yml new
//! ```
use clap::{Arg, ArgAction, Command};
use spdlog::{Level, LevelFilter};
use std::path::PathBuf;

use libdigitizer_reader::config::ReaderConfig;
use libdigitizer_reader::event::DigitizerEvent;
use libdigitizer_reader::event_data::EventCollection;

fn log_channel_summary(channel: &u32, events: &[DigitizerEvent]) {
    if events.is_empty() {
        spdlog::info!("Channel {channel}: no events");
        return;
    }
    let mean_amplitude =
        events.iter().map(|e| e.amplitude()).sum::<f64>() / events.len() as f64;
    let max_amplitude = events
        .iter()
        .map(|e| e.amplitude())
        .fold(f64::NEG_INFINITY, f64::max);
    spdlog::info!(
        "Channel {channel}: {} events, mean amplitude {:.4} V, max amplitude {:.4} V, timestamps {}..{}",
        events.len(),
        mean_amplitude,
        max_amplitude,
        events[0].timestamp(),
        events[events.len() - 1].timestamp(),
    );
}

fn main() {
    // Create a cli
    let matches = Command::new("digitizer_reader_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .help("Path to the digitizer HDF5 file"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to the configuration yaml file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Show debug messages"),
        )
        .get_matches();

    // Initialize feedback
    let level = if matches.get_flag("verbose") {
        Level::Debug
    } else {
        Level::Info
    };
    spdlog::default_logger().set_level_filter(LevelFilter::MoreSevereEqual(level));

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);

    if let Some(("new", _)) = matches.subcommand() {
        let Some(config_path) = config_path else {
            spdlog::error!("A config path (-c) is required to make a template config");
            return;
        };
        spdlog::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        match ReaderConfig::default().write_config_file(&config_path) {
            Ok(()) => spdlog::info!("Done."),
            Err(e) => spdlog::error!("{e}"),
        }
        return;
    }

    // Load our config
    let config = match &config_path {
        Some(path) => {
            spdlog::info!("Loading config from {}...", path.to_string_lossy());
            match ReaderConfig::read_config_file(path) {
                Ok(c) => c,
                Err(e) => {
                    spdlog::error!("{e}");
                    return;
                }
            }
        }
        None => ReaderConfig::default(),
    };
    spdlog::info!("Tree: {}", config.tree_name);
    spdlog::info!("Timestamp key: {}", config.timestamp_key);
    spdlog::info!("Allow empty source: {}", config.allow_empty_source);

    let Some(data_path) = matches.get_one::<String>("file").map(PathBuf::from) else {
        spdlog::error!("A data file (-f) is required");
        return;
    };

    match EventCollection::create_from_file(&data_path, &config) {
        Ok(events) => {
            for (channel, channel_events) in events.iter() {
                log_channel_summary(channel, channel_events);
            }
            spdlog::info!("Successfully loaded data!");
        }
        Err(e) => spdlog::error!("Loading failed with error: {e}"),
    }
}
