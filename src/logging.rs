use std::fs::File;
use std::path::Path;

use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};

/// Sends log records to `path`. Stdout belongs to the game display, so there
/// is no console logger. Returns false if the file could not be set up.
pub fn init(path: &Path, level: LevelFilter) -> bool {
    let file = match File::create(path) {
        Ok(file) => file,
        Err(_) => return false,
    };

    WriteLogger::init(level, LogConfig::default(), file).is_ok()
}
