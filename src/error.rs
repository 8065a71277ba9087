use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("terminal error: {0}")]
    Terminal(#[from] crossterm::ErrorKind),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to allocate frame buffer of {bytes} bytes: {source}")]
    FrameBuffer {
        bytes: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid snake layout: {0}")]
    InvalidLayout(String),
}
