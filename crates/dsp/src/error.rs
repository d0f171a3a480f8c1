use crate::processor::BusLayout;
use thiserror::Error;

/// Errors reported by the host adapter outside the audio path
#[derive(Debug, Error, PartialEq)]
pub enum DspError {
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),

    #[error("invalid maximum block size: {0}")]
    InvalidBlockSize(usize),

    #[error("unsupported bus layout: {0:?}")]
    UnsupportedLayout(BusLayout),
}
