/// DSP (Digital Signal Processing) modules
///
/// Contains the real-time compressor and the pieces it is built from:
/// - Envelope: asymmetric one-pole attack/release level follower
/// - Gain: hard-knee static gain curve with make-up gain
/// - Params: lock-free parameter store shared with the control thread
/// - Compressor: the per-sample engine (detect, compute gain, apply gain)
/// - Processor: host adapter handling prepare/process/bus layout
pub mod compressor;
pub mod envelope;
pub mod error;
pub mod gain;
pub mod params;
pub mod processor;

// Re-export commonly used types for convenience
pub use compressor::CompressorEngine;
pub use envelope::{time_constant_to_coeff, EnvelopeFollower, ENVELOPE_FLOOR};
pub use error::DspError;
pub use gain::GainComputer;
pub use params::{CompressorParams, ParamSnapshot};
pub use processor::{BusLayout, ChannelSet, CompressorProcessor, DEFAULT_SAMPLE_RATE};
