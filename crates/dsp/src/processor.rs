use crate::compressor::CompressorEngine;
use crate::error::DspError;
use crate::params::CompressorParams;
use kompressor_core::CompressorSettings;
use std::sync::Arc;
use tracing::{debug, info};

/// Sample rate used until the host calls `prepare`
pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

/// Channel set of one bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSet {
    Disabled,
    Mono,
    Stereo,
    Discrete(u16),
}

impl ChannelSet {
    /// Number of channels in this set
    pub fn size(&self) -> usize {
        match self {
            ChannelSet::Disabled => 0,
            ChannelSet::Mono => 1,
            ChannelSet::Stereo => 2,
            ChannelSet::Discrete(n) => *n as usize,
        }
    }
}

/// Main input/output bus pair negotiated with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusLayout {
    pub input: ChannelSet,
    pub output: ChannelSet,
}

impl BusLayout {
    pub const MONO: BusLayout = BusLayout {
        input: ChannelSet::Mono,
        output: ChannelSet::Mono,
    };

    pub const STEREO: BusLayout = BusLayout {
        input: ChannelSet::Stereo,
        output: ChannelSet::Stereo,
    };

    pub fn new(input: ChannelSet, output: ChannelSet) -> Self {
        Self { input, output }
    }
}

impl Default for BusLayout {
    fn default() -> Self {
        Self::MONO
    }
}

/// Host adapter around a [`CompressorEngine`]
///
/// Owns the engine and forwards the host lifecycle to it: layout
/// negotiation, prepare/release, and per-block processing. Every input
/// channel runs through the same engine, so channels share one envelope.
pub struct CompressorProcessor {
    engine: CompressorEngine,
    layout: BusLayout,
    sample_rate: f64,
    max_block_size: usize,
    prepared: bool,
}

impl CompressorProcessor {
    pub fn new(settings: &CompressorSettings) -> Self {
        let params = Arc::new(CompressorParams::new(settings));
        Self {
            engine: CompressorEngine::with_params(params, DEFAULT_SAMPLE_RATE as f32),
            layout: BusLayout::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: 0,
            prepared: false,
        }
    }

    pub fn name(&self) -> &'static str {
        "Kompressor"
    }

    pub fn accepts_midi(&self) -> bool {
        false
    }

    pub fn produces_midi(&self) -> bool {
        false
    }

    /// No look-ahead and no delay line, so nothing rings out after input stops
    pub fn tail_length_seconds(&self) -> f64 {
        0.0
    }

    /// Parameter store for the control thread
    pub fn params(&self) -> Arc<CompressorParams> {
        self.engine.params()
    }

    pub fn engine(&self) -> &CompressorEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut CompressorEngine {
        &mut self.engine
    }

    pub fn layout(&self) -> BusLayout {
        self.layout
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Main output must be mono or stereo and match the main input
    pub fn is_layout_supported(layout: &BusLayout) -> bool {
        matches!(layout.output, ChannelSet::Mono | ChannelSet::Stereo)
            && layout.input == layout.output
    }

    /// Prepare for playback
    pub fn prepare(
        &mut self,
        sample_rate: f64,
        max_block_size: usize,
        layout: BusLayout,
    ) -> Result<(), DspError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(DspError::InvalidSampleRate(sample_rate));
        }
        if max_block_size == 0 {
            return Err(DspError::InvalidBlockSize(max_block_size));
        }
        if !Self::is_layout_supported(&layout) {
            return Err(DspError::UnsupportedLayout(layout));
        }

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.layout = layout;
        self.engine.set_sample_rate(sample_rate as f32);
        self.prepared = true;

        info!(
            "Prepared {} at {} Hz, block size {}, layout {:?}",
            self.name(),
            sample_rate,
            max_block_size,
            layout
        );
        Ok(())
    }

    /// Stop playback. The envelope is kept as-is.
    pub fn release(&mut self) {
        if self.prepared {
            debug!("Releasing {}", self.name());
        }
        self.prepared = false;
    }

    /// Process one block of planar audio in place
    ///
    /// Buffers past the layout's input channel count carry no input and are
    /// zero-filled so stale data never reaches the output.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]]) {
        let num_inputs = self.layout.input.size().min(channels.len());

        for channel in channels[num_inputs..].iter_mut() {
            channel.fill(0.0);
        }

        for channel in channels[..num_inputs].iter_mut() {
            self.engine.process(channel);
        }
    }
}

impl Default for CompressorProcessor {
    fn default() -> Self {
        Self::new(&CompressorSettings::default())
    }
}
