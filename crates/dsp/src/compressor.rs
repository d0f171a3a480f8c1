use crate::envelope::EnvelopeFollower;
use crate::gain::GainComputer;
use crate::params::{CompressorParams, ParamSnapshot};
use kompressor_core::linear_to_db;
use std::sync::Arc;

/// Rate used when a non-positive or non-finite sample rate is given
const FALLBACK_SAMPLE_RATE: f32 = 48000.0;

/// Compressor - feed-forward dynamic range compression with hard knee
///
/// Peak envelope follower with separate attack/release, static hard-knee
/// gain curve in the dB domain, then make-up gain. No look-ahead: the gain
/// for a sample is derived from an envelope that already includes it.
///
/// Parameters live in a shared [`CompressorParams`] so a control thread can
/// change them while audio runs. The envelope is owned state and is only
/// touched by [`CompressorEngine::process`].
pub struct CompressorEngine {
    params: Arc<CompressorParams>,
    envelope: EnvelopeFollower,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
    last_gain: f32,
    min_gain: f32,
}

impl CompressorEngine {
    /// Create a new engine with default parameters at 48 kHz
    pub fn new(sample_rate: f32) -> Self {
        Self::with_params(Arc::new(CompressorParams::default()), sample_rate)
    }

    /// Create an engine reading from an existing parameter store
    ///
    /// An invalid `sample_rate` falls back to 48 kHz.
    pub fn with_params(params: Arc<CompressorParams>, sample_rate: f32) -> Self {
        let sample_rate = if is_valid_sample_rate(sample_rate) {
            sample_rate
        } else {
            tracing::warn!(
                "Invalid sample rate {}, using {} Hz",
                sample_rate,
                FALLBACK_SAMPLE_RATE
            );
            FALLBACK_SAMPLE_RATE
        };
        let attack_ms = params.attack_ms();
        let release_ms = params.release_ms();
        Self {
            envelope: EnvelopeFollower::from_times(attack_ms, release_ms, sample_rate),
            params,
            sample_rate,
            attack_ms,
            release_ms,
            last_gain: 1.0,
            min_gain: 1.0,
        }
    }

    /// Handle for the control thread
    pub fn params(&self) -> Arc<CompressorParams> {
        Arc::clone(&self.params)
    }

    /// Set the sample rate and recompute the envelope coefficients
    ///
    /// Non-finite and non-positive rates are ignored.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if !is_valid_sample_rate(sample_rate) {
            tracing::debug!("Ignoring invalid sample rate {}", sample_rate);
            return;
        }
        self.sample_rate = sample_rate;
        self.envelope.set_times(self.attack_ms, self.release_ms, self.sample_rate);
        tracing::debug!(
            "Compressor coefficients at {} Hz: attack={:.6}, release={:.6}",
            sample_rate,
            self.envelope.attack_coeff(),
            self.envelope.release_coeff()
        );
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn set_threshold(&self, db: f32) {
        self.params.set_threshold(db);
    }

    pub fn set_ratio(&self, ratio: f32) {
        self.params.set_ratio(ratio);
    }

    pub fn set_makeup_gain(&self, db: f32) {
        self.params.set_makeup_gain(db);
    }

    pub fn set_attack_ms(&self, ms: f32) {
        self.params.set_attack_ms(ms);
    }

    pub fn set_release_ms(&self, ms: f32) {
        self.params.set_release_ms(ms);
    }

    pub fn set_bypass(&self, bypass: bool) {
        self.params.set_bypass(bypass);
    }

    pub fn is_bypassed(&self) -> bool {
        self.params.is_bypassed()
    }

    /// Current envelope level (linear)
    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    /// Overwrite the envelope level, e.g. to resume from a known state
    pub fn set_envelope_level(&mut self, level: f32) {
        self.envelope.set_level(level);
    }

    /// Gain reduction applied to the last processed sample in dB (<= 0),
    /// make-up gain excluded
    pub fn gain_reduction_db(&self) -> f32 {
        linear_to_db(self.last_gain)
    }

    /// Largest gain reduction over every sample since the last
    /// [`reset_gain_reduction_peak`](Self::reset_gain_reduction_peak), in dB (<= 0)
    pub fn max_gain_reduction_db(&self) -> f32 {
        linear_to_db(self.min_gain)
    }

    pub fn reset_gain_reduction_peak(&mut self) {
        self.min_gain = 1.0;
    }

    /// Process audio buffer (in-place)
    ///
    /// When bypassed the buffer and the envelope are left untouched.
    pub fn process(&mut self, buffer: &mut [f32]) {
        let snapshot = self.params.snapshot();
        if snapshot.bypass {
            return;
        }

        self.update_times(&snapshot);
        let computer = GainComputer::from_snapshot(&snapshot);
        let makeup = computer.makeup();

        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample, &computer, makeup);
        }
    }

    /// Process a single sample
    #[inline]
    fn process_sample(&mut self, x: f32, computer: &GainComputer, makeup: f32) -> f32 {
        // NaN would stick in the one-pole recursion; flush it
        let x = if x.is_finite() { x } else { 0.0 };

        let level = self.envelope.next(x.abs());
        let gain = computer.gain(level);
        self.last_gain = gain;
        self.min_gain = self.min_gain.min(gain);

        x * (gain * makeup)
    }

    #[inline]
    fn update_times(&mut self, snapshot: &ParamSnapshot) {
        if snapshot.attack_ms != self.attack_ms || snapshot.release_ms != self.release_ms {
            self.attack_ms = snapshot.attack_ms;
            self.release_ms = snapshot.release_ms;
            self.envelope.set_times(self.attack_ms, self.release_ms, self.sample_rate);
        }
    }

    /// Reset processor state
    pub fn reset(&mut self) {
        self.envelope.reset();
        self.last_gain = 1.0;
        self.min_gain = 1.0;
    }
}

fn is_valid_sample_rate(sample_rate: f32) -> bool {
    sample_rate.is_finite() && sample_rate > 0.0
}

impl Default for CompressorEngine {
    fn default() -> Self {
        Self::new(48000.0)
    }
}
