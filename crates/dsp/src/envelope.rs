//! Envelope follower - asymmetric one-pole level detector
//!
//! Tracks the absolute sample level with a fast coefficient while the
//! signal rises (attack) and a slow one while it falls (release).

/// Lowest level the envelope may hold, keeps `log10` well-defined
pub const ENVELOPE_FLOOR: f32 = 1e-6;

/// Convert a time constant in milliseconds to a one-pole coefficient
///
/// `alpha = exp(-1 / (tau * fs))`, so the follower reaches ~63% of a step
/// after `tau`.
#[inline]
pub fn time_constant_to_coeff(time_ms: f32, sample_rate: f32) -> f32 {
    let samples = time_ms / 1000.0 * sample_rate;
    if samples <= 0.0 {
        return 0.0;
    }
    (-1.0 / samples).exp()
}

#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    level: f32,
    attack_coeff: f32,
    release_coeff: f32,
}

impl EnvelopeFollower {
    /// Create a follower from raw one-pole coefficients
    pub fn new(attack_coeff: f32, release_coeff: f32) -> Self {
        Self {
            level: 0.0,
            attack_coeff,
            release_coeff,
        }
    }

    /// Create a follower from attack/release times at the given sample rate
    pub fn from_times(attack_ms: f32, release_ms: f32, sample_rate: f32) -> Self {
        Self::new(
            time_constant_to_coeff(attack_ms, sample_rate),
            time_constant_to_coeff(release_ms, sample_rate),
        )
    }

    /// Recompute both coefficients, keeping the current level
    pub fn set_times(&mut self, attack_ms: f32, release_ms: f32, sample_rate: f32) {
        self.attack_coeff = time_constant_to_coeff(attack_ms, sample_rate);
        self.release_coeff = time_constant_to_coeff(release_ms, sample_rate);
    }

    pub fn attack_coeff(&self) -> f32 {
        self.attack_coeff
    }

    pub fn release_coeff(&self) -> f32 {
        self.release_coeff
    }

    /// Current envelope level (linear)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Force the envelope to a level, e.g. to start from a converged state
    pub fn set_level(&mut self, level: f32) {
        self.level = level;
    }

    /// Feed one rectified sample and return the updated level
    #[inline]
    pub fn next(&mut self, abs_sample: f32) -> f32 {
        let coeff = if abs_sample > self.level {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.level = coeff * self.level + (1.0 - coeff) * abs_sample;

        if !self.level.is_finite() {
            self.level = ENVELOPE_FLOOR;
        }
        // Clamp after the update so log10 never sees zero
        if self.level < ENVELOPE_FLOOR {
            self.level = ENVELOPE_FLOOR;
        }
        self.level
    }

    /// Reset to the construction state
    pub fn reset(&mut self) {
        self.level = 0.0;
    }
}

impl Default for EnvelopeFollower {
    fn default() -> Self {
        Self::new(0.999, 0.9999)
    }
}
