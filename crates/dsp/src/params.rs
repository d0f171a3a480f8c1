//! Lock-free compressor parameters
//!
//! Written from the control thread, read by the audio thread once per block.
//! Floats are stored as their bit patterns in `AtomicU32` so neither side
//! ever takes a lock.
use kompressor_core::{
    CompressorSettings, MAX_THRESHOLD_DB, MIN_RATIO, MIN_THRESHOLD_DB, MIN_TIME_MS,
};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::{debug, info};

#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Values read by the engine at the start of a block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub threshold_db: f32,
    pub ratio: f32,
    pub makeup_gain_db: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
    pub bypass: bool,
}

/// Shared parameter store
///
/// Setters clamp to the accepted range and ignore non-finite input, so the
/// audio thread never sees a value that would break the gain curve.
#[derive(Debug)]
pub struct CompressorParams {
    threshold_db: AtomicF32,
    ratio: AtomicF32,
    makeup_gain_db: AtomicF32,
    attack_ms: AtomicF32,
    release_ms: AtomicF32,
    bypass: AtomicBool,
}

impl CompressorParams {
    /// Create a parameter store from settings, clamping each value
    pub fn new(settings: &CompressorSettings) -> Self {
        let defaults = CompressorSettings::default();
        let params = Self {
            threshold_db: AtomicF32::new(defaults.threshold_db),
            ratio: AtomicF32::new(defaults.ratio),
            makeup_gain_db: AtomicF32::new(defaults.makeup_gain_db),
            attack_ms: AtomicF32::new(defaults.attack_ms),
            release_ms: AtomicF32::new(defaults.release_ms),
            bypass: AtomicBool::new(defaults.bypass),
        };
        params.apply_settings(settings);
        params
    }

    /// Store every value from a settings struct
    pub fn apply_settings(&self, settings: &CompressorSettings) {
        self.set_threshold(settings.threshold_db);
        self.set_ratio(settings.ratio);
        self.set_makeup_gain(settings.makeup_gain_db);
        self.set_attack_ms(settings.attack_ms);
        self.set_release_ms(settings.release_ms);
        self.set_bypass(settings.bypass);
    }

    /// Set threshold in dB, clamped to [-60, 0]
    pub fn set_threshold(&self, db: f32) {
        if !db.is_finite() {
            debug!("Ignoring non-finite threshold");
            return;
        }
        self.threshold_db.store(db.clamp(MIN_THRESHOLD_DB, MAX_THRESHOLD_DB));
    }

    /// Set ratio (N:1). Values below 1 clamp to unity, i.e. no compression.
    pub fn set_ratio(&self, ratio: f32) {
        if ratio.is_nan() {
            debug!("Ignoring NaN ratio");
            return;
        }
        // +inf is a valid limiter-style ratio: 1/inf - 1 = -1
        self.ratio.store(ratio.max(MIN_RATIO));
    }

    /// Set make-up gain in dB
    pub fn set_makeup_gain(&self, db: f32) {
        if !db.is_finite() {
            debug!("Ignoring non-finite make-up gain");
            return;
        }
        self.makeup_gain_db.store(db);
    }

    /// Set attack time in milliseconds
    pub fn set_attack_ms(&self, ms: f32) {
        if !ms.is_finite() {
            return;
        }
        self.attack_ms.store(ms.max(MIN_TIME_MS));
    }

    /// Set release time in milliseconds
    pub fn set_release_ms(&self, ms: f32) {
        if !ms.is_finite() {
            return;
        }
        self.release_ms.store(ms.max(MIN_TIME_MS));
    }

    /// Enable or disable bypass
    pub fn set_bypass(&self, bypass: bool) {
        let previous = self.bypass.swap(bypass, Ordering::Relaxed);
        if previous != bypass {
            if bypass {
                info!("Compressor bypassed");
            } else {
                info!("Compressor active");
            }
        }
    }

    pub fn threshold_db(&self) -> f32 {
        self.threshold_db.load()
    }

    pub fn ratio(&self) -> f32 {
        self.ratio.load()
    }

    pub fn makeup_gain_db(&self) -> f32 {
        self.makeup_gain_db.load()
    }

    pub fn attack_ms(&self) -> f32 {
        self.attack_ms.load()
    }

    pub fn release_ms(&self) -> f32 {
        self.release_ms.load()
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass.load(Ordering::Relaxed)
    }

    /// Read every parameter once
    #[inline]
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            threshold_db: self.threshold_db.load(),
            ratio: self.ratio.load(),
            makeup_gain_db: self.makeup_gain_db.load(),
            attack_ms: self.attack_ms.load(),
            release_ms: self.release_ms.load(),
            bypass: self.bypass.load(Ordering::Relaxed),
        }
    }

    /// Current values as a plain settings struct
    pub fn to_settings(&self) -> CompressorSettings {
        let snapshot = self.snapshot();
        CompressorSettings {
            threshold_db: snapshot.threshold_db,
            ratio: snapshot.ratio,
            makeup_gain_db: snapshot.makeup_gain_db,
            attack_ms: snapshot.attack_ms,
            release_ms: snapshot.release_ms,
            bypass: snapshot.bypass,
        }
    }
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self::new(&CompressorSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_defaults_match_settings() {
        let params = CompressorParams::default();
        assert_eq!(params.to_settings(), CompressorSettings::default());
    }

    #[test]
    fn test_threshold_clamping() {
        let params = CompressorParams::default();
        params.set_threshold(-80.0);
        assert_eq!(params.threshold_db(), -60.0);
        params.set_threshold(5.0);
        assert_eq!(params.threshold_db(), 0.0);
        params.set_threshold(f32::NAN);
        assert_eq!(params.threshold_db(), 0.0);
    }

    #[test]
    fn test_ratio_clamping() {
        let params = CompressorParams::default();
        params.set_ratio(0.5);
        assert_eq!(params.ratio(), 1.0);
        params.set_ratio(-2.0);
        assert_eq!(params.ratio(), 1.0);
        params.set_ratio(f32::NAN);
        assert_eq!(params.ratio(), 1.0);
        params.set_ratio(8.0);
        assert_eq!(params.ratio(), 8.0);
    }

    #[test]
    fn test_non_finite_makeup_ignored() {
        let params = CompressorParams::default();
        params.set_makeup_gain(f32::INFINITY);
        assert_eq!(params.makeup_gain_db(), 6.0);
        params.set_makeup_gain(-3.0);
        assert_eq!(params.makeup_gain_db(), -3.0);
    }

    #[test]
    fn test_times_have_a_floor() {
        let params = CompressorParams::default();
        params.set_attack_ms(0.0);
        params.set_release_ms(-5.0);
        assert_eq!(params.attack_ms(), MIN_TIME_MS);
        assert_eq!(params.release_ms(), MIN_TIME_MS);
    }

    #[test]
    fn test_snapshot_sees_writes_from_other_thread() {
        let params = Arc::new(CompressorParams::default());
        let writer = Arc::clone(&params);

        thread::spawn(move || {
            writer.set_threshold(-30.0);
            writer.set_bypass(true);
        })
        .join()
        .unwrap();

        let snapshot = params.snapshot();
        assert_eq!(snapshot.threshold_db, -30.0);
        assert!(snapshot.bypass);
    }
}
