use crate::params::ParamSnapshot;
use kompressor_core::{db_to_linear, linear_to_db};

/// Hard-knee static gain curve
///
/// Built once per block from a parameter snapshot so the per-sample path
/// only does the log/exp work when the envelope is above threshold.
#[derive(Debug, Clone, Copy)]
pub struct GainComputer {
    threshold_db: f32,
    threshold_lin: f32,
    /// `1/ratio - 1`, always in (-1, 0]
    slope: f32,
    makeup: f32,
}

impl GainComputer {
    pub fn new(threshold_db: f32, ratio: f32, makeup_gain_db: f32) -> Self {
        // ratio < 1 would expand; clamp to unity
        let ratio = ratio.max(1.0);
        Self {
            threshold_db,
            threshold_lin: db_to_linear(threshold_db),
            slope: 1.0 / ratio - 1.0,
            makeup: db_to_linear(makeup_gain_db),
        }
    }

    pub fn from_snapshot(snapshot: &ParamSnapshot) -> Self {
        Self::new(snapshot.threshold_db, snapshot.ratio, snapshot.makeup_gain_db)
    }

    /// Compression gain (linear, <= 1) for an envelope level, make-up excluded
    #[inline]
    pub fn gain(&self, envelope_level: f32) -> f32 {
        if envelope_level > self.threshold_lin {
            let level_db = linear_to_db(envelope_level);
            let gain_reduction_db = (level_db - self.threshold_db) * self.slope;
            db_to_linear(gain_reduction_db)
        } else {
            1.0
        }
    }

    /// Linear make-up gain
    #[inline]
    pub fn makeup(&self) -> f32 {
        self.makeup
    }

    pub fn threshold_lin(&self) -> f32 {
        self.threshold_lin
    }

    /// Static output level in dB for a steady input level in dB, make-up included
    pub fn transfer_db(&self, input_db: f32) -> f32 {
        let reduction = if input_db > self.threshold_db {
            (input_db - self.threshold_db) * self.slope
        } else {
            0.0
        };
        input_db + reduction + linear_to_db(self.makeup)
    }
}
