//! Decibel / linear conversions shared by the DSP and the CLI.

/// Convert dB to linear gain
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10_f32.powf(db / 20.0)
}

/// Convert linear amplitude to dB
///
/// Callers must pass a strictly positive value; the envelope floor keeps
/// this true on the audio path.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    20.0 * linear.log10()
}
