//! Static transfer curve rows for the `curve` command
use anyhow::{bail, Result};
use kompressor_core::CompressorSettings;
use kompressor_dsp::GainComputer;

/// Upper bound on printed rows
pub const MAX_ROWS: usize = 100_000;

/// `(input_db, output_db)` pairs from `from` to `to` inclusive
///
/// Each input level is `from + i * step`, so rows never drift. A bypassed
/// compressor gives the identity curve.
pub fn curve_rows(
    settings: &CompressorSettings,
    from: f32,
    to: f32,
    step: f32,
) -> Result<Vec<(f32, f32)>> {
    if !from.is_finite() || !to.is_finite() {
        bail!("--from and --to must be finite");
    }
    if !(step > 0.0) {
        bail!("Step must be positive");
    }
    if from > to {
        bail!("--from must not exceed --to");
    }

    // Tolerance keeps the end point when (to - from) / step lands just under an integer
    let last = ((to - from) / step + 1e-4).floor();
    if !(last < MAX_ROWS as f32) {
        bail!("Step {} gives more than {} rows", step, MAX_ROWS);
    }
    let last = last as usize;

    let computer =
        GainComputer::new(settings.threshold_db, settings.ratio, settings.makeup_gain_db);
    let rows = (0..=last)
        .map(|i| {
            // Adding 0.0 turns -0.0 into 0.0
            let input_db = (from + i as f32 * step).min(to) + 0.0;
            let output_db = if settings.bypass {
                input_db
            } else {
                computer.transfer_db(input_db)
            };
            (input_db, output_db)
        })
        .collect();
    Ok(rows)
}
