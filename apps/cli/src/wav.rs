//! WAV file I/O for the offline host
//!
//! Reads any integer or float WAV into planar `f32` channels in [-1, 1]
//! and writes planar channels back with the original spec.
use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Decoded audio, one `Vec` per channel
pub struct PlanarAudio {
    pub spec: WavSpec,
    pub channels: Vec<Vec<f32>>,
}

impl PlanarAudio {
    pub fn num_frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

/// Read a WAV file and deinterleave it
pub fn read(path: &Path) -> Result<PlanarAudio> {
    let mut reader = WavReader::open(path)
        .with_context(|| format!("Failed to open input WAV file {}", path.display()))?;
    let spec = reader.spec();
    let num_channels = spec.channels as usize;
    if num_channels == 0 {
        bail!("{} has no channels", path.display());
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("Failed to read float samples")?,
        SampleFormat::Int => {
            let scale = int_full_scale(spec.bits_per_sample);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .context("Failed to read integer samples")?
        }
    };

    Ok(PlanarAudio {
        spec,
        channels: deinterleave(&interleaved, num_channels),
    })
}

/// Interleave planar channels and write them with the given spec
pub fn write(path: &Path, audio: &PlanarAudio) -> Result<()> {
    let mut writer = WavWriter::create(path, audio.spec)
        .with_context(|| format!("Failed to create output WAV file {}", path.display()))?;

    // Same full scale as `read`, so integer samples survive a round trip
    let full_scale = int_full_scale(audio.spec.bits_per_sample);
    for frame in 0..audio.num_frames() {
        for channel in &audio.channels {
            let sample = channel[frame];
            match audio.spec.sample_format {
                SampleFormat::Float => writer.write_sample(sample)?,
                SampleFormat::Int => {
                    let value = (sample * full_scale)
                        .round()
                        .clamp(-full_scale, full_scale - 1.0) as i32;
                    writer.write_sample(value)?
                }
            }
        }
    }

    writer.finalize().context("Failed to finalize WAV writer")?;
    Ok(())
}

/// Peak level across all channels in dBFS, -inf for digital silence
pub fn peak_dbfs(channels: &[Vec<f32>]) -> f32 {
    let peak = channels
        .iter()
        .flat_map(|c| c.iter())
        .fold(0.0_f32, |acc, s| acc.max(s.abs()));
    20.0 * peak.log10()
}

fn int_full_scale(bits_per_sample: u16) -> f32 {
    (1_i64 << (bits_per_sample.saturating_sub(1))) as f32
}

fn deinterleave(interleaved: &[f32], num_channels: usize) -> Vec<Vec<f32>> {
    let num_frames = interleaved.len() / num_channels;
    let mut channels = vec![Vec::with_capacity(num_frames); num_channels];
    for frame in interleaved.chunks_exact(num_channels) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
    channels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deinterleave() {
        let channels = deinterleave(&[1.0, -1.0, 2.0, -2.0, 3.0, -3.0], 2);
        assert_eq!(channels, vec![vec![1.0, 2.0, 3.0], vec![-1.0, -2.0, -3.0]]);
    }

    #[test]
    fn test_deinterleave_drops_partial_frame() {
        let channels = deinterleave(&[1.0, -1.0, 2.0], 2);
        assert_eq!(channels, vec![vec![1.0], vec![-1.0]]);
    }

    #[test]
    fn test_int_full_scale() {
        assert_eq!(int_full_scale(16), 32768.0);
        assert_eq!(int_full_scale(24), 8388608.0);
    }

    #[test]
    fn test_peak_dbfs() {
        let channels = vec![vec![0.25, -0.5], vec![0.1]];
        assert!((peak_dbfs(&channels) + 6.02).abs() < 0.01);
        assert_eq!(peak_dbfs(&[vec![0.0]]), f32::NEG_INFINITY);
    }

    #[test]
    fn test_write_then_read_16_bit() {
        let path = std::env::temp_dir().join(format!("kompressor-wav-{}.wav", std::process::id()));
        let audio = PlanarAudio {
            spec: WavSpec {
                channels: 2,
                sample_rate: 48000,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            channels: vec![vec![0.5, -0.25, 0.0], vec![-1.0, 1.0, 0.125]],
        };

        write(&path, &audio).unwrap();
        let decoded = read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(decoded.spec, audio.spec);
        assert_eq!(decoded.num_frames(), 3);
        let pairs = decoded.channels.iter().flatten().zip(audio.channels.iter().flatten());
        for (out, inp) in pairs {
            assert!((out - inp).abs() < 1e-3);
        }
    }

    fn read_ints(path: &Path) -> Vec<i32> {
        WavReader::open(path)
            .unwrap()
            .samples::<i32>()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_integer_samples_survive_read_write() {
        let dir = std::env::temp_dir();
        let id = std::process::id();
        let source = dir.join(format!("kompressor-int-src-{}.wav", id));
        let copy = dir.join(format!("kompressor-int-copy-{}.wav", id));

        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let original = [32767, -32768, 20000, -20000, 16385, 100, -1, 0];
        let mut writer = WavWriter::create(&source, spec).unwrap();
        for &value in &original {
            writer.write_sample(value as i16).unwrap();
        }
        writer.finalize().unwrap();

        let audio = read(&source).unwrap();
        write(&copy, &audio).unwrap();
        let copied = read_ints(&copy);
        std::fs::remove_file(&source).ok();
        std::fs::remove_file(&copy).ok();

        assert_eq!(copied, original);
    }

    #[test]
    fn test_out_of_range_samples_clip_to_integer_limits() {
        let path = std::env::temp_dir().join(format!("kompressor-clip-{}.wav", std::process::id()));
        let audio = PlanarAudio {
            spec: WavSpec {
                channels: 1,
                sample_rate: 48000,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            channels: vec![vec![1.0, 1.5, -1.0, -2.0]],
        };

        write(&path, &audio).unwrap();
        let written = read_ints(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(written, vec![32767, 32767, -32768, -32768]);
    }
}
