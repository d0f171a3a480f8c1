use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lowest accepted threshold in dB
pub const MIN_THRESHOLD_DB: f32 = -60.0;
/// Highest accepted threshold in dB
pub const MAX_THRESHOLD_DB: f32 = 0.0;
/// Ratio below which the curve would expand instead of compress
pub const MIN_RATIO: f32 = 1.0;
/// Shortest accepted attack/release time in milliseconds
pub const MIN_TIME_MS: f32 = 0.01;

/// Attack time equivalent to a 0.999 one-pole coefficient at 48 kHz (1000 samples)
pub const DEFAULT_ATTACK_MS: f32 = 1000.0 / 48.0;
/// Release time equivalent to a 0.9999 one-pole coefficient at 48 kHz (10000 samples)
pub const DEFAULT_RELEASE_MS: f32 = 10000.0 / 48.0;

/// Compressor parameter set
///
/// Plain scalar view of every parameter the engine reads. Used as the
/// configuration format of the CLI host and as the initial state handed
/// to the real-time parameter store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorSettings {
    pub threshold_db: f32,
    pub ratio: f32,
    pub makeup_gain_db: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
    pub bypass: bool,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        // Typical guitar setting: -18 dB, 4:1, +6 dB make-up
        Self {
            threshold_db: -18.0,
            ratio: 4.0,
            makeup_gain_db: 6.0,
            attack_ms: DEFAULT_ATTACK_MS,
            release_ms: DEFAULT_RELEASE_MS,
            bypass: false,
        }
    }
}

impl CompressorSettings {
    /// Create settings with custom gain-curve values and default timing
    pub fn new(threshold_db: f32, ratio: f32, makeup_gain_db: f32) -> Self {
        Self {
            threshold_db,
            ratio,
            makeup_gain_db,
            ..Default::default()
        }
    }

    /// Parse settings from TOML text. Missing keys fall back to defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded compressor settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    /// Check every value against its accepted range
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(MIN_THRESHOLD_DB..=MAX_THRESHOLD_DB).contains(&self.threshold_db) {
            return Err(SettingsError::OutOfRange {
                name: "threshold_db",
                value: self.threshold_db,
            });
        }
        // NaN fails this comparison as well
        if !(self.ratio >= MIN_RATIO) {
            return Err(SettingsError::OutOfRange {
                name: "ratio",
                value: self.ratio,
            });
        }
        if !self.makeup_gain_db.is_finite() {
            return Err(SettingsError::OutOfRange {
                name: "makeup_gain_db",
                value: self.makeup_gain_db,
            });
        }
        for (name, value) in [("attack_ms", self.attack_ms), ("release_ms", self.release_ms)] {
            if !(value >= MIN_TIME_MS) || !value.is_finite() {
                return Err(SettingsError::OutOfRange { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = CompressorSettings::default();
        assert_eq!(settings.threshold_db, -18.0);
        assert_eq!(settings.ratio, 4.0);
        assert_eq!(settings.makeup_gain_db, 6.0);
        assert!(!settings.bypass);
        assert!((settings.attack_ms - 20.833).abs() < 0.001);
        assert!((settings.release_ms - 208.333).abs() < 0.001);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_custom_settings() {
        let settings = CompressorSettings::new(-24.0, 8.0, 3.0);
        assert_eq!(settings.threshold_db, -24.0);
        assert_eq!(settings.ratio, 8.0);
        assert_eq!(settings.makeup_gain_db, 3.0);
        assert_eq!(settings.attack_ms, DEFAULT_ATTACK_MS);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = CompressorSettings::from_toml_str("ratio = 2.0\nbypass = true\n").unwrap();
        assert_eq!(settings.ratio, 2.0);
        assert!(settings.bypass);
        assert_eq!(settings.threshold_db, -18.0);
        assert_eq!(settings.makeup_gain_db, 6.0);
    }

    #[test]
    fn test_toml_text_round_trip() {
        let original = CompressorSettings {
            threshold_db: -30.0,
            ratio: 10.0,
            makeup_gain_db: 0.0,
            attack_ms: 5.0,
            release_ms: 50.0,
            bypass: true,
        };
        let text = toml::to_string(&original).unwrap();
        let parsed = CompressorSettings::from_toml_str(&text).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let err = CompressorSettings::from_toml_str("threshold_db = 3.0").unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { name: "threshold_db", .. }));

        let err = CompressorSettings::from_toml_str("ratio = 0.5").unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { name: "ratio", .. }));

        let err = CompressorSettings::from_toml_str("release_ms = 0.0").unwrap_err();
        assert!(matches!(err, SettingsError::OutOfRange { name: "release_ms", .. }));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = CompressorSettings::from_toml_str("ratio = \"four\"").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CompressorSettings::load(Path::new("/nonexistent/kompressor.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
