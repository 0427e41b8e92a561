// src/config.rs
use serde::{Deserialize, Serialize};

/// All tunables, supplied at construction. Mirrors `TrackerConfig`'s and
/// `AppSettings`'s pattern of a plain struct with a calibrated `Default`
/// impl.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Pinch start threshold (thumb-index distance below which the latch trips).
    pub pinch_enter: f64,
    /// Pinch release threshold (thumb-index distance above which the latch releases).
    pub pinch_exit: f64,
    /// Smoother alpha per render frame at 60 Hz.
    pub pointer_alpha_60hz: f64,
    /// Minimum milliseconds between detector inferences.
    pub detector_min_interval_ms: f64,
    /// Milliseconds of no landmark samples before the raw pointer decays to origin.
    pub no_hand_origin_decay_ms: f64,
    /// Milliseconds of continuous NONE in PHOTO_VIEW before falling back to SCATTERED.
    pub photo_view_grace_ms: f64,
    /// Particle count (N).
    pub particle_count: usize,
    /// Cube half-side for the scatter formation.
    pub scatter_bounds: f64,
    /// Tree vertical extent.
    pub tree_height: f64,
    /// Baseline camera distance.
    pub camera_z: f64,
    /// True when the upstream image is mirrored (selfie view).
    pub mirror_input: bool,
    /// Seed for deterministic formation generation.
    pub formation_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pinch_enter: 0.06,
            pinch_exit: 0.10,
            pointer_alpha_60hz: 0.15,
            detector_min_interval_ms: 32.0,
            no_hand_origin_decay_ms: 200.0,
            photo_view_grace_ms: 1000.0,
            particle_count: 800,
            scatter_bounds: 10.0,
            tree_height: 8.0,
            camera_z: 15.0,
            mirror_input: true,
            formation_seed: 0x5CA1AB1E,
        }
    }
}

impl Config {
    /// Parse configuration from a TOML document, falling back to defaults
    /// for any field that is absent.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize configuration to a TOML document.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let c = Config::default();
        assert_eq!(c.pinch_enter, 0.06);
        assert_eq!(c.pinch_exit, 0.10);
        assert!(c.pinch_enter < c.pinch_exit);
        assert_eq!(c.particle_count, 800);
    }

    #[test]
    fn toml_round_trip() {
        let c = Config {
            particle_count: 123,
            ..Config::default()
        };
        let s = c.to_toml_string().unwrap();
        let back = Config::from_toml_str(&s).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let c = Config::from_toml_str("particle_count = 42\n").unwrap();
        assert_eq!(c.particle_count, 42);
        assert_eq!(c.camera_z, Config::default().camera_z);
    }
}
